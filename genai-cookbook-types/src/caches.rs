use serde::{Deserialize, Serialize};

use crate::content::Content;
use crate::http::HttpOptions;

/// 创建缓存配置。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateCachedContentConfig {
    /// 单次请求的 HTTP 覆盖项（不发送到服务端）。
    #[serde(skip_serializing, skip_deserializing)]
    pub http_options: Option<HttpOptions>,
    /// 存活时长，例如 `"3600s"`。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    /// 过期时间（RFC3339）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// 需要缓存的内容。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<Content>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

/// 更新缓存配置。
///
/// `ttl` 与 `expire_time` 至少设置一个。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCachedContentConfig {
    #[serde(skip_serializing, skip_deserializing)]
    pub http_options: Option<HttpOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<String>,
}

impl UpdateCachedContentConfig {
    /// 根据已设置字段生成 `updateMask`。
    #[must_use]
    pub fn update_mask(&self) -> Option<String> {
        let mut fields = Vec::new();
        if self.ttl.is_some() {
            fields.push("ttl");
        }
        if self.expire_time.is_some() {
            fields.push("expireTime");
        }
        if fields.is_empty() {
            None
        } else {
            Some(fields.join(","))
        }
    }
}

/// 列出缓存配置。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListCachedContentsConfig {
    #[serde(skip_serializing, skip_deserializing)]
    pub http_options: Option<HttpOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// 缓存使用元数据。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CachedContentUsageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_token_count: Option<i32>,
}

/// 缓存内容。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CachedContent {
    /// 资源名，形如 `cachedContents/abc`。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<CachedContentUsageMetadata>,
}

/// 列表响应。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListCachedContentsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_contents: Option<Vec<CachedContent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_config_skips_http_options() {
        let config = CreateCachedContentConfig {
            http_options: Some(HttpOptions {
                timeout: Some(10),
                ..Default::default()
            }),
            ttl: Some("300s".into()),
            contents: Some(vec![Content::user("cache me")]),
            ..Default::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("httpOptions").is_none());
        assert_eq!(json["ttl"], "300s");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "cache me");
    }

    #[test]
    fn update_mask_lists_set_fields() {
        let mut config = UpdateCachedContentConfig::default();
        assert_eq!(config.update_mask(), None);
        config.ttl = Some("7200s".into());
        assert_eq!(config.update_mask().as_deref(), Some("ttl"));
        config.expire_time = Some("2030-01-01T00:00:00Z".into());
        assert_eq!(config.update_mask().as_deref(), Some("ttl,expireTime"));
    }
}
