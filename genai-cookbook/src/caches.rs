//! Caches API surface.

use std::sync::Arc;
use std::time::Duration;

use genai_cookbook_types::caches::{
    CachedContent, CreateCachedContentConfig, ListCachedContentsConfig,
    ListCachedContentsResponse, UpdateCachedContentConfig,
};
use genai_cookbook_types::http::HttpOptions;
use serde_json::Value;

use crate::client::ClientInner;
use crate::error::{Error, Result};
use crate::models::normalize_model_name;
use crate::request::{apply_http_options, merge_extra_body, resolve_endpoint};

#[derive(Clone)]
pub struct Caches {
    pub(crate) inner: Arc<ClientInner>,
}

impl Caches {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// 创建缓存。
    pub async fn create(
        &self,
        model: impl Into<String>,
        mut config: CreateCachedContentConfig,
    ) -> Result<CachedContent> {
        let http_options = config.http_options.take();
        let model = normalize_model_name(&model.into());

        let mut body = serde_json::to_value(&config)?;
        let body_map = body.as_object_mut().ok_or_else(|| Error::Parse {
            message: "CreateCachedContentConfig must be object".into(),
        })?;
        body_map.insert("model".to_string(), Value::String(model));
        if let Some(options) = http_options.as_ref() {
            merge_extra_body(&mut body, options)?;
        }

        let url = build_cached_contents_url(&self.inner, http_options.as_ref());
        let mut request = self.inner.http.post(url).json(&body);
        request = apply_http_options(request, http_options.as_ref())?;

        let response = self.inner.send(request).await?;
        if !response.status().is_success() {
            return Err(Error::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        let cache = response.json::<CachedContent>().await?;
        tracing::debug!(
            name = cache.name.as_deref().unwrap_or_default(),
            expire_time = cache.expire_time.as_deref().unwrap_or_default(),
            "created cached content"
        );
        Ok(cache)
    }

    /// 获取缓存。
    pub async fn get(&self, name: impl AsRef<str>) -> Result<CachedContent> {
        let name = normalize_cached_content_name(name.as_ref())?;
        let url = build_cached_content_url(&self.inner, &name, None);
        let request = self.inner.http.get(url);

        let response = self.inner.send(request).await?;
        if !response.status().is_success() {
            return Err(Error::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json::<CachedContent>().await?)
    }

    /// 更新缓存的 TTL 或过期时间。
    ///
    /// # Errors
    /// `ttl` 与 `expire_time` 都未设置时返回 [`Error::InvalidConfig`]。
    pub async fn update(
        &self,
        name: impl AsRef<str>,
        mut config: UpdateCachedContentConfig,
    ) -> Result<CachedContent> {
        let http_options = config.http_options.take();
        let update_mask = config.update_mask().ok_or_else(|| Error::InvalidConfig {
            message: "Cache update requires ttl or expire_time".into(),
        })?;
        let name = normalize_cached_content_name(name.as_ref())?;
        let url = build_cached_content_url(&self.inner, &name, http_options.as_ref());
        let url = append_query(&url, &[("updateMask", update_mask.as_str())])?;

        let mut body = serde_json::to_value(&config)?;
        if let Some(options) = http_options.as_ref() {
            merge_extra_body(&mut body, options)?;
        }
        let mut request = self.inner.http.patch(url).json(&body);
        request = apply_http_options(request, http_options.as_ref())?;

        let response = self.inner.send(request).await?;
        if !response.status().is_success() {
            return Err(Error::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json::<CachedContent>().await?)
    }

    /// 删除缓存。
    pub async fn delete(&self, name: impl AsRef<str>) -> Result<()> {
        let name = normalize_cached_content_name(name.as_ref())?;
        let url = build_cached_content_url(&self.inner, &name, None);
        let request = self.inner.http.delete(url);

        let response = self.inner.send(request).await?;
        if !response.status().is_success() {
            return Err(Error::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// 列出缓存。
    pub async fn list(&self) -> Result<ListCachedContentsResponse> {
        self.list_with_config(ListCachedContentsConfig::default())
            .await
    }

    /// 列出缓存（带配置）。
    pub async fn list_with_config(
        &self,
        mut config: ListCachedContentsConfig,
    ) -> Result<ListCachedContentsResponse> {
        let http_options = config.http_options.take();
        let url = build_cached_contents_url(&self.inner, http_options.as_ref());
        let page_size = config.page_size.map(|size| size.to_string());
        let mut params = Vec::new();
        if let Some(page_size) = page_size.as_deref() {
            params.push(("pageSize", page_size));
        }
        if let Some(page_token) = config.page_token.as_deref() {
            params.push(("pageToken", page_token));
        }
        let url = append_query(&url, &params)?;
        let mut request = self.inner.http.get(url);
        request = apply_http_options(request, http_options.as_ref())?;

        let response = self.inner.send(request).await?;
        if !response.status().is_success() {
            return Err(Error::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json::<ListCachedContentsResponse>().await?)
    }

    /// 列出所有缓存（自动翻页）。
    pub async fn all(&self) -> Result<Vec<CachedContent>> {
        let mut config = ListCachedContentsConfig::default();
        let mut contents = Vec::new();
        loop {
            let response = self.list_with_config(config.clone()).await?;
            if let Some(items) = response.cached_contents {
                contents.extend(items);
            }
            match response.next_page_token {
                Some(token) if !token.is_empty() => {
                    config.page_token = Some(token);
                }
                _ => break,
            }
        }
        Ok(contents)
    }
}

/// 将时长格式化为服务端的 duration 字符串，例如 `"7200s"`。
#[must_use]
pub fn ttl_from_duration(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}s", duration.as_secs_f64())
    }
}

fn normalize_cached_content_name(name: &str) -> Result<String> {
    let id = name.strip_prefix("cachedContents/").unwrap_or(name);
    if id.is_empty() {
        return Err(Error::InvalidConfig {
            message: "Cached content name must not be empty".into(),
        });
    }
    Ok(format!("cachedContents/{id}"))
}

fn build_cached_contents_url(inner: &ClientInner, http_options: Option<&HttpOptions>) -> String {
    let (base, version) = resolve_endpoint(inner, http_options);
    format!("{base}{version}/cachedContents")
}

fn build_cached_content_url(
    inner: &ClientInner,
    name: &str,
    http_options: Option<&HttpOptions>,
) -> String {
    let (base, version) = resolve_endpoint(inner, http_options);
    format!("{base}{version}/{name}")
}

fn append_query(url: &str, params: &[(&str, &str)]) -> Result<String> {
    let mut url = reqwest::Url::parse(url).map_err(|err| Error::InvalidConfig {
        message: err.to_string(),
    })?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_client_inner;

    #[test]
    fn test_normalize_cached_content_name() {
        assert_eq!(
            normalize_cached_content_name("abc-123").unwrap(),
            "cachedContents/abc-123"
        );
        assert_eq!(
            normalize_cached_content_name("cachedContents/abc-123").unwrap(),
            "cachedContents/abc-123"
        );
        assert!(normalize_cached_content_name("cachedContents/").is_err());
    }

    #[test]
    fn test_ttl_from_duration() {
        assert_eq!(ttl_from_duration(Duration::from_secs(7200)), "7200s");
        assert_eq!(ttl_from_duration(Duration::from_millis(1500)), "1.5s");
    }

    #[test]
    fn test_cache_urls() {
        let inner = test_client_inner();
        assert_eq!(
            build_cached_contents_url(&inner, None),
            "https://generativelanguage.googleapis.com/v1beta/cachedContents"
        );
        let options = HttpOptions {
            api_version: Some("v1".into()),
            ..Default::default()
        };
        assert_eq!(
            build_cached_content_url(&inner, "cachedContents/abc", Some(&options)),
            "https://generativelanguage.googleapis.com/v1/cachedContents/abc"
        );
    }

    #[test]
    fn test_append_query() {
        let url = append_query(
            "https://example.com/v1beta/cachedContents/abc",
            &[("updateMask", "ttl,expireTime")],
        )
        .unwrap();
        assert_eq!(
            url,
            "https://example.com/v1beta/cachedContents/abc?updateMask=ttl%2CexpireTime"
        );
        let url = append_query("https://example.com/v1beta/cachedContents", &[]).unwrap();
        assert_eq!(url, "https://example.com/v1beta/cachedContents");
    }
}
