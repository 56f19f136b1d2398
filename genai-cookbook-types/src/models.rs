use std::collections::HashMap;

use crate::config::GenerationConfig;
use crate::content::Content;
use serde::{Deserialize, Serialize};

/// `GenerateContent` 请求配置。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    /// 引用的缓存资源名，形如 `cachedContents/abc`。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// `GenerateContent` 请求体。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

impl GenerateContentRequest {
    /// 由内容与配置组装请求体。
    #[must_use]
    pub fn new(contents: Vec<Content>, config: GenerateContentConfig) -> Self {
        Self {
            contents,
            system_instruction: config.system_instruction,
            generation_config: config.generation_config,
            cached_content: config.cached_content,
            labels: config.labels,
        }
    }
}

/// `CountTokens` 请求配置。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl CountTokensConfig {
    /// 未设置任何附加字段。
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.system_instruction.is_none() && self.generation_config.is_none()
    }
}

/// `CountTokens` 请求体。
///
/// 仅有 `contents` 时直接发送；带有 system instruction 或生成配置时，
/// 服务端要求包装为 `generateContentRequest`。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<Content>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_content_request: Option<CountTokensGenerateContentRequest>,
}

/// 嵌套在 `CountTokens` 中的生成请求。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensGenerateContentRequest {
    pub model: String,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl CountTokensRequest {
    /// 根据配置选择请求体形态。`model` 需为完整资源名。
    #[must_use]
    pub fn new(model: &str, contents: Vec<Content>, config: CountTokensConfig) -> Self {
        if config.is_empty() {
            return Self {
                contents: Some(contents),
                generate_content_request: None,
            };
        }
        Self {
            contents: None,
            generate_content_request: Some(CountTokensGenerateContentRequest {
                model: model.to_string(),
                contents,
                system_instruction: config.system_instruction,
                generation_config: config.generation_config,
            }),
        }
    }
}

/// `CountTokens` 响应体。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_content_token_count: Option<i32>,
}

/// `EmbedContent` 配置。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentConfig {
    /// 例如 `RETRIEVAL_DOCUMENT`、`SEMANTIC_SIMILARITY`。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 截断输出向量的维度。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dimensionality: Option<i32>,
}

/// `batchEmbedContents` 中的单条请求。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    pub model: String,
    pub content: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dimensionality: Option<i32>,
}

/// `batchEmbedContents` 请求体。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEmbedContentsRequest {
    pub requests: Vec<EmbedContentRequest>,
}

impl BatchEmbedContentsRequest {
    /// 每个内容生成一条请求，共享同一配置。
    #[must_use]
    pub fn new(model: &str, contents: Vec<Content>, config: &EmbedContentConfig) -> Self {
        let requests = contents
            .into_iter()
            .map(|content| EmbedContentRequest {
                model: model.to_string(),
                content,
                task_type: config.task_type.clone(),
                title: config.title.clone(),
                output_dimensionality: config.output_dimensionality,
            })
            .collect();
        Self { requests }
    }
}

/// 内容嵌入结果。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContentEmbedding {
    #[serde(default)]
    pub values: Vec<f32>,
}

/// `EmbedContent` 元数据。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable_character_count: Option<i32>,
}

/// `EmbedContent` 响应。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentResponse {
    #[serde(default)]
    pub embeddings: Vec<ContentEmbedding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EmbedContentMetadata>,
}
