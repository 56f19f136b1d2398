//! Models API surface.

use std::sync::Arc;

use genai_cookbook_types::content::Content;
use genai_cookbook_types::models::{
    BatchEmbedContentsRequest, CountTokensConfig, CountTokensRequest, CountTokensResponse,
    EmbedContentConfig, EmbedContentResponse, GenerateContentConfig, GenerateContentRequest,
};
use genai_cookbook_types::response::GenerateContentResponse;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ClientInner;
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct Models {
    pub(crate) inner: Arc<ClientInner>,
}

impl Models {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// 生成内容（默认配置）。
    pub async fn generate_content(
        &self,
        model: impl Into<String>,
        contents: Vec<Content>,
    ) -> Result<GenerateContentResponse> {
        self.generate_content_with_config(model, contents, GenerateContentConfig::default())
            .await
    }

    /// 生成内容（自定义配置）。
    pub async fn generate_content_with_config(
        &self,
        model: impl Into<String>,
        contents: Vec<Content>,
        config: GenerateContentConfig,
    ) -> Result<GenerateContentResponse> {
        let request = GenerateContentRequest::new(contents, config);
        self.post_model_method(&model.into(), "generateContent", &request)
            .await
    }

    /// 生成嵌入向量（默认配置）。
    pub async fn embed_content(
        &self,
        model: impl Into<String>,
        contents: Vec<Content>,
    ) -> Result<EmbedContentResponse> {
        self.embed_content_with_config(model, contents, EmbedContentConfig::default())
            .await
    }

    /// 生成嵌入向量（自定义配置）。每个内容对应一个向量，顺序与输入一致。
    pub async fn embed_content_with_config(
        &self,
        model: impl Into<String>,
        contents: Vec<Content>,
        config: EmbedContentConfig,
    ) -> Result<EmbedContentResponse> {
        if contents.is_empty() {
            return Err(Error::InvalidConfig {
                message: "embed_content requires at least one content".into(),
            });
        }
        let model = normalize_model_name(&model.into());
        let request = BatchEmbedContentsRequest::new(&model, contents, &config);
        self.post_model_method(&model, "batchEmbedContents", &request)
            .await
    }

    /// 计数 tokens（默认配置）。
    pub async fn count_tokens(
        &self,
        model: impl Into<String>,
        contents: Vec<Content>,
    ) -> Result<CountTokensResponse> {
        self.count_tokens_with_config(model, contents, CountTokensConfig::default())
            .await
    }

    /// 计数 tokens（自定义配置）。
    ///
    /// 带 system instruction 或生成配置时，请求体包装为 `generateContentRequest`。
    pub async fn count_tokens_with_config(
        &self,
        model: impl Into<String>,
        contents: Vec<Content>,
        config: CountTokensConfig,
    ) -> Result<CountTokensResponse> {
        let model = normalize_model_name(&model.into());
        let request = CountTokensRequest::new(&model, contents, config);
        self.post_model_method(&model, "countTokens", &request)
            .await
    }

    async fn post_model_method<B, T>(&self, model: &str, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = build_model_method_url(&self.inner, model, method);
        let request = self.inner.http.post(url).json(body);
        let response = self.inner.send(request).await?;
        if !response.status().is_success() {
            return Err(Error::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

/// 补全 `models/` 前缀（`tunedModels/` 保持不变）。
pub(crate) fn normalize_model_name(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

fn build_model_method_url(inner: &ClientInner, model: &str, method: &str) -> String {
    let model = normalize_model_name(model);
    let base = &inner.api_client.base_url;
    let version = &inner.api_client.api_version;
    format!("{base}{version}/{model}:{method}")
}
