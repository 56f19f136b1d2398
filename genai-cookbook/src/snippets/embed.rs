//! Embedding snippets.

use genai_cookbook_types::content::Content;
use genai_cookbook_types::models::{EmbedContentConfig, EmbedContentResponse};

use super::{Snippets, EMBEDDING_MODEL};
use crate::error::Result;

const OUTPUT_DIMENSIONALITY: i32 = 10;

impl Snippets<'_> {
    /// 单条文本的嵌入向量。
    pub async fn embed_content(&self) -> Result<EmbedContentResponse> {
        self.embed(vec![Content::user("Hello World!")]).await
    }

    /// 一次请求嵌入多条文本，结果顺序与输入一致。
    pub async fn batch_embed_contents(&self) -> Result<EmbedContentResponse> {
        let contents = vec![
            Content::user("What is the meaning of life?"),
            Content::user("How much wood would a woodchuck chuck?"),
            Content::user("How does the brain work?"),
        ];
        self.embed(contents).await
    }

    async fn embed(&self, contents: Vec<Content>) -> Result<EmbedContentResponse> {
        let config = EmbedContentConfig {
            output_dimensionality: Some(OUTPUT_DIMENSIONALITY),
            ..Default::default()
        };
        let response = self
            .client
            .models()
            .embed_content_with_config(EMBEDDING_MODEL, contents, config)
            .await?;
        for (index, embedding) in response.embeddings.iter().enumerate() {
            tracing::info!(index, values = ?embedding.values, "embedding");
        }
        Ok(response)
    }
}
