//! Context caching snippets.
//!
//! Every snippet caches the Apollo 11 transcript first and deletes the cache
//! before returning, whether or not the body succeeded.

use std::time::Duration;

use genai_cookbook_types::caches::{
    CachedContent, CreateCachedContentConfig, UpdateCachedContentConfig,
};
use genai_cookbook_types::content::{Content, Part, Role};
use genai_cookbook_types::models::GenerateContentConfig;
use genai_cookbook_types::response::GenerateContentResponse;

use super::{cache_name, file_part, Snippets, A11_TXT, CACHE_MODEL};
use crate::caches::ttl_from_duration;
use crate::error::{Error, Result};

const SYSTEM_INSTRUCTION: &str = "You are an expert analyzing transcripts.";

impl Snippets<'_> {
    /// 创建缓存并基于它生成摘要。
    pub async fn cache_create(&self) -> Result<GenerateContentResponse> {
        let cache = self.create_transcript_cache().await?;
        let name = cache_name(&cache)?;
        let result = self
            .generate_with_cache(&name, "Please summarize this transcript")
            .await;
        self.cleanup_cache(&name).await;
        result
    }

    /// 按名称重新取回缓存后再使用。
    pub async fn cache_create_from_name(&self) -> Result<GenerateContentResponse> {
        let cache = self.create_transcript_cache().await?;
        let name = cache_name(&cache)?;
        let result = async {
            let fetched = self.client.caches().get(&name).await?;
            let fetched_name = cache_name(&fetched)?;
            self.generate_with_cache(
                &fetched_name,
                "Find a lighthearted moment from this transcript",
            )
            .await
        }
        .await;
        self.cleanup_cache(&name).await;
        result
    }

    /// 先进行两轮对话，再把对话历史做成缓存，在新会话里继续提问。
    pub async fn cache_create_from_chat(&self) -> Result<GenerateContentResponse> {
        let document = self.upload_media(A11_TXT, "text/plain").await?;
        let config = GenerateContentConfig {
            system_instruction: Some(Content::instruction(SYSTEM_INSTRUCTION)),
            ..Default::default()
        };
        let chat = self.client.chats().create_with_config(CACHE_MODEL, config);
        let reply = chat
            .send_parts(vec![
                Part::text("Hi, could you summarize this transcript?"),
                file_part(&document)?,
            ])
            .await?;
        tracing::info!("{}", reply.text().unwrap_or_default());
        let reply = chat
            .send_message("Okay, could you tell me more about the trans-lunar injection")
            .await?;
        tracing::info!("{}", reply.text().unwrap_or_default());

        let cache = self
            .client
            .caches()
            .create(
                CACHE_MODEL,
                CreateCachedContentConfig {
                    contents: Some(chat.history().await),
                    system_instruction: Some(Content::instruction(SYSTEM_INSTRUCTION)),
                    ..Default::default()
                },
            )
            .await?;
        let name = cache_name(&cache)?;

        let result = async {
            let config = GenerateContentConfig {
                cached_content: Some(name.clone()),
                ..Default::default()
            };
            let cached_chat = self.client.chats().create_with_config(CACHE_MODEL, config);
            let response = cached_chat
                .send_message(
                    "I didn't understand that last part, could you explain it in simpler language?",
                )
                .await?;
            tracing::info!("{}", response.text().unwrap_or_default());
            Ok::<_, Error>(response)
        }
        .await;
        self.cleanup_cache(&name).await;
        result
    }

    /// 创建后立即删除；删除失败视为错误。
    pub async fn cache_delete(&self) -> Result<()> {
        let cache = self.create_transcript_cache().await?;
        let name = cache_name(&cache)?;
        self.client.caches().delete(&name).await?;
        tracing::info!(cache = %name, "deleted cache");
        Ok(())
    }

    pub async fn cache_get(&self) -> Result<CachedContent> {
        let cache = self.create_transcript_cache().await?;
        let name = cache_name(&cache)?;
        let result = self.client.caches().get(&name).await;
        if let Ok(fetched) = &result {
            tracing::info!(
                cache = %name,
                expire_time = fetched.expire_time.as_deref().unwrap_or_default(),
                "retrieved cache"
            );
        }
        self.cleanup_cache(&name).await;
        result
    }

    /// 列出全部缓存（包括刚创建的那一个）。
    pub async fn cache_list(&self) -> Result<Vec<CachedContent>> {
        let cache = self.create_transcript_cache().await?;
        let name = cache_name(&cache)?;
        let result = self.client.caches().all().await;
        if let Ok(caches) = &result {
            for cache in caches {
                tracing::info!(
                    cache = cache.name.as_deref().unwrap_or_default(),
                    expire_time = cache.expire_time.as_deref().unwrap_or_default(),
                    "cache"
                );
            }
        }
        self.cleanup_cache(&name).await;
        result
    }

    /// 把 TTL 延长到两小时。
    pub async fn cache_update(&self) -> Result<CachedContent> {
        let cache = self.create_transcript_cache().await?;
        let name = cache_name(&cache)?;
        let update = UpdateCachedContentConfig {
            ttl: Some(ttl_from_duration(Duration::from_secs(2 * 60 * 60))),
            ..Default::default()
        };
        let result = self.client.caches().update(&name, update).await;
        if let Ok(updated) = &result {
            tracing::info!(
                cache = %name,
                before = cache.expire_time.as_deref().unwrap_or_default(),
                after = updated.expire_time.as_deref().unwrap_or_default(),
                "updated cache ttl"
            );
        }
        self.cleanup_cache(&name).await;
        result
    }

    async fn create_transcript_cache(&self) -> Result<CachedContent> {
        let document = self.upload_media(A11_TXT, "text/plain").await?;
        let config = CreateCachedContentConfig {
            contents: Some(vec![Content::from_parts(
                vec![file_part(&document)?],
                Role::User,
            )]),
            system_instruction: Some(Content::instruction(SYSTEM_INSTRUCTION)),
            ..Default::default()
        };
        let cache = self.client.caches().create(CACHE_MODEL, config).await?;
        tracing::info!(
            cache = cache.name.as_deref().unwrap_or_default(),
            "created transcript cache"
        );
        Ok(cache)
    }

    async fn generate_with_cache(
        &self,
        cache_name: &str,
        prompt: &str,
    ) -> Result<GenerateContentResponse> {
        let config = GenerateContentConfig {
            cached_content: Some(cache_name.to_string()),
            ..Default::default()
        };
        let response = self
            .client
            .models()
            .generate_content_with_config(CACHE_MODEL, vec![Content::user(prompt)], config)
            .await?;
        tracing::info!(cache = cache_name, "{}", response.text().unwrap_or_default());
        Ok(response)
    }
}
