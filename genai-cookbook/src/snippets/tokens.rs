//! Token counting snippets.
//!
//! Each snippet counts the prompt with `countTokens`, then generates from the
//! same prompt so the service-side usage metadata can be compared.

use std::fmt;

use genai_cookbook_types::content::{Content, Part, Role};
use genai_cookbook_types::models::{CountTokensConfig, CountTokensResponse, GenerateContentConfig};
use genai_cookbook_types::response::{GenerateContentResponse, GenerateContentResponseUsageMetadata};

use super::{
    file_part, Snippets, BIG_BUCK_BUNNY_MP4, GENERATION_MODEL, ORGAN_JPG, TEST_PDF,
};
use crate::error::Result;

/// 计数结果与同一提示的生成响应（携带用量）。
#[derive(Debug, Clone)]
pub struct TokenReport {
    pub counted: CountTokensResponse,
    pub generated: GenerateContentResponse,
}

impl fmt::Display for TokenReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "total_tokens: {}", count(self.counted.total_tokens))?;
        if let Some(usage) = &self.generated.usage_metadata {
            write!(f, "; ")?;
            write_usage(f, usage)?;
        }
        Ok(())
    }
}

/// 多轮对话的计数结果。
#[derive(Debug, Clone)]
pub struct ChatTokenReport {
    /// 初始历史的计数。
    pub history: CountTokensResponse,
    /// 发送一条消息后的生成响应。
    pub reply: GenerateContentResponse,
    /// 追加一条用户消息后整个历史的计数。
    pub combined: CountTokensResponse,
}

impl fmt::Display for ChatTokenReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "history total_tokens: {}", count(self.history.total_tokens))?;
        if let Some(usage) = &self.reply.usage_metadata {
            write_usage(f, usage)?;
            writeln!(f)?;
        }
        write!(f, "combined total_tokens: {}", count(self.combined.total_tokens))
    }
}

fn count(value: Option<i32>) -> i32 {
    value.unwrap_or_default()
}

fn write_usage(
    f: &mut fmt::Formatter<'_>,
    usage: &GenerateContentResponseUsageMetadata,
) -> fmt::Result {
    write!(
        f,
        "prompt_token_count: {}, candidates_token_count: {}, total_token_count: {}",
        count(usage.prompt_token_count),
        count(usage.candidates_token_count),
        count(usage.total_token_count)
    )
}

impl Snippets<'_> {
    pub async fn tokens_text_only(&self) -> Result<TokenReport> {
        let contents = vec![Content::user(
            "The quick brown fox jumps over the lazy dog.",
        )];
        self.count_and_generate(contents, None).await
    }

    /// 计数已有对话历史，发送一条消息，再计数追加后的完整历史。
    pub async fn tokens_chat(&self) -> Result<ChatTokenReport> {
        let models = self.client.models();
        let history = vec![Content::user("Hi my name is Bob"), Content::model("Hi Bob!")];
        let chat = self.client.chats().create_with_history(
            GENERATION_MODEL,
            GenerateContentConfig::default(),
            history,
        );

        let history = models
            .count_tokens(GENERATION_MODEL, chat.history().await)
            .await?;
        let reply = chat
            .send_message("In one sentence, explain how a computer works to a young child.")
            .await?;

        let mut combined = chat.history().await;
        combined.push(Content::user("What is the meaning of life?"));
        let combined = models.count_tokens(GENERATION_MODEL, combined).await?;

        let report = ChatTokenReport {
            history,
            reply,
            combined,
        };
        tracing::info!("{report}");
        Ok(report)
    }

    /// 以内联数据发送图片。
    pub async fn tokens_multimodal_image_inline(&self) -> Result<TokenReport> {
        let data = tokio::fs::read(self.media_path(ORGAN_JPG)).await?;
        let contents = vec![Content::from_parts(
            vec![
                Part::text("Tell me about this image"),
                Part::inline_data(data, "image/jpeg"),
            ],
            Role::User,
        )];
        self.count_and_generate(contents, None).await
    }

    pub async fn tokens_multimodal_image_file_api(&self) -> Result<TokenReport> {
        let file = self.upload_media(ORGAN_JPG, "image/jpeg").await?;
        let contents = vec![Content::from_parts(
            vec![Part::text("Tell me about this image"), file_part(&file)?],
            Role::User,
        )];
        self.count_and_generate(contents, None).await
    }

    /// 视频需等待处理完成后才能计数。
    pub async fn tokens_multimodal_video_audio_file_api(&self) -> Result<TokenReport> {
        let file = self
            .upload_media_and_wait(BIG_BUCK_BUNNY_MP4, "video/mp4")
            .await?;
        let contents = vec![Content::from_parts(
            vec![Part::text("Tell me about this video"), file_part(&file)?],
            Role::User,
        )];
        self.count_and_generate(contents, None).await
    }

    pub async fn tokens_multimodal_pdf_file_api(&self) -> Result<TokenReport> {
        let file = self.upload_media(TEST_PDF, "application/pdf").await?;
        let contents = vec![Content::from_parts(
            vec![
                Part::text("Give me a summary of this document."),
                file_part(&file)?,
            ],
            Role::User,
        )];
        self.count_and_generate(contents, None).await
    }

    /// System instruction 同样计入 token。
    pub async fn tokens_system_instruction(&self) -> Result<TokenReport> {
        let contents = vec![Content::user("Tell me about the weather today.")];
        let instruction =
            Content::instruction("You are a helpful assistant that speaks like a pirate.");
        self.count_and_generate(contents, Some(instruction)).await
    }

    async fn count_and_generate(
        &self,
        contents: Vec<Content>,
        system_instruction: Option<Content>,
    ) -> Result<TokenReport> {
        let models = self.client.models();
        let count_config = CountTokensConfig {
            system_instruction: system_instruction.clone(),
            ..Default::default()
        };
        let counted = models
            .count_tokens_with_config(GENERATION_MODEL, contents.clone(), count_config)
            .await?;

        let generate_config = GenerateContentConfig {
            system_instruction,
            ..Default::default()
        };
        let response = models
            .generate_content_with_config(GENERATION_MODEL, contents, generate_config)
            .await?;

        let report = TokenReport {
            counted,
            generated: response,
        };
        tracing::info!("{report}");
        tracing::info!("{}", report.generated.text().unwrap_or_default());
        Ok(report)
    }
}
