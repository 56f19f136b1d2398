//! Cookbook snippets.
//!
//! Each snippet is a fixed sequence of calls against the service: upload a
//! media file, call an endpoint, report the result and clean up what it
//! created. They borrow one long-lived [`Client`] and read media from a
//! configurable directory.

use std::path::{Path, PathBuf};

use genai_cookbook_types::caches::CachedContent;
use genai_cookbook_types::content::Part;
use genai_cookbook_types::files::{File, UploadFileConfig};

use crate::client::Client;
use crate::error::{Error, Result};
use crate::poller::PollOptions;

mod caches;
mod embed;
mod files;
mod tokens;

pub use tokens::{ChatTokenReport, TokenReport};

/// 生成与计数使用的模型。
pub const GENERATION_MODEL: &str = "gemini-2.0-flash";
/// 缓存示例使用的模型（需要支持显式缓存的固定版本）。
pub const CACHE_MODEL: &str = "gemini-1.5-flash-001";
pub const EMBEDDING_MODEL: &str = "gemini-embedding-001";

pub const POEM_TXT: &str = "poem.txt";
pub const CAJUN_INSTRUMENTS_JPG: &str = "Cajun_instruments.jpg";
pub const SAMPLE_MP3: &str = "sample.mp3";
pub const BIG_BUCK_BUNNY_MP4: &str = "Big_Buck_Bunny.mp4";
pub const TEST_PDF: &str = "test.pdf";
pub const A11_TXT: &str = "a11.txt";
pub const ORGAN_JPG: &str = "organ.jpg";

/// 全部可运行的示例名称。
pub const SNIPPET_NAMES: &[&str] = &[
    "files_create_text",
    "files_create_image",
    "files_create_audio",
    "files_create_video",
    "files_create_pdf",
    "files_list",
    "files_get",
    "files_delete",
    "cache_create",
    "cache_create_from_name",
    "cache_create_from_chat",
    "cache_delete",
    "cache_get",
    "cache_list",
    "cache_update",
    "tokens_text_only",
    "tokens_chat",
    "tokens_multimodal_image_inline",
    "tokens_multimodal_image_file_api",
    "tokens_multimodal_video_audio_file_api",
    "tokens_multimodal_pdf_file_api",
    "tokens_system_instruction",
    "embed_content",
    "batch_embed_contents",
];

/// 示例集合。
pub struct Snippets<'a> {
    client: &'a Client,
    media_dir: PathBuf,
    poll: PollOptions,
}

impl<'a> Snippets<'a> {
    pub fn new(client: &'a Client, media_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            media_dir: media_dir.into(),
            poll: PollOptions::default(),
        }
    }

    /// 覆盖等待视频处理时的轮询参数。
    #[must_use]
    pub const fn with_poll_options(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    #[must_use]
    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// 按名称运行示例，返回可打印的结果。
    ///
    /// # Errors
    /// 名称未知时返回 [`Error::InvalidConfig`]，其余错误来自示例本身。
    pub async fn run(&self, name: &str) -> Result<String> {
        let output = match name {
            "files_create_text" => self.files_create_text().await?,
            "files_create_image" => self.files_create_image().await?,
            "files_create_audio" => self.files_create_audio().await?,
            "files_create_video" => self.files_create_video().await?,
            "files_create_pdf" => self.files_create_pdf().await?,
            "files_list" => self.files_list().await?.join("\n"),
            "files_get" => format!("{:#?}", self.files_get().await?),
            "files_delete" => match self.files_delete().await? {
                Some(err) => format!("deleted file rejected as expected: {err}"),
                None => "deleted file was still accepted".to_string(),
            },
            "cache_create" => response_text(&self.cache_create().await?),
            "cache_create_from_name" => response_text(&self.cache_create_from_name().await?),
            "cache_create_from_chat" => response_text(&self.cache_create_from_chat().await?),
            "cache_delete" => {
                self.cache_delete().await?;
                "cache deleted".to_string()
            }
            "cache_get" => format!("{:#?}", self.cache_get().await?),
            "cache_list" => self
                .cache_list()
                .await?
                .iter()
                .filter_map(|cache| cache.name.clone())
                .collect::<Vec<_>>()
                .join("\n"),
            "cache_update" => format!("{:#?}", self.cache_update().await?),
            "tokens_text_only" => self.tokens_text_only().await?.to_string(),
            "tokens_chat" => self.tokens_chat().await?.to_string(),
            "tokens_multimodal_image_inline" => {
                self.tokens_multimodal_image_inline().await?.to_string()
            }
            "tokens_multimodal_image_file_api" => {
                self.tokens_multimodal_image_file_api().await?.to_string()
            }
            "tokens_multimodal_video_audio_file_api" => self
                .tokens_multimodal_video_audio_file_api()
                .await?
                .to_string(),
            "tokens_multimodal_pdf_file_api" => {
                self.tokens_multimodal_pdf_file_api().await?.to_string()
            }
            "tokens_system_instruction" => self.tokens_system_instruction().await?.to_string(),
            "embed_content" => serde_json::to_string_pretty(&self.embed_content().await?)?,
            "batch_embed_contents" => {
                serde_json::to_string_pretty(&self.batch_embed_contents().await?)?
            }
            other => {
                return Err(Error::InvalidConfig {
                    message: format!("Unknown snippet: {other}"),
                })
            }
        };
        Ok(output)
    }

    fn media_path(&self, file_name: &str) -> PathBuf {
        self.media_dir.join(file_name)
    }

    async fn upload_media(&self, file_name: &str, mime_type: &str) -> Result<File> {
        let config = UploadFileConfig {
            mime_type: Some(mime_type.to_string()),
            ..Default::default()
        };
        let file = self
            .client
            .files()
            .upload_from_path_with_config(self.media_path(file_name), config)
            .await?;
        tracing::info!(
            name = file.name.as_deref().unwrap_or_default(),
            uri = file.uri.as_deref().unwrap_or_default(),
            "uploaded {file_name}"
        );
        Ok(file)
    }

    /// 上传后轮询直到 ACTIVE。
    async fn upload_media_and_wait(&self, file_name: &str, mime_type: &str) -> Result<File> {
        let file = self.upload_media(file_name, mime_type).await?;
        self.client.files().wait_until_active(&file, self.poll).await
    }

    /// 删除示例创建的缓存，失败只记录日志。
    async fn cleanup_cache(&self, name: &str) {
        if let Err(err) = self.client.caches().delete(name).await {
            tracing::warn!(cache = name, error = %err, "failed to delete cache");
        }
    }
}

fn file_part(file: &File) -> Result<Part> {
    file.as_part().ok_or_else(|| Error::Parse {
        message: format!(
            "Uploaded file {} has no uri",
            file.name.as_deref().unwrap_or("<unnamed>")
        ),
    })
}

fn cache_name(cache: &CachedContent) -> Result<String> {
    cache.name.clone().ok_or_else(|| Error::Parse {
        message: "Cached content response has no name".into(),
    })
}

fn response_text(response: &genai_cookbook_types::response::GenerateContentResponse) -> String {
    response.text().unwrap_or_default()
}
