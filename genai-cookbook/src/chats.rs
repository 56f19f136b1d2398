//! Chats API surface.

use std::sync::Arc;

use tokio::sync::RwLock;

use genai_cookbook_types::content::{Content, Part, Role};
use genai_cookbook_types::models::GenerateContentConfig;
use genai_cookbook_types::response::GenerateContentResponse;

use crate::client::ClientInner;
use crate::error::Result;
use crate::models::Models;

#[derive(Clone)]
pub struct Chats {
    pub(crate) inner: Arc<ClientInner>,
}

impl Chats {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// 创建新会话。
    pub fn create(&self, model: impl Into<String>) -> ChatSession {
        self.create_with_history(model, GenerateContentConfig::default(), Vec::new())
    }

    /// 带配置创建会话。
    pub fn create_with_config(
        &self,
        model: impl Into<String>,
        config: GenerateContentConfig,
    ) -> ChatSession {
        self.create_with_history(model, config, Vec::new())
    }

    /// 以已有对话历史创建会话。
    pub fn create_with_history(
        &self,
        model: impl Into<String>,
        config: GenerateContentConfig,
        history: Vec<Content>,
    ) -> ChatSession {
        ChatSession {
            client: self.inner.clone(),
            model: model.into(),
            history: Arc::new(RwLock::new(history)),
            config,
        }
    }
}

/// Chat 会话。
///
/// 同一会话内的消息串行发送：请求期间持有历史的写锁。
#[derive(Clone)]
pub struct ChatSession {
    client: Arc<ClientInner>,
    model: String,
    history: Arc<RwLock<Vec<Content>>>,
    config: GenerateContentConfig,
}

impl ChatSession {
    /// 会话使用的模型。
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// 发送文本消息。
    pub async fn send_message(
        &self,
        message: impl Into<String>,
    ) -> Result<GenerateContentResponse> {
        self.send_content(Content::user(message)).await
    }

    /// 发送多段内容（文本、内联数据、文件引用）。
    pub async fn send_parts(&self, parts: Vec<Part>) -> Result<GenerateContentResponse> {
        self.send_content(Content::from_parts(parts, Role::User))
            .await
    }

    /// 当前对话历史。
    pub async fn history(&self) -> Vec<Content> {
        self.history.read().await.clone()
    }

    async fn send_content(&self, user_content: Content) -> Result<GenerateContentResponse> {
        let mut history = self.history.write().await;
        let pending = history.len();
        history.push(user_content);

        let models = Models::new(self.client.clone());
        let result = models
            .generate_content_with_config(&self.model, history.clone(), self.config.clone())
            .await;

        match result {
            Ok(response) => {
                if let Some(content) = response.first_content() {
                    history.push(content.clone());
                }
                Ok(response)
            }
            Err(err) => {
                history.truncate(pending);
                Err(err)
            }
        }
    }
}
