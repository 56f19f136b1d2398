//! Error definitions for the cookbook client.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP client error: {source}")]
    HttpClient {
        #[from]
        source: reqwest::Error,
    },

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// 服务端报告资源处理失败，不会重试。
    #[error("Resource {name} failed processing (state {state}){}", format_service_message(.message))]
    ResourceProcessingFailed {
        name: String,
        state: String,
        message: Option<String>,
    },

    /// 在等待预算内资源未就绪。
    #[error("Resource {name} not ready after {attempts} attempts in {elapsed:?} (last state {last_state})")]
    ResourceProcessingTimedOut {
        name: String,
        attempts: u32,
        elapsed: Duration,
        last_state: String,
    },

    /// 轮询过程中查询状态失败。
    #[error("Status query for {name} failed: {source}")]
    TransientQuery {
        name: String,
        #[source]
        source: Box<Error>,
    },
}

fn format_service_message(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl Error {
    /// 服务端返回的 HTTP 状态码（包括包装在 `TransientQuery` 中的错误）。
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::TransientQuery { source, .. } => source.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn processing_failed_message_includes_service_detail() {
        let err = Error::ResourceProcessingFailed {
            name: "files/abc".into(),
            state: "FAILED".into(),
            message: Some("unsupported codec".into()),
        };
        assert_eq!(
            err.to_string(),
            "Resource files/abc failed processing (state FAILED): unsupported codec"
        );

        let err = Error::ResourceProcessingFailed {
            name: "files/abc".into(),
            state: "FAILED".into(),
            message: None,
        };
        assert_eq!(
            err.to_string(),
            "Resource files/abc failed processing (state FAILED)"
        );
    }

    #[test]
    fn transient_query_preserves_source() {
        let err = Error::TransientQuery {
            name: "files/abc".into(),
            source: Box::new(Error::ApiError {
                status: 503,
                message: "unavailable".into(),
            }),
        };
        assert_eq!(err.status(), Some(503));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("unavailable"));
    }
}
