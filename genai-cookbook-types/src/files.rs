use serde::{Deserialize, Serialize};

use crate::content::Part;
use crate::enums::{FileSource, FileState};

/// 文件处理失败时的状态详情。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
}

/// 通过 Files API 上传的文件。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// 资源名，形如 `files/abc123`。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// int64 以字符串形式返回。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256_hash: Option<String>,
    /// 在请求中引用该文件时使用的 URI。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<FileState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<FileSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileStatus>,
}

impl File {
    /// 将文件转为可放入请求的 `FileData` Part。
    ///
    /// 缺少 `uri` 时返回 `None`；缺少 `mime_type` 时退化为 `application/octet-stream`。
    #[must_use]
    pub fn as_part(&self) -> Option<Part> {
        let uri = self.uri.as_deref()?;
        let mime_type = self
            .mime_type
            .as_deref()
            .unwrap_or("application/octet-stream");
        Some(Part::file_data(uri, mime_type))
    }

    /// 文件是否已可用。
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == Some(FileState::Active)
    }
}

/// 列出文件请求配置。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// 列出文件响应。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<File>>,
}

/// 上传文件配置。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileConfig {
    /// 期望的资源名（可不带 `files/` 前缀）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_deserializes_processing_state_and_error() {
        let file: File = serde_json::from_str(
            r#"{
                "name": "files/abc",
                "mimeType": "video/mp4",
                "sizeBytes": "1024",
                "state": "FAILED",
                "error": {"code": 3, "message": "unsupported codec"}
            }"#,
        )
        .unwrap();
        assert_eq!(file.state, Some(FileState::Failed));
        assert_eq!(file.size_bytes.as_deref(), Some("1024"));
        assert_eq!(
            file.error.and_then(|e| e.message).as_deref(),
            Some("unsupported codec")
        );
    }

    #[test]
    fn as_part_requires_uri() {
        let mut file = File {
            name: Some("files/abc".into()),
            mime_type: Some("image/jpeg".into()),
            ..Default::default()
        };
        assert!(file.as_part().is_none());

        file.uri = Some("https://example.com/v1beta/files/abc".into());
        let part = file.as_part().unwrap();
        let data = part.file_data_ref().unwrap();
        assert_eq!(data.mime_type, "image/jpeg");
        assert_eq!(data.file_uri, "https://example.com/v1beta/files/abc");
    }

    #[test]
    fn is_active_only_for_active_state() {
        let mut file = File::default();
        assert!(!file.is_active());
        file.state = Some(FileState::Processing);
        assert!(!file.is_active());
        file.state = Some(FileState::Active);
        assert!(file.is_active());
    }
}
