//! Files API surface.

use std::path::Path;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use genai_cookbook_types::files::{File, ListFilesConfig, ListFilesResponse, UploadFileConfig};
use serde_json::Value;
use tokio::io::AsyncRead;

use crate::client::ClientInner;
use crate::error::{Error, Result};
use crate::poller::{PollOptions, ReadinessPoller, StatusSource};
use crate::upload::{upload_stream, upload_url_from_headers, UploadStatus};

#[derive(Clone)]
pub struct Files {
    pub(crate) inner: Arc<ClientInner>,
}

impl Files {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// 上传文件（直接上传字节数据）。
    pub async fn upload(&self, data: Vec<u8>, mime_type: impl Into<String>) -> Result<File> {
        let config = UploadFileConfig {
            mime_type: Some(mime_type.into()),
            ..UploadFileConfig::default()
        };
        self.upload_with_config(data, config).await
    }

    /// 上传文件（自定义配置）。
    ///
    /// # Errors
    /// 未指定 `mime_type` 时返回 [`Error::InvalidConfig`]。
    pub async fn upload_with_config(
        &self,
        data: Vec<u8>,
        config: UploadFileConfig,
    ) -> Result<File> {
        let mime_type = config
            .mime_type
            .clone()
            .ok_or_else(|| Error::InvalidConfig {
                message: "mime_type is required when uploading raw bytes".into(),
            })?;
        let size_bytes = data.len() as u64;
        let file = build_upload_file(config, size_bytes, &mime_type);
        let upload_url = self
            .start_resumable_upload(&file, size_bytes, &mime_type, None)
            .await?;
        let mut reader: &[u8] = &data;
        self.upload_chunks(&upload_url, &mut reader, size_bytes)
            .await
    }

    /// 从文件路径上传，MIME 类型按扩展名推断。
    pub async fn upload_from_path(&self, path: impl AsRef<Path>) -> Result<File> {
        self.upload_from_path_with_config(path, UploadFileConfig::default())
            .await
    }

    /// 从文件路径上传（自定义配置，显式 `mime_type` 优先）。
    pub async fn upload_from_path_with_config(
        &self,
        path: impl AsRef<Path>,
        mut config: UploadFileConfig,
    ) -> Result<File> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(Error::InvalidConfig {
                message: format!("{} is not a valid file path", path.display()),
            });
        }

        let size_bytes = metadata.len();
        let mime_type = config.mime_type.take().unwrap_or_else(|| {
            mime_guess::from_path(path)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });

        let file_name = path.file_name().and_then(|name| name.to_str());
        let file = build_upload_file(config, size_bytes, &mime_type);
        let upload_url = self
            .start_resumable_upload(&file, size_bytes, &mime_type, file_name)
            .await?;
        let mut handle = tokio::fs::File::open(path).await?;
        let uploaded = self
            .upload_chunks(&upload_url, &mut handle, size_bytes)
            .await?;
        tracing::debug!(
            path = %path.display(),
            name = uploaded.name.as_deref().unwrap_or_default(),
            mime_type = %mime_type,
            size_bytes,
            "uploaded file"
        );
        Ok(uploaded)
    }

    /// 列出文件。
    pub async fn list(&self) -> Result<ListFilesResponse> {
        self.list_with_config(ListFilesConfig::default()).await
    }

    /// 列出文件（自定义配置）。
    pub async fn list_with_config(&self, config: ListFilesConfig) -> Result<ListFilesResponse> {
        let url = build_files_list_url(&self.inner, &config)?;
        let request = self.inner.http.get(url);
        let response = self.inner.send(request).await?;
        if !response.status().is_success() {
            return Err(Error::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json::<ListFilesResponse>().await?)
    }

    /// 列出所有文件（自动翻页）。
    pub async fn all(&self) -> Result<Vec<File>> {
        let mut config = ListFilesConfig::default();
        let mut files = Vec::new();
        loop {
            let response = self.list_with_config(config.clone()).await?;
            if let Some(items) = response.files {
                files.extend(items);
            }
            match response.next_page_token {
                Some(token) if !token.is_empty() => {
                    config.page_token = Some(token);
                }
                _ => break,
            }
        }
        Ok(files)
    }

    /// 获取文件元数据。接受 `abc`、`files/abc` 或完整 URI。
    pub async fn get(&self, name_or_uri: impl AsRef<str>) -> Result<File> {
        let file_name = normalize_file_name(name_or_uri.as_ref())?;
        let url = build_file_url(&self.inner, &file_name);
        let request = self.inner.http.get(url);
        let response = self.inner.send(request).await?;
        if !response.status().is_success() {
            return Err(Error::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json::<File>().await?)
    }

    /// 删除文件。
    pub async fn delete(&self, name_or_uri: impl AsRef<str>) -> Result<()> {
        let file_name = normalize_file_name(name_or_uri.as_ref())?;
        let url = build_file_url(&self.inner, &file_name);
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

    /// 轮询直到文件状态变为 ACTIVE。
    ///
    /// # Errors
    /// 见 [`ReadinessPoller::wait`]。
    pub async fn wait_for_active(
        &self,
        name_or_uri: impl AsRef<str>,
        options: PollOptions,
    ) -> Result<File> {
        let name = format!("files/{}", normalize_file_name(name_or_uri.as_ref())?);
        ReadinessPoller::new(self, options).wait(&name).await
    }

    /// 以上传返回的句柄为起点轮询。句柄里的状态不会被采信，总是先重新查询。
    pub async fn wait_until_active(&self, file: &File, options: PollOptions) -> Result<File> {
        let name = file
            .name
            .as_deref()
            .or(file.uri.as_deref())
            .ok_or_else(|| Error::InvalidConfig {
                message: "File has neither name nor uri".into(),
            })?;
        self.wait_for_active(name, options).await
    }

    async fn start_resumable_upload(
        &self,
        file: &File,
        size_bytes: u64,
        mime_type: &str,
        file_name: Option<&str>,
    ) -> Result<String> {
        let url = build_files_upload_url(&self.inner);
        let mut request = self
            .inner
            .http
            .post(url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header(
                "X-Goog-Upload-Header-Content-Length",
                size_bytes.to_string(),
            )
            .header("X-Goog-Upload-Header-Content-Type", mime_type);

        if let Some(file_name) = file_name {
            request = request.header("X-Goog-Upload-File-Name", file_name);
        }

        let request = request.json(&serde_json::json!({ "file": file }));
        let response = self.inner.send(request).await?;
        if !response.status().is_success() {
            return Err(Error::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        upload_url_from_headers(response.headers())
    }

    async fn upload_chunks<R>(&self, upload_url: &str, reader: &mut R, total: u64) -> Result<File>
    where
        R: AsyncRead + Unpin,
    {
        upload_stream(reader, total, move |chunk, offset, finalize| {
            self.send_upload_chunk(upload_url, chunk, offset, finalize)
        })
        .await
    }

    async fn send_upload_chunk(
        &self,
        upload_url: &str,
        chunk: Vec<u8>,
        offset: u64,
        finalize: bool,
    ) -> Result<(UploadStatus, Option<File>)> {
        let command = if finalize {
            "upload, finalize"
        } else {
            "upload"
        };
        let request = self
            .inner
            .http
            .post(upload_url)
            .header("X-Goog-Upload-Command", command)
            .header("X-Goog-Upload-Offset", offset.to_string())
            .body(chunk);
        let response = self.inner.send(request).await?;
        if !response.status().is_success() {
            return Err(Error::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let status = UploadStatus::from_headers(response.headers())?;
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok((status, None));
        }

        let value: Value = serde_json::from_slice(&body)?;
        let file_value = value.get("file").cloned().unwrap_or(value);
        Ok((status, Some(serde_json::from_value(file_value)?)))
    }
}

impl StatusSource<File> for Files {
    fn fetch_status<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<File>> {
        Box::pin(self.get(name))
    }
}

fn build_upload_file(config: UploadFileConfig, size_bytes: u64, mime_type: &str) -> File {
    File {
        name: config.name.as_deref().map(normalize_upload_name),
        display_name: config.display_name,
        mime_type: Some(mime_type.to_string()),
        size_bytes: Some(size_bytes.to_string()),
        ..File::default()
    }
}

fn normalize_upload_name(name: &str) -> String {
    if name.starts_with("files/") {
        name.to_string()
    } else {
        format!("files/{name}")
    }
}

/// 提取文件 ID（不含 `files/` 前缀）。
pub(crate) fn normalize_file_name(value: &str) -> Result<String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        let marker = "files/";
        let start = value.find(marker).ok_or_else(|| Error::InvalidConfig {
            message: format!("Could not find 'files/' in URI: {value}"),
        })?;
        let name: String = value[start + marker.len()..]
            .chars()
            .take_while(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
            .collect();
        if name.is_empty() {
            return Err(Error::InvalidConfig {
                message: format!("Could not extract file name from URI: {value}"),
            });
        }
        Ok(name)
    } else {
        let name = value.strip_prefix("files/").unwrap_or(value);
        if name.is_empty() {
            return Err(Error::InvalidConfig {
                message: "File name must not be empty".into(),
            });
        }
        Ok(name.to_string())
    }
}

fn build_files_upload_url(inner: &ClientInner) -> String {
    let base = &inner.api_client.base_url;
    let version = &inner.api_client.api_version;
    format!("{base}upload/{version}/files")
}

fn build_files_list_url(inner: &ClientInner, config: &ListFilesConfig) -> Result<String> {
    let base = &inner.api_client.base_url;
    let version = &inner.api_client.api_version;
    let mut url = reqwest::Url::parse(&format!("{base}{version}/files")).map_err(|err| {
        Error::InvalidConfig {
            message: err.to_string(),
        }
    })?;
    {
        let mut pairs = url.query_pairs_mut();
        if let Some(page_size) = config.page_size {
            pairs.append_pair("pageSize", &page_size.to_string());
        }
        if let Some(page_token) = &config.page_token {
            pairs.append_pair("pageToken", page_token);
        }
    }
    Ok(url.to_string())
}

fn build_file_url(inner: &ClientInner, name: &str) -> String {
    let base = &inner.api_client.base_url;
    let version = &inner.api_client.api_version;
    format!("{base}{version}/files/{name}")
}
