//! Resumable upload protocol shared by the Files API.

use std::future::Future;

use reqwest::header::HeaderMap;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};

/// 单个分片大小（服务端要求除最后一片外为 256 KiB 的整数倍）。
pub const CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// `x-goog-upload-status` 响应头。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Active,
    Final,
    Other(String),
}

impl UploadStatus {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self> {
        let value = headers
            .get("x-goog-upload-status")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::Parse {
                message: "Missing x-goog-upload-status header".into(),
            })?;
        Ok(match value {
            "active" => Self::Active,
            "final" => Self::Final,
            other => Self::Other(other.to_string()),
        })
    }
}

/// 读取上传 URL（`start` 命令的响应头）。
pub fn upload_url_from_headers(headers: &HeaderMap) -> Result<String> {
    headers
        .get("x-goog-upload-url")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
        .ok_or_else(|| Error::Parse {
            message: "Missing x-goog-upload-url header".into(),
        })
}

fn finish<T>(status: UploadStatus, payload: Option<T>) -> Result<T> {
    if status != UploadStatus::Final {
        return Err(Error::Parse {
            message: format!("Upload finalize failed: {status:?}"),
        });
    }
    payload.ok_or_else(|| Error::Parse {
        message: "Upload completed but response body was empty".into(),
    })
}

/// 按 [`CHUNK_SIZE`] 切片读取 `reader` 并逐片交给 `send_chunk`。
///
/// 最后一片携带 `finalize = true`，其响应必须为 `final` 且带有资源体；
/// 中间分片的状态必须为 `active`。
pub async fn upload_stream<R, P, F, Fut>(
    reader: &mut R,
    total_size: u64,
    mut send_chunk: F,
) -> Result<P>
where
    R: AsyncRead + Unpin,
    F: FnMut(Vec<u8>, u64, bool) -> Fut,
    Fut: Future<Output = Result<(UploadStatus, Option<P>)>>,
{
    if total_size == 0 {
        let (status, payload) = send_chunk(Vec::new(), 0, true).await?;
        return finish(status, payload);
    }

    let mut offset: u64 = 0;
    while offset < total_size {
        let remaining = total_size - offset;
        let want = usize::try_from(remaining).map_or(CHUNK_SIZE, |r| r.min(CHUNK_SIZE));
        let chunk = read_chunk(reader, want).await?;
        if chunk.len() < want {
            return Err(Error::Parse {
                message: "Unexpected EOF while uploading file".into(),
            });
        }

        let len = chunk.len() as u64;
        let finalize = offset + len >= total_size;
        let (status, payload) = send_chunk(chunk, offset, finalize).await?;
        if finalize {
            return finish(status, payload);
        }
        if status != UploadStatus::Active {
            return Err(Error::Parse {
                message: format!("Unexpected upload status: {status:?}"),
            });
        }
        offset += len;
    }

    Err(Error::Parse {
        message: "Upload finished without final response".into(),
    })
}

async fn read_chunk<R: AsyncRead + Unpin>(reader: &mut R, want: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; want];
    let mut filled = 0;
    while filled < want {
        let read = reader.read(&mut buffer[filled..]).await?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    buffer.truncate(filled);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use std::sync::{Arc, Mutex};

    #[test]
    fn upload_status_parses_known_values() {
        let mut headers = HeaderMap::new();
        assert!(UploadStatus::from_headers(&headers).is_err());
        headers.insert("x-goog-upload-status", HeaderValue::from_static("final"));
        assert_eq!(
            UploadStatus::from_headers(&headers).unwrap(),
            UploadStatus::Final
        );
        headers.insert("x-goog-upload-status", HeaderValue::from_static("cancelled"));
        assert_eq!(
            UploadStatus::from_headers(&headers).unwrap(),
            UploadStatus::Other("cancelled".into())
        );
    }

    #[test]
    fn finish_rejects_non_final_and_empty_body() {
        let err = finish::<usize>(UploadStatus::Active, Some(1)).err().unwrap();
        assert!(matches!(err, Error::Parse { .. }));
        let err = finish::<usize>(UploadStatus::Final, None).err().unwrap();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[tokio::test]
    async fn empty_payload_sends_single_finalize() {
        let mut reader: &[u8] = &[];
        let result = upload_stream(&mut reader, 0, |chunk, offset, finalize| async move {
            assert!(chunk.is_empty());
            assert_eq!(offset, 0);
            assert!(finalize);
            Ok((UploadStatus::Final, Some(5usize)))
        })
        .await
        .unwrap();
        assert_eq!(result, 5);
    }

    #[tokio::test]
    async fn multi_chunk_upload_tracks_offsets() {
        let data = vec![7u8; CHUNK_SIZE + 3];
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_inner = seen.clone();
        let mut reader: &[u8] = &data;
        let result = upload_stream(
            &mut reader,
            data.len() as u64,
            move |chunk, offset, finalize| {
                let seen_inner = seen_inner.clone();
                async move {
                    seen_inner
                        .lock()
                        .unwrap()
                        .push((chunk.len(), offset, finalize));
                    if finalize {
                        Ok((UploadStatus::Final, Some("done")))
                    } else {
                        Ok((UploadStatus::Active, None))
                    }
                }
            },
        )
        .await
        .unwrap();
        assert_eq!(result, "done");
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(CHUNK_SIZE, 0, false), (3, CHUNK_SIZE as u64, true)]
        );
    }

    #[tokio::test]
    async fn short_reader_is_unexpected_eof() {
        let mut reader: &[u8] = &[1];
        let err = upload_stream(&mut reader, 2, |_chunk, _offset, _finalize| async move {
            Ok((UploadStatus::Final, Some(1usize)))
        })
        .await
        .err()
        .unwrap();
        assert!(matches!(err, Error::Parse { message } if message.contains("EOF")));
    }

    #[tokio::test]
    async fn intermediate_non_active_status_is_rejected() {
        let data = vec![0u8; CHUNK_SIZE + 1];
        let mut reader: &[u8] = &data;
        let err = upload_stream(
            &mut reader,
            data.len() as u64,
            |_chunk, _offset, finalize| async move {
                if finalize {
                    Ok((UploadStatus::Final, Some(1usize)))
                } else {
                    Ok((UploadStatus::Other("cancelled".into()), None))
                }
            },
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, Error::Parse { message } if message.contains("cancelled")));
    }
}
