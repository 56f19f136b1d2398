//! Per-request overrides shared by the API surfaces.

use std::time::Duration;

use genai_cookbook_types::http::HttpOptions;
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::Value;

use crate::client::{normalize_base_url, ClientInner};
use crate::error::{Error, Result};

/// 解析本次请求使用的基础 URL 与 API 版本。
pub(crate) fn resolve_endpoint(
    inner: &ClientInner,
    http_options: Option<&HttpOptions>,
) -> (String, String) {
    let base = http_options
        .and_then(|opts| opts.base_url.as_deref())
        .map_or_else(|| inner.api_client.base_url.clone(), normalize_base_url);
    let version = http_options
        .and_then(|opts| opts.api_version.clone())
        .unwrap_or_else(|| inner.api_client.api_version.clone());
    (base, version)
}

/// 应用超时（毫秒）与额外请求头。
pub(crate) fn apply_http_options(
    mut request: reqwest::RequestBuilder,
    http_options: Option<&HttpOptions>,
) -> Result<reqwest::RequestBuilder> {
    let Some(options) = http_options else {
        return Ok(request);
    };
    if let Some(timeout) = options.timeout {
        request = request.timeout(Duration::from_millis(timeout));
    }
    for (key, value) in options.headers.iter().flatten() {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| Error::InvalidConfig {
            message: format!("Invalid header name: {key}"),
        })?;
        let value = HeaderValue::from_str(value).map_err(|_| Error::InvalidConfig {
            message: format!("Invalid header value for {key}"),
        })?;
        request = request.header(name, value);
    }
    Ok(request)
}

/// 将 `extra_body` 中的字段合并进 JSON 请求体（同名字段覆盖）。
pub(crate) fn merge_extra_body(body: &mut Value, http_options: &HttpOptions) -> Result<()> {
    let Some(extra) = &http_options.extra_body else {
        return Ok(());
    };
    match (body, extra) {
        (Value::Object(body_map), Value::Object(extra_map)) => {
            for (key, value) in extra_map {
                body_map.insert(key.clone(), value.clone());
            }
            Ok(())
        }
        _ => Err(Error::InvalidConfig {
            message: "HttpOptions.extra_body must be an object".into(),
        }),
    }
}
