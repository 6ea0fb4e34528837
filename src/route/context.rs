//! Request Context
//!
//! - [`RequestContext`]: 单个请求的只读视图（请求头部 + 已缓冲的 body）
//! - [`Reply`]: 单个请求的输出槽，只接受一次写入

use axum::body::Bytes;
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::header::AsHeaderName;
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// 参数绑定错误
#[derive(Debug, Error)]
pub enum BindError {
    #[error("request body is empty")]
    EmptyBody,

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid query string: {0}")]
    Query(String),

    #[error("invalid path parameters: {0}")]
    Path(String),
}

/// 请求上下文
///
/// 保留完整的请求头部（含路由写入的 extensions），body 已在分发前缓冲
#[derive(Debug, Clone)]
pub struct RequestContext {
    parts: Parts,
    body: Bytes,
}

impl RequestContext {
    pub fn new(parts: Parts, body: Bytes) -> Self {
        Self { parts, body }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    /// 获取请求头，非 ASCII 值视为不存在
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// 将 JSON 请求体绑定为 `T`
    pub fn bind_json<T: DeserializeOwned>(&self) -> Result<T, BindError> {
        if self.body.is_empty() {
            return Err(BindError::EmptyBody);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// 将 query string 绑定为 `T`
    pub fn bind_query<T: DeserializeOwned>(&self) -> Result<T, BindError> {
        Query::<T>::try_from_uri(&self.parts.uri)
            .map(|Query(value)| value)
            .map_err(|rejection| BindError::Query(rejection.body_text()))
    }

    /// 将路由匹配到的路径参数（如 `/users/:id`）绑定为 `T`
    pub fn bind_path<T: DeserializeOwned + Send>(&self) -> Result<T, BindError> {
        let mut parts = self.parts.clone();
        // Path 只读取 extensions 中的路由参数，不会挂起
        let extracted = Path::<T>::from_request_parts(&mut parts, &())
            .now_or_never()
            .ok_or_else(|| BindError::Path("path extraction did not complete".to_string()))?;

        extracted
            .map(|Path(value)| value)
            .map_err(|rejection| BindError::Path(rejection.body_text()))
    }
}

/// 响应输出槽
///
/// 每个请求只允许写入一次，重复写入会被忽略并记录日志
#[derive(Debug, Default)]
pub struct Reply {
    response: Option<Response>,
    writes: usize,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以 JSON 写入响应
    pub fn json<T: Serialize>(&mut self, status: StatusCode, body: &T) {
        self.write((status, Json(body)));
    }

    /// 写入任意响应
    pub fn write(&mut self, response: impl IntoResponse) {
        self.writes += 1;
        if self.response.is_some() {
            tracing::warn!(writes = self.writes, "Reply already written, ignoring extra write");
            return;
        }
        self.response = Some(response.into_response());
    }

    /// 写入次数（包括被忽略的重复写入）
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn is_written(&self) -> bool {
        self.response.is_some()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.response.as_ref().map(|r| r.status())
    }

    pub fn into_inner(self) -> Option<Response> {
        self.response
    }
}
