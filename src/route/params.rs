//! Capability Traits
//!
//! 每个路由提供一对类型：
//! - [`Params`]: 从请求中解析自身
//! - [`Response`]: 将自身渲染到响应

use axum::http::StatusCode;
use serde::Serialize;

use super::context::{Reply, RequestContext};
use crate::errors::AppError;

/// 路由参数
///
/// 每个请求都会通过 `Default` 创建一个全新的实例，再调用 [`Params::parse`] 就地填充。
/// 解析失败时实例状态未定义，不会传给 handler。
///
/// 参数绑定失败按约定归类为 [`ErrorType::ThirdParty`](crate::errors::ErrorType::ThirdParty)。
pub trait Params: Default + Send + 'static {
    fn parse(&mut self, ctx: &RequestContext) -> Result<(), AppError>;
}

/// 路由响应
///
/// `render` 消耗 `self`，每个响应只能渲染一次
pub trait Response: Send + 'static {
    fn render(self, reply: &mut Reply);
}

/// 无参数路由使用的空参数
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyParams;

impl Params for EmptyParams {
    fn parse(&mut self, _ctx: &RequestContext) -> Result<(), AppError> {
        Ok(())
    }
}

/// 直接将任意可序列化值作为 JSON 响应
#[derive(Debug, Clone)]
pub struct JsonResponse<T> {
    status: StatusCode,
    value: T,
}

impl<T> JsonResponse<T> {
    /// 200 OK
    pub fn new(value: T) -> Self {
        Self::with_status(StatusCode::OK, value)
    }

    pub fn with_status(status: StatusCode, value: T) -> Self {
        Self { status, value }
    }
}

impl<T: Serialize + Send + 'static> Response for JsonResponse<T> {
    fn render(self, reply: &mut Reply) {
        reply.json(self.status, &self.value);
    }
}

/// 统一的 `message` + `data` 响应
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize + Send + 'static> Response for Envelope<T> {
    fn render(self, reply: &mut Reply) {
        reply.json(StatusCode::OK, &self);
    }
}
