//! AppError - 结构化应用错误
//!
//! 错误在出错位置创建一次，之后要么渲染给客户端，要么沿调用栈向上传递，
//! 构造后不可修改。

use std::error::Error as StdError;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use super::code::{ErrorCode, ErrorModule, ErrorType};
use crate::route::Reply;

/// 可跨线程传递的原始错误
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// 未提供原始错误时合成的错误，携带错误码和消息
#[derive(Debug, Error)]
#[error("[{code}] {message}")]
pub struct CodedMessage {
    code: ErrorCode,
    message: String,
}

impl CodedMessage {
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug)]
enum Cause {
    Wrapped(BoxError),
    Synthesized(CodedMessage),
}

/// 错误响应体，固定为 `code` + `message` 两个字段
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: ErrorCode,
    message: &'a str,
}

/// 结构化应用错误
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: ErrorCode,
    message: String,
    cause: Cause,
}

impl AppError {
    /// 创建错误
    ///
    /// `(ty, module, serial)` 三元组需在整个系统内对应唯一的错误条件，
    /// 由调用方保证。
    pub fn new(
        status: StatusCode,
        ty: ErrorType,
        module: ErrorModule,
        serial: u32,
        message: impl Into<String>,
        cause: Option<BoxError>,
    ) -> Self {
        let code = ErrorCode::new(ty, module, serial);
        let message = message.into();
        let cause = match cause {
            Some(err) => Cause::Wrapped(err),
            None => Cause::Synthesized(CodedMessage {
                code,
                message: message.clone(),
            }),
        };

        Self {
            status,
            code,
            message,
            cause,
        }
    }

    /// 创建包装原始错误的错误
    pub fn wrap(
        status: StatusCode,
        ty: ErrorType,
        module: ErrorModule,
        serial: u32,
        message: impl Into<String>,
        cause: impl Into<BoxError>,
    ) -> Self {
        Self::new(status, ty, module, serial, message, Some(cause.into()))
    }

    pub fn http_status(&self) -> StatusCode {
        self.status
    }

    /// 对外错误码，`类型-模块-序号`
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn error_type(&self) -> ErrorType {
        self.code.ty
    }

    pub fn module(&self) -> ErrorModule {
        self.code.module
    }

    pub fn serial(&self) -> u32 {
        self.code.serial
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_code(&self, code: ErrorCode) -> bool {
        self.code == code
    }

    /// 构造时是否提供了原始错误
    pub fn has_cause(&self) -> bool {
        matches!(self.cause, Cause::Wrapped(_))
    }

    /// 原始错误
    ///
    /// 始终有值：未提供原始错误时返回由错误码和消息合成的 [`CodedMessage`]，
    /// 这样错误链遍历不会因为缺少 cause 而中断。
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        match &self.cause {
            Cause::Wrapped(err) => &**err,
            Cause::Synthesized(synthesized) => synthesized,
        }
    }

    /// 沿错误链查找指定类型的错误
    pub fn find_cause<T: StdError + 'static>(&self) -> Option<&T> {
        let first: &(dyn StdError + 'static) = self.cause();
        let mut next = Some(first);
        while let Some(err) = next {
            if let Some(found) = err.downcast_ref::<T>() {
                return Some(found);
            }
            next = err.source();
        }
        None
    }

    /// 将错误渲染到响应
    ///
    /// 响应体只包含 `code` 和 `message`，不会暴露原始错误
    pub fn render(&self, reply: &mut Reply) {
        reply.write(self.to_response());
    }

    fn to_response(&self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                code = %self.code,
                status = self.status.as_u16(),
                error = %self,
                "{}",
                self.message
            );
        } else {
            tracing::warn!(
                code = %self.code,
                status = self.status.as_u16(),
                error = %self,
                "{}",
                self.message
            );
        }

        let body = ErrorBody {
            code: self.code,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Cause::Wrapped(err) => write!(f, "[{}] {}", self.code, err),
            Cause::Synthesized(_) => write!(f, "[{}]", self.code),
        }
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let cause: &(dyn StdError + 'static) = self.cause();
        Some(cause)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_response()
    }
}
