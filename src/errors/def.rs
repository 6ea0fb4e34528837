//! Error Definitions
//!
//! 以 `const` 形式集中声明各业务模块的错误，便于维护错误码唯一性：
//!
//! ```ignore
//! const MODULE_USER: ErrorModule = ErrorModule(3);
//!
//! pub const USER_NOT_FOUND: ErrorDef = ErrorDef::new(
//!     StatusCode::NOT_FOUND, ErrorType::Dao, MODULE_USER, 1, "user not found",
//! );
//!
//! return Err(USER_NOT_FOUND.wrap(db_err));
//! ```

use axum::http::StatusCode;

use super::app_error::{AppError, BoxError};
use super::code::{ErrorCode, ErrorModule, ErrorType};

/// 错误定义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorDef {
    status: StatusCode,
    code: ErrorCode,
    message: &'static str,
}

impl ErrorDef {
    pub const fn new(
        status: StatusCode,
        ty: ErrorType,
        module: ErrorModule,
        serial: u32,
        message: &'static str,
    ) -> Self {
        Self {
            status,
            code: ErrorCode::new(ty, module, serial),
            message,
        }
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    pub const fn message(&self) -> &'static str {
        self.message
    }

    /// 使用默认消息，不带原始错误
    pub fn error(&self) -> AppError {
        self.build(self.message, None)
    }

    /// 覆盖默认消息
    pub fn with_message(&self, message: impl Into<String>) -> AppError {
        self.build(message, None)
    }

    /// 使用默认消息并包装原始错误
    pub fn wrap(&self, cause: impl Into<BoxError>) -> AppError {
        self.build(self.message, Some(cause.into()))
    }

    pub fn wrap_with_message(
        &self,
        message: impl Into<String>,
        cause: impl Into<BoxError>,
    ) -> AppError {
        self.build(message, Some(cause.into()))
    }

    fn build(&self, message: impl Into<String>, cause: Option<BoxError>) -> AppError {
        AppError::new(
            self.status,
            self.code.ty,
            self.code.module,
            self.code.serial,
            message,
            cause,
        )
    }
}
