//! Error Codes
//!
//! 错误码格式：`错误类型-业务模块-错误序号`，例如 `2-999-1`

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// 错误类型
///
/// 数值对外可见，必须保持稳定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorType {
    /// Handler 层错误
    Handler = 1,
    /// 第三方库 / 外部依赖错误（参数绑定失败也归为此类）
    ThirdParty = 2,
    /// 数据访问层错误
    Dao = 3,
}

impl ErrorType {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Handler),
            2 => Some(Self::ThirdParty),
            3 => Some(Self::Dao),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// 业务模块编号
///
/// 由各业务区域自行定义并保持唯一，`0` 保留给本 crate 自身
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorModule(pub u32);

impl ErrorModule {
    pub const CORE: ErrorModule = ErrorModule(0);

    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ErrorModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 对外错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    pub ty: ErrorType,
    pub module: ErrorModule,
    pub serial: u32,
}

impl ErrorCode {
    pub const fn new(ty: ErrorType, module: ErrorModule, serial: u32) -> Self {
        Self { ty, module, serial }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.ty, self.module, self.serial)
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 错误码解析失败
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCodeError {
    #[error("error code must have three parts, got: {0}")]
    Shape(String),

    #[error("invalid number in error code: {0}")]
    Number(String),

    #[error("unknown error type: {0}")]
    UnknownType(u32),
}

impl FromStr for ErrorCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        let (Some(ty), Some(module), Some(serial), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseCodeError::Shape(s.to_string()));
        };

        let number = |part: &str| -> Result<u32, ParseCodeError> {
            // 拒绝 "+1" 和 "01" 这类非规范写法，保证解析与 Display 一一对应
            if part.is_empty()
                || !part.bytes().all(|b| b.is_ascii_digit())
                || (part.len() > 1 && part.starts_with('0'))
            {
                return Err(ParseCodeError::Number(part.to_string()));
            }
            part.parse()
                .map_err(|_| ParseCodeError::Number(part.to_string()))
        };

        let ty_value = number(ty)?;
        let ty = u8::try_from(ty_value)
            .ok()
            .and_then(ErrorType::from_u8)
            .ok_or(ParseCodeError::UnknownType(ty_value))?;

        Ok(ErrorCode::new(ty, ErrorModule(number(module)?), number(serial)?))
    }
}
