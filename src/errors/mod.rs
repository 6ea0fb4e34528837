//! Error Taxonomy
//!
//! 结构化错误：HTTP 状态码 + `类型-模块-序号` 错误码 + 消息 + 可选的原始错误
//!
//! 错误类型：
//! - 1: Handler 层
//! - 2: 第三方库 / 外部依赖
//! - 3: 数据访问层

mod app_error;
mod code;
mod def;

pub use app_error::{AppError, BoxError, CodedMessage};
pub use code::{ErrorCode, ErrorModule, ErrorType, ParseCodeError};
pub use def::ErrorDef;
