//! Railhead - 泛型路由适配层
//!
//! 在 axum 路由与业务 handler 之间做统一的参数解析、调用和渲染：
//!
//! 错误 (errors/):
//! - AppError: HTTP 状态码 + `类型-模块-序号` 错误码 + 消息 + 原始错误
//! - ErrorDef: 以 const 集中声明错误
//!
//! 路由 (route/):
//! - Params / Response: 每个路由实现的能力 trait
//! - wrap: 把 `(RequestContext, P) -> Result<R, AppError>` 转换为 axum handler
//!
//! 其他:
//! - config: 多层级配置加载
//! - server: HTTP 服务器与中间件
//! - demo: 演示路由

pub mod config;
pub mod demo;
pub mod errors;
pub mod route;
pub mod server;

pub use config::{load_config, AppConfig};
pub use errors::{AppError, ErrorCode, ErrorDef, ErrorModule, ErrorType};
pub use route::{wrap, Params, Reply, RequestContext, Response};

/// 常用类型的统一导出
///
/// ```ignore
/// use railhead::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{AppError, BoxError, ErrorCode, ErrorDef, ErrorModule, ErrorType};
    pub use crate::route::{
        wrap, EmptyParams, Envelope, JsonResponse, Params, Reply, RequestContext, Response,
    };
}
