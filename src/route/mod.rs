//! Route Adapter
//!
//! 业务 handler 与 axum 之间的适配层：
//! - Params / Response: 每个路由需要实现的能力 trait
//! - RequestContext / Reply: 请求输入与响应输出
//! - wrap / dispatch: 泛型分发包装器

mod context;
mod params;
mod wrap;

pub use context::{BindError, Reply, RequestContext};
pub use params::{EmptyParams, Envelope, JsonResponse, Params, Response};
pub use wrap::{dispatch, wrap, BODY_TOO_LARGE, BODY_UNREADABLE, RESPONSE_NOT_RENDERED};
