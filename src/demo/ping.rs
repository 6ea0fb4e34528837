//! Ping Handler
//!
//! 健康检查，同时演示无参数路由

use axum::http::StatusCode;
use serde::Serialize;

use crate::errors::AppError;
use crate::route::{EmptyParams, Reply, RequestContext, Response};

/// Ping 响应
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl Response for PingResponse {
    fn render(self, reply: &mut Reply) {
        reply.json(StatusCode::OK, &self);
    }
}

/// Ping endpoint - 健康检查
pub async fn ping(_ctx: RequestContext, _params: EmptyParams) -> Result<PingResponse, AppError> {
    Ok(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
