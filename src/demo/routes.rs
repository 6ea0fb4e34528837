//! Demo Routes
//!
//! - /ping    GET   健康检查
//! - /demo1   POST  {"id": 1}     -> {"message": "ID is 1"}
//! - /demo2   POST  {"name": "a"} -> {"message": "Name is a"}

use axum::{
    routing::{get, post},
    Router,
};

use super::greet::{demo1, demo2};
use super::ping::ping;
use crate::route::wrap;

/// 创建演示路由
pub fn create_routes() -> Router {
    Router::new()
        .route("/ping", get(wrap(ping)))
        .route("/demo1", post(wrap(demo1)))
        .route("/demo2", post(wrap(demo2)))
}
