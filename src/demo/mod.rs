//! Demo Routes
//!
//! 演示如何为路由实现 Params / Response 并通过 wrap 注册

mod greet;
mod ping;
mod routes;

pub use greet::{
    demo1, demo2, Demo1Params, Demo2Params, MessageResponse, INVALID_PARAMS, MODULE_DEMO,
    NEGATIVE_ID,
};
pub use ping::{ping, PingResponse};
pub use routes::create_routes;
