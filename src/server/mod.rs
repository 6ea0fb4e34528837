//! HTTP Server Layer
//!
//! 服务器启动、全局中间件

pub mod http;
pub mod middleware;

pub use self::http::HttpServer;
