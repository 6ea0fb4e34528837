//! Dispatch Wrapper
//!
//! 将 `(RequestContext, P) -> Result<R, AppError>` 形式的业务 handler
//! 转换为 axum handler。每个请求的生命周期：
//!
//! ```text
//! Created -> Parsing -> ParseFailed                    -> Rendered(error)
//!                    -> ParseOk -> Handling -> Failed  -> Rendered(error)
//!                                           -> Ok      -> Rendered(response)
//! ```
//!
//! 每条路径都恰好渲染一次。

use std::any::type_name;
use std::future::Future;

use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response as HttpResponse};
use futures_util::future::BoxFuture;

use super::context::{Reply, RequestContext};
use super::params::{Params, Response};
use crate::errors::{AppError, ErrorDef, ErrorModule, ErrorType};

/// Response 实现未写入任何内容
pub const RESPONSE_NOT_RENDERED: ErrorDef = ErrorDef::new(
    StatusCode::INTERNAL_SERVER_ERROR,
    ErrorType::Handler,
    ErrorModule::CORE,
    1,
    "response was not rendered",
);

/// 请求体超过 `DefaultBodyLimit`
pub const BODY_TOO_LARGE: ErrorDef = ErrorDef::new(
    StatusCode::PAYLOAD_TOO_LARGE,
    ErrorType::ThirdParty,
    ErrorModule::CORE,
    1,
    "request body too large",
);

/// 读取请求体失败（如客户端中途断开）
pub const BODY_UNREADABLE: ErrorDef = ErrorDef::new(
    StatusCode::BAD_REQUEST,
    ErrorType::ThirdParty,
    ErrorModule::CORE,
    2,
    "failed to read request body",
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    ParseFailed,
    HandleFailed,
    Rendered,
}

/// 包装业务 handler
///
/// ```ignore
/// Router::new().route("/hello", post(wrap(hello)));
///
/// async fn hello(_ctx: RequestContext, p: HelloParams) -> Result<HelloResponse, AppError> {
///     Ok(HelloResponse { message: format!("Hello, {}", p.name) })
/// }
/// ```
///
/// 返回的闭包只持有 handler 本身；参数、响应、错误都在单次调用内创建和销毁，
/// 并发请求之间不共享任何可变状态。
pub fn wrap<P, R, F, Fut>(
    handler: F,
) -> impl Fn(Parts, Body) -> BoxFuture<'static, HttpResponse> + Clone + Send + Sync + 'static
where
    P: Params,
    R: Response,
    F: Fn(RequestContext, P) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<R, AppError>> + Send + 'static,
{
    move |parts: Parts, body: Body| -> BoxFuture<'static, HttpResponse> {
        let handler = handler.clone();
        Box::pin(async move {
            let reply = match buffer_body(parts, body).await {
                Ok(ctx) => dispatch(&handler, ctx).await,
                Err(err) => {
                    let mut reply = Reply::new();
                    err.render(&mut reply);
                    reply
                }
            };
            reply
                .into_inner()
                .unwrap_or_else(|| RESPONSE_NOT_RENDERED.error().into_response())
        })
    }
}

/// 按 `DefaultBodyLimit`（未配置时为 axum 默认值）缓冲请求体
async fn buffer_body(parts: Parts, body: Body) -> Result<RequestContext, AppError> {
    let request = Request::from_parts(parts.clone(), body);
    match Bytes::from_request(request, &()).await {
        Ok(bytes) => Ok(RequestContext::new(parts, bytes)),
        Err(rejection) => Err(body_error(rejection)),
    }
}

fn body_error(rejection: BytesRejection) -> AppError {
    let def = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        BODY_TOO_LARGE
    } else {
        BODY_UNREADABLE
    };
    def.wrap(rejection)
}

/// 执行单次请求：创建参数 -> 解析 -> 调用 handler -> 渲染
///
/// 返回的 [`Reply`] 一定已被写入
pub async fn dispatch<P, R, F, Fut>(handler: &F, ctx: RequestContext) -> Reply
where
    P: Params,
    R: Response,
    F: Fn(RequestContext, P) -> Fut,
    Fut: Future<Output = Result<R, AppError>>,
{
    let mut reply = Reply::new();
    let mut params = P::default();

    let outcome = match params.parse(&ctx) {
        Err(err) => {
            err.render(&mut reply);
            Outcome::ParseFailed
        }
        Ok(()) => match handler(ctx, params).await {
            Err(err) => {
                err.render(&mut reply);
                Outcome::HandleFailed
            }
            Ok(response) => {
                response.render(&mut reply);
                Outcome::Rendered
            }
        },
    };

    if !reply.is_written() {
        tracing::error!(
            response = type_name::<R>(),
            "Response::render wrote nothing"
        );
        RESPONSE_NOT_RENDERED.error().render(&mut reply);
    }

    tracing::debug!(
        params = type_name::<P>(),
        outcome = ?outcome,
        status = ?reply.status(),
        "Request dispatched"
    );

    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::header::CONTENT_TYPE;
    use axum::extract::DefaultBodyLimit;
    use axum::routing::post;
    use axum::Router;
    use serde::{Deserialize, Serialize};
    use tokio::task::JoinSet;
    use tower::util::ServiceExt;

    const MODULE_TEST: ErrorModule = ErrorModule(999);

    const INVALID_PARAMS: ErrorDef = ErrorDef::new(
        StatusCode::BAD_REQUEST,
        ErrorType::ThirdParty,
        MODULE_TEST,
        1,
        "invalid request parameters",
    );

    const NAME_FORBIDDEN: ErrorDef = ErrorDef::new(
        StatusCode::FORBIDDEN,
        ErrorType::Handler,
        MODULE_TEST,
        2,
        "name is not allowed",
    );

    #[derive(Debug, Default, Deserialize)]
    struct TestParams {
        name: String,
    }

    impl Params for TestParams {
        fn parse(&mut self, ctx: &RequestContext) -> Result<(), AppError> {
            *self = ctx.bind_json().map_err(|e| INVALID_PARAMS.wrap(e))?;
            if self.name.is_empty() {
                return Err(INVALID_PARAMS.error());
            }
            Ok(())
        }
    }

    #[derive(Debug, Serialize)]
    struct TestResponse {
        message: String,
    }

    impl Response for TestResponse {
        fn render(self, reply: &mut Reply) {
            reply.json(StatusCode::OK, &self);
        }
    }

    async fn hello(_ctx: RequestContext, params: TestParams) -> Result<TestResponse, AppError> {
        // 让出调度，使并发请求交错执行
        tokio::task::yield_now().await;
        if params.name == "root" {
            return Err(NAME_FORBIDDEN.error());
        }
        Ok(TestResponse {
            message: format!("Hello, {}", params.name),
        })
    }

    fn test_router() -> Router {
        Router::new().route("/test", post(wrap(hello)))
    }

    async fn post_json(app: Router, body: impl Into<String>) -> (StatusCode, serde_json::Value) {
        let body: String = body.into();
        let request = Request::builder()
            .method("POST")
            .uri("/test")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn context(body: &'static str) -> RequestContext {
        let (parts, ()) = Request::builder()
            .method("POST")
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts();
        RequestContext::new(parts, Bytes::from_static(body.as_bytes()))
    }

    #[tokio::test]
    async fn test_wrap_success() {
        let (status, body) = post_json(test_router(), r#"{"name":"World"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"message": "Hello, World"}));
    }

    #[tokio::test]
    async fn test_wrap_parse_failure() {
        let (status, body) = post_json(test_router(), "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({"code": "2-999-1", "message": "invalid request parameters"})
        );
    }

    #[tokio::test]
    async fn test_wrap_handler_failure() {
        let (status, body) = post_json(test_router(), r#"{"name":"root"}"#).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body,
            serde_json::json!({"code": "1-999-2", "message": "name is not allowed"})
        );
    }

    #[tokio::test]
    async fn test_handler_not_called_when_parse_fails() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = move |ctx: RequestContext, params: TestParams| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                hello(ctx, params).await
            }
        };

        let reply = dispatch(&handler, context(r#"{"invalid":"data"}"#)).await;
        assert_eq!(reply.writes(), 1);
        assert_eq!(reply.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let reply = dispatch(&handler, context(r#"{"name":"World"}"#)).await;
        assert_eq!(reply.writes(), 1);
        assert_eq!(reply.status(), Some(StatusCode::OK));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_path_writes_once() {
        for (body, status) in [
            (r#"{"name":"World"}"#, StatusCode::OK),
            (r#"{"name":""}"#, StatusCode::BAD_REQUEST),
            ("", StatusCode::BAD_REQUEST),
            (r#"{"name":"root"}"#, StatusCode::FORBIDDEN),
        ] {
            let reply = dispatch(&hello, context(body)).await;
            assert_eq!(reply.writes(), 1, "body: {body}");
            assert_eq!(reply.status(), Some(status), "body: {body}");
        }
    }

    #[tokio::test]
    async fn test_body_over_limit_renders_structured_error() {
        let app = test_router().layer(DefaultBodyLimit::max(16));

        let (status, body) = post_json(app, r#"{"name":"a-long-name"}"#).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["code"], "2-0-1");
        assert_eq!(body["message"], "request body too large");
        assert_eq!(body.as_object().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_body_within_limit_is_dispatched() {
        let app = test_router().layer(DefaultBodyLimit::max(16));

        let (status, body) = post_json(app, r#"{"name":"ab"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Hello, ab");
    }

    #[tokio::test]
    async fn test_body_read_failure_renders_structured_error() {
        let (parts, ()) = Request::builder()
            .method("POST")
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts();
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "client went away",
        ))];
        let body = Body::from_stream(futures_util::stream::iter(chunks));

        let response = wrap(hello)(parts, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "2-0-2");
        assert_eq!(json["message"], "failed to read request body");
    }

    #[derive(Debug, Default, Deserialize)]
    struct UserPath {
        id: u64,
    }

    #[derive(Debug, Default)]
    struct RenameParams {
        id: u64,
        name: String,
    }

    impl Params for RenameParams {
        fn parse(&mut self, ctx: &RequestContext) -> Result<(), AppError> {
            let path: UserPath = ctx.bind_path().map_err(|e| INVALID_PARAMS.wrap(e))?;
            let body: TestParams = ctx.bind_json().map_err(|e| INVALID_PARAMS.wrap(e))?;
            self.id = path.id;
            self.name = body.name;
            Ok(())
        }
    }

    async fn rename(_ctx: RequestContext, params: RenameParams) -> Result<TestResponse, AppError> {
        Ok(TestResponse {
            message: format!("user {} renamed to {}", params.id, params.name),
        })
    }

    async fn post_to(app: Router, uri: &str, body: &'static str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_path_params_are_bound() {
        let app = Router::new().route("/users/:id", post(wrap(rename)));

        let (status, body) = post_to(app.clone(), "/users/42", r#"{"name":"Ada"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "user 42 renamed to Ada");

        let (status, body) = post_to(app, "/users/abc", r#"{"name":"Ada"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "2-999-1");
    }

    #[derive(Debug)]
    struct Silent;

    impl Response for Silent {
        fn render(self, _reply: &mut Reply) {}
    }

    #[tokio::test]
    async fn test_unrendered_response_becomes_core_error() {
        let handler = |_ctx: RequestContext, _params: TestParams| async { Ok::<_, AppError>(Silent) };
        let app = Router::new().route("/test", post(wrap(handler)));

        let (status, body) = post_json(app, r#"{"name":"World"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({"code": "1-0-1", "message": "response was not rendered"})
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_wrap_concurrent() {
        let app = test_router();
        let num_requests = 1000;
        let mut tasks = JoinSet::new();

        for i in 0..num_requests {
            let valid = app.clone();
            tasks.spawn(async move {
                let name = format!("World-{i}");
                let (status, body) =
                    post_json(valid, serde_json::json!({ "name": &name }).to_string()).await;
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body["message"], format!("Hello, {name}"));
            });

            let invalid = app.clone();
            tasks.spawn(async move {
                let (status, body) = post_json(invalid, r#"{"invalid": "data"}"#).await;
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body["code"], "2-999-1");
                assert_eq!(body["message"], "invalid request parameters");
            });
        }

        let mut finished = 0;
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
            finished += 1;
        }
        assert_eq!(finished, num_requests * 2);
    }
}
