//! Demo Handlers

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, ErrorDef, ErrorModule, ErrorType};
use crate::route::{Params, Reply, RequestContext, Response};

pub const MODULE_DEMO: ErrorModule = ErrorModule(1);

/// 请求体无法绑定
pub const INVALID_PARAMS: ErrorDef = ErrorDef::new(
    StatusCode::BAD_REQUEST,
    ErrorType::ThirdParty,
    MODULE_DEMO,
    1,
    "invalid request parameters",
);

/// id 为负数
pub const NEGATIVE_ID: ErrorDef = ErrorDef::new(
    StatusCode::UNPROCESSABLE_ENTITY,
    ErrorType::Handler,
    MODULE_DEMO,
    2,
    "id must not be negative",
);

fn bind<T: serde::de::DeserializeOwned>(ctx: &RequestContext) -> Result<T, AppError> {
    ctx.bind_json()
        .map_err(|e| INVALID_PARAMS.wrap_with_message(e.to_string(), e))
}

#[derive(Debug, Default, Deserialize)]
pub struct Demo1Params {
    pub id: i64,
}

impl Params for Demo1Params {
    fn parse(&mut self, ctx: &RequestContext) -> Result<(), AppError> {
        *self = bind(ctx)?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Demo2Params {
    pub name: String,
}

impl Params for Demo2Params {
    fn parse(&mut self, ctx: &RequestContext) -> Result<(), AppError> {
        *self = bind(ctx)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl Response for MessageResponse {
    fn render(self, reply: &mut Reply) {
        reply.json(StatusCode::OK, &self);
    }
}

pub async fn demo1(_ctx: RequestContext, params: Demo1Params) -> Result<MessageResponse, AppError> {
    if params.id < 0 {
        return Err(NEGATIVE_ID.error());
    }
    Ok(MessageResponse {
        message: format!("ID is {}", params.id),
    })
}

pub async fn demo2(_ctx: RequestContext, params: Demo2Params) -> Result<MessageResponse, AppError> {
    Ok(MessageResponse {
        message: format!("Name is {}", params.name),
    })
}
