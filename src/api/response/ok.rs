// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

//! Success response types of the REST API
//!
//! These all implement the [`Responder`] trait.
use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder};
use serde::Serialize;
use std::borrow::Cow;

#[derive(Debug, Serialize)]
struct SuccessBody<'a, T: Serialize> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    data: &'a T,
}

/// A JSON success response wrapping `data` in the common envelope
#[derive(Debug, Clone)]
pub struct ApiResponse<T: Serialize> {
    status: StatusCode,
    message: Option<Cow<'static, str>>,
    count: Option<usize>,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates new [`ApiResponse`] with `200 OK`
    pub fn new(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message: None,
            count: None,
            data,
        }
    }

    /// Respond with `201 Created` instead
    pub fn created(mut self) -> Self {
        self.status = StatusCode::CREATED;
        self
    }

    pub fn with_message<M>(mut self, message: M) -> Self
    where
        M: Into<Cow<'static, str>>,
    {
        self.message = Some(message.into());
        self
    }

    /// Adds the amount of returned items
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl<T: Serialize> Responder for ApiResponse<T> {
    type Body = BoxBody;

    fn respond_to(self, _: &actix_web::HttpRequest) -> HttpResponse {
        let body = SuccessBody {
            status: "success",
            message: self.message.as_deref(),
            count: self.count,
            data: &self.data,
        };

        match serde_json::to_string(&body) {
            Ok(body) => HttpResponse::build(self.status)
                .content_type(mime::APPLICATION_JSON)
                .body(body),
            Err(err) => {
                HttpResponse::from_error(actix_web::error::JsonPayloadError::Serialize(err))
            }
        }
    }
}
