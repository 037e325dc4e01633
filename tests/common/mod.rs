// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::web::Data;
use arc_swap::ArcSwap;
use serde_json::Value;
use std::sync::Arc;
use wedding_rsvp::api::middleware::admin_auth::ADMIN_KEY_HEADER;
use wedding_rsvp::db::{GuestStore, MemoryStore};
use wedding_rsvp::settings::{RuntimeEnvironment, Settings, SharedSettings};

pub const ADMIN_KEY: &str = "correct-horse-battery-staple";

pub fn shared_settings(
    admin_key: Option<&str>,
    environment: RuntimeEnvironment,
) -> SharedSettings {
    let mut settings = Settings::default();
    settings.admin.key = admin_key.map(Into::into);
    settings.environment = environment;

    Arc::new(ArcSwap::from_pointee(settings))
}

/// Settings with [`ADMIN_KEY`] configured
pub fn default_settings() -> SharedSettings {
    shared_settings(Some(ADMIN_KEY), RuntimeEnvironment::Production)
}

pub fn memory_store() -> Data<dyn GuestStore> {
    let store: Arc<dyn GuestStore> = Arc::new(MemoryStore::new());
    Data::from(store)
}

/// Adds the correct admin key header to the request
pub fn as_admin(req: TestRequest) -> TestRequest {
    req.insert_header((ADMIN_KEY_HEADER, ADMIN_KEY))
}

/// Sends the request and returns the status with the parsed JSON body
///
/// An empty or non JSON body is returned as [`Value::Null`].
pub async fn send<S, B>(app: &S, req: TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;

    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Creates a guest through the public API and returns the created record
pub async fn create_guest<S, B>(app: &S, body: Value) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, response) = send(
        app,
        TestRequest::post().uri("/api/guests").set_json(body),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{response}");

    response["data"].clone()
}
