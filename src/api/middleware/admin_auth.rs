// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

use crate::api::response::ApiError;
use crate::settings::SharedSettings;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::Error;
use actix_web::web::Query;
use actix_web::ResponseError;
use core::future::{ready, Future, Ready};
use core::pin::Pin;
use core::task::{Context, Poll};
use ring::hmac;
use serde::Deserialize;
use std::rc::Rc;

/// Header carrying the admin key
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

#[derive(Deserialize)]
struct AdminKeyQuery {
    #[serde(rename = "adminKey")]
    admin_key: Option<String>,
}

/// Middleware factory for [`AdminAuthMiddleware`]
pub struct AdminAuth {
    settings: SharedSettings,
}

impl AdminAuth {
    pub fn new(settings: SharedSettings) -> Self {
        Self { settings }
    }
}

impl<S> Transform<S, ServiceRequest> for AdminAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Transform = AdminAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminAuthMiddleware {
            service: Rc::new(service),
            settings: self.settings.clone(),
        }))
    }
}

/// Middleware which compares the admin key of a request with the configured one
///
/// The key is taken from the `x-admin-key` header and, if that is missing, from the
/// `adminKey` query parameter. Requests are rejected with `401 Unauthorized` when no admin key
/// is configured at all.
pub struct AdminAuthMiddleware<S> {
    service: Rc<S>,

    settings: SharedSettings,
}

type ResultFuture<O, E> = Pin<Box<dyn Future<Output = Result<O, E>>>>;

impl<S> Service<ServiceRequest> for AdminAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Future = ResultFuture<Self::Response, Self::Error>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let settings = self.settings.load();

        let configured_key = settings.admin.key.as_deref().filter(|key| !key.is_empty());

        let authorized = match (configured_key, provided_key(&req)) {
            (Some(configured_key), Some(provided_key)) => {
                keys_match(configured_key, &provided_key)
            }
            (None, _) => {
                log::warn!("Rejecting admin request, no admin key is configured");
                false
            }
            (Some(_), None) => false,
        };

        if !authorized {
            log::debug!("Invalid admin key for {} {}", req.method(), req.path());

            let response = req.into_response(ApiError::unauthorized().error_response());
            return Box::pin(ready(Ok(response)));
        }

        Box::pin(self.service.call(req))
    }
}

fn provided_key(req: &ServiceRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty());

    if let Some(key) = from_header {
        return Some(key.to_owned());
    }

    Query::<AdminKeyQuery>::from_query(req.query_string())
        .ok()
        .and_then(|query| query.into_inner().admin_key)
        .filter(|key| !key.is_empty())
}

/// Compares both keys in constant time
///
/// The configured key is signed with a fixed HMAC key, [`hmac::verify`] then checks the provided
/// key against that tag. Both keys are the signed messages, so only identical keys match.
fn keys_match(configured_key: &str, provided_key: &str) -> bool {
    const SIGNING_KEY: &[u8] = b"wedding-rsvp admin key comparison";

    let key = hmac::Key::new(hmac::HMAC_SHA256, SIGNING_KEY);
    let tag = hmac::sign(&key, configured_key.as_bytes());

    hmac::verify(&key, provided_key.as_bytes(), tag.as_ref()).is_ok()
}
