// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

//! Error responses of the REST API
use crate::db::StoreError;
use crate::settings::Settings;
use actix_web::body::EitherBody;
use actix_web::dev::ServiceResponse;
use actix_web::error::{JsonPayloadError, PathError};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::web::Data;
use actix_web::{body::BoxBody, HttpRequest, HttpResponse, ResponseError};
use arc_swap::ArcSwap;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Error handler for the actix JSON extractor
///
/// Gets called when a incoming request results in an [`JsonPayloadError`].
/// Returns a `Bad Request` [`ApiError`] error with an appropriate error code and message.
pub fn json_error_handler(err: JsonPayloadError, _: &HttpRequest) -> actix_web::error::Error {
    let error_code = match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "payload_overflow"
        }
        JsonPayloadError::ContentType => "invalid_content_type",
        JsonPayloadError::Deserialize(_) | JsonPayloadError::Serialize(_) => "invalid_json",
        _ => "invalid_payload",
    };
    ApiError::bad_request()
        .with_code(error_code)
        .with_message(err.to_string())
        .into()
}

/// Error handler for the actix path extractor
///
/// Only guest ids are parsed from paths. An id which cannot be parsed cannot exist either, so
/// this responds the same way as for an unknown guest.
pub fn path_error_handler(err: PathError, _: &HttpRequest) -> actix_web::error::Error {
    log::debug!("Unable to parse path segment, {}", err);

    ApiError::not_found().with_message("Guest not found").into()
}

#[derive(Debug, Clone, Serialize)]
struct ErrorBody {
    // Always "error"
    status: &'static str,
    // Machine readable error code
    code: Cow<'static, str>,
    // Human readable message
    message: Cow<'static, str>,
    // Details of an internal failure, removed outside of development
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// The default REST API error
///
/// Can be build via the associated functions to represent various HTTP errors. Each
/// HTTP error has their default error code and message that get send in a JSON body.
/// The error code and message can be overwritten when creating an error.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new_standard<T>(status: StatusCode, code: T, message: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        Self {
            status,
            body: ErrorBody {
                status: "error",
                code: code.into(),
                message: message.into(),
                error: None,
            },
        }
    }

    /// Override the default code for an error
    pub fn with_code<T>(mut self, code: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.body.code = code.into();
        self
    }

    /// Override the default message for an error
    pub fn with_message<T>(mut self, message: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.body.message = message.into();
        self
    }

    /// Attach details about an internal failure
    pub fn with_detail<T>(mut self, detail: T) -> Self
    where
        T: Into<String>,
    {
        self.body.error = Some(detail.into());
        self
    }

    /// Create a new 400 Bad Request error
    pub fn bad_request() -> Self {
        Self::new_standard(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "Invalid request due to malformed syntax",
        )
    }

    /// Create a new 401 Unauthorized error
    pub fn unauthorized() -> Self {
        Self::new_standard(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Unauthorized access",
        )
    }

    /// Create a new 404 Not Found error
    pub fn not_found() -> Self {
        Self::new_standard(
            StatusCode::NOT_FOUND,
            "not_found",
            "A requested resource could not be found",
        )
    }

    /// Create a new 500 Internal Server Error
    pub fn internal() -> Self {
        Self::new_standard(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_server_error",
            "Something went wrong!",
        )
    }

    fn has_detail(&self) -> bool {
        self.body.error.is_some()
    }

    fn without_detail(mut self) -> Self {
        self.body.error = None;
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status={}, code={}, message={}",
            self.status, self.body.code, self.body.message
        )?;

        if let Some(error) = &self.body.error {
            write!(f, ", error={error}")?;
        }

        Ok(())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let mut response = HttpResponse::new(self.status_code());

        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        match serde_json::to_string(&self.body) {
            Ok(body) => response.set_body(BoxBody::new(body)),
            Err(e) => {
                log::error!("Unable to serialize API error body, {}", e);
                HttpResponse::InternalServerError().finish()
            }
        }
    }
}

impl From<crate::BlockingError> for ApiError {
    fn from(e: crate::BlockingError) -> Self {
        log::error!("REST API threw internal error from blocking error: {}", e);
        Self::internal().with_detail(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(store_error: StoreError) -> Self {
        match store_error {
            StoreError::Validation(message) => Self::bad_request()
                .with_code("validation_failed")
                .with_message(message),
            StoreError::InvalidArgument(message) => Self::bad_request()
                .with_code("invalid_argument")
                .with_message(message),
            StoreError::NotFound => Self::not_found(),
            e @ (StoreError::Database(_) | StoreError::Pool(_)) => {
                log::error!("REST API threw internal error from store error: {}", e);
                Self::internal()
                    .with_code("store_error")
                    .with_message(e.to_string())
            }
        }
    }
}

/// Error handler for `500 Internal Server Error` responses
///
/// Every internal error is answered with the JSON error body. The `error` detail only leaves
/// the service when the runtime environment is `development`.
pub fn render_internal_error<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let development = res
        .request()
        .app_data::<Data<ArcSwap<Settings>>>()
        .map(|settings| !settings.load().environment.is_production())
        .unwrap_or(false);

    let replacement = match res.response().error() {
        Some(error) => match error.as_error::<ApiError>() {
            Some(api_error) if !development && api_error.has_detail() => {
                Some(api_error.clone().without_detail())
            }
            Some(_) => None,
            None if development => Some(ApiError::internal().with_detail(error.to_string())),
            None => Some(ApiError::internal()),
        },
        None => None,
    };

    let res: ServiceResponse<EitherBody<B>> = match replacement {
        Some(api_error) => {
            let (req, _) = res.into_parts();
            ServiceResponse::new(req, api_error.error_response()).map_into_right_body()
        }
        None => res.map_into_left_body(),
    };

    Ok(ErrorHandlerResponse::Response(res))
}
