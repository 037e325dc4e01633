// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

//! Response types of the REST API
//!
//! Successful responses are wrapped as `{"status": "success", "data": ...}`, failed ones as
//! `{"status": "error", "code": ..., "message": ...}`.
mod error;
mod ok;

pub use error::{json_error_handler, path_error_handler, render_internal_error, ApiError};
pub use ok::ApiResponse;

/// The default API Result
pub type DefaultApiResult<T> = Result<ApiResponse<T>, ApiError>;
