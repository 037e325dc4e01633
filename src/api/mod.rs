// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

//! REST API of the RSVP service
//!
//! The public guest endpoints live in [`guests`], everything below `/api/admin` in [`admin`] which
//! is guarded by the [`middleware::admin_auth::AdminAuth`] middleware.
use crate::db::StoreError;
use response::ApiError;

pub mod admin;
pub mod guests;
pub mod health;
pub mod middleware;
pub mod response;

/// Maps a missing guest to a `Not Found` with a readable message
fn guest_not_found(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound => ApiError::not_found().with_message("Guest not found"),
        e => e.into(),
    }
}
