// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

use actix_web::{get, HttpResponse};
use chrono::Utc;
use serde_json::json;

/// API Endpoint *GET /health*
///
/// Always answers with `200 OK` as long as the server accepts requests.
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "message": "Server is running",
        "timestamp": Utc::now(),
    }))
}
