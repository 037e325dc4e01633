// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the admin endpoints
//!
//! All endpoints in here are mounted below `/api/admin` and require the admin key.
use super::guest_not_found;
use super::response::{ApiError, ApiResponse, DefaultApiResult};
use crate::db::{Guest, GuestId, GuestOrder, GuestPatch, GuestStore, RsvpStatus};
use crate::report::{self, GuestReport, RecentResponse, RsvpSummary};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web::{Data, Path};
use actix_web::{delete, get, HttpResponse};
use serde::Serialize;

/// Amount of answers shown on the dashboard
const RECENT_RESPONSES: usize = 5;

/// Response of *GET /admin/dashboard*
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: RsvpSummary,
    pub recent_responses: Vec<RecentResponse>,
}

/// Response of *DELETE /admin/guests-all/delete*
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedGuests {
    pub deleted_count: u64,
}

/// API Endpoint *GET /admin/dashboard*
///
/// Returns the RSVP numbers together with the latest answers
#[get("/dashboard")]
pub async fn dashboard(store: Data<dyn GuestStore>) -> DefaultApiResult<Dashboard> {
    let (counts, recent) = crate::block(move || {
        let counts = store.count_by_status()?;
        let recent = store.find_recent_responses(RECENT_RESPONSES)?;

        Ok::<_, ApiError>((counts, recent))
    })
    .await??;

    Ok(ApiResponse::new(Dashboard {
        stats: counts.into(),
        recent_responses: recent.into_iter().map(Into::into).collect(),
    }))
}

/// API Endpoint *GET /admin/stats*
#[get("/stats")]
pub async fn stats(store: Data<dyn GuestStore>) -> DefaultApiResult<RsvpSummary> {
    let counts = crate::block(move || store.count_by_status()).await??;

    Ok(ApiResponse::new(counts.into()))
}

/// API Endpoint *GET /admin/guests*
///
/// Returns all guests, latest answers first
#[get("/guests")]
pub async fn guests(store: Data<dyn GuestStore>) -> DefaultApiResult<Vec<GuestReport>> {
    let guests = crate::block(move || store.find_all(GuestOrder::LatestResponse)).await??;

    Ok(ApiResponse::new(guests.into_iter().map(Into::into).collect()))
}

/// API Endpoint *GET /admin/guests/{status}*
///
/// Returns all guests with the given status, latest answers first.
/// Responds with `400 Bad Request` for an unknown status.
#[get("/guests/{status}")]
pub async fn guests_by_status(
    store: Data<dyn GuestStore>,
    status: Path<String>,
) -> DefaultApiResult<Vec<GuestReport>> {
    let status = status.parse::<RsvpStatus>()?;

    let guest_list = crate::block(move || store.find_by_status(status)).await??;

    Ok(ApiResponse::new(guest_list.into_iter().map(Into::into).collect()))
}

/// API Endpoint *GET /admin/export/csv*
///
/// Returns all guests as CSV download, oldest first
#[get("/export/csv")]
pub async fn export_csv(store: Data<dyn GuestStore>) -> Result<HttpResponse, ApiError> {
    let guest_list = crate::block(move || store.find_all(GuestOrder::Oldest)).await??;

    let csv = report::guests_csv(&guest_list);

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename("rsvp-responses.csv".into())],
        })
        .body(csv))
}

/// API Endpoint *DELETE /admin/guests/{guest_id}/message*
///
/// Empties the message of a guest, all other fields stay the same
#[delete("/guests/{guest_id}/message")]
pub async fn delete_message(
    store: Data<dyn GuestStore>,
    guest_id: Path<GuestId>,
) -> DefaultApiResult<GuestReport> {
    let guest_id = guest_id.into_inner();

    let guest = crate::block(move || store.update(guest_id, GuestPatch::clear_message()))
        .await?
        .map_err(guest_not_found)?;

    log::info!("Cleared message of guest {}", guest.id);

    Ok(ApiResponse::new(guest.into()).with_message("Message deleted successfully"))
}

/// API Endpoint *DELETE /admin/guests/{guest_id}*
///
/// Responds with the complete removed record
#[delete("/guests/{guest_id}")]
pub async fn delete_guest(
    store: Data<dyn GuestStore>,
    guest_id: Path<GuestId>,
) -> DefaultApiResult<Guest> {
    let guest_id = guest_id.into_inner();

    let guest = crate::block(move || store.delete_by_id(guest_id))
        .await?
        .map_err(guest_not_found)?;

    log::info!("Deleted guest {}", guest.id);

    Ok(ApiResponse::new(guest).with_message("Guest deleted successfully"))
}

/// API Endpoint *DELETE /admin/guests-all/delete*
///
/// Removes every guest
#[delete("/guests-all/delete")]
pub async fn delete_all(store: Data<dyn GuestStore>) -> DefaultApiResult<DeletedGuests> {
    let deleted_count = crate::block(move || store.delete_all()).await??;

    log::warn!("Deleted all {} guests", deleted_count);

    Ok(ApiResponse::new(DeletedGuests { deleted_count })
        .with_message(format!("Deleted {deleted_count} guests")))
}
