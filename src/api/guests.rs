// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the public guest RSVP endpoints
use super::guest_not_found;
use super::response::{ApiResponse, DefaultApiResult};
use crate::db::{Guest, GuestId, GuestOrder, GuestPatch, GuestStore, NewGuest, RsvpStatus};
use crate::report::{self, StatusGroup};
use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, put};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body for *POST /guests*
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostGuestBody {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub rsvp_status: Option<RsvpStatus>,
    pub message: Option<String>,
}

/// Body for *PUT /guests/{id}*
///
/// Fields which are left out stay untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutGuestBody {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub rsvp_status: Option<RsvpStatus>,
    pub message: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// Response of *GET /guests/stats/rsvp*
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpStats {
    pub stats: Vec<StatusGroup>,
    pub total_guests: u64,
}

/// API Endpoint *POST /guests*
///
/// Stores a new RSVP. The response time is set to now, independent of the status.
#[post("/guests")]
pub async fn create(
    store: Data<dyn GuestStore>,
    body: Json<PostGuestBody>,
) -> DefaultApiResult<Guest> {
    let body = body.into_inner();

    let new_guest = NewGuest::new(
        body.name,
        body.phone,
        body.rsvp_status,
        body.message,
        Some(Utc::now()),
    )?;

    let guest = crate::block(move || store.insert(new_guest)).await??;

    log::info!("Received RSVP {} from guest {}", guest.rsvp_status, guest.id);

    Ok(ApiResponse::new(guest)
        .created()
        .with_message("Guest RSVP received successfully"))
}

/// API Endpoint *GET /guests*
///
/// Returns all guests, newest first
#[get("/guests")]
pub async fn get_all(store: Data<dyn GuestStore>) -> DefaultApiResult<Vec<Guest>> {
    let guests = crate::block(move || store.find_all(GuestOrder::Newest)).await??;

    let count = guests.len();

    Ok(ApiResponse::new(guests)
        .with_message("Guests retrieved successfully")
        .with_count(count))
}

/// API Endpoint *GET /guests/stats/rsvp*
///
/// Returns the amount of guests per status
#[get("/guests/stats/rsvp")]
pub async fn rsvp_stats(store: Data<dyn GuestStore>) -> DefaultApiResult<RsvpStats> {
    let counts = crate::block(move || store.count_by_status()).await??;

    Ok(ApiResponse::new(RsvpStats {
        stats: report::status_groups(&counts),
        total_guests: counts.total(),
    }))
}

/// API Endpoint *GET /guests/{id}*
#[get("/guests/{id}")]
pub async fn get(store: Data<dyn GuestStore>, id: Path<GuestId>) -> DefaultApiResult<Guest> {
    let id = id.into_inner();

    let guest = crate::block(move || store.find_by_id(id))
        .await?
        .map_err(guest_not_found)?;

    Ok(ApiResponse::new(guest))
}

/// API Endpoint *PUT /guests/{id}*
///
/// Updates the given fields of a guest.
#[put("/guests/{id}")]
pub async fn update(
    store: Data<dyn GuestStore>,
    id: Path<GuestId>,
    body: Json<PutGuestBody>,
) -> DefaultApiResult<Guest> {
    let id = id.into_inner();
    let body = body.into_inner();

    let patch = GuestPatch::new(
        body.name,
        body.phone,
        body.rsvp_status,
        body.message,
        body.responded_at,
    )?;

    let guest = crate::block(move || store.update(id, patch))
        .await?
        .map_err(guest_not_found)?;

    Ok(ApiResponse::new(guest).with_message("Guest updated successfully"))
}

/// API Endpoint *DELETE /guests/{id}*
///
/// Returns the deleted guest
#[delete("/guests/{id}")]
pub async fn delete(store: Data<dyn GuestStore>, id: Path<GuestId>) -> DefaultApiResult<Guest> {
    let id = id.into_inner();

    let guest = crate::block(move || store.delete_by_id(id))
        .await?
        .map_err(guest_not_found)?;

    log::info!("Deleted guest {}", guest.id);

    Ok(ApiResponse::new(guest).with_message("Guest deleted successfully"))
}
