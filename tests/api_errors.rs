// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::web::Data;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wedding_rsvp::db::{
    Guest, GuestId, GuestOrder, GuestPatch, GuestStore, NewGuest, Result, RsvpStatus,
    StatusCounts, StoreError,
};
use wedding_rsvp::settings::RuntimeEnvironment;

mod common;

use common::{as_admin, send, shared_settings, ADMIN_KEY};

/// Store whose backend is unreachable
struct UnavailableStore;

/// Store which crashes the blocking thread
struct PanickingStore;

impl GuestStore for UnavailableStore {
    fn insert(&self, _: NewGuest) -> Result<Guest> {
        Err(StoreError::Pool("connection refused".into()))
    }

    fn find_all(&self, _: GuestOrder) -> Result<Vec<Guest>> {
        Err(StoreError::Database("connection reset".into()))
    }

    fn find_by_id(&self, _: GuestId) -> Result<Guest> {
        Err(StoreError::Database("connection reset".into()))
    }

    fn find_by_status(&self, _: RsvpStatus) -> Result<Vec<Guest>> {
        Err(StoreError::Database("connection reset".into()))
    }

    fn find_recent_responses(&self, _: usize) -> Result<Vec<Guest>> {
        Err(StoreError::Database("connection reset".into()))
    }

    fn update(&self, _: GuestId, _: GuestPatch) -> Result<Guest> {
        Err(StoreError::Database("connection reset".into()))
    }

    fn delete_by_id(&self, _: GuestId) -> Result<Guest> {
        Err(StoreError::Database("connection reset".into()))
    }

    fn delete_all(&self) -> Result<u64> {
        Err(StoreError::Database("connection reset".into()))
    }

    fn count_by_status(&self) -> Result<StatusCounts> {
        Err(StoreError::Database("connection reset".into()))
    }
}

impl GuestStore for PanickingStore {
    fn insert(&self, _: NewGuest) -> Result<Guest> {
        panic!("insert")
    }

    fn find_all(&self, _: GuestOrder) -> Result<Vec<Guest>> {
        panic!("find_all")
    }

    fn find_by_id(&self, _: GuestId) -> Result<Guest> {
        panic!("find_by_id")
    }

    fn find_by_status(&self, _: RsvpStatus) -> Result<Vec<Guest>> {
        panic!("find_by_status")
    }

    fn find_recent_responses(&self, _: usize) -> Result<Vec<Guest>> {
        panic!("find_recent_responses")
    }

    fn update(&self, _: GuestId, _: GuestPatch) -> Result<Guest> {
        panic!("update")
    }

    fn delete_by_id(&self, _: GuestId) -> Result<Guest> {
        panic!("delete_by_id")
    }

    fn delete_all(&self) -> Result<u64> {
        panic!("delete_all")
    }

    fn count_by_status(&self) -> Result<StatusCounts> {
        panic!("count_by_status")
    }
}

fn store<S: GuestStore + 'static>(store: S) -> Data<dyn GuestStore> {
    let store: Arc<dyn GuestStore> = Arc::new(store);
    Data::from(store)
}

#[actix_web::test]
async fn store_failures_surface_their_message() {
    let settings = shared_settings(Some(ADMIN_KEY), RuntimeEnvironment::Production);
    let app = test::init_service(wedding_rsvp::app(store(UnavailableStore), settings)).await;

    let (status, body) = send(&app, TestRequest::get().uri("/api/guests")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "status": "error",
            "code": "store_error",
            "message": "Database Error: `connection reset`",
        })
    );

    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/guests")
            .set_json(json!({ "name": "Ani" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["message"],
        "The connection pool returned an Error: `connection refused`"
    );

    let (status, _) = send(&app, as_admin(TestRequest::get().uri("/api/admin/dashboard"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn validation_happens_before_the_store() {
    let settings = shared_settings(Some(ADMIN_KEY), RuntimeEnvironment::Production);
    let app = test::init_service(wedding_rsvp::app(store(PanickingStore), settings)).await;

    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/guests")
            .set_json(json!({ "name": " " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name is required");

    let (status, _) = send(
        &app,
        as_admin(TestRequest::get().uri("/api/admin/guests/unknown")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn internal_details_are_hidden_in_production() {
    let settings = shared_settings(Some(ADMIN_KEY), RuntimeEnvironment::Production);
    let app = test::init_service(wedding_rsvp::app(store(PanickingStore), settings)).await;

    let (status, body) = send(&app, TestRequest::get().uri("/api/guests")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "status": "error",
            "code": "internal_server_error",
            "message": "Something went wrong!",
        })
    );
}

#[actix_web::test]
async fn internal_details_are_shown_in_development() {
    let settings = shared_settings(Some(ADMIN_KEY), RuntimeEnvironment::Development);
    let app = test::init_service(wedding_rsvp::app(store(PanickingStore), settings)).await;

    let (status, body) = send(&app, TestRequest::get().uri("/api/guests")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Something went wrong!");
    assert_eq!(body["error"], "Blocking thread has panicked");
}
