// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the guest store interface, its implementations and the database migrations
use crate::settings;
use diesel::r2d2::ConnectionManager;
use diesel::{r2d2, PgConnection};
use std::time::Duration;

#[macro_use]
mod macros;

pub mod guests;
mod memory;
pub mod migrations;
mod schema;

pub use guests::{Guest, GuestId, GuestOrder, GuestPatch, NewGuest, RsvpStatus, StatusCounts};
pub use memory::MemoryStore;

/// Result type using [`StoreError`] as a default Error
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Error types of the guest store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("A requested resource could not be found")]
    NotFound,
    #[error("Database Error: `{0}`")]
    Database(String),
    // The R2D2 error mapping is only possible when using r2d2 directly as a dependency, hence the
    // generic R2D2 error handling. See https://github.com/diesel-rs/diesel/issues/2336
    #[error("The connection pool returned an Error: `{0}`")]
    Pool(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound,
            err => Self::Database(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_values()
            .flatten()
            .map(|error| {
                error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string())
            })
            .collect::<Vec<_>>()
            .join(", ");

        Self::Validation(message)
    }
}

/// The persisted collection of guest RSVP records
///
/// All operations are blocking, callers inside the async runtime have to go through
/// [`crate::block`].
pub trait GuestStore: Send + Sync {
    /// Stores a new guest and returns it together with its generated id and timestamps
    fn insert(&self, new_guest: NewGuest) -> Result<Guest>;

    /// Returns all guests in the requested order
    fn find_all(&self, order: GuestOrder) -> Result<Vec<Guest>>;

    fn find_by_id(&self, id: GuestId) -> Result<Guest>;

    /// Returns all guests with the given status, latest responses first
    fn find_by_status(&self, status: RsvpStatus) -> Result<Vec<Guest>>;

    /// Returns up to `limit` guests which are not pending, latest responses first
    fn find_recent_responses(&self, limit: usize) -> Result<Vec<Guest>>;

    /// Applies the patch and bumps `updated_at`
    fn update(&self, id: GuestId, patch: GuestPatch) -> Result<Guest>;

    /// Removes a single guest and returns the removed record
    fn delete_by_id(&self, id: GuestId) -> Result<Guest>;

    /// Removes every guest, returns the amount of removed records
    fn delete_all(&self) -> Result<u64>;

    fn count_by_status(&self) -> Result<StatusCounts>;
}

type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Pooled connection alias
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Db container that uses a connection pool to hand out connections.
///
/// Uses an r2d2 connection pool to manage multiple established connections.
pub struct Db {
    pool: DbPool,
}

impl Db {
    /// Creates a new Db instance from the specified database settings.
    #[tracing::instrument(skip(db_settings))]
    pub fn connect(db_settings: &settings::Database) -> Result<Self> {
        Self::connect_url(
            &db_settings.url,
            db_settings.max_connections,
            Some(db_settings.min_idle_connections),
        )
    }

    /// Creates a new Db instance from the specified database url.
    pub fn connect_url(db_url: &str, max_conns: u32, min_idle: Option<u32>) -> Result<Self> {
        let manager = ConnectionManager::<PgConnection>::new(db_url);

        let pool = r2d2::Pool::builder()
            .max_size(max_conns)
            .min_idle(min_idle)
            .connection_timeout(Duration::from_secs(10))
            .build(manager)
            .map_err(|e| {
                log::error!("Unable to create database connection pool, {}", e);
                StoreError::Pool(e.to_string())
            })?;

        Ok(Self { pool })
    }

    /// Returns an established connection from the connection pool
    pub fn get_conn(&self) -> Result<DbConnection> {
        match self.pool.get() {
            Ok(con) => Ok(con),
            Err(e) => {
                let state = self.pool.state();
                let msg = format!(
                    "Unable to get connection from connection pool.
                            Error: {}
                            Pool State:
                                {:?}",
                    e, state
                );
                log::error!("{}", &msg);
                Err(StoreError::Pool(msg))
            }
        }
    }
}
