// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the guest specific database structs and queries
use super::schema::guests;
use super::{Db, GuestStore, Result, StoreError};
use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql};
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use validator::Validate;

diesel_newtype! {
    #[derive(Copy)] GuestId(uuid::Uuid) => diesel::sql_types::Uuid
}

impl GuestId {
    pub fn generate() -> Self {
        Self::from(uuid::Uuid::new_v4())
    }
}

/// The RSVP answer of a guest
///
/// Any status can be set from any other status, there are no transition rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Pending,
    Confirmed,
    Declined,
}

impl RsvpStatus {
    pub const ALL: [RsvpStatus; 3] = [Self::Pending, Self::Confirmed, Self::Declined];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
        }
    }
}

impl Default for RsvpStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "declined" => Ok(Self::Declined),
            _ => Err(StoreError::InvalidArgument("Invalid status".into())),
        }
    }
}

impl ToSql<Text, Pg> for RsvpStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for RsvpStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let value = std::str::from_utf8(bytes.as_bytes())?;
        value
            .parse()
            .map_err(|_| format!("unknown rsvp_status {value:?}").into())
    }
}

/// Diesel guest struct
///
/// Represents a stored guest RSVP
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = guests)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: GuestId,
    pub name: String,
    pub phone: Option<String>,
    pub rsvp_status: RsvpStatus,
    pub message: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated guest draft
///
/// Can only be created through [`NewGuest::new`], which trims all text fields and rejects a
/// missing name.
#[derive(Debug, Clone, Validate)]
pub struct NewGuest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub(crate) name: String,
    pub(crate) phone: Option<String>,
    pub(crate) rsvp_status: RsvpStatus,
    pub(crate) message: Option<String>,
    pub(crate) responded_at: Option<DateTime<Utc>>,
}

impl NewGuest {
    pub fn new(
        name: Option<String>,
        phone: Option<String>,
        rsvp_status: Option<RsvpStatus>,
        message: Option<String>,
        responded_at: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let new_guest = Self {
            name: name.as_deref().map(str::trim).unwrap_or_default().to_owned(),
            phone: trimmed(phone),
            rsvp_status: rsvp_status.unwrap_or_default(),
            message: trimmed(message),
            responded_at,
        };

        new_guest.validate()?;

        Ok(new_guest)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rsvp_status(&self) -> RsvpStatus {
        self.rsvp_status
    }

    /// Turns the draft into a full record
    pub(crate) fn into_guest(self, id: GuestId, now: DateTime<Utc>) -> Guest {
        Guest {
            id,
            name: self.name,
            phone: self.phone,
            rsvp_status: self.rsvp_status,
            message: self.message,
            responded_at: self.responded_at,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A validated partial update of a guest
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct GuestPatch {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub(crate) name: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) rsvp_status: Option<RsvpStatus>,
    pub(crate) message: Option<String>,
    pub(crate) responded_at: Option<DateTime<Utc>>,
}

impl GuestPatch {
    pub fn new(
        name: Option<String>,
        phone: Option<String>,
        rsvp_status: Option<RsvpStatus>,
        message: Option<String>,
        responded_at: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let patch = Self {
            name: trimmed(name),
            phone: trimmed(phone),
            rsvp_status,
            message: trimmed(message),
            responded_at,
        };

        patch.validate()?;

        Ok(patch)
    }

    /// A patch which only empties the message of a guest
    pub fn clear_message() -> Self {
        Self {
            message: Some(String::new()),
            ..Default::default()
        }
    }

    /// Applies the patch onto an in-memory record
    pub(crate) fn apply(self, guest: &mut Guest, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            guest.name = name;
        }
        if let Some(phone) = self.phone {
            guest.phone = Some(phone);
        }
        if let Some(rsvp_status) = self.rsvp_status {
            guest.rsvp_status = rsvp_status;
        }
        if let Some(message) = self.message {
            guest.message = Some(message);
        }
        if let Some(responded_at) = self.responded_at {
            guest.responded_at = Some(responded_at);
        }
        guest.updated_at = now;
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_owned())
}

/// Sort order for guest listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestOrder {
    /// Creation time descending
    Newest,
    /// Creation time ascending
    Oldest,
    /// Response time descending, then creation time descending. Guests without a response
    /// time come last.
    LatestResponse,
}

/// Amount of guests per [`RsvpStatus`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub confirmed: u64,
    pub declined: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.confirmed + self.declined
    }

    pub fn get(&self, status: RsvpStatus) -> u64 {
        match status {
            RsvpStatus::Pending => self.pending,
            RsvpStatus::Confirmed => self.confirmed,
            RsvpStatus::Declined => self.declined,
        }
    }

    pub(crate) fn add(&mut self, status: RsvpStatus, count: u64) {
        match status {
            RsvpStatus::Pending => self.pending += count,
            RsvpStatus::Confirmed => self.confirmed += count,
            RsvpStatus::Declined => self.declined += count,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = guests)]
struct InsertGuest<'a> {
    id: GuestId,
    name: &'a str,
    phone: Option<&'a str>,
    rsvp_status: RsvpStatus,
    message: Option<&'a str>,
    responded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Diesel guest struct for updates
///
/// `updated_at` is always set, so the changeset is never empty.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = guests)]
struct GuestChangeset {
    name: Option<String>,
    phone: Option<String>,
    rsvp_status: Option<RsvpStatus>,
    message: Option<String>,
    responded_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl GuestStore for Db {
    #[tracing::instrument(err, skip_all)]
    fn insert(&self, new_guest: NewGuest) -> Result<Guest> {
        let mut conn = self.get_conn()?;

        let now = Utc::now();
        let insert = InsertGuest {
            id: GuestId::generate(),
            name: &new_guest.name,
            phone: new_guest.phone.as_deref(),
            rsvp_status: new_guest.rsvp_status,
            message: new_guest.message.as_deref(),
            responded_at: new_guest.responded_at,
            created_at: now,
            updated_at: now,
        };

        let guest = diesel::insert_into(guests::table)
            .values(insert)
            .get_result(&mut conn)
            .map_err(|e| {
                log::error!("Query error creating new guest, {}", e);
                e
            })?;

        Ok(guest)
    }

    #[tracing::instrument(err, skip(self))]
    fn find_all(&self, order: GuestOrder) -> Result<Vec<Guest>> {
        let mut conn = self.get_conn()?;

        let query = guests::table.into_boxed();
        let query = match order {
            GuestOrder::Newest => query.order(guests::created_at.desc()),
            GuestOrder::Oldest => query.order(guests::created_at.asc()),
            GuestOrder::LatestResponse => query.order((
                guests::responded_at.desc().nulls_last(),
                guests::created_at.desc(),
            )),
        };

        let guests = query.load(&mut conn)?;

        Ok(guests)
    }

    #[tracing::instrument(err, skip(self))]
    fn find_by_id(&self, id: GuestId) -> Result<Guest> {
        let mut conn = self.get_conn()?;

        let guest = guests::table.find(id).get_result(&mut conn)?;

        Ok(guest)
    }

    #[tracing::instrument(err, skip(self))]
    fn find_by_status(&self, status: RsvpStatus) -> Result<Vec<Guest>> {
        let mut conn = self.get_conn()?;

        let guests = guests::table
            .filter(guests::rsvp_status.eq(status))
            .order((
                guests::responded_at.desc().nulls_last(),
                guests::created_at.desc(),
            ))
            .load(&mut conn)?;

        Ok(guests)
    }

    #[tracing::instrument(err, skip(self))]
    fn find_recent_responses(&self, limit: usize) -> Result<Vec<Guest>> {
        let mut conn = self.get_conn()?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let guests = guests::table
            .filter(guests::rsvp_status.ne(RsvpStatus::Pending))
            .order((
                guests::responded_at.desc().nulls_last(),
                guests::created_at.desc(),
            ))
            .limit(limit)
            .load(&mut conn)?;

        Ok(guests)
    }

    #[tracing::instrument(err, skip(self, patch))]
    fn update(&self, id: GuestId, patch: GuestPatch) -> Result<Guest> {
        let mut conn = self.get_conn()?;

        let changeset = GuestChangeset {
            name: patch.name,
            phone: patch.phone,
            rsvp_status: patch.rsvp_status,
            message: patch.message,
            responded_at: patch.responded_at,
            updated_at: Utc::now(),
        };

        let guest = diesel::update(guests::table.find(id))
            .set(changeset)
            .get_result(&mut conn)?;

        Ok(guest)
    }

    #[tracing::instrument(err, skip(self))]
    fn delete_by_id(&self, id: GuestId) -> Result<Guest> {
        let mut conn = self.get_conn()?;

        let guest = diesel::delete(guests::table.find(id)).get_result(&mut conn)?;

        Ok(guest)
    }

    #[tracing::instrument(err, skip(self))]
    fn delete_all(&self) -> Result<u64> {
        let mut conn = self.get_conn()?;

        let deleted = diesel::delete(guests::table).execute(&mut conn)?;

        Ok(deleted as u64)
    }

    #[tracing::instrument(err, skip(self))]
    fn count_by_status(&self) -> Result<StatusCounts> {
        let mut conn = self.get_conn()?;

        let groups: Vec<(RsvpStatus, i64)> = guests::table
            .group_by(guests::rsvp_status)
            .select((guests::rsvp_status, diesel::dsl::count_star()))
            .load(&mut conn)?;

        let mut counts = StatusCounts::default();
        for (status, count) in groups {
            counts.add(status, count.max(0) as u64);
        }

        Ok(counts)
    }
}
