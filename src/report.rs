// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

//! Aggregations and renderings of guest records for the admin surface
use crate::db::{Guest, GuestId, RsvpStatus, StatusCounts};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::fmt::{self, Write};

/// Share of confirmed guests in percent, with two decimals
///
/// Serializes to the number `0` if there are no guests at all and to a string like `"33.33"`
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationRate {
    NoGuests,
    /// Percent times 100, rounded half up
    Hundredths(u64),
}

impl ConfirmationRate {
    pub fn new(confirmed: u64, total: u64) -> Self {
        if total == 0 {
            return Self::NoGuests;
        }

        // round(confirmed * 10000 / total) without floating point
        let hundredths = (confirmed * 20_000 + total) / (2 * total);

        Self::Hundredths(hundredths)
    }
}

impl fmt::Display for ConfirmationRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoGuests => f.write_str("0"),
            Self::Hundredths(hundredths) => {
                write!(f, "{}.{:02}", hundredths / 100, hundredths % 100)
            }
        }
    }
}

impl Serialize for ConfirmationRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::NoGuests => serializer.serialize_u64(0),
            Self::Hundredths(_) => serializer.collect_str(self),
        }
    }
}

/// Overall RSVP numbers as shown on the admin dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpSummary {
    pub total: u64,
    pub confirmed: u64,
    pub declined: u64,
    pub pending: u64,
    pub confirmation_rate: ConfirmationRate,
}

impl From<StatusCounts> for RsvpSummary {
    fn from(counts: StatusCounts) -> Self {
        let total = counts.total();

        Self {
            total,
            confirmed: counts.confirmed,
            declined: counts.declined,
            pending: counts.pending,
            confirmation_rate: ConfirmationRate::new(counts.confirmed, total),
        }
    }
}

/// Amount of guests sharing one status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusGroup {
    #[serde(rename = "_id")]
    pub status: RsvpStatus,
    pub count: u64,
}

/// Groups the counts per status, statuses without any guest are left out
pub fn status_groups(counts: &StatusCounts) -> Vec<StatusGroup> {
    RsvpStatus::ALL
        .into_iter()
        .map(|status| StatusGroup {
            status,
            count: counts.get(status),
        })
        .filter(|group| group.count > 0)
        .collect()
}

/// The guest fields shown in admin listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestReport {
    pub id: GuestId,
    pub name: String,
    pub phone: Option<String>,
    pub rsvp_status: RsvpStatus,
    pub message: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Guest> for GuestReport {
    fn from(guest: Guest) -> Self {
        Self {
            id: guest.id,
            name: guest.name,
            phone: guest.phone,
            rsvp_status: guest.rsvp_status,
            message: guest.message,
            responded_at: guest.responded_at,
            created_at: guest.created_at,
        }
    }
}

/// Short form of a guest for the list of latest answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentResponse {
    pub id: GuestId,
    pub name: String,
    pub rsvp_status: RsvpStatus,
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<Guest> for RecentResponse {
    fn from(guest: Guest) -> Self {
        Self {
            id: guest.id,
            name: guest.name,
            rsvp_status: guest.rsvp_status,
            responded_at: guest.responded_at,
        }
    }
}

pub const CSV_HEADER: &str = "Name,Phone,Status,Message,Responded At";

/// Renders the guests as CSV, one line per guest after the header line
///
/// All fields are quoted, quotes inside of fields are doubled.
pub fn guests_csv(guests: &[Guest]) -> String {
    let mut csv = String::with_capacity(CSV_HEADER.len() + 1 + guests.len() * 64);

    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for guest in guests {
        let responded_at = guest
            .responded_at
            .map(|responded_at| responded_at.to_rfc3339_opts(SecondsFormat::Millis, true));

        let fields = [
            guest.name.as_str(),
            guest.phone.as_deref().unwrap_or_default(),
            guest.rsvp_status.as_str(),
            guest.message.as_deref().unwrap_or_default(),
            responded_at.as_deref().unwrap_or_default(),
        ];

        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                csv.push(',');
            }
            push_quoted(&mut csv, field);
        }

        csv.push('\n');
    }

    csv
}

fn push_quoted(csv: &mut String, field: &str) {
    // writing into a String cannot fail
    let _ = write!(csv, "\"{}\"", field.replace('"', "\"\""));
}
