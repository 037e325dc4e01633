// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

use barrel::backend::Pg;
use barrel::{types, Migration};

pub fn migration() -> String {
    let mut migr = Migration::new();

    migr.create_table("guests", |table| {
        table.add_column("id", types::uuid().primary(true));
        table.add_column("name", types::text().nullable(false));
        table.add_column("phone", types::text().nullable(true));
        table.add_column(
            "rsvp_status",
            types::varchar(16).nullable(false).default("pending"),
        );
        table.add_column("message", types::text().nullable(true));
        table.add_column("responded_at", types::custom("TIMESTAMPTZ").nullable(true));
        table.add_column("created_at", types::custom("TIMESTAMPTZ"));
        table.add_column("updated_at", types::custom("TIMESTAMPTZ"));
        table.inject_custom(
            "CONSTRAINT guests_rsvp_status_check CHECK (rsvp_status IN ('pending', 'confirmed', 'declined'))",
        );
    });

    migr.make::<Pg>()
}
