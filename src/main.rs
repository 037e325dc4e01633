// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

use anyhow::Result;
use wedding_rsvp::Server;

#[actix_web::main]
async fn main() {
    wedding_rsvp::try_or_exit(run()).await;
}

async fn run() -> Result<()> {
    if let Some(server) = Server::create().await? {
        server.run().await?;
    }

    Ok(())
}
