// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

use crate::settings::Settings;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "wedding-rsvp", version)]
pub struct Args {
    /// Specify path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    cmd: Option<SubCommand>,
}

#[derive(Subcommand, Debug, Clone)]
enum SubCommand {
    /// Migrate the db. This is done automatically during start of the service,
    /// but can be done without starting the service using this command.
    MigrateDb,
}

impl Args {
    /// Returns true if we want to startup the service after we finished the cli part
    pub fn server_should_start(&self) -> bool {
        self.cmd.is_none()
    }
}

/// Parses the CLI-Arguments into [`Args`]
///
/// Also runs (optional) cli commands if necessary
pub async fn parse_args() -> Result<Args> {
    let args = Args::parse();

    if let Some(sub_command) = args.cmd.clone() {
        let settings = Settings::load(&args.config)?;
        match sub_command {
            SubCommand::MigrateDb => {
                let database = settings
                    .database
                    .context("No database configured, nothing to migrate")?;

                let report = crate::db::migrations::migrate_from_url(&database.url)
                    .await
                    .context("Failed to migrate database")?;

                println!(
                    "Applied {} migration(s)",
                    report.applied_migrations().len()
                );
            }
        }
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_path() {
        let args = Args::try_parse_from(["wedding-rsvp"]).unwrap();
        assert_eq!(args.config, PathBuf::from("config.toml"));
        assert!(args.server_should_start());
    }

    #[test]
    fn migrate_subcommand_does_not_start_server() {
        let args =
            Args::try_parse_from(["wedding-rsvp", "-c", "/etc/rsvp.toml", "migrate-db"]).unwrap();
        assert_eq!(args.config, PathBuf::from("/etc/rsvp.toml"));
        assert!(!args.server_should_start());
    }
}
