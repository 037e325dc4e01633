// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

//! Backend of the wedding invitation website
//!
//! Stores the RSVP answers of the guests and offers a public and an admin REST API for them.
//!
//! # Example
//!
//! ```no_run
//! use wedding_rsvp::Server;
//! use anyhow::Result;
//!
//! #[actix_web::main]
//! async fn main()  {
//!     wedding_rsvp::try_or_exit(run()).await;
//! }
//!
//! async fn run() -> Result<()> {
//!    if let Some(server) = Server::create().await? {
//!         server.run().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::api::middleware::admin_auth::{AdminAuth, ADMIN_KEY_HEADER};
use crate::api::response::{
    json_error_handler, path_error_handler, render_internal_error, ApiError,
};
use crate::db::{Db, GuestStore, MemoryStore};
use crate::settings::{Settings, SharedSettings};
use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::ErrorHandlers;
use actix_web::web::Data;
use actix_web::{web, App, HttpResponse, HttpServer, ResponseError};
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use std::net::Ipv6Addr;
use std::sync::Arc;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};
use tracing_actix_web::TracingLogger;

pub mod api;
mod cli;
pub mod db;
pub mod report;
pub mod settings;
mod trace;

#[derive(Debug, thiserror::Error)]
#[error("Blocking thread has panicked")]
pub struct BlockingError;

/// Custom version of `actix_web::web::block` which retains the current tracing span
pub async fn block<F, R>(f: F) -> Result<R, BlockingError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let span = tracing::Span::current();

    let fut = actix_rt::task::spawn_blocking(move || span.in_scope(f));

    fut.await.map_err(|_| BlockingError)
}

/// Wrapper of the main function. Correctly outputs the error to the logging utility or stderr.
pub async fn try_or_exit<T, F>(f: F) -> T
where
    F: std::future::Future<Output = Result<T>>,
{
    match f.await {
        Ok(ok) => ok,
        Err(err) => {
            if log::log_enabled!(log::Level::Error) {
                log::error!("Crashed with error: {:?}", err);
            } else {
                eprintln!("Crashed with error: {err:?}");
            }

            std::process::exit(-1);
        }
    }
}

/// The RSVP service with everything it needs to serve requests
pub struct Server {
    /// Settings loaded on [Server::create]
    pub startup_settings: Arc<Settings>,

    /// Cloneable shared settings, swapped on reload
    pub shared_settings: SharedSettings,

    /// CLI arguments
    args: cli::Args,

    store: Data<dyn GuestStore>,
}

impl Server {
    /// Tries to create a server from CLI arguments and then the settings.
    ///
    /// This can return Ok(None) which would indicate that a CLI subcommand
    /// (e.g. `migrate-db`) was executed and the process must now exit.
    pub async fn create() -> Result<Option<Self>> {
        let args = cli::parse_args().await?;

        // Some args run commands by them self and thus should exit here
        if !args.server_should_start() {
            return Ok(None);
        }

        let settings = Settings::load(&args.config)
            .with_context(|| format!("Failed to load settings from {:?}", args.config))?;

        trace::init(&settings.logging)?;

        log::info!("Starting wedding-rsvp {}", env!("CARGO_PKG_VERSION"));

        let server = Self::init(settings, args).await?;

        Ok(Some(server))
    }

    #[tracing::instrument(err, skip(settings, args))]
    async fn init(settings: Settings, args: cli::Args) -> Result<Self> {
        let settings = Arc::new(settings);
        let shared_settings: SharedSettings = Arc::new(ArcSwap::from(settings.clone()));

        let store: Arc<dyn GuestStore> = match &settings.database {
            Some(database) => {
                db::migrations::migrate_from_url(&database.url)
                    .await
                    .context("Failed to migrate database")?;

                Arc::new(Db::connect(database).context("Failed to connect to database")?)
            }
            None => {
                log::warn!("No database configured, guests are only kept in memory");

                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self {
            startup_settings: settings,
            shared_settings,
            args,
            store: Data::from(store),
        })
    }

    /// Runs the server until a fatal error occurred or a shutdown is requested (e.g. SIGTERM).
    pub async fn run(self) -> Result<()> {
        let http_server = {
            let store = self.store.clone();
            let shared_settings = self.shared_settings.clone();

            HttpServer::new(move || app(store.clone(), shared_settings.clone()))
        };

        let address = (Ipv6Addr::UNSPECIFIED, self.startup_settings.http.port);

        let http_server = http_server.bind(address).with_context(|| {
            format!("Failed to bind http server to {}:{}", address.0, address.1)
        })?;

        log::info!("Startup finished");

        let http_server = http_server.disable_signals().run();
        let http_server_handle = http_server.handle();

        let mut reload_signal =
            signal(SignalKind::hangup()).context("Failed to register SIGHUP signal handler")?;
        let mut terminate_signal =
            signal(SignalKind::terminate()).context("Failed to register SIGTERM signal handler")?;

        actix_rt::spawn(http_server);

        // Wait for either SIGINT/SIGTERM or SIGHUP and handle them accordingly
        loop {
            tokio::select! {
                _ = ctrl_c() => {
                    log::info!("Got termination signal, exiting");
                    break;
                }
                _ = terminate_signal.recv() => {
                    log::info!("Got termination signal, exiting");
                    break;
                }
                _ = reload_signal.recv() => {
                    log::info!("Got reload signal, reloading");

                    if let Err(e) = settings::reload_settings(self.shared_settings.clone(), &self.args.config) {
                        log::error!("Failed to reload settings, {}", e);
                        continue
                    }
                }
            }
        }

        http_server_handle.stop(true).await;

        log::info!("HTTP server stopped, goodbye!");

        Ok(())
    }
}

/// Builds the application with all routes and middlewares
///
/// Used by the HTTP server for every worker and by the integration tests.
pub fn app(
    store: Data<dyn GuestStore>,
    shared_settings: SharedSettings,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let cors = setup_cors(&shared_settings.load().http.cors);

    App::new()
        .wrap(
            ErrorHandlers::new()
                .handler(StatusCode::INTERNAL_SERVER_ERROR, render_internal_error),
        )
        .wrap(cors)
        .wrap(TracingLogger::default())
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(Data::from(shared_settings.clone()))
        .app_data(store)
        .service(
            web::scope("/api")
                .service(api::health::health)
                .service(api::guests::create)
                .service(api::guests::get_all)
                .service(api::guests::rsvp_stats)
                .service(api::guests::get)
                .service(api::guests::update)
                .service(api::guests::delete)
                .service(
                    web::scope("/admin")
                        .wrap(AdminAuth::new(shared_settings))
                        .service(api::admin::dashboard)
                        .service(api::admin::stats)
                        .service(api::admin::guests)
                        .service(api::admin::guests_by_status)
                        .service(api::admin::export_csv)
                        .service(api::admin::delete_message)
                        .service(api::admin::delete_guest)
                        .service(api::admin::delete_all),
                ),
        )
        .default_service(web::to(route_not_found))
}

async fn route_not_found() -> HttpResponse {
    ApiError::not_found()
        .with_message("Route not found")
        .error_response()
}

fn setup_cors(settings: &settings::HttpCors) -> Cors {
    let mut cors = Cors::default();

    if settings.allowed_origin.is_empty() {
        cors = cors.allow_any_origin();
    }

    for origin in &settings.allowed_origin {
        cors = cors.allowed_origin(origin)
    }

    cors.allowed_header(header::CONTENT_TYPE)
        .allowed_header(ADMIN_KEY_HEADER)
        .allow_any_method()
}
