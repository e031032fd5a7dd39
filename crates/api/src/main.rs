use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hareline_api::config::ServerConfig;
use hareline_api::router::build_app_router;
use hareline_api::state::AppState;
use hareline_core::phpserde::{self, PhpKey, PhpValue};
use hareline_core::settings::EventSettings;
use hareline_core::form_schema;
use hareline_db::{DbPool, OptionRepo};
use hareline_listmonk::ListmonkClient;

/// WordPress option holding the Event Manager plugin version.
const VERSION_OPTION: &str = "wp_event_manager_version";

/// Admin-side form field option; the submit-form option mirrors its
/// `event` section.
const FORM_FIELDS_OPTION: &str = "event_manager_form_fields";
const SUBMIT_FORM_FIELDS_OPTION: &str = "event_manager_submit_event_form_fields";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hareline=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting hash run API for the WordPress Event Manager"
    );

    // --- Configuration ---
    let mut config = ServerConfig::from_env();

    // --- Database ---
    let pool = hareline_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    hareline_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database connection successfully started");

    // --- Event settings (environment + wp_options hydration) ---
    if let Err(e) = config.hydrate_from_store(&pool).await {
        tracing::error!(error = %e, "Failed to read settings from wp_options");
        std::process::exit(1);
    }
    let settings = match config.build_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Unable to parse config");
            std::process::exit(1);
        }
    };

    // --- Event Manager version gate + managed form fields ---
    check_event_manager_version(&pool).await;
    update_event_manager_fields(&pool, &settings).await;

    // --- Listmonk ---
    let listmonk = match config.listmonk.clone() {
        None => None,
        Some(listmonk_config) => {
            let client =
                ListmonkClient::new(listmonk_config).expect("Failed to build Listmonk client");
            if let Err(e) = client.connect().await {
                tracing::error!(error = %e, "Listmonk connection failed");
                std::process::exit(1);
            }
            Some(Arc::new(client))
        }
    };

    // --- State & router ---
    let state = AppState {
        pool: pool.clone(),
        settings: Arc::new(settings),
        listmonk,
        api_token: config.api_token.as_deref().map(Arc::from),
    };
    let app = build_app_router(state, config.request_timeout_secs);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped accepting connections, cleaning up");
    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Exit unless a supported Event Manager plugin version is installed.
async fn check_event_manager_version(pool: &DbPool) {
    let installed = match OptionRepo::get(pool, VERSION_OPTION).await {
        Ok(installed) => installed,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read Event Manager version");
            std::process::exit(1);
        }
    };

    let Some(installed) = installed else {
        tracing::error!("WordPress Event Manager plugin not installed");
        std::process::exit(1);
    };

    tracing::info!(version = %installed, "Installed WordPress Event Manager version");

    if !form_schema::version_supported(&installed) {
        tracing::error!(
            installed = %installed,
            minimum = form_schema::MIN_EVENT_MANAGER_VERSION,
            "WordPress Event Manager version unsupported, please update the plugin"
        );
        std::process::exit(1);
    }
}

/// Idempotently patch the Event Manager form field options so the
/// managed hash fields exist and track the current configuration.
/// Failures are logged and tolerated; the read API works either way.
async fn update_event_manager_fields(pool: &DbPool, settings: &EventSettings) {
    let blob = match OptionRepo::get(pool, FORM_FIELDS_OPTION).await {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            tracing::warn!("Unable to update Event Manager fields, option not found");
            return;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read Event Manager form fields");
            return;
        }
    };

    let decoded = match phpserde::decode(&blob) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!(error = %e, "Unable to update Event Manager fields, unknown format");
            return;
        }
    };

    let Some((patched, changed)) = form_schema::apply_managed_fields(&decoded, settings) else {
        tracing::warn!("Unable to update Event Manager fields, unknown format");
        return;
    };

    if !changed {
        return;
    }

    // The submit form option mirrors the event section of the admin one.
    let submit_blob = PhpValue::Array(vec![(
        PhpKey::Str("event".to_string()),
        patched.get("event").cloned().unwrap_or(PhpValue::Null),
    )]);

    for (option, value) in [
        (FORM_FIELDS_OPTION, &patched),
        (SUBMIT_FORM_FIELDS_OPTION, &submit_blob),
    ] {
        let encoded = match phpserde::encode(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(error = %e, option, "Failed to encode form fields");
                return;
            }
        };
        match OptionRepo::set(pool, option, &encoded).await {
            Ok(0) => tracing::error!(option, "Updating WordPress option failed"),
            Ok(_) => tracing::info!(option, "Successfully updated WordPress option"),
            Err(e) => tracing::error!(error = %e, option, "Updating WordPress option failed"),
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
