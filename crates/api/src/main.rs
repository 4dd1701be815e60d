use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clientdesk_api::auth::password::{
    hash_password, validate_password_strength, MIN_PASSWORD_LENGTH,
};
use clientdesk_api::background::overdue_sweep;
use clientdesk_api::config::ServerConfig;
use clientdesk_api::router::build_app_router;
use clientdesk_api::state::AppState;
use clientdesk_core::payment_link::{build_payment_url, PaymentLinkParams};
use clientdesk_core::roles::ROLE_ADMIN;
use clientdesk_db::models::operator::NewOperator;
use clientdesk_db::store::{MemoryStore, OperatorStore, PgStore, Store};
use clientdesk_events::{
    EmailConfig, EmailDelivery, EventBus, NotificationDispatcher, SmsConfig, SmsDelivery,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clientdesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    build_payment_url(&config.payment.base_url, &PaymentLinkParams::default())
        .expect("PAYMENT_BASE_URL must be an absolute URL");

    // --- Store ---
    let store = open_store().await;
    bootstrap_admin(store.as_ref()).await;

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    tracing::info!("Event bus created");

    let email = EmailConfig::from_env()
        .map(|c| EmailDelivery::new(c).expect("Failed to build SMTP transport"));
    let sms = SmsConfig::from_env()
        .map(|c| SmsDelivery::new(c).expect("Failed to build SMS client"));
    tracing::info!(
        email_enabled = email.is_some(),
        sms_enabled = sms.is_some(),
        "Notification channels configured"
    );
    let dispatcher_handle = tokio::spawn(
        NotificationDispatcher::new(email, sms).run(event_bus.subscribe()),
    );

    // --- Background jobs ---
    let cancel = tokio_util::sync::CancellationToken::new();
    let sweep_handle = tokio::spawn(overdue_sweep::run(
        Arc::clone(&store),
        Arc::clone(&event_bus),
        Duration::from_secs(config.overdue_sweep_interval_secs),
        cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

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

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    tracing::info!("Overdue sweep stopped");

    // Dropping the last sender closes the channel and ends the dispatcher.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;
    tracing::info!("Notification dispatcher shut down");

    tracing::info!("Graceful shutdown complete");
}

/// `STORE=memory` runs without a database; anything else needs `DATABASE_URL`.
async fn open_store() -> Arc<dyn Store> {
    if std::env::var("STORE").is_ok_and(|s| s.eq_ignore_ascii_case("memory")) {
        tracing::warn!("Using in-memory store; all data is lost on restart");
        return Arc::new(MemoryStore::new());
    }

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = clientdesk_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    clientdesk_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    clientdesk_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    Arc::new(PgStore::new(pool))
}

/// Create the first admin from `ADMIN_EMAIL` / `ADMIN_PASSWORD` when both are
/// set and no operator with that email exists yet.
async fn bootstrap_admin(store: &dyn Store) {
    let (Ok(email), Ok(password)) = (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD"))
    else {
        return;
    };
    let email = email.trim().to_lowercase();

    if store
        .find_operator_by_email(&email)
        .await
        .expect("Failed to look up bootstrap operator")
        .is_some()
    {
        tracing::debug!(%email, "Bootstrap operator already exists");
        return;
    }

    if let Err(msg) = validate_password_strength(&password, MIN_PASSWORD_LENGTH) {
        panic!("ADMIN_PASSWORD rejected: {msg}");
    }
    let password_hash = hash_password(&password).expect("Failed to hash ADMIN_PASSWORD");

    let operator = store
        .create_operator(NewOperator {
            display_name: email.clone(),
            email,
            password_hash,
            role: ROLE_ADMIN.to_string(),
        })
        .await
        .expect("Failed to create bootstrap operator");
    tracing::info!(operator_id = operator.id, "Bootstrap admin created");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
