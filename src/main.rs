//! Subscription Relay server
//!
//! Receives signed subscription lifecycle webhooks and serves the renewal
//! reminder and cancellation endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use chrono::Utc;
use secrecy::ExposeSecret;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subscription_relay::adapters::http::{app_router, SubscriptionHandlers, WebhookHandlers};
use subscription_relay::adapters::{
    GraphqlCommerceClient, InMemoryDeliveryLedger, LoggingAnalyticsTracker,
    SegmentAnalyticsTracker, SendGridEmailSender, StaticHealthSignals,
};
use subscription_relay::application::handlers::subscription::{
    CancelSubscriptionHandler, SendRenewalRemindersHandler,
};
use subscription_relay::application::handlers::webhook::{ProcessWebhookHandler, WebhookDispatcher};
use subscription_relay::application::services::{
    Capabilities, LifecycleServices, OutboundTimeouts, ServiceSettings,
};
use subscription_relay::config::AppConfig;
use subscription_relay::domain::webhook::SignatureVerifier;
use subscription_relay::ports::{AnalyticsTracker, WebhookDeliveryLedger};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// How often expired delivery ids are dropped from the ledger.
const LEDGER_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = config.server.environment.as_str(),
        "Starting Subscription Relay"
    );

    config.validate()?;
    if !config.webhook.has_secret() {
        warn!("Webhook secret is not configured; every delivery will be rejected");
    }

    // Outbound capabilities
    let timeouts = OutboundTimeouts {
        commerce: Duration::from_millis(config.commerce.timeout_ms),
        email: Duration::from_millis(config.email.timeout_ms),
        analytics: Duration::from_millis(config.analytics.timeout_ms),
        ..OutboundTimeouts::default()
    };

    let analytics: Arc<dyn AnalyticsTracker> = match (&config.analytics.write_key, config.analytics.enabled) {
        (Some(write_key), true) if !write_key.expose_secret().is_empty() => Arc::new(
            SegmentAnalyticsTracker::new(
                &config.analytics,
                write_key.clone(),
                config.server.environment.as_str(),
            )?,
        ),
        _ => Arc::new(LoggingAnalyticsTracker::new("analytics sink disabled")),
    };

    let capabilities = Capabilities {
        commerce: Arc::new(GraphqlCommerceClient::new(&config.commerce)?),
        email: Arc::new(SendGridEmailSender::new(&config.email, config.help_center_url())?),
        analytics: analytics.clone(),
        health_signals: Arc::new(StaticHealthSignals::new(config.health.baseline)),
    };

    let settings = ServiceSettings {
        public_url: config.server.public_base_url().to_string(),
        thresholds: config.health.thresholds,
        timeouts,
    };
    let services = Arc::new(LifecycleServices::new(&capabilities, &settings));

    // Webhook pipeline
    let dispatcher = Arc::new(WebhookDispatcher::with_lifecycle_handlers(services.clone()));
    let mut processor = ProcessWebhookHandler::new(
        SignatureVerifier::new(config.webhook.secret.clone()),
        dispatcher,
        services.metrics.clone(),
    );

    let ledger_task = if config.webhook.dedupe_deliveries {
        let ledger = Arc::new(InMemoryDeliveryLedger::with_claim_lease(
            config.webhook.claim_lease(),
        ));
        processor = processor.with_ledger(ledger.clone());
        Some(tokio::spawn(purge_ledger(
            ledger,
            config.webhook.ledger_retention(),
        )))
    } else {
        info!("Webhook delivery deduplication disabled");
        None
    };

    let webhook_handlers = WebhookHandlers::new(
        Arc::new(processor),
        HeaderName::try_from(config.webhook.signature_header.as_str())?,
    );

    let subscription_handlers = SubscriptionHandlers::new(
        Arc::new(SendRenewalRemindersHandler::new(
            capabilities.commerce.clone(),
            services.notifier.clone(),
            config.commerce.renewal_window_days,
            timeouts.commerce,
        )),
        Arc::new(CancelSubscriptionHandler::new(
            capabilities.commerce.clone(),
            timeouts.commerce,
        )),
    );

    let app = app_router(
        webhook_handlers,
        subscription_handlers,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    // Serve
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = ledger_task {
        task.abort();
    }
    if let Err(e) = analytics.flush().await {
        warn!(error = %e, "Failed to flush analytics on shutdown");
    }

    info!("Shutdown complete");
    Ok(())
}

/// JSON logs in production, human-readable elsewhere. `RUST_LOG` overrides
/// the configured filter.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn purge_ledger(ledger: Arc<dyn WebhookDeliveryLedger>, retention: chrono::Duration) {
    let mut interval = tokio::time::interval(LEDGER_PURGE_INTERVAL);
    interval.tick().await;
    loop {
        interval.tick().await;
        match ledger.purge_before(Utc::now() - retention).await {
            Ok(0) => {}
            Ok(purged) => info!(purged, "Purged expired webhook deliveries"),
            Err(e) => error!(error = %e, "Webhook delivery ledger purge failed"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C signal"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C signal"),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received SIGTERM signal");
            }
            Err(e) => error!(error = %e, "Failed to listen for SIGTERM signal"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
