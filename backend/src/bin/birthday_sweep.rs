//! One-shot birthday sweep, run daily by the platform scheduler.
//!
//! Greets every member whose birthday falls on today's date, recording
//! each greeting in the ledger so reruns on the same day stay idempotent.

use std::sync::Arc;

use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use alumni_backend::domain::BirthdaySweep;
use alumni_backend::outbound::{
    HttpNotificationSender, RecordApi, RestBirthdayLedger, RestIdentityProvider,
    RestMemberRepository,
};
use alumni_backend::server::AppSettings;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|error| std::io::Error::other(format!("settings failed to load: {error}")))?;
    let endpoints = settings.endpoints()?.ok_or_else(|| {
        std::io::Error::other(
            "the birthday sweep needs hosted service endpoints; set the ALUMNI_* settings",
        )
    })?;
    let timeout = settings.request_timeout();

    let api = RecordApi::new(
        endpoints.service_url.clone(),
        endpoints.service_key.clone(),
        timeout,
    )
    .map_err(|error| std::io::Error::other(format!("record api client: {error}")))?;
    let identity = RestIdentityProvider::new(
        endpoints.service_url.clone(),
        endpoints.service_key.clone(),
        timeout,
    )
    .map_err(|error| std::io::Error::other(format!("identity client: {error}")))?;
    let sender = HttpNotificationSender::new(
        endpoints.mail_url,
        endpoints.mail_key,
        endpoints.mail_sender,
        timeout,
    )
    .map_err(|error| std::io::Error::other(format!("mail client: {error}")))?;

    let sweep = BirthdaySweep::new(
        Arc::new(RestMemberRepository::new(api.clone())),
        Arc::new(RestBirthdayLedger::new(api)),
        Arc::new(identity),
        Arc::new(sender),
        Arc::new(DefaultClock),
    );

    let summary = sweep
        .run()
        .await
        .map_err(|error| std::io::Error::other(format!("sweep failed: {error}")))?;
    info!(
        sent = summary.sent,
        skipped = summary.skipped,
        failed = summary.failed,
        message = %summary.message,
        "birthday sweep finished"
    );
    Ok(())
}
