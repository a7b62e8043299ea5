use chrono::{FixedOffset, NaiveDate, Utc};
use std::time::{Duration, Instant};

use crate::auth::Accounts;
use crate::config::AppConfig;
use crate::effects::{EffectKind, EffectRunner};
use crate::integrations::AiClient;
use crate::marketplace::Marketplace;
use crate::session::SessionStore;

/// State shared by every request handler.
pub struct AppState {
    pub config: AppConfig,
    /// Teachers and bookings
    pub marketplace: Marketplace,
    pub sessions: SessionStore,
    pub accounts: Accounts,
    pub effects: EffectRunner,
    pub ai: AiClient,
    pub started_at: Instant,
}

impl AppState {
    /// Builds the state with the seed catalogue and no sessions.
    pub fn new(config: AppConfig) -> Result<Self, reqwest::Error> {
        let ai = AiClient::new(config.ai.clone())?;
        let today = local_today(config.calendar.utc_offset_minutes);

        Ok(Self {
            marketplace: Marketplace::seeded(today, config.default_hourly_rate),
            sessions: SessionStore::new(config.toast_duration()),
            accounts: Accounts::new(),
            effects: EffectRunner::new(),
            ai,
            started_at: Instant::now(),
            config,
        })
    }

    /// Fixed latency of a simulated operation.
    pub fn delay(&self, kind: EffectKind) -> Duration {
        let sim = &self.config.simulation;
        let ms = match kind {
            EffectKind::Authentication => sim.auth_ms,
            EffectKind::Payment => sim.payment_ms,
            EffectKind::Verification => sim.verification_ms,
            EffectKind::DocumentUpload => sim.document_upload_ms,
            EffectKind::CalendarSync => sim.calendar_sync_ms,
            EffectKind::ReviewPost => sim.review_ms,
            EffectKind::AvailabilitySave => sim.availability_save_ms,
            EffectKind::AiRequest => 0,
        };
        Duration::from_millis(ms)
    }

    /// Today in the marketplace's local offset.
    pub fn today(&self) -> NaiveDate {
        local_today(self.config.calendar.utc_offset_minutes)
    }
}

fn local_today(utc_offset_minutes: i32) -> NaiveDate {
    let now = Utc::now();
    FixedOffset::east_opt(utc_offset_minutes * 60)
        .map(|offset| now.with_timezone(&offset).date_naive())
        .unwrap_or_else(|| now.date_naive())
}
