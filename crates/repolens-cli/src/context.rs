use crate::PollArgs;
use repolens_client::{AnalysisService, HttpService};
use repolens_store::Settings;
use repolens_tracker::TrackingConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Settings resolved for one invocation: config file, then env, then flags.
pub struct Context {
    pub settings: Settings,
}

impl Context {
    pub fn load(api: Option<&str>) -> Self {
        Self::from_settings(Settings::load_default(), api)
    }

    fn from_settings(mut settings: Settings, api: Option<&str>) -> Self {
        if let Some(api) = api.map(str::trim).filter(|a| !a.is_empty()) {
            settings.api_base_url = api.to_string();
        }
        Self {
            settings: settings.normalized(),
        }
    }

    pub fn with_poll(mut self, poll: &PollArgs) -> Self {
        if let Some(interval) = poll.interval {
            self.settings.poll_interval_secs = interval;
        }
        if let Some(max) = poll.max_attempts {
            self.settings.max_attempts = max;
        }
        self.settings = self.settings.normalized();
        self
    }

    pub fn service(&self) -> Arc<dyn AnalysisService> {
        tracing::debug!(api = %self.settings.api_base_url, "using analysis service");
        Arc::new(HttpService::new(
            &self.settings.api_base_url,
            Duration::from_secs(self.settings.request_timeout_secs),
        ))
    }

    pub fn tracking(&self) -> TrackingConfig {
        TrackingConfig::from(&self.settings)
    }
}

pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

/// Cancel `cancel` on Ctrl+C.
pub fn ctrlc_cancel(cancel: CancellationToken) {
    if let Err(e) = ctrlc::set_handler(move || {
        cancel.cancel();
    }) {
        tracing::debug!(error = %e, "could not install Ctrl+C handler");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let ctx = Context::from_settings(Settings::default(), Some("http://example.test/api/"))
            .with_poll(&PollArgs {
                interval: Some(5),
                max_attempts: Some(0),
            });
        assert_eq!(ctx.settings.api_base_url, "http://example.test/api");
        assert_eq!(ctx.settings.poll_interval_secs, 5);
        // clamped
        assert_eq!(ctx.settings.max_attempts, 1);
        let tracking = ctx.tracking();
        assert_eq!(tracking.poll.interval, Duration::from_secs(5));
    }

    #[test]
    fn blank_api_flag_is_ignored() {
        let ctx = Context::from_settings(Settings::default(), Some("  "));
        assert_eq!(ctx.settings.api_base_url, repolens_store::settings::DEFAULT_API_BASE_URL);
    }
}
