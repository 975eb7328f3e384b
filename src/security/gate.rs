use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error};

use super::{
    bot::{BotDetector, UserAgentDetector},
    rate_limit::SlidingWindow,
    shield, RequestMeta,
};
use crate::config::SecuritySettings;

/// Per-request admission verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
    /// A gate dependency failed and fail-open is disabled.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Bot,
    Shield,
    RateLimit,
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error("bot classification failed: {0}")]
    Detector(#[source] anyhow::Error),
    #[error("rate limiter state poisoned")]
    LimiterPoisoned,
}

/// Admission control every request passes before any business logic:
/// bot classification, then shield inspection, then the per-IP sliding
/// window. First match wins, so only one reason is ever reported.
pub struct SecurityGate {
    detector: Box<dyn BotDetector>,
    limiter: SlidingWindow,
    fail_open: bool,
}

impl SecurityGate {
    pub fn new(settings: &SecuritySettings, detector: Box<dyn BotDetector>) -> Self {
        Self {
            detector,
            limiter: SlidingWindow::new(
                Duration::from_secs(settings.window_seconds),
                settings.max_requests,
            ),
            fail_open: settings.fail_open,
        }
    }

    pub fn from_config(settings: &SecuritySettings) -> Self {
        let detector = UserAgentDetector::new(settings.bot_allowlist.clone());
        Self::new(settings, Box::new(detector))
    }

    pub fn decide(&self, meta: &RequestMeta) -> Decision {
        match self.evaluate(meta) {
            Ok(decision) => decision,
            Err(e) if self.fail_open => {
                // Availability over strictness: admit and log.
                error!(error = %e, ip = %meta.ip, "security gate error, failing open");
                Decision::Allow
            }
            Err(e) => {
                error!(error = %e, ip = %meta.ip, "security gate error, failing closed");
                Decision::Unavailable
            }
        }
    }

    fn evaluate(&self, meta: &RequestMeta) -> Result<Decision, GateError> {
        let verdict = self.detector.classify(meta).map_err(GateError::Detector)?;
        if verdict.automated && !verdict.allowed {
            debug!(ip = %meta.ip, label = ?verdict.label, "request classified as automated");
            return Ok(Decision::Deny(DenyReason::Bot));
        }

        if shield::inspect(meta) {
            return Ok(Decision::Deny(DenyReason::Shield));
        }

        if !self.limiter.try_admit(&meta.ip)? {
            return Ok(Decision::Deny(DenyReason::RateLimit));
        }

        Ok(Decision::Allow)
    }

    pub fn sweep(&self) {
        self.limiter.sweep();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{bot::BotVerdict, test_meta};

    const BROWSER_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    const CRAWLER_UA: &str = "Mozilla/5.0 (compatible; AhrefsBot/7.0; +http://ahrefs.com/robot/)";

    fn settings(max_requests: usize, fail_open: bool) -> SecuritySettings {
        SecuritySettings {
            enabled: true,
            fail_open,
            window_seconds: 10,
            max_requests,
            bot_allowlist: Vec::new(),
        }
    }

    struct FailingDetector;

    impl BotDetector for FailingDetector {
        fn classify(&self, _meta: &RequestMeta) -> anyhow::Result<BotVerdict> {
            Err(anyhow::anyhow!("classifier offline"))
        }
    }

    #[test]
    fn browser_traffic_is_admitted() {
        let gate = SecurityGate::from_config(&settings(3, true));
        let meta = test_meta("9.9.9.9", Some(BROWSER_UA), "/health");
        assert_eq!(gate.decide(&meta), Decision::Allow);
    }

    #[test]
    fn fourth_request_in_window_hits_the_rate_limit() {
        let gate = SecurityGate::from_config(&settings(3, true));
        let meta = test_meta("9.9.9.9", Some(BROWSER_UA), "/health");
        for _ in 0..3 {
            assert_eq!(gate.decide(&meta), Decision::Allow);
        }
        assert_eq!(gate.decide(&meta), Decision::Deny(DenyReason::RateLimit));
    }

    #[test]
    fn bot_takes_precedence_over_rate_limit() {
        // Window saturated from the start; the bot reason must still win.
        let gate = SecurityGate::from_config(&settings(0, true));
        let meta = test_meta("9.9.9.9", Some(CRAWLER_UA), "/health");
        assert_eq!(gate.decide(&meta), Decision::Deny(DenyReason::Bot));
    }

    #[test]
    fn shield_takes_precedence_over_rate_limit() {
        let gate = SecurityGate::from_config(&settings(0, true));
        let meta = test_meta("9.9.9.9", Some(BROWSER_UA), "/files/../../etc/passwd");
        assert_eq!(gate.decide(&meta), Decision::Deny(DenyReason::Shield));
    }

    #[test]
    fn allowlisted_bot_reaches_the_rate_limiter() {
        let mut s = settings(3, true);
        s.bot_allowlist = vec!["googlebot".into()];
        let gate = SecurityGate::from_config(&s);
        let ua = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
        let meta = test_meta("9.9.9.9", Some(ua), "/health");
        assert_eq!(gate.decide(&meta), Decision::Allow);
    }

    #[test]
    fn denied_bot_does_not_consume_window_quota() {
        let gate = SecurityGate::from_config(&settings(1, true));
        let bot = test_meta("9.9.9.9", Some(CRAWLER_UA), "/health");
        for _ in 0..5 {
            assert_eq!(gate.decide(&bot), Decision::Deny(DenyReason::Bot));
        }
        let human = test_meta("9.9.9.9", Some(BROWSER_UA), "/health");
        assert_eq!(gate.decide(&human), Decision::Allow);
    }

    #[test]
    fn detector_failure_fails_open_by_default() {
        let gate = SecurityGate::new(&settings(3, true), Box::new(FailingDetector));
        let meta = test_meta("9.9.9.9", Some(BROWSER_UA), "/health");
        assert_eq!(gate.decide(&meta), Decision::Allow);
    }

    #[test]
    fn detector_failure_fails_closed_when_configured() {
        let gate = SecurityGate::new(&settings(3, false), Box::new(FailingDetector));
        let meta = test_meta("9.9.9.9", Some(BROWSER_UA), "/health");
        assert_eq!(gate.decide(&meta), Decision::Unavailable);
    }
}
