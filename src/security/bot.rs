use super::RequestMeta;

/// User-Agent substrings that read as automation. Matching is
/// case-insensitive; "bot" alone covers the AhrefsBot/Googlebot family.
const BOT_MARKERS: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "scraper",
    "curl",
    "wget",
    "python-requests",
    "go-http-client",
    "headlesschrome",
    "phantomjs",
    "libwww",
];

#[derive(Debug, Clone)]
pub struct BotVerdict {
    pub automated: bool,
    /// Set when the agent matched the configured allowlist.
    pub allowed: bool,
    pub label: Option<String>,
}

impl BotVerdict {
    fn human() -> Self {
        Self {
            automated: false,
            allowed: false,
            label: None,
        }
    }
}

/// Classification seam. The default implementation is a local User-Agent
/// matcher; an external classification service slots in behind the same
/// trait, which is why `classify` is fallible.
pub trait BotDetector: Send + Sync {
    fn classify(&self, meta: &RequestMeta) -> anyhow::Result<BotVerdict>;
}

pub struct UserAgentDetector {
    allowlist: Vec<String>,
}

impl UserAgentDetector {
    pub fn new(allowlist: Vec<String>) -> Self {
        Self {
            allowlist: allowlist.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }
}

impl BotDetector for UserAgentDetector {
    fn classify(&self, meta: &RequestMeta) -> anyhow::Result<BotVerdict> {
        let ua = match meta.user_agent.as_deref() {
            Some(ua) if !ua.trim().is_empty() => ua.to_lowercase(),
            // Browsers always send one; its absence reads as automation.
            _ => {
                return Ok(BotVerdict {
                    automated: true,
                    allowed: false,
                    label: Some("missing-user-agent".into()),
                })
            }
        };

        let Some(marker) = BOT_MARKERS.iter().find(|m| ua.contains(**m)) else {
            return Ok(BotVerdict::human());
        };

        let allowed = self.allowlist.iter().any(|entry| ua.contains(entry));
        Ok(BotVerdict {
            automated: true,
            allowed,
            label: Some((*marker).to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::test_meta;

    const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    #[test]
    fn browser_user_agent_is_human() {
        let detector = UserAgentDetector::new(vec![]);
        let verdict = detector
            .classify(&test_meta("1.1.1.1", Some(BROWSER_UA), "/health"))
            .unwrap();
        assert!(!verdict.automated);
    }

    #[test]
    fn crawler_user_agent_is_automated() {
        let detector = UserAgentDetector::new(vec![]);
        let ua = "Mozilla/5.0 (compatible; AhrefsBot/7.0; +http://ahrefs.com/robot/)";
        let verdict = detector
            .classify(&test_meta("1.1.1.1", Some(ua), "/health"))
            .unwrap();
        assert!(verdict.automated);
        assert!(!verdict.allowed);
        assert_eq!(verdict.label.as_deref(), Some("bot"));
    }

    #[test]
    fn curl_is_automated() {
        let detector = UserAgentDetector::new(vec![]);
        let verdict = detector
            .classify(&test_meta("1.1.1.1", Some("curl/8.4.0"), "/api"))
            .unwrap();
        assert!(verdict.automated);
    }

    #[test]
    fn missing_user_agent_is_automated() {
        let detector = UserAgentDetector::new(vec![]);
        let verdict = detector.classify(&test_meta("1.1.1.1", None, "/")).unwrap();
        assert!(verdict.automated);
        assert_eq!(verdict.label.as_deref(), Some("missing-user-agent"));
        let verdict = detector
            .classify(&test_meta("1.1.1.1", Some("   "), "/"))
            .unwrap();
        assert!(verdict.automated);
    }

    #[test]
    fn allowlisted_bot_is_marked_allowed() {
        let detector = UserAgentDetector::new(vec!["GoogleBot".into()]);
        let ua = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
        let verdict = detector
            .classify(&test_meta("1.1.1.1", Some(ua), "/"))
            .unwrap();
        assert!(verdict.automated);
        assert!(verdict.allowed);
    }
}
