use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

const REDACTED: &str = "[REDACTED]";

static API_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sk-(?:ant-)?[a-zA-Z0-9_-]{20,}").unwrap());
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']?(?:api_key|apikey|token|secret)["']?\s*[:=]\s*["']?([a-zA-Z0-9_.-]{20,})["']?"#)
        .unwrap()
});
static BEARER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9_.-]+").unwrap());
static PASSWORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']?password["']?\s*[:=]\s*["']?([^"'\s,}]+)["']?"#).unwrap()
});
static SENSITIVE_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:KEY|TOKEN|SECRET|PASSWORD|PASSWD|CREDENTIAL|AUTH)").unwrap()
});

/// Redacts secrets from text and environment maps before they are shown
/// to users or written to logs.
#[derive(Clone, Copy, Default)]
pub struct SecretScrubber;

impl SecretScrubber {
    pub fn new() -> Self {
        Self
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let mut scrubbed = API_KEY_PATTERN
            .replace_all(message, "[API_KEY_REDACTED]")
            .to_string();
        scrubbed = BEARER_PATTERN
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]")
            .to_string();
        scrubbed = TOKEN_PATTERN
            .replace_all(&scrubbed, |caps: &regex::Captures| {
                let full_match = &caps[0];
                if let Some(colon_pos) = full_match.find(':') {
                    format!("{}:{REDACTED}", &full_match[..colon_pos])
                } else if let Some(eq_pos) = full_match.find('=') {
                    format!("{}={REDACTED}", &full_match[..eq_pos])
                } else {
                    REDACTED.to_string()
                }
            })
            .to_string();
        PASSWORD_PATTERN
            .replace_all(&scrubbed, "password=[REDACTED]")
            .to_string()
    }

    pub fn is_sensitive_key(&self, key: &str) -> bool {
        SENSITIVE_KEY_PATTERN.is_match(key)
    }

    /// Copy of `env` with values of sensitive-looking keys replaced and
    /// every other value passed through [`Self::scrub_message`].
    pub fn scrub_env(&self, env: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        env.iter()
            .map(|(key, value)| {
                let value = if self.is_sensitive_key(key) {
                    REDACTED.to_string()
                } else {
                    self.scrub_message(value)
                };
                (key.clone(), value)
            })
            .collect()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}
