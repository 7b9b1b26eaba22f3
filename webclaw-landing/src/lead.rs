/**
 * LEADS - landing page form submissions
 *
 * ROLE:
 * Shape of the "request a workspace" form, the checks a submission must pass
 * before it is relayed, and the text the team receives.
 *
 * CHECKS (in handler order, after origin + rate limit):
 * - workEmail present and non-empty
 * - honeypot `website` blank (null, false, 0, ""), otherwise acknowledged and dropped
 * - submittedAt, when sent, no more than the skew ahead and not older than max age
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FreshnessConf;
use crate::error::LeadError;

pub const LEAD_TITLE: &str = "New WebClaw workspace lead";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
    #[serde(default)]
    pub work_email: Option<String>,
    // free-form: the form may send numbers or booleans, they are relayed as-is
    #[serde(default)]
    pub company_name: Option<Value>,
    #[serde(default)]
    pub company_size: Option<Value>,
    #[serde(default)]
    pub role: Option<Value>,
    #[serde(default)]
    pub usage: Option<Value>,
    /// Hidden from humans, only bots fill it. Any truthy value counts.
    #[serde(default)]
    pub website: Option<Value>,
    #[serde(default)]
    pub submitted_at: Option<SubmittedAt>,
}

/// The form sends a number, older builds sent the same value as a string.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SubmittedAt {
    Millis(f64),
    Text(String),
}

impl SubmittedAt {
    /// Millisecond value; NaN when the text is not a number.
    pub fn millis(&self) -> f64 {
        match self {
            SubmittedAt::Millis(ms) => *ms,
            SubmittedAt::Text(s) if s.trim().is_empty() => 0.0,
            SubmittedAt::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }

    /// `0` and `""` count as "not sent".
    fn is_present(&self) -> bool {
        match self {
            SubmittedAt::Millis(ms) => *ms != 0.0,
            SubmittedAt::Text(s) => !s.is_empty(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WebhookMessage {
    pub text: String,
}

impl LeadPayload {
    pub fn parse(body: &[u8]) -> Result<Self, LeadError> {
        serde_json::from_slice(body).map_err(|_| LeadError::InvalidJson)
    }

    pub fn require_email(&self) -> Result<&str, LeadError> {
        non_empty(&self.work_email).ok_or(LeadError::MissingEmail)
    }

    pub fn is_spam(&self) -> bool {
        self.website.as_ref().is_some_and(is_truthy)
    }

    pub fn check_freshness(&self, now_ms: i64, conf: &FreshnessConf) -> Result<(), LeadError> {
        let Some(submitted) = self.submitted_at.as_ref().filter(|s| s.is_present()) else {
            return Ok(());
        };

        let submitted = submitted.millis();
        if !submitted.is_finite() {
            return Err(LeadError::InvalidSubmissionTime);
        }
        let now = now_ms as f64;
        if submitted > now + conf.max_skew_ms as f64 {
            return Err(LeadError::InvalidSubmissionTime);
        }
        if now - submitted > conf.max_age_ms as f64 {
            return Err(LeadError::Expired);
        }
        Ok(())
    }

    /// One line per field, `-` for anything left blank.
    pub fn summary(&self) -> String {
        let email = non_empty(&self.work_email).unwrap_or("-").to_string();
        let mut lines = vec![format!("Work email: {email}")];
        for (label, value) in [
            ("Company / team", &self.company_name),
            ("Company size", &self.company_size),
            ("Role", &self.role),
            ("Usage", &self.usage),
        ] {
            let text = value.as_ref().filter(|v| is_truthy(v)).map(display_value);
            lines.push(format!("{label}: {}", text.as_deref().unwrap_or("-")));
        }
        lines.join("\n")
    }

    pub fn to_webhook_message(&self) -> WebhookMessage {
        WebhookMessage { text: format!("{LEAD_TITLE}\n{}", self.summary()) }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// `null`, `false`, `0` and `""` count as blank.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings verbatim, everything else as its JSON text.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
