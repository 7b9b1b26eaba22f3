//! Caller identification: origin allow-list and rate-limit key.

use axum::http::HeaderMap;
use std::collections::HashSet;
use url::Url;

use crate::error::LeadError;

const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: HashSet<String>,
}

impl OriginPolicy {
    /// Entries are normalised, so `https://webclaw.dev/` and `https://webclaw.dev` are the same origin.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = allowed
            .into_iter()
            .map(|o| origin_of(o.as_ref()).unwrap_or_else(|| o.as_ref().to_string()))
            .collect();
        Self { allowed }
    }

    /// `Origin`, else `Referer`, reduced to scheme://host[:port] and checked against the allow-list.
    pub fn check(&self, headers: &HeaderMap) -> Result<String, LeadError> {
        let raw = header_str(headers, "origin")
            .or_else(|| header_str(headers, "referer"))
            .ok_or(LeadError::MissingOrigin)?;
        let origin = origin_of(raw).ok_or(LeadError::InvalidOrigin)?;

        if !self.allowed.contains(&origin) {
            return Err(LeadError::ForbiddenOrigin);
        }
        Ok(origin)
    }
}

fn origin_of(raw: &str) -> Option<String> {
    Url::parse(raw).ok().map(|u| u.origin().ascii_serialization())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Rate-limit key: `CF-Connecting-IP`, else `X-Forwarded-For` as sent, else "unknown".
pub fn client_key(headers: &HeaderMap) -> String {
    header_str(headers, "cf-connecting-ip")
        .or_else(|| header_str(headers, "x-forwarded-for"))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
