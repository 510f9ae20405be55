//! Normalized API origins.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;
use url::Url;

/// Errors produced while parsing an origin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OriginError {
    #[error("invalid URL '{input}': {reason}")]
    Invalid { input: String, reason: String },

    #[error("unsupported scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("URL '{0}' has no host")]
    MissingHost(String),
}

/// Scheme + host (+ port) of an API server. Never carries a path or trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    url: Url,
    text: String,
}

impl Origin {
    /// Parse and normalize an origin. Any path, query or fragment is dropped.
    pub fn parse(input: &str) -> Result<Self, OriginError> {
        let trimmed = input.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).map_err(|e| OriginError::Invalid {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(url)
    }

    fn from_url(url: Url) -> Result<Self, OriginError> {
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(OriginError::UnsupportedScheme(other.to_string())),
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(OriginError::MissingHost(url.to_string()));
        }

        let text = url.origin().ascii_serialization();
        let url = Url::parse(&text).map_err(|e| OriginError::Invalid {
            input: text.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { url, text })
    }

    /// The origin as `scheme://host[:port]`.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_https(&self) -> bool {
        self.url.scheme() == "https"
    }

    /// Same host and port over HTTPS, or `None` if already HTTPS.
    pub fn https_variant(&self) -> Option<Origin> {
        if self.is_https() {
            return None;
        }
        let mut url = self.url.clone();
        url.set_scheme("https").ok()?;
        Self::from_url(url).ok()
    }

    /// Absolute URL for `path` on this origin.
    pub fn join(&self, path: &str) -> Result<Url, OriginError> {
        let joined = if path.is_empty() || path.starts_with('/') {
            format!("{}{}", self.text, path)
        } else {
            format!("{}/{}", self.text, path)
        };
        Url::parse(&joined).map_err(|e| OriginError::Invalid {
            input: joined.clone(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Origin {
    type Err = OriginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Origin::parse(s)
    }
}

impl AsRef<str> for Origin {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl Serialize for Origin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}
