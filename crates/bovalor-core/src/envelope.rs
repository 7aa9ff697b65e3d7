//! Response envelope emitted by the CLI.
//!
//! Every command answers with the same shape: metadata, then either `data`
//! or a structured `error`. Non-fatal per-ticker issues ride along in
//! `meta.warnings` instead of failing the envelope.

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::data_source::FetchError;
use crate::ProviderId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeMeta {
    pub request_id: Uuid,
    /// RFC 3339 UTC timestamp of envelope assembly.
    pub generated_at: String,
    pub source: ProviderId,
    pub latency_ms: u64,
    pub cache_hit: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(source: ProviderId, latency_ms: u64, cache_hit: bool) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            generated_at: now_rfc3339(),
            source,
            latency_ms,
            cache_hit,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeError {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl From<&FetchError> for EnvelopeError {
    fn from(error: &FetchError) -> Self {
        Self {
            code: error.code(),
            message: error.message().to_owned(),
            retryable: error.retryable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(meta: EnvelopeMeta, error: EnvelopeError) -> Self {
        Self {
            meta,
            data: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_error_field() {
        let meta = EnvelopeMeta::new(ProviderId::Offline, 12, false);
        let envelope = Envelope::success(meta, serde_json::json!({"pe": 9.5}));

        let rendered = serde_json::to_string(&envelope).expect("serializable");
        assert!(envelope.is_success());
        assert!(!rendered.contains("\"error\""));
        assert!(rendered.contains("\"source\":\"offline\""));
    }

    #[test]
    fn failure_envelope_carries_code_and_retryability() {
        let fetch_error = FetchError::rate_limited("slow down");
        let meta = EnvelopeMeta::new(ProviderId::Yahoo, 420, false);
        let envelope: Envelope<serde_json::Value> =
            Envelope::failure(meta, EnvelopeError::from(&fetch_error));

        assert!(!envelope.is_success());
        let error = envelope.error.expect("error present");
        assert_eq!(error.code, "fetch.rate_limited");
        assert!(error.retryable);
    }

    #[test]
    fn warnings_serialize_only_when_present() {
        let meta = EnvelopeMeta::new(ProviderId::Offline, 1, true)
            .with_warnings(vec![String::from("PETR4.SA: timeout (fetch.unavailable)")]);
        let envelope = Envelope::success(meta, serde_json::json!({}));

        let rendered = serde_json::to_string(&envelope).expect("serializable");
        assert!(rendered.contains("warnings"));
        assert!(rendered.contains("cache_hit"));
    }
}
