//! Admission outcomes.

use axum::http::{HeaderMap, StatusCode};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Which gate step turned the request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Origin,
    RateLimit,
    Admin,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::Origin => "origin",
            RejectReason::RateLimit => "rate_limit",
            RejectReason::Admin => "admin",
        }
    }
}

/// A terminal "no" for one request.
///
/// Serializes as `{"message": ..., "statusCode": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub message: String,
    pub reason: RejectReason,
}

impl Rejection {
    pub fn new(status: StatusCode, message: impl Into<String>, reason: RejectReason) -> Self {
        Self {
            status,
            message: message.into(),
            reason,
        }
    }

    pub fn origin_not_allowed() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Origin not allowed", RejectReason::Origin)
    }

    pub fn admin_forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden resource", RejectReason::Admin)
    }
}

impl Serialize for Rejection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = serializer.serialize_struct("Rejection", 2)?;
        body.serialize_field("message", &self.message)?;
        body.serialize_field("statusCode", &self.status.as_u16())?;
        body.end()
    }
}

/// What the HTTP layer should do with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Forward to the handler.
    Allow,
    /// Answer a CORS preflight with this status and no body.
    Preflight(StatusCode),
    /// Answer with the rejection body.
    Reject(Rejection),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

/// A verdict plus the headers that go on the response whatever it is.
#[derive(Debug, Clone)]
pub struct Admission {
    pub verdict: Verdict,
    pub headers: HeaderMap,
    /// A rate-limit hit was recorded for this request.
    pub counted: bool,
}
