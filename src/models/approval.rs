use std::fmt;

use serde::{Deserialize, Serialize};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time as `YYYY-MM-DD HH:MM:SS`.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Terminal outcome a reviewer can record for a token.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }

    /// Capitalized form used in page titles and headings.
    pub fn title(self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Rejected => "Rejected",
        }
    }

    /// Filename prefix of the marker recording this decision.
    pub fn marker_prefix(self) -> &'static str {
        match self {
            Decision::Approved => "APPROVE_",
            Decision::Rejected => "REJECT_",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status derived from the markers present for a token. Never stored.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Unknown,
}

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Decision> for ApprovalStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => ApprovalStatus::Approved,
            Decision::Rejected => ApprovalStatus::Rejected,
        }
    }
}

/// Body of `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub token: String,
    pub status: ApprovalStatus,
    pub timestamp: String,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

/// A token found in the pending directory, with its current status.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct PendingEntry {
    pub token: String,
    pub status: ApprovalStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        let resp = StatusResponse {
            token: "abc123".into(),
            status: ApprovalStatus::Approved,
            timestamp: "2024-01-01 00:00:00".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "approved");
        assert_eq!(json["token"], "abc123");
    }

    #[test]
    fn test_decision_markers() {
        assert_eq!(Decision::Approved.marker_prefix(), "APPROVE_");
        assert_eq!(Decision::Rejected.marker_prefix(), "REJECT_");
        assert_eq!(
            ApprovalStatus::from(Decision::Rejected),
            ApprovalStatus::Rejected
        );
        assert_eq!(Decision::Approved.to_string(), "approved");
    }
}
