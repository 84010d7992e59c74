//! One snapshot of the lockbox state, produced fresh each monitor tick.

use std::time::{SystemTime, UNIX_EPOCH};

use lockbox_proto::{LockStatus, UserStatus, VocReading};

/// Aggregated lockbox state. Attributes whose read failed are absent and
/// rendered as their documented defaults in the wire payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    /// Capture time, Unix seconds on the client clock.
    pub captured_at: u64,
    /// Defaults to `"unknown"` when the read failed.
    pub username: String,
    pub lock_status: Option<LockStatus>,
    pub user_status: Option<UserStatus>,
    pub voc: Option<VocReading>,
}

/// One `{variable, value}` pair of the sink payload.
#[derive(Debug, serde::Serialize)]
pub struct Entry {
    pub variable: &'static str,
    pub value: serde_json::Value,
}

impl TelemetrySample {
    /// The sink payload, in the fixed field order the dashboard expects.
    pub fn to_entries(&self) -> Vec<Entry> {
        let lock_status = match self.lock_status {
            Some(status) => status.to_string(),
            None => "unknown".to_string(),
        };
        let user = self.user_status;
        let voc = self.voc;
        vec![
            Entry {
                variable: "timestamp",
                value: self.captured_at.into(),
            },
            Entry {
                variable: "lock_status",
                value: lock_status.into(),
            },
            Entry {
                variable: "username",
                value: self.username.clone().into(),
            },
            Entry {
                variable: "system_locked",
                value: user.map(|u| u.system_locked).unwrap_or(false).into(),
            },
            Entry {
                variable: "failed_attempts",
                value: user.map(|u| u.failed_attempts).unwrap_or(0).into(),
            },
            Entry {
                variable: "tamper_detected",
                value: user.map(|u| u.tamper_detected).unwrap_or(false).into(),
            },
            Entry {
                variable: "current_voc",
                value: voc.map(|v| v.current_voc).unwrap_or(0).into(),
            },
            Entry {
                variable: "voc_threshold",
                value: voc.map(|v| v.threshold).unwrap_or(0).into(),
            },
        ]
    }
}

/// Current Unix timestamp, saturating to 0 before the epoch.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
