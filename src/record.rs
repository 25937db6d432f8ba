//! Assembled per-terminal telemetry records.

use chrono::{DateTime, Local};
use std::fmt;

/// Synchronization state reported for a UE in the scheduler's basic status
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    InSync,
    #[default]
    OutOfSync,
}

impl SyncState {
    /// Parse the state token of a basic status line (`in-sync` /
    /// `out-of-sync`).
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "in-sync" => Some(SyncState::InSync),
            "out-of-sync" => Some(SyncState::OutOfSync),
            _ => None,
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::InSync => write!(f, "in-sync"),
            SyncState::OutOfSync => write!(f, "out-of-sync"),
        }
    }
}

/// One terminal's assembled link-quality snapshot.
///
/// Every field except `rnti` and `timestamp` starts at its zero value and is
/// overwritten as matching log fragments arrive. A record leaves the
/// assembler only once the uplink PHY fragment has been observed.
#[derive(Debug, Clone, PartialEq)]
pub struct UeRecord {
    /// Radio network temporary identifier, stable for the record's lifetime.
    pub rnti: String,
    /// CU-assigned UE id.
    pub terminal_id: i64,
    pub state: SyncState,
    /// Power headroom, dB.
    pub power_headroom: i64,
    /// Maximum UL transmit power, dBm.
    pub max_tx_power: i64,
    /// Average reference signal received power.
    pub rsrp: i64,
    /// Channel quality index.
    pub cqi: i64,
    pub dl_rank: i64,
    pub ul_rank: i64,
    pub dlsch_errors: i64,
    pub pucch_dtx: i64,
    pub dl_bler: f64,
    pub dl_mcs: i64,
    pub ulsch_errors: i64,
    pub ulsch_dtx: i64,
    pub ul_bler: f64,
    pub ul_mcs: i64,
    /// Number of physical resource blocks scheduled.
    pub nprb: i64,
    /// Uplink signal-to-noise ratio, dB.
    pub snr: f64,
    /// Wall-clock capture time, refreshed whenever a basic status fragment
    /// arrives.
    pub timestamp: DateTime<Local>,
}

impl UeRecord {
    pub fn new(rnti: &str) -> Self {
        Self {
            rnti: rnti.to_string(),
            terminal_id: 0,
            state: SyncState::default(),
            power_headroom: 0,
            max_tx_power: 0,
            rsrp: 0,
            cqi: 0,
            dl_rank: 0,
            ul_rank: 0,
            dlsch_errors: 0,
            pucch_dtx: 0,
            dl_bler: 0.0,
            dl_mcs: 0,
            ulsch_errors: 0,
            ulsch_dtx: 0,
            ul_bler: 0.0,
            ul_mcs: 0,
            nprb: 0,
            snr: 0.0,
            timestamp: Local::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_state_parse() {
        assert_eq!(SyncState::parse("in-sync"), Some(SyncState::InSync));
        assert_eq!(SyncState::parse("out-of-sync"), Some(SyncState::OutOfSync));
        assert_eq!(SyncState::parse("mid-sync"), None);
        assert_eq!(SyncState::parse(""), None);
    }

    #[test]
    fn test_sync_state_display() {
        assert_eq!(SyncState::InSync.to_string(), "in-sync");
        assert_eq!(SyncState::OutOfSync.to_string(), "out-of-sync");
    }

    #[test]
    fn test_new_record_has_zero_metrics() {
        let record = UeRecord::new("928c");
        assert_eq!(record.rnti, "928c");
        assert_eq!(record.state, SyncState::OutOfSync);
        assert_eq!(record.terminal_id, 0);
        assert_eq!(record.cqi, 0);
        assert_eq!(record.dl_bler, 0.0);
        assert_eq!(record.snr, 0.0);
    }
}
