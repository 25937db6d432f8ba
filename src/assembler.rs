//! Fragment classification and per-terminal record assembly.
//!
//! The scheduler prints each UE's metrics scattered over several log lines.
//! The classifier recognizes the five line shapes that carry metrics and
//! reduces each to a [`Fragment`]; the assembler correlates fragments by
//! RNTI in an in-progress table and emits a [`UeRecord`] when the uplink
//! PHY fragment (the last line the scheduler prints per UE) arrives.

use anyhow::{Context, Result};
use chrono::Local;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::record::{SyncState, UeRecord};

/// One recognized log line, reduced to the fields it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// `UE RNTI <id> CU-UE-ID <n> <state> PH <n> dB PCMAX <n> dBm, average RSRP <n>`
    Identity {
        rnti: String,
        terminal_id: i64,
        state: SyncState,
        power_headroom: i64,
        max_tx_power: i64,
        rsrp: i64,
    },
    /// `UE <id>: CQI <n>, RI <n>`
    ChannelQuality { rnti: String, cqi: i64, dl_rank: i64 },
    /// `UE <id>: UL-RI <n>`
    UplinkRank { rnti: String, ul_rank: i64 },
    /// `UE <id>: ... dlsch_errors <n>, pucch0_DTX <n>, BLER <f> MCS ... <n>`
    DownlinkErrors {
        rnti: String,
        dlsch_errors: i64,
        pucch_dtx: i64,
        dl_bler: f64,
        dl_mcs: i64,
    },
    /// `UE <id>: ... ulsch_errors <n>, ulsch_DTX <n>, BLER <f> MCS (1) <n> ... NPRB <n>  SNR <f>`
    ///
    /// Terminating: applying this fragment completes the record.
    UplinkErrors {
        rnti: String,
        ulsch_errors: i64,
        ulsch_dtx: i64,
        ul_bler: f64,
        ul_mcs: i64,
        nprb: i64,
        snr: f64,
    },
}

impl Fragment {
    pub fn rnti(&self) -> &str {
        match self {
            Fragment::Identity { rnti, .. }
            | Fragment::ChannelQuality { rnti, .. }
            | Fragment::UplinkRank { rnti, .. }
            | Fragment::DownlinkErrors { rnti, .. }
            | Fragment::UplinkErrors { rnti, .. } => rnti,
        }
    }
}

fn int_field(caps: &Captures, group: usize, name: &str) -> Result<i64> {
    let raw = caps.get(group).map_or("", |m| m.as_str());
    raw.parse()
        .with_context(|| format!("field '{}' is not an integer: '{}'", name, raw))
}

fn float_field(caps: &Captures, group: usize, name: &str) -> Result<f64> {
    let raw = caps.get(group).map_or("", |m| m.as_str());
    raw.parse()
        .with_context(|| format!("field '{}' is not a number: '{}'", name, raw))
}

/// Matches log lines against the five fragment shapes, in priority order.
///
/// A line matching none of the shapes is not an error; the scheduler prints
/// plenty of lines (MAC byte counts, LCID stats, frame headers) that carry
/// nothing we keep.
pub struct FragmentClassifier {
    identity: Regex,
    channel_quality: Regex,
    uplink_rank: Regex,
    downlink_errors: Regex,
    uplink_errors: Regex,
}

impl FragmentClassifier {
    pub fn new() -> Result<Self> {
        // The state token needs `[\w-]+`, not `\w+-\w+`: `out-of-sync`
        // carries two hyphens.
        let identity = Regex::new(
            r"UE RNTI (\w+) CU-UE-ID (\d+) ([\w-]+) PH (\d+) dB PCMAX (\d+) dBm, average RSRP (-?\d+)",
        )
        .context("failed to compile basic status pattern")?;

        let channel_quality =
            Regex::new(r"UE (\w+): CQI (\d+), RI (\d+)").context("failed to compile CQI pattern")?;

        let uplink_rank =
            Regex::new(r"UE (\w+): UL-RI (\d+)").context("failed to compile UL-RI pattern")?;

        let downlink_errors = Regex::new(
            r"UE (\w+):.+ dlsch_errors (\d+), pucch0_DTX (\d+), BLER ([0-9.]+) MCS .+ (\d+)",
        )
        .context("failed to compile DL PHY pattern")?;

        let uplink_errors = Regex::new(
            r"UE (\w+):.+ ulsch_errors (\d+), ulsch_DTX (\d+), BLER ([0-9.]+) MCS \(1\) (\d+) .+ NPRB (\d+)  SNR ([0-9.]+)",
        )
        .context("failed to compile UL PHY pattern")?;

        Ok(Self {
            identity,
            channel_quality,
            uplink_rank,
            downlink_errors,
            uplink_errors,
        })
    }

    /// Classify one line. `Ok(None)` means the line carries no metrics.
    /// `Err` means the line matched a shape but a field inside it could not
    /// be converted; the error names the field and the offending text.
    pub fn classify(&self, line: &str) -> Result<Option<Fragment>> {
        if let Some(caps) = self.identity.captures(line) {
            let state_token = caps.get(3).map_or("", |m| m.as_str());
            let state = SyncState::parse(state_token).with_context(|| {
                format!("field 'state' is not a sync state: '{}'", state_token)
            })?;
            return Ok(Some(Fragment::Identity {
                rnti: caps[1].to_string(),
                terminal_id: int_field(&caps, 2, "terminal_id")?,
                state,
                power_headroom: int_field(&caps, 4, "power_headroom")?,
                max_tx_power: int_field(&caps, 5, "max_tx_power")?,
                rsrp: int_field(&caps, 6, "rsrp")?,
            }));
        }

        if let Some(caps) = self.channel_quality.captures(line) {
            return Ok(Some(Fragment::ChannelQuality {
                rnti: caps[1].to_string(),
                cqi: int_field(&caps, 2, "cqi")?,
                dl_rank: int_field(&caps, 3, "dl_rank")?,
            }));
        }

        if let Some(caps) = self.uplink_rank.captures(line) {
            return Ok(Some(Fragment::UplinkRank {
                rnti: caps[1].to_string(),
                ul_rank: int_field(&caps, 2, "ul_rank")?,
            }));
        }

        if let Some(caps) = self.downlink_errors.captures(line) {
            return Ok(Some(Fragment::DownlinkErrors {
                rnti: caps[1].to_string(),
                dlsch_errors: int_field(&caps, 2, "dlsch_errors")?,
                pucch_dtx: int_field(&caps, 3, "pucch_dtx")?,
                dl_bler: float_field(&caps, 4, "dl_bler")?,
                dl_mcs: int_field(&caps, 5, "dl_mcs")?,
            }));
        }

        if let Some(caps) = self.uplink_errors.captures(line) {
            return Ok(Some(Fragment::UplinkErrors {
                rnti: caps[1].to_string(),
                ulsch_errors: int_field(&caps, 2, "ulsch_errors")?,
                ulsch_dtx: int_field(&caps, 3, "ulsch_dtx")?,
                ul_bler: float_field(&caps, 4, "ul_bler")?,
                ul_mcs: int_field(&caps, 5, "ul_mcs")?,
                nprb: int_field(&caps, 6, "nprb")?,
                snr: float_field(&caps, 7, "snr")?,
            }));
        }

        Ok(None)
    }
}

/// What feeding one line to the assembler did.
#[derive(Debug)]
pub enum Outcome {
    /// Line carried no metrics; discarded with no effect.
    Ignored,
    /// Fragment applied to an in-progress record.
    Applied,
    /// Terminating fragment observed; the record is complete and removed
    /// from the in-progress table.
    Completed(UeRecord),
}

/// Correlates fragments by RNTI and emits completed records.
///
/// A single assembler processes fragments strictly sequentially; the
/// in-progress table is owned here exclusively, so no locking is involved.
pub struct Assembler {
    classifier: FragmentClassifier,
    in_progress: HashMap<String, UeRecord>,
}

impl Assembler {
    pub fn new() -> Result<Self> {
        Ok(Self {
            classifier: FragmentClassifier::new()?,
            in_progress: HashMap::new(),
        })
    }

    /// Feed one raw line. A classification failure leaves the in-progress
    /// table untouched and is returned for diagnostics; the assembler stays
    /// usable for the next line.
    pub fn ingest(&mut self, line: &str) -> Result<Outcome> {
        match self.classifier.classify(line)? {
            Some(fragment) => Ok(match self.apply(fragment) {
                Some(record) => Outcome::Completed(record),
                None => Outcome::Applied,
            }),
            None => Ok(Outcome::Ignored),
        }
    }

    /// Number of terminals with a partial record awaiting the terminating
    /// fragment.
    pub fn pending(&self) -> usize {
        self.in_progress.len()
    }

    fn apply(&mut self, fragment: Fragment) -> Option<UeRecord> {
        // Create-on-demand for every fragment kind: a terminal first seen
        // mid-sequence still accumulates whatever fields arrive from here on.
        let rnti = fragment.rnti().to_string();
        let entry = self
            .in_progress
            .entry(rnti.clone())
            .or_insert_with(|| UeRecord::new(&rnti));

        match fragment {
            Fragment::Identity {
                terminal_id,
                state,
                power_headroom,
                max_tx_power,
                rsrp,
                ..
            } => {
                entry.timestamp = Local::now();
                entry.terminal_id = terminal_id;
                entry.state = state;
                entry.power_headroom = power_headroom;
                entry.max_tx_power = max_tx_power;
                entry.rsrp = rsrp;
                None
            }
            Fragment::ChannelQuality { cqi, dl_rank, .. } => {
                entry.cqi = cqi;
                entry.dl_rank = dl_rank;
                None
            }
            Fragment::UplinkRank { ul_rank, .. } => {
                entry.ul_rank = ul_rank;
                None
            }
            Fragment::DownlinkErrors {
                dlsch_errors,
                pucch_dtx,
                dl_bler,
                dl_mcs,
                ..
            } => {
                entry.dlsch_errors = dlsch_errors;
                entry.pucch_dtx = pucch_dtx;
                entry.dl_bler = dl_bler;
                entry.dl_mcs = dl_mcs;
                None
            }
            Fragment::UplinkErrors {
                ulsch_errors,
                ulsch_dtx,
                ul_bler,
                ul_mcs,
                nprb,
                snr,
                ..
            } => {
                entry.ulsch_errors = ulsch_errors;
                entry.ulsch_dtx = ulsch_dtx;
                entry.ul_bler = ul_bler;
                entry.ul_mcs = ul_mcs;
                entry.nprb = nprb;
                entry.snr = snr;
                self.in_progress.remove(&rnti)
            }
        }
    }
}
