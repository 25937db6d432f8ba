//! CSV serialization of assembled records.

use crate::record::UeRecord;

/// Column order of the output table. `identifier` is the RNTI; the BLER/MCS
/// pairs sit next to the error counters of their own link direction.
pub const COLUMNS: [&str; 20] = [
    "timestamp",
    "identifier",
    "terminal_id",
    "state",
    "power_headroom",
    "max_tx_power",
    "rsrp",
    "cqi",
    "dl_rank",
    "ul_rank",
    "dlsch_errors",
    "pucch_dtx",
    "dl_bler",
    "dl_mcs",
    "ulsch_errors",
    "ulsch_dtx",
    "ul_bler",
    "ul_mcs",
    "nprb",
    "snr",
];

/// Quote a value if it contains the delimiter, quotes or newlines; inner
/// quotes are doubled.
fn escape_csv_value(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Formats records as CSV rows in the fixed column order above.
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn new() -> Self {
        CsvFormatter
    }

    pub fn format_header(&self) -> String {
        COLUMNS.join(",")
    }

    /// Format one data row. No trailing newline; the sink appends it.
    pub fn format_record(&self, record: &UeRecord) -> String {
        let fields = [
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            escape_csv_value(&record.rnti),
            record.terminal_id.to_string(),
            record.state.to_string(),
            record.power_headroom.to_string(),
            record.max_tx_power.to_string(),
            record.rsrp.to_string(),
            record.cqi.to_string(),
            record.dl_rank.to_string(),
            record.ul_rank.to_string(),
            record.dlsch_errors.to_string(),
            record.pucch_dtx.to_string(),
            record.dl_bler.to_string(),
            record.dl_mcs.to_string(),
            record.ulsch_errors.to_string(),
            record.ulsch_dtx.to_string(),
            record.ul_bler.to_string(),
            record.ul_mcs.to_string(),
            record.nprb.to_string(),
            record.snr.to_string(),
        ];
        fields.join(",")
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SyncState;

    #[test]
    fn test_header_matches_column_order() {
        let formatter = CsvFormatter::new();
        assert_eq!(
            formatter.format_header(),
            "timestamp,identifier,terminal_id,state,power_headroom,max_tx_power,rsrp,cqi,\
             dl_rank,ul_rank,dlsch_errors,pucch_dtx,dl_bler,dl_mcs,ulsch_errors,ulsch_dtx,\
             ul_bler,ul_mcs,nprb,snr"
        );
    }

    #[test]
    fn test_format_record_row() {
        let mut record = UeRecord::new("928c");
        record.terminal_id = 1;
        record.state = SyncState::InSync;
        record.power_headroom = 45;
        record.max_tx_power = 21;
        record.rsrp = -83;
        record.cqi = 13;
        record.dl_rank = 2;
        record.ul_rank = 1;
        record.pucch_dtx = 9;
        record.dl_bler = 0.02678;
        record.dl_mcs = 22;
        record.ul_bler = 0.0739;
        record.ul_mcs = 6;
        record.nprb = 106;
        record.snr = 17.5;

        let row = CsvFormatter::new().format_record(&record);
        let expected_tail =
            "928c,1,in-sync,45,21,-83,13,2,1,0,9,0.02678,22,0,0,0.0739,6,106,17.5";
        let timestamp = record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        assert_eq!(row, format!("{},{}", timestamp, expected_tail));
        assert_eq!(row.split(',').count(), COLUMNS.len());
    }

    #[test]
    fn test_zero_record_row_has_all_columns() {
        let record = UeRecord::new("0001");
        let row = CsvFormatter::new().format_record(&record);
        assert_eq!(row.split(',').count(), COLUMNS.len());
        assert!(row.contains(",out-of-sync,"));
    }

    #[test]
    fn test_escape_csv_value() {
        assert_eq!(escape_csv_value("plain"), "plain");
        assert_eq!(escape_csv_value("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_value("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
