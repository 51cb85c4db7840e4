use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{RunError, RunResult};
use crate::models::{CustomerId, TrajectoryRecord};
use crate::simulator::BatchOutcome;

pub const TRAJECTORY_HEADER: &str = "customer_id;ticket_id;x;y;picking;x_y_date_time";

/// Where run results are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    pub trajectory: PathBuf,
    pub report: Option<PathBuf>,
    pub heatmap: Option<PathBuf>,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            trajectory: PathBuf::from("data/output.csv"),
            report: None,
            heatmap: None,
        }
    }
}

/// Writes the header and one `;`-delimited row per record
pub fn write_trajectory<W: Write>(mut writer: W, records: &[TrajectoryRecord]) -> io::Result<()> {
    writeln!(writer, "{}", TRAJECTORY_HEADER)?;
    for record in records {
        writeln!(writer, "{}", record.to_row())?;
    }
    writer.flush()
}

pub fn save_trajectory(path: &Path, records: &[TrajectoryRecord]) -> RunResult<()> {
    let io_error = |source| RunError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    write_trajectory(BufWriter::new(file), records).map_err(io_error)
}

/// One customer the run had to abandon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub customer_id: CustomerId,
    pub error: String,
}

/// Summary of a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub customers_total: usize,
    pub customers_routed: usize,
    pub records_written: usize,
    pub failures: Vec<FailureEntry>,
}

impl RunReport {
    pub fn from_outcome(outcome: &BatchOutcome) -> Self {
        Self {
            customers_total: outcome.routed + outcome.failures.len(),
            customers_routed: outcome.routed,
            records_written: outcome.records.len(),
            failures: outcome
                .failures
                .iter()
                .map(|failure| FailureEntry {
                    customer_id: failure.customer_id.clone(),
                    error: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

pub fn save_report(path: &Path, report: &RunReport) -> RunResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(|source| RunError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_write_trajectory() {
        let record = TrajectoryRecord {
            customer_id: "c1".into(),
            ticket_id: "T1".into(),
            x: 0,
            y: 1,
            is_picking: false,
            timestamp: NaiveDate::from_ymd_opt(2023, 11, 2)
                .unwrap()
                .and_hms_opt(9, 29, 0)
                .unwrap(),
        };
        let mut buffer = Vec::new();
        write_trajectory(&mut buffer, &[record]).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "customer_id;ticket_id;x;y;picking;x_y_date_time\nc1;T1;0;1;0;2023-11-02 09:29:00\n"
        );
    }

    #[test]
    fn test_report_serializes() {
        let report = RunReport {
            customers_total: 2,
            customers_routed: 1,
            records_written: 20,
            failures: vec![FailureEntry {
                customer_id: "c2".into(),
                error: "article z bought by customer c2 has no pickup location".into(),
            }],
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: RunReport = serde_json::from_str(&json).unwrap();

        assert_eq!(back, report);
    }
}
