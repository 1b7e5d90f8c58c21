//! Chart-ready trend series over the most recent observations.
//!
//! The dashboard renders three time-series charts (blood pressure, heart
//! rate, oxygen saturation) over the last ten timestamped records. This
//! module builds the parallel series those charts bind to; rendering itself
//! lives in the frontend.

use serde::Serialize;

use crate::models::VitalsRecord;
use crate::pipeline::{classify_spo2, CriticalityBand, Thresholds};

/// Number of records the dashboard charts cover.
pub const TREND_WINDOW_LEN: usize = 10;

/// Width of the patient-id axis label.
const LABEL_LEN: usize = 6;

/// One SpO2 data point together with the band used to color it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spo2Point {
    pub value: Option<f64>,
    pub band: Option<CriticalityBand>,
}

/// Parallel series for the pressure, heart-rate and SpO2 charts, in
/// chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendWindow {
    pub labels: Vec<String>,
    pub pressure: Vec<Option<String>>,
    pub hr: Vec<Option<i64>>,
    pub spo2: Vec<Spo2Point>,
}

impl TrendWindow {
    /// Build the series over the most recent `len` records.
    ///
    /// Records without a timestamp cannot be placed on a time axis and are
    /// skipped. An empty snapshot yields an empty window.
    pub fn build(records: &[VitalsRecord], len: usize, thresholds: &Thresholds) -> Self {
        let mut recent: Vec<&VitalsRecord> =
            records.iter().filter(|r| r.created_at.is_some()).collect();
        recent.sort_by_key(|r| r.created_at);
        let skip = recent.len().saturating_sub(len);

        let mut window = TrendWindow::default();
        for record in &recent[skip..] {
            window.labels.push(label_for(&record.patient_id));
            window.pressure.push(if record.vitals.pressure.is_empty() {
                None
            } else {
                Some(record.vitals.pressure.clone())
            });
            window.hr.push(record.vitals.hr);
            window.spo2.push(Spo2Point {
                value: record.vitals.spo2,
                band: classify_spo2(record.vitals.spo2, thresholds),
            });
        }
        window
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Axis label: the first few characters of the patient id.
fn label_for(patient_id: &str) -> String {
    if patient_id.is_empty() {
        return "N/A".to_string();
    }
    patient_id.chars().take(LABEL_LEN).collect()
}
