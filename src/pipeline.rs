//! Filter, sort and classify patient vitals records.
//!
//! The pipeline is a pure function of its inputs: the caller hands it the
//! latest snapshot of the user's records together with the current view
//! parameters and gets back the ordered subset to display plus aggregate
//! band counts. It performs no I/O and never fails; missing values fall
//! back to explicit defaults (epoch zero, empty string, zero) instead of
//! erroring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::VitalsRecord;

/// Clinical thresholds for criticality bands and heart-rate status.
///
/// Defaults follow the usual adult resting reference values; deployments
/// can override them in the `[clinical]` section of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// SpO2 below this value is critical.
    pub spo2_critical_below: f64,
    /// SpO2 below this value, and at or above the critical bound, is warning.
    pub spo2_warning_below: f64,
    /// Heart rate below this value is bradycardia.
    pub hr_bradycardia_below: i64,
    /// Heart rate above this value is tachycardia.
    pub hr_tachycardia_above: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            spo2_critical_below: 90.0,
            spo2_warning_below: 95.0,
            hr_bradycardia_below: 60,
            hr_tachycardia_above: 100,
        }
    }
}

/// Criticality band, derived solely from oxygen saturation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalityBand {
    Critical,
    Warning,
    Normal,
}

/// Band filter selected in the dashboard; `All` bypasses band filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalityFilter {
    #[default]
    All,
    Critical,
    Warning,
    Normal,
}

impl CriticalityFilter {
    /// The band this filter selects; `None` for `All`.
    pub fn band(self) -> Option<CriticalityBand> {
        match self {
            Self::All => None,
            Self::Critical => Some(CriticalityBand::Critical),
            Self::Warning => Some(CriticalityBand::Warning),
            Self::Normal => Some(CriticalityBand::Normal),
        }
    }
}

/// Sort order applied to the filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Id,
    Hr,
    Spo2,
}

/// View parameters as selected in the dashboard filter bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewParams {
    /// Case-insensitive substring match against the patient id; the empty
    /// string disables the filter.
    pub search_id: String,
    pub criticality: CriticalityFilter,
    pub sort_by: SortKey,
}

/// Aggregate band counts over the full, unfiltered record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandCounts {
    pub critical_count: usize,
    pub warning_count: usize,
    pub normal_count: usize,
}

/// Heart-rate status relative to the configured resting range. Used by the
/// report generator, not by filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HrStatus {
    Bradycardia,
    Tachycardia,
    Normal,
}

/// Classify an oxygen saturation reading into its criticality band.
///
/// A record with no reading belongs to no band: it fails every non-`All`
/// criticality filter and contributes to none of the band counts.
pub fn classify_spo2(spo2: Option<f64>, thresholds: &Thresholds) -> Option<CriticalityBand> {
    let spo2 = spo2?;
    if spo2 < thresholds.spo2_critical_below {
        Some(CriticalityBand::Critical)
    } else if spo2 < thresholds.spo2_warning_below {
        Some(CriticalityBand::Warning)
    } else {
        Some(CriticalityBand::Normal)
    }
}

/// Heart-rate status for a recorded rate.
pub fn hr_status(hr: i64, thresholds: &Thresholds) -> HrStatus {
    if hr < thresholds.hr_bradycardia_below {
        HrStatus::Bradycardia
    } else if hr > thresholds.hr_tachycardia_above {
        HrStatus::Tachycardia
    } else {
        HrStatus::Normal
    }
}

/// Produce the ordered subset of records to display.
///
/// Applies the patient-id substring filter, then the criticality-band
/// filter, then imposes a total order per `sort_by`. The result is
/// recomputed from scratch on every call; the input snapshot is never
/// mutated. Equal sort keys keep their relative order, which callers must
/// not rely on.
pub fn apply_view(
    records: &[VitalsRecord],
    params: &ViewParams,
    thresholds: &Thresholds,
) -> Vec<VitalsRecord> {
    let needle = params.search_id.to_lowercase();
    let band = params.criticality.band();

    let mut filtered: Vec<VitalsRecord> = records
        .iter()
        .filter(|r| needle.is_empty() || r.patient_id.to_lowercase().contains(&needle))
        .filter(|r| match band {
            None => true,
            Some(band) => classify_spo2(r.vitals.spo2, thresholds) == Some(band),
        })
        .cloned()
        .collect();

    match params.sort_by {
        SortKey::Newest => {
            filtered.sort_by_key(|r| std::cmp::Reverse(created_at_or_epoch(r)));
        }
        SortKey::Oldest => {
            filtered.sort_by_key(created_at_or_epoch);
        }
        SortKey::Id => {
            filtered.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));
        }
        SortKey::Hr => {
            filtered.sort_by_key(|r| r.vitals.hr.unwrap_or(0));
        }
        SortKey::Spo2 => {
            filtered.sort_by(|a, b| {
                a.vitals
                    .spo2
                    .unwrap_or(0.0)
                    .total_cmp(&b.vitals.spo2.unwrap_or(0.0))
            });
        }
    }

    filtered
}

/// Count records per band over the full record set, independent of the
/// current filters. Unclassified records (no SpO2 reading) count toward
/// none of the three.
pub fn band_counts(records: &[VitalsRecord], thresholds: &Thresholds) -> BandCounts {
    let mut counts = BandCounts::default();
    for record in records {
        match classify_spo2(record.vitals.spo2, thresholds) {
            Some(CriticalityBand::Critical) => counts.critical_count += 1,
            Some(CriticalityBand::Warning) => counts.warning_count += 1,
            Some(CriticalityBand::Normal) => counts.normal_count += 1,
            None => {}
        }
    }
    counts
}

/// Epoch zero stands in for a missing `created_at`, so timestamp-less
/// records always sort as oldest possible.
fn created_at_or_epoch(record: &VitalsRecord) -> DateTime<Utc> {
    record.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vitals;
    use chrono::TimeZone;
    use test_case::test_case;

    fn record(patient_id: &str, spo2: Option<f64>) -> VitalsRecord {
        VitalsRecord {
            id: format!("id-{patient_id}"),
            patient_id: patient_id.to_string(),
            vitals: Vitals {
                spo2,
                ..Vitals::default()
            },
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
            created_by: "user-1".to_string(),
        }
    }

    fn record_at(patient_id: &str, secs: Option<i64>) -> VitalsRecord {
        VitalsRecord {
            created_at: secs.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
            ..record(patient_id, None)
        }
    }

    fn ids(records: &[VitalsRecord]) -> Vec<&str> {
        records.iter().map(|r| r.patient_id.as_str()).collect()
    }

    #[test_case(85.0 => Some(CriticalityBand::Critical) ; "well below critical bound")]
    #[test_case(89.9 => Some(CriticalityBand::Critical) ; "just below critical bound")]
    #[test_case(90.0 => Some(CriticalityBand::Warning) ; "critical bound itself is warning")]
    #[test_case(94.9 => Some(CriticalityBand::Warning) ; "just below warning bound")]
    #[test_case(95.0 => Some(CriticalityBand::Normal) ; "warning bound itself is normal")]
    #[test_case(100.0 => Some(CriticalityBand::Normal) ; "full saturation")]
    fn spo2_bands(spo2: f64) -> Option<CriticalityBand> {
        classify_spo2(Some(spo2), &Thresholds::default())
    }

    #[test]
    fn missing_spo2_is_unclassified() {
        assert_eq!(classify_spo2(None, &Thresholds::default()), None);
    }

    #[test_case(40 => HrStatus::Bradycardia ; "low rate")]
    #[test_case(59 => HrStatus::Bradycardia ; "just below resting range")]
    #[test_case(60 => HrStatus::Normal ; "lower bound of resting range")]
    #[test_case(100 => HrStatus::Normal ; "upper bound of resting range")]
    #[test_case(101 => HrStatus::Tachycardia ; "just above resting range")]
    fn hr_statuses(hr: i64) -> HrStatus {
        hr_status(hr, &Thresholds::default())
    }

    #[test]
    fn critical_filter_selects_only_critical_records() {
        let records = vec![
            record("P1", Some(85.0)),
            record("P2", Some(92.0)),
            record("P3", Some(98.0)),
        ];
        let params = ViewParams {
            criticality: CriticalityFilter::Critical,
            ..ViewParams::default()
        };

        let view = apply_view(&records, &params, &Thresholds::default());
        assert_eq!(ids(&view), vec!["P1"]);

        let counts = band_counts(&records, &Thresholds::default());
        assert_eq!(counts.critical_count, 1);
        assert_eq!(counts.warning_count, 1);
        assert_eq!(counts.normal_count, 1);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let records = vec![record("P2xyz", Some(98.0)), record("Q7", Some(98.0))];
        let params = ViewParams {
            search_id: "p2".to_string(),
            ..ViewParams::default()
        };

        let view = apply_view(&records, &params, &Thresholds::default());
        assert_eq!(ids(&view), vec!["P2xyz"]);
    }

    #[test]
    fn all_filter_is_a_noop_on_top_of_search() {
        let records = vec![record("P1", Some(85.0)), record("P1b", None)];
        let searched_only = ViewParams {
            search_id: "p1".to_string(),
            ..ViewParams::default()
        };
        let searched_all = ViewParams {
            criticality: CriticalityFilter::All,
            ..searched_only.clone()
        };

        let thresholds = Thresholds::default();
        assert_eq!(
            apply_view(&records, &searched_only, &thresholds),
            apply_view(&records, &searched_all, &thresholds)
        );
    }

    #[test]
    fn record_without_spo2_only_appears_under_all() {
        let records = vec![record("P1", None)];
        let thresholds = Thresholds::default();

        for filter in [
            CriticalityFilter::Critical,
            CriticalityFilter::Warning,
            CriticalityFilter::Normal,
        ] {
            let params = ViewParams {
                criticality: filter,
                ..ViewParams::default()
            };
            assert!(apply_view(&records, &params, &thresholds).is_empty());
        }

        let all = apply_view(&records, &ViewParams::default(), &thresholds);
        assert_eq!(ids(&all), vec!["P1"]);

        let counts = band_counts(&records, &thresholds);
        assert_eq!(counts, BandCounts::default());
    }

    #[test]
    fn counts_sum_to_total_only_without_unclassified_records() {
        let thresholds = Thresholds::default();

        let complete = vec![record("A", Some(88.0)), record("B", Some(96.0))];
        let counts = band_counts(&complete, &thresholds);
        assert_eq!(
            counts.critical_count + counts.warning_count + counts.normal_count,
            complete.len()
        );

        let with_gap = vec![record("A", Some(88.0)), record("B", None)];
        let counts = band_counts(&with_gap, &thresholds);
        assert!(counts.critical_count + counts.warning_count + counts.normal_count < with_gap.len());
    }

    #[test]
    fn newest_sorts_descending_with_missing_timestamps_last() {
        let records = vec![
            record_at("old", Some(1_000)),
            record_at("untimed", None),
            record_at("new", Some(2_000)),
        ];
        let params = ViewParams {
            sort_by: SortKey::Newest,
            ..ViewParams::default()
        };

        let view = apply_view(&records, &params, &Thresholds::default());
        assert_eq!(ids(&view), vec!["new", "old", "untimed"]);
    }

    #[test]
    fn oldest_sorts_ascending_with_missing_timestamps_first() {
        let records = vec![
            record_at("new", Some(2_000)),
            record_at("old", Some(1_000)),
            record_at("untimed", None),
        ];
        let params = ViewParams {
            sort_by: SortKey::Oldest,
            ..ViewParams::default()
        };

        let view = apply_view(&records, &params, &Thresholds::default());
        assert_eq!(ids(&view), vec!["untimed", "old", "new"]);
    }

    #[test]
    fn id_sort_is_lexicographic() {
        let records = vec![record("P10", None), record("A3", None), record("P2", None)];
        let params = ViewParams {
            sort_by: SortKey::Id,
            ..ViewParams::default()
        };

        let view = apply_view(&records, &params, &Thresholds::default());
        assert_eq!(ids(&view), vec!["A3", "P10", "P2"]);
    }

    #[test]
    fn hr_sort_is_non_decreasing_with_missing_as_zero() {
        let mut records = vec![record("A", None), record("B", None), record("C", None)];
        records[0].vitals.hr = Some(72);
        records[1].vitals.hr = None;
        records[2].vitals.hr = Some(55);
        let params = ViewParams {
            sort_by: SortKey::Hr,
            ..ViewParams::default()
        };

        let view = apply_view(&records, &params, &Thresholds::default());
        let rates: Vec<i64> = view.iter().map(|r| r.vitals.hr.unwrap_or(0)).collect();
        assert!(rates.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(ids(&view), vec!["B", "C", "A"]);
    }

    #[test]
    fn spo2_sort_is_non_decreasing_with_missing_as_zero() {
        let records = vec![
            record("A", Some(97.0)),
            record("B", None),
            record("C", Some(88.5)),
        ];
        let params = ViewParams {
            sort_by: SortKey::Spo2,
            ..ViewParams::default()
        };

        let view = apply_view(&records, &params, &Thresholds::default());
        let values: Vec<f64> = view.iter().map(|r| r.vitals.spo2.unwrap_or(0.0)).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(ids(&view), vec!["B", "C", "A"]);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let records = vec![
            record("P1", Some(85.0)),
            record("P2", Some(92.0)),
            record("P3", None),
        ];
        let params = ViewParams {
            search_id: "p".to_string(),
            criticality: CriticalityFilter::All,
            sort_by: SortKey::Spo2,
        };
        let thresholds = Thresholds::default();

        let first = apply_view(&records, &params, &thresholds);
        let second = apply_view(&records, &params, &thresholds);
        assert_eq!(first, second);
        assert_eq!(
            band_counts(&records, &thresholds),
            band_counts(&records, &thresholds)
        );
    }

    #[test]
    fn custom_thresholds_move_the_band_boundaries() {
        let thresholds = Thresholds {
            spo2_critical_below: 85.0,
            spo2_warning_below: 92.0,
            ..Thresholds::default()
        };

        assert_eq!(
            classify_spo2(Some(86.0), &thresholds),
            Some(CriticalityBand::Warning)
        );
        assert_eq!(
            classify_spo2(Some(93.0), &thresholds),
            Some(CriticalityBand::Normal)
        );
    }
}
