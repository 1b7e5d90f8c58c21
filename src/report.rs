//! Plain-text report rendering for single records and full summaries.
//!
//! The layout carries over the printed dashboard sheet: header band,
//! patient information, criticality badge, vitals table with a status
//! column, clinical notes, reference values and a generation footer.
//! Reports are assembled by a short-lived builder that is consumed on
//! render, so no document state outlives the export call.

use chrono::{DateTime, Utc};

use crate::models::VitalsRecord;
use crate::pipeline::{
    band_counts, classify_spo2, hr_status, CriticalityBand, HrStatus, Thresholds,
};

/// Report line width.
const PAGE_WIDTH: usize = 72;
/// Listing rows per page in the summary report.
const ROWS_PER_PAGE: usize = 25;
/// Placeholder for values that were not recorded.
const NOT_AVAILABLE: &str = "N/A";

/// Render the printable sheet for a single observation.
pub fn patient_report(
    record: &VitalsRecord,
    thresholds: &Thresholds,
    generated_at: DateTime<Utc>,
) -> String {
    let mut doc = ReportBuilder::new("VitalTrack", "Patient Vitals Sheet");

    doc.section("Patient Information");
    doc.line(format!("Patient ID:  {}", or_na(&record.patient_id)));
    doc.line(format!(
        "Recorded at: {}",
        record
            .created_at
            .map(format_timestamp)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    ));

    match classify_spo2(record.vitals.spo2, thresholds) {
        Some(CriticalityBand::Critical) => doc.badge("CRITICAL"),
        Some(CriticalityBand::Warning) => doc.badge("WARNING"),
        _ => {}
    }

    let hr_value = record
        .vitals
        .hr
        .map(|hr| format!("{hr} bpm"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let hr_stat = record
        .vitals
        .hr
        .map(|hr| hr_status_label(hr_status(hr, thresholds)))
        .unwrap_or("-");
    let spo2_value = record
        .vitals
        .spo2
        .map(|spo2| format!("{spo2}%"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let spo2_stat = classify_spo2(record.vitals.spo2, thresholds)
        .map(band_label)
        .unwrap_or("-");
    let bp_value = or_na(&record.vitals.pressure);

    doc.section("Vital Signs");
    doc.table(
        &[28, 16, 16],
        &[
            row(["Parameter", "Value", "Status"]),
            row(["Blood pressure (BP)", bp_value.as_str(), "-"]),
            row(["Heart rate (HR)", hr_value.as_str(), hr_stat]),
            row(["Oxygen saturation (SpO2)", spo2_value.as_str(), spo2_stat]),
        ],
    );

    if let Some(note) = record.vitals.note.as_deref().filter(|n| !n.is_empty()) {
        doc.section("Clinical Notes");
        doc.line(note);
    }

    let hr_range = format!(
        "{}-{} bpm",
        thresholds.hr_bradycardia_below, thresholds.hr_tachycardia_above
    );
    let spo2_range = format!(">= {}%", thresholds.spo2_warning_below);
    let spo2_note = format!("< {}% = critical", thresholds.spo2_critical_below);

    doc.section("Reference Values");
    doc.table(
        &[28, 18, 22],
        &[
            row(["Parameter", "Normal Range", "Notes"]),
            row(["HR", hr_range.as_str(), "Adult at rest"]),
            row(["SpO2", spo2_range.as_str(), spo2_note.as_str()]),
            row(["Systolic BP", "90-120 mmHg", "Indicative values"]),
            row(["Diastolic BP", "60-80 mmHg", "Indicative values"]),
        ],
    );

    doc.footer(generated_at);
    doc.finish()
}

/// Render the full summary: aggregate statistics over every record, then a
/// paginated listing of the currently filtered view.
pub fn summary_report(
    all: &[VitalsRecord],
    filtered: &[VitalsRecord],
    thresholds: &Thresholds,
    generated_at: DateTime<Utc>,
) -> String {
    let counts = band_counts(all, thresholds);
    let mut doc = ReportBuilder::new("VitalTrack", "Full Patient Report");

    let total = all.len().to_string();
    let critical_label = format!("Critical (SpO2 < {}%)", thresholds.spo2_critical_below);
    let warning_label = format!(
        "Warning (SpO2 {}-{}%)",
        thresholds.spo2_critical_below, thresholds.spo2_warning_below
    );
    let normal_label = format!("Normal (SpO2 >= {}%)", thresholds.spo2_warning_below);
    let critical = counts.critical_count.to_string();
    let warning = counts.warning_count.to_string();
    let normal = counts.normal_count.to_string();

    doc.section("Overview");
    doc.table(
        &[36, 10],
        &[
            row(["Category", "Records"]),
            row(["Total records", total.as_str()]),
            row([critical_label.as_str(), critical.as_str()]),
            row([warning_label.as_str(), warning.as_str()]),
            row([normal_label.as_str(), normal.as_str()]),
        ],
    );

    doc.section("Patient Records");
    if filtered.is_empty() {
        doc.line("No records match the current filters.");
    }
    let header = row(["ID", "BP", "HR", "SpO2", "Status", "Date"]);
    let widths = [12, 10, 6, 7, 10, 12];
    for (page, chunk) in filtered.chunks(ROWS_PER_PAGE).enumerate() {
        if page > 0 {
            doc.page_break();
        }
        let mut rows = vec![header.clone()];
        rows.extend(chunk.iter().map(|r| listing_row(r, thresholds)));
        doc.table(&widths, &rows);
    }

    doc.footer(generated_at);
    doc.finish()
}

fn listing_row(record: &VitalsRecord, thresholds: &Thresholds) -> Vec<String> {
    vec![
        or_na(&record.patient_id),
        or_na(&record.vitals.pressure),
        record
            .vitals
            .hr
            .map(|hr| hr.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        record
            .vitals
            .spo2
            .map(|spo2| format!("{spo2}%"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        classify_spo2(record.vitals.spo2, thresholds)
            .map(band_label)
            .unwrap_or("-")
            .to_string(),
        record
            .created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    ]
}

fn band_label(band: CriticalityBand) -> &'static str {
    match band {
        CriticalityBand::Critical => "CRITICAL",
        CriticalityBand::Warning => "WARNING",
        CriticalityBand::Normal => "NORMAL",
    }
}

fn hr_status_label(status: HrStatus) -> &'static str {
    match status {
        HrStatus::Bradycardia => "BRADYCARDIA",
        HrStatus::Tachycardia => "TACHYCARDIA",
        HrStatus::Normal => "NORMAL",
    }
}

fn or_na(value: &str) -> String {
    if value.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}

fn format_timestamp(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn row<const N: usize>(cells: [&str; N]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Line-oriented document builder. Built, filled and consumed within one
/// export call.
struct ReportBuilder {
    lines: Vec<String>,
}

impl ReportBuilder {
    fn new(title: &str, subtitle: &str) -> Self {
        let mut builder = Self { lines: Vec::new() };
        builder.lines.push("=".repeat(PAGE_WIDTH));
        builder.lines.push(center(title));
        builder.lines.push(center(subtitle));
        builder.lines.push("=".repeat(PAGE_WIDTH));
        builder
    }

    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn section(&mut self, title: &str) {
        self.lines.push(String::new());
        self.lines.push(title.to_string());
        self.lines.push("-".repeat(PAGE_WIDTH));
    }

    fn badge(&mut self, label: &str) {
        self.lines.push(String::new());
        self.lines.push(format!("  !! {label} !!"));
    }

    /// Left-aligned column layout; the first row is the header.
    fn table(&mut self, widths: &[usize], rows: &[Vec<String>]) {
        for (i, cells) in rows.iter().enumerate() {
            let line = cells
                .iter()
                .zip(widths.iter().copied())
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(" ");
            self.lines.push(line.trim_end().to_string());
            if i == 0 {
                let total = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
                self.lines.push("-".repeat(total.min(PAGE_WIDTH)));
            }
        }
    }

    /// Form feed between pages of a long listing.
    fn page_break(&mut self) {
        self.lines.push("\u{c}".to_string());
    }

    fn footer(&mut self, generated_at: DateTime<Utc>) {
        self.lines.push(String::new());
        self.lines.push("-".repeat(PAGE_WIDTH));
        self.lines
            .push(center(&format!("Generated {}", format_timestamp(generated_at))));
        self.lines.push(center("VitalTrack"));
    }

    fn finish(self) -> String {
        let mut document = self.lines.join("\n");
        document.push('\n');
        document
    }
}

fn center(text: &str) -> String {
    if text.len() >= PAGE_WIDTH {
        return text.to_string();
    }
    let pad = (PAGE_WIDTH - text.len()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vitals;
    use chrono::TimeZone;

    fn record(spo2: Option<f64>, hr: Option<i64>, note: Option<&str>) -> VitalsRecord {
        VitalsRecord {
            id: "rec-1".to_string(),
            patient_id: "P1".to_string(),
            vitals: Vitals {
                pressure: "120/80".to_string(),
                hr,
                spo2,
                note: note.map(str::to_string),
            },
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
            created_by: "user-1".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn critical_record_carries_a_badge_and_statuses() {
        let doc = patient_report(
            &record(Some(85.0), Some(120), None),
            &Thresholds::default(),
            now(),
        );
        assert!(doc.contains("!! CRITICAL !!"));
        assert!(doc.contains("TACHYCARDIA"));
        assert!(doc.contains("Generated 2024-03-02"));
    }

    #[test]
    fn normal_record_has_no_badge() {
        let doc = patient_report(
            &record(Some(98.0), Some(70), None),
            &Thresholds::default(),
            now(),
        );
        assert!(!doc.contains("!!"));
        assert!(doc.contains("NORMAL"));
    }

    #[test]
    fn missing_vitals_render_as_not_available() {
        let doc = patient_report(&record(None, None, None), &Thresholds::default(), now());
        let hr_line = doc
            .lines()
            .find(|l| l.starts_with("Heart rate"))
            .expect("HR row");
        assert!(hr_line.contains("N/A"));
        assert!(!hr_line.contains("bpm"));
    }

    #[test]
    fn note_section_appears_only_when_a_note_exists() {
        let thresholds = Thresholds::default();
        let with_note = patient_report(
            &record(Some(96.0), Some(64), Some("Dyspnea on exertion")),
            &thresholds,
            now(),
        );
        assert!(with_note.contains("Clinical Notes"));
        assert!(with_note.contains("Dyspnea on exertion"));

        let without_note = patient_report(&record(Some(96.0), Some(64), None), &thresholds, now());
        assert!(!without_note.contains("Clinical Notes"));
    }

    #[test]
    fn summary_counts_come_from_the_unfiltered_set() {
        let all = vec![
            record(Some(85.0), None, None),
            record(Some(92.0), None, None),
            record(Some(98.0), None, None),
        ];
        let filtered = vec![all[0].clone()];

        let doc = summary_report(&all, &filtered, &Thresholds::default(), now());
        assert!(doc.contains("Total records"));
        assert!(doc.contains("Critical (SpO2 < 90%)"));
        assert!(doc.contains("Warning (SpO2 90-95%)"));
        assert!(doc.contains("Normal (SpO2 >= 95%)"));
    }

    #[test]
    fn long_listings_paginate() {
        let all: Vec<VitalsRecord> = (0..60).map(|_| record(Some(97.0), None, None)).collect();

        let doc = summary_report(&all, &all, &Thresholds::default(), now());
        let breaks = doc.matches('\u{c}').count();
        // 60 rows at 25 per page is three pages, two breaks.
        assert_eq!(breaks, 2);
    }

    #[test]
    fn empty_filtered_view_is_stated() {
        let doc = summary_report(&[], &[], &Thresholds::default(), now());
        assert!(doc.contains("No records match the current filters."));
    }
}
