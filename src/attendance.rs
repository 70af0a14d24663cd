use std::collections::BTreeMap;

use crate::models::{AttendanceRecord, AttendanceStatus, AttendanceSummary};

pub fn summarize_attendance(records: &[AttendanceRecord]) -> AttendanceSummary {
    let mut breakdown: BTreeMap<String, usize> = BTreeMap::new();
    let mut present_count = 0usize;

    for record in records {
        *breakdown
            .entry(record.status.as_str().to_string())
            .or_insert(0) += 1;
        if record.status.counts_as_present() {
            present_count += 1;
        }
    }

    AttendanceSummary {
        total: records.len(),
        present_count,
        percentage: attendance_ratio(present_count, records.len()),
        breakdown,
    }
}

fn attendance_ratio(present: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (present as f64 / total as f64 * 100.0).round()
    }
}

/// Wording used on printed reports.
pub fn attendance_standing(percentage: f64) -> &'static str {
    if percentage >= 95.0 {
        "excellent"
    } else if percentage >= 85.0 {
        "good"
    } else {
        "needs improvement"
    }
}

pub fn count_status(summary: &AttendanceSummary, status: &AttendanceStatus) -> usize {
    summary.breakdown.get(status.as_str()).copied().unwrap_or(0)
}
