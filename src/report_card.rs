use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;

use crate::attendance::summarize_attendance;
use crate::courses::{average_courses, AveragingOptions};
use crate::errors::RemarksError;
use crate::grading::{self, round_to};
use crate::models::{
    AttendanceRecord, Course, CourseSummary, GradeRecord, PersistedReportCard, ProgressPoint,
    ProgressSeries, ReportCard, ReportPeriod, SkillScore, Student, Term,
};
use crate::rank::{resolve_class_rank, StoredRank};

pub const DEFAULT_CONDUCT_GRADE: &str = "A";
pub const DEFAULT_REMARKS: &str =
    "Auto-generated report card. Please update with personalized remarks.";
pub const ACADEMIC_SKILL: &str = "Academic Performance";

/// Everything the assembler needs, already fetched by the caller.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyInput<'a> {
    pub student: &'a Student,
    pub period: &'a ReportPeriod,
    pub courses: &'a [Course],
    pub grades: &'a [GradeRecord],
    pub attendance: &'a [AttendanceRecord],
    pub total_students: u32,
    /// Persisted snapshots for this student, any period, any order.
    pub persisted: &'a [PersistedReportCard],
    /// GPAs of the other students for the same period.
    pub peer_gpas: &'a [f64],
    pub options: AveragingOptions,
}

pub fn assemble(input: &AssemblyInput<'_>) -> ReportCard {
    let course_averages = average_courses(input.courses, input.grades, input.options);
    let gpa = grading::overall_gpa(course_averages.iter().map(|course| course.average));
    let attendance = summarize_attendance(input.attendance);

    let current = input
        .persisted
        .iter()
        .filter(|card| card.period == *input.period)
        .max_by_key(|card| (card.generated_at, card.id));

    // A stored rank keeps the class size it was computed against.
    let stored_rank = current.and_then(|card| {
        let position = u32::try_from(card.class_rank?).ok()?;
        let total = card
            .total_students
            .and_then(|total| u32::try_from(total).ok())
            .filter(|total| *total > 0)
            .unwrap_or(input.total_students);
        Some(StoredRank { position, total })
    });
    let class_rank = resolve_class_rank(gpa, input.total_students, stored_rank, input.peer_gpas);

    let current_point = ProgressPoint {
        period: input.period.clone(),
        gpa,
        attendance: attendance.percentage,
    };
    let progress = progress_series(input.persisted, current_point);

    let skills = match current {
        Some(card) if !card.skills.is_empty() => card.skills.clone(),
        _ => derived_skills(&course_averages),
    };

    let conduct_grade = current
        .and_then(|card| non_blank(card.conduct_grade.as_deref()))
        .unwrap_or(DEFAULT_CONDUCT_GRADE)
        .to_string();
    let teacher_remarks = current
        .and_then(|card| non_blank(card.teacher_remarks.as_deref()))
        .unwrap_or(DEFAULT_REMARKS)
        .to_string();
    let principal_remarks = current
        .and_then(|card| non_blank(card.principal_remarks.as_deref()))
        .unwrap_or(DEFAULT_REMARKS)
        .to_string();

    debug!(
        "assembled report card for student {} ({} courses, gpa {:.2})",
        input.student.id,
        course_averages.len(),
        gpa
    );

    ReportCard {
        student: input.student.clone(),
        period: input.period.clone(),
        report_card_id: current.map(|card| card.id),
        gpa,
        attendance,
        class_rank,
        total_students: input.total_students,
        course_averages,
        progress,
        skills,
        conduct_grade,
        teacher_remarks,
        principal_remarks,
    }
}

/// Earlier persisted periods followed by the current one. Without any earlier
/// snapshot there is no trend to report.
pub fn progress_series(persisted: &[PersistedReportCard], current: ProgressPoint) -> ProgressSeries {
    let mut history: Vec<ProgressPoint> = persisted
        .iter()
        .filter(|card| period_key(&card.period) < period_key(&current.period))
        .filter_map(|card| {
            Some(ProgressPoint {
                period: card.period.clone(),
                gpa: card.gpa?,
                attendance: card.attendance_percentage.unwrap_or(0.0),
            })
        })
        .collect();

    if history.is_empty() {
        return ProgressSeries::InsufficientData;
    }

    history.sort_by(|a, b| period_key(&a.period).cmp(&period_key(&b.period)));
    history.dedup_by(|a, b| a.period == b.period);
    history.push(current);
    ProgressSeries::Trend(history)
}

/// Academic years sort lexically ("2023-2024" < "2024-2025"); terms run
/// fall, spring, summer within a year.
fn period_key(period: &ReportPeriod) -> (&str, u8) {
    let term_index = match period.term {
        Term::Fall => 0,
        Term::Spring => 1,
        Term::Summer => 2,
    };
    (period.academic_year.as_str(), term_index)
}

fn derived_skills(course_averages: &[CourseSummary]) -> Vec<SkillScore> {
    if course_averages.is_empty() {
        return Vec::new();
    }
    let mean = course_averages.iter().map(|course| course.average).sum::<f64>()
        / course_averages.len() as f64;
    vec![SkillScore {
        skill: ACADEMIC_SKILL.to_string(),
        score: round_to(mean, 1),
    }]
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

/// Body of a remarks update, matching the report-card update endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemarksUpdate {
    pub teacher_remarks: String,
    pub principal_remarks: String,
}

#[async_trait]
pub trait RemarksStore {
    async fn update_remarks(&self, report_card_id: i32, update: &RemarksUpdate)
        -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemarksDraft {
    pub teacher_remarks: String,
    pub principal_remarks: String,
}

#[derive(Debug, Clone, Default)]
pub struct RemarksEditor {
    draft: Option<RemarksDraft>,
}

impl RemarksEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts editing from the card's current remarks.
    pub fn begin(&mut self, card: &ReportCard) -> &mut RemarksDraft {
        self.draft.insert(RemarksDraft {
            teacher_remarks: card.teacher_remarks.clone(),
            principal_remarks: card.principal_remarks.clone(),
        })
    }

    pub fn draft(&self) -> Option<&RemarksDraft> {
        self.draft.as_ref()
    }

    /// Drops the draft; the card still holds the last saved remarks.
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Persists both remarks, then updates the card. On failure the card is
    /// untouched and the draft is kept for a retry.
    pub async fn save<S>(&mut self, store: &S, card: &mut ReportCard) -> Result<(), RemarksError>
    where
        S: RemarksStore + ?Sized + Sync,
    {
        let draft = self.draft.as_ref().ok_or(RemarksError::NotEditing)?;
        let report_card_id = card.report_card_id.ok_or(RemarksError::MissingReportCard {
            student_id: card.student.id,
        })?;

        let update = RemarksUpdate {
            teacher_remarks: draft.teacher_remarks.clone(),
            principal_remarks: draft.principal_remarks.clone(),
        };

        if let Err(err) = store.update_remarks(report_card_id, &update).await {
            warn!("saving remarks for report card {report_card_id} failed: {err:#}");
            return Err(RemarksError::Persistence(err));
        }

        card.teacher_remarks = update.teacher_remarks;
        card.principal_remarks = update.principal_remarks;
        self.draft = None;
        info!("saved remarks for report card {report_card_id}");
        Ok(())
    }
}
