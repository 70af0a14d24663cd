use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// School-issued student number, distinct from the row id.
    pub student_number: Option<String>,
    pub grade_level: Option<i32>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
    pub credits: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub assignment_id: i32,
    pub course_id: i32,
    pub points_earned: f64,
    pub max_points: f64,
    pub feedback: Option<String>,
    pub graded_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
    Other(String),
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Excused => "excused",
            AttendanceStatus::Other(value) => value,
        }
    }

    /// Late arrivals count towards attendance.
    pub fn counts_as_present(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

impl From<String> for AttendanceStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "present" => AttendanceStatus::Present,
            "absent" => AttendanceStatus::Absent,
            "late" => AttendanceStatus::Late,
            "excused" => AttendanceStatus::Excused,
            _ => AttendanceStatus::Other(value),
        }
    }
}

impl From<AttendanceStatus> for String {
    fn from(value: AttendanceStatus) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Whole-day attendance carries no course.
    pub course_id: Option<i32>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AttendanceSummary {
    pub total: usize,
    pub present_count: usize,
    /// Whole-number percentage in [0, 100].
    pub percentage: f64,
    pub breakdown: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        };
        f.write_str(letter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    pub course_id: i32,
    pub course_name: String,
    pub credits: i32,
    pub average: f64,
    pub letter: LetterGrade,
    /// Stepped 4.0-scale value of `letter`.
    pub grade_points: f64,
    pub source_grades: Vec<GradeRecord>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    Fall,
    Spring,
    Summer,
}

impl Term {
    pub fn as_str(&self) -> &'static str {
        match self {
            Term::Fall => "fall",
            Term::Spring => "spring",
            Term::Summer => "summer",
        }
    }

    pub fn parse(value: &str) -> Option<Term> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fall" => Some(Term::Fall),
            "spring" => Some(Term::Spring),
            "summer" => Some(Term::Summer),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Term::Fall => "Fall",
            Term::Spring => "Spring",
            Term::Summer => "Summer",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    pub academic_year: String,
    pub term: Term,
}

impl ReportPeriod {
    pub fn new(academic_year: impl Into<String>, term: Term) -> Self {
        Self {
            academic_year: academic_year.into(),
            term,
        }
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.term, self.academic_year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressPoint {
    pub period: ReportPeriod,
    pub gpa: f64,
    pub attendance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ProgressSeries {
    /// No earlier persisted snapshot exists to compare against.
    InsufficientData,
    /// Chronological, ending with the current period.
    Trend(Vec<ProgressPoint>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassRank {
    Ranked { position: u32, total: u32 },
    /// Top-percentile placeholder; no comparison across students took place.
    Estimated { position: u32, total: u32 },
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillScore {
    pub skill: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedReportCard {
    pub id: i32,
    pub student_id: i32,
    pub period: ReportPeriod,
    pub gpa: Option<f64>,
    pub class_rank: Option<i32>,
    pub total_students: Option<i32>,
    pub attendance_percentage: Option<f64>,
    pub conduct_grade: Option<String>,
    pub teacher_remarks: Option<String>,
    pub principal_remarks: Option<String>,
    pub generated_at: Option<NaiveDateTime>,
    pub skills: Vec<SkillScore>,
}

/// Raw inputs for one student's report card, whichever source they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecords {
    pub student: Student,
    pub courses: Vec<Course>,
    pub grades: Vec<GradeRecord>,
    pub attendance: Vec<AttendanceRecord>,
    pub report_cards: Vec<PersistedReportCard>,
    pub total_students: u32,
    pub peer_gpas: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportCard {
    pub student: Student,
    pub period: ReportPeriod,
    /// Backing persisted snapshot, required before remarks can be saved.
    pub report_card_id: Option<i32>,
    pub gpa: f64,
    pub attendance: AttendanceSummary,
    pub class_rank: ClassRank,
    pub total_students: u32,
    pub course_averages: Vec<CourseSummary>,
    pub progress: ProgressSeries,
    pub skills: Vec<SkillScore>,
    pub conduct_grade: String,
    pub teacher_remarks: String,
    pub principal_remarks: String,
}

impl ReportCard {
    pub fn attendance_percentage(&self) -> f64 {
        self.attendance.percentage
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Unpaid,
    Overdue,
}

impl PaymentStatus {
    pub fn parse(value: &str) -> Option<PaymentStatus> {
        match value.trim().to_ascii_lowercase().as_str() {
            "paid" => Some(PaymentStatus::Paid),
            "pending" => Some(PaymentStatus::Pending),
            "unpaid" => Some(PaymentStatus::Unpaid),
            "overdue" => Some(PaymentStatus::Overdue),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Overdue => "Overdue",
        };
        f.write_str(label)
    }
}

/// Fee template keyed by academic year and grade level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeStructure {
    pub academic_year: String,
    pub grade_level: i32,
    pub tuition: f64,
    pub lab: f64,
    pub library: f64,
    pub sports: f64,
    pub technology: f64,
    pub activities: f64,
    pub transport: f64,
    pub meals: f64,
    pub uniforms: f64,
    pub books: f64,
    pub examination: f64,
    pub insurance: f64,
    pub development_fee: f64,
    pub misc: f64,
    pub total_annual: f64,
    pub sibling_discount: f64,
    pub merit_discount: f64,
    pub early_payment_discount: f64,
    pub late_fee: f64,
    pub refund_policy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeRecord {
    pub id: i32,
    pub academic_year: String,
    pub term: Term,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeLine {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discount {
    pub name: String,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Installment {
    pub term: String,
    pub due_date: NaiveDate,
    pub amount_due: f64,
    pub amount_paid: f64,
    pub status: PaymentStatus,
}

impl Installment {
    pub fn balance(&self) -> f64 {
        (self.amount_due - self.amount_paid).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeStatement {
    pub academic_year: String,
    pub breakdown: Vec<FeeLine>,
    pub total_annual: f64,
    pub discounts: Vec<Discount>,
    pub late_fee: f64,
    pub refund_policy: String,
    pub schedule: Vec<Installment>,
    /// Set when the template or the schedule had to be synthesized.
    pub uses_defaults: bool,
}

impl FeeStatement {
    pub fn total_due(&self) -> f64 {
        self.schedule.iter().map(|item| item.amount_due).sum()
    }

    pub fn total_paid(&self) -> f64 {
        self.schedule.iter().map(|item| item.amount_paid).sum()
    }

    pub fn balance(&self) -> f64 {
        self.schedule.iter().map(Installment::balance).sum()
    }
}
