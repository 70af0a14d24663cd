//! Response shapes of the school REST API and their normalisation into the
//! canonical records the report engine works with. Field presence varies by
//! endpoint, so most fields are optional and resolved with a fixed fallback
//! order.

use std::path::Path;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use serde::Deserialize;

use crate::courses::DEFAULT_CREDITS;
use crate::models::{
    AttendanceRecord, AttendanceStatus, Course, GradeRecord, PersistedReportCard, ReportPeriod,
    SkillScore, Student, StudentRecords, Term,
};

pub const DEFAULT_MAX_POINTS: f64 = 100.0;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiStudent {
    pub id: i32,
    pub user: Option<ApiUser>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub student_id: Option<String>,
    pub grade_level: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCourse {
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
    pub credits: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAssignment {
    pub course_id: Option<i32>,
    pub max_points: Option<f64>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiGrade {
    pub id: Option<i32>,
    pub assignment_id: i32,
    pub points_earned: Option<f64>,
    pub max_points: Option<f64>,
    pub course_id: Option<i32>,
    pub course_name: Option<String>,
    pub assignment_title: Option<String>,
    pub feedback: Option<String>,
    pub graded_at: Option<NaiveDateTime>,
    pub assignment: Option<ApiAssignment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAttendance {
    pub course_id: Option<i32>,
    pub date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSkill {
    pub skill_name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiReportCard {
    pub id: i32,
    pub student_id: i32,
    pub academic_year: String,
    pub term: String,
    pub gpa: Option<f64>,
    pub class_rank: Option<i32>,
    pub total_students: Option<i32>,
    pub attendance_percentage: Option<f64>,
    pub conduct_grade: Option<String>,
    pub teacher_remarks: Option<String>,
    pub principal_remarks: Option<String>,
    pub generated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub skill_assessments: Vec<ApiSkill>,
}

/// Everything one report card needs, as exported from the REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportBundle {
    pub student: ApiStudent,
    #[serde(default)]
    pub courses: Vec<ApiCourse>,
    #[serde(default)]
    pub grades: Vec<ApiGrade>,
    #[serde(default)]
    pub attendance: Vec<ApiAttendance>,
    #[serde(default)]
    pub report_cards: Vec<ApiReportCard>,
    pub total_students: Option<u32>,
    #[serde(default)]
    pub peer_gpas: Vec<f64>,
}

pub fn load_bundle(path: &Path) -> anyhow::Result<ExportBundle> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid export bundle {}", path.display()))
}

pub fn normalize_bundle(bundle: ExportBundle) -> StudentRecords {
    let student = normalize_student(bundle.student);
    let courses: Vec<Course> = bundle.courses.into_iter().map(normalize_course).collect();
    let grades = bundle
        .grades
        .into_iter()
        .filter_map(|grade| normalize_grade(grade, &courses))
        .collect();
    let attendance = bundle
        .attendance
        .into_iter()
        .map(normalize_attendance)
        .collect();
    let report_cards = bundle
        .report_cards
        .into_iter()
        .filter_map(normalize_report_card)
        .collect();

    StudentRecords {
        student,
        courses,
        grades,
        attendance,
        report_cards,
        // The student being reported on is always part of the class.
        total_students: bundle.total_students.unwrap_or(1),
        peer_gpas: bundle.peer_gpas,
    }
}

pub fn normalize_student(raw: ApiStudent) -> Student {
    let user = raw.user.as_ref();
    let pick = |nested: Option<&Option<String>>, flat: Option<String>| {
        nested
            .and_then(|value| value.clone())
            .or(flat)
            .unwrap_or_default()
    };

    Student {
        id: raw.id,
        first_name: pick(user.map(|u| &u.first_name), raw.first_name),
        last_name: pick(user.map(|u| &u.last_name), raw.last_name),
        email: pick(user.map(|u| &u.email), raw.email),
        student_number: raw.student_id,
        grade_level: raw.grade_level,
    }
}

pub fn normalize_course(raw: ApiCourse) -> Course {
    Course {
        id: raw.id,
        name: raw.name,
        code: raw.code,
        credits: raw
            .credits
            .filter(|credits| *credits >= 1)
            .unwrap_or(DEFAULT_CREDITS),
    }
}

/// Course id: nested assignment, then the flat field, then a course-name
/// match against the enrolled courses. Max points: nested assignment, then
/// the flat field, then the schema default.
pub fn normalize_grade(raw: ApiGrade, courses: &[Course]) -> Option<GradeRecord> {
    let assignment = raw.assignment.as_ref();

    let course_id = assignment
        .and_then(|a| a.course_id)
        .or(raw.course_id)
        .or_else(|| {
            let name = raw.course_name.as_deref()?;
            courses
                .iter()
                .find(|course| course.name.eq_ignore_ascii_case(name.trim()))
                .map(|course| course.id)
        });

    let Some(course_id) = course_id else {
        warn!(
            "dropping grade {} ({}): no course could be resolved",
            raw.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
            raw.assignment_title
                .as_deref()
                .or(assignment.and_then(|a| a.title.as_deref()))
                .unwrap_or("untitled assignment")
        );
        return None;
    };

    let Some(points_earned) = raw.points_earned else {
        warn!("dropping ungraded record for assignment {}", raw.assignment_id);
        return None;
    };

    let max_points = assignment
        .and_then(|a| a.max_points)
        .or(raw.max_points)
        .unwrap_or(DEFAULT_MAX_POINTS);

    Some(GradeRecord {
        assignment_id: raw.assignment_id,
        course_id,
        points_earned: points_earned.max(0.0),
        max_points,
        feedback: raw.feedback,
        graded_at: raw.graded_at,
    })
}

pub fn normalize_attendance(raw: ApiAttendance) -> AttendanceRecord {
    AttendanceRecord {
        course_id: raw.course_id,
        date: raw.date,
        status: AttendanceStatus::from(raw.status),
    }
}

pub fn normalize_report_card(raw: ApiReportCard) -> Option<PersistedReportCard> {
    let Some(term) = Term::parse(&raw.term) else {
        warn!("dropping report card {} with unknown term {:?}", raw.id, raw.term);
        return None;
    };

    Some(PersistedReportCard {
        id: raw.id,
        student_id: raw.student_id,
        period: ReportPeriod::new(raw.academic_year, term),
        gpa: raw.gpa,
        class_rank: raw.class_rank,
        total_students: raw.total_students,
        attendance_percentage: raw.attendance_percentage,
        conduct_grade: raw.conduct_grade,
        teacher_remarks: raw.teacher_remarks,
        principal_remarks: raw.principal_remarks,
        generated_at: raw.generated_at,
        skills: raw
            .skill_assessments
            .into_iter()
            .map(|skill| SkillScore {
                skill: skill.skill_name,
                score: skill.score,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn courses() -> Vec<Course> {
        vec![
            Course {
                id: 4,
                name: "Chemistry".to_string(),
                code: None,
                credits: 3,
            },
            Course {
                id: 5,
                name: "English".to_string(),
                code: None,
                credits: 2,
            },
        ]
    }

    fn parse_grade(value: serde_json::Value) -> ApiGrade {
        serde_json::from_value(value).expect("grade json")
    }

    #[test]
    fn nested_assignment_takes_precedence() {
        let grade = parse_grade(serde_json::json!({
            "assignment_id": 1,
            "points_earned": 40.0,
            "course_id": 5,
            "max_points": 80.0,
            "assignment": { "course_id": 4, "max_points": 50.0 }
        }));
        let record = normalize_grade(grade, &courses()).expect("normalized");
        assert_eq!(record.course_id, 4);
        assert_eq!(record.max_points, 50.0);
    }

    #[test]
    fn course_name_is_the_last_resort() {
        let grade = parse_grade(serde_json::json!({
            "id": 10,
            "assignment_id": 2,
            "assignment_title": "Essay",
            "course_name": "english",
            "points_earned": 18.0,
            "graded_at": "2024-10-01T09:30:00"
        }));
        let record = normalize_grade(grade, &courses()).expect("normalized");
        assert_eq!(record.course_id, 5);
        assert_eq!(record.max_points, DEFAULT_MAX_POINTS);
        assert!(record.graded_at.is_some());
    }

    #[test]
    fn unresolvable_or_ungraded_records_are_dropped() {
        let orphan = parse_grade(serde_json::json!({
            "assignment_id": 3,
            "course_name": "Astronomy",
            "points_earned": 10.0
        }));
        assert!(normalize_grade(orphan, &courses()).is_none());

        let ungraded = parse_grade(serde_json::json!({
            "assignment_id": 3,
            "course_id": 4
        }));
        assert!(normalize_grade(ungraded, &courses()).is_none());
    }

    #[test]
    fn student_name_prefers_nested_user() {
        let student: ApiStudent = serde_json::from_value(serde_json::json!({
            "id": 3,
            "first_name": "Flat",
            "user": { "first_name": "Nested", "last_name": "Mwangi", "email": "n@example.com" },
            "student_id": "STU-003",
            "grade_level": 11
        }))
        .expect("student json");
        let student = normalize_student(student);
        assert_eq!(student.full_name(), "Nested Mwangi");
        assert_eq!(student.student_number.as_deref(), Some("STU-003"));
    }

    #[test]
    fn bundle_normalizes_everything() {
        let bundle: ExportBundle = serde_json::from_value(serde_json::json!({
            "student": { "id": 1, "first_name": "Amina", "last_name": "Hassan" },
            "courses": [{ "id": 4, "name": "Chemistry", "credits": 0 }],
            "grades": [{ "assignment_id": 1, "course_id": 4, "points_earned": 9.0, "max_points": 10.0 }],
            "attendance": [
                { "course_id": 4, "date": "2024-09-02", "status": "present" },
                { "course_id": 4, "date": "2024-09-03", "status": "excused" },
                { "date": "2024-09-04", "status": "present" }
            ],
            "report_cards": [
                { "id": 8, "student_id": 1, "academic_year": "2024-2025", "term": "fall",
                  "teacher_remarks": "Steady.", "skill_assessments": [{ "skill_name": "Teamwork", "score": 80.0 }] },
                { "id": 9, "student_id": 1, "academic_year": "2024-2025", "term": "winter" }
            ],
            "total_students": 12
        }))
        .expect("bundle json");

        let records = normalize_bundle(bundle);
        assert_eq!(records.courses[0].credits, DEFAULT_CREDITS);
        assert_eq!(records.grades.len(), 1);
        assert_eq!(records.attendance.len(), 3);
        assert_eq!(records.attendance[2].course_id, None);
        assert_eq!(records.attendance[1].status, AttendanceStatus::Excused);
        assert_eq!(records.report_cards.len(), 1);
        assert_eq!(records.report_cards[0].skills[0].skill, "Teamwork");
        assert_eq!(records.total_students, 12);
        assert!(records.peer_gpas.is_empty());
    }

    #[test]
    fn attendance_without_course_still_counts() {
        let bundle: ExportBundle = serde_json::from_value(serde_json::json!({
            "student": { "id": 2, "first_name": "Baraka", "last_name": "Mutua" },
            "attendance": [
                { "date": "2024-09-02", "status": "present" },
                { "course_id": 4, "date": "2024-09-03", "status": "absent" }
            ]
        }))
        .expect("bundle json");

        let records = normalize_bundle(bundle);
        assert_eq!(records.attendance.len(), 2);
        let summary = crate::attendance::summarize_attendance(&records.attendance);
        assert_eq!(summary.percentage, 50.0);
    }
}
