use std::collections::HashMap;

use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::{
    AttendanceRecord, AttendanceStatus, ClassRank, Course, FeeRecord, FeeStructure, GradeRecord,
    PaymentStatus, PersistedReportCard, ReportCard, ReportPeriod, SkillScore, Student,
    StudentRecords, Term,
};
use crate::report_card::{RemarksStore, RemarksUpdate};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let students = [
        ("amina.hassan@kastra.school", "Amina", "Hassan", "STU-2024-001", 10),
        ("brian.otieno@kastra.school", "Brian", "Otieno", "STU-2024-002", 10),
        ("carol.wanjiku@kastra.school", "Carol", "Wanjiku", "STU-2024-003", 10),
    ];
    let courses = [
        ("Mathematics", "MATH-101", 4),
        ("Chemistry", "CHEM-101", 3),
        ("English Literature", "ENG-101", 3),
    ];
    let assignments = [
        ("MATH-101", "Algebra Quiz", 50.0),
        ("MATH-101", "Midterm Exam", 100.0),
        ("CHEM-101", "Lab Report", 40.0),
        ("CHEM-101", "Midterm Exam", 100.0),
        ("ENG-101", "Essay", 20.0),
        ("ENG-101", "Poetry Analysis", 30.0),
    ];
    // Points earned per student, in assignment order.
    let scores: [[f64; 6]; 3] = [
        [45.0, 88.0, 34.0, 79.0, 18.0, 26.0],
        [38.0, 71.0, 29.0, 64.0, 15.0, 21.0],
        [49.0, 95.0, 37.0, 91.0, 19.0, 28.0],
    ];
    let attendance = [
        ("present", "present", "late", "present"),
        ("present", "absent", "present", "excused"),
        ("present", "present", "present", "present"),
    ];
    let session_dates = [
        NaiveDate::from_ymd_opt(2024, 9, 2).context("invalid date")?,
        NaiveDate::from_ymd_opt(2024, 9, 3).context("invalid date")?,
        NaiveDate::from_ymd_opt(2024, 9, 4).context("invalid date")?,
        NaiveDate::from_ymd_opt(2024, 9, 5).context("invalid date")?,
    ];

    let mut course_ids = HashMap::new();
    for (name, code, credits) in courses {
        let id: i32 = sqlx::query(
            r#"
            INSERT INTO school.courses (name, code, credits)
            VALUES ($1, $2, $3)
            ON CONFLICT (code) DO UPDATE
            SET name = EXCLUDED.name, credits = EXCLUDED.credits
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(code)
        .bind(credits)
        .fetch_one(pool)
        .await?
        .try_get("id")?;
        course_ids.insert(code, id);
    }

    let mut assignment_ids = Vec::with_capacity(assignments.len());
    for (code, title, max_points) in assignments {
        let course_id = *course_ids.get(code).context("seed assignment without course")?;
        let id: i32 = sqlx::query(
            r#"
            INSERT INTO school.assignments (course_id, title, max_points)
            VALUES ($1, $2, $3)
            ON CONFLICT (course_id, title) DO UPDATE
            SET max_points = EXCLUDED.max_points
            RETURNING id
            "#,
        )
        .bind(course_id)
        .bind(title)
        .bind(max_points)
        .fetch_one(pool)
        .await?
        .try_get("id")?;
        assignment_ids.push(id);
    }

    for (index, (email, first_name, last_name, number, grade_level)) in
        students.into_iter().enumerate()
    {
        let user_id: i32 = sqlx::query(
            r#"
            INSERT INTO school.users (email, first_name, last_name, role)
            VALUES ($1, $2, $3, 'student')
            ON CONFLICT (email) DO UPDATE
            SET first_name = EXCLUDED.first_name, last_name = EXCLUDED.last_name
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(pool)
        .await?
        .try_get("id")?;

        let student_id: i32 = sqlx::query(
            r#"
            INSERT INTO school.students (user_id, student_number, grade_level, enrollment_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET student_number = EXCLUDED.student_number, grade_level = EXCLUDED.grade_level
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(number)
        .bind(grade_level)
        .bind(session_dates[0])
        .fetch_one(pool)
        .await?
        .try_get("id")?;

        for course_id in course_ids.values() {
            sqlx::query(
                r#"
                INSERT INTO school.enrollments (student_id, course_id)
                VALUES ($1, $2)
                ON CONFLICT (student_id, course_id) DO NOTHING
                "#,
            )
            .bind(student_id)
            .bind(course_id)
            .execute(pool)
            .await?;
        }

        for (assignment_id, points) in assignment_ids.iter().zip(scores[index]) {
            sqlx::query(
                r#"
                INSERT INTO school.grades (student_id, assignment_id, points_earned)
                VALUES ($1, $2, $3)
                ON CONFLICT (student_id, assignment_id) DO NOTHING
                "#,
            )
            .bind(student_id)
            .bind(assignment_id)
            .bind(points)
            .execute(pool)
            .await?;
        }

        let (a, b, c, d) = attendance[index];
        for course_id in course_ids.values() {
            for (date, status) in session_dates.iter().zip([a, b, c, d]) {
                sqlx::query(
                    r#"
                    INSERT INTO school.attendance (student_id, course_id, date, status)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (student_id, course_id, date) DO NOTHING
                    "#,
                )
                .bind(student_id)
                .bind(course_id)
                .bind(date)
                .bind(status)
                .execute(pool)
                .await?;
            }
        }
    }

    sqlx::query(
        r#"
        INSERT INTO school.fee_structures
        (academic_year, grade_level, tuition_fee, lab_fee, library_fee, sports_fee,
         technology_fee, activity_fee, transport_fee, meal_fee, uniform_fee, book_fee,
         examination_fee, insurance_fee, development_fee, miscellaneous_fee,
         total_annual_fee, sibling_discount, merit_discount, early_payment_discount,
         late_fee, refund_policy)
        VALUES ('2024-2025', 10, 19500, 2200, 1500, 1000, 2500, 1200, 3000, 4000, 800,
                2100, 1000, 500, 3000, 500, 42800, 0.10, 0.05, 0.02, 500,
                'Refundable within 30 days of admission with 20% processing fee')
        ON CONFLICT (academic_year, grade_level) DO NOTHING
        "#,
    )
    .execute(pool)
    .await?;

    info!(
        "seeded {} students, {} courses, {} assignments",
        students.len(),
        course_ids.len(),
        assignment_ids.len()
    );
    Ok(())
}

pub async fn import_grades(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        student_number: String,
        course_code: String,
        assignment_title: String,
        max_points: Option<f64>,
        points_earned: f64,
        feedback: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut imported = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid grade row {}", line + 1))?;

        let student_id: Option<i32> =
            sqlx::query("SELECT id FROM school.students WHERE student_number = $1")
                .bind(&row.student_number)
                .fetch_optional(pool)
                .await?
                .map(|found| found.try_get("id"))
                .transpose()?;
        let course_id: Option<i32> = sqlx::query("SELECT id FROM school.courses WHERE code = $1")
            .bind(&row.course_code)
            .fetch_optional(pool)
            .await?
            .map(|found| found.try_get("id"))
            .transpose()?;

        let (Some(student_id), Some(course_id)) = (student_id, course_id) else {
            warn!(
                "skipping grade row {}: unknown student {} or course {}",
                line + 1,
                row.student_number,
                row.course_code
            );
            continue;
        };

        let assignment_id: i32 = sqlx::query(
            r#"
            INSERT INTO school.assignments AS a (course_id, title, max_points)
            VALUES ($1, $2, COALESCE($3, 100))
            ON CONFLICT (course_id, title) DO UPDATE
            SET max_points = COALESCE($3, a.max_points)
            RETURNING id
            "#,
        )
        .bind(course_id)
        .bind(row.assignment_title.trim())
        .bind(row.max_points)
        .fetch_one(pool)
        .await?
        .try_get("id")?;

        let result = sqlx::query(
            r#"
            INSERT INTO school.grades (student_id, assignment_id, points_earned, feedback)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (student_id, assignment_id) DO UPDATE
            SET points_earned = EXCLUDED.points_earned,
                feedback = EXCLUDED.feedback,
                graded_at = NOW()
            "#,
        )
        .bind(student_id)
        .bind(assignment_id)
        .bind(row.points_earned)
        .bind(row.feedback.filter(|text| !text.trim().is_empty()))
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            imported += 1;
        }
    }

    Ok(imported)
}

const STUDENT_COLUMNS: &str = "SELECT s.id, u.first_name, u.last_name, u.email, \
     s.student_number, s.grade_level \
     FROM school.students s \
     JOIN school.users u ON u.id = s.user_id";

fn student_from_row(row: &PgRow) -> anyhow::Result<Student> {
    Ok(Student {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        student_number: row.try_get("student_number")?,
        grade_level: row.try_get("grade_level")?,
    })
}

pub async fn fetch_students(pool: &PgPool) -> anyhow::Result<Vec<Student>> {
    let query = format!("{STUDENT_COLUMNS} ORDER BY u.last_name, u.first_name, s.id");
    let rows = sqlx::query(&query).fetch_all(pool).await?;
    rows.iter().map(student_from_row).collect()
}

pub async fn fetch_student(pool: &PgPool, student_id: i32) -> anyhow::Result<Option<Student>> {
    let query = format!("{STUDENT_COLUMNS} WHERE s.id = $1");
    let row = sqlx::query(&query)
        .bind(student_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(student_from_row).transpose()
}

/// Class size: students sharing the grade level, or the whole school when the
/// grade level is unknown.
pub async fn count_students(pool: &PgPool, grade_level: Option<i32>) -> anyhow::Result<u32> {
    let count: i64 = sqlx::query(
        r#"
        SELECT COUNT(*) AS total
        FROM school.students
        WHERE $1::INT4 IS NULL OR grade_level = $1
        "#,
    )
    .bind(grade_level)
    .fetch_one(pool)
    .await?
    .try_get("total")?;
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

pub async fn fetch_student_courses(pool: &PgPool, student_id: i32) -> anyhow::Result<Vec<Course>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.name, c.code, c.credits
        FROM school.enrollments e
        JOIN school.courses c ON c.id = e.course_id
        WHERE e.student_id = $1
        ORDER BY c.name, c.id
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    let mut courses = Vec::with_capacity(rows.len());
    for row in rows {
        courses.push(Course {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            code: row.try_get("code")?,
            credits: row.try_get("credits")?,
        });
    }
    Ok(courses)
}

pub async fn fetch_student_grades(
    pool: &PgPool,
    student_id: i32,
) -> anyhow::Result<Vec<GradeRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT g.assignment_id, a.course_id, g.points_earned, a.max_points,
               g.feedback, g.graded_at
        FROM school.grades g
        JOIN school.assignments a ON a.id = g.assignment_id
        WHERE g.student_id = $1
        ORDER BY g.graded_at, g.id
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    let mut grades = Vec::with_capacity(rows.len());
    for row in rows {
        grades.push(GradeRecord {
            assignment_id: row.try_get("assignment_id")?,
            course_id: row.try_get("course_id")?,
            points_earned: row.try_get("points_earned")?,
            max_points: row.try_get("max_points")?,
            feedback: row.try_get("feedback")?,
            graded_at: row.try_get::<Option<NaiveDateTime>, _>("graded_at")?,
        });
    }
    Ok(grades)
}

pub async fn fetch_student_attendance(
    pool: &PgPool,
    student_id: i32,
) -> anyhow::Result<Vec<AttendanceRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT course_id, date, status
        FROM school.attendance
        WHERE student_id = $1
        ORDER BY date, course_id
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let status: String = row.try_get("status")?;
        records.push(AttendanceRecord {
            course_id: row.try_get::<Option<i32>, _>("course_id")?,
            date: row.try_get("date")?,
            status: AttendanceStatus::from(status),
        });
    }
    Ok(records)
}

/// Newest first, each with its skill assessments.
pub async fn fetch_report_cards(
    pool: &PgPool,
    student_id: i32,
) -> anyhow::Result<Vec<PersistedReportCard>> {
    let rows = sqlx::query(
        r#"
        SELECT id, student_id, academic_year, term, gpa, class_rank, total_students,
               attendance_percentage, conduct_grade, teacher_remarks, principal_remarks,
               generated_at
        FROM school.report_cards
        WHERE student_id = $1
        ORDER BY generated_at DESC, id DESC
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    let mut cards = Vec::with_capacity(rows.len());
    for row in rows {
        let id: i32 = row.try_get("id")?;
        let term: String = row.try_get("term")?;
        let Some(term) = Term::parse(&term) else {
            warn!("skipping report card {id} with unknown term {term:?}");
            continue;
        };
        let academic_year: String = row.try_get("academic_year")?;

        cards.push(PersistedReportCard {
            id,
            student_id: row.try_get("student_id")?,
            period: ReportPeriod::new(academic_year, term),
            gpa: row.try_get("gpa")?,
            class_rank: row.try_get("class_rank")?,
            total_students: row.try_get("total_students")?,
            attendance_percentage: row.try_get("attendance_percentage")?,
            conduct_grade: row.try_get("conduct_grade")?,
            teacher_remarks: row.try_get("teacher_remarks")?,
            principal_remarks: row.try_get("principal_remarks")?,
            generated_at: row.try_get("generated_at")?,
            skills: Vec::new(),
        });
    }

    if cards.is_empty() {
        return Ok(cards);
    }

    let ids: Vec<i32> = cards.iter().map(|card| card.id).collect();
    let skill_rows = sqlx::query(
        r#"
        SELECT report_card_id, skill_name, score
        FROM school.skill_assessments
        WHERE report_card_id = ANY($1)
        ORDER BY id
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut skills: HashMap<i32, Vec<SkillScore>> = HashMap::new();
    for row in skill_rows {
        skills
            .entry(row.try_get("report_card_id")?)
            .or_default()
            .push(SkillScore {
                skill: row.try_get("skill_name")?,
                score: row.try_get("score")?,
            });
    }
    for card in &mut cards {
        card.skills = skills.remove(&card.id).unwrap_or_default();
    }

    Ok(cards)
}

/// Persisted GPAs of every other student in the same class for the period.
/// Classmates without a stored report card are missing from the result.
pub async fn fetch_cohort_gpas(
    pool: &PgPool,
    period: &ReportPeriod,
    exclude_student: i32,
    grade_level: Option<i32>,
) -> anyhow::Result<Vec<f64>> {
    let rows = sqlx::query(
        r#"
        SELECT rc.gpa
        FROM school.report_cards rc
        JOIN school.students s ON s.id = rc.student_id
        WHERE rc.academic_year = $1 AND rc.term = $2 AND rc.student_id <> $3
          AND rc.gpa IS NOT NULL
          AND ($4::INT4 IS NULL OR s.grade_level = $4)
        "#,
    )
    .bind(&period.academic_year)
    .bind(period.term.as_str())
    .bind(exclude_student)
    .bind(grade_level)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| row.try_get::<f64, _>("gpa").map_err(Into::into))
        .collect()
}

/// Stores a generated card for its period and returns the new id.
pub async fn save_snapshot(pool: &PgPool, card: &ReportCard) -> anyhow::Result<i32> {
    let mut tx = pool.begin().await?;

    let existing: Option<i32> = sqlx::query(
        r#"
        SELECT id FROM school.report_cards
        WHERE student_id = $1 AND academic_year = $2 AND term = $3
        "#,
    )
    .bind(card.student.id)
    .bind(&card.period.academic_year)
    .bind(card.period.term.as_str())
    .fetch_optional(&mut *tx)
    .await?
    .map(|row| row.try_get("id"))
    .transpose()?;

    if let Some(id) = existing {
        bail!(
            "report card {id} already exists for student {} in {}",
            card.student.id,
            card.period.label()
        );
    }

    // Only a rank over the whole class is stored; estimates are recomputed on load.
    let (class_rank, class_size) = match card.class_rank {
        ClassRank::Ranked { position, total } => (i32::try_from(position).ok(), total),
        ClassRank::Estimated { .. } | ClassRank::Unavailable => (None, card.total_students),
    };

    let report_card_id: i32 = sqlx::query(
        r#"
        INSERT INTO school.report_cards
        (student_id, academic_year, term, gpa, class_rank, total_students,
         attendance_percentage, conduct_grade, teacher_remarks, principal_remarks)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(card.student.id)
    .bind(&card.period.academic_year)
    .bind(card.period.term.as_str())
    .bind(card.gpa)
    .bind(class_rank)
    .bind(i32::try_from(class_size).unwrap_or(i32::MAX))
    .bind(card.attendance_percentage())
    .bind(&card.conduct_grade)
    .bind(&card.teacher_remarks)
    .bind(&card.principal_remarks)
    .fetch_one(&mut *tx)
    .await?
    .try_get("id")?;

    for skill in &card.skills {
        sqlx::query(
            r#"
            INSERT INTO school.skill_assessments (report_card_id, skill_name, score)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(report_card_id)
        .bind(&skill.skill)
        .bind(skill.score)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(report_card_id)
}

#[async_trait]
impl RemarksStore for PgPool {
    async fn update_remarks(
        &self,
        report_card_id: i32,
        update: &RemarksUpdate,
    ) -> anyhow::Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE school.report_cards
            SET teacher_remarks = $2, principal_remarks = $3
            WHERE id = $1
            "#,
        )
        .bind(report_card_id)
        .bind(&update.teacher_remarks)
        .bind(&update.principal_remarks)
        .execute(self)
        .await?;

        if result.rows_affected() == 0 {
            bail!("report card {report_card_id} does not exist");
        }
        Ok(())
    }
}

pub async fn fetch_fee_structure(
    pool: &PgPool,
    academic_year: &str,
    grade_level: i32,
) -> anyhow::Result<Option<FeeStructure>> {
    let row = sqlx::query(
        r#"
        SELECT academic_year, grade_level, tuition_fee, lab_fee, library_fee, sports_fee,
               technology_fee, activity_fee, transport_fee, meal_fee, uniform_fee, book_fee,
               examination_fee, insurance_fee, development_fee, miscellaneous_fee,
               total_annual_fee, sibling_discount, merit_discount, early_payment_discount,
               late_fee, refund_policy
        FROM school.fee_structures
        WHERE academic_year = $1 AND grade_level = $2
        "#,
    )
    .bind(academic_year)
    .bind(grade_level)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(FeeStructure {
        academic_year: row.try_get("academic_year")?,
        grade_level: row.try_get("grade_level")?,
        tuition: row.try_get("tuition_fee")?,
        lab: row.try_get("lab_fee")?,
        library: row.try_get("library_fee")?,
        sports: row.try_get("sports_fee")?,
        technology: row.try_get("technology_fee")?,
        activities: row.try_get("activity_fee")?,
        transport: row.try_get("transport_fee")?,
        meals: row.try_get("meal_fee")?,
        uniforms: row.try_get("uniform_fee")?,
        books: row.try_get("book_fee")?,
        examination: row.try_get("examination_fee")?,
        insurance: row.try_get("insurance_fee")?,
        development_fee: row.try_get("development_fee")?,
        misc: row.try_get("miscellaneous_fee")?,
        total_annual: row.try_get("total_annual_fee")?,
        sibling_discount: row.try_get("sibling_discount")?,
        merit_discount: row.try_get("merit_discount")?,
        early_payment_discount: row.try_get("early_payment_discount")?,
        late_fee: row.try_get("late_fee")?,
        refund_policy: row.try_get("refund_policy")?,
    }))
}

pub async fn fetch_fee_records(
    pool: &PgPool,
    student_id: i32,
    academic_year: &str,
) -> anyhow::Result<Vec<FeeRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, academic_year, term, amount, due_date, status, paid_date
        FROM school.fee_records
        WHERE student_id = $1 AND academic_year = $2
        ORDER BY due_date, id
        "#,
    )
    .bind(student_id)
    .bind(academic_year)
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let id: i32 = row.try_get("id")?;
        let term: String = row.try_get("term")?;
        let status: String = row.try_get("status")?;
        let (Some(term), Some(status)) = (Term::parse(&term), PaymentStatus::parse(&status)) else {
            warn!("skipping fee record {id} with term {term:?} and status {status:?}");
            continue;
        };

        records.push(FeeRecord {
            id,
            academic_year: row.try_get("academic_year")?,
            term,
            amount: row.try_get("amount")?,
            due_date: row.try_get("due_date")?,
            status,
            paid_date: row.try_get("paid_date")?,
        });
    }
    Ok(records)
}

/// Loads everything a report card needs. The student must exist; the other
/// fetches run concurrently and a failed one degrades to an empty sequence.
pub async fn load_student_records(
    pool: &PgPool,
    student_id: i32,
    period: &ReportPeriod,
) -> anyhow::Result<StudentRecords> {
    let student = fetch_student(pool, student_id)
        .await?
        .with_context(|| format!("student {student_id} not found"))?;

    let (courses, grades, attendance, report_cards, total_students, peer_gpas) = tokio::join!(
        fetch_student_courses(pool, student_id),
        fetch_student_grades(pool, student_id),
        fetch_student_attendance(pool, student_id),
        fetch_report_cards(pool, student_id),
        count_students(pool, student.grade_level),
        fetch_cohort_gpas(pool, period, student_id, student.grade_level),
    );

    Ok(StudentRecords {
        student,
        courses: or_empty("courses", student_id, courses),
        grades: or_empty("grades", student_id, grades),
        attendance: or_empty("attendance", student_id, attendance),
        report_cards: or_empty("report cards", student_id, report_cards),
        total_students: total_students.unwrap_or_else(|err| {
            warn!("failed to count students: {err:#}");
            0
        }),
        peer_gpas: or_empty("cohort gpas", student_id, peer_gpas),
    })
}

fn or_empty<T>(what: &str, student_id: i32, result: anyhow::Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|err| {
        warn!("failed to fetch {what} for student {student_id}: {err:#}");
        Vec::new()
    })
}
