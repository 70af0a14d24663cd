use std::fmt::Write;

use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

use crate::attendance::attendance_standing;
use crate::models::{ClassRank, FeeStatement, ProgressSeries, ReportCard, Student};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportSection {
    #[default]
    Overview,
    Grades,
    Progress,
}

impl ReportSection {
    fn shows_grades(self) -> bool {
        matches!(self, ReportSection::Overview | ReportSection::Grades)
    }

    fn shows_progress(self) -> bool {
        matches!(self, ReportSection::Overview | ReportSection::Progress)
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub school_name: String,
    pub currency: String,
    /// The only time-dependent value in a document.
    pub generated_on: NaiveDate,
}

const STYLES: &str = r#"<style>
@media print {
  @page { margin: 0.5in; size: portrait; }
  body { margin: 0; padding: 0; }
  .no-print { display: none !important; }
}
@media screen {
  body { padding: 20px; background: #f5f5f5; }
  .print-container { max-width: 900px; margin: 0 auto; background: white; padding: 40px; box-shadow: 0 0 20px rgba(0,0,0,0.1); }
}
* { box-sizing: border-box; }
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; }
.header { text-align: center; border-bottom: 3px solid #2563eb; padding-bottom: 20px; margin-bottom: 30px; }
.header h1 { color: #1e40af; margin: 0; font-size: 32px; letter-spacing: 2px; text-transform: uppercase; }
.header p { color: #6b7280; margin: 8px 0; font-size: 14px; }
.student-info { display: grid; grid-template-columns: 1fr 1fr; gap: 20px; margin-bottom: 30px; padding: 25px; background: #f8fafc; border-radius: 10px; border: 1px solid #e2e8f0; }
.info-label { font-weight: 600; color: #64748b; font-size: 11px; text-transform: uppercase; letter-spacing: 0.5px; }
.info-value { color: #0f172a; font-size: 15px; margin-top: 4px; font-weight: 500; }
.stats-grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 20px; margin-bottom: 35px; }
.stat-card { padding: 20px; text-align: center; border: 2px solid #e2e8f0; border-radius: 10px; }
.stat-label { font-size: 11px; color: #64748b; text-transform: uppercase; font-weight: 600; }
.stat-value { font-size: 36px; font-weight: 700; color: #2563eb; margin: 12px 0; line-height: 1; }
.stat-note { font-size: 12px; color: #94a3b8; }
.section { margin-bottom: 30px; page-break-inside: avoid; }
.section-title { font-size: 20px; font-weight: 700; color: #1e40af; border-bottom: 2px solid #dbeafe; padding-bottom: 12px; margin-bottom: 20px; }
table { width: 100%; border-collapse: collapse; margin-bottom: 20px; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #e2e8f0; }
th { background: #f8fafc; font-weight: 600; color: #475569; font-size: 12px; text-transform: uppercase; }
td.amount, th.amount { text-align: right; }
tr.total-row td { font-weight: 700; border-top: 2px solid #cbd5e1; }
.empty { text-align: center; color: #94a3b8; }
.grade-badge { display: inline-block; padding: 6px 14px; border-radius: 16px; font-weight: 600; font-size: 13px; }
.grade-a { background: #d1fae5; color: #065f46; }
.grade-b { background: #dbeafe; color: #1e40af; }
.grade-c { background: #fef3c7; color: #92400e; }
.grade-d, .grade-f, .grade-other { background: #fee2e2; color: #991b1b; }
.note { padding: 20px; background: #eff6ff; border-left: 5px solid #2563eb; border-radius: 6px; color: #1e40af; margin: 15px 0; }
.skills-grid { display: grid; grid-template-columns: repeat(2, 1fr); gap: 15px; }
.skill-item { padding: 15px; background: #f8fafc; border-radius: 8px; display: flex; justify-content: space-between; border: 1px solid #e2e8f0; }
.remarks { margin-top: 20px; padding: 25px; background: #f8fafc; border-left: 5px solid #2563eb; border-radius: 6px; page-break-inside: avoid; }
.remarks h4 { margin: 0 0 12px 0; color: #1e40af; font-size: 15px; text-transform: uppercase; }
.signature-section { display: grid; grid-template-columns: 1fr 1fr; gap: 40px; margin-top: 60px; page-break-inside: avoid; }
.signature-box { text-align: center; }
.signature-line { border-top: 2px solid #cbd5e1; margin: 40px 20px 10px; }
.footer { margin-top: 50px; padding-top: 25px; border-top: 2px solid #e2e8f0; text-align: center; font-size: 11px; color: #94a3b8; }
</style>"#;

pub fn render_report_card(
    card: &ReportCard,
    section: ReportSection,
    options: &RenderOptions,
) -> String {
    let student = &card.student;
    let mut body = String::new();

    let _ = writeln!(body, "<div class=\"header\">");
    let _ = writeln!(body, "<h1>{}</h1>", esc(&options.school_name));
    let _ = writeln!(body, "<p><strong>Student Academic Report Card</strong></p>");
    let _ = writeln!(
        body,
        "<p>{} &bull; {}</p>",
        esc(&card.period.academic_year),
        card.period.term
    );
    let _ = writeln!(body, "</div>");

    write_student_info(&mut body, student, ("Email", esc(&student.email)));

    let (rank_value, rank_note) = rank_display(&card.class_rank);
    let _ = writeln!(body, "<div class=\"stats-grid\">");
    write_stat(&mut body, "GPA", &format!("{:.2}", card.gpa), "Out of 4.0");
    write_stat(
        &mut body,
        "Attendance",
        &format!("{:.0}%", card.attendance.percentage),
        "This term",
    );
    write_stat(&mut body, "Class Rank", &rank_value, &rank_note);
    let _ = writeln!(body, "</div>");

    if section.shows_grades() {
        write_course_table(&mut body, card);
        let _ = writeln!(body, "<div class=\"section\">");
        let _ = writeln!(body, "<div class=\"section-title\">Conduct</div>");
        let _ = writeln!(
            body,
            "<p><strong>Conduct Grade:</strong> <span class=\"grade-badge {}\">{}</span></p>",
            badge_class(&card.conduct_grade),
            esc(&card.conduct_grade)
        );
        let _ = writeln!(body, "</div>");
    }

    if section.shows_progress() {
        write_progress(&mut body, card);
    }

    if section == ReportSection::Overview && !card.skills.is_empty() {
        let _ = writeln!(body, "<div class=\"section\">");
        let _ = writeln!(body, "<div class=\"section-title\">Skills Assessment</div>");
        let _ = writeln!(body, "<div class=\"skills-grid\">");
        for skill in &card.skills {
            let _ = writeln!(
                body,
                "<div class=\"skill-item\"><span>{}</span><strong>{:.0}/100</strong></div>",
                esc(&skill.skill),
                skill.score
            );
        }
        let _ = writeln!(body, "</div>");
        let _ = writeln!(body, "</div>");
    }

    write_remarks(&mut body, "Class Teacher's Remarks", &card.teacher_remarks);
    write_remarks(&mut body, "Principal's Remarks", &card.principal_remarks);
    write_signatures(&mut body, "Class Teacher", "Principal");
    write_footer(
        &mut body,
        &format!(
            "This is an official document issued by {}",
            esc(&options.school_name)
        ),
        options.generated_on,
    );

    wrap_document(&format!("Report Card - {}", student.full_name()), &body)
}

pub fn render_fee_statement(
    statement: &FeeStatement,
    student: &Student,
    options: &RenderOptions,
) -> String {
    let currency = &options.currency;
    let mut body = String::new();

    let _ = writeln!(body, "<div class=\"header\">");
    let _ = writeln!(body, "<h1>{}</h1>", esc(&options.school_name));
    let _ = writeln!(body, "<p><strong>Fee Structure Statement</strong></p>");
    let _ = writeln!(
        body,
        "<p>Academic Year {}</p>",
        esc(&statement.academic_year)
    );
    let _ = writeln!(body, "</div>");

    write_student_info(
        &mut body,
        student,
        ("Statement Date", long_date(options.generated_on)),
    );

    let _ = writeln!(body, "<div class=\"section\">");
    let _ = writeln!(body, "<div class=\"section-title\">Fee Breakdown</div>");
    let _ = writeln!(body, "<table>");
    let _ = writeln!(
        body,
        "<thead><tr><th>Fee Item</th><th class=\"amount\">Amount</th></tr></thead>"
    );
    let _ = writeln!(body, "<tbody>");
    for line in &statement.breakdown {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td class=\"amount\">{}</td></tr>",
            esc(&line.category),
            money(currency, line.amount)
        );
    }
    let _ = writeln!(
        body,
        "<tr class=\"total-row\"><td>Total Annual Fee</td><td class=\"amount\">{}</td></tr>",
        money(currency, statement.total_annual)
    );
    let _ = writeln!(body, "</tbody>");
    let _ = writeln!(body, "</table>");
    let _ = writeln!(body, "</div>");

    let _ = writeln!(body, "<div class=\"section\">");
    let _ = writeln!(body, "<div class=\"section-title\">Discounts &amp; Policies</div>");
    let _ = writeln!(body, "<table>");
    let _ = writeln!(body, "<tbody>");
    for discount in &statement.discounts {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td class=\"amount\">{}</td></tr>",
            esc(&discount.name),
            percent(discount.fraction)
        );
    }
    let _ = writeln!(body, "</tbody>");
    let _ = writeln!(body, "</table>");
    let _ = writeln!(
        body,
        "<p><strong>Late Fee:</strong> {}</p>",
        money(currency, statement.late_fee)
    );
    let _ = writeln!(
        body,
        "<p><strong>Refund Policy:</strong> {}</p>",
        esc(&statement.refund_policy)
    );
    let _ = writeln!(body, "</div>");

    let _ = writeln!(body, "<div class=\"section\">");
    let _ = writeln!(body, "<div class=\"section-title\">Payment Schedule</div>");
    let _ = writeln!(body, "<table>");
    let _ = writeln!(
        body,
        "<thead><tr><th>#</th><th>Term</th><th>Due Date</th><th class=\"amount\">Amount Due</th>\
         <th class=\"amount\">Paid</th><th class=\"amount\">Balance</th><th>Status</th></tr></thead>"
    );
    let _ = writeln!(body, "<tbody>");
    if statement.schedule.is_empty() {
        let _ = writeln!(
            body,
            "<tr><td colspan=\"7\" class=\"empty\">No payment schedule available</td></tr>"
        );
    }
    for (index, item) in statement.schedule.iter().enumerate() {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"amount\">{}</td>\
             <td class=\"amount\">{}</td><td class=\"amount\">{}</td><td>{}</td></tr>",
            index + 1,
            esc(&item.term),
            long_date(item.due_date),
            money(currency, item.amount_due),
            money(currency, item.amount_paid),
            money(currency, item.balance()),
            item.status
        );
    }
    let _ = writeln!(
        body,
        "<tr class=\"total-row\"><td colspan=\"3\">Total</td><td class=\"amount\">{}</td>\
         <td class=\"amount\">{}</td><td class=\"amount\">{}</td><td></td></tr>",
        money(currency, statement.total_due()),
        money(currency, statement.total_paid()),
        money(currency, statement.balance())
    );
    let _ = writeln!(body, "</tbody>");
    let _ = writeln!(body, "</table>");
    if statement.uses_defaults {
        let _ = writeln!(
            body,
            "<div class=\"note\">Standard fee schedule shown; no student-specific fee records were found.</div>"
        );
    }
    let _ = writeln!(body, "</div>");

    let _ = writeln!(body, "<div class=\"note\">");
    let _ = writeln!(body, "<strong>Important Notes:</strong>");
    let _ = writeln!(
        body,
        "<p>Fees must be paid on or before the due date. A late fee of {} applies to payments made after the due date.</p>",
        money(currency, statement.late_fee)
    );
    let _ = writeln!(
        body,
        "<p>Please quote the student ID on all payments for proper allocation.</p>"
    );
    let _ = writeln!(body, "</div>");

    write_signatures(&mut body, "Accounts Officer", "School Principal");
    write_footer(
        &mut body,
        &format!(
            "This is an official fee statement issued by {}",
            esc(&options.school_name)
        ),
        options.generated_on,
    );

    wrap_document(&format!("Fee Statement - {}", student.full_name()), &body)
}

fn wrap_document(title: &str, body: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "<!DOCTYPE html>");
    let _ = writeln!(output, "<html lang=\"en\">");
    let _ = writeln!(output, "<head>");
    let _ = writeln!(output, "<meta charset=\"UTF-8\">");
    let _ = writeln!(output, "<title>{}</title>", esc(title));
    let _ = writeln!(output, "{STYLES}");
    let _ = writeln!(output, "</head>");
    let _ = writeln!(output, "<body>");
    let _ = writeln!(
        output,
        "<button class=\"no-print\" onclick=\"window.print()\">Print</button>"
    );
    let _ = writeln!(output, "<div class=\"print-container\">");
    output.push_str(body);
    let _ = writeln!(output, "</div>");
    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");
    output
}

/// `last` is a label plus an already escaped value.
fn write_student_info(body: &mut String, student: &Student, last: (&str, String)) {
    let grade_level = student
        .grade_level
        .map(|level| format!("Grade {level}"))
        .unwrap_or_else(|| "N/A".to_string());
    let student_number = student
        .student_number
        .as_deref()
        .filter(|number| !number.is_empty())
        .map(esc)
        .unwrap_or_else(|| "N/A".to_string());

    let _ = writeln!(body, "<div class=\"student-info\">");
    for (label, value) in [
        ("Student Name", esc(&student.full_name())),
        ("Student ID", student_number),
        ("Grade Level", grade_level),
        (last.0, last.1),
    ] {
        let _ = writeln!(
            body,
            "<div><div class=\"info-label\">{label}</div><div class=\"info-value\">{value}</div></div>"
        );
    }
    let _ = writeln!(body, "</div>");
}

fn write_stat(body: &mut String, label: &str, value: &str, note: &str) {
    let _ = writeln!(
        body,
        "<div class=\"stat-card\"><div class=\"stat-label\">{label}</div>\
         <div class=\"stat-value\">{value}</div><div class=\"stat-note\">{note}</div></div>"
    );
}

fn write_course_table(body: &mut String, card: &ReportCard) {
    let _ = writeln!(body, "<div class=\"section\">");
    let _ = writeln!(body, "<div class=\"section-title\">Academic Performance</div>");
    let _ = writeln!(body, "<table>");
    let _ = writeln!(
        body,
        "<thead><tr><th>Course</th><th>Credits</th><th>Average</th><th>Grade</th><th>Points</th></tr></thead>"
    );
    let _ = writeln!(body, "<tbody>");
    if card.course_averages.is_empty() {
        let _ = writeln!(
            body,
            "<tr><td colspan=\"5\" class=\"empty\">No course data available</td></tr>"
        );
    }
    for course in &card.course_averages {
        let letter = course.letter.to_string();
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td><strong>{:.0}%</strong></td>\
             <td><span class=\"grade-badge {}\">{}</span></td><td>{:.1}</td></tr>",
            esc(&course.course_name),
            course.credits,
            course.average,
            badge_class(&letter),
            letter,
            course.grade_points
        );
    }
    let _ = writeln!(body, "</tbody>");
    let _ = writeln!(body, "</table>");
    let _ = writeln!(body, "</div>");
}

fn write_progress(body: &mut String, card: &ReportCard) {
    let _ = writeln!(body, "<div class=\"section\">");
    let _ = writeln!(body, "<div class=\"section-title\">Progress Information</div>");

    match &card.progress {
        ProgressSeries::InsufficientData => {
            let _ = writeln!(
                body,
                "<div class=\"note\"><strong>GPA Trend:</strong> Not enough history to show a trend yet. \
                 Current GPA is {:.2}.</div>",
                card.gpa
            );
        }
        ProgressSeries::Trend(points) => {
            let first = points.first().map(|point| point.gpa).unwrap_or(card.gpa);
            let direction = if card.gpa > first + 0.005 {
                "improved"
            } else if card.gpa + 0.005 < first {
                "declined"
            } else {
                "held steady"
            };
            let _ = writeln!(
                body,
                "<div class=\"note\"><strong>GPA Trend:</strong> GPA has {direction} from {first:.2} to {:.2} \
                 over {} reporting periods.</div>",
                card.gpa,
                points.len()
            );
            let _ = writeln!(body, "<table>");
            let _ = writeln!(
                body,
                "<thead><tr><th>Period</th><th>GPA</th><th>Attendance</th></tr></thead>"
            );
            let _ = writeln!(body, "<tbody>");
            for point in points {
                let _ = writeln!(
                    body,
                    "<tr><td>{}</td><td>{:.2}</td><td>{:.0}%</td></tr>",
                    esc(&point.period.label()),
                    point.gpa,
                    point.attendance
                );
            }
            let _ = writeln!(body, "</tbody>");
            let _ = writeln!(body, "</table>");
        }
    }

    let _ = writeln!(
        body,
        "<div class=\"note\"><strong>Attendance Record:</strong> {:.0}% attendance rate ({} of {} sessions) \
         demonstrates {} commitment to regular class participation.</div>",
        card.attendance.percentage,
        card.attendance.present_count,
        card.attendance.total,
        attendance_standing(card.attendance.percentage)
    );
    let _ = writeln!(body, "</div>");
}

fn write_remarks(body: &mut String, heading: &str, remarks: &str) {
    let text = if remarks.trim().is_empty() {
        "No remarks provided.".to_string()
    } else {
        esc(remarks)
    };
    let _ = writeln!(
        body,
        "<div class=\"remarks\"><h4>{heading}</h4><p>{text}</p></div>"
    );
}

fn write_signatures(body: &mut String, left: &str, right: &str) {
    let _ = writeln!(body, "<div class=\"signature-section\">");
    for label in [left, right] {
        let _ = writeln!(
            body,
            "<div class=\"signature-box\"><div class=\"signature-line\"></div><div>{label}</div></div>"
        );
    }
    let _ = writeln!(body, "</div>");
}

fn write_footer(body: &mut String, issued_by: &str, generated_on: NaiveDate) {
    let _ = writeln!(body, "<div class=\"footer\">");
    let _ = writeln!(body, "<p><strong>{issued_by}</strong></p>");
    let _ = writeln!(body, "<p>Generated on {}</p>", long_date(generated_on));
    let _ = writeln!(body, "</div>");
}

fn rank_display(rank: &ClassRank) -> (String, String) {
    match rank {
        ClassRank::Ranked { position, total } => {
            (format!("#{position}"), format!("of {total} students"))
        }
        ClassRank::Estimated { position, total } => (
            format!("~#{position}"),
            format!("estimated, of {total} students"),
        ),
        ClassRank::Unavailable => ("N/A".to_string(), "Rank unavailable".to_string()),
    }
}

/// CSS class for a grade badge; anything other than a plain letter gets a
/// neutral class so user text never lands inside the attribute.
fn badge_class(grade: &str) -> &'static str {
    match grade.trim().to_ascii_uppercase().as_str() {
        "A" | "A+" | "A-" => "grade-a",
        "B" | "B+" | "B-" => "grade-b",
        "C" | "C+" | "C-" => "grade-c",
        "D" | "D+" | "D-" => "grade-d",
        "F" => "grade-f",
        _ => "grade-other",
    }
}

fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn percent(fraction: f64) -> String {
    let value = fraction * 100.0;
    if (value - value.round()).abs() < 1e-9 {
        format!("{value:.0}%")
    } else {
        format!("{value:.1}%")
    }
}

pub fn money(currency: &str, amount: f64) -> String {
    format!("{} {}", esc(currency), format_amount(amount))
}

/// Thousands separators and two decimals: `41000` becomes `41,000.00`.
pub fn format_amount(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!(
        "{sign}{}.{:02}",
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

pub fn esc(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::summarize_attendance;
    use crate::fees::build_fee_statement;
    use crate::models::{
        CourseSummary, LetterGrade, ProgressPoint, ReportPeriod, SkillScore, Term,
    };

    fn options() -> RenderOptions {
        RenderOptions {
            school_name: "Kastra Systems".to_string(),
            currency: "KES".to_string(),
            generated_on: NaiveDate::from_ymd_opt(2024, 12, 5).expect("valid date"),
        }
    }

    fn student(first_name: &str) -> Student {
        Student {
            id: 1,
            first_name: first_name.to_string(),
            last_name: "Wanjiru".to_string(),
            email: "grace@example.com".to_string(),
            student_number: Some("STU-001".to_string()),
            grade_level: Some(10),
        }
    }

    fn card(first_name: &str, remarks: &str) -> ReportCard {
        ReportCard {
            student: student(first_name),
            period: ReportPeriod::new("2024-2025", Term::Fall),
            report_card_id: Some(3),
            gpa: 3.32,
            attendance: summarize_attendance(&[]),
            class_rank: ClassRank::Ranked {
                position: 2,
                total: 30,
            },
            total_students: 30,
            course_averages: vec![CourseSummary {
                course_id: 1,
                course_name: "Mathematics".to_string(),
                credits: 3,
                average: 83.0,
                letter: LetterGrade::B,
                grade_points: 3.0,
                source_grades: Vec::new(),
            }],
            progress: ProgressSeries::InsufficientData,
            skills: vec![SkillScore {
                skill: "Academic Performance".to_string(),
                score: 83.0,
            }],
            conduct_grade: "A".to_string(),
            teacher_remarks: remarks.to_string(),
            principal_remarks: "Keep going.".to_string(),
        }
    }

    #[test]
    fn escapes_user_supplied_text() {
        let html = render_report_card(
            &card("<script>alert(1)</script>", "Tom & \"Jerry\" <b>"),
            ReportSection::Overview,
            &options(),
        );
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Tom &amp; &quot;Jerry&quot; &lt;b&gt;"));
    }

    #[test]
    fn conduct_grade_cannot_break_out_of_attribute() {
        let mut report = card("Grace", "Fine");
        report.conduct_grade = "\" onmouseover=\"x".to_string();
        let html = render_report_card(&report, ReportSection::Grades, &options());
        assert!(html.contains("grade-badge grade-other"));
        assert!(!html.contains("\" onmouseover=\"x"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let report = card("Grace", "Consistent effort.");
        let first = render_report_card(&report, ReportSection::Overview, &options());
        let second = render_report_card(&report, ReportSection::Overview, &options());
        assert_eq!(first, second);
        assert!(first.contains("Generated on December 5, 2024"));
    }

    #[test]
    fn sections_select_content() {
        let report = card("Grace", "Fine");
        let grades = render_report_card(&report, ReportSection::Grades, &options());
        assert!(grades.contains("Academic Performance</div>"));
        assert!(!grades.contains("Progress Information"));
        assert!(!grades.contains("Skills Assessment"));

        let progress = render_report_card(&report, ReportSection::Progress, &options());
        assert!(progress.contains("Progress Information"));
        assert!(progress.contains("Not enough history"));
        assert!(!progress.contains("Conduct Grade"));

        let overview = render_report_card(&report, ReportSection::Overview, &options());
        assert!(overview.contains("Skills Assessment"));
        assert!(overview.contains("Conduct Grade"));
        assert!(overview.contains("Progress Information"));
    }

    #[test]
    fn trend_and_rank_are_described() {
        let mut report = card("Grace", "Fine");
        report.progress = ProgressSeries::Trend(vec![
            ProgressPoint {
                period: ReportPeriod::new("2023-2024", Term::Summer),
                gpa: 2.9,
                attendance: 90.0,
            },
            ProgressPoint {
                period: ReportPeriod::new("2024-2025", Term::Fall),
                gpa: 3.32,
                attendance: 0.0,
            },
        ]);
        report.class_rank = ClassRank::Unavailable;
        let html = render_report_card(&report, ReportSection::Overview, &options());
        assert!(html.contains("GPA has improved from 2.90 to 3.32"));
        assert!(html.contains("Summer 2023-2024"));
        assert!(html.contains("Rank unavailable"));
    }

    #[test]
    fn money_has_separators() {
        assert_eq!(format_amount(41000.0), "41,000.00");
        assert_eq!(format_amount(13666.666), "13,666.67");
        assert_eq!(format_amount(-500.5), "-500.50");
        assert_eq!(money("KES", 0.0), "KES 0.00");
    }

    #[test]
    fn fee_statement_lists_schedule() {
        let statement = build_fee_statement(
            None,
            &[],
            "2024-2025",
            10,
            NaiveDate::from_ymd_opt(2024, 7, 1).expect("valid date"),
        );
        let html = render_fee_statement(&statement, &student("Grace"), &options());
        assert!(html.contains("KES 41,000.00"));
        assert!(html.contains("August 15, 2024"));
        assert!(html.contains("Sibling Discount"));
        assert!(html.contains("10%"));
        assert!(html.contains("Standard fee schedule shown"));
        assert!(html.contains("Books &amp; Materials"));
    }
}
