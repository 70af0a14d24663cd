use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::{info, warn};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

mod api;
mod attendance;
mod courses;
mod db;
mod errors;
mod fees;
mod grading;
mod models;
mod rank;
mod render;
mod report_card;

use courses::AveragingOptions;
use models::{AttendanceStatus, ClassRank, ReportCard, ReportPeriod, StudentRecords, Term};
use render::{RenderOptions, ReportSection};
use report_card::{AssemblyInput, RemarksEditor};

#[derive(Parser)]
#[command(name = "school-report-cards")]
#[command(about = "Student report cards and fee statements for the school records system", long_about = None)]
struct Cli {
    /// School name printed in document headers
    #[arg(long, global = true, default_value = "Kastra Systems")]
    school_name: String,
    /// Currency code printed with fee amounts
    #[arg(long, global = true, default_value = "KES")]
    currency: String,
    #[arg(long, global = true, default_value = "2024-2025")]
    academic_year: String,
    #[arg(long, global = true, value_enum, default_value_t = Term::Fall)]
    term: Term,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load demo students, courses and grades
    Seed,
    /// List students with their ids
    Students,
    /// Import grades from a CSV file
    ImportGrades {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Render a student's report card as printable HTML
    ReportCard {
        #[arg(long)]
        student: i32,
        #[arg(long, value_enum, default_value_t = ReportSection::Overview)]
        section: ReportSection,
        /// List enrolled courses without grades as zero averages
        #[arg(long)]
        include_empty_courses: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Store the current report card so it can be annotated and ranked
    Snapshot {
        #[arg(long)]
        student: i32,
    },
    /// Update teacher and principal remarks on the stored report card
    Remarks {
        #[arg(long)]
        student: i32,
        #[arg(long)]
        teacher: Option<String>,
        #[arg(long)]
        principal: Option<String>,
    },
    /// Render a student's fee statement as printable HTML
    FeeStatement {
        #[arg(long)]
        student: i32,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render a report card from an exported API bundle without a database
    Render {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = ReportSection::Overview)]
        section: ReportSection,
        #[arg(long)]
        include_empty_courses: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let period = ReportPeriod::new(cli.academic_year.clone(), cli.term);
    let today = chrono::Local::now().date_naive();
    let render_options = RenderOptions {
        school_name: cli.school_name.clone(),
        currency: cli.currency.clone(),
        generated_on: today,
    };

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Students => {
            let pool = connect().await?;
            let students = db::fetch_students(&pool).await?;
            if students.is_empty() {
                println!("No students found.");
                return Ok(());
            }
            for student in students {
                println!(
                    "- {} {} ({}, grade {})",
                    student.id,
                    student.full_name(),
                    student.student_number.as_deref().unwrap_or("no number"),
                    student
                        .grade_level
                        .map(|level| level.to_string())
                        .unwrap_or_else(|| "?".to_string())
                );
            }
        }
        Commands::ImportGrades { csv } => {
            let pool = connect().await?;
            let imported = db::import_grades(&pool, &csv).await?;
            println!("Imported {imported} grades from {}.", csv.display());
        }
        Commands::ReportCard {
            student,
            section,
            include_empty_courses,
            out,
        } => {
            let pool = connect().await?;
            let records = db::load_student_records(&pool, student, &period).await?;
            let card = assemble(&records, &period, include_empty_courses);
            let out = out.unwrap_or_else(|| default_output("report-card", student));
            write_document(&out, &render::render_report_card(&card, section, &render_options))?;
            print_summary(&card);
            println!("Report card written to {}.", out.display());
        }
        Commands::Snapshot { student } => {
            let pool = connect().await?;
            let records = db::load_student_records(&pool, student, &period).await?;
            let card = assemble(&records, &period, false);
            let id = db::save_snapshot(&pool, &card).await?;
            info!("stored report card {id} for student {student}");
            println!(
                "Report card {id} saved for {} ({}).",
                card.student.full_name(),
                period.label()
            );
        }
        Commands::Remarks {
            student,
            teacher,
            principal,
        } => {
            if teacher.is_none() && principal.is_none() {
                bail!("pass --teacher and/or --principal with the new remarks");
            }
            let pool = connect().await?;
            update_remarks(&pool, student, &period, teacher, principal).await?;
        }
        Commands::FeeStatement { student, out } => {
            let pool = connect().await?;
            let profile = db::fetch_student(&pool, student)
                .await?
                .with_context(|| format!("student {student} not found"))?;
            let grade_level = profile.grade_level.unwrap_or_else(|| {
                warn!("student {student} has no grade level; using default fees");
                0
            });

            let structure =
                db::fetch_fee_structure(&pool, &period.academic_year, grade_level).await?;
            let records = db::fetch_fee_records(&pool, student, &period.academic_year).await?;
            let statement = fees::build_fee_statement(
                structure,
                &records,
                &period.academic_year,
                grade_level,
                today,
            );

            let out = out.unwrap_or_else(|| default_output("fee-statement", student));
            write_document(
                &out,
                &render::render_fee_statement(&statement, &profile, &render_options),
            )?;
            println!(
                "Balance {} of {} for {}.",
                render::money(&render_options.currency, statement.balance()),
                render::money(&render_options.currency, statement.total_due()),
                profile.full_name()
            );
            println!("Fee statement written to {}.", out.display());
        }
        Commands::Render {
            input,
            section,
            include_empty_courses,
            out,
        } => {
            let bundle = api::load_bundle(&input)?;
            let records = api::normalize_bundle(bundle);
            let card = assemble(&records, &period, include_empty_courses);
            let out = out.unwrap_or_else(|| default_output("report-card", records.student.id));
            write_document(&out, &render::render_report_card(&card, section, &render_options))?;
            print_summary(&card);
            println!("Report card written to {}.", out.display());
        }
    }

    Ok(())
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to the school Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

fn assemble(
    records: &StudentRecords,
    period: &ReportPeriod,
    include_empty_courses: bool,
) -> ReportCard {
    report_card::assemble(&AssemblyInput {
        student: &records.student,
        period,
        courses: &records.courses,
        grades: &records.grades,
        attendance: &records.attendance,
        total_students: records.total_students,
        persisted: &records.report_cards,
        peer_gpas: &records.peer_gpas,
        options: AveragingOptions {
            include_empty_courses,
        },
    })
}

async fn update_remarks(
    pool: &PgPool,
    student: i32,
    period: &ReportPeriod,
    teacher: Option<String>,
    principal: Option<String>,
) -> anyhow::Result<()> {
    let records = db::load_student_records(pool, student, period).await?;
    let mut card = assemble(&records, period, false);

    let mut editor = RemarksEditor::new();
    let draft = editor.begin(&card);
    if let Some(text) = teacher {
        draft.teacher_remarks = text;
    }
    if let Some(text) = principal {
        draft.principal_remarks = text;
    }

    let unchanged = editor.draft().is_some_and(|draft| {
        draft.teacher_remarks == card.teacher_remarks
            && draft.principal_remarks == card.principal_remarks
    });
    if unchanged {
        editor.cancel();
        println!("Remarks for {} are already up to date.", card.student.full_name());
        return Ok(());
    }

    editor.save(pool, &mut card).await?;
    println!(
        "Remarks updated for {} ({}).",
        card.student.full_name(),
        period.label()
    );
    Ok(())
}

fn default_output(kind: &str, student: i32) -> PathBuf {
    PathBuf::from(format!("{kind}-{student}.html"))
}

fn write_document(out: &Path, html: &str) -> anyhow::Result<()> {
    std::fs::write(out, html).with_context(|| format!("failed to write {}", out.display()))
}

fn print_summary(card: &ReportCard) {
    let rank = match card.class_rank {
        ClassRank::Ranked { position, total } => format!("{position} of {total}"),
        ClassRank::Estimated { position, total } => format!("~{position} of {total} (estimated)"),
        ClassRank::Unavailable => "unavailable".to_string(),
    };

    println!("{} - {}", card.student.full_name(), card.period.label());
    println!(
        "- GPA {:.2}, attendance {:.0}%, class rank {rank}",
        card.gpa,
        card.attendance_percentage()
    );
    let summary = &card.attendance;
    println!(
        "- {} sessions: {} present, {} late, {} absent, {} excused",
        summary.total,
        attendance::count_status(summary, &AttendanceStatus::Present),
        attendance::count_status(summary, &AttendanceStatus::Late),
        attendance::count_status(summary, &AttendanceStatus::Absent),
        attendance::count_status(summary, &AttendanceStatus::Excused)
    );
    for course in &card.course_averages {
        println!(
            "- {} {:.1}% ({})",
            course.course_name, course.average, course.letter
        );
    }
}
