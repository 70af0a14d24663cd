use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemarksError {
    #[error("no report card has been generated for student {student_id} yet")]
    MissingReportCard { student_id: i32 },
    #[error("remarks are not being edited")]
    NotEditing,
    #[error("failed to save remarks: {0:#}")]
    Persistence(anyhow::Error),
}
