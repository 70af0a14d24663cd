use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use log::debug;

use crate::grading;
use crate::models::{Course, CourseSummary, GradeRecord};

pub const DEFAULT_CREDITS: i32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AveragingOptions {
    /// Keep enrolled courses without grades, reported at 0 / F.
    pub include_empty_courses: bool,
}

/// One summary per enrolled course, in enrollment order. Each graded
/// assignment weighs the same regardless of its point value.
pub fn average_courses(
    courses: &[Course],
    grades: &[GradeRecord],
    options: AveragingOptions,
) -> Vec<CourseSummary> {
    let mut by_course: HashMap<i32, Vec<GradeRecord>> = HashMap::new();
    for grade in grades {
        by_course
            .entry(grade.course_id)
            .or_default()
            .push(grade.clone());
    }

    let mut seen = HashSet::new();
    let mut summaries = Vec::new();

    for course in courses {
        if !seen.insert(course.id) {
            continue;
        }

        let mut course_grades = by_course.remove(&course.id).unwrap_or_default();
        if course_grades.is_empty() && !options.include_empty_courses {
            continue;
        }

        // Fixed order keeps the float sum independent of fetch order.
        course_grades.sort_by(compare_grades);
        let average = mean_percentage(&course_grades);
        let letter = grading::letter_grade(average);

        summaries.push(CourseSummary {
            course_id: course.id,
            course_name: course.name.clone(),
            credits: if course.credits >= 1 {
                course.credits
            } else {
                DEFAULT_CREDITS
            },
            average,
            letter,
            grade_points: letter.grade_points(),
            source_grades: course_grades,
        });
    }

    if !by_course.is_empty() {
        let orphaned: usize = by_course.values().map(Vec::len).sum();
        debug!("ignored {orphaned} grade records for courses outside the enrollment list");
    }

    summaries
}

fn mean_percentage(grades: &[GradeRecord]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }

    let total: f64 = grades
        .iter()
        .map(|grade| grading::percentage(grade.points_earned, grade.max_points))
        .sum();
    (total / grades.len() as f64).clamp(0.0, 100.0)
}

fn compare_grades(a: &GradeRecord, b: &GradeRecord) -> Ordering {
    a.assignment_id
        .cmp(&b.assignment_id)
        .then_with(|| a.graded_at.cmp(&b.graded_at))
        .then_with(|| a.points_earned.total_cmp(&b.points_earned))
        .then_with(|| a.max_points.total_cmp(&b.max_points))
        .then_with(|| a.feedback.cmp(&b.feedback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LetterGrade;

    fn course(id: i32, name: &str, credits: i32) -> Course {
        Course {
            id,
            name: name.to_string(),
            code: None,
            credits,
        }
    }

    fn grade(assignment_id: i32, course_id: i32, earned: f64, max: f64) -> GradeRecord {
        GradeRecord {
            assignment_id,
            course_id,
            points_earned: earned,
            max_points: max,
            feedback: None,
            graded_at: None,
        }
    }

    #[test]
    fn averages_percentages_not_points() {
        let courses = vec![course(1, "Biology", 3)];
        // 10/10 and 0/100 would be 9% by points; each assignment weighs half.
        let grades = vec![grade(1, 1, 10.0, 10.0), grade(2, 1, 0.0, 100.0)];
        let summaries = average_courses(&courses, &grades, AveragingOptions::default());
        assert_eq!(summaries.len(), 1);
        assert!((summaries[0].average - 50.0).abs() < 1e-9);
        assert_eq!(summaries[0].letter, LetterGrade::F);
    }

    #[test]
    fn worked_example_gives_b_and_omits_empty_course() {
        let courses = vec![course(1, "Mathematics", 3), course(2, "History", 2)];
        let grades = vec![grade(1, 1, 45.0, 50.0), grade(2, 1, 38.0, 50.0)];
        let summaries = average_courses(&courses, &grades, AveragingOptions::default());

        assert_eq!(summaries.len(), 1);
        let math = &summaries[0];
        assert_eq!(math.course_name, "Mathematics");
        assert_eq!(math.credits, 3);
        assert!((math.average - 83.0).abs() < 1e-9);
        assert_eq!(math.letter, LetterGrade::B);
        assert_eq!(math.grade_points, 3.0);
        assert_eq!(math.source_grades.len(), 2);
    }

    #[test]
    fn empty_courses_included_when_requested() {
        let courses = vec![course(1, "Mathematics", 3), course(2, "History", 0)];
        let grades = vec![grade(1, 1, 45.0, 50.0)];
        let options = AveragingOptions {
            include_empty_courses: true,
        };
        let summaries = average_courses(&courses, &grades, options);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].course_name, "History");
        assert_eq!(summaries[1].average, 0.0);
        assert_eq!(summaries[1].letter, LetterGrade::F);
        assert_eq!(summaries[1].credits, DEFAULT_CREDITS);
        assert!(summaries[1].source_grades.is_empty());
    }

    #[test]
    fn shuffled_grades_give_identical_summaries() {
        let courses = vec![course(1, "Chemistry", 4), course(2, "Art", 2)];
        let grades = vec![
            grade(1, 1, 7.0, 9.0),
            grade(2, 2, 13.0, 17.0),
            grade(3, 1, 1.0, 3.0),
            grade(4, 2, 19.0, 23.0),
            grade(5, 1, 88.8, 97.0),
            grade(6, 1, 0.1, 0.7),
        ];
        let expected = average_courses(&courses, &grades, AveragingOptions::default());

        let mut reversed = grades.clone();
        reversed.reverse();
        let mut rotated = grades.clone();
        rotated.rotate_left(2);
        let mut interleaved = grades.clone();
        interleaved.swap(0, 5);
        interleaved.swap(1, 3);

        for variant in [reversed, rotated, interleaved] {
            let summaries = average_courses(&courses, &variant, AveragingOptions::default());
            assert_eq!(summaries, expected);
        }
    }

    #[test]
    fn grades_outside_enrollment_are_ignored() {
        let courses = vec![course(1, "Physics", 3)];
        let grades = vec![grade(1, 1, 80.0, 100.0), grade(2, 9, 10.0, 100.0)];
        let summaries = average_courses(&courses, &grades, AveragingOptions::default());
        assert_eq!(summaries.len(), 1);
        assert!((summaries[0].average - 80.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_enrollments_collapse() {
        let courses = vec![course(1, "Physics", 3), course(1, "Physics", 3)];
        let grades = vec![grade(1, 1, 80.0, 100.0)];
        let summaries = average_courses(&courses, &grades, AveragingOptions::default());
        assert_eq!(summaries.len(), 1);
    }

    #[test]
    fn zero_max_points_count_as_zero_percent() {
        let courses = vec![course(1, "Music", 1)];
        let grades = vec![grade(1, 1, 5.0, 0.0), grade(2, 1, 100.0, 100.0)];
        let summaries = average_courses(&courses, &grades, AveragingOptions::default());
        assert!((summaries[0].average - 50.0).abs() < 1e-9);
    }
}
