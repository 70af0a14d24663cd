use crate::models::LetterGrade;

/// Inclusive lower bounds, checked highest first. Anything below is an F.
pub const LETTER_THRESHOLDS: [(LetterGrade, f64); 4] = [
    (LetterGrade::A, 90.0),
    (LetterGrade::B, 80.0),
    (LetterGrade::C, 70.0),
    (LetterGrade::D, 60.0),
];

/// Percentage on a 0-100 scale divides down to 0-4.
pub const GPA_DIVISOR: f64 = 25.0;
pub const GPA_MAX: f64 = 4.0;

pub fn percentage(points_earned: f64, max_points: f64) -> f64 {
    if max_points > 0.0 {
        (points_earned / max_points) * 100.0
    } else {
        0.0
    }
}

pub fn letter_grade(percentage: f64) -> LetterGrade {
    LETTER_THRESHOLDS
        .iter()
        .find(|(_, lower)| percentage >= *lower)
        .map(|(letter, _)| *letter)
        .unwrap_or(LetterGrade::F)
}

impl LetterGrade {
    pub fn grade_points(self) -> f64 {
        match self {
            LetterGrade::A => 4.0,
            LetterGrade::B => 3.0,
            LetterGrade::C => 2.0,
            LetterGrade::D => 1.0,
            LetterGrade::F => 0.0,
        }
    }
}

/// Overall GPA: mean of the course percentages divided by 25, two decimals.
pub fn overall_gpa<I>(course_averages: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut count = 0usize;
    let mut total = 0.0;
    for average in course_averages {
        if average.is_finite() {
            total += average;
            count += 1;
        }
    }

    if count == 0 {
        return 0.0;
    }

    let gpa = total / count as f64 / GPA_DIVISOR;
    round_to(gpa.clamp(0.0, GPA_MAX), 2)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_guards_zero_max() {
        assert_eq!(percentage(10.0, 0.0), 0.0);
        assert_eq!(percentage(10.0, -5.0), 0.0);
        assert!((percentage(45.0, 50.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn letter_thresholds_are_inclusive_lower_bounds() {
        assert_eq!(letter_grade(100.0), LetterGrade::A);
        assert_eq!(letter_grade(90.0), LetterGrade::A);
        assert_eq!(letter_grade(89.999), LetterGrade::B);
        assert_eq!(letter_grade(80.0), LetterGrade::B);
        assert_eq!(letter_grade(79.99), LetterGrade::C);
        assert_eq!(letter_grade(70.0), LetterGrade::C);
        assert_eq!(letter_grade(60.0), LetterGrade::D);
        assert_eq!(letter_grade(59.9), LetterGrade::F);
        assert_eq!(letter_grade(0.0), LetterGrade::F);
    }

    #[test]
    fn every_percentage_maps_to_exactly_one_letter() {
        let mut previous = letter_grade(0.0);
        for step in 0..=10_000 {
            let pct = step as f64 / 100.0;
            let letter = letter_grade(pct);
            // Letters only ever improve as the percentage rises.
            assert!(letter <= previous, "{pct} produced {letter} after {previous}");
            previous = letter;
        }
        assert_eq!(letter_grade(f64::NAN), LetterGrade::F);
    }

    #[test]
    fn grade_points_are_stepped() {
        assert_eq!(letter_grade(95.0).grade_points(), 4.0);
        assert_eq!(letter_grade(89.0).grade_points(), 3.0);
        assert_eq!(letter_grade(70.0).grade_points(), 2.0);
        assert_eq!(letter_grade(61.0).grade_points(), 1.0);
        assert_eq!(letter_grade(12.0).grade_points(), 0.0);
    }

    #[test]
    fn overall_gpa_is_mean_percentage_over_25() {
        assert_eq!(overall_gpa(vec![83.0]), 3.32);
        assert_eq!(overall_gpa(vec![90.0, 80.0]), 3.4);
        assert_eq!(overall_gpa(Vec::<f64>::new()), 0.0);
    }

    #[test]
    fn overall_gpa_stays_on_scale() {
        assert_eq!(overall_gpa(vec![140.0]), 4.0);
        assert_eq!(overall_gpa(vec![0.0, 0.0]), 0.0);
    }
}
