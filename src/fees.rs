use chrono::NaiveDate;
use log::{debug, warn};

use crate::grading::round_to;
use crate::models::{
    Discount, FeeLine, FeeRecord, FeeStatement, FeeStructure, Installment, PaymentStatus,
};

pub const DEFAULT_REFUND_POLICY: &str =
    "Refundable within 30 days of admission with 20% processing fee";

/// Share of the annual total due in each term when no fee records exist.
const INSTALLMENT_SHARES: [(&str, u32, u32, i32, f64); 3] = [
    // (term, month, day, year offset, share)
    ("Fall", 8, 15, 0, 0.35),
    ("Spring", 1, 15, 1, 0.35),
    ("Summer", 5, 15, 1, 0.30),
];

/// Template used when the school has not configured fees for a grade level.
pub fn default_fee_structure(academic_year: &str, grade_level: i32) -> FeeStructure {
    FeeStructure {
        academic_year: academic_year.to_string(),
        grade_level,
        tuition: 18000.0,
        lab: 2000.0,
        library: 1500.0,
        sports: 1000.0,
        technology: 2500.0,
        activities: 1200.0,
        transport: 3000.0,
        meals: 4000.0,
        uniforms: 800.0,
        books: 2000.0,
        examination: 1000.0,
        insurance: 500.0,
        development_fee: 3000.0,
        misc: 500.0,
        total_annual: 41000.0,
        sibling_discount: 0.10,
        merit_discount: 0.05,
        early_payment_discount: 0.02,
        late_fee: 500.0,
        refund_policy: Some(DEFAULT_REFUND_POLICY.to_string()),
    }
}

pub fn fee_breakdown(structure: &FeeStructure) -> Vec<FeeLine> {
    [
        ("Tuition", structure.tuition),
        ("Laboratory", structure.lab),
        ("Library", structure.library),
        ("Sports", structure.sports),
        ("Technology", structure.technology),
        ("Activities", structure.activities),
        ("Transport", structure.transport),
        ("Meals", structure.meals),
        ("Uniforms", structure.uniforms),
        ("Books & Materials", structure.books),
        ("Examination", structure.examination),
        ("Insurance", structure.insurance),
        ("Development Fee", structure.development_fee),
        ("Miscellaneous", structure.misc),
    ]
    .into_iter()
    .map(|(category, amount)| FeeLine {
        category: category.to_string(),
        amount,
    })
    .collect()
}

/// Combines the fee template with the student's fee records for one year.
/// Missing pieces are synthesized and flagged through `uses_defaults`.
pub fn build_fee_statement(
    structure: Option<FeeStructure>,
    records: &[FeeRecord],
    academic_year: &str,
    grade_level: i32,
    as_of: NaiveDate,
) -> FeeStatement {
    let mut uses_defaults = false;
    let structure = match structure {
        Some(structure) => structure,
        None => {
            debug!("no fee structure for {academic_year} grade {grade_level}; using defaults");
            uses_defaults = true;
            default_fee_structure(academic_year, grade_level)
        }
    };

    let breakdown = fee_breakdown(&structure);
    let total_annual = if structure.total_annual > 0.0 {
        structure.total_annual
    } else {
        breakdown.iter().map(|line| line.amount).sum()
    };

    let mut year_records: Vec<&FeeRecord> = records
        .iter()
        .filter(|record| record.academic_year == academic_year)
        .collect();
    year_records.sort_by_key(|record| (record.due_date, record.id));

    let schedule = if year_records.is_empty() {
        uses_defaults = true;
        synthesized_schedule(academic_year, total_annual)
    } else {
        year_records
            .into_iter()
            .map(|record| installment_from_record(record, as_of))
            .collect()
    };

    FeeStatement {
        academic_year: academic_year.to_string(),
        breakdown,
        total_annual,
        discounts: vec![
            Discount {
                name: "Sibling Discount".to_string(),
                fraction: structure.sibling_discount,
            },
            Discount {
                name: "Merit Scholarship".to_string(),
                fraction: structure.merit_discount,
            },
            Discount {
                name: "Early Payment".to_string(),
                fraction: structure.early_payment_discount,
            },
        ],
        late_fee: structure.late_fee,
        refund_policy: structure
            .refund_policy
            .filter(|policy| !policy.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REFUND_POLICY.to_string()),
        schedule,
        uses_defaults,
    }
}

fn installment_from_record(record: &FeeRecord, as_of: NaiveDate) -> Installment {
    let status = match record.status {
        PaymentStatus::Unpaid | PaymentStatus::Pending if record.due_date < as_of => {
            PaymentStatus::Overdue
        }
        status => status,
    };
    let amount_paid = if status == PaymentStatus::Paid {
        record.amount
    } else {
        0.0
    };

    Installment {
        term: record.term.to_string(),
        due_date: record.due_date,
        amount_due: record.amount,
        amount_paid,
        status,
    }
}

/// Three unpaid instalments; the last one absorbs rounding so the schedule
/// sums to the annual total.
fn synthesized_schedule(academic_year: &str, total_annual: f64) -> Vec<Installment> {
    let Some(first_year) = start_year(academic_year) else {
        warn!("cannot derive due dates from academic year {academic_year:?}");
        return Vec::new();
    };

    let mut allocated = 0.0;
    let mut schedule = Vec::with_capacity(INSTALLMENT_SHARES.len());

    for (index, (term, month, day, offset, share)) in INSTALLMENT_SHARES.iter().enumerate() {
        let Some(due_date) = NaiveDate::from_ymd_opt(first_year + offset, *month, *day) else {
            continue;
        };
        let amount_due = if index + 1 == INSTALLMENT_SHARES.len() {
            round_to(total_annual - allocated, 2)
        } else {
            round_to(total_annual * share, 2)
        };
        allocated += amount_due;

        schedule.push(Installment {
            term: term.to_string(),
            due_date,
            amount_due,
            amount_paid: 0.0,
            status: PaymentStatus::Unpaid,
        });
    }

    schedule
}

/// "2024-2025" starts in 2024.
pub fn start_year(academic_year: &str) -> Option<i32> {
    academic_year.split('-').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Term;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn record(id: i32, term: Term, amount: f64, due: NaiveDate, status: PaymentStatus) -> FeeRecord {
        FeeRecord {
            id,
            academic_year: "2024-2025".to_string(),
            term,
            amount,
            due_date: due,
            status,
            paid_date: None,
        }
    }

    #[test]
    fn defaults_fill_in_missing_structure_and_records() {
        let statement = build_fee_statement(None, &[], "2024-2025", 10, date(2024, 7, 1));

        assert!(statement.uses_defaults);
        assert_eq!(statement.breakdown.len(), 14);
        assert_eq!(statement.total_annual, 41000.0);
        assert_eq!(statement.late_fee, 500.0);
        assert_eq!(statement.refund_policy, DEFAULT_REFUND_POLICY);
        assert_eq!(statement.discounts[0].fraction, 0.10);

        let dues: Vec<f64> = statement.schedule.iter().map(|i| i.amount_due).collect();
        assert_eq!(dues, vec![14350.0, 14350.0, 12300.0]);
        assert_eq!(statement.schedule[0].due_date, date(2024, 8, 15));
        assert_eq!(statement.schedule[1].due_date, date(2025, 1, 15));
        assert_eq!(statement.schedule[2].due_date, date(2025, 5, 15));
        assert!((statement.total_due() - 41000.0).abs() < 1e-6);
        assert_eq!(statement.total_paid(), 0.0);
    }

    #[test]
    fn breakdown_sum_used_when_template_total_missing() {
        let mut structure = default_fee_structure("2024-2025", 9);
        structure.total_annual = 0.0;
        let expected: f64 = fee_breakdown(&structure).iter().map(|l| l.amount).sum();
        let statement = build_fee_statement(Some(structure), &[], "2024-2025", 9, date(2024, 7, 1));
        assert_eq!(statement.total_annual, expected);
    }

    #[test]
    fn records_drive_schedule_and_overdue_status() {
        let records = vec![
            record(2, Term::Spring, 14000.0, date(2025, 1, 15), PaymentStatus::Unpaid),
            record(1, Term::Fall, 14000.0, date(2024, 8, 15), PaymentStatus::Paid),
            record(3, Term::Summer, 13000.0, date(2025, 5, 15), PaymentStatus::Pending),
        ];
        let structure = default_fee_structure("2024-2025", 10);
        let statement =
            build_fee_statement(Some(structure), &records, "2024-2025", 10, date(2025, 2, 1));

        assert!(!statement.uses_defaults);
        let statuses: Vec<PaymentStatus> = statement.schedule.iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![PaymentStatus::Paid, PaymentStatus::Overdue, PaymentStatus::Pending]
        );
        assert_eq!(statement.schedule[0].term, "Fall");
        assert_eq!(statement.total_paid(), 14000.0);
        assert_eq!(statement.balance(), 27000.0);
    }

    #[test]
    fn records_from_other_years_are_ignored() {
        let mut old = record(1, Term::Fall, 9000.0, date(2023, 8, 15), PaymentStatus::Paid);
        old.academic_year = "2023-2024".to_string();
        let statement = build_fee_statement(None, &[old], "2024-2025", 10, date(2024, 7, 1));
        assert_eq!(statement.schedule.len(), 3);
        assert!(statement.schedule.iter().all(|i| i.status == PaymentStatus::Unpaid));
    }

    #[test]
    fn unparseable_year_yields_empty_schedule() {
        let statement = build_fee_statement(None, &[], "next year", 10, date(2024, 7, 1));
        assert!(statement.schedule.is_empty());
        assert_eq!(start_year("2024-2025"), Some(2024));
    }
}
