use log::debug;

use crate::models::ClassRank;

/// Share of the class used for the placeholder "top percentile" rank.
pub const PLACEHOLDER_PERCENTILE: f64 = 0.15;

const GPA_EPSILON: f64 = 1e-9;

/// Rank read back from a persisted report card, with the class size it was
/// computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredRank {
    pub position: u32,
    pub total: u32,
}

/// Resolution order: a rank already persisted by the school, then a rank
/// computed from the GPAs of every other student in the class, then the
/// placeholder. A partial set of peer GPAs never yields a `Ranked` value.
pub fn resolve_class_rank(
    gpa: f64,
    total_students: u32,
    stored: Option<StoredRank>,
    peer_gpas: &[f64],
) -> ClassRank {
    if let Some(stored) = stored.filter(|stored| stored.position >= 1 && stored.total >= 1) {
        return ClassRank::Ranked {
            position: stored.position,
            total: stored.total.max(stored.position),
        };
    }

    if total_students == 0 {
        return ClassRank::Unavailable;
    }

    if covers_whole_class(total_students, peer_gpas) {
        let position = rank_among_peers(gpa, peer_gpas);
        return ClassRank::Ranked {
            position,
            total: total_students.max(position),
        };
    }

    if !peer_gpas.is_empty() {
        debug!(
            "only {} of {} classmates have a GPA for the period; estimating rank",
            peer_gpas.len(),
            total_students.saturating_sub(1)
        );
    }

    match placeholder_rank(total_students) {
        Some(position) => ClassRank::Estimated {
            position,
            total: total_students,
        },
        None => ClassRank::Unavailable,
    }
}

/// `peer_gpas` excludes the student being ranked.
fn covers_whole_class(total_students: u32, peer_gpas: &[f64]) -> bool {
    !peer_gpas.is_empty() && peer_gpas.len() as u64 + 1 >= u64::from(total_students)
}

/// Competition ranking: one more than the number of strictly higher GPAs.
pub fn rank_among_peers(gpa: f64, peer_gpas: &[f64]) -> u32 {
    let higher = peer_gpas
        .iter()
        .filter(|peer| peer.is_finite() && **peer > gpa + GPA_EPSILON)
        .count();
    u32::try_from(higher).unwrap_or(u32::MAX - 1) + 1
}

pub fn placeholder_rank(total_students: u32) -> Option<u32> {
    if total_students == 0 {
        return None;
    }
    let position = (f64::from(total_students) * PLACEHOLDER_PERCENTILE).ceil() as u32;
    Some(position.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_students_is_unavailable() {
        assert_eq!(resolve_class_rank(3.5, 0, None, &[]), ClassRank::Unavailable);
        assert_eq!(resolve_class_rank(3.5, 0, None, &[3.0]), ClassRank::Unavailable);
        assert_eq!(placeholder_rank(0), None);
    }

    #[test]
    fn authoritative_rank_wins() {
        let stored = StoredRank {
            position: 4,
            total: 28,
        };
        let rank = resolve_class_rank(2.0, 30, Some(stored), &[3.9, 3.8]);
        assert_eq!(rank, ClassRank::Ranked { position: 4, total: 28 });
    }

    #[test]
    fn authoritative_zero_is_ignored() {
        let stored = StoredRank {
            position: 0,
            total: 10,
        };
        let rank = resolve_class_rank(3.0, 10, Some(stored), &[]);
        assert_eq!(rank, ClassRank::Estimated { position: 2, total: 10 });
    }

    #[test]
    fn peers_produce_a_real_rank() {
        let peers = [3.9, 3.2, 3.2, 2.5];
        assert_eq!(
            resolve_class_rank(3.2, 5, None, &peers),
            ClassRank::Ranked { position: 2, total: 5 }
        );
        assert_eq!(rank_among_peers(4.0, &peers), 1);
        assert_eq!(rank_among_peers(1.0, &peers), 5);
    }

    #[test]
    fn partial_peer_list_is_only_an_estimate() {
        let rank = resolve_class_rank(2.0, 30, None, &[1.0]);
        assert_eq!(rank, ClassRank::Estimated { position: 5, total: 30 });

        let missing_one = [3.9, 3.1, 2.4];
        assert!(matches!(
            resolve_class_rank(3.0, 5, None, &missing_one),
            ClassRank::Estimated { .. }
        ));
    }

    #[test]
    fn placeholder_is_marked_as_estimate() {
        assert_eq!(
            resolve_class_rank(3.0, 40, None, &[]),
            ClassRank::Estimated { position: 6, total: 40 }
        );
        assert_eq!(placeholder_rank(1), Some(1));
        assert_eq!(placeholder_rank(20), Some(3));
    }

    #[test]
    fn total_never_below_position() {
        let rank = resolve_class_rank(1.0, 2, None, &[3.0, 3.5, 3.9]);
        assert_eq!(rank, ClassRank::Ranked { position: 4, total: 4 });
    }
}
