use indexmap::IndexMap;
use tracing::debug;

use crate::types::CategoryLabel;

/// Allocate integer quotas across categories from population counts.
///
/// Two regimes:
/// - Floors affordable (`min_floor * n <= total_quota`): every category gets
///   `min_floor + floor(remaining * population / total_population)` and the
///   rounding residual is added in full to the category with the largest
///   computed quota (ties resolved first-seen in map order).
/// - Floors unaffordable: the budget is split as evenly as possible,
///   `total_quota / n` each, with `total_quota % n` categories receiving one
///   extra row in map order. Population proportions are ignored in this
///   regime; see the crate docs for the known policy discontinuity.
///
/// Postcondition: returned quotas sum to `total_quota` exactly. Never panics.
pub fn allocate_with_floor(
    counts: &IndexMap<CategoryLabel, usize>,
    total_quota: usize,
    min_floor: usize,
) -> IndexMap<CategoryLabel, usize> {
    let n_categories = counts.len();
    if n_categories == 0 {
        return IndexMap::new();
    }

    let min_total = min_floor.saturating_mul(n_categories);
    if min_total > total_quota {
        debug!(
            total_quota,
            min_floor, n_categories, "floors unaffordable; falling back to even split"
        );
        return allocate_even_split(counts, total_quota);
    }

    let remaining = total_quota - min_total;
    let total_population: usize = counts.values().sum();

    let mut quotas: IndexMap<CategoryLabel, usize> = counts
        .iter()
        .map(|(category, population)| {
            let proportional = if total_population == 0 {
                0
            } else {
                // u128 keeps the product exact for any realistic table size.
                ((remaining as u128 * *population as u128) / total_population as u128) as usize
            };
            (category.clone(), min_floor + proportional)
        })
        .collect();

    // Per-category floors guarantee the computed sum never exceeds the budget,
    // so the residual is non-negative.
    let assigned: usize = quotas.values().sum();
    let residual = total_quota - assigned;
    if residual > 0 {
        let largest_idx = first_seen_largest(&quotas);
        if let Some((category, quota)) = quotas.get_index_mut(largest_idx) {
            debug!(residual, category = %category, "assigning rounding residual");
            *quota += residual;
        }
    }

    quotas
}

/// Even split used when floors are unaffordable: `total / n` each, remainder
/// as `+1` to the first `total % n` categories in map order.
fn allocate_even_split(
    counts: &IndexMap<CategoryLabel, usize>,
    total_quota: usize,
) -> IndexMap<CategoryLabel, usize> {
    let n_categories = counts.len();
    let base = total_quota / n_categories;
    let remainder = total_quota % n_categories;
    counts
        .keys()
        .enumerate()
        .map(|(idx, category)| (category.clone(), base + usize::from(idx < remainder)))
        .collect()
}

/// Index of the largest quota, keeping the first-seen entry on ties.
fn first_seen_largest(quotas: &IndexMap<CategoryLabel, usize>) -> usize {
    let mut largest_idx = 0;
    let mut largest_quota = 0;
    for (idx, quota) in quotas.values().enumerate() {
        if idx == 0 || *quota > largest_quota {
            largest_idx = idx;
            largest_quota = *quota;
        }
    }
    largest_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(&str, usize)]) -> IndexMap<CategoryLabel, usize> {
        entries
            .iter()
            .map(|(label, count)| (label.to_string(), *count))
            .collect()
    }

    #[test]
    fn unaffordable_floors_fall_back_to_even_split() {
        let quotas = allocate_with_floor(&counts(&[("X", 700), ("Y", 300)]), 1_000, 600);
        assert_eq!(quotas["X"], 500);
        assert_eq!(quotas["Y"], 500);
    }

    #[test]
    fn even_split_remainder_goes_to_earliest_categories() {
        let quotas = allocate_with_floor(&counts(&[("A", 10), ("B", 10), ("C", 10)]), 10, 100);
        assert_eq!(quotas["A"], 4);
        assert_eq!(quotas["B"], 3);
        assert_eq!(quotas["C"], 3);
    }

    #[test]
    fn proportional_allocation_respects_floors() {
        let quotas = allocate_with_floor(&counts(&[("X", 9_000), ("Y", 1_000)]), 2_000, 200);
        assert_eq!(quotas["X"], 1_640);
        assert_eq!(quotas["Y"], 360);
        assert_eq!(quotas.values().sum::<usize>(), 2_000);
    }

    #[test]
    fn residual_goes_to_largest_quota_first_seen_on_ties() {
        // Equal populations: every category computes the same quota, so the
        // rounding residual must land on the first-seen category.
        let quotas = allocate_with_floor(&counts(&[("A", 100), ("B", 100), ("C", 100)]), 10, 0);
        assert_eq!(quotas["A"], 4);
        assert_eq!(quotas["B"], 3);
        assert_eq!(quotas["C"], 3);
    }

    #[test]
    fn quotas_always_sum_to_the_budget() {
        let tables = [
            counts(&[("a", 1), ("b", 2), ("c", 3)]),
            counts(&[("a", 0), ("b", 0)]),
            counts(&[("only", 123_456)]),
            counts(&[("x", 7), ("y", 13), ("z", 29), ("w", 1)]),
        ];
        for table in &tables {
            for total_quota in [0, 1, 7, 100, 999, 20_000] {
                for min_floor in [0, 1, 50, 600] {
                    let quotas = allocate_with_floor(table, total_quota, min_floor);
                    assert_eq!(
                        quotas.values().sum::<usize>(),
                        total_quota,
                        "sum mismatch for total={total_quota} floor={min_floor}"
                    );
                }
            }
        }
    }

    #[test]
    fn floors_are_respected_when_affordable() {
        let table = counts(&[("x", 10), ("y", 90), ("z", 900)]);
        let quotas = allocate_with_floor(&table, 1_000, 100);
        assert!(quotas.values().all(|quota| *quota >= 100));
        assert_eq!(quotas.values().sum::<usize>(), 1_000);
    }

    #[test]
    fn empty_counts_return_empty_quotas() {
        let quotas = allocate_with_floor(&IndexMap::new(), 1_000, 10);
        assert!(quotas.is_empty());
    }

    #[test]
    fn zero_population_table_still_sums_exactly() {
        let quotas = allocate_with_floor(&counts(&[("a", 0), ("b", 0)]), 10, 0);
        assert_eq!(quotas.values().sum::<usize>(), 10);
    }
}
