use rand::Rng;
use rand::rngs::StdRng;

/// How the next source pool is chosen while interleaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStrategy {
    /// Pick a pool index uniformly; redraw when the pool is already empty.
    ///
    /// This keeps the historical interleaving: small pools are drawn
    /// disproportionately often near the end once the large pools dominate the
    /// remaining mass, because the draw is over pool index rather than
    /// remaining size.
    UniformPoolIndex,
    /// Pick a pool with probability proportional to its remaining size, giving
    /// an unbiased interleaving at every prefix.
    WeightedByRemaining,
}

/// A shuffled training set with one class label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSet {
    /// Feature rows in draw order.
    pub rows: Vec<Vec<f32>>,
    /// Source-pool index for each row, positionally aligned with `rows`.
    pub labels: Vec<usize>,
}

/// Interleave per-class pools into one shuffled training set.
///
/// Pools are taken by value and drained completely: every row ends up in the
/// output exactly once, labeled with the index of the pool it came from. Rows
/// are removed from a pool's end. Pool lengths may differ; empty pools are
/// allowed. Output length equals the total row count across pools.
pub fn randomize_and_label(
    mut pools: Vec<Vec<Vec<f32>>>,
    strategy: DrawStrategy,
    rng: &mut StdRng,
) -> LabeledSet {
    let mut remaining: usize = pools.iter().map(|pool| pool.len()).sum();
    let mut rows = Vec::with_capacity(remaining);
    let mut labels = Vec::with_capacity(remaining);

    while remaining > 0 {
        let idx = match strategy {
            DrawStrategy::UniformPoolIndex => rng.random_range(0..pools.len()),
            DrawStrategy::WeightedByRemaining => weighted_pool_index(&pools, remaining, rng),
        };
        if let Some(row) = pools[idx].pop() {
            rows.push(row);
            labels.push(idx);
            remaining -= 1;
        }
    }

    LabeledSet { rows, labels }
}

/// Draw a pool index with probability proportional to its remaining length.
fn weighted_pool_index(pools: &[Vec<Vec<f32>>], remaining: usize, rng: &mut StdRng) -> usize {
    let mut ticket = rng.random_range(0..remaining);
    for (idx, pool) in pools.iter().enumerate() {
        if ticket < pool.len() {
            return idx;
        }
        ticket -= pool.len();
    }
    // remaining is the sum of pool lengths, so the loop always returns.
    unreachable!("ticket drawn beyond total remaining rows")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn sorted(mut rows: Vec<Vec<f32>>) -> Vec<Vec<f32>> {
        rows.sort_by(|a, b| a.partial_cmp(b).unwrap());
        rows
    }

    #[test]
    fn drains_every_pool_exactly_once() {
        for strategy in [DrawStrategy::UniformPoolIndex, DrawStrategy::WeightedByRemaining] {
            let pools = vec![
                vec![vec![1.0, 1.0], vec![2.0, 2.0]],
                vec![vec![9.0, 9.0]],
            ];
            let set = randomize_and_label(pools.clone(), strategy, &mut rng());

            assert_eq!(set.rows.len(), 3);
            assert_eq!(set.labels.len(), 3);
            assert_eq!(set.labels.iter().filter(|&&l| l == 0).count(), 2);
            assert_eq!(set.labels.iter().filter(|&&l| l == 1).count(), 1);
            let expected: Vec<Vec<f32>> = pools.into_iter().flatten().collect();
            assert_eq!(sorted(set.rows), sorted(expected));
        }
    }

    #[test]
    fn labels_point_at_originating_pool() {
        let pools = vec![
            vec![vec![0.0], vec![0.0], vec![0.0]],
            vec![vec![1.0], vec![1.0]],
            vec![vec![2.0]],
        ];
        let set = randomize_and_label(pools, DrawStrategy::UniformPoolIndex, &mut rng());
        for (row, &label) in set.rows.iter().zip(&set.labels) {
            assert_eq!(row[0] as usize, label);
        }
    }

    #[test]
    fn empty_pools_are_skipped_without_stalling() {
        let pools = vec![Vec::new(), vec![vec![5.0]], Vec::new()];
        let set = randomize_and_label(pools, DrawStrategy::UniformPoolIndex, &mut rng());
        assert_eq!(set.rows, vec![vec![5.0]]);
        assert_eq!(set.labels, vec![1]);
    }

    #[test]
    fn no_pools_yields_empty_set() {
        let set = randomize_and_label(Vec::new(), DrawStrategy::WeightedByRemaining, &mut rng());
        assert!(set.rows.is_empty());
        assert!(set.labels.is_empty());
    }

    #[test]
    fn seeded_draws_are_deterministic() {
        let pools = vec![
            (0..20).map(|i| vec![i as f32]).collect::<Vec<_>>(),
            (0..10).map(|i| vec![100.0 + i as f32]).collect::<Vec<_>>(),
        ];
        let a = randomize_and_label(pools.clone(), DrawStrategy::UniformPoolIndex, &mut rng());
        let b = randomize_and_label(pools, DrawStrategy::UniformPoolIndex, &mut rng());
        assert_eq!(a, b);
    }
}
