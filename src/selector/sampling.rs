use rand::Rng;

use crate::catalog::CaseRecord;
use crate::sanitize::sampling_weight;

/// Draws one case and removes it from `pool`. Weighted by prevalence when
/// `weighted`; falls back to uniform when every weight is zero.
pub fn draw<'a, R: Rng>(
    pool: &mut Vec<&'a CaseRecord>,
    weighted: bool,
    rng: &mut R,
) -> Option<&'a CaseRecord> {
    let idx = pick_index(pool, weighted, rng)?;
    Some(pool.remove(idx))
}

pub fn pick_index<R: Rng>(pool: &[&CaseRecord], weighted: bool, rng: &mut R) -> Option<usize> {
    if pool.is_empty() {
        return None;
    }
    if weighted {
        let weights: Vec<f64> = pool
            .iter()
            .map(|c| sampling_weight(c.prevalence_weight))
            .collect();
        let total: f64 = weights.iter().sum();
        if total > 0.0 && total.is_finite() {
            let mut target = rng.random::<f64>() * total;
            for (idx, weight) in weights.iter().enumerate() {
                if *weight <= 0.0 {
                    continue;
                }
                if target < *weight {
                    return Some(idx);
                }
                target -= weight;
            }
            // Rounding left `target` past the end; take the last eligible case.
            return weights.iter().rposition(|w| *w > 0.0);
        }
    }
    Some(rng.random_range(0..pool.len()))
}

/// Draws up to `n` cases without replacement.
pub fn sample<'a, R: Rng>(
    mut pool: Vec<&'a CaseRecord>,
    n: usize,
    weighted: bool,
    rng: &mut R,
) -> Vec<&'a CaseRecord> {
    let mut picked = Vec::with_capacity(n.min(pool.len()));
    while picked.len() < n {
        match draw(&mut pool, weighted, rng) {
            Some(case) => picked.push(case),
            None => break,
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AgeGroup, Complexity};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn case(id: &str, weight: f64) -> CaseRecord {
        CaseRecord {
            case_id: id.to_string(),
            category: "A".to_string(),
            age_group: AgeGroup::Adult,
            complexity: Complexity::Basic,
            prevalence_weight: weight,
            diagnosis: "X".to_string(),
            specifiers: Vec::new(),
            keywords: Vec::new(),
            narrative: None,
        }
    }

    #[test]
    fn test_sample_without_replacement() {
        let cases: Vec<CaseRecord> = (0..10).map(|i| case(&format!("c{i}"), 1.0)).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let picked = sample(cases.iter().collect(), 10, false, &mut rng);
        let mut ids: Vec<_> = picked.iter().map(|c| c.case_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_zero_weight_never_drawn_when_others_positive() {
        let cases = vec![case("zero", 0.0), case("nan", f64::NAN), case("one", 1.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            let idx = pick_index(&cases.iter().collect::<Vec<_>>(), true, &mut rng).unwrap();
            assert_eq!(idx, 2);
        }
    }

    #[test]
    fn test_all_zero_weights_fall_back_to_uniform() {
        let cases = vec![case("a", 0.0), case("b", -1.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let picked = sample(cases.iter().collect(), 2, true, &mut rng);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_weighting_biases_draws() {
        let cases = vec![case("rare", 1.0), case("common", 9.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let pool: Vec<_> = cases.iter().collect();
        let common = (0..1000)
            .filter(|_| pick_index(&pool, true, &mut rng) == Some(1))
            .count();
        assert!(common > 800, "common drawn {common} times");
    }

    #[test]
    fn test_same_seed_same_draws() {
        let cases: Vec<CaseRecord> = (0..20).map(|i| case(&format!("c{i}"), 1.0 + i as f64)).collect();
        let a = sample(cases.iter().collect(), 5, true, &mut ChaCha8Rng::seed_from_u64(42));
        let b = sample(cases.iter().collect(), 5, true, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
