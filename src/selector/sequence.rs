use crate::catalog::CaseRecord;

/// Complexity rank to aim for once the streak has reached `projected`.
pub fn target_rank(projected: u32) -> u8 {
    match projected {
        10.. => 3,
        5..=9 => 2,
        3..=4 => 1,
        _ => 0,
    }
}

/// Easy slots served first after a streak reset.
pub fn recovery_slots(streak: u32) -> usize {
    match streak {
        0 => 2,
        1 => 1,
        _ => 0,
    }
}

/// Rank the quiz slot at `slot` should draw. Recovery slots take the easiest
/// rank still on offer; later slots follow the streak the user would have if
/// every earlier answer were correct.
pub fn slot_target(streak: u32, slot: usize, candidates: &[&CaseRecord]) -> u8 {
    if slot < recovery_slots(streak) {
        candidates
            .iter()
            .map(|c| c.complexity.rank())
            .min()
            .unwrap_or(0)
    } else {
        let slot = u32::try_from(slot).unwrap_or(u32::MAX);
        target_rank(streak.saturating_add(slot))
    }
}

/// Candidates whose rank is closest to `target`. Exact matches win when any
/// exist, so a pool without the preferred complexity degrades to its nearest
/// neighbour instead of failing.
pub fn nearest_rank<'a>(candidates: &[&'a CaseRecord], target: u8) -> Vec<&'a CaseRecord> {
    let distance = |c: &CaseRecord| c.complexity.rank().abs_diff(target);
    let Some(best) = candidates.iter().map(|c| distance(*c)).min() else {
        return Vec::new();
    };
    candidates
        .iter()
        .copied()
        .filter(|c| distance(*c) == best)
        .collect()
}
