use std::collections::{HashMap, HashSet};

/// identity_id → assigned chat_ids.
pub type Assignment = HashMap<String, HashSet<i64>>;

/// Greedy balanced maximum-coverage solver (C4).
///
/// Chats are processed rarest-eligibility-first, then heaviest-first; each
/// chat goes to the least-loaded eligible identity with capacity headroom,
/// tie-broken by residual flexibility then identity id for determinism
/// (§8 reassign-determinism property).
pub fn assign_balanced(
    chats: &[i64],
    eligible: &HashMap<i64, Vec<String>>,
    weight: &HashMap<i64, f64>,
    identities: &[String],
    capacity: &HashMap<String, f64>,
) -> Assignment {
    let mut load: HashMap<String, f64> = identities.iter().map(|a| (a.clone(), 0.0)).collect();
    let mut assigned: Assignment = identities.iter().map(|a| (a.clone(), HashSet::new())).collect();

    let weight_of = |c: i64| -> f64 { weight.get(&c).copied().unwrap_or(1.0) };
    let eligible_count = |c: i64| -> usize { eligible.get(&c).map(|v| v.len()).unwrap_or(0) };

    let mut pool: Vec<i64> = chats
        .iter()
        .copied()
        .filter(|c| eligible.get(c).map(|v| !v.is_empty()).unwrap_or(false))
        .collect();
    pool.sort_by(|a, b| {
        eligible_count(*a)
            .cmp(&eligible_count(*b))
            .then(weight_of(*b).partial_cmp(&weight_of(*a)).unwrap_or(std::cmp::Ordering::Equal))
    });

    let no_cap = f64::INFINITY;
    for &c in &pool {
        let w = weight_of(c);
        let Some(elig) = eligible.get(&c) else { continue };
        let candidates: Vec<&String> = elig
            .iter()
            .filter(|a| load.get(*a).copied().unwrap_or(0.0) + w <= capacity.get(*a).copied().unwrap_or(no_cap))
            .collect();
        if candidates.is_empty() {
            continue;
        }
        let chosen = candidates
            .into_iter()
            .min_by(|a, b| {
                let la = load.get(*a).copied().unwrap_or(0.0);
                let lb = load.get(*b).copied().unwrap_or(0.0);
                la.partial_cmp(&lb)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| residual_flex(&pool, &assigned, a, eligible).cmp(&residual_flex(&pool, &assigned, b, eligible)))
                    .then_with(|| a.cmp(b))
            })
            .cloned()
            .expect("candidates non-empty");

        assigned.get_mut(&chosen).unwrap().insert(c);
        *load.get_mut(&chosen).unwrap() += w;
    }

    assigned
}

fn residual_flex(
    pool: &[i64],
    assigned: &Assignment,
    identity: &str,
    eligible: &HashMap<i64, Vec<String>>,
) -> usize {
    let taken = assigned.get(identity).cloned().unwrap_or_default();
    pool.iter()
        .filter(|c| !taken.contains(*c) && eligible.get(c).map(|v| v.iter().any(|a| a == identity)).unwrap_or(false))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("id{i}")).collect()
    }

    #[test]
    fn balances_uniform_weights() {
        let identities = ids(3);
        let chats: Vec<i64> = (1..=20).collect();
        let eligible: HashMap<i64, Vec<String>> =
            chats.iter().map(|c| (*c, identities.clone())).collect();
        let weight: HashMap<i64, f64> = chats.iter().map(|c| (*c, 1.0)).collect();
        let capacity: HashMap<String, f64> = identities.iter().map(|a| (a.clone(), f64::INFINITY)).collect();

        let a1 = assign_balanced(&chats, &eligible, &weight, &identities, &capacity);
        let a2 = assign_balanced(&chats, &eligible, &weight, &identities, &capacity);
        for id in &identities {
            assert_eq!(a1[id], a2[id]);
        }
        let counts: Vec<usize> = identities.iter().map(|a| a1[a].len()).collect();
        assert_eq!(*counts.iter().max().unwrap() - counts.iter().min().unwrap() <= 1, true);
    }

    #[test]
    fn respects_capacity() {
        let identities = ids(2);
        let chats = vec![1, 2, 3];
        let eligible: HashMap<i64, Vec<String>> =
            chats.iter().map(|c| (*c, identities.clone())).collect();
        let weight: HashMap<i64, f64> = chats.iter().map(|c| (*c, 1.0)).collect();
        let mut capacity = HashMap::new();
        capacity.insert("id0".to_string(), 1.0);
        capacity.insert("id1".to_string(), 10.0);

        let a = assign_balanced(&chats, &eligible, &weight, &identities, &capacity);
        assert!(a["id0"].len() <= 1);
    }

    #[test]
    fn only_eligible_identities_receive_a_chat() {
        let identities = ids(2);
        let chats = vec![1, 2];
        let mut eligible = HashMap::new();
        eligible.insert(1, vec!["id0".to_string()]);
        eligible.insert(2, vec![]);
        let weight: HashMap<i64, f64> = HashMap::new();
        let capacity: HashMap<String, f64> = identities.iter().map(|a| (a.clone(), f64::INFINITY)).collect();

        let a = assign_balanced(&chats, &eligible, &weight, &identities, &capacity);
        assert!(a["id0"].contains(&1));
        assert!(!a.values().any(|s| s.contains(&2)));
    }
}
