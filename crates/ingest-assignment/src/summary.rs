use std::collections::{HashMap, HashSet};

use crate::solver::Assignment;

pub fn diff_assignments(prev: &Assignment, new: &Assignment) -> (Assignment, Assignment) {
    let accounts: HashSet<&String> = prev.keys().chain(new.keys()).collect();
    let mut adds = Assignment::new();
    let mut removes = Assignment::new();
    for a in accounts {
        let p = prev.get(a).cloned().unwrap_or_default();
        let n = new.get(a).cloned().unwrap_or_default();
        adds.insert(a.clone(), n.difference(&p).copied().collect());
        removes.insert(a.clone(), p.difference(&n).copied().collect());
    }
    (adds, removes)
}

pub fn compute_loads(assignment: &Assignment, weights: &HashMap<i64, f64>) -> HashMap<String, f64> {
    assignment
        .iter()
        .map(|(a, chans)| {
            let load = chans.iter().map(|c| weights.get(c).copied().unwrap_or(1.0)).sum();
            (a.clone(), load)
        })
        .collect()
}

/// Human-readable multi-line redistribution summary, grounded on the source
/// system's `[Assign]`-prefixed log format.
pub fn format_assignment_summary(
    prev: &Assignment,
    new: &Assignment,
    weights: &HashMap<i64, f64>,
    capacities: &HashMap<String, f64>,
    target_chats: &[i64],
) -> String {
    let target_set: HashSet<i64> = target_chats.iter().copied().collect();
    let prev_union: HashSet<i64> = prev.values().flatten().copied().collect();
    let new_union: HashSet<i64> = new.values().flatten().copied().collect();

    let (adds, removes) = diff_assignments(prev, new);
    let added_total: usize = adds.values().map(|v| v.len()).sum();
    let removed_total: usize = removes.values().map(|v| v.len()).sum();

    let prev_loads = compute_loads(prev, weights);
    let new_loads = compute_loads(new, weights);

    let summarize = |loads: &HashMap<String, f64>| -> (f64, f64, f64) {
        if loads.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        let values: Vec<f64> = loads.values().copied().collect();
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        (min, max, avg)
    };

    let (min_prev, max_prev, avg_prev) = summarize(&prev_loads);
    let (min_new, max_new, avg_new) = summarize(&new_loads);
    let imbalance_prev = max_prev - min_prev;
    let imbalance_new = max_new - min_new;

    let covered_prev = prev_union.intersection(&target_set).count();
    let covered_new = new_union.intersection(&target_set).count();
    let coverage_total = target_set.len();
    let pct = |n: usize| if coverage_total > 0 { n as f64 / coverage_total as f64 * 100.0 } else { 0.0 };
    let coverage_prev_pct = pct(covered_prev);
    let coverage_new_pct = pct(covered_new);

    let mut lines = Vec::new();
    lines.push("[Assign] Realtime redistribution summary".to_string());
    lines.push(format!(
        "- coverage: {covered_prev}->{covered_new} of {coverage_total} ({coverage_prev_pct:.1}% -> {coverage_new_pct:.1}%, Δ {:+.1} pp)",
        coverage_new_pct - coverage_prev_pct
    ));
    lines.push(format!(
        "- changes: +{added_total} assigned, -{removed_total} removed (net {:+})",
        added_total as i64 - removed_total as i64
    ));
    lines.push(format!(
        "- load imbalance: {imbalance_prev:.2} -> {imbalance_new:.2} (avg {avg_prev:.2} -> {avg_new:.2})"
    ));

    lines.push("- per-account:".to_string());
    let mut sorted_keys: Vec<&String> = new.keys().collect();
    sorted_keys.sort();
    for a in &sorted_keys {
        let cap = capacities.get(*a).copied().unwrap_or(f64::INFINITY);
        let count = new.get(*a).map(|s| s.len()).unwrap_or(0);
        let load = new_loads.get(*a).copied().unwrap_or(0.0);
        let add_n = adds.get(*a).map(|s| s.len()).unwrap_or(0);
        let rem_n = removes.get(*a).map(|s| s.len()).unwrap_or(0);
        let cap_suffix = if cap.is_finite() {
            format!("/{cap:.2} ({:.0}%)", if cap > 0.0 { load / cap * 100.0 } else { 0.0 })
        } else {
            String::new()
        };
        lines.push(format!(
            "  • {a}: channels={count}, load={load:.2}{cap_suffix}, Δ +{add_n}/-{rem_n}"
        ));
    }

    lines.join("\n")
}
