// src/cluster.rs
// Anchor-absorption clustering over record indices. Deliberately NOT a
// connected-component closure: a cluster is the anchor plus everything that
// matches the anchor directly, in input order.

use crate::models::ActionRecord;

/// Disjoint clusters of record indices. Records are processed in input
/// order; each unvisited record anchors a new cluster and absorbs every
/// later unvisited record the predicate accepts against that anchor.
/// Absorbed indices are marked in an owned visited-bitset and never
/// re-examined, which keeps membership deterministic and first-seen-wins.
///
/// Every returned cluster is non-empty and every input index appears in
/// exactly one cluster.
pub fn build_clusters<F>(records: &[ActionRecord], mut is_match: F) -> Vec<Vec<usize>>
where
    F: FnMut(&ActionRecord, &ActionRecord) -> bool,
{
    let mut clusters = Vec::new();
    let mut visited = vec![false; records.len()];

    for anchor in 0..records.len() {
        if visited[anchor] {
            continue;
        }
        visited[anchor] = true;
        let mut members = vec![anchor];

        for candidate in anchor + 1..records.len() {
            if visited[candidate] {
                continue;
            }
            if is_match(&records[anchor], &records[candidate]) {
                visited[candidate] = true;
                members.push(candidate);
            }
        }

        clusters.push(members);
    }

    clusters
}
