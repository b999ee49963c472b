//! Least-loaded node selection.
//!
//! Evaluates candidate nodes for a partition using:
//! - **Eligibility**: alive, and not already serving the partition
//! - **Load**: primary count or total replica count, per the metric
//! - **Tie-break**: uniform random draw among the minimal-load candidates

use rand::{Rng, RngCore};

use tessera_topology::{NodeAddr, NodeState, PartitionConfig};

/// How a node's load is measured when ranking candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMetric {
    /// Count only partitions the node serves as primary.
    Primaries,
    /// Count every partition the node serves in any role.
    Replicas,
}

/// Pick the least-loaded alive node that does not already serve `pc`.
///
/// Candidates are enumerated in `(load, address)` order; the address
/// component only makes the enumeration stable, it is never the selection
/// criterion. One of the nodes tied at the minimum load is then drawn
/// uniformly from `rng`, spreading placement across equivalent candidates
/// over repeated calls. A source that always yields zero degenerates to
/// the lexicographically smallest tied address, which is what
/// deterministic tests rely on.
///
/// Returns `None` when every node is dead or already a member of the
/// partition; callers skip the partition on this pass rather than treating
/// that as an error.
pub fn pick_least_loaded(
    nodes: &[NodeState],
    pc: &PartitionConfig,
    metric: LoadMetric,
    rng: &mut dyn RngCore,
) -> Option<NodeAddr> {
    let mut candidates: Vec<(&str, u32)> = nodes
        .iter()
        .filter(|node| node.alive && !pc.is_member(&node.address))
        .map(|node| {
            let load = match metric {
                LoadMetric::Primaries => node.primary_count,
                LoadMetric::Replicas => node.replica_count,
            };
            (node.address.as_str(), load)
        })
        .collect();

    if candidates.is_empty() {
        return None;
    }

    candidates.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    let min_load = candidates[0].1;
    let tied = candidates.iter().take_while(|c| c.1 == min_load).count();
    let pick = rng.gen_range(0..tied);
    Some(candidates[pick].0.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use tessera_topology::PartitionId;

    fn make_node(address: &str, alive: bool, primaries: u32, replicas: u32) -> NodeState {
        NodeState {
            address: address.to_string(),
            alive,
            primary_count: primaries,
            replica_count: replicas,
        }
    }

    fn make_config(primary: Option<&str>, secondaries: &[&str]) -> PartitionConfig {
        PartitionConfig {
            pid: PartitionId::new(1, 0),
            ballot: 3,
            primary: primary.map(str::to_string),
            secondaries: secondaries.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Constant-zero source: always lands on the smallest tied address.
    fn zero_rng() -> StepRng {
        StepRng::new(0, 0)
    }

    #[test]
    fn skips_dead_members_and_picks_least_loaded() {
        // A is a secondary, C is the primary, D is dead: only B is eligible.
        let nodes = vec![
            make_node("a:34801", true, 1, 2),
            make_node("b:34801", true, 0, 1),
            make_node("c:34801", true, 1, 1),
            make_node("d:34801", false, 0, 0),
        ];
        let pc = make_config(Some("c:34801"), &["a:34801"]);

        let picked = pick_least_loaded(&nodes, &pc, LoadMetric::Replicas, &mut zero_rng());
        assert_eq!(picked.as_deref(), Some("b:34801"));
    }

    #[test]
    fn never_returns_a_current_member() {
        let nodes = vec![
            make_node("a:34801", true, 0, 0),
            make_node("b:34801", true, 0, 0),
            make_node("c:34801", true, 5, 9),
        ];
        let pc = make_config(Some("a:34801"), &["b:34801"]);

        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = pick_least_loaded(&nodes, &pc, LoadMetric::Replicas, &mut rng);
            assert_eq!(
                picked.as_deref(),
                Some("c:34801"),
                "members must never be selected even at higher load"
            );
        }
    }

    #[test]
    fn returns_none_iff_no_eligible_node() {
        let nodes = vec![
            make_node("a:34801", true, 0, 1),
            make_node("b:34801", true, 1, 1),
            make_node("c:34801", false, 0, 0),
        ];
        // a is primary, b is a secondary, c is dead.
        let pc = make_config(Some("a:34801"), &["b:34801"]);
        assert!(pick_least_loaded(&nodes, &pc, LoadMetric::Replicas, &mut zero_rng()).is_none());

        // Revive c: now exactly one candidate exists.
        let nodes = vec![
            make_node("a:34801", true, 0, 1),
            make_node("b:34801", true, 1, 1),
            make_node("c:34801", true, 0, 0),
        ];
        let picked = pick_least_loaded(&nodes, &pc, LoadMetric::Replicas, &mut zero_rng());
        assert_eq!(picked.as_deref(), Some("c:34801"));
    }

    #[test]
    fn empty_node_table_returns_none() {
        let pc = make_config(None, &[]);
        assert!(pick_least_loaded(&[], &pc, LoadMetric::Primaries, &mut zero_rng()).is_none());
    }

    #[test]
    fn metric_switches_between_primary_and_replica_load() {
        // x has no primaries but many replicas; y the opposite.
        let nodes = vec![
            make_node("x:34801", true, 0, 5),
            make_node("y:34801", true, 2, 2),
        ];
        let pc = make_config(None, &[]);

        let by_primaries = pick_least_loaded(&nodes, &pc, LoadMetric::Primaries, &mut zero_rng());
        assert_eq!(by_primaries.as_deref(), Some("x:34801"));

        let by_replicas = pick_least_loaded(&nodes, &pc, LoadMetric::Replicas, &mut zero_rng());
        assert_eq!(by_replicas.as_deref(), Some("y:34801"));
    }

    #[test]
    fn zero_source_always_picks_smallest_tied_address() {
        let nodes = vec![
            make_node("m:34801", true, 0, 0),
            make_node("e:34801", true, 0, 0),
            make_node("t:34801", true, 0, 0),
        ];
        let pc = make_config(None, &[]);

        for _ in 0..32 {
            let picked = pick_least_loaded(&nodes, &pc, LoadMetric::Replicas, &mut zero_rng());
            assert_eq!(picked.as_deref(), Some("e:34801"));
        }
    }

    #[test]
    fn tied_candidates_are_picked_roughly_uniformly() {
        let nodes = vec![
            make_node("a:34801", true, 0, 0),
            make_node("b:34801", true, 0, 0),
        ];
        let pc = make_config(None, &[]);

        let mut rng = StdRng::seed_from_u64(0xdecaf);
        let mut counts: HashMap<String, u32> = HashMap::new();
        for _ in 0..10_000 {
            let picked = pick_least_loaded(&nodes, &pc, LoadMetric::Replicas, &mut rng).unwrap();
            *counts.entry(picked).or_default() += 1;
        }

        // Two equally loaded candidates: each should land within ±5% of half.
        for addr in ["a:34801", "b:34801"] {
            let count = counts.get(addr).copied().unwrap_or(0);
            assert!(
                (4_500..=5_500).contains(&count),
                "{addr} selected {count} times out of 10000"
            );
        }
    }

    #[test]
    fn higher_loaded_node_never_wins_the_draw() {
        let nodes = vec![
            make_node("a:34801", true, 0, 3),
            make_node("b:34801", true, 0, 1),
            make_node("c:34801", true, 0, 1),
        ];
        let pc = make_config(None, &[]);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..256 {
            let picked = pick_least_loaded(&nodes, &pc, LoadMetric::Replicas, &mut rng).unwrap();
            assert_ne!(picked, "a:34801", "draw must stay within the minimal tier");
        }
    }
}
