//! Chain extraction from a solved problem.
//!
//! Every vertex takes the mention id of its best label as its entity group.
//! Exact ties between labels are broken by textual proximity, preferring the
//! closest mention to the left.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::graph::MentionGraph;
use crate::mention::{Mention, MentionId, MentionStore, ResolvedMention};

/// Coreference chains of one document, keyed by group id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chains {
    buckets: BTreeMap<MentionId, Vec<MentionId>>,
}

impl Chains {
    /// Creates an empty chain set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mention to the chain of `group`.
    pub fn push(&mut self, group: MentionId, mention: MentionId) {
        self.buckets.entry(group).or_default().push(mention);
    }

    /// Members of a chain, in solving order.
    #[must_use]
    pub fn members(&self, group: MentionId) -> Option<&[MentionId]> {
        self.buckets.get(&group).map(Vec::as_slice)
    }

    /// Number of members of a chain (zero if absent).
    #[must_use]
    pub fn size(&self, group: MentionId) -> usize {
        self.buckets.get(&group).map_or(0, Vec::len)
    }

    /// Number of chains, singletons included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if there are no chains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Iterate over `(group, members)` in ascending group order.
    pub fn iter(&self) -> impl Iterator<Item = (MentionId, &[MentionId])> {
        self.buckets.iter().map(|(group, members)| (*group, members.as_slice()))
    }

    /// Chains with more than one member.
    pub fn non_singletons(&self) -> impl Iterator<Item = (MentionId, &[MentionId])> {
        self.iter().filter(|(_, members)| members.len() > 1)
    }
}

/// Pick one label among tied best labels of `vertex`.
///
/// `candidates` pairs each tied label with the mention at that label's
/// vertex. Left distance is `begin(v) - end(b)`, right distance is
/// `begin(b) - end(v)`; the vertex itself sits at left distance zero. The
/// closest left candidate (non-negative distance) wins unless a right
/// candidate (positive distance) is strictly closer. If neither side
/// qualifies, the lowest label is returned.
#[must_use]
pub fn break_tie(vertex: usize, mention: &Mention, candidates: &[(usize, &Mention)]) -> Option<usize> {
    let mut left: Option<(i64, usize)> = None;
    let mut right: Option<(i64, usize)> = None;

    for &(label, other) in candidates {
        let (dist_left, dist_right) = if label == vertex {
            (0, 0)
        } else {
            (
                mention.begin_offset() - other.end_offset(),
                other.begin_offset() - mention.end_offset(),
            )
        };

        if dist_left >= 0 && left.map_or(true, |(best, _)| dist_left <= best) {
            left = Some((dist_left, label));
        } else if dist_right > 0 && right.map_or(true, |(best, _)| dist_right < best) {
            right = Some((dist_right, label));
        }
    }

    match (left, right) {
        (Some((dl, l)), Some((dr, r))) => Some(if dr < dl { r } else { l }),
        (Some((_, l)), None) => Some(l),
        (None, Some((_, r))) => Some(r),
        (None, None) => candidates.first().map(|(label, _)| *label),
    }
}

/// Assign a group to every mention of a solved graph and collect chains.
pub(crate) fn extract_chains(store: &mut MentionStore, graph: &MentionGraph) -> Chains {
    let mut chains = Chains::new();

    for vertex in 0..graph.problem.num_vertices() {
        let best = graph.problem.best_labels(vertex);
        let label = if best.len() == 1 {
            best[0]
        } else {
            let mention = &store.as_slice()[graph.order[vertex]];
            let candidates: Vec<(usize, &Mention)> = best
                .iter()
                .map(|&label| (label, &store.as_slice()[graph.order[label]]))
                .collect();
            let chosen = break_tie(vertex, mention, &candidates).unwrap_or(vertex);
            trace!(vertex, tied = ?best, chosen, "broke label tie");
            chosen
        };

        let group = graph.ids[label];
        store.assign_group(graph.order[vertex], group);
        chains.push(group, graph.ids[vertex]);
    }
    chains
}

/// Trivial chains for documents with fewer than two mentions.
pub(crate) fn singleton_chains(store: &mut MentionStore) -> Chains {
    let mut chains = Chains::new();
    for pos in 0..store.len() {
        let id = store.as_slice()[pos].id;
        store.assign_group(pos, id);
        chains.push(id, id);
    }
    chains
}

/// Mentions to report, in detection order.
///
/// Singletons are reported only when `provide_singletons` is set.
#[must_use]
pub(crate) fn emit_mentions(store: &MentionStore, chains: &Chains, provide_singletons: bool) -> Vec<ResolvedMention> {
    store
        .iter()
        .filter_map(|mention| {
            let group = mention.group?;
            (provide_singletons || chains.size(group) > 1).then(|| ResolvedMention::from_mention(mention, group))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LabelRef, LabelingProblem};
    use crate::mention::MentionKind;

    fn at(id: u32, sentence: u32, begin: u32, end: u32) -> Mention {
        Mention::new(MentionId::new(id), MentionKind::NounPhrase, sentence, begin, end)
    }

    #[test]
    fn left_wins_equal_distance() {
        let v = at(2, 0, 7, 7);
        let b1 = at(0, 0, 4, 5);
        let b2 = at(1, 0, 9, 10);
        assert_eq!(break_tie(2, &v, &[(0, &b1), (1, &b2)]), Some(0));
    }

    #[test]
    fn strictly_closer_right_wins() {
        let v = at(2, 0, 7, 7);
        let b1 = at(0, 0, 1, 2);
        let b2 = at(1, 0, 9, 9);
        assert_eq!(break_tie(2, &v, &[(0, &b1), (1, &b2)]), Some(1));
    }

    #[test]
    fn self_label_is_at_distance_zero() {
        let v = at(2, 0, 7, 7);
        let b1 = at(0, 0, 4, 6);
        assert_eq!(break_tie(2, &v, &[(0, &b1), (2, &v)]), Some(2));
    }

    #[test]
    fn sentences_dominate_word_positions() {
        let v = at(2, 1, 0, 0);
        let far_left = at(0, 0, 0, 1);
        let near_left = at(1, 0, 30, 31);
        assert_eq!(break_tie(2, &v, &[(0, &far_left), (1, &near_left)]), Some(1));
    }

    #[test]
    fn overlapping_candidates_fall_back_to_lowest_label() {
        let v = at(2, 0, 3, 8);
        let a = at(0, 0, 4, 5);
        let b = at(1, 0, 2, 9);
        assert_eq!(break_tie(2, &v, &[(0, &a), (1, &b)]), Some(0));
        assert_eq!(break_tie(2, &v, &[]), None);
    }

    #[test]
    fn extraction_uses_mention_ids_and_tie_break() {
        // Detection order: [np 10 @0:0, pronoun 11 @0:9, np 12 @0:5]
        // Solving order:   [10, 12, 11]
        let mut store = MentionStore::new(vec![
            Mention::new(MentionId::new(10), MentionKind::NounPhrase, 0, 0, 0),
            Mention::new(MentionId::new(11), MentionKind::Pronoun, 0, 9, 9),
            Mention::new(MentionId::new(12), MentionKind::NounPhrase, 0, 5, 5),
        ])
        .unwrap();

        let mut problem = LabelingProblem::new();
        problem.add_vertex(vec![1.0], 0).unwrap();
        problem.add_vertex(vec![0.9, 0.1], 1).unwrap();
        problem.add_vertex(vec![0.4, 0.4, 0.2], 2).unwrap();
        problem.add_constraint(1, 0, vec![LabelRef::new(0, 0)], 1.0).unwrap();

        let graph = MentionGraph {
            problem,
            order: vec![0, 2, 1],
            ids: vec![MentionId::new(10), MentionId::new(12), MentionId::new(11)],
            stats: crate::graph::BuildStats::default(),
        };

        let chains = extract_chains(&mut store, &graph);
        let groups: Vec<_> = store.iter().map(|m| m.group.unwrap().get()).collect();
        // The pronoun ties between 10 (distance 9) and 12 (distance 4); 12 is closer.
        assert_eq!(groups, vec![10, 12, 10]);
        assert_eq!(
            chains.members(MentionId::new(10)).unwrap(),
            &[MentionId::new(10), MentionId::new(12)]
        );
        assert_eq!(chains.members(MentionId::new(12)).unwrap(), &[MentionId::new(11)]);
        assert_eq!(chains.len(), 2);
    }

    #[test]
    fn emission_filters_singletons() {
        let mut store = MentionStore::new(vec![at(0, 0, 0, 0), at(1, 0, 2, 2), at(2, 0, 4, 4)]).unwrap();
        let mut chains = Chains::new();
        for (pos, group) in [(0_usize, 0_u32), (1, 0), (2, 2)] {
            let group = MentionId::new(group);
            store.assign_group(pos, group);
            chains.push(group, store.as_slice()[pos].id);
        }

        let emitted = emit_mentions(&store, &chains, false);
        let ids: Vec<u32> = emitted.iter().map(|m| m.id.get()).collect();
        assert_eq!(ids, vec![0, 1]);

        let all = emit_mentions(&store, &chains, true);
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].group, MentionId::new(2));
        assert_eq!(chains.non_singletons().count(), 1);
    }

    #[test]
    fn single_mention_groups_with_itself() {
        let mut store = MentionStore::new(vec![at(5, 0, 0, 0)]).unwrap();
        let chains = singleton_chains(&mut store);
        assert_eq!(store.as_slice()[0].group, Some(MentionId::new(5)));
        assert_eq!(chains.size(MentionId::new(5)), 1);
        assert!(emit_mentions(&store, &chains, false).is_empty());
        assert_eq!(emit_mentions(&store, &chains, true).len(), 1);
    }
}
