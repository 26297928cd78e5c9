//! Edge selection and pruning.
//!
//! Each vertex looks back at every earlier vertex, asks the weight model
//! for a compatibility, and keeps at most `nprune` of the strongest edges.
//! Surviving edges become backward constraints in the labelling problem.

use tracing::trace;

use crate::error::ValidationError;
use crate::graph::problem::{LabelRef, LabelingProblem};
use crate::mention::MentionId;
use crate::weight::{pair_key, PairWeight};

/// A weighted edge from a vertex to one of its antecedent vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// The later vertex
    pub vertex: usize,
    /// The earlier vertex
    pub antecedent: usize,
    /// Non-zero compatibility weight
    pub weight: f64,
}

/// Non-zero edges of one vertex, with their sign counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateEdges {
    /// Edges in antecedent order
    pub edges: Vec<Edge>,
    /// Number of positive edges
    pub positive: usize,
    /// Number of negative edges
    pub negative: usize,
}

/// Query the weight model for every `(vertex, antecedent < vertex)` pair.
///
/// `ids` maps vertex index to mention id. Zero weights are skipped and not
/// counted. Non-finite weights are rejected.
pub fn candidate_edges<W: PairWeight + ?Sized>(
    vertex: usize,
    ids: &[MentionId],
    weights: &W,
) -> Result<CandidateEdges, ValidationError> {
    let mut out = CandidateEdges::default();
    for antecedent in 0..vertex {
        let (hi, lo) = pair_key(ids[vertex], ids[antecedent]);
        let weight = weights.weight(hi, lo);
        if !weight.is_finite() {
            return Err(ValidationError::NonFiniteWeight {
                anaphor: hi,
                antecedent: lo,
                weight,
            });
        }
        if weight == 0.0 {
            continue;
        }
        if weight > 0.0 {
            out.positive += 1;
        } else {
            out.negative += 1;
        }
        out.edges.push(Edge {
            vertex,
            antecedent,
            weight,
        });
    }
    Ok(out)
}

/// Apply the per-vertex pruning policy.
///
/// - Only repulsive evidence: every edge is dropped.
/// - More than `nprune` edges: keep up to `nprune / 2` strongest positive
///   edges, fill with the strongest negative ones, then top up positives
///   if negatives run short.
#[must_use]
pub fn prune_edges(candidates: CandidateEdges, nprune: usize) -> Vec<Edge> {
    let CandidateEdges {
        mut edges,
        positive,
        negative,
    } = candidates;

    if positive == 0 && negative > 0 {
        return Vec::new();
    }
    if edges.len() <= nprune {
        return edges;
    }

    edges.sort_by(|a, b| a.weight.total_cmp(&b.weight));

    let mut sel_pos = positive.min(nprune / 2);
    let sel_neg = negative.min(nprune - sel_pos);
    if sel_pos + sel_neg < nprune {
        sel_pos = positive.min(nprune - sel_neg);
    }

    let total = edges.len();
    edges.drain(sel_neg..total - sel_pos);
    edges
}

/// Outcome of edge selection for a single vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexEdgeStats {
    /// Non-zero edges found
    pub candidates: usize,
    /// Edges that became constraints
    pub kept: usize,
    /// True if all edges were dropped for being only repulsive
    pub negative_only: bool,
    /// Constraints added
    pub constraints: usize,
}

/// Select, prune and encode the edges of `vertex` into `problem`.
///
/// Edge `(v, a, w)` adds, for every label `l <= a`, a constraint on `(v, l)`
/// with conjunction `[(a, l)]` and compatibility `w`.
pub fn add_vertex_edges<W: PairWeight + ?Sized>(
    problem: &mut LabelingProblem,
    vertex: usize,
    ids: &[MentionId],
    weights: &W,
    nprune: usize,
) -> Result<VertexEdgeStats, ValidationError> {
    let candidates = candidate_edges(vertex, ids, weights)?;
    let mut stats = VertexEdgeStats {
        candidates: candidates.edges.len(),
        negative_only: candidates.positive == 0 && candidates.negative > 0,
        ..VertexEdgeStats::default()
    };

    let kept = prune_edges(candidates, nprune);
    stats.kept = kept.len();
    trace!(
        vertex,
        mention = %ids[vertex],
        candidates = stats.candidates,
        kept = stats.kept,
        negative_only = stats.negative_only,
        "selected edges"
    );

    for edge in kept {
        for label in 0..=edge.antecedent {
            problem.add_constraint(
                edge.vertex,
                label,
                vec![LabelRef::new(edge.antecedent, label)],
                edge.weight,
            )?;
            stats.constraints += 1;
        }
    }
    Ok(stats)
}
