//! Mention graph construction.
//!
//! Turns a document's mentions into a consistent-labelling problem: order
//! the mentions, give each vertex its label set and initial distribution,
//! then encode pruned pairwise evidence as constraints.

mod edges;
mod ordering;
mod problem;

pub use edges::{add_vertex_edges, candidate_edges, prune_edges, CandidateEdges, Edge, VertexEdgeStats};
pub use ordering::solving_order;
pub use problem::{initial_distribution, Constraint, LabelRef, LabelingProblem};

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::mention::{MentionId, MentionStore};
use crate::weight::PairWeight;

/// Counters collected while building a problem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Number of vertices (mentions)
    pub vertices: usize,
    /// Non-zero edges returned by the weight model
    pub candidate_edges: usize,
    /// Edges encoded as constraints
    pub kept_edges: usize,
    /// Vertices whose edges were all dropped for being only repulsive
    pub negative_only_vertices: usize,
    /// Constraints added to the problem
    pub constraints: usize,
}

impl BuildStats {
    /// Edges removed by pruning (including negative-only drops).
    #[must_use]
    pub fn pruned_edges(&self) -> usize {
        self.candidate_edges - self.kept_edges
    }
}

/// A labelling problem plus the vertex-to-mention mapping.
#[derive(Debug, Clone)]
pub struct MentionGraph {
    /// The labelling problem
    pub problem: LabelingProblem,
    /// Detection-order position of the mention at each vertex
    pub order: Vec<usize>,
    /// Mention id at each vertex
    pub ids: Vec<MentionId>,
    /// Build counters
    pub stats: BuildStats,
}

impl MentionGraph {
    /// Build the problem for a document.
    pub fn build<W: PairWeight + ?Sized>(
        store: &MentionStore,
        weights: &W,
        nprune: usize,
    ) -> Result<Self, ValidationError> {
        let started = Instant::now();
        let order = solving_order(store.as_slice());
        let sorted: Vec<_> = order.iter().map(|&pos| &store.as_slice()[pos]).collect();
        let ids: Vec<MentionId> = sorted.iter().map(|m| m.id).collect();
        let kinds: Vec<_> = sorted.iter().map(|m| m.kind).collect();

        let mut problem = LabelingProblem::for_sorted_kinds(&kinds);
        debug!(
            vertices = problem.num_vertices(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "added vertices"
        );

        let started = Instant::now();
        let mut stats = BuildStats {
            vertices: problem.num_vertices(),
            ..BuildStats::default()
        };
        for vertex in 0..problem.num_vertices() {
            let v = add_vertex_edges(&mut problem, vertex, &ids, weights, nprune)?;
            stats.candidate_edges += v.candidates;
            stats.kept_edges += v.kept;
            stats.constraints += v.constraints;
            if v.negative_only {
                stats.negative_only_vertices += 1;
            }
        }
        debug!(
            edges = stats.kept_edges,
            pruned = stats.pruned_edges(),
            constraints = stats.constraints,
            elapsed_us = started.elapsed().as_micros() as u64,
            "added constraints"
        );

        Ok(Self {
            problem,
            order,
            ids,
            stats,
        })
    }
}
