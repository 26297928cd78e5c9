//! Labelling problem: vertices, label distributions and constraints.
//!
//! Probabilities live in one flat arena indexed by `(vertex, label)` slots.
//! Constraints refer to other slots by index, never by reference, so the
//! solver can read the whole current table before writing the next one.

use crate::error::ValidationError;
use crate::mention::MentionKind;

/// A `(vertex, label)` coordinate in a [`LabelingProblem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelRef {
    /// Vertex index
    pub vertex: usize,
    /// Label index within the vertex's label set
    pub label: usize,
}

impl LabelRef {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(vertex: usize, label: usize) -> Self {
        Self { vertex, label }
    }
}

/// Weighted requirement on a label.
///
/// Contributes `compatibility × Π P(conjunction)` to the label's support.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    compatibility: f64,
    conjunction: Vec<LabelRef>,
}

impl Constraint {
    /// Signed compatibility weight.
    #[must_use]
    pub fn compatibility(&self) -> f64 {
        self.compatibility
    }

    /// Coordinates whose probabilities are multiplied.
    #[must_use]
    pub fn conjunction(&self) -> &[LabelRef] {
        &self.conjunction
    }
}

/// Consistent-labelling problem for one document.
#[derive(Debug, Clone)]
pub struct LabelingProblem {
    /// Start slot of each vertex; one extra trailing entry.
    pub(crate) offsets: Vec<usize>,
    pub(crate) self_labels: Vec<usize>,
    /// Current probabilities, one per slot.
    pub(crate) weights: Vec<f64>,
    pub(crate) constraints: Vec<Vec<Constraint>>,
    num_constraints: usize,
}

impl LabelingProblem {
    /// Creates an empty problem.
    #[must_use]
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            self_labels: Vec::new(),
            weights: Vec::new(),
            constraints: Vec::new(),
            num_constraints: 0,
        }
    }

    /// Build the coreference problem for mentions already in solving order.
    ///
    /// Vertex `v` gets labels `0..=v`, label `v` meaning "new entity".
    #[must_use]
    pub fn for_sorted_kinds(kinds: &[MentionKind]) -> Self {
        let slots = kinds.len() * (kinds.len() + 1) / 2;
        let mut problem = Self {
            offsets: Vec::with_capacity(kinds.len() + 1),
            self_labels: Vec::with_capacity(kinds.len()),
            weights: Vec::with_capacity(slots),
            constraints: Vec::with_capacity(slots),
            num_constraints: 0,
        };
        problem.offsets.push(0);
        for (vertex, kind) in kinds.iter().enumerate() {
            problem.push_distribution(initial_distribution(vertex, *kind), vertex);
        }
        problem
    }

    /// Append a vertex with the given initial distribution.
    ///
    /// `self_label` is the label receiving the self-label prior.
    pub fn add_vertex(&mut self, initial: Vec<f64>, self_label: usize) -> Result<usize, ValidationError> {
        let vertex = self.num_vertices();
        if self_label >= initial.len() {
            return Err(ValidationError::LabelOutOfRange {
                vertex,
                label: self_label,
            });
        }
        self.push_distribution(initial, self_label);
        Ok(vertex)
    }

    fn push_distribution(&mut self, initial: Vec<f64>, self_label: usize) {
        let n = initial.len();
        self.weights.extend(initial);
        self.constraints.extend(std::iter::repeat_with(Vec::new).take(n));
        self.self_labels.push(self_label);
        let end = self.weights.len();
        self.offsets.push(end);
    }

    /// Number of vertices.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.self_labels.len()
    }

    /// Number of labels of `vertex`.
    ///
    /// # Panics
    /// Panics if `vertex` is out of range.
    #[must_use]
    pub fn num_labels(&self, vertex: usize) -> usize {
        self.offsets[vertex + 1] - self.offsets[vertex]
    }

    /// The label meaning "this vertex stands alone".
    #[must_use]
    pub fn self_label(&self, vertex: usize) -> usize {
        self.self_labels[vertex]
    }

    /// Total number of constraints added so far.
    #[must_use]
    pub fn num_constraints(&self) -> usize {
        self.num_constraints
    }

    /// Current probability distribution of `vertex`.
    ///
    /// # Panics
    /// Panics if `vertex` is out of range.
    #[must_use]
    pub fn distribution(&self, vertex: usize) -> &[f64] {
        &self.weights[self.offsets[vertex]..self.offsets[vertex + 1]]
    }

    /// Current probability of `(vertex, label)`, or `None` if out of range.
    #[must_use]
    pub fn probability(&self, vertex: usize, label: usize) -> Option<f64> {
        self.slot(vertex, label).map(|slot| self.weights[slot])
    }

    /// Constraints attached to `(vertex, label)`.
    #[must_use]
    pub fn constraints(&self, vertex: usize, label: usize) -> &[Constraint] {
        match self.slot(vertex, label) {
            Some(slot) => &self.constraints[slot],
            None => &[],
        }
    }

    pub(crate) fn slot(&self, vertex: usize, label: usize) -> Option<usize> {
        if vertex >= self.num_vertices() || label >= self.num_labels(vertex) {
            return None;
        }
        Some(self.offsets[vertex] + label)
    }

    fn checked_slot(&self, at: LabelRef) -> Result<usize, ValidationError> {
        if at.vertex >= self.num_vertices() {
            return Err(ValidationError::VertexOutOfRange {
                vertex: at.vertex,
                vertices: self.num_vertices(),
            });
        }
        self.slot(at.vertex, at.label).ok_or(ValidationError::LabelOutOfRange {
            vertex: at.vertex,
            label: at.label,
        })
    }

    /// Attach a constraint to `(vertex, label)`.
    ///
    /// Every coordinate is range-checked; constraints are never removed.
    pub fn add_constraint(
        &mut self,
        vertex: usize,
        label: usize,
        conjunction: Vec<LabelRef>,
        compatibility: f64,
    ) -> Result<(), ValidationError> {
        let slot = self.checked_slot(LabelRef::new(vertex, label))?;
        if !compatibility.is_finite() {
            return Err(ValidationError::NonFiniteConstraint {
                vertex,
                label,
                weight: compatibility,
            });
        }
        for at in &conjunction {
            self.checked_slot(*at)?;
        }
        self.constraints[slot].push(Constraint {
            compatibility,
            conjunction,
        });
        self.num_constraints += 1;
        Ok(())
    }

    /// All labels sharing the highest probability, in ascending order.
    ///
    /// More than one label is returned only on exact ties.
    #[must_use]
    pub fn best_labels(&self, vertex: usize) -> Vec<usize> {
        let dist = self.distribution(vertex);
        let max = dist.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        dist.iter()
            .enumerate()
            .filter(|(_, p)| **p == max)
            .map(|(label, _)| label)
            .collect()
    }
}

impl Default for LabelingProblem {
    fn default() -> Self {
        Self::new()
    }
}

/// Initial distribution for vertex `vertex` of the given kind.
///
/// Pronouns start uniform over `0..=vertex`. Other mentions give the self
/// label twice the mass of each antecedent label.
#[must_use]
pub fn initial_distribution(vertex: usize, kind: MentionKind) -> Vec<f64> {
    let (mult, base) = if kind.is_pronoun() {
        (1.0, 1.0 / (vertex as f64 + 1.0))
    } else {
        (2.0, 1.0 / (vertex as f64 + 2.0))
    };
    let mut dist = vec![base; vertex + 1];
    dist[vertex] = mult * base;
    dist
}
