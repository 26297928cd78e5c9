//! Pairwise compatibility weights.
//!
//! The resolver never computes compatibility itself; it queries a
//! [`PairWeight`] capability injected by the caller. A weight of exactly
//! zero means "no evidence" and produces no edge.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::mention::MentionId;

/// Source of pairwise compatibility weights.
///
/// Always called with the larger id first: `weight(max(a, b), min(a, b))`.
/// Positive values attract, negative values repel.
pub trait PairWeight {
    /// Compatibility of `anaphor` with `antecedent`.
    fn weight(&self, anaphor: MentionId, antecedent: MentionId) -> f64;
}

impl<F> PairWeight for F
where
    F: Fn(MentionId, MentionId) -> f64,
{
    fn weight(&self, anaphor: MentionId, antecedent: MentionId) -> f64 {
        self(anaphor, antecedent)
    }
}

/// Orders a pair as `(anaphor, antecedent)`, larger id first.
#[must_use]
pub fn pair_key(a: MentionId, b: MentionId) -> (MentionId, MentionId) {
    if a >= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Explicit weight table. Absent pairs weigh zero.
///
/// # Examples
///
/// ```
/// use corelax::{MentionId, PairWeight, PairWeights};
///
/// let mut table = PairWeights::new();
/// table.insert(MentionId::new(0), MentionId::new(1), 0.8);
/// assert_eq!(table.weight(MentionId::new(1), MentionId::new(0)), 0.8);
/// assert_eq!(table.weight(MentionId::new(2), MentionId::new(0)), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairWeights {
    weights: HashMap<(MentionId, MentionId), f64>,
}

impl PairWeights {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the weight of an unordered pair, replacing any previous value.
    pub fn insert(&mut self, a: MentionId, b: MentionId, weight: f64) {
        self.weights.insert(pair_key(a, b), weight);
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, a: u32, b: u32, weight: f64) -> Self {
        self.insert(MentionId::new(a), MentionId::new(b), weight);
        self
    }

    /// Number of explicit pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns true if no pair was set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl PairWeight for PairWeights {
    fn weight(&self, anaphor: MentionId, antecedent: MentionId) -> f64 {
        self.weights.get(&pair_key(anaphor, antecedent)).copied().unwrap_or(0.0)
    }
}

/// Per-document memo over an expensive weight model.
///
/// Owned by the caller for the lifetime of one document; never shared
/// across documents.
pub struct WeightCache<'a, W: PairWeight + ?Sized> {
    inner: &'a W,
    memo: RefCell<HashMap<(MentionId, MentionId), f64>>,
}

impl<'a, W: PairWeight + ?Sized> WeightCache<'a, W> {
    /// Wrap a weight model.
    pub fn new(inner: &'a W) -> Self {
        Self {
            inner,
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// Number of distinct pairs evaluated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.memo.borrow().len()
    }

    /// Returns true if nothing was evaluated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memo.borrow().is_empty()
    }
}

impl<W: PairWeight + ?Sized> PairWeight for WeightCache<'_, W> {
    fn weight(&self, anaphor: MentionId, antecedent: MentionId) -> f64 {
        let key = pair_key(anaphor, antecedent);
        if let Some(w) = self.memo.borrow().get(&key) {
            return *w;
        }
        let w = self.inner.weight(key.0, key.1);
        self.memo.borrow_mut().insert(key, w);
        w
    }
}
