//! # corelax - coreference resolution by relaxation labelling
//!
//! corelax groups the mentions of one document into entities. Each mention
//! becomes a vertex whose labels are "same entity as an earlier vertex" or
//! "starts a new entity". Pairwise evidence from a caller-supplied weight
//! model is pruned and encoded as compatibility constraints, then an
//! iterative relaxation solver settles on a label per vertex.
//!
//! ## Pipeline
//!
//! - **Mentions**: validated and put in solving order (proper nouns, then
//!   other nominals, then pronouns)
//! - **Graph**: triangular label sets, initial distributions, pruned edges
//! - **Solver**: relaxation-labelling iterations until the change drops
//!   below epsilon or the budget runs out
//! - **Chains**: best label per vertex, ties broken by textual proximity
//!
//! ## Usage
//!
//! ```rust
//! use corelax::{resolve, Mention, MentionId, MentionKind, PairWeights, RelaxConfig};
//!
//! let mentions = vec![
//!     Mention::new(MentionId::new(0), MentionKind::ProperNoun, 0, 0, 1),
//!     Mention::new(MentionId::new(1), MentionKind::NounPhrase, 0, 5, 6),
//!     Mention::new(MentionId::new(2), MentionKind::Pronoun, 1, 0, 0),
//! ];
//! let weights = PairWeights::new().with(2, 0, 0.9).with(1, 0, -0.5);
//!
//! let out = resolve(mentions, &weights, &RelaxConfig::default())?;
//! assert_eq!(out.len(), 2);
//! assert!(out.iter().all(|m| m.group == MentionId::new(0)));
//! # Ok::<(), corelax::CorefError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod config;
pub mod error;
pub mod mention;
pub mod weight;

// Graph, solver, and chain extraction
pub mod chains;
pub mod graph;
pub mod solver;

// Entry points
pub mod resolver;
pub mod runtime;

pub use chains::Chains;
pub use config::{RelaxConfig, RelaxConfigBuilder};
pub use error::{ConfigError, CorefError, CorefResult, ExecutionError, ValidationError};
pub use graph::{BuildStats, LabelRef, LabelingProblem, MentionGraph};
pub use mention::{Mention, MentionId, MentionKind, MentionStore, ResolvedMention, SENTENCE_STRIDE};
pub use resolver::{resolve, CorefResolver, Resolution};
pub use runtime::{CorefRuntime, CorefRuntimeConfig, Document, ResolveHandle};
pub use solver::{RelaxationSolver, SolveReport, UpdateRule};
pub use weight::{PairWeight, PairWeights, WeightCache};
