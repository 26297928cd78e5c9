//! Document-level coreference resolution.
//!
//! `resolve` wires the stages together: validate mentions, build the
//! mention graph, run the relaxation solver, extract chains, and emit the
//! mentions that belong in the document output.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chains::{emit_mentions, extract_chains, singleton_chains, Chains};
use crate::config::RelaxConfig;
use crate::error::{CorefResult, ValidationError};
use crate::graph::{BuildStats, MentionGraph};
use crate::mention::{Mention, MentionStore, ResolvedMention};
use crate::solver::{RelaxationSolver, SolveReport};
use crate::weight::PairWeight;

/// Full outcome of resolving one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Mentions emitted to the document output, in detection order
    pub output: Vec<ResolvedMention>,
    /// Every mention with its group set, in detection order
    pub mentions: Vec<Mention>,
    /// Chains keyed by group id, singletons included
    pub chains: Chains,
    /// Graph construction counters
    pub stats: BuildStats,
    /// Solver summary; `None` when the document was too small to solve
    pub report: Option<SolveReport>,
}

/// Resolver bound to a validated configuration.
///
/// # Example
/// ```
/// use corelax::{CorefResolver, Mention, MentionId, MentionKind, PairWeights, RelaxConfig};
///
/// let mentions = vec![
///     Mention::new(MentionId::new(0), MentionKind::ProperNoun, 0, 0, 1),
///     Mention::new(MentionId::new(1), MentionKind::Pronoun, 1, 0, 0),
/// ];
/// let weights = PairWeights::new().with(1, 0, 0.9);
///
/// let resolver = CorefResolver::new(RelaxConfig::default()).unwrap();
/// let resolution = resolver.resolve_document(mentions, &weights).unwrap();
/// assert_eq!(resolution.output.len(), 2);
/// assert!(resolution.output.iter().all(|m| m.group == MentionId::new(0)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CorefResolver {
    config: RelaxConfig,
}

impl CorefResolver {
    /// Create a resolver, validating the configuration.
    pub fn new(config: RelaxConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &RelaxConfig {
        &self.config
    }

    /// Resolve one document.
    ///
    /// Weights are requested at most once per unordered mention pair.
    /// Fails on duplicate mention ids, inverted spans, or non-finite weights.
    pub fn resolve_document<W: PairWeight + ?Sized>(
        &self,
        mentions: Vec<Mention>,
        weights: &W,
    ) -> CorefResult<Resolution> {
        let mut store = MentionStore::new(mentions)?;

        if store.len() < 2 {
            let chains = singleton_chains(&mut store);
            let output = emit_mentions(&store, &chains, self.config.provide_singletons);
            return Ok(Resolution {
                output,
                stats: BuildStats {
                    vertices: store.len(),
                    ..BuildStats::default()
                },
                mentions: store.into_mentions(),
                chains,
                report: None,
            });
        }

        let nprune = usize::try_from(self.config.nprune).unwrap_or(usize::MAX);
        let mut graph = MentionGraph::build(&store, weights, nprune)?;

        let started = Instant::now();
        let report = RelaxationSolver::from_config(&self.config).solve(&mut graph.problem);
        debug!(
            iterations = report.iterations,
            converged = report.converged,
            max_change = report.max_change,
            elapsed_us = started.elapsed().as_micros() as u64,
            "solved labelling problem"
        );

        let chains = extract_chains(&mut store, &graph);
        let output = emit_mentions(&store, &chains, self.config.provide_singletons);
        debug!(
            mentions = store.len(),
            chains = chains.len(),
            emitted = output.len(),
            "extracted chains"
        );

        Ok(Resolution {
            output,
            mentions: store.into_mentions(),
            chains,
            stats: graph.stats,
            report: Some(report),
        })
    }
}

/// Resolve one document and return the emitted mentions.
///
/// # Example
/// ```
/// use corelax::{resolve, Mention, MentionId, MentionKind, RelaxConfig};
///
/// let mentions = vec![Mention::new(MentionId::new(3), MentionKind::ProperNoun, 0, 0, 0)];
/// let config = RelaxConfig::builder().provide_singletons(true).build().unwrap();
/// let no_evidence = |_: MentionId, _: MentionId| 0.0;
/// let out = resolve(mentions, &no_evidence, &config).unwrap();
/// assert_eq!(out[0].group, MentionId::new(3));
/// ```
pub fn resolve<W: PairWeight + ?Sized>(
    mentions: Vec<Mention>,
    weights: &W,
    config: &RelaxConfig,
) -> CorefResult<Vec<ResolvedMention>> {
    let resolver = CorefResolver::new(*config)?;
    Ok(resolver.resolve_document(mentions, weights)?.output)
}
