//! Resolver configuration.
//!
//! `RelaxConfig` bundles the solver parameters and the output policy. It can
//! be built fluently, deserialized from JSON, or taken from `Default`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CorefError, ValidationError};
use crate::solver::UpdateRule;

/// Parameters for one resolution call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxConfig {
    /// Iteration budget for the relaxation solver.
    pub max_iter: u32,
    /// Step size applied to label supports.
    pub scale_factor: f64,
    /// Convergence threshold on the largest probability change.
    pub epsilon: f64,
    /// Prior support added to every self-label.
    pub single_factor: f64,
    /// Maximum number of edges kept per vertex.
    pub nprune: u32,
    /// Emit mentions whose chain has a single member.
    pub provide_singletons: bool,
    /// Probability update strategy.
    pub update_rule: UpdateRule,
}

impl Default for RelaxConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            scale_factor: 1.0,
            epsilon: 1e-3,
            single_factor: 0.1,
            nprune: 100,
            provide_singletons: false,
            update_rule: UpdateRule::Linear,
        }
    }
}

impl RelaxConfig {
    /// Starts a builder seeded with default values.
    #[must_use]
    pub fn builder() -> RelaxConfigBuilder {
        RelaxConfigBuilder::default()
    }

    /// Validate parameters.
    ///
    /// `nprune == 0` and `max_iter == 0` are accepted: the first keeps no
    /// edges, the second returns the initial distribution.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_finite("scale_factor", self.scale_factor)?;
        check_finite("epsilon", self.epsilon)?;
        check_finite("single_factor", self.single_factor)?;
        if self.scale_factor < 0.0 {
            return Err(invalid("scale_factor", "must be >= 0"));
        }
        if self.epsilon < 0.0 {
            return Err(invalid("epsilon", "must be >= 0"));
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take default values.
    pub fn from_json_str(json: &str) -> Result<Self, CorefError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, CorefError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        Self::from_json_str(&raw)
    }
}

fn check_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, "must be finite"))
    }
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Builder for [`RelaxConfig`].
///
/// # Example
/// ```
/// use corelax::{RelaxConfig, UpdateRule};
///
/// let config = RelaxConfig::builder()
///     .max_iter(500)
///     .nprune(40)
///     .update_rule(UpdateRule::Clamped)
///     .provide_singletons(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.nprune, 40);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RelaxConfigBuilder {
    config: RelaxConfig,
}

impl RelaxConfigBuilder {
    /// Set the iteration budget.
    #[must_use]
    pub fn max_iter(mut self, max_iter: u32) -> Self {
        self.config.max_iter = max_iter;
        self
    }

    /// Set the support scale factor.
    #[must_use]
    pub fn scale_factor(mut self, scale_factor: f64) -> Self {
        self.config.scale_factor = scale_factor;
        self
    }

    /// Set the convergence threshold.
    #[must_use]
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Set the self-label prior.
    #[must_use]
    pub fn single_factor(mut self, single_factor: f64) -> Self {
        self.config.single_factor = single_factor;
        self
    }

    /// Set the per-vertex edge budget.
    #[must_use]
    pub fn nprune(mut self, nprune: u32) -> Self {
        self.config.nprune = nprune;
        self
    }

    /// Emit singleton mentions (default: false).
    #[must_use]
    pub fn provide_singletons(mut self, provide: bool) -> Self {
        self.config.provide_singletons = provide;
        self
    }

    /// Select the probability update strategy.
    #[must_use]
    pub fn update_rule(mut self, rule: UpdateRule) -> Self {
        self.config.update_rule = rule;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<RelaxConfig, ValidationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
