//! Probability update strategies for the relaxation solver.

use serde::{Deserialize, Serialize};

/// How a label's support turns into its next (unnormalized) probability.
///
/// Both rules return a non-negative value; the solver renormalizes each
/// vertex afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    /// `max(0, p · (1 + scale · support))`.
    #[default]
    Linear,

    /// `p · (1 + clamp(support / scale, -1, 1))`.
    ///
    /// Supports at or beyond `±scale` saturate to `±1`. A scale of zero
    /// disables normalization and uses the raw support, still floored at
    /// zero.
    Clamped,
}

impl UpdateRule {
    /// Unnormalized next probability for a label.
    #[must_use]
    pub fn update(self, probability: f64, support: f64, scale: f64) -> f64 {
        let factor = match self {
            Self::Linear => scale * support,
            Self::Clamped if scale == 0.0 => support,
            Self::Clamped => (support / scale).clamp(-1.0, 1.0),
        };
        (probability * (1.0 + factor)).max(0.0)
    }

    /// Returns a short stable identifier suitable for logging.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Clamped => "clamped",
        }
    }
}
