//! Closed set of named distributions for batch sampling.
//!
//! Configuration refers to distributions by name and a flat parameter map;
//! [`DistributionKind::from_name`] turns that into a typed variant once, at
//! the boundary, so sampling dispatches by exhaustive match.

use std::collections::HashMap;

use rand_distr::{Beta, Exp, LogNormal, Normal, Weibull};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RngError};
use crate::generator::Generator;

/// Distribution with its parameters.
///
/// # Examples
///
/// ```rust
/// use fund_rng::DistributionKind;
/// use std::collections::HashMap;
///
/// let params = HashMap::from([("shape".to_string(), 1.5)]);
/// let kind = DistributionKind::from_name("weibull", &params).unwrap();
/// assert_eq!(kind, DistributionKind::Weibull { shape: 1.5, scale: 1.0 });
///
/// assert!(DistributionKind::from_name("cauchy", &params).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "lowercase")]
pub enum DistributionKind {
    /// Gaussian.
    Normal {
        /// Mean.
        mean: f64,
        /// Standard deviation.
        std_dev: f64,
    },
    /// Exponential of a Gaussian.
    LogNormal {
        /// Mean of the underlying normal.
        mean: f64,
        /// Standard deviation of the underlying normal.
        sigma: f64,
    },
    /// Uniform on `[low, high)`.
    Uniform {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
    },
    /// Beta on `[0, 1]`.
    Beta {
        /// First shape parameter.
        alpha: f64,
        /// Second shape parameter.
        beta: f64,
    },
    /// Exponential with the given mean.
    Exponential {
        /// Mean (inverse rate).
        scale: f64,
    },
    /// Weibull.
    Weibull {
        /// Shape parameter.
        shape: f64,
        /// Scale parameter.
        scale: f64,
    },
}

impl DistributionKind {
    /// Parses a named distribution; absent parameters take their defaults.
    ///
    /// # Errors
    ///
    /// [`RngError::UnsupportedDistribution`] for an unknown name.
    pub fn from_name(name: &str, params: &HashMap<String, f64>) -> Result<Self> {
        let get = |key: &str, default: f64| params.get(key).copied().unwrap_or(default);
        let kind = match name.to_ascii_lowercase().as_str() {
            "normal" => Self::Normal {
                mean: get("mean", 0.0),
                std_dev: get("std_dev", 1.0),
            },
            "lognormal" => Self::LogNormal {
                mean: get("mean", 0.0),
                sigma: get("sigma", 1.0),
            },
            "uniform" => Self::Uniform {
                low: get("low", 0.0),
                high: get("high", 1.0),
            },
            "beta" => Self::Beta {
                alpha: get("alpha", 1.0),
                beta: get("beta", 1.0),
            },
            "exponential" => Self::Exponential {
                scale: get("scale", 1.0),
            },
            "weibull" => Self::Weibull {
                shape: get("shape", 1.0),
                scale: get("scale", 1.0),
            },
            _ => return Err(RngError::UnsupportedDistribution(name.to_string())),
        };
        Ok(kind)
    }

    /// Lower-case name of the distribution.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal { .. } => "normal",
            Self::LogNormal { .. } => "lognormal",
            Self::Uniform { .. } => "uniform",
            Self::Beta { .. } => "beta",
            Self::Exponential { .. } => "exponential",
            Self::Weibull { .. } => "weibull",
        }
    }

    /// Fills `out` with `size` draws from `generator`.
    ///
    /// # Errors
    ///
    /// [`RngError::InvalidParameter`] if the parameters are outside the
    /// distribution's domain.
    pub fn sample_into(
        &self,
        generator: &mut Generator,
        size: usize,
        out: &mut Vec<f64>,
    ) -> Result<()> {
        out.reserve(size);
        match *self {
            Self::Normal { mean, std_dev } => {
                let dist = Normal::new(mean, std_dev)
                    .map_err(|e| RngError::invalid("std_dev", e.to_string()))?;
                out.extend((0..size).map(|_| generator.sample(&dist)));
            }
            Self::LogNormal { mean, sigma } => {
                let dist = LogNormal::new(mean, sigma)
                    .map_err(|e| RngError::invalid("sigma", e.to_string()))?;
                out.extend((0..size).map(|_| generator.sample(&dist)));
            }
            Self::Uniform { low, high } => {
                check_bounds(low, high)?;
                let width = high - low;
                out.extend((0..size).map(|_| low + width * generator.gen_uniform()));
            }
            Self::Beta { alpha, beta } => {
                let dist = Beta::new(alpha, beta)
                    .map_err(|e| RngError::invalid("alpha", e.to_string()))?;
                out.extend((0..size).map(|_| generator.sample(&dist)));
            }
            Self::Exponential { scale } => {
                if !(scale > 0.0 && scale.is_finite()) {
                    return Err(RngError::invalid(
                        "scale",
                        format!("must be positive, got {}", scale),
                    ));
                }
                let dist = Exp::new(1.0 / scale)
                    .map_err(|e| RngError::invalid("scale", e.to_string()))?;
                out.extend((0..size).map(|_| generator.sample(&dist)));
            }
            Self::Weibull { shape, scale } => {
                let dist = Weibull::new(scale, shape)
                    .map_err(|e| RngError::invalid("shape", e.to_string()))?;
                out.extend((0..size).map(|_| generator.sample(&dist)));
            }
        }
        Ok(())
    }
}

pub(crate) fn check_bounds(low: f64, high: f64) -> Result<()> {
    if !low.is_finite() || !high.is_finite() {
        return Err(RngError::invalid("low", "bounds must be finite"));
    }
    if low > high {
        return Err(RngError::invalid(
            "high",
            format!("upper bound {} is below lower bound {}", high, low),
        ));
    }
    Ok(())
}
