//! Cluster feature divergence: which numeric features set a cluster apart
//! from the population of clusters.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::cluster::{ClusterId, ClusterSummary, ColumnKind};
use crate::error::DashboardError;

/// Features shown in the grouped bar comparison
pub const BAR_TOP_K: usize = 5;
/// Features shown on the radar chart
pub const RADAR_TOP_K: usize = 6;

/// Excludes a feature whose name contains every one of `terms`,
/// compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyRule {
    terms: Vec<String>,
}

impl DenyRule {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, feature: &str) -> bool {
        let name = feature.to_lowercase();
        !self.terms.is_empty() && self.terms.iter().all(|term| name.contains(term.as_str()))
    }
}

impl FromStr for DenyRule {
    type Err = String;

    /// Parses `monthly+income` style rules
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rule = DenyRule::new(s.split('+'));
        if rule.terms.is_empty() {
            return Err(format!("deny rule '{s}' has no terms"));
        }
        Ok(rule)
    }
}

impl fmt::Display for DenyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.terms.join("+"))
    }
}

/// Income columns are redundant with the job level features
pub fn default_denylist() -> Vec<DenyRule> {
    vec![DenyRule::new(["monthly", "income"])]
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDivergence {
    pub feature: String,
    pub cluster_mean: f64,
    pub global_mean: f64,
    pub relative_deviation: f64,
}

/// One row of the comparison views
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureComparison {
    pub feature: String,
    pub cluster_value: f64,
    pub global_value: f64,
}

impl From<&FeatureDivergence> for FeatureComparison {
    fn from(d: &FeatureDivergence) -> Self {
        Self {
            feature: d.feature.clone(),
            cluster_value: d.cluster_mean,
            global_value: d.global_mean,
        }
    }
}

/// Ranked divergences for one cluster, most distinguishing first
#[derive(Debug, Clone, PartialEq)]
pub struct DivergenceProfile {
    pub cluster: ClusterId,
    pub ranked: Vec<FeatureDivergence>,
}

impl DivergenceProfile {
    /// Top features for the grouped bar chart
    pub fn bar(&self) -> Vec<FeatureComparison> {
        self.top(BAR_TOP_K)
    }

    /// Top features for the radar chart, a superset of [`Self::bar`]
    pub fn radar(&self) -> Vec<FeatureComparison> {
        self.top(RADAR_TOP_K)
    }

    pub fn top(&self, k: usize) -> Vec<FeatureComparison> {
        self.ranked.iter().take(k).map(FeatureComparison::from).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Rank the numeric features of `selected` by relative deviation from the
/// unweighted mean over all clusters.
///
/// Features with a zero global mean, a missing value in any row, or a name
/// matched by `denylist` are left out. Ties keep column order. An unknown
/// cluster fails before anything is computed.
pub fn feature_divergence(
    summary: &ClusterSummary,
    selected: &str,
    denylist: &[DenyRule],
) -> Result<DivergenceProfile, DashboardError> {
    let target = summary.find(selected)?;
    let rows = summary.rows();

    let mut ranked = Vec::new();
    for (idx, spec) in summary.features().iter().enumerate() {
        if spec.kind != ColumnKind::Numeric {
            continue;
        }

        let values: Option<Vec<f64>> = rows.iter().map(|row| row.values[idx].as_f64()).collect();
        let Some(values) = values else {
            debug!(feature = %spec.name, "skipping feature with missing values");
            continue;
        };
        let Some(cluster_mean) = target.values[idx].as_f64() else {
            continue;
        };

        let global_mean = values.iter().sum::<f64>() / values.len() as f64;
        if global_mean == 0.0 {
            debug!(feature = %spec.name, "skipping feature with zero global mean");
            continue;
        }

        let relative_deviation = (cluster_mean - global_mean).abs() / global_mean.abs();
        if !relative_deviation.is_finite() {
            continue;
        }

        if denylist.iter().any(|rule| rule.matches(&spec.name)) {
            debug!(feature = %spec.name, "feature excluded by denylist");
            continue;
        }

        ranked.push(FeatureDivergence {
            feature: spec.name.clone(),
            cluster_mean,
            global_mean,
            relative_deviation,
        });
    }

    // Stable: equal deviations keep column order
    ranked.sort_by(|a, b| b.relative_deviation.total_cmp(&a.relative_deviation));

    Ok(DivergenceProfile {
        cluster: target.cluster_id.clone(),
        ranked,
    })
}
