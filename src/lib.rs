//! attrition-dash: console and chart dashboard for precomputed HR attrition analytics
//!
//! This library loads an employee table, a classifier evaluation bundle and a
//! cluster-summary table, and derives the figures the dashboard shows: attrition
//! rates, report headlines, ROC curves and the features that set each cluster apart.

pub mod artifact;
pub mod cli;
pub mod cluster;
pub mod data;
pub mod divergence;
pub mod eda;
pub mod error;
pub mod evaluation;
pub mod report;
pub mod viz;

// Re-export public items for easier access
pub use artifact::{ArtifactCache, Artifacts};
pub use cli::{Args, Page};
pub use cluster::{
    cluster_kpis, ensure_cluster_column, load_cluster_summary, ClusterId, ClusterKpis,
    ClusterLabeler, ClusterSummary,
};
pub use data::{check_feature_compatibility, load_employee_data, summarize_attrition, AttritionSummary};
pub use divergence::{default_denylist, feature_divergence, DenyRule, DivergenceProfile, FeatureComparison};
pub use error::DashboardError;
pub use evaluation::{load_evaluation, ClassificationReport, EvaluationBundle, RocCurve};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
