//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::cluster::ClusterLabeler;
use crate::divergence::DenyRule;

/// Dashboard page to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Page {
    /// Headcount and attrition figures only
    Summary,
    /// Feature distributions split by attrition
    Eda,
    /// Classifier evaluation results
    Model,
    /// Cluster profiles and distinguishing features
    Clusters,
    /// Every page in turn
    All,
}

/// HR attrition dashboard over precomputed analytics artifacts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Employee table (CSV, one row per employee)
    #[arg(short, long, default_value = "employee_data.csv")]
    pub data: PathBuf,

    /// Classifier evaluation bundle (JSON)
    #[arg(short, long, default_value = "model_evaluation.json")]
    pub evaluation: PathBuf,

    /// Cluster summary table (CSV, one row per cluster)
    #[arg(short, long, default_value = "cluster_summary.csv")]
    pub clusters: PathBuf,

    /// Directory for rendered charts
    #[arg(short, long, default_value = "dashboard_output")]
    pub output_dir: PathBuf,

    /// Page to render after the summary
    #[arg(short, long, value_enum, default_value_t = Page::All)]
    pub page: Page,

    /// Cluster to profile; defaults to the first cluster in the table
    #[arg(short = 's', long)]
    pub select: Option<String>,

    /// Display labels for cluster ids 0, 1, 2, ... as a comma-separated list
    #[arg(long, default_value = "A,B")]
    pub labels: String,

    /// Exclude features whose name contains all '+'-joined terms
    /// Example: --deny "monthly+income" --deny rate
    #[arg(long = "deny", default_values_t = vec!["monthly+income".to_string()])]
    pub deny: Vec<String>,

    /// Number of histogram bins on the EDA page (1-500)
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..=500))]
    pub bins: u16,

    /// Read page commands from stdin after the first render
    #[arg(short, long)]
    pub interactive: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse the cluster label list
    /// Expected format: "A,B,C"
    pub fn parse_labels(&self) -> crate::Result<ClusterLabeler> {
        let labels: Vec<&str> = self.labels.split(',').map(str::trim).collect();
        if labels.iter().any(|label| label.is_empty()) {
            anyhow::bail!("Cluster labels must be a comma-separated list like 'A,B'");
        }

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = labels.iter().find(|label| !seen.insert(**label)) {
            anyhow::bail!("Duplicate cluster label: {}", dup);
        }

        Ok(ClusterLabeler::from_labels(labels))
    }

    /// Parse the feature denylist
    pub fn parse_denylist(&self) -> crate::Result<Vec<DenyRule>> {
        self.deny
            .iter()
            .map(|rule| {
                rule.parse::<DenyRule>()
                    .map_err(|e| anyhow::anyhow!("Invalid deny rule: {}", e))
            })
            .collect()
    }
}
