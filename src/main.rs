//! attrition-dash: HR attrition dashboard over precomputed artifacts
//!
//! This is the main entrypoint that renders the summary followed by the
//! selected page, isolating failures per section so one missing artifact
//! never hides the rest of the dashboard.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use attrition_dash::divergence::DenyRule;
use attrition_dash::eda::{category_counts, numeric_histogram, CATEGORICAL_FEATURES, NUMERIC_FEATURES};
use attrition_dash::{
    check_feature_compatibility, cluster_kpis, feature_divergence, report, summarize_attrition, viz,
    Args, Artifacts, ClusterLabeler, DashboardError, Page,
};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_tracing(args.verbose);

    let labeler = args.parse_labels()?;
    let denylist = args.parse_denylist()?;
    fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("cannot create output directory {}", args.output_dir.display())
    })?;

    let mut dashboard = Dashboard {
        args: &args,
        labeler,
        denylist,
        artifacts: Artifacts::new(),
    };

    dashboard.render(args.page, args.select.as_deref());

    if args.interactive {
        dashboard.run_interactive()?;
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "attrition_dash=debug"
    } else {
        "attrition_dash=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(io::stderr)
        .init();
}

/// One command of the interactive prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show(Page, Option<String>),
    /// Drop one artifact from the cache, or all of them
    Reload(Option<String>),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?.to_lowercase();
    let rest: Vec<&str> = parts.collect();
    let selected = (!rest.is_empty()).then(|| rest.join(" "));

    match head.as_str() {
        "summary" => Some(Command::Show(Page::Summary, None)),
        "eda" => Some(Command::Show(Page::Eda, None)),
        "model" => Some(Command::Show(Page::Model, None)),
        "clusters" | "cluster" => Some(Command::Show(Page::Clusters, selected)),
        "all" => Some(Command::Show(Page::All, selected)),
        "reload" => Some(Command::Reload(selected)),
        "help" | "?" => Some(Command::Help),
        "quit" | "exit" | "q" => Some(Command::Quit),
        _ => None,
    }
}

const HELP: &str = "Commands: summary | eda | model | cluster [id] | all [id] \
                    | reload [data|evaluation|clusters] | help | quit";

struct Dashboard<'a> {
    args: &'a Args,
    labeler: ClusterLabeler,
    denylist: Vec<DenyRule>,
    artifacts: Artifacts,
}

impl Dashboard<'_> {
    /// Render the summary and then the requested page
    fn render(&mut self, page: Page, selected: Option<&str>) {
        let start_time = Instant::now();

        let result = self.show_summary();
        report_failure("summary", result);
        println!("{}", "-".repeat(60));

        if matches!(page, Page::Eda | Page::All) {
            let result = self.show_eda();
            report_failure("EDA", result);
        }
        if matches!(page, Page::Model | Page::All) {
            let result = self.show_model_results();
            report_failure("model results", result);
        }
        if matches!(page, Page::Clusters | Page::All) {
            let result = self.show_clusters(selected);
            report_failure("clusters", result);
        }

        debug!(
            page = ?page,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "page rendered"
        );
    }

    fn chart_path(&self, name: &str) -> PathBuf {
        let file: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        self.args.output_dir.join(format!("{file}.png"))
    }

    fn artifact_path(&self, name: &str) -> Option<&Path> {
        match name.to_lowercase().as_str() {
            "data" | "employees" => Some(self.args.data.as_path()),
            "evaluation" | "model" => Some(self.args.evaluation.as_path()),
            "clusters" | "cluster" => Some(self.args.clusters.as_path()),
            _ => None,
        }
    }

    fn reload(&mut self, target: Option<&str>) {
        let Some(target) = target else {
            self.artifacts.clear();
            println!("Artifacts will be reloaded on next use");
            return;
        };

        let Some(path) = self.artifact_path(target).map(Path::to_path_buf) else {
            println!("Unknown artifact '{target}'. Use data, evaluation or clusters");
            return;
        };

        if self.artifacts.invalidate(&path) {
            println!("{} will be reloaded on next use", path.display());
        } else {
            println!("{} is not loaded yet", path.display());
        }
    }

    fn show_summary(&mut self) -> Result<()> {
        let employees = self.artifacts.employees(&self.args.data)?;
        let summary = summarize_attrition(&employees)?;
        print!("{}", report::attrition_summary(&summary));
        Ok(())
    }

    fn show_eda(&mut self) -> Result<()> {
        let employees = self.artifacts.employees(&self.args.data)?;

        println!("\n=== Exploratory Data Analysis: numeric features ===");
        for feature in NUMERIC_FEATURES {
            match numeric_histogram(&employees, feature, usize::from(self.args.bins)) {
                Ok(histogram) => {
                    print!("{}", report::histogram(&histogram));
                    let path = self.chart_path(&format!("eda_{feature}"));
                    warn_on_chart_error(viz::draw_histogram(&histogram, &path));
                }
                Err(e) => println!("! {e}"),
            }
        }

        println!("\n=== Exploratory Data Analysis: categorical features ===");
        for feature in CATEGORICAL_FEATURES {
            match category_counts(&employees, feature) {
                Ok(counts) => {
                    print!("{}", report::category_counts(&counts));
                    let path = self.chart_path(&format!("eda_{feature}"));
                    warn_on_chart_error(viz::draw_category_counts(&counts, &path));
                }
                Err(e) => println!("! {e}"),
            }
        }

        Ok(())
    }

    fn show_model_results(&mut self) -> Result<()> {
        println!("\n=== Classification Model Results ===");
        let bundle = self.artifacts.evaluation(&self.args.evaluation)?;

        if let Some(class_report) = &bundle.classification_report {
            print!("{}", report::classification_report(class_report));
            println!();
        }

        match bundle.confusion() {
            Some(Ok(matrix)) => {
                print!("{}", report::confusion_matrix(&matrix));
                let path = self.chart_path("confusion_matrix");
                warn_on_chart_error(viz::draw_confusion_matrix(&matrix, &path));
            }
            Some(Err(e)) => println!("! Confusion matrix unusable: {e}"),
            None => println!("Confusion matrix not available"),
        }

        match bundle.roc() {
            Some(Ok(curve)) => {
                print!("{}", report::roc(&curve));
                let path = self.chart_path("roc_curve");
                warn_on_chart_error(viz::draw_roc_curve(&curve, &path));
            }
            Some(Err(e)) => println!("! ROC curve unusable: {e}"),
            None => println!("Data for the ROC curve not available"),
        }

        print!("{}", report::model_info(&bundle));

        if let Some(expected) = &bundle.feature_names {
            match self.artifacts.employees(&self.args.data) {
                Ok(employees) => {
                    let compatibility = check_feature_compatibility(&employees, expected);
                    if compatibility.is_match() {
                        info!("employee table matches the model features");
                    } else {
                        warn!(%compatibility, "employee table differs from the model features");
                        println!("! {compatibility}");
                    }
                }
                Err(e) => debug!(error = %e, "skipping feature compatibility check"),
            }
        }

        Ok(())
    }

    fn show_clusters(&mut self, selected: Option<&str>) -> Result<()> {
        println!("\n=== Cluster Analysis ===");
        let stored = self.artifacts.clusters(&self.args.clusters)?;
        let summary = self.labeler.apply(&stored)?;

        let kpis = cluster_kpis(&summary);
        print!("{}", report::cluster_overview(&summary, &kpis));
        let sizes_path = self.chart_path("cluster_sizes");
        warn_on_chart_error(viz::draw_cluster_sizes(&summary, &sizes_path));
        let attrition_path = self.chart_path("cluster_attrition");
        warn_on_chart_error(viz::draw_cluster_attrition(&summary, &attrition_path));

        let selected = match selected {
            Some(id) => id.to_string(),
            None => match summary.rows().first() {
                Some(row) => row.cluster_id.to_string(),
                None => {
                    println!("Cluster summary is empty");
                    return Ok(());
                }
            },
        };

        let profile = feature_divergence(&summary, &selected, &self.denylist)?;
        println!();
        print!("{}", report::divergence(&profile));
        if profile.is_empty() {
            return Ok(());
        }

        let cluster = profile.cluster.to_string();
        warn_on_chart_error(viz::draw_cluster_comparison(
            &profile.cluster,
            &profile.bar(),
            &self.chart_path(&format!("cluster_{cluster}_comparison")),
        ));
        warn_on_chart_error(viz::draw_cluster_radar(
            &profile.cluster,
            &profile.radar(),
            &self.chart_path(&format!("cluster_{cluster}_radar")),
        ));

        Ok(())
    }

    fn run_interactive(&mut self) -> Result<()> {
        println!("{HELP}");
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("> ");
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Some(Command::Show(page, selected)) => self.render(page, selected.as_deref()),
                Some(Command::Reload(target)) => self.reload(target.as_deref()),
                Some(Command::Help) => println!("{HELP}"),
                Some(Command::Quit) => break,
                None => println!("Unknown command. {HELP}"),
            }
        }

        Ok(())
    }
}

/// Charts are best effort; the console tables carry the same figures
fn warn_on_chart_error(result: Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "chart rendering failed");
    }
}

/// Print a section failure without aborting the rest of the dashboard
fn report_failure(section: &str, result: Result<()>) {
    let Err(err) = result else {
        return;
    };

    if is_missing_artifact(&err) {
        error!(section, error = %err, "artifact missing");
    } else {
        error!(section, error = %err, "section failed");
    }
    print!("{}", failure_notice(section, &err));
}

fn is_missing_artifact(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DashboardError>()
        .is_some_and(DashboardError::is_not_found)
}

/// User-facing text for a failed section
fn failure_notice(section: &str, err: &anyhow::Error) -> String {
    if is_missing_artifact(err) {
        format!("✗ File not found: {err}\n  Make sure the artifact exists at the configured path\n")
    } else {
        format!("✗ Error in {section}: {err:#}\n  Check the file format and data compatibility\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("eda"), Some(Command::Show(Page::Eda, None)));
        assert_eq!(
            parse_command("cluster Flight Risk"),
            Some(Command::Show(Page::Clusters, Some("Flight Risk".into())))
        );
        assert_eq!(parse_command("  RELOAD "), Some(Command::Reload(None)));
        assert_eq!(
            parse_command("reload clusters"),
            Some(Command::Reload(Some("clusters".into())))
        );
        assert_eq!(parse_command("exit"), Some(Command::Quit));
        assert_eq!(parse_command("dance"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_failure_notice_distinguishes_missing_files() {
        let missing: anyhow::Error = DashboardError::ArtifactNotFound {
            path: PathBuf::from("cluster_summary.csv"),
        }
        .into();
        let notice = failure_notice("clusters", &missing);
        assert!(notice.starts_with("✗ File not found"));
        assert!(notice.contains("cluster_summary.csv"));
        assert!(!notice.contains("Error in"));

        let malformed: anyhow::Error =
            DashboardError::schema("cluster summary lacks column 'cluster_size'").into();
        let notice = failure_notice("clusters", &malformed);
        assert!(notice.starts_with("✗ Error in clusters"));
        assert!(notice.contains("cluster_size"));
        assert!(!notice.contains("File not found"));

        let other = anyhow::anyhow!("disk on fire");
        assert!(failure_notice("EDA", &other).starts_with("✗ Error in EDA"));
    }
}
