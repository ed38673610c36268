//! Console tables for each dashboard page

use std::fmt::{self, Write};

use crate::cluster::{ClusterKpis, ClusterSummary};
use crate::data::AttritionSummary;
use crate::divergence::DivergenceProfile;
use crate::eda::{CategoryCounts, Histogram};
use crate::evaluation::{ClassificationReport, ConfusionMatrix, EvaluationBundle, RocCurve};

/// Run a table writer into a fresh string
fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write(&mut out);
    out
}

pub fn attrition_summary(summary: &AttritionSummary) -> String {
    render(|out| {
        writeln!(out, "=== Employee Attrition Summary ===")?;
        writeln!(out, "Total employees:      {}", summary.total_count)?;
        writeln!(out, "Attrition (Yes):      {}", summary.attrition_count)?;
        writeln!(out, "Attrition percentage: {}%", summary.attrition_percentage)?;
        Ok(())
    })
}

pub fn cluster_overview(summary: &ClusterSummary, kpis: &ClusterKpis) -> String {
    render(|out| {
        writeln!(out, "=== Cluster Overview ===")?;
        writeln!(out, "Total employees:   {}", kpis.total_employees)?;
        writeln!(out, "Clusters:          {}", kpis.n_clusters)?;
        writeln!(
            out,
            "Average attrition: {:.3} (mean of cluster proportions)",
            kpis.avg_attrition
        )?;
        writeln!(out, "Weighted rate:     {:.3} (by cluster size)", kpis.weighted_attrition)?;
        writeln!(out)?;
        writeln!(out, "  Cluster |   Size | Share  | Attrition")?;
        writeln!(out, "  --------|--------|--------|----------")?;
        for row in summary.rows() {
            let share = if kpis.total_employees == 0 {
                0.0
            } else {
                row.cluster_size as f64 / kpis.total_employees as f64 * 100.0
            };
            writeln!(
                out,
                "  {:>7} | {:>6} | {:>5.1}% | {:>9.3}",
                row.cluster_id.to_string(),
                row.cluster_size,
                share,
                row.attrition_proportion
            )?;
        }
        Ok(())
    })
}

pub fn divergence(profile: &DivergenceProfile) -> String {
    render(|out| {
        writeln!(out, "=== Distinguishing features of cluster {} ===", profile.cluster)?;
        if profile.is_empty() {
            writeln!(out, "No numeric features to display.")?;
            return Ok(());
        }

        writeln!(
            out,
            "  {:<24} | {:>10} | {:>10} | {:>9}",
            "Feature", "Cluster", "Overall", "Deviation"
        )?;
        writeln!(out, "  {:-<24}-|-{:-<10}-|-{:-<10}-|-{:-<9}", "", "", "", "")?;
        for d in profile.ranked.iter().take(crate::divergence::RADAR_TOP_K) {
            writeln!(
                out,
                "  {:<24} | {:>10.2} | {:>10.2} | {:>8.1}%",
                d.feature,
                d.cluster_mean,
                d.global_mean,
                d.relative_deviation * 100.0
            )?;
        }
        Ok(())
    })
}

pub fn classification_report(report: &ClassificationReport) -> String {
    let headline = report.headline();
    render(|out| {
        writeln!(out, "Accuracy:          {:.3}", headline.accuracy)?;
        writeln!(out, "Macro F1-Score:    {:.3}", headline.macro_f1)?;
        writeln!(out, "Weighted F1-Score: {:.3}", headline.weighted_f1)?;
        writeln!(out)?;
        writeln!(out, "Detailed Classification Report:")?;
        writeln!(
            out,
            "  {:<10} | {:>9} | {:>6} | {:>8} | {:>7}",
            "Class", "Precision", "Recall", "F1-Score", "Support"
        )?;
        for row in report.class_rows() {
            let m = row.metrics;
            writeln!(
                out,
                "  {:<10} | {:>9.3} | {:>6.3} | {:>8.3} | {:>7}",
                row.label, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        Ok(())
    })
}

pub fn confusion_matrix(matrix: &ConfusionMatrix) -> String {
    render(|out| {
        writeln!(out, "Confusion Matrix (rows: actual, columns: predicted)")?;
        write!(out, "  {:>6}", "")?;
        for label in matrix.labels.iter().take(matrix.counts.ncols()) {
            write!(out, " {:>6}", label)?;
        }
        writeln!(out)?;
        for (r, row) in matrix.counts.outer_iter().enumerate() {
            let label = matrix.labels.get(r).map_or("", String::as_str);
            write!(out, "  {:>6}", label)?;
            for count in row.iter() {
                write!(out, " {:>6}", count)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "Accuracy from matrix: {:.3}", matrix.accuracy())?;
        Ok(())
    })
}

pub fn roc(curve: &RocCurve) -> String {
    format!("ROC AUC = {:.2} ({} thresholds)\n", curve.auc, curve.points.len() - 1)
}

pub fn model_info(bundle: &EvaluationBundle) -> String {
    render(|out| {
        writeln!(out, "Model Info")?;
        if let Some(accuracy) = bundle.accuracy {
            writeln!(out, "  Model accuracy: {accuracy:.3}")?;
        }
        if let Some(names) = &bundle.feature_names {
            writeln!(out, "  Features used:  {}", names.len())?;
            writeln!(out, "  {}", names.join(", "))?;
        }
        Ok(())
    })
}

pub fn histogram(hist: &Histogram) -> String {
    render(|out| {
        writeln!(out, "{}:", hist.feature)?;
        for bin in &hist.bins {
            if hist.split_by_attrition {
                writeln!(
                    out,
                    "  [{:>9.1}, {:>9.1})  no: {:>5}  yes: {:>5}",
                    bin.lower, bin.upper, bin.stayed, bin.left
                )?;
            } else {
                writeln!(out, "  [{:>9.1}, {:>9.1})  {:>5}", bin.lower, bin.upper, bin.stayed)?;
            }
        }
        Ok(())
    })
}

pub fn category_counts(counts: &CategoryCounts) -> String {
    render(|out| {
        writeln!(out, "{}:", counts.feature)?;
        for row in &counts.rows {
            if counts.split_by_attrition {
                writeln!(
                    out,
                    "  {:<28} no: {:>5}  yes: {:>5}",
                    row.category, row.stayed, row.left
                )?;
            } else {
                writeln!(out, "  {:<28} {:>5}", row.category, row.stayed)?;
            }
        }
        Ok(())
    })
}
