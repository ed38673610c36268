//! Chart rendering with Plotters for the dashboard pages

use std::f64::consts::PI;
use std::path::Path;

use plotters::prelude::*;

use crate::cluster::{ClusterId, ClusterSummary};
use crate::divergence::FeatureComparison;
use crate::eda::{CategoryCounts, Histogram};
use crate::evaluation::{ConfusionMatrix, RocCurve};

/// Color palette for different clusters
const CLUSTER_COLORS: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

const STAYED_COLOR: RGBColor = RGBColor(31, 119, 180);
const LEFT_COLOR: RGBColor = RGBColor(255, 127, 14);
const GLOBAL_COLOR: RGBColor = RGBColor(127, 127, 127);

fn cluster_color(index: usize) -> RGBColor {
    CLUSTER_COLORS[index % CLUSTER_COLORS.len()]
}

/// Show the category name under integer ticks only
fn index_label(names: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    names.get(idx as usize).cloned().unwrap_or_default()
}

/// Value range that always includes zero, padded by 10%
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((max - min) * 0.1).max(1e-9);
    (if min < 0.0 { min - pad } else { 0.0 }, max + pad)
}

/// Grouped bar chart of the selected cluster against the all-cluster mean
pub fn draw_cluster_comparison(
    cluster: &ClusterId,
    rows: &[FeatureComparison],
    output_path: &Path,
) -> crate::Result<()> {
    let names: Vec<String> = rows.iter().map(|r| r.feature.clone()).collect();
    let (y_min, y_max) = value_range(rows.iter().flat_map(|r| [r.cluster_value, r.global_value]));
    let n = rows.len().max(1) as f64;

    let root = BitMapBackend::new(output_path, (900, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Cluster {cluster} vs overall mean"),
            ("sans-serif", 26),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n - 0.5), y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(rows.len().max(1))
        .x_label_formatter(&|v| index_label(&names, *v))
        .y_desc("Mean value")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    let accent = cluster_color(0);
    chart
        .draw_series(rows.iter().enumerate().map(|(i, r)| {
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x, r.cluster_value)], accent.filled())
        }))?
        .label(format!("Cluster {cluster}"))
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], accent.filled()));

    chart
        .draw_series(rows.iter().enumerate().map(|(i, r)| {
            let x = i as f64;
            Rectangle::new([(x, 0.0), (x + 0.35, r.global_value)], GLOBAL_COLOR.filled())
        }))?
        .label("All clusters")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], GLOBAL_COLOR.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    tracing::info!(path = %output_path.display(), "cluster comparison chart saved");
    Ok(())
}

/// Scale each feature to [0, 1] by the larger magnitude of its two values
pub fn radar_scale(rows: &[FeatureComparison]) -> Vec<(f64, f64)> {
    rows.iter()
        .map(|r| {
            let scale = r.cluster_value.abs().max(r.global_value.abs());
            if scale == 0.0 {
                (0.0, 0.0)
            } else {
                (
                    (r.cluster_value / scale).max(0.0),
                    (r.global_value / scale).max(0.0),
                )
            }
        })
        .collect()
}

/// Pixel positions of radar vertices, first spoke pointing up
pub fn radar_vertices(values: &[f64], center: (i32, i32), radius: f64) -> Vec<(i32, i32)> {
    let n = values.len().max(1) as f64;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let angle = -PI / 2.0 + 2.0 * PI * i as f64 / n;
            (
                center.0 + (radius * v * angle.cos()).round() as i32,
                center.1 + (radius * v * angle.sin()).round() as i32,
            )
        })
        .collect()
}

fn closed(mut points: Vec<(i32, i32)>) -> Vec<(i32, i32)> {
    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

/// Radar chart of the selected cluster against the all-cluster mean
pub fn draw_cluster_radar(
    cluster: &ClusterId,
    rows: &[FeatureComparison],
    output_path: &Path,
) -> crate::Result<()> {
    let root = BitMapBackend::new(output_path, (700, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(&format!("Cluster {cluster} profile"), ("sans-serif", 26))?;

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = (w.min(h) as f64) * 0.35;
    let unit = vec![1.0; rows.len()];

    for ring in [0.25, 0.5, 0.75, 1.0] {
        let ring_values: Vec<f64> = unit.iter().map(|u| u * ring).collect();
        area.draw(&PathElement::new(
            closed(radar_vertices(&ring_values, center, radius)),
            BLACK.mix(0.2),
        ))?;
    }

    for (tip, row) in radar_vertices(&unit, center, radius).into_iter().zip(rows) {
        area.draw(&PathElement::new(vec![center, tip], BLACK.mix(0.3)))?;
        let label_at = (
            center.0 + ((tip.0 - center.0) as f64 * 1.12) as i32 - 30,
            center.1 + ((tip.1 - center.1) as f64 * 1.12) as i32 - 7,
        );
        area.draw(&Text::new(row.feature.clone(), label_at, ("sans-serif", 14).into_font()))?;
    }

    let scaled = radar_scale(rows);
    let global: Vec<f64> = scaled.iter().map(|(_, g)| *g).collect();
    let selected: Vec<f64> = scaled.iter().map(|(c, _)| *c).collect();

    let global_points = radar_vertices(&global, center, radius);
    area.draw(&Polygon::new(global_points.clone(), GLOBAL_COLOR.mix(0.25).filled()))?;
    area.draw(&PathElement::new(closed(global_points), GLOBAL_COLOR.stroke_width(2)))?;

    let accent = cluster_color(0);
    let cluster_points = radar_vertices(&selected, center, radius);
    area.draw(&Polygon::new(cluster_points.clone(), accent.mix(0.35).filled()))?;
    area.draw(&PathElement::new(closed(cluster_points), accent.stroke_width(2)))?;

    area.draw(&Rectangle::new([(20, 20), (32, 32)], accent.filled()))?;
    area.draw(&Text::new(format!("Cluster {cluster}"), (38, 19), ("sans-serif", 14).into_font()))?;
    area.draw(&Rectangle::new([(20, 40), (32, 52)], GLOBAL_COLOR.filled()))?;
    area.draw(&Text::new("All clusters", (38, 39), ("sans-serif", 14).into_font()))?;

    root.present()?;
    tracing::info!(path = %output_path.display(), "cluster radar chart saved");
    Ok(())
}

/// Fractions of the whole for each slice; all zero when the total is zero
pub fn pie_fractions(sizes: &[u64]) -> Vec<f64> {
    let total: u64 = sizes.iter().sum();
    if total == 0 {
        return vec![0.0; sizes.len()];
    }
    sizes.iter().map(|&s| s as f64 / total as f64).collect()
}

/// Pie chart of cluster sizes
pub fn draw_cluster_sizes(summary: &ClusterSummary, output_path: &Path) -> crate::Result<()> {
    let sizes: Vec<u64> = summary.rows().iter().map(|r| r.cluster_size).collect();
    let fractions = pie_fractions(&sizes);

    let root = BitMapBackend::new(output_path, (600, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled("Cluster sizes", ("sans-serif", 26))?;

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = (w.min(h) as f64) * 0.4;

    let mut start = -PI / 2.0;
    for (i, (row, fraction)) in summary.rows().iter().zip(&fractions).enumerate() {
        if *fraction <= 0.0 {
            continue;
        }
        let sweep = 2.0 * PI * fraction;
        let steps = ((sweep / (2.0 * PI)) * 120.0).ceil().max(2.0) as usize;

        let mut points = vec![center];
        for step in 0..=steps {
            let angle = start + sweep * step as f64 / steps as f64;
            points.push((
                center.0 + (radius * angle.cos()).round() as i32,
                center.1 + (radius * angle.sin()).round() as i32,
            ));
        }
        area.draw(&Polygon::new(points, cluster_color(i).filled()))?;

        let mid = start + sweep / 2.0;
        let label_at = (
            center.0 + (radius * 0.6 * mid.cos()) as i32 - 20,
            center.1 + (radius * 0.6 * mid.sin()) as i32 - 8,
        );
        area.draw(&Text::new(
            format!("{} ({:.1}%)", row.cluster_id, fraction * 100.0),
            label_at,
            ("sans-serif", 16).into_font(),
        ))?;

        start += sweep;
    }

    root.present()?;
    tracing::info!(path = %output_path.display(), "cluster size chart saved");
    Ok(())
}

/// Bar chart of attrition proportion per cluster
pub fn draw_cluster_attrition(summary: &ClusterSummary, output_path: &Path) -> crate::Result<()> {
    let names: Vec<String> = summary.rows().iter().map(|r| r.cluster_id.to_string()).collect();
    let n = names.len().max(1) as f64;

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Attrition proportion by cluster", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..1f64)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len().max(1))
        .x_label_formatter(&|v| index_label(&names, *v))
        .y_desc("Attrition proportion")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(summary.rows().iter().enumerate().map(|(i, row)| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.3, 0.0), (x + 0.3, row.attrition_proportion.clamp(0.0, 1.0))],
            cluster_color(i).filled(),
        )
    }))?;

    root.present()?;
    tracing::info!(path = %output_path.display(), "cluster attrition chart saved");
    Ok(())
}

/// White to dark blue ramp for heatmap cells
pub fn heat_color(count: u64, max: u64) -> RGBColor {
    let t = if max == 0 { 0.0 } else { count as f64 / max as f64 };
    let lerp = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * t).round() as u8;
    RGBColor(lerp(247, 8), lerp(251, 48), lerp(255, 107))
}

/// Heatmap of the confusion matrix with counts in each cell
pub fn draw_confusion_matrix(matrix: &ConfusionMatrix, output_path: &Path) -> crate::Result<()> {
    let (n_rows, n_cols) = matrix.counts.dim();
    let max = matrix.max_count();
    let labels = matrix.labels.clone();

    let root = BitMapBackend::new(output_path, (600, 450)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Confusion Matrix", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..n_cols as f64, 0f64..n_rows as f64)?;

    // Row 0 of the matrix is drawn at the top
    let row_labels: Vec<String> = labels.iter().take(n_rows).rev().cloned().collect();
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n_cols * 2 + 1)
        .y_labels(n_rows * 2 + 1)
        .x_label_formatter(&|v| index_label(&labels, *v - 0.5))
        .y_label_formatter(&|v| index_label(&row_labels, *v - 0.5))
        .x_desc("Predicted")
        .y_desc("Actual")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(matrix.counts.indexed_iter().map(|((r, c), &count)| {
        let y = (n_rows - 1 - r) as f64;
        let x = c as f64;
        Rectangle::new([(x, y), (x + 1.0, y + 1.0)], heat_color(count, max).filled())
    }))?;

    chart.draw_series(matrix.counts.indexed_iter().map(|((r, c), &count)| {
        let y = (n_rows - 1 - r) as f64;
        let x = c as f64;
        let color = if max > 0 && count * 2 > max { WHITE } else { BLACK };
        Text::new(
            count.to_string(),
            (x + 0.45, y + 0.55),
            ("sans-serif", 22).into_font().color(&color),
        )
    }))?;

    root.present()?;
    tracing::info!(path = %output_path.display(), "confusion matrix saved");
    Ok(())
}

/// ROC curve with the chance diagonal
pub fn draw_roc_curve(roc: &RocCurve, output_path: &Path) -> crate::Result<()> {
    let root = BitMapBackend::new(output_path, (600, 450)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("ROC Curve", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..1f64, 0f64..1f64)?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart
        .draw_series(LineSeries::new(roc.points.iter().copied(), STAYED_COLOR.stroke_width(2)))?
        .label(format!("AUC = {:.2}", roc.auc))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], STAYED_COLOR.stroke_width(2)));

    chart.draw_series(LineSeries::new([(0.0, 0.0), (1.0, 1.0)], GLOBAL_COLOR))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    tracing::info!(path = %output_path.display(), auc = roc.auc, "ROC curve saved");
    Ok(())
}

/// Stacked histogram, departures on top of stayers
pub fn draw_histogram(histogram: &Histogram, output_path: &Path) -> crate::Result<()> {
    let (x_min, x_max) = match (histogram.bins.first(), histogram.bins.last()) {
        (Some(first), Some(last)) => (first.lower, last.upper),
        _ => (0.0, 1.0),
    };
    let y_max = (histogram.max_count().max(1) as f64) * 1.1;

    let root = BitMapBackend::new(output_path, (500, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&histogram.feature, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc(histogram.feature.as_str())
        .y_desc("Count")
        .axis_desc_style(("sans-serif", 14))
        .draw()?;

    chart
        .draw_series(histogram.bins.iter().map(|b| {
            let top = b.stayed as f64;
            Rectangle::new([(b.lower, 0.0), (b.upper, top)], STAYED_COLOR.mix(0.8).filled())
        }))?
        .label(if histogram.split_by_attrition { "No" } else { "All" })
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], STAYED_COLOR.filled()));

    if histogram.split_by_attrition {
        chart
            .draw_series(histogram.bins.iter().map(|b| {
                let base = b.stayed as f64;
                let top = base + b.left as f64;
                Rectangle::new([(b.lower, base), (b.upper, top)], LEFT_COLOR.mix(0.8).filled())
            }))?
            .label("Yes")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], LEFT_COLOR.filled()));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Grouped counts per category, stayers beside departures
pub fn draw_category_counts(counts: &CategoryCounts, output_path: &Path) -> crate::Result<()> {
    let names: Vec<String> = counts.rows.iter().map(|r| r.category.clone()).collect();
    let n = names.len().max(1) as f64;
    let y_max = (counts.max_count().max(1) as f64) * 1.1;

    let root = BitMapBackend::new(output_path, (500, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&counts.feature, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len().max(1))
        .x_label_formatter(&|v| index_label(&names, *v))
        .x_label_style(("sans-serif", 11))
        .y_desc("Count")
        .axis_desc_style(("sans-serif", 14))
        .draw()?;

    chart.draw_series(counts.rows.iter().enumerate().map(|(i, r)| {
        let x = i as f64;
        Rectangle::new([(x - 0.35, 0.0), (x, r.stayed as f64)], STAYED_COLOR.filled())
    }))?;

    if counts.split_by_attrition {
        chart.draw_series(counts.rows.iter().enumerate().map(|(i, r)| {
            let x = i as f64;
            Rectangle::new([(x, 0.0), (x + 0.35, r.left as f64)], LEFT_COLOR.filled())
        }))?;
    }

    root.present()?;
    Ok(())
}
