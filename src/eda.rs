//! Exploratory distributions of the employee table, split by attrition

use polars::prelude::*;

use crate::data::{attrition_flags, ATTRITION_COLUMN};
use crate::error::DashboardError;

pub const NUMERIC_FEATURES: [&str; 5] = [
    "TotalWorkingYears",
    "Age",
    "YearsAtCompany",
    "YearsWithCurrManager",
    "MonthlyIncome",
];

pub const CATEGORICAL_FEATURES: [&str; 5] =
    ["Department", "JobRole", "Gender", "MaritalStatus", "OverTime"];

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub stayed: usize,
    pub left: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub feature: String,
    pub bins: Vec<HistogramBin>,
    /// False when the table has no attrition column and `left` is always 0
    pub split_by_attrition: bool,
}

impl Histogram {
    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.stayed + b.left).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub stayed: usize,
    pub left: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounts {
    pub feature: String,
    /// In order of first appearance
    pub rows: Vec<CategoryCount>,
    pub split_by_attrition: bool,
}

impl CategoryCounts {
    pub fn max_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.stayed.max(r.left))
            .max()
            .unwrap_or(0)
    }
}

fn feature_series<'a>(df: &'a DataFrame, feature: &str) -> Result<&'a Series, DashboardError> {
    df.column(feature)
        .map_err(|_| DashboardError::schema(format!("column '{feature}' not found in data")))
}

/// Attrition flags, or all-false when the table carries no target column
fn split_flags(df: &DataFrame) -> Result<(Vec<bool>, bool), DashboardError> {
    if df.get_column_names().contains(&ATTRITION_COLUMN) {
        Ok((attrition_flags(df)?, true))
    } else {
        Ok((vec![false; df.height()], false))
    }
}

/// Equal-width histogram of a numeric column. Nulls are skipped.
pub fn numeric_histogram(
    df: &DataFrame,
    feature: &str,
    n_bins: usize,
) -> Result<Histogram, DashboardError> {
    let series = feature_series(df, feature)?;
    if !series.dtype().is_numeric() {
        return Err(DashboardError::schema(format!(
            "column '{feature}' is not numeric ({})",
            series.dtype()
        )));
    }
    let n_bins = n_bins.max(1);
    let (flags, split_by_attrition) = split_flags(df)?;

    let values: Vec<(f64, bool)> = series
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .zip(flags)
        .filter_map(|(v, left)| v.filter(|v| v.is_finite()).map(|v| (v, left)))
        .collect();

    if values.is_empty() {
        return Ok(Histogram {
            feature: feature.to_string(),
            bins: Vec::new(),
            split_by_attrition,
        });
    }

    let min = values.iter().map(|(v, _)| *v).fold(f64::INFINITY, f64::min);
    let max = values.iter().map(|(v, _)| *v).fold(f64::NEG_INFINITY, f64::max);
    // A constant column still gets one bin of unit width
    let width = if max > min { (max - min) / n_bins as f64 } else { 1.0 };
    let n_bins = if max > min { n_bins } else { 1 };

    let mut bins: Vec<HistogramBin> = (0..n_bins)
        .map(|i| HistogramBin {
            lower: min + i as f64 * width,
            upper: min + (i + 1) as f64 * width,
            stayed: 0,
            left: 0,
        })
        .collect();

    for (value, left) in values {
        let idx = (((value - min) / width) as usize).min(n_bins - 1);
        if left {
            bins[idx].left += 1;
        } else {
            bins[idx].stayed += 1;
        }
    }

    Ok(Histogram {
        feature: feature.to_string(),
        bins,
        split_by_attrition,
    })
}

/// Row counts per category, split by attrition
pub fn category_counts(df: &DataFrame, feature: &str) -> Result<CategoryCounts, DashboardError> {
    let series = feature_series(df, feature)?;
    let (flags, split_by_attrition) = split_flags(df)?;

    let frame = DataFrame::new(vec![
        series.cast(&DataType::String)?.with_name("category"),
        Series::new("left", flags),
    ])?;

    let grouped = frame
        .lazy()
        .group_by_stable([col("category")])
        .agg([
            col("left").count().alias("total"),
            col("left").cast(DataType::UInt32).sum().alias("left"),
        ])
        .collect()?;

    let categories = grouped.column("category")?.str()?;
    let totals = grouped.column("total")?.cast(&DataType::UInt64)?;
    let lefts = grouped.column("left")?.cast(&DataType::UInt64)?;

    let rows = categories
        .into_iter()
        .zip(totals.u64()?.into_iter())
        .zip(lefts.u64()?.into_iter())
        .map(|((category, total), left)| {
            let total = total.unwrap_or(0) as usize;
            let left = left.unwrap_or(0) as usize;
            CategoryCount {
                category: category.unwrap_or("(missing)").to_string(),
                stayed: total - left,
                left,
            }
        })
        .collect();

    Ok(CategoryCounts {
        feature: feature.to_string(),
        rows,
        split_by_attrition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employees() -> DataFrame {
        df!(
            "Age" => &[22i64, 25, 31, 38, 45, 52],
            "OverTime" => &["Yes", "No", "Yes", "No", "No", "Yes"],
            "Attrition" => &["Yes", "Yes", "No", "No", "No", "Yes"]
        )
        .unwrap()
    }

    #[test]
    fn test_numeric_histogram() {
        let hist = numeric_histogram(&employees(), "Age", 3).unwrap();
        assert!(hist.split_by_attrition);
        assert_eq!(hist.bins.len(), 3);
        assert_eq!(hist.bins[0].lower, 22.0);
        assert_eq!(hist.bins[2].upper, 52.0);

        // bins of width 10: [22,32) [32,42) [42,52]
        let counts: Vec<_> = hist.bins.iter().map(|b| (b.stayed, b.left)).collect();
        assert_eq!(counts, vec![(1, 2), (1, 0), (1, 1)]);
        assert_eq!(hist.max_count(), 3);
    }

    #[test]
    fn test_constant_column_histogram() {
        let df = df!("Age" => &[30i64, 30, 30]).unwrap();
        let hist = numeric_histogram(&df, "Age", 10).unwrap();
        assert!(!hist.split_by_attrition);
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].stayed, 3);
    }

    #[test]
    fn test_category_counts() {
        let counts = category_counts(&employees(), "OverTime").unwrap();
        assert_eq!(
            counts.rows,
            vec![
                CategoryCount {
                    category: "Yes".into(),
                    stayed: 1,
                    left: 2
                },
                CategoryCount {
                    category: "No".into(),
                    stayed: 2,
                    left: 1
                },
            ]
        );
        assert_eq!(counts.max_count(), 2);
    }

    #[test]
    fn test_missing_feature_column() {
        let err = category_counts(&employees(), "JobRole").unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { .. }));

        let err = numeric_histogram(&employees(), "OverTime", 5).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { .. }));
    }
}
