//! Employee table loading and attrition aggregation using Polars

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use polars::prelude::*;
use tracing::debug;

use crate::error::{require_file, DashboardError};

/// Name of the target column in the employee table
pub const ATTRITION_COLUMN: &str = "Attrition";

/// Read a CSV artifact into a DataFrame.
///
/// A missing file maps to `ArtifactNotFound`; any parse failure maps to
/// `MalformedArtifact` so callers can tell the two apart.
pub fn read_csv(path: &Path) -> Result<DataFrame, DashboardError> {
    require_file(path)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| DashboardError::malformed(path, e))?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded csv artifact"
    );
    Ok(df)
}

/// Load the per-employee table
pub fn load_employee_data(path: &Path) -> Result<DataFrame, DashboardError> {
    let df = read_csv(path)?;
    if !df.get_column_names().contains(&ATTRITION_COLUMN) {
        debug!(path = %path.display(), "employee table has no attrition column");
    }
    Ok(df)
}

/// Returns true for the recognized attrition encodings: `"Yes"`, `"yes"` and
/// numeric 1 (`"1"`, `"1.0"`). Every other token reads as "No".
pub fn is_attrition_token(token: &str) -> bool {
    match token.trim() {
        "Yes" | "yes" => true,
        other => other.parse::<f64>().map_or(false, |v| v == 1.0),
    }
}

/// Per-row attrition flags for the employee table. Nulls read as "No".
pub fn attrition_flags(df: &DataFrame) -> Result<Vec<bool>, DashboardError> {
    let column = df.column(ATTRITION_COLUMN).map_err(|_| {
        DashboardError::schema(format!(
            "column '{ATTRITION_COLUMN}' is missing from the employee table"
        ))
    })?;

    // Boolean columns compare like numeric 1/0
    if column.dtype() == &DataType::Boolean {
        return Ok(column
            .bool()?
            .into_iter()
            .map(|v| v.unwrap_or(false))
            .collect());
    }

    let tokens = column.cast(&DataType::String)?;
    Ok(tokens
        .str()?
        .into_iter()
        .map(|v| v.map_or(false, is_attrition_token))
        .collect())
}

/// Headcount figures for the summary page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttritionSummary {
    pub total_count: usize,
    pub attrition_count: usize,
    /// Percentage rounded to 2 decimals, 0 for an empty table
    pub attrition_percentage: f64,
}

impl AttritionSummary {
    pub fn from_counts(total_count: usize, attrition_count: usize) -> Self {
        let attrition_percentage = if total_count > 0 {
            round_to(attrition_count as f64 / total_count as f64 * 100.0, 2)
        } else {
            0.0
        };

        Self {
            total_count,
            attrition_count,
            attrition_percentage,
        }
    }
}

/// Count employees and departures in the employee table
pub fn summarize_attrition(df: &DataFrame) -> Result<AttritionSummary, DashboardError> {
    let flags = attrition_flags(df)?;
    let attrition_count = flags.iter().filter(|&&left| left).count();
    Ok(AttritionSummary::from_counts(flags.len(), attrition_count))
}

/// Difference between the features a model was trained on and the columns
/// of the employee table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureCompatibility {
    /// Expected by the model but absent from the table
    pub missing: Vec<String>,
    /// Present in the table but unknown to the model
    pub unexpected: Vec<String>,
}

impl FeatureCompatibility {
    pub fn is_match(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

impl fmt::Display for FeatureCompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_match() {
            return write!(f, "features match");
        }

        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing: {}", self.missing.join(", ")));
        }
        if !self.unexpected.is_empty() {
            parts.push(format!("unexpected: {}", self.unexpected.join(", ")));
        }
        write!(f, "feature mismatch ({})", parts.join("; "))
    }
}

/// Compare model feature names against the table's non-target columns
pub fn check_feature_compatibility(df: &DataFrame, expected: &[String]) -> FeatureCompatibility {
    let current: BTreeSet<&str> = df
        .get_column_names()
        .into_iter()
        .filter(|name| *name != ATTRITION_COLUMN)
        .collect();
    let expected: BTreeSet<&str> = expected.iter().map(String::as_str).collect();

    FeatureCompatibility {
        missing: expected
            .difference(&current)
            .map(|s| s.to_string())
            .collect(),
        unexpected: current
            .difference(&expected)
            .map(|s| s.to_string())
            .collect(),
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Age,Department,MonthlyIncome,Attrition").unwrap();
        writeln!(file, "29,Sales,3200,Yes").unwrap();
        writeln!(file, "41,Research & Development,5400,No").unwrap();
        writeln!(file, "35,Sales,4100,No").unwrap();
        writeln!(file, "23,Human Resources,2100,Yes").unwrap();
        file
    }

    #[test]
    fn test_load_and_summarize() {
        let file = create_test_csv();
        let df = load_employee_data(file.path()).unwrap();
        assert_eq!(df.height(), 4);

        let summary = summarize_attrition(&df).unwrap();
        assert_eq!(summary.total_count, 4);
        assert_eq!(summary.attrition_count, 2);
        assert_eq!(summary.attrition_percentage, 50.0);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_employee_data(Path::new("no_such_employee_data.csv")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_encodings_agree() {
        let text = df!("Attrition" => &["Yes", "No", "No", "Yes", "No"]).unwrap();
        let binary = df!("Attrition" => &[1i64, 0, 0, 1, 0]).unwrap();
        let lower = df!("Attrition" => &["yes", "no", "no", "yes", "no"]).unwrap();
        let floats = df!("Attrition" => &[1.0f64, 0.0, 0.0, 1.0, 0.0]).unwrap();
        let flags = df!("Attrition" => &[true, false, false, true, false]).unwrap();

        for df in [&text, &binary, &lower, &floats, &flags] {
            let summary = summarize_attrition(df).unwrap();
            assert_eq!(summary.attrition_count, 2);
            assert_eq!(summary.attrition_percentage, 40.0);
        }
    }

    #[test]
    fn test_unrecognized_tokens_read_as_no() {
        let df = df!("Attrition" => &[Some("Y"), Some("left"), None, Some("Yes")]).unwrap();
        let summary = summarize_attrition(&df).unwrap();
        assert_eq!(summary.total_count, 4);
        assert_eq!(summary.attrition_count, 1);
    }

    #[test]
    fn test_empty_table_has_zero_percentage() {
        let df = df!("Attrition" => Vec::<&str>::new()).unwrap();
        let summary = summarize_attrition(&df).unwrap();
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.attrition_percentage, 0.0);
    }

    #[test]
    fn test_percentage_rounding() {
        let summary = AttritionSummary::from_counts(3, 1);
        assert_eq!(summary.attrition_percentage, 33.33);
    }

    #[test]
    fn test_missing_attrition_column() {
        let df = df!("Age" => &[30i64, 40]).unwrap();
        let err = summarize_attrition(&df).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_feature_compatibility() {
        let df = df!(
            "Age" => &[30i64],
            "OverTime" => &["Yes"],
            "Attrition" => &["No"]
        )
        .unwrap();

        let exact = check_feature_compatibility(&df, &["Age".into(), "OverTime".into()]);
        assert!(exact.is_match());
        assert_eq!(exact.to_string(), "features match");

        let diff = check_feature_compatibility(&df, &["Age".into(), "MonthlyIncome".into()]);
        assert_eq!(diff.missing, vec!["MonthlyIncome".to_string()]);
        assert_eq!(diff.unexpected, vec!["OverTime".to_string()]);
        assert_eq!(
            diff.to_string(),
            "feature mismatch (missing: MonthlyIncome; unexpected: OverTime)"
        );
    }
}
