//! Classifier evaluation bundle: report shaping, confusion matrix and ROC
//!
//! The bundle is produced offline next to the trained model. No inference
//! happens here; every figure is derived from the stored results.

use std::path::Path;

use ndarray::Array2;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::data::{is_attrition_token, round_to};
use crate::error::{require_file, DashboardError};

/// Report keys that aggregate over classes
pub const AGGREGATE_KEYS: [&str; 3] = ["accuracy", "macro avg", "weighted avg"];

/// Stored evaluation results. Every member is optional and only disables
/// its own view when absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluationBundle {
    #[serde(default)]
    pub confusion_matrix: Option<Vec<Vec<u64>>>,
    #[serde(default)]
    pub y_true: Option<Vec<Value>>,
    #[serde(default)]
    pub y_prob: Option<Vec<f64>>,
    #[serde(default)]
    pub classification_report: Option<ClassificationReport>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl EvaluationBundle {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn confusion(&self) -> Option<Result<ConfusionMatrix, DashboardError>> {
        self.confusion_matrix
            .as_ref()
            .map(|grid| ConfusionMatrix::from_rows(grid))
    }

    /// ROC curve when both label and score vectors are present
    pub fn roc(&self) -> Option<Result<RocCurve, DashboardError>> {
        let (labels, scores) = (self.y_true.as_ref()?, self.y_prob.as_ref()?);
        let labels: Vec<bool> = labels.iter().map(label_is_positive).collect();
        Some(RocCurve::from_scores(&labels, scores))
    }
}

/// Load the JSON evaluation bundle
pub fn load_evaluation(path: &Path) -> Result<EvaluationBundle, DashboardError> {
    require_file(path)?;
    let text = std::fs::read_to_string(path).map_err(|e| DashboardError::malformed(path, e))?;
    let bundle = EvaluationBundle::from_json(&text).map_err(|e| DashboardError::malformed(path, e))?;
    debug!(
        path = %path.display(),
        has_report = bundle.classification_report.is_some(),
        has_roc = bundle.y_true.is_some() && bundle.y_prob.is_some(),
        "loaded evaluation bundle"
    );
    Ok(bundle)
}

fn label_is_positive(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => is_attrition_token(s),
        _ => false,
    }
}

/// Per-class metrics as written by the report generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ClassMetrics {
    #[serde(default)]
    pub precision: f64,
    #[serde(default)]
    pub recall: f64,
    #[serde(default, rename = "f1-score")]
    pub f1_score: f64,
    #[serde(default)]
    pub support: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReportEntry {
    Scalar(f64),
    Metrics(ClassMetrics),
}

/// Classification report keyed by class label plus the aggregate rows,
/// kept in the order the report generator wrote them
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ClassificationReport(Vec<(String, ReportEntry)>);

impl TryFrom<Map<String, Value>> for ClassificationReport {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        map.into_iter()
            .map(|(label, value)| Ok((label, serde_json::from_value(value)?)))
            .collect::<Result<Vec<_>, serde_json::Error>>()
            .map(Self)
    }
}

/// Headline figures of a classification report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportHeadline {
    pub accuracy: f64,
    pub macro_f1: f64,
    pub weighted_f1: f64,
}

/// One per-class row of the detailed table, rounded for display
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRow {
    pub label: String,
    pub metrics: ClassMetrics,
}

impl ClassificationReport {
    fn get(&self, key: &str) -> Option<&ReportEntry> {
        self.0
            .iter()
            .find(|(label, _)| label == key)
            .map(|(_, entry)| entry)
    }

    /// Accuracy and the two averaged F1 scores; absent keys read as 0
    pub fn headline(&self) -> ReportHeadline {
        let accuracy = match self.get("accuracy") {
            Some(ReportEntry::Scalar(v)) => *v,
            _ => 0.0,
        };

        ReportHeadline {
            accuracy,
            macro_f1: self.f1_of("macro avg"),
            weighted_f1: self.f1_of("weighted avg"),
        }
    }

    fn f1_of(&self, key: &str) -> f64 {
        match self.get(key) {
            Some(ReportEntry::Metrics(m)) => m.f1_score,
            _ => 0.0,
        }
    }

    /// Per-class rows with the aggregate rows removed
    pub fn class_rows(&self) -> Vec<ClassRow> {
        self.0
            .iter()
            .filter(|(label, _)| !AGGREGATE_KEYS.contains(&label.as_str()))
            .filter_map(|(label, entry)| match entry {
                ReportEntry::Metrics(m) => Some(ClassRow {
                    label: label.clone(),
                    metrics: ClassMetrics {
                        precision: round_to(m.precision, 3),
                        recall: round_to(m.recall, 3),
                        f1_score: round_to(m.f1_score, 3),
                        support: round_to(m.support, 3),
                    },
                }),
                ReportEntry::Scalar(_) => None,
            })
            .collect()
    }
}

/// Actual classes on rows, predicted classes on columns
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    pub counts: Array2<u64>,
    pub labels: Vec<String>,
}

impl ConfusionMatrix {
    pub fn from_rows(rows: &[Vec<u64>]) -> Result<Self, DashboardError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if n_rows == 0 || n_cols == 0 {
            return Err(DashboardError::schema("confusion matrix is empty"));
        }
        if let Some(bad) = rows.iter().position(|row| row.len() != n_cols) {
            return Err(DashboardError::schema(format!(
                "confusion matrix row {bad} has {} cells, expected {n_cols}",
                rows[bad].len()
            )));
        }

        let flat: Vec<u64> = rows.iter().flatten().copied().collect();
        let counts = Array2::from_shape_vec((n_rows, n_cols), flat)
            .map_err(|e| DashboardError::schema(e.to_string()))?;

        let labels = if n_rows == 2 && n_cols == 2 {
            vec!["No".to_string(), "Yes".to_string()]
        } else {
            (0..n_rows.max(n_cols)).map(|i| i.to_string()).collect()
        };

        Ok(Self { counts, labels })
    }

    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    /// Share of the diagonal, 0 for an all-zero matrix
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.diag().sum() as f64 / total as f64
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Receiver operating characteristic over every distinct score threshold
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    /// `(false positive rate, true positive rate)` from (0, 0) to (1, 1)
    pub points: Vec<(f64, f64)>,
    pub auc: f64,
}

impl RocCurve {
    pub fn from_scores(labels: &[bool], scores: &[f64]) -> Result<Self, DashboardError> {
        if labels.len() != scores.len() {
            return Err(DashboardError::schema(format!(
                "ROC inputs differ in length: {} labels, {} scores",
                labels.len(),
                scores.len()
            )));
        }

        let positives = labels.iter().filter(|&&l| l).count();
        let negatives = labels.len() - positives;
        if positives == 0 || negatives == 0 {
            return Err(DashboardError::schema(
                "ROC curve needs both positive and negative labels",
            ));
        }

        let mut pairs: Vec<(f64, bool)> = scores.iter().copied().zip(labels.iter().copied()).collect();
        pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut points = vec![(0.0, 0.0)];
        let (mut tp, mut fp) = (0usize, 0usize);
        for (i, &(score, positive)) in pairs.iter().enumerate() {
            if positive {
                tp += 1;
            } else {
                fp += 1;
            }
            // Emit once per threshold, after all tied scores are counted
            let last_of_threshold = pairs.get(i + 1).map_or(true, |next| next.0 != score);
            if last_of_threshold {
                points.push((fp as f64 / negatives as f64, tp as f64 / positives as f64));
            }
        }

        let auc = points
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[1].1 + w[0].1) / 2.0)
            .sum();

        Ok(Self { points, auc })
    }
}
