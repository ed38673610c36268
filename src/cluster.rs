//! Cluster summary table: loading, schema inference, relabeling and KPIs
//!
//! The summary artifact holds one precomputed row per cluster. It is read
//! with Polars, normalized so the identifier lives in a `Cluster` column, and
//! then converted into a typed [`ClusterSummary`] whose column schema is
//! inferred once at load time.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, warn};

use crate::data::read_csv;
use crate::error::DashboardError;

/// Identifier column name after normalization
pub const CLUSTER_COLUMN: &str = "Cluster";
pub const SIZE_COLUMN: &str = "cluster_size";
pub const ATTRITION_PROPORTION_COLUMN: &str = "attrition_proportion";

/// Columns that describe the cluster rather than its members
const RESERVED_COLUMNS: [&str; 4] = [
    CLUSTER_COLUMN,
    "cluster_id",
    SIZE_COLUMN,
    ATTRITION_PROPORTION_COLUMN,
];

/// Identifier headers searched in priority order
const ID_HEADERS: [&str; 2] = ["cluster_id", "cluster"];

/// Header names under which a serialized row index shows up in a CSV
const INDEX_HEADERS: [&str; 4] = ["", "index", "Unnamed: 0", "__index_level_0__"];

/// Make sure the table carries its identifier in a column named `Cluster`.
///
/// An explicit `Cluster` column wins. Next comes a `cluster_id` or `cluster`
/// column anywhere in the header (case-insensitive), then a leading index
/// column with an unnamed or `index` header. Failing all of these, the row
/// position `0..N` becomes the identifier.
pub fn ensure_cluster_column(mut df: DataFrame) -> Result<DataFrame, DashboardError> {
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    if !names.iter().any(|name| name == CLUSTER_COLUMN) {
        let named = ID_HEADERS.iter().find_map(|wanted| {
            names.iter().find(|name| name.eq_ignore_ascii_case(wanted))
        });
        let leading_index = names
            .first()
            .filter(|first| INDEX_HEADERS.contains(&first.as_str()));

        match (named, leading_index) {
            (Some(column), index) => {
                if let Some(index) = index {
                    debug!(column = %index, "dropping serialized row index");
                    df.drop_in_place(index)?;
                }
                debug!(column = %column, "promoting identifier column to {CLUSTER_COLUMN}");
                df.rename(column, CLUSTER_COLUMN)?;
            }
            (None, Some(first)) => {
                debug!(column = %first, "promoting index column to {CLUSTER_COLUMN}");
                df.rename(first, CLUSTER_COLUMN)?;
            }
            (None, None) => {
                debug!("summary table has no identifier column, using row index");
                let index: Vec<i64> = (0..df.height() as i64).collect();
                df.insert_column(0, Series::new(CLUSTER_COLUMN, index))?;
            }
        }
    }

    let unique = df.column(CLUSTER_COLUMN)?.n_unique()?;
    if unique != df.height() {
        return Err(DashboardError::schema(format!(
            "{CLUSTER_COLUMN} column holds {unique} distinct values for {} rows",
            df.height()
        )));
    }

    Ok(df)
}

/// Cluster identifier: a raw integer from the segmentation or a display label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClusterId {
    Index(i64),
    Label(String),
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterId::Index(index) => write!(f, "{index}"),
            ClusterId::Label(label) => f.write_str(label),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// One entry of the feature schema, inferred once when the table is loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Numeric,
        }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Categorical,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
    Missing,
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Numeric(v) => Some(*v),
            _ => None,
        }
    }
}

/// One precomputed cluster profile
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRow {
    pub cluster_id: ClusterId,
    pub cluster_size: u64,
    pub attrition_proportion: f64,
    /// Values parallel to [`ClusterSummary::features`]
    pub values: Vec<FeatureValue>,
}

/// Typed cluster-summary table with unique identifiers
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    features: Vec<ColumnSpec>,
    rows: Vec<ClusterRow>,
}

impl ClusterSummary {
    pub fn new(features: Vec<ColumnSpec>, rows: Vec<ClusterRow>) -> Result<Self, DashboardError> {
        let mut seen = HashSet::new();
        for row in &rows {
            if row.values.len() != features.len() {
                return Err(DashboardError::schema(format!(
                    "cluster {} has {} feature values, schema declares {}",
                    row.cluster_id,
                    row.values.len(),
                    features.len()
                )));
            }
            if !seen.insert(row.cluster_id.to_string()) {
                return Err(DashboardError::schema(format!(
                    "duplicate cluster id '{}'",
                    row.cluster_id
                )));
            }
        }

        Ok(Self { features, rows })
    }

    /// Build the typed table from a frame that passed [`ensure_cluster_column`]
    pub fn from_frame(df: &DataFrame) -> Result<Self, DashboardError> {
        let ids = cluster_ids(df.column(CLUSTER_COLUMN)?)?;
        let sizes = required_f64(df, SIZE_COLUMN)?;
        let proportions = required_f64(df, ATTRITION_PROPORTION_COLUMN)?;

        let mut features = Vec::new();
        let mut columns = Vec::new();
        for series in df.get_columns() {
            if RESERVED_COLUMNS.contains(&series.name()) {
                continue;
            }
            let (spec, values) = feature_column(series)?;
            features.push(spec);
            columns.push(values);
        }

        let mut rows = Vec::with_capacity(df.height());
        for (i, cluster_id) in ids.into_iter().enumerate() {
            let size = sizes[i].ok_or_else(|| {
                DashboardError::schema(format!("cluster {cluster_id} has no {SIZE_COLUMN}"))
            })?;
            if size < 0.0 {
                return Err(DashboardError::schema(format!(
                    "cluster {cluster_id} has negative {SIZE_COLUMN} {size}"
                )));
            }
            let proportion = proportions[i].ok_or_else(|| {
                DashboardError::schema(format!(
                    "cluster {cluster_id} has no {ATTRITION_PROPORTION_COLUMN}"
                ))
            })?;
            if !(0.0..=1.0).contains(&proportion) {
                warn!(cluster = %cluster_id, proportion, "attrition proportion outside [0, 1]");
            }

            rows.push(ClusterRow {
                cluster_id,
                cluster_size: size.round() as u64,
                attrition_proportion: proportion,
                values: columns.iter().map(|column| column[i].clone()).collect(),
            });
        }

        Self::new(features, rows)
    }

    pub fn features(&self) -> &[ColumnSpec] {
        &self.features
    }

    pub fn rows(&self) -> &[ClusterRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cluster_ids(&self) -> Vec<ClusterId> {
        self.rows.iter().map(|row| row.cluster_id.clone()).collect()
    }

    /// Find a row by its displayed identifier
    pub fn find(&self, selected: &str) -> Result<&ClusterRow, DashboardError> {
        self.rows
            .iter()
            .find(|row| row.cluster_id.to_string() == selected)
            .ok_or_else(|| DashboardError::ClusterNotFound {
                id: selected.to_string(),
            })
    }
}

/// Read, normalize and type the cluster-summary artifact
pub fn load_cluster_summary(path: &Path) -> Result<ClusterSummary, DashboardError> {
    let df = ensure_cluster_column(read_csv(path)?)?;
    let summary = ClusterSummary::from_frame(&df)?;
    debug!(
        path = %path.display(),
        clusters = summary.len(),
        features = summary.features().len(),
        "loaded cluster summary"
    );
    Ok(summary)
}

fn cluster_ids(series: &Series) -> Result<Vec<ClusterId>, DashboardError> {
    let integral = series.dtype().is_integer()
        || (series.dtype().is_float() && holds_whole_numbers(series)?);

    if integral {
        let values = series.cast(&DataType::Int64)?;
        values
            .i64()?
            .into_iter()
            .map(|v| {
                v.map(ClusterId::Index)
                    .ok_or_else(|| DashboardError::schema("null cluster identifier"))
            })
            .collect()
    } else {
        let values = series.cast(&DataType::String)?;
        values
            .str()?
            .into_iter()
            .map(|v| {
                v.map(|label| ClusterId::Label(label.to_string()))
                    .ok_or_else(|| DashboardError::schema("null cluster identifier"))
            })
            .collect()
    }
}

/// Float columns like `0.0, 1.0` still carry integer ids
fn holds_whole_numbers(series: &Series) -> Result<bool, DashboardError> {
    let values = series.cast(&DataType::Float64)?;
    let whole = values
        .f64()?
        .into_iter()
        .flatten()
        .all(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64);
    Ok(whole)
}

fn required_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, DashboardError> {
    let series = df
        .column(name)
        .map_err(|_| DashboardError::schema(format!("cluster summary lacks column '{name}'")))?;
    if !series.dtype().is_numeric() {
        return Err(DashboardError::schema(format!(
            "column '{name}' must be numeric, found {}",
            series.dtype()
        )));
    }
    Ok(series.cast(&DataType::Float64)?.f64()?.into_iter().collect())
}

fn feature_column(series: &Series) -> Result<(ColumnSpec, Vec<FeatureValue>), DashboardError> {
    if series.dtype().is_numeric() {
        let values = series
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.map_or(FeatureValue::Missing, FeatureValue::Numeric))
            .collect();
        Ok((ColumnSpec::numeric(series.name()), values))
    } else {
        let values = series
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.map_or(FeatureValue::Missing, |s| FeatureValue::Categorical(s.to_string())))
            .collect();
        Ok((ColumnSpec::categorical(series.name()), values))
    }
}

/// Maps integer cluster ids to display labels.
///
/// Ids outside the mapping fall back to their decimal string, so the mapping
/// is total. Labels are never remapped, which makes [`ClusterLabeler::apply`]
/// idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterLabeler {
    mapping: BTreeMap<i64, String>,
}

impl Default for ClusterLabeler {
    fn default() -> Self {
        Self::from_labels(["A", "B"])
    }
}

impl ClusterLabeler {
    /// Assign labels to ids `0, 1, 2, ...` in order
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mapping = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| (i as i64, label.into()))
            .collect();
        Self { mapping }
    }

    pub fn label(&self, id: &ClusterId) -> ClusterId {
        match id {
            ClusterId::Index(index) => ClusterId::Label(
                self.mapping
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| index.to_string()),
            ),
            ClusterId::Label(_) => id.clone(),
        }
    }

    pub fn apply(&self, summary: &ClusterSummary) -> Result<ClusterSummary, DashboardError> {
        let rows = summary
            .rows
            .iter()
            .map(|row| ClusterRow {
                cluster_id: self.label(&row.cluster_id),
                ..row.clone()
            })
            .collect();
        ClusterSummary::new(summary.features.clone(), rows)
    }
}

/// Headline figures for the cluster page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterKpis {
    pub total_employees: u64,
    pub n_clusters: usize,
    /// Unweighted mean of the per-cluster attrition proportions
    pub avg_attrition: f64,
    /// Population-weighted attrition rate, shown for comparison only
    pub weighted_attrition: f64,
}

pub fn cluster_kpis(summary: &ClusterSummary) -> ClusterKpis {
    let rows = summary.rows();
    let total_employees: u64 = rows.iter().map(|row| row.cluster_size).sum();

    let avg_attrition = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|row| row.attrition_proportion).sum::<f64>() / rows.len() as f64
    };

    let weighted_attrition = if total_employees == 0 {
        0.0
    } else {
        rows.iter()
            .map(|row| row.attrition_proportion * row.cluster_size as f64)
            .sum::<f64>()
            / total_employees as f64
    };

    ClusterKpis {
        total_employees,
        n_clusters: rows.len(),
        avg_attrition,
        weighted_attrition,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn two_clusters() -> ClusterSummary {
        let df = df!(
            "cluster_size" => &[120i64, 80],
            "attrition_proportion" => &[0.35f64, 0.10],
            "Age" => &[29.0f64, 41.0],
            "Department" => &["Sales", "Research & Development"]
        )
        .unwrap();
        ClusterSummary::from_frame(&ensure_cluster_column(df).unwrap()).unwrap()
    }

    #[test]
    fn test_row_index_becomes_cluster_column() {
        let df = df!(
            "cluster_size" => &[10i64, 20, 30],
            "attrition_proportion" => &[0.1f64, 0.2, 0.3]
        )
        .unwrap();

        let df = ensure_cluster_column(df).unwrap();
        let cluster = df.column(CLUSTER_COLUMN).unwrap();
        assert_eq!(cluster.len(), 3);
        assert_eq!(cluster.n_unique().unwrap(), 3);
        assert_eq!(df.get_column_names()[0], CLUSTER_COLUMN);
    }

    #[test]
    fn test_explicit_cluster_column_is_kept() {
        let df = df!(
            "cluster_size" => &[10i64, 20],
            "Cluster" => &["A", "B"],
            "attrition_proportion" => &[0.1f64, 0.2]
        )
        .unwrap();

        let df = ensure_cluster_column(df).unwrap();
        assert_eq!(df.width(), 3);
        let summary = ClusterSummary::from_frame(&df).unwrap();
        assert_eq!(
            summary.cluster_ids(),
            vec![ClusterId::Label("A".into()), ClusterId::Label("B".into())]
        );
    }

    #[test]
    fn test_named_index_is_promoted() {
        let df = df!(
            "cluster" => &[0i64, 1],
            "cluster_size" => &[10i64, 20],
            "attrition_proportion" => &[0.1f64, 0.2]
        )
        .unwrap();

        let df = ensure_cluster_column(df).unwrap();
        assert!(df.column(CLUSTER_COLUMN).is_ok());
        assert!(df.column("cluster").is_err());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let df = df!(
            "Cluster" => &[0i64, 0],
            "cluster_size" => &[10i64, 20],
            "attrition_proportion" => &[0.1f64, 0.2]
        )
        .unwrap();

        let err = ensure_cluster_column(df).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_schema_inference() {
        let summary = two_clusters();
        assert_eq!(
            summary.features(),
            &[
                ColumnSpec::numeric("Age"),
                ColumnSpec::categorical("Department")
            ]
        );
        assert_eq!(summary.rows()[0].cluster_id, ClusterId::Index(0));
        assert_eq!(summary.rows()[1].cluster_size, 80);
    }

    #[test]
    fn test_missing_size_column() {
        let df = df!(
            "Cluster" => &[0i64, 1],
            "attrition_proportion" => &[0.1f64, 0.2]
        )
        .unwrap();

        let err = ClusterSummary::from_frame(&df).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_load_csv_with_index_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "index,cluster_size,attrition_proportion,Age").unwrap();
        writeln!(file, "0,120,0.35,29").unwrap();
        writeln!(file, "1,80,0.10,41").unwrap();

        let summary = load_cluster_summary(file.path()).unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.features(), &[ColumnSpec::numeric("Age")]);
        assert!(summary.find("1").is_ok());
    }

    #[test]
    fn test_find_unknown_cluster() {
        let err = two_clusters().find("Z").unwrap_err();
        assert!(matches!(err, DashboardError::ClusterNotFound { ref id } if id == "Z"));
    }

    #[test]
    fn test_labeler_is_idempotent() {
        let labeler = ClusterLabeler::default();
        let once = labeler.apply(&two_clusters()).unwrap();
        let twice = labeler.apply(&once).unwrap();

        assert_eq!(once, twice);
        assert_eq!(
            once.cluster_ids(),
            vec![ClusterId::Label("A".into()), ClusterId::Label("B".into())]
        );
    }

    #[test]
    fn test_labeler_falls_back_to_number() {
        let labeler = ClusterLabeler::default();
        assert_eq!(labeler.label(&ClusterId::Index(2)), ClusterId::Label("2".into()));
        assert_eq!(
            labeler.label(&ClusterId::Label("Core".into())),
            ClusterId::Label("Core".into())
        );
    }

    #[test]
    fn test_labeler_rejects_collisions() {
        let labeler = ClusterLabeler::from_labels(["1"]);
        let err = labeler.apply(&two_clusters()).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_cluster_kpis() {
        let kpis = cluster_kpis(&two_clusters());
        assert_eq!(kpis.total_employees, 200);
        assert_eq!(kpis.n_clusters, 2);
        assert!((kpis.avg_attrition - 0.225).abs() < 1e-12);
        assert!((kpis.weighted_attrition - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_kpis_of_empty_table() {
        let summary = ClusterSummary::new(Vec::new(), Vec::new()).unwrap();
        let kpis = cluster_kpis(&summary);
        assert_eq!(kpis.total_employees, 0);
        assert_eq!(kpis.avg_attrition, 0.0);
        assert_eq!(kpis.weighted_attrition, 0.0);
    }

    #[test]
    fn test_cluster_id_column_anywhere_in_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "cluster_size,attrition_proportion,cluster_id,Age").unwrap();
        writeln!(file, "120,0.35,Flight Risk,29").unwrap();
        writeln!(file, "80,0.10,Veterans,41").unwrap();

        let summary = load_cluster_summary(file.path()).unwrap();
        assert_eq!(
            summary.cluster_ids(),
            vec![
                ClusterId::Label("Flight Risk".into()),
                ClusterId::Label("Veterans".into())
            ]
        );
        assert_eq!(summary.features(), &[ColumnSpec::numeric("Age")]);
        assert_eq!(summary.find("Flight Risk").unwrap().cluster_size, 120);
    }

    #[test]
    fn test_cluster_id_wins_over_leading_index() {
        let df = df!(
            "Unnamed: 0" => &[0i64, 1],
            "cluster_size" => &[10i64, 20],
            "attrition_proportion" => &[0.1f64, 0.2],
            "CLUSTER_ID" => &[7i64, 9]
        )
        .unwrap();

        let df = ensure_cluster_column(df).unwrap();
        assert!(df.column("Unnamed: 0").is_err());
        let summary = ClusterSummary::from_frame(&df).unwrap();
        assert_eq!(summary.cluster_ids(), vec![ClusterId::Index(7), ClusterId::Index(9)]);
        assert!(summary.features().is_empty());
    }

    #[test]
    fn test_float_ids_are_integers() {
        let df = df!(
            "Cluster" => &[0.0f64, 1.0],
            "cluster_size" => &[10i64, 20],
            "attrition_proportion" => &[0.1f64, 0.2]
        )
        .unwrap();

        let summary = ClusterSummary::from_frame(&df).unwrap();
        assert_eq!(summary.cluster_ids(), vec![ClusterId::Index(0), ClusterId::Index(1)]);
        let labeled = ClusterLabeler::default().apply(&summary).unwrap();
        assert!(labeled.find("B").is_ok());
    }

    #[test]
    fn test_fractional_float_ids_stay_labels() {
        let df = df!(
            "Cluster" => &[0.5f64, 1.0],
            "cluster_size" => &[10i64, 20],
            "attrition_proportion" => &[0.1f64, 0.2]
        )
        .unwrap();

        let summary = ClusterSummary::from_frame(&df).unwrap();
        assert!(matches!(summary.rows()[0].cluster_id, ClusterId::Label(_)));
    }

    #[test]
    fn test_null_size_or_proportion_is_rejected() {
        let df = df!(
            "Cluster" => &[0i64, 1],
            "cluster_size" => &[Some(10i64), None],
            "attrition_proportion" => &[0.1f64, 0.2]
        )
        .unwrap();
        let err = ClusterSummary::from_frame(&df).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { .. }));

        let df = df!(
            "Cluster" => &[0i64, 1],
            "cluster_size" => &[10i64, 20],
            "attrition_proportion" => &[None, Some(0.2f64)]
        )
        .unwrap();
        let err = ClusterSummary::from_frame(&df).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { .. }));
    }

    fn frame_of_height(n: usize) -> DataFrame {
        let sizes: Vec<i64> = (0..n as i64).map(|i| 10 + i).collect();
        let proportions: Vec<f64> = (0..n).map(|i| (i % 10) as f64 / 10.0).collect();
        df!(
            "cluster_size" => sizes,
            "attrition_proportion" => proportions
        )
        .unwrap()
    }

    proptest! {
        #[test]
        fn synthesized_ids_are_unique(n in 1usize..50) {
            let df = ensure_cluster_column(frame_of_height(n)).unwrap();
            let cluster = df.column(CLUSTER_COLUMN).unwrap();
            prop_assert_eq!(cluster.len(), n);
            prop_assert_eq!(cluster.n_unique().unwrap(), n);
        }

        #[test]
        fn index_column_ids_are_unique(
            ids in prop::collection::hash_set(-1_000_000i64..1_000_000, 1..50),
            header in prop::sample::select(vec!["", "index", "Unnamed: 0", "cluster"]),
        ) {
            let ids: Vec<i64> = ids.into_iter().collect();
            let mut df = frame_of_height(ids.len());
            df.insert_column(0, Series::new(header, ids.clone())).unwrap();

            let df = ensure_cluster_column(df).unwrap();
            prop_assert_eq!(df.width(), 3);
            let summary = ClusterSummary::from_frame(&df).unwrap();
            let expected: Vec<ClusterId> = ids.into_iter().map(ClusterId::Index).collect();
            prop_assert_eq!(summary.cluster_ids(), expected);
        }

        #[test]
        fn labeling_is_idempotent(
            ids in prop::collection::hash_set(-1000i64..1000, 0..30),
            n_labels in 0usize..5,
        ) {
            let rows = ids
                .into_iter()
                .map(|id| ClusterRow {
                    cluster_id: ClusterId::Index(id),
                    cluster_size: 1,
                    attrition_proportion: 0.0,
                    values: Vec::new(),
                })
                .collect();
            let summary = ClusterSummary::new(Vec::new(), rows).unwrap();
            let labeler = ClusterLabeler::from_labels(["A", "B", "C", "D", "E"].into_iter().take(n_labels));

            let once = labeler.apply(&summary).unwrap();
            let twice = labeler.apply(&once).unwrap();
            prop_assert_eq!(once.len(), summary.len());
            prop_assert_eq!(once, twice);
        }
    }
}
