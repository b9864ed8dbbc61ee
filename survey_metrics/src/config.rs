// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One raw survey cell, before any aggregation.
///
/// Missing values are representable and are excluded from every aggregate.
/// They are never treated as zero.
#[derive(PartialEq, Debug, Clone)]
pub enum Datum {
    Number(f64),
    /// Free-form content. It may still carry a numeric value (codes are often
    /// exported as text) and is coerced on demand.
    Text(String),
    Missing,
}

impl Datum {
    /// Numeric coercion: numbers pass through, text is parsed if possible,
    /// everything else counts as missing.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(x) => Some(*x),
            Datum::Text(s) => s.trim().parse::<f64>().ok(),
            Datum::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Datum::Missing)
    }

    /// The textual form used for entity labels (segment values, brand codes).
    /// Whole numbers drop their fractional part so that `1.0` reads as `"1"`.
    pub fn label(&self) -> Option<String> {
        match self {
            Datum::Number(x) if x.fract() == 0.0 => Some(format!("{}", *x as i64)),
            Datum::Number(x) => Some(format!("{}", x)),
            Datum::Text(s) => Some(s.trim().to_string()),
            Datum::Missing => None,
        }
    }
}

/// A rectangular response table: one row per respondent, one column per
/// question or sub-question. Column names are lower-cased on entry.
///
/// Use [crate::builder::Builder] to assemble one row by row.
#[derive(PartialEq, Debug, Clone)]
pub struct ResponseTable {
    pub(crate) columns: Vec<String>,
    // One vector per column, all of length num_rows.
    pub(crate) data: Vec<Vec<Datum>>,
    pub(crate) num_rows: usize,
}

impl ResponseTable {
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn column(&self, name: &str) -> Option<&[Datum]> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(&self.data[idx])
    }

    /// The number of cells in a column that carry a usable numeric value.
    pub fn valid_count(&self, name: &str) -> u64 {
        match self.column(name) {
            Some(col) => col.iter().filter(|d| d.as_number().is_some()).count() as u64,
            None => 0,
        }
    }

    /// Appends a column. The name is lower-cased like the original ones.
    pub fn add_column(&mut self, name: &str, values: Vec<Datum>) -> Result<(), MetricsError> {
        if values.len() != self.num_rows {
            return Err(MetricsError::ShapeMismatch {
                expected: self.num_rows,
                actual: values.len(),
            });
        }
        self.columns.push(name.to_lowercase());
        self.data.push(values);
        Ok(())
    }

    /// A new table keeping only the rows marked in `keep`. The mask must
    /// cover every row.
    pub fn filter_rows(&self, keep: &[bool]) -> ResponseTable {
        let data: Vec<Vec<Datum>> = self
            .data
            .iter()
            .map(|col| {
                col.iter()
                    .zip(keep.iter())
                    .filter_map(|(d, k)| if *k { Some(d.clone()) } else { None })
                    .collect()
            })
            .collect();
        let num_rows = keep.iter().filter(|k| **k).count();
        ResponseTable {
            columns: self.columns.clone(),
            data,
            num_rows,
        }
    }
}

// ******** Output data structures *********

/// One row per entity (a paper, a segment value, a section number), one
/// column per brand/question. Scores are percentages or NPS points.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoresTable {
    /// Name of the entity column when the table is rendered (`Paper`,
    /// `Segment`, `Question`, `Q No.`).
    pub entity_label: String,
    pub entities: Vec<String>,
    pub columns: Vec<String>,
    /// Row-major: `values[row][column]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl ScoresTable {
    pub fn get(&self, row: usize, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values[row][idx]
    }
}

/// The non-missing observation counts backing a [ScoresTable], with the same
/// row/column shape.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct BaseCounts {
    pub columns: Vec<String>,
    /// Row-major, aligned with the entities of the paired scores table.
    pub counts: Vec<Vec<Option<u64>>>,
}

impl BaseCounts {
    /// A column absent from the base table reads as a base count of zero.
    pub fn get(&self, row: usize, column: &str) -> Option<u64> {
        match self.columns.iter().position(|c| c == column) {
            Some(idx) => self.counts[row][idx],
            None => Some(0),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Verdict {
    Significant,
    NotSignificant,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Significant => write!(f, "Significant"),
            Verdict::NotSignificant => write!(f, "Not Significant"),
        }
    }
}

/// Outcome of the two-proportion z-test.
#[derive(PartialEq, Debug, Clone)]
pub struct SigTest {
    /// Standard error, rounded to 2 decimals.
    pub se: f64,
    /// Z-statistic rounded to 2 decimals, or None when the standard error
    /// vanishes.
    pub z: Option<f64>,
    pub verdict: Verdict,
}

/// Rendered label for a suppressed comparison (both base sizes considered).
pub const LOW_BASE_LABEL: &str = "LB";
/// Rendered label for a comparison with a missing score or an empty base.
pub const INSUFFICIENT_BASE_LABEL: &str = "Insufficient base";

/// One annotated comparison cell. The three rendered columns (difference,
/// z-score, significance) are all derived from this single value, so they can
/// never disagree.
#[derive(PartialEq, Debug, Clone)]
pub enum ComparisonCell {
    /// One or both base counts below the minimum reportable size, or missing.
    LowBase,
    /// A missing score, or a base count of exactly zero.
    InsufficientBase,
    Tested {
        /// `reference - comparison`, rounded to 2 decimals.
        diff: f64,
        z: Option<f64>,
        verdict: Verdict,
    },
}

/// The comparison cells of one non-reference column against the reference,
/// one cell per entity row.
#[derive(PartialEq, Debug, Clone)]
pub struct ComparisonBlock {
    pub reference: String,
    pub comparison: String,
    pub cells: Vec<ComparisonCell>,
}

/// A scores table extended with one comparison block per non-reference
/// column. Rendering each block as three columns keeps the column-count
/// invariant: 3 x (number of non-reference columns) extra columns.
#[derive(PartialEq, Debug, Clone)]
pub struct AnnotatedTable {
    pub scores: ScoresTable,
    pub comparisons: Vec<ComparisonBlock>,
}

impl AnnotatedTable {
    /// An empty result means "nothing to display", not an error.
    pub fn is_empty(&self) -> bool {
        self.entities().is_empty()
    }

    pub fn entities(&self) -> &[String] {
        &self.scores.entities
    }

    pub fn derived_column_count(&self) -> usize {
        3 * self.comparisons.len()
    }

    pub(crate) fn empty(entity_label: &str) -> AnnotatedTable {
        AnnotatedTable {
            scores: ScoresTable {
                entity_label: entity_label.to_string(),
                entities: Vec::new(),
                columns: Vec::new(),
                values: Vec::new(),
            },
            comparisons: Vec::new(),
        }
    }
}

/// Row label of a top-of-mind table.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum TomLabel {
    /// A brand code, as observed in the responses.
    Brand(String),
    /// A synthesized reference-vs-other difference row.
    Difference { reference: String, other: String },
}

impl Display for TomLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TomLabel::Brand(code) => write!(f, "{}", code),
            TomLabel::Difference { reference, other } => write!(f, "{} - {}", reference, other),
        }
    }
}

/// Significance annotation for a synthesized top-of-mind difference row.
/// This mirrors the comparison policy but runs against a single shared base
/// count (all codes are drawn from the same respondent pool).
#[derive(PartialEq, Debug, Clone)]
pub enum TomSignificance {
    LowBase,
    Tested { z: Option<f64>, verdict: Verdict },
}

#[derive(PartialEq, Debug, Clone)]
pub struct TomRow {
    pub label: TomLabel,
    /// Share of valid responses for a brand row; share difference for a
    /// synthesized row.
    pub value: f64,
    /// Present on synthesized rows only.
    pub test: Option<TomSignificance>,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct TomTable {
    pub rows: Vec<TomRow>,
}

impl TomTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Errors that abort a computation. Per-cell data insufficiency is never an
/// error: it flows through the output as [ComparisonCell] variants.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum MetricsError {
    /// The caller-selected reference column is absent from the input table.
    MissingReferenceColumn { column: String },
    /// None of the recognized top-of-mind column names is present.
    MissingTomColumn,
    /// The grouping column for a segmented analysis is absent.
    MissingSegmentColumn { column: String },
    /// A row does not match the width of the table being built.
    ShapeMismatch { expected: usize, actual: usize },
}

impl Error for MetricsError {}

impl Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::MissingReferenceColumn { column } => {
                write!(f, "Reference column '{}' not found", column)
            }
            MetricsError::MissingTomColumn => {
                write!(
                    f,
                    "Could not find a top-of-mind column like 'q5a_1' or 'q5a_brand1'"
                )
            }
            MetricsError::MissingSegmentColumn { column } => {
                write!(f, "Segment column '{}' not found", column)
            }
            MetricsError::ShapeMismatch { expected, actual } => {
                write!(f, "Row of width {} in a table of width {}", actual, expected)
            }
        }
    }
}
