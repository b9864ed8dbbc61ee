pub use crate::config::*;

/// A builder for assembling a [ResponseTable] row by row.
///
/// Column names are lower-cased on entry, and every row must match the
/// declared width.
///
/// ```
/// use survey_metrics::builder::Builder;
/// use survey_metrics::Datum;
/// # use survey_metrics::MetricsError;
///
/// let mut builder = Builder::new(&["q7_1".to_string(), "q7_3".to_string()])?;
/// builder.add_row(vec![Datum::Number(9.0), Datum::Missing])?;
/// let table = builder.build();
/// assert_eq!(table.num_rows(), 1);
///
/// # Ok::<(), MetricsError>(())
/// ```
pub struct Builder {
    columns: Vec<String>,
    rows: Vec<Vec<Datum>>,
}

impl Builder {
    pub fn new(columns: &[String]) -> Result<Builder, MetricsError> {
        Ok(Builder {
            columns: columns.iter().map(|c| c.to_lowercase()).collect(),
            rows: Vec::new(),
        })
    }

    pub fn add_row(&mut self, row: Vec<Datum>) -> Result<(), MetricsError> {
        if row.len() != self.columns.len() {
            return Err(MetricsError::ShapeMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Convenience for purely numeric rows, with `None` standing for a
    /// missing value.
    pub fn add_numeric_row(&mut self, row: &[Option<f64>]) -> Result<(), MetricsError> {
        self.add_row(
            row.iter()
                .map(|v| match v {
                    Some(x) => Datum::Number(*x),
                    None => Datum::Missing,
                })
                .collect(),
        )
    }

    pub fn build(self) -> ResponseTable {
        let num_rows = self.rows.len();
        let mut data: Vec<Vec<Datum>> = self
            .columns
            .iter()
            .map(|_| Vec::with_capacity(num_rows))
            .collect();
        for row in self.rows {
            for (idx, datum) in row.into_iter().enumerate() {
                data[idx].push(datum);
            }
        }
        ResponseTable {
            columns: self.columns,
            data,
            num_rows,
        }
    }
}
