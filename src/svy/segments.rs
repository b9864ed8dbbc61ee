// Derived demographic segments and respondent filters.

use log::{debug, info};

use survey_metrics::{Datum, MetricsError, ResponseTable};

use crate::svy::config_reader::RowFilter;

/// The derived grouping columns, in the order they are analyzed when the
/// configuration does not name any.
pub const STANDARD_SEGMENTS: [&str; 3] = ["gender", "age_group", "nccs_group"];

/// Appends the standard demographic groupings when their source columns are
/// present: `gender` from `q1a`, `age_group` from `sq1b` and `nccs_group`
/// from `sec` (or `sech_cod`). Unmappable cells stay missing and their rows
/// fall out of the segmented tables.
pub fn derive_standard_segments(table: &mut ResponseTable) -> Result<(), MetricsError> {
    derive(table, "gender", &["q1a"], gender_label)?;
    derive(table, "age_group", &["sq1b"], age_group_label)?;
    derive(table, "nccs_group", &["sec", "sech_cod"], nccs_label)?;
    Ok(())
}

fn derive(
    table: &mut ResponseTable,
    name: &str,
    sources: &[&str],
    label: fn(f64) -> Option<&'static str>,
) -> Result<(), MetricsError> {
    if table.column(name).is_some() {
        debug!("derive_standard_segments: {} already present", name);
        return Ok(());
    }
    let source = match sources.iter().find(|s| table.column(s).is_some()) {
        Some(s) => *s,
        None => return Ok(()),
    };
    let values: Vec<Datum> = match table.column(source) {
        Some(col) => col
            .iter()
            .map(|d| match d.as_number().and_then(label) {
                Some(s) => Datum::Text(s.to_string()),
                None => Datum::Missing,
            })
            .collect(),
        None => return Ok(()),
    };
    info!("derive_standard_segments: {} derived from {}", name, source);
    table.add_column(name, values)
}

fn gender_label(code: f64) -> Option<&'static str> {
    // Only the exact codes map; 1.9 is not a 1.
    match exact_code(code)? {
        1 => Some("Male"),
        2 => Some("Female"),
        _ => None,
    }
}

fn age_group_label(age: f64) -> Option<&'static str> {
    if age > 24.0 && age <= 34.0 {
        Some("25-34")
    } else if age > 34.0 && age <= 45.0 {
        Some("35-45")
    } else {
        None
    }
}

fn nccs_label(code: f64) -> Option<&'static str> {
    match exact_code(code)? {
        1..=3 => Some("NCCS A"),
        4..=7 => Some("NCCS B+C"),
        _ => None,
    }
}

fn exact_code(code: f64) -> Option<i64> {
    if code.fract() == 0.0 {
        Some(code as i64)
    } else {
        None
    }
}

/// Applies the configured filters, keeping the respondents whose cell
/// matches one of the listed values in every filter. A filter on an absent
/// column keeps nobody, which surfaces misspelled column names immediately.
pub fn apply_filters(table: &ResponseTable, filters: &[RowFilter]) -> ResponseTable {
    let mut result = table.clone();
    for filter in filters {
        let column = filter.column.to_lowercase();
        let keep: Vec<bool> = match result.column(&column) {
            Some(col) => col
                .iter()
                .map(|d| match d.label() {
                    Some(label) => filter.values.iter().any(|v| *v == label),
                    None => false,
                })
                .collect(),
            None => vec![false; result.num_rows()],
        };
        let kept = keep.iter().filter(|k| **k).count();
        info!(
            "apply_filters: {} -> {} of {} rows kept",
            column,
            kept,
            result.num_rows()
        );
        result = result.filter_rows(&keep);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_metrics::builder::Builder;

    fn demo_table() -> ResponseTable {
        let names = vec!["q1a".to_string(), "sq1b".to_string(), "sec".to_string()];
        let mut builder = Builder::new(&names).unwrap();
        for (gender, age, sec) in [(1.0, 28.0, 2.0), (2.0, 40.0, 5.0), (3.0, 60.0, 9.0)] {
            builder
                .add_numeric_row(&[Some(gender), Some(age), Some(sec)])
                .unwrap();
        }
        builder.build()
    }

    #[test]
    fn derives_all_standard_segments() {
        let mut table = demo_table();
        derive_standard_segments(&mut table).unwrap();
        let gender = table.column("gender").unwrap();
        assert_eq!(gender[0], Datum::Text("Male".to_string()));
        assert_eq!(gender[1], Datum::Text("Female".to_string()));
        assert_eq!(gender[2], Datum::Missing);
        let age = table.column("age_group").unwrap();
        assert_eq!(age[0], Datum::Text("25-34".to_string()));
        assert_eq!(age[1], Datum::Text("35-45".to_string()));
        assert_eq!(age[2], Datum::Missing);
        let nccs = table.column("nccs_group").unwrap();
        assert_eq!(nccs[0], Datum::Text("NCCS A".to_string()));
        assert_eq!(nccs[1], Datum::Text("NCCS B+C".to_string()));
        assert_eq!(nccs[2], Datum::Missing);
    }

    #[test]
    fn non_integer_codes_stay_unmapped() {
        let names = vec!["q1a".to_string(), "sq1b".to_string(), "sec".to_string()];
        let mut builder = Builder::new(&names).unwrap();
        builder
            .add_numeric_row(&[Some(1.9), Some(28.0), Some(2.5)])
            .unwrap();
        let mut table = builder.build();
        derive_standard_segments(&mut table).unwrap();
        assert_eq!(table.column("gender").unwrap()[0], Datum::Missing);
        assert_eq!(table.column("nccs_group").unwrap()[0], Datum::Missing);
        // Ages are binned over real values, so 28.0 still maps.
        assert_eq!(
            table.column("age_group").unwrap()[0],
            Datum::Text("25-34".to_string())
        );
    }

    #[test]
    fn existing_column_is_not_overwritten() {
        let names = vec!["q1a".to_string(), "gender".to_string()];
        let mut builder = Builder::new(&names).unwrap();
        builder
            .add_row(vec![Datum::Number(1.0), Datum::Text("Other".to_string())])
            .unwrap();
        let mut table = builder.build();
        derive_standard_segments(&mut table).unwrap();
        assert_eq!(
            table.column("gender").unwrap()[0],
            Datum::Text("Other".to_string())
        );
    }

    #[test]
    fn filters_combine_with_and() {
        let table = demo_table();
        let filters = vec![
            RowFilter {
                column: "q1a".to_string(),
                values: vec!["1".to_string(), "2".to_string()],
            },
            RowFilter {
                column: "sec".to_string(),
                values: vec!["5".to_string()],
            },
        ];
        let filtered = apply_filters(&table, &filters);
        assert_eq!(filtered.num_rows(), 1);
        assert_eq!(filtered.column("q1a").unwrap()[0], Datum::Number(2.0));
    }

    #[test]
    fn filter_on_missing_column_keeps_nothing() {
        let table = demo_table();
        let filters = vec![RowFilter {
            column: "region".to_string(),
            values: vec!["1".to_string()],
        }];
        assert_eq!(apply_filters(&table, &filters).num_rows(), 0);
    }
}
