// Primitives for reading CSV survey files.

use log::debug;

use snafu::prelude::*;

use survey_metrics::builder::Builder;
use survey_metrics::{Datum, ResponseTable};

use crate::svy::io_common::datum_from_text;
use crate::svy::*;

pub fn read_csv_table(path: &str) -> SvyResult<ResponseTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {})?;
    let mut records = rdr.into_records();

    let header = match records.next() {
        Some(r) => r.context(CsvLineParseSnafu { lineno: 1usize })?,
        None => {
            return Err(SvyError::MissingHeader {
                path: path.to_string(),
            })
        }
    };
    let columns: Vec<String> = header.iter().map(|s| s.trim().to_string()).collect();
    debug!("read_csv_table: header: {:?}", columns);

    let mut builder = Builder::new(&columns).context(BuildingTableSnafu {})?;
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        // Short lines are padded with missing cells, extra cells dropped.
        let row: Vec<Datum> = (0..columns.len())
            .map(|i| line.get(i).map(datum_from_text).unwrap_or(Datum::Missing))
            .collect();
        if row.iter().all(|d| d.is_missing()) {
            debug!("read_csv_table: skipping blank line {}", lineno);
            continue;
        }
        builder.add_row(row).context(BuildingTableSnafu {})?;
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("npstab_csv_test_{}.csv", std::process::id()));
        let mut f = std::fs::File::create(&p).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        p
    }

    #[test]
    fn reads_header_and_rows() {
        let p = write_temp("Q7_1,q7_3,q1a\n9,10,1\n,5,2\n,,\n");
        let table = read_csv_table(p.to_str().unwrap()).unwrap();
        std::fs::remove_file(&p).unwrap();

        assert_eq!(
            table.column_names(),
            &[
                "q7_1".to_string(),
                "q7_3".to_string(),
                "q1a".to_string()
            ]
        );
        // The all-blank trailing line is dropped.
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("q7_1").unwrap()[1], Datum::Missing);
        assert_eq!(table.valid_count("q7_3"), 2);
    }
}
