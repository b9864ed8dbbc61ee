// Primitives for reading Excel survey files.

use log::debug;

use snafu::prelude::*;

use calamine::{open_workbook, Reader, Xlsx};

use survey_metrics::builder::Builder;
use survey_metrics::{Datum, ResponseTable};

use crate::svy::io_common::datum_from_text;
use crate::svy::*;

pub fn read_excel_table(path: &str, worksheet_name: Option<&str>) -> SvyResult<ResponseTable> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu {
        path: path.to_string(),
    })?;
    let wrange = match worksheet_name {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    }
    .context(EmptyExcelSnafu {
        path: path.to_string(),
    })?
    .context(OpeningExcelSnafu {
        path: path.to_string(),
    })?;

    let mut rows = wrange.rows();
    let header = rows.next().context(MissingHeaderSnafu {
        path: path.to_string(),
    })?;
    let columns: Vec<String> = header.iter().map(cell_label).collect();
    debug!("read_excel_table: header: {:?}", columns);

    let mut builder = Builder::new(&columns).context(BuildingTableSnafu {})?;
    for row in rows {
        let data: Vec<Datum> = row.iter().map(datum_from_cell).collect();
        if data.iter().all(|d| d.is_missing()) {
            continue;
        }
        builder.add_row(data).context(BuildingTableSnafu {})?;
    }
    Ok(builder.build())
}

fn cell_label(cell: &calamine::DataType) -> String {
    match cell {
        calamine::DataType::String(s) => s.trim().to_string(),
        calamine::DataType::Float(f) => format!("{}", f),
        calamine::DataType::Int(i) => format!("{}", i),
        _ => String::new(),
    }
}

fn datum_from_cell(cell: &calamine::DataType) -> Datum {
    match cell {
        calamine::DataType::Float(f) => Datum::Number(*f),
        calamine::DataType::Int(i) => Datum::Number(*i as f64),
        calamine::DataType::String(s) => datum_from_text(s),
        calamine::DataType::Bool(b) => Datum::Number(if *b { 1.0 } else { 0.0 }),
        calamine::DataType::DateTime(f) => Datum::Number(*f),
        // Empty cells and cell errors both read as missing.
        _ => Datum::Missing,
    }
}
