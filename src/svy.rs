use log::{info, warn};

use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use survey_metrics::*;
use text_diff::print_diff;

use crate::args::Args;
use crate::svy::config_reader::*;
use crate::svy::io_common::simplify_file_name;
use crate::svy::mappings::Mappings;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod mappings;
pub mod render;
pub mod segments;

#[derive(Debug, Snafu)]
pub enum SvyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No readable worksheet in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display(""))]
    OpeningJson { source: std::io::Error },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display(""))]
    CsvOpen { source: csv::Error },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Input file {path} has no header row"))]
    MissingHeader { path: String },
    #[snafu(display(
        "No data file to analyze: pass --input or list dataFileSources in the configuration"
    ))]
    MissingFileSource {},
    #[snafu(display("Error assembling the response table"))]
    BuildingTable { source: MetricsError },
    #[snafu(display(""))]
    WritingSummary { source: std::io::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SvyResult<T> = Result<T, SvyError>;

pub fn run_analysis(args: &Args) -> SvyResult<()> {
    let config = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
            serde_json::from_str::<AnalysisConfig>(&contents).context(ParsingJsonSnafu {})?
        }
        None => AnalysisConfig::default(),
    };
    info!("config: {:?}", config);

    let mut sources = config.data_file_sources.clone();
    if let Some(input) = &args.input {
        sources.push(FileSource {
            path: input.clone(),
            input_type: args.input_type.clone(),
            excel_worksheet_name: args.excel_worksheet_name.clone(),
        });
    }
    if sources.is_empty() {
        return Err(SvyError::MissingFileSource {});
    }

    let mappings = match &config.mappings_file {
        Some(path) => Mappings::from_file(path)?,
        None => Mappings::built_in(),
    };

    let mut files: JSMap<String, JSValue> = JSMap::new();
    for source in &sources {
        let name = simplify_file_name(&source.path);
        let file_js = analyze_file(source, &config, &mappings)?;
        files.insert(name, file_js);
    }

    let summary_js = json!({ "files": files });
    let pretty = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    match &args.out {
        Some(path) if path != "stdout" => {
            fs::write(path, &pretty).context(WritingSummarySnafu {})?;
            info!("Summary written to {}", path);
        }
        _ => println!("{}", pretty),
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p.clone())?;
        let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_ref != pretty {
            warn!("Found differences with the reference summary");
            print_diff(pretty_ref.as_str(), pretty.as_str(), "\n");
            whatever!("Difference detected between computed summary and reference summary")
        }
    }

    Ok(())
}

fn read_response_table(source: &FileSource) -> SvyResult<ResponseTable> {
    let input_type = match &source.input_type {
        Some(t) => t.clone(),
        None if source.path.to_lowercase().ends_with(".xlsx") => "xlsx".to_string(),
        None => "csv".to_string(),
    };
    match input_type.as_str() {
        "csv" => io_csv::read_csv_table(&source.path),
        "xlsx" => io_xlsx::read_excel_table(&source.path, source.excel_worksheet_name.as_deref()),
        x => whatever!("Input type not implemented {:?}", x),
    }
}

// A single analysis failing on one file (a missing reference column, no
// top-of-mind question) does not abort the run: the section is skipped with
// a warning and the other analyses still appear in the summary.
fn analyze_file(
    source: &FileSource,
    config: &AnalysisConfig,
    mappings: &Mappings,
) -> SvyResult<JSValue> {
    info!("Attempting to read survey file {:?}", source.path);
    let mut table = read_response_table(source)?;
    segments::derive_standard_segments(&mut table).context(BuildingTableSnafu {})?;
    let table = segments::apply_filters(&table, &config.filters);
    info!(
        "{}: {} respondents after filtering, {} columns",
        source.path,
        table.num_rows(),
        table.column_names().len()
    );

    let refs = &config.references;
    let has_q7_4 = table.column_names().iter().any(|c| c.starts_with("q7_4"));
    let brand_labels = mappings.brand_labels(&simplify_file_name(&source.path), has_q7_4);
    let no_labels: HashMap<String, String> = HashMap::new();

    let mut file_js: JSMap<String, JSValue> = JSMap::new();

    match overall_nps(&table, &refs.nps_reference()) {
        Ok(t) => {
            file_js.insert(
                "overall_nps".to_string(),
                JSValue::Array(render::annotated_to_json(&t, &brand_labels, &no_labels)),
            );
        }
        Err(e) => warn!("overall_nps skipped for {}: {}", source.path, e),
    }

    match top_of_mind(&table, &refs.tom_reference_brand()) {
        Ok(t) => {
            file_js.insert(
                "top_of_mind".to_string(),
                JSValue::Array(render::tom_to_json(&t, &brand_labels)),
            );
        }
        Err(e) => warn!("top_of_mind skipped for {}: {}", source.path, e),
    }

    // The imagery base sizes are the valid response counts of the rating
    // columns, not of the imagery columns themselves.
    let base_counts: HashMap<String, u64> = nps_source_columns(&table)
        .into_iter()
        .map(|c| {
            let n = table.valid_count(&c);
            (c, n)
        })
        .collect();
    match imagery(&table, &base_counts, &refs.imagery_reference()) {
        Ok(t) => {
            file_js.insert(
                "imagery".to_string(),
                JSValue::Array(render::annotated_to_json(
                    &t,
                    &brand_labels,
                    &mappings.imagery_labels,
                )),
            );
        }
        Err(e) => warn!("imagery skipped for {}: {}", source.path, e),
    }

    let segment_cols: Vec<String> = if config.segment_columns.is_empty() {
        segments::STANDARD_SEGMENTS
            .iter()
            .map(|s| s.to_string())
            .filter(|s| table.column(s).is_some())
            .collect()
    } else {
        config.segment_columns.clone()
    };
    let mut segmented_js: JSMap<String, JSValue> = JSMap::new();
    for seg_col in &segment_cols {
        match segmented_nps(&table, seg_col) {
            Ok(t) => {
                segmented_js.insert(
                    seg_col.clone(),
                    JSValue::Array(render::annotated_to_json(&t, &brand_labels, &no_labels)),
                );
            }
            Err(e) => warn!(
                "segmented_nps on {} skipped for {}: {}",
                seg_col, source.path, e
            ),
        }
    }
    file_js.insert("segmented_nps".to_string(), JSValue::Object(segmented_js));

    let sectional = sectional_nps(&table, &refs.sectional_reference(), refs.max_section());
    file_js.insert(
        "sectional_nps".to_string(),
        JSValue::Array(render::annotated_to_json(
            &sectional,
            &brand_labels,
            &mappings.sectional_labels,
        )),
    );

    Ok(JSValue::Object(file_js))
}

pub fn read_summary(path: String) -> SvyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
