use clap::Parser;

/// This is a survey metrics tabulation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the analysis: data file sources, reference
    /// brands, segment columns, filters and label mappings. For more information about the file
    /// format, read the documentation.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing a previously computed summary in JSON format. If
    /// provided, npstab will check that the computed output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the analysis will be written in
    /// JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, a survey data file to analyze. Setting this option adds
    /// to the file sources that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default inferred from the file extension) The type of the input: 'csv' or 'xlsx'.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default first worksheet) When using an Excel file, indicates the name of the worksheet to
    /// use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
