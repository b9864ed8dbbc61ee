use clap::Parser;
use log::LevelFilter;
use snafu::ErrorCompat;

mod args;
mod svy;

fn main() {
    let args = args::Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = svy::run_analysis(&args) {
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
