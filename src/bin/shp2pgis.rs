//! Shapefile to PostGIS importer (shp2pgis) - Main binary entry point

use shp2pgis::cli::args::{CliArgs, parse_args};
use shp2pgis::cli::output::{format_json, format_progress, format_summary};
use shp2pgis::models::{ProgressPhase, ProgressSnapshot};
use shp2pgis::services::reader::ShapefileReader;
use shp2pgis::services::sink::SpatialDatabase;
use shp2pgis::services::sink::memory::MemoryDatabase;
use shp2pgis::services::sink::postgis::PostgisClient;
use shp2pgis::{ImportConfig, ImportOptions, RunToken};
use std::process;
use std::sync::Arc;

fn main() {
    // Initialize logger (controlled by RUST_LOG environment variable)
    // Example: RUST_LOG=debug shp2pgis creds.conf 170518
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--help" | "-h") => {
            print_help();
            return;
        }
        Some("--version" | "-v") => {
            print_version();
            return;
        }
        _ => {}
    }

    let cli_args = match parse_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: shp2pgis <CONFIG> <RUN> [OPTIONS]");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    process::exit(handle_import(&cli_args));
}

fn handle_import(args: &CliArgs) -> i32 {
    // Validate the run identifier before anything touches the filesystem
    let run = match RunToken::parse(&args.run) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: {e}");
            return e.exit_code();
        }
    };

    let config = match ImportConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return e.exit_code();
        }
    };
    log::debug!("{config:?}");

    let mut opts = ImportOptions {
        jobs: args.jobs,
        progress_every: args.progress_every,
        progress_notifier: None,
    };

    if !args.quiet {
        // Keep stdout parseable when the report is printed as JSON
        let to_stderr = args.json;
        opts.progress_notifier = Some(Arc::new(move |snapshot: &ProgressSnapshot| {
            let line = format_progress(snapshot);
            if to_stderr {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        }));
    } else if !args.json {
        // Quiet runs still end with the summary line
        opts.progress_notifier = Some(Arc::new(|snapshot: &ProgressSnapshot| {
            if snapshot.phase == ProgressPhase::Finished {
                println!("{}", format_progress(snapshot));
            }
        }));
    }

    let db: Box<dyn SpatialDatabase> = if args.dry_run {
        eprintln!("Dry run: nothing will be written to {}", config.database);
        Box::new(MemoryDatabase::counting())
    } else {
        let max_connections = u32::try_from(args.jobs).unwrap_or(u32::MAX);
        match PostgisClient::connect(&config, max_connections) {
            Ok(client) => Box::new(client),
            Err(e) => {
                eprintln!("Error: {e}");
                return e.exit_code();
            }
        }
    };

    let reader = ShapefileReader::new();
    let report = match shp2pgis::run_import(&config, &run, &opts, &reader, db.as_ref()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            return e.exit_code();
        }
    };

    if args.json {
        println!("{}", format_json(&report));
    } else if !args.quiet {
        println!("{}", format_summary(&report));
    }

    // Failed units are named on stderr even in quiet and JSON modes
    for failure in &report.failures {
        eprintln!("Failed unit {}: {}", failure.unit, failure.message);
    }

    match report.ensure_complete() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

fn print_help() {
    println!("Shapefile to PostGIS importer (shp2pgis) - Load per-unit result folders into one table");
    println!();
    println!("USAGE:");
    println!("    shp2pgis <CONFIG> <RUN> [OPTIONS]");
    println!();
    println!("ARGUMENTS:");
    println!("    <CONFIG>                  Path to the key=value credentials file");
    println!("    <RUN>                     Run identifier formatted as YYMMDD, e.g. 170518");
    println!();
    println!("OPTIONS:");
    println!("    --jobs <N>                Import N units concurrently (default: 1)");
    println!("    --progress-every <N>      Print progress every N units (default: 300)");
    println!("    --dry-run                 Read and enrich everything, write nothing");
    println!("    --json                    Print the final report as JSON");
    println!("    --quiet                   Suppress progress output");
    println!("    -h, --help                Show this help message");
    println!("    -v, --version             Show version information");
    println!();
    println!("CONFIG KEYS:");
    println!("    host, port, db, schema, user, password, table   Target database and table");
    println!("    shapesDir                 Directory whose subdirectories hold the .shp files");
    println!("    createTable               'true' to create the table on the first write");
    println!("    srid, geometryColumn      Optional (defaults: 0, geom)");
    println!();
    println!("EXAMPLES:");
    println!("    shp2pgis /home/operator/creds.conf 170518");
    println!("    shp2pgis creds.conf 170518 --jobs 4 --json");
}

fn print_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_DATE: &str = env!("GIT_DATE");
    const BUILD_TARGET: &str = env!("BUILD_TARGET");

    println!("shp2pgis {VERSION}");
    println!("Commit: {GIT_HASH} ({GIT_DATE})");
    println!("Target: {BUILD_TARGET}");

    #[cfg(debug_assertions)]
    println!("Build: debug");
    #[cfg(not(debug_assertions))]
    println!("Build: release");
}
