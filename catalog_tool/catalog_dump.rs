use movielog::catalog::{Catalog, CsvStore, MovieRecord};
use movielog::config::load_config;
use std::env;
use std::fs::File;
use std::io::Write;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str =
    "Usage: cargo run --bin catalog_dump [--unwatched] [--out FILE] [--delete TITLE]";

#[derive(Debug, Default, PartialEq)]
struct Options {
    help: bool,
    unwatched_only: bool,
    out_file: Option<String>,
    delete_title: Option<String>,
}

/// The value after `flag`; a missing one or another flag in its place is an error.
fn flag_value(args: &[String], flag: &str) -> Result<Option<String>, String> {
    let Some(i) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    match args.get(i + 1) {
        Some(v) if !v.starts_with("--") && !v.trim().is_empty() => Ok(Some(v.clone())),
        _ => Err(format!("{flag} needs a value")),
    }
}

/// `args` excludes the program name.
fn parse_args(args: &[String]) -> Result<Options, String> {
    if args.iter().any(|a| a == "-h" || a == "--help") {
        return Ok(Options {
            help: true,
            ..Options::default()
        });
    }
    Ok(Options {
        help: false,
        unwatched_only: args.iter().any(|a| a == "--unwatched"),
        out_file: flag_value(args, "--out")?,
        delete_title: flag_value(args, "--delete")?,
    })
}

fn describe(idx: usize, m: &MovieRecord) -> String {
    format!(
        "[{idx}] {} | year: {} | genre: {} | rating: {} | watched: {}\n",
        m.title,
        m.year.map(|y| y.to_string()).unwrap_or_else(|| "—".into()),
        m.genre.as_deref().unwrap_or("—"),
        m.rating.map(|r| r.to_string()).unwrap_or_else(|| "—".into()),
        if m.watched { "yes" } else { "no" },
    )
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let args: Vec<String> = env::args().skip(1).collect();
    let opts = match parse_args(&args) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };
    if opts.help {
        eprintln!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let cfg = load_config();
    println!("Opening catalog: {}", cfg.data_file.display());

    let mut catalog = match Catalog::open(Box::new(CsvStore::new(&cfg.data_file))) {
        Ok(c) => c,
        Err(e) => {
            error!("could not open {}: {e}", cfg.data_file.display());
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(title) = opts.delete_title {
        return match catalog.remove_by_title(&title) {
            Ok(0) => {
                println!("No movie titled \"{title}\".");
                ExitCode::FAILURE
            }
            Ok(n) => {
                println!("Deleted {n} movie(s) titled \"{title}\".");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let mut output = String::new();
    if opts.unwatched_only {
        output.push_str("--- Unwatched movies ---\n");
        for (i, m) in catalog.unwatched() {
            output.push_str(&describe(i, m));
        }
    } else {
        output.push_str(&format!("--- Catalog: {} movie(s) ---\n", catalog.len()));
        for (i, m) in catalog.records().iter().enumerate() {
            output.push_str(&describe(i, m));
        }
        output.push_str(&format!(
            "--- {} still to watch ---\n",
            catalog.unwatched().count()
        ));
    }

    if let Some(path) = opts.out_file {
        let written = File::create(&path).and_then(|mut f| f.write_all(output.as_bytes()));
        if let Err(e) = written {
            eprintln!("Failed to write {path}: {e}");
            return ExitCode::FAILURE;
        }
        info!("exported {} bytes to {path}", output.len());
        println!("Exported results to {}", path);
    } else {
        print!("{}", output);
    }

    ExitCode::SUCCESS
}
