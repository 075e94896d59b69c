use std::{fs, path::Path, process};

use clap::Parser;
use ember::{
    check_source,
    config::Config,
    error::{Error, RuntimeError},
    interpreter::value::core::Value,
    run_source,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// ember is a small dynamically typed scripting language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Treat the contents as source code instead of a file path.
    #[arg(short, long)]
    eval: bool,

    /// Parse and resolve the script without running it.
    #[arg(short, long)]
    check: bool,

    /// Log interpreter activity to standard error.
    #[arg(short, long)]
    verbose: bool,

    /// A script file, or source code with `--eval`.
    contents: String,

    /// Arguments made available to the script through `args()`.
    #[arg(last = true)]
    script_args: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter)
                             .with_writer(std::io::stderr)
                             .init();

    let (script, import_root) = if args.eval {
        (args.contents, Path::new(".").to_path_buf())
    } else {
        let script = fs::read_to_string(&args.contents).unwrap_or_else(|e| {
                                                           eprintln!("Failed to read the input file '{}': {e}",
                                                                     &args.contents);
                                                           process::exit(1);
                                                       });
        let root = Path::new(&args.contents).parent()
                                            .unwrap_or_else(|| Path::new("."))
                                            .to_path_buf();
        (script, root)
    };

    if args.check {
        check(&script);
        return;
    }

    let config = Config::default().with_args(args.script_args)
                                  .with_import_root(import_root);

    match run_source(&script, config) {
        Ok(value @ Value::Error(_)) => {
            eprintln!("{value}");
            process::exit(1);
        },
        Ok(_) => {},
        Err(Error::Runtime(RuntimeError::Exit { code })) => process::exit(code),
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        },
    }
}

/// Reports parse errors and resolver diagnostics.
fn check(script: &str) {
    match check_source(script) {
        Ok(diagnostics) => {
            for diagnostic in &diagnostics {
                warn!("{diagnostic}");
            }
        },
        Err(errors) => {
            eprintln!("{errors}");
            process::exit(1);
        },
    }
}
