#![forbid(unsafe_code)]

//! propwatch demo binary entry point.

use std::io::{self, BufRead};

use propwatch_demo::cli::Opts;
use propwatch_demo::{ViewController, run_session};
use tracing_subscriber::EnvFilter;

fn init_tracing(opts: &Opts) {
    let filter = EnvFilter::try_new(&opts.log_filter).unwrap_or_else(|err| {
        eprintln!("Invalid log filter '{}': {err}", opts.log_filter);
        EnvFilter::new("warn")
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    let result = if opts.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = result {
        eprintln!("Failed to install logger: {err}");
    }
}

fn main() {
    let opts = Opts::parse();
    init_tracing(&opts);

    let mut controller = ViewController::new();
    if opts.load {
        controller.load();
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = match opts.script_commands() {
        Some(commands) => {
            let lines = commands.into_iter().map(Ok::<_, io::Error>);
            run_session(&mut controller, lines, &mut out)
        }
        None => run_session(&mut controller, io::stdin().lock().lines(), &mut out),
    };
    if let Err(e) = result {
        eprintln!("I/O error: {e}");
        std::process::exit(1);
    }
}
