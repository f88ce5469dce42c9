mod cli;

use crate::cli::{Arguments, Command};
use clap::Parser;
use std::io;
use std::thread;
use stopwatch::duration::{self, Text};
use stopwatch::Stopwatch;
use tracing_log::LogTracer;

fn main() {
    let arguments = Arguments::parse();
    set_log_level(&arguments).expect("Failed to configure logging");

    tracing::debug!(?arguments, "starting stopwatch");

    let result = match arguments.command {
        Command::Run(run) => time_session(run),
        Command::Parse(parse) => normalize(parse),
    };

    if let Err(e) = result {
        tracing::error!(%e, "Unable to run the stopwatch");
        std::process::exit(1);
    }
}

fn set_log_level(arguments: &Arguments) -> anyhow::Result<()> {
    LogTracer::init()?;

    let level = match arguments.verbosity {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn time_session(run: cli::Run) -> anyhow::Result<()> {
    let mut stopwatch = match run.delay {
        Some(delay) => Stopwatch::after(delay),
        None => Stopwatch::start_new(),
    };

    for index in 1..=run.laps {
        thread::sleep(run.interval);
        let lap = stopwatch.lap();
        tracing::debug!(index, lap = %Text(lap), "recorded lap");
        println!("lap {index}: {}", Text(lap));
    }

    stopwatch.stop();

    println!("{stopwatch}");
    stopwatch.print(&run.label);
    stopwatch.log(&run.label);

    if run.json {
        println!("{}", serde_json::to_string(&stopwatch)?);
    }

    Ok(())
}

fn normalize(parse: cli::Parse) -> anyhow::Result<()> {
    let value = duration::parse_signed(&parse.duration)?;
    println!("{value}");
    Ok(())
}
