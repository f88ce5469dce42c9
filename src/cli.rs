use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use stopwatch::duration;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about)]
pub struct Arguments {
    #[arg(short = 'v', long = None, env = "STOPWATCH_VERBOSITY", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Time a session of evenly spaced laps.
    Run(Run),
    /// Print a duration in canonical form.
    Parse(Parse),
}

#[derive(Debug, Args)]
pub struct Run {
    /// Wait this long before the stopwatch starts by itself.
    #[arg(short, long, env = "STOPWATCH_DELAY", value_parser = duration::parse)]
    pub delay: Option<Duration>,

    #[arg(short, long, env = "STOPWATCH_LAPS", default_value_t = 3)]
    pub laps: usize,

    #[arg(short, long, env = "STOPWATCH_INTERVAL", value_parser = duration::parse, default_value = "100ms")]
    pub interval: Duration,

    #[arg(long, env = "STOPWATCH_LABEL", default_value = "stopwatch")]
    pub label: String,

    /// Also print the serialized elapsed time.
    #[arg(short, long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct Parse {
    #[arg(allow_hyphen_values = true)]
    pub duration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_negative_durations() {
        let arguments = Arguments::try_parse_from(["stopwatch", "parse", "-1m30s"]).unwrap();

        match arguments.command {
            Command::Parse(parse) => assert_eq!(parse.duration, "-1m30s"),
            Command::Run(_) => panic!("expected the parse command"),
        }
    }

    #[test]
    fn run_reads_duration_flags() {
        let arguments =
            Arguments::try_parse_from(["stopwatch", "-vv", "run", "--delay", "1.5s", "--laps", "2"])
                .unwrap();

        assert_eq!(arguments.verbosity, 2);
        match arguments.command {
            Command::Run(run) => {
                assert_eq!(run.delay, Some(Duration::from_millis(1_500)));
                assert_eq!(run.laps, 2);
                assert_eq!(run.interval, Duration::from_millis(100));
            }
            Command::Parse(_) => panic!("expected the run command"),
        }
    }

    #[test]
    fn run_rejects_malformed_durations() {
        assert!(Arguments::try_parse_from(["stopwatch", "run", "--interval", "fast"]).is_err());
    }
}
