use crate::duration::{self, ParseError, Text};
use crate::report::{self, Reporter};
use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::time::{Duration, Instant};

/// Layout of the timestamps in the text representation, e.g. `Feb 10 00:44:56`.
const STAMP: &str = "%b %e %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Default)]
enum State {
    #[default]
    Reset,
    /// Delayed start; reads as reset until `at`, then as running since `at`.
    Pending { at: Instant, laps: Vec<Duration> },
    Running {
        since: Instant,
        accumulated: Duration,
        last_lap: Instant,
        laps: Vec<Duration>,
    },
    Stopped {
        elapsed: Duration,
        last_lap: Instant,
        laps: Vec<Duration>,
        stopped_at: DateTime<Local>,
    },
}

impl State {
    fn running(since: Instant, laps: Vec<Duration>) -> Self {
        State::Running {
            since,
            accumulated: Duration::ZERO,
            last_lap: since,
            laps,
        }
    }
}

/// Measures elapsed time across start, stop and resume, with lap splits.
///
/// A stopwatch is not synchronized; share it across threads only behind a
/// lock of your own.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stopwatch {
    state: State,
}

impl Stopwatch {
    /// Creates a stopwatch in the reset state. Call [`Stopwatch::start`] to
    /// begin timing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stopwatch that is already running.
    pub fn start_new() -> Self {
        Self {
            state: State::running(Instant::now(), Vec::new()),
        }
    }

    /// Creates a stopwatch that starts by itself once `delay` has passed.
    ///
    /// Until then it reads as reset. No handle to the scheduled start is
    /// returned; calling [`Stopwatch::start`] or [`Stopwatch::reset`] before
    /// it is due replaces it.
    pub fn after(delay: Duration) -> Self {
        match Instant::now().checked_add(delay) {
            Some(at) => Self {
                state: State::Pending {
                    at,
                    laps: Vec::new(),
                },
            },
            None => Self::new(),
        }
    }

    /// True when no session is active, including a delayed start that is not
    /// yet due.
    pub fn is_reset(&self) -> bool {
        match &self.state {
            State::Reset => true,
            State::Pending { at, .. } => *at > Instant::now(),
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        match &self.state {
            State::Running { .. } => true,
            State::Pending { at, .. } => *at <= Instant::now(),
            _ => false,
        }
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.state, State::Stopped { .. })
    }

    /// Running time of the session, excluding time spent stopped. Zero while
    /// reset.
    pub fn elapsed(&self) -> Duration {
        match &self.state {
            State::Reset => Duration::ZERO,
            State::Pending { at, .. } => Instant::now().saturating_duration_since(*at),
            State::Running {
                since, accumulated, ..
            } => *accumulated + since.elapsed(),
            State::Stopped { elapsed, .. } => *elapsed,
        }
    }

    /// Starts a new session after a reset, or resumes after a stop.
    ///
    /// Resuming keeps the elapsed time accumulated so far. Starting a running
    /// stopwatch does nothing.
    pub fn start(&mut self) {
        let now = Instant::now();
        self.settle(now);

        self.state = match std::mem::take(&mut self.state) {
            State::Reset => {
                tracing::debug!("stopwatch started");
                State::running(now, Vec::new())
            }
            State::Pending { laps, .. } => {
                tracing::debug!("stopwatch started ahead of schedule");
                State::running(now, laps)
            }
            State::Stopped {
                elapsed,
                last_lap,
                laps,
                ..
            } => {
                tracing::debug!(elapsed = %Text(elapsed), "stopwatch resumed");
                State::Running {
                    since: now,
                    accumulated: elapsed,
                    last_lap,
                    laps,
                }
            }
            running => running,
        };
    }

    /// Freezes the elapsed time. Only a running stopwatch can be stopped; the
    /// first stop wins and later calls leave the frozen value alone.
    pub fn stop(&mut self) {
        let now = Instant::now();
        self.settle(now);

        self.state = match std::mem::take(&mut self.state) {
            State::Running {
                since,
                accumulated,
                last_lap,
                laps,
            } => {
                let elapsed = accumulated + now.saturating_duration_since(since);
                tracing::debug!(elapsed = %Text(elapsed), "stopwatch stopped");
                State::Stopped {
                    elapsed,
                    last_lap,
                    laps,
                    stopped_at: Local::now(),
                }
            }
            other => other,
        };
    }

    /// Returns to the reset state and forgets all laps.
    pub fn reset(&mut self) {
        self.state = State::Reset;
    }

    /// Records the wall time since the previous lap (or since the start) and
    /// returns it. Time spent stopped in between counts towards the lap.
    /// Returns zero without recording anything unless running.
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        self.settle(now);

        match &mut self.state {
            State::Running { last_lap, laps, .. } => {
                let lap = now.saturating_duration_since(*last_lap);
                *last_lap = now;
                laps.push(lap);
                lap
            }
            _ => Duration::ZERO,
        }
    }

    /// Recorded laps, oldest first.
    pub fn laps(&self) -> &[Duration] {
        match &self.state {
            State::Running { laps, .. }
            | State::Stopped { laps, .. }
            | State::Pending { laps, .. } => laps.as_slice(),
            State::Reset => &[],
        }
    }

    /// Prints `<label> - elapsed: <elapsed>` to standard output.
    pub fn print(&self, label: &str) {
        self.report(&report::Stdout, label);
    }

    /// Emits `<label> - elapsed: <elapsed>` as a `tracing` event.
    pub fn log(&self, label: &str) {
        self.report(&report::Log, label);
    }

    /// Hands `<label> - elapsed: <elapsed>` to `reporter`.
    ///
    /// [`Stopwatch::print`] and [`Stopwatch::log`] are this with the stdout
    /// and `tracing` reporters; any other sink, including a closure taking
    /// `&str`, can be passed here instead.
    pub fn report<R: Reporter + ?Sized>(&self, reporter: &R, label: &str) {
        reporter.report(&format!("{label} - elapsed: {}", Text(self.elapsed())));
    }

    /// Replaces the elapsed time with the one encoded in `text`, e.g.
    /// `"72h3m0.5s"` (quotes optional), and leaves the stopwatch running.
    ///
    /// Recorded laps and the last lap boundary are kept. A negative value
    /// schedules the start that far in the future, still keeping the laps.
    /// On error the stopwatch is left untouched.
    pub fn restore(&mut self, text: &str) -> Result<(), ParseError> {
        let unquoted = text.replace('"', "");
        let value = duration::parse_signed(&unquoted)?;
        let now = Instant::now();

        let at = if value.is_negative() {
            Some(
                now.checked_add(value.magnitude)
                    .ok_or_else(|| ParseError::Overflow(unquoted.clone()))?,
            )
        } else {
            None
        };

        self.settle(now);
        let (last_lap, laps) = match std::mem::take(&mut self.state) {
            State::Running { last_lap, laps, .. } | State::Stopped { last_lap, laps, .. } => {
                (last_lap, laps)
            }
            State::Pending { laps, .. } => (now, laps),
            State::Reset => (now, Vec::new()),
        };

        self.state = match at {
            Some(at) => State::Pending { at, laps },
            None => State::Running {
                since: now,
                accumulated: value.magnitude,
                last_lap,
                laps,
            },
        };

        tracing::debug!(elapsed = %value, "stopwatch restored");
        Ok(())
    }

    /// Turns a pending start whose time has come into a running session.
    fn settle(&mut self, now: Instant) {
        if let State::Pending { at, laps } = &mut self.state {
            if *at <= now {
                let (at, laps) = (*at, std::mem::take(laps));
                self.state = State::running(at, laps);
            }
        }
    }

    /// Wall-clock start of the current session, shifted forward by any time
    /// spent stopped.
    fn started_at(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let reference = match &self.state {
            State::Stopped { stopped_at, .. } => *stopped_at,
            _ if self.is_reset() => return None,
            _ => now,
        };
        let elapsed = chrono::Duration::from_std(self.elapsed()).ok()?;
        reference.checked_sub_signed(elapsed)
    }
}

impl Display for Stopwatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let now = Local::now();
        let start = match self.started_at(now) {
            Some(start) => start.format(STAMP).to_string(),
            None => String::from("-"),
        };

        write!(
            f,
            "[start: {} current: {} elapsed: {}]",
            start,
            now.format(STAMP),
            Text(self.elapsed())
        )
    }
}

impl Serialize for Stopwatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&Text(self.elapsed()))
    }
}

impl<'de> Deserialize<'de> for Stopwatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let mut stopwatch = Stopwatch::new();
        stopwatch
            .restore(&text)
            .map_err(serde::de::Error::custom)?;
        Ok(stopwatch)
    }
}
