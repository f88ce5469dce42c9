//! A stopwatch that can be started, stopped, resumed, reset, lap-split and
//! serialized as its elapsed time.
//!
//! ```
//! use stopwatch::Stopwatch;
//!
//! let mut stopwatch = Stopwatch::start_new();
//! let lap = stopwatch.lap();
//! stopwatch.stop();
//!
//! assert_eq!(stopwatch.laps(), &[lap]);
//! assert_eq!(stopwatch.elapsed(), stopwatch.elapsed());
//! ```

pub mod console;
pub mod duration;
pub mod report;
mod stopwatch;

pub use crate::duration::ParseError;
pub use crate::report::Reporter;
pub use crate::stopwatch::Stopwatch;
