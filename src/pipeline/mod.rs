//! Pipeline entry points for watcher operations.
//!
//! - `Watcher::run_cycle`: Fetch, diff, notify and persist once
//! - `run_schedule`: Run cycles at a fixed interval
//! - `run_publish`: Write the website data file

pub mod circuit_breaker;
pub mod compose;
pub mod cycle;
pub mod diff;
pub mod publish;
pub mod schedule;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerResult};
pub use compose::{Notification, NotificationComposer, compose, kindergarten_name};
pub use cycle::{CycleOutcome, Watcher};
pub use diff::{DiffCalculator, DiffResult, calculate_diff};
pub use publish::run_publish;
pub use schedule::{run_cycles, run_schedule};
