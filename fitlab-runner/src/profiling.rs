//! Timing scopes for hot sections (synthesis, bulk recompute).
//!
//! Disabled by default. Set `FITLAB_PROFILE=1` and call [`init`] at startup;
//! scope durations are then emitted as `tracing` debug events on target
//! `fitlab::profile`, so they need a subscriber at debug level to be seen.
//!
//! ```
//! use fitlab_runner::profiling::ProfileScope;
//!
//! fn expensive_operation() {
//!     let _scope = ProfileScope::new("expensive_operation");
//!     // Timing logged on drop
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Environment variable that turns profiling on.
pub const PROFILE_ENV: &str = "FITLAB_PROFILE";

static PROFILING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Read [`PROFILE_ENV`] and enable or disable profiling accordingly.
pub fn init() {
    let enabled = std::env::var(PROFILE_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    set_enabled(enabled);

    if enabled {
        tracing::debug!(target: "fitlab::profile", "profiling enabled ({PROFILE_ENV}=1)");
    }
}

pub fn set_enabled(enabled: bool) {
    PROFILING_ENABLED.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn is_enabled() -> bool {
    PROFILING_ENABLED.load(Ordering::Relaxed)
}

/// Measures the time until it is dropped.
pub struct ProfileScope {
    name: &'static str,
    start: Instant,
}

impl ProfileScope {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        if is_enabled() {
            report(self.name, self.start.elapsed());
        }
    }
}

fn report(name: &'static str, duration: Duration) {
    tracing::debug!(
        target: "fitlab::profile",
        scope = name,
        millis = duration.as_secs_f64() * 1000.0,
        "profile scope finished"
    );
}
