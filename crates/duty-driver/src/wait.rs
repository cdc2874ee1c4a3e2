//! Wait mechanisms.
//!
//! Every wait is a bounded polling loop: probe, sleep `poll_interval`, and
//! give up with [`DriverError::Timeout`] once the deadline passes. Errors
//! raised by the probe itself end the wait immediately.

use crate::driver::ElementSnapshot;
use crate::result::{DriverError, DriverResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

/// Default timeout for auto-waiting actions (5 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Element states a locator can be waited into (Playwright parity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementState {
    /// At least one element is in the DOM
    Attached,
    /// No element is in the DOM
    Detached,
    /// The first element is rendered
    Visible,
    /// No element, or the first one is not rendered
    Hidden,
}

impl ElementState {
    /// Check the state against a fresh query result
    #[must_use]
    pub fn is_satisfied_by(self, elements: &[ElementSnapshot]) -> bool {
        match self {
            Self::Attached => !elements.is_empty(),
            Self::Detached => elements.is_empty(),
            Self::Visible => elements.first().is_some_and(|e| e.visible),
            Self::Hidden => elements.first().map_or(true, |e| !e.visible),
        }
    }

    /// Lower-case state name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Poll `probe` until it reports `true` or `timeout` elapses.
///
/// The probe always runs at least once, so a zero timeout is a plain check.
///
/// # Errors
///
/// Returns [`DriverError::Timeout`] naming `what` if the deadline passes, or
/// the probe's own error as soon as it fails.
pub async fn poll_until<F, Fut>(
    what: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut probe: F,
) -> DriverResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DriverResult<bool>>,
{
    let start = Instant::now();
    loop {
        if probe().await? {
            return Ok(());
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(DriverError::timeout(what, duration_ms(timeout)));
        }
        tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;
    }
}

/// Duration in whole milliseconds, saturating
#[must_use]
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
