//! Countdown driver.
//!
//! Ticks a [`SharedSession`] once per period while its timer runs. The
//! session lock is taken for each tick only and never held across an
//! `.await`, so user commands interleave freely with ticks.

use std::sync::PoisonError;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::{Command, SharedSession};
use crate::timer::TimerState;

/// Why [`CountdownDriver::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// The timer stopped: the countdown finished or someone paused it.
    TimerStopped,
    /// The shutdown signal fired or its sender was dropped.
    Shutdown,
}

pub struct CountdownDriver {
    session: SharedSession,
    period: Duration,
}

impl CountdownDriver {
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            period: Duration::from_secs(1),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Drive the countdown until the timer stops or `shutdown` turns true.
    ///
    /// `observer` sees the timer state after every tick. State lives in the
    /// session, so returning early loses nothing.
    pub async fn run<F>(self, mut shutdown: watch::Receiver<bool>, mut observer: F) -> DriverExit
    where
        F: FnMut(&TimerState),
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let state = {
                        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
                        if !session.engine().is_running() {
                            debug!("timer not running; driver exiting");
                            return DriverExit::TimerStopped;
                        }
                        if let Err(e) = session.dispatch(Command::Tick) {
                            warn!(error = %e, "tick failed");
                        }
                        session.engine().state()
                    };
                    observer(&state);
                    if !state.is_running {
                        return DriverExit::TimerStopped;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("shutdown requested; driver exiting");
                        return DriverExit::Shutdown;
                    }
                }
            }
        }
    }
}
