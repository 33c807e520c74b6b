/// Bounded polling with a pluggable clock
use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::future::TimeoutFuture;

/// Source of delays; the browser uses real timers, tests record the requests
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Sleeps on the browser event loop
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerSleeper;

impl Sleeper for TimerSleeper {
    async fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).await;
    }
}

/// Shared flag used to stop a poll from another callback
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready { attempts: u32 },
    Exhausted { attempts: u32 },
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    interval: Duration,
    max_attempts: u32,
}

impl Poller {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Poller {
            interval,
            max_attempts,
        }
    }

    /// Wait one interval, then check; repeat until `ready` returns true,
    /// the attempts run out, or the token is cancelled.
    pub async fn poll<S, F>(&self, sleeper: &S, cancel: &CancelToken, mut ready: F) -> PollOutcome
    where
        S: Sleeper,
        F: FnMut() -> bool,
    {
        for attempt in 1..=self.max_attempts {
            sleeper.sleep(self.interval).await;

            if cancel.is_cancelled() {
                return PollOutcome::Cancelled;
            }
            if ready() {
                return PollOutcome::Ready { attempts: attempt };
            }
        }

        PollOutcome::Exhausted {
            attempts: self.max_attempts,
        }
    }
}
