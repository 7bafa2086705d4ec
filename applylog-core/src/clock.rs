//! Time source for `last_updated` stamps.

use chrono::{DateTime, TimeZone, Utc};
use std::{
    fmt::Debug,
    sync::atomic::{AtomicI64, Ordering},
};

/// Supplies the current time to the data-access layer.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock truncated to milliseconds (the store's datetime precision) that never
/// hands out the same or an earlier instant twice within a process.
///
/// Two writes landing in the same millisecond therefore still get strictly increasing
/// `last_updated` values.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_millis: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_millis();
        let mut issued = wall;
        loop {
            let last = self.last_millis.load(Ordering::Relaxed);
            if last >= issued {
                issued = last + 1;
            }
            if self
                .last_millis
                .compare_exchange(last, issued, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                break;
            }
            issued = wall;
        }

        Utc.timestamp_millis_opt(issued)
            .single()
            .unwrap_or_else(Utc::now)
    }
}
