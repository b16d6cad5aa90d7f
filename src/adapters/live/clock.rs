//! Live clock backed by the system time.

use chrono::{DateTime, Utc};

use crate::ports::Clock;

/// Clock returning the real current time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
