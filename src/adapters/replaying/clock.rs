//! Replaying adapter for the `Clock` port.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::next_output;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::Clock;

/// Serves recorded clock readings from a cassette.
///
/// Falls back to the system clock once the recording runs out.
pub struct ReplayingClock {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingClock {
    /// Creates a replaying clock from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl Clock for ReplayingClock {
    fn now(&self) -> DateTime<Utc> {
        next_output(&self.replayer, "clock", "now")
            .and_then(|output| serde_json::from_value(output).map_err(|e| e.to_string()))
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "clock replay unavailable; using system time");
                Utc::now()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use serde_json::json;

    fn replayer(outputs: &[&str]) -> CassetteReplayer {
        let interactions = outputs
            .iter()
            .zip(0..)
            .map(|(ts, seq)| Interaction {
                seq,
                port: "clock".into(),
                method: "now".into(),
                input: json!(null),
                output: json!(ts),
            })
            .collect();
        CassetteReplayer::new(&Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            studio_version: String::new(),
            interactions,
        })
    }

    #[test]
    fn serves_recorded_times_in_order() {
        let clock = ReplayingClock::new(replayer(&["2024-01-01T00:00:00Z", "2024-01-01T00:01:00Z"]));
        assert_eq!(clock.now().to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(clock.now().to_rfc3339(), "2024-01-01T00:01:00+00:00");
    }

    #[test]
    fn falls_back_to_system_time_when_exhausted() {
        let clock = ReplayingClock::new(replayer(&[]));
        let before = Utc::now();
        assert!(clock.now() >= before);
    }
}
