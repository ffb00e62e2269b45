//! SOS hand-off. The engine raises the alert and forgets about it; delivery is
//! the sink's business.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmergencyAlert {
    /// Best-effort device location, if the host had one.
    pub location: Option<GeoPoint>,
    /// Session time at which the rider pressed SOS (ms).
    pub triggered_at_ms: u64,
}

/// Receives SOS alerts. Must not block.
pub trait EmergencySink {
    fn raise(&mut self, alert: EmergencyAlert);
}

impl<F> EmergencySink for F
where
    F: FnMut(EmergencyAlert),
{
    fn raise(&mut self, alert: EmergencyAlert) {
        self(alert)
    }
}

/// Sink used when the host did not install one: the alert goes to the log.
#[derive(Debug, Default)]
pub struct LogEmergencySink;

impl EmergencySink for LogEmergencySink {
    fn raise(&mut self, alert: EmergencyAlert) {
        warn!(
            triggered_at_ms = alert.triggered_at_ms,
            location = ?alert.location,
            "SOS alert raised"
        );
    }
}

/// Outcome of [`crate::session::TripSession::trigger_sos`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SosStatus {
    Sent,
    /// An alert was already raised for this trip.
    AlreadySent,
    /// SOS is not offered while searching or after completion.
    Unavailable,
}
