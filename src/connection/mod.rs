use std::time::{ Duration, Instant };

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Retry policy for the single chat connection: after a close or error,
/// exactly one reconnect attempt is scheduled at a fixed delay, and no
/// attempt starts while one is already in flight. Retries never stop and
/// the delay never grows.
///
/// Time is passed in by the caller so the policy can be exercised without
/// timers or sockets.
#[derive(Debug)]
pub struct Supervisor {
    state: ConnectionState,
    retry_delay: Duration,
    retry_at: Option<Instant>,
}

impl Supervisor {
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            retry_delay,
            retry_at: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Attempt the Disconnected -> Connecting transition. Refused while an
    /// attempt is in flight, while connected, or before a pending retry
    /// deadline has elapsed.
    pub fn begin_connect(&mut self, now: Instant) -> bool {
        if self.state != ConnectionState::Disconnected {
            return false;
        }
        if let Some(deadline) = self.retry_at {
            if now < deadline {
                return false;
            }
        }
        self.retry_at = None;
        self.state = ConnectionState::Connecting;
        true
    }

    /// Connecting -> Connected.
    pub fn established(&mut self) {
        self.state = ConnectionState::Connected;
    }

    /// Tear down to Disconnected and schedule one retry. A duplicate loss
    /// event while a retry is already pending does not reschedule it.
    pub fn connection_lost(&mut self, now: Instant) {
        if self.state == ConnectionState::Disconnected && self.retry_at.is_some() {
            debug!("Connection loss reported while a retry is already pending; ignoring");
            return;
        }
        self.state = ConnectionState::Disconnected;
        self.retry_at = Some(now + self.retry_delay);
    }

    /// Time left before the pending retry may fire, if one is scheduled.
    pub fn delay_remaining(&self, now: Instant) -> Option<Duration> {
        self.retry_at.map(|deadline| deadline.saturating_duration_since(now))
    }
}
