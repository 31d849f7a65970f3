//! Session configuration

use std::time::Duration;

/// Session coordinator configuration
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// How long a round waits for choices before resolving.
    pub round_timeout: Duration,
    /// Intake buffer capacity per subscriber, beyond the roster
    /// snapshot. A full buffer drops the subscriber.
    pub subscriber_buffer: usize,
    /// Coordinator mailbox depth.
    pub mailbox_depth: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            round_timeout: Duration::from_secs(30),
            subscriber_buffer: 8,
            mailbox_depth: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.round_timeout, Duration::from_secs(30));
        assert!(config.subscriber_buffer >= 1);
        assert!(config.mailbox_depth >= 1);
    }
}
