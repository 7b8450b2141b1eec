//! Retry policy for coordination-service connections.

use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

pub const BASE_DELAY: Duration = Duration::from_millis(500);
pub const MAX_DELAY: Duration = Duration::from_millis(2000);

/// Doubling delay starting at `base`, capped at `max`, retried forever.
///
/// There is no jitter and no elapsed-time limit.
pub fn exponential_delay(base: Duration, max: Duration) -> ExponentialBackoff {
	ExponentialBackoffBuilder::new()
		.with_initial_interval(base)
		.with_multiplier(2.0)
		.with_randomization_factor(0.0)
		.with_max_interval(max)
		.with_max_elapsed_time(None)
		.build()
}

/// The policy used for every coordination-service connection.
pub fn coordination_policy() -> ExponentialBackoff {
	exponential_delay(BASE_DELAY, MAX_DELAY)
}
