//! Bounded confirmation polling
//!
//! Generic poll-until-done helper shared by every confirmation path
//! (task acknowledgements, transaction correlation). The caller supplies
//! a sampling closure plus predicates; the engine owns the deadline and
//! the pacing between samples and does no I/O of its own.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Terminal result of a bounded poll.
///
/// Rejection and timeout are ordinary values here, not errors: a charge
/// point refusing a command is an expected outcome of talking to
/// hardware over a flaky link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<R> {
    /// The sample became terminal and carried a usable result.
    Success(R),
    /// The sample became terminal with the error condition set.
    Rejected(String),
    /// The deadline elapsed before any sample became terminal.
    TimedOut,
}

impl<R> PollOutcome<R> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Short outcome name, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Rejected(_) => "rejected",
            Self::TimedOut => "timed_out",
        }
    }
}

/// Deadline and pacing for one poll.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Total time budget, measured from entry.
    pub deadline: Duration,
    /// Pause between consecutive samples.
    pub interval: Duration,
}

impl PollSettings {
    pub fn new(deadline: Duration, interval: Duration) -> Self {
        Self { deadline, interval }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(10),
            interval: Duration::from_millis(250),
        }
    }
}

/// Repeatedly sample until the sample is terminal or the deadline passes.
///
/// The first sample is taken immediately, so a condition that already
/// holds returns without waiting. Between samples the task sleeps for
/// `settings.interval`; there is no busy spinning. The deadline is
/// absolute: it is recorded on entry and re-checked after every
/// non-terminal sample, which bounds the total time at
/// `deadline + interval` in the worst case. An already-expired deadline
/// still takes exactly one sample.
///
/// A terminal sample (`is_done`) with the error condition set maps to
/// `Rejected` with the reason produced by `on_error`; otherwise
/// `on_success` extracts the result value.
pub async fn timed_poll<F, Fut, T, R>(
    settings: PollSettings,
    mut sampler: F,
    is_done: impl Fn(&T) -> bool,
    is_error: impl Fn(&T) -> bool,
    on_success: impl Fn(T) -> R,
    on_error: impl Fn(&T) -> String,
    operation_name: &str,
) -> PollOutcome<R>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = T>,
{
    let started = Instant::now();
    let deadline = started + settings.deadline;

    debug!(
        operation = operation_name,
        deadline_ms = settings.deadline.as_millis() as u64,
        interval_ms = settings.interval.as_millis() as u64,
        "Polling for confirmation"
    );

    loop {
        let sample = sampler().await;

        if is_done(&sample) {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            if is_error(&sample) {
                let reason = on_error(&sample);
                debug!(
                    operation = operation_name,
                    elapsed_ms, reason, "Poll finished with error condition"
                );
                return PollOutcome::Rejected(reason);
            }
            debug!(operation = operation_name, elapsed_ms, "Poll succeeded");
            return PollOutcome::Success(on_success(sample));
        }

        if Instant::now() >= deadline {
            debug!(
                operation = operation_name,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Poll deadline elapsed"
            );
            return PollOutcome::TimedOut;
        }

        tokio::time::sleep(settings.interval).await;
    }
}

// ── Tests ──────────────────────────────────────────────────────
