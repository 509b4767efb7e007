use std::future::Future;
use std::time::Duration;

/// Race `call` against a timer of `duration`, then also wait out a second timer of the same
/// duration before returning.
///
/// Returns `None` when the call did not finish in time (the caller applies its default).
/// Either way the function returns no earlier than `duration`, so every player waits the
/// same amount of time regardless of how fast it answered.
pub async fn with_timeout<F>(call: F, duration: Duration) -> Option<F::Output>
where
    F: Future,
{
    let race = tokio::time::timeout(duration, call);
    let min_delay = tokio::time::sleep(duration);
    let (result, ()) = tokio::join!(race, min_delay);
    result.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn fast_answer_still_waits_the_full_duration() {
        let started = Instant::now();
        let result = with_timeout(async { 7 }, Duration::from_millis(250)).await;
        assert_eq!(result, Some(7));
        assert!(started.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_call_times_out() {
        let started = Instant::now();
        let result = with_timeout(std::future::pending::<u8>(), Duration::from_millis(250)).await;
        assert_eq!(result, None);
        assert!(started.elapsed() < Duration::from_millis(260));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_answer_within_budget_is_kept() {
        let call = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            "late"
        };
        assert_eq!(with_timeout(call, Duration::from_millis(250)).await, Some("late"));
    }
}
