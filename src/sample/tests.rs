use std::time::Duration;

use super::*;

#[test]
fn sample_result_carries_message() {
    let result = SampleResult::new("login", true, 12).with_message("ok");
    assert_eq!(result.label, "login");
    assert!(result.success);
    assert_eq!(result.elapsed_ms, 12);
    assert_eq!(result.message.as_deref(), Some("ok"));
    assert!(result.start_timestamp_ms > 0);
}

#[tokio::test]
async fn delay_sampler_reports_success() {
    let sampler = DelaySampler::new("fast", Duration::ZERO, None);
    let result = sampler.sample().await;
    assert_eq!(result.label, "fast");
    assert!(result.success);
    assert!(result.message.is_none());
}

#[tokio::test]
async fn delay_sampler_fails_every_nth() {
    let sampler = DelaySampler::new("flaky", Duration::ZERO, Some(3));
    let mut successes = 0u32;
    let mut failures = 0u32;
    for _ in 0..6 {
        let result = sampler.sample().await;
        if result.success {
            successes = successes.saturating_add(1);
        } else {
            failures = failures.saturating_add(1);
            assert_eq!(result.message.as_deref(), Some("Simulated failure"));
        }
    }
    assert_eq!(successes, 4);
    assert_eq!(failures, 2);
}
