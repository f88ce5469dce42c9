use std::thread::sleep;
use std::time::Duration;
use stopwatch::console::Transcript;
use stopwatch::Stopwatch;

fn approx_eq(d1: Duration, d2: Duration, tolerance_ms: u64) -> bool {
    d1.abs_diff(d2) <= Duration::from_millis(tolerance_ms)
}

#[test]
fn laps_then_stop_freezes_the_session() {
    let mut stopwatch = Stopwatch::start_new();

    sleep(Duration::from_millis(100));
    let first = stopwatch.lap();
    assert!(approx_eq(first, Duration::from_millis(100), 40));
    assert_eq!(stopwatch.laps(), &[first]);

    sleep(Duration::from_millis(150));
    let second = stopwatch.lap();
    assert!(approx_eq(second, Duration::from_millis(150), 40));
    assert_eq!(stopwatch.laps(), &[first, second]);

    sleep(Duration::from_millis(50));
    stopwatch.stop();
    let elapsed = stopwatch.elapsed();
    assert!(approx_eq(elapsed, Duration::from_millis(300), 60));

    sleep(Duration::from_millis(200));
    assert_eq!(stopwatch.elapsed(), elapsed);
    assert_eq!(stopwatch.lap(), Duration::ZERO);
    assert_eq!(stopwatch.laps().len(), 2);
}

#[test]
fn serializes_elapsed_time_as_a_duration_string() {
    let mut stopped: Stopwatch = serde_json::from_str(r#""72h3m0.5s""#).unwrap();
    stopped.stop();

    let json = serde_json::to_string(&stopped).unwrap();

    assert!(json.starts_with(r#""72h3m0.5"#));
    assert!(json.ends_with(r#"s""#));
    assert_eq!(serde_json::to_string(&Stopwatch::new()).unwrap(), r#""0s""#);
}

#[test]
fn round_trip_restores_elapsed_time() {
    let mut original = Stopwatch::start_new();
    sleep(Duration::from_millis(60));
    original.stop();

    let json = serde_json::to_string(&original).unwrap();
    let restored: Stopwatch = serde_json::from_str(&json).unwrap();

    assert!(restored.is_running());
    assert!(restored.elapsed() >= original.elapsed());
    assert!(approx_eq(restored.elapsed(), original.elapsed(), 20));
}

#[test]
fn rejects_invalid_duration_tokens() {
    let error = serde_json::from_str::<Stopwatch>(r#""not-a-duration""#).unwrap_err();
    assert!(error.to_string().contains(r#"time: invalid duration "not-a-duration""#));

    let error = serde_json::from_str::<Stopwatch>(r#""12parsecs""#).unwrap_err();
    assert!(error.to_string().contains(r#"time: unknown unit "parsecs" in duration "12parsecs""#));

    assert!(serde_json::from_str::<Stopwatch>("12").is_err());
}

#[test]
fn embeds_in_larger_documents() {
    #[derive(serde::Serialize, serde::Deserialize)]
    struct Build {
        name: String,
        timer: Stopwatch,
    }

    let build: Build = serde_json::from_str(r#"{"name":"release","timer":"1m"}"#).unwrap();

    assert_eq!(build.name, "release");
    assert!(approx_eq(build.timer.elapsed(), Duration::from_secs(60), 20));
}

#[test]
fn injected_reporter_receives_each_line() {
    let transcript = Transcript::default();
    let mut stopwatch = Stopwatch::new();

    stopwatch.report(&transcript, "before");
    stopwatch.start();
    stopwatch.stop();
    stopwatch.reset();
    stopwatch.report(&transcript, "after");

    assert_eq!(
        transcript.read(),
        vec!["before - elapsed: 0s", "after - elapsed: 0s"]
    );
}
