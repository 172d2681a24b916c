use std::sync::Arc;
use std::time::Duration;

use redscout::engine::{
    self, CancelController, CancelReason, Candidates, Mode, Progress, RunConfig,
    TerminationReason,
};
use redscout::tools::hashcrack::{digest_hex, HashAlgo};

fn config(workers: usize, mode: Mode) -> RunConfig {
    RunConfig {
        workers,
        probe_timeout: Duration::from_secs(1),
        mode,
        deadline: None,
    }
}

#[tokio::test]
async fn exhaustive_collects_known_success_set_at_any_width() {
    for workers in [1, 4, 64] {
        let source = Candidates::port_range(1, 200);
        let result = engine::run(
            source,
            config(workers, Mode::Exhaustive),
            CancelController::new(),
            Arc::new(Progress::new()),
            |n: u16| async move { Ok((n % 50 == 0).then_some(n)) },
        )
        .await;

        assert_eq!(result.reason, TerminationReason::Completed, "workers={workers}");
        assert_eq!(result.completed, 200);
        assert_eq!(result.errors, 0);

        let mut found: Vec<u16> = result.hits.iter().map(|h| h.candidate).collect();
        found.sort_unstable();
        assert_eq!(found, vec![50, 100, 150, 200]);
    }
}

#[tokio::test]
async fn first_match_terminates_promptly_on_single_success() {
    let source = Candidates::port_range(1, 10_000);
    let result = engine::run(
        source,
        config(8, Mode::FirstMatch),
        CancelController::new(),
        Arc::new(Progress::new()),
        |port: u16| async move { Ok((port == 80).then_some(())) },
    )
    .await;

    assert_eq!(result.reason, TerminationReason::MatchFound);
    assert_eq!(result.hits.len(), 1);
    assert_eq!(result.hits[0].candidate, 80);
    // Early exit: nowhere near the full space gets probed.
    assert!(result.completed < 1_000, "completed={}", result.completed);
}

#[tokio::test]
async fn rerun_yields_identical_result_set() {
    let run_once = || async {
        let source = Candidates::port_range(1, 500);
        let result = engine::run(
            source,
            config(16, Mode::Exhaustive),
            CancelController::new(),
            Arc::new(Progress::new()),
            |n: u16| async move { Ok((n % 7 == 0).then_some(())) },
        )
        .await;
        let mut hits: Vec<u16> = result.hits.iter().map(|h| h.candidate).collect();
        hits.sort_unstable();
        hits
    };

    assert_eq!(run_once().await, run_once().await);
}

#[tokio::test]
async fn duplicate_successes_are_deduplicated() {
    let source = Candidates::from_values(vec!["a".to_string(), "a".to_string(), "b".to_string()]);
    let result = engine::run(
        source,
        config(2, Mode::Exhaustive),
        CancelController::new(),
        Arc::new(Progress::new()),
        |s: String| async move { Ok(Some(s)) },
    )
    .await;

    assert_eq!(result.completed, 3);
    assert_eq!(result.hits.len(), 2);
}

#[tokio::test]
async fn probe_errors_are_counted_but_never_abort_the_run() {
    let source = Candidates::port_range(1, 50);
    let result = engine::run(
        source,
        config(4, Mode::Exhaustive),
        CancelController::new(),
        Arc::new(Progress::new()),
        |n: u16| async move {
            if n % 10 == 0 {
                anyhow::bail!("transient failure for {n}")
            }
            Ok((n == 7).then_some(()))
        },
    )
    .await;

    assert_eq!(result.reason, TerminationReason::Completed);
    assert_eq!(result.completed, 50);
    assert_eq!(result.errors, 5);
    assert_eq!(result.hits.len(), 1);
}

#[tokio::test]
async fn slow_probes_hit_the_backstop_timeout() {
    let source = Candidates::port_range(1, 5);
    let cfg = RunConfig {
        workers: 5,
        probe_timeout: Duration::from_millis(50),
        mode: Mode::Exhaustive,
        deadline: None,
    };
    let result = engine::run(
        source,
        cfg,
        CancelController::new(),
        Arc::new(Progress::new()),
        |_: u16| async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Some(()))
        },
    )
    .await;

    assert_eq!(result.reason, TerminationReason::Completed);
    assert_eq!(result.completed, 5);
    assert_eq!(result.errors, 5);
    assert!(result.hits.is_empty());
}

#[tokio::test]
async fn external_interrupt_stops_dispatch() {
    let ctrl = CancelController::new();
    {
        let ctrl = ctrl.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            ctrl.trip(CancelReason::Interrupted);
        });
    }

    let source = Candidates::port_range(1, 10_000);
    let result = engine::run(
        source,
        config(4, Mode::Exhaustive),
        ctrl,
        Arc::new(Progress::new()),
        |_: u16| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(None::<()>)
        },
    )
    .await;

    assert_eq!(result.reason, TerminationReason::Cancelled);
    assert!(result.completed < 10_000);
}

#[tokio::test]
async fn deadline_aborts_the_run() {
    let source = Candidates::port_range(1, 10_000);
    let cfg = RunConfig {
        workers: 2,
        probe_timeout: Duration::from_secs(1),
        mode: Mode::Exhaustive,
        deadline: Some(Duration::from_millis(80)),
    };
    let result = engine::run(
        source,
        cfg,
        CancelController::new(),
        Arc::new(Progress::new()),
        |_: u16| async move {
            tokio::time::sleep(Duration::from_millis(25)).await;
            Ok(None::<()>)
        },
    )
    .await;

    assert_eq!(result.reason, TerminationReason::DeadlineExceeded);
    assert!(result.completed < 10_000);
}

#[tokio::test]
async fn clamped_keyspace_runs_the_ceiling_bounded_space() {
    let source = Candidates::keyspace(vec!['0', '1'], 1, 12, 3);
    assert!(source.clamp_notice().is_some());
    let expected_total = 2 + 4 + 8;
    assert_eq!(source.total(), Some(expected_total));

    let result = engine::run(
        source,
        config(4, Mode::Exhaustive),
        CancelController::new(),
        Arc::new(Progress::new()),
        |_: String| async move { Ok(None::<()>) },
    )
    .await;

    assert_eq!(result.completed, expected_total);
    assert_eq!(result.reason, TerminationReason::Completed);
}

#[tokio::test]
async fn wordlist_with_no_matching_digest_completes_empty() {
    let path = std::env::temp_dir().join(format!("redscout-it-{}.txt", std::process::id()));
    std::fs::write(&path, "cat\ndog\n12345\n").unwrap();
    let source = Candidates::wordlist(&path).unwrap();

    // md5 of the empty string: nothing in the list can match.
    let target = Arc::new("d41d8cd98f00b204e9800998ecf8427e".to_string());
    let result = engine::run(
        source,
        config(4, Mode::Exhaustive),
        CancelController::new(),
        Arc::new(Progress::new()),
        move |word: String| {
            let target = target.clone();
            async move { Ok((digest_hex(HashAlgo::Md5, word.as_bytes()) == *target).then_some(())) }
        },
    )
    .await;
    std::fs::remove_file(&path).ok();

    assert_eq!(result.reason, TerminationReason::Completed);
    assert_eq!(result.completed, 3);
    assert!(result.hits.is_empty());
}

#[tokio::test]
async fn progress_snapshot_tracks_completion() {
    let progress = Arc::new(Progress::new());
    let source = Candidates::port_range(1, 100);
    let result = engine::run(
        source,
        config(8, Mode::Exhaustive),
        CancelController::new(),
        progress.clone(),
        |_: u16| async move { Ok(None::<()>) },
    )
    .await;

    let snap = progress.snapshot();
    assert_eq!(snap.completed, result.completed);
    assert_eq!(snap.total, Some(100));
    assert_eq!(snap.hits, 0);
}
