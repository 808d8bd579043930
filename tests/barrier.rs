// tests/barrier.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use graphlaunch::coord::{BarrierHandle, CoordinationService, LocalCoordinator};
use graphlaunch::errors::LaunchError;

const WAIT: Duration = Duration::from_secs(5);

/// Spawn `parties` participants on one barrier. Each counts its arrival before
/// calling `enter` and, once through, reports how many had arrived.
async fn enter_all(coordinator: &LocalCoordinator, id: &str, parties: usize) -> Vec<usize> {
    let arrived = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();

    for _ in 0..parties {
        let coordinator = coordinator.clone();
        let arrived = Arc::clone(&arrived);
        let barrier = BarrierHandle::new(id, parties).unwrap();
        handles.push(tokio::spawn(async move {
            arrived.fetch_add(1, Ordering::SeqCst);
            coordinator.enter(&barrier, WAIT).await.unwrap();
            arrived.load(Ordering::SeqCst)
        }));
    }

    let mut seen = Vec::new();
    for h in handles {
        seen.push(h.await.unwrap());
    }
    seen
}

#[tokio::test]
async fn all_parties_pass_enter_only_after_everyone_arrived() {
    init_tracing();

    for parties in [1usize, 2, 3, 7] {
        let coordinator = LocalCoordinator::new();
        let id = format!("run-{parties}");
        let seen = with_timeout(enter_all(&coordinator, &id, parties)).await;

        assert_eq!(seen.len(), parties);
        assert!(
            seen.iter().all(|&n| n == parties),
            "someone passed enter early: {seen:?}"
        );
        let arrivals = coordinator.arrivals(&id).unwrap();
        assert_eq!(arrivals.entered, parties);
        assert_eq!(arrivals.left, 0);
    }
}

#[tokio::test]
async fn missing_party_times_out_no_earlier_than_the_timeout() {
    init_tracing();

    let coordinator = LocalCoordinator::new();
    let timeout = Duration::from_millis(300);
    let mut handles = Vec::new();

    // Three parties expected, only two show up.
    for _ in 0..2 {
        let coordinator = coordinator.clone();
        handles.push(tokio::spawn(async move {
            let barrier = BarrierHandle::new("short", 3).unwrap();
            let started = Instant::now();
            let res = coordinator.enter(&barrier, timeout).await;
            (res, started.elapsed())
        }));
    }

    for h in handles {
        let (res, elapsed) = with_timeout(h).await.unwrap();
        match res {
            Err(LaunchError::BarrierTimeout { id, parties, .. }) => {
                assert_eq!(id, "short");
                assert_eq!(parties, 3);
            }
            other => panic!("expected BarrierTimeout, got {other:?}"),
        }
        assert!(elapsed >= timeout, "timed out early after {elapsed:?}");
    }

    // Timed-out participants withdrew their arrival.
    assert_eq!(coordinator.arrivals("short").unwrap().entered, 0);
}

#[tokio::test]
async fn retry_after_timeout_is_not_double_counted() {
    init_tracing();

    let coordinator = LocalCoordinator::new();
    let barrier = BarrierHandle::new("retry", 2).unwrap();

    let first = coordinator
        .enter(&barrier, Duration::from_millis(50))
        .await;
    assert!(matches!(first, Err(LaunchError::BarrierTimeout { .. })));

    // The same participant retries; the barrier must still need a second party.
    let solo = coordinator
        .enter(&barrier, Duration::from_millis(50))
        .await;
    assert!(matches!(solo, Err(LaunchError::BarrierTimeout { .. })));

    let peer = {
        let coordinator = coordinator.clone();
        let barrier = barrier.clone();
        tokio::spawn(async move { coordinator.enter(&barrier, WAIT).await })
    };
    coordinator.enter(&barrier, WAIT).await.unwrap();
    peer.await.unwrap().unwrap();
}

#[tokio::test]
async fn leave_waits_for_every_party() {
    init_tracing();

    let coordinator = LocalCoordinator::new();
    let barrier = BarrierHandle::new("double", 2).unwrap();

    let peer = {
        let coordinator = coordinator.clone();
        let barrier = barrier.clone();
        tokio::spawn(async move {
            coordinator.enter(&barrier, WAIT).await.unwrap();
            coordinator.leave(&barrier, WAIT).await
        })
    };

    coordinator.enter(&barrier, WAIT).await.unwrap();

    // The peer is stuck in `leave` until we leave too.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!peer.is_finished());
    assert_eq!(coordinator.arrivals("double").unwrap().left, 1);

    coordinator.leave(&barrier, WAIT).await.unwrap();
    with_timeout(peer).await.unwrap().unwrap();
    assert_eq!(coordinator.arrivals("double").unwrap().left, 2);
}

#[tokio::test]
async fn barriers_of_different_runs_do_not_collide() {
    init_tracing();

    let coordinator = LocalCoordinator::new();
    let run_a = BarrierHandle::for_run("run-a", 1).unwrap();
    let run_b = BarrierHandle::for_run("run-b", 2).unwrap();
    assert_ne!(run_a.id(), run_b.id());

    // run-a opens on its own even though run-b is waiting for a second party.
    let waiting_b = {
        let coordinator = coordinator.clone();
        let run_b = run_b.clone();
        tokio::spawn(async move { coordinator.enter(&run_b, Duration::from_millis(200)).await })
    };
    coordinator.enter(&run_a, WAIT).await.unwrap();

    let b = waiting_b.await.unwrap();
    assert!(matches!(b, Err(LaunchError::BarrierTimeout { .. })));
}

#[tokio::test]
async fn party_count_mismatch_is_rejected() {
    let coordinator = LocalCoordinator::new();
    let three = BarrierHandle::new("mixed", 3).unwrap();
    let two = BarrierHandle::new("mixed", 2).unwrap();

    let _ = coordinator.enter(&three, Duration::from_millis(10)).await;
    let res = coordinator.enter(&two, Duration::from_millis(10)).await;

    match res {
        Err(LaunchError::BarrierMismatch {
            registered,
            requested,
            ..
        }) => {
            assert_eq!(registered, 3);
            assert_eq!(requested, 2);
        }
        other => panic!("expected BarrierMismatch, got {other:?}"),
    }
}

#[test]
fn barrier_handles_validate_their_inputs() {
    assert!(matches!(
        BarrierHandle::new("x", 0),
        Err(LaunchError::ConfigError(_))
    ));
    assert!(matches!(
        BarrierHandle::new("  ", 1),
        Err(LaunchError::ConfigError(_))
    ));

    let handle = BarrierHandle::for_run("run42", 3).unwrap();
    assert_eq!(handle.id(), "run42-barrier");
    assert_eq!(handle.party_count(), 3);
}
