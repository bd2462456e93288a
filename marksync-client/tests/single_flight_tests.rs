use marksync_client::SingleFlight;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test]
async fn concurrent_callers_share_one_execution() {
    let flight: Arc<SingleFlight<u32, String>> = Arc::new(SingleFlight::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let flight = flight.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                flight
                    .run("key", move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, String>(7)
                    })
                    .await
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), 7);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn distinct_keys_run_independently() {
    let flight: SingleFlight<&'static str, String> = SingleFlight::new();
    let a = flight.run("a", || async { Ok("a-result") });
    let b = flight.run("b", || async { Ok("b-result") });
    let (a, b) = tokio::join!(a, b);
    assert_eq!(a.unwrap(), "a-result");
    assert_eq!(b.unwrap(), "b-result");
}

#[tokio::test]
async fn completed_flight_is_forgotten() {
    let flight: SingleFlight<u32, String> = SingleFlight::new();
    let first = flight.run("key", || async { Ok(1) }).await.unwrap();
    // The key was released, so the next call runs fresh work.
    let second = flight.run("key", || async { Ok(2) }).await.unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 2);
    assert!(flight.is_empty().await);
}

#[tokio::test]
async fn joined_callers_observe_the_same_error() {
    let flight: Arc<SingleFlight<u32, String>> = Arc::new(SingleFlight::new());

    let slow = {
        let flight = flight.clone();
        tokio::spawn(async move {
            flight
                .run("key", || async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Err::<u32, _>("boom".to_string())
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(5)).await;
    let joined = flight.run("key", || async { Ok(99) }).await;

    assert_eq!(*slow.await.unwrap().unwrap_err(), "boom");
    assert_eq!(*joined.unwrap_err(), "boom");
}
