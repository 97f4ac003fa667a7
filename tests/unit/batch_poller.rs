//! Poll termination checks for BatchPoller

use crate::common::FakeStore;
use ecwid_data_downloader::clock::ManualClock;
use ecwid_data_downloader::downloader::{BatchPoller, DownloadError};
use ecwid_data_downloader::fetcher::StoreApi;
use ecwid_data_downloader::{PageRequest, Ticket};
use std::sync::Arc;
use std::time::Duration;

const POLL_DELAY: Duration = Duration::from_millis(4000);
const TIME_LIMIT: Duration = Duration::from_millis(300_000);

fn poller(store: Arc<FakeStore>, clock: Arc<ManualClock>) -> BatchPoller {
    BatchPoller::new(store, clock, POLL_DELAY, TIME_LIMIT)
}

/// A ticket completing on poll N is returned after exactly N polls, as long as
/// the waits before it stay inside the bound.
#[tokio::test]
async fn test_completes_after_exactly_n_attempts() {
    for n in [1u32, 2, 3, 10, 40, 75] {
        let store = Arc::new(FakeStore::new(0, n));
        let clock = ManualClock::shared();
        // The fake builds completion payloads from the submitted batch.
        let ticket = store
            .submit_batch(&[PageRequest::get("1003", "products", 0)])
            .await
            .unwrap();

        let result = poller(store.clone(), clock.clone())
            .poll_until_complete(&ticket)
            .await
            .unwrap();

        assert!(result.is_completed(), "n={n}");
        assert_eq!(store.recorded().status_calls.len() as u32, n, "n={n}");
        assert_eq!(clock.sleeps().len() as u32, n - 1, "n={n}");
        assert!(clock.sleeps().iter().all(|d| *d == POLL_DELAY));
    }
}

#[tokio::test]
async fn test_never_completing_ticket_raises_timeout() {
    let store = Arc::new(FakeStore::never_completing(0));
    let clock = ManualClock::shared();

    let err = poller(store.clone(), clock.clone())
        .poll_until_complete(&Ticket::new("ticket-1"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("waiting time exceeded"));
    match err {
        DownloadError::BatchTimeout { ticket, elapsed } => {
            assert_eq!(ticket, "ticket-1");
            assert!(elapsed > TIME_LIMIT);
            assert!(elapsed <= TIME_LIMIT + POLL_DELAY);
            assert_eq!(clock.elapsed(), elapsed);
        }
        other => panic!("expected BatchTimeout, got {other:?}"),
    }
}
