// src/crawl/limiter.rs
// =============================================================================
// Paces every outbound fetch to at most `rate` requests per one-second window.
//
// How it works:
// 1. One background task (the "server") owns the counter and the ticker
// 2. take() sends a one-shot reply channel into a bounded queue
// 3. The server grants requests in arrival order:
//    - counter below rate: count it and reply at once
//    - counter at rate: wait for the next tick, reset, then reply
// 4. Every tick also resets the counter, even with nobody waiting,
//    so an idle crawler starts each burst in a fresh window
//
// Nothing outside the server task can touch the counter, so there is no
// lock around it. Clones of RateLimiter are just extra queue senders; when
// the last one is dropped the server loop ends on its own.
//
// Rust concepts:
// - mpsc: many senders, one receiver
// - oneshot: a channel used exactly once, here as the "you may go" reply
// - tokio::select!: wait on whichever of several futures is ready first
// =============================================================================

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

// Outstanding take() calls the queue can hold before senders wait
const QUEUE_CAPACITY: usize = 1024;

const WINDOW: Duration = Duration::from_secs(1);

type Grant = oneshot::Sender<()>;

#[derive(Debug, Clone)]
pub struct RateLimiter {
    // None means "unlimited": take() never waits
    requests: Option<mpsc::Sender<Grant>>,
}

impl RateLimiter {
    /// Creates a limiter admitting `rate` takes per second (0 = unlimited).
    ///
    /// For a non-zero rate this spawns the serving task, so it must be
    /// called from inside a tokio runtime.
    pub fn new(rate: u32) -> Self {
        if rate == 0 {
            return Self { requests: None };
        }

        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(serve(rx, rate));

        Self { requests: Some(tx) }
    }

    /// Waits until this caller may issue one request. Never fails.
    pub async fn take(&self) {
        let Some(requests) = &self.requests else {
            return;
        };

        let (grant_tx, grant_rx) = oneshot::channel();
        if requests.send(grant_tx).await.is_err() {
            // Server gone; nothing left to pace against
            return;
        }
        let _ = grant_rx.await;
    }
}

async fn serve(mut requests: mpsc::Receiver<Grant>, rate: u32) {
    let mut ticker = interval_at(Instant::now() + WINDOW, WINDOW);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut taken: u32 = 0;

    loop {
        tokio::select! {
            // Apply a due window reset before granting anything
            biased;

            _ = ticker.tick() => {
                taken = 0;
            }

            request = requests.recv() => {
                let Some(grant) = request else {
                    tracing::trace!("rate limiter shutting down");
                    break;
                };

                if taken >= rate {
                    ticker.tick().await;
                    taken = 0;
                }

                taken += 1;
                // The caller may have gone away; its slot is still spent
                let _ = grant.send(());
            }
        }
    }
}
