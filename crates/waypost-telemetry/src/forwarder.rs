//! Batched, best-effort telemetry forwarding.
//!
//! Producers on the lookup path hand [`TelemetryEvent`]s to a cheap,
//! cloneable [`EventSink`]; a single supervised background task owns the
//! pending batch and is the only thing that ever touches it. The task
//! blocks waiting for either a new event or the flush interval, whichever
//! comes first, and sends the whole pending batch as one JSON array when
//! the batch reaches the configured size or the interval has elapsed since
//! the last flush.
//!
//! Delivery is **at-most-once**: any non-2xx response, transport error, or
//! timeout increments the failure counter and drops the batch — no retry,
//! no re-queue, and nothing ever propagates to a lookup caller.
//!
//! Cancellation is cooperative: [`EventForwarder::shutdown`] flips a stop
//! flag observed at the top of each wait cycle, joins the task, and the
//! task drains the intake queue once and performs one final flush before
//! exiting. When the forwarder is configured disabled, [`EventSink::emit`]
//! is a no-op and the task never starts.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use waypost_types::TelemetryEvent;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default intake queue bound (events buffered before overflow-drop).
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Full URL the batch is POSTed to.
    pub endpoint: String,
    /// Bearer credential sent with every batch.
    pub api_key: String,
    /// Flush as soon as the pending batch reaches this many events.
    pub batch_size: usize,
    /// Soft deadline between flushes.
    pub flush_interval: Duration,
    /// Per-request timeout; a timeout counts as a send failure.
    pub request_timeout: Duration,
    /// Intake queue bound. Overflow is counted and dropped, never blocked on.
    pub queue_capacity: usize,
    /// When false, `emit` is a no-op and no task is spawned.
    pub enabled: bool,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9700/events/batch".to_string(),
            api_key: String::new(),
            batch_size: 50,
            flush_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            enabled: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Statistics
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ForwarderStats {
    sent: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl ForwarderStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        let sent = self.sent.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let attempted = sent + failed;
        let success_rate_pct = if attempted > 0 {
            (sent as f64 / attempted as f64 * 10_000.0).round() / 100.0
        } else {
            100.0
        };
        StatsSnapshot {
            sent,
            failed,
            dropped: self.dropped.load(Ordering::Relaxed),
            success_rate_pct,
        }
    }
}

/// Point-in-time delivery counters.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    /// Events delivered in a 2xx-acknowledged batch.
    pub sent: u64,
    /// Events in batches that failed to deliver (and were dropped).
    pub failed: u64,
    /// Events dropped at the intake queue (overflow or stopped worker).
    pub dropped: u64,
    pub success_rate_pct: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// EventSink
// ─────────────────────────────────────────────────────────────────────────────

/// Producer handle. Clone freely; all clones feed the same intake queue.
#[derive(Clone)]
pub struct EventSink {
    tx: Option<mpsc::Sender<TelemetryEvent>>,
    stats: Arc<ForwarderStats>,
}

impl EventSink {
    /// A sink that discards everything. Useful for tests and for wiring
    /// components when telemetry is switched off.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            stats: Arc::new(ForwarderStats::default()),
        }
    }

    /// Queue an event for batched sending. Never blocks: a full (or closed)
    /// intake queue counts the event as dropped.
    pub fn emit(&self, event: TelemetryEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.try_send(event).is_err() {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            warn!("telemetry intake full or stopped; event dropped");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventForwarder
// ─────────────────────────────────────────────────────────────────────────────

struct Worker {
    handle: JoinHandle<()>,
    stop: watch::Sender<bool>,
}

/// Owns the supervised forwarding task for the process lifecycle.
pub struct EventForwarder {
    sink: EventSink,
    stats: Arc<ForwarderStats>,
    worker: Option<Worker>,
}

impl EventForwarder {
    /// Start the forwarder. Must be called within a tokio runtime unless
    /// `config.enabled` is false, in which case no task is spawned.
    pub fn spawn(config: ForwarderConfig) -> Self {
        let stats = Arc::new(ForwarderStats::default());
        if !config.enabled {
            info!("telemetry forwarder disabled; events will be discarded");
            return Self {
                sink: EventSink {
                    tx: None,
                    stats: stats.clone(),
                },
                stats,
                worker: None,
            };
        }

        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_worker(config, rx, stop_rx, stats.clone()));
        Self {
            sink: EventSink {
                tx: Some(tx),
                stats: stats.clone(),
            },
            stats,
            worker: Some(Worker {
                handle,
                stop: stop_tx,
            }),
        }
    }

    /// A producer handle for the lookup path.
    pub fn sink(&self) -> EventSink {
        self.sink.clone()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Signal the worker to stop, wait for it to drain the queue once and
    /// flush whatever remains, then return.
    pub async fn shutdown(mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop.send(true);
            if let Err(e) = worker.handle.await {
                warn!(error = %e, "telemetry worker join failed");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Worker
// ─────────────────────────────────────────────────────────────────────────────

async fn run_worker(
    config: ForwarderConfig,
    mut rx: mpsc::Receiver<TelemetryEvent>,
    mut stop: watch::Receiver<bool>,
    stats: Arc<ForwarderStats>,
) {
    let client = reqwest::Client::new();
    let mut batch: Vec<TelemetryEvent> = Vec::new();
    let mut last_flush = Instant::now();
    let batch_size = config.batch_size.max(1);
    info!(
        batch_size,
        interval_ms = config.flush_interval.as_millis() as u64,
        "telemetry worker started"
    );

    loop {
        if *stop.borrow() {
            break;
        }
        tokio::select! {
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
            received = rx.recv() => match received {
                Some(event) => batch.push(event),
                // Every sink (including the forwarder's own) is gone.
                None => break,
            },
            _ = tokio::time::sleep(config.flush_interval) => {}
        }

        let interval_elapsed = last_flush.elapsed() >= config.flush_interval;
        if (batch.len() >= batch_size || interval_elapsed) && !batch.is_empty() {
            flush(&client, &config, &mut batch, &stats).await;
            last_flush = Instant::now();
        }
    }

    // Final cycle: drain the intake once, then flush whatever remains.
    while let Ok(event) = rx.try_recv() {
        batch.push(event);
    }
    if !batch.is_empty() {
        flush(&client, &config, &mut batch, &stats).await;
    }
    info!("telemetry worker stopped");
}

async fn flush(
    client: &reqwest::Client,
    config: &ForwarderConfig,
    batch: &mut Vec<TelemetryEvent>,
    stats: &ForwarderStats,
) {
    let events = std::mem::take(batch);
    let count = events.len() as u64;
    let result = client
        .post(&config.endpoint)
        .bearer_auth(&config.api_key)
        .timeout(config.request_timeout)
        .json(&events)
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            stats.sent.fetch_add(count, Ordering::Relaxed);
            debug!(count, "telemetry batch delivered");
        }
        Ok(response) => {
            stats.failed.fetch_add(count, Ordering::Relaxed);
            warn!(status = %response.status(), count, "telemetry batch rejected; dropped");
        }
        Err(e) => {
            stats.failed.fetch_add(count, Ordering::Relaxed);
            warn!(error = %e, count, "telemetry batch send failed; dropped");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use waypost_types::EventKind;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event(kind: EventKind) -> TelemetryEvent {
        TelemetryEvent {
            kind,
            session_id: "session-1".to_string(),
            timestamp: Utc::now(),
            unit_id: "WP-DEV-001".to_string(),
            store_id: "STORE-DEV".to_string(),
            zone_id: "ENTRANCE".to_string(),
            query: Some("diesel".to_string()),
            response: None,
            tool: Some("lookup".to_string()),
            latency_ms: Some(3.0),
            metadata: None,
        }
    }

    fn config(endpoint: String, batch_size: usize, interval: Duration) -> ForwarderConfig {
        ForwarderConfig {
            endpoint,
            api_key: "test-key".to_string(),
            batch_size,
            flush_interval: interval,
            request_timeout: Duration::from_secs(2),
            queue_capacity: 64,
            enabled: true,
        }
    }

    async fn mock_sink(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/events/batch"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    }

    // ── disabled forwarder ───────────────────────────────────────────────────

    #[tokio::test]
    async fn disabled_forwarder_discards_events() {
        let forwarder = EventForwarder::spawn(ForwarderConfig::default());
        let sink = forwarder.sink();
        assert!(!sink.is_enabled());
        sink.emit(event(EventKind::Lookup));
        let stats = forwarder.stats();
        assert_eq!(stats.sent, 0);
        assert_eq!(stats.dropped, 0);
        forwarder.shutdown().await;
    }

    // ── batching ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn full_batch_is_sent_before_interval() {
        let server = mock_sink(200).await;
        let forwarder = EventForwarder::spawn(config(
            format!("{}/events/batch", server.uri()),
            2,
            Duration::from_secs(5),
        ));
        let sink = forwarder.sink();

        sink.emit(event(EventKind::CacheHit));
        sink.emit(event(EventKind::CacheMiss));
        sink.emit(event(EventKind::Lookup));
        tokio::time::sleep(Duration::from_millis(400)).await;

        // Exactly one batch of two has gone out; the third event waits.
        assert_eq!(forwarder.stats().sent, 2);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: Vec<TelemetryEvent> = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body.len(), 2);

        // Shutdown flushes the remainder.
        forwarder.shutdown().await;
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn interval_flushes_partial_batch() {
        let server = mock_sink(200).await;
        let forwarder = EventForwarder::spawn(config(
            format!("{}/events/batch", server.uri()),
            10,
            Duration::from_millis(150),
        ));
        let sink = forwarder.sink();

        sink.emit(event(EventKind::Lookup));
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(forwarder.stats().sent, 1);
        forwarder.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_flushes_queued_events() {
        let server = mock_sink(200).await;
        let forwarder = EventForwarder::spawn(config(
            format!("{}/events/batch", server.uri()),
            50,
            Duration::from_secs(30),
        ));
        let sink = forwarder.sink();

        for _ in 0..3 {
            sink.emit(event(EventKind::Engagement));
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        forwarder.shutdown().await;

        // Nothing was due before shutdown; the final flush delivered all 3.
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: Vec<TelemetryEvent> = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body.len(), 3);
    }

    // ── failure handling ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn failed_batch_is_counted_and_dropped() {
        let server = mock_sink(500).await;
        let forwarder = EventForwarder::spawn(config(
            format!("{}/events/batch", server.uri()),
            2,
            Duration::from_secs(5),
        ));
        let sink = forwarder.sink();

        sink.emit(event(EventKind::Lookup));
        sink.emit(event(EventKind::Lookup));
        tokio::time::sleep(Duration::from_millis(400)).await;

        let stats = forwarder.stats();
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.sent, 0);
        forwarder.shutdown().await;

        // No retry: the failed batch went out exactly once.
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_endpoint_counts_as_failure() {
        let forwarder = EventForwarder::spawn(config(
            // Nothing listens here; the send errors out fast.
            "http://127.0.0.1:1/events/batch".to_string(),
            1,
            Duration::from_secs(5),
        ));
        let sink = forwarder.sink();

        sink.emit(event(EventKind::Lookup));
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(forwarder.stats().failed, 1);
        forwarder.shutdown().await;
    }

    // ── sink behaviour ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn emit_after_shutdown_counts_as_dropped() {
        let server = mock_sink(200).await;
        let forwarder = EventForwarder::spawn(config(
            format!("{}/events/batch", server.uri()),
            10,
            Duration::from_secs(5),
        ));
        let sink = forwarder.sink();
        forwarder.shutdown().await;

        sink.emit(event(EventKind::Lookup));
        assert_eq!(sink.stats().dropped, 1);
    }

    #[test]
    fn success_rate_is_full_when_nothing_attempted() {
        let stats = ForwarderStats::default();
        assert_eq!(stats.snapshot().success_rate_pct, 100.0);
    }

    #[test]
    fn disabled_sink_is_inert() {
        let sink = EventSink::disabled();
        sink.emit(event(EventKind::Error));
        assert!(!sink.is_enabled());
        assert_eq!(sink.stats().dropped, 0);
    }
}
