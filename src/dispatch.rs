use crate::error::ConfigError;
use crate::sink::{LogLine, LogSink};
use crate::INTERNAL_TARGET;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};

/// Attempts per sink and batch before the batch is given up on.
const MAX_SEND_ATTEMPTS: u32 = 5;

enum Command {
    Line(LogLine),
    Flush(oneshot::Sender<()>),
}

/// Counters shared between the dispatcher handle and its task.
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Lines handed to [`Dispatcher::dispatch`].
    pub total_events: AtomicU64,
    /// Lines accepted by the background task.
    pub enqueued_events: AtomicU64,
    /// Lines dropped because the channel was full or closed.
    pub dropped_events: AtomicU64,
}

/// Handle feeding formatted lines to a background task that batches them
/// and fans each batch out to every sink.
///
/// Sink I/O is fully decoupled from the logging thread: [`dispatch`]
/// never blocks and drops the line when the channel is full.
///
/// [`dispatch`]: Dispatcher::dispatch
pub struct Dispatcher {
    sender: mpsc::Sender<Command>,
    stats: Arc<DispatchStats>,
}

impl Dispatcher {
    /// Spawn the background task on the current Tokio runtime.
    ///
    /// Minimal thresholds are enforced for `buffer`, `batch_size` and
    /// `flush_interval` to avoid degenerate configurations.
    pub fn spawn(
        sinks: Vec<Arc<dyn LogSink>>,
        buffer: usize,
        batch_size: usize,
        flush_interval: Duration,
    ) -> Result<(Self, JoinHandle<()>), ConfigError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;

        let buffer = buffer.max(16);
        let batch_size = batch_size.max(1);
        let flush_interval = flush_interval.max(Duration::from_millis(10));

        let (tx, mut rx) = mpsc::channel::<Command>(buffer);
        let stats = Arc::new(DispatchStats::default());
        let stats_bg = Arc::clone(&stats);

        let handle = runtime.spawn(async move {
            let mut batch = Vec::with_capacity(batch_size);
            // One ticker for the task's lifetime: incoming lines must not
            // push back the deadline of a partial batch.
            let mut ticker = interval(flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                tokio::select! {
                    command = rx.recv() => match command {
                        Some(Command::Line(line)) => {
                            batch.push(line);
                            stats_bg.enqueued_events.fetch_add(1, Ordering::Relaxed);
                            if batch.len() >= batch_size {
                                send_batch(&sinks, &mut batch).await;
                            }
                        }
                        Some(Command::Flush(done)) => {
                            send_batch(&sinks, &mut batch).await;
                            flush_sinks(&sinks).await;
                            let _ = done.send(());
                        }
                        None => {
                            send_batch(&sinks, &mut batch).await;
                            flush_sinks(&sinks).await;
                            break;
                        }
                    },
                    _ = ticker.tick() => {
                        send_batch(&sinks, &mut batch).await;
                    }
                }
            }
        });

        Ok((Self { sender: tx, stats }, handle))
    }

    /// Queue one line without waiting.
    pub fn dispatch(&self, line: LogLine) {
        self.stats.total_events.fetch_add(1, Ordering::Relaxed);
        if self.sender.try_send(Command::Line(line)).is_err() {
            self.stats.dropped_events.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(target: INTERNAL_TARGET, "log channel full, dropping line");
        }
    }

    /// Wait until every line queued before this call reached the sinks
    /// and the sinks were flushed.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(Command::Flush(done)).await.is_ok() {
            let _ = wait.await;
        }
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }
}

async fn send_batch(sinks: &[Arc<dyn LogSink>], batch: &mut Vec<LogLine>) {
    if batch.is_empty() {
        return;
    }
    for sink in sinks {
        if let Err(e) = send_with_retry(sink.as_ref(), batch).await {
            tracing::warn!(target: INTERNAL_TARGET, error = %e, lines = batch.len(), "giving up on log batch");
        }
    }
    batch.clear();
}

async fn send_with_retry(
    sink: &dyn LogSink,
    batch: &[LogLine],
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut backoff = Duration::from_millis(100);
    let max_backoff = Duration::from_secs(10);
    let mut sent = 0;
    let mut attempt = 1;

    loop {
        let mut last_err = None;
        for line in &batch[sent..] {
            if let Err(e) = sink.send(line).await {
                last_err = Some(e);
                break;
            }
            sent += 1;
        }

        let Some(err) = last_err else {
            return Ok(());
        };
        if attempt >= MAX_SEND_ATTEMPTS {
            return Err(err);
        }

        tracing::debug!(target: INTERNAL_TARGET, error = %err, ?backoff, "log sink send failed, retrying");
        sleep(backoff).await;
        backoff = std::cmp::min(backoff * 2, max_backoff);
        attempt += 1;
    }
}

async fn flush_sinks(sinks: &[Arc<dyn LogSink>]) {
    for sink in sinks {
        if let Err(e) = sink.flush().await {
            tracing::warn!(target: INTERNAL_TARGET, error = %e, "log sink flush failed");
        }
    }
}
