//! Strictly-ordered, single-consumer write queue
//!
//! Many producers enqueue rendered lines without ever blocking on disk
//! I/O; exactly one consumer thread per queue processes items in FIFO
//! order, so no two lines interleave and a rotation decision always falls
//! strictly between two writes. An item completes only once the sink has
//! acknowledged readiness for the next write.

use crate::core::error::Result;
use chrono::{DateTime, Local};
use crossbeam_channel::{bounded, unbounded, Sender};
use parking_lot::Mutex;
use std::thread::{self, JoinHandle};

/// Per-item completion callback: receives that item's I/O outcome without
/// affecting subsequent items.
pub type Completion = Box<dyn FnOnce(Result<()>) + Send>;

/// Readiness reported by a sink after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkStatus {
    Ready,
    /// The sink accepted the bytes but wants a drain before the next
    /// write is issued.
    Busy,
}

/// Destination stream with an explicit backpressure signal.
pub trait Sink: Send {
    fn write_line(&mut self, bytes: &[u8]) -> Result<SinkStatus>;

    /// Block until the sink is ready for the next write.
    fn await_drain(&mut self) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// The sequential work a queue delegates to: one call per item, in order.
pub trait QueueConsumer: Send {
    fn handle(&mut self, line: &str, when: DateTime<Local>) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn close(&mut self);
}

enum QueueItem {
    Line {
        line: String,
        when: DateTime<Local>,
        done: Option<Completion>,
    },
    Flush(Sender<()>),
}

/// Handle onto one consumer thread. Dropping (or closing) the queue drains
/// every item already enqueued, then closes the consumer.
pub struct WriteQueue {
    tx: Mutex<Option<Sender<QueueItem>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WriteQueue {
    /// Spawn the consumer thread for `consumer`.
    pub fn spawn<C>(label: &str, mut consumer: C) -> Self
    where
        C: QueueConsumer + 'static,
    {
        let (tx, rx) = unbounded::<QueueItem>();
        let thread_name = format!("log-writer-{label}");
        let worker = thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                while let Ok(item) = rx.recv() {
                    match item {
                        QueueItem::Line { line, when, done } => {
                            let outcome = consumer.handle(&line, when);
                            match done {
                                Some(done) => done(outcome),
                                None => {
                                    if let Err(e) = outcome {
                                        eprintln!("[logger] write failed: {e}");
                                    }
                                }
                            }
                        }
                        QueueItem::Flush(reply) => {
                            if let Err(e) = consumer.flush() {
                                eprintln!("[logger] flush failed: {e}");
                            }
                            let _ = reply.send(());
                        }
                    }
                }
                consumer.close();
            })
            .expect("spawn log writer thread");

        Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueue one line. Never blocks on disk I/O; silently drops after
    /// close (a logging call must not fail because shutdown raced it).
    pub fn enqueue(&self, line: String, when: DateTime<Local>, done: Option<Completion>) {
        if let Some(tx) = self.tx.lock().as_ref() {
            let _ = tx.send(QueueItem::Line { line, when, done });
        }
    }

    /// Wait until every previously enqueued line has been processed and
    /// the consumer has flushed.
    pub fn flush(&self) {
        let reply = {
            let guard = self.tx.lock();
            let Some(tx) = guard.as_ref() else { return };
            let (reply_tx, reply_rx) = bounded(1);
            if tx.send(QueueItem::Flush(reply_tx)).is_err() {
                return;
            }
            reply_rx
        };
        let _ = reply.recv();
    }

    /// Drain remaining items, close the consumer, and join the thread.
    pub fn close(&self) {
        drop(self.tx.lock().take());
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}

impl Drop for WriteQueue {
    fn drop(&mut self) {
        self.close();
    }
}
