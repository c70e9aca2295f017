//! Status fan-out: daemon stdout plus every registered proxy subscriber.
//!
//! Each subscriber owns an unbounded outbox drained by its connection task,
//! so publishing never waits on a slow reader.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, RwLock};

use crate::error::{io_err, DaemonError};
use crate::state::Status;

pub type SubscriberId = u64;

/// Currently connected status subscribers.
#[derive(Debug, Clone, Default)]
pub struct ProxySet {
    subscribers: Arc<RwLock<HashMap<SubscriberId, mpsc::UnboundedSender<Arc<str>>>>>,
    next_id: Arc<AtomicU64>,
}

impl ProxySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber; it receives every line published from now on.
    pub async fn register(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.write().await.insert(id, tx);
        tracing::info!(subscriber = id, "registering proxy");
        Subscription { id, rx }
    }

    pub async fn remove(&self, id: SubscriberId) {
        if self.subscribers.write().await.remove(&id).is_some() {
            tracing::info!(subscriber = id, "proxy disconnected");
        }
    }

    /// Queue `line` for every subscriber, returning how many accepted it.
    async fn send_all(&self, line: &Arc<str>) -> usize {
        let subscribers = self.subscribers.read().await;
        let mut delivered = 0;
        for (id, tx) in subscribers.iter() {
            tracing::debug!(subscriber = id, "forwarding status to proxy");
            // A closed outbox means the connection task is already removing it.
            if tx.send(Arc::clone(line)).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }
}

/// Receiving end of one subscriber's outbox.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    rx: mpsc::UnboundedReceiver<Arc<str>>,
}

impl Subscription {
    /// Next newline-terminated status line, or `None` once removed.
    pub async fn next_line(&mut self) -> Option<Arc<str>> {
        self.rx.recv().await
    }
}

/// Writes each status to the daemon's own output and all subscribers.
pub struct StatusBroadcaster<W> {
    out: W,
    proxies: ProxySet,
}

impl<W: AsyncWrite + Unpin> StatusBroadcaster<W> {
    pub fn new(out: W, proxies: ProxySet) -> Self {
        Self { out, proxies }
    }

    pub async fn publish(&mut self, status: &Status) -> Result<(), DaemonError> {
        let mut line = status.to_line()?;
        line.push('\n');

        self.out
            .write_all(line.as_bytes())
            .await
            .map_err(|e| io_err("stdout", e))?;
        self.out.flush().await.map_err(|e| io_err("stdout", e))?;

        let line: Arc<str> = line.into();
        let delivered = self.proxies.send_all(&line).await;
        tracing::trace!(subscribers = delivered, "status published");
        Ok(())
    }
}
