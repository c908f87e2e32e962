// Batch loader: runs batch fetches on a background runtime for the synchronous TUI loop

use crate::cache::{fetch_batch, LoadedBatch};
use crate::error::Result;
use crate::source::ImageSource;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

/// State of the most recent load request
#[derive(Debug)]
pub enum LoadPoll {
    /// Nothing was requested
    Idle,
    /// Still fetching
    Pending,
    /// The batch arrived
    Ready(LoadedBatch),
    /// The background task went away without an answer
    Failed(String),
}

#[derive(Debug)]
struct PendingLoad {
    epoch: u64,
    receiver: oneshot::Receiver<LoadedBatch>,
}

/// Synchronous front for batch loading.
///
/// Only the latest request is tracked. Starting a new one drops the receiver of the previous
/// request, so a batch from an older epoch can never be delivered.
pub struct BatchLoader {
    runtime: tokio::runtime::Runtime,
    source: Arc<dyn ImageSource>,
    pending: Option<PendingLoad>,
}

impl BatchLoader {
    pub fn new(source: Arc<dyn ImageSource>) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            runtime,
            source,
            pending: None,
        })
    }

    /// Starts fetching `count` images for the session generation `epoch`
    pub fn request(&mut self, epoch: u64, count: usize) {
        if let Some(previous) = self.pending.take() {
            debug!(epoch = previous.epoch, "Abandoning superseded load");
        }

        let (tx, rx) = oneshot::channel();
        let source = Arc::clone(&self.source);
        self.runtime.spawn(async move {
            let batch = fetch_batch(source.as_ref(), count, epoch).await;
            if tx.send(batch).is_err() {
                debug!(epoch, "Load finished after being superseded");
            }
        });

        self.pending = Some(PendingLoad {
            epoch,
            receiver: rx,
        });
    }

    /// Checks for the result of the latest request without blocking
    pub fn poll(&mut self) -> LoadPoll {
        let Some(pending) = self.pending.as_mut() else {
            return LoadPoll::Idle;
        };

        match pending.receiver.try_recv() {
            Ok(batch) => {
                self.pending = None;
                LoadPoll::Ready(batch)
            }
            Err(oneshot::error::TryRecvError::Empty) => LoadPoll::Pending,
            Err(oneshot::error::TryRecvError::Closed) => {
                let epoch = pending.epoch;
                self.pending = None;
                LoadPoll::Failed(format!("Loader for session {} stopped", epoch))
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Epoch of the request in flight, if any
    pub fn pending_epoch(&self) -> Option<u64> {
        self.pending.as_ref().map(|pending| pending.epoch)
    }
}
