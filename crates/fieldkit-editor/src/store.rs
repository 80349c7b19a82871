//! Field persistence
//!
//! [`FieldStore`] is the contract with whatever keeps fields between runs.
//! The editing engine never awaits it: the host hands finished fields to a
//! [`PersistenceQueue`], which runs the store calls on a tokio runtime and
//! reports their outcomes back to the UI thread through a channel.

use async_trait::async_trait;
use fieldkit_core::{thread_safe_rw_map, ThreadSafeRwMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Mutex};

use crate::error::{StoreError, StoreResult};
use crate::model::{FieldId, FieldPolygon};

/// Persistence collaborator for field polygons.
///
/// Failures are reported as [`StoreError`] values; the caller decides
/// whether to retry.
#[async_trait]
pub trait FieldStore: Send + Sync {
    /// Inserts or replaces a field, returning the id it is stored under.
    async fn save(&self, field: &FieldPolygon) -> StoreResult<FieldId>;

    /// Every stored field, in creation order.
    async fn load_all(&self) -> StoreResult<Vec<FieldPolygon>>;

    /// Removes a field. Fails with [`StoreError::NotFound`] if it is absent.
    async fn delete(&self, id: FieldId) -> StoreResult<()>;
}

fn sorted(mut fields: Vec<FieldPolygon>) -> Vec<FieldPolygon> {
    fields.sort_by(|a, b| a.sequence.cmp(&b.sequence).then(a.created_at.cmp(&b.created_at)));
    fields
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Store backed by a map, for tests and as an offline cache.
#[derive(Debug, Clone, Default)]
pub struct MemoryFieldStore {
    fields: ThreadSafeRwMap<FieldId, FieldPolygon>,
}

impl MemoryFieldStore {
    pub fn new() -> Self {
        Self {
            fields: thread_safe_rw_map(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }
}

#[async_trait]
impl FieldStore for MemoryFieldStore {
    async fn save(&self, field: &FieldPolygon) -> StoreResult<FieldId> {
        self.fields.write().insert(field.id, field.clone());
        Ok(field.id)
    }

    async fn load_all(&self) -> StoreResult<Vec<FieldPolygon>> {
        Ok(sorted(self.fields.read().values().cloned().collect()))
    }

    async fn delete(&self, id: FieldId) -> StoreResult<()> {
        self.fields
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

// =============================================================================
// JSON FILE STORE
// =============================================================================

const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct FieldDocument {
    version: u32,
    fields: Vec<FieldPolygon>,
}

/// Store keeping every field in a single JSON document.
///
/// Each write replaces the whole document through a temporary file and a
/// rename. Writes from one store instance are serialised.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> StoreResult<FieldDocument> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No field document at {}", self.path.display());
                return Ok(FieldDocument {
                    version: DOCUMENT_VERSION,
                    fields: Vec::new(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let document: FieldDocument = serde_json::from_str(&content)?;
        if document.version > DOCUMENT_VERSION {
            return Err(StoreError::Backend(format!(
                "unsupported document version {}",
                document.version
            )));
        }
        Ok(document)
    }

    async fn write_document(&self, document: &FieldDocument) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

impl fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonFileStore").field("path", &self.path).finish()
    }
}

#[async_trait]
impl FieldStore for JsonFileStore {
    async fn save(&self, field: &FieldPolygon) -> StoreResult<FieldId> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        match document.fields.iter_mut().find(|f| f.id == field.id) {
            Some(existing) => *existing = field.clone(),
            None => document.fields.push(field.clone()),
        }
        self.write_document(&document).await?;
        tracing::debug!("Saved field {} to {}", field.id, self.path.display());
        Ok(field.id)
    }

    async fn load_all(&self) -> StoreResult<Vec<FieldPolygon>> {
        let document = self.read_document().await?;
        Ok(sorted(document.fields))
    }

    async fn delete(&self, id: FieldId) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        let before = document.fields.len();
        document.fields.retain(|f| f.id != id);
        if document.fields.len() == before {
            return Err(StoreError::NotFound(id));
        }
        self.write_document(&document).await
    }
}

// =============================================================================
// PERSISTENCE QUEUE
// =============================================================================

/// Kind of a queued store request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOp {
    Save,
    Delete,
}

/// Completed store request, delivered by [`PersistenceQueue::drain_outcomes`].
#[derive(Debug)]
pub struct PersistOutcome {
    pub op: PersistOp,
    pub field: FieldId,
    pub result: StoreResult<()>,
}

enum PersistRequest {
    Save(FieldPolygon),
    Delete(FieldId),
}

impl PersistRequest {
    fn op(&self) -> PersistOp {
        match self {
            PersistRequest::Save(_) => PersistOp::Save,
            PersistRequest::Delete(_) => PersistOp::Delete,
        }
    }

    fn field(&self) -> FieldId {
        match self {
            PersistRequest::Save(field) => field.id,
            PersistRequest::Delete(id) => *id,
        }
    }
}

/// Runs store requests in the background and collects their outcomes.
///
/// Requests are executed one at a time, in the order they were queued, by a
/// single worker task. A save followed by a delete of the same field always
/// reaches the store in that order.
pub struct PersistenceQueue {
    request_tx: mpsc::UnboundedSender<PersistRequest>,
    outcome_rx: mpsc::UnboundedReceiver<PersistOutcome>,
    pending: Arc<AtomicUsize>,
}

impl PersistenceQueue {
    /// Creates a queue whose worker runs on `runtime`.
    pub fn new(store: Arc<dyn FieldStore>, runtime: Handle) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));

        runtime.spawn(Self::run_worker(store, request_rx, outcome_tx, pending.clone()));

        Self {
            request_tx,
            outcome_rx,
            pending,
        }
    }

    /// Queues a save of a copy of `field`.
    pub fn save(&self, field: &FieldPolygon) {
        self.enqueue(PersistRequest::Save(field.clone()));
    }

    /// Queues a delete.
    pub fn delete(&self, id: FieldId) {
        self.enqueue(PersistRequest::Delete(id));
    }

    /// Requests queued or running.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Outcomes that arrived since the last call, without blocking.
    pub fn drain_outcomes(&mut self) -> Vec<PersistOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Waits for the next outcome. Intended for async hosts and tests.
    pub async fn next_outcome(&mut self) -> Option<PersistOutcome> {
        self.outcome_rx.recv().await
    }

    fn enqueue(&self, request: PersistRequest) {
        let (op, field) = (request.op(), request.field());
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.request_tx.send(request).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            tracing::error!("Persistence worker stopped, dropping {:?} of {}", op, field);
        }
    }

    async fn run_worker(
        store: Arc<dyn FieldStore>,
        mut requests: mpsc::UnboundedReceiver<PersistRequest>,
        outcomes: mpsc::UnboundedSender<PersistOutcome>,
        pending: Arc<AtomicUsize>,
    ) {
        while let Some(request) = requests.recv().await {
            let (op, field) = (request.op(), request.field());
            let result = match &request {
                PersistRequest::Save(polygon) => store.save(polygon).await.map(|_| ()),
                PersistRequest::Delete(id) => store.delete(*id).await,
            };
            match &result {
                Ok(()) => tracing::debug!("{:?} of {} completed", op, field),
                Err(e) => tracing::warn!(
                    "{:?} of {} failed (retryable: {}): {}",
                    op,
                    field,
                    e.is_retryable(),
                    e
                ),
            }
            pending.fetch_sub(1, Ordering::SeqCst);
            // A dropped queue discards the outcome.
            let _ = outcomes.send(PersistOutcome { op, field, result });
        }
        tracing::debug!("Persistence worker finished");
    }
}

impl fmt::Debug for PersistenceQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceQueue")
            .field("pending", &self.pending())
            .finish()
    }
}
