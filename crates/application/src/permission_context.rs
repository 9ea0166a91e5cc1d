use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use clubhouse_domain::{PermissionRecord, UserId};
use tokio::sync::{Mutex, watch};
use tracing::debug;

use crate::PermissionResolver;

/// Resolution status of the current principal as observed by views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionStatus {
    /// A fetch for the current principal is outstanding.
    Loading,
    /// The record of the current principal is known.
    Ready(Arc<PermissionRecord>),
}

impl PermissionStatus {
    /// Returns the resolved record, if any.
    #[must_use]
    pub fn record(&self) -> Option<&PermissionRecord> {
        match self {
            Self::Loading => None,
            Self::Ready(record) => Some(record.as_ref()),
        }
    }

    /// Returns whether resolution is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Tracks the signed-in principal and publishes its permission status.
///
/// Starts in [`PermissionStatus::Loading`] until the first principal is set.
/// A resolution that finishes after the principal changed is discarded here;
/// its cache write still lands.
pub struct PermissionContext {
    resolver: PermissionResolver,
    principal: Mutex<Option<UserId>>,
    generation: AtomicU64,
    status: watch::Sender<PermissionStatus>,
}

impl PermissionContext {
    /// Creates a context with no principal yet.
    #[must_use]
    pub fn new(resolver: PermissionResolver) -> Self {
        let (status, _) = watch::channel(PermissionStatus::Loading);
        Self {
            resolver,
            principal: Mutex::new(None),
            generation: AtomicU64::new(0),
            status,
        }
    }

    /// Returns a receiver notified on every published status.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PermissionStatus> {
        self.status.subscribe()
    }

    /// Returns the latest published status.
    #[must_use]
    pub fn status(&self) -> PermissionStatus {
        self.status.borrow().clone()
    }

    /// Returns the current principal.
    pub async fn principal(&self) -> Option<UserId> {
        self.principal.lock().await.clone()
    }

    /// Switches to a new principal and resolves its permissions.
    ///
    /// Publishes `Loading` first, then the resolved record.
    pub async fn set_principal(&self, principal: Option<UserId>) {
        let generation = self.next_generation();
        *self.principal.lock().await = principal.clone();
        self.status.send_replace(PermissionStatus::Loading);

        let record = self.resolver.resolve(principal.as_ref()).await;
        self.publish(generation, record);
    }

    /// Refetches the current principal's permissions, bypassing the cache.
    ///
    /// The previous record stays published until the new one arrives. Without
    /// a principal the empty record is published and the cache is untouched.
    pub async fn refresh(&self) {
        let generation = self.next_generation();
        let Some(principal) = self.principal().await else {
            self.publish(generation, Arc::new(PermissionRecord::empty()));
            return;
        };

        self.resolver.invalidate(Some(&principal)).await;
        let record = self.resolver.resolve(Some(&principal)).await;
        self.publish(generation, record);
    }

    /// Clears the principal and its cached record, publishing the empty record.
    pub async fn sign_out(&self) {
        let generation = self.next_generation();
        let previous = self.principal.lock().await.take();

        if let Some(previous) = previous.as_ref() {
            self.resolver.invalidate(Some(previous)).await;
        }
        self.publish(generation, Arc::new(PermissionRecord::empty()));
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, generation: u64, record: Arc<PermissionRecord>) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded permission resolution");
            return;
        }

        self.status.send_replace(PermissionStatus::Ready(record));
    }
}
