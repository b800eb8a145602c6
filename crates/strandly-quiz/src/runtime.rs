use std::sync::Arc;

use quiz_spec::Catalog;
use quiz_store::{FsStore, KeyValueStore};
use tracing::info;

use crate::catalog::{CatalogLoader, CatalogSource};
use crate::clock::{Clock, SystemClock};
use crate::config::QuizConfig;
use crate::payment::PaymentFlow;
use crate::session::QuizSession;
use crate::snapshot::SnapshotStore;
use crate::sync::{FallbackPolicy, SyncClient};
use crate::transport::{HttpQuizApi, HttpSetupError, QuizApi};

/// Wires configuration, transport, storage and clock into quiz sessions.
///
/// The storage backend is shared by every session, the sync client and the
/// payment flow built from one runtime. Clones share the submission and
/// payment in-flight guards.
#[derive(Clone)]
pub struct QuizRuntime {
    config: QuizConfig,
    api: Arc<dyn QuizApi>,
    snapshots: SnapshotStore,
    clock: Arc<dyn Clock>,
    sync: SyncClient,
    payment: PaymentFlow,
}

impl QuizRuntime {
    pub fn new(
        config: QuizConfig,
        api: Arc<dyn QuizApi>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let snapshots = SnapshotStore::new(store, config.progress_ttl(), config.results_ttl());
        let sync = SyncClient::new(
            api.clone(),
            snapshots.clone(),
            clock.clone(),
            config.request_timeout(),
        );
        let payment = PaymentFlow::new(api.clone(), snapshots.clone(), config.payment.clone());
        Self {
            config,
            api,
            snapshots,
            clock,
            sync,
            payment,
        }
    }

    /// HTTP transport, filesystem storage and the system clock.
    pub fn from_config(config: QuizConfig) -> Result<Self, HttpSetupError> {
        let api = HttpQuizApi::from_config(&config)?;
        let dir = config.resolve_storage_dir()?;
        info!(api = %api.base_url(), storage = %dir.display(), "quiz runtime ready");
        Ok(Self::new(
            config,
            Arc::new(api),
            Arc::new(FsStore::new(dir)),
            Arc::new(SystemClock),
        ))
    }

    pub fn with_fallback_policy(mut self, policy: FallbackPolicy) -> Self {
        self.sync = self.sync.with_policy(policy);
        self
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn sync(&self) -> &SyncClient {
        &self.sync
    }

    pub fn catalog_loader(&self) -> CatalogLoader {
        CatalogLoader::new(self.api.clone(), self.config.request_timeout())
    }

    /// Payment flow sharing one single-flight guard with every other flow from this runtime.
    pub fn payment(&self) -> PaymentFlow {
        self.payment.clone()
    }

    /// Loads the catalog and resumes or starts a session on it.
    pub async fn start_session(&self) -> (QuizSession, CatalogSource) {
        let (catalog, source) = self.catalog_loader().load().await;
        (self.session_with(catalog), source)
    }

    pub fn session_with(&self, catalog: Catalog) -> QuizSession {
        QuizSession::restore(
            catalog,
            self.snapshots.clone(),
            self.sync.clone(),
            self.clock.clone(),
        )
    }
}
