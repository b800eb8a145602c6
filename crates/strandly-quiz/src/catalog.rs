use std::sync::Arc;
use std::time::Duration;

use quiz_spec::{Catalog, builtin_catalog};
use tracing::{info, warn};

use crate::transport::QuizApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Remote,
    Builtin,
}

/// Fetches the question catalog, falling back to the built-in one.
pub struct CatalogLoader {
    api: Arc<dyn QuizApi>,
    timeout: Duration,
}

impl CatalogLoader {
    pub fn new(api: Arc<dyn QuizApi>, timeout: Duration) -> Self {
        Self { api, timeout }
    }

    /// Never fails: any network, status, decode or invariant problem yields the built-in catalog.
    pub async fn load(&self) -> (Catalog, CatalogSource) {
        let spec = match tokio::time::timeout(self.timeout, self.api.fetch_catalog()).await {
            Ok(Ok(spec)) => spec,
            Ok(Err(err)) => {
                warn!(error = %err, "catalog fetch failed, using built-in questions");
                return (builtin_catalog(), CatalogSource::Builtin);
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "catalog fetch timed out, using built-in questions"
                );
                return (builtin_catalog(), CatalogSource::Builtin);
            }
        };

        match Catalog::new(spec) {
            Ok(catalog) => {
                info!(
                    catalog_id = catalog.id(),
                    version = catalog.version(),
                    questions = catalog.len(),
                    "loaded remote catalog"
                );
                (catalog, CatalogSource::Remote)
            }
            Err(err) => {
                warn!(error = %err, "remote catalog rejected, using built-in questions");
                (builtin_catalog(), CatalogSource::Builtin)
            }
        }
    }
}
