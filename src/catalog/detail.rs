use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::debounce::Debouncer;
use super::{CatalogMessage, RequestStatus};
use crate::jikan::{Anime, CatalogApi};

/// State for a single title's page
pub struct DetailController {
    api: Arc<dyn CatalogApi>,
    tx: mpsc::UnboundedSender<CatalogMessage>,
    debouncer: Debouncer,
    id: Option<u64>,
    anime: Option<Anime>,
    status: RequestStatus,
}

impl DetailController {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        tx: mpsc::UnboundedSender<CatalogMessage>,
        debounce: Duration,
    ) -> Self {
        Self {
            api,
            tx,
            debouncer: Debouncer::new(debounce),
            id: None,
            anime: None,
            status: RequestStatus::Idle,
        }
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn anime(&self) -> Option<&Anime> {
        self.anime.as_ref()
    }

    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    /// Start loading `raw_id`, superseding any earlier load
    pub fn load(&mut self, raw_id: &str) {
        self.anime = None;

        let raw_id = raw_id.trim();
        let id = match raw_id.parse::<u64>() {
            Ok(id) => id,
            Err(_) => {
                self.debouncer.cancel();
                self.id = None;
                let message = if raw_id.is_empty() {
                    "Missing anime id".to_string()
                } else {
                    format!("Invalid anime id: {}", raw_id)
                };
                debug!(error = %message, "Rejected detail id");
                self.status = RequestStatus::Error(message);
                return;
            }
        };

        self.id = Some(id);
        self.status = RequestStatus::Loading;

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.debouncer.schedule(move |generation| async move {
            let outcome = api.get_anime(id).await.map_err(|e| e.to_string());
            let _ = tx.send(CatalogMessage::DetailFinished {
                generation,
                outcome,
            });
        });
        debug!(id, generation, "Scheduled detail fetch");
    }

    pub fn apply(&mut self, generation: u64, outcome: Result<Anime, String>) {
        if !self.debouncer.is_current(generation) {
            debug!(generation, "Dropping stale detail result");
            return;
        }

        match outcome {
            Ok(anime) => {
                self.anime = Some(anime);
                self.status = RequestStatus::Success;
            }
            Err(message) => {
                warn!(id = ?self.id, error = %message, "Detail fetch failed");
                self.anime = None;
                self.status = RequestStatus::Error(message);
            }
        }
    }

    pub fn teardown(&mut self) {
        self.debouncer.cancel();
        if self.status.is_loading() {
            self.status = RequestStatus::Idle;
        }
    }
}
