use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc;

use super::CatalogMessage;
use super::query::ListQuery;
use crate::error::{Error, Result};
use crate::jikan::{Anime, AnimePage, CatalogApi};

pub const TEST_DEBOUNCE: Duration = Duration::from_millis(250);

/// In-memory catalog. Page `p` holds ids `p * 1000 + i`.
pub struct FakeCatalog {
    pub total_pages: u32,
    pub per_page: usize,
    pub list_calls: Mutex<Vec<ListQuery>>,
    pub detail_calls: Mutex<Vec<u64>>,
    pub items_override: Mutex<Option<Vec<Anime>>>,
    pub failing: Mutex<bool>,
}

impl FakeCatalog {
    pub fn new(total_pages: u32, per_page: usize) -> Self {
        Self {
            total_pages,
            per_page,
            list_calls: Mutex::new(Vec::new()),
            detail_calls: Mutex::new(Vec::new()),
            items_override: Mutex::new(None),
            failing: Mutex::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn set_items(&self, items: Vec<Anime>) {
        *self.items_override.lock().unwrap() = Some(items);
    }

    pub fn list_calls(&self) -> Vec<ListQuery> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> Vec<u64> {
        self.detail_calls.lock().unwrap().clone()
    }

    fn check_failing(&self) -> Result<()> {
        if *self.failing.lock().unwrap() {
            Err(Error::Api {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            })
        } else {
            Ok(())
        }
    }
}

pub fn anime(id: u64, title: &str) -> Anime {
    Anime {
        mal_id: id,
        title: title.to_string(),
        ..Default::default()
    }
}

#[async_trait::async_trait]
impl CatalogApi for FakeCatalog {
    async fn list_anime(&self, query: &ListQuery) -> Result<AnimePage> {
        self.list_calls.lock().unwrap().push(query.clone());
        self.check_failing()?;

        let page = query.page().unwrap_or(1);
        let items = match self.items_override.lock().unwrap().clone() {
            Some(items) => items,
            None if page <= self.total_pages => (0..self.per_page as u64)
                .map(|i| anime(page as u64 * 1000 + i, &format!("Page {} #{}", page, i)))
                .collect(),
            None => Vec::new(),
        };

        Ok(AnimePage {
            items,
            total_pages: self.total_pages,
        })
    }

    async fn get_anime(&self, id: u64) -> Result<Anime> {
        self.detail_calls.lock().unwrap().push(id);
        self.check_failing()?;
        Ok(anime(id, &format!("Anime {}", id)))
    }
}

/// Let the debounce window pass and collect whatever the fetches posted
pub async fn settle(rx: &mut mpsc::UnboundedReceiver<CatalogMessage>) -> Vec<CatalogMessage> {
    tokio::time::sleep(TEST_DEBOUNCE + Duration::from_millis(50)).await;
    let mut messages = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        messages.push(msg);
    }
    messages
}
