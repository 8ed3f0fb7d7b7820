pub mod debounce;
pub mod detail;
pub mod filters;
pub mod history;
pub mod location;
pub mod query;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use detail::DetailController;
pub use filters::{Category, SearchFilters};
pub use history::History;
pub use location::{BrowseState, Location, Route};
pub use search::SearchController;

use crate::jikan::{Anime, AnimePage};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl RequestStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Side effects a controller asks the view layer to carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Rewrite the current history entry; never adds one
    ReplaceLocation(Location),
    ScrollToTop,
}

/// Results posted back from background fetches, tagged with the generation
/// that issued them
#[derive(Debug)]
pub enum CatalogMessage {
    SearchFinished {
        generation: u64,
        outcome: std::result::Result<AnimePage, String>,
    },
    DetailFinished {
        generation: u64,
        outcome: std::result::Result<Anime, String>,
    },
}
