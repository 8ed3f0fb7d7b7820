//! The navigable location: what a browser would keep in its address bar.
//!
//! Browse state lives in the query string of `/` (`q`, `category`, `page`),
//! a title lives at `/anime/{id}`.

use std::borrow::Cow;
use std::fmt;

use super::filters::{Category, SearchFilters};
use crate::error::{Error, Result};

pub const ROOT: &str = "/";
const DETAILS_PREFIX: &str = "/anime/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: String,
}

impl Location {
    /// Parse `/path?query`. Only absolute paths are accepted.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if !raw.starts_with('/') {
            return Err(Error::InvalidLocation(raw.to_string()));
        }

        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, query),
            None => (raw, ""),
        };

        Ok(Self {
            path: path.to_string(),
            query: query.to_string(),
        })
    }

    pub fn root() -> Self {
        Self {
            path: ROOT.to_string(),
            query: String::new(),
        }
    }

    pub fn browse(query: String) -> Self {
        Self {
            path: ROOT.to_string(),
            query,
        }
    }

    pub fn details(id: u64) -> Self {
        Self {
            path: format!("{}{}", DETAILS_PREFIX, id),
            query: String::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn route(&self) -> Route {
        if self.path == ROOT {
            return Route::Browse {
                query: self.query.clone(),
            };
        }

        match self.path.strip_prefix(DETAILS_PREFIX) {
            Some(id) if !id.contains('/') => Route::Details { id: id.to_string() },
            _ => Route::NotFound {
                path: self.path.clone(),
            },
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Browse { query: String },
    /// The id is left unvalidated; the detail controller owns that
    Details { id: String },
    NotFound { path: String },
}

/// Browse state as carried by a location query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseState {
    pub filters: SearchFilters,
    pub page: u32,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            filters: SearchFilters::default(),
            page: 1,
        }
    }
}

impl BrowseState {
    /// Unknown categories fall back to `All`, anything but a positive integer page to 1.
    pub fn from_query(query: &str) -> Self {
        let params = parse_query(query);
        let get = |key: &str| lookup(&params, key);

        let category = get("category")
            .and_then(Category::from_label)
            .unwrap_or_default();
        let page = get("page")
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        Self {
            filters: SearchFilters::new(get("q").unwrap_or_default(), category),
            page,
        }
    }

    /// Canonical query string: `q`, `category`, `page`, each omitted at its default
    pub fn to_query(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if !self.filters.query.is_empty() {
            parts.push(format!("q={}", urlencoding::encode(&self.filters.query)));
        }
        if self.filters.category != Category::All {
            parts.push(format!("category={}", self.filters.category.as_label()));
        }
        if self.page > 1 {
            parts.push(format!("page={}", self.page));
        }
        parts.join("&")
    }

    pub fn to_location(&self) -> Location {
        Location::browse(self.to_query())
    }
}

/// Split a query string into decoded pairs. The first occurrence of a key wins
/// on lookup; pairs that do not decode are skipped.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Some((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn lookup<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced: Cow<str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    urlencoding::decode(&spaced).ok().map(Cow::into_owned)
}
