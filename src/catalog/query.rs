use super::filters::SearchFilters;

/// Fixed parameters appended to every list request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySettings {
    pub limit: u32,
    pub sfw: bool,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            limit: 24,
            sfw: true,
        }
    }
}

/// Parameters for `GET /anime`, in the order they are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    params: Vec<(&'static str, String)>,
}

impl ListQuery {
    /// Omitted filters are left out entirely rather than sent empty.
    pub fn build(filters: &SearchFilters, page: u32, settings: &QuerySettings) -> Self {
        let mut params = Vec::with_capacity(5);

        if !filters.query.is_empty() {
            params.push(("q", filters.query.clone()));
        }
        if let Some(status) = filters.category.as_status_param() {
            params.push(("status", status.to_string()));
        }

        params.push(("page", page.to_string()));
        params.push(("limit", settings.limit.to_string()));
        params.push(("sfw", settings.sfw.to_string()));

        Self { params }
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn page(&self) -> Option<u32> {
        self.get("page").and_then(|p| p.parse().ok())
    }
}
