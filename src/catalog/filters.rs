#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    All,
    Airing,
    Finished,
    Upcoming,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::All,
        Category::Airing,
        Category::Finished,
        Category::Upcoming,
    ];

    /// Label used in the location and on screen
    pub fn as_label(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Airing => "Airing",
            Category::Finished => "Finished",
            Category::Upcoming => "Upcoming",
        }
    }

    /// Value of Jikan's `status` parameter; `None` means no status filter
    pub fn as_status_param(&self) -> Option<&'static str> {
        match self {
            Category::All => None,
            Category::Airing => Some("airing"),
            Category::Finished => Some("complete"),
            Category::Upcoming => Some("upcoming"),
        }
    }

    /// Parse a location label. Unknown labels are `None`; callers fall back to `All`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "all" => Some(Category::All),
            "airing" => Some(Category::Airing),
            // older links carry the status name rather than the label
            "finished" | "complete" => Some(Category::Finished),
            "upcoming" => Some(Category::Upcoming),
            _ => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Category::All => Category::Airing,
            Category::Airing => Category::Finished,
            Category::Finished => Category::Upcoming,
            Category::Upcoming => Category::All,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Category::All => Category::Upcoming,
            Category::Airing => Category::All,
            Category::Finished => Category::Airing,
            Category::Upcoming => Category::Finished,
        }
    }
}

/// What the user is searching for. Replaced as a whole on every change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchFilters {
    pub query: String,
    pub category: Category,
}

impl SearchFilters {
    pub fn new(query: impl Into<String>, category: Category) -> Self {
        Self {
            query: query.into(),
            category,
        }
    }

    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self::new(query, self.category)
    }

    pub fn with_category(&self, category: Category) -> Self {
        Self::new(self.query.clone(), category)
    }
}
