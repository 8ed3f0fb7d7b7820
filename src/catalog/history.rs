use super::location::{Location, Route};

/// Back/forward stack of visited locations
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Location>,
    index: usize,
}

impl History {
    pub fn new(start: Location) -> Self {
        Self {
            entries: vec![start],
            index: 0,
        }
    }

    pub fn current(&self) -> &Location {
        &self.entries[self.index]
    }

    /// Navigate to a new entry, dropping anything ahead of the current one
    pub fn push(&mut self, location: Location) {
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index = self.entries.len() - 1;
    }

    /// Rewrite the current entry in place
    pub fn replace(&mut self, location: Location) {
        self.entries[self.index] = location;
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Step back. A detail page opened directly has nothing behind it, so it
    /// is replaced with the catalog root instead. Returns whether the current
    /// location changed.
    pub fn back(&mut self) -> bool {
        if self.can_go_back() {
            self.index -= 1;
            return true;
        }

        if matches!(self.current().route(), Route::Details { .. }) {
            self.replace(Location::root());
            return true;
        }

        false
    }

    pub fn forward(&mut self) -> bool {
        if self.can_go_forward() {
            self.index += 1;
            true
        } else {
            false
        }
    }
}
