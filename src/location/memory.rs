use super::{History, RawLocation};

/// In-memory session history with back/forward, for driving the router in tests.
#[derive(Debug)]
pub(crate) struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
}

impl MemoryHistory {
    pub fn starting_at(url: &str) -> Self {
        Self {
            entries: vec![url.to_string()],
            index: 0,
        }
    }

    pub fn current_url(&self) -> &str {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Simulate the user editing the address bar.
    pub fn visit(&mut self, url: &str) {
        self.push(url);
    }
}

impl History for MemoryHistory {
    fn location(&self) -> RawLocation {
        RawLocation::from_url(self.current_url())
    }

    fn push(&mut self, url: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(url.to_string());
        self.index += 1;
    }

    fn replace(&mut self, url: &str) {
        self.entries[self.index] = url.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_discards_forward_entries() {
        let mut h = MemoryHistory::starting_at("#/");
        h.push("#/list");
        h.push("#/editor/a");
        assert!(h.back());
        h.push("#/editor/b");
        assert_eq!(h.len(), 3);
        assert!(!h.forward());
        assert_eq!(h.current_url(), "#/editor/b");
    }

    #[test]
    fn replace_keeps_length() {
        let mut h = MemoryHistory::starting_at("#/");
        h.replace("#/list");
        assert_eq!(h.len(), 1);
        assert!(!h.back());
        assert_eq!(h.location().hash, "#/list");
    }
}
