//! Proxy names and outbound tags.
//!
//! Clash group members and sing-box/Xray routing refer to proxies by name,
//! so names inside one config must be unique and non-empty. A server keeps
//! its own name when it satisfies both; otherwise it is called
//! `server-<index>`, with `<index>` its position in the generator's input.

use std::collections::HashSet;

/// Hands out unique names for one generated config.
#[derive(Debug, Default)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names already handed out (plus any reserved ones).
    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Reserve a fixed name, such as the `direct` outbound tag.
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    /// Name for the server at `index` whose own name is `preferred`.
    pub fn assign(&mut self, index: usize, preferred: &str) -> String {
        let preferred = preferred.trim();
        if !preferred.is_empty() && !self.used.contains(preferred) {
            self.used.insert(preferred.to_string());
            return preferred.to_string();
        }

        let base = format!("server-{index}");
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}
