//! # Server Filtering
//!
//! Exclusion runs first, then inclusion. Names match exactly
//! (case-sensitive). The outcome keeps the pre-filter total so metadata
//! reports real counts instead of reconstructing them from option lists.

use subbox_core::ParsedServer;

use crate::metadata::SubscriptionCounts;
use crate::options::ExportOptions;

/// Servers left after filtering, plus the count before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Servers that survived, in input order.
    pub servers: Vec<ParsedServer>,
    /// Number of servers before filtering.
    pub total: usize,
}

impl FilterOutcome {
    pub fn kept(&self) -> usize {
        self.servers.len()
    }

    pub fn excluded(&self) -> usize {
        self.total - self.kept()
    }

    /// Counts for export metadata.
    pub fn counts(&self) -> SubscriptionCounts {
        SubscriptionCounts::new(self.total, self.kept())
    }
}

/// Apply `exclude_servers` and `include_servers` from `options`.
pub fn filter_servers(servers: &[ParsedServer], options: &ExportOptions) -> FilterOutcome {
    let kept: Vec<ParsedServer> = servers
        .iter()
        .filter(|server| !options.exclude_servers.contains(&server.name))
        .filter(|server| {
            options.include_servers.is_empty() || options.include_servers.contains(&server.name)
        })
        .cloned()
        .collect();

    tracing::info!(
        total = servers.len(),
        kept = kept.len(),
        "filtered servers"
    );

    FilterOutcome {
        servers: kept,
        total: servers.len(),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn name() -> impl Strategy<Value = String> {
        "[a-d]{1,2}"
    }

    proptest! {
        #[test]
        fn kept_servers_respect_both_lists(
            input in prop::collection::vec(name(), 0..12),
            exclude in prop::collection::vec(name(), 0..4),
            include in prop::collection::vec(name(), 0..4),
        ) {
            let servers: Vec<ParsedServer> = input
                .iter()
                .map(|n| ParsedServer::new("trojan", "example.com", 443).with_name(n.as_str()))
                .collect();
            let options = ExportOptions::default().exclude(exclude.clone()).include(include.clone());
            let outcome = filter_servers(&servers, &options);

            prop_assert_eq!(outcome.total, servers.len());
            prop_assert_eq!(outcome.kept() + outcome.excluded(), outcome.total);
            for server in &outcome.servers {
                prop_assert!(!exclude.contains(&server.name));
                prop_assert!(include.is_empty() || include.contains(&server.name));
            }
        }
    }
}
