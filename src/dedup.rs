use std::collections::HashSet;

/// Addresses already registered with the relayer during this run.
///
/// An address counts as processed only once a relay submission containing it
/// succeeds; a failed batch leaves its addresses unmarked so a later run can
/// pick them up. The set lives for one invocation and is never persisted.
#[derive(Debug, Default)]
pub struct SeenAddresses {
    seen: HashSet<String>,
}

impl SeenAddresses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the addresses not yet successfully relayed, keeping the page
    /// order and dropping repeats within the page itself.
    pub fn filter_new(&self, addresses: &[String]) -> Vec<String> {
        let mut in_page = HashSet::new();
        addresses
            .iter()
            .filter(|a| !self.seen.contains(*a) && in_page.insert(a.as_str()))
            .cloned()
            .collect()
    }

    /// Marks a successfully relayed batch as processed.
    pub fn mark_processed(&mut self, addresses: &[String]) {
        for address in addresses {
            self.seen.insert(address.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn filter_preserves_page_order() {
        let seen = SeenAddresses::new();
        let new = seen.filter_new(&addrs(&["0xc", "0xa", "0xb"]));
        assert_eq!(new, addrs(&["0xc", "0xa", "0xb"]));
    }

    #[test]
    fn marked_addresses_are_filtered_out() {
        let mut seen = SeenAddresses::new();
        seen.mark_processed(&addrs(&["0xa", "0xb"]));

        let new = seen.filter_new(&addrs(&["0xa", "0xb", "0xc"]));
        assert_eq!(new, addrs(&["0xc"]));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn repeats_within_one_page_collapse_to_first_occurrence() {
        let seen = SeenAddresses::new();
        let new = seen.filter_new(&addrs(&["0xa", "0xb", "0xa", "0xa"]));
        assert_eq!(new, addrs(&["0xa", "0xb"]));
    }

    #[test]
    fn unmarked_addresses_stay_eligible() {
        let mut seen = SeenAddresses::new();
        // First batch fails at the relayer, nothing gets marked
        let batch = seen.filter_new(&addrs(&["0xa", "0xb"]));
        assert_eq!(batch.len(), 2);
        assert!(seen.is_empty());

        // The same addresses come back on a later page
        let retry = seen.filter_new(&addrs(&["0xa", "0xb"]));
        assert_eq!(retry, addrs(&["0xa", "0xb"]));
    }
}
