use std::collections::HashSet;

/// Usernames exempt from any automated action
///
/// Built once per run from a comma separated string. Matching is exact and
/// case sensitive, entries are not trimmed. An empty source string yields a
/// set holding the empty string.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    users: HashSet<String>,
}

impl IgnoreList {
    pub fn parse(ignore_list: &str) -> Self {
        let users: HashSet<String> = ignore_list.split(',').map(str::to_string).collect();

        tracing::debug!(count = users.len(), "Initialized ignore list");
        Self { users }
    }

    /// Check if a username is exempt
    pub fn contains(&self, username: &str) -> bool {
        self.users.contains(username)
    }
}

/// One-shot form of [`IgnoreList::contains`]
pub fn is_ignored(username: &str, ignore_list: &str) -> bool {
    ignore_list.split(',').any(|entry| entry == username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ignored_exact_match() {
        assert!(is_ignored("carol", "alice,carol"));
        assert!(!is_ignored("dave", "alice,carol"));
    }

    #[test]
    fn test_is_ignored_case_sensitive() {
        assert!(!is_ignored("Carol", "carol"));
    }

    #[test]
    fn test_is_ignored_no_trimming() {
        assert!(!is_ignored("carol", "alice, carol"));
        assert!(is_ignored(" carol", "alice, carol"));
    }

    #[test]
    fn test_is_ignored_no_substring_match() {
        assert!(!is_ignored("car", "carol"));
        assert!(!is_ignored("carol", "carol@example.com"));
    }

    #[test]
    fn test_empty_list_holds_empty_string() {
        let list = IgnoreList::parse("");
        assert_eq!(list.users, HashSet::from([String::new()]));
        assert!(list.contains(""));
        assert!(!list.contains("alice"));
        assert!(is_ignored("", ""));
    }

    #[test]
    fn test_parse_matches_free_function() {
        let raw = "alice,bob@example.com,carol";
        let list = IgnoreList::parse(raw);

        for name in ["alice", "bob@example.com", "carol", "dave", ""] {
            assert_eq!(list.contains(name), is_ignored(name, raw), "mismatch for {name:?}");
        }
    }

    #[test]
    fn test_duplicate_entries_collapse() {
        let list = IgnoreList::parse("alice,alice");
        assert_eq!(list.users, HashSet::from(["alice".to_string()]));
    }
}
