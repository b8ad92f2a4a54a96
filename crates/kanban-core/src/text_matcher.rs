use crate::Task;

/// Case-insensitive substring matcher over task titles.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Build a matcher for the query. Returns `None` for empty input, which
    /// imposes no constraint.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        Some(Self {
            needle: query.to_lowercase(),
        })
    }

    /// Whether the task title contains the query.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_text(&task.title)
    }

    /// Whether arbitrary text contains the query.
    #[must_use]
    pub fn matches_text(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcher_skips_empty_queries() {
        assert!(TextMatcher::new("").is_none());
    }

    #[test]
    fn matcher_respects_case_insensitive_search() {
        let matcher =
            TextMatcher::new("deploy").unwrap_or_else(|| panic!("matcher must exist for queries with content"));
        assert!(matcher.matches_text("Deploy app"));

        let matcher =
            TextMatcher::new("APP").unwrap_or_else(|| panic!("matcher must exist for queries with content"));
        assert!(matcher.matches_text("Deploy app"));

        let missing =
            TextMatcher::new("api").unwrap_or_else(|| panic!("matcher must exist for queries with content"));
        assert!(!missing.matches_text("Deploy app"));
    }

    #[test]
    fn matcher_handles_non_ascii_case() {
        let matcher =
            TextMatcher::new("ÉTÉ").unwrap_or_else(|| panic!("matcher must exist for queries with content"));
        assert!(matcher.matches_text("Plan d'été"));
    }
}
