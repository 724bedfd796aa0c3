//! Matching of a granted permission rule against a requested `module:action`.

/// Split a permission string into `(module, action)`.
/// A string without a `:` separator implies action `"*"`, so a bare
/// `"blog"` grant covers every blog action.
pub fn split_permission(permission: &str) -> (&str, &str) {
    permission.split_once(':').unwrap_or((permission, "*"))
}

/// Check whether a single granted rule satisfies the requested
/// `(module, action)` pair.
///
/// A rule matches when any of these holds:
/// - it is the full wildcard `*:*`
/// - its module matches and its action is `*`
/// - its module is `*` and its action matches exactly
/// - its module matches and the requested action appears in the rule's
///   comma-separated action list (whitespace-trimmed), or that list
///   contains `*`
pub fn rule_matches(rule: &str, module: &str, action: &str) -> bool {
    let (rule_module, rule_action) = split_permission(rule);

    // Wildcard checks
    if rule_module == "*" && rule_action == "*" {
        return true;
    }
    if rule_module == module && rule_action == "*" {
        return true;
    }
    if rule_module == "*" && rule_action == action {
        return true;
    }

    // Exact module match against a comma-separated action list
    if rule_module == module {
        return rule_action
            .split(',')
            .map(str::trim)
            .any(|a| a == action || a == "*");
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_with_separator() {
        assert_eq!(split_permission("blog:read"), ("blog", "read"));
        assert_eq!(split_permission("blog:a,b"), ("blog", "a,b"));
    }

    #[test]
    fn test_split_without_separator() {
        assert_eq!(split_permission("blog"), ("blog", "*"));
    }

    #[test]
    fn test_split_keeps_remainder_intact() {
        // Only the first `:` separates module from action
        assert_eq!(split_permission("blog:a:b"), ("blog", "a:b"));
    }

    #[test]
    fn test_full_wildcard_matches_everything() {
        assert!(rule_matches("*:*", "blog", "read"));
        assert!(rule_matches("*:*", "shop", "delete"));
        assert!(rule_matches("*", "anything", "at_all"));
    }

    #[test]
    fn test_module_wildcard_action() {
        assert!(rule_matches("blog:*", "blog", "anything"));
        assert!(rule_matches("blog", "blog", "anything"));
        assert!(!rule_matches("blog:*", "shop", "anything"));
    }

    #[test]
    fn test_wildcard_module_exact_action() {
        assert!(rule_matches("*:read", "blog", "read"));
        assert!(rule_matches("*:read", "shop", "read"));
        assert!(!rule_matches("*:read", "blog", "write"));
    }

    #[test]
    fn test_exact_match() {
        assert!(rule_matches("blog:read", "blog", "read"));
        assert!(!rule_matches("blog:read", "blog", "write"));
        assert!(!rule_matches("blog:read", "shop", "read"));
    }

    #[test]
    fn test_comma_separated_action_list() {
        assert!(rule_matches("blog:a,b", "blog", "a"));
        assert!(rule_matches("blog:a,b", "blog", "b"));
        assert!(!rule_matches("blog:a,b", "blog", "c"));
    }

    #[test]
    fn test_action_list_entries_are_trimmed() {
        assert!(rule_matches("blog:a, b ,c", "blog", "b"));
        assert!(rule_matches("blog:a, b ,c", "blog", "c"));
    }

    #[test]
    fn test_wildcard_inside_action_list() {
        assert!(rule_matches("blog:read,*", "blog", "delete"));
        assert!(!rule_matches("blog:read,*", "shop", "delete"));
    }
}
