//! ASCII shell-style pattern matching for hostname rules
//!
//! Supports `*` (any run of characters, including empty) and `?` (any
//! single character). Matching is byte-wise and case-sensitive; callers
//! lowercase both sides for the case-insensitive hostname comparisons.

/// Check whether `input` matches the wildcard `pattern`.
pub(crate) fn matches_pattern(pattern: &str, input: &str) -> bool {
    let p = pattern.as_bytes();
    let s = input.as_bytes();
    let mut pi = 0;
    let mut si = 0;
    // Position of the last '*' seen, and where its match currently ends.
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while si < s.len() {
        if pi < p.len() && (p[pi] == b'?' || p[pi] == s[si]) {
            pi += 1;
            si += 1;
        } else if pi < p.len() && p[pi] == b'*' {
            star = Some(pi);
            mark = si;
            pi += 1;
        } else if let Some(star_pos) = star {
            // Backtrack: let the last '*' swallow one more byte.
            pi = star_pos + 1;
            mark += 1;
            si = mark;
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == b'*' {
        pi += 1;
    }
    pi == p.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_match() {
        assert!(matches_pattern("example.com", "example.com"));
        assert!(!matches_pattern("example.com", "example.org"));
        assert!(!matches_pattern("example.com", "www.example.com"));
    }

    #[test]
    fn star_matches_any_run() {
        assert!(matches_pattern("*.example.com", "www.example.com"));
        assert!(matches_pattern("*.example.com", "a.b.example.com"));
        assert!(!matches_pattern("*.example.com", "example.com"));
        assert!(matches_pattern("*example.com", "example.com"));
        assert!(matches_pattern("*example.com", "notexample.com"));
        assert!(matches_pattern("*", "anything.at.all"));
        assert!(matches_pattern("*", ""));
    }

    #[test]
    fn question_mark_matches_one_byte() {
        assert!(matches_pattern("foo?", "food"));
        assert!(!matches_pattern("foo?", "foo"));
        assert!(!matches_pattern("foo?", "foods"));
    }

    #[test]
    fn multiple_stars_backtrack() {
        assert!(matches_pattern("*.corp.*.com", "www.corp.eu.com"));
        assert!(!matches_pattern("*.corp.*.com", "corp.eu.com"));
    }

    #[test]
    fn trailing_stars_are_optional() {
        assert!(matches_pattern("host*", "host"));
        assert!(matches_pattern("host**", "host"));
    }
}
