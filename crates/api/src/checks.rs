//! Preparation of pasted text for the item check.

use std::sync::LazyLock;

use regex::Regex;

static LEADING_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("valid leading URL pattern"));

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("valid URL pattern"));

/// Normalizes pasted text into `"text | url"` lines.
///
/// Double quotes are dropped and blank lines skipped. A line that starts
/// with a URL is appended to the previous entry (and dropped when there is
/// none); a line containing a URL is split into its text and that URL; any
/// other line is kept.
pub fn merge_check_lines(raw: &str) -> Vec<String> {
    let cleaned = raw.replace('"', "");
    let mut merged: Vec<String> = Vec::new();

    for line in cleaned.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if LEADING_URL.is_match(line) {
            if let Some(last) = merged.last_mut() {
                last.push_str(" | ");
                last.push_str(line);
            }
        } else if let Some(url) = URL.find(line) {
            let text = format!("{}{}", &line[..url.start()], &line[url.end()..]);
            merged.push(format!("{} | {}", text.trim(), url.as_str()));
        } else {
            merged.push(line.to_string());
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_only_line_joins_previous() {
        let input = "Spring Cup\nhttps://example.com/a\n\n  Autumn  \n";
        assert_eq!(
            merge_check_lines(input),
            vec!["Spring Cup | https://example.com/a", "Autumn"]
        );
    }

    #[test]
    fn inline_url_is_split_out() {
        assert_eq!(
            merge_check_lines("Spring Cup https://example.com/a final"),
            vec!["Spring Cup  final | https://example.com/a"]
        );
    }

    #[test]
    fn quotes_stripped_and_crlf_handled() {
        assert_eq!(
            merge_check_lines("\"Quoted\"\r\n\"Other\" http://x.io/1\r\n"),
            vec!["Quoted", "Other | http://x.io/1"]
        );
    }

    #[test]
    fn leading_url_without_previous_entry_is_dropped() {
        assert!(merge_check_lines("https://example.com/orphan").is_empty());
    }

    #[test]
    fn inline_url_match_is_case_sensitive() {
        assert_eq!(merge_check_lines("Cup HTTP://X.IO"), vec!["Cup HTTP://X.IO"]);
        assert_eq!(
            merge_check_lines("Cup\thttps://x.io/a\tmore"),
            vec!["Cup\t\tmore | https://x.io/a"]
        );
    }

    #[test]
    fn prefix_check_ignores_case() {
        assert_eq!(
            merge_check_lines("Cup\nHTTPS://EXAMPLE.COM"),
            vec!["Cup | HTTPS://EXAMPLE.COM"]
        );
    }
}
