//! Display-name defaults and backend file identifiers.

use std::sync::LazyLock;

use regex::Regex;

/// Extensions whose names are kept verbatim.
const VIDEO_EXTENSIONS: [&str; 5] = [".mp4", ".mov", ".avi", ".mkv", ".webm"];

/// Prefix cameras put on photo names; such names are kept verbatim.
const CAMERA_PREFIX: &str = "IMG_";

/// `" (2) "` style markers added by browsers and file managers.
static DUPLICATE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d+\)\s*").expect("valid duplicate marker pattern"));

/// Trailing `.ext`.
static EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[^/.]+$").expect("valid extension pattern"));

/// Returns `true` if `raw_name` is used unchanged as the display name.
pub fn is_preserved_name(raw_name: &str) -> bool {
    let lower = raw_name.to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        || raw_name.to_uppercase().starts_with(CAMERA_PREFIX)
}

/// Default display name for a newly added file.
///
/// Video files and camera-named photos keep their raw name. Everything else
/// loses its `" (N)"` duplicate markers and its extension:
/// `"photo (2).jpg"` becomes `"photo"`.
pub fn normalize_display_name(raw_name: &str) -> String {
    if is_preserved_name(raw_name) {
        return raw_name.to_string();
    }
    let stripped = DUPLICATE_MARKER.replace_all(raw_name, "");
    EXTENSION.replace(&stripped, "").into_owned()
}

/// Identifier the backend uses to correlate the chunks of one upload attempt.
///
/// `"{size}-{alphanumeric raw name}-{stamp}"`. The stamp differs per attempt,
/// so chunks of an earlier failed attempt are never merged into a new one.
pub fn file_identifier(size: u64, raw_name: &str, stamp: i64) -> String {
    let sanitized: String = raw_name.chars().filter(char::is_ascii_alphanumeric).collect();
    format!("{size}-{sanitized}-{stamp}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_marker_and_extension_stripped() {
        assert_eq!(normalize_display_name("photo (2).jpg"), "photo");
        assert_eq!(normalize_display_name("report.pdf"), "report");
    }

    #[test]
    fn video_names_preserved() {
        assert_eq!(normalize_display_name("clip.mp4"), "clip.mp4");
        assert_eq!(normalize_display_name("Match (3).MOV"), "Match (3).MOV");
        assert_eq!(normalize_display_name("intro.webm"), "intro.webm");
    }

    #[test]
    fn camera_prefix_preserved() {
        assert_eq!(normalize_display_name("IMG_0099.jpg"), "IMG_0099.jpg");
        assert_eq!(normalize_display_name("img_0100.jpg"), "img_0100.jpg");
    }

    #[test]
    fn markers_in_the_middle_are_removed() {
        assert_eq!(normalize_display_name("team (1) photo.png"), "teamphoto");
        assert_eq!(normalize_display_name("a(12)(3).gif"), "a");
    }

    #[test]
    fn marker_swallows_surrounding_whitespace() {
        assert_eq!(normalize_display_name("a  (1)\tb.jpg"), "ab");
        assert_eq!(normalize_display_name("dir.v2/name.final.jpeg"), "dir.v2/name.final");
    }

    #[test]
    fn non_numeric_parentheses_kept() {
        assert_eq!(normalize_display_name("final (edit).jpg"), "final (edit)");
        assert_eq!(normalize_display_name("shot ().jpg"), "shot ()");
    }

    #[test]
    fn only_last_extension_removed() {
        assert_eq!(normalize_display_name("archive.tar.gz"), "archive.tar");
        assert_eq!(normalize_display_name("noext"), "noext");
        assert_eq!(normalize_display_name("trailingdot."), "trailingdot.");
    }

    #[test]
    fn identifier_sanitizes_name() {
        assert_eq!(
            file_identifier(2048, "my photo (2).jpg", 1_700_000_000_000),
            "2048-myphoto2jpg-1700000000000"
        );
    }

    #[test]
    fn identifier_differs_per_stamp() {
        assert_ne!(file_identifier(1, "a.jpg", 1), file_identifier(1, "a.jpg", 2));
    }
}
