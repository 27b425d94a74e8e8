//! Upload filename rules: the extension allow-list and storage-key
//! sanitisation.

use crate::config::ALLOWED_EXTENSIONS;
use unicode_normalization::UnicodeNormalization;

/// True when `filename` has a `.` and its last suffix is on the allow-list.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Reduce a client-supplied filename to a safe, flat storage key.
///
/// The name is NFKD-decomposed so accented letters keep their base letter,
/// then non-ASCII characters are dropped and path separators become word
/// breaks.
/// Whitespace runs collapse to `_`. Anything outside `[A-Za-z0-9_.-]` is
/// removed, and leading and trailing `.`/`_` are trimmed. The result may be
/// empty.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_is_case_insensitive() {
        for name in ["a.png", "a.JPG", "a.jpeg", "report.PDF", "notes.txt", "x.tar.txt"] {
            assert!(allowed_file(name), "{name} should be allowed");
        }
    }

    #[test]
    fn rejects_missing_or_unknown_extension() {
        for name in ["malware.exe", "README", "", "image.png.exe", "archive.", "gif.gif"] {
            assert!(!allowed_file(name), "{name} should be rejected");
        }
    }

    #[test]
    fn strips_path_traversal() {
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(secure_filename("/var/tmp/report.pdf"), "var_tmp_report.pdf");
    }

    #[test]
    fn collapses_whitespace_and_drops_unsafe_chars() {
        assert_eq!(secure_filename("my cool  file.txt"), "my_cool_file.txt");
        assert_eq!(secure_filename("q&a?<>|.txt"), "qa.txt");
    }

    #[test]
    fn accented_letters_keep_their_base_letter() {
        assert_eq!(secure_filename("r\u{e9}sum\u{e9}.pdf"), "resume.pdf");
        assert_eq!(secure_filename("na\u{ef}ve r\u{e9}sum\u{e9}.pdf"), "naive_resume.pdf");
        assert_eq!(secure_filename("\u{fb01}le.txt"), "file.txt");
        assert_eq!(secure_filename("\u{65e5}\u{672c}.txt"), "txt");
    }

    #[test]
    fn keeps_ordinary_names() {
        assert_eq!(secure_filename("report.pdf"), "report.pdf");
        assert_eq!(secure_filename("Photo-2024_01.JPG"), "Photo-2024_01.JPG");
    }

    #[test]
    fn leading_dots_can_eat_the_stem() {
        assert_eq!(secure_filename("../../.png"), "png");
        assert_eq!(secure_filename("..."), "");
    }
}
