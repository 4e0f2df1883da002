//! Column-name to sheet-name sanitation.
//!
//! Sheet names in the detail and annotated workbooks are derived from the
//! selected column names. The transformations apply in a fixed order so the
//! same column always maps to the same sheet name:
//! 1. replace characters illegal in sheet names (`< > * \ / ? |`) with `_`
//! 2. case-insensitively shorten the substring "History" to "Hist"
//! 3. truncate to 30 characters
//! 4. trim surrounding whitespace

use regex::Regex;
use std::sync::OnceLock;

const MAX_SHEET_NAME_CHARS: usize = 30;

fn illegal_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[<>*\\/?|]").expect("valid regex"))
}

fn history() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)History").expect("valid regex"))
}

/// Derive a legal, shortened sheet name from a column name
pub fn sanitize_sheet_name(column: &str) -> String {
    let replaced = illegal_chars().replace_all(column, "_");
    let shortened = history().replace_all(&replaced, "Hist");
    let truncated: String = shortened.chars().take(MAX_SHEET_NAME_CHARS).collect();
    truncated.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_shortened() {
        assert_eq!(sanitize_sheet_name("Purchase History"), "Purchase Hist");
    }

    #[test]
    fn history_shortening_is_case_insensitive() {
        assert_eq!(sanitize_sheet_name("purchase history"), "purchase Hist");
        assert_eq!(sanitize_sheet_name("HISTORY"), "Hist");
    }

    #[test]
    fn illegal_characters_become_underscores() {
        assert_eq!(sanitize_sheet_name("A/B?C"), "A_B_C");
        assert_eq!(sanitize_sheet_name("a<b>c*d\\e|f"), "a_b_c_d_e_f");
    }

    #[test]
    fn long_names_truncate_to_thirty_then_trim() {
        // 29 chars + a space at position 30, then more text. Truncation
        // keeps the space; the trim removes it.
        let input = "abcdefghijklmnopqrstuvwxyzabc overflow";
        let result = sanitize_sheet_name(input);
        assert_eq!(result, "abcdefghijklmnopqrstuvwxyzabc");
        assert!(result.chars().count() <= 30);
    }

    #[test]
    fn exactly_thirty_characters_survive() {
        let input = "123456789012345678901234567890";
        assert_eq!(sanitize_sheet_name(input), input);
    }

    #[test]
    fn multibyte_names_truncate_by_characters_not_bytes() {
        let input = "é".repeat(40);
        let result = sanitize_sheet_name(&input);
        assert_eq!(result.chars().count(), 30);
    }

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(sanitize_sheet_name("Name"), "Name");
    }
}
