//! Label matching for category and series filters.
//!
//! Filter tokens arrive in two shapes: slugs from the sidebar (`sunday-service`)
//! and raw labels (`SUNDAY SERVICE`). [`matches`] tolerates both without ever
//! falling back to substring matching, which would over-select.

/// Returns true when `token` selects `label`.
///
/// Tried in order, first hit wins:
/// 1. exact equality
/// 2. case-insensitive equality
/// 3. equality of the slug forms (see [`slugify`])
/// 4. the token with `-`/`_` read as spaces, compared case-insensitively
pub fn matches(token: &str, label: &str) -> bool {
  if token == label {
    return true;
  }
  // Only empty == empty matches; the slug form of "é" is also empty.
  if token.is_empty() || label.is_empty() {
    return false;
  }

  let label_lower = label.to_lowercase();
  if token.to_lowercase() == label_lower {
    return true;
  }

  if slugify(token) == slugify(label) {
    return true;
  }

  let spaced: String = token.chars().map(|c| if c == '-' || c == '_' { ' ' } else { c }).collect();
  spaced.to_lowercase() == label_lower
}

/// Lowercase `s`, collapse every run of whitespace or punctuation (ASCII or
/// not, so `'` and `’` agree) into a single `-` and drop the remaining
/// non-ASCII letters and digits.
pub fn slugify(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut in_separator = false;
  for c in s.chars().flat_map(char::to_lowercase) {
    if c.is_ascii_lowercase() || c.is_ascii_digit() {
      out.push(c);
      in_separator = false;
    } else if !c.is_alphanumeric() {
      if !in_separator {
        out.push('-');
        in_separator = true;
      }
    }
  }
  out
}

/// True when any of `tokens` selects `label`.
pub fn matches_any<'a, I>(tokens: I, label: &str) -> bool
where
  I: IntoIterator<Item = &'a String>,
{
  tokens.into_iter().any(|t| matches(t, label))
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- matches ---

  #[test]
  fn exact_match() {
    assert!(matches("Sunday Service", "Sunday Service"));
    assert!(matches("", ""));
  }

  #[test]
  fn case_insensitive_match() {
    assert!(matches("Bible Study", "BIBLE STUDY"));
    assert!(matches("crusades", "Crusades"));
  }

  #[test]
  fn slug_token_matches_label() {
    assert!(matches("great-miracle-crusade", "GREAT MIRACLE CRUSADE"));
    assert!(matches("sunday-service", "Sunday Service"));
  }

  #[test]
  fn punctuation_collapses_to_single_dash() {
    assert!(matches("the-lord-s-supper", "THE LORD'S SUPPER"));
    assert!(matches("q-a-night", "Q&A   Night"));
  }

  #[test]
  fn underscore_token_reads_as_spaces() {
    assert!(matches("leaders_meeting", "Leaders Meeting"));
  }

  #[test]
  fn unrelated_labels_do_not_match() {
    assert!(!matches("bible-study", "Sunday Service"));
    assert!(!matches("crusade", "GREAT MIRACLE CRUSADE"));
  }

  #[test]
  fn no_substring_matching() {
    assert!(!matches("bible", "BIBLE STUDY"));
    assert!(!matches("youth bible study", "BIBLE STUDY"));
  }

  #[test]
  fn empty_only_matches_empty() {
    assert!(!matches("", "Sunday Service"));
    assert!(!matches("Sunday Service", ""));
    assert!(!matches("", "é"));
  }

  // --- slugify ---

  #[test]
  fn slugify_collapses_runs() {
    assert_eq!(slugify("Q&A - ELISHA'S CALL"), "q-a-elisha-s-call");
    assert_eq!(slugify("  Sunday   Service"), "-sunday-service");
  }

  #[test]
  fn slugify_treats_curly_quotes_as_separators() {
    assert_eq!(slugify("THE LORD’S SUPPER"), "the-lord-s-supper");
    assert_eq!(slugify("“Faith” — Works"), "-faith-works");
    assert!(matches("THE LORD'S SUPPER", "THE LORD’S SUPPER"));
  }

  #[test]
  fn slugify_strips_non_ascii() {
    assert_eq!(slugify("Café Noël"), "caf-nol");
  }

  // --- matches_any ---

  #[test]
  fn matches_any_is_or_within_tokens() {
    let tokens = vec!["bible-study".to_string(), "crusades".to_string()];
    assert!(matches_any(&tokens, "CRUSADES"));
    assert!(!matches_any(&tokens, "Conferences"));
    assert!(!matches_any(&Vec::<String>::new(), "Conferences"));
  }
}
