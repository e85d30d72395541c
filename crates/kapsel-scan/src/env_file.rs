//! Dotenv-style environment file parsing.
//!
//! Line-oriented: blank lines and comment lines are skipped, `KEY=value`
//! lines with a well-formed key become candidates, everything else is
//! ignored. One layer of surrounding single or double quotes is stripped
//! from the value; unquoted values are truncated at the first unescaped
//! `#` (a backslash escapes a literal `#`). An `export ` prefix is
//! tolerated.

use crate::types::{is_valid_key_name, CandidateSecret, SourceKind};

/// Parses env-file `content`, attributing candidates to `path`.
#[must_use]
pub fn parse(path: &str, content: &str) -> Vec<CandidateSecret> {
    let mut candidates = Vec::new();

    for line in content.lines() {
        let line = line.trim_start();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();

        let Some((key, raw_value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim_end();
        if !is_valid_key_name(key) {
            continue;
        }

        let value = parse_value(raw_value);
        candidates.push(CandidateSecret::with_value(
            key,
            path,
            SourceKind::EnvFile,
            value,
        ));
    }

    candidates
}

/// Normalizes the raw text after the `=`.
fn parse_value(raw: &str) -> String {
    let trimmed = raw.trim();

    // A fully quoted value is taken verbatim, comments and all.
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }

    // Unquoted: cut at the first unescaped '#', honoring "\#" escapes.
    let mut value = String::with_capacity(trimmed.len());
    let mut chars = trimmed.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('#') => value.push('#'),
                Some(other) => {
                    value.push('\\');
                    value.push(other);
                }
                None => value.push('\\'),
            },
            '#' => break,
            _ => value.push(c),
        }
    }

    value.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn parsed(content: &str) -> Vec<(String, String)> {
        parse(".env", content)
            .into_iter()
            .map(|c| {
                let value = c.value.map(|v| v.expose().to_string()).unwrap_or_default();
                (c.key_name, value)
            })
            .collect()
    }

    #[test]
    fn parses_mixed_content() {
        let content = "# comment\nFOO=bar # trailing\nBAZ='quoted'\n\nBADLINE\n";
        assert_eq!(
            parsed(content),
            vec![
                ("FOO".to_string(), "bar".to_string()),
                ("BAZ".to_string(), "quoted".to_string()),
            ]
        );
    }

    #[test_case("KEY=value", "value" ; "plain")]
    #[test_case("KEY=\"double quoted\"", "double quoted" ; "double quotes")]
    #[test_case("KEY='single quoted'", "single quoted" ; "single quotes")]
    #[test_case("KEY=  padded  ", "padded" ; "whitespace trimmed")]
    #[test_case("KEY=value # comment", "value" ; "inline comment")]
    #[test_case("KEY=before\\#after", "before#after" ; "escaped hash kept")]
    #[test_case("KEY='kept # inside'", "kept # inside" ; "hash inside quotes kept")]
    #[test_case("KEY=", "" ; "empty value")]
    #[test_case("export KEY=exported", "exported" ; "export prefix")]
    fn value_forms(line: &str, expected: &str) {
        let result = parsed(line);
        assert_eq!(result.len(), 1, "expected one candidate from {line:?}");
        assert_eq!(result[0].1, expected);
    }

    #[test_case("# all comment" ; "comment line")]
    #[test_case("   # indented comment" ; "indented comment")]
    #[test_case("" ; "empty line")]
    #[test_case("no equals sign" ; "no assignment")]
    #[test_case("lower_key=value" ; "lowercase key")]
    #[test_case("123KEY=value" ; "digit-leading key")]
    #[test_case("KEY-WITH-HYPHEN=value" ; "hyphenated key")]
    fn ignored_lines(line: &str) {
        assert!(parsed(line).is_empty(), "expected no candidates from {line:?}");
    }

    #[test]
    fn preserves_declaration_order() {
        let content = "ZETA=1\nALPHA=2\nMIDDLE=3\n";
        let keys: Vec<String> = parsed(content).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ZETA", "ALPHA", "MIDDLE"]);
    }

    #[test]
    fn repeated_keys_are_all_surfaced() {
        // Dedup is downstream policy; the parser reports what it sees.
        let content = "KEY=first\nKEY=second\n";
        assert_eq!(parsed(content).len(), 2);
    }

    #[test]
    fn candidates_carry_source_metadata() {
        let candidates = parse("config/.env.production", "API_KEY=abc\n");

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source_file, "config/.env.production");
        assert_eq!(candidates[0].source_kind, SourceKind::EnvFile);
    }

    #[test]
    fn scan_is_idempotent() {
        let content = "FOO=bar\nBAZ='qux'\n";
        assert_eq!(parse(".env", content), parse(".env", content));
    }

    #[test]
    fn value_with_equals_signs_kept_whole() {
        let result = parsed("CONNECTION=host=db;port=5432");
        assert_eq!(result[0].1, "host=db;port=5432");
    }

    #[test]
    fn unterminated_quote_treated_as_unquoted() {
        let result = parsed("KEY='no closing");
        assert_eq!(result[0].1, "'no closing");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_parsing_never_panics(content in ".{0,256}") {
                let _ = parse(".env", &content);
            }

            #[test]
            fn prop_parsing_is_idempotent(content in ".{0,256}") {
                prop_assert_eq!(parse(".env", &content), parse(".env", &content));
            }

            #[test]
            fn prop_well_formed_lines_always_parse(
                key in "[A-Z_][A-Z0-9_]{0,24}",
                value in "[a-zA-Z0-9:/@._-]{0,48}",
            ) {
                let content = format!("{key}={value}\n");
                let candidates = parse(".env", &content);

                prop_assert_eq!(candidates.len(), 1);
                prop_assert_eq!(&candidates[0].key_name, &key);
            }
        }
    }
}
