//! Parser for lookup program output.
//!
//! Lookup programs answer each query with a block of tab-separated lines,
//! blocks separated by a blank line:
//!
//! ```text
//! cats\tcat<n><pl>
//!
//! sheep\tsheep<n><sg>
//! sheep\tsheep<n><pl>
//! ```
//!
//! Xerox `lookup` sometimes prints the tag string as a separate field
//! (`bearkoe\tbearkoe\t+N+Sg+Nom`); a third field starting with `+` is
//! glued back onto the result.

use super::TransducerResult;

/// Decode raw lookup output into a key → results map.
///
/// Lines without a tab carry no result and are skipped.
pub fn parse_output(raw: &str) -> TransducerResult {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let mut parsed = TransducerResult::new();

    for block in normalized.split("\n\n") {
        for line in block.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 2 {
                continue;
            }

            let key = fields[0].trim();
            let result = match fields.get(2) {
                Some(tags) if tags.starts_with('+') => {
                    format!("{}{}", fields[1].trim(), tags.trim())
                }
                _ => fields[1].trim().to_string(),
            };

            parsed.entry(key.to_string()).or_default().insert(result);
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results<'a>(parsed: &'a TransducerResult, key: &str) -> Vec<&'a str> {
        parsed[key].iter().map(String::as_str).collect()
    }

    #[test]
    fn test_parse_blocks() {
        let raw = "cats\tcat<n><pl>\t0.000000\n\nsheep\tsheep<n><sg>\nsheep\tsheep<n><pl>\n\n";
        let parsed = parse_output(raw);
        assert_eq!(parsed.len(), 2);
        assert_eq!(results(&parsed, "cats"), ["cat<n><pl>"]);
        assert_eq!(results(&parsed, "sheep"), ["sheep<n><pl>", "sheep<n><sg>"]);
    }

    #[test]
    fn test_xerox_tag_field() {
        let parsed = parse_output("bearkoe\tbearkoe\t+N+Sg+Nom\n\n");
        assert_eq!(results(&parsed, "bearkoe"), ["bearkoe+N+Sg+Nom"]);
    }

    #[test]
    fn test_unknown_marker_kept_verbatim() {
        let parsed = parse_output("xyz\txyz\t+?\n\n");
        assert_eq!(results(&parsed, "xyz"), ["xyz+?"]);

        let parsed = parse_output("xyz\t+?\tinf\n\n");
        assert_eq!(results(&parsed, "xyz"), ["+?"]);
    }

    #[test]
    fn test_line_without_tab_is_skipped() {
        let parsed = parse_output("keyonly\n\ncat\tcats\n\n");
        assert_eq!(parsed.len(), 1);
        assert!(!parsed.contains_key("keyonly"));
        assert_eq!(results(&parsed, "cat"), ["cats"]);
    }

    #[test]
    fn test_crlf_and_whitespace() {
        let parsed = parse_output(" cat \t cats \r\n\r\n   \r\ndog\tdogs\r\n");
        assert_eq!(results(&parsed, "cat"), ["cats"]);
        assert_eq!(results(&parsed, "dog"), ["dogs"]);
    }

    #[test]
    fn test_repeated_key_across_blocks_accumulates() {
        let parsed = parse_output("a\tx\n\na\ty\n\na\tx\n\n");
        assert_eq!(results(&parsed, "a"), ["x", "y"]);
    }

    #[test]
    fn test_reparse_is_stable() {
        let raw = "cats\tcat<n><pl>\n\nsheep\tsheep<n><sg>\nsheep\tsheep<n><pl>\n\n";
        let parsed = parse_output(raw);

        let mut serialized = String::new();
        for (key, forms) in &parsed {
            for form in forms {
                serialized.push_str(&format!("{}\t{}\n", key, form));
            }
            serialized.push('\n');
        }
        assert_eq!(parse_output(&serialized), parsed);
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_output("").is_empty());
        assert!(parse_output("\n\n\n").is_empty());
    }
}
