use std::path::Path;

use tracing::{info, warn};

use crate::model::Rule;

const SEPARATOR: char = ':';

/// Rules read from a rule file, plus why none were read if that happened.
#[derive(Debug, Clone)]
pub struct RuleLoad {
    pub source: String,
    pub rules: Vec<Rule>,
    /// Set when the file could not be read. An empty `rules` with `missing == None` means the
    /// file exists but holds no valid lines.
    pub missing: Option<String>,
}

/// Read and parse the rule file at `path`.
///
/// An absent or unreadable file is not an error: the result simply holds zero rules.
pub fn load_rules(path: &Path) -> RuleLoad {
    let source = path.display().to_string();
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let rules = parse_rules(&content);
            info!(source = %source, rules = rules.len(), "loaded rules");
            RuleLoad {
                source,
                rules,
                missing: None,
            }
        }
        Err(e) => {
            warn!(error = %e, source = %source, "rule file unavailable, auditing disabled");
            RuleLoad {
                source,
                rules: Vec::new(),
                missing: Some(e.to_string()),
            }
        }
    }
}

/// Parse `<id>:<text>` lines in file order.
///
/// Only the first colon separates; the rest stays in the text. Blank lines, lines without a
/// colon, and lines whose id or text trims to nothing are skipped.
pub fn parse_rules(content: &str) -> Vec<Rule> {
    content
        .lines()
        .filter_map(|line| {
            let (id, text) = line.split_once(SEPARATOR)?;
            let (id, text) = (id.trim(), text.trim());
            if id.is_empty() || text.is_empty() {
                return None;
            }
            Some(Rule {
                id: id.to_string(),
                text: text.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal() {
        let content = "R1: Must provide breach notice within 72 hours.\n\
                       \n\
                       R2 :Consent must be free, specific and informed.\n";
        let rules = parse_rules(content);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, "R1");
        assert_eq!(rules[0].text, "Must provide breach notice within 72 hours.");
        assert_eq!(rules[1].id, "R2");
        assert_eq!(rules[1].text, "Consent must be free, specific and informed.");
    }

    #[test]
    fn splits_on_first_colon_only() {
        let rules = parse_rules("Rule 6: Notice: state the purpose of processing.");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, "Rule 6");
        assert_eq!(rules[0].text, "Notice: state the purpose of processing.");
    }

    #[test]
    fn skips_lines_without_separator_or_content() {
        let content = "A header line\n   \n:orphan text\nR9:   \nR3:Keep records for one year.\r\n";
        let rules = parse_rules(content);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, "R3");
        assert_eq!(rules[0].text, "Keep records for one year.");
    }

    #[test]
    fn preserves_file_order() {
        let rules = parse_rules("Z:last letter\nA:first letter\nM:middle letter");
        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["Z", "A", "M"]);
    }

    #[test]
    fn missing_file_loads_zero_rules() {
        let load = load_rules(Path::new("./does-not-exist/dpdp_rules.txt"));
        assert!(load.rules.is_empty());
        assert!(load.missing.is_some());
    }

    #[test]
    fn bundled_rule_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/dpdp_rules.txt");
        if !path.exists() {
            eprintln!("skipping bundled_rule_file_parses: {} not found", path.display());
            return;
        }
        let load = load_rules(&path);
        assert!(load.missing.is_none());
        assert!(load.rules.len() >= 5, "expected the sample rule set");
    }
}
