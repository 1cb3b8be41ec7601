use anyhow::Result;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::codes::SpawnCodeMapping;
use crate::{apply_content_change, ChangeReviewer, RunReport};

/// Replaces quoted identifier literals with their spawn codes in one pass, so a
/// code that spells another identifier is never substituted again.
pub struct ScriptRewriter {
    pattern: Option<Regex>,
    replacements: HashMap<String, String>,
}

impl ScriptRewriter {
    pub fn new(mapping: &SpawnCodeMapping) -> Result<Self, regex::Error> {
        if mapping.is_empty() {
            return Ok(Self {
                pattern: None,
                replacements: HashMap::new(),
            });
        }

        let alternatives = mapping
            .iter()
            .map(|(original, _)| regex::escape(original))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r#""({0})"|'({0})'"#, alternatives))?;

        let replacements = mapping
            .iter()
            .map(|(original, code)| (original.to_string(), code.to_string()))
            .collect();

        Ok(Self {
            pattern: Some(pattern),
            replacements,
        })
    }

    /// Returns the rewritten content and the number of literals replaced.
    pub fn process_content(&self, content: &str) -> Option<(String, usize)> {
        let pattern = self.pattern.as_ref()?;
        let mut count = 0;

        let replaced = pattern.replace_all(content, |caps: &Captures| {
            let (quote, name) = match (caps.get(1), caps.get(2)) {
                (Some(name), _) => ('"', name.as_str()),
                (None, Some(name)) => ('\'', name.as_str()),
                (None, None) => return caps[0].to_string(),
            };
            match self.replacements.get(name) {
                Some(code) => {
                    count += 1;
                    format!("{quote}{code}{quote}")
                }
                None => caps[0].to_string(),
            }
        });

        if count == 0 {
            return None;
        }
        debug!("Script replacement: found {} occurrences", count);
        Some((replaced.into_owned(), count))
    }
}

pub fn rewrite_script(
    script: &Path,
    mapping: &SpawnCodeMapping,
    reviewer: &dyn ChangeReviewer,
    dry_run: bool,
    report: &mut RunReport,
) -> Result<()> {
    info!("Rewriting script: {:?}", script);

    if !script.is_file() {
        report.warn(format!("Script not found: {:?}", script));
        return Ok(());
    }

    let content = match fs::read_to_string(script) {
        Ok(content) => content,
        Err(err) => {
            report.warn(format!("Skipping unreadable script {:?}: {}", script, err));
            return Ok(());
        }
    };

    let rewriter = ScriptRewriter::new(mapping)?;
    match rewriter.process_content(&content) {
        Some((new_content, count)) => {
            if apply_content_change(script, &content, &new_content, "Script rewrite", reviewer, dry_run)? {
                report.script_replacements += count;
            }
        }
        None => debug!("No quoted identifiers in: {:?}", script),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::VehicleEntry;
    use crate::AutoApprove;
    use indexmap::IndexMap;

    fn mapping(entries: &[(&str, &str)]) -> SpawnCodeMapping {
        let vehicles: IndexMap<String, VehicleEntry> = entries
            .iter()
            .map(|(name, code)| {
                (
                    name.to_string(),
                    VehicleEntry {
                        code: code.to_string(),
                        data: "default".to_string(),
                    },
                )
            })
            .collect();
        SpawnCodeMapping::generate(&vehicles)
    }

    #[test]
    fn test_quoted_replacement() {
        let rewriter = ScriptRewriter::new(&mapping(&[("oldcar", "ABC#")])).unwrap();

        let content = "AddTextEntry(\"oldcar\", 'oldcar')\nlocal model = `oldcar`";
        let (result, count) = rewriter.process_content(content).unwrap();

        assert_eq!(count, 2);
        assert_eq!(result, "AddTextEntry(\"ABC1\", 'ABC1')\nlocal model = `oldcar`");
    }

    #[test]
    fn test_no_partial_match() {
        let rewriter = ScriptRewriter::new(&mapping(&[("car", "ABC#")])).unwrap();

        let content = r#"spawn("oldcar") spawn("car2") spawn("car")"#;
        let (result, count) = rewriter.process_content(content).unwrap();

        assert_eq!(count, 1);
        assert_eq!(result, r#"spawn("oldcar") spawn("car2") spawn("ABC1")"#);
    }

    #[test]
    fn test_no_replacement() {
        let rewriter = ScriptRewriter::new(&mapping(&[("oldcar", "ABC#")])).unwrap();
        assert!(rewriter.process_content("print(\"hello\")").is_none());
    }

    #[test]
    fn test_empty_mapping() {
        let rewriter = ScriptRewriter::new(&SpawnCodeMapping::default()).unwrap();
        assert!(rewriter.process_content("\"oldcar\"").is_none());
    }

    #[test]
    fn test_codes_are_not_substituted_twice() {
        // the first vehicle's code spells the second vehicle's identifier
        let rewriter = ScriptRewriter::new(&mapping(&[("oldcar", "new"), ("new1", "XYZ#")])).unwrap();

        let content = r#"{ "oldcar", "new1" }"#;
        let (result, _) = rewriter.process_content(content).unwrap();

        assert_eq!(result, r#"{ "new1", "XYZ1" }"#);
    }

    #[test]
    fn test_identifiers_with_regex_characters() {
        let rewriter = ScriptRewriter::new(&mapping(&[("car.v2", "ABC#")])).unwrap();

        let (result, _) = rewriter.process_content(r#""car.v2" "carXv2""#).unwrap();
        assert_eq!(result, r#""ABC1" "carXv2""#);
    }

    #[test]
    fn test_rewrite_missing_script() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = RunReport::default();

        rewrite_script(&dir.path().join("client.lua"), &mapping(&[("oldcar", "ABC#")]), &AutoApprove, false, &mut report)
            .unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.script_replacements, 0);
    }

    #[test]
    fn test_rewrite_script_file() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("client.lua");
        fs::write(&script, "local cars = { \"oldcar\", \"fastcar\" }\n").unwrap();

        let mut report = RunReport::default();
        rewrite_script(&script, &mapping(&[("oldcar", "ABC#"), ("fastcar", "ABC#")]), &AutoApprove, false, &mut report)
            .unwrap();

        assert_eq!(fs::read_to_string(&script).unwrap(), "local cars = { \"ABC1\", \"ABC2\" }\n");
        assert_eq!(report.script_replacements, 2);
    }
}
