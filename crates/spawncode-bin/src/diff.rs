use anyhow::Result;
use inquire::Confirm;
use similar::{ChangeTag, TextDiff};
use spawncode_core::ChangeReviewer;
use std::fmt::Write;
use std::path::Path;

/// Shows each pending change and asks before it is applied.
pub struct DiffReviewer;

impl ChangeReviewer for DiffReviewer {
    fn review_content(&self, path: &Path, old_content: &str, new_content: &str, description: &str) -> Result<bool> {
        match preview(old_content, new_content)? {
            Preview::Diff(diff) => {
                println!("\n📝 {}: {}", description, path.display());
                println!("{}", diff);
                confirm("Apply this change?")
            }
            Preview::LineEndingsOnly => {
                println!("\n📝 {}: {} (only line endings change)", description, path.display());
                confirm("Apply line-ending normalization?")
            }
            Preview::Unchanged => {
                println!("\n📝 {}: {} (no changes detected)", description, path.display());
                Ok(false)
            }
        }
    }

    fn review_rename(&self, old_path: &Path, new_path: &Path, change_type: &str) -> Result<bool> {
        println!("\n📁 {} rename:", change_type);
        println!("  \x1b[31m- {}\x1b[0m", old_path.display());
        println!("  \x1b[32m+ {}\x1b[0m", new_path.display());
        confirm("Apply this rename?")
    }
}

fn confirm(message: &str) -> Result<bool> {
    Ok(Confirm::new(message).with_default(true).prompt()?)
}

/// What a content change looks like once line endings are set aside.
#[derive(Debug, PartialEq, Eq)]
enum Preview {
    Diff(String),
    LineEndingsOnly,
    Unchanged,
}

fn preview(old_content: &str, new_content: &str) -> Result<Preview> {
    if old_content == new_content {
        return Ok(Preview::Unchanged);
    }
    Ok(match render_diff(old_content, new_content)? {
        Some(diff) => Preview::Diff(diff),
        None => Preview::LineEndingsOnly,
    })
}

/// Coloured unified diff, or `None` when the contents only differ in line endings.
fn render_diff(old_content: &str, new_content: &str) -> Result<Option<String>> {
    let old_content = old_content.replace("\r\n", "\n");
    let new_content = new_content.replace("\r\n", "\n");
    let diff = TextDiff::from_lines(old_content.as_str(), new_content.as_str());

    let mut output = String::new();
    let mut has_changes = false;

    for (i, group) in diff.grouped_ops(3).iter().enumerate() {
        if i > 0 {
            writeln!(output, "{:-^1$}", "", 40)?;
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, style) = match change.tag() {
                    ChangeTag::Delete => ("- ", "\x1b[31m"),
                    ChangeTag::Insert => ("+ ", "\x1b[32m"),
                    ChangeTag::Equal => ("  ", "\x1b[0m"),
                };
                write!(output, "{}{}{}\x1b[0m", style, sign, change.value())?;
                if change.tag() != ChangeTag::Equal {
                    has_changes = true;
                }
            }
        }
    }

    Ok(has_changes.then_some(output))
}
