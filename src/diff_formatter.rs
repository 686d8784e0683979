use colored::*;
use similar::{ChangeTag, TextDiff};
use std::io::IsTerminal;
use std::path::Path;

pub struct DiffFormatter;

impl DiffFormatter {
    /// Auto-detect if we should use colors
    fn should_use_color() -> bool {
        // Check NO_COLOR env var (https://no-color.org/)
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }

        std::io::stdout().is_terminal()
    }

    /// Format the change a replacement would make to one file
    pub fn format_preview(
        source: &Path,
        destination: &Path,
        original: &str,
        transformed: &str,
        context_size: usize,
    ) -> String {
        Self::format_preview_with_color(
            source,
            destination,
            original,
            transformed,
            context_size,
            Self::should_use_color(),
        )
    }

    pub fn format_preview_with_color(
        source: &Path,
        destination: &Path,
        original: &str,
        transformed: &str,
        context_size: usize,
        use_color: bool,
    ) -> String {
        let mut output = String::new();

        let header = if source == destination {
            source.display().to_string()
        } else {
            format!("{} -> {}", source.display(), destination.display())
        };
        if use_color {
            output.push_str(&format!("{}\n", header.bold().cyan()));
        } else {
            output.push_str(&format!("{}\n", header));
        }

        if original == transformed {
            output.push_str("No changes.\n");
            return output;
        }

        let diff = TextDiff::from_lines(original, transformed);
        let mut added = 0;
        let mut removed = 0;

        for (group_index, group) in diff.grouped_ops(context_size).iter().enumerate() {
            if group_index > 0 {
                if use_color {
                    output.push_str(&format!("{}\n", "...".dimmed()));
                } else {
                    output.push_str("...\n");
                }
            }

            for op in group {
                for change in diff.iter_changes(op) {
                    let content = change.value().trim_end_matches(['\n', '\r']);
                    let (indicator, line_num) = match change.tag() {
                        ChangeTag::Equal => ("=", change.new_index()),
                        ChangeTag::Insert => {
                            added += 1;
                            ("+", change.new_index())
                        }
                        ChangeTag::Delete => {
                            removed += 1;
                            ("-", change.old_index())
                        }
                    };
                    let line_num = line_num.map(|n| n + 1).unwrap_or(0);

                    if use_color {
                        let colored_line = match change.tag() {
                            ChangeTag::Equal => format!("L{}: {} {}\n", line_num, indicator.dimmed(), content.dimmed()),
                            ChangeTag::Insert => format!("L{}: {} {}\n", line_num, indicator.green().bold(), content.green().bold()),
                            ChangeTag::Delete => format!("L{}: {} {}\n", line_num, indicator.red().bold(), content.red()),
                        };
                        output.push_str(&colored_line);
                    } else {
                        output.push_str(&format!("L{}: {} {}\n", line_num, indicator, content));
                    }
                }
            }
        }

        if use_color {
            output.push_str(&format!(
                "\nTotal: {} added, {} removed\n",
                added.to_string().green(),
                removed.to_string().red()
            ));
        } else {
            output.push_str(&format!("\nTotal: {} added, {} removed\n", added, removed));
        }

        output
    }

    pub fn format_dry_run_header(rule_count: usize) -> String {
        format!(
            "Dry run: {} rule{} (no files will be written)\n",
            rule_count,
            if rule_count == 1 { "" } else { "s" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_shows_changed_lines() {
        let output = DiffFormatter::format_preview_with_color(
            Path::new("app.conf"),
            Path::new("app.conf"),
            "a\nhost=@HOST@\nb\n",
            "a\nhost=example.org\nb\n",
            1,
            false,
        );
        assert!(output.starts_with("app.conf\n"));
        assert!(output.contains("L2: - host=@HOST@"));
        assert!(output.contains("L2: + host=example.org"));
        assert!(output.contains("L1: = a"));
        assert!(output.contains("Total: 1 added, 1 removed"));
    }

    #[test]
    fn test_preview_without_context() {
        let output = DiffFormatter::format_preview_with_color(
            Path::new("f"),
            Path::new("f"),
            "a\nb\nc\n",
            "a\nB\nc\n",
            0,
            false,
        );
        assert!(!output.contains("= a"));
        assert!(output.contains("+ B"));
    }

    #[test]
    fn test_preview_names_destination() {
        let output = DiffFormatter::format_preview_with_color(
            Path::new("in.txt"),
            Path::new("out/in.txt"),
            "x",
            "x",
            2,
            false,
        );
        assert!(output.starts_with("in.txt -> out/in.txt\n"));
        assert!(output.contains("No changes."));
    }

    #[test]
    fn test_dry_run_header() {
        assert!(DiffFormatter::format_dry_run_header(1).contains("1 rule "));
        assert!(DiffFormatter::format_dry_run_header(3).contains("3 rules"));
    }
}
