use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;

use vcmp_diff::{
    compare, compare_strings, value_hash_code, CompareResult, ComparisonFlags, ComparisonId,
    DiffKind, SpanOwner, StringDifference,
};
use vcmp_types::{CompareOptions, Filter, StringCompareOptions, Value};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Compare(args) => cmd_compare(args, cli.format),
        Command::Hash(args) => cmd_hash(args, cli.format),
        Command::Strings(args) => cmd_strings(args, cli.format),
    }
}

/// Read a JSON document into a value graph.
pub fn load_document(path: &Path) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Value::from_json_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Resolve options from an optional TOML file plus command-line flags.
pub fn build_options(args: &OptionArgs) -> anyhow::Result<CompareOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str::<CompareOptions>(&text)
                .with_context(|| format!("invalid options in {}", path.display()))?
        }
        None => CompareOptions::default(),
    };
    if args.values_only {
        options.compare_values_only = true;
    }
    if !args.exclude.is_empty() {
        options = options.with_filter(Filter::skip_names(args.exclude.clone()));
    }
    Ok(options)
}

#[derive(Debug, Serialize)]
struct ComparisonSummary {
    path: String,
    flags: ComparisonFlags,
    diff_kind: DiffKind,
    a: String,
    b: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    spans: Vec<StringDifference>,
}

#[derive(Debug, Serialize)]
struct CompareReport {
    identical: bool,
    comparisons: usize,
    differences: Vec<ComparisonSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    in_common: Option<Vec<ComparisonSummary>>,
}

fn display_path(result: &CompareResult, id: ComparisonId) -> String {
    result.path(id).unwrap_or_else(|| "(root)".to_string())
}

fn summarize(result: &CompareResult, id: ComparisonId) -> Option<ComparisonSummary> {
    let c = result.get(id)?;
    Some(ComparisonSummary {
        path: display_path(result, id),
        flags: c.flags,
        diff_kind: c.diff_kind,
        a: c.a.to_string(),
        b: c.b.to_string(),
        spans: c.string_diffs.clone(),
    })
}

fn build_report(result: &CompareResult, all: bool) -> CompareReport {
    let collect = |ids: &[ComparisonId]| -> Vec<ComparisonSummary> {
        ids.iter().filter_map(|id| summarize(result, *id)).collect()
    };
    CompareReport {
        identical: result.is_identical(),
        comparisons: result.len(),
        differences: collect(&result.all_differences),
        in_common: all.then(|| collect(&result.all_in_common)),
    }
}

fn cmd_compare(args: CompareArgs, format: OutputFormat) -> anyhow::Result<()> {
    let a = load_document(&args.a)?;
    let b = load_document(&args.b)?;
    let mut options = build_options(&args.options)?;
    if args.diff_strings || args.word {
        options.diff_strings = true;
    }
    if args.word {
        options = options.with_string_options(StringCompareOptions::words());
    }

    let result = compare(&a, &b, options);
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&build_report(&result, args.all))?
            );
        }
        OutputFormat::Text => print_tree(&result, args.all),
    }
    Ok(())
}

fn print_tree(result: &CompareResult, all: bool) {
    let values_only = result.options.compare_values_only;
    let Some(root) = result.root else {
        println!("{}", "Nothing to compare: both inputs were excluded.".dimmed());
        return;
    };

    let mut stack = vec![(root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let Some(c) = result.get(id) else { continue };
        let differs = c.is_difference(values_only);
        if !differs && !all {
            continue;
        }

        let indent = "  ".repeat(depth);
        let path = display_path(result, id);
        let flags = c.effective_flags(values_only);
        let marker = if flags.contains(ComparisonFlags::ONLY_IN_A) {
            "-".red().bold()
        } else if flags.contains(ComparisonFlags::ONLY_IN_B) {
            "+".green().bold()
        } else if differs {
            "~".yellow().bold()
        } else {
            " ".normal()
        };

        if c.children.is_empty() && differs {
            println!(
                "{indent}{marker} {}  {} {} {}  [{}]",
                path.bold(),
                c.a.to_string().red(),
                "→".dimmed(),
                c.b.to_string().green(),
                flags.to_string().cyan()
            );
            if !c.string_diffs.is_empty() {
                println!("{indent}    {}", render_spans(&c.string_diffs));
            }
        } else if differs {
            println!("{indent}{marker} {}  [{}]", path.bold(), flags.to_string().cyan());
        } else {
            println!("{indent}{marker} {}", path.dimmed());
        }

        for child in c.children.iter().rev() {
            stack.push((*child, depth + 1));
        }
    }

    let summary = format!(
        "{} comparisons, {} differences, {} in common",
        result.len(),
        result.all_differences.len(),
        result.all_in_common.len()
    );
    if result.is_identical() {
        println!("{} {}", "✓".green().bold(), summary);
    } else {
        println!("{} {}", "✗".red().bold(), summary);
    }
}

fn render_spans(spans: &[StringDifference]) -> String {
    spans
        .iter()
        .map(|span| match span.owner() {
            SpanOwner::Common => span.text.normal().to_string(),
            SpanOwner::OnlyInA => span.text.red().strikethrough().to_string(),
            SpanOwner::OnlyInB => span.text.green().underline().to_string(),
        })
        .collect()
}

fn cmd_hash(args: HashArgs, format: OutputFormat) -> anyhow::Result<()> {
    let value = load_document(&args.file)?;
    let options = build_options(&args.options)?;
    let hash = value_hash_code(&value, options);
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "hash": hash })),
        OutputFormat::Text => match hash {
            Some(hash) => println!("{}", hash.to_string().yellow()),
            None => println!("{}", "excluded".dimmed()),
        },
    }
    Ok(())
}

fn cmd_strings(args: StringsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let options = if args.word {
        CompareOptions::default().with_string_options(StringCompareOptions::words())
    } else {
        CompareOptions::default()
    };
    let result = compare_strings(&Value::string(&args.a), &Value::string(&args.b), options)?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result.string_diffs)?);
        }
        OutputFormat::Text => {
            if result.is_empty() {
                println!("{} strings are equal", "✓".green().bold());
                return Ok(());
            }
            for span in &result.string_diffs {
                let (marker, text) = match span.owner() {
                    SpanOwner::Common => (" ".normal(), span.text.normal()),
                    SpanOwner::OnlyInA => ("-".red().bold(), span.text.red()),
                    SpanOwner::OnlyInB => ("+".green().bold(), span.text.green()),
                };
                let at = |index: Option<usize>| index.map_or("-".to_string(), |i| i.to_string());
                println!(
                    "{marker} a:{:<4} b:{:<4} \"{}\"",
                    at(span.a_index),
                    at(span.b_index),
                    text
                );
            }
            println!("{}", render_spans(&result.string_diffs));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_json_documents() {
        let file = write_temp(r#"{"name": "vcmp", "tags": ["a", "b"]}"#);
        let value = load_document(file.path()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.get("name").unwrap().as_str(), Some("vcmp"));
        assert!(obj.get("tags").unwrap().as_object().unwrap().is_array());
    }

    #[test]
    fn reports_parse_failures_with_the_path() {
        let file = write_temp("{ not json");
        let err = load_document(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn options_file_and_flags_combine() {
        let file = write_temp(
            "diff_strings = true\n\n[string_compare_options]\nmode = \"word\"\n",
        );
        let args = OptionArgs {
            options: Some(file.path().to_path_buf()),
            values_only: true,
            exclude: vec!["id".to_string()],
        };
        let options = build_options(&args).unwrap();
        assert!(options.diff_strings);
        assert!(options.compare_values_only);
        assert!(options.exclude_functions);
        assert_eq!(
            options.string_compare_options.mode,
            vcmp_types::StringCompareMode::Word
        );
        assert!(!options.exclusion_filters.accepts(&Value::Null, Some("id")));
    }

    #[test]
    fn report_lists_differences_by_path() {
        let a = Value::from_json_str(r#"{"x": 1, "y": {"z": "s"}}"#).unwrap();
        let b = Value::from_json_str(r#"{"x": 1, "y": {"z": "t"}}"#).unwrap();
        let result = compare(&a, &b, CompareOptions::values_only());

        let report = build_report(&result, false);
        assert!(!report.identical);
        assert!(report.in_common.is_none());
        let paths: Vec<_> = report.differences.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["y.z", "y", "(root)"]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["differences"][0]["flags"], serde_json::json!(["ValueDiffers"]));
        assert_eq!(json["differences"][0]["diff_kind"], "Primitive");

        let full = build_report(&result, true);
        assert_eq!(full.in_common.map(|v| v.len()), Some(1));
    }

    #[test]
    fn spans_render_every_character() {
        let result =
            compare_strings(&Value::from("ab"), &Value::from("ac"), CompareOptions::default())
                .unwrap();
        colored::control::set_override(false);
        assert_eq!(render_spans(&result.string_diffs), "abc");
    }
}
