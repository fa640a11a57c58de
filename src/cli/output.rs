//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, PalimpsestArgs};
use crate::corrector::CorrectionStats;
use crate::error::Result;
use crate::model::ModelSummary;

/// Result of correcting one document.
#[derive(Debug, Serialize, Deserialize)]
pub struct CorrectionReport {
    pub input: String,
    pub output: String,
    pub stats: CorrectionStats,
    /// Wall time for a single-document run; batch runs only time the whole batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Result of a batch run.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchReport {
    pub documents: Vec<CorrectionReport>,
    pub failures: Vec<BatchFailure>,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchFailure {
    pub input: String,
    pub error: String,
}

/// Static model table sizes.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelReport {
    pub models_dir: String,
    pub summary: ModelSummary,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &PalimpsestArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &PalimpsestArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    for line in human_lines(&value, 0) {
        println!("{line}");
    }
    Ok(())
}

/// Render a JSON value as indented `key: value` lines.
fn human_lines(value: &serde_json::Value, indent: usize) -> Vec<String> {
    let pad = "  ".repeat(indent);
    let mut lines = Vec::new();
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                match val {
                    serde_json::Value::Object(_) => {
                        lines.push(format!("{pad}{key}:"));
                        lines.extend(human_lines(val, indent + 1));
                    }
                    serde_json::Value::Array(items) if items.iter().any(|i| i.is_object()) => {
                        lines.push(format!("{pad}{key}:"));
                        for item in items {
                            lines.push(format!("{pad}  ─────────────"));
                            lines.extend(human_lines(item, indent + 1));
                        }
                    }
                    _ => lines.push(format!("{pad}{key}: {}", format_value(val))),
                }
            }
        }
        _ => lines.push(format!("{pad}{}", format_value(value))),
    }
    lines
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &PalimpsestArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_human_lines_nest_objects() {
        let value = json!({
            "input": "page.txt",
            "stats": {"sentences": 2, "tokens": 6},
        });
        let lines = human_lines(&value, 0);
        assert!(lines.contains(&"input: page.txt".to_string()));
        assert!(lines.contains(&"stats:".to_string()));
        assert!(lines.contains(&"  sentences: 2".to_string()));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!([1, "a", true])), "[1, a, true]");
        assert_eq!(format_value(&json!(null)), "null");
        assert_eq!(format_value(&json!({"a": 1})), "[object]");
    }

    #[test]
    fn test_untimed_report_omits_duration() {
        let report = CorrectionReport {
            input: "page.txt".to_string(),
            output: "page.corrected.txt".to_string(),
            stats: CorrectionStats::default(),
            duration_ms: None,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("duration_ms").is_none());

        let timed = CorrectionReport {
            duration_ms: Some(12),
            ..report
        };
        assert_eq!(serde_json::to_value(&timed).unwrap()["duration_ms"], json!(12));
    }
}
