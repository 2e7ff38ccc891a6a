use std::path::Path;

use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};

use crate::config::RequestSpec;
use crate::http::ExecutionResult;
use crate::runner::types::{BatchSummary, FileReport, OutcomeKind, RequestOutcome};
use crate::utils::{ResponseFormat, ResponseFormatter};

/// 把执行结果渲染到每个文件独立的输出缓冲区
pub struct Reporter {
    formatter: ResponseFormatter,
    color: bool,
}

impl Reporter {
    pub fn new(format: ResponseFormat, color: bool) -> Self {
        Self {
            formatter: ResponseFormatter::new(format).with_color(color),
            color,
        }
    }

    fn paint(&self, text: &str, paint: fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn request_line(spec: &RequestSpec) -> String {
        match spec.display_name() {
            Some(name) => format!("{} - {} {}", name, spec.method(), spec.url),
            None => format!("{} {}", spec.method(), spec.url),
        }
    }

    /// 成功收到响应（包括 >= 400）
    pub fn write_result(
        &self,
        out: &mut String,
        source: &Path,
        spec: &RequestSpec,
        result: &ExecutionResult,
    ) {
        let symbol = if result.is_error() { "✗" } else { "✓" };
        let headline = format!(" {} API request executed for: {}", symbol, source.display());

        out.push('\n');
        if !self.color {
            out.push_str(&headline);
        } else if result.is_error() {
            out.push_str(&headline.red().to_string());
        } else {
            out.push_str(&headline.green().to_string());
        }
        out.push('\n');
        out.push_str(&format!(" {}\n", Self::request_line(spec)));

        for line in self.formatter.format(result).lines() {
            out.push_str("   ");
            out.push_str(line);
            out.push('\n');
        }
    }

    pub fn write_saved(&self, out: &mut String, path: &Path) {
        out.push_str(&format!("\n   Response saved to {}\n", path.display()));
    }

    pub fn write_warning(&self, out: &mut String, message: &str) {
        out.push_str(&format!(
            "   {}: {}\n",
            self.paint("Warning", |s| s.yellow()),
            message
        ));
    }

    pub fn write_skipped(&self, out: &mut String, source: &Path, spec: &RequestSpec) {
        out.push('\n');
        out.push_str(&self.paint(
            &format!(
                " ⊘ Running config is disabled for {} in {}, skipping execution.",
                spec.url,
                source.display()
            ),
            |s| s.dimmed(),
        ));
        out.push('\n');
    }

    pub fn write_failure(&self, out: &mut String, source: &Path, target: &str, error: &str) {
        out.push('\n');
        out.push_str(&self.paint(
            &format!(" ✗ {} ({})", target, source.display()),
            |s| s.red(),
        ));
        out.push('\n');
        out.push_str(&format!(
            "   {}: {}\n",
            self.paint("Error", |s| s.red().bold()),
            error
        ));
    }

    pub fn write_end(&self, out: &mut String) {
        out.push_str(&self.paint("\nEND\n", |s| s.red()));
    }

    /// 所有请求的汇总表格
    pub fn summary_table(&self, reports: &[FileReport]) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["File", "Method", "URL", "Status", "Result", "Time"]);

        for outcome in reports.iter().flat_map(|r| &r.outcomes) {
            table.add_row(self.summary_row(outcome));
        }

        table.to_string()
    }

    fn summary_row(&self, outcome: &RequestOutcome) -> Vec<Cell> {
        let (label, color) = match outcome.kind {
            OutcomeKind::Executed if outcome.is_http_error() => ("error", Color::Red),
            OutcomeKind::Executed => ("ok", Color::Green),
            OutcomeKind::Skipped => ("skipped", Color::DarkGrey),
            OutcomeKind::Failed => ("failed", Color::Red),
        };
        let status = outcome
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());

        let mut result = Cell::new(label);
        let mut status_cell = Cell::new(status);
        if self.color {
            result = result.fg(color);
            status_cell = status_cell.fg(color);
        }

        vec![
            Cell::new(outcome.source.display()),
            Cell::new(&outcome.method),
            Cell::new(&outcome.url),
            status_cell,
            result,
            Cell::new(format!("{}ms", outcome.duration.as_millis())),
        ]
    }

    pub fn summary_line(&self, summary: &BatchSummary) -> String {
        format!(
            "{}: {} ok, {} http errors, {} failed, {} skipped, {} total in {} files ({:.3}s)",
            self.paint("Requests", |s| s.bold()),
            summary.succeeded,
            summary.http_errors,
            summary.failed,
            summary.skipped,
            summary.total,
            summary.files,
            summary.total_duration.as_secs_f64()
        )
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(ResponseFormat::Verbose, true)
    }
}
