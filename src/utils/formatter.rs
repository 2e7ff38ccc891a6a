use crate::http::ExecutionResult;
use colored::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Compact,
    Verbose,
}

pub struct ResponseFormatter {
    format: ResponseFormat,
    color: bool,
}

impl ResponseFormatter {
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn format(&self, response: &ExecutionResult) -> String {
        match self.format {
            ResponseFormat::Compact => self.format_compact(response),
            ResponseFormat::Verbose => self.format_verbose(response),
        }
    }

    fn status_line(&self, response: &ExecutionResult) -> String {
        let status_line = format!("Status Code: {}", response.status_line());
        if !self.color {
            return status_line;
        }
        if response.is_success() {
            status_line.green().to_string()
        } else if response.is_client_error() {
            status_line.yellow().to_string()
        } else if response.is_error() {
            status_line.red().to_string()
        } else {
            status_line.cyan().to_string()
        }
    }

    fn timing(&self, response: &ExecutionResult) -> String {
        let timing = format!("Time: {}ms", response.duration().as_millis());
        if self.color {
            timing.cyan().to_string()
        } else {
            timing
        }
    }

    fn section(&self, title: &str) -> String {
        if self.color {
            title.blue().bold().to_string()
        } else {
            title.to_string()
        }
    }

    fn format_compact(&self, response: &ExecutionResult) -> String {
        let mut output = vec![self.status_line(response), self.timing(response)];

        let body = response.body_text();
        if !body.is_empty() && body.len() < 200 {
            // 尝试格式化 JSON，失败则显示原始内容
            output.push(try_format_json(&body).unwrap_or_else(|| body.to_string()));
        } else if !body.is_empty() {
            output.push(format!("Body: {} bytes", body.len()));
        }

        output.join("\n")
    }

    fn format_verbose(&self, response: &ExecutionResult) -> String {
        let mut output = vec![self.status_line(response), self.timing(response)];

        output.push(String::new());
        output.push(self.section("Headers:"));
        for (key, values) in response.headers() {
            for value in values {
                output.push(format!("  {}: {}", key, value));
            }
        }

        let body = response.body_text();
        output.push(String::new());
        output.push(self.section("Body:"));
        if !body.is_empty() {
            output.push(try_format_json(&body).unwrap_or_else(|| body.to_string()));
        }

        output.join("\n")
    }
}

/// 尝试将 body 格式化为漂亮的 JSON，不是 JSON 时返回 None
fn try_format_json(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    serde_json::to_string_pretty(&value).ok()
}
