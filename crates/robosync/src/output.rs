//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Tables use `tabled`,
//! structured formats use serde, plain emits one identifier per line.
//! Notices and status lines go to stderr so stdout stays machine-readable.

use std::io::{self, IsTerminal, Write};

use owo_colors::{OwoColorize, Style};
use tabled::{Table, Tabled, settings::Style as TableStyle};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color ────────────────────────────────────────────────────────────

pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub failure: Style,
    pub dim: Style,
}

impl Styles {
    pub fn for_mode(mode: ColorMode) -> Self {
        let mut styles = Self::default();
        if should_color(mode) {
            styles.success = Style::new().green().bold();
            styles.warning = Style::new().yellow().bold();
            styles.failure = Style::new().red().bold();
            styles.dim = Style::new().dimmed();
        }
        styles
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views mix key/value
/// headers with nested tables.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// One-line status message on stderr.
pub fn print_status(styles: &Styles, message: &str, quiet: bool) {
    if quiet {
        return;
    }
    eprintln!("{} {message}", "✓".style(styles.success));
}

/// Capability notices always print, even with `--quiet`: they describe
/// configuration that was not applied.
pub fn print_notices(styles: &Styles, notices: &[robosync_core::Notice]) {
    for notice in notices {
        eprintln!("{} {notice}", "warning:".style(styles.warning));
        eprintln!("  {}", notice.detail().style(styles.dim));
    }
}

pub fn print_failure(styles: &Styles, message: &str) {
    eprintln!("{} {message}", "error:".style(styles.failure));
}

// ── Format-specific renderers ────────────────────────────────────────

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(TableStyle::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

/// `-` for absent optional values in detail and table views.
pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Item {
        id: u64,
    }

    #[test]
    fn plain_uses_id_fn() {
        let out = render_single(
            OutputFormat::Plain,
            &Item { id: 7 },
            |_| "detail".into(),
            |i| i.id.to_string(),
        )
        .unwrap();
        assert_eq!(out, "7");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_single(
            OutputFormat::JsonCompact,
            &Item { id: 7 },
            |_| String::new(),
            |_| String::new(),
        )
        .unwrap();
        assert_eq!(out, r#"{"id":7}"#);
    }

    #[test]
    fn never_mode_leaves_text_unstyled() {
        let styles = Styles::for_mode(ColorMode::Never);
        assert_eq!(format!("{}", "x".style(styles.warning)), "x");
    }
}
