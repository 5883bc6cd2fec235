/*============================================================
  Synavera Project: Quack
  Module: quack::output
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Terminal styling for Quack. Colour policy is resolved once
    into a `Palette` value that callers pass along explicitly.

  Security / Safety Notes:
    Writes to stdout/stderr only.

  Dependencies:
    clap (ValueEnum) for the `--color` flag.

  Operational Scope:
    Used by the report, prompt and install modules.

  Revision History:
    2026-10-19 COD  Introduced palette-based output helpers.
  ------------------------------------------------------------
  SSE Principles Observed:
    - No process-wide mutable formatting state
============================================================*/

use std::fmt;
use std::io::IsTerminal;

use clap::ValueEnum;

/// When to emit ANSI colour sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    Always,
    #[default]
    Never,
    Auto,
}

impl ColorMode {
    /// Case-insensitive parse of `always`, `never` or `auto`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "always" => Some(ColorMode::Always),
            "never" => Some(ColorMode::Never),
            "auto" => Some(ColorMode::Auto),
            _ => None,
        }
    }

    /// Value forwarded to pacman's own `--color` flag.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Always => "always",
            ColorMode::Never => "never",
            ColorMode::Auto => "auto",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Blue,
    Magenta,
    Cyan,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Red => "31",
            Color::Green => "32",
            Color::Blue => "34",
            Color::Magenta => "35",
            Color::Cyan => "36",
        }
    }
}

/// Text attributes for one painted span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    color: Option<Color>,
    bold: bool,
    underline: bool,
}

impl Style {
    pub const PLAIN: Style = Style {
        color: None,
        bold: false,
        underline: false,
    };

    pub const fn fg(color: Color) -> Self {
        Style {
            color: Some(color),
            bold: false,
            underline: false,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    fn sgr(self) -> String {
        let mut attrs: Vec<&str> = Vec::new();
        if let Some(color) = self.color {
            attrs.push(color.code());
        }
        if self.bold {
            attrs.push("1");
        }
        if self.underline {
            attrs.push("4");
        }
        attrs.join(";")
    }
}

/// Resolved colour decision, threaded through every output call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
    mode: ColorMode,
}

impl Palette {
    /// Resolve a mode against the current stdout.
    pub fn from_mode(mode: ColorMode) -> Self {
        let enabled = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        };
        Self { enabled, mode }
    }

    pub fn plain() -> Self {
        Self {
            enabled: false,
            mode: ColorMode::Never,
        }
    }

    /// The mode as requested, for forwarding to pacman.
    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn paint(&self, text: &str, style: Style) -> String {
        if !self.enabled || style == Style::PLAIN {
            return text.to_string();
        }
        format!("\x1b[{}m{text}\x1b[0m", style.sgr())
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(text, Style::PLAIN.bold())
    }

    /// `:: message` line used for progress notes.
    pub fn info_line(&self, message: &str) -> String {
        format!(
            "{} {}",
            self.paint("::", Style::fg(Color::Blue)),
            self.bold(message)
        )
    }

    /// `error : message` line.
    pub fn error_line(&self, message: &str) -> String {
        format!(
            "{} {message}",
            self.paint("error :", Style::fg(Color::Red).bold())
        )
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.info_line(message));
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", self.error_line(message));
    }
}
