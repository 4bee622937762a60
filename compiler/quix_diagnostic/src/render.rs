//! Text forms of a diagnostic.
//!
//! | Format | Shape |
//! |---|---|
//! | `RawCode` | `1001` |
//! | `CodeLoc` | `1001@file:3:7` |
//! | `CodeText` | `1001: subject` |
//! | `Plain` | `file:3:7: error: subject [flag]` plus source line and caret |
//! | `Ansi16` | `Plain` with 16-color escapes |
//! | `Modern` | boxed overview, hints and a framed window of source |
//!
//! Unknown rows and columns print as `?`.

use std::fmt::Write as _;
use std::str::FromStr;

use quix_ir::SourceView;
use thiserror::Error;

use crate::{DiagMessage, Severity};

/// ANSI color codes.
mod colors {
    pub const BOLD: &str = "\x1b[1m";
    pub const WHITE: &str = "\x1b[37;1m";
    pub const GREY: &str = "\x1b[37m";
    pub const RED: &str = "\x1b[31;1m";
    pub const RED_UNDERLINE: &str = "\x1b[31;1;4m";
    pub const MAGENTA: &str = "\x1b[35;1m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GREEN: &str = "\x1b[32m";
    pub const GREEN_BOLD: &str = "\x1b[32;1m";
    pub const RESET: &str = "\x1b[0m";
}

/// Width of the overview and hint text in the modern view.
const TEXT_WIDTH: usize = 70;
/// Width of the source window in the modern view.
const WINDOW_WIDTH: u32 = 60;
const WINDOW_MIN_ROWS: u32 = 3;
const WINDOW_MAX_ROWS: u32 = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum DiagFormat {
    RawCode,
    CodeLoc,
    CodeText,
    #[default]
    Plain,
    Ansi16,
    Modern,
}

impl DiagFormat {
    pub const ALL: &'static [DiagFormat] = &[
        DiagFormat::RawCode,
        DiagFormat::CodeLoc,
        DiagFormat::CodeText,
        DiagFormat::Plain,
        DiagFormat::Ansi16,
        DiagFormat::Modern,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DiagFormat::RawCode => "code",
            DiagFormat::CodeLoc => "code-loc",
            DiagFormat::CodeText => "code-text",
            DiagFormat::Plain => "plain",
            DiagFormat::Ansi16 => "ansi",
            DiagFormat::Modern => "modern",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown diagnostic format `{0}` (expected code, code-loc, code-text, plain, ansi or modern)")]
pub struct UnknownFormat(pub String);

impl FromStr for DiagFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiagFormat::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Color output mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colors when the sink is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }

    /// Human-readable format for this mode: `Ansi16` with colors, `Plain`
    /// without.
    pub fn human_format(self, is_tty: bool) -> DiagFormat {
        if self.should_use_colors(is_tty) {
            DiagFormat::Ansi16
        } else {
            DiagFormat::Plain
        }
    }
}

/// Resolved positions of a message.
struct Place {
    file: String,
    start: (Option<u32>, Option<u32>),
    end: (Option<u32>, Option<u32>),
}

impl Place {
    fn of(msg: &DiagMessage, source: Option<&dyn SourceView>) -> Self {
        match source {
            Some(s) => Place {
                file: s.filename().to_string(),
                start: (s.line(msg.start), s.col(msg.start)),
                end: (s.line(msg.end), s.col(msg.end)),
            },
            None => Place {
                file: "?".to_string(),
                start: (None, None),
                end: (None, None),
            },
        }
    }
}

fn num(n: Option<u32>) -> String {
    n.map_or_else(|| "?".to_string(), |n| n.to_string())
}

/// Render one message.
pub fn render_message(
    msg: &DiagMessage,
    format: DiagFormat,
    source: Option<&mut (dyn SourceView + '_)>,
) -> String {
    let code = msg.code.code();
    match format {
        DiagFormat::RawCode => code.to_string(),
        DiagFormat::CodeText => format!("{code}: {}", msg.subject),
        DiagFormat::CodeLoc => {
            let place = Place::of(msg, source.as_deref());
            format!(
                "{code}@{}:{}:{}",
                place.file,
                num(place.start.0),
                num(place.start.1)
            )
        }
        DiagFormat::Plain => clang_style(msg, source, false),
        DiagFormat::Ansi16 => clang_style(msg, source, true),
        DiagFormat::Modern => modern(msg, source),
    }
}

fn clang_style(
    msg: &DiagMessage,
    source: Option<&mut (dyn SourceView + '_)>,
    color: bool,
) -> String {
    let paint = |c: &'static str| if color { c } else { "" };
    let place = Place::of(msg, source.as_deref());
    let sev_color = match msg.severity {
        Severity::Error | Severity::FatalError => colors::RED,
        Severity::Warn => colors::MAGENTA,
        Severity::Debug | Severity::Info => colors::WHITE,
    };

    let mut out = String::new();
    let _ = write!(
        out,
        "{}{}:{}:{}:{} {}{}:{} {}{} [{}]{}",
        paint(colors::WHITE),
        place.file,
        num(place.start.0),
        num(place.start.1),
        paint(colors::RESET),
        paint(sev_color),
        msg.severity,
        paint(colors::RESET),
        paint(colors::WHITE),
        msg.subject,
        msg.code.flag_name(),
        paint(colors::RESET),
    );

    if let Some((line, offset)) = source.and_then(|s| s.snippet(msg.start)) {
        let _ = write!(
            out,
            "\n{line}\n{}{}^{}",
            " ".repeat(offset as usize),
            paint(colors::GREEN_BOLD),
            paint(colors::RESET)
        );
    }
    out
}

/// Greedy word wrap. Words longer than `width` are split.
pub fn word_break(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            lines.push(chars.drain(..width).collect());
        }
        let len = chars.len();
        if len == 0 {
            continue;
        }
        if line_len > 0 && line_len + 1 + len > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.extend(chars);
        line_len += len;
    }
    if line_len > 0 {
        lines.push(line);
    }
    lines
}

/// Source window around a span: `(x0, y0, x1, y1)`, zero-based, exclusive
/// ends. Always `WINDOW_WIDTH` wide and 3 to 5 rows tall, centered
/// horizontally on the span where the left edge allows it.
pub fn window_bounds(start: (u32, u32), end: (u32, u32)) -> (u32, u32, u32, u32) {
    let (sl, sc) = (start.0.saturating_sub(1), start.1.saturating_sub(1));
    let (el, ec) = (end.0.saturating_sub(1).max(sl), end.1.saturating_sub(1));

    let span_width = if el == sl { ec.saturating_sub(sc) } else { 0 };
    let x0 = if span_width >= WINDOW_WIDTH {
        sc
    } else {
        sc.saturating_sub((WINDOW_WIDTH - span_width) / 2)
    };

    let y0 = sl.saturating_sub(1);
    let rows = (el + 2 - y0).clamp(WINDOW_MIN_ROWS, WINDOW_MAX_ROWS);
    (x0, y0, x0 + WINDOW_WIDTH, y0 + rows)
}

fn modern(msg: &DiagMessage, source: Option<&mut (dyn SourceView + '_)>) -> String {
    use colors::{
        BOLD, GREEN, GREEN_BOLD, GREY, MAGENTA, RED, RED_UNDERLINE, RESET, WHITE, YELLOW,
    };

    let place = Place::of(msg, source.as_deref());
    let mut out = String::new();

    let _ = write!(out, "{WHITE}{}:", place.file);
    if place.start.0.is_some() || place.end.0.is_some() {
        let _ = write!(
            out,
            "{}:{}-{}:{}:",
            num(place.start.0),
            num(place.start.1),
            num(place.end.0),
            num(place.end.1)
        );
    }
    let _ = write!(out, "{RESET} ");

    let flag = msg.code.flag_name();
    let color = match msg.severity {
        Severity::Debug => BOLD,
        Severity::Info => WHITE,
        Severity::Warn => MAGENTA,
        Severity::Error => RED,
        Severity::FatalError => RED_UNDERLINE,
    };
    let _ = writeln!(out, "{color}{}:{RESET} {color}{flag}{RESET}", msg.severity);

    let window = match (place.start, place.end) {
        ((Some(sl), Some(sc)), (Some(el), Some(ec))) => Some(window_bounds((sl, sc), (el, ec))),
        _ => None,
    };
    let gutter = window.map_or(0, |(_, _, _, y1)| y1.to_string().len());
    let ind = " ".repeat(gutter);

    let overview = word_break(&msg.code.format_overview(&msg.subject), TEXT_WIDTH);
    match overview.as_slice() {
        [] => {}
        [only] => {
            let _ = writeln!(out, "{ind}{YELLOW}╠{RESET} {MAGENTA}{only}{RESET}\n");
        }
        [first, middle @ .., last] => {
            let _ = writeln!(out, "{ind}{YELLOW}╔{RESET} {MAGENTA}{first}{RESET}");
            for line in middle {
                let _ = writeln!(out, "{ind}{YELLOW}║{RESET} {MAGENTA}{line}{RESET}");
            }
            let _ = writeln!(out, "{ind}{YELLOW}╚{RESET} {MAGENTA}{last}{RESET}\n");
        }
    }

    let hints = msg.code.hints();
    if !hints.is_empty() {
        let _ = writeln!(out, "{ind}{YELLOW}╔═{RESET} {GREEN_BOLD}Code Intelligence:{RESET}");
        for hint in hints {
            for (i, line) in word_break(hint, TEXT_WIDTH - 2).iter().enumerate() {
                let lead = if i == 0 { "╠═" } else { "║ " };
                let _ = writeln!(out, "{ind}{YELLOW}{lead}{RESET} {GREY}{line}{RESET}");
            }
        }
        out.push('\n');
    }

    let rows = match (window, source) {
        (Some((x0, y0, x1, y1)), Some(s)) => s.rect(x0, y0, x1, y1, ' ').map(|r| (y0, r)),
        _ => None,
    };
    if let Some((y0, rows)) = rows {
        let bar = "━".repeat(WINDOW_WIDTH as usize + 2);
        let _ = writeln!(out, "{ind}  {GREEN}┏{bar}┓{RESET}");
        for (i, row) in rows.iter().enumerate() {
            let number = y0 as usize + i + 1;
            let pad = (WINDOW_WIDTH as usize).saturating_sub(row.chars().count());
            let _ = writeln!(
                out,
                "{number:>width$} {GREEN}┃{RESET} {row}{} {GREEN}┃{RESET}",
                " ".repeat(pad),
                width = gutter + 1
            );
        }
        let _ = writeln!(out, "{ind}  {GREEN}┗{bar}┛{RESET}");
    }

    out
}
