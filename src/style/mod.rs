//! Display styles for candidates
//!
//! A style is a space separated list of semantic tokens such as `"bold blue"`.
//! Tokens are plain strings so they survive the JSON wire formats unchanged;
//! adapters that talk ANSI convert them through [`sgr`].

use nu_ansi_term::{Color, Style};
use std::path::Path;

pub const DEFAULT: &str = "";

pub const BLACK: &str = "black";
pub const RED: &str = "red";
pub const GREEN: &str = "green";
pub const YELLOW: &str = "yellow";
pub const BLUE: &str = "blue";
pub const MAGENTA: &str = "magenta";
pub const CYAN: &str = "cyan";
pub const WHITE: &str = "white";

pub const BRIGHT_BLACK: &str = "bright-black";
pub const BRIGHT_RED: &str = "bright-red";
pub const BRIGHT_GREEN: &str = "bright-green";
pub const BRIGHT_YELLOW: &str = "bright-yellow";
pub const BRIGHT_BLUE: &str = "bright-blue";
pub const BRIGHT_MAGENTA: &str = "bright-magenta";
pub const BRIGHT_CYAN: &str = "bright-cyan";
pub const BRIGHT_WHITE: &str = "bright-white";

pub const BG_BLACK: &str = "bg-black";
pub const BG_RED: &str = "bg-red";
pub const BG_GREEN: &str = "bg-green";
pub const BG_YELLOW: &str = "bg-yellow";
pub const BG_BLUE: &str = "bg-blue";
pub const BG_MAGENTA: &str = "bg-magenta";
pub const BG_CYAN: &str = "bg-cyan";
pub const BG_WHITE: &str = "bg-white";

pub const BOLD: &str = "bold";
pub const DIM: &str = "dim";
pub const ITALIC: &str = "italic";
pub const UNDERLINED: &str = "underlined";
pub const BLINK: &str = "blink";
pub const INVERSE: &str = "inverse";

/// Combine several styles into one
pub fn of(styles: &[&str]) -> String {
    styles
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Gray, used for descriptions
pub fn gray() -> String {
    of(&[DIM, WHITE])
}

/// A color from the xterm 256-color palette
pub fn xterm256_color(i: u8) -> String {
    format!("color{i}")
}

/// A 24-bit true color
pub fn true_color(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Styles of the reserved tokens every adapter renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Styles {
    pub value: String,
    pub description: String,
    pub error: String,
    pub usage: String,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            value: DEFAULT.to_string(),
            description: gray(),
            error: of(&[BOLD, RED]),
            usage: of(&[DIM, ITALIC]),
        }
    }
}

impl Styles {
    /// Fixed fallback used when color is disabled
    pub fn colorless() -> Self {
        Self {
            value: DEFAULT.to_string(),
            description: DEFAULT.to_string(),
            error: UNDERLINED.to_string(),
            usage: ITALIC.to_string(),
        }
    }

    /// Pick the palette for the given color setting
    pub fn for_color(color: bool) -> Self {
        if color { Self::default() } else { Self::colorless() }
    }
}

/// Style for a filesystem entry
///
/// Directories are bold blue, symlinks bold cyan, executables bold green.
/// Entries that cannot be inspected get the default style.
pub fn for_path(path: &Path) -> String {
    let Ok(meta) = std::fs::symlink_metadata(path) else {
        return DEFAULT.to_string();
    };

    if meta.file_type().is_symlink() {
        return of(&[BOLD, CYAN]);
    }
    if meta.is_dir() {
        return of(&[BOLD, BLUE]);
    }
    if is_executable(&meta) {
        return of(&[BOLD, GREEN]);
    }
    DEFAULT.to_string()
}

#[cfg(unix)]
fn is_executable(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &std::fs::Metadata) -> bool {
    false
}

/// Parse a style string into an ANSI style
pub fn parse(s: &str) -> Style {
    s.split_whitespace().fold(Style::new(), apply_token)
}

fn apply_token(style: Style, token: &str) -> Style {
    match token {
        BOLD => style.bold(),
        DIM => style.dimmed(),
        ITALIC => style.italic(),
        UNDERLINED => style.underline(),
        BLINK => style.blink(),
        INVERSE => style.reverse(),
        _ => {
            if let Some(bg) = token.strip_prefix("bg-") {
                match parse_color(bg) {
                    Some(color) => style.on(color),
                    None => style,
                }
            } else {
                match parse_color(token) {
                    Some(color) => style.fg(color),
                    None => style,
                }
            }
        }
    }
}

fn parse_color(token: &str) -> Option<Color> {
    let color = match token {
        BLACK => Color::Black,
        RED => Color::Red,
        GREEN => Color::Green,
        YELLOW => Color::Yellow,
        BLUE => Color::Blue,
        MAGENTA => Color::Purple,
        CYAN => Color::Cyan,
        WHITE => Color::White,
        BRIGHT_BLACK => Color::DarkGray,
        BRIGHT_RED => Color::LightRed,
        BRIGHT_GREEN => Color::LightGreen,
        BRIGHT_YELLOW => Color::LightYellow,
        BRIGHT_BLUE => Color::LightBlue,
        BRIGHT_MAGENTA => Color::LightPurple,
        BRIGHT_CYAN => Color::LightCyan,
        BRIGHT_WHITE => Color::LightGray,
        _ => {
            if let Some(index) = token.strip_prefix("color") {
                return index.parse::<u8>().ok().map(Color::Fixed);
            }
            if let Some(hex) = token.strip_prefix('#') {
                if hex.len() != 6 {
                    return None;
                }
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                return Some(Color::Rgb(r, g, b));
            }
            return None;
        }
    };
    Some(color)
}

/// The full SGR escape sequence for a style (empty for the default style)
pub fn sgr(s: &str) -> String {
    parse(s).prefix().to_string()
}

/// The bare SGR parameters, e.g. `1;34`, as used by zsh list-colors
pub fn sgr_codes(s: &str) -> String {
    let seq = sgr(s);
    seq.trim_start_matches("\x1b[")
        .trim_end_matches('m')
        .to_string()
}

/// Wrap text in the escape sequences of a style
pub fn paint(s: &str, text: &str) -> String {
    parse(s).paint(text).to_string()
}
