//! Terminal output.
//!
//! Every line is `[module] message`, coloured by what the module is: the
//! asset server, the watcher, a markup/style/script category or an image
//! category. `debug!` lines only show with `--verbose`.
//!
//! Watch mode also keeps a status block (`[12:04:31] ✓ rebuilt: styles`)
//! that each rebuild overwrites in place.
//!
//! ```ignore
//! log!("styles"; "{} file(s) written", count);
//! debug!("watch"; "ignored {}", path.display());
//! status_success("rebuilt: styles");
//! ```

use std::io::{Write, stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// `log!("module"; "format {}", args)`
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, but only with `--verbose`. Arguments are not evaluated
/// otherwise.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Colour family of a `[module]` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrefixStyle {
    Server,
    Watch,
    Error,
    Warning,
    Text,
    Binary,
    Other,
}

impl PrefixStyle {
    fn of(module: &str) -> Self {
        match module.to_ascii_lowercase().as_str() {
            "serve" | "reload" | "tunnel" => Self::Server,
            "watch" | "clean" => Self::Watch,
            "error" => Self::Error,
            "warning" => Self::Warning,
            "views" | "styles" | "scripts" => Self::Text,
            "images" | "imagewebp" | "sprites" | "favicons" | "fonts" => Self::Binary,
            _ => Self::Other,
        }
    }

    fn paint(self, prefix: &str) -> String {
        match self {
            Self::Server => prefix.bright_blue().bold().to_string(),
            Self::Watch => prefix.bright_green().bold().to_string(),
            Self::Error => prefix.bright_red().bold().to_string(),
            Self::Warning => prefix.yellow().bold().to_string(),
            Self::Text => prefix.bright_magenta().bold().to_string(),
            Self::Binary => prefix.bright_cyan().bold().to_string(),
            Self::Other => prefix.bright_yellow().bold().to_string(),
        }
    }
}

/// Print one `[module] message` line.
pub fn log(module: &str, message: &str) {
    let prefix = PrefixStyle::of(module).paint(&format!("[{module}]"));

    let mut out = stdout().lock();
    // A status line may still be on screen
    execute!(out, Clear(ClearType::UntilNewLine)).ok();
    writeln!(out, "{prefix} {message}").ok();
    out.flush().ok();
}

/// `HH:MM:SS`, UTC.
fn clock() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

/// The watch-mode status block.
///
/// Remembers how tall the previous block was so the next one replaces it.
#[derive(Debug, Default)]
struct StatusLine {
    height: u16,
}

impl StatusLine {
    const fn new() -> Self {
        Self { height: 0 }
    }

    fn show(&mut self, ok: bool, text: &str) {
        let mark = if ok {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        };

        let mut out = stdout().lock();
        if self.height > 0 {
            execute!(
                out,
                cursor::MoveUp(self.height),
                Clear(ClearType::FromCursorDown)
            )
            .ok();
        }
        let stamp = format!("[{}]", clock());
        writeln!(out, "{} {mark} {text}", stamp.dimmed()).ok();
        out.flush().ok();

        self.height = height_of(text);
    }
}

fn height_of(text: &str) -> u16 {
    u16::try_from(text.lines().count().max(1)).unwrap_or(u16::MAX)
}

static STATUS: Mutex<StatusLine> = Mutex::new(StatusLine::new());

/// Replace the status block with a success line.
pub fn status_success(message: &str) {
    STATUS.lock().show(true, message);
}

/// Replace the status block with a failure summary and, if any, its detail.
pub fn status_error(summary: &str, detail: &str) {
    let text = if detail.is_empty() {
        summary.to_owned()
    } else {
        format!("{summary}\n{detail}")
    };
    STATUS.lock().show(false, &text);
}
