//! Logging utilities with colored output and progress display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro gated by the global verbose flag
//! - `ProgressLine` for single-line progress display with multiple counters
//!
//! Everything is written to stderr: enhanced HTML may be streamed to stdout.
//!
//! # Example
//!
//! ```ignore
//! // Simple logging
//! log!("enhance"; "styled {} buttons", count);
//!
//! // Progress line for a multi-file run
//! let progress = ProgressLine::new("enhance", &[("pages", 12)]);
//! progress.inc("pages");
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{StderrLock, Write, stderr},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Instant,
};

/// Global verbose flag (set by `--verbose` or the `debug` option)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Whether a progress line currently owns the last terminal row.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Output
// ============================================================================

/// Write one log line above the progress line, if one is showing.
pub fn log(module: &str, message: &str) {
    let mut out = stderr().lock();
    let progress = PROGRESS_ACTIVE.load(Ordering::SeqCst);
    if progress {
        clear_row(&mut out);
    }
    writeln!(out, "{} {message}", prefix(module)).ok();
    if progress {
        // The next progress refresh redraws the row.
        write!(out, "{}", prefix("enhance")).ok();
    }
    out.flush().ok();
}

/// Colored `[module]` prefix.
fn prefix(module: &str) -> String {
    let tag = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "enhance" => tag.bright_blue().bold().to_string(),
        "config" | "theme" => tag.bright_cyan().bold().to_string(),
        "watch" => tag.bright_green().bold().to_string(),
        "error" => tag.bright_red().bold().to_string(),
        "warning" => tag.yellow().bold().to_string(),
        _ => tag.bright_yellow().bold().to_string(),
    }
}

fn clear_row(out: &mut StderrLock<'_>) {
    execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
}

// ============================================================================
// Progress Line
// ============================================================================

/// In-place counters for a multi-file run.
///
/// Displays: `[enhance] pages(42/69) 1.2s`
///
/// Refreshes use `try_lock`, so a busy display never blocks a worker.
pub struct ProgressLine {
    module: &'static str,
    counters: Vec<Counter>,
    started: Instant,
    lock: Mutex<()>,
}

struct Counter {
    name: &'static str,
    total: usize,
    done: AtomicUsize,
}

impl ProgressLine {
    /// Start a progress line. Counters with a zero total are dropped.
    pub fn new(module: &'static str, items: &[(&'static str, usize)]) -> Self {
        let counters = items
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|&(name, total)| Counter {
                name,
                total,
                done: AtomicUsize::new(0),
            })
            .collect();

        PROGRESS_ACTIVE.store(true, Ordering::SeqCst);
        let progress = Self {
            module,
            counters,
            started: Instant::now(),
            lock: Mutex::new(()),
        };
        progress.draw(false);
        progress
    }

    /// Count one finished item; unknown names are ignored.
    pub fn inc(&self, name: &str) {
        let Some(counter) = self.counters.iter().find(|c| c.name == name) else {
            return;
        };
        counter.done.fetch_add(1, Ordering::Relaxed);
        if let Some(_guard) = self.lock.try_lock() {
            self.draw(false);
        }
    }

    fn counters_text(&self) -> String {
        self.counters
            .iter()
            .map(|c| format!("{}({}/{})", c.name, c.done.load(Ordering::Relaxed), c.total))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn draw(&self, last: bool) {
        let mut out = stderr().lock();
        clear_row(&mut out);
        write!(out, "{} {}", prefix(self.module), self.counters_text()).ok();
        if last {
            let elapsed = self.started.elapsed().as_secs_f64();
            writeln!(out, " {}", format!("{elapsed:.1}s").dimmed()).ok();
        }
        out.flush().ok();
    }

    /// Leave the final counts on screen.
    pub fn finish(self) {
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
        {
            let _guard = self.lock.lock();
            self.draw(true);
        }
        std::mem::forget(self);
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        // Abandoned without `finish`: wipe the partial row.
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
        let mut out = stderr().lock();
        clear_row(&mut out);
        out.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_line_skips_empty_counters() {
        let progress = ProgressLine::new("enhance", &[("pages", 3), ("skipped", 0)]);
        assert_eq!(progress.counters.len(), 1);
        progress.inc("pages");
        progress.inc("unknown");
        assert_eq!(progress.counters_text(), "pages(1/3)");
    }

    #[test]
    fn test_prefix_keeps_module_name() {
        assert!(prefix("watch").contains("[watch]"));
        assert!(prefix("Enhance").contains("[Enhance]"));
    }
}
