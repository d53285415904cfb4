//! Console output for the build commands.
//!
//! Status lines go to stderr, right-aligned like `   Compiling esm`. stdout
//! carries the build file report in human mode and one JSON event per line
//! with `--message-format json`.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Human and JSON output are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    Human {
        verbosity: Verbosity,
        color: ColorChoice,
    },
    /// Only JSON events on stdout; status lines are dropped.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    #[default]
    Normal,
    /// Per-step lines instead of a progress bar.
    Verbose,
}

/// `--color` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(self, is_terminal: bool) -> bool {
        match self {
            ColorChoice::Auto => is_terminal,
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected auto, always or never",
                s
            )),
        }
    }
}

/// Status verb printed in front of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Compiling,
    Emitting,
    Finished,
    Updated,
    Fresh,
    Warning,
    Error,
}

const STATUS_WIDTH: usize = 12;

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Compiling => "Compiling",
            Status::Emitting => "Emitting",
            Status::Finished => "Finished",
            Status::Updated => "Updated",
            Status::Fresh => "Fresh",
            Status::Warning => "warning",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Compiling | Status::Emitting => "\x1b[1;36m",
            Status::Finished | Status::Updated => "\x1b[1;32m",
            Status::Fresh => "\x1b[1;34m",
            Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

/// Shared console handle for a command run.
pub struct Shell {
    mode: ShellMode,
    /// Colors on stderr status lines.
    err_color: bool,
    /// Colors in the stdout report.
    out_color: bool,
    events: Mutex<Box<dyn Write + Send>>,
}

impl Shell {
    pub fn new(mode: ShellMode) -> Self {
        Self::with_event_sink(mode, Box::new(io::stdout()))
    }

    /// Shell whose JSON events go to `sink` instead of stdout.
    pub fn with_event_sink(mode: ShellMode, sink: Box<dyn Write + Send>) -> Self {
        let (err_color, out_color) = match &mode {
            ShellMode::Json => (false, false),
            ShellMode::Human { color, .. } => (
                color.enabled(io::stderr().is_terminal()),
                color.enabled(io::stdout().is_terminal()),
            ),
        };

        Shell {
            mode,
            err_color,
            out_color,
            events: Mutex::new(sink),
        }
    }

    /// Build a shell from the global CLI flags; JSON wins over quiet/verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice, json: bool) -> Self {
        let mode = if json {
            ShellMode::Json
        } else {
            let verbosity = if quiet {
                Verbosity::Quiet
            } else if verbose {
                Verbosity::Verbose
            } else {
                Verbosity::Normal
            };
            ShellMode::Human { verbosity, color }
        };

        Shell::new(mode)
    }

    fn verbosity(&self) -> Option<Verbosity> {
        match self.mode {
            ShellMode::Human { verbosity, .. } => Some(verbosity),
            ShellMode::Json => None,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity() == Some(Verbosity::Quiet)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity() == Some(Verbosity::Verbose)
    }

    pub fn is_json(&self) -> bool {
        self.mode == ShellMode::Json
    }

    /// Whether stderr output (status lines, diagnostics, logs) is colored.
    pub fn use_color(&self) -> bool {
        self.err_color
    }

    /// Whether the stdout file report is colored.
    pub fn report_color(&self) -> bool {
        self.out_color
    }

    /// Print `{status:>12} {msg}` to stderr.
    ///
    /// Quiet mode keeps only errors; JSON mode prints nothing.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() || (self.is_quiet() && status != Status::Error) {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Report a fatal error, as an `error` event in JSON mode.
    pub fn error(&self, msg: impl Display) {
        if self.is_json() {
            self.json_event(&serde_json::json!({
                "reason": "error",
                "message": msg.to_string(),
            }));
        } else {
            self.status(Status::Error, msg);
        }
    }

    /// Write one event line. Ignored outside JSON mode.
    pub fn json_event(&self, event: &serde_json::Value) {
        if !self.is_json() {
            return;
        }
        if let Ok(mut sink) = self.events.lock() {
            if let Err(e) = writeln!(sink, "{}", event).and_then(|_| sink.flush()) {
                tracing::debug!("failed to write JSON event: {}", e);
            }
        }
    }

    fn format_status(&self, status: Status) -> String {
        if self.err_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                status.as_str(),
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", status.as_str(), width = STATUS_WIDTH)
        }
    }

    /// Print the start line now and time until `finish_with_message`.
    pub fn span(self: &Arc<Self>, status: Status, msg: impl Display) -> Span {
        self.status(status, msg);
        Span {
            shell: Arc::clone(self),
            start: Instant::now(),
        }
    }

    /// Progress over the compile steps.
    pub fn progress(self: &Arc<Self>, total: u64, msg: impl Display) -> Progress {
        Progress::new(Arc::clone(self), total, msg.to_string())
    }
}

/// Timer for one build run.
pub struct Span {
    shell: Arc<Shell>,
    start: Instant,
}

impl Span {
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Print `Finished {msg} in {elapsed}`.
    pub fn finish_with_message(self, msg: impl Display) {
        let elapsed = format_duration(self.start.elapsed());
        self.shell
            .status(Status::Finished, format!("{} in {}", msg, elapsed));
    }
}

/// Bar in normal mode, step lines in verbose mode, `build-progress` events
/// in JSON mode.
pub struct Progress {
    shell: Arc<Shell>,
    bar: Option<ProgressBar>,
    total: u64,
    current: u64,
    message: String,
}

impl Progress {
    fn new(shell: Arc<Shell>, total: u64, message: String) -> Self {
        let show_bar = shell.verbosity() == Some(Verbosity::Normal) && total > 1;
        let bar = show_bar.then(|| {
            let bar = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
            {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar.set_message(message.clone());
            bar
        });

        Progress {
            shell,
            bar,
            total,
            current: 0,
            message,
        }
    }

    /// Record that `step` finished.
    pub fn inc(&mut self, delta: u64, step: impl Display) {
        self.current += delta;

        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }

        if self.shell.is_json() {
            self.shell.json_event(&serde_json::json!({
                "reason": "build-progress",
                "current": self.current,
                "total": self.total,
                "step": step.to_string(),
                "message": self.message,
            }));
        } else if self.shell.is_verbose() {
            eprintln!("  {} [{}/{}] {}", self.message, self.current, self.total, step);
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
