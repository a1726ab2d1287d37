use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use supports_color::Stream;

enum Sink {
    Stdout,
    Buffer(Arc<Mutex<String>>),
}

/// Console writer shared by the evaluator and command handlers.
///
/// Safe to use from pool workers; each call writes whole lines.
pub struct Printer {
    pub use_color: bool,
    sink: Sink,
}

impl Printer {
    pub fn new() -> Self {
        let use_color = supports_color::on(Stream::Stdout).is_some();
        Self {
            use_color,
            sink: Sink::Stdout,
        }
    }

    /// Collects everything into a buffer instead of stdout.
    pub fn buffered() -> (Self, Arc<Mutex<String>>) {
        let buffer = Arc::new(Mutex::new(String::new()));
        let printer = Self {
            use_color: false,
            sink: Sink::Buffer(Arc::clone(&buffer)),
        };
        (printer, buffer)
    }

    fn emit(&self, text: &str) {
        match self.sink {
            Sink::Stdout => {
                let mut out = io::stdout().lock();
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
            Sink::Buffer(ref buffer) => {
                buffer.lock().unwrap_or_else(PoisonError::into_inner).push_str(text);
            }
        }
    }

    /// Plain output, newline-terminated.
    pub fn line(&self, text: &str) {
        self.emit(&format!("{}\n", text));
    }

    pub fn success(&self, message: &str) {
        self.print_prefix("[+]", "green", message);
    }

    pub fn error(&self, message: &str) {
        self.print_prefix("[-]", "red", message);
    }

    pub fn warning(&self, message: &str) {
        self.print_prefix("[!]", "yellow", message);
    }

    pub fn info(&self, message: &str) {
        self.print_prefix("[?]", "cyan", message);
    }

    pub fn header(&self, title: &str) {
        if self.use_color {
            self.emit(&format!("\x1b[1;36m{}\x1b[0m\n", title));
            self.emit(&format!("\x1b[90m{}\x1b[0m\n", "─".repeat(title.chars().count())));
        } else {
            self.emit(&format!("{}\n{}\n", title, "─".repeat(title.chars().count())));
        }
    }

    fn print_prefix(&self, prefix: &str, color: &str, message: &str) {
        if self.use_color {
            let color_code = match color {
                "green" => "\x1b[32m",
                "red" => "\x1b[31m",
                "yellow" => "\x1b[33m",
                "cyan" => "\x1b[36m",
                _ => "\x1b[0m",
            };
            self.emit(&format!("{}{}\x1b[0m {}\n", color_code, prefix, message));
        } else {
            self.emit(&format!("{} {}\n", prefix, message));
        }
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}
