use colored::*;

/// Shown once before the first prompt.
pub const BANNER: &str = "Press CTRL + C to exit";

/// Decides how loop output is decorated.
///
/// Colors are only ever added around fixed messages; converted dates are
/// always printed as plain text.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    color: bool,
}

impl Style {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn banner(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn prompt(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn rejected(&self, msg: &str) -> String {
        if self.color {
            msg.red().to_string()
        } else {
            msg.to_string()
        }
    }
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}
