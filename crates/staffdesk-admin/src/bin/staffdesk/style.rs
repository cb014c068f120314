//! Terminal styling for CLI output.

use std::io::IsTerminal;

use owo_colors::OwoColorize;

fn styled(text: &str, to_stderr: bool, paint: impl Fn(&str) -> String) -> String {
    let terminal = if to_stderr {
        std::io::stderr().is_terminal()
    } else {
        std::io::stdout().is_terminal()
    };
    if terminal {
        paint(text)
    } else {
        text.to_string()
    }
}

pub fn success(text: impl AsRef<str>) -> String {
    styled(text.as_ref(), false, |text| text.green().to_string())
}

pub fn warning(text: impl AsRef<str>) -> String {
    styled(text.as_ref(), true, |text| text.yellow().to_string())
}

pub fn error(text: impl AsRef<str>) -> String {
    styled(text.as_ref(), true, |text| text.red().to_string())
}

pub fn accent(text: impl AsRef<str>) -> String {
    styled(text.as_ref(), false, |text| text.cyan().to_string())
}

/// First line (table header) in bold, the rest untouched.
pub fn heading(block: &str) -> String {
    match block.split_once('\n') {
        Some((first, rest)) => {
            format!("{}\n{rest}", styled(first, false, |text| text.bold().to_string()))
        }
        None => block.to_string(),
    }
}
