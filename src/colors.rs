/// Color support for launcher status messages
///
/// All launcher output goes to stderr, so stdout belongs to the proxied
/// binary alone. Colors follow the NO_COLOR standard (https://no-color.org/)
/// and CLICOLOR conventions, and default to on only when stderr is a terminal.
use colored::{ColoredString, Colorize, control};
use std::io::IsTerminal;

/// Configure `colored` from the environment and stderr's TTY status
pub fn init_colors() {
    control::set_override(colors_enabled(
        |key| std::env::var(key).ok(),
        std::io::stderr().is_terminal(),
    ));
}

fn colors_enabled<F>(var: F, is_tty: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    // NO_COLOR takes precedence over everything
    if var("NO_COLOR").is_some() {
        return false;
    }
    if var("CLICOLOR_FORCE").is_some_and(|v| v != "0") {
        return true;
    }
    if var("CLICOLOR").is_some_and(|v| v == "0") {
        return false;
    }
    is_tty
}

pub fn success_mark() -> ColoredString {
    "✓".green().bold()
}

pub fn error_label() -> ColoredString {
    "error:".red().bold()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_no_color_wins() {
        assert!(!colors_enabled(env(&[("NO_COLOR", ""), ("CLICOLOR_FORCE", "1")]), true));
    }

    #[test]
    fn test_force_overrides_tty() {
        assert!(colors_enabled(env(&[("CLICOLOR_FORCE", "1")]), false));
        assert!(!colors_enabled(env(&[("CLICOLOR_FORCE", "0")]), false));
    }

    #[test]
    fn test_clicolor_zero_disables() {
        assert!(!colors_enabled(env(&[("CLICOLOR", "0")]), true));
    }

    #[test]
    fn test_defaults_to_tty() {
        assert!(colors_enabled(env(&[]), true));
        assert!(!colors_enabled(env(&[]), false));
    }
}
