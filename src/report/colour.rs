//! Colour strategies for reports.

/// What a piece of report text is, for colouring purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Group title and its rules.
    Title,
    /// `[PASS]` marker.
    Pass,
    /// `[FAIL]` marker.
    Fail,
    /// `=>` between key and result.
    Arrow,
    /// Colon before a failure list.
    Colon,
    /// Pass count.
    Passes,
    /// Fail count.
    Fails,
    /// Total count.
    Total,
}

/// Decorates report text according to its [`Role`].
pub trait Colorizer {
    /// Return `text` decorated for `role`.
    fn wrap(&self, text: &str, role: Role) -> String;
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainColorizer;

impl Colorizer for PlainColorizer {
    fn wrap(&self, text: &str, _role: Role) -> String {
        text.to_string()
    }
}

const RED: &str = "\x1b[1;31m";
const GREEN: &str = "\x1b[0;32m";
const BLUE: &str = "\x1b[0;34m";
const LIGHT_BLUE: &str = "\x1b[0;36m";
const RESET: &str = "\x1b[m";

/// Terminal colours via ANSI escape sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiColorizer;

impl Colorizer for AnsiColorizer {
    fn wrap(&self, text: &str, role: Role) -> String {
        let code = match role {
            Role::Title | Role::Total => LIGHT_BLUE,
            Role::Pass | Role::Passes => GREEN,
            Role::Fail | Role::Fails => RED,
            Role::Arrow | Role::Colon => BLUE,
        };
        format!("{}{}{}", code, text, RESET)
    }
}

/// Pick the colour strategy for the `colour` option.
pub fn colorizer(colour: bool) -> Box<dyn Colorizer> {
    if colour {
        Box::new(AnsiColorizer)
    } else {
        Box::new(PlainColorizer)
    }
}
