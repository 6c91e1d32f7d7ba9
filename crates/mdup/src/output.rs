//! Status lines for the terminal.
//!
//! Everything meant for a person goes to stderr. Stdout carries only the
//! `--json` block dump, so it can be piped.

use console::{Style, Term};

pub(crate) struct Output {
    status: Term,
    data: Term,
    ok: Style,
    warn: Style,
    fail: Style,
    title: Style,
    label: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
            data: Term::stdout(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red(),
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
        }
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.status.write_line(&style.apply_to(msg).to_string());
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.status.write_line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.styled(&self.ok, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.styled(&self.warn, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.styled(&self.fail, msg);
    }

    /// Section title, e.g. the dry-run banner.
    pub(crate) fn highlight(&self, msg: &str) {
        self.styled(&self.title, msg);
    }

    /// `label: value` with the label dimmed.
    pub(crate) fn field(&self, label: &str, value: &str) {
        let label = self.label.apply_to(format!("{label}:"));
        let _ = self.status.write_line(&format!("{label} {value}"));
    }

    pub(crate) fn data(&self, text: &str) {
        let _ = self.data.write_line(text);
    }
}
