//! Colored terminal output for CLI commands.

use console::{Style, Term};
use folio_pages::{PageRoute, RouteError};

/// Width of the path column in route listings.
const PATH_WIDTH: usize = 40;

/// Terminal output formatter writing to stderr.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan: Style::new().cyan(),
            dim: Style::new().dim(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a registered route: cyan path, dimmed route name.
    pub(crate) fn route(&self, route: &PageRoute) {
        let path = format_path(route);
        let _ = self.term.write_line(&format!(
            "{} {}",
            self.cyan.apply_to(path),
            self.dim.apply_to(&route.name)
        ));
    }

    /// Print a route that was not registered.
    pub(crate) fn rejected_route(&self, error: &RouteError) {
        self.warning(&format!("skipped: {error}"));
    }
}

/// URL path padded to the path column.
fn format_path(route: &PageRoute) -> String {
    format!("{:<PATH_WIDTH$}", format!("/{}", route.path))
}

#[cfg(test)]
mod tests {
    use folio_pages::route_name;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_format_path_pads_with_leading_slash() {
        let route = PageRoute {
            name: route_name(3),
            path: "about/team".to_owned(),
            page_id: 3,
        };

        let path = format_path(&route);

        assert_eq!(path.len(), PATH_WIDTH);
        assert_eq!(path.trim_end(), "/about/team");
    }
}
