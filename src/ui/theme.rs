use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for lending reports
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    /// Granted loans and completed returns
    pub granted: Style,
    /// Command failures
    pub failure: Style,
    /// Denials and no-op returns
    pub warn: Style,
    pub label: Style,
    pub due: Style,
    pub overdue: Style,
}

impl Theme {
    /// Colors unless the terminal or `NO_COLOR`/`CLICOLOR` say otherwise
    pub fn detect() -> Self {
        if console::colors_enabled() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            granted: Style::new().green().bold(),
            failure: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            label: Style::new().white().dimmed(),
            due: Style::new().bright_blue().bold(),
            overdue: Style::new().bright_red().bold(),
        }
    }

    pub fn plain() -> Self {
        let none = Style::new();
        Self {
            header: none.clone(),
            granted: none.clone(),
            failure: none.clone(),
            warn: none.clone(),
            label: none.clone(),
            due: none.clone(),
            overdue: none,
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_plain_theme_emits_no_escape_codes() {
        assert_eq!("overdue".style(Theme::plain().overdue).to_string(), "overdue");
        assert_ne!("overdue".style(Theme::colored().overdue).to_string(), "overdue");
    }
}
