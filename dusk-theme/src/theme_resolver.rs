//! # Theme Resolution
//!
//! Pure functions from `{requested, forced, system preference, rules}` to the
//! theme that is actually projected. Resolution order:
//!
//! 1. A forced theme wins outright.
//! 2. `"system"` expands to the system preference when system handling is on.
//! 3. Anything else passes through verbatim. Names outside the catalog are
//!    not errors; the catalog only matters for clearing stale classes.
//!
//! ```rust
//! use dusk_core::platform::ColorScheme;
//! use dusk_theme::config::ThemeConfig;
//! use dusk_theme::theme_resolver::resolve;
//!
//! let config = ThemeConfig::new();
//! let state = resolve("system", None, ColorScheme::Dark, &config);
//! assert_eq!(state.resolved_theme, "dark");
//!
//! let state = resolve("system", Some("light"), ColorScheme::Dark, &config);
//! assert_eq!(state.resolved_theme, "light");
//! ```

use dusk_core::platform::ColorScheme;
use indexmap::IndexSet;
use serde::Serialize;

use crate::config::{ThemeRules, SYSTEM_THEME};

/// The outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedThemeState {
    /// The theme that was asked for. May be `"system"`.
    pub requested_theme: String,
    /// The system preference at resolution time.
    pub system_preference: ColorScheme,
    /// The theme to project.
    pub resolved_theme: String,
    /// The catalog, plus `"system"` when system handling is enabled.
    pub available_themes: IndexSet<String>,
}

/// Resolve `requested` against the rules.
pub fn resolve<R: ThemeRules + ?Sized>(
    requested: &str,
    forced: Option<&str>,
    system: ColorScheme,
    rules: &R,
) -> ResolvedThemeState {
    ResolvedThemeState {
        requested_theme: requested.to_string(),
        system_preference: system,
        resolved_theme: resolve_theme_name(requested, forced, system, rules.enable_system()),
        available_themes: available_themes(rules),
    }
}

/// The resolved theme name alone.
pub fn resolve_theme_name(
    requested: &str,
    forced: Option<&str>,
    system: ColorScheme,
    enable_system: bool,
) -> String {
    if let Some(forced) = forced {
        return forced.to_string();
    }
    if requested == SYSTEM_THEME && enable_system {
        return system.as_str().to_string();
    }
    requested.to_string()
}

/// Whether resolving `requested` reads the system preference.
pub fn needs_system_preference<R: ThemeRules + ?Sized>(requested: &str, rules: &R) -> bool {
    rules.forced_theme().is_none() && rules.enable_system() && requested == SYSTEM_THEME
}

/// The catalog, plus `"system"` when system handling is enabled.
pub fn available_themes<R: ThemeRules + ?Sized>(rules: &R) -> IndexSet<String> {
    let mut themes = rules.themes().clone();
    if rules.enable_system() {
        themes.insert(SYSTEM_THEME.to_string());
    }
    themes
}

/// `value` if it can be used as a theme name. Absent, empty and
/// whitespace-only values are unusable.
pub fn usable_theme(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// The theme to start from: the stored value if usable, else the default.
pub fn initial_theme<R: ThemeRules + ?Sized>(stored: Option<&str>, rules: &R) -> String {
    usable_theme(stored)
        .unwrap_or_else(|| rules.default_theme())
        .to_string()
}
