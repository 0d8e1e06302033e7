//! The concrete values a resolved theme writes onto the document.

use dusk_core::platform::ColorScheme;
use indexmap::IndexSet;
use serde::Serialize;

use crate::config::ThemeRules;
use crate::theme_resolver::ResolvedThemeState;

/// What happens to the root's `color-scheme` style property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorSchemeHint {
    /// The hint is disabled; the property is not touched.
    Unmanaged,
    /// Set the property to this scheme.
    Set(ColorScheme),
    /// Clear the property.
    Clear,
}

/// The document writes for one resolved theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// The resolved theme this projection was derived from.
    pub resolved_theme: String,
    /// The value written to every target. `None` clears the targets.
    pub attribute_value: Option<String>,
    /// The `color-scheme` hint.
    pub color_scheme: ColorSchemeHint,
    /// Every value a class target may carry; all but the current one are removed.
    pub class_universe: IndexSet<String>,
}

impl Projection {
    /// Derive the projection of `state`.
    pub fn derive<R: ThemeRules + ?Sized>(state: &ResolvedThemeState, rules: &R) -> Self {
        Self::for_theme(&state.resolved_theme, rules)
    }

    /// Derive the projection of a resolved theme name.
    pub fn for_theme<R: ThemeRules + ?Sized>(resolved: &str, rules: &R) -> Self {
        Self {
            resolved_theme: resolved.to_string(),
            attribute_value: attribute_value(resolved, rules),
            color_scheme: color_scheme_hint(resolved, rules),
            class_universe: class_universe(rules),
        }
    }
}

/// The value written for `resolved`.
///
/// Without a mapping the theme name itself is written. With a mapping, a theme
/// that has no entry writes nothing and its targets are cleared.
pub fn attribute_value<R: ThemeRules + ?Sized>(resolved: &str, rules: &R) -> Option<String> {
    let value = match rules.value_map() {
        Some(map) => map.get(resolved).cloned(),
        None => Some(resolved.to_string()),
    };
    value.filter(|v| !v.is_empty())
}

/// The `color-scheme` hint for `resolved`.
///
/// A canonical resolved theme is used as is; otherwise a canonical default
/// theme; otherwise the property is cleared.
pub fn color_scheme_hint<R: ThemeRules + ?Sized>(resolved: &str, rules: &R) -> ColorSchemeHint {
    if !rules.enable_color_scheme() {
        return ColorSchemeHint::Unmanaged;
    }
    ColorScheme::parse(resolved)
        .or_else(|| ColorScheme::parse(rules.default_theme()))
        .map_or(ColorSchemeHint::Clear, ColorSchemeHint::Set)
}

/// Every value a class target may carry: each catalog theme's written value
/// (mapped, or the raw name if unmapped) and every mapping value.
pub fn class_universe<R: ThemeRules + ?Sized>(rules: &R) -> IndexSet<String> {
    let map = rules.value_map();
    let mut universe: IndexSet<String> = rules
        .themes()
        .iter()
        .map(|theme| {
            map.and_then(|m| m.get(theme))
                .cloned()
                .unwrap_or_else(|| theme.clone())
        })
        .collect();
    if let Some(map) = map {
        universe.extend(map.values().cloned());
    }
    universe.retain(|value| !value.is_empty());
    universe
}
