//! # Early Projection
//!
//! One resolve-and-apply pass that runs before the interactive application
//! attaches, so the first paint already shows the right theme.
//!
//! A [ScriptSnapshot] holds the configuration as plain data. It can be run
//! natively against any store, sensor and document ([ScriptSnapshot::run]), or
//! rendered into an inline `<script>` for server-side output
//! ([ScriptSnapshot::to_inline_script]). Both paths compute the same values
//! as the [ThemeManager](crate::manager::ThemeManager), so the manager's first
//! projection after the early pass changes nothing.
//!
//! The early pass never suppresses transitions, never sets the live-region
//! hint and never subscribes to anything.

use dusk_core::document::{escape_attribute, Document};
use dusk_core::platform::{ColorScheme, SystemPreferenceSensor};
use dusk_services::PreferenceStore;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::config::{AttributeTarget, ThemeConfig, ThemeRules};
use crate::error::{ThemeError, ThemeResult};
use crate::projection::Projection;
use crate::projector::apply_projection;
use crate::theme_resolver::{initial_theme, needs_system_preference, resolve_theme_name};

/// The routine embedded by [ScriptSnapshot::to_inline_script]. It takes the
/// JSON snapshot as its only argument.
pub const EARLY_SCRIPT_SOURCE: &str = r#"(function(c){var d=document.documentElement,s=["light","dark"],m=c.value,h=function(o,k){return !!o&&Object.prototype.hasOwnProperty.call(o,k)},t=c.forcedTheme;if(!t){try{t=localStorage.getItem(c.storageKey)}catch(e){t=null}if(!t||!t.trim())t=c.defaultTheme;if(c.enableSystem&&t==="system")t=window.matchMedia("(prefers-color-scheme: dark)").matches?"dark":"light"}var v=m?(h(m,t)?m[t]:null):t;if(!v)v=null;var u=c.themes.map(function(n){return h(m,n)?m[n]:n});if(m)for(var k in m)if(h(m,k))u.push(m[k]);u=u.filter(function(n){return n&&n!==v&&d.classList.contains(n)});c.attribute.forEach(function(a){if(a==="class"){if(u.length)d.classList.remove.apply(d.classList,u);if(v&&!d.classList.contains(v))d.classList.add(v)}else if(v){if(d.getAttribute(a)!==v)d.setAttribute(a,v)}else if(d.hasAttribute(a)){d.removeAttribute(a)}});if(c.enableColorScheme){var x=s.indexOf(t)>=0?t:(s.indexOf(c.defaultTheme)>=0?c.defaultTheme:"");d.style.colorScheme=x}})"#;

/// The configuration of the early pass, as literal data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSnapshot {
    /// Attribute targets.
    pub attribute: Vec<AttributeTarget>,
    /// Preference store key.
    pub storage_key: String,
    /// Default theme, already resolved from the system flag.
    pub default_theme: String,
    /// Forced theme.
    pub forced_theme: Option<String>,
    /// Theme catalog.
    pub themes: IndexSet<String>,
    /// Theme to value mapping.
    pub value: Option<IndexMap<String, String>>,
    /// Follow the system preference for `"system"`.
    pub enable_system: bool,
    /// Manage the `color-scheme` hint.
    pub enable_color_scheme: bool,
}

impl ScriptSnapshot {
    /// Copy the relevant parts of `config`.
    pub fn from_config(config: &ThemeConfig) -> Self {
        Self {
            attribute: config.attributes().to_vec(),
            storage_key: config.storage_key().to_string(),
            default_theme: config.default_theme().to_string(),
            forced_theme: config.forced_theme().map(str::to_string),
            themes: config.themes().clone(),
            value: config.value_map().cloned(),
            enable_system: config.enable_system(),
            enable_color_scheme: config.enable_color_scheme(),
        }
    }

    /// Run the early pass. Returns the resolved theme.
    pub fn run(
        &self,
        store: &dyn PreferenceStore,
        sensor: &dyn SystemPreferenceSensor,
        document: &dyn Document,
    ) -> String {
        let requested = match &self.forced_theme {
            Some(forced) => forced.clone(),
            None => initial_theme(store.read(&self.storage_key).as_deref(), self),
        };
        let system = if needs_system_preference(&requested, self) {
            sensor.current()
        } else {
            ColorScheme::default()
        };

        let resolved = resolve_theme_name(
            &requested,
            self.forced_theme.as_deref(),
            system,
            self.enable_system,
        );
        apply_projection(document, &Projection::for_theme(&resolved, self), &self.attribute, None);
        log::debug!("Early projection resolved '{}' to '{}'", requested, resolved);
        resolved
    }

    /// The snapshot as JSON, safe to embed in an HTML `<script>` element.
    pub fn to_json(&self) -> ThemeResult<String> {
        let json = serde_json::to_string(self).map_err(|e| ThemeError::ConfigSerialize {
            details: e.to_string(),
        })?;
        Ok(escape_script_json(&json))
    }

    /// Render the `<script>` element for server-side output.
    ///
    /// ```rust
    /// use dusk_theme::config::ThemeConfig;
    /// use dusk_theme::script::ScriptSnapshot;
    ///
    /// let snapshot = ScriptSnapshot::from_config(&ThemeConfig::new());
    /// let tag = snapshot.to_inline_script(Some("r4nd0m")).unwrap();
    /// assert!(tag.starts_with(r#"<script nonce="r4nd0m">"#));
    /// assert!(tag.ends_with("</script>"));
    /// ```
    pub fn to_inline_script(&self, nonce: Option<&str>) -> ThemeResult<String> {
        let nonce = nonce
            .filter(|n| !n.is_empty())
            .map(|n| format!(r#" nonce="{}""#, escape_attribute(n)))
            .unwrap_or_default();
        Ok(format!(
            "<script{}>{}({})</script>",
            nonce,
            EARLY_SCRIPT_SOURCE,
            self.to_json()?
        ))
    }
}

impl ThemeRules for ScriptSnapshot {
    fn themes(&self) -> &IndexSet<String> {
        &self.themes
    }

    fn default_theme(&self) -> &str {
        &self.default_theme
    }

    fn forced_theme(&self) -> Option<&str> {
        self.forced_theme.as_deref()
    }

    fn enable_system(&self) -> bool {
        self.enable_system
    }

    fn enable_color_scheme(&self) -> bool {
        self.enable_color_scheme
    }

    fn attributes(&self) -> &[AttributeTarget] {
        &self.attribute
    }

    fn value_map(&self) -> Option<&IndexMap<String, String>> {
        self.value.as_ref()
    }
}

impl From<&ThemeConfig> for ScriptSnapshot {
    fn from(config: &ThemeConfig) -> Self {
        Self::from_config(config)
    }
}

/// Escape characters that could end the `<script>` element or break older
/// JavaScript parsers. The result is still valid JSON.
fn escape_script_json(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '<' => escaped.push_str("\\u003c"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
