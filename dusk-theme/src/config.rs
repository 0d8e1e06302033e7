//! # Theme Configuration
//!
//! [ThemeConfig] is fixed when the engine starts. It can be built three ways,
//! which can be layered:
//!
//! - **Programmatically** with [ThemeConfig::new] and the `with_*` builders.
//! - **From TOML** with [ThemeConfig::from_toml] / [ThemeConfig::from_file],
//!   or layered onto an existing configuration with [ThemeConfig::merge].
//! - **From the environment** with [ThemeConfig::from_env_or_default].
//!
//! ## Configuration File Format
//!
//! ```toml
//! [theme]
//! storage_key = "theme"
//! themes = ["light", "dark", "sepia"]
//! default = "system"
//! enable_system = true
//! enable_color_scheme = true
//! disable_transition_on_change = false
//! attribute = ["class", "data-theme"]
//! nonce = "r4nd0m"
//!
//! [theme.value]
//! dark = "theme-dark"
//! ```
//!
//! Every key is optional. `attribute` accepts a single string or an array.
//! When `default` is omitted it is `"system"` if system handling is enabled,
//! `"light"` otherwise.
//!
//! ## Environment Variables
//!
//! - `DUSK_THEME_CONFIG`: path to a TOML configuration file
//! - `DUSK_THEME_FORCED`: force a theme (empty to clear)
//! - `DUSK_THEME_DEFAULT`: the default theme
//! - `DUSK_THEME_STORAGE_KEY`: the preference store key

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{ThemeError, ThemeResult};

/// The sentinel theme that follows the system preference.
pub const SYSTEM_THEME: &str = "system";

/// The default preference store key.
pub const DEFAULT_STORAGE_KEY: &str = "theme";

/// The default attribute target.
pub const DEFAULT_ATTRIBUTE: &str = "data-theme";

/// Where the resolved theme is written on the document root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AttributeTarget {
    /// The root's class list.
    Class,
    /// A `data-*` attribute. Holds the full attribute name.
    Data(String),
}

impl AttributeTarget {
    /// Parse `"class"` or `"data-<name>"`.
    ///
    /// ```rust
    /// use dusk_theme::config::AttributeTarget;
    ///
    /// assert_eq!(AttributeTarget::parse("class").unwrap(), AttributeTarget::Class);
    /// assert_eq!(
    ///     AttributeTarget::parse("data-mode").unwrap(),
    ///     AttributeTarget::Data("data-mode".to_string())
    /// );
    /// assert!(AttributeTarget::parse("style").is_err());
    /// ```
    pub fn parse(attribute: &str) -> ThemeResult<Self> {
        if attribute == "class" {
            return Ok(Self::Class);
        }
        let target = Self::Data(attribute.to_string());
        target.validate()?;
        Ok(target)
    }

    /// A `data-<name>` target.
    pub fn data(name: &str) -> ThemeResult<Self> {
        Self::parse(&format!("data-{}", name))
    }

    /// The attribute name as written on the root element.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Class => "class",
            Self::Data(name) => name,
        }
    }

    fn validate(&self) -> ThemeResult<()> {
        let Self::Data(name) = self else {
            return Ok(());
        };
        let suffix = name.strip_prefix("data-").unwrap_or_default();
        let well_formed = !suffix.is_empty()
            && suffix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if well_formed {
            Ok(())
        } else {
            Err(ThemeError::invalid_attribute(name.as_str()))
        }
    }
}

impl TryFrom<String> for AttributeTarget {
    type Error = ThemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AttributeTarget> for String {
    fn from(target: AttributeTarget) -> Self {
        target.as_str().to_string()
    }
}

impl fmt::Display for AttributeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read access to the rules that drive resolution and projection.
///
/// Implemented by [ThemeConfig] and by the literal-data
/// [ScriptSnapshot](crate::script::ScriptSnapshot), so both run the exact same
/// resolution and projection code.
pub trait ThemeRules {
    /// The theme catalog, in order.
    fn themes(&self) -> &IndexSet<String>;
    /// The theme used when the store holds nothing usable.
    fn default_theme(&self) -> &str;
    /// The forced theme, if any.
    fn forced_theme(&self) -> Option<&str>;
    /// Whether `"system"` follows the system preference.
    fn enable_system(&self) -> bool;
    /// Whether the `color-scheme` style hint is managed.
    fn enable_color_scheme(&self) -> bool;
    /// Where the resolved theme is written.
    fn attributes(&self) -> &[AttributeTarget];
    /// Theme name to written value mapping, if configured.
    fn value_map(&self) -> Option<&IndexMap<String, String>>;
}

/// The engine configuration.
///
/// # Examples
///
/// ```rust
/// use dusk_theme::config::{AttributeTarget, ThemeConfig};
///
/// let config = ThemeConfig::new()
///     .with_themes(["light", "dark", "sepia"])
///     .with_attribute(AttributeTarget::Class)
///     .with_value("dark", "theme-dark");
///
/// assert_eq!(config.default_theme(), "system");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    storage_key: String,
    themes: IndexSet<String>,
    default_theme: Option<String>,
    forced_theme: Option<String>,
    enable_system: bool,
    enable_color_scheme: bool,
    disable_transition_on_change: bool,
    attributes: Vec<AttributeTarget>,
    value: Option<IndexMap<String, String>>,
    nonce: Option<String>,
}

impl ThemeConfig {
    /// Create a configuration with the default settings.
    pub fn new() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            themes: ["light", "dark"].into_iter().map(String::from).collect(),
            default_theme: None,
            forced_theme: None,
            enable_system: true,
            enable_color_scheme: true,
            disable_transition_on_change: false,
            attributes: vec![AttributeTarget::Data(DEFAULT_ATTRIBUTE.to_string())],
            value: None,
            nonce: None,
        }
    }

    /// Load `DUSK_THEME_CONFIG` if set, then apply the other `DUSK_THEME_*`
    /// overrides. Anything invalid is logged and skipped.
    pub fn from_env_or_default() -> Self {
        let mut config = Self::new();

        if let Ok(path) = env::var("DUSK_THEME_CONFIG") {
            match Self::from_file(&path) {
                Ok(file_config) => config = file_config,
                Err(e) => log::warn!("Ignoring DUSK_THEME_CONFIG: {}", e),
            }
        }

        let overrides = ThemeOverrides {
            forced: env::var("DUSK_THEME_FORCED").ok(),
            default: env::var("DUSK_THEME_DEFAULT").ok(),
            storage_key: env::var("DUSK_THEME_STORAGE_KEY").ok(),
            ..ThemeOverrides::default()
        };
        let mut with_env = config.clone();
        match with_env.merge(overrides) {
            Ok(()) => with_env,
            Err(e) => {
                log::warn!("Ignoring DUSK_THEME_* overrides: {}", e);
                config
            },
        }
    }

    /// Load a configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ThemeResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ThemeError::config_read(path, e))?;
        log::debug!("Loaded theme configuration from {:?}", path);
        Self::from_toml(&content)
    }

    /// Load a configuration from TOML content.
    ///
    /// ```rust
    /// use dusk_theme::config::ThemeConfig;
    ///
    /// let config = ThemeConfig::from_toml(r#"
    /// [theme]
    /// forced = "dark"
    /// attribute = "class"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.forced_theme(), Some("dark"));
    /// ```
    pub fn from_toml(content: &str) -> ThemeResult<Self> {
        let mut config = Self::new();
        config.merge(ThemeOverrides::from_toml(content)?)?;
        Ok(config)
    }

    /// Write the configuration as TOML, in the format [ThemeConfig::from_toml] reads.
    pub fn to_toml(&self) -> ThemeResult<String> {
        let file = ConfigFile {
            theme: ThemeOverrides::from(self),
        };
        toml::to_string_pretty(&file).map_err(|e| ThemeError::ConfigSerialize {
            details: e.to_string(),
        })
    }

    /// Apply the fields set in `overrides`, then validate.
    ///
    /// On error the configuration is left unchanged.
    pub fn merge(&mut self, overrides: ThemeOverrides) -> ThemeResult<()> {
        let mut merged = self.clone();

        if let Some(storage_key) = overrides.storage_key {
            merged.storage_key = storage_key;
        }
        if let Some(themes) = overrides.themes {
            merged.themes = themes.into_iter().collect();
        }
        if let Some(default) = overrides.default {
            merged.default_theme = Some(default);
        }
        if let Some(forced) = overrides.forced {
            merged.forced_theme = Some(forced).filter(|f| !f.is_empty());
        }
        if let Some(enable_system) = overrides.enable_system {
            merged.enable_system = enable_system;
        }
        if let Some(enable_color_scheme) = overrides.enable_color_scheme {
            merged.enable_color_scheme = enable_color_scheme;
        }
        if let Some(disable) = overrides.disable_transition_on_change {
            merged.disable_transition_on_change = disable;
        }
        if let Some(attribute) = overrides.attribute {
            merged.attributes = attribute
                .into_vec()
                .iter()
                .map(|a| AttributeTarget::parse(a))
                .collect::<ThemeResult<_>>()?;
        }
        if let Some(value) = overrides.value {
            merged.value = Some(value);
        }
        if let Some(nonce) = overrides.nonce {
            merged.nonce = Some(nonce).filter(|n| !n.is_empty());
        }

        merged.validate()?;
        *self = merged;
        Ok(())
    }

    /// Check the configuration invariants.
    pub fn validate(&self) -> ThemeResult<()> {
        if self.storage_key.is_empty() {
            return Err(ThemeError::EmptyStorageKey);
        }
        if self.attributes.is_empty() {
            return Err(ThemeError::NoAttributeTargets);
        }
        for attribute in &self.attributes {
            attribute.validate()?;
        }
        if self.forced_theme.as_deref() == Some(SYSTEM_THEME) {
            return Err(ThemeError::ForcedSystemTheme);
        }
        Ok(())
    }

    /// Set the preference store key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the theme catalog.
    pub fn with_themes<I, S>(mut self, themes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.themes = themes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the default theme.
    pub fn with_default_theme(mut self, theme: impl Into<String>) -> Self {
        self.default_theme = Some(theme.into());
        self
    }

    /// Force a theme, bypassing all resolution. An empty name clears it.
    pub fn with_forced_theme(mut self, theme: impl Into<String>) -> Self {
        self.forced_theme = Some(theme.into()).filter(|t| !t.is_empty());
        self
    }

    /// Clear the forced theme.
    pub fn without_forced_theme(mut self) -> Self {
        self.forced_theme = None;
        self
    }

    /// Enable or disable following the system preference for `"system"`.
    pub fn with_system(mut self, enable: bool) -> Self {
        self.enable_system = enable;
        self
    }

    /// Enable or disable the `color-scheme` style hint.
    pub fn with_color_scheme(mut self, enable: bool) -> Self {
        self.enable_color_scheme = enable;
        self
    }

    /// Suppress CSS transitions while the theme is swapped.
    pub fn with_transition_suppression(mut self, enable: bool) -> Self {
        self.disable_transition_on_change = enable;
        self
    }

    /// Write the theme to a single target.
    pub fn with_attribute(mut self, target: AttributeTarget) -> Self {
        self.attributes = vec![target];
        self
    }

    /// Write the theme to several targets.
    pub fn with_attributes(mut self, targets: impl IntoIterator<Item = AttributeTarget>) -> Self {
        self.attributes = targets.into_iter().collect();
        self
    }

    /// Map `theme` to the value written on the document.
    ///
    /// Once any mapping exists, themes without an entry clear their target.
    pub fn with_value(mut self, theme: impl Into<String>, value: impl Into<String>) -> Self {
        self.value
            .get_or_insert_with(IndexMap::new)
            .insert(theme.into(), value.into());
        self
    }

    /// Set the content-security-policy nonce for the early script.
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into()).filter(|n| !n.is_empty());
        self
    }

    /// The preference store key.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// The theme catalog.
    pub fn themes(&self) -> &IndexSet<String> {
        &self.themes
    }

    /// The default theme.
    pub fn default_theme(&self) -> &str {
        match &self.default_theme {
            Some(theme) => theme,
            None if self.enable_system => SYSTEM_THEME,
            None => "light",
        }
    }

    /// The forced theme, if any.
    pub fn forced_theme(&self) -> Option<&str> {
        self.forced_theme.as_deref()
    }

    /// Whether `"system"` follows the system preference.
    pub fn enable_system(&self) -> bool {
        self.enable_system
    }

    /// Whether the `color-scheme` style hint is managed.
    pub fn enable_color_scheme(&self) -> bool {
        self.enable_color_scheme
    }

    /// Whether transitions are suppressed during a theme swap.
    pub fn disable_transition_on_change(&self) -> bool {
        self.disable_transition_on_change
    }

    /// Where the theme is written.
    pub fn attributes(&self) -> &[AttributeTarget] {
        &self.attributes
    }

    /// The theme to value mapping, if any.
    pub fn value_map(&self) -> Option<&IndexMap<String, String>> {
        self.value.as_ref()
    }

    /// The content-security-policy nonce.
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeRules for ThemeConfig {
    fn themes(&self) -> &IndexSet<String> {
        ThemeConfig::themes(self)
    }

    fn default_theme(&self) -> &str {
        ThemeConfig::default_theme(self)
    }

    fn forced_theme(&self) -> Option<&str> {
        ThemeConfig::forced_theme(self)
    }

    fn enable_system(&self) -> bool {
        self.enable_system
    }

    fn enable_color_scheme(&self) -> bool {
        self.enable_color_scheme
    }

    fn attributes(&self) -> &[AttributeTarget] {
        &self.attributes
    }

    fn value_map(&self) -> Option<&IndexMap<String, String>> {
        self.value.as_ref()
    }
}

/// `attribute = "class"` or `attribute = ["class", "data-theme"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeSpec {
    /// A single target.
    One(String),
    /// Several targets.
    Many(Vec<String>),
}

impl AttributeSpec {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(attribute) => vec![attribute],
            Self::Many(attributes) => attributes,
        }
    }
}

/// The `[theme]` table of a configuration file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeOverrides {
    /// Preference store key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    /// Theme catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<String>>,
    /// Default theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Forced theme. An empty string clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced: Option<String>,
    /// Follow the system preference for `"system"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_system: Option<bool>,
    /// Manage the `color-scheme` style hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_color_scheme: Option<bool>,
    /// Suppress transitions during a theme swap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_transition_on_change: Option<bool>,
    /// Attribute target(s).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<AttributeSpec>,
    /// Content-security-policy nonce.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Theme to value mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<IndexMap<String, String>>,
}

impl ThemeOverrides {
    /// Parse the `[theme]` table of a TOML document.
    pub fn from_toml(content: &str) -> ThemeResult<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ThemeError::config_parse(e.to_string()))?;
        Ok(file.theme)
    }
}

impl From<&ThemeConfig> for ThemeOverrides {
    fn from(config: &ThemeConfig) -> Self {
        let mut attributes: Vec<String> =
            config.attributes.iter().map(|a| a.as_str().to_string()).collect();
        let attribute = if attributes.len() == 1 {
            AttributeSpec::One(attributes.remove(0))
        } else {
            AttributeSpec::Many(attributes)
        };

        Self {
            storage_key: Some(config.storage_key.clone()),
            themes: Some(config.themes.iter().cloned().collect()),
            default: config.default_theme.clone(),
            forced: config.forced_theme.clone(),
            enable_system: Some(config.enable_system),
            enable_color_scheme: Some(config.enable_color_scheme),
            disable_transition_on_change: Some(config.disable_transition_on_change),
            attribute: Some(attribute),
            nonce: config.nonce.clone(),
            value: config.value.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    theme: ThemeOverrides,
}
