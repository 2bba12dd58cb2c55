//! Module: config
//! Responsibility: per-context rendering and validation settings.
//! Does not own: where configuration files live or how they are discovered.
//! Boundary: callers hand a `CriteriaConfig` to `CriteriaBuilder::config`,
//! which validates it at `build()`.

use crate::{DEFAULT_ALIAS_PREFIX, DEFAULT_PARAM_PREFIX, schema::is_sql_identifier};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field} '{value}' must be a plain identifier without dots")]
    InvalidPrefix { field: &'static str, value: String },
}

///
/// PlaceholderStyle
///
/// Parameter reference syntax expected by the execution layer.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `#{p1}`
    #[default]
    Hash,
    /// `:p1`
    Colon,
    /// `@p1`
    At,
}

impl PlaceholderStyle {
    pub fn write(self, key: &str, out: &mut String) {
        match self {
            Self::Hash => {
                out.push_str("#{");
                out.push_str(key);
                out.push('}');
            }
            Self::Colon => {
                out.push(':');
                out.push_str(key);
            }
            Self::At => {
                out.push('@');
                out.push_str(key);
            }
        }
    }

    #[must_use]
    pub fn render(self, key: &str) -> String {
        let mut out = String::with_capacity(key.len() + 3);
        self.write(key, &mut out);
        out
    }
}

///
/// NullBinding
///
/// How a null right-hand side is stored in the parameter table.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NullBinding {
    /// Bind `Value::Null`; the driver sends SQL NULL.
    #[default]
    Null,
    /// Bind the text `"null"` instead. Legacy compatibility only.
    LiteralText,
}

///
/// CriteriaConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CriteriaConfig {
    pub param_prefix: String,
    pub alias_prefix: String,
    pub alias_enabled: bool,
    pub strict: bool,
    pub placeholder: PlaceholderStyle,
    pub null_binding: NullBinding,
}

impl CriteriaConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_prefix("param_prefix", &self.param_prefix)?;
        check_prefix("alias_prefix", &self.alias_prefix)?;

        Ok(())
    }

    #[must_use]
    pub fn with_alias_enabled(mut self, enabled: bool) -> Self {
        self.alias_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub const fn with_placeholder(mut self, placeholder: PlaceholderStyle) -> Self {
        self.placeholder = placeholder;
        self
    }

    #[must_use]
    pub const fn with_null_binding(mut self, null_binding: NullBinding) -> Self {
        self.null_binding = null_binding;
        self
    }
}

impl Default for CriteriaConfig {
    fn default() -> Self {
        Self {
            param_prefix: DEFAULT_PARAM_PREFIX.to_string(),
            alias_prefix: DEFAULT_ALIAS_PREFIX.to_string(),
            alias_enabled: false,
            strict: true,
            placeholder: PlaceholderStyle::default(),
            null_binding: NullBinding::default(),
        }
    }
}

fn check_prefix(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.contains('.') || !is_sql_identifier(value) {
        return Err(ConfigError::InvalidPrefix {
            field,
            value: value.to_string(),
        });
    }

    Ok(())
}

///
/// TESTS
///
