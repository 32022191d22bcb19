use std::str::FromStr;

use agora_core::ParameterMap;
use log::warn;

use crate::error::{ConfigError, ConfigResult};

/// Value type accepted by a configuration option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    /// Non-negative whole number
    Integer,
    /// Decimal amount, rounded to cents
    Money,
    /// One of a fixed set of names (case-insensitive)
    Choice(&'static [&'static str]),
}

impl OptionKind {
    /// Description used in configuration errors
    pub fn expected(&self) -> String {
        match self {
            OptionKind::String => "string".to_string(),
            OptionKind::Integer => "non-negative integer".to_string(),
            OptionKind::Money => "decimal amount".to_string(),
            OptionKind::Choice(choices) => format!("one of {}", choices.join(", ")),
        }
    }
}

/// Entry of an agent's recognized-options table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: OptionKind,
    pub required: bool,
    pub description: &'static str,
}

impl OptionSpec {
    pub const fn required(name: &'static str, kind: OptionKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: OptionKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

/// Validated, typed access to a [`ParameterMap`] against an options table
pub struct ParameterReader<'a> {
    agent: &'a str,
    params: &'a ParameterMap,
    options: &'a [OptionSpec],
}

impl<'a> ParameterReader<'a> {
    /// Checks required options and logs keys the table does not know.
    pub fn new(
        agent: &'a str,
        params: &'a ParameterMap,
        options: &'a [OptionSpec],
    ) -> ConfigResult<Self> {
        for key in params.keys() {
            if !options.iter().any(|option| option.name == key) {
                warn!("{}: ignoring unknown parameter '{}'", agent, key);
            }
        }
        if let Some(missing) = options
            .iter()
            .find(|option| option.required && !params.contains(option.name))
        {
            return Err(ConfigError::MissingParameter(missing.name.to_string()));
        }
        Ok(Self {
            agent,
            params,
            options,
        })
    }

    pub fn agent(&self) -> &str {
        self.agent
    }

    pub fn require_str(&self, name: &str) -> ConfigResult<String> {
        self.params
            .get(name)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::MissingParameter(name.to_string()))
    }

    pub fn require<T: FromStr>(&self, name: &str) -> ConfigResult<T> {
        self.optional(name)?
            .ok_or_else(|| ConfigError::MissingParameter(name.to_string()))
    }

    pub fn optional<T: FromStr>(&self, name: &str) -> ConfigResult<Option<T>> {
        let Some(raw) = self.params.get(name) else {
            return Ok(None);
        };
        raw.trim()
            .parse()
            .map(Some)
            .map_err(|_| self.invalid(name, raw))
    }

    /// Case-insensitive match against an [`OptionKind::Choice`] table
    pub fn optional_choice(&self, name: &str) -> ConfigResult<Option<&'static str>> {
        let Some(raw) = self.params.get(name) else {
            return Ok(None);
        };
        let choices = match self.spec(name).map(|option| option.kind) {
            Some(OptionKind::Choice(choices)) => choices,
            _ => return Ok(None),
        };
        choices
            .iter()
            .find(|choice| choice.eq_ignore_ascii_case(raw.trim()))
            .copied()
            .map(Some)
            .ok_or_else(|| self.invalid(name, raw))
    }

    fn spec(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|option| option.name == name)
    }

    fn invalid(&self, name: &str, raw: &str) -> ConfigError {
        ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            expected: self
                .spec(name)
                .map(|option| option.kind.expected())
                .unwrap_or_else(|| "valid value".to_string()),
        }
    }
}
