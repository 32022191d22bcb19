use std::collections::BTreeMap;

use crate::error::ScenarioError;

/// Named values that scenario text can reference as `${name}`
///
/// Filled from `name=value` command-line assignments; the runner adds
/// `runIndex` for every repetition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterStore {
    values: BTreeMap<String, String>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name=value` assignments; the value may itself contain `=`.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, ScenarioError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            match assignment.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => {
                    store.set(name.trim(), value);
                }
                _ => return Err(ScenarioError::InvalidAssignment(assignment.to_string())),
            }
        }
        Ok(store)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn try_get(&self, name: &str) -> Result<&str, ScenarioError> {
        self.get(name)
            .ok_or_else(|| ScenarioError::UnknownParameter(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every `${name}` in `text`. Substituted values are not
    /// scanned again.
    pub fn process(&self, text: &str) -> Result<String, ScenarioError> {
        let mut output = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find("${") {
            output.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let close = after
                .find('}')
                .ok_or_else(|| ScenarioError::UnterminatedReference(text.to_string()))?;
            output.push_str(self.try_get(&after[..close])?);
            rest = &after[close + 1..];
        }
        output.push_str(rest);
        Ok(output)
    }
}
