use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use agora_core::{ParameterMap, Timestamp};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScenarioError;
use crate::factory::AgentFactory;
use crate::parameters::ParameterStore;
use crate::simulation::{Simulation, SimulationSettings};

/// One agent entry of a scenario file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Factory kind, e.g. `ExchangeAgent`
    pub kind: String,
    pub name: String,
    /// Strings, numbers or booleans; strings may contain `${name}`
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

/// Scenario file contents
///
/// ```json
/// {
///   "start": 0,
///   "duration": 1000,
///   "agents": [
///     { "kind": "ExchangeAgent", "name": "EX1", "params": { "algorithm": "PriceTime" } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioConfig {
    #[serde(default)]
    pub start: Timestamp,
    #[serde(default)]
    pub duration: Option<Timestamp>,
    #[serde(default)]
    pub max_events: Option<u64>,
    #[serde(default)]
    pub agents: Vec<AgentSpec>,
}

impl ScenarioConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn settings(&self) -> SimulationSettings {
        SimulationSettings {
            start: self.start,
            duration: self.duration,
            max_events: self.max_events,
            ..SimulationSettings::default()
        }
    }

    /// Create and register every agent, substituting `${name}` references
    /// in names and string parameters.
    pub fn build(
        &self,
        factory: &AgentFactory,
        store: &ParameterStore,
    ) -> Result<Simulation, ScenarioError> {
        let mut simulation = Simulation::new(self.settings());
        for spec in &self.agents {
            let name = store.process(&spec.name)?;
            let params = resolve_params(&name, &spec.params, store)?;
            debug!("creating {} {} with {} parameter(s)", spec.kind, name, params.len());
            let agent = factory.create(&spec.kind, &name)?;
            simulation.register(agent, params)?;
        }
        Ok(simulation)
    }
}

fn resolve_params(
    agent: &str,
    raw: &BTreeMap<String, Value>,
    store: &ParameterStore,
) -> Result<ParameterMap, ScenarioError> {
    let mut params = ParameterMap::new();
    for (name, value) in raw {
        let text = match value {
            Value::String(text) => store.process(text)?,
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            _ => {
                return Err(ScenarioError::InvalidParameterValue {
                    agent: agent.to_string(),
                    name: name.clone(),
                });
            }
        };
        params.insert(name.clone(), text);
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScenarioConfig::from_json(r#"{ "agents": [] }"#).unwrap();
        assert_eq!(config.start, 0);
        assert_eq!(config.duration, None);
        assert_eq!(config.settings().max_events, None);
    }

    #[test]
    fn test_params_are_stringified() {
        let config = ScenarioConfig::from_json(
            r#"{
                "maxEvents": 10,
                "agents": [{
                    "kind": "SellingAgent",
                    "name": "SELLER_${runIndex}",
                    "params": { "price": "${price}", "quantity": 5, "flag": true }
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(config.max_events, Some(10));

        let mut store = ParameterStore::new();
        store.set("price", "10.25");
        let params = resolve_params("SELLER", &config.agents[0].params, &store).unwrap();
        assert_eq!(params.get("price"), Some("10.25"));
        assert_eq!(params.get("quantity"), Some("5"));
        assert_eq!(params.get("flag"), Some("true"));
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let config = ScenarioConfig::from_json(
            r#"{ "agents": [{ "kind": "PrintingAgent", "name": "P", "params": { "x": [1, 2] } }] }"#,
        )
        .unwrap();
        assert!(matches!(
            resolve_params("P", &config.agents[0].params, &ParameterStore::new()),
            Err(ScenarioError::InvalidParameterValue { name, .. }) if name == "x"
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ScenarioConfig::from_file("/nonexistent/scenario.json"),
            Err(ScenarioError::Io { .. })
        ));
    }
}
