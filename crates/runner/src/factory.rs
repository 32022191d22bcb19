use agora_agents::{BuyingAgent, PrintingAgent, SellingAgent, TradeLogAgent};
use agora_ports::Agent;
use exchange_sim::ExchangeAgent;
use indexmap::IndexMap;

use crate::error::ScenarioError;

/// Builds an agent from its name
pub type AgentConstructor = Box<dyn Fn(&str) -> Box<dyn Agent>>;

/// Agent kind -> constructor, as referenced by scenario files
pub struct AgentFactory {
    constructors: IndexMap<String, AgentConstructor>,
}

impl AgentFactory {
    /// A factory with no kinds
    pub fn empty() -> Self {
        Self {
            constructors: IndexMap::new(),
        }
    }

    /// A factory knowing the exchange and the reference agents
    pub fn with_builtin() -> Self {
        let mut factory = Self::empty();
        factory.register_kind("ExchangeAgent", |name| Box::new(ExchangeAgent::new(name)));
        factory.register_kind("BuyingAgent", |name| Box::new(BuyingAgent::new(name)));
        factory.register_kind("SellingAgent", |name| Box::new(SellingAgent::new(name)));
        factory.register_kind("PrintingAgent", |name| Box::new(PrintingAgent::new(name)));
        factory.register_kind("TradeLogAgent", |name| Box::new(TradeLogAgent::new(name)));
        factory
    }

    /// Add or replace a kind
    pub fn register_kind<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(&str) -> Box<dyn Agent> + 'static,
    {
        self.constructors.insert(kind.into(), Box::new(constructor));
    }

    pub fn create(&self, kind: &str, name: &str) -> Result<Box<dyn Agent>, ScenarioError> {
        self.constructors
            .get(kind)
            .map(|constructor| constructor(name))
            .ok_or_else(|| ScenarioError::UnknownAgentKind(kind.to_string()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

impl Default for AgentFactory {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds() {
        let factory = AgentFactory::default();
        let kinds: Vec<_> = factory.kinds().collect();
        assert_eq!(
            kinds,
            vec!["ExchangeAgent", "BuyingAgent", "SellingAgent", "PrintingAgent", "TradeLogAgent"]
        );
        let agent = factory.create("SellingAgent", "SELLER").unwrap();
        assert_eq!(agent.name(), "SELLER");
    }

    #[test]
    fn test_unknown_kind() {
        let factory = AgentFactory::empty();
        assert!(matches!(
            factory.create("ExchangeAgent", "EX1"),
            Err(ScenarioError::UnknownAgentKind(kind)) if kind == "ExchangeAgent"
        ));
    }
}
