//! Scripted test agent shared by the runner tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use agora_core::{
    GenericPayload, Message, MessageType, ParameterMap, Payload, PlaceOrderLimitPayload,
    PlaceOrderMarketPayload, Side, Timestamp, Trade, Volume, Money,
};
use agora_ports::{Agent, AgentResult, ConfigResult, SimulationHandle};

pub type Inbox = Rc<RefCell<Vec<Message>>>;
type Script = Box<dyn FnMut(&mut dyn SimulationHandle, &Message) -> AgentResult<()>>;

/// Records every delivery, then runs its script
pub struct Scripted {
    name: String,
    inbox: Inbox,
    script: Script,
}

impl Scripted {
    pub fn silent(name: &str) -> (Box<dyn Agent>, Inbox) {
        Self::scripted(name, |_, _| Ok(()))
    }

    pub fn scripted<F>(name: &str, script: F) -> (Box<dyn Agent>, Inbox)
    where
        F: FnMut(&mut dyn SimulationHandle, &Message) -> AgentResult<()> + 'static,
    {
        let inbox = Inbox::default();
        let agent = Self {
            name: name.to_string(),
            inbox: Rc::clone(&inbox),
            script: Box::new(script),
        };
        (Box::new(agent), inbox)
    }

    /// On `START`, send each `(delay, target, type, payload)` once
    pub fn on_start(
        name: &str,
        outgoing: Vec<(Timestamp, &'static str, MessageType, Payload)>,
    ) -> (Box<dyn Agent>, Inbox) {
        let source = name.to_string();
        Self::scripted(name, move |sim, message| {
            if message.message_type() == &MessageType::SimulationStart {
                let now = sim.current_timestamp();
                for (delay, target, message_type, payload) in &outgoing {
                    sim.dispatch_message(
                        now,
                        *delay,
                        &source,
                        target,
                        message_type.clone(),
                        payload.clone(),
                    )?;
                }
            }
            Ok(())
        })
    }
}

impl Agent for Scripted {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&mut self, _params: &ParameterMap) -> ConfigResult<()> {
        Ok(())
    }

    fn receive_message(
        &mut self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()> {
        self.inbox.borrow_mut().push(message.clone());
        (self.script)(sim, message)
    }
}

pub fn of_type(inbox: &Inbox, message_type: &MessageType) -> Vec<Message> {
    inbox
        .borrow()
        .iter()
        .filter(|message| message.message_type() == message_type)
        .cloned()
        .collect()
}

pub fn trades(inbox: &Inbox) -> Vec<Trade> {
    of_type(inbox, &MessageType::EventTrade)
        .into_iter()
        .filter_map(|message| match message.payload() {
            Payload::EventTrade(trade) => Some(trade.clone()),
            _ => None,
        })
        .collect()
}

pub fn generic(key: &str, value: &str) -> Payload {
    let mut payload = GenericPayload::new();
    payload.insert(key.to_string(), value.to_string());
    Payload::Generic(payload)
}

pub fn limit(direction: Side, volume: Volume, units: i64) -> Payload {
    Payload::PlaceOrderLimit(PlaceOrderLimitPayload {
        direction,
        volume,
        price: Money::from_units(units),
    })
}

pub fn market(direction: Side, volume: Volume) -> Payload {
    Payload::PlaceOrderMarket(PlaceOrderMarketPayload { direction, volume })
}
