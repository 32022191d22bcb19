//! Multi-agent simulation tests
//!
//! Full runs through the host: ordering, timing, subscriptions, the
//! exchange and the reference agents.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use agora_agents::{BuyingAgent, SellingAgent};
use agora_core::{MessageType, Money, ParameterMap, Payload, Side, SubscribeEventOrderTradePayload};
use agora_ports::{AgentError, DispatchError};
use agora_runner::{
    AgentStatus, HOST_NAME, Simulation, SimulationError, SimulationSettings, StopReason,
};
use common::{Scripted, generic, limit, market, of_type, trades};
use exchange_sim::ExchangeAgent;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn simulation(duration: Option<u64>) -> Simulation {
    Simulation::new(SimulationSettings {
        duration,
        ..SimulationSettings::default()
    })
}

fn add_exchange(sim: &mut Simulation, name: &str, algorithm: &str) {
    sim.register(
        Box::new(ExchangeAgent::new(name)),
        ParameterMap::new().with("algorithm", algorithm),
    )
    .unwrap();
}

fn trade_tape(name: &str, exchange: &'static str) -> (Box<dyn agora_ports::Agent>, common::Inbox) {
    Scripted::on_start(
        name,
        vec![(
            0,
            exchange,
            MessageType::subscribe(MessageType::EventTrade),
            Payload::Empty,
        )],
    )
}

// ============================================================================
// Ordering and timing
// ============================================================================

#[test]
fn test_start_reaches_agents_in_registration_order() {
    init_logger();
    let mut sim = simulation(None);
    let mut inboxes = Vec::new();
    for name in ["C", "A", "B"] {
        let (agent, inbox) = Scripted::silent(name);
        sim.register(agent, ParameterMap::new()).unwrap();
        inboxes.push(inbox);
    }

    let report = sim.run().unwrap();

    assert_eq!(report.stop_reason, StopReason::QueueExhausted);
    let targets: Vec<_> = report.trace.iter().map(|entry| entry.target.as_str()).collect();
    assert_eq!(targets, vec!["C", "A", "B"]);
    let sequences: Vec<_> = report.trace.iter().map(|entry| entry.sequence).collect();
    assert_eq!(sequences, vec![0, 1, 2]);
    for inbox in &inboxes {
        let received = inbox.borrow();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].message_type(), &MessageType::SimulationStart);
        assert_eq!(received[0].source(), HOST_NAME);
    }
}

#[test]
fn test_same_delivery_time_resolves_by_sequence() {
    init_logger();
    let mut sim = simulation(None);
    let (sender, _) = Scripted::on_start(
        "A",
        vec![
            (10, "B", MessageType::WakeUp, generic("n", "first")),
            (10, "B", MessageType::WakeUp, generic("n", "second")),
            (5, "B", MessageType::WakeUp, generic("n", "early")),
        ],
    );
    let (receiver, inbox) = Scripted::silent("B");
    sim.register(sender, ParameterMap::new()).unwrap();
    sim.register(receiver, ParameterMap::new()).unwrap();

    sim.run().unwrap();

    let order: Vec<_> = of_type(&inbox, &MessageType::WakeUp)
        .iter()
        .map(|message| match message.payload() {
            Payload::Generic(values) => (message.delivery(), values["n"].clone()),
            other => panic!("unexpected payload {other:?}"),
        })
        .collect();
    assert_eq!(
        order,
        vec![
            (5, "early".to_string()),
            (10, "first".to_string()),
            (10, "second".to_string())
        ]
    );
}

#[test]
fn test_wake_up_is_delivered_once_at_the_requested_time() {
    init_logger();
    let mut sim = Simulation::new(SimulationSettings {
        start: 1000,
        ..SimulationSettings::default()
    });
    let (agent, inbox) = Scripted::on_start("W", vec![(7, "W", MessageType::WakeUp, generic("k", "v"))]);
    sim.register(agent, ParameterMap::new()).unwrap();

    let report = sim.run().unwrap();

    let wake_ups = of_type(&inbox, &MessageType::WakeUp);
    assert_eq!(wake_ups.len(), 1);
    assert_eq!(wake_ups[0].occurrence(), 1000);
    assert_eq!(wake_ups[0].delivery(), 1007);
    assert_eq!(report.final_timestamp, 1007);
}

#[test]
fn test_run_stops_at_time_horizon() {
    init_logger();
    let mut sim = simulation(Some(20));
    let (agent, inbox) = Scripted::on_start("P", vec![(50, "P", MessageType::WakeUp, Payload::Empty)]);
    sim.register(agent, ParameterMap::new()).unwrap();

    let report = sim.run().unwrap();

    assert_eq!(report.stop_reason, StopReason::TimeHorizon);
    assert_eq!(report.final_timestamp, 19);
    assert_eq!(report.events_pending, 1);
    let types: Vec<_> = inbox
        .borrow()
        .iter()
        .map(|message| message.message_type().clone())
        .collect();
    assert_eq!(
        types,
        vec![MessageType::SimulationStart, MessageType::SimulationStop]
    );
}

#[test]
fn test_event_limit_stops_runaway_agent() {
    init_logger();
    let mut sim = Simulation::new(SimulationSettings {
        max_events: Some(5),
        ..SimulationSettings::default()
    });
    let (agent, inbox) = Scripted::scripted("LOOP", |sim, _message| {
        let now = sim.current_timestamp();
        sim.dispatch_message(now, 1, "LOOP", "LOOP", MessageType::WakeUp, Payload::Empty)?;
        Ok(())
    });
    sim.register(agent, ParameterMap::new()).unwrap();

    let report = sim.run().unwrap();

    assert_eq!(report.stop_reason, StopReason::EventLimit);
    assert_eq!(report.events_delivered, 5);
    assert_eq!(inbox.borrow().len(), 5);
    assert_eq!(report.final_timestamp, 4);
}

#[test]
fn test_step_delivers_one_window_at_a_time() {
    init_logger();
    let mut sim = simulation(None);
    let (agent, inbox) = Scripted::on_start(
        "P",
        vec![
            (5, "P", MessageType::WakeUp, Payload::Empty),
            (15, "P", MessageType::WakeUp, Payload::Empty),
        ],
    );
    sim.register(agent, ParameterMap::new()).unwrap();

    let first = sim.step(10).unwrap();
    assert_eq!(first.stop_reason, StopReason::Paused);
    assert_eq!(of_type(&inbox, &MessageType::WakeUp).len(), 1);

    let second = sim.step(10).unwrap();
    assert_eq!(second.stop_reason, StopReason::QueueExhausted);
    assert_eq!(of_type(&inbox, &MessageType::WakeUp).len(), 2);
    assert_eq!(second.final_timestamp, 15);
}

// ============================================================================
// Addressing and failures
// ============================================================================

#[test]
fn test_wildcard_and_list_targets() {
    init_logger();
    let mut sim = simulation(None);
    let (ex1, ex1_inbox) = Scripted::silent("EX1");
    let (ex2, ex2_inbox) = Scripted::silent("EX2");
    let (sender, sender_inbox) = Scripted::on_start(
        "B",
        vec![
            (1, "EX*", MessageType::WakeUp, Payload::Empty),
            (2, "B|EX2", MessageType::WakeUp, Payload::Empty),
        ],
    );
    sim.register(ex1, ParameterMap::new()).unwrap();
    sim.register(ex2, ParameterMap::new()).unwrap();
    sim.register(sender, ParameterMap::new()).unwrap();

    sim.run().unwrap();

    assert_eq!(of_type(&ex1_inbox, &MessageType::WakeUp).len(), 1);
    assert_eq!(of_type(&ex2_inbox, &MessageType::WakeUp).len(), 2);
    assert_eq!(of_type(&sender_inbox, &MessageType::WakeUp).len(), 1);
}

#[test]
fn test_unknown_recipient_is_reported_to_sender() {
    init_logger();
    let mut sim = simulation(None);
    let outcome = Rc::new(RefCell::new(None));
    let seen = Rc::clone(&outcome);
    let (agent, _) = Scripted::scripted("P", move |sim, message| {
        if message.message_type() == &MessageType::SimulationStart {
            let now = sim.current_timestamp();
            let result =
                sim.dispatch_message(now, 0, "P", "NOBODY", MessageType::WakeUp, Payload::Empty);
            *seen.borrow_mut() = Some(result);
        }
        Ok(())
    });
    sim.register(agent, ParameterMap::new()).unwrap();

    let report = sim.run().unwrap();

    assert_eq!(
        outcome.borrow().clone(),
        Some(Err(DispatchError::UnknownRecipient("NOBODY".to_string())))
    );
    assert_eq!(report.events_delivered, 1);
    assert_eq!(report.events_pending, 0);
}

#[test]
fn test_config_failure_disables_only_that_agent() {
    init_logger();
    let mut sim = simulation(Some(10));
    // No exchange, price or interval
    sim.register(
        Box::new(SellingAgent::new("BROKEN")),
        ParameterMap::new().with("quantity", 5),
    )
    .unwrap();
    let (agent, inbox) = Scripted::silent("P");
    sim.register(agent, ParameterMap::new()).unwrap();

    let report = sim.run().unwrap();

    assert_eq!(report.disabled_agents.len(), 1);
    assert_eq!(report.disabled_agents[0].0, "BROKEN");
    assert!(matches!(sim.agent_status("BROKEN"), Some(AgentStatus::Disabled(_))));
    assert_eq!(sim.agent_status("P"), Some(&AgentStatus::Active));
    // START and STOP to the disabled seller
    assert_eq!(report.events_dropped, 2);
    assert_eq!(of_type(&inbox, &MessageType::SimulationStart).len(), 1);
    assert_eq!(of_type(&inbox, &MessageType::SimulationStop).len(), 1);
}

#[test]
fn test_out_of_range_price_disables_seller_only() {
    init_logger();
    let mut sim = simulation(Some(10));
    sim.register(
        Box::new(SellingAgent::new("SELLER")),
        ParameterMap::new()
            .with("exchange", "EX1")
            .with("price", "79228162514264337593543950335")
            .with("quantity", 5)
            .with("interval", 20),
    )
    .unwrap();
    let (agent, inbox) = Scripted::silent("LATER");
    sim.register(agent, ParameterMap::new()).unwrap();

    let report = sim.run().unwrap();

    assert_eq!(report.disabled_agents.len(), 1);
    assert_eq!(report.disabled_agents[0].0, "SELLER");
    assert_eq!(sim.agent_status("LATER"), Some(&AgentStatus::Active));
    assert_eq!(of_type(&inbox, &MessageType::SimulationStart).len(), 1);
}

#[test]
fn test_agent_errors_are_collected_and_run_continues() {
    init_logger();
    let mut sim = simulation(None);
    let (agent, inbox) = Scripted::scripted("P", |sim, message| {
        if message.message_type() == &MessageType::SimulationStart {
            let now = sim.current_timestamp();
            sim.dispatch_message(now, 3, "P", "P", MessageType::WakeUp, Payload::Empty)?;
            return Err(AgentError::Exchange("boom".to_string()));
        }
        Ok(())
    });
    sim.register(agent, ParameterMap::new()).unwrap();

    let report = sim.run().unwrap();

    assert_eq!(report.agent_errors.len(), 1);
    assert_eq!(report.agent_errors[0].agent, "P");
    assert_eq!(report.agent_errors[0].message_type, MessageType::SimulationStart);
    assert_eq!(of_type(&inbox, &MessageType::WakeUp).len(), 1);
}

#[test]
fn test_registration_rules() {
    let mut sim = simulation(None);
    let (first, _) = Scripted::silent("A");
    let (second, _) = Scripted::silent("A");
    let (host, _) = Scripted::silent(HOST_NAME);
    sim.register(first, ParameterMap::new()).unwrap();

    assert_eq!(
        sim.register(second, ParameterMap::new()),
        Err(SimulationError::DuplicateAgent("A".to_string()))
    );
    assert_eq!(
        sim.register(host, ParameterMap::new()),
        Err(SimulationError::ReservedName(HOST_NAME.to_string()))
    );

    sim.run().unwrap();
    let (late, _) = Scripted::silent("LATE");
    assert_eq!(
        sim.register(late, ParameterMap::new()),
        Err(SimulationError::AlreadyStarted)
    );
}

// ============================================================================
// Exchange through the host
// ============================================================================

#[test]
fn test_duplicate_subscription_is_acknowledged_with_error() {
    init_logger();
    let mut sim = simulation(None);
    add_exchange(&mut sim, "EX1", "PriceTime");
    let subscribe = MessageType::subscribe(MessageType::EventTrade);
    let (agent, inbox) = Scripted::on_start(
        "SUB",
        vec![
            (0, "EX1", subscribe.clone(), Payload::Empty),
            (0, "EX1", subscribe.clone(), Payload::Empty),
        ],
    );
    let (ask, _) = Scripted::on_start(
        "ASK",
        vec![(1, "EX1", MessageType::PlaceOrderLimit, limit(Side::Sell, 5, 10))],
    );
    let (bid, _) = Scripted::on_start(
        "BID",
        vec![(2, "EX1", MessageType::PlaceOrderLimit, limit(Side::Buy, 5, 10))],
    );
    for agent in [agent, ask, bid] {
        sim.register(agent, ParameterMap::new()).unwrap();
    }

    sim.run().unwrap();

    // One subscription, one notification
    assert_eq!(trades(&inbox).len(), 1);
    let acks = of_type(&inbox, &subscribe.response_type());
    assert_eq!(acks.len(), 2);
    assert!(matches!(acks[0].payload(), Payload::Success(_)));
    assert_eq!(
        acks[1].payload(),
        &Payload::Error("already subscribed".to_string())
    );
    assert!(acks.iter().all(|ack| ack.source() == "EX1"));
    assert_eq!(
        sim.context()
            .registry()
            .subscribers_of("EX1", &MessageType::EventTrade),
        vec!["SUB"]
    );
}

#[test]
fn test_subscriptions_the_publisher_refuses_are_not_recorded() {
    init_logger();
    let mut sim = simulation(None);
    add_exchange(&mut sim, "EX1", "PriceTime");
    let wake_ups = MessageType::subscribe(MessageType::WakeUp);
    let (agent, inbox) = Scripted::on_start(
        "SUB",
        vec![
            (0, "EX1", wake_ups.clone(), Payload::Empty),
            (0, HOST_NAME, MessageType::subscribe(MessageType::EventTrade), Payload::Empty),
        ],
    );
    sim.register(agent, ParameterMap::new()).unwrap();

    sim.run().unwrap();

    let refused = of_type(&inbox, &wake_ups.response_type());
    assert_eq!(refused.len(), 1);
    assert_eq!(refused[0].source(), "EX1");
    assert!(refused[0].payload().is_error());
    let from_host = of_type(
        &inbox,
        &MessageType::subscribe(MessageType::EventTrade).response_type(),
    );
    assert_eq!(from_host.len(), 1);
    assert_eq!(from_host[0].source(), HOST_NAME);
    assert!(from_host[0].payload().is_error());

    let registry = sim.context().registry();
    assert!(registry.subscribers_of("EX1", &MessageType::WakeUp).is_empty());
    assert!(registry.subscribers_of(HOST_NAME, &MessageType::EventTrade).is_empty());
}

#[test]
fn test_order_trade_subscription_goes_to_the_exchange() {
    init_logger();
    let mut sim = simulation(None);
    add_exchange(&mut sim, "EX1", "PriceTime");
    let follow = MessageType::subscribe(MessageType::EventOrderTrade);
    let (ask, _) = Scripted::on_start(
        "ASK",
        vec![
            (0, "EX1", MessageType::PlaceOrderLimit, limit(Side::Sell, 5, 10)),
            (0, "EX1", MessageType::PlaceOrderLimit, limit(Side::Sell, 5, 11)),
        ],
    );
    let (watcher, watcher_inbox) = Scripted::on_start(
        "WATCH",
        vec![(
            1,
            "EX1",
            follow.clone(),
            Payload::SubscribeEventOrderTrade(SubscribeEventOrderTradePayload { id: 2 }),
        )],
    );
    let (taker, _) = Scripted::on_start(
        "TAKER",
        vec![(2, "EX1", MessageType::PlaceOrderMarket, market(Side::Buy, 7))],
    );
    for agent in [ask, watcher, taker] {
        sim.register(agent, ParameterMap::new()).unwrap();
    }

    sim.run().unwrap();

    let acks = of_type(&watcher_inbox, &follow.response_type());
    assert_eq!(acks.len(), 1);
    assert!(matches!(acks[0].payload(), Payload::Success(_)));
    let followed = trades(&watcher_inbox);
    assert_eq!(followed.len(), 1);
    assert_eq!((followed[0].resting_order_id, followed[0].volume), (2, 2));
    assert!(
        sim.context()
            .registry()
            .subscribers_of("EX1", &MessageType::EventOrderTrade)
            .is_empty()
    );
}

#[test]
fn test_limit_order_trades_at_resting_price() {
    init_logger();
    let mut sim = simulation(None);
    add_exchange(&mut sim, "EX1", "PriceTime");
    let (tape, tape_inbox) = trade_tape("TAPE", "EX1");
    let (ask, ask_inbox) = Scripted::on_start(
        "ASK",
        vec![
            (0, "EX1", MessageType::PlaceOrderLimit, limit(Side::Sell, 10, 10)),
            (2, "EX1", MessageType::RetrieveL1, Payload::Empty),
        ],
    );
    let (bid, bid_inbox) = Scripted::on_start(
        "BID",
        vec![(1, "EX1", MessageType::PlaceOrderLimit, limit(Side::Buy, 5, 12))],
    );
    for agent in [tape, ask, bid] {
        sim.register(agent, ParameterMap::new()).unwrap();
    }

    sim.run().unwrap();

    let tape = trades(&tape_inbox);
    assert_eq!(tape.len(), 1);
    assert_eq!(tape[0].price, Money::from_units(10));
    assert_eq!(tape[0].volume, 5);
    assert_eq!(tape[0].direction, Side::Buy);
    assert_eq!(tape[0].resting_owner, "ASK");
    assert_eq!(tape[0].aggressing_owner, "BID");
    assert_eq!(tape[0].timestamp, 1);

    let bid_acks = of_type(&bid_inbox, &MessageType::PlaceOrderLimit.response_type());
    assert!(matches!(bid_acks[0].payload(), Payload::PlaceOrderLimitResponse(_)));

    let l1 = of_type(&ask_inbox, &MessageType::RetrieveL1.response_type());
    let Payload::RetrieveL1Response(snapshot) = l1[0].payload() else {
        panic!("unexpected payload {:?}", l1[0].payload());
    };
    assert!(snapshot.best_bid.is_none());
    let best_ask = snapshot.best_ask.expect("ask still resting");
    assert_eq!((best_ask.price, best_ask.volume), (Money::from_units(10), 5));
}

#[test]
fn test_market_order_takes_available_volume_and_discards_rest() {
    init_logger();
    let mut sim = simulation(None);
    add_exchange(&mut sim, "EX1", "PriceTime");
    let (ask, _) = Scripted::on_start(
        "ASK",
        vec![(0, "EX1", MessageType::PlaceOrderLimit, limit(Side::Sell, 3, 10))],
    );
    let (taker, taker_inbox) = Scripted::on_start(
        "TAKER",
        vec![
            (1, "EX1", MessageType::PlaceOrderMarket, market(Side::Buy, 10)),
            (2, "EX1", MessageType::PlaceOrderMarket, market(Side::Buy, 4)),
        ],
    );
    sim.register(ask, ParameterMap::new()).unwrap();
    sim.register(taker, ParameterMap::new()).unwrap();

    sim.run().unwrap();

    let fills: Vec<_> = of_type(&taker_inbox, &MessageType::PlaceOrderMarket.response_type())
        .iter()
        .map(|message| match message.payload() {
            Payload::PlaceOrderMarketResponse(response) => (response.filled, response.discarded),
            other => panic!("unexpected payload {other:?}"),
        })
        .collect();
    assert_eq!(fills, vec![(3, 7), (0, 4)]);
}

#[test]
fn test_pro_rata_exchange_splits_level_by_size() {
    init_logger();
    let mut sim = simulation(None);
    add_exchange(&mut sim, "EX1", "ProRata");
    let (tape, tape_inbox) = trade_tape("TAPE", "EX1");
    let (small, _) = Scripted::on_start(
        "ASK1",
        vec![(0, "EX1", MessageType::PlaceOrderLimit, limit(Side::Sell, 30, 10))],
    );
    let (large, _) = Scripted::on_start(
        "ASK2",
        vec![(0, "EX1", MessageType::PlaceOrderLimit, limit(Side::Sell, 70, 10))],
    );
    let (buyer, _) = Scripted::on_start(
        "BUY",
        vec![(1, "EX1", MessageType::PlaceOrderMarket, market(Side::Buy, 10))],
    );
    for agent in [tape, small, large, buyer] {
        sim.register(agent, ParameterMap::new()).unwrap();
    }

    sim.run().unwrap();

    let mut split: Vec<_> = trades(&tape_inbox)
        .into_iter()
        .map(|trade| (trade.resting_owner, trade.volume))
        .collect();
    split.sort();
    assert_eq!(split, vec![("ASK1".to_string(), 3), ("ASK2".to_string(), 7)]);
}

// ============================================================================
// Reference agents
// ============================================================================

fn market_scenario() -> (Simulation, common::Inbox) {
    let mut sim = simulation(Some(100));
    add_exchange(&mut sim, "EX1", "PriceTime");
    sim.register(
        Box::new(BuyingAgent::new("BUYER")),
        ParameterMap::new().with("exchange", "EX1").with("quantity", 3),
    )
    .unwrap();
    sim.register(
        Box::new(SellingAgent::new("SELLER")),
        ParameterMap::new()
            .with("exchange", "EX1")
            .with("price", "10.00")
            .with("quantity", 5)
            .with("interval", 20),
    )
    .unwrap();
    let (tape, inbox) = trade_tape("TAPE", "EX1");
    sim.register(tape, ParameterMap::new()).unwrap();
    (sim, inbox)
}

#[test]
fn test_selling_and_buying_agents_trade_every_interval() {
    init_logger();
    let (mut sim, tape_inbox) = market_scenario();

    let report = sim.run().unwrap();

    assert_eq!(report.stop_reason, StopReason::TimeHorizon);
    assert_eq!(report.final_timestamp, 99);
    assert!(report.agent_errors.is_empty());
    assert!(report.disabled_agents.is_empty());

    let count = |message_type: MessageType| {
        report
            .trace
            .iter()
            .filter(|entry| entry.message_type == message_type)
            .count()
    };
    assert_eq!(count(MessageType::PlaceOrderLimit), 5);
    assert_eq!(count(MessageType::PlaceOrderMarket), 5);
    assert_eq!(count(MessageType::SimulationStop), 4);

    let tape = trades(&tape_inbox);
    assert_eq!(tape.iter().map(|trade| trade.volume).sum::<u64>(), 15);
    assert!(tape.iter().all(|trade| trade.price == Money::from_units(10)));
    assert!(tape.iter().all(|trade| trade.resting_owner == "SELLER"));
}

#[test]
fn test_identical_runs_produce_identical_traces() {
    init_logger();
    let (mut first, _) = market_scenario();
    let (mut second, _) = market_scenario();

    let first = first.run().unwrap();
    let second = second.run().unwrap();

    assert!(!first.trace.is_empty());
    assert_eq!(first, second);
}
