//! Scenario runner
//!
//! Registers one printing subscriber per [`SubscriberSpec`], queues the
//! scenario's events, then advances the timeline step by step. Each step
//! prints `step N` followed by whatever the subscribers printed during that
//! advance.

use crate::scenario::{Scenario, ScenarioError, SubscriberSpec};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use timeline_core::{Event, Timeline, Token};

/// Payload carried by every demonstration event
///
/// Subscribers check `kind` before reading `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoEvent {
    pub kind: u32,
    pub text: String,
}

type Lines = Rc<RefCell<Vec<String>>>;

/// Subscriber printing the text of events matching its kind
fn printer(spec: &SubscriberSpec, lines: &Lines) -> impl Fn(&Event) + 'static {
    let name = spec.name.clone();
    let kind = spec.kind;
    let lines = Rc::clone(lines);

    move |event: &Event| match event.payload_as::<DemoEvent>() {
        Ok(demo) if demo.kind == kind => {
            lines.borrow_mut().push(format!("\t{}: {}", name, demo.text));
        }
        Ok(_) => {}
        Err(err) => log::warn!("{} skipped event at tick {}: {}", name, event.timestep(), err),
    }
}

/// Run `scenario`, writing its printout to `out`
///
/// With `reports` set, each step is followed by the JSON tick report.
pub fn run<W: Write>(scenario: &Scenario, out: &mut W, reports: bool) -> Result<(), ScenarioError> {
    scenario.validate()?;

    let timeline = Timeline::with_config(scenario.config.clone());
    let lines: Lines = Rc::default();

    let mut tokens: HashMap<&str, Token> = HashMap::new();
    for spec in &scenario.subscribers {
        let token = timeline.subscribe(printer(spec, &lines));
        log::debug!("registered {} as {}", spec.name, token.id());
        tokens.insert(spec.name.as_str(), token);
    }

    for spec in &scenario.events {
        timeline.emplace(
            spec.tick,
            DemoEvent {
                kind: spec.kind,
                text: spec.text.clone(),
            },
        );
    }
    log::info!(
        "running {} step(s) with {} subscriber(s) and {} event(s)",
        scenario.steps,
        tokens.len(),
        timeline.pending_events()
    );

    for step in 1..=scenario.steps {
        writeln!(out, "step {}", step)?;

        let now = timeline.current_tick();
        for unsubscribe in scenario.unsubscribe.iter().filter(|u| u.at_tick == now) {
            if tokens.remove(unsubscribe.subscriber.as_str()).is_some() {
                log::info!("unsubscribed {} at tick {}", unsubscribe.subscriber, now);
            }
        }

        let report = timeline.advance_with_report();
        for line in lines.borrow_mut().drain(..) {
            writeln!(out, "{}", line)?;
        }
        if reports {
            writeln!(out, "\t# {}", serde_json::to_string(&report)?)?;
        }
    }

    log::info!(
        "finished at tick {} with {} event(s) still pending",
        timeline.current_tick(),
        timeline.pending_events()
    );
    Ok(())
}
