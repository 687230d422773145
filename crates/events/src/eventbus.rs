// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.


use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::marker::PhantomData;

/// Subscription key that receives every event regardless of its type.
pub const ALL_EVENTS: &str = "*";

/// A notification that can travel over an [`EventBus`].
pub trait Event: Message<Result = ()> + Clone + Display + Send + Sync + Unpin + 'static {
    type Id: Hash + Eq + Clone + Unpin;
    fn event_type(&self) -> String;
    fn event_id(&self) -> Self::Id;

    /// Whether a re-publication carrying an already seen id is dropped. Events that
    /// report occurrences rather than state changes return false.
    fn deduplicate(&self) -> bool {
        true
    }
}

/// An event family with a dedicated error variant.
pub trait ErrorEvent: Event {
    type Error: Clone;
    type ErrorType;

    fn as_error(&self) -> Option<&Self::Error>;
    fn from_error(err_type: Self::ErrorType, error: anyhow::Error) -> Self;
}

pub struct EventBusConfig {
    /// Keep every delivered event so it can be replayed with [`GetHistory`].
    pub capture_history: bool,
    /// Drop events whose id has already been delivered.
    pub deduplicate: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capture_history: true,
            deduplicate: true,
        }
    }
}

struct Listeners<E: Event>(HashMap<String, Vec<Recipient<E>>>);

impl<E: Event> Listeners<E> {
    fn add(&mut self, event_type: String, listener: Recipient<E>) {
        self.0.entry(event_type).or_default().push(listener);
    }

    fn remove(&mut self, event_type: &str, listener: &Recipient<E>) {
        if let Some(list) = self.0.get_mut(event_type) {
            list.retain(|l| l != listener);
        }
    }

    fn notify(&self, event: &E) {
        let event_type = event.event_type();
        let wildcard = self.0.get(ALL_EVENTS).into_iter().flatten();
        let typed = self.0.get(&event_type).into_iter().flatten();
        for listener in wildcard.chain(typed) {
            listener.do_send(event.clone());
        }
    }
}

/// Fan-out point for ledger notifications. The controller publishes every observable
/// state change here and observers subscribe by event type or to [`ALL_EVENTS`].
pub struct EventBus<E: Event> {
    config: EventBusConfig,
    listeners: Listeners<E>,
    seen: HashSet<E::Id>,
    history: Vec<E>,
}

impl<E: Event> EventBus<E> {
    pub fn new(config: EventBusConfig) -> Self {
        Self {
            config,
            listeners: Listeners(HashMap::new()),
            seen: HashSet::new(),
            history: Vec::new(),
        }
    }

    /// Returns false when the event was already delivered and must be dropped.
    fn admit(&mut self, event: &E) -> bool {
        !self.config.deduplicate || !event.deduplicate() || self.seen.insert(event.event_id())
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}

impl<E: Event> Actor for EventBus<E> {
    type Context = Context<Self>;
}

impl<E: Event> Handler<E> for EventBus<E> {
    type Result = ();

    fn handle(&mut self, event: E, _: &mut Self::Context) {
        if !self.admit(&event) {
            tracing::trace!("Dropping duplicate {}", event);
            return;
        }
        self.listeners.notify(&event);
        tracing::debug!(">>> {}", event);
        if self.config.capture_history {
            self.history.push(event);
        }
    }
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe<E: Event> {
    pub event_type: String,
    pub listener: Recipient<E>,
}

impl<E: Event> Subscribe<E> {
    pub fn new(event_type: impl Into<String>, listener: Recipient<E>) -> Self {
        Self {
            event_type: event_type.into(),
            listener,
        }
    }
}

impl<E: Event> Handler<Subscribe<E>> for EventBus<E> {
    type Result = ();

    fn handle(&mut self, msg: Subscribe<E>, _: &mut Self::Context) {
        self.listeners.add(msg.event_type, msg.listener);
    }
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Unsubscribe<E: Event> {
    pub event_type: String,
    pub listener: Recipient<E>,
}

impl<E: Event> Unsubscribe<E> {
    pub fn new(event_type: impl Into<String>, listener: Recipient<E>) -> Self {
        Self {
            event_type: event_type.into(),
            listener,
        }
    }
}

impl<E: Event> Handler<Unsubscribe<E>> for EventBus<E> {
    type Result = ();

    fn handle(&mut self, msg: Unsubscribe<E>, _: &mut Self::Context) {
        self.listeners.remove(&msg.event_type, &msg.listener);
    }
}

/// Snapshot of every delivered event, oldest first.
#[derive(Message)]
#[rtype(result = "Vec<E>")]
pub struct GetHistory<E: Event>(PhantomData<E>);

impl<E: Event> GetHistory<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: Event> Default for GetHistory<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> Handler<GetHistory<E>> for EventBus<E> {
    type Result = Vec<E>;

    fn handle(&mut self, _: GetHistory<E>, _: &mut Self::Context) -> Vec<E> {
        self.history.clone()
    }
}

/// Error payloads found in the history, oldest first.
#[derive(Message)]
#[rtype(result = "Vec<E::Error>")]
pub struct GetErrors<E: ErrorEvent>(PhantomData<E>);

impl<E: ErrorEvent> GetErrors<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: ErrorEvent> Default for GetErrors<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ErrorEvent> Handler<GetErrors<E>> for EventBus<E> {
    type Result = Vec<E::Error>;

    fn handle(&mut self, _: GetErrors<E>, _: &mut Self::Context) -> Vec<E::Error> {
        self.history
            .iter()
            .filter_map(E::as_error)
            .cloned()
            .collect()
    }
}

/// Report an error straight onto the bus as the family's error event.
pub trait BusError<E: ErrorEvent> {
    fn err(&self, err_type: E::ErrorType, err: anyhow::Error);
}

impl<E: ErrorEvent> BusError<E> for Addr<EventBus<E>> {
    fn err(&self, err_type: E::ErrorType, err: anyhow::Error) {
        self.do_send(E::from_error(err_type, err))
    }
}

impl<E: ErrorEvent> BusError<E> for Recipient<E> {
    fn err(&self, err_type: E::ErrorType, err: anyhow::Error) {
        self.do_send(E::from_error(err_type, err))
    }
}
