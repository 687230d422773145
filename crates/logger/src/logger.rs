// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::{Actor, Addr, Context, Handler};
use cg_events::{Event, EventBus, ShapeEvent, Subscribe, ALL_EVENTS};
use std::marker::PhantomData;
use tracing::{error, info};

pub trait EventLogging: Event {
    fn log(&self, logger_name: &str);
}

/// Logs everything published on the bus.
pub struct SimpleLogger<E: EventLogging> {
    name: String,
    _p: PhantomData<E>,
}

impl<E: EventLogging> SimpleLogger<E> {
    pub fn attach(name: &str, bus: Addr<EventBus<E>>) -> Addr<Self> {
        let addr = Self {
            name: name.to_owned(),
            _p: PhantomData,
        }
        .start();
        bus.do_send(Subscribe::<E>::new(ALL_EVENTS, addr.clone().recipient()));
        info!(logger=%name, "Listening for events");
        addr
    }
}

impl<E: EventLogging> Actor for SimpleLogger<E> {
    type Context = Context<Self>;
}

impl<E: EventLogging> Handler<E> for SimpleLogger<E> {
    type Result = ();

    fn handle(&mut self, msg: E, _: &mut Self::Context) -> Self::Result {
        msg.log(&self.name);
    }
}

impl EventLogging for ShapeEvent {
    fn log(&self, logger_name: &str) {
        if let ShapeEvent::ShapeError { data, .. } = self {
            error!(me = logger_name, kind = ?data.err_type, "{}", data.message);
            return;
        }
        match (self.get_record_id(), self.get_category()) {
            (Some(record_id), _) => {
                info!(me = logger_name, evt = %self, record = %record_id, "Event published")
            }
            (None, Some(category)) => {
                info!(me = logger_name, evt = %self, category = %category, "Event published")
            }
            (None, None) => info!(me = logger_name, evt = %self, "Event published"),
        }
    }
}
