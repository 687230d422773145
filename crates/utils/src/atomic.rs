// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::{Actor, AtomicResponse, WrapFuture};

/// Resolve an atomic handler immediately with the given value. Used to bail out of
/// a handler before any future has been created.
pub fn ready_atomic<A, T>(actor: &A, value: T) -> AtomicResponse<A, T>
where
    A: Actor,
    T: 'static,
{
    AtomicResponse::new(Box::pin(async move { value }.into_actor(actor)))
}
