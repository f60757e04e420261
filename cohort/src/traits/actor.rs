/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::trace;

use crate::actor::Context;
use crate::common::ActorId;

/// The behavior of an actor.
///
/// An implementor owns the actor's private state. The runtime calls the methods of
/// one actor strictly one at a time, so `&mut self` is never shared. Handlers must
/// not block; waits are expressed by scheduling a message to self with
/// [`Context::schedule_once`].
///
/// Behavior that depends on the state of the conversation is written as an enum
/// field matched inside [`handle`](Actor::handle); assigning a new variant swaps the
/// handler used for the next message.
#[async_trait]
pub trait Actor: Send + Sized + 'static {
    /// Everything this actor accepts, usually an enum with one variant per request.
    type Message: Send + Debug + 'static;

    /// Runs once before the first message is processed.
    ///
    /// Messages that arrive meanwhile are queued. An error here stops the actor.
    async fn started(&mut self, _ctx: &mut Context<Self>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Processes one message.
    ///
    /// An error or a panic is contained and handed to the actor's failure policy.
    async fn handle(&mut self, msg: Self::Message, ctx: &mut Context<Self>) -> anyhow::Result<()>;

    /// A watched actor has terminated.
    ///
    /// Delivered at most once per watch, in mailbox order with regular messages.
    async fn on_terminated(
        &mut self,
        actor: ActorId,
        _ctx: &mut Context<Self>,
    ) -> anyhow::Result<()> {
        trace!(%actor, "ignoring termination notification");
        Ok(())
    }

    /// Runs once after the actor's children have stopped and before watchers are
    /// notified.
    async fn stopped(&mut self, _ctx: &mut Context<Self>) {}
}
