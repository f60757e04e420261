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
use std::time::Duration;

use tracing::{trace, warn};

use crate::actor::ActorConfig;
use crate::common::{ActorId, ActorRef, ActorSystem, TimerHandle};
use crate::message::ActorError;
use crate::traits::{Actor, Addressee};

/// What an actor can see and do from inside its hooks and handlers.
pub struct Context<A: Actor> {
    myself: ActorRef<A::Message>,
    system: ActorSystem,
    sender: Option<ActorId>,
}

impl<A: Actor> Context<A> {
    pub(crate) const fn new(myself: ActorRef<A::Message>, system: ActorSystem) -> Self {
        Self {
            myself,
            system,
            sender: None,
        }
    }

    /// A reference to the running actor.
    #[inline]
    #[must_use]
    pub const fn myself(&self) -> &ActorRef<A::Message> {
        &self.myself
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &ActorId {
        self.myself.id()
    }

    /// The sender of the message being handled, if it came from an actor.
    #[inline]
    #[must_use]
    pub const fn sender(&self) -> Option<&ActorId> {
        self.sender.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn system(&self) -> &ActorSystem {
        &self.system
    }

    pub(crate) fn set_sender(&mut self, sender: Option<ActorId>) {
        self.sender = sender;
    }

    /// Creates a child actor named `config.name()` under this actor.
    ///
    /// # Errors
    ///
    /// [`ActorError::NameConflict`] if a live child already has that name,
    /// [`ActorError::InvalidName`] if the name is not a valid path segment and
    /// [`ActorError::SystemShutdown`] once the system is shutting down.
    pub fn spawn<C, F>(
        &self,
        config: ActorConfig,
        factory: F,
    ) -> Result<ActorRef<C::Message>, ActorError>
    where
        C: Actor,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.system.spawn_under(self.myself.cell(), config, factory)
    }

    /// Subscribes to `target`'s termination.
    ///
    /// [`Actor::on_terminated`] is called once with `target`'s id when it stops. If
    /// it has already stopped the notification is delivered right away.
    pub fn watch<T>(&self, target: &ActorRef<T>) {
        trace!(watcher = %self.id(), target = %target.id(), "watch");
        self.myself.watch_cell(target.cell());
    }

    /// Cancels a [`watch`](Self::watch). A notification that has not been handled yet
    /// is discarded.
    pub fn unwatch<T>(&self, target: &ActorRef<T>) {
        trace!(watcher = %self.id(), target = %target.id(), "unwatch");
        self.myself.unwatch_cell(target.cell());
    }

    /// Sends `msg` to `to` with this actor as the sender.
    pub fn tell<T>(&self, to: &impl Addressee<T>, msg: T) {
        trace!(from = %self.id(), to = %to.target(), "tell");
        to.deliver(msg, Some(self.id().clone()));
    }

    /// Sends `msg` to `to`, preserving the sender of the current message.
    pub fn forward<T>(&self, to: &impl Addressee<T>, msg: T) {
        trace!(sender = ?self.sender, to = %to.target(), "forward");
        to.deliver(msg, self.sender.clone());
    }

    /// Delivers `msg` to this actor after `delay`.
    ///
    /// The timer is cancelled automatically when the actor stops.
    pub fn schedule_once(&self, delay: Duration, msg: impl Into<A::Message>) -> TimerHandle {
        TimerHandle::schedule(
            self.myself.cell().token(),
            delay,
            self.myself.clone(),
            msg.into(),
        )
    }

    /// Stops this actor once the current handler returns.
    pub fn stop_self(&self) {
        self.myself.stop();
    }

    /// Records a message the current behavior does not accept.
    ///
    /// The message is dropped; the actor keeps running.
    pub fn unhandled<T: Debug>(&self, msg: T) {
        let error = ActorError::UnroutableMessage {
            actor: self.id().clone(),
            message: format!("{msg:?}"),
        };
        warn!("{error}");
    }
}

impl<A: Actor> Debug for Context<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("myself", &self.myself)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}
