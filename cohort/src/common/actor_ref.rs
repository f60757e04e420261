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

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use crate::actor::{ActorCell, LifecycleState, Notifier};
use crate::common::{ActorId, ActorPath};
use crate::message::Envelope;

/// A capability to send `M` to one actor.
///
/// References are cheap to clone and compare by [`ActorId`], so two references
/// obtained in different ways to the same actor are equal and hash alike.
pub struct ActorRef<M> {
    cell: Arc<ActorCell>,
    mailbox: UnboundedSender<Envelope<M>>,
}

impl<M: Send + 'static> ActorRef<M> {
    pub(crate) const fn new(cell: Arc<ActorCell>, mailbox: UnboundedSender<Envelope<M>>) -> Self {
        Self { cell, mailbox }
    }

    /// Sends a message with no sender. Never blocks; dropped if the actor has stopped.
    pub fn tell(&self, msg: impl Into<M>) {
        self.enqueue(msg.into(), None);
    }

    /// Sends a message on behalf of `sender`.
    pub fn tell_from(&self, msg: impl Into<M>, sender: &ActorId) {
        self.enqueue(msg.into(), Some(sender.clone()));
    }

    /// A type-erased handle that accepts only `T`, suitable as a `reply_to` address.
    #[must_use]
    pub fn recipient<T>(&self) -> Recipient<T>
    where
        M: From<T>,
        T: 'static,
    {
        let mailbox = self.mailbox.clone();
        Recipient {
            id: self.id().clone(),
            deliver: Arc::new(move |msg: T, sender: Option<ActorId>| {
                // A closed mailbox means the actor is gone.
                let _ = mailbox.send(Envelope::message(M::from(msg), sender));
            }),
        }
    }

    /// Requests that the actor stop. Calling this more than once has no further effect.
    ///
    /// The actor finishes the message it is processing, stops its children, runs its
    /// `stopped` hook and then notifies its watchers. Use
    /// [`wait_for_stop`](Self::wait_for_stop) to await the end of that sequence.
    pub fn stop(&self) {
        if self.cell.request_stop() {
            trace!(actor = %self.id(), "stop requested");
        }
    }

    /// Resolves once the actor has fully terminated.
    pub async fn wait_for_stop(&self) {
        self.cell.wait_for_stop().await;
    }

    pub(crate) fn enqueue(&self, payload: M, sender: Option<ActorId>) {
        if self.mailbox.send(Envelope::message(payload, sender)).is_err() {
            trace!(actor = %self.id(), "dropping message for terminated actor");
        }
    }

    /// Makes this actor a watcher of `target`.
    pub(crate) fn watch_cell(&self, target: &Arc<ActorCell>) {
        if target.id() == self.id() {
            return;
        }
        let mailbox = self.mailbox.clone();
        let notifier: Notifier = Arc::new(move |terminated: ActorId| {
            let _ = mailbox.send(Envelope::Terminated(terminated));
        });
        self.cell.start_watching(target);
        if !target.add_watcher(self.id().clone(), notifier.clone()) {
            notifier(target.id().clone());
        }
    }

    pub(crate) fn unwatch_cell(&self, target: &Arc<ActorCell>) {
        self.cell.stop_watching(target.id());
        target.remove_watcher(self.id());
    }
}

impl<M> ActorRef<M> {
    /// The actor's identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ActorId {
        self.cell.id()
    }

    /// The actor's position in the hierarchy.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &ActorPath {
        self.cell.id().path()
    }

    /// The actor's current lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> LifecycleState {
        self.cell.lifecycle()
    }

    /// `true` once the actor has fully stopped.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.lifecycle() == LifecycleState::Stopped
    }

    /// Number of live children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.cell.child_count()
    }

    pub(crate) const fn cell(&self) -> &Arc<ActorCell> {
        &self.cell
    }
}

impl<M> Clone for ActorRef<M> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            mailbox: self.mailbox.clone(),
        }
    }
}

impl<M> PartialEq for ActorRef<M> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<M> Eq for ActorRef<M> {}

impl<M> Hash for ActorRef<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<M> fmt::Debug for ActorRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorRef({})", self.id())
    }
}

impl<M> fmt::Display for ActorRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.id(), f)
    }
}

/// A type-erased address that accepts `T` and nothing else.
///
/// Requests carry a `Recipient` of their reply type, which lets any actor whose
/// message type can be built from the reply ask the question.
pub struct Recipient<T> {
    id: ActorId,
    deliver: Arc<dyn Fn(T, Option<ActorId>) + Send + Sync>,
}

impl<T> Recipient<T> {
    /// The receiving actor.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> &ActorId {
        &self.id
    }

    /// Sends `msg` with no sender.
    pub fn tell(&self, msg: T) {
        (self.deliver)(msg, None);
    }

    pub(crate) fn send(&self, msg: T, sender: Option<ActorId>) {
        (self.deliver)(msg, sender);
    }
}

impl<T> Clone for Recipient<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            deliver: self.deliver.clone(),
        }
    }
}

impl<T> PartialEq for Recipient<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Recipient<T> {}

impl<T> Hash for Recipient<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Recipient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Recipient({})", self.id)
    }
}
