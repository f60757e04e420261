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

use crate::common::ActorId;

/// What actually travels through a mailbox.
///
/// User messages carry the identity of the actor that sent them, when there is one;
/// messages sent from outside the actor system have no sender. Termination
/// notifications share the mailbox with user messages so that everything one
/// actor hears from another arrives in a single FIFO order.
#[derive(Debug)]
pub(crate) enum Envelope<M> {
    /// A user message of the actor's own message type.
    Message {
        payload: M,
        sender: Option<ActorId>,
    },
    /// A watched actor has terminated.
    Terminated(ActorId),
}

impl<M> Envelope<M> {
    pub(crate) const fn message(payload: M, sender: Option<ActorId>) -> Self {
        Self::Message { payload, sender }
    }
}
