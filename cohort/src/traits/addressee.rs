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

use crate::common::{ActorId, ActorRef, Recipient};

/// Anything that can receive a `T`.
///
/// Implemented by [`ActorRef<M>`] for every `T` convertible into `M`, and by
/// [`Recipient<T>`]. Delivery never blocks and never fails; a message addressed to
/// a terminated actor is dropped.
pub trait Addressee<T>: Send + Sync {
    /// The receiving actor.
    fn target(&self) -> &ActorId;

    /// Enqueues `msg`, recording `sender` as its origin.
    fn deliver(&self, msg: T, sender: Option<ActorId>);
}

impl<M, T> Addressee<T> for ActorRef<M>
where
    M: From<T> + Send + 'static,
{
    fn target(&self) -> &ActorId {
        self.id()
    }

    fn deliver(&self, msg: T, sender: Option<ActorId>) {
        self.enqueue(M::from(msg), sender);
    }
}

impl<T: 'static> Addressee<T> for Recipient<T> {
    fn target(&self) -> &ActorId {
        self.id()
    }

    fn deliver(&self, msg: T, sender: Option<ActorId>) {
        self.send(msg, sender);
    }
}
