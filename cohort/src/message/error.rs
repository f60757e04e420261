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

use thiserror::Error;

use crate::common::{ActorId, ActorPath};

/// Errors surfaced by the actor runtime.
///
/// Only [`ActorError::NameConflict`] and [`ActorError::InvalidName`] are returned to
/// callers synchronously. The remaining variants describe faults that the runtime
/// contains on the actor's behalf; they show up in logs and, for
/// [`ActorError::PeerFailure`], as a termination notification to watchers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActorError {
    /// An actor with the same name already exists under the requested parent.
    #[error("an actor already exists at {path}")]
    NameConflict {
        /// The path that was requested.
        path: ActorPath,
    },

    /// A path segment was empty or contained a reserved character.
    #[error("invalid actor name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The current behavior of an actor has no handler for a message.
    #[error("actor {actor} cannot handle {message} in its current state")]
    UnroutableMessage {
        /// The receiving actor.
        actor: ActorId,
        /// Debug rendering of the dropped message.
        message: String,
    },

    /// A handler returned an error or panicked.
    #[error("actor {actor} failed: {reason}")]
    PeerFailure {
        /// The faulting actor.
        actor: ActorId,
        /// The error or panic payload, rendered.
        reason: String,
    },

    /// The actor system is shutting down and no longer accepts new actors.
    #[error("the actor system is shutting down")]
    SystemShutdown,
}
