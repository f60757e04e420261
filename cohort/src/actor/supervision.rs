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

//! What happens to an actor whose handler fails.
//!
//! A failure is either an `Err` returned from [`Actor::handle`](crate::traits::Actor::handle)
//! or a panic inside it. The runtime catches both, logs them as
//! [`ActorError::PeerFailure`](crate::message::ActorError::PeerFailure) and then
//! consults the actor's [`FailurePolicy`].
//!
//! # Example
//!
//! ```rust,ignore
//! use cohort::prelude::*;
//!
//! let config = ActorConfig::new("worker").with_failure_policy(FailurePolicy::Restart);
//! ```

use serde::{Deserialize, Serialize};

/// The decision applied after a handler fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Terminate the actor.
    ///
    /// Children are stopped, the `stopped` hook runs and watchers receive a
    /// termination notification.
    #[default]
    Stop,

    /// Keep the actor and its state; continue with the next message.
    ///
    /// The message that caused the failure is lost.
    Resume,

    /// Replace the actor's state with a fresh one from its factory.
    ///
    /// The failed instance's `stopped` hook runs, then the new instance's
    /// `started` hook. The mailbox, identity, children and watchers are kept.
    Restart,
}

impl FailurePolicy {
    /// `true` when the actor keeps processing its mailbox after a failure.
    #[must_use]
    pub const fn survives_failure(&self) -> bool {
        matches!(self, Self::Resume | Self::Restart)
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stop => write!(f, "stop"),
            Self::Resume => write!(f, "resume"),
            Self::Restart => write!(f, "restart"),
        }
    }
}
