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

//! Actor construction, execution and supervision.
//!
//! *   [`ActorConfig`]: name and failure policy of an actor to be spawned.
//! *   [`Context`]: the actor's view of itself and the runtime while it runs.
//! *   [`FailurePolicy`]: the decision applied when a handler fails.
//! *   [`LifecycleState`]: `Starting -> Running -> Stopping -> Stopped`.
//!
//! The per-actor cell (identity, cancellation, children and watches) and the
//! dispatcher that drives an actor's mailbox are internal.

pub use actor_config::ActorConfig;
pub use cell::LifecycleState;
pub use context::Context;
pub use supervision::FailurePolicy;

pub(crate) use cell::{ActorCell, Notifier};
pub(crate) use dispatcher::Dispatcher;

mod actor_config;
mod cell;
mod context;
mod dispatcher;
mod supervision;
