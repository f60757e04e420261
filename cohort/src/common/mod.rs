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

//! Runtime building blocks shared across the crate.
//!
//! *   [`ActorSystem`]: owns the actor tree and the path registry.
//! *   [`ActorRef`] and [`Recipient`]: typed and type-erased send capabilities.
//! *   [`ActorPath`] and [`ActorId`]: hierarchical names and incarnation identities.
//! *   [`TimerHandle`]: a cancellable scheduled self-message.
//! *   [`CohortConfig`]: configuration loaded from XDG locations.

pub use actor_path::{ActorId, ActorPath};
pub use actor_ref::{ActorRef, Recipient};
pub use actor_system::ActorSystem;
pub use config::{CohortConfig, CONFIG};
pub use timer::TimerHandle;

mod actor_path;
mod actor_ref;
mod actor_system;
/// Defines the configuration system.
pub mod config;
mod timer;
