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

#![forbid(unsafe_code)]

//! # Cohort
//!
//! A small in-process actor runtime built on Tokio, and a device-style tracking
//! service built on top of it.
//!
//! ## Key Concepts
//!
//! - **Actors ([`Actor`](crate::traits::Actor))**: private state plus a message type,
//!   driven one message at a time from an unbounded FIFO mailbox.
//! - **References ([`ActorRef`](crate::common::ActorRef))**: comparable, cloneable
//!   send capabilities; [`Recipient`](crate::common::Recipient) erases the
//!   actor type for reply addresses.
//! - **Hierarchy**: every actor has a parent and a path such as
//!   `/user/manager/group-a/entity-1`. Stopping an actor stops its children first.
//! - **Death watch**: an actor can watch any other and receives exactly one
//!   termination notification.
//! - **Failure policies**: a failing handler stops, resumes or restarts its actor.
//! - **Tracking ([`tracking`])**: a manager of groups of entities, with a scatter/gather
//!   aggregator that tolerates slow and dying peers.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cohort::prelude::*;
//! use cohort::tracking::{Manager, TrackRequest};
//!
//! let system = ActorSystem::launch("demo");
//! let manager = system.spawn(ActorConfig::new("manager"), Manager::default)?;
//! manager.tell(TrackRequest::new("group-a", "entity-1", reply_to));
//! ```

/// Shared runtime building blocks: the system, references, paths, timers and configuration.
pub mod common;

/// Actor construction, execution and supervision.
pub mod actor;

/// Mailbox envelopes and runtime errors.
pub mod message;

/// The `Actor` and `Addressee` traits.
pub mod traits;

/// Entity tracking: manager, groups, entities and the aggregating query.
pub mod tracking;

/// A prelude module for conveniently importing the most commonly used items.
///
/// ## Macros
/// *   [`cohort_macro::cohort_message`]: attribute for message types.
///
/// ## External Crates
/// *   [`async_trait::async_trait`]: required on `impl Actor` blocks.
///
/// ## Core Types
/// *   [`crate::actor::ActorConfig`], [`crate::actor::Context`],
///     [`crate::actor::FailurePolicy`], [`crate::actor::LifecycleState`]
/// *   [`crate::common::ActorSystem`], [`crate::common::ActorRef`],
///     [`crate::common::Recipient`], [`crate::common::ActorPath`],
///     [`crate::common::ActorId`], [`crate::common::TimerHandle`],
///     [`crate::common::CohortConfig`]
/// *   [`crate::message::ActorError`]
/// *   [`crate::traits::Actor`], [`crate::traits::Addressee`]
pub mod prelude {
    pub use cohort_macro::*;

    pub use async_trait::async_trait;

    pub use crate::actor::{ActorConfig, Context, FailurePolicy, LifecycleState};
    pub use crate::common::{
        ActorId, ActorPath, ActorRef, ActorSystem, CohortConfig, Recipient, TimerHandle,
    };
    pub use crate::message::ActorError;
    pub use crate::traits::{Actor, Addressee};
}
