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

//! A three-tier tracking service built on the actor runtime.
//!
//! A [`Manager`] routes [`TrackRequest`]s to [`Group`]s, creating them on demand; a
//! group does the same for its [`Entity`] actors. Each tier answers
//! [`ListRequest`] with a snapshot of its live keys and forgets a child once that
//! child's termination has been observed. A group answers [`AggregateRequest`] by
//! spawning a [`Query`] over its current entities.

pub use entity::Entity;
pub use group::Group;
pub use manager::Manager;
pub use messages::{
    AggregateReply, AggregateRequest, EntityMessage, GroupMessage, ListReply, ListRequest,
    ManagerMessage, Outcome, ReadValue, RecordValue, Registered, TrackRequest, ValueRecorded,
    ValueReply, QUERY_CORRELATION_ID,
};
pub use query::{CollectionTimeout, Query, QueryMessage, Session};

mod entity;
mod group;
mod manager;
mod messages;
mod query;

/// Actor name for the child tracking `key`, e.g. `entity-e1`.
///
/// Keys are percent-encoded, so any key maps to a distinct valid path segment.
pub(crate) fn child_name(kind: &str, key: &str) -> String {
    format!("{kind}-{}", urlencoding::encode(key))
}
