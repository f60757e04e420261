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

//! Requests and replies understood by the tracking actors.
//!
//! Every request carries a typed `reply_to` address. Replies are sent with the
//! replying actor as sender.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use cohort_macro::cohort_message;

use crate::common::{ActorRef, Recipient};

/// Correlation id the aggregator puts on the reads it sends to peers.
pub const QUERY_CORRELATION_ID: u64 = 0;

/// Asks for the entity `entity_key` in group `group_key`, creating both if needed.
#[cohort_message]
pub struct TrackRequest {
    pub group_key: String,
    pub entity_key: String,
    pub reply_to: Recipient<Registered>,
}

impl TrackRequest {
    pub fn new(
        group_key: impl Into<String>,
        entity_key: impl Into<String>,
        reply_to: Recipient<Registered>,
    ) -> Self {
        Self {
            group_key: group_key.into(),
            entity_key: entity_key.into(),
            reply_to,
        }
    }
}

/// Sent by an entity in answer to a matching [`TrackRequest`].
#[cohort_message]
pub struct Registered {
    pub group_key: String,
    pub entity_key: String,
    pub entity: ActorRef<EntityMessage>,
}

/// Stores a new value in an entity.
#[cohort_message]
pub struct RecordValue {
    pub request_id: u64,
    pub value: f64,
    pub reply_to: Recipient<ValueRecorded>,
}

#[cohort_message]
pub struct ValueRecorded {
    pub request_id: u64,
}

/// Asks an entity for its latest value.
#[cohort_message]
pub struct ReadValue {
    pub request_id: u64,
    pub reply_to: Recipient<ValueReply>,
}

/// `value` is `None` until the entity has recorded something.
#[cohort_message]
pub struct ValueReply {
    pub request_id: u64,
    pub value: Option<f64>,
}

/// Asks a manager for its group keys, or a group for its entity keys.
#[cohort_message]
pub struct ListRequest {
    pub request_id: u64,
    pub reply_to: Recipient<ListReply>,
}

/// A point-in-time snapshot of the live keys.
#[cohort_message]
pub struct ListReply {
    pub request_id: u64,
    pub keys: BTreeSet<String>,
}

/// Asks a group for the current value of every entity it tracks.
#[cohort_message]
pub struct AggregateRequest {
    pub request_id: u64,
    pub reply_to: Recipient<AggregateReply>,
}

/// One outcome per entity that was tracked when the request arrived.
#[cohort_message]
pub struct AggregateReply {
    pub request_id: u64,
    pub outcomes: BTreeMap<String, Outcome>,
}

/// What became of one peer in an aggregate query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// The peer answered with a value.
    Value(f64),
    /// The peer answered but had nothing recorded.
    Unavailable,
    /// The peer terminated before answering.
    PeerGone,
    /// The peer did not answer before the deadline.
    TimedOut,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::PeerGone => write!(f, "peer gone"),
            Self::TimedOut => write!(f, "timed out"),
        }
    }
}

#[cohort_message]
pub enum EntityMessage {
    Track(TrackRequest),
    Record(RecordValue),
    Read(ReadValue),
}

#[cohort_message]
pub enum GroupMessage {
    Track(TrackRequest),
    List(ListRequest),
    Aggregate(AggregateRequest),
}

#[cohort_message]
pub enum ManagerMessage {
    Track(TrackRequest),
    List(ListRequest),
}

macro_rules! impl_from {
    ($($request:ident => $target:ident :: $variant:ident),* $(,)?) => {
        $(
            impl From<$request> for $target {
                fn from(msg: $request) -> Self {
                    Self::$variant(msg)
                }
            }
        )*
    };
}

impl_from! {
    TrackRequest => EntityMessage::Track,
    RecordValue => EntityMessage::Record,
    ReadValue => EntityMessage::Read,
    TrackRequest => GroupMessage::Track,
    ListRequest => GroupMessage::List,
    AggregateRequest => GroupMessage::Aggregate,
    TrackRequest => ManagerMessage::Track,
    ListRequest => ManagerMessage::List,
}
