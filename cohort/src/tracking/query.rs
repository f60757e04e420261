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

//! Scatter/gather over a fixed set of entities.
//!
//! A [`Query`] is spawned per [`AggregateRequest`](crate::tracking::AggregateRequest).
//! It asks every peer for its value, watches each one and arms a single deadline.
//! Each peer then moves out of the pending set exactly once, through whichever of
//! these happens first:
//!
//! | event                        | outcome                              |
//! |------------------------------|--------------------------------------|
//! | reply with a value           | [`Outcome::Value`]                   |
//! | reply without a value        | [`Outcome::Unavailable`]             |
//! | termination notification     | [`Outcome::PeerGone`]                |
//! | deadline                     | [`Outcome::TimedOut`]                |
//!
//! Anything arriving for a peer that is no longer pending is ignored. When nothing
//! is pending the query replies once and stops itself.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use cohort_macro::cohort_message;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::actor::Context;
use crate::common::{ActorId, ActorRef, Recipient, TimerHandle};
use crate::traits::Actor;
use crate::tracking::messages::{
    AggregateReply, EntityMessage, Outcome, ReadValue, ValueReply, QUERY_CORRELATION_ID,
};

/// The bookkeeping of one aggregate query, independent of any actor.
///
/// Every peer is either pending or collected, never both, and never returns to
/// pending. The session does not watch its own clock: whoever drives it calls
/// [`expire`](Self::expire) once [`deadline`](Self::deadline) has passed.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    request_id: u64,
    pending: BTreeSet<String>,
    collected: BTreeMap<String, Outcome>,
    deadline: Instant,
}

impl Session {
    pub fn new(
        request_id: u64,
        peers: impl IntoIterator<Item = String>,
        deadline: Instant,
    ) -> Self {
        Self {
            request_id,
            pending: peers.into_iter().collect(),
            collected: BTreeMap::new(),
            deadline,
        }
    }

    #[must_use]
    pub const fn request_id(&self) -> u64 {
        self.request_id
    }

    /// The point after which pending peers count as timed out.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    #[must_use]
    pub const fn pending(&self) -> &BTreeSet<String> {
        &self.pending
    }

    #[must_use]
    pub const fn collected(&self) -> &BTreeMap<String, Outcome> {
        &self.collected
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Settles `peer` if it is still pending. Returns whether anything changed.
    pub fn record(&mut self, peer: &str, outcome: Outcome) -> bool {
        if !self.pending.remove(peer) {
            return false;
        }
        self.collected.insert(peer.to_string(), outcome);
        true
    }

    /// Settles every pending peer as [`Outcome::TimedOut`].
    pub fn expire(&mut self) {
        for peer in std::mem::take(&mut self.pending) {
            self.collected.insert(peer, Outcome::TimedOut);
        }
    }

    #[must_use]
    pub fn into_outcomes(self) -> BTreeMap<String, Outcome> {
        self.collected
    }
}

/// The deadline of a [`Query`].
#[cohort_message]
pub struct CollectionTimeout;

#[cohort_message]
pub enum QueryMessage {
    Reply(ValueReply),
    Timeout(CollectionTimeout),
}

impl From<ValueReply> for QueryMessage {
    fn from(reply: ValueReply) -> Self {
        Self::Reply(reply)
    }
}

impl From<CollectionTimeout> for QueryMessage {
    fn from(timeout: CollectionTimeout) -> Self {
        Self::Timeout(timeout)
    }
}

#[derive(Debug)]
enum QueryState {
    Collecting(Session),
    Done,
}

#[derive(Debug, Clone)]
struct Peer {
    key: String,
    actor: ActorRef<EntityMessage>,
}

/// A short-lived actor answering one aggregate request.
#[derive(Debug)]
pub struct Query {
    state: QueryState,
    requester: Recipient<AggregateReply>,
    peers: HashMap<ActorId, Peer>,
    timer: Option<TimerHandle>,
}

impl Query {
    /// `peers` maps each entity to the key it is reported under.
    pub fn new(
        request_id: u64,
        requester: Recipient<AggregateReply>,
        peers: impl IntoIterator<Item = (String, ActorRef<EntityMessage>)>,
        timeout: Duration,
    ) -> Self {
        let peers: HashMap<ActorId, Peer> = peers
            .into_iter()
            .map(|(key, actor)| (actor.id().clone(), Peer { key, actor }))
            .collect();
        let session = Session::new(
            request_id,
            peers.values().map(|peer| peer.key.clone()),
            Instant::now() + timeout,
        );
        Self {
            state: QueryState::Collecting(session),
            requester,
            peers,
            timer: None,
        }
    }

    fn collecting(
        session: &mut Session,
        peers: &HashMap<ActorId, Peer>,
        msg: QueryMessage,
        ctx: &Context<Self>,
    ) {
        match msg {
            QueryMessage::Reply(reply) => {
                if reply.request_id != QUERY_CORRELATION_ID {
                    warn!(
                        request_id = reply.request_id,
                        "ignoring reply with a foreign correlation id"
                    );
                    return;
                }
                let Some(peer) = ctx.sender().and_then(|sender| peers.get(sender)) else {
                    warn!(sender = ?ctx.sender(), "ignoring reply from an unknown sender");
                    return;
                };
                let outcome = reply.value.map_or(Outcome::Unavailable, Outcome::Value);
                if session.record(&peer.key, outcome) {
                    trace!(peer = %peer.key, %outcome, "peer answered");
                    ctx.unwatch(&peer.actor);
                } else {
                    trace!(peer = %peer.key, "ignoring late reply");
                }
            }
            QueryMessage::Timeout(CollectionTimeout) => {
                debug!(pending = session.pending().len(), "collection deadline reached");
                session.expire();
            }
        }
    }

    fn complete_if_done(&mut self, ctx: &Context<Self>) {
        if !matches!(&self.state, QueryState::Collecting(session) if session.is_complete()) {
            return;
        }
        let QueryState::Collecting(session) = std::mem::replace(&mut self.state, QueryState::Done)
        else {
            return;
        };
        let reply = AggregateReply {
            request_id: session.request_id(),
            outcomes: session.into_outcomes(),
        };
        debug!(
            request_id = reply.request_id,
            peers = reply.outcomes.len(),
            "query complete"
        );
        ctx.tell(&self.requester, reply);
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        ctx.stop_self();
    }
}

#[async_trait]
impl Actor for Query {
    type Message = QueryMessage;

    async fn started(&mut self, ctx: &mut Context<Self>) -> anyhow::Result<()> {
        for peer in self.peers.values() {
            ctx.watch(&peer.actor);
            ctx.tell(
                &peer.actor,
                ReadValue {
                    request_id: QUERY_CORRELATION_ID,
                    reply_to: ctx.myself().recipient(),
                },
            );
        }
        if let QueryState::Collecting(session) = &self.state {
            if !session.is_complete() {
                let delay = session.deadline().saturating_duration_since(Instant::now());
                self.timer = Some(ctx.schedule_once(delay, CollectionTimeout));
            }
        }
        self.complete_if_done(ctx);
        Ok(())
    }

    async fn handle(&mut self, msg: QueryMessage, ctx: &mut Context<Self>) -> anyhow::Result<()> {
        match &mut self.state {
            QueryState::Collecting(session) => Self::collecting(session, &self.peers, msg, ctx),
            QueryState::Done => ctx.unhandled(msg),
        }
        self.complete_if_done(ctx);
        Ok(())
    }

    async fn on_terminated(
        &mut self,
        actor: ActorId,
        ctx: &mut Context<Self>,
    ) -> anyhow::Result<()> {
        if let (QueryState::Collecting(session), Some(peer)) =
            (&mut self.state, self.peers.get(&actor))
        {
            if session.record(&peer.key, Outcome::PeerGone) {
                debug!(peer = %peer.key, "peer terminated before answering");
            }
        }
        self.complete_if_done(ctx);
        Ok(())
    }
}
