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

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use cohort::prelude::*;
use cohort::tracking::{
    AggregateReply, AggregateRequest, Entity, EntityMessage, Group, Outcome, Query, ReadValue,
    RecordValue, Registered, TrackRequest, ValueRecorded, ValueReply, QUERY_CORRELATION_ID,
};
use cohort_test::prelude::*;

use crate::setup::initialize_tracing;
use crate::setup::probe::TestProbe;

mod setup;

const WITHIN: Duration = Duration::from_secs(5);

fn outcomes(expected: &[(&str, Outcome)]) -> BTreeMap<String, Outcome> {
    expected
        .iter()
        .map(|(key, outcome)| ((*key).to_string(), *outcome))
        .collect()
}

/// Spawns an entity and waits until it holds `value`.
async fn entity_with(
    system: &ActorSystem,
    recorded: &mut TestProbe<ValueRecorded>,
    key: &str,
    value: Option<f64>,
) -> anyhow::Result<ActorRef<EntityMessage>> {
    let entity_key = key.to_string();
    let entity = system.spawn(ActorConfig::new(format!("entity-{key}")), move || {
        Entity::new("g", entity_key.clone())
    })?;
    if let Some(value) = value {
        entity.tell(RecordValue {
            request_id: 99,
            value,
            reply_to: recorded.recipient(),
        });
        recorded.expect_msg(WITHIN).await?;
    }
    Ok(entity)
}

fn spawn_query(
    system: &ActorSystem,
    name: &str,
    requester: Recipient<AggregateReply>,
    peers: Vec<(String, ActorRef<EntityMessage>)>,
    timeout: Duration,
) -> anyhow::Result<ActorRef<cohort::tracking::QueryMessage>> {
    Ok(system.spawn(ActorConfig::new(name), move || {
        Query::new(7, requester.clone(), peers.clone(), timeout)
    })?)
}

/// A silent peer times out while the others keep their values.
#[cohort_test]
async fn test_silent_peer_times_out() -> anyhow::Result<()> {
    initialize_tracing();
    let system = ActorSystem::launch("timeout");
    let mut recorded = TestProbe::<ValueRecorded>::spawn(&system, "recorded")?;
    let mut replies = TestProbe::<AggregateReply>::spawn(&system, "replies")?;
    let mut silent = TestProbe::<EntityMessage>::spawn(&system, "silent")?;
    let p2 = entity_with(&system, &mut recorded, "p2", Some(2.0)).await?;

    let started = Instant::now();
    let query = spawn_query(
        &system,
        "query",
        replies.recipient(),
        vec![("p1".to_string(), silent.actor.clone()), ("p2".to_string(), p2)],
        Duration::from_secs(1),
    )?;
    replies.watch(&query);

    // The silent peer was asked, with the internal correlation id.
    match silent.expect_msg(WITHIN).await? {
        EntityMessage::Read(ReadValue { request_id, .. }) => {
            assert_eq!(request_id, QUERY_CORRELATION_ID);
        }
        other => anyhow::bail!("unexpected {other:?}"),
    }

    let reply = replies.expect_msg(WITHIN).await?;
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(reply.request_id, 7);
    assert_eq!(
        reply.outcomes,
        outcomes(&[("p1", Outcome::TimedOut), ("p2", Outcome::Value(2.0))])
    );

    // Exactly one reply, then the query is gone.
    assert_eq!(&replies.expect_terminated(WITHIN).await?, query.id());
    replies.expect_no_msg(Duration::from_millis(200)).await?;

    system.shutdown().await?;
    Ok(())
}

/// A peer that stops before answering is reported gone without waiting for the deadline.
#[cohort_test]
async fn test_dead_peer_is_reported_promptly() -> anyhow::Result<()> {
    initialize_tracing();
    let system = ActorSystem::launch("dead-peer");
    let mut recorded = TestProbe::<ValueRecorded>::spawn(&system, "recorded")?;
    let mut replies = TestProbe::<AggregateReply>::spawn(&system, "replies")?;
    let mut doomed = TestProbe::<EntityMessage>::spawn(&system, "doomed")?;
    let p1 = entity_with(&system, &mut recorded, "p1", Some(1.0)).await?;

    let started = Instant::now();
    spawn_query(
        &system,
        "query",
        replies.recipient(),
        vec![("p1".to_string(), p1), ("p2".to_string(), doomed.actor.clone())],
        Duration::from_secs(30),
    )?;

    doomed.expect_msg(WITHIN).await?;
    doomed.actor.stop();

    let reply = replies.expect_msg(WITHIN).await?;
    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(
        reply.outcomes,
        outcomes(&[("p1", Outcome::Value(1.0)), ("p2", Outcome::PeerGone)])
    );

    system.shutdown().await?;
    Ok(())
}

/// A peer that answers and then stops keeps its answer.
#[cohort_test]
async fn test_late_termination_keeps_reply() -> anyhow::Result<()> {
    initialize_tracing();
    let system = ActorSystem::launch("late-termination");
    let mut replies = TestProbe::<AggregateReply>::spawn(&system, "replies")?;
    let mut answering = TestProbe::<EntityMessage>::spawn(&system, "answering")?;
    let silent = TestProbe::<EntityMessage>::spawn(&system, "silent")?;

    spawn_query(
        &system,
        "query",
        replies.recipient(),
        vec![
            ("p1".to_string(), answering.actor.clone()),
            ("p2".to_string(), silent.actor.clone()),
        ],
        Duration::from_millis(500),
    )?;

    let EntityMessage::Read(read) = answering.expect_msg(WITHIN).await? else {
        anyhow::bail!("expected a read");
    };
    read.reply_to.deliver(
        ValueReply {
            request_id: read.request_id,
            value: Some(1.0),
        },
        Some(answering.actor.id().clone()),
    );
    answering.actor.stop();

    let reply = replies.expect_msg(WITHIN).await?;
    assert_eq!(
        reply.outcomes,
        outcomes(&[("p1", Outcome::Value(1.0)), ("p2", Outcome::TimedOut)])
    );

    system.shutdown().await?;
    Ok(())
}

/// Replies from strangers or with a foreign correlation id are not attributed.
#[cohort_test]
async fn test_unattributable_replies_are_ignored() -> anyhow::Result<()> {
    initialize_tracing();
    let system = ActorSystem::launch("strangers");
    let mut replies = TestProbe::<AggregateReply>::spawn(&system, "replies")?;
    let mut peer = TestProbe::<EntityMessage>::spawn(&system, "peer")?;

    spawn_query(
        &system,
        "query",
        replies.recipient(),
        vec![("p1".to_string(), peer.actor.clone())],
        Duration::from_millis(500),
    )?;

    let EntityMessage::Read(read) = peer.expect_msg(WITHIN).await? else {
        anyhow::bail!("expected a read");
    };
    let answer = |request_id| ValueReply {
        request_id,
        value: Some(3.0),
    };
    read.reply_to.tell(answer(read.request_id));
    read.reply_to
        .deliver(answer(read.request_id + 1), Some(peer.actor.id().clone()));

    let reply = replies.expect_msg(WITHIN).await?;
    assert_eq!(reply.outcomes, outcomes(&[("p1", Outcome::TimedOut)]));

    system.shutdown().await?;
    Ok(())
}

/// Every peer gets exactly one outcome whatever mix of events settles it.
#[cohort_test]
async fn test_mixed_outcomes_are_total() -> anyhow::Result<()> {
    initialize_tracing();
    let system = ActorSystem::launch("mixed");
    let mut recorded = TestProbe::<ValueRecorded>::spawn(&system, "recorded")?;
    let mut replies = TestProbe::<AggregateReply>::spawn(&system, "replies")?;
    let mut doomed = TestProbe::<EntityMessage>::spawn(&system, "doomed")?;
    let silent = TestProbe::<EntityMessage>::spawn(&system, "silent")?;
    let valued = entity_with(&system, &mut recorded, "valued", Some(4.5)).await?;
    let empty = entity_with(&system, &mut recorded, "empty", None).await?;

    spawn_query(
        &system,
        "query",
        replies.recipient(),
        vec![
            ("valued".to_string(), valued),
            ("empty".to_string(), empty),
            ("doomed".to_string(), doomed.actor.clone()),
            ("silent".to_string(), silent.actor.clone()),
        ],
        Duration::from_millis(500),
    )?;
    doomed.expect_msg(WITHIN).await?;
    doomed.actor.stop();

    let reply = replies.expect_msg(WITHIN).await?;
    assert_eq!(
        reply.outcomes,
        outcomes(&[
            ("doomed", Outcome::PeerGone),
            ("empty", Outcome::Unavailable),
            ("silent", Outcome::TimedOut),
            ("valued", Outcome::Value(4.5)),
        ])
    );
    replies.expect_no_msg(Duration::from_millis(200)).await?;

    system.shutdown().await?;
    Ok(())
}

#[cohort_test]
async fn test_no_peers_replies_immediately() -> anyhow::Result<()> {
    initialize_tracing();
    let system = ActorSystem::launch("no-peers");
    let mut replies = TestProbe::<AggregateReply>::spawn(&system, "replies")?;

    let query = spawn_query(&system, "query", replies.recipient(), Vec::new(), Duration::from_secs(30))?;
    replies.watch(&query);

    let reply = replies.expect_msg(Duration::from_secs(1)).await?;
    assert!(reply.outcomes.is_empty());
    assert_eq!(&replies.expect_terminated(WITHIN).await?, query.id());

    system.shutdown().await?;
    Ok(())
}

/// A group answers an aggregate request over the entities it currently tracks.
#[cohort_test]
async fn test_group_aggregates_its_entities() -> anyhow::Result<()> {
    initialize_tracing();
    let system = ActorSystem::launch("group-aggregate");
    let mut registered = TestProbe::<Registered>::spawn(&system, "registered")?;
    let mut recorded = TestProbe::<ValueRecorded>::spawn(&system, "recorded")?;
    let mut replies = TestProbe::<AggregateReply>::spawn(&system, "replies")?;
    let group = system.spawn(ActorConfig::new("group-a"), || {
        Group::new("a").with_query_timeout(Duration::from_secs(1))
    })?;

    let mut entities = Vec::new();
    for key in ["e1", "e2", "e3"] {
        group.tell(TrackRequest::new("a", key, registered.recipient()));
        entities.push(registered.expect_msg(WITHIN).await?.entity);
    }
    entities[0].tell(RecordValue {
        request_id: 1,
        value: 1.0,
        reply_to: recorded.recipient(),
    });
    recorded.expect_msg(WITHIN).await?;
    entities[2].tell(RecordValue {
        request_id: 2,
        value: 3.0,
        reply_to: recorded.recipient(),
    });
    recorded.expect_msg(WITHIN).await?;

    group.tell(AggregateRequest {
        request_id: 42,
        reply_to: replies.recipient(),
    });
    let reply = replies.expect_msg(WITHIN).await?;
    assert_eq!(reply.request_id, 42);
    assert_eq!(
        reply.outcomes,
        outcomes(&[
            ("e1", Outcome::Value(1.0)),
            ("e2", Outcome::Unavailable),
            ("e3", Outcome::Value(3.0)),
        ])
    );

    // A second request gets its own query.
    group.tell(AggregateRequest {
        request_id: 43,
        reply_to: replies.recipient(),
    });
    assert_eq!(replies.expect_msg(WITHIN).await?.request_id, 43);

    system.shutdown().await?;
    Ok(())
}
