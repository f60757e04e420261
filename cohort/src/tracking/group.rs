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

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::actor::{ActorConfig, Context};
use crate::common::{ActorId, ActorRef};
use crate::traits::Actor;
use crate::tracking::child_name;
use crate::tracking::entity::Entity;
use crate::tracking::messages::{
    AggregateRequest, EntityMessage, GroupMessage, ListReply, ListRequest, TrackRequest,
};
use crate::tracking::query::Query;

/// Owns the entities of one group and answers questions about all of them.
///
/// Entities are created on demand, watched, and forgotten once their termination
/// notification arrives.
#[derive(Debug)]
pub struct Group {
    group_key: String,
    entities: HashMap<String, ActorRef<EntityMessage>>,
    keys_by_actor: HashMap<ActorId, String>,
    query_timeout: Option<Duration>,
    next_query: u64,
}

impl Group {
    pub fn new(group_key: impl Into<String>) -> Self {
        Self {
            group_key: group_key.into(),
            entities: HashMap::new(),
            keys_by_actor: HashMap::new(),
            query_timeout: None,
            next_query: 0,
        }
    }

    /// Overrides the aggregator deadline taken from configuration.
    #[must_use]
    pub const fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    fn track(&mut self, req: TrackRequest, ctx: &Context<Self>) {
        if req.group_key != self.group_key {
            warn!(
                "Ignoring TrackRequest for group {}; this group is {}",
                req.group_key, self.group_key
            );
            return;
        }
        let entity = if let Some(entity) = self.entities.get(&req.entity_key) {
            entity.clone()
        } else {
            let group_key = self.group_key.clone();
            let entity_key = req.entity_key.clone();
            let config = ActorConfig::new(child_name("entity", &req.entity_key));
            let spawned = ctx.spawn(config, move || {
                Entity::new(group_key.clone(), entity_key.clone())
            });
            let entity = match spawned {
                Ok(entity) => entity,
                Err(e) => {
                    warn!("Cannot create entity {}: {e}", req.entity_key);
                    return;
                }
            };
            debug!(group = %self.group_key, entity = %req.entity_key, "entity created");
            ctx.watch(&entity);
            self.keys_by_actor.insert(entity.id().clone(), req.entity_key.clone());
            self.entities.insert(req.entity_key.clone(), entity.clone());
            entity
        };
        ctx.forward(&entity, req);
    }

    fn list(&self, req: ListRequest, ctx: &Context<Self>) {
        ctx.tell(
            &req.reply_to,
            ListReply {
                request_id: req.request_id,
                keys: self.entities.keys().cloned().collect(),
            },
        );
    }

    fn aggregate(&mut self, req: AggregateRequest, ctx: &Context<Self>) {
        let timeout = self
            .query_timeout
            .unwrap_or_else(|| ctx.system().config().query_timeout());
        let peers: Vec<(String, ActorRef<EntityMessage>)> = self
            .entities
            .iter()
            .map(|(key, entity)| (key.clone(), entity.clone()))
            .collect();
        let name = format!("query-{}", self.next_query);
        self.next_query += 1;

        let AggregateRequest {
            request_id,
            reply_to,
        } = req;
        debug!(group = %self.group_key, request_id, peers = peers.len(), "starting query");
        let spawned = ctx.spawn(ActorConfig::new(name), move || {
            Query::new(request_id, reply_to.clone(), peers.clone(), timeout)
        });
        if let Err(e) = spawned {
            warn!(request_id, "Cannot start query: {e}");
        }
    }
}

#[async_trait]
impl Actor for Group {
    type Message = GroupMessage;

    async fn started(&mut self, _ctx: &mut Context<Self>) -> anyhow::Result<()> {
        info!("Group {} started", self.group_key);
        Ok(())
    }

    async fn handle(&mut self, msg: GroupMessage, ctx: &mut Context<Self>) -> anyhow::Result<()> {
        match msg {
            GroupMessage::Track(req) => self.track(req, ctx),
            GroupMessage::List(req) => self.list(req, ctx),
            GroupMessage::Aggregate(req) => self.aggregate(req, ctx),
        }
        Ok(())
    }

    async fn on_terminated(
        &mut self,
        actor: ActorId,
        _ctx: &mut Context<Self>,
    ) -> anyhow::Result<()> {
        if let Some(key) = self.keys_by_actor.remove(&actor) {
            info!("Entity {} of group {} has been terminated", key, self.group_key);
            self.entities.remove(&key);
        }
        Ok(())
    }

    async fn stopped(&mut self, _ctx: &mut Context<Self>) {
        info!("Group {} stopped", self.group_key);
    }
}
