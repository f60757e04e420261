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

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::actor::{ActorConfig, Context};
use crate::common::{ActorId, ActorRef};
use crate::traits::Actor;
use crate::tracking::child_name;
use crate::tracking::group::Group;
use crate::tracking::messages::{
    GroupMessage, ListReply, ListRequest, ManagerMessage, TrackRequest,
};

/// The entry point of the tracking tree: routes requests to groups, creating them
/// on demand.
#[derive(Debug, Default)]
pub struct Manager {
    groups: HashMap<String, ActorRef<GroupMessage>>,
    keys_by_actor: HashMap<ActorId, String>,
}

impl Manager {
    fn track(&mut self, req: TrackRequest, ctx: &Context<Self>) {
        let group = if let Some(group) = self.groups.get(&req.group_key) {
            group.clone()
        } else {
            let group_key = req.group_key.clone();
            let config = ActorConfig::new(child_name("group", &req.group_key));
            let spawned = ctx.spawn(config, move || Group::new(group_key.clone()));
            let group = match spawned {
                Ok(group) => group,
                Err(e) => {
                    warn!("Cannot create group {}: {e}", req.group_key);
                    return;
                }
            };
            debug!(group = %req.group_key, "group created");
            ctx.watch(&group);
            self.keys_by_actor.insert(group.id().clone(), req.group_key.clone());
            self.groups.insert(req.group_key.clone(), group.clone());
            group
        };
        ctx.forward(&group, req);
    }

    fn list(&self, req: ListRequest, ctx: &Context<Self>) {
        ctx.tell(
            &req.reply_to,
            ListReply {
                request_id: req.request_id,
                keys: self.groups.keys().cloned().collect(),
            },
        );
    }
}

#[async_trait]
impl Actor for Manager {
    type Message = ManagerMessage;

    async fn started(&mut self, _ctx: &mut Context<Self>) -> anyhow::Result<()> {
        info!("Manager started");
        Ok(())
    }

    async fn handle(&mut self, msg: ManagerMessage, ctx: &mut Context<Self>) -> anyhow::Result<()> {
        match msg {
            ManagerMessage::Track(req) => self.track(req, ctx),
            ManagerMessage::List(req) => self.list(req, ctx),
        }
        Ok(())
    }

    async fn on_terminated(
        &mut self,
        actor: ActorId,
        _ctx: &mut Context<Self>,
    ) -> anyhow::Result<()> {
        if let Some(key) = self.keys_by_actor.remove(&actor) {
            info!("Group {} has been terminated", key);
            self.groups.remove(&key);
        }
        Ok(())
    }

    async fn stopped(&mut self, _ctx: &mut Context<Self>) {
        info!("Manager stopped");
    }
}
