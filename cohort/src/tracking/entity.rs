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

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::actor::Context;
use crate::traits::Actor;
use crate::tracking::messages::{
    EntityMessage, ReadValue, RecordValue, Registered, TrackRequest, ValueRecorded, ValueReply,
};

/// A single tracked thing holding its most recent value.
///
/// Created by its group on the first [`TrackRequest`] naming it.
#[derive(Debug, Clone)]
pub struct Entity {
    group_key: String,
    entity_key: String,
    last_value: Option<f64>,
}

impl Entity {
    pub fn new(group_key: impl Into<String>, entity_key: impl Into<String>) -> Self {
        Self {
            group_key: group_key.into(),
            entity_key: entity_key.into(),
            last_value: None,
        }
    }

    fn track(&self, req: TrackRequest, ctx: &Context<Self>) {
        if req.group_key != self.group_key || req.entity_key != self.entity_key {
            warn!(
                "Ignoring TrackRequest for {}/{}; this entity is {}/{}",
                req.group_key, req.entity_key, self.group_key, self.entity_key
            );
            return;
        }
        ctx.tell(
            &req.reply_to,
            Registered {
                group_key: req.group_key,
                entity_key: req.entity_key,
                entity: ctx.myself().clone(),
            },
        );
    }

    fn record(&mut self, req: RecordValue, ctx: &Context<Self>) {
        info!(
            entity = %self.entity_key,
            request_id = req.request_id,
            value = req.value,
            "value recorded"
        );
        self.last_value = Some(req.value);
        ctx.tell(
            &req.reply_to,
            ValueRecorded {
                request_id: req.request_id,
            },
        );
    }

    fn read(&self, req: ReadValue, ctx: &Context<Self>) {
        ctx.tell(
            &req.reply_to,
            ValueReply {
                request_id: req.request_id,
                value: self.last_value,
            },
        );
    }
}

#[async_trait]
impl Actor for Entity {
    type Message = EntityMessage;

    async fn started(&mut self, _ctx: &mut Context<Self>) -> anyhow::Result<()> {
        info!("Entity {}/{} started", self.group_key, self.entity_key);
        Ok(())
    }

    async fn handle(&mut self, msg: EntityMessage, ctx: &mut Context<Self>) -> anyhow::Result<()> {
        match msg {
            EntityMessage::Track(req) => self.track(req, ctx),
            EntityMessage::Record(req) => self.record(req, ctx),
            EntityMessage::Read(req) => {
                debug!(request_id = req.request_id, "read");
                self.read(req, ctx);
            }
        }
        Ok(())
    }

    async fn stopped(&mut self, _ctx: &mut Context<Self>) {
        info!("Entity {}/{} stopped", self.group_key, self.entity_key);
    }
}
