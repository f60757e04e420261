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

use std::fmt::Debug;
use std::time::Duration;

use anyhow::{anyhow, bail};
use cohort::prelude::*;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Everything a probe observes.
#[derive(Debug)]
pub enum ProbeEvent<T> {
    Message { msg: T, sender: Option<ActorId> },
    Terminated(ActorId),
}

/// Forwards whatever it receives to the owning [`TestProbe`].
pub struct ProbeActor<T> {
    events: mpsc::UnboundedSender<ProbeEvent<T>>,
}

#[async_trait]
impl<T: Send + Debug + 'static> Actor for ProbeActor<T> {
    type Message = T;

    async fn handle(&mut self, msg: T, ctx: &mut Context<Self>) -> anyhow::Result<()> {
        let sender = ctx.sender().cloned();
        let _ = self.events.send(ProbeEvent::Message { msg, sender });
        Ok(())
    }

    async fn on_terminated(&mut self, actor: ActorId, _ctx: &mut Context<Self>) -> anyhow::Result<()> {
        let _ = self.events.send(ProbeEvent::Terminated(actor));
        Ok(())
    }
}

/// A scripted observer: an actor that records messages, their senders and
/// termination notifications, with assertions over them.
pub struct TestProbe<T> {
    pub actor: ActorRef<T>,
    system: ActorSystem,
    events: mpsc::UnboundedReceiver<ProbeEvent<T>>,
}

impl<T: Send + Debug + 'static> TestProbe<T> {
    pub fn spawn(system: &ActorSystem, name: &str) -> anyhow::Result<Self> {
        let (tx, events) = mpsc::unbounded_channel();
        let actor = system.spawn(ActorConfig::new(name), move || ProbeActor {
            events: tx.clone(),
        })?;
        Ok(Self {
            actor,
            system: system.clone(),
            events,
        })
    }

    /// A reply address that lands in this probe.
    pub fn recipient<R: 'static>(&self) -> Recipient<R>
    where
        T: From<R>,
    {
        self.actor.recipient()
    }

    pub fn watch<M>(&self, target: &ActorRef<M>) {
        self.system.watch(&self.actor, target);
    }

    pub fn unwatch<M>(&self, target: &ActorRef<M>) {
        self.system.unwatch(&self.actor, target);
    }

    async fn next_event(&mut self, within: Duration) -> anyhow::Result<ProbeEvent<T>> {
        timeout(within, self.events.recv())
            .await
            .map_err(|_| anyhow!("no event within {within:?}"))?
            .ok_or_else(|| anyhow!("probe stopped"))
    }

    pub async fn expect_msg_with_sender(
        &mut self,
        within: Duration,
    ) -> anyhow::Result<(T, Option<ActorId>)> {
        match self.next_event(within).await? {
            ProbeEvent::Message { msg, sender } => Ok((msg, sender)),
            ProbeEvent::Terminated(actor) => bail!("expected a message, got termination of {actor}"),
        }
    }

    pub async fn expect_msg(&mut self, within: Duration) -> anyhow::Result<T> {
        Ok(self.expect_msg_with_sender(within).await?.0)
    }

    pub async fn expect_terminated(&mut self, within: Duration) -> anyhow::Result<ActorId> {
        match self.next_event(within).await? {
            ProbeEvent::Terminated(actor) => Ok(actor),
            ProbeEvent::Message { msg, .. } => bail!("expected a termination, got {msg:?}"),
        }
    }

    pub async fn expect_no_msg(&mut self, within: Duration) -> anyhow::Result<()> {
        match timeout(within, self.events.recv()).await {
            Err(_) | Ok(None) => Ok(()),
            Ok(Some(event)) => bail!("expected silence, got {event:?}"),
        }
    }
}
