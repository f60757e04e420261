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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use cohort::prelude::*;

/// Counts how often lifecycle hooks ran, across restarts.
#[derive(Debug, Clone, Default)]
pub struct Hooks {
    started: Arc<AtomicUsize>,
    stopped: Arc<AtomicUsize>,
}

impl Hooks {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[cohort_message]
pub enum CounterMessage {
    Bump,
    Fail,
    Panic,
    Get(Recipient<u32>),
    BumpLater(Duration),
    BumpLaterCancelled(Duration),
    StopSelf,
}

/// A counter whose handlers can be told to fail.
#[derive(Debug)]
pub struct Counter {
    count: u32,
    hooks: Hooks,
}

impl Counter {
    pub fn new(hooks: Hooks) -> Self {
        Self { count: 0, hooks }
    }

    pub fn factory(hooks: &Hooks) -> impl Fn() -> Self + Send + Sync + 'static {
        let hooks = hooks.clone();
        move || Self::new(hooks.clone())
    }
}

#[async_trait]
impl Actor for Counter {
    type Message = CounterMessage;

    async fn started(&mut self, _ctx: &mut Context<Self>) -> anyhow::Result<()> {
        self.hooks.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn handle(&mut self, msg: CounterMessage, ctx: &mut Context<Self>) -> anyhow::Result<()> {
        match msg {
            CounterMessage::Bump => self.count += 1,
            CounterMessage::Fail => bail!("asked to fail at {}", self.count),
            CounterMessage::Panic => panic!("asked to panic at {}", self.count),
            CounterMessage::Get(reply_to) => ctx.tell(&reply_to, self.count),
            CounterMessage::BumpLater(delay) => {
                ctx.schedule_once(delay, CounterMessage::Bump);
            }
            CounterMessage::BumpLaterCancelled(delay) => {
                ctx.schedule_once(delay, CounterMessage::Bump).cancel();
            }
            CounterMessage::StopSelf => ctx.stop_self(),
        }
        Ok(())
    }

    async fn stopped(&mut self, _ctx: &mut Context<Self>) {
        self.hooks.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

/// Spawns one [`Counter`] child per name when it starts; answers `Get` with its
/// number of live children.
#[derive(Debug)]
pub struct Parent {
    children: Vec<String>,
    hooks: Hooks,
}

impl Parent {
    pub fn new(children: &[&str], hooks: Hooks) -> Self {
        Self {
            children: children.iter().map(ToString::to_string).collect(),
            hooks,
        }
    }
}

#[async_trait]
impl Actor for Parent {
    type Message = CounterMessage;

    async fn started(&mut self, ctx: &mut Context<Self>) -> anyhow::Result<()> {
        for name in &self.children {
            ctx.spawn(ActorConfig::new(name.as_str()), Counter::factory(&self.hooks))?;
        }
        Ok(())
    }

    async fn handle(&mut self, msg: CounterMessage, ctx: &mut Context<Self>) -> anyhow::Result<()> {
        match msg {
            CounterMessage::Get(reply_to) => {
                let children = u32::try_from(ctx.myself().child_count())?;
                ctx.tell(&reply_to, children);
            }
            other => ctx.unhandled(other),
        }
        Ok(())
    }
}
