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

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, instrument, trace};

use crate::actor::{Context, FailurePolicy};
use crate::message::{ActorError, Envelope};
use crate::traits::Actor;

type Factory<A> = Box<dyn Fn() -> A + Send + Sync>;
type PanicPayload = Box<dyn Any + Send>;

/// Owns a running actor: its state, its mailbox and its context.
///
/// One dispatcher runs as one task, so an actor never processes two messages at once
/// while different actors proceed in parallel.
pub(crate) struct Dispatcher<A: Actor> {
    actor: A,
    factory: Factory<A>,
    policy: FailurePolicy,
    inbox: UnboundedReceiver<Envelope<A::Message>>,
    ctx: Context<A>,
}

impl<A: Actor> Dispatcher<A> {
    pub(crate) fn new<F>(
        factory: F,
        policy: FailurePolicy,
        inbox: UnboundedReceiver<Envelope<A::Message>>,
        ctx: Context<A>,
    ) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        Self {
            actor: factory(),
            factory: Box::new(factory),
            policy,
            inbox,
            ctx,
        }
    }

    #[instrument(skip(self), fields(actor = %self.ctx.id(), policy = %self.policy))]
    pub(crate) async fn run(mut self) {
        let cell = self.ctx.myself().cell().clone();
        if self.start().await && cell.mark_running() {
            info!("actor started");
            loop {
                tokio::select! {
                    biased;
                    () = cell.token().cancelled() => {
                        trace!("cancellation observed, leaving message loop");
                        break;
                    }
                    incoming = self.inbox.recv() => {
                        let Some(envelope) = incoming else { break };
                        if !self.dispatch(envelope).await {
                            break;
                        }
                    }
                }
            }
        }
        self.finish().await;
    }

    async fn start(&mut self) -> bool {
        match AssertUnwindSafe(self.actor.started(&mut self.ctx))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                self.report(format!("{e:#}"), "start");
                false
            }
            Err(panic) => {
                self.report(panic_reason(&panic), "start");
                false
            }
        }
    }

    /// Handles one envelope. Returns `false` when the actor must stop.
    async fn dispatch(&mut self, envelope: Envelope<A::Message>) -> bool {
        let result = match envelope {
            Envelope::Message { payload, sender } => {
                trace!(?payload, sender = ?sender, "handling message");
                self.ctx.set_sender(sender);
                let result = AssertUnwindSafe(self.actor.handle(payload, &mut self.ctx))
                    .catch_unwind()
                    .await;
                self.ctx.set_sender(None);
                result
            }
            Envelope::Terminated(actor) => {
                if !self.ctx.myself().cell().stop_watching(&actor) {
                    trace!(%actor, "discarding notification for an unwatched actor");
                    return true;
                }
                trace!(%actor, "watched actor terminated");
                AssertUnwindSafe(self.actor.on_terminated(actor, &mut self.ctx))
                    .catch_unwind()
                    .await
            }
        };
        self.settle(result).await
    }

    async fn settle(&mut self, result: Result<anyhow::Result<()>, PanicPayload>) -> bool {
        let reason = match result {
            Ok(Ok(())) => return true,
            Ok(Err(e)) => format!("{e:#}"),
            Err(panic) => panic_reason(&panic),
        };
        self.report(reason, "handle");
        match self.policy {
            FailurePolicy::Restart => self.restart().await,
            policy => policy.survives_failure(),
        }
    }

    async fn restart(&mut self) -> bool {
        info!("restarting actor");
        self.run_stopped_hook().await;
        self.actor = (self.factory)();
        self.start().await
    }

    fn report(&self, reason: String, stage: &str) {
        let failure = ActorError::PeerFailure {
            actor: self.ctx.id().clone(),
            reason,
        };
        error!(stage, "{failure}");
    }

    async fn run_stopped_hook(&mut self) {
        if let Err(panic) = AssertUnwindSafe(self.actor.stopped(&mut self.ctx))
            .catch_unwind()
            .await
        {
            self.report(panic_reason(&panic), "stop");
        }
    }

    /// Children first, then the actor's own hook, then the outside world.
    async fn finish(mut self) {
        let cell = self.ctx.myself().cell().clone();
        cell.request_stop();
        cell.terminate_children(self.ctx.system().config().actor_shutdown_timeout())
            .await;
        self.run_stopped_hook().await;
        self.inbox.close();
        cell.release_watches();
        self.ctx.system().unregister(cell.id());
        cell.detach_from_parent();
        cell.mark_stopped();
        info!("actor stopped");
    }
}

fn panic_reason(panic: &PanicPayload) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
