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

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::common::ActorRef;

/// A cancellable one-shot timer.
///
/// The timer is tied to the actor that scheduled it: stopping that actor cancels
/// it. Cancelling a timer that already fired does nothing.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Sends `msg` to `target`, from `target`, after `delay` unless cancelled first.
    pub(crate) fn schedule<M: Send + 'static>(
        owner: &CancellationToken,
        delay: Duration,
        target: ActorRef<M>,
        msg: M,
    ) -> Self {
        let token = owner.child_token();
        let guard = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = guard.cancelled() => {
                    trace!(actor = %target.id(), "timer cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    trace!(actor = %target.id(), ?delay, "timer fired");
                    let me = target.id().clone();
                    target.enqueue(msg, Some(me));
                }
            }
        });
        Self { token }
    }

    /// Prevents the timer from firing.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// `true` once cancelled, directly or by the owning actor stopping.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
