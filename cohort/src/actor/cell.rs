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
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use futures::future::join_all;
use parking_lot::Mutex;
use tokio::time::timeout as tokio_timeout;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, instrument, trace};

use crate::common::ActorId;

/// Where an actor is in its life.
///
/// Transitions only move forward: `Starting -> Running -> Stopping -> Stopped`.
/// An actor whose `started` hook fails skips `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum LifecycleState {
    /// Spawned; the `started` hook has not finished yet. Messages are queued.
    #[default]
    Starting,
    /// Processing its mailbox.
    Running,
    /// A stop was requested; the mailbox is no longer read.
    Stopping,
    /// Fully terminated. Watchers have been notified.
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Delivers a termination notification into a watcher's mailbox.
pub(crate) type Notifier = Arc<dyn Fn(ActorId) + Send + Sync>;

/// The untyped part of an actor shared by every reference to it.
pub(crate) struct ActorCell {
    id: ActorId,
    parent: Option<Weak<ActorCell>>,
    token: CancellationToken,
    tracker: TaskTracker,
    children: DashMap<ActorId, Arc<ActorCell>>,
    state: Mutex<CellState>,
}

#[derive(Default)]
struct CellState {
    lifecycle: LifecycleState,
    /// Actors interested in this one's termination.
    watchers: HashMap<ActorId, Notifier>,
    /// Actors this one watches.
    watching: HashMap<ActorId, Weak<ActorCell>>,
}

impl ActorCell {
    /// A cell with no parent and no dispatcher, already running.
    pub(crate) fn guardian(id: ActorId) -> Self {
        Self {
            id,
            parent: None,
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            children: DashMap::new(),
            state: Mutex::new(CellState {
                lifecycle: LifecycleState::Running,
                ..CellState::default()
            }),
        }
    }

    /// A cell whose cancellation follows `parent`'s.
    pub(crate) fn child_of(id: ActorId, parent: &Arc<Self>) -> Self {
        Self {
            id,
            parent: Some(Arc::downgrade(parent)),
            token: parent.token.child_token(),
            tracker: TaskTracker::new(),
            children: DashMap::new(),
            state: Mutex::new(CellState::default()),
        }
    }

    #[inline]
    pub(crate) const fn id(&self) -> &ActorId {
        &self.id
    }

    #[inline]
    pub(crate) const fn token(&self) -> &CancellationToken {
        &self.token
    }

    #[inline]
    pub(crate) const fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    pub(crate) fn lifecycle(&self) -> LifecycleState {
        self.state.lock().lifecycle
    }

    /// `true` once a stop was requested, directly or through an ancestor.
    pub(crate) fn is_stopping(&self) -> bool {
        self.token.is_cancelled() || self.lifecycle() >= LifecycleState::Stopping
    }

    /// Moves `Starting` to `Running`. Fails if a stop got there first.
    pub(crate) fn mark_running(&self) -> bool {
        let mut state = self.state.lock();
        if state.lifecycle == LifecycleState::Starting && !self.token.is_cancelled() {
            state.lifecycle = LifecycleState::Running;
            true
        } else {
            false
        }
    }

    /// Begins stopping. Returns `false` if the actor was already stopping or stopped.
    pub(crate) fn request_stop(&self) -> bool {
        let requested = {
            let mut state = self.state.lock();
            match state.lifecycle {
                LifecycleState::Starting | LifecycleState::Running => {
                    state.lifecycle = LifecycleState::Stopping;
                    true
                }
                LifecycleState::Stopping | LifecycleState::Stopped => false,
            }
        };
        // Cancelling cascades to children and timers.
        self.token.cancel();
        requested
    }

    /// Final transition. Watchers registered up to this point are notified exactly once.
    pub(crate) fn mark_stopped(&self) {
        let watchers = {
            let mut state = self.state.lock();
            state.lifecycle = LifecycleState::Stopped;
            std::mem::take(&mut state.watchers)
        };
        trace!(actor = %self.id, watchers = watchers.len(), "notifying watchers");
        for notify in watchers.into_values() {
            notify(self.id.clone());
        }
    }

    /// Registers `watcher`. Returns `false` when this actor has already stopped; the
    /// caller must then deliver the notification itself.
    pub(crate) fn add_watcher(&self, watcher: ActorId, notifier: Notifier) -> bool {
        let mut state = self.state.lock();
        if state.lifecycle == LifecycleState::Stopped {
            return false;
        }
        state.watchers.insert(watcher, notifier);
        true
    }

    pub(crate) fn remove_watcher(&self, watcher: &ActorId) {
        self.state.lock().watchers.remove(watcher);
    }

    pub(crate) fn start_watching(&self, target: &Arc<Self>) {
        self.state
            .lock()
            .watching
            .insert(target.id.clone(), Arc::downgrade(target));
    }

    /// Forgets `target`. Returns whether it was being watched.
    pub(crate) fn stop_watching(&self, target: &ActorId) -> bool {
        self.state.lock().watching.remove(target).is_some()
    }

    /// Deregisters from every actor this one watches.
    pub(crate) fn release_watches(&self) {
        let watching = std::mem::take(&mut self.state.lock().watching);
        for target in watching.into_values().filter_map(|weak| weak.upgrade()) {
            target.remove_watcher(&self.id);
        }
    }

    pub(crate) fn adopt(&self, child: Arc<Self>) {
        debug!(parent = %self.id, child = %child.id, "child adopted");
        self.children.insert(child.id.clone(), child);
    }

    pub(crate) fn detach_from_parent(&self) {
        if let Some(parent) = self.parent.as_ref().and_then(Weak::upgrade) {
            parent.children.remove(&self.id);
        }
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Resolves when the actor's dispatcher has finished.
    pub(crate) async fn wait_for_stop(&self) {
        self.tracker.wait().await;
    }

    /// Stops every child and waits for each, up to `timeout` apiece.
    ///
    /// Children that do not finish in time are reported in a single error line.
    #[instrument(skip(self), fields(actor = %self.id))]
    pub(crate) async fn terminate_children(&self, timeout: Duration) {
        let children: Vec<Arc<Self>> = self
            .children
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        if children.is_empty() {
            return;
        }
        trace!(count = children.len(), "terminating children");

        let stop_futures = children.into_iter().map(|child| async move {
            child.request_stop();
            match tokio_timeout(timeout, child.wait_for_stop()).await {
                Ok(()) => None,
                Err(_) => Some(child.id.to_string()),
            }
        });
        let stragglers: Vec<String> = join_all(stop_futures).await.into_iter().flatten().collect();

        if !stragglers.is_empty() {
            error!(
                "Shutdown timeout ({} ms) for {} child(ren) of actor {}: [{}]",
                timeout.as_millis(),
                stragglers.len(),
                self.id,
                stragglers.join(", ")
            );
        }
        trace!("all children stopped");
    }
}

impl fmt::Debug for ActorCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorCell")
            .field("id", &self.id)
            .field("lifecycle", &self.lifecycle())
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::common::ActorPath;

    fn cell(name: &str, uid: u64) -> anyhow::Result<Arc<ActorCell>> {
        let path = ActorPath::root().child(name)?;
        Ok(Arc::new(ActorCell::guardian(ActorId::new(path, uid))))
    }

    fn counting_notifier(count: &Arc<AtomicUsize>) -> Notifier {
        let count = count.clone();
        Arc::new(move |_: ActorId| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn stop_request_is_idempotent() -> anyhow::Result<()> {
        let target = cell("target", 1)?;
        assert!(target.request_stop());
        assert!(!target.request_stop());
        assert_eq!(target.lifecycle(), LifecycleState::Stopping);
        assert!(target.token().is_cancelled());
        Ok(())
    }

    #[test]
    fn watchers_are_notified_once() -> anyhow::Result<()> {
        let target = cell("target", 1)?;
        let watcher = cell("watcher", 2)?;
        let count = Arc::new(AtomicUsize::new(0));

        assert!(target.add_watcher(watcher.id().clone(), counting_notifier(&count)));
        // Registering the same watcher twice keeps a single entry.
        assert!(target.add_watcher(watcher.id().clone(), counting_notifier(&count)));
        target.mark_stopped();
        target.mark_stopped();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn watching_a_stopped_cell_is_refused() -> anyhow::Result<()> {
        let target = cell("target", 1)?;
        let watcher = cell("watcher", 2)?;
        target.mark_stopped();

        let count = Arc::new(AtomicUsize::new(0));
        assert!(!target.add_watcher(watcher.id().clone(), counting_notifier(&count)));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[test]
    fn released_watches_are_not_notified() -> anyhow::Result<()> {
        let target = cell("target", 1)?;
        let watcher = cell("watcher", 2)?;
        let count = Arc::new(AtomicUsize::new(0));

        watcher.start_watching(&target);
        target.add_watcher(watcher.id().clone(), counting_notifier(&count));
        watcher.release_watches();
        target.mark_stopped();

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!watcher.stop_watching(target.id()));
        Ok(())
    }

    #[test]
    fn child_tokens_follow_the_parent() -> anyhow::Result<()> {
        let parent = cell("parent", 1)?;
        let child = Arc::new(ActorCell::child_of(
            ActorId::new(parent.id().path().child("child")?, 2),
            &parent,
        ));
        parent.adopt(child.clone());
        assert_eq!(parent.child_count(), 1);
        assert!(child.mark_running());

        parent.request_stop();
        assert!(child.is_stopping());
        assert!(!child.mark_running());

        child.detach_from_parent();
        assert_eq!(parent.child_count(), 0);
        Ok(())
    }
}
