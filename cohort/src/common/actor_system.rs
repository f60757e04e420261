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
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::time::timeout as tokio_timeout;
use tracing::{debug, error, instrument, trace};

use crate::actor::{ActorCell, ActorConfig, Context, Dispatcher};
use crate::common::config::CONFIG;
use crate::common::{ActorId, ActorPath, ActorRef, CohortConfig};
use crate::message::ActorError;
use crate::traits::Actor;

/// A running actor system: the tree of actors, their path registry and the
/// configuration they share.
///
/// Cloning is cheap; every clone refers to the same system. Top-level actors live
/// under a guardian whose path is `/user` by default.
///
/// Must be launched from within a Tokio runtime.
#[derive(Clone)]
pub struct ActorSystem {
    inner: Arc<SystemInner>,
}

struct SystemInner {
    name: String,
    config: CohortConfig,
    guardian: Arc<ActorCell>,
    registry: DashMap<ActorPath, RegistryEntry>,
    next_uid: AtomicU64,
}

struct RegistryEntry {
    id: ActorId,
    /// An `ActorRef<M>` for the actor's message type.
    handle: Box<dyn Any + Send + Sync>,
}

impl ActorSystem {
    /// Starts a system using the global [`CONFIG`].
    #[must_use]
    pub fn launch(name: impl Into<String>) -> Self {
        Self::with_config(name, CONFIG.clone())
    }

    /// Starts a system with an explicit configuration.
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: CohortConfig) -> Self {
        let name = name.into();
        let guardian_path = ActorPath::root()
            .child(&config.defaults.user_guardian)
            .or_else(|e| {
                error!("{e}; using the default guardian name");
                ActorPath::root().child("user")
            })
            .unwrap_or_default();
        let guardian = Arc::new(ActorCell::guardian(ActorId::new(guardian_path, 0)));
        debug!(system = %name, guardian = %guardian.id(), "actor system launched");
        Self {
            inner: Arc::new(SystemInner {
                name,
                config,
                guardian,
                registry: DashMap::new(),
                next_uid: AtomicU64::new(1),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn config(&self) -> &CohortConfig {
        &self.inner.config
    }

    /// Creates a top-level actor.
    ///
    /// # Errors
    ///
    /// [`ActorError::NameConflict`] if a live top-level actor already has the name,
    /// [`ActorError::InvalidName`] for a malformed name and
    /// [`ActorError::SystemShutdown`] after [`shutdown`](Self::shutdown).
    pub fn spawn<A, F>(
        &self,
        config: ActorConfig,
        factory: F,
    ) -> Result<ActorRef<A::Message>, ActorError>
    where
        A: Actor,
        F: Fn() -> A + Send + Sync + 'static,
    {
        self.spawn_under(&self.inner.guardian, config, factory)
    }

    #[instrument(skip(self, parent, factory), fields(parent = %parent.id(), name = %config.name()))]
    pub(crate) fn spawn_under<A, F>(
        &self,
        parent: &Arc<ActorCell>,
        config: ActorConfig,
        factory: F,
    ) -> Result<ActorRef<A::Message>, ActorError>
    where
        A: Actor,
        F: Fn() -> A + Send + Sync + 'static,
    {
        if self.inner.guardian.is_stopping() {
            return Err(ActorError::SystemShutdown);
        }
        let path = parent.id().path().child(config.name())?;
        let id = ActorId::new(
            path.clone(),
            self.inner.next_uid.fetch_add(1, Ordering::Relaxed),
        );
        let (mailbox, inbox) = mpsc::unbounded_channel();
        let cell = Arc::new(ActorCell::child_of(id.clone(), parent));
        let actor_ref = ActorRef::new(cell.clone(), mailbox);

        match self.inner.registry.entry(path) {
            Entry::Occupied(entry) => {
                return Err(ActorError::NameConflict {
                    path: entry.key().clone(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(RegistryEntry {
                    id,
                    handle: Box::new(actor_ref.clone()),
                });
            }
        }
        parent.adopt(cell.clone());

        let policy = config
            .failure_policy()
            .unwrap_or(self.inner.config.behavior.default_failure_policy);
        let ctx = Context::new(actor_ref.clone(), self.clone());
        let dispatcher = Dispatcher::new(factory, policy, inbox, ctx);
        cell.tracker().spawn(dispatcher.run());
        cell.tracker().close();
        trace!(actor = %actor_ref.id(), "actor spawned");
        Ok(actor_ref)
    }

    /// Finds the live actor at `path`.
    ///
    /// Returns `None` if nothing lives there or if its message type is not `M`.
    #[must_use]
    pub fn lookup<M: Send + 'static>(&self, path: &ActorPath) -> Option<ActorRef<M>> {
        self.inner
            .registry
            .get(path)
            .and_then(|entry| entry.handle.downcast_ref::<ActorRef<M>>().cloned())
    }

    /// Number of live actors, not counting the guardian.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Makes `watcher` receive a termination notification for `target`.
    pub fn watch<W: Send + 'static, T>(&self, watcher: &ActorRef<W>, target: &ActorRef<T>) {
        watcher.watch_cell(target.cell());
    }

    pub fn unwatch<W: Send + 'static, T>(&self, watcher: &ActorRef<W>, target: &ActorRef<T>) {
        watcher.unwatch_cell(target.cell());
    }

    /// Releases the path of a terminated actor, unless a newer actor already holds it.
    pub(crate) fn unregister(&self, id: &ActorId) {
        if self
            .inner
            .registry
            .remove_if(id.path(), |_, entry| entry.id == *id)
            .is_some()
        {
            debug!(actor = %id, "path released");
        }
    }

    /// Stops every actor and waits for the tree to wind down.
    ///
    /// Each actor waits up to `actor_shutdown_timeout` for each of its children; the
    /// whole operation is bounded by `system_shutdown_timeout`. New spawns are
    /// refused from the moment this is called.
    ///
    /// # Errors
    ///
    /// Returns an error if the system did not stop within the system timeout.
    #[instrument(skip(self), fields(system = %self.inner.name))]
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        let guardian = &self.inner.guardian;
        guardian.request_stop();

        let timeout = self.inner.config.system_shutdown_timeout();
        trace!("Waiting for all actors to finish gracefully...");
        if tokio_timeout(
            timeout,
            guardian.terminate_children(self.inner.config.actor_shutdown_timeout()),
        )
        .await
        .is_err()
        {
            error!(
                "System-wide shutdown timeout expired after {} ms",
                timeout.as_millis()
            );
            return Err(anyhow::anyhow!(
                "Timeout while waiting for actor system {} to shut down after {} ms",
                self.inner.name,
                timeout.as_millis()
            ));
        }
        guardian.mark_stopped();
        trace!("System shutdown complete.");
        Ok(())
    }
}

impl Default for ActorSystem {
    fn default() -> Self {
        Self::launch(CONFIG.defaults.system_name.clone())
    }
}

impl fmt::Debug for ActorSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorSystem")
            .field("name", &self.inner.name)
            .field("guardian", &self.inner.guardian)
            .field("actors", &self.inner.registry.len())
            .finish_non_exhaustive()
    }
}
