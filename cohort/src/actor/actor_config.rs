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

use crate::actor::FailurePolicy;

/// Configuration parameters required to create a new actor.
///
/// The name becomes the last segment of the actor's path under whichever parent
/// spawns it, so it must be unique among that parent's live children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorConfig {
    name: String,
    /// `None` means the system-wide default from configuration.
    failure_policy: Option<FailurePolicy>,
}

impl ActorConfig {
    /// Creates a configuration for an actor called `name`.
    ///
    /// The name is validated when the actor is spawned.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure_policy: None,
        }
    }

    /// Sets what happens when a handler of this actor fails.
    ///
    /// # Returns
    ///
    /// Returns `self` for method chaining.
    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    /// The requested name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) const fn failure_policy(&self) -> Option<FailurePolicy> {
        self.failure_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_is_unset_until_chosen() {
        let config = ActorConfig::new("entity-1");
        assert_eq!(config.name(), "entity-1");
        assert_eq!(config.failure_policy(), None);

        let config = config.with_failure_policy(FailurePolicy::Resume);
        assert_eq!(config.failure_policy(), Some(FailurePolicy::Resume));
    }
}
