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

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::actor::FailurePolicy;

/// Configuration for a cohort actor system.
///
/// Loaded from `config.toml` in the XDG config directory for the `cohort` prefix.
/// Every section and field is optional; anything missing takes its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// Default names
    pub defaults: DefaultsConfig,
    /// Behavioral switches
    pub behavior: BehaviorConfig,
}

/// Timeout-related configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long a stopping actor waits for each of its children, in milliseconds
    pub actor_shutdown_timeout_ms: u64,
    /// Bound on a whole-system shutdown, in milliseconds
    pub system_shutdown_timeout_ms: u64,
    /// Deadline handed to aggregators spawned by groups, in milliseconds
    pub query_timeout_ms: u64,
}

/// Default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Name used by [`ActorSystem::default`](crate::common::ActorSystem)
    pub system_name: String,
    /// Name of the guardian under which top-level actors are spawned
    pub user_guardian: String,
}

/// Behavioral configuration switches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Failure policy for actors whose `ActorConfig` does not set one
    pub default_failure_policy: FailurePolicy,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            actor_shutdown_timeout_ms: 10_000,
            system_shutdown_timeout_ms: 30_000,
            query_timeout_ms: 3_000,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            system_name: "cohort".to_string(),
            user_guardian: "user".to_string(),
        }
    }
}

impl CohortConfig {
    /// Per-child wait during an actor stop.
    #[must_use]
    pub const fn actor_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.actor_shutdown_timeout_ms)
    }

    /// Bound on [`ActorSystem::shutdown`](crate::common::ActorSystem::shutdown).
    #[must_use]
    pub const fn system_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.system_shutdown_timeout_ms)
    }

    /// Aggregator deadline.
    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.query_timeout_ms)
    }

    /// Sets the aggregator deadline, keeping everything else.
    #[must_use]
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.query_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the per-child stop wait, keeping everything else.
    #[must_use]
    pub fn with_actor_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.actor_shutdown_timeout_ms =
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns the TOML deserialization error for malformed input.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Load configuration from XDG-compliant locations
    ///
    /// Looks for `cohort/config.toml` under `$XDG_CONFIG_HOME` and then the XDG
    /// config dirs. A missing file yields the defaults; a file that cannot be read
    /// or parsed is logged and also yields the defaults.
    pub fn load() -> Self {
        use tracing::{error, info};

        let xdg_dirs = match xdg::BaseDirectories::with_prefix("cohort") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        let Some(path) = xdg_dirs.find_config_file("config.toml") else {
            info!("No configuration file found, using defaults");
            return Self::default();
        };

        info!("Loading configuration from: {}", path.display());
        match std::fs::read_to_string(&path) {
            Ok(config_str) => match Self::from_toml(&config_str) {
                Ok(config) => config,
                Err(e) => {
                    error!("Failed to parse configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: CohortConfig = CohortConfig::load();
}
