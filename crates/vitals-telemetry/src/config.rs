// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Inbound host configuration and its validation errors.

use std::fmt::Display;

use serde::Deserialize;

use crate::channel::Priority;

/// Configuration for one subscribable channel.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Channel identifier, optionally suffixed with a device index
    /// (e.g. `"storageUsed1"`).
    pub id: String,
    /// Priority label: `"High"`, `"Medium"` or `"Low"`. Anything else
    /// aborts initialization.
    pub priority: String,
}

impl ChannelConfig {
    /// Convenience constructor used by hosts that build the configuration
    /// in code rather than deserializing it.
    pub fn new(id: impl Into<String>, priority: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: priority.into(),
        }
    }
}

/// Host configuration for the polling engine.
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Refresh interval for High priority channels, in seconds (>= 1).
    pub high_priority_refresh_secs: u64,
    /// Refresh interval for Medium priority channels, in seconds (>= 1).
    pub medium_priority_refresh_secs: u64,
    /// The channels to poll.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

/// A fatal configuration error. Initialization is all-or-nothing: a single
/// invalid channel invalidates the whole set, since partial state would make
/// scheduling ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A channel declared a priority label that is not High/Medium/Low.
    InvalidPriority {
        /// The offending channel identifier.
        channel: String,
        /// The label as configured.
        label: String,
    },
    /// A recurring tier was configured with a non-positive refresh interval.
    InvalidInterval {
        /// The tier whose interval is invalid.
        priority: Priority,
        /// The configured value in seconds.
        seconds: u64,
    },
    /// The same channel identifier was configured twice.
    DuplicateChannel {
        /// The duplicated identifier.
        channel: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPriority { channel, label } => {
                write!(f, "channel {channel} has unknown priority label {label:?}")
            }
            ConfigError::InvalidInterval { priority, seconds } => {
                write!(
                    f,
                    "{priority} priority refresh interval must be positive, got {seconds}"
                )
            }
            ConfigError::DuplicateChannel { channel } => {
                write!(f, "channel {channel} is configured more than once")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_json() {
        let raw = r#"{
            "high_priority_refresh_secs": 1,
            "medium_priority_refresh_secs": 60,
            "channels": [
                { "id": "cpuLoad", "priority": "High" },
                { "id": "storageUsed1", "priority": "Medium" }
            ]
        }"#;

        let config: PollingConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.high_priority_refresh_secs, 1);
        assert_eq!(config.medium_priority_refresh_secs, 60);
        assert_eq!(config.channels.len(), 2);
        assert_eq!(config.channels[1].id, "storageUsed1");
        assert_eq!(config.channels[1].priority, "Medium");
    }

    #[test]
    fn test_channels_default_to_empty() {
        let raw = r#"{
            "high_priority_refresh_secs": 1,
            "medium_priority_refresh_secs": 60
        }"#;
        let config: PollingConfig = serde_json::from_str(raw).unwrap();
        assert!(config.channels.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::InvalidInterval {
            priority: Priority::High,
            seconds: 0,
        };
        assert_eq!(
            err.to_string(),
            "High priority refresh interval must be positive, got 0"
        );
    }
}
