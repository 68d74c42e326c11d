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

//! Registry of subscribed channels, partitioned by priority tier.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use vitals_core::SubscriptionQuery;

use crate::channel::{Channel, Priority};
use crate::config::{ConfigError, PollingConfig};

/// The channels of one tier together with its refresh interval.
///
/// High and Medium groups are refreshed repeatedly at their interval; the
/// Low group is refreshed exactly once after startup, so its interval is
/// unused and held at zero.
#[derive(Debug)]
pub struct PriorityGroup {
    priority: Priority,
    interval: Duration,
    channels: Vec<Arc<Channel>>,
}

impl PriorityGroup {
    /// Creates a group. The interval of a recurring tier must be non-zero;
    /// this is validated where groups are built and again before
    /// scheduling.
    pub fn new(priority: Priority, interval: Duration, channels: Vec<Arc<Channel>>) -> Self {
        Self {
            priority,
            interval,
            channels,
        }
    }

    /// The tier this group belongs to.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// The refresh interval of this tier.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The channels of this tier, in no guaranteed order.
    pub fn channels(&self) -> &[Arc<Channel>] {
        &self.channels
    }

    /// The number of channels in this tier.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` if this tier has no channels.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// The full set of subscribed channels, built once from the host
/// configuration and read-only afterwards except for per-channel
/// subscription flags.
///
/// Grouping is a pure partition: every channel lands in exactly one tier.
/// The registry also answers [`SubscriptionQuery`] for the dispatcher,
/// backed by each channel's atomic flag.
#[derive(Debug)]
pub struct ChannelRegistry {
    index: HashMap<String, Arc<Channel>>,
    high: Arc<PriorityGroup>,
    medium: Arc<PriorityGroup>,
    low: Arc<PriorityGroup>,
}

impl ChannelRegistry {
    /// Builds the registry from host configuration, failing fast on the
    /// first invalid interval, unknown priority label or duplicated
    /// channel identifier.
    pub fn build(config: &PollingConfig) -> Result<Self, ConfigError> {
        if config.high_priority_refresh_secs == 0 {
            return Err(ConfigError::InvalidInterval {
                priority: Priority::High,
                seconds: config.high_priority_refresh_secs,
            });
        }
        if config.medium_priority_refresh_secs == 0 {
            return Err(ConfigError::InvalidInterval {
                priority: Priority::Medium,
                seconds: config.medium_priority_refresh_secs,
            });
        }

        let mut index = HashMap::new();
        let mut high = Vec::new();
        let mut medium = Vec::new();
        let mut low = Vec::new();

        for channel_config in &config.channels {
            let priority = Priority::from_label(&channel_config.priority).ok_or_else(|| {
                ConfigError::InvalidPriority {
                    channel: channel_config.id.clone(),
                    label: channel_config.priority.clone(),
                }
            })?;

            let channel = Arc::new(Channel::new(channel_config.id.clone(), priority));
            if index
                .insert(channel_config.id.clone(), Arc::clone(&channel))
                .is_some()
            {
                return Err(ConfigError::DuplicateChannel {
                    channel: channel_config.id.clone(),
                });
            }

            match priority {
                Priority::High => high.push(channel),
                Priority::Medium => medium.push(channel),
                Priority::Low => low.push(channel),
            }
        }

        log::debug!(
            "Built channel registry: {} high, {} medium, {} low priority channel(s)",
            high.len(),
            medium.len(),
            low.len()
        );

        Ok(Self {
            index,
            high: Arc::new(PriorityGroup::new(
                Priority::High,
                Duration::from_secs(config.high_priority_refresh_secs),
                high,
            )),
            medium: Arc::new(PriorityGroup::new(
                Priority::Medium,
                Duration::from_secs(config.medium_priority_refresh_secs),
                medium,
            )),
            low: Arc::new(PriorityGroup::new(Priority::Low, Duration::ZERO, low)),
        })
    }

    /// The High priority group.
    pub fn high_group(&self) -> &Arc<PriorityGroup> {
        &self.high
    }

    /// The Medium priority group.
    pub fn medium_group(&self) -> &Arc<PriorityGroup> {
        &self.medium
    }

    /// The Low priority group.
    pub fn low_group(&self) -> &Arc<PriorityGroup> {
        &self.low
    }

    /// Looks up a channel by its full identifier.
    pub fn channel(&self, channel_id: &str) -> Option<&Arc<Channel>> {
        self.index.get(channel_id)
    }

    /// The total number of channels across all tiers.
    pub fn channel_count(&self) -> usize {
        self.index.len()
    }

    /// Toggles a channel's subscribed flag. Returns `false` if no such
    /// channel is configured.
    pub fn set_subscribed(&self, channel_id: &str, subscribed: bool) -> bool {
        match self.index.get(channel_id) {
            Some(channel) => {
                channel.set_subscribed(subscribed);
                true
            }
            None => false,
        }
    }
}

impl SubscriptionQuery for ChannelRegistry {
    fn is_subscribed(&self, channel_id: &str) -> bool {
        self.index
            .get(channel_id)
            .map(|channel| channel.is_subscribed())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelConfig;

    fn config(channels: Vec<ChannelConfig>) -> PollingConfig {
        PollingConfig {
            high_priority_refresh_secs: 1,
            medium_priority_refresh_secs: 60,
            channels,
        }
    }

    #[test]
    fn test_partition_by_tier() {
        let registry = ChannelRegistry::build(&config(vec![
            ChannelConfig::new("cpuLoad", "High"),
            ChannelConfig::new("memoryAvailable", "High"),
            ChannelConfig::new("storageUsed", "Medium"),
            ChannelConfig::new("cpuName", "Low"),
        ]))
        .unwrap();

        assert_eq!(registry.high_group().len(), 2);
        assert_eq!(registry.medium_group().len(), 1);
        assert_eq!(registry.low_group().len(), 1);
        assert_eq!(registry.channel_count(), 4);
        assert_eq!(registry.high_group().interval(), Duration::from_secs(1));
        assert_eq!(registry.medium_group().interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_unknown_label_aborts_build() {
        let result = ChannelRegistry::build(&config(vec![
            ChannelConfig::new("cpuLoad", "High"),
            ChannelConfig::new("memoryUsed", "Urgent"),
        ]));

        assert_eq!(
            result.err(),
            Some(ConfigError::InvalidPriority {
                channel: "memoryUsed".to_string(),
                label: "Urgent".to_string(),
            })
        );
    }

    #[test]
    fn test_empty_label_aborts_build() {
        let result = ChannelRegistry::build(&config(vec![ChannelConfig::new("cpuLoad", "")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPriority { .. })
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut cfg = config(vec![]);
        cfg.high_priority_refresh_secs = 0;
        assert_eq!(
            ChannelRegistry::build(&cfg).err(),
            Some(ConfigError::InvalidInterval {
                priority: Priority::High,
                seconds: 0,
            })
        );

        let mut cfg = config(vec![]);
        cfg.medium_priority_refresh_secs = 0;
        assert!(matches!(
            ChannelRegistry::build(&cfg),
            Err(ConfigError::InvalidInterval {
                priority: Priority::Medium,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_channel_rejected() {
        let result = ChannelRegistry::build(&config(vec![
            ChannelConfig::new("cpuLoad", "High"),
            ChannelConfig::new("cpuLoad", "Medium"),
        ]));
        assert_eq!(
            result.err(),
            Some(ConfigError::DuplicateChannel {
                channel: "cpuLoad".to_string(),
            })
        );
    }

    #[test]
    fn test_same_base_metric_different_indices() {
        let registry = ChannelRegistry::build(&config(vec![
            ChannelConfig::new("storageUsed", "Medium"),
            ChannelConfig::new("storageUsed1", "Medium"),
        ]))
        .unwrap();

        let first = registry.channel("storageUsed").unwrap();
        let second = registry.channel("storageUsed1").unwrap();
        assert_eq!(first.base_name(), "storageUsed");
        assert_eq!(first.device_index(), 0);
        assert_eq!(second.base_name(), "storageUsed");
        assert_eq!(second.device_index(), 1);
    }

    #[test]
    fn test_subscription_query() {
        let registry =
            ChannelRegistry::build(&config(vec![ChannelConfig::new("cpuLoad", "High")])).unwrap();

        assert!(registry.is_subscribed("cpuLoad"));
        assert!(registry.set_subscribed("cpuLoad", false));
        assert!(!registry.is_subscribed("cpuLoad"));

        // Unknown channels are never subscribed and cannot be toggled.
        assert!(!registry.is_subscribed("noSuchChannel"));
        assert!(!registry.set_subscribed("noSuchChannel", true));
    }
}
