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

//! Per-channel refresh: resolve, query, publish.

use std::sync::Arc;

use vitals_core::{MetricResult, PublishSink, SubscriptionQuery, SystemProbe};

use crate::catalog::MetricCatalog;
use crate::channel::Channel;
use crate::registry::PriorityGroup;

/// Executes refresh passes over priority groups.
///
/// Every probe failure is contained to its own channel and converted into
/// an explicit unavailable result; one failing metric never aborts the rest
/// of a pass. Per channel and pass the dispatcher makes exactly zero sink
/// calls (unsubscribed channel or catalog miss) or one.
pub struct RefreshDispatcher {
    catalog: Arc<MetricCatalog>,
    probe: Arc<dyn SystemProbe>,
    sink: Arc<dyn PublishSink>,
    subscriptions: Arc<dyn SubscriptionQuery>,
}

impl RefreshDispatcher {
    /// Creates a dispatcher over the given capabilities.
    pub fn new(
        catalog: Arc<MetricCatalog>,
        probe: Arc<dyn SystemProbe>,
        sink: Arc<dyn PublishSink>,
        subscriptions: Arc<dyn SubscriptionQuery>,
    ) -> Self {
        Self {
            catalog,
            probe,
            sink,
            subscriptions,
        }
    }

    /// Refreshes every subscribed channel of the group, in no guaranteed
    /// order. Channels without an active subscriber are skipped entirely:
    /// no probe call, no sink call.
    pub fn refresh(&self, group: &PriorityGroup) {
        log::trace!(
            "Refreshing {} {} priority channel(s)",
            group.len(),
            group.priority()
        );
        for channel in group.channels() {
            if !self.subscriptions.is_subscribed(channel.id()) {
                continue;
            }
            self.refresh_channel(channel);
        }
    }

    /// Refreshes a single channel unconditionally (used for host-driven
    /// on-demand refresh; the subscription check belongs to the caller).
    pub fn refresh_channel(&self, channel: &Channel) {
        let Some(entry) = self.catalog.resolve(channel.base_name()) else {
            log::warn!(
                "Channel {} can not be updated! No metric named {} exists",
                channel.id(),
                channel.base_name()
            );
            return;
        };

        let index = if entry.is_index_aware() {
            channel.device_index()
        } else {
            0
        };

        let result: MetricResult = entry.query(self.probe.as_ref(), index).into();
        if let MetricResult::Unavailable(reason) = &result {
            log::warn!("No value available for channel {}: {}", channel.id(), reason);
        }
        self.sink.publish(channel.id(), result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use vitals_core::probe::{ProbeError, ProbeResult};
    use vitals_core::MetricValue;

    use crate::channel::Priority;
    use crate::registry::ChannelRegistry;
    use crate::config::{ChannelConfig, PollingConfig};

    struct StubProbe;

    impl SystemProbe for StubProbe {
        fn cpu_load(&self) -> ProbeResult<MetricValue> {
            Ok(MetricValue::Decimal(55.0))
        }

        fn memory_used(&self) -> ProbeResult<MetricValue> {
            Err(ProbeError::Query("meminfo unreadable".to_string()))
        }

        fn storage_used(&self, index: usize) -> ProbeResult<MetricValue> {
            match index {
                0 => Ok(MetricValue::Count(512)),
                1 => Ok(MetricValue::Count(1024)),
                _ => Err(ProbeError::DeviceNotFound { index }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        published: Mutex<Vec<(String, MetricResult)>>,
    }

    impl RecordingSink {
        fn published(&self) -> Vec<(String, MetricResult)> {
            self.published.lock().unwrap().clone()
        }

        fn result_for(&self, channel_id: &str) -> Option<MetricResult> {
            self.published()
                .into_iter()
                .find(|(id, _)| id == channel_id)
                .map(|(_, result)| result)
        }
    }

    impl PublishSink for RecordingSink {
        fn publish(&self, channel_id: &str, result: MetricResult) {
            self.published
                .lock()
                .unwrap()
                .push((channel_id.to_string(), result));
        }
    }

    fn registry(ids: &[(&str, &str)]) -> Arc<ChannelRegistry> {
        let config = PollingConfig {
            high_priority_refresh_secs: 1,
            medium_priority_refresh_secs: 1,
            channels: ids
                .iter()
                .map(|(id, priority)| ChannelConfig::new(*id, *priority))
                .collect(),
        };
        Arc::new(ChannelRegistry::build(&config).unwrap())
    }

    fn dispatcher(
        registry: &Arc<ChannelRegistry>,
        sink: &Arc<RecordingSink>,
    ) -> RefreshDispatcher {
        RefreshDispatcher::new(
            Arc::new(MetricCatalog::standard()),
            Arc::new(StubProbe),
            Arc::clone(sink) as Arc<dyn PublishSink>,
            Arc::clone(registry) as Arc<dyn SubscriptionQuery>,
        )
    }

    #[test]
    fn test_unsubscribed_channel_is_skipped() {
        let registry = registry(&[("cpuLoad", "High"), ("storageUsed", "High")]);
        registry.set_subscribed("cpuLoad", false);
        let sink = Arc::new(RecordingSink::default());

        dispatcher(&registry, &sink).refresh(registry.high_group());

        let published = sink.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "storageUsed");
    }

    #[test]
    fn test_catalog_miss_publishes_nothing() {
        let registry = registry(&[("noSuchMetric", "High"), ("cpuLoad", "High")]);
        let sink = Arc::new(RecordingSink::default());

        dispatcher(&registry, &sink).refresh(registry.high_group());

        let published = sink.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "cpuLoad");
    }

    #[test]
    fn test_missing_device_publishes_unavailable_without_stopping_pass() {
        // Index 3 does not exist; the pass must still refresh the others.
        let registry = registry(&[
            ("storageUsed", "Medium"),
            ("storageUsed3", "Medium"),
            ("cpuLoad", "Medium"),
        ]);
        let sink = Arc::new(RecordingSink::default());

        dispatcher(&registry, &sink).refresh(registry.medium_group());

        assert_eq!(sink.published().len(), 3);
        match sink.result_for("storageUsed3").unwrap() {
            MetricResult::Unavailable(ProbeError::DeviceNotFound { index }) => {
                assert_eq!(index, 3)
            }
            other => panic!("expected DeviceNotFound, got {other:?}"),
        }
        assert!(!sink.result_for("storageUsed").unwrap().is_unavailable());
        assert!(!sink.result_for("cpuLoad").unwrap().is_unavailable());
    }

    #[test]
    fn test_query_failure_preserves_reason() {
        let registry = registry(&[("memoryUsed", "High")]);
        let sink = Arc::new(RecordingSink::default());

        dispatcher(&registry, &sink).refresh(registry.high_group());

        match sink.result_for("memoryUsed").unwrap() {
            MetricResult::Unavailable(ProbeError::Query(msg)) => {
                assert_eq!(msg, "meminfo unreadable")
            }
            other => panic!("expected Query error, got {other:?}"),
        }
    }

    #[test]
    fn test_multi_device_channels_resolve_independently() {
        let registry = registry(&[("storageUsed", "Medium"), ("storageUsed1", "Medium")]);
        let sink = Arc::new(RecordingSink::default());

        dispatcher(&registry, &sink).refresh(registry.medium_group());

        assert_eq!(
            sink.result_for("storageUsed").unwrap().value(),
            Some(&MetricValue::Count(512))
        );
        assert_eq!(
            sink.result_for("storageUsed1").unwrap().value(),
            Some(&MetricValue::Count(1024))
        );
    }

    #[test]
    fn test_index_ignored_for_simple_metrics() {
        // cpuLoad is not index-aware; a suffixed identifier still resolves
        // the base metric with index 0.
        let registry = registry(&[("cpuLoad7", "High")]);
        let sink = Arc::new(RecordingSink::default());

        dispatcher(&registry, &sink).refresh(registry.high_group());

        assert_eq!(
            sink.result_for("cpuLoad7").unwrap().value(),
            Some(&MetricValue::Decimal(55.0))
        );
    }

    #[test]
    fn test_on_demand_refresh_bypasses_subscription() {
        let registry = registry(&[("cpuLoad", "High")]);
        registry.set_subscribed("cpuLoad", false);
        let sink = Arc::new(RecordingSink::default());

        let dispatcher = dispatcher(&registry, &sink);
        let channel = registry.channel("cpuLoad").unwrap();
        dispatcher.refresh_channel(channel);

        assert_eq!(sink.published().len(), 1);
    }

    #[test]
    fn test_empty_group_publishes_nothing() {
        let registry = registry(&[("cpuLoad", "High")]);
        let sink = Arc::new(RecordingSink::default());

        dispatcher(&registry, &sink).refresh(registry.low_group());

        assert!(sink.published().is_empty());
        // Groups themselves report their configuration.
        assert_eq!(registry.low_group().priority(), Priority::Low);
        assert_eq!(registry.low_group().interval(), Duration::ZERO);
    }
}
