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

//! Service facade tying registry, dispatcher and scheduler together.

use std::sync::Arc;
use std::time::Duration;

use vitals_core::{PublishSink, SubscriptionQuery, SystemProbe};

use crate::catalog::MetricCatalog;
use crate::config::{ConfigError, PollingConfig};
use crate::dispatcher::RefreshDispatcher;
use crate::registry::ChannelRegistry;
use crate::scheduler::{PriorityScheduler, SchedulerHandles, DEFAULT_WARMUP_DELAY};

/// The polling engine as a host-facing service.
///
/// Construction validates the configuration and builds the channel
/// registry (fail-fast: an invalid configuration never reaches the
/// scheduler). `start` spawns the tier schedules; `stop` (or dropping the
/// service) cancels them, letting an in-flight pass finish.
pub struct PollingService {
    registry: Arc<ChannelRegistry>,
    dispatcher: Arc<RefreshDispatcher>,
    warmup: Duration,
    handles: Option<SchedulerHandles>,
}

impl PollingService {
    /// Creates a service over the standard metric catalog.
    pub fn new(
        config: &PollingConfig,
        probe: Arc<dyn SystemProbe>,
        sink: Arc<dyn PublishSink>,
    ) -> Result<Self, ConfigError> {
        Self::with_catalog(config, Arc::new(MetricCatalog::standard()), probe, sink)
    }

    /// Creates a service over a custom catalog (hosts extending the
    /// metric surface, or tests shrinking it).
    pub fn with_catalog(
        config: &PollingConfig,
        catalog: Arc<MetricCatalog>,
        probe: Arc<dyn SystemProbe>,
        sink: Arc<dyn PublishSink>,
    ) -> Result<Self, ConfigError> {
        let registry = Arc::new(ChannelRegistry::build(config)?);
        let dispatcher = Arc::new(RefreshDispatcher::new(
            catalog,
            probe,
            sink,
            Arc::clone(&registry) as Arc<dyn SubscriptionQuery>,
        ));
        Ok(Self {
            registry,
            dispatcher,
            warmup: DEFAULT_WARMUP_DELAY,
            handles: None,
        })
    }

    /// Overrides the warm-up delay before the first pass of every tier.
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    /// Spawns the tier schedules. Calling `start` on a running service is
    /// a no-op.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        if self.handles.is_some() {
            return Ok(());
        }
        let scheduler = PriorityScheduler::with_warmup(Arc::clone(&self.dispatcher), self.warmup);
        let handles = scheduler.start(
            Arc::clone(self.registry.high_group()),
            Arc::clone(self.registry.medium_group()),
            Arc::clone(self.registry.low_group()),
        )?;
        self.handles = Some(handles);
        log::debug!("Polling service started");
        Ok(())
    }

    /// Returns `true` if the tier schedules are running.
    pub fn is_running(&self) -> bool {
        self.handles.is_some()
    }

    /// Cancels all pending tier firings and joins their threads.
    pub fn stop(&mut self) {
        if let Some(mut handles) = self.handles.take() {
            handles.stop();
            log::debug!("Polling service stopped");
        }
    }

    /// Refreshes a single channel immediately, outside any schedule
    /// (host-driven REFRESH). Returns `false` if no such channel is
    /// configured.
    pub fn refresh_channel(&self, channel_id: &str) -> bool {
        match self.registry.channel(channel_id) {
            Some(channel) => {
                self.dispatcher.refresh_channel(channel);
                true
            }
            None => false,
        }
    }

    /// Toggles a channel's subscribed flag. Returns `false` if no such
    /// channel is configured.
    pub fn set_subscribed(&self, channel_id: &str, subscribed: bool) -> bool {
        self.registry.set_subscribed(channel_id, subscribed)
    }

    /// The channel registry backing this service.
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }
}

impl Drop for PollingService {
    fn drop(&mut self) {
        self.stop();
    }
}
