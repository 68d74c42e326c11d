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

//! Priority-tiered polling engine for machine telemetry.
//!
//! Channels (subscribable metric instances, possibly device-indexed) are
//! partitioned into High/Medium/Low refresh tiers, each driven by its own
//! timer thread. Every pass resolves each subscribed channel through the
//! [`MetricCatalog`](catalog::MetricCatalog) to a
//! [`SystemProbe`](vitals_core::SystemProbe) query and forwards the
//! result, or an explicit unavailable state, to the host's publish sink.
//! Hosts normally interact through [`PollingService`](service::PollingService).

pub mod catalog;
pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod probe;
pub mod registry;
pub mod scheduler;
pub mod service;

pub use catalog::{CatalogEntry, MetricCatalog};
pub use channel::{split_device_index, Channel, Priority};
pub use config::{ChannelConfig, ConfigError, PollingConfig};
pub use dispatcher::RefreshDispatcher;
pub use probe::SysinfoProbe;
pub use registry::{ChannelRegistry, PriorityGroup};
pub use scheduler::{PriorityScheduler, ScheduleHandle, SchedulerHandles, DEFAULT_WARMUP_DELAY};
pub use service::PollingService;
