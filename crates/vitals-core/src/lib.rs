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

//! Foundational crate with the interface contracts of the vitals telemetry
//! engine: metric value and result types, the [`SystemProbe`] capability for
//! querying the host machine, and the outbound [`PublishSink`] /
//! [`SubscriptionQuery`] capabilities implemented by the host application.

pub mod metrics;
pub mod probe;
pub mod sink;

pub use metrics::{MetricResult, MetricValue};
pub use probe::{ProbeError, ProbeResult, SystemProbe};
pub use sink::{PublishSink, SubscriptionQuery};
