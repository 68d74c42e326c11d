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

//! Outbound capabilities implemented by the host application.

use crate::metrics::MetricResult;

/// Transport that delivers a refreshed result to consumers.
///
/// The engine makes at most one `publish` call per channel per refresh pass.
/// Implementations must tolerate concurrent calls from independent tier
/// threads.
pub trait PublishSink: Send + Sync {
    /// Delivers the result of one refresh attempt for the given channel.
    fn publish(&self, channel_id: &str, result: MetricResult);
}

/// Answers whether any consumer currently wants a channel's value.
///
/// Read immediately before each per-channel refresh; staleness by one tick
/// is acceptable, so implementations only need an atomic read, not a lock
/// held across the pass.
pub trait SubscriptionQuery: Send + Sync {
    /// Returns `true` if the channel has at least one active subscriber.
    fn is_subscribed(&self, channel_id: &str) -> bool;
}
