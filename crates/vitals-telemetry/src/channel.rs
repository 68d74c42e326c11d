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

//! Subscribable metric channels and their refresh-priority tiers.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

/// Refresh-priority class of a channel, controlling its polling cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Refreshed frequently (e.g. CPU load, free memory).
    High,
    /// Refreshed at a slower cadence (e.g. storage used, battery capacity).
    Medium,
    /// Mostly static information, refreshed exactly once (e.g. CPU name).
    Low,
}

impl Priority {
    /// Parses the configuration label for a tier. Returns `None` for
    /// anything other than the three known labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "High" => Some(Priority::High),
            "Medium" => Some(Priority::Medium),
            "Low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

/// Splits a channel identifier into its base metric name and device index.
///
/// The device index is an optional trailing digit run: `storageUsed2` names
/// the `storageUsed` metric of the third storage volume (indices are
/// zero-based). Identifiers without trailing digits address device 0 and
/// are used unmodified as the base name.
///
/// This convention makes base metric names that end in a digit ambiguous,
/// so the catalog must never register one (see
/// [`MetricCatalog`](crate::catalog::MetricCatalog)). A digit run too large
/// for `usize` is treated as part of the name rather than an index.
pub fn split_device_index(channel_id: &str) -> (&str, usize) {
    let base = channel_id.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &channel_id[base.len()..];
    if digits.is_empty() {
        return (channel_id, 0);
    }
    match digits.parse::<usize>() {
        Ok(index) => (base, index),
        Err(_) => (channel_id, 0),
    }
}

/// One subscribable metric instance, possibly device-indexed.
///
/// Channels are created once at startup and immutable afterwards, except
/// for the subscribed flag, which the publish layer may toggle while
/// refresh passes are running. The flag is atomic; a pass reading a value
/// one toggle stale is acceptable.
#[derive(Debug)]
pub struct Channel {
    id: String,
    base_name: String,
    device_index: usize,
    priority: Priority,
    subscribed: AtomicBool,
}

impl Channel {
    /// Creates a channel, deriving the base metric name and device index
    /// from the identifier. New channels start subscribed.
    pub fn new(id: impl Into<String>, priority: Priority) -> Self {
        let id = id.into();
        let (base_name, device_index) = split_device_index(&id);
        let base_name = base_name.to_string();
        Self {
            id,
            base_name,
            device_index,
            priority,
            subscribed: AtomicBool::new(true),
        }
    }

    /// The full channel identifier, as configured.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The base metric name used for catalog lookup.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// The zero-based device index addressed by this channel.
    pub fn device_index(&self) -> usize {
        self.device_index
    }

    /// The refresh-priority tier of this channel.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns `true` if any consumer currently wants this channel's value.
    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::Relaxed)
    }

    /// Toggles the subscribed flag. Safe to call concurrently with refresh
    /// passes.
    pub fn set_subscribed(&self, subscribed: bool) {
        self.subscribed.store(subscribed, Ordering::Relaxed);
    }
}
