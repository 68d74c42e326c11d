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

//! Static table mapping base metric names to probe queries.
//!
//! The catalog is built once at startup and read-only afterwards, so any
//! number of concurrent refresh passes may resolve entries without
//! synchronization. Resolution is a plain data lookup rather than an
//! open-ended conditional, which keeps the metric surface testable and
//! extensible.

use std::collections::HashMap;

use vitals_core::probe::{ProbeResult, SystemProbe};
use vitals_core::MetricValue;

/// A query against the [`SystemProbe`] capability. Entries that are not
/// index-aware receive index 0 and ignore it.
pub type QueryFn = fn(&dyn SystemProbe, usize) -> ProbeResult<MetricValue>;

/// One resolvable metric: how to query it, and whether the device index
/// parsed from a channel identifier should be forwarded.
#[derive(Clone, Copy)]
pub struct CatalogEntry {
    index_aware: bool,
    query: QueryFn,
}

impl CatalogEntry {
    /// An entry for a metric with a single instance; any device index on
    /// the channel identifier is ignored.
    pub fn simple(query: QueryFn) -> Self {
        Self {
            index_aware: false,
            query,
        }
    }

    /// An entry for a metric that exists once per device.
    pub fn indexed(query: QueryFn) -> Self {
        Self {
            index_aware: true,
            query,
        }
    }

    /// Whether the device index from the channel identifier is forwarded
    /// to the probe.
    pub fn is_index_aware(&self) -> bool {
        self.index_aware
    }

    /// Runs the query against the given probe.
    pub fn query(&self, probe: &dyn SystemProbe, index: usize) -> ProbeResult<MetricValue> {
        (self.query)(probe, index)
    }
}

/// Registry of all resolvable base metric names.
#[derive(Default)]
pub struct MetricCatalog {
    entries: HashMap<&'static str, CatalogEntry>,
}

impl MetricCatalog {
    /// Creates an empty catalog. Hosts with custom probes can register
    /// their own entries on top of (or instead of) [`standard`](Self::standard).
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers an entry under a base metric name.
    ///
    /// Invariant: a base name must never end in a decimal digit. Trailing
    /// digits on a channel identifier are reserved for the device index, so
    /// a name like `cpuLoad1` would be resolved as `cpuLoad` on device 1
    /// instead of the intended metric.
    pub fn register(&mut self, base_name: &'static str, entry: CatalogEntry) -> &mut Self {
        debug_assert!(
            !base_name.ends_with(|c: char| c.is_ascii_digit()),
            "base metric name {base_name:?} must not end in a digit"
        );
        self.entries.insert(base_name, entry);
        self
    }

    /// Resolves a base metric name to its entry, if one is registered.
    pub fn resolve(&self, base_name: &str) -> Option<&CatalogEntry> {
        self.entries.get(base_name)
    }

    /// The number of registered metrics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no metric is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// An iterator over the registered base metric names.
    pub fn base_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// The full metric surface of the engine, one entry per
    /// [`SystemProbe`] query.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog
            // Operating system
            .register("osFamily", CatalogEntry::simple(|p, _| p.os_family()))
            .register(
                "osManufacturer",
                CatalogEntry::simple(|p, _| p.os_manufacturer()),
            )
            .register("osVersion", CatalogEntry::simple(|p, _| p.os_version()))
            // CPU
            .register("cpuName", CatalogEntry::simple(|p, _| p.cpu_name()))
            .register(
                "cpuDescription",
                CatalogEntry::simple(|p, _| p.cpu_description()),
            )
            .register("cpuLoad", CatalogEntry::simple(|p, _| p.cpu_load()))
            .register("cpuLoadOne", CatalogEntry::simple(|p, _| p.cpu_load_one()))
            .register(
                "cpuLoadFive",
                CatalogEntry::simple(|p, _| p.cpu_load_five()),
            )
            .register(
                "cpuLoadFifteen",
                CatalogEntry::simple(|p, _| p.cpu_load_fifteen()),
            )
            .register("cpuUptime", CatalogEntry::simple(|p, _| p.cpu_uptime()))
            .register("cpuThreads", CatalogEntry::simple(|p, _| p.cpu_threads()))
            .register(
                "cpuPhysicalCores",
                CatalogEntry::simple(|p, _| p.cpu_physical_cores()),
            )
            .register(
                "cpuLogicalCores",
                CatalogEntry::simple(|p, _| p.cpu_logical_cores()),
            )
            // Memory
            .register("memoryTotal", CatalogEntry::simple(|p, _| p.memory_total()))
            .register(
                "memoryAvailable",
                CatalogEntry::simple(|p, _| p.memory_available()),
            )
            .register("memoryUsed", CatalogEntry::simple(|p, _| p.memory_used()))
            .register(
                "memoryAvailablePercent",
                CatalogEntry::simple(|p, _| p.memory_available_percent()),
            )
            // Swap
            .register("swapTotal", CatalogEntry::simple(|p, _| p.swap_total()))
            .register(
                "swapAvailable",
                CatalogEntry::simple(|p, _| p.swap_available()),
            )
            .register("swapUsed", CatalogEntry::simple(|p, _| p.swap_used()))
            .register(
                "swapAvailablePercent",
                CatalogEntry::simple(|p, _| p.swap_available_percent()),
            )
            // Storage volumes
            .register(
                "storageName",
                CatalogEntry::indexed(|p, i| p.storage_name(i)),
            )
            .register(
                "storageType",
                CatalogEntry::indexed(|p, i| p.storage_type(i)),
            )
            .register(
                "storageDescription",
                CatalogEntry::indexed(|p, i| p.storage_description(i)),
            )
            .register(
                "storageTotal",
                CatalogEntry::indexed(|p, i| p.storage_total(i)),
            )
            .register(
                "storageAvailable",
                CatalogEntry::indexed(|p, i| p.storage_available(i)),
            )
            .register(
                "storageUsed",
                CatalogEntry::indexed(|p, i| p.storage_used(i)),
            )
            .register(
                "storageAvailablePercent",
                CatalogEntry::indexed(|p, i| p.storage_available_percent(i)),
            )
            // Physical drives
            .register("driveName", CatalogEntry::indexed(|p, i| p.drive_name(i)))
            .register("driveModel", CatalogEntry::indexed(|p, i| p.drive_model(i)))
            .register(
                "driveSerial",
                CatalogEntry::indexed(|p, i| p.drive_serial(i)),
            )
            // Network interfaces
            .register(
                "networkName",
                CatalogEntry::indexed(|p, i| p.network_name(i)),
            )
            .register(
                "networkDisplayName",
                CatalogEntry::indexed(|p, i| p.network_display_name(i)),
            )
            .register("networkIp", CatalogEntry::indexed(|p, i| p.network_ip(i)))
            .register("networkMac", CatalogEntry::indexed(|p, i| p.network_mac(i)))
            .register(
                "networkPacketsSent",
                CatalogEntry::indexed(|p, i| p.network_packets_sent(i)),
            )
            .register(
                "networkPacketsReceived",
                CatalogEntry::indexed(|p, i| p.network_packets_received(i)),
            )
            .register(
                "networkDataSent",
                CatalogEntry::indexed(|p, i| p.network_data_sent(i)),
            )
            .register(
                "networkDataReceived",
                CatalogEntry::indexed(|p, i| p.network_data_received(i)),
            )
            // Power sources
            .register(
                "batteryName",
                CatalogEntry::indexed(|p, i| p.battery_name(i)),
            )
            .register(
                "batteryRemainingCapacity",
                CatalogEntry::indexed(|p, i| p.battery_remaining_capacity(i)),
            )
            .register(
                "batteryRemainingTime",
                CatalogEntry::indexed(|p, i| p.battery_remaining_time(i)),
            )
            // Sensors
            .register(
                "sensorsCpuTemperature",
                CatalogEntry::simple(|p, _| p.sensors_cpu_temperature()),
            )
            .register(
                "sensorsCpuVoltage",
                CatalogEntry::simple(|p, _| p.sensors_cpu_voltage()),
            )
            .register(
                "sensorsFanSpeed",
                CatalogEntry::indexed(|p, i| p.sensors_fan_speed(i)),
            )
            // Displays
            .register(
                "displayInformation",
                CatalogEntry::indexed(|p, i| p.display_information(i)),
            );
        catalog
    }
}

impl std::fmt::Debug for MetricCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricCatalog")
            .field("metrics", &self.entries.len())
            .finish()
    }
}
