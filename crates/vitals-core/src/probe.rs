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

//! The [`SystemProbe`] capability: one query method per base metric name.
//!
//! Index-aware queries take a zero-based device index to distinguish multiple
//! instances of the same device kind (several disks, several network
//! interfaces). Every method defaults to [`ProbeError::Unsupported`], so a
//! probe implementation only overrides what its backend can actually observe
//! and consumers still get an explicit unavailable state for the rest.

use std::fmt::Display;

/// A specialized `Result` type for probe queries.
pub type ProbeResult<T> = Result<T, ProbeError>;

use crate::metrics::MetricValue;

/// An error produced while querying the host machine for one metric.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// No device exists at the requested index.
    DeviceNotFound {
        /// The zero-based index that was requested.
        index: usize,
    },
    /// The probe backend cannot observe this metric at all.
    Unsupported(&'static str),
    /// The query itself failed (I/O error, missing OS facility, ...).
    Query(String),
}

impl Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::DeviceNotFound { index } => {
                write!(f, "device with index {index} can not be found")
            }
            ProbeError::Unsupported(metric) => {
                write!(f, "metric {metric} is not supported by this probe")
            }
            ProbeError::Query(msg) => write!(f, "query failed: {msg}"),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Capability trait for querying the host machine, one method per base
/// metric name.
///
/// Implementations must be safe to call concurrently: refresh passes for
/// different priority tiers run on independent timer threads and may query
/// the same probe at the same time. Calls are treated as synchronous,
/// bounded-latency operations; a probe that can hang should fail fast
/// instead.
#[allow(unused_variables)]
pub trait SystemProbe: Send + Sync {
    // Operating system identity.

    /// OS family name (e.g. "Linux", "Windows").
    fn os_family(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("osFamily"))
    }
    /// OS manufacturer or distribution identifier.
    fn os_manufacturer(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("osManufacturer"))
    }
    /// OS version string.
    fn os_version(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("osVersion"))
    }

    // CPU.

    /// CPU model name.
    fn cpu_name(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("cpuName"))
    }
    /// Human-readable CPU description (vendor, architecture, ...).
    fn cpu_description(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("cpuDescription"))
    }
    /// Current system CPU load in percent (0-100).
    fn cpu_load(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("cpuLoad"))
    }
    /// One-minute load average.
    fn cpu_load_one(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("cpuLoadOne"))
    }
    /// Five-minute load average.
    fn cpu_load_five(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("cpuLoadFive"))
    }
    /// Fifteen-minute load average.
    fn cpu_load_fifteen(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("cpuLoadFifteen"))
    }
    /// System uptime in minutes.
    fn cpu_uptime(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("cpuUptime"))
    }
    /// Number of live threads on the system.
    fn cpu_threads(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("cpuThreads"))
    }
    /// Number of physical processor cores.
    fn cpu_physical_cores(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("cpuPhysicalCores"))
    }
    /// Number of logical processors.
    fn cpu_logical_cores(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("cpuLogicalCores"))
    }

    // Memory, in MiB / percent.

    /// Total physical memory in MiB.
    fn memory_total(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("memoryTotal"))
    }
    /// Available physical memory in MiB.
    fn memory_available(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("memoryAvailable"))
    }
    /// Used physical memory in MiB.
    fn memory_used(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("memoryUsed"))
    }
    /// Available physical memory as a percentage of the total.
    fn memory_available_percent(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("memoryAvailablePercent"))
    }

    // Swap, in MiB / percent.

    /// Total swap space in MiB.
    fn swap_total(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("swapTotal"))
    }
    /// Available swap space in MiB.
    fn swap_available(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("swapAvailable"))
    }
    /// Used swap space in MiB.
    fn swap_used(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("swapUsed"))
    }
    /// Available swap space as a percentage of the total.
    fn swap_available_percent(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("swapAvailablePercent"))
    }

    // Logical storage volumes, index-aware.

    /// Name of the storage volume at `index`.
    fn storage_name(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("storageName"))
    }
    /// Filesystem type of the storage volume at `index`.
    fn storage_type(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("storageType"))
    }
    /// Description (e.g. mount point) of the storage volume at `index`.
    fn storage_description(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("storageDescription"))
    }
    /// Total capacity in MiB of the storage volume at `index`.
    fn storage_total(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("storageTotal"))
    }
    /// Available space in MiB on the storage volume at `index`.
    fn storage_available(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("storageAvailable"))
    }
    /// Used space in MiB on the storage volume at `index`.
    fn storage_used(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("storageUsed"))
    }
    /// Available space as a percentage of the volume capacity.
    fn storage_available_percent(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("storageAvailablePercent"))
    }

    // Physical drives, index-aware.

    /// Name of the physical drive at `index`.
    fn drive_name(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("driveName"))
    }
    /// Model of the physical drive at `index`.
    fn drive_model(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("driveModel"))
    }
    /// Serial number of the physical drive at `index`.
    fn drive_serial(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("driveSerial"))
    }

    // Network interfaces, index-aware.

    /// System name of the network interface at `index`.
    fn network_name(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("networkName"))
    }
    /// Human-readable adapter name of the network interface at `index`.
    fn network_display_name(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("networkDisplayName"))
    }
    /// Primary IPv4 address of the network interface at `index`.
    fn network_ip(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("networkIp"))
    }
    /// MAC address of the network interface at `index`.
    fn network_mac(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("networkMac"))
    }
    /// Total packets sent on the network interface at `index`.
    fn network_packets_sent(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("networkPacketsSent"))
    }
    /// Total packets received on the network interface at `index`.
    fn network_packets_received(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("networkPacketsReceived"))
    }
    /// Total data sent in MiB on the network interface at `index`.
    fn network_data_sent(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("networkDataSent"))
    }
    /// Total data received in MiB on the network interface at `index`.
    fn network_data_received(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("networkDataReceived"))
    }

    // Power sources, index-aware.

    /// Name of the battery at `index`.
    fn battery_name(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("batteryName"))
    }
    /// Remaining capacity in percent of the battery at `index`.
    fn battery_remaining_capacity(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("batteryRemainingCapacity"))
    }
    /// Estimated remaining time in minutes of the battery at `index`.
    fn battery_remaining_time(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("batteryRemainingTime"))
    }

    // Sensors.

    /// CPU temperature in degrees Celsius.
    fn sensors_cpu_temperature(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("sensorsCpuTemperature"))
    }
    /// CPU voltage in Volts.
    fn sensors_cpu_voltage(&self) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("sensorsCpuVoltage"))
    }
    /// Speed in RPM of the fan at `index`.
    fn sensors_fan_speed(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("sensorsFanSpeed"))
    }

    // Displays, index-aware.

    /// EDID summary of the display at `index`.
    fn display_information(&self, index: usize) -> ProbeResult<MetricValue> {
        Err(ProbeError::Unsupported("displayInformation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PartialProbe;

    impl SystemProbe for PartialProbe {
        fn cpu_load(&self) -> ProbeResult<MetricValue> {
            Ok(MetricValue::Decimal(12.5))
        }
    }

    #[test]
    fn test_overridden_method_answers() {
        let probe = PartialProbe;
        assert_eq!(probe.cpu_load().unwrap(), MetricValue::Decimal(12.5));
    }

    #[test]
    fn test_unimplemented_method_is_unsupported() {
        let probe = PartialProbe;
        match probe.battery_name(0) {
            Err(ProbeError::Unsupported(metric)) => assert_eq!(metric, "batteryName"),
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = ProbeError::DeviceNotFound { index: 3 };
        assert_eq!(err.to_string(), "device with index 3 can not be found");
    }
}
