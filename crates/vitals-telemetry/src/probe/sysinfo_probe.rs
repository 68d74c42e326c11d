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

//! `sysinfo`-based implementation of the [`SystemProbe`] capability.
//!
//! Sizes are reported in MiB, ratios in percent rounded to two decimals
//! and the uptime in minutes. Metrics `sysinfo` cannot observe (battery
//! state, display EDID, CPU voltage, fan speeds, physical drive identity)
//! keep their `Unsupported` default, so consumers see an explicit
//! unavailable state instead of a fabricated value.

use std::sync::{Mutex, MutexGuard};

use sysinfo::{Components, Disks, Networks, System};

use vitals_core::probe::{ProbeError, ProbeResult};
use vitals_core::{MetricValue, SystemProbe};

const MIB: u64 = 1024 * 1024;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Free share of `total`, in percent. Zero when the total itself is zero
/// (e.g. a system without swap).
fn percent(part: u64, total: u64) -> f64 {
    if total > 0 {
        round2(part as f64 / total as f64 * 100.0)
    } else {
        0.0
    }
}

fn nth<T>(devices: &[T], index: usize) -> ProbeResult<&T> {
    devices.get(index).ok_or(ProbeError::DeviceNotFound { index })
}

/// A probe over the `sysinfo` crate.
///
/// The CPU/memory state is kept across queries behind a mutex because CPU
/// usage is a delta measurement: the constructor takes the baseline sample
/// and every query refreshes from there. Device lists (disks, networks,
/// thermal components) are re-enumerated per query so hotplugged devices
/// appear without a restart.
pub struct SysinfoProbe {
    system: Mutex<System>,
}

impl SysinfoProbe {
    /// Creates the probe and takes the baseline CPU/memory sample.
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self {
            system: Mutex::new(system),
        }
    }

    fn system(&self) -> ProbeResult<MutexGuard<'_, System>> {
        self.system
            .lock()
            .map_err(|_| ProbeError::Query("probe state lock poisoned".to_string()))
    }

    /// Network interfaces sorted by name. `sysinfo` enumerates interfaces
    /// in hash order, which would make device indices unstable between
    /// passes.
    fn sorted_networks(networks: &Networks) -> Vec<(&String, &sysinfo::NetworkData)> {
        let mut interfaces: Vec<_> = networks.iter().collect();
        interfaces.sort_by(|(a, _), (b, _)| a.cmp(b));
        interfaces
    }

    fn network_value<F>(&self, index: usize, read: F) -> ProbeResult<MetricValue>
    where
        F: FnOnce(&sysinfo::NetworkData, &str) -> ProbeResult<MetricValue>,
    {
        let networks = Networks::new_with_refreshed_list();
        let interfaces = Self::sorted_networks(&networks);
        let (name, data) = *nth(&interfaces, index)?;
        read(data, name.as_str())
    }

    fn storage_value<F>(&self, index: usize, read: F) -> ProbeResult<MetricValue>
    where
        F: FnOnce(&sysinfo::Disk) -> ProbeResult<MetricValue>,
    {
        let disks = Disks::new_with_refreshed_list();
        read(nth(disks.list(), index)?)
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe for SysinfoProbe {
    fn os_family(&self) -> ProbeResult<MetricValue> {
        System::name()
            .map(MetricValue::Text)
            .ok_or_else(|| ProbeError::Query("operating system name is not available".to_string()))
    }

    fn os_manufacturer(&self) -> ProbeResult<MetricValue> {
        Ok(MetricValue::Text(System::distribution_id()))
    }

    fn os_version(&self) -> ProbeResult<MetricValue> {
        System::long_os_version()
            .map(MetricValue::Text)
            .ok_or_else(|| ProbeError::Query("operating system version is not available".to_string()))
    }

    fn cpu_name(&self) -> ProbeResult<MetricValue> {
        let system = self.system()?;
        let cpu = system
            .cpus()
            .first()
            .ok_or_else(|| ProbeError::Query("no CPU reported by the system".to_string()))?;
        Ok(MetricValue::Text(cpu.brand().to_string()))
    }

    fn cpu_description(&self) -> ProbeResult<MetricValue> {
        let system = self.system()?;
        let cpu = system
            .cpus()
            .first()
            .ok_or_else(|| ProbeError::Query("no CPU reported by the system".to_string()))?;
        Ok(MetricValue::Text(format!(
            "Model: {}, vendor: {}, architecture: {}",
            cpu.brand(),
            cpu.vendor_id(),
            System::cpu_arch()
        )))
    }

    fn cpu_load(&self) -> ProbeResult<MetricValue> {
        let mut system = self.system()?;
        system.refresh_cpu_usage();
        Ok(MetricValue::Decimal(round2(system.global_cpu_usage() as f64)))
    }

    fn cpu_load_one(&self) -> ProbeResult<MetricValue> {
        Ok(MetricValue::Decimal(round2(System::load_average().one)))
    }

    fn cpu_load_five(&self) -> ProbeResult<MetricValue> {
        Ok(MetricValue::Decimal(round2(System::load_average().five)))
    }

    fn cpu_load_fifteen(&self) -> ProbeResult<MetricValue> {
        Ok(MetricValue::Decimal(round2(System::load_average().fifteen)))
    }

    fn cpu_uptime(&self) -> ProbeResult<MetricValue> {
        Ok(MetricValue::Decimal(round2(System::uptime() as f64 / 60.0)))
    }

    fn cpu_physical_cores(&self) -> ProbeResult<MetricValue> {
        System::physical_core_count()
            .map(|count| MetricValue::Count(count as u64))
            .ok_or_else(|| ProbeError::Query("physical core count is not available".to_string()))
    }

    fn cpu_logical_cores(&self) -> ProbeResult<MetricValue> {
        let system = self.system()?;
        Ok(MetricValue::Count(system.cpus().len() as u64))
    }

    fn memory_total(&self) -> ProbeResult<MetricValue> {
        let mut system = self.system()?;
        system.refresh_memory();
        Ok(MetricValue::Count(system.total_memory() / MIB))
    }

    fn memory_available(&self) -> ProbeResult<MetricValue> {
        let mut system = self.system()?;
        system.refresh_memory();
        Ok(MetricValue::Count(system.available_memory() / MIB))
    }

    fn memory_used(&self) -> ProbeResult<MetricValue> {
        let mut system = self.system()?;
        system.refresh_memory();
        Ok(MetricValue::Count(system.used_memory() / MIB))
    }

    fn memory_available_percent(&self) -> ProbeResult<MetricValue> {
        let mut system = self.system()?;
        system.refresh_memory();
        Ok(MetricValue::Decimal(percent(
            system.available_memory(),
            system.total_memory(),
        )))
    }

    fn swap_total(&self) -> ProbeResult<MetricValue> {
        let mut system = self.system()?;
        system.refresh_memory();
        Ok(MetricValue::Count(system.total_swap() / MIB))
    }

    fn swap_available(&self) -> ProbeResult<MetricValue> {
        let mut system = self.system()?;
        system.refresh_memory();
        let available = system.total_swap().saturating_sub(system.used_swap());
        Ok(MetricValue::Count(available / MIB))
    }

    fn swap_used(&self) -> ProbeResult<MetricValue> {
        let mut system = self.system()?;
        system.refresh_memory();
        Ok(MetricValue::Count(system.used_swap() / MIB))
    }

    fn swap_available_percent(&self) -> ProbeResult<MetricValue> {
        let mut system = self.system()?;
        system.refresh_memory();
        let free = system.total_swap().saturating_sub(system.used_swap());
        Ok(MetricValue::Decimal(percent(free, system.total_swap())))
    }

    fn storage_name(&self, index: usize) -> ProbeResult<MetricValue> {
        self.storage_value(index, |disk| {
            Ok(MetricValue::Text(disk.name().to_string_lossy().into_owned()))
        })
    }

    fn storage_type(&self, index: usize) -> ProbeResult<MetricValue> {
        self.storage_value(index, |disk| {
            Ok(MetricValue::Text(
                disk.file_system().to_string_lossy().into_owned(),
            ))
        })
    }

    fn storage_description(&self, index: usize) -> ProbeResult<MetricValue> {
        self.storage_value(index, |disk| {
            Ok(MetricValue::Text(format!(
                "{:?} volume mounted at {}",
                disk.kind(),
                disk.mount_point().display()
            )))
        })
    }

    fn storage_total(&self, index: usize) -> ProbeResult<MetricValue> {
        self.storage_value(index, |disk| {
            Ok(MetricValue::Count(disk.total_space() / MIB))
        })
    }

    fn storage_available(&self, index: usize) -> ProbeResult<MetricValue> {
        self.storage_value(index, |disk| {
            Ok(MetricValue::Count(disk.available_space() / MIB))
        })
    }

    fn storage_used(&self, index: usize) -> ProbeResult<MetricValue> {
        self.storage_value(index, |disk| {
            let used = disk.total_space().saturating_sub(disk.available_space());
            Ok(MetricValue::Count(used / MIB))
        })
    }

    fn storage_available_percent(&self, index: usize) -> ProbeResult<MetricValue> {
        self.storage_value(index, |disk| {
            Ok(MetricValue::Decimal(percent(
                disk.available_space(),
                disk.total_space(),
            )))
        })
    }

    fn network_name(&self, index: usize) -> ProbeResult<MetricValue> {
        self.network_value(index, |_, name| Ok(MetricValue::Text(name.to_string())))
    }

    fn network_display_name(&self, index: usize) -> ProbeResult<MetricValue> {
        // sysinfo exposes no separate adapter name; the interface name is
        // the best normalized value available.
        self.network_value(index, |_, name| Ok(MetricValue::Text(name.to_string())))
    }

    fn network_ip(&self, index: usize) -> ProbeResult<MetricValue> {
        self.network_value(index, |data, name| {
            data.ip_networks()
                .iter()
                .map(|ip| ip.addr)
                .find(|addr| addr.is_ipv4())
                .map(|addr| MetricValue::Text(addr.to_string()))
                .ok_or_else(|| {
                    ProbeError::Query(format!("interface {name} has no IPv4 address"))
                })
        })
    }

    fn network_mac(&self, index: usize) -> ProbeResult<MetricValue> {
        self.network_value(index, |data, _| {
            Ok(MetricValue::Text(data.mac_address().to_string()))
        })
    }

    fn network_packets_sent(&self, index: usize) -> ProbeResult<MetricValue> {
        self.network_value(index, |data, _| {
            Ok(MetricValue::Count(data.total_packets_transmitted()))
        })
    }

    fn network_packets_received(&self, index: usize) -> ProbeResult<MetricValue> {
        self.network_value(index, |data, _| {
            Ok(MetricValue::Count(data.total_packets_received()))
        })
    }

    fn network_data_sent(&self, index: usize) -> ProbeResult<MetricValue> {
        self.network_value(index, |data, _| {
            Ok(MetricValue::Count(data.total_transmitted() / MIB))
        })
    }

    fn network_data_received(&self, index: usize) -> ProbeResult<MetricValue> {
        self.network_value(index, |data, _| {
            Ok(MetricValue::Count(data.total_received() / MIB))
        })
    }

    fn sensors_cpu_temperature(&self) -> ProbeResult<MetricValue> {
        let components = Components::new_with_refreshed_list();
        let mut max_temp: Option<f32> = None;

        for component in &components {
            let label = component.label().to_lowercase();
            if label.contains("cpu") || label.contains("core") || label.contains("tctl") {
                if let Some(temp) = component.temperature() {
                    max_temp = Some(max_temp.map_or(temp, |current| current.max(temp)));
                }
            }
        }

        max_temp
            .map(|temp| MetricValue::Decimal(round2(temp as f64)))
            .ok_or_else(|| ProbeError::Query("no CPU temperature sensor found".to_string()))
    }
}
