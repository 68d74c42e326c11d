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

//! Per-tier timer threads driving refresh passes.
//!
//! Each tier runs on its own thread, so a slow pass in one tier never
//! stalls the others. Recurring tiers fire at a fixed rate: the next pass
//! is due one interval after the *start* of the previous one, and an
//! overrunning pass simply skips the sleep instead of postponing its
//! successor. Passes of the same tier are not mutually excluded against
//! their predecessor; probes are required to tolerate concurrent queries.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::channel::Priority;
use crate::config::ConfigError;
use crate::dispatcher::RefreshDispatcher;
use crate::registry::PriorityGroup;

/// Delay before the first pass of every tier, giving the surrounding
/// system time to finish wiring subscriptions before anything is
/// published.
pub const DEFAULT_WARMUP_DELAY: Duration = Duration::from_secs(1);

/// Sleeps up to `timeout`, waking early on cancellation. Returns `true`
/// if the timeout elapsed and the schedule should keep running.
fn sleep_or_cancel(shutdown: &Receiver<()>, timeout: Duration) -> bool {
    match shutdown.recv_timeout(timeout) {
        Err(RecvTimeoutError::Timeout) => true,
        Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
    }
}

/// Owns one running timer task and the right to cancel it.
///
/// Cancellation is cooperative: it prevents all future firings but lets an
/// in-flight refresh pass finish, joining the thread before returning.
/// Dropping the handle cancels as well.
#[derive(Debug)]
pub struct ScheduleHandle {
    shutdown: Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ScheduleHandle {
    /// Stops the schedule and waits for its thread to finish. Idempotent.
    pub fn cancel(&mut self) {
        // A send failure just means the thread already exited.
        let _ = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    /// Returns `true` if the schedule's thread has exited (a one-shot
    /// schedule that already fired, or a cancelled one).
    pub fn is_finished(&self) -> bool {
        self.thread
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(true)
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The handles of all scheduled tiers, returned by
/// [`PriorityScheduler::start`].
///
/// The Low tier is one-shot and would not need a persistent handle once it
/// has fired, but keeping one allows `stop` to cancel it when shutdown
/// happens before the warm-up delay elapses.
#[derive(Debug)]
pub struct SchedulerHandles {
    high: ScheduleHandle,
    medium: ScheduleHandle,
    low: ScheduleHandle,
}

impl SchedulerHandles {
    /// Cancels all pending firings and joins the tier threads. In-flight
    /// passes are allowed to finish.
    pub fn stop(&mut self) {
        self.high.cancel();
        self.medium.cancel();
        self.low.cancel();
        log::debug!("Priority schedules stopped");
    }
}

impl Drop for SchedulerHandles {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Owns the per-tier scheduling policy: fixed-rate repetition for High and
/// Medium, a single shot for Low, all after a common warm-up delay.
pub struct PriorityScheduler {
    dispatcher: Arc<RefreshDispatcher>,
    warmup: Duration,
}

impl PriorityScheduler {
    /// Creates a scheduler with the default warm-up delay.
    pub fn new(dispatcher: Arc<RefreshDispatcher>) -> Self {
        Self::with_warmup(dispatcher, DEFAULT_WARMUP_DELAY)
    }

    /// Creates a scheduler with a custom warm-up delay.
    pub fn with_warmup(dispatcher: Arc<RefreshDispatcher>, warmup: Duration) -> Self {
        Self { dispatcher, warmup }
    }

    /// Spawns the three tier schedules. Rejects a zero interval on either
    /// recurring tier before any thread is started; equal High and Medium
    /// intervals are legal and simply produce coincident passes.
    pub fn start(
        &self,
        high: Arc<PriorityGroup>,
        medium: Arc<PriorityGroup>,
        low: Arc<PriorityGroup>,
    ) -> Result<SchedulerHandles, ConfigError> {
        for group in [&high, &medium] {
            if group.interval().is_zero() {
                return Err(ConfigError::InvalidInterval {
                    priority: group.priority(),
                    seconds: 0,
                });
            }
        }

        log::debug!(
            "Scheduling {} priority channels at fixed rate {:?}",
            Priority::High,
            high.interval()
        );
        let high_handle = self.spawn_recurring(high);

        log::debug!(
            "Scheduling {} priority channels at fixed rate {:?}",
            Priority::Medium,
            medium.interval()
        );
        let medium_handle = self.spawn_recurring(medium);

        log::debug!("Scheduling one-shot update for {} priority channels", Priority::Low);
        let low_handle = self.spawn_once(low);

        Ok(SchedulerHandles {
            high: high_handle,
            medium: medium_handle,
            low: low_handle,
        })
    }

    fn spawn_recurring(&self, group: Arc<PriorityGroup>) -> ScheduleHandle {
        let (shutdown_tx, shutdown_rx) = unbounded();
        let dispatcher = Arc::clone(&self.dispatcher);
        let warmup = self.warmup;

        let thread = thread::spawn(move || {
            if !sleep_or_cancel(&shutdown_rx, warmup) {
                return;
            }
            loop {
                let pass_started = Instant::now();
                dispatcher.refresh(&group);
                let remaining = group.interval().saturating_sub(pass_started.elapsed());
                if !sleep_or_cancel(&shutdown_rx, remaining) {
                    break;
                }
            }
        });

        ScheduleHandle {
            shutdown: shutdown_tx,
            thread: Some(thread),
        }
    }

    fn spawn_once(&self, group: Arc<PriorityGroup>) -> ScheduleHandle {
        let (shutdown_tx, shutdown_rx) = unbounded();
        let dispatcher = Arc::clone(&self.dispatcher);
        let warmup = self.warmup;

        let thread = thread::spawn(move || {
            if sleep_or_cancel(&shutdown_rx, warmup) {
                dispatcher.refresh(&group);
            }
        });

        ScheduleHandle {
            shutdown: shutdown_tx,
            thread: Some(thread),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use vitals_core::probe::ProbeResult;
    use vitals_core::{MetricResult, MetricValue, PublishSink, SubscriptionQuery, SystemProbe};

    use crate::catalog::MetricCatalog;
    use crate::channel::Channel;

    struct StubProbe;

    impl SystemProbe for StubProbe {
        fn cpu_load(&self) -> ProbeResult<MetricValue> {
            Ok(MetricValue::Decimal(1.0))
        }
    }

    #[derive(Default)]
    struct CountingSink {
        publishes: AtomicUsize,
    }

    impl CountingSink {
        fn count(&self) -> usize {
            self.publishes.load(Ordering::SeqCst)
        }
    }

    impl PublishSink for CountingSink {
        fn publish(&self, _channel_id: &str, _result: MetricResult) {
            self.publishes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct AlwaysSubscribed;

    impl SubscriptionQuery for AlwaysSubscribed {
        fn is_subscribed(&self, _channel_id: &str) -> bool {
            true
        }
    }

    fn group(priority: Priority, interval: Duration, ids: &[&str]) -> Arc<PriorityGroup> {
        let channels = ids
            .iter()
            .map(|id| Arc::new(Channel::new(*id, priority)))
            .collect();
        Arc::new(PriorityGroup::new(priority, interval, channels))
    }

    fn scheduler(warmup: Duration, sink: &Arc<CountingSink>) -> PriorityScheduler {
        let dispatcher = Arc::new(RefreshDispatcher::new(
            Arc::new(MetricCatalog::standard()),
            Arc::new(StubProbe),
            Arc::clone(sink) as Arc<dyn PublishSink>,
            Arc::new(AlwaysSubscribed),
        ));
        PriorityScheduler::with_warmup(dispatcher, warmup)
    }

    #[test]
    fn test_zero_interval_rejected_before_spawning() {
        let sink = Arc::new(CountingSink::default());
        let scheduler = scheduler(Duration::from_millis(1), &sink);

        let result = scheduler.start(
            group(Priority::High, Duration::ZERO, &["cpuLoad"]),
            group(Priority::Medium, Duration::from_secs(1), &[]),
            group(Priority::Low, Duration::ZERO, &[]),
        );

        assert_eq!(
            result.err(),
            Some(ConfigError::InvalidInterval {
                priority: Priority::High,
                seconds: 0,
            })
        );
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_stop_before_warmup_means_zero_passes() {
        let sink = Arc::new(CountingSink::default());
        let scheduler = scheduler(Duration::from_millis(250), &sink);

        let mut handles = scheduler
            .start(
                group(Priority::High, Duration::from_millis(10), &["cpuLoad"]),
                group(Priority::Medium, Duration::from_millis(10), &["cpuLoad"]),
                group(Priority::Low, Duration::ZERO, &["cpuLoad"]),
            )
            .unwrap();

        // Cancel well before the warm-up delay elapses.
        handles.stop();
        thread::sleep(Duration::from_millis(400));
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_low_tier_fires_exactly_once() {
        let sink = Arc::new(CountingSink::default());
        let scheduler = scheduler(Duration::from_millis(5), &sink);

        let mut handles = scheduler
            .start(
                group(Priority::High, Duration::from_secs(60), &[]),
                group(Priority::Medium, Duration::from_secs(60), &[]),
                group(Priority::Low, Duration::ZERO, &["cpuName"]),
            )
            .unwrap();

        thread::sleep(Duration::from_millis(200));
        // Empty High/Medium groups contribute no publishes; the single
        // publish must come from the one-shot Low pass.
        assert_eq!(sink.count(), 1);
        assert!(handles.low.is_finished());
        handles.stop();
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn test_recurring_tier_repeats_at_interval() {
        let sink = Arc::new(CountingSink::default());
        let scheduler = scheduler(Duration::from_millis(5), &sink);

        let mut handles = scheduler
            .start(
                group(Priority::High, Duration::from_millis(25), &["cpuLoad"]),
                group(Priority::Medium, Duration::from_secs(60), &[]),
                group(Priority::Low, Duration::ZERO, &[]),
            )
            .unwrap();

        thread::sleep(Duration::from_millis(300));
        handles.stop();

        // ~12 passes expected in 300ms; demand a conservative lower bound
        // to stay robust on slow CI machines.
        let count = sink.count();
        assert!(count >= 3, "expected at least 3 passes, got {count}");
    }

    #[test]
    fn test_stop_prevents_further_passes() {
        let sink = Arc::new(CountingSink::default());
        let scheduler = scheduler(Duration::from_millis(5), &sink);

        let mut handles = scheduler
            .start(
                group(Priority::High, Duration::from_millis(20), &["cpuLoad"]),
                group(Priority::Medium, Duration::from_secs(60), &[]),
                group(Priority::Low, Duration::ZERO, &[]),
            )
            .unwrap();

        thread::sleep(Duration::from_millis(100));
        handles.stop();
        let after_stop = sink.count();
        assert!(after_stop >= 1);

        thread::sleep(Duration::from_millis(100));
        assert_eq!(sink.count(), after_stop);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let sink = Arc::new(CountingSink::default());
        let scheduler = scheduler(Duration::from_millis(1), &sink);

        let mut handles = scheduler
            .start(
                group(Priority::High, Duration::from_millis(20), &[]),
                group(Priority::Medium, Duration::from_millis(20), &[]),
                group(Priority::Low, Duration::ZERO, &[]),
            )
            .unwrap();

        handles.stop();
        handles.stop();
        assert!(handles.high.is_finished());
        assert!(handles.medium.is_finished());
    }
}
