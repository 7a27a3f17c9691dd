//! Lifecycle Metrics
//!
//! Atomic counters updated by the host driver. Reads are snapshots; no
//! ordering between counters is implied.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct LifecycleMetrics {
    pub instances_created: AtomicU64,
    pub allocation_failures: AtomicU64,
    pub messages_delivered: AtomicU64,
    pub replies_queued: AtomicU64,
    pub send_failures: AtomicU64,
    pub release_requests: AtomicU64,
    pub instances_released: AtomicU64,
}

impl LifecycleMetrics {
    pub fn record_created(&self) {
        self.instances_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_allocation_failure(&self) {
        self.allocation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.messages_delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one send attempt
    pub fn record_send(&self, success: bool) {
        if success {
            self.replies_queued.fetch_add(1, Ordering::Relaxed);
        } else {
            self.send_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_release_request(&self) {
        self.release_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_released(&self) {
        self.instances_released.fetch_add(1, Ordering::Relaxed);
    }

    /// Get metrics snapshot
    pub fn stats(&self) -> LifecycleStats {
        LifecycleStats {
            instances_created: self.instances_created.load(Ordering::Relaxed),
            allocation_failures: self.allocation_failures.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            replies_queued: self.replies_queued.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            release_requests: self.release_requests.load(Ordering::Relaxed),
            instances_released: self.instances_released.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`LifecycleMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleStats {
    pub instances_created: u64,
    pub allocation_failures: u64,
    pub messages_delivered: u64,
    pub replies_queued: u64,
    pub send_failures: u64,
    pub release_requests: u64,
    pub instances_released: u64,
}

impl LifecycleStats {
    /// Instances created and not yet released
    pub fn live_instances(&self) -> u64 {
        self.instances_created.saturating_sub(self.instances_released)
    }
}
