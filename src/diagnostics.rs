//! Heap probe and panic hook.
//!
//! [`HeapProbe`] is the scheduler's memory collaborator.  ESP-IDF has no
//! collector to run, so "reclaim" means sample the heap, track the low-water
//! mark, and warn when it gets tight.

use log::{debug, warn};

use crate::app::ports::MemoryPort;

/// Free heap below which every sample logs a warning.
pub const LOW_HEAP_BYTES: u32 = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    pub free: u32,
    pub min_free: u32,
}

impl HeapStats {
    #[cfg(target_os = "espidf")]
    pub fn collect() -> Self {
        use esp_idf_svc::sys::*;
        // SAFETY: plain reads of allocator counters.
        let free = unsafe { esp_get_free_heap_size() };
        let min_free = unsafe { esp_get_minimum_free_heap_size() };
        Self { free, min_free }
    }

    /// Host builds report a fixed 300 KB heap.
    #[cfg(not(target_os = "espidf"))]
    pub fn collect() -> Self {
        Self {
            free: 307_200,
            min_free: 261_120,
        }
    }
}

#[derive(Debug, Default)]
pub struct HeapProbe {
    samples: u32,
    lowest: Option<u32>,
}

impl HeapProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowest free heap seen by this probe.
    pub fn lowest(&self) -> Option<u32> {
        self.lowest
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    fn record(&mut self, reason: &str, stats: HeapStats) -> u32 {
        self.samples += 1;
        self.lowest = Some(self.lowest.map_or(stats.free, |l| l.min(stats.free)));
        if stats.free < LOW_HEAP_BYTES {
            warn!(
                "heap: {} B free ({}), low-water {} B",
                stats.free, reason, stats.min_free
            );
        } else {
            debug!("heap: {} B free ({})", stats.free, reason);
        }
        stats.free
    }
}

impl MemoryPort for HeapProbe {
    fn reclaim(&mut self, reason: &str) -> u32 {
        self.record(reason, HeapStats::collect())
    }
}

// ───────────────────────────────────────────────────────────────
// Panic hook
// ───────────────────────────────────────────────────────────────

/// Log the panic reason and heap state before the default reset.
///
/// Call once during bring-up, after the logger is installed.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        let at = info
            .location()
            .map(|l| (l.file(), l.line()))
            .unwrap_or(("?", 0));
        let heap = HeapStats::collect();
        log::error!(
            "PANIC: {} at {}:{} (heap {} B, low-water {} B)",
            reason,
            at.0,
            at.1,
            heap.free,
            heap.min_free
        );
    }));
}
