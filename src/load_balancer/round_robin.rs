//! Round-robin load balancing strategy.

use crate::load_balancer::PoolView;

/// Outcome of one round-robin scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pick {
    /// First healthy endpoint at or after the cursor.
    Healthy(usize),
    /// Nothing was healthy; the endpoint under the cursor is returned anyway.
    LastResort(usize),
}

impl Pick {
    #[cfg(test)]
    pub fn index(self) -> usize {
        match self {
            Pick::Healthy(i) | Pick::LastResort(i) => i,
        }
    }
}

/// Round-robin cursor.
/// Scans at most one full cycle per call and advances exactly once.
#[derive(Debug, Default)]
pub(crate) struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn next(&mut self, pool: &PoolView<'_>) -> Option<Pick> {
        let len = pool.len();
        if len == 0 {
            return None;
        }

        let start = self.cursor % len;
        for offset in 0..len {
            let index = (start + offset) % len;
            if pool.is_healthy(index) {
                self.cursor = (index + 1) % len;
                return Some(Pick::Healthy(index));
            }
        }

        self.cursor = (start + 1) % len;
        Some(Pick::LastResort(start))
    }
}
