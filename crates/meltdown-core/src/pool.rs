//! Fixed-capacity neutron pool.
//!
//! Slots are stored structure-of-arrays style. Indices `[0, active)`
//! are live neutrons; the remaining indices sit on a free-list stack.
//! Allocation pops a free index, writes into it, and swaps it into the
//! active boundary slot; removal copies the last active slot into the
//! vacated one and pushes the trailing index back onto the stack. Both
//! are O(1), and together they keep the free list and the active prefix
//! a partition of the full index range.

use crate::error::Error;
use crate::math::Vec3;

#[derive(Debug)]
pub struct NeutronPool {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    /// Stack of free slot indices.
    free: Vec<usize>,
    active: usize,
    /// Emissions dropped because no slot was free.
    dropped: u64,
}

impl NeutronPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; capacity],
            velocities: vec![Vec3::ZERO; capacity],
            // Reversed so the first pop yields index 0.
            free: (0..capacity).rev().collect(),
            active: 0,
            dropped: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Number of live neutrons; the valid iteration range is `[0, active_count)`.
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Emissions dropped so far due to pool exhaustion.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    pub fn position(&self, index: usize) -> Vec3 {
        self.positions[index]
    }

    pub fn velocity(&self, index: usize) -> Vec3 {
        self.velocities[index]
    }

    /// Live neutron positions, for read-only snapshots.
    pub fn active_positions(&self) -> &[Vec3] {
        &self.positions[..self.active]
    }

    /// Advance neutron `index` by its velocity and return the new position.
    pub fn advance(&mut self, index: usize) -> Vec3 {
        debug_assert!(index < self.active);
        let v = self.velocities[index];
        self.positions[index] += v;
        self.positions[index]
    }

    /// Claim a free slot for a neutron at `position` moving with `velocity`.
    ///
    /// Returns the active slot index, or `Error::PoolExhausted` when no
    /// slot is free. Exhaustion is deliberate backpressure: the caller
    /// drops the emission, and the pool counts the drop.
    pub fn allocate(&mut self, position: Vec3, velocity: Vec3) -> Result<usize, Error> {
        let Some(free_idx) = self.free.pop() else {
            self.dropped += 1;
            return Err(Error::PoolExhausted);
        };
        self.positions[free_idx] = position;
        self.velocities[free_idx] = velocity;

        // Promote into the active prefix: swap with the boundary slot and
        // return the vacated index to the stack.
        let dst = self.active;
        if free_idx != dst {
            self.positions.swap(free_idx, dst);
            self.velocities.swap(free_idx, dst);
            self.free.push(free_idx);
        }
        self.active += 1;
        Ok(dst)
    }

    /// Remove the neutron in active slot `index`.
    ///
    /// The last active slot is copied into `index`, so a forward
    /// iteration must re-examine the same index after a removal rather
    /// than advancing.
    pub fn release(&mut self, index: usize) {
        debug_assert!(index < self.active);
        let last = self.active - 1;
        if index != last {
            self.positions[index] = self.positions[last];
            self.velocities[index] = self.velocities[last];
        }
        self.free.push(last);
        self.active -= 1;
    }
}
