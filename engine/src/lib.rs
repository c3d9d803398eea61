//! RAM-backed block storage engine.
//!
//! A software block device: a fixed sector-addressable capacity backed by a
//! sparse, on-demand-allocated in-memory sector store. The submission layer
//! above (whatever queues, splits, and completes I/O upstream) talks to the
//! engine through five calls: register, capacity query, transfer submission,
//! open/close reference counting, and teardown.
//!
//! Purely in-memory — persistence across the process lifetime is a non-goal,
//! as are request reordering/merging and multi-device topologies.
#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod device;
mod error;
mod request;
mod store;

pub use device::{
    Geometry, RamDisk, DEFAULT_SECTOR_COUNT, DEFAULT_SECTOR_SIZE, KERNEL_SECTOR_SIZE,
};
pub use error::EngineError;
pub use request::{Direction, Request, Segment};
pub use store::BlockStore;
