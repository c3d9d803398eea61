/// Device identity, capacity, and open-count lifecycle.
///
/// `RamDisk` composes the sparse sector store and the request processor
/// behind the five calls the submission layer uses: register, capacity
/// query, transfer submission, open/close, and teardown.
use alloc::string::String;

use spin::Mutex;

use crate::error::EngineError;
use crate::request::{self, Request};
use crate::store::BlockStore;

/// Sector size the capacity is reported in upstream, independent of the
/// device's configured sector size.
pub const KERNEL_SECTOR_SIZE: u32 = 512;

/// Reference geometry: 512-byte sectors, 1 Mi of them — a 512 MiB device.
pub const DEFAULT_SECTOR_SIZE: u32 = 512;
pub const DEFAULT_SECTOR_COUNT: u64 = 1024 * 1024;

static_assertions::const_assert!(DEFAULT_SECTOR_SIZE > 0);
static_assertions::const_assert!(DEFAULT_SECTOR_COUNT > 0);
static_assertions::const_assert!(DEFAULT_SECTOR_SIZE % KERNEL_SECTOR_SIZE == 0);

/// Device geometry, fixed at registration and immutable for the device
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub sector_size: u32,
    pub sector_count: u64,
}

impl Geometry {
    pub const fn capacity_bytes(&self) -> u64 {
        self.sector_size as u64 * self.sector_count
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            sector_size: DEFAULT_SECTOR_SIZE,
            sector_count: DEFAULT_SECTOR_COUNT,
        }
    }
}

/// A registered RAM-backed block device.
///
/// Owns the sector store and the open reference count. Teardown consumes the
/// value, so a torn-down device cannot be used again.
pub struct RamDisk {
    name: String,
    geometry: Geometry,
    open_count: Mutex<i64>,
    store: BlockStore,
}

impl RamDisk {
    /// Register a device with the given geometry under the default name.
    pub fn register(geometry: Geometry) -> Result<Self, EngineError> {
        Self::register_named("ramblk0", geometry)
    }

    /// Register a device under an explicit name (used in log output).
    pub fn register_named(name: &str, geometry: Geometry) -> Result<Self, EngineError> {
        if geometry.sector_size == 0 || geometry.sector_count == 0 {
            return Err(EngineError::InvalidConfiguration);
        }

        log::debug!(
            "{}: registered, {} sectors of {} bytes ({} bytes capacity)",
            name,
            geometry.sector_count,
            geometry.sector_size,
            geometry.capacity_bytes()
        );

        Ok(Self {
            name: String::from(name),
            geometry,
            open_count: Mutex::new(0),
            store: BlockStore::new(geometry.sector_size),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Device capacity in bytes.
    pub fn capacity_bytes(&self) -> u64 {
        self.geometry.capacity_bytes()
    }

    /// Capacity in `KERNEL_SECTOR_SIZE` units — the geometry reported
    /// upstream regardless of the configured sector size.
    pub fn capacity_sectors(&self) -> u64 {
        self.capacity_bytes() / KERNEL_SECTOR_SIZE as u64
    }

    /// Direct access to the sector store.
    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    /// Take a reference on the device. Always succeeds; there is no access
    /// control in scope.
    pub fn open(&self) {
        *self.open_count.lock() += 1;
    }

    /// Drop a reference. Closing without a matching `open` is a caller
    /// contract violation.
    pub fn close(&self) {
        let mut count = self.open_count.lock();
        debug_assert!(*count > 0, "close without matching open");
        *count -= 1;
    }

    /// Current open reference count.
    pub fn open_count(&self) -> i64 {
        *self.open_count.lock()
    }

    /// Submit a transfer request. Synchronous: returns only after every
    /// segment has been attempted.
    pub fn submit(&self, request: &mut Request<'_>) -> Result<(), EngineError> {
        request::process(&self.store, self.geometry, request)
    }

    /// Release all blocks and invalidate the device handle. Callers must
    /// have quiesced in-flight transfers and dropped every open reference
    /// first; the engine does not block waiting for quiescence.
    pub fn teardown(mut self) {
        debug_assert_eq!(*self.open_count.lock(), 0, "teardown with open references");
        log::debug!("{}: teardown", self.name);
        self.store.teardown();
    }
}
