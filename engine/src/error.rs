/// Engine error taxonomy.
///
/// Every failure is surfaced synchronously from the call that caused it; the
/// engine never retries, queues, or defers recovery — backpressure and retry
/// policy belong to the submission layer above.

/// Errors reported by registration and transfer calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// Zero sector size or sector count at registration. Fatal to the
    /// registration only; no existing device is affected.
    InvalidConfiguration,
    /// A segment's byte range exceeds the device capacity. The segment is
    /// rejected whole, with no data copied.
    OutOfRange,
    /// No memory for a new block. Sectors already processed in the same
    /// request remain valid.
    AllocationFailure,
}

impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EngineError::InvalidConfiguration => write!(f, "invalid device geometry"),
            EngineError::OutOfRange => write!(f, "transfer beyond end of device"),
            EngineError::AllocationFailure => write!(f, "out of memory for block"),
        }
    }
}
