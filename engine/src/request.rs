/// Request decomposition — splits each segment's byte range into
/// sector-aligned spans and drives the BlockStore.
use alloc::vec::Vec;

use crate::device::Geometry;
use crate::error::EngineError;
use crate::store::BlockStore;

/// Transfer direction of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// One contiguous byte-range transfer within a request.
///
/// The buffer length is the transfer length. The buffer stays exclusively
/// owned by the caller; the engine never retains it beyond the call.
pub struct Segment<'a> {
    pub offset_bytes: u64,
    pub direction: Direction,
    pub buffer: &'a mut [u8],
}

/// Ordered segments submitted as one logical I/O operation. Segments are
/// processed sequentially in submission order.
#[derive(Default)]
pub struct Request<'a> {
    pub segments: Vec<Segment<'a>>,
}

impl<'a> Request<'a> {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn push(&mut self, segment: Segment<'a>) {
        self.segments.push(segment);
    }
}

/// One sector-level slice of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SectorSpan {
    pub(crate) sector: u64,
    pub(crate) offset_in_sector: u32,
    pub(crate) len: usize,
}

/// Iterator over the sector spans covering `len` bytes starting at byte
/// `offset_bytes`. The first and last spans are clipped to the segment's
/// actual byte range; interior spans cover whole sectors.
pub(crate) struct SectorSpans {
    sector_size: u64,
    next_offset: u64,
    remaining: usize,
}

pub(crate) fn sector_spans(sector_size: u32, offset_bytes: u64, len: usize) -> SectorSpans {
    SectorSpans {
        sector_size: sector_size as u64,
        next_offset: offset_bytes,
        remaining: len,
    }
}

impl Iterator for SectorSpans {
    type Item = SectorSpan;

    fn next(&mut self) -> Option<SectorSpan> {
        if self.remaining == 0 {
            return None;
        }
        let sector = self.next_offset / self.sector_size;
        let offset_in_sector = self.next_offset % self.sector_size;
        let len = (self.sector_size - offset_in_sector).min(self.remaining as u64) as usize;

        self.next_offset += len as u64;
        self.remaining -= len;

        Some(SectorSpan {
            sector,
            offset_in_sector: offset_in_sector as u32,
            len,
        })
    }
}

/// Process every segment of `request` in submission order.
///
/// A failed segment does not roll back earlier, already-completed segments,
/// and later segments are still attempted; the first error encountered is
/// the one reported to the caller.
pub(crate) fn process(
    store: &BlockStore,
    geometry: Geometry,
    request: &mut Request<'_>,
) -> Result<(), EngineError> {
    let mut first_error = None;

    for segment in request.segments.iter_mut() {
        if let Err(err) = process_segment(store, geometry, segment) {
            first_error.get_or_insert(err);
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Transfer one segment. A byte range beyond the device capacity rejects the
/// whole segment with `OutOfRange` before any byte is copied.
fn process_segment(
    store: &BlockStore,
    geometry: Geometry,
    segment: &mut Segment<'_>,
) -> Result<(), EngineError> {
    let len = segment.buffer.len();
    let end = segment
        .offset_bytes
        .checked_add(len as u64)
        .ok_or(EngineError::OutOfRange)?;
    if end > geometry.capacity_bytes() {
        log::error!(
            "beyond-end {:?} ({} bytes at offset {})",
            segment.direction,
            len,
            segment.offset_bytes
        );
        return Err(EngineError::OutOfRange);
    }

    let mut buf_offset = 0usize;
    for span in sector_spans(geometry.sector_size, segment.offset_bytes, len) {
        let slice = &mut segment.buffer[buf_offset..buf_offset + span.len];
        match segment.direction {
            Direction::Read => store.read(span.sector, span.offset_in_sector, slice),
            Direction::Write => store.write(span.sector, span.offset_in_sector, slice)?,
        }
        buf_offset += span.len;
    }
    Ok(())
}
