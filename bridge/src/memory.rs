//! Bounded reads and writes on guest linear memory.
//!
//! Readers take a borrowed `&[u8]` view of the memory for the length of one
//! call and return owned data, so nothing keeps a guest address alive once
//! the call returns. Every access is checked against the slice length.

use lunx_hostapi::DecodeError;

/// Decode the NUL-terminated string starting at `ptr`.
///
/// The scan stops at the first NUL byte and never looks past the end of
/// `mem` or past `max_len` bytes of content, whichever comes first. Invalid
/// UTF-8 sequences are replaced with U+FFFD.
pub fn read_c_string(mem: &[u8], ptr: i32, max_len: usize) -> Result<String, DecodeError> {
    if ptr < 0 || ptr as usize >= mem.len() {
        return Err(DecodeError::OutOfBounds {
            ptr,
            memory_len: mem.len(),
        });
    }
    let start = ptr as usize;
    // Content plus the terminator.
    let end = start.saturating_add(max_len).saturating_add(1).min(mem.len());
    let window = &mem[start..end];
    match window.iter().position(|&b| b == 0) {
        Some(len) => Ok(String::from_utf8_lossy(&window[..len]).into_owned()),
        None => Err(DecodeError::Unterminated {
            ptr,
            scanned: window.len(),
        }),
    }
}

/// Write `data` bytes to guest memory at `ptr`.
///
/// Returns `false` without touching memory if `[ptr, ptr+data.len())` is out
/// of bounds.
pub fn write_bytes(mem: &mut [u8], ptr: usize, data: &[u8]) -> bool {
    let end = match ptr.checked_add(data.len()) {
        Some(end) if end <= mem.len() => end,
        _ => return false,
    };
    mem[ptr..end].copy_from_slice(data);
    true
}

/// Size of one wasm page.
pub const WASM_PAGE: usize = 65536;

fn align8(size: usize) -> usize {
    (size + 7) & !7
}

/// Host-owned scratch region for script buffers, used when the module does
/// not export `malloc`/`free`.
///
/// The region is a run of pages the host grew itself, `[start, end)`.
/// Buffers are bump-allocated from `cursor` and all released at once by
/// [`reset`](Self::reset) after the guest call they were passed to.
///
/// The region may only grow in place while it still ends at the end of
/// linear memory. Once the guest grows memory, the pages past `end` are the
/// guest's, so a buffer that no longer fits moves the region to the new end
/// of memory instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRegion {
    start: usize,
    cursor: usize,
    end: usize,
}

/// Where the next buffer goes and how much memory must grow first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub ptr: usize,
    /// Pages to grow linear memory by before writing at `ptr`.
    pub grow_pages: u64,
    /// Region state once the buffer is written.
    pub region: ScriptRegion,
}

impl ScriptRegion {
    /// Empty region at `offset`, normally the current end of memory.
    pub fn empty_at(offset: usize) -> Self {
        Self {
            start: offset,
            cursor: offset,
            end: offset,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Bytes handed out since the last reset.
    pub fn used(&self) -> usize {
        self.cursor - self.start
    }

    /// Plan a `size`-byte buffer given the current length of linear memory.
    pub fn place(&self, size: usize, memory_len: usize) -> Placement {
        let aligned = align8(size.max(1));
        let mut region = *self;
        if region.cursor + aligned > region.end && region.end != memory_len {
            region = Self::empty_at(memory_len);
        }
        let deficit = (region.cursor + aligned).saturating_sub(region.end);
        let grow_pages = deficit.div_ceil(WASM_PAGE);
        region.end += grow_pages * WASM_PAGE;
        let ptr = region.cursor;
        region.cursor += aligned;
        Placement {
            ptr,
            grow_pages: grow_pages as u64,
            region,
        }
    }

    /// Release every buffer at once.
    pub fn reset(&mut self) {
        self.cursor = self.start;
    }
}
