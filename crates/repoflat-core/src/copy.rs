//! Bounded file copy with a reusable buffer.
//!
//! Entries are streamed in fixed 64 KiB chunks so memory stays constant
//! regardless of entry size. The byte ceiling is enforced on the bytes that
//! actually come out of the decompressor, so a lying size field in the
//! central directory cannot push a file past the limit.

use std::io::Read;
use std::io::Write;
use std::io::{self};

use crate::FlattenError;
use crate::error::QuotaResource;

/// Buffer size for I/O operations (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Stack-allocated buffer reused for every entry of an archive.
#[derive(Debug)]
pub struct CopyBuffer {
    #[allow(clippy::large_stack_arrays)]
    buf: [u8; COPY_BUFFER_SIZE],
}

impl CopyBuffer {
    /// Creates a new zeroed copy buffer.
    #[inline]
    #[must_use]
    #[allow(clippy::large_stack_arrays)]
    pub fn new() -> Self {
        Self {
            buf: [0u8; COPY_BUFFER_SIZE],
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        COPY_BUFFER_SIZE
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `reader` into `writer`, failing once more than `limit` bytes flow.
///
/// Returns the number of bytes copied. On error the writer may hold a
/// partial prefix; the caller decides what to do with it.
///
/// # Errors
///
/// Returns an error if:
/// - Reading from the source fails
/// - Writing to the destination fails
/// - More than `limit` bytes are read
///
/// # Examples
///
/// ```
/// use repoflat_core::copy::{CopyBuffer, copy_with_limit};
///
/// let mut buffer = CopyBuffer::new();
/// let mut input: &[u8] = b"hello world";
/// let mut output = Vec::new();
///
/// let n = copy_with_limit(&mut input, &mut output, &mut buffer, 64)?;
/// assert_eq!(n, 11);
///
/// let mut input: &[u8] = b"hello world";
/// assert!(copy_with_limit(&mut input, &mut Vec::new(), &mut buffer, 5).is_err());
/// # Ok::<(), repoflat_core::FlattenError>(())
/// ```
#[inline]
pub fn copy_with_limit<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    limit: u64,
) -> Result<u64, FlattenError> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FlattenError::Io(e)),
        };

        total = total
            .checked_add(bytes_read as u64)
            .ok_or(FlattenError::QuotaExceeded {
                resource: QuotaResource::IntegerOverflow,
            })?;

        if total > limit {
            return Err(FlattenError::QuotaExceeded {
                resource: QuotaResource::FileSize {
                    size: total,
                    max: limit,
                },
            });
        }

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(FlattenError::Io)?;
    }

    Ok(total)
}
