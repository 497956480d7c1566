//! Bounds-checked sequential byte I/O over a contiguous span.
//!
//! Every multi-byte value crosses these buffers in network byte order
//! (big-endian), whatever its width. Operations either advance the cursor
//! by exactly the number of bytes they produced or consumed, or fail with
//! [`ShortBuffer`] and leave the cursor where it was.

use bytes::BytesMut;

/// Error returned when a cursor operation needs more room than the buffer
/// has left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortBuffer;

impl std::fmt::Display for ShortBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "not enough buffer space for the requested operation")
    }
}

impl std::error::Error for ShortBuffer {}

mod sealed {
    pub trait Sealed {}
}

/// Fixed-width integers that can cross the wire in big-endian order.
pub trait NetworkEndian: sealed::Sealed + Copy {
    /// Number of bytes this integer occupies on the wire.
    const WIDTH: usize;

    fn from_be_slice(src: &[u8]) -> Self;
    fn put_be_slice(self, dst: &mut [u8]);
}

macro_rules! network_endian {
    ($($kind:ty),* $(,)?) => {$(
        impl sealed::Sealed for $kind {}

        impl NetworkEndian for $kind {
            const WIDTH: usize = std::mem::size_of::<$kind>();

            fn from_be_slice(src: &[u8]) -> Self {
                Self::from_be_bytes(src.try_into().unwrap())
            }

            fn put_be_slice(self, dst: &mut [u8]) {
                dst.copy_from_slice(&self.to_be_bytes());
            }
        }
    )*};
}

network_endian!(u8, u16, u32, u64, i8, i16, i32, i64);

/// Sequential big-endian reader over a borrowed byte slice.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Bytes left between the cursor and the end of the span.
    pub fn space(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Reads one big-endian integer of width `T::WIDTH`.
    pub fn read_numeric<T: NetworkEndian>(&mut self) -> Result<T, ShortBuffer> {
        if self.space() < T::WIDTH {
            return Err(ShortBuffer);
        }
        let value = T::from_be_slice(&self.data[self.offset..self.offset + T::WIDTH]);
        self.offset += T::WIDTH;
        Ok(value)
    }

    /// Copies as many bytes as are available, up to `dst.len()`, and returns
    /// the count copied.
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> usize {
        let count = dst.len().min(self.space());
        dst[..count].copy_from_slice(&self.data[self.offset..self.offset + count]);
        self.offset += count;
        count
    }

    /// Strict variant of [`read_bytes`](Self::read_bytes): fills the whole of
    /// `dst` or fails without consuming anything.
    pub fn read_exact(&mut self, dst: &mut [u8]) -> Result<(), ShortBuffer> {
        if self.space() < dst.len() {
            return Err(ShortBuffer);
        }
        dst.copy_from_slice(&self.data[self.offset..self.offset + dst.len()]);
        self.offset += dst.len();
        Ok(())
    }

    /// Advances the cursor without reading.
    pub fn skip(&mut self, count: usize) -> Result<(), ShortBuffer> {
        if self.space() < count {
            return Err(ShortBuffer);
        }
        self.offset += count;
        Ok(())
    }

    /// Rewinds (or forwards) the cursor to an absolute position.
    pub fn reset(&mut self, position: usize) -> Result<(), ShortBuffer> {
        if position > self.data.len() {
            return Err(ShortBuffer);
        }
        self.offset = position;
        Ok(())
    }
}

/// Sequential big-endian writer over an owned, fixed-size buffer.
///
/// The backing buffer is sized at construction and never grows; a write
/// that does not fit fails whole. Message encoders rely on this together
/// with [`reset`](Self::reset) to rewind a partially-written message.
#[derive(Debug)]
pub struct ByteWriter {
    buf: BytesMut,
    offset: usize,
}

impl ByteWriter {
    /// Creates a writer over a zeroed buffer of exactly `size` bytes.
    pub fn new(size: usize) -> Self {
        let mut buf = BytesMut::with_capacity(size);
        buf.resize(size, 0);
        Self { buf, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.buf.len()
    }

    pub fn space(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// The whole backing buffer, written or not.
    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    /// Writes one big-endian integer of width `T::WIDTH`.
    pub fn write_numeric<T: NetworkEndian>(&mut self, value: T) -> Result<(), ShortBuffer> {
        if self.space() < T::WIDTH {
            return Err(ShortBuffer);
        }
        value.put_be_slice(&mut self.buf[self.offset..self.offset + T::WIDTH]);
        self.offset += T::WIDTH;
        Ok(())
    }

    /// Copies the whole of `src` if it fits.
    pub fn write_bytes(&mut self, src: &[u8]) -> Result<(), ShortBuffer> {
        if self.space() < src.len() {
            return Err(ShortBuffer);
        }
        self.buf[self.offset..self.offset + src.len()].copy_from_slice(src);
        self.offset += src.len();
        Ok(())
    }

    /// Advances the cursor without writing.
    pub fn skip(&mut self, count: usize) -> Result<(), ShortBuffer> {
        if self.space() < count {
            return Err(ShortBuffer);
        }
        self.offset += count;
        Ok(())
    }

    /// Rewinds (or forwards) the cursor to an absolute position.
    pub fn reset(&mut self, position: usize) -> Result<(), ShortBuffer> {
        if position > self.buf.len() {
            return Err(ShortBuffer);
        }
        self.offset = position;
        Ok(())
    }
}
