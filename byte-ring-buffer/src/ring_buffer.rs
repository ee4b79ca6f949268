#[cfg(feature = "bytes")]
use bytes::{Buf, BufMut};
use log::{debug, trace};

use crate::error::{checked_range, Error};
use crate::short_view::ShortView;

/// A fixed-capacity circular buffer of bytes.
///
/// Appending with [`RingBuffer::add`] never fails: once the buffer is full the
/// oldest bytes are overwritten by the newest ones. [`RingBuffer::push`] is the
/// bounded counterpart that keeps existing data and refuses what does not fit.
///
/// The held bytes occupy at most two contiguous regions of the backing
/// storage, which can be borrowed without copying through
/// [`RingBuffer::peek_with`] or [`RingBuffer::segments`].
#[derive(Clone, Debug)]
pub struct RingBuffer {
    buffer: Box<[u8]>,
    // Storage index of the oldest byte.
    start: usize,
    size: usize,
}

impl RingBuffer {
    /// Creates an empty buffer that can hold up to `capacity` bytes.
    ///
    /// A zero capacity is accepted and yields a buffer that stays empty
    /// forever: appends are no-ops and reads return nothing.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            debug!("created ring buffer with zero capacity, it will never hold data");
        }
        RingBuffer {
            buffer: vec![0; capacity].into_boxed_slice(),
            start: 0,
            size: 0,
        }
    }

    /// Number of bytes currently held.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Maximum number of bytes the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of bytes that can be appended before old data gets evicted.
    pub fn size_free(&self) -> usize {
        self.capacity() - self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    /// Appends every byte of `bytes`, discarding the oldest held bytes when
    /// there is not enough room. If `bytes` is longer than the capacity only
    /// its last `capacity` bytes are kept.
    pub fn add(&mut self, bytes: &[u8]) {
        self.write_overrun(bytes);
    }

    /// Appends `length` bytes of `bytes` starting at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index + length` is past the end of `bytes`.
    pub fn add_range(&mut self, bytes: &[u8], index: usize, length: usize) {
        self.try_add_range(bytes, index, length)
            .unwrap_or_else(|e| panic!("add_range: {e}"))
    }

    pub fn try_add_range(&mut self, bytes: &[u8], index: usize, length: usize) -> Result<(), Error> {
        let range = checked_range(bytes.len(), index, length)?;
        self.write_overrun(&bytes[range]);
        Ok(())
    }

    /// Appends as many leading bytes of `bytes` as fit in the free space,
    /// without evicting anything. Returns how many were accepted, 0 when the
    /// buffer is full.
    pub fn push(&mut self, bytes: &[u8]) -> usize {
        self.write_bounded(bytes)
    }

    /// # Panics
    ///
    /// Panics if `index + length` is past the end of `bytes`.
    pub fn push_range(&mut self, bytes: &[u8], index: usize, length: usize) -> usize {
        self.try_push_range(bytes, index, length)
            .unwrap_or_else(|e| panic!("push_range: {e}"))
    }

    pub fn try_push_range(
        &mut self,
        bytes: &[u8],
        index: usize,
        length: usize,
    ) -> Result<usize, Error> {
        let range = checked_range(bytes.len(), index, length)?;
        Ok(self.write_bounded(&bytes[range]))
    }

    /// Appends every remaining byte of `src`, overwriting old data like
    /// [`RingBuffer::add`]. `src` is fully consumed. Returns the number of
    /// bytes read from it.
    #[cfg(feature = "bytes")]
    pub fn add_from<B: Buf>(&mut self, src: &mut B) -> usize {
        let mut total = 0;
        while src.has_remaining() {
            let n = {
                let chunk = src.chunk();
                self.write_overrun(chunk);
                chunk.len()
            };
            src.advance(n);
            total += n;
        }
        total
    }

    /// Copies the oldest bytes into `dest` without removing them. Returns the
    /// number of bytes copied, `min(dest.len(), size)`.
    pub fn peek(&self, dest: &mut [u8]) -> usize {
        self.copy_out(dest)
    }

    /// Copies up to `length` of the oldest bytes into `dest` at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index + length` is past the end of `dest`, even when the
    /// buffer holds fewer than `length` bytes.
    pub fn peek_range(&self, dest: &mut [u8], index: usize, length: usize) -> usize {
        self.try_peek_range(dest, index, length)
            .unwrap_or_else(|e| panic!("peek_range: {e}"))
    }

    pub fn try_peek_range(&self, dest: &mut [u8], index: usize, length: usize) -> Result<usize, Error> {
        let range = checked_range(dest.len(), index, length)?;
        Ok(self.copy_out(&mut dest[range]))
    }

    /// Copies the oldest bytes into `dest`, as many as it has room for
    /// (`remaining_mut`). The cursor of `dest` advances by the returned count.
    #[cfg(feature = "bytes")]
    pub fn peek_buf<B: BufMut>(&self, dest: &mut B) -> usize {
        let length = dest.remaining_mut();
        self.copy_to_buf(dest, length)
    }

    /// # Panics
    ///
    /// Panics if `dest` has room for fewer than `length` bytes.
    #[cfg(feature = "bytes")]
    pub fn peek_buf_len<B: BufMut>(&self, dest: &mut B, length: usize) -> usize {
        let remaining = dest.remaining_mut();
        if length > remaining {
            panic!(
                "peek_buf_len: {}",
                Error::CapacityExceeded {
                    requested: length,
                    remaining
                }
            );
        }
        self.copy_to_buf(dest, length)
    }

    /// Lends the held bytes to `f` without copying.
    ///
    /// `f` is called once with the run starting at the oldest byte and, when
    /// the content wraps around the end of the storage, a second time with
    /// the run starting at the beginning of the storage. An empty buffer
    /// still calls `f` once, with an empty slice.
    pub fn peek_with<F>(&self, mut f: F)
    where
        F: FnMut(&[u8]),
    {
        let (first, second) = self.segments();
        f(first);
        if !second.is_empty() {
            f(second);
        }
    }

    /// The two regions of storage that make up the content, oldest first.
    /// The second one is empty unless the content wraps around.
    pub fn segments(&self) -> (&[u8], &[u8]) {
        let first_len = (self.capacity() - self.start).min(self.size);
        let first = &self.buffer[self.start..self.start + first_len];
        let second = &self.buffer[..self.size - first_len];
        (first, second)
    }

    /// Iterates over the held bytes from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        let (first, second) = self.segments();
        first.iter().copied().chain(second.iter().copied())
    }

    /// Copies up to `max` of the oldest bytes into a new vector.
    pub fn peek_to_vec(&self, max: usize) -> Vec<u8> {
        let mut out = vec![0; max.min(self.size)];
        self.copy_out(&mut out);
        out
    }

    /// Like [`RingBuffer::peek`], then drops the bytes that were copied.
    pub fn pop(&mut self, dest: &mut [u8]) -> usize {
        let read = self.copy_out(dest);
        self.drop(read);
        read
    }

    /// # Panics
    ///
    /// Panics if `index + length` is past the end of `dest`.
    pub fn pop_range(&mut self, dest: &mut [u8], index: usize, length: usize) -> usize {
        self.try_pop_range(dest, index, length)
            .unwrap_or_else(|e| panic!("pop_range: {e}"))
    }

    pub fn try_pop_range(&mut self, dest: &mut [u8], index: usize, length: usize) -> Result<usize, Error> {
        let read = self.try_peek_range(dest, index, length)?;
        self.drop(read);
        Ok(read)
    }

    #[cfg(feature = "bytes")]
    pub fn pop_buf<B: BufMut>(&mut self, dest: &mut B) -> usize {
        let read = self.peek_buf(dest);
        self.drop(read);
        read
    }

    /// # Panics
    ///
    /// Panics if `dest` has room for fewer than `length` bytes.
    #[cfg(feature = "bytes")]
    pub fn pop_buf_len<B: BufMut>(&mut self, dest: &mut B, length: usize) -> usize {
        let read = self.peek_buf_len(dest, length);
        self.drop(read);
        read
    }

    /// Removes up to `count` of the oldest bytes. Dropping more than is held
    /// empties the buffer.
    pub fn drop(&mut self, count: usize) {
        let count = count.min(self.size);
        if count == 0 {
            return;
        }
        self.start = (self.start + count) % self.capacity();
        self.size -= count;
    }

    /// Empties the buffer and moves the start back to the beginning of the
    /// storage.
    pub fn clear(&mut self) {
        self.start = 0;
        self.size = 0;
    }

    /// Views the content as big-endian 16-bit samples.
    pub fn short_view(&mut self) -> ShortView<'_> {
        ShortView::new(self)
    }

    /// Storage index where the next appended byte lands.
    fn write_offset(&self) -> usize {
        match self.capacity() {
            0 => 0,
            capacity => (self.start + self.size) % capacity,
        }
    }

    pub(crate) fn write_overrun(&mut self, mut bytes: &[u8]) {
        let capacity = self.capacity();
        if capacity == 0 || bytes.is_empty() {
            return;
        }

        let evicted = (self.size + bytes.len()).saturating_sub(capacity);
        if evicted > 0 {
            trace!("ring buffer full, overwriting {} oldest bytes", evicted);
        }

        let offset = self.write_offset();
        if offset + bytes.len() <= capacity {
            self.buffer[offset..offset + bytes.len()].copy_from_slice(bytes);
            self.advance(bytes.len());
            return;
        }

        while !bytes.is_empty() {
            let offset = self.write_offset();
            let n = bytes.len().min(capacity - offset);
            self.buffer[offset..offset + n].copy_from_slice(&bytes[..n]);
            self.advance(n);
            bytes = &bytes[n..];
        }
    }

    pub(crate) fn write_bounded(&mut self, bytes: &[u8]) -> usize {
        let accepted = bytes.len().min(self.size_free());
        if accepted < bytes.len() {
            trace!(
                "ring buffer has room for {} of {} bytes, discarding the rest",
                accepted,
                bytes.len()
            );
        }
        self.write_overrun(&bytes[..accepted]);
        accepted
    }

    /// Moves the end forward by `n` freshly written bytes, pushing the start
    /// along by whatever no longer fits.
    fn advance(&mut self, n: usize) {
        let capacity = self.capacity();
        let (size, overflow) = advanced(self.size, n, capacity);
        self.size = size;
        self.start = (self.start + overflow) % capacity;
    }

    fn copy_out(&self, dest: &mut [u8]) -> usize {
        if self.size == 0 {
            return 0;
        }

        let (first, second) = self.segments();
        let from_first = first.len().min(dest.len());
        dest[..from_first].copy_from_slice(&first[..from_first]);

        let from_second = second.len().min(dest.len() - from_first);
        dest[from_first..from_first + from_second].copy_from_slice(&second[..from_second]);

        from_first + from_second
    }

    #[cfg(feature = "bytes")]
    fn copy_to_buf<B: BufMut>(&self, dest: &mut B, length: usize) -> usize {
        let mut remaining = length.min(self.size);
        let mut written = 0;
        if remaining == 0 {
            return 0;
        }
        self.peek_with(|segment| {
            let n = segment.len().min(remaining);
            dest.put_slice(&segment[..n]);
            remaining -= n;
            written += n;
        });
        written
    }
}

/// Size after writing `n` bytes into a buffer holding `size`, and how many of
/// the oldest bytes that write pushed out.
fn advanced(size: usize, n: usize, capacity: usize) -> (usize, usize) {
    let sum = size + n;
    if sum > capacity {
        (capacity, sum - capacity)
    } else {
        (sum, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advanced_within_capacity() {
        assert_eq!(advanced(0, 3, 4), (3, 0));
        assert_eq!(advanced(1, 3, 4), (4, 0));
    }

    #[test]
    fn advanced_past_capacity() {
        assert_eq!(advanced(3, 2, 4), (4, 1));
        assert_eq!(advanced(4, 4, 4), (4, 4));
    }

    #[test]
    fn write_offset_follows_content() {
        let mut buffer = RingBuffer::new(4);
        assert_eq!(buffer.write_offset(), 0);

        buffer.add(&[1, 2, 3]);
        assert_eq!(buffer.write_offset(), 3);

        buffer.drop(2);
        buffer.add(&[4, 5]);
        assert_eq!((buffer.start, buffer.size), (2, 3));
        assert_eq!(buffer.write_offset(), 1);
    }

    #[test]
    fn full_buffer_writes_over_start() {
        let mut buffer = RingBuffer::new(3);
        buffer.add(&[1, 2, 3, 4]);

        assert!(buffer.is_full());
        assert_eq!(buffer.write_offset(), buffer.start);
        assert_eq!(buffer.start, 1);
    }

    #[test]
    fn long_write_wraps_several_times() {
        let mut buffer = RingBuffer::new(3);
        buffer.add(&[1]);
        buffer.add(&[2, 3, 4, 5, 6, 7, 8, 9]);

        assert!(buffer.start < 3);
        assert_eq!(buffer.peek_to_vec(3), vec![7, 8, 9]);
    }

    #[test]
    fn clear_resets_start() {
        let mut buffer = RingBuffer::new(4);
        buffer.add(&[1, 2, 3, 4, 5, 6]);
        buffer.clear();

        assert_eq!((buffer.start, buffer.size), (0, 0));
    }
}
