use crate::error::{checked_range, Error};
use crate::ring_buffer::RingBuffer;

const SAMPLE_LEN: usize = 2;

/// Reads and writes a [`RingBuffer`] as 16-bit samples, two bytes each,
/// high byte first.
///
/// Only whole samples are ever read. A trailing odd byte stays in the buffer.
pub struct ShortView<'a> {
    buffer: &'a mut RingBuffer,
}

impl<'a> ShortView<'a> {
    pub(crate) fn new(buffer: &'a mut RingBuffer) -> Self {
        ShortView { buffer }
    }

    /// Whole samples currently held.
    pub fn size_used(&self) -> usize {
        self.buffer.size() / SAMPLE_LEN
    }

    /// Whole samples the buffer can hold.
    pub fn size_total(&self) -> usize {
        self.buffer.capacity() / SAMPLE_LEN
    }

    /// Whole samples that fit without evicting anything.
    pub fn size_free(&self) -> usize {
        self.buffer.size_free() / SAMPLE_LEN
    }

    /// Adds as many leading samples as fit in the free space. Returns how
    /// many were added.
    pub fn add(&mut self, samples: &[i16]) -> usize {
        let accepted = samples.len().min(self.size_free());
        for sample in &samples[..accepted] {
            self.buffer.write_overrun(&sample.to_be_bytes());
        }
        accepted
    }

    /// # Panics
    ///
    /// Panics if `index + length` is past the end of `samples`.
    pub fn add_range(&mut self, samples: &[i16], index: usize, length: usize) -> usize {
        let range = expect_range(samples.len(), index, length, "add_range");
        self.add(&samples[range])
    }

    /// Adds every sample, overwriting the oldest bytes when full. Nothing is
    /// written if the buffer cannot hold a single sample.
    pub fn overrun_add(&mut self, samples: &[i16]) {
        if self.buffer.capacity() < SAMPLE_LEN {
            return;
        }
        for sample in samples {
            self.buffer.write_overrun(&sample.to_be_bytes());
        }
    }

    /// Decodes up to `dest.len()` of the oldest samples. Returns how many were
    /// written to `dest`.
    pub fn peek(&self, dest: &mut [i16]) -> usize {
        let wanted = dest.len().min(self.size_used());
        let mut bytes = self.buffer.iter();
        let mut read = 0;
        for slot in &mut dest[..wanted] {
            match (bytes.next(), bytes.next()) {
                (Some(high), Some(low)) => *slot = i16::from_be_bytes([high, low]),
                _ => break,
            }
            read += 1;
        }
        read
    }

    /// # Panics
    ///
    /// Panics if `index + length` is past the end of `dest`.
    pub fn peek_range(&self, dest: &mut [i16], index: usize, length: usize) -> usize {
        let range = expect_range(dest.len(), index, length, "peek_range");
        self.peek(&mut dest[range])
    }

    /// Like [`ShortView::peek`], then drops the bytes of the samples read.
    pub fn pop(&mut self, dest: &mut [i16]) -> usize {
        let read = self.peek(dest);
        self.buffer.drop(read * SAMPLE_LEN);
        read
    }

    /// # Panics
    ///
    /// Panics if `index + length` is past the end of `dest`.
    pub fn pop_range(&mut self, dest: &mut [i16], index: usize, length: usize) -> usize {
        let range = expect_range(dest.len(), index, length, "pop_range");
        self.pop(&mut dest[range])
    }
}

fn expect_range(len: usize, index: usize, length: usize, op: &str) -> std::ops::Range<usize> {
    checked_range(len, index, length).unwrap_or_else(|e: Error| panic!("{op}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_big_endian() {
        let mut buffer = RingBuffer::new(4);
        buffer.short_view().add(&[0x0102, -2]);

        assert_eq!(buffer.peek_to_vec(4), vec![0x01, 0x02, 0xff, 0xfe]);
    }

    #[test]
    fn odd_byte_is_not_a_sample() {
        let mut buffer = RingBuffer::new(4);
        buffer.add(&[0, 7, 9]);

        let mut view = buffer.short_view();
        let mut out = [0i16; 2];
        assert_eq!(view.size_used(), 1);
        assert_eq!(view.pop(&mut out), 1);
        assert_eq!(out, [7, 0]);
        assert_eq!(buffer.size(), 1);
    }
}
