//! A fixed-capacity circular buffer of bytes.
//!
//! [`RingBuffer`] is a bounded holding area between a producer and a consumer
//! of a byte stream. Appending past the capacity silently discards the oldest
//! bytes, so memory use never grows.
//!
//! ```
//! use byte_ring_buffer::RingBuffer;
//!
//! let mut buffer = RingBuffer::new(4);
//! buffer.add(&[1, 2, 3, 4, 5]);
//!
//! let mut out = [0; 4];
//! assert_eq!(buffer.pop(&mut out), 4);
//! assert_eq!(out, [2, 3, 4, 5]);
//! assert!(buffer.is_empty());
//! ```
pub mod error;
pub mod ring_buffer;
pub mod short_view;

pub use error::Error;
pub use ring_buffer::RingBuffer;
pub use short_view::ShortView;
