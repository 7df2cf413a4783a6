//! Receive ring buffer
//!
//! Single-producer single-consumer byte queue between the event interrupt
//! (producer) and the main loop (consumer), built on
//! [`heapless::spsc::Queue`]. Each side owns one index and only that side
//! writes it, so neither side takes a lock.
//!
//! Overflow policy is drop-newest: a byte arriving while the buffer is full
//! is discarded and counted, bytes already buffered are never overwritten.

use heapless::spsc::{Consumer, Producer, Queue};
use portable_atomic::{AtomicUsize, Ordering};

/// Errors from the consumer side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxError {
    /// Nothing buffered; try again later
    BufferEmpty,
}

/// Backing storage for received bytes
///
/// Holds up to `N - 1` bytes. Create it once (usually in a `StaticCell`)
/// and [`split`](Self::split) it into the interrupt and main-loop halves.
pub struct RxBuffer<const N: usize> {
    queue: Queue<u8, N>,
    dropped: AtomicUsize,
}

impl<const N: usize> RxBuffer<N> {
    /// Number of bytes the buffer can hold
    pub const CAPACITY: usize = N - 1;

    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Split into the producer (interrupt side) and consumer (main loop side)
    pub fn split(&mut self) -> (RxProducer<'_, N>, RxConsumer<'_, N>) {
        let Self { queue, dropped } = self;
        let dropped: &AtomicUsize = dropped;
        let (producer, consumer) = queue.split();
        (
            RxProducer {
                inner: producer,
                dropped,
            },
            RxConsumer {
                inner: consumer,
                dropped,
            },
        )
    }
}

impl<const N: usize> Default for RxBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Interrupt-side half of an [`RxBuffer`]
pub struct RxProducer<'a, const N: usize> {
    inner: Producer<'a, u8, N>,
    dropped: &'a AtomicUsize,
}

impl<'a, const N: usize> RxProducer<'a, N> {
    /// Append a byte
    ///
    /// Returns `false` if the buffer was full and the byte was dropped.
    pub fn put(&mut self, byte: u8) -> bool {
        match self.inner.enqueue(byte) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Number of bytes currently buffered
    pub fn used(&self) -> usize {
        self.inner.len()
    }
}

/// Main-loop half of an [`RxBuffer`]
pub struct RxConsumer<'a, const N: usize> {
    inner: Consumer<'a, u8, N>,
    dropped: &'a AtomicUsize,
}

impl<'a, const N: usize> RxConsumer<'a, N> {
    /// Take the oldest buffered byte
    pub fn get(&mut self) -> Option<u8> {
        self.inner.dequeue()
    }

    /// Number of bytes currently buffered
    pub fn used(&self) -> usize {
        self.inner.len()
    }

    /// Drain up to `dest.len()` bytes into `dest`
    ///
    /// Returns the number of bytes copied. Never blocks; an empty buffer
    /// yields 0 and anything that does not fit stays for the next call.
    pub fn read(&mut self, dest: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in dest.iter_mut() {
            match self.inner.dequeue() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Total bytes dropped because the buffer was full
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Number of bytes the buffer can hold
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_buffer() {
        let mut buffer = RxBuffer::<8>::new();
        let (_producer, mut consumer) = buffer.split();

        let mut dest = [0u8; 4];
        assert_eq!(consumer.read(&mut dest), 0);
        assert_eq!(consumer.get(), None);
        assert_eq!(consumer.used(), 0);
        assert_eq!(consumer.capacity(), 7);
    }

    #[test]
    fn test_partial_read_leaves_remainder() {
        let mut buffer = RxBuffer::<8>::new();
        let (mut producer, mut consumer) = buffer.split();

        for byte in 1..=5 {
            assert!(producer.put(byte));
        }
        assert_eq!(producer.used(), 5);

        let mut dest = [0u8; 3];
        assert_eq!(consumer.read(&mut dest), 3);
        assert_eq!(dest, [1, 2, 3]);
        assert_eq!(consumer.used(), 2);

        let mut dest = [0u8; 3];
        assert_eq!(consumer.read(&mut dest), 2);
        assert_eq!(&dest[..2], &[4, 5]);
    }

    #[test]
    fn test_wraps_around() {
        let mut buffer = RxBuffer::<4>::new();
        let (mut producer, mut consumer) = buffer.split();

        for round in 0u8..10 {
            assert!(producer.put(round));
            assert!(producer.put(round.wrapping_add(100)));
            assert_eq!(consumer.get(), Some(round));
            assert_eq!(consumer.get(), Some(round.wrapping_add(100)));
        }
        assert_eq!(consumer.dropped(), 0);
    }

    #[test]
    fn test_full_buffer_drops_newest() {
        let mut buffer = RxBuffer::<4>::new();
        let (mut producer, mut consumer) = buffer.split();

        assert!(producer.put(0x10));
        assert!(producer.put(0x11));
        assert!(producer.put(0x12));
        assert!(!producer.put(0x13));
        assert_eq!(consumer.dropped(), 1);

        // Space frees up once the consumer drains
        assert_eq!(consumer.get(), Some(0x10));
        assert!(producer.put(0x14));

        let mut dest = [0u8; 8];
        assert_eq!(consumer.read(&mut dest), 3);
        assert_eq!(&dest[..3], &[0x11, 0x12, 0x14]);
    }

    proptest! {
        #[test]
        fn prop_read_returns_puts_in_order(bytes in proptest::collection::vec(any::<u8>(), 0..=63)) {
            let mut buffer = RxBuffer::<64>::new();
            let (mut producer, mut consumer) = buffer.split();

            for &byte in &bytes {
                prop_assert!(producer.put(byte));
            }

            let mut dest = [0u8; 64];
            let n = consumer.read(&mut dest);
            prop_assert_eq!(n, bytes.len());
            prop_assert_eq!(&dest[..n], &bytes[..]);
        }

        #[test]
        fn prop_overflow_keeps_oldest(bytes in proptest::collection::vec(any::<u8>(), 16..200)) {
            let mut buffer = RxBuffer::<16>::new();
            let (mut producer, mut consumer) = buffer.split();
            let capacity = RxBuffer::<16>::CAPACITY;

            for (i, &byte) in bytes.iter().enumerate() {
                prop_assert_eq!(producer.put(byte), i < capacity);
            }

            prop_assert_eq!(consumer.dropped(), bytes.len() - capacity);

            let mut dest = [0u8; 32];
            let n = consumer.read(&mut dest);
            prop_assert_eq!(n, capacity);
            prop_assert_eq!(&dest[..n], &bytes[..capacity]);
        }
    }
}
