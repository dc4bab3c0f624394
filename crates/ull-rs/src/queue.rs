//! A circular queue of receive descriptors shared between the radio (producer)
//! and the link layer (consumer).
//!
//! The entries live in a fixed array. The successor of entry `i` is entry `(i + 1) % N`.
use crate::critical::IrqGuard;

/// Ownership state of a [`DataEntry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EntryStatus {
    /// Owned by the radio, free to be written.
    #[default]
    Pending,
    /// The radio is writing into this entry.
    Busy,
    /// The radio is done with this entry; the link layer may read it.
    Finished,
}

/// One receive descriptor with a payload capacity of `SIZE` bytes.
#[derive(Clone, Copy, Debug)]
pub struct DataEntry<const SIZE: usize> {
    pub status: EntryStatus,
    /// Number of bytes written by the radio.
    pub length: usize,
    pub data: [u8; SIZE],
}

impl<const SIZE: usize> DataEntry<SIZE> {
    const EMPTY: Self = Self {
        status: EntryStatus::Pending,
        length: 0,
        data: [0; SIZE],
    };

    /// The bytes written by the radio.
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.length]
    }

    /// Capacity of this entry.
    pub const fn capacity(&self) -> usize {
        SIZE
    }
}

/// The outcome of [`DataQueue::receive()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Received {
    /// The data was stored in a free entry.
    Stored,
    /// The queue was full; the oldest unread entry was dropped to make room.
    Overwrote,
    /// The queue has not been set up.
    Unavailable,
}

/// A ring of `N` receive descriptors, each holding up to `SIZE` bytes.
pub struct DataQueue<const N: usize, const SIZE: usize> {
    entries: [DataEntry<SIZE>; N],
    /// The next entry the link layer reads. `None` until [`DataQueue::setup()`] is called.
    cursor: Option<usize>,
    /// The next entry the radio writes.
    producer: usize,
}

impl<const N: usize, const SIZE: usize> Default for DataQueue<N, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, const SIZE: usize> DataQueue<N, SIZE> {
    /// Create a queue that is not set up yet.
    ///
    /// Until [`DataQueue::setup()`] is called, [`DataQueue::peek_next()`] returns `None`
    /// and [`DataQueue::advance()`] does nothing.
    pub const fn new() -> Self {
        Self {
            entries: [DataEntry::<SIZE>::EMPTY; N],
            cursor: None,
            producer: 0,
        }
    }

    /// Reset every entry to [`EntryStatus::Pending`] and point both cursors at the first entry.
    pub fn setup(&mut self) {
        let _guard = IrqGuard::acquire();
        for entry in self.entries.iter_mut() {
            entry.status = EntryStatus::Pending;
            entry.length = 0;
        }
        self.cursor = if N > 0 { Some(0) } else { None };
        self.producer = 0;
    }

    /// Has [`DataQueue::setup()`] been called?
    pub const fn is_setup(&self) -> bool {
        self.cursor.is_some()
    }

    /// The index of the entry the link layer reads next.
    pub const fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The entry the link layer should inspect next.
    pub fn peek_next(&self) -> Option<&DataEntry<SIZE>> {
        self.cursor.map(|idx| &self.entries[idx])
    }

    /// Return the entry at the cursor to the radio and move to its successor.
    ///
    /// Call this once per entry consumed, after checking its status is
    /// [`EntryStatus::Finished`].
    pub fn advance(&mut self) {
        let _guard = IrqGuard::acquire();
        if let Some(idx) = self.cursor {
            let entry = &mut self.entries[idx];
            entry.status = EntryStatus::Pending;
            entry.length = 0;
            self.cursor = Some((idx + 1) % N);
        }
    }

    /// Iterate over the finished entries, oldest first, without consuming them.
    pub fn finished(&self) -> impl Iterator<Item = &DataEntry<SIZE>> + '_ {
        let start = self.cursor.unwrap_or(0);
        let count = if self.cursor.is_some() { N } else { 0 };
        (0..count)
            .map(move |i| &self.entries[(start + i) % N])
            .take_while(|e| e.status == EntryStatus::Finished)
    }

    /// Write `bytes` as the radio would.
    ///
    /// Data longer than `SIZE` is truncated. If the target entry still holds unread
    /// data, the oldest unread entry is dropped instead of stalling the radio.
    pub fn receive(&mut self, bytes: &[u8]) -> Received {
        let _guard = IrqGuard::acquire();
        let Some(cursor) = self.cursor else {
            return Received::Unavailable;
        };
        let idx = self.producer;
        let mut result = Received::Stored;
        if self.entries[idx].status == EntryStatus::Finished {
            // drop the oldest unread entry
            if idx == cursor {
                self.cursor = Some((cursor + 1) % N);
            }
            result = Received::Overwrote;
        }
        let entry = &mut self.entries[idx];
        entry.status = EntryStatus::Busy;
        let len = bytes.len().min(SIZE);
        entry.data[..len].copy_from_slice(&bytes[..len]);
        entry.length = len;
        entry.status = EntryStatus::Finished;
        self.producer = (idx + 1) % N;
        result
    }
}
