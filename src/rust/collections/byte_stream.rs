// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::std::collections::VecDeque;

//======================================================================================================================
// Structures
//======================================================================================================================

/// A single producer, single consumer, capacity-bounded byte queue.
///
/// The producer side pushes bytes and signals end of stream through [ByteStream::close]. The consumer side peeks at
/// and pops buffered bytes. Either side may flag the stream as errored, which is sticky.
#[derive(Debug)]
pub struct ByteStream {
    // Bytes pushed but not yet popped.
    buffer: VecDeque<u8>,
    // Maximum number of bytes buffered at any time.
    capacity: u64,
    // Cumulative number of bytes accepted by push().
    bytes_pushed: u64,
    // Cumulative number of bytes removed by pop().
    bytes_popped: u64,
    closed: bool,
    error: bool,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl ByteStream {
    /// Creates a byte stream that buffers at most `capacity` bytes.
    pub fn new(capacity: u64) -> Self {
        Self {
            buffer: VecDeque::new(),
            capacity,
            bytes_pushed: 0,
            bytes_popped: 0,
            closed: false,
            error: false,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    //==================================================================================================================
    // Producer Side
    //==================================================================================================================

    /// Pushes as many bytes of `data` as fit in the remaining capacity. Anything beyond that is dropped, as is
    /// everything pushed after the stream was closed.
    pub fn push(&mut self, data: &[u8]) {
        if self.closed {
            return;
        }
        let len: usize = data.len().min(self.available_capacity() as usize);
        self.buffer.extend(&data[..len]);
        self.bytes_pushed += len as u64;
    }

    /// Signals that no more bytes will be pushed.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Flags the stream as errored.
    pub fn set_error(&mut self) {
        self.error = true;
    }

    /// Number of bytes that can still be pushed.
    pub fn available_capacity(&self) -> u64 {
        self.capacity - self.buffer.len() as u64
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn bytes_pushed(&self) -> u64 {
        self.bytes_pushed
    }

    //==================================================================================================================
    // Consumer Side
    //==================================================================================================================

    /// Borrows the bytes at the front of the stream. The view is non-empty whenever bytes are buffered, but it may
    /// not cover all of them.
    pub fn peek(&self) -> &[u8] {
        let (front, back): (&[u8], &[u8]) = self.buffer.as_slices();
        if front.is_empty() {
            back
        } else {
            front
        }
    }

    /// Removes up to `len` bytes from the front of the stream.
    pub fn pop(&mut self, len: u64) {
        let len: usize = len.min(self.buffer.len() as u64) as usize;
        self.buffer.drain(..len);
        self.bytes_popped += len as u64;
    }

    pub fn bytes_buffered(&self) -> u64 {
        self.buffer.len() as u64
    }

    pub fn bytes_popped(&self) -> u64 {
        self.bytes_popped
    }

    /// Whether the stream was closed and every pushed byte has been popped.
    pub fn is_finished(&self) -> bool {
        self.closed && self.buffer.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.error
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
