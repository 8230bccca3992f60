// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::collections::byte_stream::ByteStream;
use ::std::{
    cmp::Reverse,
    collections::BTreeMap,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Stream reassembler.
///
/// Accepts indexed substrings of a byte stream in any order, possibly overlapping or duplicated, and writes them into
/// its output [ByteStream] in order as soon as the next needed byte is known.
///
/// Reassembly Window:
///
/// ```text
///                       |<-------------- output available capacity -------------->|
///                       |                                                         |
///               next_needed_index                              next_needed_index + available capacity
///                       v                                                         v
///  ... -----------------|---------------------------------------------------------|----------------------------
///     written to output |   held in `pending` (with gaps) until the gaps fill     |    discarded on arrival
/// ```
///
/// Bytes left of the window were already delivered and bytes right of it could not be written even once every gap
/// fills, so both are dropped on insertion.
#[derive(Debug)]
pub struct Reassembler {
    // Stream the reassembled bytes are written to.
    output: ByteStream,

    // Bytes received but not yet written, keyed by absolute stream index.  No two entries overlap or touch.
    pending: BTreeMap<u64, Vec<u8>>,

    // Index of the first byte the output stream still needs.
    next_needed_index: u64,

    // Index one past the last byte of the stream, once the final substring has been seen.
    last_index_known: Option<u64>,

    // Total length of the entries in `pending`.
    bytes_pending: u64,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl Reassembler {
    /// Creates a reassembler that writes into `output`.
    pub fn new(output: ByteStream) -> Self {
        Self {
            output,
            pending: BTreeMap::new(),
            next_needed_index: 0,
            last_index_known: None,
            bytes_pending: 0,
        }
    }

    /// Inserts the substring `data`, whose first byte sits at absolute index `first_index`. `is_last` marks the
    /// substring that ends the stream; the output is closed once every byte before that end has been written, or as
    /// soon as an empty substring arrives after the end is known.
    pub fn insert(&mut self, first_index: u64, data: &[u8], is_last: bool) {
        if is_last && self.last_index_known.is_none() {
            self.last_index_known = Some(first_index + data.len() as u64);
        }

        if self.last_index_known.is_some() && data.is_empty() {
            if !self.output.is_closed() {
                trace!("insert(): empty substring after end of stream, closing at index {}", self.next_needed_index);
                self.output.close();
            }
            return;
        }

        if let Some((start, bytes)) = self.clamp_to_window(first_index, data) {
            let bytes: Vec<u8> = bytes.to_vec();
            self.store(start, bytes);
            self.flush();
        }

        if let Some(last_index) = self.last_index_known {
            if self.next_needed_index >= last_index && !self.output.is_closed() {
                trace!("insert(): end of stream reached at index {}", last_index);
                self.output.close();
            }
        }
    }

    /// Number of bytes held that have not been written to the output yet.
    pub fn bytes_pending(&self) -> u64 {
        self.bytes_pending
    }

    pub fn output(&self) -> &ByteStream {
        &self.output
    }

    /// Gives the reading side access to the output stream.
    pub fn output_mut(&mut self) -> &mut ByteStream {
        &mut self.output
    }

    /// Trims `data` to the part that falls inside the reassembly window.
    fn clamp_to_window<'a>(&self, first_index: u64, data: &'a [u8]) -> Option<(u64, &'a [u8])> {
        let window_start: u64 = self.next_needed_index;
        let window_end: u64 = window_start + self.output.available_capacity();
        let data_end: u64 = first_index + data.len() as u64;

        let start: u64 = first_index.max(window_start);
        let end: u64 = data_end.min(window_end);
        if start >= end {
            return None;
        }

        let from: usize = (start - first_index) as usize;
        let to: usize = (end - first_index) as usize;
        Some((start, &data[from..to]))
    }

    /// Stores a substring that lies inside the window, merging it with every stored entry it overlaps or touches.
    ///
    /// Entries are merged in (start, length descending) order.  An entry wholly covered by the one before it is
    /// dropped; otherwise the one before it contributes only the bytes ahead of the later entry's start.
    fn store(&mut self, start: u64, bytes: Vec<u8>) {
        if self.pending.get(&start) == Some(&bytes) {
            return;
        }
        let end: u64 = start + bytes.len() as u64;

        let neighbors: Vec<u64> = self
            .pending
            .range(..=end)
            .rev()
            .take_while(|(neighbor_start, neighbor)| **neighbor_start + neighbor.len() as u64 >= start)
            .map(|(neighbor_start, _)| *neighbor_start)
            .collect();

        let mut segments: Vec<(u64, Vec<u8>)> = Vec::with_capacity(neighbors.len() + 1);
        for neighbor_start in neighbors.into_iter().rev() {
            if let Some(neighbor) = self.pending.remove(&neighbor_start) {
                self.bytes_pending -= neighbor.len() as u64;
                segments.push((neighbor_start, neighbor));
            }
        }
        segments.push((start, bytes));
        // Stable, so a stored entry precedes a new one with the same start and length.
        segments.sort_by_key(|(segment_start, segment)| (*segment_start, Reverse(segment.len())));

        let mut segments = segments.into_iter();
        let (merged_start, mut merged): (u64, Vec<u8>) = match segments.next() {
            Some(first) => first,
            None => unreachable!("store(): at least the inserted segment must be present"),
        };
        for (segment_start, segment) in segments {
            let merged_end: u64 = merged_start + merged.len() as u64;
            let segment_end: u64 = segment_start + segment.len() as u64;
            debug_assert!(segment_start <= merged_end);
            if merged_end >= segment_end {
                continue;
            }
            merged.truncate((segment_start - merged_start) as usize);
            merged.extend_from_slice(&segment);
        }

        trace!(
            "store(): pending [{}, {})",
            merged_start,
            merged_start + merged.len() as u64
        );
        self.bytes_pending += merged.len() as u64;
        self.pending.insert(merged_start, merged);
    }

    /// Writes the lowest stored entry to the output if it starts at the next needed index.
    fn flush(&mut self) {
        let entry = match self.pending.first_entry() {
            Some(entry) if *entry.key() <= self.next_needed_index => entry,
            _ => return,
        };
        let (start, bytes): (u64, Vec<u8>) = entry.remove_entry();
        debug_assert_eq!(start, self.next_needed_index);

        let len: u64 = bytes.len() as u64;
        self.bytes_pending -= len;
        self.output.push(&bytes);
        self.next_needed_index += len;
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
