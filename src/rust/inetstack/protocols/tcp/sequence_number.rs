// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

// This file defines a type to represent a TCP Sequence Number.
//
// RFC 793, Section 3.3 defines TCP sequence numbers.  The sequence number space ranges from 0 to 2^32 - 1.  This space
// "wraps around", so all arithmetic dealing with sequence numbers must be performed modulo 2^32.  Everything above the
// wire works with absolute sequence numbers instead: unbounded 64-bit counters where 0 is the SYN.  Converting a wire
// value back into an absolute one is ambiguous (every value recurs once every 2^32), so the conversion picks the
// candidate nearest to a caller-supplied checkpoint.
//

use ::std::{
    convert::From,
    fmt,
};

/// Width of one wrap-around of the wire sequence number space.
const EPOCH: u64 = 1 << 32;

// Internally, we store sequence numbers as unsigned 32-bit integers.
//
// We allow our sequence numbers to be cloned, copied, created, and checked for equality the same as for u32.  We
// restrict all other behaviors to those we explicitly define below.
//
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SeqNumber {
    value: u32,
}

impl SeqNumber {
    /// Converts an absolute sequence number into a wire sequence number, given the wire value of absolute zero.
    pub fn wrap(n: u64, zero_point: SeqNumber) -> SeqNumber {
        SeqNumber::from(n as u32) + zero_point
    }

    /// Converts a wire sequence number into the absolute sequence number closest to `checkpoint`.
    ///
    /// The result is exact as long as the true absolute value lies within 2^31 of `checkpoint`.  On a tie, the
    /// candidate in the checkpoint's own epoch wins, then the one above it, then the one below it.
    pub fn unwrap(self, zero_point: SeqNumber, checkpoint: u64) -> u64 {
        let offset: u64 = u64::from(u32::from(self - zero_point));
        let base: u64 = offset + EPOCH * (checkpoint / EPOCH);

        let mut nearest: u64 = base;
        let mut distance: u64 = checkpoint.abs_diff(base);
        let neighbors: [Option<u64>; 2] = [base.checked_add(EPOCH), base.checked_sub(EPOCH)];
        for candidate in neighbors.into_iter().flatten() {
            if checkpoint.abs_diff(candidate) < distance {
                distance = checkpoint.abs_diff(candidate);
                nearest = candidate;
            }
        }

        nearest
    }
}

// To create a u32 from a sequence number.
impl From<SeqNumber> for u32 {
    #[inline]
    fn from(item: SeqNumber) -> u32 {
        item.value
    }
}

// To create a sequence number from a u32.
impl From<u32> for SeqNumber {
    #[inline]
    fn from(item: u32) -> Self {
        SeqNumber { value: item }
    }
}

// Display a sequence number.
impl std::fmt::Display for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.value.fmt(f)
    }
}

// Add two sequence numbers together.
impl std::ops::Add for SeqNumber {
    type Output = SeqNumber;

    #[inline]
    fn add(self, other: SeqNumber) -> SeqNumber {
        (self.value.wrapping_add(other.value)).into()
    }
}

// Subtract a sequence number from another one.
impl std::ops::Sub for SeqNumber {
    type Output = SeqNumber;

    #[inline]
    fn sub(self, other: SeqNumber) -> SeqNumber {
        (self.value.wrapping_sub(other.value)).into()
    }
}

// Note that we don't define std::cmp::PartialOrd or std::cmp::Ord for sequence numbers, as there is no total order for
// them.  Anything that needs ordering unwraps into the absolute space first.
