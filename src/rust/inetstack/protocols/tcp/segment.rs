// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::inetstack::protocols::tcp::SeqNumber;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Segment travelling from a sender to a receiver.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TcpSenderMessage {
    /// Wire sequence number of the first slot this segment occupies (the SYN if set, else the first payload byte).
    pub seqno: SeqNumber,
    pub syn: bool,
    pub payload: Vec<u8>,
    pub fin: bool,
    pub rst: bool,
}

/// Acknowledgment and flow control information travelling from a receiver back to a sender.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TcpReceiverMessage {
    /// Next sequence number the receiver needs. Absent until the receiver has seen a SYN.
    pub ackno: Option<SeqNumber>,
    pub window_size: u16,
    pub rst: bool,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl TcpSenderMessage {
    /// Number of sequence numbers this segment consumes.
    pub fn sequence_length(&self) -> u64 {
        self.payload.len() as u64 + u64::from(self.syn) + u64::from(self.fin)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
