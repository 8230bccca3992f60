// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    collections::byte_stream::ByteStream,
    inetstack::protocols::tcp::{
        reassembler::Reassembler,
        segment::{
            TcpReceiverMessage,
            TcpSenderMessage,
        },
        SeqNumber,
    },
    runtime::network::consts::MAX_WINDOW_SIZE,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Receiving half of a TCP connection.
///
/// Turns inbound segments into reassembled stream bytes and reports back how far the stream has progressed and how
/// much more it can take.
#[derive(Debug)]
pub struct Receiver {
    reassembler: Reassembler,

    // Wire sequence number of the peer's SYN.  Set by the first SYN seen; a connection is established from then on.
    zero_point: Option<SeqNumber>,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl Receiver {
    pub fn new(reassembler: Reassembler) -> Self {
        Self {
            reassembler,
            zero_point: None,
        }
    }

    /// Processes an inbound segment.
    pub fn receive(&mut self, message: TcpSenderMessage) {
        if message.rst {
            warn!("receive(): connection reset by peer");
            self.reassembler.output_mut().set_error();
        }

        let zero_point: SeqNumber = match self.zero_point {
            Some(zero_point) => zero_point,
            None if message.syn => {
                debug!("receive(): SYN received, isn={}", message.seqno);
                self.zero_point = Some(message.seqno);
                message.seqno
            },
            None => {
                trace!("receive(): dropping segment received before SYN");
                return;
            },
        };

        // The first payload byte follows the SYN when the segment carries one.
        let payload_seqno: SeqNumber = if message.syn {
            message.seqno + SeqNumber::from(1)
        } else {
            message.seqno
        };
        let checkpoint: u64 = self.reassembler.output().bytes_pushed();
        let first_index: u64 = match payload_seqno.unwrap(zero_point, checkpoint).checked_sub(1) {
            Some(first_index) => first_index,
            None => {
                trace!("receive(): dropping segment that claims the SYN slot");
                return;
            },
        };

        self.reassembler.insert(first_index, &message.payload, message.fin);
    }

    /// Builds the acknowledgment and window advertisement for the peer's sender.
    pub fn send(&self) -> TcpReceiverMessage {
        let output: &ByteStream = self.reassembler.output();
        let window_size: u16 = output.available_capacity().min(u64::from(MAX_WINDOW_SIZE)) as u16;
        let ackno: Option<SeqNumber> = self
            .zero_point
            .map(|zero_point| SeqNumber::wrap(self.next_seqno_absolute(), zero_point));

        TcpReceiverMessage {
            ackno,
            window_size,
            rst: output.has_error(),
        }
    }

    /// Absolute sequence number of the next slot this receiver needs: SYN, then every byte written, then FIN.
    fn next_seqno_absolute(&self) -> u64 {
        let output: &ByteStream = self.reassembler.output();
        1 + output.bytes_pushed() + u64::from(output.is_closed())
    }

    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }

    /// Gives the application access to the inbound stream.
    pub fn stream_mut(&mut self) -> &mut ByteStream {
        self.reassembler.output_mut()
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
