// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    collections::byte_stream::ByteStream,
    inetstack::protocols::tcp::{
        rto::RetransmissionTimer,
        segment::{
            TcpReceiverMessage,
            TcpSenderMessage,
        },
        SeqNumber,
    },
    runtime::network::config::TcpConfig,
};
use ::std::{
    collections::VecDeque,
    fmt,
};

//======================================================================================================================
// Structures
//======================================================================================================================

// Structure of entries on our unacknowledged queue.
struct UnackedSegment {
    // Absolute sequence number of the first slot the segment occupies.
    abs_seqno: u64,
    message: TcpSenderMessage,
}

/// Sending half of a TCP connection.
pub struct Sender {
    //
    // Send Sequence Space (absolute):
    //
    //                     |<------------------send window (at least 1)------------------>|
    //                     |                                                              |
    //               acked_abs_seqno              next_abs_seqno                acked_abs_seqno + window
    //                     v                             v                                v
    // ... ----------------|-----------------------------|--------------------------------|-----------------------
    //       acknowledged  |       unacknowledged        |        allowed to send         |  not yet allowed
    //
    // Absolute sequence number 0 is the SYN, so the first payload byte is 1.
    //

    // Outbound stream; the application writes into it, push() drains it.
    input: ByteStream,

    // Initial sequence number: wire value of absolute sequence number 0.
    isn: SeqNumber,

    max_payload_size: usize,

    // Absolute sequence number of the next slot to be sent.
    next_abs_seqno: u64,

    // Highest absolute acknowledgment number received so far.
    acked_abs_seqno: u64,

    // Sequence length of every segment on the unacknowledged queue.
    bytes_in_flight: u64,

    // Receive window last advertised by our peer.
    window_size: u16,

    // Queue of unacknowledged sent data, in transmission order.  RFC 793 calls this the "retransmission queue".
    unacked_queue: VecDeque<UnackedSegment>,

    timer: RetransmissionTimer,

    consecutive_retransmissions: u32,

    fin_sent: bool,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl Sender {
    /// Creates a sender that reads from `input` and numbers its segments starting at `isn`.
    pub fn new(input: ByteStream, isn: SeqNumber, config: &TcpConfig) -> Self {
        Self {
            input,
            isn,
            max_payload_size: config.get_max_payload_size(),
            next_abs_seqno: 0,
            acked_abs_seqno: 0,
            bytes_in_flight: 0,
            // Until the peer says otherwise, there is room for exactly the SYN.
            window_size: 1,
            unacked_queue: VecDeque::new(),
            timer: RetransmissionTimer::new(config.get_initial_rto_ms()),
            consecutive_retransmissions: 0,
            fin_sent: false,
        }
    }

    /// Sends as much of the outbound stream as the peer's window allows, handing each new segment to `transmit`.
    ///
    /// A zero window is treated as a window of one so that a single byte (or FIN) keeps probing the peer.
    pub fn push<F: FnMut(&TcpSenderMessage)>(&mut self, mut transmit: F) {
        let window: u64 = u64::from(self.window_size.max(1));
        if self.bytes_in_flight >= window {
            return;
        }

        // Room for payload, leaving a slot for the SYN if it has yet to go out.
        let syn_pending: bool = self.next_abs_seqno == 0;
        let budget: u64 = (window - self.bytes_in_flight).saturating_sub(u64::from(syn_pending));

        let mut payload: Vec<u8> = Vec::new();
        while self.input.bytes_buffered() > 0 && (payload.len() as u64) < budget {
            let view: &[u8] = self.input.peek();
            assert!(!view.is_empty(), "push(): stream has buffered bytes but peek() returned none");
            let len: usize = view.len().min((budget - payload.len() as u64) as usize);
            payload.extend_from_slice(&view[..len]);
            self.input.pop(len as u64);
        }

        let mut remaining: &[u8] = &payload;
        loop {
            let syn: bool = self.next_abs_seqno == 0;
            let fin_pending: bool = !self.fin_sent && self.input.is_closed();
            if remaining.is_empty() && !syn && !fin_pending {
                break;
            }

            let len: usize = remaining.len().min(self.max_payload_size);
            let is_tail: bool = len == remaining.len();
            let mut message: TcpSenderMessage = TcpSenderMessage {
                seqno: SeqNumber::wrap(self.next_abs_seqno, self.isn),
                syn,
                payload: remaining[..len].to_vec(),
                fin: false,
                rst: self.input.has_error(),
            };
            remaining = &remaining[len..];

            // FIN rides on the last segment only if its extra slot still fits in the window.
            if fin_pending && is_tail && self.bytes_in_flight + message.sequence_length() < window {
                message.fin = true;
                self.fin_sent = true;
            }

            debug_assert!(message.sequence_length() > 0);
            self.send_segment(message, &mut transmit);

            if is_tail {
                break;
            }
        }
    }

    /// Transmits a new segment and places it on the unacknowledged queue.
    fn send_segment<F: FnMut(&TcpSenderMessage)>(&mut self, message: TcpSenderMessage, transmit: &mut F) {
        trace!(
            "send_segment(): seqno={} syn={} len={} fin={}",
            message.seqno,
            message.syn,
            message.payload.len(),
            message.fin
        );
        transmit(&message);

        let sequence_length: u64 = message.sequence_length();
        self.unacked_queue.push_back(UnackedSegment {
            abs_seqno: self.next_abs_seqno,
            message,
        });
        self.next_abs_seqno += sequence_length;
        self.bytes_in_flight += sequence_length;
    }

    /// Builds a segment that occupies no sequence space, for carrying flags when there is nothing to send.
    pub fn make_empty_message(&self) -> TcpSenderMessage {
        TcpSenderMessage {
            seqno: SeqNumber::wrap(self.next_abs_seqno, self.isn),
            syn: false,
            payload: Vec::new(),
            fin: false,
            rst: self.input.has_error(),
        }
    }

    /// Processes an acknowledgment and window update from the peer's receiver.
    pub fn receive(&mut self, message: &TcpReceiverMessage) {
        if message.rst {
            warn!("receive(): connection reset by peer");
            self.input.set_error();
            return;
        }

        self.window_size = message.window_size;
        debug!("receive(): window size -> {}", self.window_size);

        let ackno: SeqNumber = match message.ackno {
            Some(ackno) => ackno,
            None => return,
        };
        let abs_ackno: u64 = ackno.unwrap(self.isn, self.acked_abs_seqno);
        if abs_ackno > self.next_abs_seqno {
            warn!(
                "receive(): ignoring ack for unsent data (ackno={}, next={})",
                abs_ackno, self.next_abs_seqno
            );
            return;
        }
        if abs_ackno <= self.acked_abs_seqno {
            return;
        }

        self.acked_abs_seqno = abs_ackno;
        self.timer.reset();
        self.consecutive_retransmissions = 0;

        // Remove acknowledged data from the unacknowledged (a.k.a. retransmission) queue.
        while let Some(segment) = self.unacked_queue.front() {
            let sequence_length: u64 = segment.message.sequence_length();
            if segment.abs_seqno + sequence_length > abs_ackno {
                break;
            }
            self.bytes_in_flight -= sequence_length;
            self.unacked_queue.pop_front();
        }
        debug!(
            "receive(): acked up to {}, {} in flight",
            self.acked_abs_seqno, self.bytes_in_flight
        );
    }

    /// Advances the retransmission timer by `ms_since_last_tick`, retransmitting the oldest unacknowledged segment
    /// through `transmit` if it expires.
    pub fn tick<F: FnMut(&TcpSenderMessage)>(&mut self, ms_since_last_tick: u64, mut transmit: F) {
        let segment: &UnackedSegment = match self.unacked_queue.front() {
            Some(segment) => segment,
            None => return,
        };

        self.timer.advance(ms_since_last_tick);
        if !self.timer.has_expired() {
            return;
        }

        trace!(
            "tick(): retransmitting seqno={} after {} ms",
            segment.message.seqno,
            self.timer.elapsed_ms()
        );
        transmit(&segment.message);

        // A closed window means the peer is not ready, not that the segment was lost, so don't back off.
        if self.window_size > 0 {
            self.consecutive_retransmissions += 1;
            self.timer.back_off();
        }
        self.timer.restart();
    }

    /// Number of sequence numbers sent but not yet acknowledged.
    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.bytes_in_flight
    }

    pub fn consecutive_retransmissions(&self) -> u32 {
        self.consecutive_retransmissions
    }

    /// Whether the connection has been retransmitting for longer than the configuration tolerates.
    pub fn has_exceeded_retransmissions(&self, config: &TcpConfig) -> bool {
        self.consecutive_retransmissions > config.get_max_retransmissions()
    }

    pub fn stream(&self) -> &ByteStream {
        &self.input
    }

    /// Gives the application access to the outbound stream.
    pub fn stream_mut(&mut self) -> &mut ByteStream {
        &mut self.input
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl fmt::Debug for Sender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Sender")
            .field("isn", &self.isn)
            .field("next_abs_seqno", &self.next_abs_seqno)
            .field("acked_abs_seqno", &self.acked_abs_seqno)
            .field("bytes_in_flight", &self.bytes_in_flight)
            .field("window_size", &self.window_size)
            .field("rto_ms", &self.timer.rto_ms())
            .field("consecutive_retransmissions", &self.consecutive_retransmissions)
            .field("fin_sent", &self.fin_sent)
            .finish()
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
