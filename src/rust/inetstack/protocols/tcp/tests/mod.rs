// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.


use crate::{
    collections::byte_stream::ByteStream,
    inetstack::protocols::tcp::{
        reassembler::Reassembler,
        receiver::Receiver,
        segment::{
            TcpReceiverMessage,
            TcpSenderMessage,
        },
        sender::Sender,
        tests::simulator::{
            Impairments,
            LossyLink,
        },
        SeqNumber,
    },
    runtime::network::config::TcpConfig,
};
use ::anyhow::Result;

//=============================================================================

/// Outcome of a one-way transfer.
pub struct TransferReport {
    pub received: Vec<u8>,
    pub rounds: usize,
    pub max_consecutive_retransmissions: u32,
    pub segments_dropped: usize,
}

/// Cooks a buffer with a recognizable pattern.
pub fn cook_buffer(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

//=============================================================================

/// Moves `data` from a [Sender] to a [Receiver] across a pair of lossy links, one round per `tick_ms`, until the
/// receiving application has read the whole stream and the sender has nothing left in flight.
pub fn transfer(
    data: &[u8],
    isn: SeqNumber,
    config: &TcpConfig,
    impairments: Impairments,
    tick_ms: u64,
    max_rounds: usize,
) -> Result<TransferReport> {
    let capacity: u64 = config.get_stream_capacity();
    let mut sender: Sender = Sender::new(ByteStream::new(capacity), isn, config);
    let mut receiver: Receiver = Receiver::new(Reassembler::new(ByteStream::new(capacity)));
    let mut forward: LossyLink<TcpSenderMessage> = LossyLink::new(0xf0, impairments);
    let mut backward: LossyLink<TcpReceiverMessage> = LossyLink::new(0xba, impairments);

    let mut written: usize = 0;
    let mut received: Vec<u8> = Vec::new();
    let mut max_consecutive_retransmissions: u32 = 0;

    for round in 0..max_rounds {
        // Application writes.
        if !sender.stream().is_closed() {
            let stream: &mut ByteStream = sender.stream_mut();
            let before: u64 = stream.bytes_pushed();
            stream.push(&data[written..]);
            written += (stream.bytes_pushed() - before) as usize;
        }
        // A bare FIN closes the peer's stream on arrival, so only close once every written byte is acknowledged.
        let drained: bool = sender.stream().bytes_buffered() == 0 && sender.sequence_numbers_in_flight() == 0;
        if written == data.len() && drained && !sender.stream().is_closed() {
            sender.stream_mut().close();
        }

        sender.push(|message| forward.send(message));
        ::anyhow::ensure!(
            sender.sequence_numbers_in_flight() <= capacity,
            "more in flight than the receiver could ever accept"
        );

        for message in forward.deliver() {
            receiver.receive(message);
            backward.send(&receiver.send());
        }
        for message in backward.deliver() {
            sender.receive(&message);
        }

        // Application reads.
        let stream: &mut ByteStream = receiver.stream_mut();
        while stream.bytes_buffered() > 0 {
            let view: &[u8] = stream.peek();
            let len: u64 = view.len() as u64;
            received.extend_from_slice(view);
            stream.pop(len);
        }

        if stream.is_finished() && sender.sequence_numbers_in_flight() == 0 {
            return Ok(TransferReport {
                received,
                rounds: round + 1,
                max_consecutive_retransmissions,
                segments_dropped: forward.dropped(),
            });
        }

        sender.tick(tick_ms, |message| forward.send(message));
        max_consecutive_retransmissions = max_consecutive_retransmissions.max(sender.consecutive_retransmissions());
        ::anyhow::ensure!(
            !sender.has_exceeded_retransmissions(config),
            "sender gave up after {} retransmissions",
            sender.consecutive_retransmissions()
        );
    }

    ::anyhow::bail!("transfer did not complete in {} rounds", max_rounds)
}
