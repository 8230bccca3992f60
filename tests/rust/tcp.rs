// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::anyhow::Result;
use ::minnow::{
    runtime::logging,
    ByteStream,
    Config,
    IsnGenerator,
    Reassembler,
    Receiver,
    Sender,
    SeqNumber,
    TcpConfig,
    TcpReceiverMessage,
    TcpSenderMessage,
};
use ::std::{
    fs,
    net::{
        Ipv4Addr,
        SocketAddrV4,
    },
    path::PathBuf,
};

//======================================================================================================================
// Constants
//======================================================================================================================

const CONFIG: &str = "
tcp:
  initial_rto_ms: 100
  max_payload_size: 100
  stream_capacity: 1000
  max_retransmissions: 4
";

//======================================================================================================================
// Helpers
//======================================================================================================================

fn load_config() -> Result<TcpConfig> {
    logging::initialize();
    let config: Config = CONFIG.parse()?;
    Ok(config.tcp_config()?)
}

fn new_pair(isn: SeqNumber, config: &TcpConfig) -> (Sender, Receiver) {
    let capacity: u64 = config.get_stream_capacity();
    let sender: Sender = Sender::new(ByteStream::new(capacity), isn, config);
    let receiver: Receiver = Receiver::new(Reassembler::new(ByteStream::new(capacity)));
    (sender, receiver)
}

/// Reads everything the receiving application can see.
fn drain(stream: &mut ByteStream) -> Vec<u8> {
    let mut data: Vec<u8> = Vec::new();
    while stream.bytes_buffered() > 0 {
        let view: &[u8] = stream.peek();
        let len: u64 = view.len() as u64;
        data.extend_from_slice(view);
        stream.pop(len);
    }
    data
}

//======================================================================================================================
// Tests
//======================================================================================================================

/// Tests that a short closed stream fits in a single segment carrying both SYN and FIN.
#[test]
fn syn_payload_fin_in_one_segment() -> Result<()> {
    let config: TcpConfig = load_config()?;
    let isn: SeqNumber = SeqNumber::from(0xffff_fffe);
    let (mut sender, mut receiver) = new_pair(isn, &config);

    sender.receive(&TcpReceiverMessage {
        ackno: None,
        window_size: 10,
        rst: false,
    });
    sender.stream_mut().push(b"cat");
    sender.stream_mut().close();

    let mut sent: Vec<TcpSenderMessage> = Vec::new();
    sender.push(|message| sent.push(message.clone()));
    minnow::ensure_eq!(sent.len(), 1);
    minnow::ensure_eq!(sent[0].seqno, isn);
    minnow::ensure_eq!(sent[0].syn, true);
    minnow::ensure_eq!(sent[0].payload.as_slice(), b"cat");
    minnow::ensure_eq!(sent[0].fin, true);
    minnow::ensure_eq!(sender.sequence_numbers_in_flight(), 5);

    receiver.receive(sent.remove(0));
    let ack: TcpReceiverMessage = receiver.send();
    minnow::ensure_eq!(ack.ackno, Some(isn + SeqNumber::from(5)));
    minnow::ensure_eq!(ack.window_size, 997);

    sender.receive(&ack);
    minnow::ensure_eq!(sender.sequence_numbers_in_flight(), 0);
    minnow::ensure_eq!(drain(receiver.stream_mut()).as_slice(), b"cat");
    minnow::ensure_eq!(receiver.stream_mut().is_finished(), true);
    Ok(())
}

/// Tests that a lost segment is retransmitted once the timer expires, and only then.
#[test]
fn lost_segment_is_retransmitted() -> Result<()> {
    let config: TcpConfig = load_config()?;
    let isn: SeqNumber = SeqNumber::from(7);
    let (mut sender, mut receiver) = new_pair(isn, &config);

    let mut syn: Vec<TcpSenderMessage> = Vec::new();
    sender.push(|message| syn.push(message.clone()));
    minnow::ensure_eq!(syn.len(), 1);
    receiver.receive(syn.remove(0));
    sender.receive(&receiver.send());

    sender.stream_mut().push(b"hello");
    let mut lost: Vec<TcpSenderMessage> = Vec::new();
    sender.push(|message| lost.push(message.clone()));
    minnow::ensure_eq!(lost.len(), 1);

    let mut retransmitted: Vec<TcpSenderMessage> = Vec::new();
    sender.tick(config.get_initial_rto_ms() - 1, |message| retransmitted.push(message.clone()));
    minnow::ensure_eq!(retransmitted.len(), 0);
    sender.tick(1, |message| retransmitted.push(message.clone()));
    minnow::ensure_eq!(retransmitted.len(), 1);
    minnow::ensure_eq!(&retransmitted[0], &lost[0]);
    minnow::ensure_eq!(sender.consecutive_retransmissions(), 1);

    receiver.receive(retransmitted.remove(0));
    sender.receive(&receiver.send());
    minnow::ensure_eq!(sender.sequence_numbers_in_flight(), 0);
    minnow::ensure_eq!(sender.consecutive_retransmissions(), 0);
    minnow::ensure_eq!(drain(receiver.stream_mut()).as_slice(), b"hello");
    Ok(())
}

/// Tests a loopback transfer configured from a file, with a generated initial sequence number.
#[test]
fn loopback_from_config_file() -> Result<()> {
    logging::initialize();
    let path: PathBuf = ::std::env::temp_dir().join(format!("minnow-tcp-{}.yaml", ::std::process::id()));
    fs::write(&path, CONFIG)?;
    let loaded: Result<Config, _> = Config::new(&path.to_string_lossy());
    fs::remove_file(&path)?;
    let config: TcpConfig = loaded?.tcp_config()?;

    let local: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 1), 80);
    let remote: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 2), 12345);
    let isn: SeqNumber = IsnGenerator::new(0xcafe).generate(&local, &remote);
    let (mut sender, mut receiver) = new_pair(isn, &config);

    let data: Vec<u8> = (0..5000).map(|i| (i % 256) as u8).collect();
    let mut written: usize = 0;
    let mut received: Vec<u8> = Vec::new();

    for _ in 0..100 {
        if !sender.stream().is_closed() {
            let before: u64 = sender.stream().bytes_pushed();
            sender.stream_mut().push(&data[written..]);
            written += (sender.stream().bytes_pushed() - before) as usize;
            if written == data.len() {
                sender.stream_mut().close();
            }
        }

        let mut segments: Vec<TcpSenderMessage> = Vec::new();
        sender.push(|message| segments.push(message.clone()));
        for segment in segments {
            minnow::ensure_eq!(segment.payload.len() <= config.get_max_payload_size(), true);
            receiver.receive(segment);
            sender.receive(&receiver.send());
        }
        received.extend(drain(receiver.stream_mut()));

        if receiver.stream_mut().is_finished() && sender.sequence_numbers_in_flight() == 0 {
            minnow::ensure_eq!(received, data);
            minnow::ensure_eq!(sender.consecutive_retransmissions(), 0);
            return Ok(());
        }
        sender.tick(10, |_| ());
    }

    ::anyhow::bail!("loopback transfer did not complete")
}

/// Tests that an error on the sending stream reaches the receiving stream.
#[test]
fn reset_propagates() -> Result<()> {
    let config: TcpConfig = load_config()?;
    let (mut sender, mut receiver) = new_pair(SeqNumber::from(0), &config);

    let mut syn: Vec<TcpSenderMessage> = Vec::new();
    sender.push(|message| syn.push(message.clone()));
    receiver.receive(syn.remove(0));
    sender.receive(&receiver.send());

    sender.stream_mut().set_error();
    let rst: TcpSenderMessage = sender.make_empty_message();
    minnow::ensure_eq!(rst.rst, true);
    minnow::ensure_eq!(rst.sequence_length(), 0);

    receiver.receive(rst);
    minnow::ensure_eq!(receiver.stream_mut().has_error(), true);
    minnow::ensure_eq!(receiver.send().rst, true);
    Ok(())
}
