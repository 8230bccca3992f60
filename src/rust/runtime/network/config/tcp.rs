// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//==============================================================================
// Imports
//==============================================================================

use crate::runtime::network::consts::{
    DEFAULT_INITIAL_RTO,
    DEFAULT_MAX_PAYLOAD_SIZE,
    DEFAULT_MAX_RETRANSMISSIONS,
    DEFAULT_STREAM_CAPACITY,
};
use ::std::time::Duration;

//==============================================================================
// Structures
//==============================================================================

/// TCP Configuration Descriptor
#[derive(Clone, Debug)]
pub struct TcpConfig {
    /// Retransmission Timeout Used Before Any Backoff
    initial_rto: Duration,
    /// Maximum Number of Payload Bytes in a Single Segment
    max_payload_size: usize,
    /// Capacity of Inbound and Outbound Byte Streams
    stream_capacity: u64,
    /// Number of Consecutive Retransmissions Tolerated Before Aborting
    max_retransmissions: u32,
}

//==============================================================================
// Associate Functions
//==============================================================================

/// Associate Functions for TCP Configuration Descriptor
impl TcpConfig {
    /// Creates a TCP Configuration Descriptor.
    pub fn new(
        initial_rto: Option<Duration>,
        max_payload_size: Option<usize>,
        stream_capacity: Option<u64>,
        max_retransmissions: Option<u32>,
    ) -> Self {
        let mut options = Self::default();

        if let Some(value) = initial_rto {
            options = options.set_initial_rto(value);
        }
        if let Some(value) = max_payload_size {
            options = options.set_max_payload_size(value);
        }
        if let Some(value) = stream_capacity {
            options = options.set_stream_capacity(value);
        }
        if let Some(value) = max_retransmissions {
            options = options.set_max_retransmissions(value);
        }

        options
    }

    /// Gets the initial retransmission timeout in the target [TcpConfig].
    pub fn get_initial_rto(&self) -> Duration {
        self.initial_rto
    }

    /// Gets the initial retransmission timeout of the target [TcpConfig] in whole milliseconds.
    pub fn get_initial_rto_ms(&self) -> u64 {
        u64::try_from(self.initial_rto.as_millis()).unwrap_or(u64::MAX)
    }

    /// Gets the maximum payload size in the target [TcpConfig].
    pub fn get_max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    /// Gets the byte stream capacity in the target [TcpConfig].
    pub fn get_stream_capacity(&self) -> u64 {
        self.stream_capacity
    }

    /// Gets the number of tolerated consecutive retransmissions in the target [TcpConfig].
    pub fn get_max_retransmissions(&self) -> u32 {
        self.max_retransmissions
    }

    /// Sets the initial retransmission timeout in the target [TcpConfig].
    fn set_initial_rto(mut self, value: Duration) -> Self {
        assert!(value >= Duration::from_millis(1));
        self.initial_rto = value;
        self
    }

    /// Sets the maximum payload size in the target [TcpConfig].
    fn set_max_payload_size(mut self, value: usize) -> Self {
        assert!(value > 0);
        self.max_payload_size = value;
        self
    }

    /// Sets the byte stream capacity in the target [TcpConfig].
    fn set_stream_capacity(mut self, value: u64) -> Self {
        assert!(value > 0);
        self.stream_capacity = value;
        self
    }

    /// Sets the number of tolerated consecutive retransmissions in the target [TcpConfig].
    fn set_max_retransmissions(mut self, value: u32) -> Self {
        assert!(value > 0);
        self.max_retransmissions = value;
        self
    }
}

//==============================================================================
// Trait Implementations
//==============================================================================

/// Default Trait Implementation for TCP Configuration Descriptor
impl Default for TcpConfig {
    /// Creates a TCP Configuration Descriptor with the default values.
    fn default() -> Self {
        TcpConfig {
            initial_rto: DEFAULT_INITIAL_RTO,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            stream_capacity: DEFAULT_STREAM_CAPACITY,
            max_retransmissions: DEFAULT_MAX_RETRANSMISSIONS,
        }
    }
}

//==============================================================================
// Unit Tests
//==============================================================================
