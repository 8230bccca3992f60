// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::std::time::Duration;

//======================================================================================================================
// Constants
//======================================================================================================================

/// Default Maximum Payload Size of a TCP Segment
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 1000;

/// Default Capacity of the Byte Streams Attached to a Connection
pub const DEFAULT_STREAM_CAPACITY: u64 = 64000;

/// Initial Retransmission Timeout for TCP
pub const DEFAULT_INITIAL_RTO: Duration = Duration::from_millis(1000);

/// Number of Consecutive Retransmissions Before Giving Up on a Connection
pub const DEFAULT_MAX_RETRANSMISSIONS: u32 = 8;

/// Largest window a receiver can advertise without window scaling.
pub const MAX_WINDOW_SIZE: u16 = u16::MAX;
