// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

// TCP Retransmission Timer.
// Time only moves when the owner calls advance(); there is no clock in here.  Backoff follows RFC 6298 Section 5.5
// (double the timeout on every expiry) but without an upper bound, and there is no RTT sampling.

#[derive(Debug)]
pub struct RetransmissionTimer {
    // Retransmission timeout restored by every reset.
    initial_rto_ms: u64,

    // Retransmission timeout currently in force.
    rto_ms: u64,

    // Time accumulated since the timer was last restarted.
    elapsed_ms: u64,
}

impl RetransmissionTimer {
    /// Initializes a timer with the given initial timeout.
    pub fn new(initial_rto_ms: u64) -> Self {
        Self {
            initial_rto_ms,
            rto_ms: initial_rto_ms,
            elapsed_ms: 0,
        }
    }

    /// Accounts for `ms` more milliseconds of running time.
    pub fn advance(&mut self, ms: u64) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(ms);
    }

    pub fn has_expired(&self) -> bool {
        self.elapsed_ms >= self.rto_ms
    }

    /// Starts counting from zero again, keeping the current timeout.
    pub fn restart(&mut self) {
        self.elapsed_ms = 0;
    }

    /// Restarts the timer and forgets any backoff.
    pub fn reset(&mut self) {
        self.rto_ms = self.initial_rto_ms;
        self.elapsed_ms = 0;
    }

    /// Performs an exponential "back off" of the RTO (doubles the current timeout).
    pub fn back_off(&mut self) {
        self.rto_ms = self.rto_ms.saturating_mul(2);
    }

    /// Gets the current RTO value.
    pub fn rto_ms(&self) -> u64 {
        self.rto_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}
