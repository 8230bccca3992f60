// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::inetstack::protocols::tcp::SeqNumber;
use ::rand::{
    prelude::SmallRng,
    Rng,
    SeedableRng,
};
use ::std::{
    net::SocketAddrV4,
    num::Wrapping,
};

/// Initial sequence number generator. Mixes the connection's endpoints with a secret nonce so that ISNs are hard to
/// predict from outside, plus a counter so that reconnecting the same pair does not reuse an ISN.
pub struct IsnGenerator {
    nonce: u32,
    counter: Wrapping<u16>,
}

impl IsnGenerator {
    pub fn new(nonce: u32) -> Self {
        Self {
            nonce,
            counter: Wrapping(0),
        }
    }

    /// Creates a generator whose nonce is drawn from a seeded random number generator.
    pub fn from_seed(rng_seed: [u8; 32]) -> Self {
        let mut rng: SmallRng = SmallRng::from_seed(rng_seed);
        let nonce: u32 = rng.gen();
        Self::new(nonce)
    }

    pub fn generate(&mut self, local: &SocketAddrV4, remote: &SocketAddrV4) -> SeqNumber {
        let crc: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_CKSUM);
        let mut digest = crc.digest();
        digest.update(&remote.ip().octets());
        digest.update(&remote.port().to_be_bytes());
        digest.update(&local.ip().octets());
        digest.update(&local.port().to_be_bytes());
        digest.update(&self.nonce.to_be_bytes());
        let digest: u32 = digest.finalize();
        let isn = SeqNumber::from(digest.wrapping_add(self.counter.0 as u32));
        self.counter += Wrapping(1);
        trace!("generate(): local={:?}, remote={:?}, isn={}", local, remote, isn);
        isn
    }
}
