// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod isn_generator;
pub mod reassembler;
pub mod receiver;
mod rto;
pub mod segment;
pub mod sender;
mod sequence_number;

#[cfg(test)]
mod tests;

pub use self::{
    isn_generator::IsnGenerator,
    sequence_number::SeqNumber,
};
