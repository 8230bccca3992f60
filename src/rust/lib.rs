// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(clippy::all)]

#[macro_use]
extern crate log;

//======================================================================================================================
// Exports
//======================================================================================================================

pub mod collections;
pub mod config;
pub mod inetstack;
pub mod runtime;

pub use self::{
    collections::byte_stream::ByteStream,
    config::Config,
    inetstack::protocols::tcp::{
        reassembler::Reassembler,
        receiver::Receiver,
        segment::{
            TcpReceiverMessage,
            TcpSenderMessage,
        },
        sender::Sender,
        IsnGenerator,
        SeqNumber,
    },
    runtime::{
        fail::Fail,
        network::config::TcpConfig,
    },
};

//======================================================================================================================
// Macros
//======================================================================================================================

/// Ensures that two expressions are equal, bailing out of the enclosing [anyhow::Result] function otherwise.
#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr $(,)?) => {{
        match (&$left, &$right) {
            (left_val, right_val) => {
                ::anyhow::ensure!(
                    *left_val == *right_val,
                    "ensure_eq failed: `{:?}` != `{:?}` ({}:{})",
                    left_val,
                    right_val,
                    file!(),
                    line!()
                );
            },
        }
    }};
}

/// Ensures that two expressions are not equal, bailing out of the enclosing [anyhow::Result] function otherwise.
#[macro_export]
macro_rules! ensure_neq {
    ($left:expr, $right:expr $(,)?) => {{
        match (&$left, &$right) {
            (left_val, right_val) => {
                ::anyhow::ensure!(
                    *left_val != *right_val,
                    "ensure_neq failed: `{:?}` == `{:?}` ({}:{})",
                    left_val,
                    right_val,
                    file!(),
                    line!()
                );
            },
        }
    }};
}
