//! Test module organization
//!
//! This module re-exports test helpers for use in test files.

mod helpers;

#[allow(unused_imports)]
pub use helpers::{
    build_test_config, build_test_server, dummy_ticket, dummy_utxo, Call, FakeMnee,
    DUMMY_ADDR_A, DUMMY_ADDR_B, DUMMY_TICKET_ID, DUMMY_TOKEN_ID, DUMMY_TXID, DUMMY_WIF,
};
