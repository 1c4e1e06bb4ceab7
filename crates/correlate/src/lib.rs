//! Request/response correlation for asynchronous boundaries.
//!
//! A boundary such as a message port or a shared event bus delivers replies without
//! any addressing and possibly out of order. This crate pairs every outgoing request
//! with its eventual reply by tagging it with a fresh key:
//! * [`KeyGen`]: key allocation, either a plain counter ([`CounterKeyGen`]) for
//!   exclusively owned channels or a prefixed counter ([`PrefixedKeyGen`]) for
//!   channels shared with unrelated traffic
//! * [`Multiplexer`]: the pending-request table, filled by `send` and drained by
//!   `deliver`
//! * [`Reply`]: the future handed to the caller
//!
//! Replies that never arrive keep their entry until the multiplexer is dropped;
//! there is no timeout.

#![warn(missing_docs)]

pub mod error;
pub mod key;
pub mod mux;

pub use error::Disconnected;
pub use key::{CounterKeyGen, KeyGen, KeyPrefix, PrefixedKeyGen};
pub use mux::{Delivery, Multiplexer, Outgoing, Reply};
