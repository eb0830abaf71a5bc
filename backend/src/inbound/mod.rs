//! Inbound adapters translating external protocols into domain calls.

pub mod http;
