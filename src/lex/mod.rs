//! Lex v2 wire types: the inbound intent-request event and the outbound
//! response envelope.

pub mod event;
pub mod response;
