//! delve-dns infrastructure: wire codec, network transports, the in-memory
//! record cache and resolver wiring.
pub mod dns;
