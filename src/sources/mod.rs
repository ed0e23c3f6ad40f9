//! Network-facing side: the transport capability, the token lifecycle and
//! the configuration API client built on top of it.

pub mod central;
pub mod oauth2;
pub mod transport;
