//! Types shared between the remote service client and the interaction controllers.

pub mod domain;
pub mod error;
pub mod protocol;
