//! Server side of dek-dek: the HTTP layer and logging setup.
//! The `dekdek` binary wires them to the command line.

pub mod http;
pub mod logging;
