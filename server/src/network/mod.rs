//! Networking layer.

mod server;

pub use server::{ClientConnection, Server};
