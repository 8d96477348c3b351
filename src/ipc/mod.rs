//! Control socket: the compositor-side server and the `cairn msg` client.

pub mod client;
pub mod server;
