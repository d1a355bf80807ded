//! Transport module - TCP listening and socket options.

mod tcp;

pub use tcp::{apply_keepalive, bind_listener};
