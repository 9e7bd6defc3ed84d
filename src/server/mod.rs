//! Text Protocol Server
//!
//! Line-oriented TCP front end for the cache.
//!
//! # Commands
//! - `SET key value [seconds]` - Store a value, `OK`
//! - `GET key` - The value, or `Key not found`
//! - `DELETE key` - `1` if removed, `0` if absent

pub mod command;
pub mod connection;
pub mod listener;

pub use command::{Command, CommandError, Reply};
pub use connection::{execute, handle_connection};
pub use listener::serve;
