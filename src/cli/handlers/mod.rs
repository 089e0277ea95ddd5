//! CLI command handlers module
//!
//! - init: database schema initialization
//! - serve: API server
//! - index: pricing index rebuilds
//! - ask: one-shot questions
//! - history: chat history listing
//! - info: configuration display

pub mod ask;
pub mod history;
pub mod index;
pub mod info;
pub mod init;
pub mod serve;

pub use ask::*;
pub use history::*;
pub use index::*;
pub use info::*;
pub use init::*;
pub use serve::*;
