//! CLI commands implementation

pub mod ask;
pub mod db;
pub mod extract;
pub mod index;
pub mod init;
pub mod seed;
pub mod serve;
pub mod status;

pub use ask::*;
pub use db::*;
pub use extract::*;
pub use index::*;
pub use init::*;
pub use seed::*;
pub use serve::*;
pub use status::*;
