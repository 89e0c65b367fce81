// Host-side core for the mdbridge MCP server: the metadata object model,
// its generic markdown renderer, the owner execution context and query
// validation.

pub mod error;
pub mod host;
pub mod metadata;
pub mod object;
pub mod owner;
pub mod query;
pub mod render;
pub mod schema;
pub mod types;
pub mod workspace;

pub use error::{CoreError, CoreResult};
pub use host::Host;
pub use types::*;
