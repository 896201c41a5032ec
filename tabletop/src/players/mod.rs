//! Player directory: identity models and the repository backing them.
//!
//! The session core only ever *reads* from the directory (resolving ids,
//! names, and existence); the write operations live on the repository for
//! the GM's player-management surface, which sits outside the core.

pub mod errors;
pub mod models;
pub mod repository;

pub use errors::{PlayerError, PlayerResult};
pub use models::{Player, PlayerId, PlayerStat, StatValue};
pub use repository::{PgPlayerRepository, PlayerDirectory};
