//! Repository 実装
//!
//! - `inmemory`: HashMap をストレージとして使うインメモリ実装
//! - 将来的に: PostgreSQL など

pub mod inmemory;

pub use inmemory::{
    InMemoryChannelRepository, InMemoryFileRepository, InMemoryMessageRepository,
    InMemorySessionRepository,
};
