//! InMemory Repository 実装
//!
//! ドメイン層が定義するコラボレーター trait の具体的な実装。
//! `tokio::sync::RwLock<HashMap<..>>` をインメモリ DB として使用します。

mod channel;
mod file;
mod message;
mod session;

pub use channel::InMemoryChannelRepository;
pub use file::InMemoryFileRepository;
pub use message::InMemoryMessageRepository;
pub use session::InMemorySessionRepository;
