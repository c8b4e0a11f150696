//! Infrastructure 層
//!
//! - `hub`: 接続レジストリを所有し、ファンアウトを直列化するコーディネーター
//! - `dto`: ワイヤプロトコル（WebSocket パケット・HTTP レスポンス）と変換
//! - `repository`: コラボレーター trait のインメモリ実装

pub mod dto;
pub mod hub;
pub mod repository;
