//! Integration tests for the WebSocket relay, run against an in-process server.

mod common;

use std::{sync::Arc, time::Duration};

use common::{TestClient, TestServer, UnavailableMessageRepository, handshake_status};
use serde_json::json;
use tsudoi_server::domain::{MessageId, MessageRepository, UserId};

const SILENCE: Duration = Duration::from_millis(200);

fn user(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

#[tokio::test]
async fn test_chat_message_is_persisted_and_fanned_out() {
    // テスト項目: 永続化チャンネルへの chat_message が 1 回保存され、全員に同じ内容で届く
    // given (前提条件):
    let (server, messages) = TestServer::start_in_memory().await;
    let mut alice = TestClient::join(&server, "token-u1", 1).await;
    let mut bob = TestClient::join(&server, "token-u2", 2).await;

    // when (操作):
    alice.send_chat("c1", "hi").await;

    // then (期待する結果):
    let to_alice = alice.recv_json().await;
    let to_bob = bob.recv_json().await;
    assert_eq!(to_alice, to_bob);
    assert_eq!(to_bob["kind"], "chat_message");

    let payload = &to_bob["payload"];
    assert_eq!(payload["channelId"], "c1");
    assert_eq!(payload["senderId"], "u1");
    assert_eq!(payload["content"], "hi");
    assert!(payload["createdAt"].as_str().is_some_and(|s| !s.is_empty()));
    assert!(payload["editedAt"].is_null());

    assert_eq!(messages.count().await, 1);
    let id = MessageId::new(payload["id"].as_str().unwrap().to_string()).unwrap();
    assert!(messages.find_by_id(&id).await.unwrap().is_some());

    alice.expect_silence(SILENCE).await;
    bob.expect_silence(SILENCE).await;
}

#[tokio::test]
async fn test_ephemeral_channel_is_fanned_out_without_persistence() {
    // テスト項目: 永続化なしのチャンネルへのメッセージは保存されずに全員に届く
    // given (前提条件):
    let (server, messages) = TestServer::start_in_memory().await;
    let mut alice = TestClient::join(&server, "token-u1", 1).await;
    let mut bob = TestClient::join(&server, "token-u2", 2).await;

    // when (操作):
    alice.send_chat("lobby", "hello lobby").await;

    // then (期待する結果):
    assert_eq!(bob.recv_json().await["payload"]["content"], "hello lobby");
    assert_eq!(alice.recv_json().await["payload"]["content"], "hello lobby");
    assert_eq!(messages.count().await, 0);
}

#[tokio::test]
async fn test_persistence_failure_is_reported_to_sender_only() {
    // テスト項目: 永続化に失敗したメッセージは配信されず、送信者にだけ error が返る
    // given (前提条件):
    let server = TestServer::start(Arc::new(UnavailableMessageRepository)).await;
    let mut alice = TestClient::join(&server, "token-u1", 1).await;
    let mut bob = TestClient::join(&server, "token-u2", 2).await;

    // when (操作):
    alice.send_chat("c1", "lost").await;

    // then (期待する結果):
    let reply = alice.recv_json().await;
    assert_eq!(reply["kind"], "error");
    assert_eq!(reply["payload"]["reason"], "persistence_failed");
    bob.expect_silence(SILENCE).await;
}

#[tokio::test]
async fn test_unknown_channel_is_reported_to_sender_only() {
    // テスト項目: 存在しないチャンネルへの送信は送信者に channel_not_found が返る
    // given (前提条件):
    let (server, _messages) = TestServer::start_in_memory().await;
    let mut alice = TestClient::join(&server, "token-u1", 1).await;
    let mut bob = TestClient::join(&server, "token-u2", 2).await;

    // when (操作):
    alice.send_chat("nowhere", "hi").await;

    // then (期待する結果):
    let reply = alice.recv_json().await;
    assert_eq!(reply["kind"], "error");
    assert_eq!(reply["payload"]["reason"], "channel_not_found");
    bob.expect_silence(SILENCE).await;
}

#[tokio::test]
async fn test_online_users_query_is_answered_to_sender_only() {
    // テスト項目: online_users_query には送信者にだけソート済みの一覧が返る
    // given (前提条件):
    let (server, _messages) = TestServer::start_in_memory().await;
    let mut bob = TestClient::join(&server, "token-u2", 1).await;
    let mut alice = TestClient::join(&server, "token-u1", 2).await;

    // when (操作):
    alice.send_json(json!({"kind": "online_users_query"})).await;

    // then (期待する結果):
    assert_eq!(
        alice.recv_json().await,
        json!({"kind": "online_users", "payload": {"userIds": ["u1", "u2"]}})
    );
    bob.expect_silence(SILENCE).await;
}

#[tokio::test]
async fn test_invalid_frames_keep_connection_open() {
    // テスト項目: 不正な JSON・不正な payload・未知の kind を受けても接続は維持される
    // given (前提条件):
    let (server, messages) = TestServer::start_in_memory().await;
    let mut alice = TestClient::join(&server, "token-u1", 1).await;

    // when (操作):
    alice.send_raw("not json at all").await;
    alice
        .send_json(json!({"kind": "chat_message", "payload": {"channelId": "c1"}}))
        .await;
    alice
        .send_json(json!({"kind": "chat_message", "payload": {"channelId": "c1", "content": ""}}))
        .await;
    alice.send_json(json!({"kind": "typing", "payload": {}})).await;
    alice.send_json(json!({"kind": "online_users_query"})).await;

    // then (期待する結果):
    let reply = alice.recv_json().await;
    assert_eq!(reply["kind"], "online_users");
    assert_eq!(reply["payload"]["userIds"], json!(["u1"]));
    assert_eq!(messages.count().await, 0);
}

#[tokio::test]
async fn test_disconnect_announces_offline_before_leaving_registry() {
    // テスト項目: 切断時に offline_notice が 1 回配信され、その後オンライン一覧から消える
    // given (前提条件):
    let (server, _messages) = TestServer::start_in_memory().await;
    let alice = TestClient::join(&server, "token-u1", 1).await;
    let mut bob = TestClient::join(&server, "token-u2", 2).await;

    // when (操作):
    alice.close().await;

    // then (期待する結果):
    assert_eq!(
        bob.recv_json().await,
        json!({"kind": "offline_notice", "payload": {"userId": "u1"}})
    );
    server.wait_for_connections(1).await;
    assert_eq!(server.hub.online_users().await.unwrap(), vec![user("u2")]);
    bob.expect_silence(SILENCE).await;
}

#[tokio::test]
async fn test_duplicate_login_is_rejected() {
    // テスト項目: オンライン中のユーザーの 2 本目の接続は 409 で拒否され、既存の接続は影響を受けない
    // given (前提条件):
    let (server, _messages) = TestServer::start_in_memory().await;
    let mut alice = TestClient::join(&server, "token-u1", 1).await;

    // when (操作):
    let result = TestClient::connect(&server, "token-u1").await;

    // then (期待する結果):
    match result {
        Err(e) => assert_eq!(handshake_status(e), 409),
        Ok(_) => panic!("second connection should have been rejected"),
    }
    assert!(server.hub.is_online(&user("u1")).await.unwrap());

    alice.send_json(json!({"kind": "online_users_query"})).await;
    assert_eq!(
        alice.recv_json().await,
        json!({"kind": "online_users", "payload": {"userIds": ["u1"]}})
    );
}

#[tokio::test]
async fn test_user_can_reconnect_after_disconnect() {
    // テスト項目: 切断後は同じユーザーで再接続できる
    // given (前提条件):
    let (server, _messages) = TestServer::start_in_memory().await;
    let alice = TestClient::join(&server, "token-u1", 1).await;
    alice.close().await;
    server.wait_for_connections(0).await;

    // when (操作):
    let result = TestClient::connect(&server, "token-u1").await;

    // then (期待する結果):
    assert!(result.is_ok());
    server.wait_for_connections(1).await;
}

#[tokio::test]
async fn test_unknown_or_missing_token_is_unauthorized() {
    // テスト項目: 未知のトークン、またはトークンなしでの接続は 401 で拒否される
    // given (前提条件):
    let (server, _messages) = TestServer::start_in_memory().await;

    // when (操作):
    let unknown = TestClient::connect(&server, "wrong").await;
    let missing = tokio_tungstenite::connect_async(server.ws_url()).await;

    // then (期待する結果):
    match unknown {
        Err(e) => assert_eq!(handshake_status(e), 401),
        Ok(_) => panic!("unknown token should have been rejected"),
    }
    match missing {
        Err(e) => assert_eq!(handshake_status(e), 401),
        Ok(_) => panic!("missing token should have been rejected"),
    }
    assert_eq!(server.hub.connection_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_token_header_is_accepted() {
    // テスト項目: token ヘッダーでも認証できる
    // given (前提条件):
    let (server, _messages) = TestServer::start_in_memory().await;

    // when (操作):
    let mut carol = TestClient::connect_with_header(&server, "token-u3")
        .await
        .unwrap();
    server.wait_for_connections(1).await;
    carol.send_json(json!({"kind": "online_users_query"})).await;

    // then (期待する結果):
    assert_eq!(carol.recv_json().await["payload"]["userIds"], json!(["u3"]));
}
