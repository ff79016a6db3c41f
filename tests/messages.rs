mod common;

use alumni_connect::realtime::ServerEvent;
use axum::http::{Method, StatusCode};
use common::{call, signup, test_app};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn online_receiver_gets_exactly_one_push() {
    let (state, app) = test_app();
    let (alice_token, alice) = signup(&app, "Alice", "alice@example.com").await;
    let (_, bob) = signup(&app, "Bob", "bob@example.com").await;

    let (_, mut bob_rx) = state.presence.register_connection(bob);
    assert!(matches!(bob_rx.try_recv(), Ok(ServerEvent::OnlineUsers(_))));

    let client_id = Uuid::new_v4();
    let res = call(
        &app,
        Method::POST,
        &format!("/api/messages/send/{}", bob),
        Some(&alice_token),
        Some(json!({"text": "hi bob", "client_id": client_id})),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["client_id"], client_id.to_string());
    assert_eq!(res.data()["sender_id"], alice.to_string());
    assert!(res.data()["read_at"].is_null());

    match bob_rx.try_recv() {
        Ok(ServerEvent::NewMessage(message)) => {
            assert_eq!(message.text.as_deref(), Some("hi bob"));
            assert_eq!(message.client_id, Some(client_id));
        }
        other => panic!("expected newMessage, got {:?}", other),
    }
    assert!(bob_rx.try_recv().is_err());
}

#[tokio::test]
async fn offline_receiver_gets_message_from_history() {
    let (_, app) = test_app();
    let (alice_token, alice) = signup(&app, "Alice", "alice@example.com").await;
    let (bob_token, bob) = signup(&app, "Bob", "bob@example.com").await;

    let res = call(
        &app,
        Method::POST,
        &format!("/api/messages/send/{}", bob),
        Some(&alice_token),
        Some(json!({"text": "while you were away"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = call(
        &app,
        Method::GET,
        &format!("/api/messages/{}", alice),
        Some(&bob_token),
        None,
    )
    .await;
    let history = res.data().as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["text"], "while you were away");
}

#[tokio::test]
async fn mark_read_zeroes_unread_count() {
    let (_, app) = test_app();
    let (alice_token, alice) = signup(&app, "Alice", "alice@example.com").await;
    let (bob_token, bob) = signup(&app, "Bob", "bob@example.com").await;

    for text in ["one", "two"] {
        call(
            &app,
            Method::POST,
            &format!("/api/messages/send/{}", bob),
            Some(&alice_token),
            Some(json!({"text": text})),
        )
        .await;
    }

    let res = call(&app, Method::GET, "/api/messages/unread/counts", Some(&bob_token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()[alice.to_string()], 2);

    // 发送方自己的未读数不受影响
    let res = call(&app, Method::GET, "/api/messages/unread/counts", Some(&alice_token), None).await;
    assert!(res.data().as_object().unwrap().is_empty());

    let res = call(
        &app,
        Method::PUT,
        &format!("/api/messages/mark-read/{}", alice),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["updated"], 2);

    let res = call(&app, Method::GET, "/api/messages/unread/counts", Some(&bob_token), None).await;
    assert!(res.data().get(alice.to_string()).is_none());

    let res = call(
        &app,
        Method::PUT,
        &format!("/api/messages/mark-read/{}", alice),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(res.data()["updated"], 0);
}

#[tokio::test]
async fn static_message_routes_do_not_reach_id_handler() {
    let (_, app) = test_app();
    let (token, _) = signup(&app, "Alice", "alice@example.com").await;

    let res = call(&app, Method::GET, "/api/messages/unread/counts", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.data().is_object());

    let res = call(&app, Method::GET, "/api/messages/contacts", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.data().is_array());

    let res = call(&app, Method::GET, "/api/messages/not-a-uuid", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_sends_are_rejected() {
    let (_, app) = test_app();
    let (token, _) = signup(&app, "Alice", "alice@example.com").await;
    let (_, bob) = signup(&app, "Bob", "bob@example.com").await;

    let res = call(
        &app,
        Method::POST,
        &format!("/api/messages/send/{}", bob),
        Some(&token),
        Some(json!({"text": "   "})),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.msg(), "Message must contain text or an image");

    let res = call(
        &app,
        Method::POST,
        &format!("/api/messages/send/{}", Uuid::new_v4()),
        Some(&token),
        Some(json!({"text": "hello?"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.msg(), "Receiver not found");
}

#[tokio::test]
async fn chat_partners_are_most_recent_first() {
    let (_, app) = test_app();
    let (alice_token, _) = signup(&app, "Alice", "alice@example.com").await;
    let (_, bob) = signup(&app, "Bob", "bob@example.com").await;
    let (_, carol) = signup(&app, "Carol", "carol@example.com").await;
    signup(&app, "Dave", "dave@example.com").await;

    for peer in [bob, carol] {
        call(
            &app,
            Method::POST,
            &format!("/api/messages/send/{}", peer),
            Some(&alice_token),
            Some(json!({"image": "https://img.example.com/wave.gif"})),
        )
        .await;
    }

    let res = call(&app, Method::GET, "/api/messages/chats", Some(&alice_token), None).await;
    let chats: Vec<&str> = res
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["full_name"].as_str().unwrap())
        .collect();
    assert_eq!(chats, vec!["Carol", "Bob"]);

    let res = call(&app, Method::GET, "/api/messages/contacts", Some(&alice_token), None).await;
    assert_eq!(res.data().as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn late_disconnect_does_not_drop_new_connection() {
    let (state, app) = test_app();
    let (alice_token, _) = signup(&app, "Alice", "alice@example.com").await;
    let (_, bob) = signup(&app, "Bob", "bob@example.com").await;

    let (old, _old_rx) = state.presence.register_connection(bob);
    let (_, mut new_rx) = state.presence.register_connection(bob);
    while new_rx.try_recv().is_ok() {}

    // 旧连接的断开晚于新连接建立
    assert!(!state.presence.unregister_connection(old));
    assert!(state.presence.is_online(bob));

    call(
        &app,
        Method::POST,
        &format!("/api/messages/send/{}", bob),
        Some(&alice_token),
        Some(json!({"text": "still there?"})),
    )
    .await;
    assert!(matches!(new_rx.try_recv(), Ok(ServerEvent::NewMessage(_))));
}
