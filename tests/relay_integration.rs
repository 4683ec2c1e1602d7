//! End-to-end tests over real TCP sockets.
//!
//! Each test starts its own relay on an OS-assigned port.

mod common;

use chat_relay::{Color, Message, RoomId};
use common::{start_server, wait_for_len, TestClient};

#[tokio::test]
async fn test_room_scoped_delivery() {
    let (addr, registry) = start_server(None).await;

    let mut alice = TestClient::join(addr, "alice", "1").await;
    let mut bob = TestClient::join(addr, "bob", "1").await;
    let mut carol = TestClient::join(addr, "carol", "2").await;
    // alice also saw bob's probe
    alice.recv_text("bob is here").await;

    alice.send_line("hi").await;

    let received = bob.recv_text("hi").await;
    assert!(received.ok);
    assert_eq!(received.author, "alice");
    assert_eq!(received.text, "hi");

    // Sender sees its own message, with the same color bob saw
    let echo = alice.recv_text("hi").await;
    assert_eq!(echo, received);

    carol.assert_silent().await;

    assert_eq!(registry.room_members(RoomId(1)).await.len(), 2);
    assert_eq!(registry.room_members(RoomId(2)).await.len(), 1);
}

#[tokio::test]
async fn test_invalid_room_id_rejected() {
    let (addr, registry) = start_server(None).await;
    let mut watcher = TestClient::join(addr, "watcher", "1").await;

    let mut client = TestClient::connect(addr).await;
    client.send_line("mallory").await;
    client.send_line("abc").await;

    let notice = client.recv().await.unwrap();
    assert_eq!(
        notice,
        Message {
            ok: false,
            author: "System".to_string(),
            text: "Invalid room ID".to_string(),
            color: Color::SYSTEM,
        }
    );
    assert!(client.recv().await.is_none());

    // Only the watcher is registered; it heard nothing about the rejection
    assert_eq!(registry.len().await, 1);
    watcher.assert_silent().await;
}

#[tokio::test]
async fn test_disconnect_deregisters() {
    let (addr, registry) = start_server(None).await;

    let mut alice = TestClient::join(addr, "alice", "3").await;
    let bob = TestClient::join(addr, "bob", "3").await;
    alice.recv_text("bob is here").await;
    assert_eq!(registry.len().await, 2);

    drop(bob);
    wait_for_len(&registry, 1).await;

    alice.send_line("anyone left?").await;
    let echo = alice.recv_text("anyone left?").await;
    assert_eq!(echo.author, "alice");
}

#[tokio::test]
async fn test_single_sender_order_preserved() {
    let (addr, _registry) = start_server(None).await;

    let mut alice = TestClient::join(addr, "alice", "4").await;
    let mut bob = TestClient::join(addr, "bob", "4").await;
    alice.recv_text("bob is here").await;

    for i in 0..50 {
        alice.send_line(&format!("line {}", i)).await;
    }
    for i in 0..50 {
        let msg = bob.recv().await.unwrap();
        assert_eq!(msg.author, "alice");
        assert_eq!(msg.text, format!("line {}", i));
    }
}

#[tokio::test]
async fn test_many_rooms_isolated() {
    let (addr, registry) = start_server(None).await;

    let mut clients = Vec::new();
    for room in 0..3 {
        for member in 0..3 {
            let name = format!("r{}m{}", room, member);
            clients.push((room, TestClient::join(addr, &name, &room.to_string()).await));
        }
    }
    wait_for_len(&registry, 9).await;

    for (room, client) in clients.iter_mut() {
        if *room == 1 {
            client.send_line("room one only").await;
            break;
        }
    }

    for (room, client) in clients.iter_mut() {
        if *room == 1 {
            let msg = client.recv_text("room one only").await;
            assert_eq!(msg.author, "r1m0");
        } else {
            // Only probes from same-room joiners may arrive
            while let Some(msg) = client.try_recv().await {
                assert_ne!(msg.text, "room one only");
                assert!(msg.author.starts_with(&format!("r{}", room)));
            }
        }
    }
}

#[tokio::test]
async fn test_connection_limit_queues_extra_clients() {
    let (addr, registry) = start_server(Some(1)).await;

    let first = TestClient::join(addr, "first", "5").await;

    let mut second = TestClient::connect(addr).await;
    second.send_line("second").await;
    second.send_line("5").await;
    second.send_line("waiting").await;
    second.assert_silent().await;
    assert_eq!(registry.len().await, 1);

    drop(first);
    let echo = second.recv_text("waiting").await;
    assert_eq!(echo.author, "second");
}
