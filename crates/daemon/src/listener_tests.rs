// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rover_core::Crud;
use tokio::io::AsyncWriteExt;

#[test]
fn decode_valid_frame() {
    let message = decode(r#"{"router_id":"rtr-1","tenant_id":"tnt-1","crud":"create"}"#).unwrap();
    assert_eq!(message.router_id, "rtr-1");
    assert_eq!(message.crud, Crud::Create);
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode("not json").is_err());
    assert!(decode(r#"{"router_id":"rtr-1"}"#).is_err());
}

#[tokio::test]
async fn frames_flow_from_socket_to_channel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roverd.sock");
    let socket = UnixListener::bind(&path).unwrap();
    let (tx, mut rx) = mpsc::channel(8);
    tokio::spawn(Listener::new(socket, tx).run());

    let mut client = UnixStream::connect(&path).await.unwrap();
    client
        .write_all(
            concat!(
                r#"{"router_id":"rtr-1","tenant_id":"tnt-1","crud":"create"}"#,
                "\n",
                "this is not json\n",
                r#"{"router_id":"rtr-1","tenant_id":"tnt-1","crud":"poll"}"#,
                "\n",
            )
            .as_bytes(),
        )
        .await
        .unwrap();

    // The malformed middle frame is dropped; the valid ones arrive in order.
    let first = rx.recv().await.unwrap();
    assert_eq!(first.crud, Crud::Create);
    let second = rx.recv().await.unwrap();
    assert_eq!(second.crud, Crud::Poll);
}
