// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::router::RouterId;

#[test]
fn short_id_truncates() {
    let id = "abcdefghijk";
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn short_id_keeps_short_strings() {
    let id = "abc";
    assert_eq!(id.short(8), "abc");
}

#[test]
fn router_id_display() {
    let id = RouterId::new("rtr-123");
    assert_eq!(id.to_string(), "rtr-123");
}

#[test]
fn router_id_equality() {
    let id1 = RouterId::new("rtr-1");
    let id2 = RouterId::new("rtr-1");
    let id3 = RouterId::new("rtr-2");

    assert_eq!(id1, id2);
    assert_ne!(id1, id3);
}

#[test]
fn router_id_from_str() {
    let id: RouterId = "rtr".into();
    assert_eq!(id.as_str(), "rtr");
}

#[test]
fn router_id_short() {
    let id = RouterId::new("0123456789abcdef");
    assert_eq!(id.short(8), "01234567");
}

#[test]
fn router_id_serde() {
    let id = RouterId::new("rtr-9");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"rtr-9\"");

    let parsed: RouterId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}
