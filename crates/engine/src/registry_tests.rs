// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn router_driver_resolves() {
    assert!(matches!(Driver::get("router"), Ok(Driver::Router)));
    assert_eq!(Driver::Router.name(), "router");
}

#[test]
fn unknown_driver_is_rejected() {
    let err = Driver::get("spaghetti").unwrap_err();
    assert_eq!(err.to_string(), "failed loading driver: spaghetti");
}

#[test]
fn from_names_skips_invalid_entries() {
    let registry = DriverRegistry::from_names(&["router", "spaghetti"]);
    assert_eq!(registry.enabled(), &[Driver::Router]);
}

#[test]
fn from_names_dedupes() {
    let registry = DriverRegistry::from_names(&["router", "router"]);
    assert_eq!(registry.enabled().len(), 1);
}

#[test]
fn is_enabled() {
    let registry = DriverRegistry::from_names(&["router"]);
    assert!(registry.is_enabled(Driver::Router));

    let empty = DriverRegistry::from_names::<&str>(&[]);
    assert!(!empty.is_enabled(Driver::Router));
}
