// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fake::{ApplianceCall, FakeAppliance};
use crate::manager::Appliance;
use rover_core::{ApplianceState, WorkerContext};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

fn ctx() -> WorkerContext {
    WorkerContext::new("worker-0")
}

#[tokio::test]
async fn passes_operations_through() {
    let fake = FakeAppliance::new();
    let traced = TracedAppliance::new(fake.clone());

    traced.boot(&ctx()).await.unwrap();
    traced.check_boot(&ctx()).await.unwrap();
    traced.configure(&ctx()).await.unwrap();
    traced.stop(&ctx()).await.unwrap();

    assert_eq!(
        fake.calls(),
        vec![
            ApplianceCall::Boot,
            ApplianceCall::CheckBoot,
            ApplianceCall::Configure,
            ApplianceCall::Stop
        ]
    );
}

#[tokio::test]
async fn exposes_inner_readable_fields() {
    let fake = FakeAppliance::with_state(ApplianceState::Configured);
    fake.set_attempts(2);
    let traced = TracedAppliance::new(fake);

    assert_eq!(traced.state(), ApplianceState::Configured);
    assert_eq!(traced.attempts(), 2);
}

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
#[serial]
async fn boot_is_logged_with_span() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .finish();

    let traced = TracedAppliance::new(FakeAppliance::new());
    let _guard = tracing::subscriber::set_default(subscriber);
    traced.boot(&ctx()).await.unwrap();
    drop(_guard);

    let contents = logs.contents();
    assert!(contents.contains("appliance.boot"), "logs: {contents}");
    assert!(contents.contains("boot issued"), "logs: {contents}");
}
