// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Operator interrupt signalling.
//!
//! A one-shot flag shared between whoever detects the abort (usually a Ctrl+C
//! listener) and the sweep. Once triggered it stays triggered.

use std::sync::Arc;

use tokio::sync::watch;

/// Create a connected handle/listener pair.
pub fn channel() -> (InterruptHandle, Interrupt) {
    let (tx, rx) = watch::channel(false);
    (InterruptHandle { tx: Arc::new(tx) }, Interrupt { rx })
}

/// Triggering side.
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl InterruptHandle {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Trigger on the first Ctrl+C delivered to this process.
    pub fn trigger_on_ctrl_c(&self) -> tokio::task::JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::warn!("Interrupt received, stopping after in-flight trial is terminated");
                    handle.trigger();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
            }
        })
    }
}

/// Listening side.
#[derive(Debug, Clone)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

impl Interrupt {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the interrupt fires. Never resolves if every handle is
    /// dropped without triggering.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
