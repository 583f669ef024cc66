//! Session loop: one task owns the dispatcher and the scene and drains the
//! inbound queue in arrival order.

mod session;

use std::future::pending;

use tokio::sync::watch;

pub use session::SyncSession;

/// Resolves when `rx` reads `true`; never resolves once the sender is gone.
pub(crate) async fn signalled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            pending::<()>().await;
        }
    }
}
