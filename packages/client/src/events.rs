use playhub::{
    error::{ErrorKind, PlayError},
    types::TxHash,
};
use tracing::{error, info, warn};

use crate::{
    contracts::TxKind,
    store::{Action, NotificationLevel, Store},
};

pub struct TxEvents {}

impl TxEvents {
    /// Emitted once a write is mined successfully
    ///
    /// - title - `"{label} confirmed"`
    /// - message - transaction hash
    pub fn confirmed(store: &Store, kind: TxKind, hash: TxHash) {
        info!("{} confirmed in {}", kind.label(), hash);
        Self::notify(
            store,
            NotificationLevel::Success,
            format!("{} confirmed", kind.label()),
            format!("Transaction {} confirmed", hash),
            Some(hash),
        );
    }

    /// Emitted when a write fails at any stage, submission or receipt
    ///
    /// - title - `"Transaction rejected"` for user rejection, `"{label} failed"` otherwise
    /// - message - error description
    pub fn failed(store: &Store, kind: TxKind, hash: Option<TxHash>, err: &PlayError) {
        // Validation problems are handled by the form that raised them.
        if err.kind() == ErrorKind::Validation {
            return;
        }

        let title = if err.is_user_rejection() {
            warn!("{} rejected by the user", kind.label());
            "Transaction rejected".to_string()
        } else {
            error!("{} failed [{}]: {}", kind.label(), err.kind().as_str(), err);
            format!("{} failed", kind.label())
        };
        Self::notify(store, NotificationLevel::Error, title, err.to_string(), hash);
    }

    /// Emitted when no receipt arrived before the confirmation deadline
    ///
    /// - title - `"{label} still pending"`
    /// - message - hint that the transaction may still confirm
    pub fn inconclusive(store: &Store, kind: TxKind, hash: Option<TxHash>) {
        warn!("{} not confirmed before the deadline", kind.label());
        Self::notify(
            store,
            NotificationLevel::Info,
            format!("{} still pending", kind.label()),
            "No confirmation yet. It may still be mined; check again later.".to_string(),
            hash,
        );
    }

    fn notify(
        store: &Store,
        level: NotificationLevel,
        title: String,
        message: String,
        tx_hash: Option<TxHash>,
    ) {
        let action = Action::Notify {
            level,
            title,
            message,
            tx_hash,
        };
        if let Err(e) = store.dispatch(action) {
            warn!("notification dropped: {}", e);
        }
    }
}
