use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use playhub::{
    constants::MAX_SLIPPAGE_BPS,
    error::{PlayResult, ValidationError},
    types::{PlanId, TxHash},
    validate, U256,
};
use tracing::{debug, warn};

use crate::{
    contracts::TxKind,
    preferences::{load_preferences, save_preferences, PreferenceStorage, Preferences},
};

/// A submitted write that has not confirmed or failed yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTransaction {
    pub id: u64,
    pub kind: TxKind,
    pub hash: Option<TxHash>,
    /// Clock time at submission.
    pub timestamp: Duration,
    pub amount: Option<U256>,
    pub plan: Option<PlanId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub tx_hash: Option<TxHash>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    pub pending_transactions: Vec<PendingTransaction>,
    pub notifications: Vec<Notification>,
    pub preferences: Preferences,
    next_tx_id: u64,
    next_notification_id: u64,
}

impl AppState {
    pub fn pending(&self, id: u64) -> Option<&PendingTransaction> {
        self.pending_transactions.iter().find(|tx| tx.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    TxSubmitted(PendingTransaction),
    TxHashAssigned { id: u64, hash: TxHash },
    TxConfirmed { id: u64 },
    TxFailed { id: u64 },
    /// The record stays so the transaction can be resumed later.
    TxInconclusive { id: u64 },
    Notify {
        level: NotificationLevel,
        title: String,
        message: String,
        tx_hash: Option<TxHash>,
    },
    Dismiss { id: u64 },
    ClearNotifications,
    SelectPlan(PlanId),
    SetSlippage(u16),
}

impl Action {
    fn touches_preferences(&self) -> bool {
        matches!(self, Action::SelectPlan(_) | Action::SetSlippage(_))
    }
}

pub fn reduce(state: &mut AppState, action: Action) -> PlayResult {
    match action {
        Action::TxSubmitted(tx) => {
            state.pending_transactions.retain(|pending| pending.id != tx.id);
            state.pending_transactions.push(tx);
        }
        Action::TxHashAssigned { id, hash } => {
            if let Some(tx) = state.pending_transactions.iter_mut().find(|tx| tx.id == id) {
                tx.hash = Some(hash);
            }
        }
        Action::TxConfirmed { id } | Action::TxFailed { id } => {
            state.pending_transactions.retain(|tx| tx.id != id);
        }
        Action::TxInconclusive { .. } => {}
        Action::Notify {
            level,
            title,
            message,
            tx_hash,
        } => {
            state.next_notification_id += 1;
            state.notifications.push(Notification {
                id: state.next_notification_id,
                level,
                title,
                message,
                tx_hash,
            });
        }
        Action::Dismiss { id } => state.notifications.retain(|n| n.id != id),
        Action::ClearNotifications => state.notifications.clear(),
        Action::SelectPlan(plan) => state.preferences.selected_plan = plan,
        Action::SetSlippage(bps) => {
            validate!(bps <= MAX_SLIPPAGE_BPS, ValidationError::InvalidSlippage(bps))?;
            state.preferences.slippage_bps = bps;
        }
    }
    Ok(())
}

/// Shared handle over [`AppState`]. Clones observe the same state.
#[derive(Clone)]
pub struct Store {
    state: Rc<RefCell<AppState>>,
    storage: Option<Rc<dyn PreferenceStorage>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Store {
            state: Rc::new(RefCell::new(AppState::default())),
            storage: None,
        }
    }

    /// A store whose preferences are loaded from and saved to `storage`.
    pub fn with_storage(storage: Rc<dyn PreferenceStorage>) -> Self {
        let state = AppState {
            preferences: load_preferences(storage.as_ref()),
            ..AppState::default()
        };
        Store {
            state: Rc::new(RefCell::new(state)),
            storage: Some(storage),
        }
    }

    pub fn dispatch(&self, action: Action) -> PlayResult {
        debug!("dispatch {:?}", action);
        let persist = action.touches_preferences();
        reduce(&mut self.state.borrow_mut(), action)?;

        if persist {
            if let Some(storage) = &self.storage {
                let preferences = self.state.borrow().preferences;
                if let Err(e) = save_preferences(storage.as_ref(), &preferences) {
                    warn!("preferences not persisted: {}", e);
                }
            }
        }
        Ok(())
    }

    pub fn allocate_tx_id(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        state.next_tx_id += 1;
        state.next_tx_id
    }

    pub fn state(&self) -> Ref<'_, AppState> {
        self.state.borrow()
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn pending(&self, id: u64) -> Option<PendingTransaction> {
        self.state.borrow().pending(id).cloned()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.borrow().notifications.clone()
    }

    pub fn preferences(&self) -> Preferences {
        self.state.borrow().preferences
    }
}
