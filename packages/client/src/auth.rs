use playhub::types::Address;
use tracing::{debug, info, warn};

use crate::{
    reader::{ChainReader, ReadState},
    transport::ContractCaller,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    ConnectedChecking(Address),
    ConnectedRegistered(Address),
    ConnectedUnregistered(Address),
}

/// What views render from; `Connecting` and `ConnectedChecking` both read as
/// `Checking`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Checking,
    ConnectedUnregistered,
    ConnectedRegistered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteKind {
    Public,
    /// Needs a registered account.
    Protected,
    /// The registration page: needs a connected, unregistered account.
    Registration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Connect,
    Register,
    Dashboard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    Granted,
    /// Still resolving; show a loading state instead of redirecting.
    Deferred,
    Denied(Route),
}

/// Gates views on wallet connection and on-chain registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuthGate {
    state: SessionState,
}

impl AuthGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            info!("session {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    pub fn connect_requested(&mut self) {
        if self.state == SessionState::Disconnected {
            self.transition(SessionState::Connecting);
        }
    }

    /// The wallet exposed `account`. Switching accounts restarts the check.
    pub fn account_available(&mut self, account: Address) {
        if self.account() != Some(account) || self.state == SessionState::Connecting {
            self.transition(SessionState::ConnectedChecking(account));
        }
    }

    /// Applies a registration lookup. Results for an account that is no
    /// longer the connected one are dropped.
    pub fn registration_resolved(&mut self, account: Address, registered: bool) {
        if self.account() != Some(account) {
            debug!("dropping registration result for stale account {}", account);
            return;
        }
        let next = if registered {
            SessionState::ConnectedRegistered(account)
        } else {
            SessionState::ConnectedUnregistered(account)
        };
        self.transition(next);
    }

    /// Registration just confirmed on chain.
    pub fn registered(&mut self) {
        if let SessionState::ConnectedUnregistered(account) = self.state {
            self.transition(SessionState::ConnectedRegistered(account));
        }
    }

    pub fn disconnected(&mut self) {
        self.transition(SessionState::Disconnected);
    }

    pub fn account(&self) -> Option<Address> {
        match self.state {
            SessionState::ConnectedChecking(a)
            | SessionState::ConnectedRegistered(a)
            | SessionState::ConnectedUnregistered(a) => Some(a),
            SessionState::Disconnected | SessionState::Connecting => None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::Disconnected => SessionStatus::Disconnected,
            SessionState::Connecting | SessionState::ConnectedChecking(_) => {
                SessionStatus::Checking
            }
            SessionState::ConnectedRegistered(_) => SessionStatus::ConnectedRegistered,
            SessionState::ConnectedUnregistered(_) => SessionStatus::ConnectedUnregistered,
        }
    }

    pub fn route_access(&self, route: RouteKind) -> RouteAccess {
        match (route, self.status()) {
            (RouteKind::Public, _) => RouteAccess::Granted,
            (_, SessionStatus::Checking) => RouteAccess::Deferred,
            (_, SessionStatus::Disconnected) => RouteAccess::Denied(Route::Connect),
            (RouteKind::Protected, SessionStatus::ConnectedRegistered) => RouteAccess::Granted,
            (RouteKind::Protected, SessionStatus::ConnectedUnregistered) => {
                RouteAccess::Denied(Route::Register)
            }
            (RouteKind::Registration, SessionStatus::ConnectedUnregistered) => RouteAccess::Granted,
            (RouteKind::Registration, SessionStatus::ConnectedRegistered) => {
                RouteAccess::Denied(Route::Dashboard)
            }
        }
    }

    /// The registration action is offered only to connected, unregistered accounts.
    pub fn can_register(&self) -> bool {
        matches!(self.state, SessionState::ConnectedUnregistered(_))
    }

    /// Resolves `ConnectedChecking` from the registration read. A failed
    /// read leaves the gate checking.
    pub fn refresh<C: ContractCaller>(&mut self, reader: &ChainReader<C>) -> SessionStatus {
        if let SessionState::ConnectedChecking(account) = self.state {
            match reader.is_registered(Some(account)) {
                ReadState::Ready(registered) => self.registration_resolved(account, registered),
                ReadState::Pending => {}
                ReadState::Failed(e) => {
                    warn!("registration check for {} failed: {}", account, e)
                }
            }
        }
        self.status()
    }
}
