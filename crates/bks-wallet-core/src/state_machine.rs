use alloy::primitives::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSource {
    Connect,
    AccountsChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: ConnectionState,
    pub to: ConnectionState,
    pub account: Option<Address>,
    pub reason: &'static str,
}

impl StateTransition {
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }
}

/// Resolves the session account after an accounts list arrives.
///
/// `connect` never disconnects: an empty `eth_requestAccounts` result leaves the
/// current account in place. An empty `accountsChanged` list always disconnects.
pub fn account_transition(
    current: Option<Address>,
    accounts: &[Address],
    source: AccountSource,
) -> StateTransition {
    let from = state_of(current);
    let first = accounts.first().copied();
    let (account, reason) = match (source, first) {
        (AccountSource::Connect, Some(addr)) => (Some(addr), "connect"),
        (AccountSource::Connect, None) => (current, "connect_empty"),
        (AccountSource::AccountsChanged, Some(addr)) => (Some(addr), "accounts_changed"),
        (AccountSource::AccountsChanged, None) => (None, "accounts_cleared"),
    };
    StateTransition {
        from,
        to: state_of(account),
        account,
        reason,
    }
}

fn state_of(account: Option<Address>) -> ConnectionState {
    match account {
        Some(_) => ConnectionState::Connected,
        None => ConnectionState::Disconnected,
    }
}
