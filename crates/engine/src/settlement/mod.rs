//! Debt settlement for an event.
//!
//! The pipeline is one-way:
//!
//! ```text
//! payments ──compute_balances──▶ balances ──plan_transfers──▶ transfers ──upsert──▶ store
//! ```
//!
//! [`compute_balances`] and [`plan_transfers`] are pure functions over
//! already-fetched data. [`calculate_split`] glues them to a
//! [`SettlementStore`] and is the only step that touches persistence.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, SettlementStore};

mod balances;
mod planner;
mod status;

pub use balances::{BalanceDiagnostic, BalanceSheet, MemberBalance, compute_balances};
pub use planner::plan_transfers;
pub use status::{EventStatus, TransferRole, TransferStatus};

/// Tolerance under which a balance is considered settled.
pub const BALANCE_EPSILON: f64 = 1e-6;

/// A participant of an event.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
}

impl Member {
    /// Creates a member whose display name is its id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
        }
    }

    pub fn with_name(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A recorded expense.
///
/// An empty `participants` list means the cost is shared by every member of
/// the event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payer: String,
    pub amount: f64,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl Payment {
    pub fn new(payer: impl Into<String>, amount: f64) -> Self {
        Self {
            payer: payer.into(),
            amount,
            participants: Vec::new(),
        }
    }

    /// Restricts the payment to a subset of members.
    pub fn shared_by<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants = participants.into_iter().map(Into::into).collect();
        self
    }
}

/// A planned payment from a debtor to a creditor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub event_id: String,
    pub from: String,
    pub to: String,
    pub amount: f64,
}

/// A member balance decorated with its display name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceView {
    pub member: String,
    pub name: String,
    pub balance: f64,
}

/// Outcome of [`calculate_split`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitResult {
    pub transactions: Vec<Transfer>,
    pub balances: Vec<BalanceView>,
}

/// Computes balances and the transfer plan without persisting anything.
pub fn split(
    event_id: &str,
    members: &[Member],
    payments: &[Payment],
) -> ResultEngine<SplitResult> {
    let sheet = compute_balances(members, payments)?;
    for diagnostic in &sheet.diagnostics {
        tracing::warn!(event_id, "skipped payment data: {diagnostic}");
    }

    let transactions = plan_transfers(event_id, &sheet.balances)?;
    let balances = sheet
        .balances
        .iter()
        .map(|entry| BalanceView {
            member: entry.member_id.clone(),
            name: members
                .iter()
                .find(|m| m.id == entry.member_id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| entry.member_id.clone()),
            balance: entry.balance,
        })
        .collect();

    Ok(SplitResult {
        transactions,
        balances,
    })
}

/// Fetches the event data from `store`, computes the settlement and persists
/// the resulting transfers.
///
/// Store calls are awaited in order (members, payments, upsert). The upsert
/// only runs once the whole plan has been computed, so a failure leaves the
/// previously stored transfers untouched and the call can simply be retried.
pub async fn calculate_split<S: SettlementStore>(
    store: &S,
    event_id: &str,
) -> ResultEngine<SplitResult> {
    let event_id = event_id.trim();
    if event_id.is_empty() {
        return Err(EngineError::InvalidId("event id is required".to_string()));
    }

    let members = store.event_members(event_id).await?;
    let payments = store.event_payments(event_id).await?;
    tracing::info!(
        event_id,
        members = members.len(),
        payments = payments.len(),
        "calculating split"
    );

    let result = split(event_id, &members, &payments)?;

    store
        .upsert_transfers(event_id, &result.transactions)
        .await?;
    tracing::info!(
        event_id,
        transfers = result.transactions.len(),
        "split persisted"
    );

    Ok(result)
}
