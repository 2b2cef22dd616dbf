//! Settlement and transfer lifecycles.
//!
//! ```text
//! event:     Open ──confirm──▶ Confirmed ──cancel──▶ Open
//!
//! transfer:  Pending ──debtor──▶ Checking ──creditor──▶ Completed
//!            Pending ◀─debtor/creditor── Checking ◀─creditor── Completed
//! ```

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Payments can still be added; no settlement is stored.
    #[default]
    Open,
    /// Transfers have been computed and persisted.
    Confirmed,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Confirmed => "confirmed",
        }
    }
}

impl TryFrom<&str> for EventStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "open" => Ok(Self::Open),
            "confirmed" => Ok(Self::Confirmed),
            other => Err(EngineError::InvalidState(format!(
                "invalid event status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    #[default]
    Pending,
    /// The debtor claims the money has been sent.
    Checking,
    /// The creditor confirmed the receipt.
    Completed,
}

/// Side of a transfer the acting member is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferRole {
    Debtor,
    Creditor,
}

impl TransferRole {
    /// Resolves the role of `member_id` on the `from -> to` transfer.
    pub fn of(member_id: &str, from: &str, to: &str) -> Option<Self> {
        if member_id == from {
            Some(Self::Debtor)
        } else if member_id == to {
            Some(Self::Creditor)
        } else {
            None
        }
    }
}

impl TransferStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Checking => "checking",
            Self::Completed => "completed",
        }
    }

    /// Validates the `self -> next` edge for an actor playing `role`.
    ///
    /// Returns [`EngineError::InvalidTransition`] for edges outside the
    /// lifecycle and [`EngineError::Forbidden`] when the edge exists but
    /// belongs to the other side of the transfer.
    pub fn transition(self, next: TransferStatus, role: TransferRole) -> ResultEngine<Self> {
        use TransferRole::{Creditor, Debtor};
        use TransferStatus::{Checking, Completed, Pending};

        let allowed: &[TransferRole] = match (self, next) {
            (Pending, Checking) => &[Debtor],
            (Checking, Pending) => &[Debtor, Creditor],
            (Checking, Completed) => &[Creditor],
            (Completed, Checking) => &[Creditor],
            (from, to) => {
                return Err(EngineError::InvalidTransition(format!(
                    "transfer cannot move from {} to {}",
                    from.as_str(),
                    to.as_str()
                )));
            }
        };

        if !allowed.contains(&role) {
            return Err(EngineError::Forbidden(format!(
                "only the {} can move a transfer from {} to {}",
                match role {
                    Debtor => "creditor",
                    Creditor => "debtor",
                },
                self.as_str(),
                next.as_str()
            )));
        }
        Ok(next)
    }
}

impl TryFrom<&str> for TransferStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "checking" => Ok(Self::Checking),
            "completed" => Ok(Self::Completed),
            other => Err(EngineError::InvalidState(format!(
                "invalid transfer status: {other}"
            ))),
        }
    }
}
