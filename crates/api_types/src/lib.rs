use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod event {
    use super::*;

    /// Settlement status of an event.
    ///
    /// - `open`: payments and members can change.
    /// - `confirmed`: transfers are stored and the event is locked.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EventStatus {
        Open,
        Confirmed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventView {
        pub id: Uuid,
        pub name: String,
        pub status: EventStatus,
        /// Username of the owner.
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventsResponse {
        pub events: Vec<EventView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventDetail {
        pub event: EventView,
        pub members: Vec<super::member::MemberView>,
    }
}

pub mod member {
    use super::*;

    /// Request body for adding a member (owner-only).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: String,
        pub name: String,
    }
}

pub mod payment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub payer: String,
        pub amount: f64,
        /// Members sharing the cost. Empty or missing means everybody.
        #[serde(default)]
        pub participants: Vec<String>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub id: Uuid,
        pub payer: String,
        pub amount: f64,
        pub participants: Vec<String>,
        pub note: Option<String>,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentsResponse {
        pub payments: Vec<PaymentView>,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub from: String,
        pub to: String,
        pub amount: f64,
    }

    /// Net balance of a member: positive is owed money, negative owes.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub member: String,
        pub name: String,
        pub balance: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitResponse {
        pub transactions: Vec<TransactionView>,
        pub balances: Vec<BalanceView>,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransferStatus {
        Pending,
        Checking,
        Completed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub from: String,
        pub to: String,
        pub amount: f64,
        pub status: TransferStatus,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransfersResponse {
        pub transfers: Vec<TransferView>,
    }

    /// Moves the `from -> to` transfer of the event to `status`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferStatusUpdate {
        pub from: String,
        pub to: String,
        pub status: TransferStatus,
    }
}
