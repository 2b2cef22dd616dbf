//! Settlement engine of shared event expenses.
//!
//! The crate is split in two layers:
//!
//! - [`settlement`]: pure balance calculation and transfer planning, plus
//!   [`calculate_split`] which drives them through a [`SettlementStore`].
//! - [`Engine`]: the sea-orm backed store and the operations the server and
//!   the admin CLI expose (events, members, payments, settlement, transfers).

pub use error::EngineError;
pub use events::{Event, EventSnapshot};
pub use ops::{Engine, EngineBuilder};
pub use payments::{NewPayment, PaymentRecord};
pub use settlement::{
    BALANCE_EPSILON, BalanceDiagnostic, BalanceSheet, BalanceView, EventStatus, Member,
    MemberBalance, Payment, SplitResult, Transfer, TransferRole, TransferStatus,
    calculate_split, compute_balances, plan_transfers, split,
};
pub use store::{Credentials, IdentityResolver, SettlementStore};
pub use transfers::TransferRecord;

mod error;
pub mod event_members;
pub mod events;
mod ops;
pub mod payments;
pub mod settlement;
mod store;
pub mod transfers;
pub mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
