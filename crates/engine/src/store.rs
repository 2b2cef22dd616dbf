//! Collaborators the settlement core consumes.
//!
//! [`Engine`](crate::Engine) implements both traits on top of the database;
//! tests can plug in-memory versions instead.

use std::future::Future;

use crate::{Member, Payment, ResultEngine, Transfer};

/// Data store holding the members, payments and transfers of events.
pub trait SettlementStore {
    /// Members of the event, in a stable order.
    fn event_members(&self, event_id: &str) -> impl Future<Output = ResultEngine<Vec<Member>>> + Send;

    /// Payments of the event, in a stable order.
    fn event_payments(
        &self,
        event_id: &str,
    ) -> impl Future<Output = ResultEngine<Vec<Payment>>> + Send;

    /// Stores `transfers` as the current plan of the event.
    ///
    /// Keyed by `(event_id, from, to)`: calling it twice with the same plan
    /// leaves the store unchanged.
    fn upsert_transfers(
        &self,
        event_id: &str,
        transfers: &[Transfer],
    ) -> impl Future<Output = ResultEngine<()>> + Send;

    /// Drops every transfer of the event.
    fn delete_transfers(&self, event_id: &str) -> impl Future<Output = ResultEngine<()>> + Send;
}

/// Login data of the principal performing a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Maps an authenticated principal to the member id used by events.
pub trait IdentityResolver {
    fn resolve_member_id(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = ResultEngine<String>> + Send;
}
