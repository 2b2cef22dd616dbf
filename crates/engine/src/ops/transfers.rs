use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, TransferRecord, TransferRole, TransferStatus, transfers,
};

use super::{Engine, access::ensure_confirmed, with_tx};

impl Engine {
    /// Stored transfers of the event with their status.
    pub async fn list_transfers(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<TransferRecord>> {
        let event = self
            .require_event_member(&self.database, event_id, user_id)
            .await?;
        transfers::Entity::find()
            .filter(transfers::Column::EventId.eq(event.id.to_string()))
            .order_by_desc(transfers::Column::Amount)
            .order_by_asc(transfers::Column::FromUser)
            .order_by_asc(transfers::Column::ToUser)
            .all(&self.database)
            .await?
            .into_iter()
            .map(TransferRecord::try_from)
            .collect()
    }

    /// Moves the `from -> to` transfer to `status`.
    ///
    /// Only the two sides of the transfer may act on it; the debtor reports
    /// the payment, the creditor confirms the receipt.
    pub async fn update_transfer_status(
        &self,
        event_id: &str,
        from: &str,
        to: &str,
        status: TransferStatus,
        user_id: &str,
    ) -> ResultEngine<TransferRecord> {
        with_tx!(self, |db_tx| {
            let event = self.require_event_member(&db_tx, event_id, user_id).await?;
            ensure_confirmed(&event)?;

            let model = transfers::Entity::find_by_id((
                event.id.to_string(),
                from.trim().to_string(),
                to.trim().to_string(),
            ))
            .one(&db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transfer not exists".to_string()))?;

            let role = TransferRole::of(user_id, &model.from_user, &model.to_user).ok_or_else(
                || EngineError::Forbidden("only the debtor or the creditor can do this".to_string()),
            )?;
            let current = TransferStatus::try_from(model.status.as_str())?;
            let next = current.transition(status, role)?;

            let mut active: transfers::ActiveModel = model.into();
            active.status = ActiveValue::Set(next.as_str().to_string());
            active.updated_at = ActiveValue::Set(Utc::now());
            let updated = active.update(&db_tx).await?;
            tracing::info!(
                event_id = %event.id,
                from = %updated.from_user,
                to = %updated.to_user,
                status = next.as_str(),
                by = user_id,
                "transfer status changed"
            );
            TransferRecord::try_from(updated)
        })
    }
}
