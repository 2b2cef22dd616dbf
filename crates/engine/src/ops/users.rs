use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{Credentials, EngineError, IdentityResolver, ResultEngine, users, util};

use super::{Engine, with_tx};

impl Engine {
    /// Registers a user. The username becomes the member id inside events.
    pub async fn new_user(
        &self,
        username: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> ResultEngine<()> {
        let username = username.trim();
        if username.is_empty() || username.chars().any(char::is_whitespace) {
            return Err(EngineError::InvalidId(
                "username must be a single non-empty word".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(EngineError::InvalidId(
                "password must not be empty".to_string(),
            ));
        }
        let display_name = display_name.and_then(util::normalize_name);

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username.to_string()));
            }
            users::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                password: ActiveValue::Set(password.to_string()),
                display_name: ActiveValue::Set(display_name),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(username, "user created");
            Ok(())
        })
    }
}

impl IdentityResolver for Engine {
    async fn resolve_member_id(&self, credentials: &Credentials) -> ResultEngine<String> {
        let user = users::Entity::find_by_id(credentials.username.clone())
            .one(&self.database)
            .await?;
        match user {
            Some(user) if user.password == credentials.password => Ok(user.username),
            _ => Err(EngineError::Unauthorized("invalid credentials".to_string())),
        }
    }
}
