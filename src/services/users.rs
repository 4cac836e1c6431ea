//! Users service.

use super::ServiceContext;
use crate::errors::DropboxResult;
use crate::models::{Account, JsonModel};

/// Service for account information.
#[derive(Debug, Clone)]
pub struct UsersService {
    ctx: ServiceContext,
}

impl UsersService {
    pub(crate) fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Account of the token's owner.
    pub async fn get_current_account(&self) -> DropboxResult<Account> {
        let body = self
            .ctx
            .call("/users/get_current_account", Default::default())
            .await?;
        Account::from_data(body)
    }
}
