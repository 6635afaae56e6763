// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Explicit session context over the identity provider.
//!
//! No ambient global: whoever needs the signed-in user holds a
//! reference to this context. Lifecycle is explicit too: `init`
//! restores a persisted session on load, `sign_out` tears it down.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::client::errors::ClientError;
use crate::store::{IdentityProvider, Session, StoreError};

pub struct SessionContext {
    identity: Arc<dyn IdentityProvider>,
    session: RwLock<Option<Session>>,
}

impl SessionContext {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> SessionContext {
        SessionContext {
            identity,
            session: RwLock::new(None),
        }
    }

    /// Restore the session persisted from a previous visit, if any.
    /// Called once on load.
    pub async fn init(&self) -> Result<Option<Session>, ClientError> {
        let restored = self.identity.restore_session().await?;
        *self.session.write().await = restored.clone();
        Ok(restored)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let session = self.identity.sign_in(email, password).await?;
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// Tear the session down. The local state is cleared even if the
    /// provider call fails, so the user is never stuck signed in.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let taken = self.session.write().await.take();
        if let Some(session) = taken {
            self.identity.sign_out(&session.access_token).await?;
        }
        Ok(())
    }

    pub async fn current(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// The signed-in user id, or [`ClientError::SignedOut`].
    pub async fn user_id(&self) -> Result<String, ClientError> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.user_id.clone())
            .ok_or(ClientError::SignedOut)
    }

    pub async fn update_password(&self, new_password: &str) -> Result<(), ClientError> {
        let session = self.current().await.ok_or(ClientError::SignedOut)?;
        self.identity
            .update_password(&session.access_token, new_password)
            .await?;
        Ok(())
    }

    /// Delete the account. The password is re-verified first; a wrong
    /// password fails before anything is deleted.
    pub async fn delete_account(&self, password: &str) -> Result<(), ClientError> {
        let session = self.current().await.ok_or(ClientError::SignedOut)?;

        match self.identity.sign_in(&session.email, password).await {
            Ok(_) => {}
            Err(StoreError::InvalidCredentials) => return Err(ClientError::IncorrectPassword),
            Err(other) => return Err(other.into()),
        }

        self.identity.delete_account(&session.access_token).await?;
        *self.session.write().await = None;
        Ok(())
    }
}
