//! Target connection abstraction.
//!
//! A connection is acquired for the whole of one import call and used by
//! that call alone. [`ConnectionGuard`] scopes it: auto-commit is switched
//! off on acquire and the original mode is restored, and the connection
//! released, however the call ends.

use std::ops::{Deref, DerefMut};

use async_trait::async_trait;

use crate::binder::BoundStatement;
use crate::error::DbError;

/// One live session against the graph target.
#[async_trait]
pub trait TargetConnection: Send {
    fn auto_commit(&self) -> bool;

    fn set_auto_commit(&mut self, enabled: bool);

    /// Execute a statement returning a single count aggregate (0 if no row).
    async fn execute(&mut self, stmt: &BoundStatement) -> Result<i64, DbError>;

    /// Execute each statement in turn; returns the rows affected per statement.
    async fn execute_batch(&mut self, batch: &[BoundStatement]) -> Result<Vec<i64>, DbError>;

    async fn commit(&mut self) -> Result<(), DbError>;

    async fn rollback(&mut self) -> Result<(), DbError>;
}

/// Pool handing out target connections.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    type Connection: TargetConnection;

    async fn acquire(&self) -> Result<Self::Connection, DbError>;

    fn release(&self, conn: Self::Connection);
}

/// A connection on loan from a provider, in manual-commit mode.
pub struct ConnectionGuard<'a, P: ConnectionProvider> {
    provider: &'a P,
    conn: Option<P::Connection>,
    restore_auto_commit: bool,
}

impl<'a, P: ConnectionProvider> ConnectionGuard<'a, P> {
    pub async fn acquire(provider: &'a P) -> Result<Self, DbError> {
        let mut conn = provider.acquire().await?;
        let restore_auto_commit = conn.auto_commit();
        if restore_auto_commit {
            conn.set_auto_commit(false);
        }
        Ok(Self {
            provider,
            conn: Some(conn),
            restore_auto_commit,
        })
    }
}

impl<P: ConnectionProvider> Deref for ConnectionGuard<'_, P> {
    type Target = P::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect("connection is held until drop")
    }
}

impl<P: ConnectionProvider> DerefMut for ConnectionGuard<'_, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect("connection is held until drop")
    }
}

impl<P: ConnectionProvider> Drop for ConnectionGuard<'_, P> {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            if self.restore_auto_commit {
                conn.set_auto_commit(true);
            }
            self.provider.release(conn);
        }
    }
}
