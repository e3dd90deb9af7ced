//! Cancellation and deadline context
//!
//! Every broker operation takes a `Context`. An operation checks it before
//! touching broker state and fails with `Cancelled` or `DeadlineExceeded`
//! without side effects when the context is already done.
//!
//! Contexts form a tree: `child`, `with_timeout` and `with_deadline` derive
//! a new context that is cancelled whenever its parent is, and whose
//! deadline is never later than the parent's.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::utils::error::{BrokerError, Result};

#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Why the context is done, if it is. Cancellation wins over an
    /// expired deadline.
    pub fn err(&self) -> Option<BrokerError> {
        if self.token.is_cancelled() {
            Some(BrokerError::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(BrokerError::DeadlineExceeded)
        } else {
            None
        }
    }

    pub(crate) fn check(&self) -> Result<()> {
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> BrokerError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.token.cancelled() => BrokerError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => BrokerError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                BrokerError::Cancelled
            }
        }
    }
}
