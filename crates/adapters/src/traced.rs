// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::directory::{
    AttributeChange, DirectoryAdapter, DirectoryConnection, DirectoryEntry, DirectoryError,
    SearchScope,
};
use crate::mail::{MailAdapter, MailError, OutgoingMail};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any DirectoryAdapter
#[derive(Clone)]
pub struct TracedDirectory<D> {
    inner: D,
}

impl<D> TracedDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D: DirectoryAdapter> DirectoryAdapter for TracedDirectory<D> {
    type Connection = TracedConnection<D::Connection>;

    async fn connect(&self) -> Result<Self::Connection, DirectoryError> {
        let span = tracing::info_span!("directory.connect");
        async {
            let start = std::time::Instant::now();
            let result = self.inner.connect().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(inner) => {
                    tracing::info!(elapsed_ms, "bound");
                    Ok(TracedConnection { inner })
                }
                Err(e) => {
                    tracing::error!(elapsed_ms, category = %e.category(), error = %e, "connect failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Connection wrapper produced by [`TracedDirectory`]
pub struct TracedConnection<C> {
    inner: C,
}

#[async_trait]
impl<C: DirectoryConnection> DirectoryConnection for TracedConnection<C> {
    async fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[&str],
    ) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let span = tracing::info_span!("directory.search", base, ?scope);
        async {
            tracing::debug!(filter, "searching");

            let start = std::time::Instant::now();
            let result = self.inner.search(base, scope, filter, attributes).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(entries) => tracing::debug!(elapsed_ms, count = entries.len(), "search done"),
                Err(e) => tracing::error!(
                    elapsed_ms,
                    category = %e.category(),
                    error = %e,
                    "search failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn modify(
        &mut self,
        dn: &str,
        changes: Vec<AttributeChange>,
    ) -> Result<(), DirectoryError> {
        let span = tracing::info_span!("directory.modify", dn);
        async {
            let count = changes.len();
            let result = self.inner.modify(dn, changes).await;
            match &result {
                Ok(()) => tracing::debug!(changes = count, "modified"),
                // Callers decide whether this is fatal
                Err(e) => tracing::warn!(category = %e.category(), error = %e, "modify failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn unbind(&mut self) -> Result<(), DirectoryError> {
        let result = self.inner.unbind().await;
        match &result {
            Ok(()) => tracing::debug!("unbound"),
            Err(e) => tracing::warn!(error = %e, "unbind failed"),
        }
        result
    }
}

/// Wrapper that adds tracing to any MailAdapter
#[derive(Clone)]
pub struct TracedMailer<M> {
    inner: M,
}

impl<M> TracedMailer<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<M: MailAdapter> MailAdapter for TracedMailer<M> {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let span = tracing::info_span!("mail.send", recipients = mail.recipients.len());
        async {
            tracing::info!(subject = %mail.subject, "sending");

            // Precondition: at least one recipient
            if mail.recipients.is_empty() {
                tracing::error!("no recipients");
                return Err(MailError::Build("message has no recipients".to_string()));
            }

            let start = std::time::Instant::now();
            let result = self.inner.send(mail).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "sent"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "send failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
