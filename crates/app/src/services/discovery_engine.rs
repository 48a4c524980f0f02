//! Discovery engine: scan, normalize, and filter against the registry.

use std::collections::HashSet;
use std::time::Duration;

use onelight_domain::discovery::{DiscoveryRecord, RawResponse, normalize};
use onelight_domain::error::OneLightError;

use crate::ports::{BroadcastResolver, DeviceRegistry, DiscoveryScanner, ScanError};

/// Extra time granted to a scanner past the requested timeout before the
/// engine gives up on it.
pub const SCAN_GRACE: Duration = Duration::from_millis(500);

/// Why a discovery run produced no result. Never surfaced by
/// [`DiscoveryEngine::discover`], which logs it and returns nothing.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("discovery scan failed")]
    Scan(#[from] ScanError),

    #[error("discovery scan did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("registry lookup failed during discovery")]
    Registry(#[from] OneLightError),
}

/// Finds devices on the local network that are not registered yet.
pub struct DiscoveryEngine<S, B> {
    scanner: S,
    resolver: B,
}

impl<S: DiscoveryScanner, B: BroadcastResolver> DiscoveryEngine<S, B> {
    pub fn new(scanner: S, resolver: B) -> Self {
        Self { scanner, resolver }
    }

    /// Discover unregistered devices, in the order their answers arrived.
    ///
    /// Never fails: any error is logged and yields an empty list.
    #[tracing::instrument(skip(self, registry))]
    pub async fn discover<R: DeviceRegistry + Sync>(
        &self,
        registry: &R,
        timeout: Duration,
    ) -> Vec<DiscoveryRecord> {
        match self.try_discover(registry, timeout).await {
            Ok(records) => {
                tracing::info!(count = records.len(), "discovery finished");
                records
            }
            Err(err) => {
                tracing::error!(error = %err, "discovery failed");
                Vec::new()
            }
        }
    }

    /// Same as [`discover`](Self::discover), reporting failures.
    ///
    /// A scan that collects nothing is retried once against the protocol
    /// default broadcast address with the scanner's default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when the scan fails, overruns its deadline,
    /// or a registry lookup fails.
    pub async fn try_discover<R: DeviceRegistry + Sync>(
        &self,
        registry: &R,
        timeout: Duration,
    ) -> Result<Vec<DiscoveryRecord>, DiscoveryError> {
        let target = self.resolver.resolve_broadcast_target();
        let mut responses = self.bounded_scan(target, timeout).await?;

        if responses.is_empty() {
            let fallback = self.scanner.default_timeout();
            tracing::info!(?target, ?fallback, "no responses, retrying with defaults");
            responses = self.bounded_scan(None, fallback).await?;
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::with_capacity(responses.len());
        for raw in responses {
            if seen.contains(raw.address.trim()) {
                tracing::debug!(address = %raw.address, "duplicate response ignored");
                continue;
            }

            let record = match normalize(raw) {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping discovery response");
                    continue;
                }
            };
            seen.insert(record.address.clone());

            if is_registered(registry, &record).await? {
                tracing::debug!(address = %record.address, "already registered");
                continue;
            }
            records.push(record);
        }
        Ok(records)
    }

    async fn bounded_scan(
        &self,
        target: Option<std::net::Ipv4Addr>,
        timeout: Duration,
    ) -> Result<Vec<RawResponse>, DiscoveryError> {
        let deadline = timeout + SCAN_GRACE;
        let responses = tokio::time::timeout(deadline, self.scanner.scan(target, timeout))
            .await
            .map_err(|_| DiscoveryError::TimedOut(deadline))??;
        tracing::debug!(?target, count = responses.len(), "scan complete");
        Ok(responses)
    }
}

async fn is_registered<R: DeviceRegistry>(
    registry: &R,
    record: &DiscoveryRecord,
) -> Result<bool, OneLightError> {
    if registry.find_by_address(&record.address).await?.is_some() {
        return Ok(true);
    }
    match record.hardware_id.as_deref() {
        Some(hardware_id) => Ok(registry.find_by_hardware_id(hardware_id).await?.is_some()),
        None => Ok(false),
    }
}
