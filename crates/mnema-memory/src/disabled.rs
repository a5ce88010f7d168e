// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector memory used when `memory.enabled = false`.

use async_trait::async_trait;
use mnema_core::{
    AdapterType, HealthStatus, MnemaError, PluginAdapter, TurnPair, VectorMemoryAdapter,
};

/// Stores nothing and finds nothing.
pub struct DisabledMemory;

#[async_trait]
impl PluginAdapter for DisabledMemory {
    fn name(&self) -> &str {
        "disabled-memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorMemory
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemaError> {
        Ok(HealthStatus::Degraded("vector memory disabled".into()))
    }

    async fn shutdown(&self) -> Result<(), MnemaError> {
        Ok(())
    }
}

#[async_trait]
impl VectorMemoryAdapter for DisabledMemory {
    async fn upsert(&self, _pair: &TurnPair) -> Result<(), MnemaError> {
        Ok(())
    }

    async fn search(&self, _query: &str, _k: usize) -> Result<Vec<String>, MnemaError> {
        Ok(Vec::new())
    }
}
