// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary and applied
//! every time a database is opened.

use mnema_core::MnemaError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), MnemaError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(MnemaError::storage)?;
    for migration in report.applied_migrations() {
        tracing::debug!(version = migration.version(), name = %migration.name(), "migration applied");
    }
    Ok(())
}
