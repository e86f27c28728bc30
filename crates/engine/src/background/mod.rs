//! Background jobs.
//!
//! Each submodule provides a long-running async function meant to be
//! spawned with `tokio::spawn`, stopped through a `CancellationToken`.

pub mod midnight;
