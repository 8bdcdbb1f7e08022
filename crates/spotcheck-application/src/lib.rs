// SPDX-License-Identifier: GPL-3.0-or-later

//! Reconciliation pipeline: discovery, tag extraction, dispatch,
//! classification and reporting.

pub mod discovery;
pub mod matcher;
pub mod pipeline;
pub mod report;
pub mod tags;

pub use discovery::{DiscoveryError, FileDiscovery};
pub use matcher::classify;
pub use pipeline::ReconciliationPipeline;
pub use report::{render_table, summarize};
pub use tags::{TagError, TagReader, TagSource};
