//! `assetrec-recon` - physical asset count reconciliation engine.
//!
//! Pure engine crate: reads assets through an injected [`AssetStore`] and
//! mutates reconciliation records in place. No CLI or IO dependencies.

pub mod calculator;
pub mod error;
pub mod memory;
pub mod model;
pub mod numeric;
pub mod resolver;
pub mod store;

pub use calculator::{validate_items, Reconciler};
pub use error::{ReconError, StoreError};
pub use memory::MemoryAssetStore;
pub use model::{
    AssetRecord, AssetSnapshot, DocStatus, ReconcileLine, ReconcileRecord, ScanOutcome, SystemData,
};
pub use resolver::{AssetResolver, DISPOSED_STATUSES};
pub use store::{AssetFilter, AssetStore, LiveValuation, StatusFilter, Valuation};
