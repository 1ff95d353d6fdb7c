use thiserror::Error;

/// Failures raised by an [`AssetStore`](crate::store::AssetStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Query or connection failure in the underlying database.
    #[error("store backend error: {0}")]
    Backend(String),
    /// File read/write failure.
    #[error("IO error: {0}")]
    Io(String),
    /// A stored asset row could not be decoded.
    #[error("malformed asset data: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ReconError {
    /// The same asset appears on more than one line. `idx` is the 1-based
    /// row of the later occurrence.
    #[error("Asset {asset} is duplicated in row {idx}")]
    DuplicateAsset { asset: String, idx: usize },
    /// Filtered listing was called without a company.
    #[error("Company is required to fetch assets")]
    MissingCompany,
    #[error(transparent)]
    Store(#[from] StoreError),
}
