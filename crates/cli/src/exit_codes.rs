//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Domain    | Description                                  |
//! |------|-----------|----------------------------------------------|
//! | 0    | Universal | Success                                      |
//! | 1    | Universal | General error (unspecified)                  |
//! | 2    | Universal | CLI usage error (bad args, no store)         |
//! | 3    | recon     | Asset appears on more than one record line   |
//! | 4    | recon     | Listing requested without a company          |
//! | 5    | store     | Asset store could not be opened or queried   |
//! | 6    | record    | Record file could not be read, parsed, written |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`

use assetrec_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, no asset store configured.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Reconciliation (3-4)
// =============================================================================

/// Duplicate asset on a reconciliation record. The record is not written.
pub const EXIT_DUPLICATE_ASSET: u8 = 3;

/// Company missing for a listing or fetch.
pub const EXIT_MISSING_COMPANY: u8 = 4;

// =============================================================================
// IO (5-6)
// =============================================================================

/// Asset store error (SQLite failure, unreadable register, malformed row).
pub const EXIT_STORE: u8 = 5;

/// Record file error (missing, invalid JSON, not writable).
pub const EXIT_RECORD: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::DuplicateAsset { .. } => EXIT_DUPLICATE_ASSET,
        ReconError::MissingCompany => EXIT_MISSING_COMPANY,
        ReconError::Store(_) => EXIT_STORE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetrec_recon::StoreError;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_DUPLICATE_ASSET,
            EXIT_MISSING_COMPANY,
            EXIT_STORE,
            EXIT_RECORD,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn recon_errors_map() {
        let dup = ReconError::DuplicateAsset {
            asset: "A1".into(),
            idx: 2,
        };
        assert_eq!(recon_exit_code(&dup), EXIT_DUPLICATE_ASSET);
        assert_eq!(recon_exit_code(&ReconError::MissingCompany), EXIT_MISSING_COMPANY);
        let store = ReconError::Store(StoreError::Backend("locked".into()));
        assert_eq!(recon_exit_code(&store), EXIT_STORE);
    }
}
