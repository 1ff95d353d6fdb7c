// Asset store backends and record files

pub mod csv;
pub mod json;
pub mod native;

use std::path::Path;

use assetrec_recon::{AssetStore, StoreError};

pub use json::{load_record, save_record, RecordError};
pub use native::SqliteAssetStore;

/// Kind of asset store a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Read-only register export, loaded into memory.
    CsvRegister,
    /// SQLite asset book.
    Sqlite,
}

impl StoreKind {
    pub fn for_path(path: &Path) -> Self {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv") || e.eq_ignore_ascii_case("tsv"));
        if is_csv {
            Self::CsvRegister
        } else {
            Self::Sqlite
        }
    }
}

/// Open the asset store at `path`, picking the backend from the extension.
pub fn open_store(path: &Path) -> Result<Box<dyn AssetStore>, StoreError> {
    match StoreKind::for_path(path) {
        StoreKind::CsvRegister => Ok(Box::new(csv::load_register(path)?)),
        StoreKind::Sqlite => {
            if !path.exists() {
                return Err(StoreError::Io(format!(
                    "asset store not found: {}",
                    path.display()
                )));
            }
            Ok(Box::new(SqliteAssetStore::open(path)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn kind_from_extension() {
        assert_eq!(StoreKind::for_path(Path::new("a.csv")), StoreKind::CsvRegister);
        assert_eq!(StoreKind::for_path(Path::new("a.TSV")), StoreKind::CsvRegister);
        assert_eq!(StoreKind::for_path(Path::new("a.sqlite")), StoreKind::Sqlite);
        assert_eq!(StoreKind::for_path(Path::new("assets")), StoreKind::Sqlite);
    }

    #[test]
    fn open_csv_register() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets.csv");
        fs::write(&path, "name,company\nAST-1,C1\n").unwrap();
        let store = open_store(&path).unwrap();
        assert!(store.get("AST-1").unwrap().is_some());
    }

    #[test]
    fn missing_sqlite_is_not_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.sqlite");
        assert!(matches!(open_store(&path), Err(StoreError::Io(_))));
        assert!(!path.exists());
    }
}
