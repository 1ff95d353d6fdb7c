// SQLite-backed asset book

use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use assetrec_recon::model::{AssetRecord, DocStatus};
use assetrec_recon::store::{AssetFilter, AssetStore, LiveValuation, StatusFilter, Valuation};
use assetrec_recon::StoreError;

use crate::csv::Register;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS asset (
    name TEXT PRIMARY KEY,
    asset_name TEXT NOT NULL DEFAULT '',
    company TEXT NOT NULL DEFAULT '',
    location TEXT NOT NULL DEFAULT '',
    custodian TEXT,
    status TEXT NOT NULL DEFAULT 'Draft',
    asset_category TEXT NOT NULL DEFAULT '',
    department TEXT,
    cost_center TEXT,
    item_code TEXT,
    gross_purchase_amount REAL NOT NULL DEFAULT 0,
    opening_accumulated_depreciation REAL NOT NULL DEFAULT 0,
    value_after_depreciation REAL NOT NULL DEFAULT 0,
    calculate_depreciation INTEGER NOT NULL DEFAULT 0,
    docstatus INTEGER NOT NULL DEFAULT 0   -- 0=draft, 1=submitted, 2=cancelled
);

CREATE TABLE IF NOT EXISTS item_barcode (
    barcode TEXT PRIMARY KEY,
    parent TEXT NOT NULL                   -- item code
);
"#;

/// Booked depreciation. Its presence switches the store to live valuation.
const DEPRECIATION_LEDGER: &str = r#"
CREATE TABLE IF NOT EXISTS asset_depreciation_entry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    asset TEXT NOT NULL,
    amount REAL NOT NULL,
    posted INTEGER NOT NULL DEFAULT 1,
    FOREIGN KEY (asset) REFERENCES asset(name)
);
"#;

const SELECT_COLUMNS: &str = "name, asset_name, company, location, custodian, status, \
    asset_category, department, cost_center, item_code, gross_purchase_amount, \
    value_after_depreciation, calculate_depreciation, docstatus, \
    opening_accumulated_depreciation";

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, StoreError> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .map_err(backend)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(backend)?;
    for name in names {
        if name.map_err(backend)? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn has_table(conn: &Connection, table: &str) -> Result<bool, StoreError> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
    .map_err(backend)
}

fn ensure_custom_barcode(conn: &Connection) -> Result<(), StoreError> {
    if !has_column(conn, "asset", "custom_barcode")? {
        conn.execute_batch("ALTER TABLE asset ADD COLUMN custom_barcode TEXT;")
            .map_err(backend)?;
    }
    Ok(())
}

fn upsert_asset(conn: &Connection, asset: &AssetRecord) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO asset (name, asset_name, company, location, custodian, status, \
         asset_category, department, cost_center, item_code, gross_purchase_amount, \
         value_after_depreciation, calculate_depreciation, docstatus, \
         opening_accumulated_depreciation) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            asset.name,
            asset.asset_name,
            asset.company,
            asset.location,
            asset.custodian,
            asset.status,
            asset.asset_category,
            asset.department,
            asset.cost_center,
            asset.item_code,
            asset.gross_purchase_amount,
            asset.value_after_depreciation,
            asset.calculate_depreciation,
            asset.docstatus.code(),
            asset.opening_accumulated_depreciation,
        ],
    )
    .map_err(backend)?;

    if let Some(ref barcode) = asset.custom_barcode {
        ensure_custom_barcode(conn)?;
        conn.execute(
            "UPDATE asset SET custom_barcode = ?1 WHERE name = ?2",
            params![barcode, asset.name],
        )
        .map_err(backend)?;
    }
    Ok(())
}

/// Read one asset row. The docstatus code is returned raw so the caller can
/// report unknown codes as malformed data.
fn read_asset(row: &Row<'_>, with_barcode: bool) -> rusqlite::Result<(AssetRecord, i64)> {
    let asset = AssetRecord {
        name: row.get(0)?,
        asset_name: row.get(1)?,
        company: row.get(2)?,
        location: row.get(3)?,
        custodian: row.get(4)?,
        status: row.get(5)?,
        asset_category: row.get(6)?,
        department: row.get(7)?,
        cost_center: row.get(8)?,
        item_code: row.get(9)?,
        gross_purchase_amount: row.get(10)?,
        opening_accumulated_depreciation: row.get(14)?,
        value_after_depreciation: row.get(11)?,
        calculate_depreciation: row.get(12)?,
        custom_barcode: if with_barcode { row.get(15)? } else { None },
        docstatus: DocStatus::Draft,
    };
    Ok((asset, row.get(13)?))
}

fn finish_asset((mut asset, code): (AssetRecord, i64)) -> Result<AssetRecord, StoreError> {
    asset.docstatus = DocStatus::from_code(code).ok_or_else(|| {
        StoreError::Malformed(format!("asset '{}': unknown docstatus {code}", asset.name))
    })?;
    Ok(asset)
}

/// Parameterised WHERE clause.
#[derive(Default)]
struct WhereClause {
    clauses: Vec<String>,
    args: Vec<String>,
}

impl WhereClause {
    fn eq(&mut self, column: &str, value: &Option<String>) {
        if let Some(v) = value {
            self.args.push(v.clone());
            self.clauses.push(format!("{column} = ?{}", self.args.len()));
        }
    }

    fn not_in(&mut self, column: &str, values: &[String]) {
        if values.is_empty() {
            return;
        }
        let mut slots = Vec::with_capacity(values.len());
        for v in values {
            self.args.push(v.clone());
            slots.push(format!("?{}", self.args.len()));
        }
        self.clauses.push(format!("{column} NOT IN ({})", slots.join(", ")));
    }

    fn raw(&mut self, clause: &str) {
        self.clauses.push(clause.to_string());
    }

    fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

pub struct SqliteAssetStore {
    conn: Connection,
}

impl SqliteAssetStore {
    /// Open (or create) a store at `path`, ensuring the base schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(backend)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(backend)?;
        Ok(Self { conn })
    }

    /// Insert or replace an asset row.
    pub fn upsert_asset(&self, asset: &AssetRecord) -> Result<(), StoreError> {
        upsert_asset(&self.conn, asset)
    }

    /// Write a register, its item barcodes and posted depreciation in one
    /// transaction. Assets and barcodes are upserted. Every asset named in
    /// `depreciation` has its ledger replaced by the given entries, so
    /// importing the same files again leaves the store unchanged.
    pub fn import_register(
        &mut self,
        register: &Register,
        item_barcodes: &[(String, String)],
        depreciation: &[(String, f64)],
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction().map_err(backend)?;
        if register.has_custom_barcode {
            ensure_custom_barcode(&tx)?;
        }
        for asset in &register.assets {
            upsert_asset(&tx, asset)?;
        }
        for (barcode, item_code) in item_barcodes {
            tx.execute(
                "INSERT OR REPLACE INTO item_barcode (barcode, parent) VALUES (?1, ?2)",
                params![barcode, item_code],
            )
            .map_err(backend)?;
        }
        if !depreciation.is_empty() {
            tx.execute_batch(DEPRECIATION_LEDGER).map_err(backend)?;
            let replaced: BTreeSet<&str> = depreciation.iter().map(|(a, _)| a.as_str()).collect();
            for asset in replaced {
                tx.execute(
                    "DELETE FROM asset_depreciation_entry WHERE asset = ?1",
                    params![asset],
                )
                .map_err(backend)?;
            }
            for (asset, amount) in depreciation {
                tx.execute(
                    "INSERT INTO asset_depreciation_entry (asset, amount, posted) VALUES (?1, ?2, 1)",
                    params![asset, amount],
                )
                .map_err(backend)?;
            }
        }
        tx.commit().map_err(backend)?;
        log::debug!(
            "imported {} assets, {} item barcodes, {} depreciation entries",
            register.assets.len(),
            item_barcodes.len(),
            depreciation.len()
        );
        Ok(())
    }

    fn select_sql(&self) -> Result<(String, bool), StoreError> {
        let with_barcode = has_column(&self.conn, "asset", "custom_barcode")?;
        let columns = if with_barcode {
            format!("{SELECT_COLUMNS}, custom_barcode")
        } else {
            SELECT_COLUMNS.to_string()
        };
        Ok((format!("SELECT {columns} FROM asset"), with_barcode))
    }

    fn live_enabled(&self) -> bool {
        match has_table(&self.conn, "asset_depreciation_entry") {
            Ok(found) => found,
            Err(e) => {
                log::warn!("cannot inspect depreciation ledger: {e}");
                false
            }
        }
    }
}

impl AssetStore for SqliteAssetStore {
    fn has_custom_barcode_field(&self) -> Result<bool, StoreError> {
        has_column(&self.conn, "asset", "custom_barcode")
    }

    fn get(&self, name: &str) -> Result<Option<AssetRecord>, StoreError> {
        let (select, with_barcode) = self.select_sql()?;
        let raw = self
            .conn
            .query_row(&format!("{select} WHERE name = ?1"), params![name], |row| {
                read_asset(row, with_barcode)
            })
            .optional()
            .map_err(backend)?;
        raw.map(finish_asset).transpose()
    }

    fn find(&self, filter: &AssetFilter) -> Result<Vec<AssetRecord>, StoreError> {
        let (select, with_barcode) = self.select_sql()?;
        if filter.custom_barcode.is_some() && !with_barcode {
            return Ok(Vec::new());
        }

        let mut clause = WhereClause::default();
        if filter.submitted_only {
            clause.raw("docstatus = 1");
        }
        clause.eq("name", &filter.name);
        clause.eq("custom_barcode", &filter.custom_barcode);
        clause.eq("item_code", &filter.item_code);
        clause.eq("company", &filter.company);
        clause.eq("location", &filter.location);
        clause.eq("asset_category", &filter.asset_category);
        match &filter.status {
            StatusFilter::Any => {}
            StatusFilter::Is(status) => clause.eq("status", &Some(status.clone())),
            StatusFilter::NotIn(excluded) => clause.not_in("status", excluded),
        }

        let sql = format!("{select}{} ORDER BY asset_name ASC, name ASC", clause.sql());
        log::debug!("asset query: {sql}");

        let mut stmt = self.conn.prepare(&sql).map_err(backend)?;
        let rows = stmt
            .query_map(params_from_iter(clause.args.iter()), |row| {
                read_asset(row, with_barcode)
            })
            .map_err(backend)?;

        let mut assets = Vec::new();
        for raw in rows {
            assets.push(finish_asset(raw.map_err(backend)?)?);
        }
        Ok(assets)
    }

    fn item_code_for_barcode(&self, barcode: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row(
                "SELECT parent FROM item_barcode WHERE barcode = ?1",
                params![barcode],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)
    }

    fn valuation(&self) -> Valuation<'_> {
        if self.live_enabled() {
            Valuation::Live(self)
        } else {
            Valuation::Static
        }
    }
}

impl LiveValuation for SqliteAssetStore {
    /// Gross purchase amount less opening and posted depreciation. Assets
    /// that do not depreciate keep their stored value.
    fn value_after_depreciation(&self, asset: &AssetRecord) -> Result<f64, StoreError> {
        if !asset.calculate_depreciation {
            return Ok(asset.stored_value());
        }
        let booked: f64 = self
            .conn
            .query_row(
                "SELECT COALESCE(SUM(amount), 0.0) FROM asset_depreciation_entry \
                 WHERE asset = ?1 AND posted = 1",
                params![asset.name],
                |row| row.get(0),
            )
            .map_err(backend)?;
        Ok(asset.gross_purchase_amount - asset.opening_accumulated_depreciation - booked)
    }
}
