// CSV asset register import

use std::path::{Path, PathBuf};

use assetrec_recon::model::{AssetRecord, DocStatus};
use assetrec_recon::numeric::flt;
use assetrec_recon::{MemoryAssetStore, StoreError};

/// Assets parsed from a register export.
#[derive(Debug, Default)]
pub struct Register {
    pub assets: Vec<AssetRecord>,
    /// The export carried a `custom_barcode` column.
    pub has_custom_barcode: bool,
}

/// Load a register file into an in-memory store. A sibling
/// `<stem>.barcodes.csv` (columns `barcode,item_code`) is loaded as the item
/// barcode table when present.
pub fn load_register(path: &Path) -> Result<MemoryAssetStore, StoreError> {
    let register = read_register(path)?;

    let mut store = MemoryAssetStore::new();
    store.set_custom_barcode_field(register.has_custom_barcode);
    let count = register.assets.len();
    for asset in register.assets {
        store.insert(asset);
    }
    for (barcode, item_code) in read_sibling_barcodes(path)? {
        store.add_item_barcode(&barcode, &item_code);
    }

    log::debug!("{count} assets from {}", path.display());
    Ok(store)
}

pub fn read_register(path: &Path) -> Result<Register, StoreError> {
    parse_register(&read_file(path)?)
}

/// Item barcodes next to a register, or none when the file is absent.
pub fn read_sibling_barcodes(register: &Path) -> Result<Vec<(String, String)>, StoreError> {
    let path = barcodes_path(register);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let pairs = parse_item_barcodes(&read_file(&path)?)?;
    log::debug!("{} item barcodes from {}", pairs.len(), path.display());
    Ok(pairs)
}

pub fn read_depreciation_entries(path: &Path) -> Result<Vec<(String, f64)>, StoreError> {
    parse_depreciation_entries(&read_file(path)?)
}

/// `assets.csv` -> `assets.barcodes.csv`
pub fn barcodes_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}.barcodes.csv"))
}

fn read_file(path: &Path) -> Result<String, StoreError> {
    std::fs::read_to_string(path)
        .map_err(|e| StoreError::Io(format!("cannot read {}: {e}", path.display())))
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                ::csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn reader(content: &str) -> ::csv::Reader<&[u8]> {
    ::csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(sniff_delimiter(content))
        .trim(::csv::Trim::All)
        .from_reader(content.as_bytes())
}

fn parse_docstatus(raw: &str) -> Option<DocStatus> {
    match raw.to_ascii_lowercase().as_str() {
        "0" | "draft" => Some(DocStatus::Draft),
        "1" | "submitted" => Some(DocStatus::Submitted),
        "2" | "cancelled" => Some(DocStatus::Cancelled),
        _ => None,
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "y")
}

fn non_blank(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Parse a register export. Only `name` is required; other columns default.
/// Rows without a `docstatus` column are taken as submitted.
pub fn parse_register(content: &str) -> Result<Register, StoreError> {
    let mut reader = reader(content);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StoreError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| headers.iter().position(|h| h == name);
    let name_idx = idx("name")
        .ok_or_else(|| StoreError::Malformed("register: missing column 'name'".into()))?;
    let cols = RegisterColumns {
        asset_name: idx("asset_name"),
        company: idx("company"),
        location: idx("location"),
        custodian: idx("custodian"),
        status: idx("status"),
        asset_category: idx("asset_category"),
        department: idx("department"),
        cost_center: idx("cost_center"),
        item_code: idx("item_code"),
        custom_barcode: idx("custom_barcode"),
        gross_purchase_amount: idx("gross_purchase_amount"),
        opening_accumulated_depreciation: idx("opening_accumulated_depreciation"),
        value_after_depreciation: idx("value_after_depreciation"),
        calculate_depreciation: idx("calculate_depreciation"),
        docstatus: idx("docstatus"),
    };

    let mut assets = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| StoreError::Io(e.to_string()))?;
        let field = |i: Option<usize>| i.and_then(|i| record.get(i)).unwrap_or("");

        let name = record.get(name_idx).unwrap_or("");
        if name.is_empty() {
            log::warn!("register row {}: no asset name, skipped", line + 2);
            continue;
        }

        let docstatus = match cols.docstatus {
            None => DocStatus::Submitted,
            Some(i) => {
                let raw = record.get(i).unwrap_or("");
                parse_docstatus(raw).ok_or_else(|| {
                    StoreError::Malformed(format!(
                        "register row {}: asset '{name}': unknown docstatus '{raw}'",
                        line + 2
                    ))
                })?
            }
        };

        assets.push(AssetRecord {
            name: name.to_string(),
            asset_name: field(cols.asset_name).to_string(),
            company: field(cols.company).to_string(),
            location: field(cols.location).to_string(),
            custodian: non_blank(field(cols.custodian)),
            status: field(cols.status).to_string(),
            asset_category: field(cols.asset_category).to_string(),
            department: non_blank(field(cols.department)),
            cost_center: non_blank(field(cols.cost_center)),
            item_code: non_blank(field(cols.item_code)),
            custom_barcode: non_blank(field(cols.custom_barcode)),
            gross_purchase_amount: flt(field(cols.gross_purchase_amount)),
            opening_accumulated_depreciation: flt(field(cols.opening_accumulated_depreciation)),
            value_after_depreciation: flt(field(cols.value_after_depreciation)),
            calculate_depreciation: parse_flag(field(cols.calculate_depreciation)),
            docstatus,
        });
    }

    Ok(Register {
        assets,
        has_custom_barcode: cols.custom_barcode.is_some(),
    })
}

struct RegisterColumns {
    asset_name: Option<usize>,
    company: Option<usize>,
    location: Option<usize>,
    custodian: Option<usize>,
    status: Option<usize>,
    asset_category: Option<usize>,
    department: Option<usize>,
    cost_center: Option<usize>,
    item_code: Option<usize>,
    custom_barcode: Option<usize>,
    gross_purchase_amount: Option<usize>,
    opening_accumulated_depreciation: Option<usize>,
    value_after_depreciation: Option<usize>,
    calculate_depreciation: Option<usize>,
    docstatus: Option<usize>,
}

/// Parse `barcode,item_code` pairs. The item column may also be called
/// `parent`.
pub fn parse_item_barcodes(content: &str) -> Result<Vec<(String, String)>, StoreError> {
    let mut reader = reader(content);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StoreError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| headers.iter().position(|h| h == name);
    let barcode_idx = idx("barcode")
        .ok_or_else(|| StoreError::Malformed("barcodes: missing column 'barcode'".into()))?;
    let item_idx = idx("item_code").or_else(|| idx("parent")).ok_or_else(|| {
        StoreError::Malformed("barcodes: missing column 'item_code'".into())
    })?;

    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| StoreError::Io(e.to_string()))?;
        let barcode = record.get(barcode_idx).unwrap_or("");
        let item = record.get(item_idx).unwrap_or("");
        if barcode.is_empty() || item.is_empty() {
            continue;
        }
        pairs.push((barcode.to_string(), item.to_string()));
    }
    Ok(pairs)
}

/// Parse posted depreciation entries (`asset,amount`).
pub fn parse_depreciation_entries(content: &str) -> Result<Vec<(String, f64)>, StoreError> {
    let mut reader = reader(content);
    let headers = reader.headers().map_err(|e| StoreError::Io(e.to_string()))?.clone();

    let idx = |name: &str| headers.iter().position(|h| h == name);
    let asset_idx = idx("asset")
        .ok_or_else(|| StoreError::Malformed("depreciation: missing column 'asset'".into()))?;
    let amount_idx = idx("amount")
        .or_else(|| idx("depreciation_amount"))
        .ok_or_else(|| StoreError::Malformed("depreciation: missing column 'amount'".into()))?;

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| StoreError::Io(e.to_string()))?;
        let asset = record.get(asset_idx).unwrap_or("");
        if asset.is_empty() {
            continue;
        }
        entries.push((asset.to_string(), flt(record.get(amount_idx).unwrap_or(""))));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetrec_recon::{AssetResolver, AssetStore};
    use std::fs;
    use tempfile::tempdir;

    const REGISTER: &str = "\
name,asset_name,company,location,status,asset_category,item_code,gross_purchase_amount,value_after_depreciation,calculate_depreciation
AST-1,Laptop,C1,HQ,Submitted,IT,IT1,\"1,200.00\",900,1
AST-2,Desk,C1,HQ,Sold,Furniture,,300,,0
,Ghost,C1,HQ,Submitted,IT,,1,1,0
";

    #[test]
    fn parse_basic_register() {
        let register = parse_register(REGISTER).unwrap();
        assert_eq!(register.assets.len(), 2);
        assert!(!register.has_custom_barcode);

        let laptop = &register.assets[0];
        assert_eq!(laptop.name, "AST-1");
        assert_eq!(laptop.gross_purchase_amount, 1200.0);
        assert_eq!(laptop.value_after_depreciation, 900.0);
        assert!(laptop.calculate_depreciation);
        assert_eq!(laptop.docstatus, DocStatus::Submitted);
        assert_eq!(laptop.item_code.as_deref(), Some("IT1"));

        let desk = &register.assets[1];
        assert_eq!(desk.item_code, None);
        assert_eq!(desk.value_after_depreciation, 0.0);
        assert_eq!(desk.stored_value(), 300.0);
    }

    #[test]
    fn semicolon_register_is_sniffed() {
        let content = "name;company;docstatus;custom_barcode\nAST-1;C1;draft;BC1\nAST-2;C1;1;\n";
        let register = parse_register(content).unwrap();
        assert!(register.has_custom_barcode);
        assert_eq!(register.assets[0].docstatus, DocStatus::Draft);
        assert_eq!(register.assets[0].custom_barcode.as_deref(), Some("BC1"));
        assert_eq!(register.assets[1].custom_barcode, None);
    }

    #[test]
    fn missing_name_column_is_malformed() {
        let err = parse_register("asset_name,company\nLaptop,C1\n").unwrap_err();
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn bad_docstatus_reports_row() {
        let err = parse_register("name,docstatus\nAST-1,1\nAST-2,maybe\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("row 3"), "{msg}");
        assert!(msg.contains("AST-2"), "{msg}");
    }

    #[test]
    fn barcodes_accept_parent_column() {
        let pairs = parse_item_barcodes("barcode,parent\nBC1,IT1\n,IT2\nBC3,\n").unwrap();
        assert_eq!(pairs, vec![("BC1".to_string(), "IT1".to_string())]);
    }

    #[test]
    fn depreciation_entries() {
        let entries =
            parse_depreciation_entries("asset,depreciation_amount\nAST-1,\"1,000\"\n,5\nAST-2,x\n")
                .unwrap();
        assert_eq!(
            entries,
            vec![("AST-1".to_string(), 1000.0), ("AST-2".to_string(), 0.0)]
        );
    }

    #[test]
    fn load_register_with_sibling_barcodes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets.csv");
        fs::write(&path, REGISTER).unwrap();
        fs::write(dir.path().join("assets.barcodes.csv"), "barcode,item_code\n590123,IT1\n").unwrap();

        let store = load_register(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.item_code_for_barcode("590123").unwrap().as_deref(), Some("IT1"));

        let resolver = AssetResolver::new(&store);
        let snap = resolver
            .resolve_by_search_value("590123", Some("C1"), Some("HQ"))
            .unwrap()
            .unwrap();
        assert_eq!(snap.asset, "AST-1");
    }

    #[test]
    fn barcodes_path_sits_next_to_register() {
        let p = barcodes_path(Path::new("/data/hq/assets.csv"));
        assert_eq!(p, PathBuf::from("/data/hq/assets.barcodes.csv"));
    }
}
