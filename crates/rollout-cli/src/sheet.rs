//! CSV implementations of the sheet import/export collaborators.
//!
//! Import reads one row per work item (`version` and `cdu` columns
//! required; `date`, `time`, `description`, `status`, `uuid` and
//! `production` optional) and groups rows into versions by display
//! number, first occurrence order. When the sheet carries no uuid the
//! importer derives one from the item name, so the same name recurring
//! across rows resolves to one logical item and unique stats stay
//! correct across re-imports.
//!
//! Export writes the summary table (per-version counts plus raw/unique
//! totals) and the detail table (one row per item instance) into one
//! file as two titled sections.
//!
//! A parse failure aborts the whole import; the caller only replaces the
//! store once a bundle came back clean.

use rollout_core::error::{ExportError, ImportError};
use rollout_core::model::CduUuid;
use rollout_core::normalize::{RawCdu, RawVersion};
use rollout_core::ports::{ExportBook, ImportBundle, SheetExporter, SheetImporter};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub struct CsvSheetImporter {
    path: PathBuf,
}

impl CsvSheetImporter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SheetImporter for CsvSheetImporter {
    fn import(&self) -> Result<ImportBundle, ImportError> {
        let content = fs::read_to_string(&self.path).map_err(|source| ImportError::Read {
            path: self.path.display().to_string(),
            source,
        })?;
        parse_sheet(&content)
    }
}

pub struct CsvSheetExporter {
    path: PathBuf,
}

impl CsvSheetExporter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SheetExporter for CsvSheetExporter {
    fn export(&self, book: &ExportBook) -> Result<(), ExportError> {
        fs::write(&self.path, render_book(book)).map_err(|source| ExportError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

fn parse_sheet(content: &str) -> Result<ImportBundle, ImportError> {
    let mut lines = content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    let (_, header) = lines.next().ok_or(ImportError::MissingHeader)?;
    let columns = Columns::from_header(header)?;

    let mut versions: Vec<RawVersion> = Vec::new();
    let mut by_number: HashMap<String, usize> = HashMap::new();
    let mut production_version_id = None;

    for (line_no, line) in lines {
        let fields = split_row(line);
        let row = line_no + 1;

        let number = required_cell(&fields, columns.version, "version", row)?;
        let slot = *by_number.entry(number.clone()).or_insert_with(|| {
            versions.push(RawVersion {
                id: Some(versions.len() as u64 + 1),
                number,
                ..RawVersion::default()
            });
            versions.len() - 1
        });

        let version = &mut versions[slot];
        if let Some(date) = cell(&fields, columns.date) {
            if version.deploy_date.is_empty() {
                version.deploy_date = date;
            }
        }
        if let Some(time) = cell(&fields, columns.time) {
            if version.deploy_time.is_empty() {
                version.deploy_time = time;
            }
        }
        if cell(&fields, columns.production)
            .is_some_and(|flag| matches!(flag.to_ascii_lowercase().as_str(), "x" | "yes" | "true"))
        {
            production_version_id = version.id;
        }

        let name = required_cell(&fields, columns.cdu, "cdu", row)?;
        if name.is_empty() {
            // A row may introduce a version with no items.
            continue;
        }

        let uuid = cell(&fields, columns.uuid)
            .unwrap_or_else(|| CduUuid::derive(&name).as_str().to_string());

        version.cdus.push(RawCdu {
            name,
            uuid: Some(uuid),
            description: cell(&fields, columns.description).unwrap_or_default(),
            status: cell(&fields, columns.status),
            ..RawCdu::default()
        });
    }

    tracing::info!(
        versions = versions.len(),
        items = versions.iter().map(|v| v.cdus.len()).sum::<usize>(),
        "sheet parsed"
    );
    Ok(ImportBundle {
        versions,
        production_version_id,
    })
}

/// Column indexes resolved from the header row.
struct Columns {
    version: Option<usize>,
    date: Option<usize>,
    time: Option<usize>,
    cdu: Option<usize>,
    description: Option<usize>,
    status: Option<usize>,
    uuid: Option<usize>,
    production: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> Result<Self, ImportError> {
        let names: Vec<String> = split_row(header)
            .into_iter()
            .map(|name| name.trim().to_ascii_lowercase())
            .collect();
        let find = |wanted: &str| names.iter().position(|n| n == wanted);

        let columns = Self {
            version: find("version"),
            date: find("date"),
            time: find("time"),
            cdu: find("cdu").or_else(|| find("nombre cdu")),
            description: find("description"),
            status: find("status"),
            uuid: find("uuid"),
            production: find("production"),
        };

        if columns.version.is_none() {
            return Err(ImportError::MissingColumn("version"));
        }
        if columns.cdu.is_none() {
            return Err(ImportError::MissingColumn("cdu"));
        }
        Ok(columns)
    }

}

fn cell(fields: &[String], index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| fields.get(i))
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
}

fn required_cell(
    fields: &[String],
    index: Option<usize>,
    column: &'static str,
    row: usize,
) -> Result<String, ImportError> {
    let Some(index) = index else {
        return Err(ImportError::MissingColumn(column));
    };
    fields
        .get(index)
        .map(|f| f.trim().to_string())
        .ok_or(ImportError::Malformed {
            row,
            message: format!("row has no '{column}' cell"),
        })
}

/// Split one CSV row, honoring double-quoted fields with `""` escapes.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

fn render_book(book: &ExportBook) -> String {
    let mut out = String::new();

    out.push_str("# summary\n");
    out.push_str("version,in-development,pending-certification,certified-ok,in-production,production\n");
    for row in &book.summary {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            escape(&row.version),
            row.counts.in_development,
            row.counts.pending_certification,
            row.counts.certified_ok,
            row.counts.in_production,
            if row.production { "yes" } else { "" },
        ));
    }
    out.push_str(&format!(
        "total (raw),{},{},{},{},\n",
        book.raw_totals.in_development,
        book.raw_totals.pending_certification,
        book.raw_totals.certified_ok,
        book.raw_totals.in_production,
    ));
    out.push_str(&format!(
        "total (unique),{},{},{},{},\n",
        book.unique_totals.in_development,
        book.unique_totals.pending_certification,
        book.unique_totals.certified_ok,
        book.unique_totals.in_production,
    ));

    out.push_str("\n# detail\n");
    out.push_str("version,cdu,uuid,status,description,parties,observations\n");
    for row in &book.detail {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            escape(&row.version),
            escape(&row.name),
            row.uuid,
            row.status,
            escape(&row.description),
            row.parties,
            row.observations,
        ));
    }
    out
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_sheet, render_book, split_row};
    use rollout_core::error::ImportError;
    use rollout_core::ports::ExportBook;
    use rollout_core::Catalog;

    #[test]
    fn rows_group_into_versions_by_display_number() {
        let bundle = parse_sheet(
            "version,date,cdu,status,production\n\
             1.0,2024-05-02,PORTA,certified-ok,yes\n\
             1.0,,LOGIN,in-development,\n\
             1.1,2024-06-14,SEARCH,,\n",
        )
        .unwrap();

        assert_eq!(bundle.versions.len(), 2);
        assert_eq!(bundle.versions[0].number, "1.0");
        assert_eq!(bundle.versions[0].deploy_date, "2024-05-02");
        assert_eq!(bundle.versions[0].cdus.len(), 2);
        assert_eq!(bundle.versions[1].cdus.len(), 1);
        assert_eq!(bundle.production_version_id, Some(1));
    }

    #[test]
    fn recurring_names_without_uuid_column_share_one_uuid() {
        let bundle = parse_sheet(
            "version,cdu\n\
             1.0,PORTA\n\
             2.0,PORTA\n",
        )
        .unwrap();

        let a = bundle.versions[0].cdus[0].uuid.clone().unwrap();
        let b = bundle.versions[1].cdus[0].uuid.clone().unwrap();
        assert_eq!(a, b);

        // End to end: unique stats see one logical item.
        let mut catalog = Catalog::new();
        catalog.replace_all(bundle.versions, bundle.production_version_id);
        assert_eq!(catalog.stats_raw().total(), 2);
        assert_eq!(catalog.stats_unique().total(), 1);
    }

    #[test]
    fn explicit_uuid_column_wins_over_derivation() {
        let bundle = parse_sheet(
            "version,cdu,uuid\n\
             1.0,PORTA,cdu:aaaaaaaaaaaaaaaa\n",
        )
        .unwrap();
        assert_eq!(
            bundle.versions[0].cdus[0].uuid.as_deref(),
            Some("cdu:aaaaaaaaaaaaaaaa")
        );
    }

    #[test]
    fn missing_required_column_fails_the_whole_import() {
        let err = parse_sheet("version,status\n1.0,in-development\n").unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn("cdu")));

        let err = parse_sheet("").unwrap_err();
        assert!(matches!(err, ImportError::MissingHeader));
    }

    #[test]
    fn quoted_fields_survive_commas_and_quotes() {
        let fields = split_row("1.0,\"login, portal\",\"say \"\"hi\"\"\"");
        assert_eq!(fields, vec!["1.0", "login, portal", "say \"hi\""]);
    }

    #[test]
    fn export_then_import_keeps_the_shape() {
        let mut catalog = Catalog::new();
        let vid = catalog.create_version("1.0", "2024-05-02", "21:30", 0);
        catalog.create_cdu(vid, "PORTA", 0);
        catalog.toggle_production(vid, 0);
        catalog.commit_changes();

        let rendered = render_book(&ExportBook::build(catalog.store()));
        assert!(rendered.contains("# summary"));
        assert!(rendered.contains("total (raw),1,0,0,0"));
        assert!(rendered.contains("total (unique),1,0,0,0"));
        assert!(rendered.contains("# detail"));
        assert!(rendered.contains("1.0,PORTA,cdu:"));

        // The detail section alone reads back as an import sheet.
        let detail = rendered.split("# detail\n").nth(1).unwrap();
        let bundle = parse_sheet(detail).unwrap();
        assert_eq!(bundle.versions.len(), 1);
        assert_eq!(bundle.versions[0].cdus[0].name, "PORTA");
    }
}
