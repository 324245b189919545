//! Flat CSV tables shared by the collectors and the report.
//!
//! Tables are comma separated, UTF-8, with a header row even when empty.
//! Writes go to a temporary file next to the target and are renamed over it,
//! so a reader never observes a half-written table.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use csv::{ReaderBuilder, WriterBuilder};
use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use tempfile::{Builder, NamedTempFile};

use crate::error::{CollectError, Result};

/// A record type stored as one table row.
///
/// `COLUMNS` must list the serialized field names in declaration order; it is
/// what gets written as the header.
pub trait TableRow: Serialize + DeserializeOwned {
    const COLUMNS: &'static [&'static str];
}

/// Temporary file with the mode a plain create gets (0666 minus the umask).
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

pub fn write_table<T: TableRow>(path: &Path, rows: &[T]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| CollectError::table(path, e))?;

    let mut tmp = temp_file_in(dir).map_err(|e| CollectError::table(path, e))?;
    {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut tmp);

        writer
            .write_record(T::COLUMNS)
            .map_err(|e| CollectError::table(path, e))?;
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| CollectError::table(path, e))?;
        }
        writer.flush().map_err(|e| CollectError::table(path, e))?;
    }

    tmp.flush().map_err(|e| CollectError::table(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| CollectError::table(path, e))?;
    tmp.persist(path)
        .map_err(|e| CollectError::table(path, e.error))?;

    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn read_table<T: TableRow>(path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .from_path(path)
        .map_err(|e| CollectError::table(path, e))?;

    reader
        .deserialize::<T>()
        .enumerate()
        .map(|(idx, row)| {
            row.map_err(|e| CollectError::table(path, format!("row {}: {e}", idx + 1)))
        })
        .collect()
}

/// Values of a single column, in file order.
pub fn read_column(path: &Path, column: &str) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .from_path(path)
        .map_err(|e| CollectError::table(path, e))?;

    let position = reader
        .headers()
        .map_err(|e| CollectError::table(path, e))?
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| CollectError::table(path, format!("missing column '{column}'")))?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| CollectError::table(path, e))?;
        if let Some(value) = record.get(position) {
            values.push(value.to_string());
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        apartment::{DetailRecord, ListRecord},
        detail_failure::DetailFailure,
    };

    fn serialized_header<T: TableRow>(row: &T) -> String {
        let mut writer = WriterBuilder::new().from_writer(vec![]);
        writer.serialize(row).unwrap();
        let bytes = writer.into_inner().unwrap();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .to_string()
    }

    #[test]
    fn columns_match_serialized_field_names() {
        let list = ListRecord {
            kapt_code: "A1".into(),
            kapt_name: "n".into(),
            region: "11110".into(),
            bjd_code: None,
            as1: None,
            as2: None,
            as3: None,
            as4: None,
            kapt_usedate: None,
            kaptda_cnt: None,
        };
        assert_eq!(serialized_header(&list), ListRecord::COLUMNS.join(","));

        let detail = DetailRecord::empty("A1");
        assert_eq!(serialized_header(&detail), DetailRecord::COLUMNS.join(","));

        let failure = DetailFailure {
            kapt_code: "A1".into(),
            kind: "api".into(),
            message: "m".into(),
        };
        assert_eq!(serialized_header(&failure), DetailFailure::COLUMNS.join(","));
    }

    #[test]
    fn empty_table_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_table::<DetailFailure>(&path, &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "kaptCode,kind,message\n");
        assert!(read_table::<DetailFailure>(&path).unwrap().is_empty());
    }

    #[test]
    fn write_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.csv");
        fs::write(&path, "stale content that is much longer than the new table\n").unwrap();

        let rows = vec![DetailFailure {
            kapt_code: "A1".into(),
            kind: "network".into(),
            message: "timed out, twice".into(),
        }];
        write_table(&path, &rows).unwrap();

        assert_eq!(read_table::<DetailFailure>(&path).unwrap(), rows);
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn written_table_has_default_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference.csv");
        fs::write(&reference, "kaptCode\n").unwrap();
        let path = dir.path().join("apt_list.csv");

        write_table::<DetailFailure>(&path, &[]).unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), mode(&reference));
    }

    #[test]
    fn read_column_reports_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.csv");
        write_table::<DetailFailure>(&path, &[]).unwrap();

        assert!(read_column(&path, "kaptCode").unwrap().is_empty());
        assert!(matches!(
            read_column(&path, "region"),
            Err(CollectError::Table { .. })
        ));
    }
}
