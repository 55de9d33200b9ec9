//! Delimited-file output and input.
//!
//! The header comes from the first record. Every other record must have
//! the same fields, otherwise nothing is written. Files are written to a
//! temporary sibling and renamed into place, so a failed write never leaves
//! a partial table behind.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::{TableError, TableResult};
use crate::record::{columns_of, Record};

/// Write `records` to `path` with the given field delimiter.
///
/// Fails with [`TableError::EmptyTable`] when `records` is empty, since no
/// header can be derived. Callers check for emptiness first.
pub fn write_records(path: &Path, records: &[Record], delimiter: u8) -> TableResult<()> {
    let path_label = path.display().to_string();
    let columns = checked_columns(records, &path_label)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_error = |source| TableError::Io {
        path: path_label.clone(),
        source,
    };

    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    encode(&mut file, &columns, records, delimiter).map_err(|source| TableError::Csv {
        path: path_label.clone(),
        source,
    })?;
    set_output_permissions(&file, path).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;

    tracing::debug!(path = %path_label, rows = records.len(), "wrote table");
    Ok(())
}

/// Write `records` to any writer. Same rules as [`write_records`].
pub fn write_records_to<W: Write>(out: W, records: &[Record], delimiter: u8) -> TableResult<()> {
    let label = "<writer>";
    let columns = checked_columns(records, label)?;
    encode(out, &columns, records, delimiter).map_err(|source| TableError::Csv {
        path: label.to_string(),
        source,
    })
}

/// Read a table written by [`write_records`] back into records.
pub fn read_records(path: &Path, delimiter: u8) -> TableResult<Vec<Record>> {
    let csv_error = |source| TableError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)
        .map_err(csv_error)?;
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_error)?;
        records.push(headers.iter().zip(row.iter()).collect());
    }
    Ok(records)
}

/// Temporary files are created owner-only. Outputs get the usual
/// `rw-r--r--`, or keep the mode of the file they replace.
#[cfg(unix)]
fn set_output_permissions(file: &NamedTempFile, target: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = match std::fs::metadata(target) {
        Ok(existing) => existing.permissions(),
        Err(_) => std::fs::Permissions::from_mode(0o644),
    };
    file.as_file().set_permissions(permissions)
}

#[cfg(not(unix))]
fn set_output_permissions(_file: &NamedTempFile, _target: &Path) -> std::io::Result<()> {
    Ok(())
}

fn checked_columns(records: &[Record], path: &str) -> TableResult<Vec<String>> {
    match columns_of(records) {
        None => Err(TableError::EmptyTable {
            path: path.to_string(),
        }),
        Some(columns) => columns,
    }
}

fn encode<W: Write>(
    out: W,
    columns: &[String],
    records: &[Record],
    delimiter: u8,
) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    writer.write_record(columns)?;
    for record in records {
        writer.write_record(
            columns
                .iter()
                .map(|column| record.get(column).unwrap_or_default()),
        )?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record::new()
                .with("id", "e1")
                .with("type", "ORG")
                .with("surface_string", "Smith, Jones & Co"),
            Record::new()
                .with("id", "e2")
                .with("type", "PER")
                .with("surface_string", "say \"hi\""),
        ]
    }

    fn to_string(records: &[Record], delimiter: u8) -> String {
        let mut out = Vec::new();
        write_records_to(&mut out, records, delimiter).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_quotes_only_when_needed() {
        insta::assert_snapshot!(to_string(&sample(), b','), @r###"
        id,type,surface_string
        e1,ORG,"Smith, Jones & Co"
        e2,PER,"say ""hi"""
        "###);
    }

    #[test]
    fn test_columns_follow_first_record() {
        let records = vec![
            Record::new().with("b", "1").with("a", "2"),
            Record::new().with("a", "3").with("b", "4"),
        ];
        assert_eq!(to_string(&records, b'\t'), "b\ta\n1\t2\n4\t3\n");
    }

    #[test]
    fn test_empty_records_rejected() {
        let err = write_records_to(Vec::new(), &[], b',').unwrap_err();
        assert!(matches!(err, TableError::EmptyTable { .. }));
    }

    #[test]
    fn test_ragged_records_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        let records = vec![
            Record::new().with("id", "1").with("type", "PER"),
            Record::new().with("id", "2"),
        ];

        let err = write_records(&path, &records, b',').unwrap_err();
        assert!(matches!(err, TableError::HeterogeneousRecord { index: 1, .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        for (name, delimiter) in [("table.csv", b','), ("table.conll", b'\t')] {
            let path = dir.path().join(name);
            write_records(&path, &sample(), delimiter).unwrap();
            assert_eq!(read_records(&path, delimiter).unwrap(), sample());
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        write_records(&path, &sample(), b',').unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_replaced_file_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        std::fs::write(&path, "stale").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_records(&path, &sample(), b',').unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale").unwrap();

        write_records(&path, &sample()[..1], b',').unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("id,type,surface_string\n"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
