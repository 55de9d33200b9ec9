//! Row records and the tables that hold them.

use std::collections::HashMap;

use crate::errors::{TableError, TableResult};

/// One output row: field names mapped to string values, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field, replacing its value in place when it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when this record has exactly the given columns, in any order.
    pub fn has_columns(&self, columns: &[String]) -> bool {
        self.fields.len() == columns.len() && columns.iter().all(|c| self.contains(c))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.set(key, value);
        }
        record
    }
}

/// Check that every record has the columns of the first one.
///
/// Returns those columns, in the first record's order.
pub fn columns_of(records: &[Record]) -> Option<TableResult<Vec<String>>> {
    let first = records.first()?;
    let columns: Vec<String> = first.keys().map(str::to_string).collect();

    for (index, record) in records.iter().enumerate().skip(1) {
        if !record.has_columns(&columns) {
            return Some(Err(TableError::HeterogeneousRecord {
                index,
                expected: columns.join(","),
                found: record.keys().collect::<Vec<_>>().join(","),
            }));
        }
    }

    Some(Ok(columns))
}

/// A sequence of records that all share the first record's columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Option<Vec<String>>,
    records: Vec<Record>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, rejecting one whose fields differ from the columns
    /// fixed by the first record.
    pub fn push(&mut self, record: Record) -> TableResult<()> {
        match &self.columns {
            None => self.columns = Some(record.keys().map(str::to_string).collect()),
            Some(columns) if !record.has_columns(columns) => {
                return Err(TableError::HeterogeneousRecord {
                    index: self.records.len(),
                    expected: columns.join(","),
                    found: record.keys().collect::<Vec<_>>().join(","),
                });
            }
            Some(_) => {}
        }
        self.records.push(record);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        self.columns.as_deref().unwrap_or(&[])
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Records keyed by a row identifier, kept in insertion order.
///
/// Used by the CoNLL pipeline, where later passes (entity tagging) look rows
/// up by key and add fields to them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyedTable {
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl KeyedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. A key seen before has its record replaced in place.
    pub fn insert(&mut self, key: impl Into<String>, record: Record) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&idx) => self.records[idx] = record,
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.index.get(key).map(|&idx| &self.records[idx])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        match self.index.get(key) {
            Some(&idx) => self.records.get_mut(idx),
            None => None,
        }
    }

    /// Give `field` the value `default` on every record that lacks it.
    pub fn fill_missing(&mut self, field: &str, default: &str) {
        for record in &mut self.records {
            if !record.contains(field) {
                record.set(field, default);
            }
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
