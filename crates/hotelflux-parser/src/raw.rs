use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::errors::ParserError;

/// A CSV export held as untyped text, headers trimmed.
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<StringRecord>,
}

impl RawTable {
    pub fn from_csv(content: &str) -> Result<Self, ParserError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(content.as_bytes());

        let header_record = reader.headers()?.clone();
        if header_record.is_empty() || header_record.iter().all(|h| h.trim().is_empty()) {
            return Err(ParserError::MissingHeader);
        }
        let headers: Vec<String> = header_record.iter().map(|h| h.trim().to_string()).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            rows.push(record);
        }

        Ok(Self::new(headers, rows))
    }

    pub fn new(headers: Vec<String>, rows: Vec<StringRecord>) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (position, header) in headers.iter().enumerate() {
            index.entry(header.clone()).or_insert(position);
        }
        Self {
            headers,
            index,
            rows,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = RawRecord<'_>> {
        self.rows.iter().map(move |values| RawRecord {
            table: self,
            values,
        })
    }
}

/// One row of a [`RawTable`], addressed by source header.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    table: &'a RawTable,
    values: &'a StringRecord,
}

impl<'a> RawRecord<'a> {
    /// Cell under `column`. Missing columns and blank cells both read as `None`.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let position = *self.table.index.get(column)?;
        self.cell(position)
    }

    pub fn cell(&self, position: usize) -> Option<&'a str> {
        self.values
            .get(position)
            .filter(|value| !value.trim().is_empty())
    }

    /// Non-blank cells keyed by header, in header order.
    pub fn fields(&self) -> Vec<(String, String)> {
        self.table
            .headers
            .iter()
            .enumerate()
            .filter_map(|(position, header)| {
                self.cell(position)
                    .map(|value| (header.clone(), value.to_string()))
            })
            .collect()
    }
}
