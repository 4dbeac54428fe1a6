//! An untyped, column-named table of raw cells.
//!
//! Shards are CSV, so every cell arrives as a string; dtypes are declared
//! by the sidecar or recovered by inference. Keeping cells raw lets the
//! summarizer observe missing columns and dtype mismatches instead of
//! failing at deserialization.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::io::Read;

/// Empty cells are missing values.
pub const MISSING: &str = "";

#[derive(Debug, Default, Clone)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterates the cells of the named column, if it exists.
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    /// Reads one CSV shard into the frame, merging columns by header name.
    ///
    /// Columns new to the frame are appended and backfilled with missing
    /// values for existing rows; columns the shard lacks stay missing for
    /// its rows. Returns the number of rows added.
    pub fn append_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut rdr = csv::Reader::from_reader(reader);

        let mut mapping = Vec::new();
        for header in rdr.headers()?.iter().map(str::to_string).collect::<Vec<_>>() {
            let idx = match self.column_index(&header) {
                Some(idx) => idx,
                None => {
                    self.columns.push(header);
                    for row in &mut self.rows {
                        row.push(MISSING.to_string());
                    }
                    self.columns.len() - 1
                }
            };
            mapping.push(idx);
        }

        let width = self.columns.len();
        let mut added = 0;
        for record in rdr.records() {
            let record = record?;
            let mut row = vec![MISSING.to_string(); width];
            for (i, cell) in record.iter().enumerate() {
                if let Some(&col) = mapping.get(i) {
                    row[col] = cell.to_string();
                }
            }
            self.rows.push(row);
            added += 1;
        }

        Ok(added)
    }

    /// Row indices in canonical order: parsed `timestamp` ascending
    /// (unparseable first), whole-row lexicographic tie-break. Shard
    /// listing order never leaks into anything derived from this.
    pub fn canonical_order(&self) -> Vec<usize> {
        let ts_idx = self.column_index("timestamp");
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| {
            let key = |i: usize| ts_idx.and_then(|idx| parse_instant(&self.rows[i][idx]));
            key(a)
                .cmp(&key(b))
                .then_with(|| self.rows[a].cmp(&self.rows[b]))
        });
        order
    }
}

/// Parses an RFC 3339 cell into a UTC instant.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_csv_merges_columns_by_name() {
        let mut frame = Frame::new();
        frame
            .append_csv("a,b\n1,2\n".as_bytes())
            .unwrap();
        frame
            .append_csv("b,c\n3,4\n".as_bytes())
            .unwrap();

        assert_eq!(frame.columns(), &["a", "b", "c"]);
        assert_eq!(frame.rows()[0], vec!["1", "2", ""]);
        assert_eq!(frame.rows()[1], vec!["", "3", "4"]);
    }

    #[test]
    fn test_canonical_order_sorts_by_timestamp() {
        let mut frame = Frame::new();
        frame
            .append_csv(
                "timestamp,v\n\
                 2025-05-03T10:00:00+00:00,late\n\
                 2025-05-03T08:00:00+00:00,early\n\
                 2025-05-03T09:00:00+00:00,middle\n"
                    .as_bytes(),
            )
            .unwrap();

        let order = frame.canonical_order();
        let values: Vec<&str> = order.iter().map(|&i| frame.rows()[i][1].as_str()).collect();
        assert_eq!(values, vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_canonical_order_is_shard_order_independent() {
        let shard_a = "timestamp,v\n2025-05-03T08:00:00+00:00,first\n";
        let shard_b = "timestamp,v\n2025-05-03T09:00:00+00:00,second\n";

        let mut ab = Frame::new();
        ab.append_csv(shard_a.as_bytes()).unwrap();
        ab.append_csv(shard_b.as_bytes()).unwrap();

        let mut ba = Frame::new();
        ba.append_csv(shard_b.as_bytes()).unwrap();
        ba.append_csv(shard_a.as_bytes()).unwrap();

        let first = |f: &Frame| {
            let order = f.canonical_order();
            f.rows()[order[0]][1].clone()
        };
        assert_eq!(first(&ab), first(&ba));
    }

    #[test]
    fn test_parse_instant_handles_offsets() {
        let utc = parse_instant("2025-05-03T08:00:00+00:00").unwrap();
        let local = parse_instant("2025-05-03T15:00:00+07:00").unwrap();
        assert_eq!(utc, local);
        assert!(parse_instant("not a time").is_none());
    }
}
