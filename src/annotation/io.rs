use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::{Error, Result};
use crate::types::Strand;

/// Line prefixes that are never data.
const COMMENT_PREFIXES: [&str; 3] = ["#", "track ", "browser"];

/// Open a text file for buffered reading.
///
/// - If path ends with `.gz`, reads through a gzip decoder.
/// - Otherwise reads as plain text.
pub fn open_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::IoPath {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_gz = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    if is_gz {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// One data line split on tabs, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabRow {
    pub line_no: usize,
    pub fields: Vec<String>,
}

impl TabRow {
    pub fn field(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(|s| s.as_str())
    }

    pub fn require_fields(&self, n: usize, what: &str) -> Result<()> {
        if self.fields.len() < n {
            return Err(Error::malformed(
                self.line_no,
                format!(
                    "{what} needs at least {n} fields, found {}",
                    self.fields.len()
                ),
            ));
        }
        Ok(())
    }

    pub fn u64_at(&self, idx: usize, what: &str) -> Result<u64> {
        let raw = self
            .field(idx)
            .ok_or_else(|| Error::malformed(self.line_no, format!("missing {what}")))?;
        parse_u64(self.line_no, raw, what)
    }

    pub fn strand_at(&self, idx: usize) -> Result<Strand> {
        let raw = self
            .field(idx)
            .ok_or_else(|| Error::malformed(self.line_no, "missing strand"))?;
        raw.parse().map_err(|e: String| Error::malformed(self.line_no, e))
    }
}

/// Streaming reader for tab-separated annotation text.
///
/// ```no_run
/// use tx_backmap::annotation::io::{open_reader, TabReader};
///
/// let rdr = TabReader::new(open_reader("genes.bed").unwrap());
/// for row in rdr.rows() {
///     let row = row.unwrap();
///     println!("{}: {} fields", row.line_no, row.fields.len());
/// }
/// ```
pub struct TabReader<R: BufRead> {
    reader: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> TabReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
        }
    }

    /// Returns an iterator over data rows.
    ///
    /// - Skips blank lines
    /// - Skips lines starting with '#', 'track ' or 'browser'
    pub fn rows(mut self) -> impl Iterator<Item = Result<TabRow>> {
        std::iter::from_fn(move || loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => return Some(Err(Error::Io(e))),
            }

            let line = self.buf.trim_end_matches(&['\n', '\r'][..]);
            if line.trim().is_empty() || COMMENT_PREFIXES.iter().any(|p| line.starts_with(p)) {
                continue;
            }

            return Some(Ok(TabRow {
                line_no: self.line_no,
                fields: line.split('\t').map(|f| f.to_string()).collect(),
            }));
        })
    }
}

/// A BED line with at least the six standard columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedRecord {
    pub line_no: usize,
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub name: String,
    pub score: String,
    pub strand: Strand,
    /// Columns 7 and up, untouched.
    pub extra: Vec<String>,
}

impl BedRecord {
    pub fn from_row(row: TabRow) -> Result<Self> {
        row.require_fields(6, "BED record")?;
        let start = row.u64_at(1, "start")?;
        let end = row.u64_at(2, "end")?;
        if end < start {
            return Err(Error::malformed(
                row.line_no,
                format!("end {end} before start {start}"),
            ));
        }
        let strand = row.strand_at(5)?;

        let line_no = row.line_no;
        let mut fields = row.fields.into_iter();
        let chrom = fields.next().unwrap_or_default();
        let name = fields.nth(2).unwrap_or_default();
        let score = fields.next().unwrap_or_default();
        let extra = fields.skip(1).collect();

        Ok(Self {
            line_no,
            chrom,
            start,
            end,
            name,
            score,
            strand,
            extra,
        })
    }

    /// Number of tab-separated columns on the line.
    pub fn n_fields(&self) -> usize {
        6 + self.extra.len()
    }
}

/// Writes the record back as one tab-separated line, extra columns included.
impl fmt::Display for BedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom, self.start, self.end, self.name, self.score, self.strand
        )?;
        for col in &self.extra {
            write!(f, "\t{col}")?;
        }
        Ok(())
    }
}

/// Iterator over [`BedRecord`]s.
pub fn bed_records<R: BufRead>(reader: R) -> impl Iterator<Item = Result<BedRecord>> {
    TabReader::new(reader)
        .rows()
        .map(|row| row.and_then(BedRecord::from_row))
}

pub(crate) fn parse_u64(line_no: usize, raw: &str, what: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| Error::malformed(line_no, format!("{what} '{raw}' is not a non-negative integer")))
}

/// Split a comma-separated integer list; one trailing comma is tolerated.
pub(crate) fn split_list(line_no: usize, raw: &str, what: &str) -> Result<Vec<u64>> {
    let raw = raw.trim().trim_end_matches(',');
    if raw.is_empty() {
        return Err(Error::malformed(line_no, format!("empty {what} list")));
    }
    raw.split(',').map(|v| parse_u64(line_no, v, what)).collect()
}
