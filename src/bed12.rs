//! BED12 records: a chromosome feature expressed as blocks within one span.

use std::fmt;
use std::io::BufRead;

use crate::annotation::io::{parse_u64, split_list, TabReader};
use crate::error::{Error, Result};
use crate::types::{Interval, Strand};

const ITEM_RGB: &str = "0,0,0";

/// One 12-column BED line.
///
/// `block_starts` are relative to `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bed12Record {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub name: String,
    pub score: String,
    pub strand: Strand,
    pub thick_start: u64,
    pub thick_end: u64,
    pub item_rgb: String,
    pub block_sizes: Vec<u64>,
    pub block_starts: Vec<u64>,
}

impl Bed12Record {
    /// Build a record from genomic intervals.
    ///
    /// Intervals are sorted by `(start, end)` first. When `cds` is `None` or
    /// either bound is 0, the thick region collapses to the record start so
    /// the feature renders as non-coding.
    pub fn encode(
        chrom: &str,
        intervals: &[Interval],
        strand: Strand,
        name: &str,
        cds: Option<(u64, u64)>,
        score: &str,
    ) -> Result<Self> {
        let mut rec = Self::with_thick(chrom, intervals, strand, name, score, (0, 0))?;
        let (thick_start, thick_end) = match cds {
            Some((s, e)) if s != 0 && e != 0 => (s, e),
            _ => (rec.start, rec.start),
        };
        rec.thick_start = thick_start;
        rec.thick_end = thick_end;
        Ok(rec)
    }

    /// Like [`Bed12Record::encode`] but keeps the thick bounds exactly as given.
    pub fn with_thick(
        chrom: &str,
        intervals: &[Interval],
        strand: Strand,
        name: &str,
        score: &str,
        (thick_start, thick_end): (u64, u64),
    ) -> Result<Self> {
        let mut ivals = intervals.to_vec();
        ivals.sort();

        let (first, last) = match (ivals.first(), ivals.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return Err(Error::NoBlocks),
        };
        let start = first.start();

        Ok(Self {
            chrom: chrom.to_string(),
            start,
            end: last.end(),
            name: name.to_string(),
            score: score.to_string(),
            strand,
            thick_start,
            thick_end,
            item_rgb: ITEM_RGB.to_string(),
            block_sizes: ivals.iter().map(|iv| iv.len()).collect(),
            block_starts: ivals.iter().map(|iv| iv.start() - start).collect(),
        })
    }

    /// Build a record from raw comma-separated block lists.
    ///
    /// The first block must start at 0, both lists must have the same length
    /// and blocks may not overlap.
    pub fn from_blocks(
        block_sizes: &str,
        block_starts: &str,
        start: u64,
        strand: Strand,
        chrom: &str,
        name: &str,
    ) -> Result<Self> {
        Self::from_blocks_at(0, block_sizes, block_starts, start, strand, chrom, name)
    }

    fn from_blocks_at(
        line_no: usize,
        block_sizes: &str,
        block_starts: &str,
        start: u64,
        strand: Strand,
        chrom: &str,
        name: &str,
    ) -> Result<Self> {
        let sizes = split_list(line_no, block_sizes, "blockSizes")?;
        let starts = split_list(line_no, block_starts, "blockStarts")?;

        if starts.first() != Some(&0) {
            return Err(Error::malformed(line_no, "first block start must be 0"));
        }
        if sizes.len() != starts.len() {
            return Err(Error::malformed(
                line_no,
                format!(
                    "{} block sizes but {} block starts",
                    sizes.len(),
                    starts.len()
                ),
            ));
        }
        let overflow = || Error::malformed(line_no, "block coordinates overflow");
        for i in 1..starts.len() {
            let prev_end = starts[i - 1].checked_add(sizes[i - 1]).ok_or_else(overflow)?;
            if prev_end > starts[i] {
                return Err(Error::malformed(
                    line_no,
                    format!("block {} starts inside block {}", i + 1, i),
                ));
            }
        }

        let n = starts.len();
        let end = start
            .checked_add(starts[n - 1])
            .and_then(|e| e.checked_add(sizes[n - 1]))
            .ok_or_else(overflow)?;

        Ok(Self {
            chrom: chrom.to_string(),
            start,
            end,
            name: name.to_string(),
            score: "0".to_string(),
            strand,
            thick_start: start,
            thick_end: start,
            item_rgb: ITEM_RGB.to_string(),
            block_sizes: sizes,
            block_starts: starts,
        })
    }

    pub fn block_count(&self) -> usize {
        self.block_sizes.len()
    }

    /// Genomic blocks, ascending.
    pub fn blocks(&self) -> Vec<Interval> {
        self.block_starts
            .iter()
            .zip(&self.block_sizes)
            .map(|(&off, &len)| Interval::with_len(self.start + off, len))
            .collect()
    }
}

fn join(values: &[u64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for Bed12Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.start,
            self.end,
            self.name,
            self.score,
            self.strand,
            self.thick_start,
            self.thick_end,
            self.item_rgb,
            self.block_count(),
            join(&self.block_sizes),
            join(&self.block_starts),
        )
    }
}

/// Column layout for [`BlockListReader`]. Indices are 0-based.
#[derive(Debug, Clone)]
pub struct BlockColumns {
    pub sizes: usize,
    pub starts: usize,
    pub start: usize,
}

impl Default for BlockColumns {
    fn default() -> Self {
        Self {
            sizes: 0,
            starts: 1,
            start: 2,
        }
    }
}

/// Reads lines of `blockSizes, blockStarts, start` and yields BED12 records
/// named `<prefix><line number>`.
pub struct BlockListReader<R: BufRead> {
    rows: TabReader<R>,
    pub columns: BlockColumns,
    pub strand: Strand,
    pub chrom: String,
    pub name_prefix: String,
}

impl<R: BufRead> BlockListReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            rows: TabReader::new(reader),
            columns: BlockColumns::default(),
            strand: Strand::Plus,
            chrom: "chr1".to_string(),
            name_prefix: String::new(),
        }
    }

    pub fn records(self) -> impl Iterator<Item = Result<Bed12Record>> {
        let Self {
            rows,
            columns,
            strand,
            chrom,
            name_prefix,
        } = self;
        let needed = columns.sizes.max(columns.starts).max(columns.start) + 1;

        rows.rows().map(move |row| {
            let row = row?;
            if row.fields.len() < needed {
                return Err(Error::malformed(
                    row.line_no,
                    format!("expected at least {needed} fields, found {}", row.fields.len()),
                ));
            }
            let start = parse_u64(row.line_no, &row.fields[columns.start], "start")?;
            Bed12Record::from_blocks_at(
                row.line_no,
                &row.fields[columns.sizes],
                &row.fields[columns.starts],
                start,
                strand,
                &chrom,
                &format!("{}{}", name_prefix, row.line_no),
            )
        })
    }
}
