use std::borrow::Cow;
use std::io::BufRead;
use std::str::FromStr;

use crate::annotation::io::{parse_u64, split_list, BedRecord, TabReader, TabRow};
use crate::bed12::Bed12Record;
use crate::error::{Error, Result};
use crate::types::{Interval, Strand};

/// Supported gene annotation layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeneFormat {
    /// BED6 (single exon) or BED12.
    #[default]
    Bed,
    /// UCSC genePred: name chrom strand txStart txEnd cdsStart cdsEnd exonCount exonStarts exonEnds
    GenePred,
    /// genePred without the CDS columns.
    NcGene,
}

impl FromStr for GeneFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bed" => Ok(GeneFormat::Bed),
            "genepred" => Ok(GeneFormat::GenePred),
            "ncgene" => Ok(GeneFormat::NcGene),
            _ => Err(format!("'{}' is not a valid gene format", s)),
        }
    }
}

/// Field access shared by every gene annotation layout.
pub trait GeneRecord {
    fn name(&self) -> &str;
    fn chrom(&self) -> &str;
    fn strand(&self) -> Strand;
    fn tx_start(&self) -> u64;
    fn tx_end(&self) -> u64;
    fn cds_start(&self) -> u64;
    fn cds_end(&self) -> u64;
    /// Absolute exon starts, in file order.
    fn exon_starts(&self) -> &[u64];
    /// Absolute exon ends, parallel to `exon_starts`.
    fn exon_ends(&self) -> &[u64];
    fn score(&self) -> Cow<'_, str>;

    fn exons(&self) -> Result<Vec<Interval>> {
        self.exon_starts()
            .iter()
            .zip(self.exon_ends())
            .map(|(&s, &e)| Interval::new(s, e))
            .collect()
    }

    /// Transcription start site (0-based position of the first transcribed base).
    fn tss(&self) -> u64 {
        if self.strand().is_reverse() {
            self.tx_end().saturating_sub(1)
        } else {
            self.tx_start()
        }
    }

    fn as_bed12(&self) -> Result<Bed12Record> {
        Bed12Record::with_thick(
            self.chrom(),
            &self.exons()?,
            self.strand(),
            self.name(),
            &self.score(),
            (self.cds_start(), self.cds_end()),
        )
    }
}

/// A BED6/BED12 gene. BED6 lines describe a single non-coding exon spanning
/// the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedGeneRecord {
    bed: BedRecord,
    cds: (u64, u64),
    exon_starts: Vec<u64>,
    exon_ends: Vec<u64>,
}

impl BedGeneRecord {
    pub fn from_bed(bed: BedRecord) -> Result<Self> {
        if bed.n_fields() <= 6 {
            return Ok(Self {
                cds: (bed.start, bed.start),
                exon_starts: vec![bed.start],
                exon_ends: vec![bed.end],
                bed,
            });
        }
        if bed.n_fields() < 12 {
            return Err(Error::malformed(
                bed.line_no,
                format!("BED with blocks needs 12 fields, found {}", bed.n_fields()),
            ));
        }

        let line_no = bed.line_no;
        let thick_start = parse_u64(line_no, &bed.extra[0], "thickStart")?;
        let thick_end = parse_u64(line_no, &bed.extra[1], "thickEnd")?;
        let count = parse_u64(line_no, &bed.extra[3], "blockCount")? as usize;
        let sizes = split_list(line_no, &bed.extra[4], "blockSizes")?;
        let offsets = split_list(line_no, &bed.extra[5], "blockStarts")?;
        check_count(line_no, count, sizes.len(), offsets.len())?;

        let overflow = || Error::malformed(line_no, "block coordinates overflow");
        let exon_starts = offsets
            .iter()
            .map(|&o| bed.start.checked_add(o).ok_or_else(overflow))
            .collect::<Result<Vec<u64>>>()?;
        let exon_ends = exon_starts
            .iter()
            .zip(&sizes)
            .map(|(&s, &l)| s.checked_add(l).ok_or_else(overflow))
            .collect::<Result<Vec<u64>>>()?;

        Ok(Self {
            cds: (thick_start, thick_end),
            exon_starts,
            exon_ends,
            bed,
        })
    }
}

impl GeneRecord for BedGeneRecord {
    fn name(&self) -> &str {
        &self.bed.name
    }
    fn chrom(&self) -> &str {
        &self.bed.chrom
    }
    fn strand(&self) -> Strand {
        self.bed.strand
    }
    fn tx_start(&self) -> u64 {
        self.bed.start
    }
    fn tx_end(&self) -> u64 {
        self.bed.end
    }
    fn cds_start(&self) -> u64 {
        self.cds.0
    }
    fn cds_end(&self) -> u64 {
        self.cds.1
    }
    fn exon_starts(&self) -> &[u64] {
        &self.exon_starts
    }
    fn exon_ends(&self) -> &[u64] {
        &self.exon_ends
    }
    fn score(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.bed.score)
    }
}

/// A genePred (or non-coding genePred) gene.
///
/// The layout carries no score column, so the record's position in its file
/// (`seq_no`, 1-based) stands in for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenePredRecord {
    pub seq_no: usize,
    pub name: String,
    pub chrom: String,
    pub strand: Strand,
    pub tx_start: u64,
    pub tx_end: u64,
    pub cds_start: u64,
    pub cds_end: u64,
    exon_starts: Vec<u64>,
    exon_ends: Vec<u64>,
}

impl GenePredRecord {
    /// Parse a 10-column genePred row.
    pub fn from_row(row: &TabRow, seq_no: usize) -> Result<Self> {
        row.require_fields(10, "genePred record")?;
        Self::parse(row, seq_no, Some((5, 6)), 7)
    }

    /// Parse an 8-column non-coding row; the CDS collapses onto `txStart`.
    pub fn from_noncoding_row(row: &TabRow, seq_no: usize) -> Result<Self> {
        row.require_fields(8, "ncgene record")?;
        Self::parse(row, seq_no, None, 5)
    }

    fn parse(
        row: &TabRow,
        seq_no: usize,
        cds_cols: Option<(usize, usize)>,
        count_col: usize,
    ) -> Result<Self> {
        let tx_start = row.u64_at(3, "txStart")?;
        let tx_end = row.u64_at(4, "txEnd")?;
        let (cds_start, cds_end) = match cds_cols {
            Some((s, e)) => (row.u64_at(s, "cdsStart")?, row.u64_at(e, "cdsEnd")?),
            None => (tx_start, tx_start),
        };
        let count = row.u64_at(count_col, "exonCount")? as usize;
        let exon_starts = split_list(row.line_no, &row.fields[count_col + 1], "exonStarts")?;
        let exon_ends = split_list(row.line_no, &row.fields[count_col + 2], "exonEnds")?;
        check_count(row.line_no, count, exon_starts.len(), exon_ends.len())?;

        Ok(Self {
            seq_no,
            name: row.fields[0].clone(),
            chrom: row.fields[1].clone(),
            strand: row.strand_at(2)?,
            tx_start,
            tx_end,
            cds_start,
            cds_end,
            exon_starts,
            exon_ends,
        })
    }
}

impl GeneRecord for GenePredRecord {
    fn name(&self) -> &str {
        &self.name
    }
    fn chrom(&self) -> &str {
        &self.chrom
    }
    fn strand(&self) -> Strand {
        self.strand
    }
    fn tx_start(&self) -> u64 {
        self.tx_start
    }
    fn tx_end(&self) -> u64 {
        self.tx_end
    }
    fn cds_start(&self) -> u64 {
        self.cds_start
    }
    fn cds_end(&self) -> u64 {
        self.cds_end
    }
    fn exon_starts(&self) -> &[u64] {
        &self.exon_starts
    }
    fn exon_ends(&self) -> &[u64] {
        &self.exon_ends
    }
    fn score(&self) -> Cow<'_, str> {
        Cow::Owned(self.seq_no.to_string())
    }
}

fn check_count(line_no: usize, count: usize, starts: usize, ends: usize) -> Result<()> {
    if count != starts || count != ends {
        return Err(Error::malformed(
            line_no,
            format!("exon count {count} does not match {starts} starts / {ends} ends"),
        ));
    }
    Ok(())
}

/// A parsed gene plus the line it came from.
pub struct GeneEntry {
    pub line_no: usize,
    pub record: Box<dyn GeneRecord + Send>,
}

/// Iterate gene records of the given layout.
///
/// Records are numbered 1, 2, ... in file order; that number is handed to
/// layouts that derive their score from it.
pub fn gene_records<R: BufRead>(
    reader: R,
    format: GeneFormat,
) -> impl Iterator<Item = Result<GeneEntry>> {
    TabReader::new(reader)
        .rows()
        .enumerate()
        .map(move |(i, row)| {
            let row = row?;
            let seq_no = i + 1;
            let line_no = row.line_no;
            let record: Box<dyn GeneRecord + Send> = match format {
                GeneFormat::Bed => Box::new(BedGeneRecord::from_bed(BedRecord::from_row(row)?)?),
                GeneFormat::GenePred => Box::new(GenePredRecord::from_row(&row, seq_no)?),
                GeneFormat::NcGene => Box::new(GenePredRecord::from_noncoding_row(&row, seq_no)?),
            };
            Ok(GeneEntry { line_no, record })
        })
}
