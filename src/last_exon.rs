//! Unique 3'-terminal exons of a gene annotation.

use std::collections::BTreeSet;
use std::fmt;
use std::io::BufRead;

use crate::annotation::gene::{gene_records, GeneFormat};
use crate::error::{Error, Result};
use crate::types::Strand;

/// `chrom, start, end, id, length, strand`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastExon {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    /// 1-based, in output order.
    pub id: usize,
    pub strand: Strand,
}

impl LastExon {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for LastExon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.start,
            self.end,
            self.id,
            self.len(),
            self.strand
        )
    }
}

/// Collect the last exon of every gene, deduplicated and sorted by
/// `(chrom, start, end, strand)`.
///
/// On `+` the last exon is the genomically highest one; on `-` and `.` it is
/// the lowest.
pub fn last_exons<R: BufRead>(reader: R, format: GeneFormat) -> Result<Vec<LastExon>> {
    let mut seen = BTreeSet::new();

    for entry in gene_records(reader, format) {
        let entry = entry?;
        let g = &entry.record;
        let exons = g
            .exons()
            .map_err(|e| Error::malformed(entry.line_no, e.to_string()))?;

        let last = if g.strand() == Strand::Plus {
            exons.iter().max_by_key(|e| e.start())
        } else {
            exons.iter().min_by_key(|e| e.start())
        };
        if let Some(exon) = last {
            seen.insert((g.chrom().to_string(), exon.start(), exon.end(), g.strand()));
        }
    }

    log::debug!("{} unique last exons", seen.len());

    Ok(seen
        .into_iter()
        .enumerate()
        .map(|(i, (chrom, start, end, strand))| LastExon {
            chrom,
            start,
            end,
            id: i + 1,
            strand,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn picks_strand_aware_last_exon() {
        let data = "\
chr1\t100\t420\tuc1\t0\t+\t100\t100\t0,0,0\t3\t100,10,120\t0,110,200
chr1\t100\t420\tuc2\t0\t-\t100\t100\t0,0,0\t3\t100,10,120\t0,110,200
";
        let exons = last_exons(Cursor::new(data), GeneFormat::Bed).unwrap();
        let rows: Vec<String> = exons.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            rows,
            vec!["chr1\t100\t200\t1\t100\t-", "chr1\t300\t420\t2\t120\t+"]
        );
    }

    #[test]
    fn shared_last_exons_are_listed_once() {
        let data = "\
chr2\t50\t300\ta\t0\t+\t50\t50\t0,0,0\t2\t10,50\t0,200
chr2\t80\t300\tb\t0\t+\t80\t80\t0,0,0\t2\t10,50\t0,170
chr1\t10\t20\tc\t0\t+
";
        let exons = last_exons(Cursor::new(data), GeneFormat::Bed).unwrap();
        assert_eq!(exons.len(), 2);
        assert_eq!((exons[0].chrom.as_str(), exons[0].start, exons[0].id), ("chr1", 10, 1));
        assert_eq!((exons[1].start, exons[1].end, exons[1].id), (250, 300, 2));
    }

    #[test]
    fn same_span_on_both_strands_stays_distinct() {
        let data = "chr1\t10\t20\tc\t0\t+\nchr1\t10\t20\td\t0\t-\n";
        let exons = last_exons(Cursor::new(data), GeneFormat::Bed).unwrap();
        assert_eq!(exons.len(), 2);
        assert_eq!(exons[0].strand, Strand::Plus);
        assert_eq!(exons[1].strand, Strand::Minus);
    }

    #[test]
    fn malformed_gene_aborts() {
        assert!(matches!(
            last_exons(Cursor::new("chr1\t10\n"), GeneFormat::Bed),
            Err(crate::error::Error::MalformedRecord { line_no: 1, .. })
        ));
    }
}
