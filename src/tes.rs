//! Windows around transcription end sites.

use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;

use crate::annotation::gene::GeneRecord;
use crate::annotation::io::TabReader;
use crate::error::Result;
use crate::types::Strand;

/// Chromosome name -> length.
pub type ChromSizes = HashMap<String, u64>;

/// Read a two-column `chrom<TAB>size` file.
pub fn read_chrom_sizes<R: BufRead>(reader: R) -> Result<ChromSizes> {
    let mut sizes = ChromSizes::new();
    for row in TabReader::new(reader).rows() {
        let row = row?;
        row.require_fields(2, "chrom sizes line")?;
        let size = row.u64_at(1, "chromosome size")?;
        sizes.insert(row.fields[0].clone(), size);
    }
    Ok(sizes)
}

/// Bases to include on either side of the TES.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TesWindow {
    pub len_up: u64,
    pub len_dn: u64,
}

impl Default for TesWindow {
    fn default() -> Self {
        Self { len_up: 1, len_dn: 0 }
    }
}

/// `chrom, start, end, score, tes, strand`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub score: String,
    pub tes: u64,
    pub strand: Strand,
}

impl fmt::Display for TesRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom, self.start, self.end, self.score, self.tes, self.strand
        )
    }
}

/// Window around the 3' end of `gene`, or `None` if it comes out empty.
///
/// Starts saturate at 0. Ends are clamped to the chromosome length when
/// `sizes` knows the chromosome.
pub fn tes_window(
    gene: &dyn GeneRecord,
    window: TesWindow,
    sizes: Option<&ChromSizes>,
) -> Option<TesRecord> {
    let (tes, upstream, downstream) = if gene.strand().is_reverse() {
        (gene.tx_start(), window.len_dn, window.len_up)
    } else {
        (gene.tx_end(), window.len_up, window.len_dn)
    };

    let start = tes.saturating_sub(upstream);
    let mut end = tes.saturating_add(downstream);
    if let Some(size) = sizes.and_then(|s| s.get(gene.chrom())) {
        end = end.min(*size);
    }

    if start >= end {
        return None;
    }

    Some(TesRecord {
        chrom: gene.chrom().to_string(),
        start,
        end,
        score: gene.score().into_owned(),
        tes,
        strand: gene.strand(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::gene::{gene_records, GeneFormat};
    use std::io::Cursor;

    fn genes(data: &str) -> Vec<Box<dyn GeneRecord + Send>> {
        gene_records(Cursor::new(data.to_string()), GeneFormat::Bed)
            .map(|g| g.unwrap().record)
            .collect()
    }

    #[test]
    fn plus_strand_window_sits_on_tx_end() {
        let g = genes("chr1\t100\t420\tuc1\t9\t+\n");
        let rec = tes_window(g[0].as_ref(), TesWindow { len_up: 10, len_dn: 5 }, None).unwrap();
        assert_eq!((rec.start, rec.end, rec.tes), (410, 425, 420));
        assert_eq!(rec.to_string(), "chr1\t410\t425\t9\t420\t+");
    }

    #[test]
    fn minus_strand_window_sits_on_tx_start() {
        let g = genes("chr1\t100\t420\tuc1\t0\t-\n");
        let rec = tes_window(g[0].as_ref(), TesWindow { len_up: 10, len_dn: 5 }, None).unwrap();
        assert_eq!((rec.start, rec.end, rec.tes), (95, 110, 100));
    }

    #[test]
    fn default_window_is_last_base() {
        let g = genes("chr1\t100\t420\tuc1\t0\t+\nchr1\t100\t420\tuc2\t0\t-\n");
        let plus = tes_window(g[0].as_ref(), TesWindow::default(), None).unwrap();
        assert_eq!((plus.start, plus.end), (419, 420));
        let minus = tes_window(g[1].as_ref(), TesWindow::default(), None).unwrap();
        assert_eq!((minus.start, minus.end), (100, 101));
    }

    #[test]
    fn windows_are_clamped_and_empty_ones_dropped() {
        let sizes = read_chrom_sizes(Cursor::new("chr1\t422\n")).unwrap();
        let g = genes("chr1\t100\t420\tuc1\t0\t+\nchr1\t0\t20\tuc2\t0\t-\n");

        let rec = tes_window(g[0].as_ref(), TesWindow { len_up: 0, len_dn: 10 }, Some(&sizes)).unwrap();
        assert_eq!((rec.start, rec.end), (420, 422));

        let rec = tes_window(g[1].as_ref(), TesWindow { len_up: 5, len_dn: 10 }, None).unwrap();
        assert_eq!((rec.start, rec.end), (0, 5));

        let sizes = read_chrom_sizes(Cursor::new("chr1\t420\n")).unwrap();
        assert!(tes_window(g[0].as_ref(), TesWindow { len_up: 0, len_dn: 10 }, Some(&sizes)).is_none());
    }

    #[test]
    fn window_end_saturates_at_u64_max() {
        let line = format!("chr1\t100\t{}\tuc1\t0\t+\n", u64::MAX - 2);
        let g = genes(&line);
        let rec = tes_window(g[0].as_ref(), TesWindow { len_up: 1, len_dn: 10 }, None).unwrap();
        assert_eq!((rec.start, rec.end), (u64::MAX - 3, u64::MAX));
    }

    #[test]
    fn chrom_sizes_must_be_numeric() {
        assert!(matches!(
            read_chrom_sizes(Cursor::new("chr1\tbig\n")),
            Err(crate::error::Error::MalformedRecord { line_no: 1, .. })
        ));
    }
}
