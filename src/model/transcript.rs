use crate::bed12::Bed12Record;
use crate::error::{Error, Result};
use crate::types::{Block, Interval, Strand};

/// A spliced transcript: its genomic exons plus the transcript-space block
/// list derived from them.
///
/// Blocks are built once in [`TranscriptModel::new`] and cover
/// `[0, length())` contiguously, ordered 5' to 3' along the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptModel {
    pub name: String,
    pub chrom: String,
    pub strand: Strand,
    exons: Vec<Interval>,
    blocks: Vec<Block>,
}

impl TranscriptModel {
    pub fn new(
        name: impl Into<String>,
        chrom: impl Into<String>,
        strand: Strand,
        exons: Vec<Interval>,
    ) -> Self {
        let blocks = build_blocks(&exons, strand);
        Self {
            name: name.into(),
            chrom: chrom.into(),
            strand,
            exons,
            blocks,
        }
    }

    /// Exons in the order they were supplied.
    pub fn exons(&self) -> &[Interval] {
        &self.exons
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Spliced length of the transcript.
    pub fn length(&self) -> u64 {
        self.blocks.last().map(|b| b.end()).unwrap_or(0)
    }

    /// Map the transcript-space interval `[start, end)` onto the genome.
    ///
    /// Returns one genomic interval per exon the query touches, in ascending
    /// genomic order on both strands (minus-strand hits are collected 5' to 3'
    /// and then reversed).
    pub fn backmap(&self, start: u64, end: u64) -> Result<Vec<Interval>> {
        let length = self.length();
        if start >= end || end > length {
            return Err(Error::OutOfRangeQuery {
                transcript: self.name.clone(),
                start,
                end,
                length,
            });
        }

        let k = self
            .find_block_containing(start)
            .ok_or_else(|| Error::OutOfRangeQuery {
                transcript: self.name.clone(),
                start,
                end,
                length,
            })?;

        let mut out = Vec::new();
        for block in &self.blocks[k..] {
            let (bs, be, gs) = (block.start(), block.end(), block.genomic_start());

            let qs = bs.max(start);
            let qe = be.min(end);

            let (hs, he) = if self.strand.is_reverse() {
                (be - qe + gs, be - qs + gs)
            } else {
                (qs - bs + gs, qe - bs + gs)
            };

            if hs != he {
                out.push(Interval::new(hs, he)?);
            }
            if end <= be {
                break;
            }
        }

        if self.strand.is_reverse() {
            out.reverse();
        }
        Ok(out)
    }

    /// Last block (scanning from the 3' end) whose range holds `pos`.
    fn find_block_containing(&self, pos: u64) -> Option<usize> {
        self.blocks.iter().rposition(|b| b.contains_pos(pos))
    }

    /// BED12 record of the full exon structure, non-coding, score 0.
    pub fn as_bed12(&self, name: &str) -> Result<Bed12Record> {
        Bed12Record::encode(&self.chrom, &self.exons, self.strand, name, None, "0")
    }
}

fn build_blocks(exons: &[Interval], strand: Strand) -> Vec<Block> {
    let mut ordered: Vec<Interval> = exons.to_vec();
    ordered.sort_by_key(|e| e.start());
    if strand.is_reverse() {
        ordered.reverse();
    }

    let mut cursor = 0u64;
    ordered
        .into_iter()
        .map(|exon| {
            let span = Interval::with_len(cursor, exon.len());
            cursor += exon.len();
            Block::new(span, exon.start())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(s: u64, e: u64) -> Interval {
        Interval::new(s, e).unwrap()
    }

    fn three_exons() -> Vec<Interval> {
        vec![iv(100, 200), iv(210, 220), iv(300, 420)]
    }

    fn spans(tx: &TranscriptModel) -> Vec<(u64, u64, u64)> {
        tx.blocks()
            .iter()
            .map(|b| (b.span().start(), b.span().end(), b.genomic_start()))
            .collect()
    }

    #[test]
    fn plus_strand_blocks_follow_genomic_order() {
        let tx = TranscriptModel::new("uc1", "chr1", Strand::Plus, three_exons());
        assert_eq!(spans(&tx), vec![(0, 100, 100), (100, 110, 210), (110, 230, 300)]);
        assert_eq!(tx.length(), 230);
    }

    #[test]
    fn minus_strand_blocks_start_at_last_exon() {
        let tx = TranscriptModel::new("uc2", "chr2", Strand::Minus, three_exons());
        assert_eq!(spans(&tx), vec![(0, 120, 300), (120, 130, 210), (130, 230, 100)]);
    }

    #[test]
    fn blocks_ignore_input_exon_order() {
        let shuffled = vec![iv(300, 420), iv(100, 200), iv(210, 220)];
        let a = TranscriptModel::new("uc1", "chr1", Strand::Plus, shuffled);
        let b = TranscriptModel::new("uc1", "chr1", Strand::Plus, three_exons());
        assert_eq!(a.blocks(), b.blocks());
    }

    #[test]
    fn blocks_are_contiguous() {
        let tx = TranscriptModel::new("uc1", "chr1", Strand::Minus, three_exons());
        for w in tx.blocks().windows(2) {
            assert_eq!(w[0].end(), w[1].start());
        }
        assert_eq!(tx.blocks()[0].start(), 0);
    }

    #[test]
    fn backmap_plus_within_one_exon() {
        let tx = TranscriptModel::new("uc1", "chr1", Strand::Plus, three_exons());
        assert_eq!(tx.backmap(190, 210).unwrap(), vec![iv(380, 400)]);
    }

    #[test]
    fn backmap_plus_across_junctions() {
        let tx = TranscriptModel::new("uc1", "chr1", Strand::Plus, three_exons());
        assert_eq!(
            tx.backmap(90, 120).unwrap(),
            vec![iv(190, 200), iv(210, 220), iv(300, 310)]
        );
    }

    #[test]
    fn backmap_minus_strand() {
        let tx = TranscriptModel::new("uc2", "chr2", Strand::Minus, three_exons());
        assert_eq!(tx.backmap(190, 210).unwrap(), vec![iv(120, 140)]);
        assert_eq!(tx.backmap(90, 120).unwrap(), vec![iv(300, 330)]);
    }

    #[test]
    fn backmap_minus_across_junction_is_genomically_ascending() {
        let tx = TranscriptModel::new("uc2", "chr2", Strand::Minus, three_exons());
        // transcript 115..135 covers the last 5 bases of block 0, block 1, 5 bases of block 2
        assert_eq!(
            tx.backmap(115, 135).unwrap(),
            vec![iv(195, 200), iv(210, 220), iv(300, 305)]
        );
    }

    #[test]
    fn backmap_starting_on_block_boundary_uses_next_block() {
        let tx = TranscriptModel::new("uc1", "chr1", Strand::Plus, three_exons());
        assert_eq!(tx.backmap(100, 105).unwrap(), vec![iv(210, 215)]);
        // ending exactly on a boundary stays in the earlier block
        assert_eq!(tx.backmap(95, 100).unwrap(), vec![iv(195, 200)]);
    }

    #[test]
    fn backmap_whole_transcript_returns_all_exons() {
        let tx = TranscriptModel::new("uc1", "chr1", Strand::Plus, three_exons());
        assert_eq!(tx.backmap(0, 230).unwrap(), three_exons());
    }

    #[test]
    fn backmap_rejects_out_of_range() {
        let tx = TranscriptModel::new("uc1", "chr1", Strand::Plus, three_exons());
        assert!(matches!(tx.backmap(200, 231), Err(Error::OutOfRangeQuery { .. })));
        assert!(matches!(tx.backmap(230, 240), Err(Error::OutOfRangeQuery { .. })));
        assert!(matches!(tx.backmap(50, 50), Err(Error::OutOfRangeQuery { .. })));
    }

    #[test]
    fn as_bed12_plus_and_minus() {
        let plus = TranscriptModel::new("uc1", "chr1", Strand::Plus, three_exons());
        assert_eq!(
            plus.as_bed12("uc1").unwrap().to_string(),
            "chr1\t100\t420\tuc1\t0\t+\t100\t100\t0,0,0\t3\t100,10,120\t0,110,200"
        );
        let minus = TranscriptModel::new("uc2", "chr2", Strand::Minus, three_exons());
        assert_eq!(
            minus.as_bed12("uc2").unwrap().to_string(),
            "chr2\t100\t420\tuc2\t0\t-\t100\t100\t0,0,0\t3\t100,10,120\t0,110,200"
        );
    }
}
