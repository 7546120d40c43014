use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::annotation::gene::{gene_records, GeneFormat};
use crate::annotation::io::{bed_records, open_reader, BedRecord};
use crate::bed12::Bed12Record;
use crate::error::{Error, Result};
use crate::model::transcript::TranscriptModel;

/// Counters for one [`Backmapper::map_reader`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapStats {
    pub records: usize,
    pub mapped: usize,
    pub skipped_minus: usize,
}

impl fmt::Display for MapStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} query records, {} mapped, {} minus-strand skipped",
            self.records, self.mapped, self.skipped_minus
        )
    }
}

/// Transcript name -> model. Built once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Backmapper {
    transcripts: HashMap<String, TranscriptModel>,
}

/// Human-readable summary: transcript count, chromosome count and the summed
/// spliced length.
impl fmt::Display for Backmapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chroms: Vec<&str> = self.transcripts.values().map(|t| t.chrom.as_str()).collect();
        chroms.sort_unstable();
        chroms.dedup();
        let total: u64 = self.transcripts.values().map(|t| t.length()).sum();

        write!(
            f,
            "Backmapper: {} transcripts on {} chromosomes, {} bp spliced",
            self.transcripts.len(),
            chroms.len(),
            total
        )
    }
}

impl Backmapper {
    /// Build from already constructed models. Names must be unique.
    pub fn from_models<I>(models: I) -> Result<Self>
    where
        I: IntoIterator<Item = TranscriptModel>,
    {
        let mut transcripts = HashMap::new();
        for (i, tx) in models.into_iter().enumerate() {
            if transcripts.contains_key(&tx.name) {
                return Err(Error::DuplicateTranscript {
                    name: tx.name,
                    line_no: i + 1,
                });
            }
            transcripts.insert(tx.name.clone(), tx);
        }
        Ok(Self { transcripts })
    }

    /// Build the index from gene annotation text.
    ///
    /// # Example
    /// ```
    /// use std::io::Cursor;
    /// use tx_backmap::{Backmapper, GeneFormat};
    ///
    /// let genes = "chr1\t100\t420\tuc1\t0\t+\t100\t100\t0,0,0\t3\t100,10,120\t0,110,200\n";
    /// let mapper = Backmapper::from_reader(Cursor::new(genes), GeneFormat::Bed).unwrap();
    ///
    /// let hits = mapper.get("uc1").unwrap().backmap(90, 120).unwrap();
    /// assert_eq!(hits.len(), 3);
    /// ```
    pub fn from_reader<R: BufRead>(reader: R, format: GeneFormat) -> Result<Self> {
        let mut transcripts: HashMap<String, TranscriptModel> = HashMap::new();

        for entry in gene_records(reader, format) {
            let entry = entry?;
            let g = &entry.record;

            if transcripts.contains_key(g.name()) {
                return Err(Error::DuplicateTranscript {
                    name: g.name().to_string(),
                    line_no: entry.line_no,
                });
            }

            let exons = g.exons().map_err(|e| Error::malformed(entry.line_no, e.to_string()))?;
            if exons.iter().try_fold(0u64, |acc, e| acc.checked_add(e.len())).is_none() {
                return Err(Error::malformed(entry.line_no, "spliced length overflows"));
            }
            let tx = TranscriptModel::new(g.name(), g.chrom(), g.strand(), exons);
            transcripts.insert(tx.name.clone(), tx);
        }

        let mapper = Self { transcripts };
        log::info!("{mapper}");
        Ok(mapper)
    }

    /// Build the index from a (optionally gzipped) annotation file.
    pub fn from_path<P: AsRef<Path>>(path: P, format: GeneFormat) -> Result<Self> {
        Self::from_reader(open_reader(path)?, format)
    }

    pub fn get(&self, name: &str) -> Option<&TranscriptModel> {
        self.transcripts.get(name)
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Map one query record and encode the hit.
    ///
    /// The query's chromosome column names the transcript. Returns `Ok(None)`
    /// for minus-strand queries: positions are only meaningful relative to the
    /// transcript's own sense strand.
    pub fn map_one(&self, query: &BedRecord) -> Result<Option<Bed12Record>> {
        if query.strand.is_reverse() {
            return Ok(None);
        }

        let tx = self.get(&query.chrom).ok_or_else(|| Error::UnknownTranscript {
            name: query.chrom.clone(),
            line_no: query.line_no,
        })?;

        let hits = tx.backmap(query.start, query.end)?;
        Bed12Record::encode(&tx.chrom, &hits, tx.strand, &query.name, None, &query.score).map(Some)
    }

    /// Map every query record from `queries` and write BED12 lines to `sink`.
    ///
    /// The query's chromosome column names the transcript. The first unknown
    /// transcript, out-of-range query or malformed line aborts the run.
    pub fn map_reader<R: BufRead, W: Write>(&self, queries: R, sink: &mut W) -> Result<MapStats> {
        let mut stats = MapStats::default();

        for rec in bed_records(queries) {
            let rec = rec?;
            stats.records += 1;

            match self.map_one(&rec)? {
                Some(bed) => {
                    writeln!(sink, "{bed}")?;
                    stats.mapped += 1;
                }
                None => {
                    log::debug!("line {}: skipping minus-strand query '{}'", rec.line_no, rec.name);
                    stats.skipped_minus += 1;
                }
            }
        }

        sink.flush()?;
        Ok(stats)
    }

    /// [`Backmapper::map_reader`] over a (optionally gzipped) query file.
    pub fn map_path<P: AsRef<Path>, W: Write>(&self, path: P, sink: &mut W) -> Result<MapStats> {
        let stats = self.map_reader(open_reader(path)?, sink)?;
        log::info!("{stats}");
        Ok(stats)
    }
}
