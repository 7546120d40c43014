use std::io::BufRead;
use std::path::Path;

use crate::annotation::gene::GeneFormat;
use crate::error::Result;
use crate::index::Backmapper;

/// High-level builder for creating a [`Backmapper`] from an annotation file.
///
/// - parses the whole file (optionally gzipped)
/// - configurable annotation layout (BED, genePred, non-coding genePred)
#[derive(Debug, Clone, Default)]
pub struct AnnotationBuilder {
    pub format: GeneFormat,
}

impl AnnotationBuilder {
    /// Defaults to BED input.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: GeneFormat) -> Self {
        self.format = format;
        self
    }

    /// Build index from anything implementing `BufRead`.
    pub fn build_from_reader<R: BufRead>(&self, reader: R) -> Result<Backmapper> {
        Backmapper::from_reader(reader, self.format)
    }

    /// Build index from a file path; `.gz` files are decompressed on the fly.
    pub fn build_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Backmapper> {
        Backmapper::from_path(path, self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn builder_defaults_to_bed() {
        let idx = AnnotationBuilder::new()
            .build_from_reader(Cursor::new("chr1\t0\t50\tt1\t0\t+\n"))
            .unwrap();
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.get("t1").unwrap().length(), 50);
    }

    #[test]
    fn builder_respects_format() {
        let nc = "nc1\tchr3\t-\t50\t90\t2\t50,80,\t60,90,\n";
        let idx = AnnotationBuilder::new()
            .format(GeneFormat::NcGene)
            .build_from_reader(Cursor::new(nc))
            .unwrap();
        let tx = idx.get("nc1").unwrap();
        assert_eq!(tx.chrom, "chr3");
        assert_eq!(tx.length(), 20);
    }

    #[test]
    fn builder_reports_missing_file() {
        let err = AnnotationBuilder::new()
            .build_from_path("/nonexistent/genes.bed")
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::IoPath { .. }));
    }
}
