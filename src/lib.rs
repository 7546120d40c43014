//! tx_backmap
//!
//! Maps intervals given in spliced-transcript (mRNA) coordinates back onto the
//! genome. Each transcript is indexed as a list of blocks, one per exon, that
//! tile transcript space; a query is split at exon boundaries and every piece
//! is translated to its genomic span, honouring strand. Results are written as
//! BED12 records (0-based, half-open).

pub mod annotation;
pub mod bed12;
pub mod error;
pub mod index;
pub mod last_exon;
pub mod model;
pub mod rename;
pub mod tes;
pub mod types;

pub use index::{Backmapper, MapStats};

pub use annotation::{AnnotationBuilder, GeneFormat, GeneRecord};

pub use bed12::Bed12Record;
pub use error::{Error, Result};

pub use model::TranscriptModel;
pub use types::{Block, Interval, Strand};
