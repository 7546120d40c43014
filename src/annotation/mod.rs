pub mod builder;
pub mod gene;
pub mod io;

pub use builder::AnnotationBuilder;
pub use gene::{gene_records, BedGeneRecord, GeneEntry, GeneFormat, GeneRecord, GenePredRecord};
pub use io::{bed_records, open_reader, BedRecord, TabReader, TabRow};
