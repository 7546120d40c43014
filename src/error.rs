use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while loading annotations or mapping queries.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid range: start {start} > end {end}")]
    InvalidRange { start: u64, end: u64 },

    #[error("query [{start}, {end}) is outside transcript '{transcript}' (length {length})")]
    OutOfRangeQuery {
        transcript: String,
        start: u64,
        end: u64,
        length: u64,
    },

    #[error("unknown transcript '{name}' (line {line_no})")]
    UnknownTranscript { name: String, line_no: usize },

    #[error("transcript '{name}' defined twice (line {line_no})")]
    DuplicateTranscript { name: String, line_no: usize },

    #[error("malformed record at line {line_no}: {problem}")]
    MalformedRecord { line_no: usize, problem: String },

    #[error("cannot build a BED12 record without blocks")]
    NoBlocks,

    #[error("I/O error while reading '{path}': {source}")]
    IoPath {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(line_no: usize, problem: impl Into<String>) -> Self {
        Error::MalformedRecord {
            line_no,
            problem: problem.into(),
        }
    }
}
