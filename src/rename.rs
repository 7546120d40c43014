//! Give every BED record a unique name.

use std::io::BufRead;

use crate::annotation::io::{bed_records, BedRecord};
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct RenameOptions {
    /// Names become `<prefix><n>`, `n` counting records from 1.
    pub prefix: String,
    /// Append the previous name as an extra last column.
    pub keep_old_name: bool,
}

/// Rename records read from `reader`; all other columns pass through.
pub fn renamed_records<R: BufRead>(
    reader: R,
    opts: RenameOptions,
) -> impl Iterator<Item = Result<BedRecord>> {
    bed_records(reader).enumerate().map(move |(i, rec)| {
        let mut rec = rec?;
        let old = std::mem::replace(&mut rec.name, format!("{}{}", opts.prefix, i + 1));
        if opts.keep_old_name {
            rec.extra.push(old);
        }
        Ok(rec)
    })
}
