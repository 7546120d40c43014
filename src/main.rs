use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use tx_backmap::annotation::{gene_records, open_reader};
use tx_backmap::bed12::BlockListReader;
use tx_backmap::last_exon::last_exons;
use tx_backmap::rename::{renamed_records, RenameOptions};
use tx_backmap::tes::{read_chrom_sizes, tes_window, TesWindow};
use tx_backmap::{AnnotationBuilder, GeneFormat, Strand};

/// Map transcript coordinates back to the genome and related BED utilities.
#[derive(Parser, Debug)]
#[command(name = "tx-backmap")]
#[command(author, version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Map transcript-space intervals onto the genome as BED12
    Backmap(BackmapArgs),

    /// Convert gene annotations to BED12
    Gene2bed(Gene2bedArgs),

    /// Write windows around transcription end sites
    Tes(TesArgs),

    /// Build BED12 records from blockSizes/blockStarts/start lines
    Blocks2bed(Blocks2bedArgs),

    /// List unique last exons with their lengths
    Lastexon(LastexonArgs),

    /// Give every BED record a unique name
    Rename(RenameArgs),
}

#[derive(Args, Debug)]
struct BackmapArgs {
    /// Query intervals; the chromosome column names the transcript
    #[arg(long, short)]
    queries: PathBuf,

    /// Transcript annotation (.bed/.gz)
    #[arg(long, short)]
    annotation: PathBuf,

    /// Annotation layout
    #[arg(long, short, default_value = "bed")]
    format: GeneFormat,

    /// Output BED12 file (stdout if absent)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct Gene2bedArgs {
    /// Gene annotation file
    input: PathBuf,

    /// Annotation layout
    #[arg(long, short, default_value = "genepred")]
    format: GeneFormat,

    /// Output BED12 file (stdout if absent)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TesArgs {
    /// Gene annotation file
    input: PathBuf,

    /// Annotation layout
    #[arg(long, short, default_value = "bed")]
    format: GeneFormat,

    /// Bases upstream of the TES
    #[arg(long, default_value_t = 1)]
    len_up: u64,

    /// Bases downstream of the TES
    #[arg(long, default_value_t = 0)]
    len_dn: u64,

    /// Chromosome sizes (chrom<TAB>size) used to clamp window ends
    #[arg(long, short)]
    genome: Option<PathBuf>,

    /// Output file (stdout if absent)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct Blocks2bedArgs {
    /// Tab-separated blockSizes, blockStarts, start lines
    input: PathBuf,

    /// Chromosome written to every record
    #[arg(long, default_value = "chr1")]
    chrom: String,

    /// Strand written to every record
    #[arg(long, default_value = "+")]
    strand: Strand,

    /// Prefix for the generated record names
    #[arg(long, default_value = "")]
    name_prefix: String,

    /// Output BED12 file (stdout if absent)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LastexonArgs {
    /// Gene annotation file
    input: PathBuf,

    /// Annotation layout
    #[arg(long, short, default_value = "bed")]
    format: GeneFormat,

    /// Output file (stdout if absent)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenameArgs {
    /// BED file
    input: PathBuf,

    /// Prefix for the new names
    #[arg(long, short)]
    prefix: String,

    /// Append the old name as an extra column
    #[arg(long, short)]
    keep_name: bool,

    /// Output BED file (stdout if absent)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

/// Initializes the logger; `RUST_LOG` still overrides the level.
fn init_log(verbose: u8) {
    env_logger::Builder::new()
        .filter_level(match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("create output {}", p.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_log(cli.verbose);

    match cli.cmd {
        Command::Backmap(args) => {
            let mapper = AnnotationBuilder::new()
                .format(args.format)
                .build_from_path(&args.annotation)
                .with_context(|| format!("loading transcripts from {}", args.annotation.display()))?;

            let mut out = open_output(args.output.as_ref())?;
            let stats = mapper
                .map_path(&args.queries, &mut out)
                .with_context(|| format!("mapping queries from {}", args.queries.display()))?;

            if let Some(p) = &args.output {
                log::info!("{} records written to {}", stats.mapped, p.display());
            }
        }

        Command::Gene2bed(args) => {
            let reader = open_reader(&args.input)
                .with_context(|| format!("reading {}", args.input.display()))?;
            let mut out = open_output(args.output.as_ref())?;

            for entry in gene_records(reader, args.format) {
                let entry = entry.with_context(|| format!("parsing {}", args.input.display()))?;
                let bed = entry
                    .record
                    .as_bed12()
                    .with_context(|| format!("line {}", entry.line_no))?;
                writeln!(out, "{bed}")?;
            }
            out.flush()?;
        }

        Command::Tes(args) => {
            let sizes = match &args.genome {
                Some(p) => Some(
                    read_chrom_sizes(open_reader(p)?)
                        .with_context(|| format!("reading chromosome sizes {}", p.display()))?,
                ),
                None => None,
            };
            let window = TesWindow {
                len_up: args.len_up,
                len_dn: args.len_dn,
            };

            let reader = open_reader(&args.input)
                .with_context(|| format!("reading {}", args.input.display()))?;
            let mut out = open_output(args.output.as_ref())?;

            let mut dropped = 0usize;
            for entry in gene_records(reader, args.format) {
                let entry = entry.with_context(|| format!("parsing {}", args.input.display()))?;
                match tes_window(entry.record.as_ref(), window, sizes.as_ref()) {
                    Some(rec) => writeln!(out, "{rec}")?,
                    None => dropped += 1,
                }
            }
            out.flush()?;
            log::info!("{dropped} empty TES windows dropped");
        }

        Command::Blocks2bed(args) => {
            let mut rdr = BlockListReader::new(
                open_reader(&args.input)
                    .with_context(|| format!("reading {}", args.input.display()))?,
            );
            rdr.chrom = args.chrom;
            rdr.strand = args.strand;
            rdr.name_prefix = args.name_prefix;

            let mut out = open_output(args.output.as_ref())?;
            for rec in rdr.records() {
                let rec = rec.with_context(|| format!("parsing {}", args.input.display()))?;
                writeln!(out, "{rec}")?;
            }
            out.flush()?;
        }

        Command::Lastexon(args) => {
            let reader = open_reader(&args.input)
                .with_context(|| format!("reading {}", args.input.display()))?;
            let exons = last_exons(reader, args.format)
                .with_context(|| format!("parsing {}", args.input.display()))?;

            let mut out = open_output(args.output.as_ref())?;
            for exon in &exons {
                writeln!(out, "{exon}")?;
            }
            out.flush()?;
            log::info!("{} unique last exons", exons.len());
        }

        Command::Rename(args) => {
            let reader = open_reader(&args.input)
                .with_context(|| format!("reading {}", args.input.display()))?;
            let opts = RenameOptions {
                prefix: args.prefix,
                keep_old_name: args.keep_name,
            };

            let mut out = open_output(args.output.as_ref())?;
            for rec in renamed_records(reader, opts) {
                let rec = rec.with_context(|| format!("parsing {}", args.input.display()))?;
                writeln!(out, "{rec}")?;
            }
            out.flush()?;
        }
    }

    Ok(())
}
