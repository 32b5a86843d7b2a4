use crate::config::CliConfig;
use crate::report::{write_json, write_pairs};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zncd_core::{CompressionSession, DecompressionSession, NcdEngine, PullMode};

/// Top-level command line.
#[derive(Parser)]
#[command(name = "zncd")]
#[command(about = "Normalized Compression Distance and streaming zlib tool", long_about = None)]
pub struct Cli {
    /// Config file (.toml or .json); flags take precedence
    #[arg(short, long, global = true, env = "ZNCD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Print the NCD of every pair of input files
    Ncd {
        /// Input files, compared pairwise in the order given
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Decimal places per distance
        #[arg(short, long)]
        precision: Option<usize>,
    },
    /// Stream a file into a zlib stream
    Compress {
        /// File to compress
        input: PathBuf,
        /// Destination (default: <INPUT>.z)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Compression level 1-9
        #[arg(short, long)]
        level: Option<u32>,
        /// Bytes read per feed
        #[arg(long)]
        chunk_size: Option<usize>,
    },
    /// Pull a zlib stream back out into a file
    Decompress {
        /// zlib stream to decompress
        input: PathBuf,
        /// Destination (default: <INPUT> without .z, else <INPUT>.out)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Bytes extracted per pull
        #[arg(long)]
        chunk_size: Option<usize>,
    },
}

/// How `ncd` prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `<ncd> <file_i> <file_j>` per pair
    Text,
    /// Labels plus the full matrix
    Json,
}

impl Cli {
    /// Config from `--config`, or defaults.
    pub fn load_config(&self) -> Result<CliConfig> {
        match &self.config {
            Some(path) => CliConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display())),
            None => Ok(CliConfig::default()),
        }
    }

    /// Execute the selected subcommand, writing reports to `out`.
    pub fn run<W: Write>(self, out: &mut W) -> Result<()> {
        let config = self.load_config()?;
        match self.command {
            Command::Ncd {
                ref files,
                format,
                precision,
            } => {
                let precision = precision.unwrap_or(config.precision);
                run_ncd(files, format, precision, &config, out)
            }
            Command::Compress {
                ref input,
                ref output,
                level,
                chunk_size,
            } => {
                let output = output.clone().unwrap_or_else(|| compressed_name(input));
                let chunk_size = chunk_size.unwrap_or(config.chunk_size);
                let total = compress_file(input, &output, level, chunk_size, &config)?;
                info!(input = %input.display(), output = %output.display(), total, "compressed");
                Ok(())
            }
            Command::Decompress {
                ref input,
                ref output,
                chunk_size,
            } => {
                let output = output.clone().unwrap_or_else(|| decompressed_name(input));
                let chunk_size = chunk_size.unwrap_or(config.chunk_size);
                let total = decompress_file(input, &output, chunk_size)?;
                info!(input = %input.display(), output = %output.display(), total, "decompressed");
                Ok(())
            }
        }
    }
}

/// Read every file, compute the matrix, and print it.
pub fn run_ncd<W: Write>(
    files: &[PathBuf],
    format: OutputFormat,
    precision: usize,
    config: &CliConfig,
    out: &mut W,
) -> Result<()> {
    let files = if files.len() > config.max_inputs {
        warn!(
            given = files.len(),
            max = config.max_inputs,
            "too many inputs, ignoring the rest"
        );
        &files[..config.max_inputs]
    } else {
        files
    };
    if files.len() < 2 {
        anyhow::bail!("NCD needs at least 2 input files, got {}", files.len());
    }

    let mut inputs = Vec::with_capacity(files.len());
    for path in files {
        let data =
            std::fs::read(path).with_context(|| format!("Can't read file {}", path.display()))?;
        inputs.push(data);
    }
    let labels: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();

    let mut engine = NcdEngine::default();
    let matrix = engine
        .distance_matrix(&inputs)
        .context("Can't compute NCD")?;

    match format {
        OutputFormat::Text => write_pairs(out, &matrix, &labels, precision)?,
        OutputFormat::Json => write_json(out, &matrix, &labels)?,
    }
    Ok(())
}

/// Compress `input` into `output` one chunk at a time. Returns the compressed size.
pub fn compress_file(
    input: &Path,
    output: &Path,
    level: Option<u32>,
    chunk_size: usize,
    config: &CliConfig,
) -> Result<u64> {
    let mut reader = BufReader::new(
        File::open(input).with_context(|| format!("Can't read file {}", input.display()))?,
    );
    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("Can't create {}", output.display()))?,
    );

    let mut session = CompressionSession::new(config.compression);
    session.set_retain_output(true);
    session.startup(level)?;

    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        session.feed(&buf[..n])?;
        if let Some(piece) = session.take_output() {
            writer.write_all(&piece)?;
        }
    }
    let finished = session.finish()?;
    if let Some(tail) = finished.data {
        writer.write_all(&tail)?;
    }
    writer.flush()?;
    Ok(finished.total_out)
}

/// Decompress `input` into `output`, pulling one chunk at a time. Returns the
/// decompressed size.
pub fn decompress_file(input: &Path, output: &Path, chunk_size: usize) -> Result<u64> {
    let source =
        std::fs::read(input).with_context(|| format!("Can't read file {}", input.display()))?;
    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("Can't create {}", output.display()))?,
    );

    let mut session = DecompressionSession::new();
    let mut dest = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    let mut n = session.start(source, &mut dest)?;
    while n > 0 {
        writer.write_all(&dest[..n])?;
        total += n as u64;
        n = session.pull(&mut dest, PullMode::Continue)?;
    }
    if !session.reached_end() {
        anyhow::bail!("{} is truncated: no end-of-stream marker", input.display());
    }
    writer.flush()?;
    Ok(total)
}

fn compressed_name(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".z");
    PathBuf::from(name)
}

fn decompressed_name(input: &Path) -> PathBuf {
    if input.extension().is_some_and(|e| e == "z") {
        input.with_extension("")
    } else {
        let mut name = input.as_os_str().to_owned();
        name.push(".out");
        PathBuf::from(name)
    }
}
