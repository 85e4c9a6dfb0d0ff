use clap::Parser;
use log::LevelFilter;
use std::{fmt::Display, fmt::Formatter};

/// Command Line Interpretation - uses the external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "A block-sorting file compressor",
    long_about = None)]
pub struct Args {
    /// Files to process
    #[clap()]
    files: Vec<String>,

    /// Perform compression on the input files (default)
    #[clap(short = 'z', long = "compress")]
    compress: bool,

    /// Perform decompression on the input files
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Test compressed file integrity
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Force overwriting output files
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Keep input files
    #[clap(short = 'k', long = "keep")]
    keep: bool,

    /// Send output to the terminal
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Alias for the 1k block size
    #[clap(long = "fast")]
    fast: bool,

    /// Alias for the 9k block size
    #[clap(long = "best")]
    best: bool,

    /// 1..9 - Set the block size from 1k to 9k
    #[clap(short = 'b', long = "block-size", default_value_t = 9)]
    block_size: u8,

    /// Sets verbosity. 0 is quiet, 5 traces every stage
    #[clap(short = 'v', long = "verbosity", default_value_t = 2)]
    v: u8,
}

/// Verbosity of user information
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    fn from_level(v: u8) -> Self {
        match v {
            0 => Verbosity::Quiet,
            1 => Verbosity::Errors,
            2 => Verbosity::Warnings,
            3 => Verbosity::Info,
            4 => Verbosity::Debug,
            _ => Verbosity::Trace,
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Off,
            Verbosity::Errors => LevelFilter::Error,
            Verbosity::Warnings => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

/// Zip, Unzip, Test
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Mode {
    Zip,
    Unzip,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define the two output channels
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Output {
    File,
    Stdout,
}
impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug)]
pub struct BzOpts {
    /// Block size level, 1..=9 (kilobytes)
    pub block_size: u8,
    /// Vec of names of files to read for input
    pub files: Vec<String>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Don't remove input files after processing
    pub keep_input_files: bool,
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// Location where output is sent
    pub output: Output,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl BzOpts {
    pub fn new() -> Self {
        Self {
            block_size: 9,
            files: vec![],
            force_overwrite: false,
            keep_input_files: false,
            op_mode: Mode::Zip,
            output: Output::File,
            verbose: Verbosity::Warnings,
        }
    }
}

impl Default for BzOpts {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Args> for BzOpts {
    fn from(args: Args) -> Self {
        let mut opts = BzOpts::new();
        opts.files = args.files;
        // Decompress wins over compress, test wins over both
        if args.decompress {
            opts.op_mode = Mode::Unzip;
        }
        if args.test {
            opts.op_mode = Mode::Test;
        }
        opts.force_overwrite = args.force;
        opts.keep_input_files = args.keep;
        if args.stdout {
            opts.output = Output::Stdout;
            // Writing to stdout never consumes the input file
            opts.keep_input_files = true;
        }
        opts.block_size = args.block_size.clamp(1, 9);
        if args.fast {
            opts.block_size = 1;
        }
        if args.best {
            opts.block_size = 9;
        }
        opts.verbose = Verbosity::from_level(args.v);
        opts
    }
}

/// Parse the command line and set the log level to match.
pub fn bzopts_init() -> BzOpts {
    let opts = BzOpts::from(Args::parse());
    log::set_max_level(opts.verbose.level_filter());
    opts
}
