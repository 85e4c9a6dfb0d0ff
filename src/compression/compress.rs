use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use log::{debug, info, warn};

use crate::alphabet::Alphabet;
use crate::bitstream::bitwriter::BitWriter;
use crate::error::{BzError, Result};
use crate::tools::cli::{BzOpts, Output};

use super::compress_block::{compress_block, Block, CompressedBlock};

/// File signature, followed by the block size level as an ascii digit.
pub const MAGIC: &[u8; 3] = b"BWZ";
/// Leads every block frame.
pub const BLOCK_FRAME: u8 = 0x42;
/// Ends the stream.
pub const END_FRAME: u8 = 0x45;
/// Bytes per block size level.
pub const BLOCK_UNIT: usize = 1024;
/// Extension added to compressed files.
pub const EXTENSION: &str = ".bwz";

/// Iterator over blocks of at most block_size bytes read from a source.
pub struct BlockReader<R> {
    source: R,
    block_size: usize,
    data_gone: bool,
}

impl<R: Read> BlockReader<R> {
    pub fn new(source: R, block_size: usize) -> Self {
        BlockReader {
            source,
            block_size,
            data_gone: false,
        }
    }
}

impl<R: Read> Iterator for BlockReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data_gone {
            return None;
        }
        // Short reads are normal, so keep reading until the block is full or the data is gone.
        let mut buf = vec![0_u8; self.block_size];
        let mut filled = 0;
        while filled < self.block_size {
            match self.source.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.data_gone = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.data_gone = true;
                    return Some(Err(e));
                }
            }
        }
        if filled == 0 {
            return None;
        }
        buf.truncate(filled);
        Some(Ok(buf))
    }
}

/// Append one block frame to the bitstream. All fields are big-endian.
pub fn write_frame(bw: &mut BitWriter, block: &CompressedBlock) -> Result<()> {
    let entries = u16::try_from(block.freqs.len())
        .map_err(|_| BzError::InvalidFrame("too many frequency entries".to_string()))?;
    let payload_len = u32::try_from(block.payload.len())
        .map_err(|_| BzError::InvalidFrame("payload too large".to_string()))?;

    bw.out8(BLOCK_FRAME);
    bw.out32(block.len);
    bw.out32(block.key);
    bw.out16(entries);
    for &(symbol, count) in &block.freqs {
        bw.out16(symbol);
        bw.out32(count);
    }
    bw.out32(payload_len);
    block.payload.iter().for_each(|&b| bw.out8(b));
    Ok(())
}

/// Compress everything in source into sink. Returns (bytes read, bytes written).
pub fn compress_stream<R: Read, W: Write>(
    source: R,
    sink: &mut W,
    level: u8,
    alphabet: &Alphabet,
) -> Result<(usize, usize)> {
    let level = level.clamp(1, 9);
    let block_size = level as usize * BLOCK_UNIT;

    let mut bw = BitWriter::new(block_size);
    MAGIC.iter().for_each(|&x| bw.out8(x));
    bw.out8(level + 0x30);

    let mut bytes_in = 0;
    let mut bytes_out = 0;
    for (seq, data) in BlockReader::new(source, block_size).enumerate() {
        let data = data?;
        info!("Starting block {}", seq + 1);
        bytes_in += data.len();

        let compressed = compress_block(&Block::from_bytes(&data), alphabet)?;
        write_frame(&mut bw, &compressed)?;
        debug!("Wrote block {}. Bitstream now at {}", seq + 1, bw.loc());

        // Every frame is a whole number of bytes, so flushing adds no padding.
        bw.flush();
        sink.write_all(&bw.output)?;
        bytes_out += bw.output.len();
        bw.output.clear();
    }

    bw.out8(END_FRAME);
    bw.flush();
    sink.write_all(&bw.output)?;
    bytes_out += bw.output.len();
    sink.flush()?;
    Ok((bytes_in, bytes_out))
}

/// Open the output for a file, refusing to clobber an existing one unless forced.
pub(crate) fn open_output(path: &str, force: bool) -> Result<Box<dyn Write>> {
    if !force && Path::new(path).exists() {
        return Err(BzError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("output file {} already exists", path),
        )));
    }
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    Ok(Box::new(io::BufWriter::new(file)))
}

/// Run `work` against a fresh output file. If `work` fails the partial file is removed.
pub(crate) fn with_output<T>(
    path: &str,
    force: bool,
    work: impl FnOnce(&mut Box<dyn Write>) -> Result<T>,
) -> Result<T> {
    let mut f_out = open_output(path, force)?;
    match work(&mut f_out) {
        Ok(x) => Ok(x),
        Err(e) => {
            drop(f_out);
            if let Err(rm) = fs::remove_file(path) {
                warn!("Unable to remove partial output {}: {}", path, rm);
            }
            Err(e)
        }
    }
}

/// Compress the input files defined in opts <BzOpts>.
pub fn compress(opts: &BzOpts) -> Result<()> {
    let alphabet = Alphabet::default();

    for fname in &opts.files {
        let fin = File::open(fname)?;
        let out_name = format!("{}{}", fname, EXTENSION);

        let (bytes_in, bytes_out) = match opts.output {
            Output::Stdout => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                compress_stream(io::BufReader::new(fin), &mut lock, opts.block_size, &alphabet)?
            }
            Output::File => with_output(&out_name, opts.force_overwrite, |f_out| {
                compress_stream(io::BufReader::new(fin), f_out, opts.block_size, &alphabet)
            })?,
        };
        info!(
            "{}: {} bytes in, {} bytes out ({:.3} ratio)",
            fname,
            bytes_in,
            bytes_out,
            bytes_out as f64 / bytes_in.max(1) as f64
        );

        if !opts.keep_input_files {
            fs::remove_file(fname)?;
        }
    }
    Ok(())
}
