use std::fs::{self, File};
use std::io::{self, Read, Write};

use log::{debug, error, info};

use crate::alphabet::Alphabet;
use crate::bitstream::bitreader::BitReader;
use crate::error::{BzError, Result};
use crate::tools::cli::{BzOpts, Output};

use super::compress::{with_output, BLOCK_FRAME, BLOCK_UNIT, END_FRAME, EXTENSION, MAGIC};
use super::compress_block::{decompress_block, CompressedBlock};

fn u16_field(br: &mut BitReader<'_>) -> Result<u16> {
    br.bint(16).map(|x| x as u16).ok_or(BzError::TruncatedStream)
}

fn u32_field(br: &mut BitReader<'_>) -> Result<u32> {
    br.bint(32).map(|x| x as u32).ok_or(BzError::TruncatedStream)
}

/// Read the next block frame. Returns None at the end-of-stream frame.
pub fn read_frame(br: &mut BitReader<'_>) -> Result<Option<CompressedBlock>> {
    match br.byte() {
        Some(BLOCK_FRAME) => {}
        Some(END_FRAME) => return Ok(None),
        Some(x) => {
            return Err(BzError::InvalidFrame(format!(
                "unknown frame type {:#04x} at byte {}",
                x,
                br.position() / 8 - 1
            )))
        }
        None => return Err(BzError::TruncatedStream),
    }

    let len = u32_field(br)?;
    let key = u32_field(br)?;
    let entries = u16_field(br)?;
    let mut freqs = Vec::with_capacity(entries as usize);
    for _ in 0..entries {
        let symbol = u16_field(br)?;
        let count = u32_field(br)?;
        freqs.push((symbol, count));
    }
    let payload_len = u32_field(br)? as usize;
    let payload = br.bytes(payload_len).ok_or(BzError::TruncatedStream)?;

    Ok(Some(CompressedBlock {
        len,
        key,
        freqs,
        payload,
    }))
}

/// Decompress a whole compressed stream into sink. Returns the number of bytes written.
pub fn decompress_stream<W: Write>(data: &[u8], sink: &mut W, alphabet: &Alphabet) -> Result<usize> {
    let mut br = BitReader::new(data);

    // Check the file header
    let magic = br.bytes(MAGIC.len()).ok_or(BzError::TruncatedStream)?;
    if magic != MAGIC {
        return Err(BzError::InvalidFrame("not a bwz stream".to_string()));
    }
    let level = match br.byte() {
        Some(x @ b'1'..=b'9') => x - b'0',
        Some(x) => {
            return Err(BzError::InvalidFrame(format!(
                "invalid block size level {:#04x}",
                x
            )))
        }
        None => return Err(BzError::TruncatedStream),
    };
    let max_block = level as usize * BLOCK_UNIT;
    debug!("Block size level {}", level);

    let mut written = 0;
    let mut seq = 0;
    while let Some(compressed) = read_frame(&mut br)? {
        seq += 1;
        if compressed.len as usize > max_block {
            return Err(BzError::InvalidFrame(format!(
                "block {} claims {} bytes, limit is {}",
                seq, compressed.len, max_block
            )));
        }
        let block = decompress_block(&compressed, alphabet)?;
        let bytes = block.to_bytes()?;
        sink.write_all(&bytes)?;
        written += bytes.len();
        debug!("Block {} restored, {} bytes", seq, bytes.len());
    }
    if !br.is_empty() {
        // Trailing garbage after the end frame is reported, not fatal
        info!("Ignoring data after the end of the stream at {}", br.loc());
    }
    sink.flush()?;
    Ok(written)
}

/// Output name for a compressed file: strip the extension, or add .out if there is none.
fn output_name(fname: &str) -> String {
    match fname.strip_suffix(EXTENSION) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => format!("{}.out", fname),
    }
}

fn read_input(fname: &str) -> Result<Vec<u8>> {
    let mut data = vec![];
    File::open(fname)?.read_to_end(&mut data)?;
    Ok(data)
}

/// Decompress the input files defined in opts <BzOpts>.
pub fn decompress(opts: &BzOpts) -> Result<()> {
    let alphabet = Alphabet::default();

    for fname in &opts.files {
        let data = read_input(fname)?;
        let written = match opts.output {
            Output::Stdout => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                decompress_stream(&data, &mut lock, &alphabet)?
            }
            Output::File => with_output(&output_name(fname), opts.force_overwrite, |f_out| {
                decompress_stream(&data, f_out, &alphabet)
            })?,
        };
        info!("{}: {} bytes in, {} bytes out", fname, data.len(), written);

        if !opts.keep_input_files {
            fs::remove_file(fname)?;
        }
    }
    Ok(())
}

/// Decode every input file without writing anything. Fails on the first bad file.
pub fn test(opts: &BzOpts) -> Result<()> {
    let alphabet = Alphabet::default();

    for fname in &opts.files {
        let data = read_input(fname)?;
        match decompress_stream(&data, &mut io::sink(), &alphabet) {
            Ok(_) => info!("{}: ok", fname),
            Err(e) => {
                error!("{}: {}", fname, e);
                return Err(e);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::compress::compress_stream;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn squeeze(data: &[u8], level: u8) -> Vec<u8> {
        let mut out = vec![];
        compress_stream(data, &mut out, level, &Alphabet::default()).unwrap();
        out
    }

    fn expand(data: &[u8]) -> Result<Vec<u8>> {
        let mut out = vec![];
        decompress_stream(data, &mut out, &Alphabet::default())?;
        Ok(out)
    }

    #[test]
    fn round_trip_test() {
        let data = b"Peter Piper picked a peck of pickled peppers. ".repeat(50);
        assert_eq!(expand(&squeeze(&data, 1)).unwrap(), data);
        assert_eq!(expand(&squeeze(&data, 9)).unwrap(), data);
    }

    #[test]
    fn empty_round_trip_test() {
        assert!(expand(&squeeze(b"", 3)).unwrap().is_empty());
    }

    #[test]
    fn random_round_trip_test() {
        let mut rng = StdRng::seed_from_u64(2024);
        let data = (0..2500).map(|_| rng.gen::<u8>()).collect::<Vec<u8>>();
        assert_eq!(expand(&squeeze(&data, 1)).unwrap(), data);
    }

    #[test]
    fn bad_magic_test() {
        let mut data = squeeze(b"hello", 2);
        data[0] = b'X';
        assert!(matches!(expand(&data), Err(BzError::InvalidFrame(_))));
    }

    #[test]
    fn bad_level_test() {
        let mut data = squeeze(b"hello", 2);
        data[3] = b'0';
        assert!(matches!(expand(&data), Err(BzError::InvalidFrame(_))));
    }

    #[test]
    fn truncated_test() {
        let data = squeeze(b"hello hello hello", 2);
        assert!(matches!(
            expand(&data[..data.len() - 3]),
            Err(BzError::TruncatedStream)
        ));
        assert!(matches!(expand(b"BW"), Err(BzError::TruncatedStream)));
    }

    #[test]
    fn oversized_block_test() {
        // Level 1 stream whose block length field claims more than 1k
        let mut data = squeeze(b"abc", 1);
        data[5] = 0x10;
        assert!(matches!(expand(&data), Err(BzError::InvalidFrame(_))));
    }

    #[test]
    fn read_frame_test() {
        let data = [
            BLOCK_FRAME, 0, 0, 0, 2, 0, 0, 0, 1, 0, 1, 0, 97, 0, 0, 0, 2, 0, 0, 0, 1, 0xa0,
            END_FRAME,
        ];
        let mut br = BitReader::new(&data);
        let frame = read_frame(&mut br).unwrap().unwrap();
        assert_eq!(frame.len, 2);
        assert_eq!(frame.key, 1);
        assert_eq!(frame.freqs, vec![(97, 2)]);
        assert_eq!(frame.payload, vec![0xa0]);
        assert!(read_frame(&mut br).unwrap().is_none());
    }

    #[test]
    fn output_name_test() {
        assert_eq!(output_name("notes.txt.bwz"), "notes.txt");
        assert_eq!(output_name("notes.txt"), "notes.txt.out");
        assert_eq!(output_name(".bwz"), ".bwz.out");
    }

    #[test]
    fn corrupt_file_leaves_no_output_test() {
        let stem = std::env::temp_dir().join(format!("bwzip_corrupt_{}", std::process::id()));
        let stem = stem.to_string_lossy().to_string();
        let input = format!("{}{}", stem, EXTENSION);

        // Two good blocks, then cut off in the middle of the second payload
        let data = squeeze(&b"abcdefgh".repeat(200), 1);
        fs::write(&input, &data[..data.len() - 4]).unwrap();

        let opts = BzOpts {
            files: vec![input.clone()],
            keep_input_files: true,
            op_mode: crate::tools::cli::Mode::Unzip,
            ..BzOpts::default()
        };
        assert!(matches!(decompress(&opts), Err(BzError::TruncatedStream)));
        assert!(!std::path::Path::new(&stem).exists());
        assert!(std::path::Path::new(&input).exists());
        fs::remove_file(&input).unwrap();
    }
}
