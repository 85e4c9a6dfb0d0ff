//Enable more cargo lint tests
#![warn(rust_2018_idioms)]

use bwzip::compression::compress::compress;
use bwzip::compression::decompress::{decompress, test};
use bwzip::tools::cli::{bzopts_init, Mode};
use bwzip::BzError;

use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

fn main() -> Result<(), BzError> {
    // Available log levels are Error, Warn, Info, Debug, Trace. The cli narrows this down.
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Unable to start logging: {}", e);
    }

    let options = bzopts_init();
    info!("{} {} file(s), output to {}", options.op_mode, options.files.len(), options.output);

    //----- Figure how what we need to do and go do it
    let result = match options.op_mode {
        Mode::Zip => compress(&options),
        Mode::Unzip => decompress(&options),
        Mode::Test => test(&options),
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    info!("Done.");
    result
}
