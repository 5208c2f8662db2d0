use clap::Parser;
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use arbor::io_utils::{arbor_cli_error, extension_error, io_cli_error, tree_path_for_compressed};
use arbor::{decode_stream, treefile};

/// Decompress an .hf file created by the encoder.
#[derive(Parser)]
struct Args {
    /// Input .hf file
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// The .tree file to decode with (defaults to one derived from the
    /// input path)
    #[clap(long)]
    tree: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args
        .input
        .extension()
        .and_then(|s| s.to_str())
        .map_or(true, |ext| ext.to_ascii_lowercase() != "hf")
    {
        return Err(extension_error(&args.input).into());
    }

    let tree_source = args
        .tree
        .clone()
        .unwrap_or_else(|| tree_path_for_compressed(&args.input));
    let bytes =
        fs::read(&tree_source).map_err(|e| io_cli_error("reading tree file", &tree_source, e))?;
    let tree = treefile::parse(&bytes).map_err(|e| arbor_cli_error("parsing tree file", e))?;

    let reader = BufReader::new(
        File::open(&args.input).map_err(|e| io_cli_error("reading input file", &args.input, e))?,
    );
    let mut writer = BufWriter::new(
        File::create(&args.output)
            .map_err(|e| io_cli_error("writing output file", &args.output, e))?,
    );
    decode_stream(&tree, reader, &mut writer).map_err(|e| arbor_cli_error("decoding", e))?;
    writer
        .flush()
        .map_err(|e| io_cli_error("writing output file", &args.output, e))?;
    Ok(())
}
