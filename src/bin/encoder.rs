use clap::Parser;
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use arbor::io_utils::{arbor_cli_error, io_cli_error, tree_path};
use arbor::{encode_stream, treefile, LiveStats, Tree};

/// Compress a file against a Huffman coding tree.
#[derive(Parser)]
struct Args {
    /// File to compress
    input: PathBuf,
    /// Output .hf file path
    output: PathBuf,
    /// Reuse an existing .tree file instead of deriving one from the input
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

    let tree = match &args.tree {
        Some(path) => {
            let bytes = fs::read(path).map_err(|e| io_cli_error("reading tree file", path, e))?;
            treefile::parse(&bytes).map_err(|e| arbor_cli_error("parsing tree file", e))?
        }
        None => {
            let reader = BufReader::new(
                File::open(&args.input)
                    .map_err(|e| io_cli_error("reading input file", &args.input, e))?,
            );
            let tree = Tree::from_reader(reader).map_err(|e| arbor_cli_error("building tree", e))?;
            let path = tree_path(&args.input);
            fs::write(&path, treefile::serialize(&tree))
                .map_err(|e| io_cli_error("writing tree file", &path, e))?;
            tree
        }
    };

    let reader = BufReader::new(
        File::open(&args.input).map_err(|e| io_cli_error("reading input file", &args.input, e))?,
    );
    let mut writer = BufWriter::new(
        File::create(&args.output)
            .map_err(|e| io_cli_error("writing output file", &args.output, e))?,
    );
    encode_stream(&tree, reader, &mut writer, &mut LiveStats::silent())
        .map_err(|e| arbor_cli_error("encoding", e))?;
    writer
        .flush()
        .map_err(|e| io_cli_error("writing output file", &args.output, e))?;
    Ok(())
}
