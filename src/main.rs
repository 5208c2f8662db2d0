use std::env;
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use arbor::io_utils::{
    arbor_cli_error, compressed_path, io_cli_error, simple_cli_error, tree_path,
    tree_path_for_compressed,
};
use arbor::{decode_stream, encode_stream, treefile, CodecStats, LiveStats, Tree};

/// Progress line cadence for `--status`, in input bytes.
const STATUS_INTERVAL: u64 = 1 << 20;

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage: {} [c|d] <input> [output] [--tree FILE] [--status] [--json] [--dry-run]",
            args[0]
        );
        return Ok(());
    }

    let mut tree_file: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut show_status = false;
    let mut json_out = false;
    let mut dry_run = false;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--tree" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| simple_cli_error("--tree needs a file path"))?;
                tree_file = Some(PathBuf::from(path));
                i += 2;
            }
            "--status" => {
                show_status = true;
                i += 1;
            }
            "--json" => {
                json_out = true;
                i += 1;
            }
            "--dry-run" => {
                dry_run = true;
                i += 1;
            }
            flag if flag.starts_with("--") => {
                eprintln!("Unknown flag: {}", flag);
                return Ok(());
            }
            positional => {
                if output.is_some() {
                    eprintln!("Unexpected argument: {}", positional);
                    return Ok(());
                }
                output = Some(PathBuf::from(positional));
                i += 1;
            }
        }
    }

    let input = PathBuf::from(&args[2]);

    match args[1].as_str() {
        "c" => {
            let mut stats = CodecStats::new();
            stats.bytes_in = fs::metadata(&input)
                .map_err(|e| io_cli_error("reading input file", &input, e))?
                .len();

            // Reuse a persisted tree, or derive one from the input and
            // persist it next to the source.
            let tree = match &tree_file {
                Some(path) => {
                    let bytes =
                        fs::read(path).map_err(|e| io_cli_error("reading tree file", path, e))?;
                    treefile::parse(&bytes).map_err(|e| arbor_cli_error("parsing tree file", e))?
                }
                None => {
                    let reader = BufReader::new(
                        File::open(&input)
                            .map_err(|e| io_cli_error("reading input file", &input, e))?,
                    );
                    let tree =
                        Tree::from_reader(reader).map_err(|e| arbor_cli_error("building tree", e))?;
                    let path = tree_path(&input);
                    if !dry_run {
                        fs::write(&path, treefile::serialize(&tree))
                            .map_err(|e| io_cli_error("writing tree file", &path, e))?;
                    }
                    tree
                }
            };

            let out_path = output.unwrap_or_else(|| compressed_path(&input));
            let reader = BufReader::new(
                File::open(&input).map_err(|e| io_cli_error("reading input file", &input, e))?,
            );
            let mut live = LiveStats::new(if show_status { STATUS_INTERVAL } else { 0 });

            stats.bytes_out = if dry_run {
                encode_stream(&tree, reader, std::io::sink(), &mut live)
                    .map_err(|e| arbor_cli_error("encoding", e))?
            } else {
                let mut writer = BufWriter::new(
                    File::create(&out_path)
                        .map_err(|e| io_cli_error("writing output file", &out_path, e))?,
                );
                let written = encode_stream(&tree, reader, &mut writer, &mut live)
                    .map_err(|e| arbor_cli_error("encoding", e))?;
                writer
                    .flush()
                    .map_err(|e| io_cli_error("writing output file", &out_path, e))?;
                written
            };

            if json_out {
                println!("{}", serde_json::to_string_pretty(&stats.summary())?);
            } else {
                stats.report();
            }
        }

        "d" => {
            let tree_source = tree_file.unwrap_or_else(|| tree_path_for_compressed(&input));
            let bytes = fs::read(&tree_source)
                .map_err(|e| io_cli_error("reading tree file", &tree_source, e))?;
            let tree =
                treefile::parse(&bytes).map_err(|e| arbor_cli_error("parsing tree file", e))?;

            let out_path = match output {
                Some(path) => path,
                None => return Err(simple_cli_error("decode needs an output path").into()),
            };

            let mut stats = CodecStats::new();
            stats.bytes_in = fs::metadata(&input)
                .map_err(|e| io_cli_error("reading input file", &input, e))?
                .len();
            let reader = BufReader::new(
                File::open(&input).map_err(|e| io_cli_error("reading input file", &input, e))?,
            );

            stats.bytes_out = if dry_run {
                decode_stream(&tree, reader, std::io::sink())
                    .map_err(|e| arbor_cli_error("decoding", e))?
            } else {
                let mut writer = BufWriter::new(
                    File::create(&out_path)
                        .map_err(|e| io_cli_error("writing output file", &out_path, e))?,
                );
                let written = decode_stream(&tree, reader, &mut writer)
                    .map_err(|e| arbor_cli_error("decoding", e))?;
                writer
                    .flush()
                    .map_err(|e| io_cli_error("writing output file", &out_path, e))?;
                written
            };

            if json_out {
                println!("{}", serde_json::to_string_pretty(&stats.summary())?);
            } else {
                stats.report();
            }
        }

        mode => eprintln!("Unknown mode: {}", mode),
    }

    Ok(())
}
