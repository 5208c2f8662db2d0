use std::fs;
use std::process::Command;

#[test]
fn compress_decompress_roundtrip_cli() {
    let exe = env!("CARGO_BIN_EXE_arbor");
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.bin");
    let compressed = dir.path().join("input.bin.hf");
    let output = dir.path().join("output.bin");

    fs::write(&input, b"hello huffman, hello huffman").unwrap();

    let status = Command::new(exe)
        .args(["c", input.to_str().unwrap(), compressed.to_str().unwrap()])
        .status()
        .expect("compress failed");
    assert!(status.success());
    // the coding tree lands next to the source
    assert!(dir.path().join("input.tree").exists());

    let status = Command::new(exe)
        .args(["d", compressed.to_str().unwrap(), output.to_str().unwrap()])
        .status()
        .expect("decompress failed");
    assert!(status.success());

    assert_eq!(fs::read(&input).unwrap(), fs::read(&output).unwrap());
}

#[test]
fn encoder_decoder_bins_roundtrip() {
    let encoder = env!("CARGO_BIN_EXE_encoder");
    let decoder = env!("CARGO_BIN_EXE_decoder");
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    let compressed = dir.path().join("notes.txt.hf");
    let output = dir.path().join("notes.out");

    fs::write(&input, b"the encoder and decoder only share the .tree file").unwrap();

    let status = Command::new(encoder)
        .args([input.to_str().unwrap(), compressed.to_str().unwrap()])
        .status()
        .expect("encoder failed");
    assert!(status.success());

    let tree = dir.path().join("notes.tree");
    assert!(tree.exists());

    let status = Command::new(decoder)
        .args([
            compressed.to_str().unwrap(),
            output.to_str().unwrap(),
            "--tree",
            tree.to_str().unwrap(),
        ])
        .status()
        .expect("decoder failed");
    assert!(status.success());

    assert_eq!(fs::read(&input).unwrap(), fs::read(&output).unwrap());
}

#[test]
fn decoder_rejects_wrong_extension() {
    let decoder = env!("CARGO_BIN_EXE_decoder");
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    fs::write(&input, b"plain text").unwrap();

    let status = Command::new(decoder)
        .args([
            input.to_str().unwrap(),
            dir.path().join("out.bin").to_str().unwrap(),
        ])
        .status()
        .expect("decoder failed to launch");
    assert!(!status.success());
}

#[test]
fn compress_with_a_reused_tree() {
    let exe = env!("CARGO_BIN_EXE_arbor");
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");
    let compressed = dir.path().join("second.txt.hf");
    let output = dir.path().join("second.out");

    // both files draw from the same alphabet, so one tree serves both
    fs::write(&first, b"abcabcabc").unwrap();
    fs::write(&second, b"cbacba").unwrap();

    let status = Command::new(exe)
        .args([
            "c",
            first.to_str().unwrap(),
            dir.path().join("first.txt.hf").to_str().unwrap(),
        ])
        .status()
        .expect("compress failed");
    assert!(status.success());

    let tree = dir.path().join("first.tree");
    let status = Command::new(exe)
        .args([
            "c",
            second.to_str().unwrap(),
            compressed.to_str().unwrap(),
            "--tree",
            tree.to_str().unwrap(),
        ])
        .status()
        .expect("compress with tree failed");
    assert!(status.success());

    let status = Command::new(exe)
        .args([
            "d",
            compressed.to_str().unwrap(),
            output.to_str().unwrap(),
            "--tree",
            tree.to_str().unwrap(),
        ])
        .status()
        .expect("decompress failed");
    assert!(status.success());

    assert_eq!(fs::read(&output).unwrap(), b"cbacba".to_vec());
}

#[test]
fn corrupt_tree_file_fails_cleanly() {
    let exe = env!("CARGO_BIN_EXE_arbor");
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.bin.hf");
    let tree = dir.path().join("input.tree");
    fs::write(&input, [0u8; 4]).unwrap();
    fs::write(&tree, b"{-A-B").unwrap();

    let status = Command::new(exe)
        .args([
            "d",
            input.to_str().unwrap(),
            dir.path().join("out.bin").to_str().unwrap(),
        ])
        .status()
        .expect("decode failed to launch");
    assert!(!status.success());
}
