use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::unstable::write::FileOptionsExt;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use sample_triage_helper::unpacker::unpack_all;
use sample_triage_helper::TriageError;

const PASSWORD: &[u8] = b"infected";

/// Build a ZIP in memory, optionally ZipCrypto-encrypted.
fn zip_bytes(entries: &[(&str, &[u8])], password: Option<&[u8]>) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut cursor);
        for (name, data) in entries {
            let mut options = FileOptions::default().compression_method(CompressionMethod::Stored);
            if let Some(pw) = password {
                options = options.with_deprecated_encryption(pw);
            }
            writer.start_file(*name, options).expect("start zip entry");
            writer.write_all(data).expect("write zip entry");
        }
        writer.finish().expect("finish zip");
    }
    cursor.into_inner()
}

/// A group submission archive: one inner folder holding per-category nested
/// archives, everything protected with the corpus password.
fn write_group_archive(path: &Path, inner: &str, nested: &[(&str, Vec<u8>)]) {
    let entries: Vec<(String, &[u8])> = nested
        .iter()
        .map(|(rel, bytes)| (format!("{}/{}", inner, rel), bytes.as_slice()))
        .collect();
    let borrowed: Vec<(&str, &[u8])> = entries
        .iter()
        .map(|(name, bytes)| (name.as_str(), *bytes))
        .collect();
    fs::write(path, zip_bytes(&borrowed, Some(PASSWORD))).expect("write group archive");
}

#[test]
fn normalizes_group_into_exe_and_others() {
    let dirs = tempfile::tempdir().expect("tempdir");
    let source = dirs.path().join("Submission-2");
    let dest = dirs.path().join("Unpacked_Samples");
    fs::create_dir_all(&source).expect("create source");

    let exe_zip = zip_bytes(&[("mal1.exe", b"MZ-payload" as &[u8])], Some(PASSWORD));
    let others_zip = zip_bytes(&[("notes.txt", b"dropper config" as &[u8])], Some(PASSWORD));
    write_group_archive(
        &source.join("APT1.zip"),
        "APT1_submission",
        &[("exe/a.zip", exe_zip), ("others/b.zip", others_zip)],
    );

    unpack_all(&source, &dest, PASSWORD).expect("unpack batch");

    let exe_out = dest.join("APT1").join("exe").join("mal1.exe");
    let others_out = dest.join("APT1").join("others").join("notes.txt");
    assert_eq!(fs::read(&exe_out).expect("exe artifact"), b"MZ-payload");
    assert_eq!(fs::read(&others_out).expect("others artifact"), b"dropper config");

    // Scratch space is removed after processing
    assert!(!dest.join("APT1").join("temp").exists());
}

#[test]
fn corrupt_nested_zip_does_not_stop_siblings_or_other_groups() {
    let dirs = tempfile::tempdir().expect("tempdir");
    let source = dirs.path().join("incoming");
    let dest = dirs.path().join("out");
    fs::create_dir_all(&source).expect("create source");

    let good = zip_bytes(&[("good.exe", b"fine" as &[u8])], Some(PASSWORD));
    write_group_archive(
        &source.join("APT2.zip"),
        "inner",
        &[
            ("exe/aa_bad.zip", b"this is not a zip archive".to_vec()),
            ("exe/bb_good.zip", good),
        ],
    );

    let other = zip_bytes(&[("late.exe", b"still here" as &[u8])], Some(PASSWORD));
    write_group_archive(&source.join("APT3.zip"), "inner", &[("exe/c.zip", other)]);

    unpack_all(&source, &dest, PASSWORD).expect("batch must continue");

    assert_eq!(
        fs::read(dest.join("APT2").join("exe").join("good.exe")).expect("sibling extracted"),
        b"fine"
    );
    assert_eq!(
        fs::read(dest.join("APT3").join("exe").join("late.exe")).expect("next group extracted"),
        b"still here"
    );
    assert!(!dest.join("APT2").join("temp").exists());
    assert!(!dest.join("APT3").join("temp").exists());
}

#[test]
fn corrupt_group_archive_is_skipped_and_temp_cleaned() {
    let dirs = tempfile::tempdir().expect("tempdir");
    let source = dirs.path().join("incoming");
    let dest = dirs.path().join("out");
    fs::create_dir_all(&source).expect("create source");

    fs::write(source.join("APT4.zip"), b"garbage bytes").expect("write bad archive");
    let ok = zip_bytes(&[("x.exe", b"ok" as &[u8])], Some(PASSWORD));
    write_group_archive(&source.join("APT5.zip"), "inner", &[("exe/x.zip", ok)]);

    unpack_all(&source, &dest, PASSWORD).expect("batch must continue");

    // The bad group still got its skeleton, minus the scratch dir
    assert!(dest.join("APT4").join("exe").is_dir());
    assert!(dest.join("APT4").join("others").is_dir());
    assert!(!dest.join("APT4").join("temp").exists());
    assert_eq!(
        fs::read(dest.join("APT5").join("exe").join("x.exe")).expect("good group extracted"),
        b"ok"
    );
}

#[test]
fn empty_source_completes_without_extraction() {
    let dirs = tempfile::tempdir().expect("tempdir");
    let source = dirs.path().join("empty");
    let dest = dirs.path().join("out");
    fs::create_dir_all(&source).expect("create source");

    unpack_all(&source, &dest, PASSWORD).expect("empty batch is fine");
    assert!(dest.is_dir());
    assert_eq!(fs::read_dir(&dest).expect("read dest").count(), 0);
}

#[test]
fn missing_source_directory_is_fatal() {
    let dirs = tempfile::tempdir().expect("tempdir");
    let source = dirs.path().join("never-created");
    let dest = dirs.path().join("out");

    match unpack_all(&source, &dest, PASSWORD) {
        Err(TriageError::MissingDirectory { path }) => assert_eq!(path, source),
        other => panic!("expected MissingDirectory, got {:?}", other),
    }
}

#[test]
fn group_without_inner_folder_is_tolerated() {
    // Top-level archive whose entries are plain files, no inner directory:
    // nothing to extract per category, but the group skeleton appears.
    let dirs = tempfile::tempdir().expect("tempdir");
    let source = dirs.path().join("incoming");
    let dest = dirs.path().join("out");
    fs::create_dir_all(&source).expect("create source");

    fs::write(
        source.join("APT6.zip"),
        zip_bytes(&[("README.txt", b"no structure" as &[u8])], Some(PASSWORD)),
    )
    .expect("write archive");

    unpack_all(&source, &dest, PASSWORD).expect("unpack batch");

    assert!(dest.join("APT6").join("exe").is_dir());
    assert_eq!(fs::read_dir(dest.join("APT6").join("exe")).expect("read exe").count(), 0);
    assert!(!dest.join("APT6").join("temp").exists());
}
