//! Packed payload -> zip archive, including gzip staging and cleanup.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tar::{EntryType, Header};
use tempfile::tempdir;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use patchfs::unpack::gunzip_path;
use patchfs::{PackUnpacker, PatchFsError, unpack_packed_archive, unpack_packed_archive_with};

const MANIFEST: &[u8] = b"Manifest-Version: 1.0\nMain-Class: com.example.Main\n";
const CLASS: &[u8] = b"\xca\xfe\xba\xbe not really bytecode";

fn packed_payload() -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());

    let mut dir = Header::new_gnu();
    dir.set_entry_type(EntryType::Directory);
    dir.set_mode(0o755);
    dir.set_size(0);
    builder.append_data(&mut dir, "META-INF/", std::io::empty()).unwrap();

    for (name, body) in [("META-INF/MANIFEST.MF", MANIFEST), ("com/example/Main.class", CLASS)] {
        let mut h = Header::new_gnu();
        h.set_entry_type(EntryType::Regular);
        h.set_mode(0o644);
        h.set_size(body.len() as u64);
        builder.append_data(&mut h, name, body).unwrap();
    }
    builder.into_inner().unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

fn read_entry(archive: &Path, name: &str) -> Vec<u8> {
    let mut zip = ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut entry = zip.by_name(name).unwrap();
    let mut out = Vec::new();
    entry.read_to_end(&mut out).unwrap();
    out
}

fn assert_valid_archive(target: &Path) {
    let zip = ZipArchive::new(File::open(target).unwrap()).expect("target should be a zip");
    let names: Vec<&str> = zip.file_names().collect();
    assert!(names.contains(&"META-INF/"), "names: {names:?}");
    assert!(names.contains(&"META-INF/MANIFEST.MF"), "names: {names:?}");
    assert!(names.contains(&"com/example/Main.class"), "names: {names:?}");
    assert_eq!(read_entry(target, "META-INF/MANIFEST.MF"), MANIFEST);
    assert_eq!(read_entry(target, "com/example/Main.class"), CLASS);
}

#[test]
fn plain_payload_unpacks_to_valid_archive() {
    let td = tempdir().unwrap();
    let packed = td.path().join("code.jar.pack");
    let target = td.path().join("code.jar");
    fs::write(&packed, packed_payload()).unwrap();

    assert!(unpack_packed_archive(&packed, &target));
    assert_valid_archive(&target);
    assert!(packed.exists(), "input payload is left for the caller");
}

#[test]
fn gzipped_payload_unpacks_and_removes_staging_file() {
    let td = tempdir().unwrap();
    let packed = td.path().join("code.jar.pack.gz");
    let target = td.path().join("code.jar");
    fs::write(&packed, gzip(&packed_payload())).unwrap();

    assert!(unpack_packed_archive(&packed, &target));
    assert_valid_archive(&target);
    assert!(!gunzip_path(&packed).exists(), ".gunzip must not outlive the call");
}

/// A tar stream holding one regular file. Without `terminate` the two
/// trailing zero blocks are cut off, so another stream can follow it.
fn tar_chunk(name: &str, body: &[u8], terminate: bool) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    let mut h = Header::new_gnu();
    h.set_entry_type(EntryType::Regular);
    h.set_mode(0o644);
    h.set_size(body.len() as u64);
    builder.append_data(&mut h, name, body).unwrap();
    let mut bytes = builder.into_inner().unwrap();
    if !terminate {
        bytes.truncate(bytes.len() - 1024);
    }
    bytes
}

#[test]
fn concatenated_gzip_members_are_all_unpacked() {
    let td = tempdir().unwrap();
    let packed = td.path().join("multi.jar.pack.gz");
    let target = td.path().join("multi.jar");
    let mut payload = gzip(&tar_chunk("META-INF/MANIFEST.MF", MANIFEST, false));
    payload.extend(gzip(&tar_chunk("com/example/Main.class", CLASS, true)));
    fs::write(&packed, payload).unwrap();

    assert!(unpack_packed_archive(&packed, &target));
    assert_eq!(read_entry(&target, "META-INF/MANIFEST.MF"), MANIFEST);
    assert_eq!(read_entry(&target, "com/example/Main.class"), CLASS);
    assert!(!gunzip_path(&packed).exists());
}

#[test]
fn existing_target_is_overwritten() {
    let td = tempdir().unwrap();
    let packed = td.path().join("code.jar.pack");
    let target = td.path().join("code.jar");
    fs::write(&packed, packed_payload()).unwrap();
    fs::write(&target, vec![b'x'; 4096]).unwrap();

    assert!(unpack_packed_archive(&packed, &target));
    assert_valid_archive(&target);
}

#[test]
fn garbage_gzip_fails_and_leaves_no_artifacts() {
    let td = tempdir().unwrap();
    let packed = td.path().join("broken.jar.pack.gz");
    let target = td.path().join("broken.jar");
    fs::write(&packed, b"this was never gzip").unwrap();

    assert!(!unpack_packed_archive(&packed, &target));
    assert!(!gunzip_path(&packed).exists());
    assert!(!target.exists());
}

#[test]
fn truncated_gzip_fails_and_leaves_no_artifacts() {
    let td = tempdir().unwrap();
    let packed = td.path().join("cut.jar.pack.gz");
    let target = td.path().join("cut.jar");
    let full = gzip(&packed_payload());
    fs::write(&packed, &full[..full.len() / 2]).unwrap();

    assert!(!unpack_packed_archive(&packed, &target));
    assert!(!gunzip_path(&packed).exists());
    assert!(!target.exists());
}

#[test]
fn missing_payload_fails() {
    let td = tempdir().unwrap();
    let packed = td.path().join("absent.pack.gz");
    let target = td.path().join("absent.jar");

    assert!(!unpack_packed_archive(&packed, &target));
    assert!(!target.exists());
    assert!(!gunzip_path(&packed).exists());
}

#[test]
fn unwritable_target_fails_before_touching_payload() {
    let td = tempdir().unwrap();
    let packed = td.path().join("code.pack.gz");
    fs::write(&packed, gzip(&packed_payload())).unwrap();
    let target = td.path().join("no-such-dir").join("code.jar");

    assert!(!unpack_packed_archive(&packed, &target));
    assert!(!gunzip_path(&packed).exists());
}

#[test]
fn escaping_entry_is_rejected() {
    let td = tempdir().unwrap();
    let packed = td.path().join("evil.pack");
    let target = td.path().join("evil.jar");

    // tar::Builder refuses `..` paths, so write the name field by hand.
    let body = b"owned";
    let mut h = Header::new_old();
    h.as_old_mut().name[..7].copy_from_slice(b"../evil");
    h.set_entry_type(EntryType::Regular);
    h.set_mode(0o644);
    h.set_size(body.len() as u64);
    h.set_cksum();
    let mut builder = tar::Builder::new(Vec::new());
    builder.append(&h, &body[..]).unwrap();
    fs::write(&packed, builder.into_inner().unwrap()).unwrap();

    assert!(!unpack_packed_archive(&packed, &target));
    assert!(!target.exists());
}

/// Writes one entry, then reports a corrupt payload.
struct FailingUnpacker;

impl PackUnpacker for FailingUnpacker {
    fn unpack(
        &self,
        origin: &Path,
        input: &mut dyn Read,
        output: &mut ZipWriter<File>,
    ) -> Result<usize, PatchFsError> {
        let mut sink = Vec::new();
        input.read_to_end(&mut sink).unwrap();
        output.start_file("partial.txt", SimpleFileOptions::default()).unwrap();
        output.write_all(b"half").unwrap();
        Err(PatchFsError::CorruptPayload {
            path: origin.to_path_buf(),
            reason: "simulated".into(),
        })
    }
}

#[test]
fn transform_failure_cleans_up_everything() {
    let td = tempdir().unwrap();
    let packed = td.path().join("code.pack.gz");
    let target = td.path().join("code.jar");
    fs::write(&packed, gzip(b"anything at all")).unwrap();

    assert!(!unpack_packed_archive_with(&packed, &target, &FailingUnpacker));
    assert!(!gunzip_path(&packed).exists());
    assert!(!target.exists());
}
