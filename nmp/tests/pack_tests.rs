//! Integration tests for opening packs from disk.

mod common;

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use common::{PackFixture, Records};
use nmp::postcode::normalize;
use nmp::{LookupMode, PackError, PostcodePack, PostcodePackBuilder};
use tempfile::TempDir;

fn code(postcode: &str) -> u32 {
    normalize(postcode).unwrap().code().unwrap()
}

/// Write `bytes` as `postcodes.pack` in `dir`.
fn write_pack(dir: &Path, bytes: &[u8]) -> PathBuf {
    let path = dir.join("postcodes.pack");
    let mut file = File::create(&path).unwrap();
    file.write_all(bytes).unwrap();
    path
}

fn sample_bytes() -> Vec<u8> {
    PackFixture::new()
        .bucket(
            b"EH",
            Records::new()
                .outward_only(code("EH99"), 40_000, 20_000)
                .absolute(code("EH991SP"), 40_010, 20_020)
                .delta(2, -5, 5),
        )
        .bucket(
            b"B1",
            Records::new().absolute(code("B11AA"), 30_000, 35_000),
        )
        .build()
}

#[test]
fn test_from_file_matches_from_bytes() {
    let temp_dir = TempDir::new().unwrap();
    let bytes = sample_bytes();
    let path = write_pack(temp_dir.path(), &bytes);

    let mapped = PostcodePack::from_file(&path).unwrap();
    let owned = PostcodePack::from_bytes(bytes).unwrap();

    for postcode in ["EH99", "EH991SP", "EH991SR", "B11AA"] {
        assert_eq!(
            mapped.lookup(postcode).unwrap(),
            owned.lookup(postcode).unwrap(),
            "{postcode}"
        );
    }
    assert_eq!(mapped.info().file_bytes, owned.info().file_bytes);
}

#[test]
fn test_lookup_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_pack(temp_dir.path(), &sample_bytes());
    let pack = PostcodePack::from_file(&path).unwrap();

    let found = pack.lookup("EH991SR").unwrap();
    assert_eq!(found.postcode.display_form(), "EH99 1SR");
    assert_eq!(
        found.position,
        pack.bounding_box().denormalize(40_005, 20_025)
    );
    assert!(pack.bounding_box().contains(found.position));

    let (postcode, _) = pack.lookup("B11AA").unwrap().into_tuple();
    assert_eq!(postcode, "B1  1AA");
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = PostcodePack::from_file(temp_dir.path().join("missing.pack"));
    assert!(matches!(result, Err(PackError::Io(_))));
}

#[test]
fn test_short_file_is_truncated() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_pack(temp_dir.path(), b"UKPP\x02\x00\x00\x00\x00\x00");
    assert!(matches!(
        PostcodePack::from_file(&path),
        Err(PackError::Truncated { .. })
    ));
}

#[test]
fn test_wrong_file_type() {
    let temp_dir = TempDir::new().unwrap();
    let mut bytes = b"PK\x03\x04".to_vec();
    bytes.extend_from_slice(&[0u8; 4000]);
    let path = write_pack(temp_dir.path(), &bytes);

    // version field is zero, so the magic check decides
    assert!(matches!(
        PostcodePack::from_file(&path),
        Err(PackError::UnrecognizedFormat { magic }) if &magic == b"PK\x03\x04"
    ));
}

#[test]
fn test_builder_options() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_pack(temp_dir.path(), &sample_bytes());

    let pack = PostcodePackBuilder::new("/nonexistent")
        .path(&path)
        .lookup_mode(LookupMode::Strict)
        .build()
        .unwrap();
    assert_eq!(pack.lookup_mode(), LookupMode::Strict);
    assert!(pack.lookup("EH991SP").is_ok());

    let pack = PostcodePack::builder(&path).build().unwrap();
    assert_eq!(pack.lookup_mode(), LookupMode::Compatible);
}

// Environment variables are process-wide, so every case lives in one test.
#[test]
fn test_builder_from_env() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_pack(temp_dir.path(), &sample_bytes());

    std::env::remove_var("NMP_PACK");
    std::env::remove_var("NMP_LOOKUP_MODE");
    assert!(matches!(
        PostcodePackBuilder::from_env(),
        Err(PackError::Io(_))
    ));

    std::env::set_var("NMP_PACK", &path);
    let builder = PostcodePackBuilder::from_env().unwrap();
    assert_eq!(builder.pack_path(), path.as_path());
    assert_eq!(builder.build().unwrap().lookup_mode(), LookupMode::Compatible);

    std::env::set_var("NMP_LOOKUP_MODE", "STRICT");
    let pack = PostcodePackBuilder::from_env().unwrap().build().unwrap();
    assert_eq!(pack.lookup_mode(), LookupMode::Strict);

    std::env::set_var("NMP_LOOKUP_MODE", "fuzzy");
    assert!(matches!(
        PostcodePackBuilder::from_env(),
        Err(PackError::Format { .. })
    ));

    std::env::remove_var("NMP_PACK");
    std::env::remove_var("NMP_LOOKUP_MODE");
}

#[test]
fn test_shared_across_threads() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_pack(temp_dir.path(), &sample_bytes());
    let pack = PostcodePack::from_file(&path).unwrap();
    let expected = pack.lookup("EH991SP").unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| pack.lookup("EH991SP").unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_version_one_pack() {
    let temp_dir = TempDir::new().unwrap();
    let bytes = PackFixture::new()
        .version(1)
        .bucket(b"B1", Records::new().absolute(code("B11AA"), 1, 2))
        .build();
    let path = write_pack(temp_dir.path(), &bytes);
    let pack = PostcodePack::from_file(&path).unwrap();

    assert!(!pack.info().supports_outward_only);
    assert!(pack.lookup("B11AA").is_ok());
    assert!(matches!(
        pack.lookup("B1"),
        Err(PackError::IncompatibleFeature { version: 1 })
    ));
}
