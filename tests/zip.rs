// ZIP 构建测试

mod common;

use std::fs;

use archive_rs::{dos_to_unix, unix_to_dos, ZipBuilder};
use common::{list_zip, test_temp_dir, write_files, zip_entry_data};

#[test]
fn test_single_entry_eocd() {
    let mut zip = ZipBuilder::new();
    zip.add_file(b"abc", "dir\\file.txt", 0).unwrap();
    let out = zip.file();

    let data_len = 30 + "dir/file.txt".len() + 3;
    let cd_len = 46 + "dir/file.txt".len();
    assert_eq!(out.len(), data_len + cd_len + 22);

    let eocd = &out[out.len() - 22..];
    assert_eq!(&eocd[0..4], b"PK\x05\x06");
    assert_eq!(&eocd[4..8], &[0, 0, 0, 0]);
    assert_eq!(&eocd[8..10], &[1, 0]);
    assert_eq!(&eocd[10..12], &[1, 0]);
    assert_eq!(&eocd[12..16], &(cd_len as u32).to_le_bytes());
    assert_eq!(&eocd[16..20], &(data_len as u32).to_le_bytes());
    assert_eq!(&eocd[20..22], &[0, 0]);
    assert_eq!(zip.offset(), data_len);
}

#[test]
fn test_listing() {
    let mut zip = ZipBuilder::new();
    zip.add_file(b"one", "a.txt", 1_000_000_000).unwrap()
        .add_file(b"", "empty/", 1_000_000_000).unwrap()
        .add_file(b"three", "sub\\b.txt", 1_000_000_000).unwrap();
    let out = zip.file();

    let names: Vec<_> = list_zip(&out).into_iter().map(|e| e.name).collect();
    insta::assert_snapshot!(names.join("\n"), @r"
    a.txt
    empty/
    sub/b.txt
    ");
}

#[test]
fn test_entries_are_stored() {
    let mut zip = ZipBuilder::new();
    zip.add_file(b"hello world", "h.txt", 0).unwrap()
        .add_file(&[0xffu8; 1000], "bin.dat", 0).unwrap();
    let out = zip.file();

    let entries = list_zip(&out);
    assert_eq!(entries.len(), 2);
    for entry in &entries {
        assert_eq!(entry.method, 0);
    }
    assert_eq!(zip_entry_data(&out, &entries[0]), b"hello world");
    assert_eq!(entries[0].crc32, 0x0d4a1185);
    assert_eq!(zip_entry_data(&out, &entries[1]), &[0xffu8; 1000][..]);
    assert_eq!(entries[1].crc32, crc32fast::hash(&[0xffu8; 1000]));
}

#[test]
fn test_central_offsets_match_local_headers() {
    let mut zip = ZipBuilder::new();
    for i in 0..5 {
        zip.add_file(&vec![i as u8; i * 100], &format!("f{i}"), 0).unwrap();
    }
    let out = zip.file();

    let mut expected = 0usize;
    for (i, entry) in list_zip(&out).iter().enumerate() {
        assert_eq!(entry.offset as usize, expected);
        expected += 30 + entry.name.len() + i * 100;
    }
    assert_eq!(expected, zip.offset());
}

#[test]
fn test_timestamps() {
    let mut zip = ZipBuilder::new();
    zip.add_file(b"old", "old", -86_400)
        .unwrap()
        .add_file(b"new", "new", 1_600_000_000)
        .unwrap();
    let entries = list_zip(&zip.file());

    // 1980-01-01 00:00:00
    assert_eq!(entries[0].dos_datetime, (1 << 21) | (1 << 16));
    assert_eq!(entries[1].dos_datetime, unix_to_dos(1_600_000_000));
    assert_eq!(dos_to_unix(entries[1].dos_datetime), Some(1_600_000_000));
}

#[test]
fn test_add_path() {
    let tmp = test_temp_dir();
    let paths = write_files(tmp.path(), &[("docs/readme.md", b"# readme\n")]);

    let mut zip = ZipBuilder::new();
    zip.add_path(&paths[0], None).unwrap();
    zip.add_path(&paths[0], Some("renamed\\copy.md")).unwrap();
    let out = zip.file();

    let entries = list_zip(&out);
    assert_eq!(entries[0].name, "readme.md");
    assert_eq!(entries[1].name, "renamed/copy.md");
    assert_eq!(zip_entry_data(&out, &entries[1]), b"# readme\n");
}

#[test]
fn test_write_to() {
    let tmp = test_temp_dir();
    let target = tmp.path().join("out.zip");

    let mut zip = ZipBuilder::new();
    zip.add_file(b"abc", "a", 0).unwrap();
    zip.write_to(&target).unwrap();

    assert_eq!(fs::read(&target).unwrap(), zip.file());
}

#[test]
fn test_create_zip_convenience() {
    let tmp = test_temp_dir();
    let paths = write_files(tmp.path(), &[("one.txt", b"1"), ("two.txt", b"22")]);
    let target = tmp.path().join("both.zip");

    archive_rs::create_zip(&target, &paths).unwrap();

    let out = fs::read(&target).unwrap();
    let names: Vec<_> = list_zip(&out).into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["one.txt", "two.txt"]);
}
