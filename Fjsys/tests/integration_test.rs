use std::io::{Cursor, Read, Seek, SeekFrom};

use fjsys::prelude::*;
use fjsys::codec::{ImageCodec, ScriptCodec};
use image::{ImageFormat, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn pack_to_vec(files: Vec<ArchiveFile>) -> Vec<u8> {
    let mut sink = Cursor::new(Vec::new());
    pack(&mut sink, files, &CodecRegistry::default(), &PackOptions::default()).unwrap();
    sink.into_inner()
}

fn unpack_all(bytes: Vec<u8>, options: &UnpackOptions) -> Vec<ArchiveFile> {
    let codecs = CodecRegistry::default();
    let mut reader = FjsysReader::open(Cursor::new(bytes)).unwrap();
    reader
        .unpack(&codecs, options)
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap()
}

fn table_names(bytes: Vec<u8>) -> Vec<String> {
    let mut reader = FjsysReader::open(Cursor::new(bytes)).unwrap();
    reader
        .list()
        .unwrap()
        .iter()
        .map(TableEntry::name_lossy)
        .collect()
}

fn tiny_png() -> Vec<u8> {
    let img = RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 255]));
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    png
}

/// Counts every byte handed out and every seek.
struct CountingReader<R> {
    inner: R,
    bytes_read: usize,
    seeks: usize,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bytes_read += n;
        Ok(n)
    }
}

impl<R: Seek> Seek for CountingReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.seeks += 1;
        self.inner.seek(pos)
    }
}

#[test]
fn test_table_order_is_independent_of_input_order() {
    let names = ["a0.txt", "a_b.txt", "A.txt"];
    let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

    for order in orders {
        let files = order
            .iter()
            .map(|&i| ArchiveFile::new(names[i], names[i]))
            .collect();
        assert_eq!(
            table_names(pack_to_vec(files)),
            vec!["A.txt", "a_b.txt", "a0.txt"]
        );
    }
}

#[test]
fn test_collation_example() {
    let files = vec![
        ArchiveFile::new("a0.txt", "3"),
        ArchiveFile::new("a.txt", "1"),
        ArchiveFile::new("a_b.txt", "2"),
    ];
    assert_eq!(
        table_names(pack_to_vec(files)),
        vec!["a.txt", "a_b.txt", "a0.txt"]
    );
}

#[test]
fn test_round_trip_preserves_contents() {
    let png = tiny_png();
    let files = vec![
        ArchiveFile::new("system/config.msd", "#config\nwindow 800 600\n"),
        ArchiveFile::new("bg_01.mgd", png.clone()),
        ArchiveFile::new("readme.txt", "plain"),
        ArchiveFile::new("empty.dat", Vec::<u8>::new()),
    ];

    let mut unpacked = unpack_all(pack_to_vec(files.clone()), &UnpackOptions::default());
    let mut expected = files;
    unpacked.sort_by(|a, b| a.name.cmp(&b.name));
    expected.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(unpacked, expected);
}

#[test]
fn test_round_trip_of_unpacked_archive() {
    let first = pack_to_vec(vec![
        ArchiveFile::new("b.msd", "script b"),
        ArchiveFile::new("a.mgd", tiny_png()),
    ]);
    let mut unpacked = unpack_all(first.clone(), &UnpackOptions::default());
    unpacked.reverse();
    let second = pack_to_vec(unpacked);

    assert_eq!(table_names(first), table_names(second));
}

#[test]
fn test_header_arithmetic() {
    let files = vec![
        ArchiveFile::new("one", "1"),
        ArchiveFile::new("two", "22"),
        ArchiveFile::new("three", "333"),
    ];
    let mut sink = Cursor::new(Vec::new());
    let codecs = CodecRegistry::default();
    let header = pack(&mut sink, files, &codecs, &PackOptions::default()).unwrap();

    assert_eq!(header.file_count, 3);
    assert_eq!(header.file_names_size, 4 + 4 + 6);
    assert_eq!(
        u64::from(header.header_size - header.file_names_size),
        u64::from(header.file_count) * 16 + 84
    );

    let reader = FjsysReader::open(Cursor::new(sink.into_inner())).unwrap();
    assert_eq!(reader.header(), &header);
    assert!(reader.header().is_consistent());
}

#[test]
fn test_empty_archive() {
    let bytes = pack_to_vec(Vec::new());
    let reader = FjsysReader::open(Cursor::new(bytes.clone())).unwrap();
    assert_eq!(
        reader.header(),
        &FjsysHeader {
            header_size: 84,
            file_names_size: 0,
            file_count: 0,
        }
    );
    assert!(unpack_all(bytes, &UnpackOptions::default()).is_empty());
}

#[test]
fn test_magic_mismatch_reads_nothing_more() {
    let mut bytes = b"NOTFJSYS".to_vec();
    bytes.extend_from_slice(&[0xAA; 200]);
    let mut counting = CountingReader {
        inner: Cursor::new(bytes),
        bytes_read: 0,
        seeks: 0,
    };

    let result = FjsysReader::open(&mut counting).map(|_| ());
    match result {
        Err(Error::InvalidMagic { found }) => assert_eq!(&found, b"NOTFJSYS"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(()) => panic!("garbage accepted as an archive"),
    }
    assert_eq!(counting.bytes_read, 8);
    assert_eq!(counting.seeks, 0);
}

#[test]
fn test_truncated_archive_is_format_error() {
    let mut bytes = pack_to_vec(vec![ArchiveFile::new("a", "1"), ArchiveFile::new("b", "2")]);
    bytes.truncate(84 + 20);

    let codecs = CodecRegistry::default();
    let options = UnpackOptions::default();
    let mut reader = FjsysReader::open(Cursor::new(bytes)).unwrap();
    let results: Vec<_> = reader.unpack(&codecs, &options).unwrap().collect();

    assert_eq!(results.len(), 1);
    let err = results.into_iter().next().unwrap().unwrap_err();
    // The first record is complete but its name lies past the end
    assert!(matches!(err, Error::UnterminatedName { index: 0 }));
    assert!(err.is_format_error());
}

#[test]
fn test_truncated_table() {
    let mut bytes = pack_to_vec(vec![ArchiveFile::new("a", "1"), ArchiveFile::new("b", "2")]);
    // Cut inside the first table record
    bytes.truncate(84 + 8);

    let codecs = CodecRegistry::default();
    let options = UnpackOptions::default();
    let mut reader = FjsysReader::open(Cursor::new(bytes)).unwrap();
    let mut iter = reader.unpack(&codecs, &options).unwrap();

    let err = iter.next().unwrap().unwrap_err();
    assert!(matches!(err, Error::TruncatedTable { index: 0 }));
    assert!(err.is_format_error());
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());
}

#[test]
fn test_unterminated_name() {
    let mut bytes = pack_to_vec(vec![ArchiveFile::new("name", "data")]);
    // Replace the name terminator with a printable byte and cut the data
    let terminator = 84 + 16 + 4;
    bytes[terminator] = b'!';
    bytes.truncate(terminator + 1);

    let codecs = CodecRegistry::default();
    let options = UnpackOptions::default();
    let mut reader = FjsysReader::open(Cursor::new(bytes)).unwrap();
    let mut iter = reader.unpack(&codecs, &options).unwrap();
    assert!(matches!(
        iter.next(),
        Some(Err(Error::UnterminatedName { index: 0 }))
    ));
    assert!(iter.next().is_none());
}

#[test]
fn test_image_signature_beats_script_extension() {
    let png = tiny_png();
    let mgd = MgdCodec.encode(&png).unwrap();

    // Stored under a script name; the script encoder leaves it untouched
    let bytes = pack_to_vec(vec![ArchiveFile::new("disguised.msd", mgd)]);
    let options = UnpackOptions::new().with_script_key("KEY");
    let files = unpack_all(bytes, &options);

    assert_eq!(files, vec![ArchiveFile::new("disguised.msd", png)]);
}

#[test]
fn test_script_decoded_with_key() {
    let plain = b"#scene 001\ntext \"hello\"\n".repeat(5);
    let encrypted = MsdCodec.decode(&plain, Some(b"TITLEKEY")).unwrap();
    assert_ne!(encrypted, plain);

    let bytes = pack_to_vec(vec![ArchiveFile::new("SCENE.MSD", encrypted.clone())]);

    let with_key = unpack_all(bytes.clone(), &UnpackOptions::new().with_script_key("TITLEKEY"));
    assert_eq!(with_key[0].data, plain);

    let without_key = unpack_all(bytes, &UnpackOptions::default());
    assert_eq!(without_key[0].data, encrypted);
}

#[test]
fn test_parallel_unpack_matches_sequential() {
    let files: Vec<ArchiveFile> = (0..40)
        .map(|i| ArchiveFile::new(format!("file_{i:02}.msd"), format!("script {i}")))
        .chain(std::iter::once(ArchiveFile::new("bg.mgd", tiny_png())))
        .collect();
    let bytes = pack_to_vec(files);
    let codecs = CodecRegistry::default();
    let options = UnpackOptions::new().with_script_key("K");

    let sequential = unpack_all(bytes.clone(), &options);
    let mut reader = FjsysReader::open(Cursor::new(bytes)).unwrap();
    let parallel = reader.unpack_parallel(&codecs, &options).unwrap();

    assert_eq!(sequential, parallel);
}

#[test]
fn test_create_and_extract_directory() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("source");
    std::fs::create_dir_all(source.join("sub")).unwrap();
    std::fs::write(source.join("a.txt"), "alpha").unwrap();
    std::fs::write(source.join("scene.msd"), "#scene").unwrap();
    std::fs::write(source.join("sub").join("b_c.txt"), "nested").unwrap();
    std::fs::write(source.join(".DS_Store"), "junk").unwrap();

    let archive = temp.path().join("data.bin");
    let codecs = CodecRegistry::default();
    let header =
        FjsysOperations::create(&source, &archive, &codecs, &PackOptions::default()).unwrap();
    assert_eq!(header.file_count, 3);

    let names: Vec<String> = FjsysOperations::list(&archive)
        .unwrap()
        .iter()
        .map(TableEntry::name_lossy)
        .collect();
    assert_eq!(names, vec!["a.txt", "scene.msd", "sub/b_c.txt"]);

    let info = FjsysOperations::info(&archive, &codecs).unwrap();
    assert_eq!(info.file_count, 3);
    assert_eq!(info.script_count, 1);
    assert_eq!(info.image_count, 0);
    assert_eq!(info.data_size, 5 + 6 + 6);
    assert!(info.consistent);

    let output = temp.path().join("output");
    let count =
        FjsysOperations::extract(&archive, &output, &codecs, &UnpackOptions::default()).unwrap();
    assert_eq!(count, 3);
    assert_eq!(std::fs::read_to_string(output.join("a.txt")).unwrap(), "alpha");
    assert_eq!(std::fs::read_to_string(output.join("scene.msd")).unwrap(), "#scene");
    assert_eq!(
        std::fs::read_to_string(output.join("sub").join("b_c.txt")).unwrap(),
        "nested"
    );
    assert!(!output.join(".DS_Store").exists());
}

#[test]
fn test_extract_refuses_escaping_names() {
    let temp = tempdir().unwrap();
    let archive = temp.path().join("evil.bin");
    std::fs::write(
        &archive,
        pack_to_vec(vec![
            ArchiveFile::new("fine.txt", "ok"),
            ArchiveFile::new("../escaped.txt", "nope"),
        ]),
    )
    .unwrap();

    let output = temp.path().join("output");
    let result = FjsysOperations::extract(
        &archive,
        &output,
        &CodecRegistry::default(),
        &UnpackOptions::default(),
    );

    assert!(matches!(result, Err(Error::InvalidPath(_))));
    assert!(!temp.path().join("escaped.txt").exists());
    assert!(!output.join("fine.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_extract_keeps_non_utf8_names() {
    use std::os::unix::ffi::OsStrExt;

    let first: &[u8] = b"\x82\xa0.txt";
    let second: &[u8] = b"\x82\xa2.txt";
    let temp = tempdir().unwrap();
    let archive = temp.path().join("sjis.bin");
    std::fs::write(
        &archive,
        pack_to_vec(vec![
            ArchiveFile::new(first, "first"),
            ArchiveFile::new(second, "second"),
        ]),
    )
    .unwrap();

    let codecs = CodecRegistry::default();
    let output = temp.path().join("output");
    let count =
        FjsysOperations::extract(&archive, &output, &codecs, &UnpackOptions::default()).unwrap();
    assert_eq!(count, 2);
    let read = |name: &[u8]| {
        std::fs::read_to_string(output.join(std::ffi::OsStr::from_bytes(name))).unwrap()
    };
    assert_eq!(read(first), "first");
    assert_eq!(read(second), "second");

    let repacked = temp.path().join("repacked.bin");
    FjsysOperations::create(&output, &repacked, &codecs, &PackOptions::default()).unwrap();
    let names: Vec<Vec<u8>> = FjsysOperations::list(&repacked)
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, vec![first.to_vec(), second.to_vec()]);
}

#[test]
fn test_extract_case_collision_keeps_later_entry() {
    let temp = tempdir().unwrap();
    let archive = temp.path().join("case.bin");
    std::fs::write(
        &archive,
        pack_to_vec(vec![
            ArchiveFile::new("A.txt", "upper"),
            ArchiveFile::new("a.txt", "lower"),
        ]),
    )
    .unwrap();

    let output = temp.path().join("output");
    let count = FjsysOperations::extract(
        &archive,
        &output,
        &CodecRegistry::default(),
        &UnpackOptions::default(),
    )
    .unwrap();

    // Holds on both case-sensitive and case-insensitive file systems
    assert_eq!(count, 2);
    assert_eq!(std::fs::read_to_string(output.join("a.txt")).unwrap(), "lower");
}

#[test]
fn test_create_from_missing_directory() {
    let temp = tempdir().unwrap();
    let result = FjsysOperations::create(
        temp.path().join("missing"),
        temp.path().join("out.bin"),
        &CodecRegistry::default(),
        &PackOptions::default(),
    );
    assert!(matches!(result, Err(Error::InvalidPath(_))));
}

#[test]
fn test_is_fjsys() {
    let mut archive = Cursor::new(pack_to_vec(vec![ArchiveFile::new("a", "b")]));
    assert!(is_fjsys(&mut archive).unwrap());
    assert!(!is_fjsys(&mut Cursor::new(tiny_png())).unwrap());
}
