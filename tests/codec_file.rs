//! Page codec against a real database file.

#![cfg(feature = "codec")]

use std::fs;

use rustql_ext::codec::{CodecSet, FilePageStore, PageStore, SQLITE_MAGIC};
use rustql_ext::ErrorCode;
use tempfile::tempdir;

const PAGE_SIZE: usize = 1024;

fn write_plain_db(store: &mut FilePageStore, pages: u32) -> Vec<Vec<u8>> {
    let mut written = Vec::new();
    for pgno in 1..=pages {
        let mut page = vec![0u8; PAGE_SIZE];
        for (i, b) in page.iter_mut().enumerate() {
            *b = (i as u32 * 31 + pgno * 7) as u8;
        }
        if pgno == 1 {
            page[..16].copy_from_slice(SQLITE_MAGIC);
            page[16..18].copy_from_slice(&(PAGE_SIZE as u16).to_be_bytes());
        }
        store.write_page(pgno, &page).unwrap();
        written.push(page);
    }
    written
}

fn read_all(store: &mut FilePageStore) -> Vec<Vec<u8>> {
    let count = store.page_count().unwrap();
    (1..=count)
        .map(|pgno| {
            let mut page = vec![0u8; PAGE_SIZE];
            store.read_page(pgno, &mut page).unwrap();
            page
        })
        .collect()
}

#[test]
fn encrypt_reopen_and_decrypt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("enc.db");

    let plain = {
        let mut store = FilePageStore::open(&path, PAGE_SIZE).unwrap();
        let plain = write_plain_db(&mut store, 4);
        let mut codecs = CodecSet::new();
        codecs.rekey("main", b"correct horse", &mut store).unwrap();
        store.sync().unwrap();
        plain
    };

    let raw = fs::read(&path).unwrap();
    assert_eq!(raw.len(), 4 * PAGE_SIZE);
    assert_ne!(&raw[..16], SQLITE_MAGIC.as_slice());
    // page size stays readable
    assert_eq!(&raw[16..18], &(PAGE_SIZE as u16).to_be_bytes());

    // a fresh connection keys the schema and reads pages through the codec
    let mut store = FilePageStore::open(&path, PAGE_SIZE).unwrap();
    let mut codecs = CodecSet::new();
    codecs.attach(0, b"correct horse").unwrap();
    let codec = codecs.codec("main").unwrap();
    for (i, encrypted) in read_all(&mut store).into_iter().enumerate() {
        let mut page = encrypted;
        codec.decode(&mut page, i as u32 + 1).unwrap();
        assert_eq!(page, plain[i], "page {}", i + 1);
    }

    codecs.rekey("main", b"", &mut store).unwrap();
    assert_eq!(read_all(&mut store), plain);
}

#[test]
fn wrong_key_reports_not_a_database() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wrong.db");
    let mut store = FilePageStore::open(&path, PAGE_SIZE).unwrap();
    write_plain_db(&mut store, 2);

    let mut codecs = CodecSet::new();
    codecs.rekey("main", b"right", &mut store).unwrap();
    let before = read_all(&mut store);

    let mut other = CodecSet::new();
    other.key("main", b"wrong").unwrap();
    let mut page1 = before[0].clone();
    let err = other.codec("main").unwrap().decode(&mut page1, 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::NotADb);

    assert_eq!(other.rekey("main", b"x", &mut store).unwrap_err().code, ErrorCode::NotADb);
    assert_eq!(read_all(&mut store), before);
}

#[test]
fn raw_hex_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hex.db");
    let mut store = FilePageStore::open(&path, PAGE_SIZE).unwrap();
    let plain = write_plain_db(&mut store, 1);

    let key = format!("x'{}'", "0f".repeat(32));
    let mut codecs = CodecSet::new();
    codecs.rekey("main", key.as_bytes(), &mut store).unwrap();
    assert_eq!(codecs.get_key("main"), Some([0x0f; 32].as_slice()));

    let mut page = read_all(&mut store).remove(0);
    codecs.codec("main").unwrap().decode(&mut page, 1).unwrap();
    assert_eq!(page, plain[0]);
}
