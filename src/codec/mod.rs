//! Page codec hook
//!
//! A codec transforms every page on its way to and from disk. `CodecSet`
//! tracks which attached schema is keyed, and implements key, rekey and
//! attach the way the `sqlite3_key_v2` family does.

mod aes256;
mod store;

use std::collections::HashMap;

pub use self::aes256::{derive_key, AesPageCodec, SQLITE_MAGIC};
pub use self::store::{FilePageStore, MemPageStore, PageStore, Pgno};

use crate::error::{Error, ErrorCode, Result};

pub trait PageCodec: Send + Sync {
    /// Called before page `pgno` is written
    fn encode(&self, page: &mut [u8], pgno: Pgno) -> Result<()>;

    /// Called after page `pgno` is read
    fn decode(&self, page: &mut [u8], pgno: Pgno) -> Result<()>;

    fn page_size_changed(&mut self, page_size: usize, reserve: usize) -> Result<()>;

    fn key(&self) -> &[u8];
}

/// Schema name for a database index: 0 is main, 1 is temp
pub fn schema_name(n_db: usize) -> String {
    match n_db {
        0 => "main".to_string(),
        1 => "temp".to_string(),
        n => format!("aux{}", n),
    }
}

/// Codecs by schema name
#[derive(Debug, Default)]
pub struct CodecSet {
    codecs: HashMap<String, AesPageCodec>,
}

impl CodecSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key (or with an empty key, unkey) schema `db`
    pub fn key(&mut self, db: &str, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            self.codecs.remove(db);
            tracing::debug!(db, "codec detached");
            return Ok(());
        }
        let codec = AesPageCodec::new(key)?;
        self.codecs.insert(db.to_string(), codec);
        tracing::debug!(db, "codec attached");
        Ok(())
    }

    /// Attach by schema index, as the pager does when it opens a database
    pub fn attach(&mut self, n_db: usize, key: &[u8]) -> Result<()> {
        self.key(&schema_name(n_db), key)
    }

    /// The derived key of schema `db`, if keyed
    pub fn get_key(&self, db: &str) -> Option<&[u8]> {
        self.codecs.get(db).map(|c| c.key())
    }

    pub fn codec(&self, db: &str) -> Option<&dyn PageCodec> {
        self.codecs.get(db).map(|c| c as &dyn PageCodec)
    }

    /// Re-encrypt every page of `store` under `new_key`
    ///
    /// Pages are decoded with the current codec of `db` (or read as
    /// plaintext if there is none). An empty `new_key` leaves the database
    /// decrypted. Page 1 is checked against the current key before anything
    /// is rewritten.
    pub fn rekey(&mut self, db: &str, new_key: &[u8], store: &mut dyn PageStore) -> Result<()> {
        let page_size = store.page_size();
        let mut new_codec = if new_key.is_empty() {
            None
        } else {
            Some(AesPageCodec::new(new_key)?)
        };
        if let Some(codec) = new_codec.as_mut() {
            codec.page_size_changed(page_size, 0)?;
        }

        let old_codec = self.codecs.get(db);
        let count = store.page_count()?;
        let mut buf = vec![0u8; page_size];

        if count > 0 {
            store.read_page(1, &mut buf)?;
            match old_codec {
                Some(old) => old.decode(&mut buf, 1)?,
                None if buf[..16] != SQLITE_MAGIC[..] => {
                    return Err(Error::new(ErrorCode::NotADb));
                }
                None => {}
            }
        }

        for pgno in 1..=count {
            store.read_page(pgno, &mut buf)?;
            if let Some(old) = old_codec {
                old.decode(&mut buf, pgno)?;
            }
            if let Some(new) = &new_codec {
                new.encode(&mut buf, pgno)?;
            }
            store.write_page(pgno, &buf)?;
        }

        match new_codec {
            Some(codec) => {
                self.codecs.insert(db.to_string(), codec);
            }
            None => {
                self.codecs.remove(db);
            }
        }
        tracing::debug!(db, pages = count, encrypted = !new_key.is_empty(), "database rekeyed");
        Ok(())
    }
}
