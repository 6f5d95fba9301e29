//! AES-256-CBC page encryption

use aes::Aes256;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use sha2::{Digest, Sha256};

use super::store::Pgno;
use super::PageCodec;
use crate::error::{Error, ErrorCode, Result};
use crate::util::log::{ext_log, LogLevel};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Header string at the start of every plaintext database file
pub const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

const MIN_PAGE_SIZE: usize = 512;
const BLOCK: usize = 16;
const KEY_CHECK_SALT: &[u8] = b"rustql-ext key check";

/// Page 1 bytes 16..24 (page size, format versions, reserved bytes) stay
/// readable so the pager can size pages before it has a key.
const HEADER_CLEAR: std::ops::Range<usize> = 16..24;

fn check_page_size(page_size: usize) -> Result<()> {
    if page_size < MIN_PAGE_SIZE || page_size % BLOCK != 0 {
        return Err(Error::with_message(
            ErrorCode::Misuse,
            format!("unsupported page size for encryption: {}", page_size),
        ));
    }
    Ok(())
}

/// Turn a user key into the 32-byte cipher key
///
/// `x'<64 hex digits>'` is taken as the raw key; anything else is a
/// passphrase and hashed with SHA-256.
pub fn derive_key(key: &[u8]) -> Result<[u8; 32]> {
    if key.is_empty() {
        return Err(Error::with_message(ErrorCode::Misuse, "empty encryption key"));
    }
    let raw_form = key.len() == 67
        && (key[0] == b'x' || key[0] == b'X')
        && key[1] == b'\''
        && key[66] == b'\'';
    if raw_form {
        let mut out = [0u8; 32];
        hex::decode_to_slice(&key[2..66], &mut out)
            .map_err(|e| Error::with_message(ErrorCode::Misuse, format!("bad raw key: {}", e)))?;
        return Ok(out);
    }
    Ok(Sha256::digest(key).into())
}

#[derive(Clone)]
pub struct AesPageCodec {
    key: [u8; 32],
    page_size: usize,
    reserve: usize,
}

impl std::fmt::Debug for AesPageCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesPageCodec")
            .field("page_size", &self.page_size)
            .field("reserve", &self.reserve)
            .finish_non_exhaustive()
    }
}

impl AesPageCodec {
    pub fn new(key: &[u8]) -> Result<Self> {
        Ok(Self {
            key: derive_key(key)?,
            page_size: 4096,
            reserve: 0,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn reserve(&self) -> usize {
        self.reserve
    }

    fn iv(&self, pgno: Pgno) -> [u8; 16] {
        let digest = Sha256::new()
            .chain_update(self.key)
            .chain_update(pgno.to_le_bytes())
            .finalize();
        let mut iv = [0u8; 16];
        iv.copy_from_slice(&digest[..16]);
        iv
    }

    fn key_tag(&self) -> [u8; 8] {
        let digest = Sha256::new()
            .chain_update(KEY_CHECK_SALT)
            .chain_update(self.key)
            .finalize();
        let mut tag = [0u8; 8];
        tag.copy_from_slice(&digest[..8]);
        tag
    }

    fn encrypt(&self, pgno: Pgno, buf: &mut [u8]) -> Result<()> {
        let len = buf.len();
        Aes256CbcEnc::new(&self.key.into(), &self.iv(pgno).into())
            .encrypt_padded_mut::<NoPadding>(buf, len)
            .map_err(|_| Error::with_message(ErrorCode::Internal, "page encryption failed"))?;
        Ok(())
    }

    fn decrypt(&self, pgno: Pgno, buf: &mut [u8]) -> Result<()> {
        Aes256CbcDec::new(&self.key.into(), &self.iv(pgno).into())
            .decrypt_padded_mut::<NoPadding>(buf)
            .map_err(|_| Error::with_message(ErrorCode::Internal, "page decryption failed"))?;
        Ok(())
    }
}

impl PageCodec for AesPageCodec {
    fn encode(&self, page: &mut [u8], pgno: Pgno) -> Result<()> {
        check_page_size(page.len())?;
        if pgno != 1 {
            return self.encrypt(pgno, page);
        }

        let mut header = [0u8; 8];
        header.copy_from_slice(&page[HEADER_CLEAR]);
        self.encrypt(pgno, &mut page[16..])?;
        // displaced ciphertext goes where the magic string's tail was
        page.copy_within(HEADER_CLEAR, 8);
        page[HEADER_CLEAR].copy_from_slice(&header);
        page[..8].copy_from_slice(&self.key_tag());
        Ok(())
    }

    fn decode(&self, page: &mut [u8], pgno: Pgno) -> Result<()> {
        check_page_size(page.len())?;
        if pgno != 1 {
            return self.decrypt(pgno, page);
        }

        if page[..8] != self.key_tag() {
            ext_log(LogLevel::Error, "codec: key does not match page 1");
            return Err(Error::new(ErrorCode::NotADb));
        }
        let mut header = [0u8; 8];
        header.copy_from_slice(&page[HEADER_CLEAR]);
        page.copy_within(8..16, 16);
        self.decrypt(pgno, &mut page[16..])?;
        if page[HEADER_CLEAR] != header {
            ext_log(LogLevel::Error, "codec: page 1 header mismatch after decryption");
            return Err(Error::new(ErrorCode::NotADb));
        }
        page[..16].copy_from_slice(SQLITE_MAGIC);
        Ok(())
    }

    fn page_size_changed(&mut self, page_size: usize, reserve: usize) -> Result<()> {
        check_page_size(page_size)?;
        self.page_size = page_size;
        self.reserve = reserve;
        Ok(())
    }

    fn key(&self) -> &[u8] {
        &self.key
    }
}
