//! Page-addressed storage used by `CodecSet::rekey`

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Error, ErrorCode, Result};

/// Page number, 1-based like the pager's
pub type Pgno = u32;

pub trait PageStore {
    fn page_size(&self) -> usize;

    fn page_count(&self) -> Result<Pgno>;

    /// Fill `buf` with page `pgno`; pages past the end read as zeros
    fn read_page(&mut self, pgno: Pgno, buf: &mut [u8]) -> Result<()>;

    fn write_page(&mut self, pgno: Pgno, buf: &[u8]) -> Result<()>;
}

fn check_pgno(pgno: Pgno) -> Result<()> {
    if pgno == 0 {
        return Err(Error::new(ErrorCode::Corrupt));
    }
    Ok(())
}

fn check_len(buf_len: usize, page_size: usize) -> Result<()> {
    if buf_len != page_size {
        return Err(Error::with_message(
            ErrorCode::Misuse,
            format!("page buffer is {} bytes, page size is {}", buf_len, page_size),
        ));
    }
    Ok(())
}

fn check_page_size(page_size: usize) -> Result<()> {
    if page_size == 0 {
        return Err(Error::with_message(ErrorCode::Misuse, "page size must be non-zero"));
    }
    Ok(())
}

// ============================================================================
// File Store
// ============================================================================

#[derive(Debug)]
pub struct FilePageStore {
    file: File,
    page_size: usize,
}

impl FilePageStore {
    pub fn open(path: impl AsRef<Path>, page_size: usize) -> Result<Self> {
        check_page_size(page_size)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| Error::with_message(ErrorCode::CantOpen, e.to_string()))?;
        Ok(Self { file, page_size })
    }

    pub fn from_file(file: File, page_size: usize) -> Result<Self> {
        check_page_size(page_size)?;
        Ok(Self { file, page_size })
    }

    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    fn offset(&self, pgno: Pgno) -> u64 {
        (pgno as u64 - 1) * self.page_size as u64
    }
}

impl PageStore for FilePageStore {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn page_count(&self) -> Result<Pgno> {
        let size = self.file.metadata()?.len();
        Ok((size / self.page_size as u64) as Pgno)
    }

    fn read_page(&mut self, pgno: Pgno, buf: &mut [u8]) -> Result<()> {
        check_pgno(pgno)?;
        check_len(buf.len(), self.page_size)?;
        self.file.seek(SeekFrom::Start(self.offset(pgno)))?;
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.file.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        // short read past EOF
        buf[filled..].fill(0);
        Ok(())
    }

    fn write_page(&mut self, pgno: Pgno, buf: &[u8]) -> Result<()> {
        check_pgno(pgno)?;
        check_len(buf.len(), self.page_size)?;
        self.file.seek(SeekFrom::Start(self.offset(pgno)))?;
        self.file.write_all(buf)?;
        Ok(())
    }
}

// ============================================================================
// Memory Store
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemPageStore {
    pages: Vec<Vec<u8>>,
    page_size: usize,
}

impl MemPageStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            pages: Vec::new(),
            page_size,
        }
    }

    /// Raw page contents as stored, for inspection
    pub fn page(&self, pgno: Pgno) -> Option<&[u8]> {
        let idx = (pgno as usize).checked_sub(1)?;
        self.pages.get(idx).map(Vec::as_slice)
    }
}

impl PageStore for MemPageStore {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn page_count(&self) -> Result<Pgno> {
        Ok(self.pages.len() as Pgno)
    }

    fn read_page(&mut self, pgno: Pgno, buf: &mut [u8]) -> Result<()> {
        check_pgno(pgno)?;
        check_len(buf.len(), self.page_size)?;
        match self.pages.get(pgno as usize - 1) {
            Some(page) => buf.copy_from_slice(page),
            None => buf.fill(0),
        }
        Ok(())
    }

    fn write_page(&mut self, pgno: Pgno, buf: &[u8]) -> Result<()> {
        check_pgno(pgno)?;
        check_len(buf.len(), self.page_size)?;
        let idx = pgno as usize - 1;
        if idx >= self.pages.len() {
            self.pages.resize(idx + 1, vec![0u8; self.page_size]);
        }
        self.pages[idx].copy_from_slice(buf);
        Ok(())
    }
}
