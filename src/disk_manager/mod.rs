use crate::errors::Error;
use crate::pages::{Page, PageId, PAGE_SIZE};
use anyhow::{bail, ensure, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

#[cfg(test)]
pub fn test_path() -> String {
    use uuid::Uuid;
    format!("data/test/test_{}.db", Uuid::new_v4())
}

/// The paged-file collaborator: a single growable file addressed by
/// fixed-size block number, the way `openPageFile`/`readBlock`/
/// `writeBlock`/`ensureCapacity` work against one on-disk file.
#[derive(Debug)]
pub struct DiskManager {
    file: File,
    num_pages: usize,
}

impl DiskManager {
    /// Creates a brand new, empty page file. Fails if one already exists.
    pub fn create(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .with_context(|| format!("creating page file {path}"))?;
        Ok(DiskManager { file, num_pages: 0 })
    }

    /// Opens an existing page file, computing the page count from its size.
    pub fn open(path: &str) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("opening page file {path}"))?;
        let len = file.metadata()?.len() as usize;
        Ok(DiskManager {
            file,
            num_pages: len / PAGE_SIZE,
        })
    }

    pub fn destroy(path: &str) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("destroying page file {path}"))
    }

    pub fn get_num_pages(&self) -> usize {
        self.num_pages
    }

    pub fn read_page(&mut self, page_num: PageId, page: &mut Page) -> Result<()> {
        if page_num < 0 || page_num as usize >= self.num_pages {
            bail!(Error::ReadError);
        }
        self.file
            .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))
            .map_err(|_| Error::ReadError)?;
        self.file
            .read_exact(page.as_bytes_mut())
            .map_err(|_| Error::ReadError)?;
        page.set_page_id(page_num);
        page.clear_dirty();
        Ok(())
    }

    pub fn write_page(&mut self, page_num: PageId, page: &Page) -> Result<()> {
        ensure!(page_num >= 0, Error::WriteError);
        self.file
            .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))
            .map_err(|_| Error::WriteError)?;
        self.file
            .write_all(page.as_bytes())
            .map_err(|_| Error::WriteError)?;
        if page_num as usize >= self.num_pages {
            self.num_pages = page_num as usize + 1;
        }
        Ok(())
    }

    pub fn append_empty_page(&mut self) -> Result<PageId> {
        let new_id = self.num_pages as PageId;
        self.write_page(new_id, &Page::new())?;
        Ok(new_id)
    }

    /// Grows the file with zeroed pages until it has at least
    /// `page_num + 1` pages.
    pub fn ensure_capacity(&mut self, page_num: PageId) -> Result<()> {
        while (self.num_pages as PageId) <= page_num {
            self.append_empty_page()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() -> Result<()> {
        let path = test_path();
        let mut disk = DiskManager::create(&path)?;

        let mut page = Page::new();
        page.write_bytes(0, 4, b"abcd");
        disk.write_page(0, &page)?;

        let mut read_page = Page::new();
        disk.read_page(0, &mut read_page)?;
        assert_eq!(read_page.read_bytes(0, 4), b"abcd");
        assert_eq!(read_page.get_page_id(), 0);

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn test_ensure_capacity_grows_file() -> Result<()> {
        let path = test_path();
        let mut disk = DiskManager::create(&path)?;

        disk.ensure_capacity(3)?;
        assert_eq!(disk.get_num_pages(), 4);

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn test_read_out_of_range_is_read_error() -> Result<()> {
        let path = test_path();
        let mut disk = DiskManager::create(&path)?;
        let mut page = Page::new();

        let err = disk.read_page(0, &mut page).unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::ReadError));

        std::fs::remove_file(&path)?;
        Ok(())
    }
}
