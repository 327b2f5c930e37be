//! Append-only actions log.
//!
//! The log is a flat file of variable-length blocks. A block is one count
//! byte followed by `count` packed action records; its address is the byte
//! offset of the count byte. Blocks are never moved or deleted. The only
//! in-place mutation is rewriting the 16-byte visits/points prefix of an
//! existing record.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::StoreError;
use crate::record::{pack_stats, ActionRecord, ACTION_LEN};

/// Append-only file of actions blocks.
#[derive(Debug)]
pub struct ActionsLog {
    file: File,
}

impl ActionsLog {
    /// Open the log for reading and writing, creating the file if needed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self { file })
    }

    /// Append a block and return the address of its count byte.
    pub fn append_block(&mut self, records: &[ActionRecord]) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Err(StoreError::EmptyBlock);
        }
        if records.len() > u8::MAX as usize {
            return Err(StoreError::BlockTooLarge(records.len()));
        }

        let mut buf = vec![0u8; 1 + records.len() * ACTION_LEN];
        buf[0] = records.len() as u8;
        for (i, record) in records.iter().enumerate() {
            let offset = 1 + i * ACTION_LEN;
            record.pack(&mut buf[offset..offset + ACTION_LEN]);
        }

        let addr = self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&buf)?;

        Ok(addr)
    }

    /// Read the block at `addr`. Short reads are fatal.
    pub fn read_block(&mut self, addr: u64) -> Result<Vec<ActionRecord>, StoreError> {
        self.file.seek(SeekFrom::Start(addr))?;

        let mut count = [0u8; 1];
        self.file.read_exact(&mut count)?;
        let count = count[0] as usize;

        let mut buf = vec![0u8; count * ACTION_LEN];
        self.file.read_exact(&mut buf)?;

        Ok(buf
            .chunks_exact(ACTION_LEN)
            .map(ActionRecord::unpack)
            .collect())
    }

    /// Read a single record out of the block at `addr`.
    pub fn read_record(&mut self, addr: u64, index: u64) -> Result<ActionRecord, StoreError> {
        self.file
            .seek(SeekFrom::Start(record_addr(addr, index)))?;

        let mut buf = [0u8; ACTION_LEN];
        self.file.read_exact(&mut buf)?;

        Ok(ActionRecord::unpack(&buf))
    }

    /// Overwrite the visits/points prefix of one record in place.
    pub fn update_stats(
        &mut self,
        addr: u64,
        index: u64,
        visits: u64,
        points: u64,
    ) -> Result<(), StoreError> {
        self.file
            .seek(SeekFrom::Start(record_addr(addr, index)))?;
        self.file.write_all(&pack_stats(visits, points))?;

        Ok(())
    }

    /// Walk every block in file order (dump and integrity checks).
    pub fn for_each_block<F>(&mut self, mut f: F) -> Result<(), StoreError>
    where
        F: FnMut(u64, &[ActionRecord]),
    {
        let len = self.file.seek(SeekFrom::End(0))?;
        let mut addr = 0u64;

        while addr < len {
            let records = self.read_block(addr)?;
            f(addr, &records);
            addr += 1 + (records.len() * ACTION_LEN) as u64;
        }

        Ok(())
    }

    /// Current file length in bytes.
    pub fn len(&mut self) -> Result<u64, StoreError> {
        Ok(self.file.seek(SeekFrom::End(0))?)
    }

    /// True when no block has been appended yet.
    pub fn is_empty(&mut self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Push buffered writes to disk.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.file.sync_all()?;
        Ok(())
    }
}

fn record_addr(block_addr: u64, index: u64) -> u64 {
    block_addr + 1 + ACTION_LEN as u64 * index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NodeKey;
    use engine_core::Move;

    fn record(x: u8, y: u8) -> ActionRecord {
        ActionRecord::new(Move::place(x, y), NodeKey::new("12", true))
    }

    fn open_log(dir: &tempfile::TempDir) -> ActionsLog {
        ActionsLog::open(&dir.path().join("actions.bin")).unwrap()
    }

    #[test]
    fn first_block_lands_at_address_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = open_log(&dir);

        let addr = log.append_block(&[record(0, 0)]).unwrap();
        assert_eq!(addr, 0);
        assert_eq!(log.len().unwrap(), 1 + ACTION_LEN as u64);
    }

    #[test]
    fn blocks_are_appended_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = open_log(&dir);

        let first = log.append_block(&[record(0, 0)]).unwrap();
        let second = log
            .append_block(&[record(1, 0), record(1, 1)])
            .unwrap();

        assert_eq!(first, 0);
        assert_eq!(second, 37);

        let block = log.read_block(second).unwrap();
        assert_eq!(block.len(), 2);
        assert_eq!(block[1].game_move(), Move::place(1, 1));
    }

    #[test]
    fn empty_blocks_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = open_log(&dir);

        assert!(matches!(
            log.append_block(&[]),
            Err(StoreError::EmptyBlock)
        ));
    }

    #[test]
    fn oversized_blocks_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = open_log(&dir);

        let records = vec![record(0, 0); 256];
        assert!(matches!(
            log.append_block(&records),
            Err(StoreError::BlockTooLarge(256))
        ));
    }

    #[test]
    fn stat_updates_touch_only_the_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = open_log(&dir);

        let addr = log
            .append_block(&[record(0, 0), record(2, 1)])
            .unwrap();
        log.update_stats(addr, 1, 4, 6).unwrap();

        let updated = log.read_record(addr, 1).unwrap();
        assert_eq!(updated.visits, 4);
        assert_eq!(updated.points, 6);
        assert_eq!(updated.game_move(), Move::place(2, 1));

        // Neighbouring record is untouched
        let untouched = log.read_record(addr, 0).unwrap();
        assert_eq!(untouched.visits, 0);
    }

    #[test]
    fn reading_past_the_end_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = open_log(&dir);

        log.append_block(&[record(0, 0)]).unwrap();
        assert!(matches!(log.read_block(1000), Err(StoreError::Io(_))));
    }

    #[test]
    fn for_each_block_walks_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = open_log(&dir);

        log.append_block(&[record(0, 0)]).unwrap();
        log.append_block(&[record(1, 0), record(1, 1)]).unwrap();

        let mut seen = Vec::new();
        log.for_each_block(|addr, records| seen.push((addr, records.len())))
            .unwrap();

        assert_eq!(seen, vec![(0, 1), (37, 2)]);
    }
}
