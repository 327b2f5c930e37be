//! Persistent bucket-addressed hash map.
//!
//! Maps fixed-width keys to fixed-width values across two files: a map file
//! with a fixed array of root buckets, and an overflow file holding the
//! collision chains. Lookups and inserts are O(1) expected as long as the
//! creation-time bucket count is close to the real number of keys; past
//! that the chains simply grow.
//!
//! Record layout (identical in both files):
//! `occupied` (1 B) | key (K B) | value (V B) | `next` (8 B)
//!
//! `next` is the offset of the chain's next record in the overflow file.
//! Offset 0 falls inside the overflow header, so 0 doubles as the
//! end-of-chain marker and a zero-filled map file starts with every bucket
//! empty.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::error::StoreError;

const MAP_MAGIC: &[u8; 4] = b"ARBM";
const OVFL_MAGIC: &[u8; 4] = b"ARBO";
const FORMAT_VERSION: u32 = 1;

const MAP_HEADER_LEN: u64 = 32;
const OVFL_HEADER_LEN: u64 = 16;

const NO_NEXT: u64 = 0;

/// On-disk hash map with `K`-byte keys and `V`-byte values.
#[derive(Debug)]
pub struct DiskMap<const K: usize, const V: usize> {
    map: File,
    overflow: File,
    bucket_count: u64,
    overflow_end: u64,
}

/// Where a record lives: a root bucket or an overflow slot.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Bucket(u64),
    Overflow(u64),
}

struct RawRecord<const K: usize, const V: usize> {
    occupied: bool,
    key: [u8; K],
    value: [u8; V],
    next: u64,
}

impl<const K: usize, const V: usize> DiskMap<K, V> {
    const RECORD_LEN: u64 = 1 + K as u64 + V as u64 + 8;

    /// Create a fresh map sized for roughly `expected_keys` entries,
    /// truncating any existing files.
    pub fn create(
        map_path: &Path,
        overflow_path: &Path,
        expected_keys: u64,
    ) -> Result<Self, StoreError> {
        let bucket_count = expected_keys.max(1);

        let mut map = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(map_path)?;

        let mut header = [0u8; MAP_HEADER_LEN as usize];
        header[0..4].copy_from_slice(MAP_MAGIC);
        header[4..8].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
        header[8..16].copy_from_slice(&bucket_count.to_le_bytes());
        header[16..18].copy_from_slice(&(K as u16).to_le_bytes());
        header[18..20].copy_from_slice(&(V as u16).to_le_bytes());
        map.write_all(&header)?;
        // Zero-filled buckets are all empty; sparse allocation is fine
        map.set_len(MAP_HEADER_LEN + bucket_count * Self::RECORD_LEN)?;

        let mut overflow = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(overflow_path)?;

        let mut header = [0u8; OVFL_HEADER_LEN as usize];
        header[0..4].copy_from_slice(OVFL_MAGIC);
        header[4..8].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
        overflow.write_all(&header)?;

        debug!(
            map = %map_path.display(),
            buckets = bucket_count,
            "Created node map"
        );

        Ok(Self {
            map,
            overflow,
            bucket_count,
            overflow_end: OVFL_HEADER_LEN,
        })
    }

    /// Open an existing map pair, validating both headers.
    pub fn open(map_path: &Path, overflow_path: &Path) -> Result<Self, StoreError> {
        let mut map = OpenOptions::new().read(true).write(true).open(map_path)?;
        let bucket_count = Self::read_map_header(&mut map, map_path)?;

        let mut overflow = OpenOptions::new()
            .read(true)
            .write(true)
            .open(overflow_path)?;
        Self::read_overflow_header(&mut overflow, overflow_path)?;
        let overflow_end = overflow.seek(SeekFrom::End(0))?.max(OVFL_HEADER_LEN);

        Ok(Self {
            map,
            overflow,
            bucket_count,
            overflow_end,
        })
    }

    fn read_map_header(file: &mut File, path: &Path) -> Result<u64, StoreError> {
        let corrupt = |reason: &str| StoreError::Corrupt {
            path: path.display().to_string(),
            reason: reason.to_string(),
        };

        let mut header = [0u8; MAP_HEADER_LEN as usize];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut header)
            .map_err(|_| corrupt("missing header"))?;

        if &header[0..4] != MAP_MAGIC {
            return Err(corrupt("bad magic"));
        }
        let version = u32::from_le_bytes(header[4..8].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(corrupt(&format!("unsupported format version {}", version)));
        }
        let key_len = u16::from_le_bytes(header[16..18].try_into().unwrap());
        let value_len = u16::from_le_bytes(header[18..20].try_into().unwrap());
        if key_len != K as u16 || value_len != V as u16 {
            return Err(corrupt(&format!(
                "record widths {}/{} do not match expected {}/{}",
                key_len, value_len, K, V
            )));
        }

        let bucket_count = u64::from_le_bytes(header[8..16].try_into().unwrap());
        if bucket_count == 0 {
            return Err(corrupt("zero bucket count"));
        }

        Ok(bucket_count)
    }

    fn read_overflow_header(file: &mut File, path: &Path) -> Result<(), StoreError> {
        let corrupt = |reason: &str| StoreError::Corrupt {
            path: path.display().to_string(),
            reason: reason.to_string(),
        };

        let mut header = [0u8; OVFL_HEADER_LEN as usize];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut header)
            .map_err(|_| corrupt("missing header"))?;

        if &header[0..4] != OVFL_MAGIC {
            return Err(corrupt("bad magic"));
        }
        let version = u32::from_le_bytes(header[4..8].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(corrupt(&format!("unsupported format version {}", version)));
        }

        Ok(())
    }

    /// Look up a key.
    pub fn get(&mut self, key: &[u8; K]) -> Result<Option<[u8; V]>, StoreError> {
        let mut slot = Slot::Bucket(self.bucket_addr(key));

        loop {
            let record = self.read_record(slot)?;
            if !record.occupied {
                return Ok(None);
            }
            if &record.key == key {
                return Ok(Some(record.value));
            }
            if record.next == NO_NEXT {
                return Ok(None);
            }
            slot = Slot::Overflow(record.next);
        }
    }

    /// Insert or overwrite a key.
    pub fn set(&mut self, key: &[u8; K], value: &[u8; V]) -> Result<(), StoreError> {
        let mut slot = Slot::Bucket(self.bucket_addr(key));

        loop {
            let record = self.read_record(slot)?;

            if !record.occupied {
                // Only an empty root bucket terminates a chain this way;
                // overflow records are written occupied and never cleared.
                self.write_record(
                    slot,
                    &RawRecord {
                        occupied: true,
                        key: *key,
                        value: *value,
                        next: NO_NEXT,
                    },
                )?;
                return Ok(());
            }

            if &record.key == key {
                self.write_value(slot, value)?;
                return Ok(());
            }

            if record.next == NO_NEXT {
                let appended = self.append_overflow(&RawRecord {
                    occupied: true,
                    key: *key,
                    value: *value,
                    next: NO_NEXT,
                })?;
                self.write_next(slot, appended)?;
                return Ok(());
            }

            slot = Slot::Overflow(record.next);
        }
    }

    /// Visit every stored entry. Root buckets are scanned in file order,
    /// then the overflow records; chain order is not reproduced.
    pub fn for_each<F>(&mut self, mut f: F) -> Result<(), StoreError>
    where
        F: FnMut(&[u8; K], &[u8; V]),
    {
        for bucket in 0..self.bucket_count {
            let record = self.read_record(Slot::Bucket(MAP_HEADER_LEN + bucket * Self::RECORD_LEN))?;
            if record.occupied {
                f(&record.key, &record.value);
            }
        }

        let mut addr = OVFL_HEADER_LEN;
        while addr < self.overflow_end {
            let record = self.read_record(Slot::Overflow(addr))?;
            if record.occupied {
                f(&record.key, &record.value);
            }
            addr += Self::RECORD_LEN;
        }

        Ok(())
    }

    /// Number of stored entries (full scan).
    pub fn len(&mut self) -> Result<u64, StoreError> {
        let mut count = 0u64;
        self.for_each(|_, _| count += 1)?;
        Ok(count)
    }

    pub fn is_empty(&mut self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Push buffered writes to disk.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.map.sync_all()?;
        self.overflow.sync_all()?;
        Ok(())
    }

    fn bucket_addr(&self, key: &[u8; K]) -> u64 {
        MAP_HEADER_LEN + (fnv1a(key) % self.bucket_count) * Self::RECORD_LEN
    }

    fn file_for(&mut self, slot: Slot) -> (&mut File, u64) {
        match slot {
            Slot::Bucket(addr) => (&mut self.map, addr),
            Slot::Overflow(addr) => (&mut self.overflow, addr),
        }
    }

    fn read_record(&mut self, slot: Slot) -> Result<RawRecord<K, V>, StoreError> {
        let record_len = Self::RECORD_LEN as usize;
        let (file, addr) = self.file_for(slot);

        let mut buf = vec![0u8; record_len];
        file.seek(SeekFrom::Start(addr))?;
        file.read_exact(&mut buf)?;

        let mut key = [0u8; K];
        key.copy_from_slice(&buf[1..1 + K]);
        let mut value = [0u8; V];
        value.copy_from_slice(&buf[1 + K..1 + K + V]);

        Ok(RawRecord {
            occupied: buf[0] == 1,
            key,
            value,
            next: u64::from_le_bytes(buf[1 + K + V..].try_into().unwrap()),
        })
    }

    fn write_record(&mut self, slot: Slot, record: &RawRecord<K, V>) -> Result<(), StoreError> {
        let buf = Self::pack_record(record);
        let (file, addr) = self.file_for(slot);
        file.seek(SeekFrom::Start(addr))?;
        file.write_all(&buf)?;
        Ok(())
    }

    fn write_value(&mut self, slot: Slot, value: &[u8; V]) -> Result<(), StoreError> {
        let (file, addr) = self.file_for(slot);
        file.seek(SeekFrom::Start(addr + 1 + K as u64))?;
        file.write_all(value)?;
        Ok(())
    }

    fn write_next(&mut self, slot: Slot, next: u64) -> Result<(), StoreError> {
        let (file, addr) = self.file_for(slot);
        file.seek(SeekFrom::Start(addr + 1 + K as u64 + V as u64))?;
        file.write_all(&next.to_le_bytes())?;
        Ok(())
    }

    /// Write a record at the end of the overflow file and return its offset.
    /// The record is complete before any chain link points at it.
    fn append_overflow(&mut self, record: &RawRecord<K, V>) -> Result<u64, StoreError> {
        let addr = self.overflow_end;
        let buf = Self::pack_record(record);
        self.overflow.seek(SeekFrom::Start(addr))?;
        self.overflow.write_all(&buf)?;
        self.overflow_end = addr + Self::RECORD_LEN;
        Ok(addr)
    }

    fn pack_record(record: &RawRecord<K, V>) -> Vec<u8> {
        let mut buf = vec![0u8; Self::RECORD_LEN as usize];
        buf[0] = u8::from(record.occupied);
        buf[1..1 + K].copy_from_slice(&record.key);
        buf[1 + K..1 + K + V].copy_from_slice(&record.value);
        buf[1 + K + V..].copy_from_slice(&record.next.to_le_bytes());
        buf
    }
}

/// FNV-1a, inlined rather than taken from a hasher crate: bucket addressing
/// must produce identical indices across runs and toolchain upgrades, which
/// std hashers do not guarantee.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes.iter().fold(OFFSET_BASIS, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestMap = DiskMap<4, 2>;

    fn paths(dir: &tempfile::TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
        (dir.path().join("map.bin"), dir.path().join("ovfl.bin"))
    }

    #[test]
    fn get_on_empty_map_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let (map_path, ovfl_path) = paths(&dir);
        let mut map = TestMap::create(&map_path, &ovfl_path, 16).unwrap();

        assert_eq!(map.get(b"abcd").unwrap(), None);
    }

    #[test]
    fn set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let (map_path, ovfl_path) = paths(&dir);
        let mut map = TestMap::create(&map_path, &ovfl_path, 16).unwrap();

        map.set(b"abcd", b"hi").unwrap();
        assert_eq!(map.get(b"abcd").unwrap(), Some(*b"hi"));
        assert_eq!(map.get(b"dcba").unwrap(), None);
    }

    #[test]
    fn set_overwrites_existing_value() {
        let dir = tempfile::tempdir().unwrap();
        let (map_path, ovfl_path) = paths(&dir);
        let mut map = TestMap::create(&map_path, &ovfl_path, 16).unwrap();

        map.set(b"abcd", b"v1").unwrap();
        map.set(b"abcd", b"v2").unwrap();

        assert_eq!(map.get(b"abcd").unwrap(), Some(*b"v2"));
        assert_eq!(map.len().unwrap(), 1);
    }

    #[test]
    fn collisions_chain_through_the_overflow_file() {
        let dir = tempfile::tempdir().unwrap();
        let (map_path, ovfl_path) = paths(&dir);
        // A single bucket forces every insert into one chain
        let mut map = TestMap::create(&map_path, &ovfl_path, 1).unwrap();

        for i in 0..20u8 {
            map.set(&[i, 0, 0, 0], &[i, i]).unwrap();
        }

        for i in 0..20u8 {
            assert_eq!(map.get(&[i, 0, 0, 0]).unwrap(), Some([i, i]));
        }
        assert_eq!(map.len().unwrap(), 20);

        // Overwrites inside the chain must not grow it
        map.set(&[7, 0, 0, 0], &[9, 9]).unwrap();
        assert_eq!(map.get(&[7, 0, 0, 0]).unwrap(), Some([9, 9]));
        assert_eq!(map.len().unwrap(), 20);
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let (map_path, ovfl_path) = paths(&dir);

        {
            let mut map = TestMap::create(&map_path, &ovfl_path, 2).unwrap();
            for i in 0..10u8 {
                map.set(&[i, 1, 2, 3], &[i, 0]).unwrap();
            }
            map.flush().unwrap();
        }

        let mut map = TestMap::open(&map_path, &ovfl_path).unwrap();
        for i in 0..10u8 {
            assert_eq!(map.get(&[i, 1, 2, 3]).unwrap(), Some([i, 0]));
        }
        // New inserts keep chaining after reopen
        map.set(b"zzzz", b"ok").unwrap();
        assert_eq!(map.get(b"zzzz").unwrap(), Some(*b"ok"));
        assert_eq!(map.len().unwrap(), 11);
    }

    #[test]
    fn open_rejects_wrong_magic() {
        let dir = tempfile::tempdir().unwrap();
        let (map_path, ovfl_path) = paths(&dir);
        std::fs::write(&map_path, b"not a map file, definitely too weird").unwrap();
        std::fs::write(&ovfl_path, b"whatever").unwrap();

        assert!(matches!(
            TestMap::open(&map_path, &ovfl_path),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn open_rejects_mismatched_widths() {
        let dir = tempfile::tempdir().unwrap();
        let (map_path, ovfl_path) = paths(&dir);

        {
            let mut map = TestMap::create(&map_path, &ovfl_path, 4).unwrap();
            map.flush().unwrap();
        }

        assert!(matches!(
            DiskMap::<8, 8>::open(&map_path, &ovfl_path),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn for_each_visits_every_entry_once() {
        let dir = tempfile::tempdir().unwrap();
        let (map_path, ovfl_path) = paths(&dir);
        let mut map = TestMap::create(&map_path, &ovfl_path, 3).unwrap();

        for i in 0..12u8 {
            map.set(&[i, 9, 9, 9], &[i, 1]).unwrap();
        }

        let mut seen = Vec::new();
        map.for_each(|key, value| seen.push((key[0], value[0])))
            .unwrap();
        seen.sort();

        let expected: Vec<(u8, u8)> = (0..12).map(|i| (i, i)).collect();
        assert_eq!(seen, expected);
    }
}
