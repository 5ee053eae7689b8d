//! Open matrix files.
//!
//! A [`MatrixHandle`] is opened either for reading (memory mapped) or for
//! writing (buffered). Raw storage supports random partial reads and writes.
//! Line-compressed storage supports random reads of any part of a line, but
//! writes must be whole lines, each written at most once, appended in the
//! order they arrive. The line index and the final header are written when
//! the handle is closed or dropped.

use super::header::MatrixHeader;
use super::{Element, MatrixInfo};
use crate::codec::LineCodec;
use crate::error::{MatrixError, Result};
use crate::streaming::buffers::MATRIX_WRITE_BUFFER;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Size of one line index entry: offset (u64) + length (u32).
const INDEX_ENTRY_SIZE: usize = 12;

/// Location of one compressed line. Offset 0 marks a line never written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LineSpan {
    offset: u64,
    len: u32,
}

impl LineSpan {
    #[inline]
    fn is_written(&self) -> bool {
        self.offset != 0
    }
}

/// An open matrix file with exclusive access.
pub struct MatrixHandle {
    id: u64,
    path: PathBuf,
    info: MatrixInfo,
    store: Store,
}

enum Store {
    Read(Reader),
    Write(Writer),
}

struct Reader {
    map: Mmap,
    index: Vec<LineSpan>,
    /// Most recently decoded compressed line.
    line: Vec<i32>,
    decoded: Option<usize>,
}

struct Writer {
    out: BufWriter<File>,
    index: Vec<LineSpan>,
    /// Current position of `out`.
    pos: u64,
    /// End of the appended line data.
    end: u64,
    touched: bool,
    finished: bool,
    line: Vec<i32>,
    encoded: Vec<u8>,
    bytes: Vec<u8>,
}

impl MatrixHandle {
    /// Open an existing matrix for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let open_err = |source| MatrixError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        // SAFETY: the handle has exclusive access to the file while it is
        // open; concurrent writers are not supported.
        let map = unsafe { Mmap::map(&file) }.map_err(open_err)?;

        let header = MatrixHeader::from_bytes(&map)?;
        let info = header.info;
        let index = if info.variant.codec().is_some() {
            read_index(&map, &header)?
        } else {
            let need = MatrixHeader::SIZE as u64 + info.data_size();
            if (map.len() as u64) < need {
                return Err(MatrixError::Format(format!(
                    "raw matrix truncated: {} of {} bytes",
                    map.len(),
                    need
                )));
            }
            Vec::new()
        };

        Ok(Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            path: path.to_path_buf(),
            info,
            store: Store::Read(Reader {
                map,
                index,
                line: vec![0; info.columns as usize],
                decoded: None,
            }),
        })
    }

    /// Create (or truncate) a matrix file for writing.
    pub fn create<P: AsRef<Path>>(path: P, info: MatrixInfo) -> Result<Self> {
        info.validate()?;
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| MatrixError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut out = BufWriter::with_capacity(MATRIX_WRITE_BUFFER, file);
        out.write_all(&MatrixHeader::new(info).to_bytes())?;

        let mut writer = Writer {
            out,
            index: Vec::new(),
            pos: MatrixHeader::SIZE as u64,
            end: MatrixHeader::SIZE as u64,
            touched: false,
            finished: false,
            line: Vec::new(),
            encoded: Vec::new(),
            bytes: Vec::new(),
        };
        writer.reset(&info);

        Ok(Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            path: path.to_path_buf(),
            info,
            store: Store::Write(writer),
        })
    }

    #[inline]
    pub fn info(&self) -> &MatrixInfo {
        &self.info
    }

    /// Process-unique id of this handle.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_writable(&self) -> bool {
        matches!(self.store, Store::Write(_))
    }

    /// Total size of the stored compressed lines, if the storage is compressed.
    pub fn compressed_bytes(&self) -> Option<u64> {
        self.info.variant.codec()?;
        let index = match &self.store {
            Store::Read(r) => &r.index,
            Store::Write(w) => &w.index,
        };
        Some(index.iter().map(|s| u64::from(s.len)).sum())
    }

    /// Change the matrix shape. Only allowed before any data is written.
    pub fn set_info(&mut self, info: MatrixInfo) -> Result<()> {
        match &mut self.store {
            Store::Read(_) => Err(MatrixError::Mode("writing")),
            Store::Write(w) if w.touched => Err(MatrixError::WritePattern(
                "matrix shape cannot change after data has been written".to_string(),
            )),
            Store::Write(w) => {
                info.validate()?;
                w.reset(&info);
                self.info = info;
                Ok(())
            }
        }
    }

    /// Read up to `buf.len()` elements starting at `(level, line, col)`.
    ///
    /// Reads never cross a line end. Returns the number of elements read,
    /// 0 if the position is outside the matrix.
    pub fn get<T: Element>(
        &mut self,
        buf: &mut [T],
        level: u32,
        line: u32,
        col: u32,
    ) -> Result<usize> {
        let info = self.info;
        let Store::Read(reader) = &mut self.store else {
            return Err(MatrixError::Mode("reading"));
        };
        let n = clip(&info, buf.len(), level, line, col);
        if n > 0 {
            reader.read(&info, &mut buf[..n], level, line, col as usize)?;
        }
        Ok(n)
    }

    /// Write up to `buf.len()` elements starting at `(level, line, col)`.
    ///
    /// Returns the number of elements written, 0 if the position is outside
    /// the matrix. Compressed storage only accepts whole lines at column 0.
    pub fn put<T: Element>(&mut self, buf: &[T], level: u32, line: u32, col: u32) -> Result<usize> {
        let info = self.info;
        let Store::Write(writer) = &mut self.store else {
            return Err(MatrixError::Mode("writing"));
        };
        let n = clip(&info, buf.len(), level, line, col);
        if n == 0 {
            return Ok(0);
        }

        match info.variant.codec() {
            None => writer.write_raw(&info, &buf[..n], level, line, col)?,
            Some(codec) => {
                if col != 0 || buf.len() != info.columns as usize {
                    return Err(MatrixError::WritePattern(format!(
                        "{} storage needs whole lines; \
                         got {} elements at level {}, line {}, column {}",
                        info.variant,
                        buf.len(),
                        level,
                        line,
                        col
                    )));
                }
                writer.append_line(&info, codec, buf, level, line)?;
            }
        }
        writer.touched = true;
        Ok(n)
    }

    /// Read one whole line, failing on a short read.
    pub fn read_line<T: Element>(&mut self, buf: &mut [T], level: u32, line: u32) -> Result<()> {
        let expected = self.info.columns as usize;
        let n = expected.min(buf.len());
        let got = self.get(&mut buf[..n], level, line, 0)?;
        if got != expected {
            return Err(MatrixError::ShortRead {
                level,
                line,
                got,
                expected,
            });
        }
        Ok(())
    }

    /// Write one whole line, failing on a short write.
    pub fn write_line<T: Element>(&mut self, buf: &[T], level: u32, line: u32) -> Result<()> {
        let expected = self.info.columns as usize;
        let got = self.put(buf, level, line, 0)?;
        if got != expected || buf.len() != expected {
            return Err(MatrixError::ShortWrite {
                level,
                line,
                got,
                expected,
            });
        }
        Ok(())
    }

    /// Flush, write the line index and header, and close the file.
    pub fn close(mut self) -> Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        let info = self.info;
        let Store::Write(w) = &mut self.store else {
            return Ok(());
        };
        if w.finished {
            return Ok(());
        }
        w.finished = true;

        let mut header = MatrixHeader::new(info);
        if info.variant.codec().is_some() {
            w.seek(w.end)?;
            let mut entry = [0u8; INDEX_ENTRY_SIZE];
            for span in &w.index {
                entry[..8].copy_from_slice(&span.offset.to_le_bytes());
                entry[8..].copy_from_slice(&span.len.to_le_bytes());
                w.out.write_all(&entry)?;
            }
            w.pos += (w.index.len() * INDEX_ENTRY_SIZE) as u64;
            header.index_offset = w.end;
        } else {
            w.out.flush()?;
            w.out
                .get_ref()
                .set_len(MatrixHeader::SIZE as u64 + info.data_size())?;
        }

        w.seek(0)?;
        w.out.write_all(&header.to_bytes())?;
        w.pos = MatrixHeader::SIZE as u64;
        w.out.flush()?;
        Ok(())
    }
}

impl Drop for MatrixHandle {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}

impl std::fmt::Debug for MatrixHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatrixHandle")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("info", &self.info)
            .field("writable", &self.is_writable())
            .finish()
    }
}

#[inline]
fn clip(info: &MatrixInfo, len: usize, level: u32, line: u32, col: u32) -> usize {
    if level >= info.levels || line >= info.lines || col >= info.columns {
        0
    } else {
        len.min((info.columns - col) as usize)
    }
}

fn read_index(map: &[u8], header: &MatrixHeader) -> Result<Vec<LineSpan>> {
    let count = header.info.line_count();
    let start = header.index_offset;
    let end = count
        .checked_mul(INDEX_ENTRY_SIZE as u64)
        .and_then(|size| start.checked_add(size))
        .filter(|&end| start >= MatrixHeader::SIZE as u64 && end <= map.len() as u64)
        .ok_or_else(|| MatrixError::Format("line index out of bounds".to_string()))?;

    let table = &map[start as usize..end as usize];
    let mut index = Vec::with_capacity(count as usize);
    for entry in table.chunks_exact(INDEX_ENTRY_SIZE) {
        let mut offset = [0u8; 8];
        let mut len = [0u8; 4];
        offset.copy_from_slice(&entry[..8]);
        len.copy_from_slice(&entry[8..]);
        let span = LineSpan {
            offset: u64::from_le_bytes(offset),
            len: u32::from_le_bytes(len),
        };
        let in_bounds = span
            .offset
            .checked_add(u64::from(span.len))
            .is_some_and(|end| span.offset >= MatrixHeader::SIZE as u64 && end <= start);
        if span.is_written() && !in_bounds {
            return Err(MatrixError::Format(format!(
                "line data out of bounds at offset {}",
                span.offset
            )));
        }
        index.push(span);
    }
    Ok(index)
}

impl Reader {
    fn read<T: Element>(
        &mut self,
        info: &MatrixInfo,
        buf: &mut [T],
        level: u32,
        line: u32,
        col: usize,
    ) -> Result<()> {
        let idx = info.line_index(level, line);
        match info.variant.codec() {
            None => {
                let size = info.kind.size();
                let start = MatrixHeader::SIZE
                    + (idx * info.columns as usize + col) * size;
                let bytes = &self.map[start..start + buf.len() * size];
                for (v, chunk) in buf.iter_mut().zip(bytes.chunks_exact(size)) {
                    *v = T::read_le(info.kind, chunk);
                }
            }
            Some(codec) => {
                if self.decoded != Some(idx) {
                    self.decoded = None;
                    let span = self.index[idx];
                    if span.is_written() {
                        let start = span.offset as usize;
                        let bytes = &self.map[start..start + span.len as usize];
                        codec.decompress_into(bytes, &mut self.line)?;
                    } else {
                        self.line.fill(0);
                    }
                    self.decoded = Some(idx);
                }
                for (v, &x) in buf.iter_mut().zip(&self.line[col..]) {
                    *v = T::from_i32(x);
                }
            }
        }
        Ok(())
    }
}

impl Writer {
    fn reset(&mut self, info: &MatrixInfo) {
        self.index = if info.variant.codec().is_some() {
            vec![LineSpan::default(); info.line_count() as usize]
        } else {
            Vec::new()
        };
        self.line.clear();
        self.encoded.clear();
    }

    #[inline]
    fn seek(&mut self, offset: u64) -> Result<()> {
        if self.pos != offset {
            self.out.seek(SeekFrom::Start(offset))?;
            self.pos = offset;
        }
        Ok(())
    }

    fn write_raw<T: Element>(
        &mut self,
        info: &MatrixInfo,
        buf: &[T],
        level: u32,
        line: u32,
        col: u32,
    ) -> Result<()> {
        let size = info.kind.size();
        let offset = MatrixHeader::SIZE as u64
            + (info.line_index(level, line) as u64 * u64::from(info.columns) + u64::from(col))
                * size as u64;

        self.bytes.resize(buf.len() * size, 0);
        for (v, chunk) in buf.iter().zip(self.bytes.chunks_exact_mut(size)) {
            v.write_le(info.kind, chunk);
        }
        self.seek(offset)?;
        self.out.write_all(&self.bytes)?;
        self.pos += self.bytes.len() as u64;
        self.end = self.end.max(self.pos);
        Ok(())
    }

    fn append_line<T: Element>(
        &mut self,
        info: &MatrixInfo,
        codec: LineCodec,
        buf: &[T],
        level: u32,
        line: u32,
    ) -> Result<()> {
        let idx = info.line_index(level, line);
        if self.index[idx].is_written() {
            return Err(MatrixError::WritePattern(format!(
                "line {} of level {} already written; {} storage is append-only",
                line, level, info.variant
            )));
        }

        self.line.clear();
        self.line.extend(buf.iter().map(|v| v.to_i32()));
        self.encoded.clear();
        codec.compress_into(&self.line, &mut self.encoded);
        let len = u32::try_from(self.encoded.len()).map_err(|_| {
            MatrixError::Format(format!("compressed line {} exceeds 4 GiB", line))
        })?;

        self.seek(self.end)?;
        self.out.write_all(&self.encoded)?;
        self.index[idx] = LineSpan {
            offset: self.end,
            len,
        };
        self.end += u64::from(len);
        self.pos = self.end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{ElementKind, StorageVariant};
    use tempfile::tempdir;

    fn sample(lines: u32, columns: u32) -> Vec<Vec<i32>> {
        (0..lines)
            .map(|l| (0..columns).map(|c| (l * 7 + c * 3) as i32 % 11 - 2).collect())
            .collect()
    }

    fn write_sample(path: &Path, info: MatrixInfo, rows: &[Vec<i32>]) {
        let mut h = MatrixHandle::create(path, info).unwrap();
        for level in 0..info.levels {
            for (l, row) in rows.iter().enumerate() {
                h.write_line(row, level, l as u32).unwrap();
            }
        }
        h.close().unwrap();
    }

    #[test]
    fn test_round_trip_all_variants() {
        let dir = tempdir().unwrap();
        let rows = sample(9, 13);
        for variant in [
            StorageVariant::Raw,
            StorageVariant::LineCompressedV1,
            StorageVariant::LineCompressedV2,
        ] {
            let path = dir.path().join(format!("m.{}", variant));
            let info = MatrixInfo::new(2, 9, 13).with_variant(variant);
            write_sample(&path, info, &rows);

            let mut h = MatrixHandle::open(&path).unwrap();
            assert_eq!(*h.info(), info);
            let mut buf = vec![0i32; 13];
            for level in 0..2 {
                for (l, row) in rows.iter().enumerate() {
                    h.read_line(&mut buf, level, l as u32).unwrap();
                    assert_eq!(&buf, row, "{} level {} line {}", variant, level, l);
                }
            }
        }
    }

    #[test]
    fn test_float_kinds_in_raw_storage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.raw");
        let info = MatrixInfo::new(1, 2, 3)
            .with_kind(ElementKind::Float64)
            .with_variant(StorageVariant::Raw);
        let mut h = MatrixHandle::create(&path, info).unwrap();
        h.write_line(&[0.5f64, 1.25, -3.0], 0, 0).unwrap();
        h.write_line(&[1.0f32, 2.0, 3.0], 0, 1).unwrap();
        drop(h);

        let mut h = MatrixHandle::open(&path).unwrap();
        let mut buf = [0f64; 3];
        h.read_line(&mut buf, 0, 0).unwrap();
        assert_eq!(buf, [0.5, 1.25, -3.0]);
        let mut ints = [0i32; 3];
        h.read_line(&mut ints, 0, 1).unwrap();
        assert_eq!(ints, [1, 2, 3]);
    }

    #[test]
    fn test_partial_reads() {
        let dir = tempdir().unwrap();
        let rows = sample(4, 10);
        for variant in [StorageVariant::Raw, StorageVariant::LineCompressedV2] {
            let path = dir.path().join(format!("p.{}", variant));
            write_sample(&path, MatrixInfo::new(1, 4, 10).with_variant(variant), &rows);

            let mut h = MatrixHandle::open(&path).unwrap();
            let mut buf = [0i32; 4];
            assert_eq!(h.get(&mut buf, 0, 2, 3).unwrap(), 4);
            assert_eq!(&buf[..], &rows[2][3..7]);
            // Reads stop at the line end.
            assert_eq!(h.get(&mut buf, 0, 2, 8).unwrap(), 2);
            assert_eq!(&buf[..2], &rows[2][8..]);
            // Outside the matrix.
            assert_eq!(h.get(&mut buf, 0, 4, 0).unwrap(), 0);
            assert_eq!(h.get(&mut buf, 1, 0, 0).unwrap(), 0);
            assert_eq!(h.get(&mut buf, 0, 0, 10).unwrap(), 0);
        }
    }

    #[test]
    fn test_raw_random_partial_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("r.raw");
        let info = MatrixInfo::new(1, 3, 4).with_variant(StorageVariant::Raw);
        let mut h = MatrixHandle::create(&path, info).unwrap();
        assert_eq!(h.put(&[9, 9], 0, 2, 2).unwrap(), 2);
        assert_eq!(h.put(&[1], 0, 0, 0).unwrap(), 1);
        // Clipped at the line end.
        assert_eq!(h.put(&[5, 6, 7], 0, 1, 3).unwrap(), 1);
        h.close().unwrap();

        let mut h = MatrixHandle::open(&path).unwrap();
        let mut buf = [0i32; 4];
        h.read_line(&mut buf, 0, 0).unwrap();
        assert_eq!(buf, [1, 0, 0, 0]);
        h.read_line(&mut buf, 0, 1).unwrap();
        assert_eq!(buf, [0, 0, 0, 5]);
        h.read_line(&mut buf, 0, 2).unwrap();
        assert_eq!(buf, [0, 0, 9, 9]);
    }

    #[test]
    fn test_compressed_rejects_partial_line() {
        let dir = tempdir().unwrap();
        let mut h =
            MatrixHandle::create(dir.path().join("c.lc"), MatrixInfo::new(1, 2, 4)).unwrap();
        assert!(matches!(
            h.put(&[1, 2], 0, 0, 0),
            Err(MatrixError::WritePattern(_))
        ));
        assert!(matches!(
            h.put(&[1, 2, 3], 0, 0, 1),
            Err(MatrixError::WritePattern(_))
        ));
    }

    #[test]
    fn test_compressed_is_append_only() {
        let dir = tempdir().unwrap();
        let mut h =
            MatrixHandle::create(dir.path().join("c.lc"), MatrixInfo::new(1, 2, 2)).unwrap();
        h.write_line(&[1, 2], 0, 1).unwrap();
        assert!(matches!(
            h.put(&[3, 4], 0, 1, 0),
            Err(MatrixError::WritePattern(_))
        ));
    }

    #[test]
    fn test_unwritten_compressed_lines_read_as_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("z.lc");
        let mut h = MatrixHandle::create(&path, MatrixInfo::new(1, 3, 3)).unwrap();
        h.write_line(&[4, 4, 4], 0, 1).unwrap();
        h.close().unwrap();

        let mut h = MatrixHandle::open(&path).unwrap();
        let mut buf = [7i32; 3];
        h.read_line(&mut buf, 0, 0).unwrap();
        assert_eq!(buf, [0, 0, 0]);
        h.read_line(&mut buf, 0, 1).unwrap();
        assert_eq!(buf, [4, 4, 4]);
    }

    #[test]
    fn test_set_info_only_before_data() {
        let dir = tempdir().unwrap();
        let mut h =
            MatrixHandle::create(dir.path().join("s.lc"), MatrixInfo::new(1, 1, 1)).unwrap();
        h.set_info(MatrixInfo::new(1, 2, 3)).unwrap();
        h.write_line(&[1, 2, 3], 0, 0).unwrap();
        assert!(h.set_info(MatrixInfo::new(1, 4, 4)).is_err());
        assert_eq!(h.info().columns, 3);
    }

    #[test]
    fn test_mode_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mode.lc");
        let mut h = MatrixHandle::create(&path, MatrixInfo::new(1, 1, 1)).unwrap();
        let mut buf = [0i32; 1];
        assert!(matches!(h.get(&mut buf, 0, 0, 0), Err(MatrixError::Mode(_))));
        h.write_line(&[1], 0, 0).unwrap();
        drop(h);

        let mut h = MatrixHandle::open(&path).unwrap();
        assert!(matches!(h.put(&buf, 0, 0, 0), Err(MatrixError::Mode(_))));
    }

    #[test]
    fn test_corrupt_line_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.lc");
        let mut h = MatrixHandle::create(&path, MatrixInfo::new(1, 1, 8)).unwrap();
        h.write_line(&[100, 200, 300, 400, 500, 600, 700, 800], 0, 0)
            .unwrap();
        h.close().unwrap();

        // Overwrite the first data byte with an invalid V2 token.
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[MatrixHeader::SIZE] = 0xc0;
        std::fs::write(&path, bytes).unwrap();

        let mut h = MatrixHandle::open(&path).unwrap();
        let mut buf = [0i32; 8];
        assert!(matches!(
            h.read_line(&mut buf, 0, 0),
            Err(MatrixError::Decode(_))
        ));
    }

    #[test]
    fn test_truncated_raw_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.raw");
        let info = MatrixInfo::new(1, 4, 4).with_variant(StorageVariant::Raw);
        MatrixHandle::create(&path, info).unwrap().close().unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), MatrixHeader::SIZE + 64);
        std::fs::write(&path, &bytes[..40]).unwrap();
        assert!(matches!(
            MatrixHandle::open(&path),
            Err(MatrixError::Format(_))
        ));
    }

    #[test]
    fn test_overflowing_index_entry_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.lc");
        let mut h = MatrixHandle::create(&path, MatrixInfo::new(1, 1, 4)).unwrap();
        h.write_line(&[1, 2, 3, 4], 0, 0).unwrap();
        h.close().unwrap();

        // The single index entry is the last 12 bytes of the file.
        let mut bytes = std::fs::read(&path).unwrap();
        let entry = bytes.len() - INDEX_ENTRY_SIZE;
        bytes[entry..entry + 8].copy_from_slice(&(u64::MAX - 1).to_le_bytes());
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            MatrixHandle::open(&path),
            Err(MatrixError::Format(_))
        ));
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            MatrixHandle::open(dir.path().join("missing")),
            Err(MatrixError::Open { .. })
        ));
    }

    #[test]
    fn test_compressed_bytes_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flat.lc");
        write_sample(&path, MatrixInfo::new(1, 2, 100), &[vec![0; 100], vec![0; 100]]);
        let h = MatrixHandle::open(&path).unwrap();
        let size = h.compressed_bytes().unwrap();
        assert!(size > 0 && size < 20);
    }
}
