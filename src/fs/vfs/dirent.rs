use core::mem::{offset_of, size_of};
use core::ptr::{self, addr_of_mut};

use crate::config::DIRENT_ALIGN;
use crate::mm::util::next_align;
use crate::syscall::errno::Errno;

use super::{FileType, Ino};

/// Header of one packed directory record as `getdents` lays it out.
///
/// The name follows the header directly and is NUL terminated. `size` is the
/// distance to the next record.
#[repr(C)]
pub struct KfsDirent {
	pub ino: u32,
	pub private: u32,
	pub size: u16,
	pub file_type: u8,
	pub name: (),
}

impl KfsDirent {
	pub const NAME_OFFSET: usize = offset_of!(KfsDirent, name);

	pub const fn total_len(name: &[u8]) -> usize {
		Self::NAME_OFFSET + name.len() + 1
	}

	/// Smallest record that still holds a one byte name.
	pub const fn min_len() -> usize {
		let len = Self::NAME_OFFSET + 2;
		match len < size_of::<KfsDirent>() {
			true => size_of::<KfsDirent>(),
			false => len,
		}
	}

	pub const fn record_len(name: &[u8]) -> usize {
		next_align(Self::total_len(name), DIRENT_ALIGN)
	}
}

/// Writes one record at the start of `buf`.
///
/// Returns the record length, or `None` when it does not fit or the name is
/// empty.
pub fn write_dirent(buf: &mut [u8], ino: Ino, file_type: FileType, name: &[u8]) -> Option<usize> {
	let size = KfsDirent::record_len(name);

	if size > buf.len() || name.is_empty() || size > u16::MAX as usize {
		return None;
	}

	unsafe {
		let ptr = buf.as_mut_ptr().cast::<KfsDirent>();

		ptr.write_unaligned(KfsDirent {
			ino,
			private: 0,
			size: size as u16,
			file_type: file_type as u8,
			name: (),
		});

		let name_start = addr_of_mut!((*ptr).name).cast::<u8>();
		name_start.copy_from_nonoverlapping(name.as_ptr(), name.len());
		name_start.add(name.len()).write(0);
	}

	buf[KfsDirent::total_len(name)..size].fill(0);

	Some(size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirentRef<'a> {
	pub ino: Ino,
	pub file_type: FileType,
	pub name: &'a [u8],
}

/// Walks the records one `getdents` call produced.
///
/// Yields `Err(EIO)` once for a record that breaks the layout (bad `size`,
/// record running past the content, missing terminator) and stops there.
pub struct DirentIter<'a> {
	buf: &'a [u8],
	offset: usize,
}

impl<'a> DirentIter<'a> {
	pub fn new(buf: &'a [u8]) -> Self {
		Self { buf, offset: 0 }
	}

	fn parse(&self) -> Result<(DirentRef<'a>, usize), Errno> {
		let rest = &self.buf[self.offset..];

		if rest.len() < size_of::<KfsDirent>() {
			return Err(Errno::EIO);
		}

		let head = unsafe { ptr::read_unaligned(rest.as_ptr().cast::<KfsDirent>()) };
		let size = head.size as usize;

		if size < KfsDirent::min_len() || size > rest.len() {
			return Err(Errno::EIO);
		}

		let name_area = &rest[KfsDirent::NAME_OFFSET..size];
		let name_len = name_area
			.iter()
			.position(|ch| *ch == 0)
			.ok_or(Errno::EIO)?;

		if name_len == 0 {
			return Err(Errno::EIO);
		}

		let dirent = DirentRef {
			ino: head.ino,
			file_type: FileType::from_u8(head.file_type),
			name: &name_area[..name_len],
		};

		Ok((dirent, size))
	}
}

impl<'a> Iterator for DirentIter<'a> {
	type Item = Result<DirentRef<'a>, Errno>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.offset >= self.buf.len() {
			return None;
		}

		match self.parse() {
			Ok((dirent, size)) => {
				self.offset += size;
				Some(Ok(dirent))
			}
			Err(e) => {
				self.offset = self.buf.len();
				Some(Err(e))
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	use alloc::vec;
	use alloc::vec::Vec;

	fn pack(entries: &[(Ino, FileType, &[u8])]) -> Vec<u8> {
		let mut buf = vec![0u8; 512];
		let mut sum = 0;

		for (ino, kind, name) in entries {
			sum += write_dirent(&mut buf[sum..], *ino, *kind, name).unwrap();
		}

		buf.truncate(sum);
		buf
	}

	#[test]
	fn layout() {
		assert_eq!(KfsDirent::NAME_OFFSET, 11);
		assert_eq!(KfsDirent::total_len(b"bin"), 15);
		assert_eq!(KfsDirent::record_len(b"bin"), 16);
		assert_eq!(KfsDirent::record_len(b"abcd"), 16);
		assert_eq!(KfsDirent::record_len(b"abcde"), 24);
	}

	#[test]
	fn scan_ends_at_content_length() {
		let buf = pack(&[
			(20, FileType::Directory, b"."),
			(2, FileType::Directory, b".."),
			(30, FileType::Directory, b"bin"),
			(31, FileType::Regular, b"a_longer_file_name"),
		]);

		let names: Vec<_> = DirentIter::new(&buf)
			.map(|d| d.unwrap())
			.map(|d| (d.ino, d.name.to_vec()))
			.collect();

		assert_eq!(
			names,
			vec![
				(20, b".".to_vec()),
				(2, b"..".to_vec()),
				(30, b"bin".to_vec()),
				(31, b"a_longer_file_name".to_vec()),
			]
		);
	}

	#[test]
	fn does_not_fit() {
		let mut buf = [0u8; 15];

		assert_eq!(write_dirent(&mut buf, 1, FileType::Regular, b"bin"), None);
		assert_eq!(write_dirent(&mut buf, 1, FileType::Regular, b""), None);
	}

	#[test]
	fn truncated_record() {
		let mut buf = pack(&[(30, FileType::Directory, b"bin")]);
		buf.truncate(10);

		let mut it = DirentIter::new(&buf);
		assert_eq!(it.next(), Some(Err(Errno::EIO)));
		assert_eq!(it.next(), None);
	}

	#[test]
	fn record_size_past_content() {
		let mut buf = pack(&[(30, FileType::Directory, b"bin")]);
		buf[8] = 64;

		let mut it = DirentIter::new(&buf);
		assert_eq!(it.next(), Some(Err(Errno::EIO)));
	}

	#[test]
	fn zero_record_size() {
		let mut buf = pack(&[(30, FileType::Directory, b"bin")]);
		buf[8] = 0;
		buf[9] = 0;

		let mut it = DirentIter::new(&buf);
		assert_eq!(it.next(), Some(Err(Errno::EIO)));
		assert_eq!(it.next(), None);
	}

	#[test]
	fn missing_terminator() {
		let mut buf = pack(&[(30, FileType::Directory, b"abcd")]);
		buf[15..].fill(b'x');

		let mut it = DirentIter::new(&buf);
		assert_eq!(it.next(), Some(Err(Errno::EIO)));
	}
}
