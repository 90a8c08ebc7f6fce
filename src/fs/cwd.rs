//! Absolute path of a directory, rebuilt from its inode.
//!
//! Inodes carry no parent pointer, so the walk asks for `..`, reads the
//! parent's records and looks for the entry carrying the child's inode
//! number. Names are prepended until the root is reached.

mod accumulator;

use core::fmt;
use core::ops::Range;

use alloc::sync::Arc;

pub use accumulator::PathAccumulator;

use crate::config::WalkConfig;
use crate::fs::vfs::{
	lookup_parent, lookup_root, DirInode, DirentIter, Ino, NameResolver, VfsDirHandle,
};
use crate::mm::util::alloc_scratch;
use crate::syscall::errno::Errno;
use crate::{pr_debug, pr_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CwdError {
	/// Resolving `/` or `..` failed.
	NameResolution(Errno),
	/// The parent does not list the child, lists it through a corrupt record,
	/// or a directory other than the root is its own parent.
	InconsistentTree,
	/// The path and its terminator do not fit the buffer.
	BufferTooSmall,
	/// The parent's listing did not end within `WalkConfig::max_dir_reads`.
	DirectoryTooLarge,
	/// Opening or reading the parent directory failed, or the read reported
	/// more bytes than the buffer holds.
	DirectoryRead(Errno),
	/// Scratch space could not be allocated.
	Resource(Errno),
	/// A fatal signal arrived between two ascents.
	Interrupted,
}

impl From<CwdError> for Errno {
	fn from(e: CwdError) -> Self {
		use CwdError::*;
		match e {
			NameResolution(e) | DirectoryRead(e) | Resource(e) => e,
			InconsistentTree => Errno::ENOENT,
			BufferTooSmall => Errno::ERANGE,
			DirectoryTooLarge => Errno::EOVERFLOW,
			Interrupted => Errno::EINTR,
		}
	}
}

impl fmt::Display for CwdError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		use CwdError::*;
		match self {
			NameResolution(e) => write!(f, "name resolution failed: {}", e),
			InconsistentTree => f.write_str("parent directory does not list the child"),
			BufferTooSmall => f.write_str("buffer too small"),
			DirectoryTooLarge => f.write_str("directory listing exceeds the read bound"),
			DirectoryRead(e) => write!(f, "directory read failed: {}", e),
			Resource(e) => write!(f, "out of resources: {}", e),
			Interrupted => f.write_str("interrupted by fatal signal"),
		}
	}
}

/// Writes the absolute path of `start` into `buf`, NUL terminated, and
/// returns its length without the terminator.
///
/// `fatal_pending` is polled before every ascent. When a parent lists the
/// child's inode number more than once, the first record in stored order
/// wins; which name that is may change as the directory is modified.
///
/// On error the content of `buf` is unspecified.
pub fn reconstruct_path(
	start: &Arc<dyn DirInode>,
	resolver: &dyn NameResolver,
	buf: &mut [u8],
	config: &WalkConfig,
	fatal_pending: &dyn Fn() -> bool,
) -> Result<usize, CwdError> {
	let mut acc = PathAccumulator::new(buf)?;

	let root = lookup_root(resolver, start).map_err(CwdError::NameResolution)?;

	// The loop below never writes anything for the root itself.
	if start.ino() == root.ino() {
		return Ok(acc.finish_root());
	}

	let mut scratch = alloc_scratch(config.dirent_buf_size).map_err(CwdError::Resource)?;
	let mut current = start.clone();

	while current.ino() != root.ino() {
		if fatal_pending() {
			return Err(CwdError::Interrupted);
		}

		let parent = lookup_parent(resolver, &current).map_err(CwdError::NameResolution)?;

		if parent.ino() == current.ino() {
			pr_warn!("getcwd: inode {} is its own parent", current.ino());
			return Err(CwdError::InconsistentTree);
		}

		let name = find_child_name(&parent, current.ino(), &mut scratch, config)?;
		acc.prepend(&scratch[name])?;

		pr_debug!(
			"getcwd: ino {} found in {}, {} bytes left",
			current.ino(),
			parent.ino(),
			acc.remaining()
		);

		current = parent;
	}

	Ok(acc.finish())
}

/// Finds the first record of `parent` naming inode `child` and returns the
/// name's position inside `scratch`.
fn find_child_name(
	parent: &Arc<dyn DirInode>,
	child: Ino,
	scratch: &mut [u8],
	config: &WalkConfig,
) -> Result<Range<usize>, CwdError> {
	let handle = VfsDirHandle::open(parent).map_err(CwdError::DirectoryRead)?;

	for _ in 0..config.max_dir_reads {
		let len = handle
			.getdents(scratch)
			.map_err(CwdError::DirectoryRead)?;

		if len > scratch.len() {
			pr_warn!(
				"getcwd: readdir of parent {} reported {} bytes for a {} byte buffer",
				parent.ino(),
				len,
				scratch.len()
			);
			return Err(CwdError::DirectoryRead(Errno::EIO));
		}

		if len == 0 {
			pr_warn!(
				"getcwd: readdir of parent {} can't find the child {}",
				parent.ino(),
				child
			);
			return Err(CwdError::InconsistentTree);
		}

		if let Some(range) = scan_records(&scratch[..len], child)? {
			return Ok(range);
		}
	}

	match handle.getdents(scratch).map_err(CwdError::DirectoryRead)? {
		0 => {
			pr_warn!(
				"getcwd: readdir of parent {} can't find the child {}",
				parent.ino(),
				child
			);
			Err(CwdError::InconsistentTree)
		}
		_ => {
			pr_warn!(
				"getcwd: directory {} does not fit in {} reads of {} bytes",
				parent.ino(),
				config.max_dir_reads,
				scratch.len()
			);
			Err(CwdError::DirectoryTooLarge)
		}
	}
}

fn scan_records(records: &[u8], child: Ino) -> Result<Option<Range<usize>>, CwdError> {
	let base = records.as_ptr() as usize;

	for dirent in DirentIter::new(records) {
		let dirent = dirent.map_err(|_| CwdError::InconsistentTree)?;

		if dirent.name == b"." || dirent.name == b".." {
			continue;
		}

		if dirent.ino == child {
			let start = dirent.name.as_ptr() as usize - base;
			return Ok(Some(start..start + dirent.name.len()));
		}
	}

	Ok(None)
}

#[cfg(test)]
mod test {
	use super::*;

	use alloc::vec;
	use alloc::vec::Vec;

	use crate::fs::tmpfs::TmpFs;
	use crate::fs::vfs::{write_dirent, FileType};

	fn never() -> bool {
		false
	}

	fn getcwd(fs: &TmpFs, dir: &Arc<dyn DirInode>, size: usize) -> Result<Vec<u8>, CwdError> {
		let mut buf = vec![0u8; size];
		let len = reconstruct_path(dir, fs, &mut buf, &WalkConfig::default(), &never)?;

		assert_eq!(buf[len], 0);
		buf.truncate(len);

		Ok(buf)
	}

	#[test]
	fn root_is_slash() {
		let fs = TmpFs::new();
		let root = fs.root_dir();

		for size in [2, 3, 64, 4096] {
			assert_eq!(getcwd(&fs, &root, size).unwrap(), b"/");
		}
	}

	#[test]
	fn nested() {
		let fs = TmpFs::new();
		let dir: Arc<dyn DirInode> = fs.mkdir_all(b"/home/kfs/src/fs").unwrap();

		assert_eq!(getcwd(&fs, &dir, 64).unwrap(), b"/home/kfs/src/fs");
		assert_eq!(fs.open_dirs(), 0);
	}

	#[test]
	fn skips_dot_entries() {
		let fs = TmpFs::new();
		let dir: Arc<dyn DirInode> = fs.mkdir_all(b"/a").unwrap();

		assert_eq!(getcwd(&fs, &dir, 64).unwrap(), b"/a");
	}

	#[test]
	fn scan_reports_name_range() {
		let mut buf = [0u8; 64];
		let mut sum = 0;
		for (ino, name) in [(2, &b"."[..]), (1, &b".."[..]), (7, &b"abc"[..])] {
			sum += write_dirent(
				&mut buf[sum..],
				ino,
				FileType::Directory,
				name,
			)
			.unwrap();
		}

		let range = scan_records(&buf[..sum], 7).unwrap().unwrap();
		assert_eq!(&buf[range], b"abc");
		assert_eq!(scan_records(&buf[..sum], 9).unwrap(), None);
		assert_eq!(scan_records(&buf[..sum], 2).unwrap(), None);
	}

	#[test]
	fn corrupt_record_is_inconsistent() {
		let mut buf = [0u8; 32];
		let sum = write_dirent(
			&mut buf,
			7,
			FileType::Directory,
			b"abc",
		)
		.unwrap();
		buf[8] = 3;

		assert_eq!(scan_records(&buf[..sum], 7), Err(CwdError::InconsistentTree));
	}

	#[test]
	fn errno_mapping() {
		assert_eq!(Errno::from(CwdError::BufferTooSmall), Errno::ERANGE);
		assert_eq!(Errno::from(CwdError::InconsistentTree), Errno::ENOENT);
		assert_eq!(Errno::from(CwdError::DirectoryTooLarge), Errno::EOVERFLOW);
		assert_eq!(Errno::from(CwdError::Interrupted), Errno::EINTR);
		assert_eq!(
			Errno::from(CwdError::NameResolution(Errno::EIO)),
			Errno::EIO
		);
		assert_eq!(Errno::from(CwdError::Resource(Errno::ENOMEM)), Errno::ENOMEM);
	}
}
