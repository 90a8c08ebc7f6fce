use alloc::{boxed::Box, sync::Arc};

use crate::{fs::path::Path, syscall::errno::Errno};

use super::DirHandle;

/// Inode number, unique within one filesystem.
pub type Ino = u32;

pub trait Inode {
	fn ino(&self) -> Ino;
}

pub trait DirInode: Inode {
	fn open(&self) -> Result<Box<dyn DirHandle>, Errno>;
	/// Looks up a single name. `.` and `..` are answered by the directory
	/// itself; `..` of a filesystem root is the root.
	fn lookup(&self, name: &[u8]) -> Result<VfsInode, Errno>;
}

pub trait FileInode: Inode {}

pub trait SymLinkInode: Inode {
	fn target(&self) -> Result<Path, Errno>;
}

#[derive(Clone)]
pub enum VfsInode {
	File(Arc<dyn FileInode>),
	Dir(Arc<dyn DirInode>),
	SymLink(Arc<dyn SymLinkInode>),
}

impl VfsInode {
	pub fn ino(&self) -> Ino {
		use VfsInode::*;
		match self {
			File(f) => f.ino(),
			Dir(d) => d.ino(),
			SymLink(s) => s.ino(),
		}
	}

	pub fn downcast_dir(self) -> Result<Arc<dyn DirInode>, Errno> {
		use VfsInode::*;
		match self {
			Dir(d) => Ok(d),
			File(_) | SymLink(_) => Err(Errno::ENOTDIR),
		}
	}

	pub fn file_type(&self) -> FileType {
		use VfsInode::*;
		match self {
			File(_) => FileType::Regular,
			Dir(_) => FileType::Directory,
			SymLink(_) => FileType::SymLink,
		}
	}
}

/// `file_type` byte of a directory record, ext2 numbering.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
	Unknown = 0,
	Regular = 1,
	Directory = 2,
	SymLink = 7,
}

impl FileType {
	pub fn from_u8(v: u8) -> Self {
		use FileType::*;
		match v {
			1 => Regular,
			2 => Directory,
			7 => SymLink,
			_ => Unknown,
		}
	}
}
