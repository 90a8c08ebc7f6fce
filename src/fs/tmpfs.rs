//! In-memory filesystem.
//!
//! Directories keep their entries in insertion order and hand them out through
//! `getdents` as packed [`KfsDirent`](super::vfs::KfsDirent) records, `.` and
//! `..` first.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use alloc::sync::{Arc, Weak};
use alloc::{boxed::Box, vec::Vec};

use enum_dispatch::enum_dispatch;
use spin::Mutex;

use super::path::Path;
use super::vfs::{
	walk_dir_path, write_dirent, DirHandle, DirInode, FileInode, FileType, Ino, Inode,
	NameResolver, SymLinkInode, VfsInode,
};
use crate::syscall::errno::Errno;

pub const TMPFS_ROOT_INO: Ino = 2;

struct TmpStat {
	next_ino: AtomicU32,
	open_dirs: AtomicUsize,
}

impl TmpStat {
	fn alloc_ino(&self) -> Ino {
		self.next_ino.fetch_add(1, Ordering::Relaxed)
	}

	/// Takes `ino` and every number below it out of `alloc_ino`'s range.
	fn claim_ino(&self, ino: Ino) -> Result<(), Errno> {
		let next = ino.checked_add(1).ok_or(Errno::EOVERFLOW)?;

		self.next_ino
			.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |curr| {
				(ino >= curr).then_some(next)
			})
			.map(|_| ())
			.map_err(|_| Errno::EEXIST)
	}
}

pub struct TmpFs {
	root: Arc<TmpDirInode>,
	stat: Arc<TmpStat>,
}

impl TmpFs {
	pub fn new() -> Self {
		Self::with_root_ino(TMPFS_ROOT_INO)
	}

	pub fn with_root_ino(ino: Ino) -> Self {
		let stat = Arc::new(TmpStat {
			next_ino: AtomicU32::new(ino + 1),
			open_dirs: AtomicUsize::new(0),
		});

		let root = TmpDirInode::new_shared(ino, Weak::new(), true, stat.clone());

		Self { root, stat }
	}

	pub fn root(&self) -> &Arc<TmpDirInode> {
		&self.root
	}

	pub fn root_dir(&self) -> Arc<dyn DirInode> {
		self.root.clone()
	}

	/// Number of directory handles opened and not yet closed.
	pub fn open_dirs(&self) -> usize {
		self.stat.open_dirs.load(Ordering::Relaxed)
	}

	/// Creates every missing directory of an absolute path.
	pub fn mkdir_all(&self, path: &[u8]) -> Result<Arc<TmpDirInode>, Errno> {
		let path = Path::new(path);
		let mut curr = self.root.clone();

		for comp in path.components() {
			let next = match curr.find(comp) {
				Some(TmpInode::Dir(d)) => d,
				Some(_) => return Err(Errno::ENOTDIR),
				None => curr.mkdir(comp)?,
			};
			curr = next;
		}

		Ok(curr)
	}
}

impl Default for TmpFs {
	fn default() -> Self {
		Self::new()
	}
}

impl NameResolver for TmpFs {
	fn resolve(&self, path: &Path, from: &Arc<dyn DirInode>) -> Result<Arc<dyn DirInode>, Errno> {
		let root: Arc<dyn DirInode> = self.root.clone();

		walk_dir_path(&root, from, path)
	}
}

fn check_name(name: &[u8]) -> Result<(), Errno> {
	match name.is_empty() || name == b"." || name == b".." || name.contains(&b'/') {
		true => Err(Errno::EINVAL),
		false => Ok(()),
	}
}

#[enum_dispatch]
trait TmpNode {
	fn node_ino(&self) -> Ino;
	fn file_type(&self) -> FileType;
	fn to_vfs(&self) -> VfsInode;
}

#[enum_dispatch(TmpNode)]
#[derive(Clone)]
pub enum TmpInode {
	Dir(Arc<TmpDirInode>),
	File(Arc<TmpFileInode>),
	SymLink(Arc<TmpSymLink>),
}

impl TmpInode {
	pub fn ino(&self) -> Ino {
		self.node_ino()
	}
}

impl TmpNode for Arc<TmpDirInode> {
	fn node_ino(&self) -> Ino {
		self.ino
	}

	fn file_type(&self) -> FileType {
		FileType::Directory
	}

	fn to_vfs(&self) -> VfsInode {
		VfsInode::Dir(self.clone())
	}
}

impl TmpNode for Arc<TmpFileInode> {
	fn node_ino(&self) -> Ino {
		self.ino
	}

	fn file_type(&self) -> FileType {
		FileType::Regular
	}

	fn to_vfs(&self) -> VfsInode {
		VfsInode::File(self.clone())
	}
}

impl TmpNode for Arc<TmpSymLink> {
	fn node_ino(&self) -> Ino {
		self.ino
	}

	fn file_type(&self) -> FileType {
		FileType::SymLink
	}

	fn to_vfs(&self) -> VfsInode {
		VfsInode::SymLink(self.clone())
	}
}

pub struct TmpFileInode {
	ino: Ino,
}

impl Inode for TmpFileInode {
	fn ino(&self) -> Ino {
		self.ino
	}
}

impl FileInode for TmpFileInode {}

pub struct TmpSymLink {
	ino: Ino,
	target: Path,
}

impl Inode for TmpSymLink {
	fn ino(&self) -> Ino {
		self.ino
	}
}

impl SymLinkInode for TmpSymLink {
	fn target(&self) -> Result<Path, Errno> {
		Ok(self.target.clone())
	}
}

pub struct TmpDirInode {
	ino: Ino,
	is_root: bool,
	this: Weak<TmpDirInode>,
	parent: Mutex<Weak<TmpDirInode>>,
	sub_files: Mutex<Vec<(Vec<u8>, TmpInode)>>,
	stat: Arc<TmpStat>,
}

impl TmpDirInode {
	fn new_shared(
		ino: Ino,
		parent: Weak<TmpDirInode>,
		is_root: bool,
		stat: Arc<TmpStat>,
	) -> Arc<Self> {
		Arc::new_cyclic(|this| Self {
			ino,
			is_root,
			this: this.clone(),
			parent: Mutex::new(parent),
			sub_files: Mutex::new(Vec::new()),
			stat,
		})
	}

	fn this(&self) -> Result<Arc<TmpDirInode>, Errno> {
		self.this.upgrade().ok_or(Errno::ENOENT)
	}

	fn find(&self, name: &[u8]) -> Option<TmpInode> {
		self.sub_files
			.lock()
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, inode)| inode.clone())
	}

	fn insert(&self, name: &[u8], inode: TmpInode) -> Result<(), Errno> {
		check_name(name)?;

		let mut sub_files = self.sub_files.lock();

		if sub_files.iter().any(|(n, _)| n == name) {
			return Err(Errno::EEXIST);
		}

		sub_files.push((name.to_vec(), inode));

		Ok(())
	}

	fn take(&self, name: &[u8]) -> Result<TmpInode, Errno> {
		let mut sub_files = self.sub_files.lock();

		let pos = sub_files
			.iter()
			.position(|(n, _)| n == name)
			.ok_or(Errno::ENOENT)?;

		Ok(sub_files.remove(pos).1)
	}

	fn is_empty(&self) -> bool {
		self.sub_files.lock().is_empty()
	}

	fn parent(&self) -> Result<Arc<TmpDirInode>, Errno> {
		self.parent.lock().upgrade().ok_or(Errno::ENOENT)
	}

	pub fn mkdir(self: &Arc<Self>, name: &[u8]) -> Result<Arc<TmpDirInode>, Errno> {
		let ino = self.stat.alloc_ino();

		self.add_dir(name, ino)
	}

	/// Like [`mkdir`](Self::mkdir), with a caller chosen inode number.
	///
	/// Fails with `EEXIST` unless `ino` is above every number this
	/// filesystem handed out so far.
	pub fn mkdir_with_ino(self: &Arc<Self>, name: &[u8], ino: Ino) -> Result<Arc<TmpDirInode>, Errno> {
		check_name(name)?;
		self.stat.claim_ino(ino)?;

		self.add_dir(name, ino)
	}

	fn add_dir(self: &Arc<Self>, name: &[u8], ino: Ino) -> Result<Arc<TmpDirInode>, Errno> {
		let new_dir = TmpDirInode::new_shared(ino, Arc::downgrade(self), false, self.stat.clone());

		self.insert(name, TmpInode::Dir(new_dir.clone()))?;

		Ok(new_dir)
	}

	pub fn create(&self, name: &[u8]) -> Result<Arc<TmpFileInode>, Errno> {
		let file = Arc::new(TmpFileInode {
			ino: self.stat.alloc_ino(),
		});

		self.insert(name, TmpInode::File(file.clone()))?;

		Ok(file)
	}

	pub fn symlink(&self, target: &[u8], name: &[u8]) -> Result<Arc<TmpSymLink>, Errno> {
		let symlink = Arc::new(TmpSymLink {
			ino: self.stat.alloc_ino(),
			target: Path::new(target),
		});

		self.insert(name, TmpInode::SymLink(symlink.clone()))?;

		Ok(symlink)
	}

	/// Adds another name for an existing inode. The inode keeps its parent.
	pub fn link(&self, name: &[u8], inode: TmpInode) -> Result<(), Errno> {
		self.insert(name, inode)
	}

	pub fn unlink(&self, name: &[u8]) -> Result<(), Errno> {
		match self.find(name) {
			None => Err(Errno::ENOENT),
			Some(TmpInode::Dir(_)) => Err(Errno::EISDIR),
			Some(_) => self.take(name).map(|_| ()),
		}
	}

	/// Removes an empty directory. The removed directory still answers `..`
	/// with its old parent, which no longer lists it.
	pub fn rmdir(&self, name: &[u8]) -> Result<(), Errno> {
		use TmpInode::*;
		match self.find(name) {
			None => Err(Errno::ENOENT),
			Some(Dir(d)) => match d.is_empty() {
				true => self.take(name).map(|_| ()),
				false => Err(Errno::ENOTEMPTY),
			},
			Some(File(_) | SymLink(_)) => Err(Errno::ENOTDIR),
		}
	}

	pub fn rename(
		&self,
		old_name: &[u8],
		new_parent: &Arc<TmpDirInode>,
		new_name: &[u8],
	) -> Result<(), Errno> {
		check_name(new_name)?;

		if new_parent.find(new_name).is_some() {
			return Err(Errno::EEXIST);
		}

		let inode = self.take(old_name)?;

		if let TmpInode::Dir(d) = &inode {
			*d.parent.lock() = Arc::downgrade(new_parent);
		}

		new_parent.insert(new_name, inode)
	}
}

impl Inode for TmpDirInode {
	fn ino(&self) -> Ino {
		self.ino
	}
}

impl DirInode for TmpDirInode {
	fn open(&self) -> Result<Box<dyn DirHandle>, Errno> {
		let parent_ino = match self.is_root {
			true => self.ino,
			false => self.parent()?.ino,
		};

		let mut v: Vec<(Ino, FileType, Vec<u8>)> = Vec::new();

		v.push((self.ino, FileType::Directory, b".".to_vec()));
		v.push((parent_ino, FileType::Directory, b"..".to_vec()));

		for (name, inode) in self.sub_files.lock().iter() {
			v.push((inode.node_ino(), inode.file_type(), name.clone()))
		}

		self.stat.open_dirs.fetch_add(1, Ordering::Relaxed);

		Ok(Box::new(TmpDir::new(v, self.stat.clone())))
	}

	fn lookup(&self, name: &[u8]) -> Result<VfsInode, Errno> {
		match name {
			b"." => self.this().map(|d| VfsInode::Dir(d)),
			b".." if self.is_root => self.this().map(|d| VfsInode::Dir(d)),
			b".." => self.parent().map(|p| VfsInode::Dir(p)),
			_ => self
				.find(name)
				.map(|inode| inode.to_vfs())
				.ok_or(Errno::ENOENT),
		}
	}
}

pub struct TmpDir {
	dirents: Vec<(Ino, FileType, Vec<u8>)>,
	last: Mutex<usize>,
	stat: Arc<TmpStat>,
}

impl TmpDir {
	fn new(dirents: Vec<(Ino, FileType, Vec<u8>)>, stat: Arc<TmpStat>) -> Self {
		Self {
			dirents,
			last: Mutex::new(0),
			stat,
		}
	}
}

impl DirHandle for TmpDir {
	fn getdents(&self, buf: &mut [u8]) -> Result<usize, Errno> {
		let mut last = self.last.lock();

		if *last == self.dirents.len() {
			return Ok(0);
		}

		let mut total_size = 0;
		for (ino, kind, name) in &self.dirents[*last..] {
			match write_dirent(&mut buf[total_size..], *ino, *kind, name) {
				Some(size) => total_size += size,
				None => break,
			}
			*last += 1;
		}

		if total_size == 0 {
			return Err(Errno::EINVAL);
		}

		Ok(total_size)
	}

	fn close(&self) -> Result<(), Errno> {
		self.stat.open_dirs.fetch_sub(1, Ordering::Relaxed);

		Ok(())
	}
}
