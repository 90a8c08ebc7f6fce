use alloc::sync::Arc;

use crate::config::MAX_SYMLINK_DEPTH;
use crate::fs::path::{Base, Path};
use crate::syscall::errno::Errno;

use super::{DirInode, VfsInode};

/// Resolves paths to directories.
///
/// Relative paths start at `from`. Symbolic links met on the way, including
/// the last component, are followed. `..` of the root is the root.
pub trait NameResolver {
	fn resolve(&self, path: &Path, from: &Arc<dyn DirInode>) -> Result<Arc<dyn DirInode>, Errno>;
}

pub fn lookup_root(
	resolver: &dyn NameResolver,
	from: &Arc<dyn DirInode>,
) -> Result<Arc<dyn DirInode>, Errno> {
	resolver.resolve(&Path::new_root(), from)
}

pub fn lookup_parent(
	resolver: &dyn NameResolver,
	dir: &Arc<dyn DirInode>,
) -> Result<Arc<dyn DirInode>, Errno> {
	resolver.resolve(&Path::new_parent(), dir)
}

/// Component by component walk over [`DirInode::lookup`].
pub fn walk_dir_path(
	root: &Arc<dyn DirInode>,
	from: &Arc<dyn DirInode>,
	path: &Path,
) -> Result<Arc<dyn DirInode>, Errno> {
	walk(root, from, path, 0)
}

fn lookup_base_dir(
	root: &Arc<dyn DirInode>,
	from: &Arc<dyn DirInode>,
	base: Base,
) -> Result<Arc<dyn DirInode>, Errno> {
	let depth = match base {
		Base::RootDir => return Ok(root.clone()),
		Base::WorkingDir { to_parent } => to_parent,
	};

	let mut curr = from.clone();
	for _ in 0..depth {
		curr = curr.lookup(b"..")?.downcast_dir()?;
	}

	Ok(curr)
}

fn walk(
	root: &Arc<dyn DirInode>,
	from: &Arc<dyn DirInode>,
	path: &Path,
	link_depth: usize,
) -> Result<Arc<dyn DirInode>, Errno> {
	let mut curr = lookup_base_dir(root, from, path.base())?;

	for comp in path.components() {
		curr = match curr.lookup(comp)? {
			VfsInode::SymLink(link) => {
				if link_depth >= MAX_SYMLINK_DEPTH {
					return Err(Errno::ELOOP);
				}

				walk(root, &curr, &link.target()?, link_depth + 1)?
			}
			other => other.downcast_dir()?,
		};
	}

	Ok(curr)
}
