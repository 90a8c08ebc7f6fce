use alloc::{boxed::Box, sync::Arc};

use crate::{pr_warn, syscall::errno::Errno};

use super::DirInode;

pub trait DirHandle {
	/// Fills `buf` with whole records, continuing where the previous call
	/// stopped. Returns 0 at the end of the directory and `EINVAL` when not
	/// even the next record fits.
	fn getdents(&self, buf: &mut [u8]) -> Result<usize, Errno>;
	fn close(&self) -> Result<(), Errno> {
		Ok(())
	}
}

/// Open directory that is closed when it goes out of scope.
pub struct VfsDirHandle {
	inner: Box<dyn DirHandle>,
}

impl VfsDirHandle {
	pub fn open(dir: &Arc<dyn DirInode>) -> Result<Self, Errno> {
		let inner = dir.open()?;

		Ok(Self { inner })
	}

	pub fn getdents(&self, buf: &mut [u8]) -> Result<usize, Errno> {
		self.inner.getdents(buf)
	}
}

impl Drop for VfsDirHandle {
	fn drop(&mut self) {
		if let Err(e) = self.inner.close() {
			pr_warn!("dir handle: close failed: {:?}", e);
		}
	}
}
