use alloc::vec::Vec;

use crate::syscall::errno::Errno;

#[inline]
pub const fn next_align(p: usize, align: usize) -> usize {
	(p + align - 1) & !(align - 1)
}

#[inline]
pub const fn is_aligned(addr: usize, align: usize) -> bool {
	addr % align == 0
}

/// Allocates a zeroed scratch buffer of `size` bytes without aborting on OOM.
pub fn alloc_scratch(size: usize) -> Result<Vec<u8>, Errno> {
	let mut buf = Vec::new();
	buf.try_reserve_exact(size)?;
	buf.resize(size, 0);

	Ok(buf)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn align_up() {
		assert_eq!(next_align(0, 8), 0);
		assert_eq!(next_align(1, 8), 8);
		assert_eq!(next_align(8, 8), 8);
		assert_eq!(next_align(13, 8), 16);
		assert!(is_aligned(next_align(27, 8), 8));
	}

	#[test]
	fn scratch_is_zeroed() {
		let buf = alloc_scratch(64).unwrap();

		assert_eq!(buf.len(), 64);
		assert!(buf.iter().all(|b| *b == 0));
	}

	#[test]
	fn scratch_too_large() {
		assert_eq!(alloc_scratch(usize::MAX), Err(Errno::ENOMEM));
	}
}
