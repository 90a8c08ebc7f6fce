use core::slice;

use alloc::vec::Vec;

/// Lexically normalized byte path.
///
/// Leading `..` of a relative path are kept as a count in [`Base`], every
/// other `..` cancels the component before it.
#[derive(Debug, Clone)]
pub struct Path {
	base: Base,
	comps: Vec<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Base {
	RootDir,
	WorkingDir { to_parent: usize },
}

impl Path {
	pub fn new_root() -> Self {
		Self {
			base: Base::RootDir,
			comps: Vec::new(),
		}
	}

	pub fn new_parent() -> Self {
		Self {
			base: Base::WorkingDir { to_parent: 1 },
			comps: Vec::new(),
		}
	}

	pub fn new(path: &[u8]) -> Self {
		let mut base = match path.first() {
			Some(b'/') => Base::RootDir,
			_ => Base::WorkingDir { to_parent: 0 },
		};
		let mut comps: Vec<Vec<u8>> = Vec::new();

		for comp in path.split(|ch| *ch == b'/') {
			match comp {
				b"" | b"." => (),
				b".." => {
					if comps.pop().is_none() {
						if let Base::WorkingDir { to_parent } = &mut base {
							*to_parent += 1;
						}
					}
				}
				_ => comps.push(comp.to_vec()),
			}
		}

		Self { base, comps }
	}

	pub fn base(&self) -> Base {
		self.base
	}

	pub fn components(&self) -> slice::Iter<'_, Vec<u8>> {
		self.comps.iter()
	}
}
