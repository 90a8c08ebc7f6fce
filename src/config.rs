pub const PAGE_SIZE: usize = 4096;

pub const MAX_SYMLINK_DEPTH: usize = 40;

pub const DIRENT_ALIGN: usize = 8;

/// Bounds of one working directory walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkConfig {
	/// Size of the scratch buffer one `getdents` call fills.
	pub dirent_buf_size: usize,
	/// How many `getdents` calls a single parent directory may take.
	pub max_dir_reads: usize,
}

impl WalkConfig {
	pub const fn new() -> Self {
		Self {
			dirent_buf_size: PAGE_SIZE,
			max_dir_reads: 1,
		}
	}

	pub const fn with_dirent_buf_size(mut self, size: usize) -> Self {
		self.dirent_buf_size = size;
		self
	}

	pub const fn with_max_dir_reads(mut self, reads: usize) -> Self {
		self.max_dir_reads = reads;
		self
	}
}

impl Default for WalkConfig {
	fn default() -> Self {
		Self::new()
	}
}
