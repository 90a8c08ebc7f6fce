use super::CwdError;

/// Builds a path backward inside a fixed caller buffer.
///
/// Components are prepended in front of `marker`, the first occupied byte.
/// The last byte of the buffer is kept for the terminator and never written
/// while components are added.
pub struct PathAccumulator<'a> {
	buf: &'a mut [u8],
	marker: usize,
}

impl<'a> PathAccumulator<'a> {
	/// Fails with `BufferTooSmall` unless there is room for at least "/" and
	/// the terminator.
	pub fn new(buf: &'a mut [u8]) -> Result<Self, CwdError> {
		if buf.len() < 2 {
			return Err(CwdError::BufferTooSmall);
		}

		let marker = buf.len() - 1;

		Ok(Self { buf, marker })
	}

	/// Bytes still free in front of the accumulated path.
	pub fn remaining(&self) -> usize {
		self.marker
	}

	pub fn len(&self) -> usize {
		self.end() - self.marker
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn end(&self) -> usize {
		self.buf.len() - 1
	}

	/// Writes `'/'` and `name` in front of the accumulated path.
	///
	/// On `BufferTooSmall` nothing is written.
	pub fn prepend(&mut self, name: &[u8]) -> Result<(), CwdError> {
		let need = name.len() + 1;
		let start = self
			.remaining()
			.checked_sub(need)
			.ok_or(CwdError::BufferTooSmall)?;

		self.buf[start] = b'/';
		self.buf[start + 1..start + need].copy_from_slice(name);
		self.marker = start;

		Ok(())
	}

	/// Moves the path to the start of the buffer, terminates it and returns
	/// its length. An empty accumulator yields "/".
	pub fn finish(self) -> usize {
		if self.is_empty() {
			return self.finish_root();
		}

		let len = self.len();
		let end = self.end();

		self.buf.copy_within(self.marker..end, 0);
		self.buf[len] = b'\0';

		len
	}

	pub fn finish_root(self) -> usize {
		self.buf[0] = b'/';
		self.buf[1] = b'\0';

		1
	}
}
