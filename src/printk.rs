use core::fmt;

use alloc::string::String;

#[macro_export]
macro_rules! pr_err {
	($($args:tt)*) => {
		::log::error!($($args)*)
	};
}

#[macro_export]
macro_rules! pr_warn {
	($($args:tt)*) => {
		::log::warn!($($args)*)
	};
}

#[macro_export]
macro_rules! pr_info {
	($($args:tt)*) => {
		::log::info!($($args)*)
	};
}

#[macro_export]
macro_rules! pr_debug {
	($($args:tt)*) => {
		::log::debug!($($args)*)
	};
}

/// Line writer that hands every complete line to the log at info level.
///
/// Pending text without a trailing newline is flushed on drop.
pub struct Printk {
	line: String,
}

impl Printk {
	pub const fn new() -> Self {
		Self { line: String::new() }
	}

	fn flush_line(&mut self) {
		crate::pr_info!("{}", self.line);
		self.line.clear();
	}
}

impl fmt::Write for Printk {
	fn write_str(&mut self, s: &str) -> fmt::Result {
		let mut rest = s;

		while let Some(pos) = rest.find('\n') {
			let (line, next) = rest.split_at(pos);
			self.line.push_str(line);
			self.flush_line();
			rest = &next[1..];
		}

		self.line.push_str(rest);

		Ok(())
	}
}

impl Drop for Printk {
	fn drop(&mut self) {
		if !self.line.is_empty() {
			self.flush_line();
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	use core::fmt::Write;

	#[test]
	fn keeps_partial_line() {
		let mut printk = Printk::new();

		write!(printk, "first\nsec").unwrap();
		assert_eq!(printk.line, "sec");

		writeln!(printk, "ond").unwrap();
		assert!(printk.line.is_empty());
	}
}
