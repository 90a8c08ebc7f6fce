//! Backtrace

use core::fmt;

use alloc::string::String;
use alloc::vec::Vec;

use rustc_demangle::demangle;

/// The type that holds informations of the stack frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stackframe {
	pub fn_addr: usize,
}

impl Stackframe {
	pub fn new(fn_addr: usize) -> Self {
		Stackframe { fn_addr }
	}
}

pub trait SymbolTable {
	fn find_name_by_addr(&self, addr: usize) -> Option<&str>;
}

/// Function symbols sorted by start address.
#[derive(Default)]
pub struct KernelSymbol {
	symbols: Vec<(usize, String)>,
}

impl KernelSymbol {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, addr: usize, name: &str) {
		let idx = self.symbols.partition_point(|(a, _)| *a <= addr);
		self.symbols.insert(idx, (addr, String::from(name)));
	}
}

impl SymbolTable for KernelSymbol {
	/// Name of the closest symbol starting at or below `addr`.
	fn find_name_by_addr(&self, addr: usize) -> Option<&str> {
		let idx = self.symbols.partition_point(|(a, _)| *a <= addr);

		idx.checked_sub(1).map(|i| self.symbols[i].1.as_str())
	}
}

pub struct Backtrace<'a> {
	frames: &'a [Stackframe],
	ksyms: &'a dyn SymbolTable,
}

impl<'a> Backtrace<'a> {
	pub fn new(frames: &'a [Stackframe], ksyms: &'a dyn SymbolTable) -> Self {
		Backtrace { frames, ksyms }
	}

	/// Write call stack trace, one frame per line.
	pub fn write_trace(&self, out: &mut dyn fmt::Write) -> fmt::Result {
		for (idx, frame) in self.frames.iter().enumerate() {
			let name = self
				.ksyms
				.find_name_by_addr(frame.fn_addr)
				.unwrap_or("<unknown>");

			writeln!(out, "frame #{}: {:#010x}: {:#}", idx, frame.fn_addr, demangle(name))?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn ksyms() -> KernelSymbol {
		let mut ksyms = KernelSymbol::new();

		ksyms.insert(0xc010_3000, "_ZN6kernel2fs3cwd16reconstruct_path17h0123456789abcdefE");
		ksyms.insert(0xc010_1000, "kernel_entry");

		ksyms
	}

	#[test]
	fn lookup_by_addr() {
		let ksyms = ksyms();

		assert_eq!(ksyms.find_name_by_addr(0xc010_0fff), None);
		assert_eq!(ksyms.find_name_by_addr(0xc010_1000), Some("kernel_entry"));
		assert_eq!(ksyms.find_name_by_addr(0xc010_2fff), Some("kernel_entry"));
		assert!(ksyms
			.find_name_by_addr(0xc010_3042)
			.is_some_and(|n| n.contains("reconstruct_path")));
	}

	#[test]
	fn trace_is_demangled() {
		let ksyms = ksyms();
		let frames = [
			Stackframe::new(0xc010_3042),
			Stackframe::new(0xc010_1010),
			Stackframe::new(0x10),
		];
		let mut out = String::new();

		Backtrace::new(&frames, &ksyms).write_trace(&mut out).unwrap();

		assert_eq!(
			out,
			"frame #0: 0xc0103042: kernel::fs::cwd::reconstruct_path\n\
			 frame #1: 0xc0101010: kernel_entry\n\
			 frame #2: 0x00000010: <unknown>\n"
		);
	}
}
