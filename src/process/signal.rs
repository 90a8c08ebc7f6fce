use bitflags::bitflags;
use spin::Mutex;

#[repr(usize)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SigNum {
	HUP = 1,
	INT,
	QUIT,
	ILL,
	TRAP,
	ABRT,
	BUS,
	FPE,
	KILL,
	USR1,
	SEGV,
	USR2,
	PIPE,
	ALRM,
	TERM,
	STKFLT,
	CHLD,
	CONT,
	STOP,
}

impl SigNum {
	pub fn from_usize(num: usize) -> Option<Self> {
		use SigNum::*;
		let sig = match num {
			1 => HUP,
			2 => INT,
			3 => QUIT,
			4 => ILL,
			5 => TRAP,
			6 => ABRT,
			7 => BUS,
			8 => FPE,
			9 => KILL,
			10 => USR1,
			11 => SEGV,
			12 => USR2,
			13 => PIPE,
			14 => ALRM,
			15 => TERM,
			16 => STKFLT,
			17 => CHLD,
			18 => CONT,
			19 => STOP,
			_ => return None,
		};

		Some(sig)
	}

	pub const fn index(&self) -> usize {
		*self as usize - 1
	}
}

bitflags! {
	#[repr(transparent)]
	#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
	pub struct SigMask: u32 {
		const HUP = (1 << (SigNum::HUP as u32 - 1));
		const INT = (1 << (SigNum::INT as u32 - 1));
		const QUIT = (1 << (SigNum::QUIT as u32 - 1));
		const ILL = (1 << (SigNum::ILL as u32 - 1));
		const TRAP = (1 << (SigNum::TRAP as u32 - 1));
		const ABRT = (1 << (SigNum::ABRT as u32 - 1));
		const BUS = (1 << (SigNum::BUS as u32 - 1));
		const FPE = (1 << (SigNum::FPE as u32 - 1));
		const KILL = (1 << (SigNum::KILL as u32 - 1));
		const USR1 = (1 << (SigNum::USR1 as u32 - 1));
		const SEGV = (1 << (SigNum::SEGV as u32 - 1));
		const USR2 = (1 << (SigNum::USR2 as u32 - 1));
		const PIPE = (1 << (SigNum::PIPE as u32 - 1));
		const ALRM = (1 << (SigNum::ALRM as u32 - 1));
		const TERM = (1 << (SigNum::TERM as u32 - 1));
		const STKFLT = (1 << (SigNum::STKFLT as u32 - 1));
		const CHLD = (1 << (SigNum::CHLD as u32 - 1));
		const CONT = (1 << (SigNum::CONT as u32 - 1));
		const STOP = (1 << (SigNum::STOP as u32 - 1));
	}
}

impl SigMask {
	/// Signals that end the task no matter what it is doing.
	pub const FATAL: Self = Self::KILL;

	pub fn from_num(num: SigNum) -> Self {
		Self::from_bits_truncate(1 << num.index())
	}
}

/// Signals delivered to a task and not yet handled.
pub struct Signal {
	pending: Mutex<SigMask>,
}

impl Signal {
	pub const fn new() -> Self {
		Self {
			pending: Mutex::new(SigMask::empty()),
		}
	}

	pub fn send(&self, num: SigNum) {
		self.pending.lock().insert(SigMask::from_num(num));
	}

	pub fn clear(&self, num: SigNum) {
		self.pending.lock().remove(SigMask::from_num(num));
	}

	pub fn pending(&self) -> SigMask {
		*self.pending.lock()
	}

	pub fn has_fatal(&self) -> bool {
		self.pending().intersects(SigMask::FATAL)
	}
}

impl Default for Signal {
	fn default() -> Self {
		Self::new()
	}
}
