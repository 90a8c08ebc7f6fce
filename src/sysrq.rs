//! Debug keys

use core::fmt::{self, Write};

use crate::backtrace::{Backtrace, Stackframe, SymbolTable};
use crate::printk::Printk;
use crate::process::task::{Pid, State, TaskSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SysRq {
	Stack,
	Tasks,
	Undefined,
}

impl SysRq {
	pub fn from_key(key: u8) -> Self {
		use SysRq::*;
		match key {
			b'l' => Stack,
			b't' => Tasks,
			_ => Undefined,
		}
	}
}

/// What the debug keys look at. Everything is copied before the dispatch so
/// nothing is locked while printing.
pub struct SysRqContext<'a> {
	pub tasks: &'a [TaskSnapshot],
	pub run_queue: &'a [Pid],
	pub frames: &'a [Stackframe],
	pub ksyms: &'a dyn SymbolTable,
}

pub fn do_sysrq(op: SysRq, ctx: &SysRqContext, out: &mut dyn Write) -> fmt::Result {
	use SysRq::*;
	match op {
		Stack => {
			writeln!(out, "sysrq: Stack backtrace.")?;
			Backtrace::new(ctx.frames, ctx.ksyms).write_trace(out)
		}
		Tasks => {
			writeln!(out, "sysrq: Task list.")?;
			task_list(ctx.tasks, ctx.run_queue, out)
		}
		Undefined => writeln!(out, "sysrq: Undefined operation."),
	}
}

/// Runs `op` with the kernel log as output.
pub fn handle_sysrq(op: SysRq, ctx: &SysRqContext) {
	let mut printk = Printk::new();

	// Printk only buffers, it never fails.
	let _ = do_sysrq(op, ctx, &mut printk);
}

fn task_list(tasks: &[TaskSnapshot], run_queue: &[Pid], out: &mut dyn Write) -> fmt::Result {
	writeln!(out, "USER   PID   PPID  S SLEEP_ADDR CMD")?;

	for t in tasks.iter().filter(|t| t.state != State::Exited) {
		write!(out, "{}    {:5}  {:5}  {} ", t.uid, t.pid, t.ppid, t.state.letter())?;

		match t.state {
			State::Sleeping => write!(out, "{:#010x} ", t.sleep_addr)?,
			_ => out.write_str("           ")?,
		}

		writeln!(out, "{}", t.comm)?;
	}

	out.write_str("PIDs in running queue: ")?;
	for pid in run_queue {
		write!(out, "{} ", pid)?;
	}
	out.write_char('\n')
}
