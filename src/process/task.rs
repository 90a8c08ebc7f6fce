use core::sync::atomic::{AtomicUsize, Ordering};

use alloc::string::String;
use alloc::sync::Arc;

use spin::Mutex;

use crate::fs::vfs::{DirInode, NameResolver};

use super::signal::{SigNum, Signal};

pub type Pid = usize;
pub type Uid = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
	Running,
	Sleeping,
	Exited,
	Stopped,
	Uninterruptible,
}

impl State {
	/// Letter shown in task listings.
	pub fn letter(&self) -> char {
		use State::*;
		match self {
			Running => 'R',
			Sleeping => 'S',
			Exited => 'Z',
			Stopped => 'T',
			Uninterruptible => 'D',
		}
	}
}

/// Read-only copy of the fields a task listing shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskSnapshot {
	pub uid: Uid,
	pub pid: Pid,
	pub ppid: Pid,
	pub state: State,
	pub sleep_addr: usize,
	pub comm: String,
}

pub struct Task {
	pid: Pid,
	ppid: Pid,
	uid: Uid,
	comm: String,
	state: Mutex<State>,
	sleep_addr: AtomicUsize,
	fs: Arc<dyn NameResolver>,
	cwd: Mutex<Arc<dyn DirInode>>,
	signal: Signal,
}

static LAST_PID: AtomicUsize = AtomicUsize::new(1);

impl Task {
	pub fn new(
		ppid: Pid,
		uid: Uid,
		comm: &str,
		fs: Arc<dyn NameResolver>,
		cwd: Arc<dyn DirInode>,
	) -> Arc<Self> {
		let pid = LAST_PID.fetch_add(1, Ordering::Relaxed);

		Arc::new(Task {
			pid,
			ppid,
			uid,
			comm: String::from(comm),
			state: Mutex::new(State::Running),
			sleep_addr: AtomicUsize::new(0),
			fs,
			cwd: Mutex::new(cwd),
			signal: Signal::new(),
		})
	}

	pub fn get_pid(&self) -> Pid {
		self.pid
	}

	pub fn get_state(&self) -> State {
		*self.state.lock()
	}

	pub fn set_state(&self, state: State) {
		*self.state.lock() = state;
	}

	/// Puts the task to sleep waiting on `addr`.
	pub fn sleep_on(&self, addr: usize) {
		self.sleep_addr.store(addr, Ordering::Relaxed);
		self.set_state(State::Sleeping);
	}

	pub fn wake_up(&self) {
		self.sleep_addr.store(0, Ordering::Relaxed);
		self.set_state(State::Running);
	}

	pub fn fs(&self) -> &Arc<dyn NameResolver> {
		&self.fs
	}

	pub fn cwd(&self) -> Arc<dyn DirInode> {
		self.cwd.lock().clone()
	}

	pub fn set_cwd(&self, dir: Arc<dyn DirInode>) {
		*self.cwd.lock() = dir;
	}

	pub fn send_signal(&self, num: SigNum) {
		self.signal.send(num);
	}

	pub fn has_fatal_signal(&self) -> bool {
		self.signal.has_fatal()
	}

	pub fn snapshot(&self) -> TaskSnapshot {
		TaskSnapshot {
			uid: self.uid,
			pid: self.pid,
			ppid: self.ppid,
			state: self.get_state(),
			sleep_addr: self.sleep_addr.load(Ordering::Relaxed),
			comm: self.comm.clone(),
		}
	}
}
