use crate::{
	config::WalkConfig, fs::cwd::reconstruct_path, pr_debug, process::task::Task,
	syscall::errno::Errno,
};

/// Writes the task's working directory into `buf` and returns the path
/// length, not counting the terminating NUL.
pub fn sys_getcwd(task: &Task, buf: &mut [u8]) -> Result<usize, Errno> {
	pr_debug!("(pid {}) sys_getcwd({})", task.get_pid(), buf.len());

	if buf.is_empty() {
		return Err(Errno::EINVAL);
	}

	let cwd = task.cwd();
	let fatal_pending = || task.has_fatal_signal();

	let len = reconstruct_path(
		&cwd,
		task.fs().as_ref(),
		buf,
		&WalkConfig::default(),
		&fatal_pending,
	)?;

	Ok(len)
}

#[cfg(test)]
mod test {
	use super::*;

	use alloc::sync::Arc;

	use crate::fs::tmpfs::TmpFs;
	use crate::process::signal::SigNum;

	fn task_in(path: &[u8]) -> (Arc<TmpFs>, Arc<Task>) {
		let fs = Arc::new(TmpFs::new());
		let cwd = fs.mkdir_all(path).unwrap();
		let task = Task::new(1, 0, "sh", fs.clone(), cwd);

		(fs, task)
	}

	#[test]
	fn writes_cwd() {
		let (_, task) = task_in(b"/home/user");
		let mut buf = [0xffu8; 32];

		assert_eq!(sys_getcwd(&task, &mut buf), Ok(10));
		assert_eq!(&buf[..11], b"/home/user\0");
	}

	#[test]
	fn empty_buffer() {
		let (_, task) = task_in(b"/home");

		assert_eq!(sys_getcwd(&task, &mut []), Err(Errno::EINVAL));
	}

	#[test]
	fn small_buffer_is_erange() {
		let (_, task) = task_in(b"/home");
		let mut buf = [0u8; 5];

		assert_eq!(sys_getcwd(&task, &mut buf), Err(Errno::ERANGE));
		assert_eq!(sys_getcwd(&task, &mut buf[..1]), Err(Errno::ERANGE));
	}

	#[test]
	fn removed_cwd_is_enoent() {
		let (fs, task) = task_in(b"/tmp/gone");
		let tmp = fs.mkdir_all(b"/tmp").unwrap();
		let mut buf = [0u8; 32];

		tmp.rmdir(b"gone").unwrap();

		assert_eq!(sys_getcwd(&task, &mut buf), Err(Errno::ENOENT));
		assert_eq!(fs.open_dirs(), 0);
	}

	#[test]
	fn killed_task_is_eintr() {
		let (fs, task) = task_in(b"/a/b");
		let mut buf = [0u8; 32];

		task.send_signal(SigNum::KILL);

		assert_eq!(sys_getcwd(&task, &mut buf), Err(Errno::EINTR));
		assert_eq!(fs.open_dirs(), 0);
	}

	#[test]
	fn killed_task_at_root_still_succeeds() {
		let fs = Arc::new(TmpFs::new());
		let task = Task::new(1, 0, "sh", fs.clone(), fs.root_dir());
		let mut buf = [0u8; 2];

		task.send_signal(SigNum::KILL);

		assert_eq!(sys_getcwd(&task, &mut buf), Ok(1));
		assert_eq!(&buf, b"/\0");
	}
}
