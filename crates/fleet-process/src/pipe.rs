//! PipeFactory (spec §4, leaf component): creates a pair of descriptors for
//! a child's output stream, read end non-blocking, both ends close-on-exec.

use anyhow::{Context, Result};
use nix::fcntl::{FcntlArg, OFlag, fcntl};
use nix::unistd::pipe;
use std::fs::File;
use std::os::fd::{AsRawFd, OwnedFd};
use tokio::net::unix::pipe::Receiver;

/// One end owned by us (the non-blocking read side, wrapped for the async
/// runtime's reactor), the other handed to the child as its stdout/stderr.
pub struct ChildPipe {
    pub reader: Receiver,
    pub writer: OwnedFd,
}

/// Create a pipe with the read end in non-blocking mode.
///
/// `nix::unistd::pipe` sets `O_CLOEXEC` on both ends; the write end's
/// close-on-exec flag is irrelevant once `std::process::Command` dup2s it
/// onto the child's stdout/stderr slot (the dup'd descriptor in the child
/// starts without `O_CLOEXEC`), so only the read end needs further setup.
pub fn create_pipe() -> Result<ChildPipe> {
    let (read_fd, write_fd): (OwnedFd, OwnedFd) =
        pipe().context("failed to create output pipe")?;

    fcntl(read_fd.as_raw_fd(), FcntlArg::F_SETFL(OFlag::O_NONBLOCK))
        .context("failed to set O_NONBLOCK on pipe read end")?;

    let reader = Receiver::from_file(File::from(read_fd))
        .context("failed to register pipe read end with the async runtime")?;

    Ok(ChildPipe {
        reader,
        writer: write_fd,
    })
}
