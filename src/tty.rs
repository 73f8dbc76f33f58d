use anyhow::Result;

/// Points stdin and stdout at the controlling terminal for as long as it lives,
/// so the picker can draw while the real stdout stays free for the selection.
/// Dropping it flushes and restores the original descriptors.
pub struct TtyRedirect {
    #[cfg(unix)]
    saved: [libc::c_int; 2],
}

#[cfg(unix)]
impl TtyRedirect {
    pub fn acquire() -> Result<Self> {
        use std::fs::OpenOptions;
        use std::os::fd::AsRawFd;

        use anyhow::{Context, bail};

        let tty = OpenOptions::new()
            .read(true)
            .write(true)
            .open("/dev/tty")
            .context("failed to open /dev/tty")?;

        let mut saved = [-1; 2];
        for (slot, fd) in saved.iter_mut().zip([libc::STDIN_FILENO, libc::STDOUT_FILENO]) {
            let copy = unsafe { libc::dup(fd) };
            if copy < 0 {
                let err = std::io::Error::last_os_error();
                close_all(&saved);
                return Err(err).context("failed to save standard descriptors");
            }
            *slot = copy;
        }

        for fd in [libc::STDIN_FILENO, libc::STDOUT_FILENO] {
            if unsafe { libc::dup2(tty.as_raw_fd(), fd) } < 0 {
                let err = std::io::Error::last_os_error();
                restore(&saved);
                close_all(&saved);
                bail!("failed to redirect fd {fd} to /dev/tty: {err}");
            }
        }

        tracing::debug!(stdin = saved[0], stdout = saved[1], "standard streams moved to /dev/tty");
        Ok(Self { saved })
    }
}

#[cfg(unix)]
impl Drop for TtyRedirect {
    fn drop(&mut self) {
        use std::io::Write;

        let _ = std::io::stdout().flush();
        restore(&self.saved);
        close_all(&self.saved);
    }
}

#[cfg(unix)]
fn restore(saved: &[libc::c_int; 2]) {
    for (copy, fd) in saved.iter().zip([libc::STDIN_FILENO, libc::STDOUT_FILENO]) {
        if *copy >= 0 {
            unsafe { libc::dup2(*copy, fd) };
        }
    }
}

#[cfg(unix)]
fn close_all(saved: &[libc::c_int; 2]) {
    for copy in saved {
        if *copy >= 0 {
            unsafe { libc::close(*copy) };
        }
    }
}

#[cfg(not(unix))]
impl TtyRedirect {
    pub fn acquire() -> Result<Self> {
        Ok(Self {})
    }
}
