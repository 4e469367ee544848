//! Unrecoverable failures inside an interposed call.
//!
//! There is no caller to return an error to once a libc entry point has been
//! replaced, so these paths report on fd 2 and abort. Formatting happens into
//! a stack buffer: the heap may be the thing that is broken.

use std::fmt::{self, Write};

const PREFIX: &str = "[fu53] FATAL: ";
const BUF_LEN: usize = 512;

/// `fmt::Write` sink over a fixed byte buffer. Output past the end is
/// silently truncated.
pub struct StackWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> StackWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    /// Longest valid UTF-8 prefix of what has been written.
    pub fn as_str(&self) -> &str {
        match std::str::from_utf8(self.as_bytes()) {
            Ok(s) => s,
            Err(e) => {
                let valid = &self.buf[..e.valid_up_to()];
                // SAFETY: `valid_up_to` marks the end of a validated prefix
                unsafe { std::str::from_utf8_unchecked(valid) }
            }
        }
    }
}

impl Write for StackWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let to_copy = bytes.len().min(self.buf.len() - self.pos);
        self.buf[self.pos..self.pos + to_copy].copy_from_slice(&bytes[..to_copy]);
        self.pos += to_copy;
        Ok(())
    }
}

/// Render the diagnostic line written by [`fatal`].
pub fn render<'a>(buf: &'a mut [u8], args: fmt::Arguments<'_>) -> StackWriter<'a> {
    let mut writer = StackWriter::new(buf);
    let _ = writer.write_str(PREFIX);
    let _ = writer.write_fmt(args);
    let _ = writer.write_char('\n');
    writer
}

/// Report `args` on stderr and abort the process.
pub fn fatal(args: fmt::Arguments<'_>) -> ! {
    let mut buf = [0u8; BUF_LEN];
    let line = render(&mut buf, args);
    let bytes = line.as_bytes();
    // SAFETY: writing an initialised buffer to fd 2
    unsafe {
        libc::write(libc::STDERR_FILENO, bytes.as_ptr().cast(), bytes.len());
    }
    log_gate_error!("aborting", reason = line.as_str().trim_end());
    // SAFETY: abort never returns and has no preconditions
    unsafe { libc::abort() }
}
