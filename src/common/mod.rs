pub mod io;

use env_logger::Env;

/// Reset SIGPIPE to default behavior (SIG_DFL) for coreutils compatibility.
/// Rust sets SIGPIPE to SIG_IGN by default, so `fdedup big.log | head` would
/// report a broken pipe error instead of exiting quietly.
/// This must be called at the start of main().
#[inline]
pub fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

/// Format an IO error message without the "(os error N)" suffix.
/// Prints e.g. "No such file or directory" where Rust's Display impl
/// adds " (os error 2)".
pub fn io_error_msg(e: &std::io::Error) -> String {
    if let Some(raw) = e.raw_os_error() {
        let os_err = std::io::Error::from_raw_os_error(raw);
        let msg = format!("{}", os_err);
        msg.replace(&format!(" (os error {})", raw), "")
    } else {
        format!("{}", e)
    }
}

/// Map a `-v` count to a default log filter: warn, info, then debug.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Initialize env_logger. `RUST_LOG` overrides the level chosen by `-v`.
pub fn init_logging(verbose: u8) {
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level(verbose)))
        .format_timestamp_millis()
        .init();
}
