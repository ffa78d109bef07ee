use std::process;

/// Echo identifier for this run: the process ID truncated to 16 bits.
pub fn process_identifier() -> u16 {
    (process::id() & 0xFFFF) as u16
}

/// Print error message and exit with error code
pub fn exit_with_error(message: &str, code: i32) -> ! {
    eprintln!("echoprobe: {}", message);
    process::exit(code);
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("warning: {}", message);
}
