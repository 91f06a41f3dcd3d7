//! Console messages for the command line
//!
//! Coloured one-line messages printed outside the TUI, mainly by the
//! snapshot command.

fn print_with_details(tag: &str, title: &str, details: &str) {
    print!("{} {}", tag, title);
    if !details.is_empty() {
        println!("\t {}", details);
    } else {
        println!();
    }
}

pub fn print_info(title: &str, details: &str) {
    print_with_details("\x1b[1;33m[INFO]\x1b[0m", title, details);
}

pub fn print_warn(title: &str, details: &str) {
    print_with_details("\x1b[1;91m[WARN]\x1b[0m", title, details);
}

/// Errors go to stderr so a failed snapshot leaves stdout clean.
pub fn print_error(title: &str, details: Option<&str>) {
    eprintln!("\x1b[1;31m[ERROR]\x1b[0m {}", title);
    if let Some(details) = details {
        eprintln!("\x1b[1;31m[ERROR]\x1b[0m Details: {}", details);
    }
}

#[macro_export]
macro_rules! print_cmd_info {
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_info($title, &format!($($details)*))
    };
}

#[macro_export]
macro_rules! print_cmd_warn {
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_warn($title, &format!($($details)*))
    };
}

#[macro_export]
macro_rules! print_cmd_error {
    ($title:expr) => {
        $crate::cli_messages::print_error($title, None)
    };
    ($title:expr, $details:expr) => {
        $crate::cli_messages::print_error($title, Some($details))
    };
}
