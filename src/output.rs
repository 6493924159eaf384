//! User-facing terminal output for the `patchfs` binary.
//! Colors are used only when the stream is a TTY; logs go through tracing instead.

use owo_colors::OwoColorize;

#[derive(Clone, Copy)]
enum Tone {
    Info,
    Warn,
    Error,
    Ok,
}

fn emit(tone: Tone, msg: &str) {
    let to_stdout = matches!(tone, Tone::Info | Tone::Ok);
    let stream = if to_stdout {
        atty::Stream::Stdout
    } else {
        atty::Stream::Stderr
    };
    let label = match tone {
        Tone::Info => "info:",
        Tone::Warn => "warn:",
        Tone::Error => "error:",
        Tone::Ok => "ok:",
    };
    let line = if atty::is(stream) {
        let colored = match tone {
            Tone::Info => label.cyan().bold().to_string(),
            Tone::Warn => label.yellow().bold().to_string(),
            Tone::Error => label.red().bold().to_string(),
            Tone::Ok => label.green().bold().to_string(),
        };
        format!("{colored} {msg}")
    } else {
        format!("{label} {msg}")
    };
    if to_stdout {
        println!("{line}");
    } else {
        eprintln!("{line}");
    }
}

pub fn print_info(msg: &str) {
    emit(Tone::Info, msg);
}

pub fn print_warn(msg: &str) {
    emit(Tone::Warn, msg);
}

pub fn print_error(msg: &str) {
    emit(Tone::Error, msg);
}

pub fn print_success(msg: &str) {
    emit(Tone::Ok, msg);
}

/// Plain line without a prefix, for output that scripts consume (paths, lines).
pub fn print_user(msg: &str) {
    println!("{msg}");
}
