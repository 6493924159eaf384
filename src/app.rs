//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the Ctrl-C handler and
//! dispatches the requested subcommand to the library.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use patchfs::config::{load_config, resolve_config_path};
use patchfs::output as out;
use patchfs::{
    collect_tree, copy_file, read_lines_from_path, replace_with_outcome, unpack_packed_archive,
};

use crate::cli::{Args, Command};
use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<ExitCode> {
    // Handle --print-config before logging init
    if args.print_config {
        match resolve_config_path(args.config.as_deref()) {
            Some(p) => {
                out::print_user(&p.display().to_string());
                if !p.exists() {
                    out::print_info("No config file exists there yet; defaults are used.");
                }
            }
            None => out::print_warn("Could not determine a config path; defaults are used."),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = args.command.clone() else {
        out::print_error("No command given. Run with --help for usage.");
        return Ok(ExitCode::from(2));
    };

    // File values first, CLI flags win.
    let (mut cfg, cfg_path) = load_config(args.config.as_deref()).inspect_err(|e| {
        out::print_error(&format!("Failed to load config: {e:#}"));
    })?;
    args.apply_overrides(&mut cfg);

    let guard_opt = init_tracing(cfg.log_level, cfg.log_file.as_deref(), cfg.json_logs)
        .inspect_err(|e| out::print_error(&format!("Failed to initialize logging: {e}")))?;

    // Flush the file appender if the user interrupts a long copy or walk.
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            out::print_warn("Received interrupt; exiting.");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
            std::process::exit(130);
        })
        .context("install Ctrl-C handler")?;
    }

    debug!(config = ?cfg_path, ?command, "Starting patchfs");
    let ok = dispatch(&command);

    // Drop the guard explicitly so buffered log lines reach the file.
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Run one command. false means the operation reported failure (already logged).
fn dispatch(command: &Command) -> bool {
    match command {
        Command::Replace { src, dest } => report_replace(src, dest),
        Command::Unpack { packed, target } => {
            let ok = unpack_packed_archive(packed, target);
            if ok {
                out::print_success(&format!("Unpacked '{}' -> '{}'", packed.display(), target.display()));
            } else {
                out::print_error(&format!("Failed to unpack '{}'", packed.display()));
            }
            ok
        }
        Command::Walk { root } => match collect_tree(root) {
            Ok(paths) => {
                for p in paths {
                    out::print_user(&p.display().to_string());
                }
                true
            }
            Err(e) => {
                error!(code = e.code(), root = %root.display(), error = %e, "Walk failed");
                out::print_error(&e.to_string());
                false
            }
        },
        Command::Copy { src, target } => match copy_file(src, target) {
            Ok(bytes) => {
                out::print_success(&format!("Copied {bytes} bytes to '{}'", target.display()));
                true
            }
            Err(e) => {
                error!(code = e.code(), error = %e, "Copy failed");
                out::print_error(&e.to_string());
                false
            }
        },
        Command::Lines { file, count } => match read_lines_from_path(file) {
            Ok(lines) if *count => {
                out::print_user(&lines.len().to_string());
                true
            }
            Ok(lines) => {
                for line in &lines {
                    out::print_user(line);
                }
                true
            }
            Err(e) => {
                error!(code = e.code(), error = %e, "Reading lines failed");
                out::print_error(&e.to_string());
                false
            }
        },
    }
}

fn report_replace(src: &Path, dest: &Path) -> bool {
    match replace_with_outcome(src, dest) {
        Some(strategy) => {
            out::print_success(&format!(
                "Replaced '{}' with '{}' ({strategy})",
                dest.display(),
                src.display()
            ));
            true
        }
        None => {
            out::print_error(&format!("Could not replace '{}'", dest.display()));
            false
        }
    }
}
