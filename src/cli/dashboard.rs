//! A console launcher for coursework scripts.
//!
//! Units are folders under the base directory; each unit holds subfolders,
//! each subfolder holds scripts. Selecting a script prints its source and
//! offers to run it.

use std::{
    ffi::OsStr,
    io::{BufRead, Write},
    path::{Path, PathBuf},
    process::Command,
};

use clap::Parser;
use deskwork::domain::DashboardSettings;
use tracing::instrument;
use walkdir::WalkDir;

use crate::cli::prompt::{PromptError, Prompter};

/// Terminal emulators tried, in order, to run a script in a new window.
const TERMINALS: [(&str, &[&str]); 7] = [
    ("x-terminal-emulator", &["-e"]),
    ("xterm", &["-hold", "-e"]),
    ("konsole", &["-e"]),
    ("xfce4-terminal", &["-e"]),
    ("tilix", &["-e"]),
    ("kitty", &["-e"]),
    ("alacritty", &["-e"]),
];

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Command arguments for `desk dashboard`.
#[derive(Debug, Parser, Default)]
pub struct Dashboard {
    /// Directory holding the unit folders (overrides the configuration)
    #[arg(long)]
    base_dir: Option<PathBuf>,
}

impl Dashboard {
    #[instrument(skip(settings))]
    pub fn run(self, settings: &DashboardSettings) -> anyhow::Result<()> {
        let mut settings = settings.clone();
        if let Some(base_dir) = self.base_dir {
            settings.base_dir = base_dir;
        }
        match main_menu(&settings, &mut Prompter::stdio()) {
            Ok(()) => Ok(()),
            Err(PromptError::Eof) => {
                println!("\nExiting...");
                Ok(())
            }
            Err(PromptError::Io(e)) => Err(e.into()),
        }
    }
}

/// Where to go after leaving a submenu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leave {
    Back,
    MainMenu,
}

fn clear<R: BufRead, W: Write>(
    settings: &DashboardSettings,
    p: &mut Prompter<R, W>,
) -> Result<(), PromptError> {
    if settings.clear_screen {
        write!(p.output(), "{CLEAR_SCREEN}")?;
    }
    Ok(())
}

fn main_menu<R: BufRead, W: Write>(
    settings: &DashboardSettings,
    p: &mut Prompter<R, W>,
) -> Result<(), PromptError> {
    loop {
        clear(settings, p)?;
        p.say("Main menu - Dashboard")?;
        for (key, unit) in &settings.units {
            p.say(format!("{key} - {unit}"))?;
        }
        p.say("0 - Exit")?;

        let choice = p.line("Choose a unit or '0' to exit: ")?;
        if choice == "0" {
            p.say("Leaving the dashboard.")?;
            return Ok(());
        }
        let Some(unit) = settings.units.get(&choice) else {
            p.failure("Invalid option, please try again.")?;
            p.pause("Press Enter to continue...")?;
            continue;
        };

        let unit_dir = settings.base_dir.join(unit);
        if !unit_dir.is_dir() {
            tracing::warn!("unit folder not found: {}", unit_dir.display());
            p.failure(&format!("The folder {} does not exist.", unit_dir.display()))?;
            p.pause("Press Enter to continue...")?;
            continue;
        }
        folder_menu(settings, &unit_dir, p)?;
    }
}

fn folder_menu<R: BufRead, W: Write>(
    settings: &DashboardSettings,
    unit_dir: &Path,
    p: &mut Prompter<R, W>,
) -> Result<(), PromptError> {
    loop {
        clear(settings, p)?;
        let folders = list_entries(unit_dir, |path| path.is_dir());
        p.say(format!("Submenu - {}", file_name(unit_dir)))?;
        if folders.is_empty() {
            p.say("(This unit has no subfolders)")?;
        }
        for (index, folder) in folders.iter().enumerate() {
            p.say(format!("{} - {}", index + 1, file_name(folder)))?;
        }
        p.say("0 - Back to the main menu")?;

        let choice = p.line("Choose a subfolder or '0' to go back: ")?;
        if choice == "0" {
            return Ok(());
        }
        match pick(&choice, &folders) {
            Ok(folder) => {
                if script_menu(settings, folder, p)? == Leave::MainMenu {
                    return Ok(());
                }
            }
            Err(message) => {
                p.failure(message)?;
                p.pause("Press Enter to continue...")?;
            }
        }
    }
}

fn script_menu<R: BufRead, W: Write>(
    settings: &DashboardSettings,
    folder: &Path,
    p: &mut Prompter<R, W>,
) -> Result<Leave, PromptError> {
    let extension = OsStr::new(&settings.extension);
    loop {
        clear(settings, p)?;
        let scripts = list_entries(folder, |path| {
            path.is_file() && path.extension() == Some(extension)
        });
        p.say(format!("Scripts - {}", file_name(folder)))?;
        if scripts.is_empty() {
            p.say(format!("(No .{} scripts in this folder)", settings.extension))?;
        }
        for (index, script) in scripts.iter().enumerate() {
            p.say(format!("{} - {}", index + 1, file_name(script)))?;
        }
        p.say("0 - Back to the previous menu")?;
        p.say("9 - Back to the main menu")?;

        let choice = p.line("Choose a script, '0' to go back or '9' for the main menu: ")?;
        match choice.as_str() {
            "0" => return Ok(Leave::Back),
            "9" => return Ok(Leave::MainMenu),
            _ => {}
        }
        match pick(&choice, &scripts) {
            Ok(script) => {
                show_and_run(settings, script, p)?;
                p.pause("\nPress Enter to return to the script list.")?;
            }
            Err(message) => {
                p.failure(message)?;
                p.pause("Press Enter to continue...")?;
            }
        }
    }
}

fn show_and_run<R: BufRead, W: Write>(
    settings: &DashboardSettings,
    script: &Path,
    p: &mut Prompter<R, W>,
) -> Result<(), PromptError> {
    match std::fs::read_to_string(script) {
        Ok(source) => {
            p.say(format!("\n--- Source of {} ---\n", file_name(script)))?;
            p.say(source)?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            tracing::warn!("{} is not valid UTF-8", script.display());
            p.failure("The file is not valid UTF-8; check its encoding.")?;
            return Ok(());
        }
        Err(e) => {
            tracing::warn!("failed to read {}: {e}", script.display());
            p.failure(&format!("Could not read the file: {e}"))?;
            return Ok(());
        }
    }

    p.say("\n1: Run in a NEW window")?;
    p.say("2: Run in THIS console")?;
    p.say("0: Don't run")?;
    match p.line("Choose an option: ")?.as_str() {
        "1" => run_in_new_window(settings, script, p),
        "2" => run_here(settings, script, p),
        "0" => p.say("The script was not run.").map_err(Into::into),
        _ => p.failure("Invalid option.").map_err(Into::into),
    }
}

fn run_here<R: BufRead, W: Write>(
    settings: &DashboardSettings,
    script: &Path,
    p: &mut Prompter<R, W>,
) -> Result<(), PromptError> {
    p.say(format!("\n>>> Running {} in this console...\n", file_name(script)))?;
    p.output().flush()?;
    tracing::info!("running {} with {}", script.display(), settings.interpreter);
    match Command::new(&settings.interpreter).arg(script).status() {
        Ok(status) => {
            let code = status
                .code()
                .map_or_else(|| "none (terminated by a signal)".to_string(), |c| c.to_string());
            p.say(format!("\n>>> Process finished with exit code {code}\n"))?;
        }
        Err(e) => {
            tracing::warn!("failed to start {}: {e}", settings.interpreter);
            p.failure(&format!("Could not start '{}': {e}", settings.interpreter))?;
        }
    }
    Ok(())
}

fn run_in_new_window<R: BufRead, W: Write>(
    settings: &DashboardSettings,
    script: &Path,
    p: &mut Prompter<R, W>,
) -> Result<(), PromptError> {
    let Some((terminal, args)) = TERMINALS
        .iter()
        .find_map(|(name, args)| find_on_path(name).map(|path| (path, *args)))
    else {
        p.warn("No graphical terminal found. Running in this console...")?;
        return run_here(settings, script, p);
    };

    tracing::info!("opening {} in {}", script.display(), terminal.display());
    let spawned = Command::new(&terminal)
        .args(args)
        .arg(&settings.interpreter)
        .arg(script)
        .spawn();
    if let Err(e) = spawned {
        tracing::warn!("failed to open {}: {e}", terminal.display());
        p.warn("Could not open a new window. Running in this console...")?;
        return run_here(settings, script, p);
    }
    p.success(&format!("Opened {} in a new window.", file_name(script)))?;
    Ok(())
}

/// Looks up an executable by name in the directories listed in `PATH`.
fn find_on_path(program: &str) -> Option<PathBuf> {
    find_in(&std::env::var_os("PATH")?, program)
}

fn find_in(paths: &OsStr, program: &str) -> Option<PathBuf> {
    std::env::split_paths(paths)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// The direct children of `dir` accepted by `keep`, sorted case-insensitively
/// by name. A missing directory has no entries.
fn list_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .map(walkdir::DirEntry::into_path)
        .filter(|path| keep(path.as_path()))
        .collect();
    entries.sort_by_cached_key(|path| file_name(path).to_lowercase());
    entries
}

fn pick<'a>(choice: &str, entries: &'a [PathBuf]) -> Result<&'a PathBuf, &'static str> {
    let index: usize = choice
        .parse()
        .map_err(|_| "Invalid option (it must be a number).")?;
    index
        .checked_sub(1)
        .and_then(|i| entries.get(i))
        .ok_or("Option out of range.")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
