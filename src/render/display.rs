use std::path::Path;
use std::process::Command;

/// Open a saved figure in the platform image viewer.
///
/// Not being able to launch a viewer (headless machines, CI) is logged and
/// otherwise ignored; the figure is already on disk at this point.
pub fn show_figure(path: &Path) {
    match viewer_command(path).spawn() {
        Ok(_) => log::info!("Opened {} in the system viewer", path.display()),
        Err(e) => log::warn!("Could not open {} for display: {}", path.display(), e),
    }
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}
