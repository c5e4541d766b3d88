//! Prompt rendering.
//!
//! Pure formatting over the shell home and working directory: no state is
//! read or written beyond the OS lookups for user and host names.

use std::path::Path;

use nix::unistd::{self, User};

/// Render the interactive prompt, `<user@host:dir>`, with the shell home
/// contracted to `~`.
pub fn build_prompt(home: Option<&Path>, cwd: &Path) -> String {
    let user = User::from_uid(unistd::getuid())
        .ok()
        .flatten()
        .map(|user| user.name)
        .unwrap_or_else(|| "user".to_string());
    let host = unistd::gethostname()
        .map(|host| host.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "host".to_string());
    format!("<{}@{}:{}>", user, host, display_dir(home, cwd))
}

/// The working directory for display: the home prefix becomes `~`, but only
/// at a path component boundary, so `/home/user` never contracts inside
/// `/home/username`.
fn display_dir(home: Option<&Path>, cwd: &Path) -> String {
    let cwd = cwd.to_string_lossy();
    if let Some(home) = home {
        let home = home.to_string_lossy();
        if !home.is_empty() {
            if let Some(rest) = cwd.strip_prefix(home.as_ref()) {
                if rest.is_empty() {
                    return "~".to_string();
                }
                if rest.starts_with('/') {
                    return format!("~{rest}");
                }
            }
        }
    }
    cwd.into_owned()
}
