use std::path::Path;

/// Placeholder the shell substitutes with the clicked file or directory.
pub const TARGET_PLACEHOLDER: &str = "%1";

/// Command line stored in a leaf's `command` key.
///
/// `"<tool>" ["<shim>"] "<script>" "%1"`; the shim is the external launcher
/// that runs the stored script against the target path.
pub fn launch_command(tool_path: &str, shim: Option<&Path>, script: &Path) -> String {
    let mut parts = vec![quote(tool_path)];
    if let Some(shim) = shim {
        parts.push(quote(&shim.display().to_string()));
    }
    parts.push(quote(&script.display().to_string()));
    parts.push(quote(TARGET_PLACEHOLDER));
    parts.join(" ")
}

fn quote(value: &str) -> String {
    format!("\"{value}\"")
}
