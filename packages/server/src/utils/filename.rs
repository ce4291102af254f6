/// Whether a client-supplied upload name is a single flat component.
///
/// Rejects empty names, path separators, `..`, and control characters
/// (including NUL). Leading dots are fine since only the extension is ever
/// used on disk.
fn is_flat_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != ".."
        && !filename.contains(['/', '\\'])
        && !filename.chars().any(|c| c.is_ascii_control())
}

/// Lower-cased extension of an upload filename, if it has a usable one
/// (1-10 ASCII alphanumerics after the last dot, non-empty stem).
pub fn extension_of(filename: &str) -> Option<String> {
    let name = filename.trim();
    if !is_flat_filename(name) {
        return None;
    }
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > 10
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
