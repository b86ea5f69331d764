//! Path utilities over plain strings.
//!
//! These functions never touch the filesystem. They split and join on
//! [`PATH_SEPARATOR`]; on Windows `/` is accepted as an alternate separator
//! when reading a path, and [`normalize_path`] rewrites it to `\`.

use regislex_core::PATH_SEPARATOR;

#[inline]
fn is_separator(c: char) -> bool {
    c == PATH_SEPARATOR || (cfg!(windows) && c == '/')
}

/// Join `name` onto `base` with exactly one separator between them.
///
/// The result is identical whether or not `base` already ends in a
/// separator. Leading separators on `name` are dropped, so an absolute
/// `name` is appended rather than replacing `base`. An empty `base`
/// yields `name` unchanged.
pub fn path_join(base: &str, name: &str) -> String {
    if base.is_empty() {
        return name.to_string();
    }

    let name = name.trim_start_matches(is_separator);
    let mut joined = String::with_capacity(base.len() + 1 + name.len());
    joined.push_str(base);
    if !base.ends_with(is_separator) {
        joined.push(PATH_SEPARATOR);
    }
    joined.push_str(name);
    joined
}

/// Final component of `path`, ignoring trailing separators.
///
/// Returns `""` for an empty path or a bare root.
pub fn get_filename(path: &str) -> &str {
    let trimmed = path.trim_end_matches(is_separator);
    trimmed.rsplit(is_separator).next().unwrap_or(trimmed)
}

/// Extension of the final component, without the dot.
///
/// Dot-files (`.profile`) and names ending in a dot have no extension.
pub fn get_extension(path: &str) -> Option<&str> {
    let name = get_filename(path);
    let dot = name.rfind('.')?;
    if dot == 0 || dot + 1 == name.len() {
        return None;
    }
    Some(&name[dot + 1..])
}

/// Everything before the final component.
///
/// Returns `"."` when `path` has no separator, and the root itself when the
/// final component sits directly under the root.
pub fn get_dirname(path: &str) -> String {
    let trimmed = path.trim_end_matches(is_separator);
    if trimmed.is_empty() {
        return if path.starts_with(is_separator) {
            PATH_SEPARATOR.to_string()
        } else {
            ".".to_string()
        };
    }

    match trimmed.rfind(is_separator) {
        None => ".".to_string(),
        Some(idx) => {
            let dir = trimmed[..idx].trim_end_matches(is_separator);
            if dir.is_empty() {
                PATH_SEPARATOR.to_string()
            } else if cfg!(windows) && dir.len() == 2 && dir.ends_with(':') {
                format!("{dir}{PATH_SEPARATOR}")
            } else {
                dir.to_string()
            }
        }
    }
}

/// Split `path` into its root prefix and whether that root is absolute.
fn split_root(path: &str) -> (String, bool, &str) {
    if cfg!(windows) {
        let mut chars = path.chars();
        let (first, second) = (chars.next(), chars.next());

        if matches!((first, second), (Some(a), Some(b)) if is_separator(a) && is_separator(b)) {
            // UNC: \\server\share\...
            let root = format!("{PATH_SEPARATOR}{PATH_SEPARATOR}");
            return (root, true, &path[2..]);
        }
        if let (Some(drive), Some(':')) = (first, second) {
            if drive.is_ascii_alphabetic() {
                let rest = &path[2..];
                if rest.starts_with(is_separator) {
                    return (format!("{drive}:{PATH_SEPARATOR}"), true, rest);
                }
                return (format!("{drive}:"), false, rest);
            }
        }
    }

    if path.starts_with(is_separator) {
        (PATH_SEPARATOR.to_string(), true, path)
    } else {
        (String::new(), false, path)
    }
}

/// Lexically normalize `path`.
///
/// Repeated separators collapse, `.` components disappear and `..` removes
/// the preceding component. A relative path keeps leading `..` components;
/// an absolute path never climbs above its root. The empty result is `"."`.
pub fn normalize_path(path: &str) -> String {
    let (root, absolute, rest) = split_root(path);

    let mut parts: Vec<&str> = Vec::new();
    for component in rest.split(is_separator) {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let separator = PATH_SEPARATOR.to_string();
    let body = parts.join(separator.as_str());
    let normalized = format!("{root}{body}");
    if normalized.is_empty() {
        ".".to_string()
    } else {
        normalized
    }
}
