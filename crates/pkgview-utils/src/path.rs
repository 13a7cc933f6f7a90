use std::{
    env,
    iter::Peekable,
    path::PathBuf,
    str::Chars,
};

use crate::error::{PathError, PathResult};

/// Fallback for `$XDG_DATA_DIRS` when the variable is unset or empty.
pub const DEFAULT_DATA_DIRS: &[&str] = &["/usr/local/share", "/usr/share"];

/// Resolves a path string that may contain environment variables.
///
/// Expands `$VAR` and `${VAR}`, replaces a leading `~` with the home directory and
/// makes relative paths absolute against the current working directory.
///
/// # Errors
///
/// * [`PathError::Empty`] if the path is empty
/// * [`PathError::CurrentDir`] if the current directory cannot be determined
/// * [`PathError::MissingEnvVar`] if a referenced variable is undefined
/// * [`PathError::UnclosedVariable`] if a `${` is never closed
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();

    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let path_buf = PathBuf::from(expand_variables(path)?);

    if path_buf.is_absolute() {
        Ok(path_buf)
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path_buf))
            .map_err(|err| PathError::CurrentDir { source: err })
    }
}

/// Returns the user's home directory.
///
/// Uses `$HOME`, falling back to the passwd entry of the current user and finally
/// to `/home/{uid}`.
pub fn home_dir() -> PathBuf {
    if let Some(home) = non_empty_var("HOME") {
        return PathBuf::from(home);
    }

    let uid = nix::unistd::getuid();
    match nix::unistd::User::from_uid(uid) {
        Ok(Some(user)) => user.dir,
        _ => PathBuf::from(format!("/home/{uid}")),
    }
}

/// `$XDG_CONFIG_HOME`, default `$HOME/.config`.
pub fn xdg_config_home() -> PathBuf {
    non_empty_var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
}

/// `$XDG_DATA_HOME`, default `$HOME/.local/share`.
pub fn xdg_data_home() -> PathBuf {
    non_empty_var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".local/share"))
}

/// The ordered list of system data directories from `$XDG_DATA_DIRS`.
///
/// Relative entries are ignored, as required by the XDG base directory layout.
pub fn xdg_data_dirs() -> Vec<PathBuf> {
    let dirs: Vec<PathBuf> = non_empty_var("XDG_DATA_DIRS")
        .map(|value| {
            value
                .split(':')
                .map(PathBuf::from)
                .filter(|path| path.is_absolute())
                .collect()
        })
        .unwrap_or_default();

    if dirs.is_empty() {
        DEFAULT_DATA_DIRS.iter().map(PathBuf::from).collect()
    } else {
        dirs
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

fn expand_variables(path: &str) -> PathResult<String> {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                let var_name = consume_until(&mut chars, '}')?;
                expand_env_var(&var_name, &mut result, path)?;
            }
            '$' => {
                let var_name = consume_var_name(&mut chars);
                if var_name.is_empty() {
                    result.push('$');
                } else {
                    expand_env_var(&var_name, &mut result, path)?;
                }
            }
            '~' if result.is_empty() => result.push_str(&home_dir().to_string_lossy()),
            _ => result.push(c),
        }
    }

    Ok(result)
}

fn consume_until(chars: &mut Peekable<Chars>, delimiter: char) -> PathResult<String> {
    let mut var_name = String::new();

    for c in chars.by_ref() {
        if c == delimiter {
            return Ok(var_name);
        }
        var_name.push(c);
    }

    Err(PathError::UnclosedVariable {
        input: format!("${{{var_name}"),
    })
}

fn consume_var_name(chars: &mut Peekable<Chars>) -> String {
    let mut var_name = String::new();

    while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
        var_name.push(c);
    }

    var_name
}

fn expand_env_var(var_name: &str, result: &mut String, original: &str) -> PathResult<()> {
    let value = match var_name {
        "HOME" => home_dir(),
        "XDG_CONFIG_HOME" => xdg_config_home(),
        "XDG_DATA_HOME" => xdg_data_home(),
        _ => {
            let value = env::var(var_name).map_err(|_| {
                PathError::MissingEnvVar {
                    input: original.into(),
                    var: var_name.into(),
                }
            })?;
            result.push_str(&value);
            return Ok(());
        }
    };
    result.push_str(&value.to_string_lossy());
    Ok(())
}
