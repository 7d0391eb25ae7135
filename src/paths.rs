use std::path::{Path, PathBuf};

const BASE_DIR_ENV: &str = "CAPTION_FRAME_DIR";
const BASE_DIR_NAME: &str = ".caption-frame";

/// Directory holding user settings: `$CAPTION_FRAME_DIR`, else `~/.caption-frame`.
pub(crate) fn settings_dir() -> Option<PathBuf> {
    if let Some(dir) = base_dir_override() {
        return Some(dir);
    }
    home_join(BASE_DIR_NAME)
}

fn base_dir_override() -> Option<PathBuf> {
    std::env::var(BASE_DIR_ENV)
        .ok()
        .and_then(|value| normalize_dir(&value))
}

fn home_join(suffix: &str) -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(suffix))
        }
    })
}

fn normalize_dir(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let expanded = expand_tilde(trimmed);
    let mut normalized = PathBuf::new();
    for component in Path::new(&expanded).components() {
        normalized.push(component.as_os_str());
    }
    Some(normalized)
}

fn expand_tilde(value: &str) -> String {
    if value == "~" || value.starts_with("~/") {
        if let Ok(home) = std::env::var("HOME") {
            let home = home.trim();
            if home.is_empty() {
                return value.to_string();
            }
            if value == "~" {
                return home.to_string();
            }
            return format!("{}{}", home, &value[1..]);
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::with_temp_home;

    #[test]
    fn defaults_to_home_subdirectory() {
        with_temp_home(|home| {
            assert_eq!(settings_dir(), Some(home.join(BASE_DIR_NAME)));
        });
    }

    #[test]
    fn override_expands_tilde() {
        with_temp_home(|home| {
            unsafe { std::env::set_var(BASE_DIR_ENV, "~/frames/") };
            let dir = settings_dir();
            unsafe { std::env::remove_var(BASE_DIR_ENV) };
            assert_eq!(dir, Some(home.join("frames")));
        });
    }
}
