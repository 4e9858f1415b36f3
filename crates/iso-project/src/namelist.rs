//! In-place updates of `key = value` lines in a model namelist.

use std::path::Path;

use tracing::warn;

use crate::{ProjectError, ProjectResult};

/// What to do when an override matches no line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedKey {
    #[default]
    Warn,
    Error,
}

/// Replace the right-hand side of every line containing `key` and a ` = `
/// separator. Returns the keys that matched nothing.
pub fn apply_overrides<'a, I>(lines: &mut [String], overrides: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let mut unmatched = Vec::new();
    for (key, value) in overrides {
        let mut found = false;
        for line in lines.iter_mut() {
            if !line.contains(key) {
                continue;
            }
            if let Some(pos) = line.find(" = ") {
                found = true;
                *line = format!("{} = {}", &line[..pos], value);
            }
        }
        if !found {
            unmatched.push(key.to_string());
        }
    }
    unmatched
}

/// Rewrite the namelist at `path` with `overrides`.
pub fn update_namelist<'a, I>(path: &Path, overrides: I, unmatched: UnmatchedKey) -> ProjectResult<()>
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let content = std::fs::read_to_string(path)?;
    let mut lines: Vec<String> = content.lines().map(|l| l.trim_end().to_string()).collect();
    let missing = apply_overrides(&mut lines, overrides);

    for key in &missing {
        match unmatched {
            UnmatchedKey::Warn => warn!(key = %key, path = %path.display(), "namelist key not found"),
            UnmatchedKey::Error => {
                return Err(ProjectError::NamelistKey {
                    key: key.clone(),
                    path: path.to_path_buf(),
                });
            }
        }
    }

    let mut out = String::with_capacity(content.len());
    for line in &lines {
        out.push_str(line);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn replaces_right_hand_side_only() {
        let mut nl = lines(
            "&time_management\n    config_run_duration = '0000_01:00:00'\n    config_do_restart = .false.\n/",
        );
        let missing = apply_overrides(
            &mut nl,
            [("config_run_duration", "'0001-00-00_00:00:00'".to_string())],
        );
        assert!(missing.is_empty());
        assert_eq!(nl[1], "    config_run_duration = '0001-00-00_00:00:00'");
        assert_eq!(nl[2], "    config_do_restart = .false.");
    }

    #[test]
    fn substring_keys_match_every_containing_line() {
        let mut nl = lines("    config_pio_num_iotasks = 0\n    config_pio_stride = 1");
        apply_overrides(&mut nl, [("config_pio", "4".to_string())]);
        assert_eq!(nl[0], "    config_pio_num_iotasks = 4");
        assert_eq!(nl[1], "    config_pio_stride = 4");
    }

    #[test]
    fn lines_without_separator_are_not_matches() {
        let mut nl = lines("&config_am_block\n/");
        let missing = apply_overrides(&mut nl, [("config_am_block", "x".to_string())]);
        assert_eq!(missing, vec!["config_am_block".to_string()]);
        assert_eq!(nl[0], "&config_am_block");
    }

    proptest! {
        #[test]
        fn lines_without_the_key_are_untouched(
            values in prop::collection::vec(0u32..1000, 1..12),
        ) {
            let mut nl: Vec<String> = values
                .iter()
                .enumerate()
                .map(|(i, v)| format!("    config_other_{i} = {v}"))
                .collect();
            let before = nl.clone();
            let missing = apply_overrides(&mut nl, [("config_run_duration", "'x'".to_string())]);
            prop_assert_eq!(missing, vec!["config_run_duration".to_string()]);
            prop_assert_eq!(nl, before);
        }
    }
}
