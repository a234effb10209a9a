use std::env;
use std::fs;
use std::path::Path;

/// Loads `KEY=VALUE` lines from a `.env` file into the process environment.
///
/// Missing files are ignored. Blank lines and `#` comments are skipped, an
/// optional `export ` prefix is accepted and surrounding quotes are removed.
/// Variables already present in the environment win. Returns how many
/// variables were set.
pub fn load_dotenv_if_present(path: &Path) -> usize {
    let Ok(content) = fs::read_to_string(path) else {
        return 0;
    };

    let mut loaded = 0;
    for (key, value) in parse_dotenv(&content) {
        if env::var_os(&key).is_some() {
            continue;
        }
        env::set_var(key, value);
        loaded += 1;
    }
    loaded
}

pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((key, raw_value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let mut value = raw_value.trim().trim_end_matches('\r');
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }

        pairs.push((key.to_string(), value.to_string()));
    }

    pairs
}
