//! Host list loading (spec §6: "reading the host list from a file or
//! standard input" — an external collaborator, implemented here per
//! SPEC_FULL.md §C).

use anyhow::{Context, Result, bail};
use fleet_core::{ConfigError, HostList};
use std::io::{BufRead, Read};
use std::path::Path;

/// Parse one host name per line, skipping blank lines and `#` comments.
fn parse_hosts<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut hosts = Vec::new();
    for line in reader.lines() {
        let line = line.context("reading host list")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        hosts.push(trimmed.to_string());
    }
    Ok(hosts)
}

/// Load hosts from `path`, or from standard input when `path` is `None`.
pub fn load_hosts(path: Option<&Path>) -> Result<HostList> {
    let names = match path {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening host list '{}'", path.display()))?;
            parse_hosts(std::io::BufReader::new(file))?
        }
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("reading host list from stdin")?;
            parse_hosts(raw.as_bytes())?
        }
    };

    if names.is_empty() {
        bail!(ConfigError::EmptyHostList);
    }

    Ok(HostList::new(names))
}
