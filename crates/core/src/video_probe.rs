use crate::metadata::MetadataError;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    entries: Vec<(String, String)>,
}

impl ProbeReport {
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once(':')?;
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                Some((key.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn first_present(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    pub fn first_non_empty(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn run_probe(
    program: &str,
    path: &Path,
    timeout: Option<Duration>,
) -> Result<ProbeReport, MetadataError> {
    let mut child = Command::new(program)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| MetadataError::ProbeSpawn {
            program: program.to_string(),
            source,
        })?;

    let Some(mut stdout) = child.stdout.take() else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(MetadataError::ProbeFailed {
            program: program.to_string(),
            status: "no stdout".to_string(),
        });
    };

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let result = stdout.read_to_end(&mut buf).map(|_| buf);
        let _ = tx.send(result);
    });

    let received = match timeout {
        Some(limit) => rx.recv_timeout(limit).ok(),
        None => rx.recv().ok(),
    };

    let Some(read) = received else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(MetadataError::ProbeTimeout {
            program: program.to_string(),
            timeout: timeout.unwrap_or_default(),
        });
    };

    let status = child.wait().map_err(|source| MetadataError::ProbeSpawn {
        program: program.to_string(),
        source,
    })?;
    if !status.success() {
        return Err(MetadataError::ProbeFailed {
            program: program.to_string(),
            status: status.to_string(),
        });
    }

    let bytes = read.map_err(|source| MetadataError::ProbeSpawn {
        program: program.to_string(),
        source,
    })?;
    Ok(ProbeReport::parse(&String::from_utf8_lossy(&bytes)))
}
