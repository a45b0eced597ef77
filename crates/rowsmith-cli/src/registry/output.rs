use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use rowsmith_generate::GenerationOutput;

use super::{RegistryError, RegistryResult};

/// Where a run's script and report land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub script: PathBuf,
    pub report: PathBuf,
}

pub fn output_paths(dir: &Path, table: &str) -> OutputPaths {
    let stem = format!("insert_random_data_{}", file_safe(table));
    OutputPaths {
        script: dir.join(format!("{stem}.sql")),
        report: dir.join(format!("{stem}.report.json")),
    }
}

/// Write the script (newline terminated) and the pretty JSON report.
/// Returns the bytes written for the script.
pub fn write_output(paths: &OutputPaths, output: &GenerationOutput) -> RegistryResult<u64> {
    let mut script = output.script.render();
    script.push('\n');
    write_bytes_atomic(&paths.script, script.as_bytes())?;

    let report = serde_json::to_vec_pretty(&output.report)?;
    write_bytes_atomic(&paths.report, &report)?;

    Ok(script.len() as u64)
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn write_bytes_atomic(path: &Path, data: &[u8]) -> RegistryResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| RegistryError::InvalidPath(path.display().to_string()))?;
    let tmp_path = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
