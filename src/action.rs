//! GitHub Actions workflow commands: secret masking, log groups, step
//! outputs and failure annotations.
use log::*;
use std::{env, fs::OpenOptions, io::Write, path::Path};

use crate::error::Result;

/// Environment variable naming the file step outputs are appended to.
pub const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";

/// Escapes data so it survives inside a single workflow command line.
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Ask the runner to redact `secret` from every subsequent log line.
pub fn add_mask(secret: &str) {
    if secret.is_empty() {
        return;
    }
    println!("::add-mask::{}", escape_data(secret));
}

pub fn start_group(name: &str) {
    println!("::group::{}", escape_data(name));
}

pub fn end_group() {
    println!("::endgroup::");
}

/// Emit an error annotation. The caller is responsible for the exit code.
pub fn set_failed(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Record a step output, or log it when not running inside a workflow.
pub fn set_output(name: &str, value: &str) -> Result<()> {
    match env::var(OUTPUT_FILE_ENV) {
        Ok(path) if !path.is_empty() => {
            write_output(Path::new(&path), name, value)
        }
        _ => {
            info!("{OUTPUT_FILE_ENV} is not set: output {name}={value}");
            Ok(())
        }
    }
}

fn write_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    if value.contains('\n') {
        let delimiter = format!("ghadelimiter_{}", std::process::id());
        writeln!(file, "{name}<<{delimiter}\n{value}\n{delimiter}")?;
    } else {
        writeln!(file, "{name}={value}")?;
    }

    debug!("wrote output {name} to {}", path.display());

    Ok(())
}
