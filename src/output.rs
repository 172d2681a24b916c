use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory '{}'", parent.display()))?;
        }
    }
    Ok(())
}

/// Line-delimited result file, one discovered value per line.
pub fn write_lines<I, S>(path: &Path, lines: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ensure_parent(path)?;
    let mut w = BufWriter::new(
        File::create(path).with_context(|| format!("cannot write '{}'", path.display()))?,
    );
    for line in lines {
        writeln!(w, "{}", line.as_ref())?;
    }
    w.flush()?;
    Ok(())
}

/// Pretty-printed JSON report.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let file =
        File::create(path).with_context(|| format!("cannot write '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_round_trip() {
        let path = std::env::temp_dir().join(format!("redscout-out-{}.txt", std::process::id()));
        write_lines(&path, ["a.example.com", "b.example.com"]).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(body, "a.example.com\nb.example.com\n");
    }
}
