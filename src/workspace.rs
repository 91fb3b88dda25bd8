//! Workspace - the session's working directory
//!
//! Holds the uploaded artifact, the entries extracted from an archive and the merged
//! CSV. Flat layout, keyed by original file names. Nothing expires on its own; `cleanup`
//! deletes the whole directory.

use crate::error::{AgentError, Result};
use crate::table::Table;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_WORK_DIR: &str = "temp_data";
pub const MERGED_FILE_NAME: &str = "notas_fiscais_mescladas.csv";

#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    /// Open (and create if needed) a working directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Copy an uploaded file into the workspace, keeping its file name
    pub fn store_upload(&self, source: &Path) -> Result<PathBuf> {
        let name = source
            .file_name()
            .ok_or_else(|| AgentError::Config(format!("Upload path has no file name: {}", source.display())))?;
        let dest = self.dir.join(name);
        if dest != source {
            fs::create_dir_all(&self.dir)?;
            fs::copy(source, &dest)?;
        }
        debug!("Stored upload {} -> {}", source.display(), dest.display());
        Ok(dest)
    }

    /// Extract every file entry of a ZIP archive into the workspace.
    /// Returns the entry names in archive order; directories are skipped.
    pub fn extract_archive(&self, archive_path: &Path) -> Result<Vec<String>> {
        let file = fs::File::open(archive_path)?;
        let mut archive = zip::ZipArchive::new(file)?;
        let mut names = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }

            let relative = entry
                .enclosed_name()
                .ok_or_else(|| AgentError::Archive(format!("Unsafe path in archive: {}", entry.name())))?;
            let dest = self.dir.join(&relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut out = fs::File::create(&dest)?;
            io::copy(&mut entry, &mut out)?;
            names.push(entry.name().to_string());
        }

        info!("Extracted {} entries from {}", names.len(), archive_path.display());
        Ok(names)
    }

    /// Persist the merged table so later questions reuse it
    pub fn save_merged(&self, table: &Table) -> Result<PathBuf> {
        let path = self.path_of(MERGED_FILE_NAME);
        table.write_csv(&path)?;
        info!("Saved merged table to {}", path.display());
        Ok(path)
    }

    /// Delete the whole working directory. Returns false when there was nothing to remove.
    pub fn cleanup(&self) -> Result<bool> {
        remove_work_dir(&self.dir)
    }
}

/// Delete-all cleanup for a working directory
pub fn remove_work_dir(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(dir)?;
    info!("Removed working directory {}", dir.display());
    Ok(true)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_extract_lists_entries_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = tmp.path().join("notas.zip");
        write_zip(
            &zip_path,
            &[
                ("202401_NFs_Itens.csv", "numero_nf,produto\n1,caneta\n"),
                ("202401_NFs_Cabecalho.csv", "numero_nf,valor\n1,10\n"),
            ],
        );

        let ws = Workspace::open(tmp.path().join("work")).unwrap();
        let names = ws.extract_archive(&zip_path).unwrap();

        assert_eq!(names, vec!["202401_NFs_Itens.csv", "202401_NFs_Cabecalho.csv"]);
        assert!(ws.path_of("202401_NFs_Itens.csv").exists());
        assert!(ws.path_of("202401_NFs_Cabecalho.csv").exists());
    }

    #[test]
    fn test_store_upload_copies_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("vendas.csv");
        fs::write(&src, "a,b\n1,2\n").unwrap();

        let ws = Workspace::open(tmp.path().join("work")).unwrap();
        let stored = ws.store_upload(&src).unwrap();
        assert_eq!(stored, ws.path_of("vendas.csv"));
        assert_eq!(fs::read_to_string(stored).unwrap(), "a,b\n1,2\n");
    }

    #[test]
    fn test_cleanup_removes_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::open(tmp.path().join("work")).unwrap();
        fs::write(ws.path_of("x.csv"), "a\n1\n").unwrap();

        assert!(ws.cleanup().unwrap());
        assert!(!ws.dir().exists());
        assert!(!ws.cleanup().unwrap());
    }

    #[test]
    fn test_corrupt_archive_is_archive_error() {
        let tmp = tempfile::tempdir().unwrap();
        let bogus = tmp.path().join("bogus.zip");
        fs::write(&bogus, b"not a zip").unwrap();
        let ws = Workspace::open(tmp.path().join("work")).unwrap();
        assert!(matches!(ws.extract_archive(&bogus), Err(AgentError::Archive(_))));
    }
}
