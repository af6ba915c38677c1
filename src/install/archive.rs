//! Archive extraction into the install root.
//!
//! Release archives wrap their payload in a single top-level directory
//! named after the toolchain (`go/bin/go`, `go/VERSION`, ...). Every
//! entry path has that first segment stripped so the payload lands
//! directly under the install root. Entry paths are validated before
//! anything is written: a crafted or corrupted archive must not be able
//! to place files outside the root.

use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use tar::EntryType;

/// Drop the archive's single top-level wrapper directory.
///
/// Splits on the first `/` or `\`; with a separator the remainder is
/// returned, without one the path is returned unchanged.
pub fn strip_leading_dir(path: &str) -> &str {
    match path.find(['/', '\\']) {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Join a normalized entry path to the install root, rejecting anything
/// that would resolve outside it.
///
/// Absolute paths, drive-letter prefixes and `..` segments are all
/// extraction errors rather than written entries.
pub fn safe_join(root: &Path, rel: &str) -> Result<PathBuf> {
    if rel.starts_with(['/', '\\']) || rel.as_bytes().get(1) == Some(&b':') {
        bail!("archive entry has an absolute path: {}", rel);
    }
    let mut out = root.to_path_buf();
    for part in rel.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => bail!("archive entry escapes the install root: {}", rel),
            p => out.push(p),
        }
    }
    Ok(out)
}

/// Extract a downloaded release archive into `root`.
///
/// The variant is selected by filename: `.zip`, or `.tar.gz`/`.tgz`.
/// Entries are processed strictly in archive order; parent directories
/// are created before each file because neither format guarantees a
/// directory entry precedes its children. The first I/O failure aborts;
/// the caller must treat the root as corrupt and re-run.
pub fn extract_archive(archive: &Path, root: &Path) -> Result<()> {
    let name = archive.file_name().and_then(|s| s.to_str()).unwrap_or("");
    if name.ends_with(".zip") {
        extract_zip(archive, root)
            .with_context(|| format!("failed to extract {} to {}", name, root.display()))
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        extract_tar_gz(archive, root)
            .with_context(|| format!("failed to extract {} to {}", name, root.display()))
    } else {
        bail!("unsupported archive format: {}", name);
    }
}

fn extract_zip(src: &Path, root: &Path) -> Result<()> {
    let f = fs::File::open(src)?;
    let mut zip = zip::ZipArchive::new(f)?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let name = entry.name().to_string();
        let rel = strip_leading_dir(&name);
        if rel.is_empty() {
            // the wrapper directory itself
            continue;
        }
        let target = safe_join(root, rel)?;

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target)
            .with_context(|| format!("failed to create {}", target.display()))?;
        std::io::copy(&mut entry, &mut out)?;
        if let Some(mode) = entry.unix_mode() {
            set_mode(&target, mode)?;
        }
    }
    Ok(())
}

fn extract_tar_gz(src: &Path, root: &Path) -> Result<()> {
    let f = fs::File::open(src)?;
    let gz = GzDecoder::new(f);
    let mut ar = tar::Archive::new(gz);

    for entry in ar.entries()? {
        let mut e = entry?;
        let path = e.path()?.into_owned();
        let name = path.to_string_lossy();
        let rel = strip_leading_dir(&name).to_string();
        if rel.is_empty() {
            continue;
        }
        let target = safe_join(root, &rel)?;

        match e.header().entry_type() {
            EntryType::Directory => {
                fs::create_dir_all(&target)?;
            }
            EntryType::Regular => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut out = fs::File::create(&target)
                    .with_context(|| format!("failed to create {}", target.display()))?;
                std::io::copy(&mut e, &mut out)?;
                set_mode(&target, e.header().mode().unwrap_or(0o644))?;
            }
            other => {
                eprintln!("ignoring unsupported entry type {:?}: {}", other, name);
            }
        }
    }
    Ok(())
}

#[cfg(unix)]
fn set_mode(p: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perm = fs::metadata(p)?.permissions();
    perm.set_mode(mode);
    fs::set_permissions(p, perm)?;
    Ok(())
}
#[cfg(not(unix))]
fn set_mode(_p: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tar::{Builder, Header};
    use tempfile::tempdir;

    #[test]
    fn strip_leading_dir_drops_first_segment() {
        assert_eq!(strip_leading_dir("go/bin/go"), "bin/go");
        assert_eq!(strip_leading_dir("go\\bin\\go.exe"), "bin\\go.exe");
        assert_eq!(strip_leading_dir("go/"), "");
        assert_eq!(strip_leading_dir("go/VERSION"), "VERSION");
    }

    #[test]
    fn strip_leading_dir_keeps_single_segment() {
        assert_eq!(strip_leading_dir("go"), "go");
        assert_eq!(strip_leading_dir("VERSION"), "VERSION");
    }

    #[test]
    fn safe_join_stays_under_root() {
        let root = Path::new("/opt/go");
        let p = safe_join(root, "bin/go").unwrap();
        assert_eq!(p, root.join("bin").join("go"));
        assert!(p.starts_with(root));
    }

    #[test]
    fn safe_join_rejects_traversal() {
        let root = Path::new("/opt/go");
        assert!(safe_join(root, "../evil").is_err());
        assert!(safe_join(root, "bin/../../evil").is_err());
        assert!(safe_join(root, "..\\evil").is_err());
    }

    #[test]
    fn safe_join_rejects_absolute_paths() {
        let root = Path::new("/opt/go");
        assert!(safe_join(root, "/etc/passwd").is_err());
        assert!(safe_join(root, "\\windows\\system32").is_err());
        assert!(safe_join(root, "C:\\windows\\system32").is_err());
    }

    #[test]
    fn safe_join_ignores_cur_dir_segments() {
        let root = Path::new("/opt/go");
        let p = safe_join(root, "./bin/./go").unwrap();
        assert_eq!(p, root.join("bin").join("go"));
    }

    fn tar_dir(b: &mut Builder<GzEncoder<Vec<u8>>>, path: &str) {
        let mut h = Header::new_gnu();
        h.set_entry_type(EntryType::Directory);
        h.set_size(0);
        h.set_mode(0o755);
        h.set_cksum();
        b.append_data(&mut h, path, std::io::empty()).unwrap();
    }

    fn tar_file(b: &mut Builder<GzEncoder<Vec<u8>>>, path: &str, data: &[u8], mode: u32) {
        let mut h = Header::new_gnu();
        h.set_size(data.len() as u64);
        h.set_mode(mode);
        h.set_cksum();
        b.append_data(&mut h, path, data).unwrap();
    }

    fn write_test_tar_gz(dest: &Path) {
        let gz = GzEncoder::new(Vec::new(), Compression::default());
        let mut b = Builder::new(gz);
        tar_dir(&mut b, "go/");
        tar_dir(&mut b, "go/bin/");
        tar_file(&mut b, "go/bin/go", b"#!/bin/true\n", 0o755);
        tar_file(&mut b, "go/VERSION", b"go1.23.1", 0o644);
        // symlink entries must be skipped, not fatal
        let mut h = Header::new_gnu();
        h.set_entry_type(EntryType::Symlink);
        h.set_size(0);
        h.set_mode(0o777);
        h.set_link_name("bin/go").unwrap();
        h.set_cksum();
        b.append_data(&mut h, "go/bin/gofmt-link", std::io::empty())
            .unwrap();
        let data = b.into_inner().unwrap().finish().unwrap();
        fs::write(dest, data).unwrap();
    }

    #[test]
    fn tar_gz_extracts_payload_without_wrapper_dir() {
        let td = tempdir().unwrap();
        let archive = td.path().join("go1.23.1.linux-amd64.tar.gz");
        write_test_tar_gz(&archive);

        let root = td.path().join("root");
        fs::create_dir_all(&root).unwrap();
        extract_archive(&archive, &root).unwrap();

        let bin = root.join("bin").join("go");
        assert!(bin.is_file());
        assert_eq!(fs::metadata(&bin).unwrap().len(), 12);
        assert_eq!(fs::read(root.join("VERSION")).unwrap(), b"go1.23.1");
        assert!(!root.join("go").exists());
        // skipped symlink entry leaves nothing behind
        assert!(!root.join("bin").join("gofmt-link").exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&bin).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn tar_gz_creates_parent_dirs_when_no_dir_entry_precedes() {
        let td = tempdir().unwrap();
        let archive = td.path().join("go.tar.gz");
        let gz = GzEncoder::new(Vec::new(), Compression::default());
        let mut b = Builder::new(gz);
        // file first, no directory entries at all
        tar_file(&mut b, "go/pkg/tool/compile", b"x", 0o755);
        let data = b.into_inner().unwrap().finish().unwrap();
        fs::write(&archive, data).unwrap();

        let root = td.path().join("root");
        fs::create_dir_all(&root).unwrap();
        extract_archive(&archive, &root).unwrap();
        assert!(root.join("pkg").join("tool").join("compile").is_file());
    }

    fn write_test_zip(dest: &Path) {
        let f = fs::File::create(dest).unwrap();
        let mut w = zip::ZipWriter::new(f);
        let dir_opts = zip::write::FileOptions::default();
        w.add_directory("go/", dir_opts).unwrap();
        w.add_directory("go/bin/", dir_opts).unwrap();
        let exe_opts = zip::write::FileOptions::default().unix_permissions(0o755);
        w.start_file("go/bin/go", exe_opts).unwrap();
        w.write_all(b"binary").unwrap();
        w.start_file("go/VERSION", dir_opts).unwrap();
        w.write_all(b"go1.23.1").unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn zip_extracts_payload_without_wrapper_dir() {
        let td = tempdir().unwrap();
        let archive = td.path().join("go1.23.1.windows-amd64.zip");
        write_test_zip(&archive);

        let root = td.path().join("root");
        fs::create_dir_all(&root).unwrap();
        extract_archive(&archive, &root).unwrap();

        assert!(root.join("bin").join("go").is_file());
        assert_eq!(fs::read(root.join("VERSION")).unwrap(), b"go1.23.1");
        assert!(!root.join("go").exists());
    }

    #[test]
    fn zip_with_traversal_entry_is_rejected() {
        let td = tempdir().unwrap();
        let archive = td.path().join("evil.zip");
        let f = fs::File::create(&archive).unwrap();
        let mut w = zip::ZipWriter::new(f);
        let opts = zip::write::FileOptions::default();
        w.start_file("go/../../evil.txt", opts).unwrap();
        w.write_all(b"pwned").unwrap();
        w.finish().unwrap();

        let root = td.path().join("deep").join("root");
        fs::create_dir_all(&root).unwrap();
        assert!(extract_archive(&archive, &root).is_err());
        assert!(!td.path().join("evil.txt").exists());
        assert!(!td.path().join("deep").join("evil.txt").exists());
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let td = tempdir().unwrap();
        let archive = td.path().join("go1.23.1.pkg");
        fs::write(&archive, b"whatever").unwrap();
        assert!(extract_archive(&archive, td.path()).is_err());
    }
}
