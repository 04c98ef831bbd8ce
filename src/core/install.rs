//! Minimal installation of a resolved source into the active target.
//!
//! Only the manifest documents are copied, never the rest of the source
//! tree, and nothing under the destination is ever deleted. Re-running with
//! the same inputs rewrites the same file set with the same bytes.

use crate::core::digest::FileChange;
use crate::core::error::DeployError;
use crate::core::fs::{self, FileSystem};
use crate::core::manifest;
use crate::core::source::{SourceDescriptor, SourceKind};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledFile {
    pub rel_path: &'static str,
    pub change: FileChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub destination: PathBuf,
    pub files: Vec<InstalledFile>,
}

pub fn install_minimal(
    fs: &dyn FileSystem,
    source_root: &Path,
    destination_root: &Path,
) -> Result<InstallReport, DeployError> {
    let mut files = Vec::with_capacity(manifest::documents().len());
    for doc in manifest::documents() {
        let from = source_root.join(doc.rel_path);
        let to = destination_root.join(doc.rel_path);

        let contents = fs.read(&from).map_err(|e| {
            DeployError::PathError(format!("cannot read {}: {}", from.display(), e))
        })?;
        let previous = if fs.is_file(&to) {
            Some(fs.read(&to)?)
        } else {
            None
        };
        let change = FileChange::classify(previous.as_deref(), &contents);

        if let Some(parent) = to.parent() {
            fs.create_dir_all(parent)?;
        }
        fs.write(&to, &contents)?;
        files.push(InstalledFile {
            rel_path: doc.rel_path,
            change,
        });
    }
    Ok(InstallReport {
        destination: destination_root.to_path_buf(),
        files,
    })
}

/// Whether `source` must be copied into `destination` before use.
///
/// Vendor and downloaded sources already sit at the destination. Explicit,
/// environment and global sources are copied unless they resolve to the
/// destination itself.
pub fn needs_install(fs: &dyn FileSystem, source: &SourceDescriptor, destination: &Path) -> bool {
    let Some(root) = source.root() else {
        return false;
    };
    match source.kind() {
        SourceKind::ProjectVendor | SourceKind::Downloaded => false,
        SourceKind::Explicit | SourceKind::Environment | SourceKind::Global => {
            !same_location(fs, root, destination)
        }
        SourceKind::ExplicitInvalid
        | SourceKind::EnvironmentInvalid
        | SourceKind::DownloadFailed
        | SourceKind::None => false,
    }
}

fn same_location(fs: &dyn FileSystem, a: &Path, b: &Path) -> bool {
    match (fs.canonicalize(a), fs.canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => fs::normalize(a) == fs::normalize(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::{MemoryFs, OsFs};
    use tempfile::tempdir;

    fn seed(mem: &MemoryFs, root: &str) {
        for doc in manifest::documents() {
            mem.add_file(format!("{}/{}", root, doc.rel_path), format!("# {}", doc.key));
        }
    }

    #[test]
    fn copies_exactly_the_manifest() {
        let mem = MemoryFs::new();
        seed(&mem, "/src");
        mem.add_file("/src/README.md", "not part of the manifest");
        mem.add_file("/src/.git/HEAD", "ref: refs/heads/main");

        let report = install_minimal(&mem, Path::new("/src"), Path::new("/dst")).unwrap();
        assert_eq!(report.destination, PathBuf::from("/dst"));
        assert_eq!(report.files.len(), 7);
        assert!(report.files.iter().all(|f| f.change == FileChange::Created));

        let installed: Vec<_> = mem
            .file_paths()
            .into_iter()
            .filter(|p| p.starts_with("/dst"))
            .collect();
        assert_eq!(installed.len(), 7);
        assert!(!mem.exists(Path::new("/dst/README.md")));
        assert!(!mem.exists(Path::new("/dst/.git")));
        assert_eq!(
            mem.read_string("/dst/agents/planner.md").unwrap(),
            "# planner"
        );
    }

    #[test]
    fn second_install_is_byte_identical_and_unchanged() {
        let mem = MemoryFs::new();
        seed(&mem, "/src");
        install_minimal(&mem, Path::new("/src"), Path::new("/dst")).unwrap();
        let first: Vec<_> = mem
            .file_paths()
            .into_iter()
            .map(|p| (p.clone(), mem.read_string(&p)))
            .collect();

        let report = install_minimal(&mem, Path::new("/src"), Path::new("/dst")).unwrap();
        assert!(report.files.iter().all(|f| f.change == FileChange::Unchanged));
        let second: Vec<_> = mem
            .file_paths()
            .into_iter()
            .map(|p| (p.clone(), mem.read_string(&p)))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn keeps_unrelated_destination_files() {
        let mem = MemoryFs::new();
        seed(&mem, "/src");
        mem.add_file("/dst/local-notes.md", "mine");
        mem.add_file("/dst/agents/tester.md", "old tester");

        let report = install_minimal(&mem, Path::new("/src"), Path::new("/dst")).unwrap();
        let tester = report
            .files
            .iter()
            .find(|f| f.rel_path == "agents/tester.md")
            .unwrap();
        assert_eq!(tester.change, FileChange::Updated);
        assert_eq!(mem.read_string("/dst/local-notes.md").unwrap(), "mine");
    }

    #[test]
    fn missing_source_document_is_a_path_error() {
        let mem = MemoryFs::new();
        let err = install_minimal(&mem, Path::new("/src"), Path::new("/dst")).unwrap_err();
        assert!(matches!(err, DeployError::PathError(_)));
    }

    #[test]
    fn in_place_kinds_skip_installation() {
        let mem = MemoryFs::new();
        let dst = Path::new("/work/.opencode/agent-constitution");
        let vendor =
            SourceDescriptor::resolved(SourceKind::ProjectVendor, dst.to_path_buf(), None);
        let downloaded = SourceDescriptor::resolved(
            SourceKind::Downloaded,
            dst.to_path_buf(),
            Some("https://example.invalid/a.git".into()),
        );
        assert!(!needs_install(&mem, &vendor, dst));
        assert!(!needs_install(&mem, &downloaded, dst));
        assert!(!needs_install(&mem, &SourceDescriptor::none(), dst));
    }

    #[test]
    fn copied_kinds_install_unless_already_at_destination() {
        let mem = MemoryFs::new();
        let dst = Path::new("/home/u/.config/opencode/agent-constitution");
        let explicit = SourceDescriptor::resolved(SourceKind::Explicit, "/elsewhere".into(), None);
        let env = SourceDescriptor::resolved(SourceKind::Environment, "/env".into(), None);
        let global = SourceDescriptor::resolved(SourceKind::Global, dst.to_path_buf(), None);
        let explicit_same = SourceDescriptor::resolved(
            SourceKind::Explicit,
            "/home/u/.config/opencode/./agent-constitution".into(),
            None,
        );
        assert!(needs_install(&mem, &explicit, dst));
        assert!(needs_install(&mem, &env, dst));
        assert!(!needs_install(&mem, &global, dst));
        assert!(!needs_install(&mem, &explicit_same, dst));
    }

    #[test]
    fn location_check_goes_through_the_filesystem_handle() {
        let mem = MemoryFs::new();
        seed(&mem, "/home/u/.config/opencode/agent-constitution");
        let dst = Path::new("/home/u/.config/opencode/agent-constitution");
        let via_parent = SourceDescriptor::resolved(
            SourceKind::Environment,
            "/home/u/.config/opencode/x/../agent-constitution".into(),
            None,
        );
        let sibling = SourceDescriptor::resolved(
            SourceKind::Environment,
            "/home/u/.config/opencode/agent-constitution-copy".into(),
            None,
        );
        assert!(!needs_install(&mem, &via_parent, dst));
        assert!(needs_install(&mem, &sibling, dst));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_source_into_the_destination_is_not_reinstalled() {
        let tmp = tempdir().unwrap();
        let dst = tmp.path().join("global/agent-constitution");
        std::fs::create_dir_all(&dst).unwrap();
        let link = tmp.path().join("linked");
        std::os::unix::fs::symlink(&dst, &link).unwrap();

        let env = SourceDescriptor::resolved(SourceKind::Environment, link, None);
        assert!(!needs_install(&OsFs, &env, &dst));
    }

    #[test]
    fn installs_on_real_filesystem() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src");
        for doc in manifest::documents() {
            let path = src.join(doc.rel_path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, doc.key).unwrap();
        }
        let dst = tmp.path().join("project/.opencode/agent-constitution");

        install_minimal(&OsFs, &src, &dst).unwrap();
        assert_eq!(
            std::fs::read_to_string(dst.join("governance/CONDUCTOR.md")).unwrap(),
            "conductor"
        );
        assert!(crate::core::validate::validate_source(&OsFs, &dst));
    }
}
