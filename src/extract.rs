//! Archive extraction with a fallback chain.
//!
//! Every archive is handed to an ordered list of [`ExtractStrategy`] values; the
//! first one that succeeds wins. The default chain is:
//!
//! 1. [`LibraryStrategy`]: picks a decoder from the file extension
//!    (zip, tar, 7z, or the external `unrar` tool for rar);
//! 2. [`ZipSignatureStrategy`]: zip decoding when the file's magic bytes say ZIP;
//! 3. [`RarSignatureStrategy`]: `unrar` when the magic bytes say RAR.
//!
//! An archive every strategy rejects is reported as an [`ExtractionFailure`] and
//! the remaining archives are still processed. Entries with absolute paths or
//! `..` components are never written outside the destination.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use std::process::Command;

/// Archive formats accepted as input, judged by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    SevenZ,
    Rar,
}

impl ArchiveKind {
    /// Detects the kind from the file extension, case-insensitively.
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(OsStr::to_str)?
            .to_lowercase()
            .as_str()
        {
            "zip" => Some(ArchiveKind::Zip),
            "tar" => Some(ArchiveKind::Tar),
            "7z" => Some(ArchiveKind::SevenZ),
            "rar" => Some(ArchiveKind::Rar),
            _ => None,
        }
    }

    /// Detects zip or rar from the file's leading bytes.
    pub fn from_signature(path: &Path) -> Option<Self> {
        let header = read_header(path).ok()?;
        if infer::archive::is_zip(&header) {
            Some(ArchiveKind::Zip)
        } else if infer::archive::is_rar(&header) {
            Some(ArchiveKind::Rar)
        } else {
            None
        }
    }

    /// Short display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::Tar => "tar",
            ArchiveKind::SevenZ => "7z",
            ArchiveKind::Rar => "rar",
        }
    }
}

/// Returns true if the path has a supported archive extension.
pub fn is_supported_archive(path: &Path) -> bool {
    ArchiveKind::from_extension(path).is_some()
}

fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut header = Vec::with_capacity(512);
    File::open(path)?.take(512).read_to_end(&mut header)?;
    Ok(header)
}

/// Errors that abort a whole extraction call.
#[derive(Debug)]
pub enum ExtractError {
    /// The destination is missing or not a directory.
    InvalidDirectory { path: PathBuf },
    /// None of the inputs has a supported archive extension.
    NoSupportedArchives { skipped: Vec<PathBuf> },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDirectory { path } => {
                write!(f, "Not a valid destination folder: {}", path.display())
            }
            Self::NoSupportedArchives { skipped } => write!(
                f,
                "No supported archive files given ({} unsupported); expected zip, tar, 7z or rar",
                skipped.len()
            ),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Result type for extraction.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// One way of extracting an archive.
pub trait ExtractStrategy {
    /// Name used in reports.
    fn name(&self) -> &'static str;

    /// Extracts all of `archive` into `destination` or explains why it could not.
    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), String>;
}

/// Program used for rar archives unless a strategy is given another one.
pub const UNRAR_PROGRAM: &str = "unrar";

/// Extracts by extension using the archive crates, and `unrar` for rar files.
#[derive(Debug, Clone)]
pub struct LibraryStrategy {
    unrar: PathBuf,
}

impl Default for LibraryStrategy {
    fn default() -> Self {
        Self::with_unrar(UNRAR_PROGRAM)
    }
}

impl LibraryStrategy {
    /// Uses `program` instead of `unrar` from `PATH` for rar files.
    pub fn with_unrar(program: impl Into<PathBuf>) -> Self {
        Self {
            unrar: program.into(),
        }
    }
}

impl ExtractStrategy for LibraryStrategy {
    fn name(&self) -> &'static str {
        "library"
    }

    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), String> {
        match ArchiveKind::from_extension(archive) {
            Some(ArchiveKind::Zip) => extract_zip(archive, destination),
            Some(ArchiveKind::Tar) => extract_tar(archive, destination),
            Some(ArchiveKind::SevenZ) => extract_7z(archive, destination),
            Some(ArchiveKind::Rar) => extract_rar(&self.unrar, archive, destination),
            None => Err("unsupported archive extension".to_string()),
        }
    }
}

/// Zip extraction for files whose content is a zip, whatever their name.
pub struct ZipSignatureStrategy;

impl ExtractStrategy for ZipSignatureStrategy {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), String> {
        match ArchiveKind::from_signature(archive) {
            Some(ArchiveKind::Zip) => extract_zip(archive, destination),
            _ => Err("not a zip file".to_string()),
        }
    }
}

/// Rar extraction for files whose content is a rar, whatever their name.
#[derive(Debug, Clone)]
pub struct RarSignatureStrategy {
    unrar: PathBuf,
}

impl Default for RarSignatureStrategy {
    fn default() -> Self {
        Self::with_unrar(UNRAR_PROGRAM)
    }
}

impl RarSignatureStrategy {
    pub fn with_unrar(program: impl Into<PathBuf>) -> Self {
        Self {
            unrar: program.into(),
        }
    }
}

impl ExtractStrategy for RarSignatureStrategy {
    fn name(&self) -> &'static str {
        "rar"
    }

    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), String> {
        match ArchiveKind::from_signature(archive) {
            Some(ArchiveKind::Rar) => extract_rar(&self.unrar, archive, destination),
            _ => Err("not a rar file".to_string()),
        }
    }
}

fn extract_zip(archive: &Path, destination: &Path) -> Result<(), String> {
    let file = File::open(archive).map_err(|e| e.to_string())?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| e.to_string())?;
    zip.extract(destination).map_err(|e| e.to_string())
}

fn extract_tar(archive: &Path, destination: &Path) -> Result<(), String> {
    let file = File::open(archive).map_err(|e| e.to_string())?;
    let mut tar = tar::Archive::new(BufReader::new(file));
    tar.unpack(destination).map_err(|e| e.to_string())
}

fn extract_7z(archive: &Path, destination: &Path) -> Result<(), String> {
    let file = File::open(archive).map_err(|e| e.to_string())?;
    let mut failure: Option<String> = None;

    // Returning false only ends the current block, so later entries still arrive.
    sevenz_rust2::decompress_with_extract_fn(file, destination, |entry, reader, _| {
        if failure.is_some() {
            return Ok(false);
        }
        let Some(target) = enclosed_path(destination, Path::new(&entry.name)) else {
            failure = Some(format!("entry '{}' escapes the destination", entry.name));
            return Ok(false);
        };
        if let Err(e) = write_7z_entry(&target, entry.is_directory, reader) {
            failure = Some(format!("{}: {}", entry.name, e));
            return Ok(false);
        }
        Ok(true)
    })
    .map_err(|e| e.to_string())?;

    failure.map_or(Ok(()), Err)
}

fn write_7z_entry(target: &Path, is_directory: bool, reader: &mut dyn Read) -> io::Result<()> {
    if is_directory {
        return fs::create_dir_all(target);
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = File::create(target)?;
    io::copy(reader, &mut out)?;
    Ok(())
}

/// Joins an archive entry name onto `root`, or `None` if the entry is absolute
/// or climbs out with `..`.
fn enclosed_path(root: &Path, entry: &Path) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in entry.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(root.join(clean))
}

fn extract_rar(program: &Path, archive: &Path, destination: &Path) -> Result<(), String> {
    // unrar treats a destination without a trailing separator as a file name.
    let mut target = destination.as_os_str().to_os_string();
    target.push(std::path::MAIN_SEPARATOR_STR);

    let output = Command::new(program)
        .arg("x")
        .arg("-o+")
        .arg("-y")
        .arg(archive)
        .arg(&target)
        .output()
        .map_err(|e| format!("could not run {}: {}", program.display(), e))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(format!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

/// Progress after each archive.
#[derive(Debug, Clone)]
pub struct ExtractProgress {
    /// Archives processed so far, successful or not.
    pub completed: usize,
    /// Archives that will be processed in total.
    pub total: usize,
    /// The archive that was just processed.
    pub current: PathBuf,
}

impl ExtractProgress {
    /// Processed share between 0.0 and 1.0.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// An archive that was extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArchive {
    pub path: PathBuf,
    /// Name of the strategy that succeeded.
    pub strategy: &'static str,
}

/// An archive no strategy could extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    pub path: PathBuf,
    /// One `strategy: reason` entry per attempt.
    pub reasons: Vec<String>,
}

/// Summary of an extraction call.
#[derive(Debug, Default)]
pub struct ExtractReport {
    pub extracted: Vec<ExtractedArchive>,
    pub failures: Vec<ExtractionFailure>,
    /// Inputs ignored because of an unsupported extension.
    pub skipped: Vec<PathBuf>,
}

impl ExtractReport {
    /// True when every supported archive was extracted.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs archives through the strategy chain.
pub struct Extractor {
    strategies: Vec<Box<dyn ExtractStrategy>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::with_strategies(vec![
            Box::new(LibraryStrategy::default()),
            Box::new(ZipSignatureStrategy),
            Box::new(RarSignatureStrategy::default()),
        ])
    }
}

impl Extractor {
    /// Uses a custom strategy chain, tried in order.
    pub fn with_strategies(strategies: Vec<Box<dyn ExtractStrategy>>) -> Self {
        Self { strategies }
    }

    /// Names of the strategies in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extracts every supported archive in `archives` into `destination`.
    ///
    /// `progress` is called once per supported archive after it has been
    /// processed.
    ///
    /// # Errors
    ///
    /// `InvalidDirectory` if `destination` is not a directory and
    /// `NoSupportedArchives` if no input has a zip, tar, 7z or rar extension.
    /// Per-archive failures are returned in the report instead.
    pub fn extract<F>(
        &self,
        archives: &[PathBuf],
        destination: &Path,
        mut progress: F,
    ) -> ExtractResult<ExtractReport>
    where
        F: FnMut(&ExtractProgress),
    {
        if !destination.is_dir() {
            return Err(ExtractError::InvalidDirectory {
                path: destination.to_path_buf(),
            });
        }

        let (supported, skipped): (Vec<PathBuf>, Vec<PathBuf>) = archives
            .iter()
            .cloned()
            .partition(|path| is_supported_archive(path));

        if supported.is_empty() {
            return Err(ExtractError::NoSupportedArchives { skipped });
        }

        let mut report = ExtractReport {
            skipped,
            ..Default::default()
        };
        let total = supported.len();

        for (index, archive) in supported.into_iter().enumerate() {
            match self.extract_one(&archive, destination) {
                Ok(strategy) => report.extracted.push(ExtractedArchive {
                    path: archive.clone(),
                    strategy,
                }),
                Err(reasons) => report.failures.push(ExtractionFailure {
                    path: archive.clone(),
                    reasons,
                }),
            }

            progress(&ExtractProgress {
                completed: index + 1,
                total,
                current: archive,
            });
        }

        Ok(report)
    }

    fn extract_one(&self, archive: &Path, destination: &Path) -> Result<&'static str, Vec<String>> {
        let mut reasons = Vec::new();
        for strategy in &self.strategies {
            match strategy.extract(archive, destination) {
                Ok(()) => return Ok(strategy.name()),
                Err(reason) => reasons.push(format!("{}: {}", strategy.name(), reason)),
            }
        }
        Err(reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    struct AlwaysFails;

    impl ExtractStrategy for AlwaysFails {
        fn name(&self) -> &'static str {
            "always-fails"
        }

        fn extract(&self, _archive: &Path, _destination: &Path) -> Result<(), String> {
            Err("primary unavailable".to_string())
        }
    }

    #[test]
    fn test_enclosed_path_rejects_escaping_entries() {
        let root = Path::new("/out");
        assert_eq!(
            enclosed_path(root, Path::new("./dir/file.txt")),
            Some(PathBuf::from("/out/dir/file.txt"))
        );
        assert_eq!(enclosed_path(root, Path::new("../evil.txt")), None);
        assert_eq!(enclosed_path(root, Path::new("dir/../../evil.txt")), None);
        assert_eq!(enclosed_path(root, Path::new("/etc/passwd")), None);
    }

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).expect("Failed to create zip");
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("Failed to start zip entry");
            writer
                .write_all(content.as_bytes())
                .expect("Failed to write zip entry");
        }
        writer.finish().expect("Failed to finish zip");
    }

    fn write_tar(path: &Path, name: &str, content: &str) {
        let file = File::create(path).expect("Failed to create tar");
        let mut builder = tar::Builder::new(file);
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .expect("Failed to append tar entry");
        builder.finish().expect("Failed to finish tar");
    }

    fn write_7z_with_entry(path: &Path, source: &Path, entry_name: &str) {
        let mut writer = sevenz_rust2::SevenZWriter::create(path).expect("Failed to create 7z");
        writer
            .push_archive_entry(
                sevenz_rust2::SevenZArchiveEntry::from_path(source, entry_name.to_string()),
                Some(File::open(source).expect("Failed to open entry source")),
            )
            .expect("Failed to add 7z entry");
        writer.finish().expect("Failed to finish 7z");
    }

    /// A chain whose rar handling points at a program that does not exist.
    fn extractor_without_unrar(temp_dir: &TempDir) -> Extractor {
        let missing = temp_dir.path().join("no-such-unrar");
        Extractor::with_strategies(vec![
            Box::new(LibraryStrategy::with_unrar(&missing)),
            Box::new(ZipSignatureStrategy),
            Box::new(RarSignatureStrategy::with_unrar(&missing)),
        ])
    }

    #[test]
    fn test_archive_kind_from_extension() {
        assert_eq!(
            ArchiveKind::from_extension(Path::new("a.ZIP")),
            Some(ArchiveKind::Zip)
        );
        assert_eq!(
            ArchiveKind::from_extension(Path::new("a.7z")),
            Some(ArchiveKind::SevenZ)
        );
        assert_eq!(ArchiveKind::from_extension(Path::new("a.gz")), None);
        assert!(is_supported_archive(Path::new("mods.rar")));
    }

    #[test]
    fn test_zip_detected_by_signature() {
        let temp_dir = TempDir::new().unwrap();
        let disguised = temp_dir.path().join("pack.dat");
        write_zip(&disguised, &[("a.txt", "hello")]);
        assert_eq!(ArchiveKind::from_signature(&disguised), Some(ArchiveKind::Zip));

        let plain = temp_dir.path().join("plain.txt");
        fs::write(&plain, "just text").unwrap();
        assert_eq!(ArchiveKind::from_signature(&plain), None);
    }

    #[test]
    fn test_extract_zip_with_library_strategy() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("a.zip");
        write_zip(&archive, &[("a.txt", "hello"), ("nested/b.txt", "world")]);
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let report = Extractor::default()
            .extract(&[archive.clone()], &out, |_| {})
            .unwrap();

        assert!(report.is_complete_success());
        assert_eq!(report.extracted[0].strategy, "library");
        assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "hello");
        assert_eq!(fs::read_to_string(out.join("nested/b.txt")).unwrap(), "world");
    }

    #[test]
    fn test_extract_tar() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("bundle.tar");
        write_tar(&archive, "inside.txt", "tarred");
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let report = Extractor::default()
            .extract(&[archive], &out, |_| {})
            .unwrap();

        assert!(report.is_complete_success());
        assert_eq!(fs::read_to_string(out.join("inside.txt")).unwrap(), "tarred");
    }

    #[test]
    fn test_extract_7z() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("a.txt"), "seven").unwrap();
        fs::write(source.join("sub").join("b.txt"), "zipped").unwrap();
        let archive = temp_dir.path().join("bundle.7z");
        sevenz_rust2::compress_to_path(&source, &archive).expect("Failed to build 7z");
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let report = Extractor::default()
            .extract(&[archive], &out, |_| {})
            .unwrap();

        assert!(report.is_complete_success());
        assert_eq!(report.extracted[0].strategy, "library");
        assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "seven");
        assert_eq!(fs::read_to_string(out.join("sub/b.txt")).unwrap(), "zipped");
    }

    #[test]
    fn test_7z_entry_outside_destination_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let payload = temp_dir.path().join("payload.txt");
        fs::write(&payload, "escaped").unwrap();
        let archive = temp_dir.path().join("evil.7z");
        write_7z_with_entry(&archive, &payload, "../evil.txt");
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let report = Extractor::default()
            .extract(&[archive], &out, |_| {})
            .unwrap();

        assert!(report.extracted.is_empty());
        assert_eq!(report.failures.len(), 1);
        let reasons = &report.failures[0].reasons;
        assert_eq!(reasons.len(), 3);
        assert!(reasons[0].starts_with("library:"), "{:?}", reasons);
        assert!(reasons[0].contains("escapes the destination"), "{:?}", reasons);
        assert!(!temp_dir.path().join("evil.txt").exists());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_rar_without_unrar_falls_through_chain() {
        let temp_dir = TempDir::new().unwrap();
        let rar = temp_dir.path().join("mods.rar");
        let mut bytes = b"Rar!\x1a\x07\x00".to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        fs::write(&rar, bytes).unwrap();
        assert_eq!(ArchiveKind::from_signature(&rar), Some(ArchiveKind::Rar));
        let good = temp_dir.path().join("good.zip");
        write_zip(&good, &[("g.txt", "good")]);
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let report = extractor_without_unrar(&temp_dir)
            .extract(&[rar.clone(), good.clone()], &out, |_| {})
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.path, rar);
        assert_eq!(failure.reasons.len(), 3);
        assert!(failure.reasons[0].starts_with("library: could not run"));
        assert_eq!(failure.reasons[1], "zip: not a zip file");
        assert!(failure.reasons[2].starts_with("rar: could not run"));
        assert_eq!(report.extracted.len(), 1);
        assert_eq!(report.extracted[0].path, good);
        assert_eq!(fs::read_to_string(out.join("g.txt")).unwrap(), "good");
    }

    #[test]
    fn test_fallback_to_zip_when_primary_fails() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("a.zip");
        write_zip(&archive, &[("a.txt", "hello")]);
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let extractor = Extractor::with_strategies(vec![
            Box::new(AlwaysFails),
            Box::new(ZipSignatureStrategy),
            Box::new(RarSignatureStrategy::default()),
        ]);
        let report = extractor.extract(&[archive.clone()], &out, |_| {}).unwrap();

        assert!(report.failures.is_empty());
        assert_eq!(
            report.extracted,
            vec![ExtractedArchive {
                path: archive,
                strategy: "zip"
            }]
        );
        assert!(out.join("a.txt").exists());
    }

    #[test]
    fn test_zip_with_wrong_extension_falls_back_by_signature() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("mislabelled.7z");
        write_zip(&archive, &[("a.txt", "hello")]);
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let report = Extractor::default()
            .extract(&[archive], &out, |_| {})
            .unwrap();

        assert!(report.is_complete_success());
        assert_eq!(report.extracted[0].strategy, "zip");
        assert!(out.join("a.txt").exists());
    }

    #[test]
    fn test_broken_archive_is_reported_and_others_continue() {
        let temp_dir = TempDir::new().unwrap();
        let broken = temp_dir.path().join("broken.zip");
        fs::write(&broken, "definitely not a zip").unwrap();
        let good = temp_dir.path().join("good.zip");
        write_zip(&good, &[("g.txt", "good")]);
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let mut seen = Vec::new();
        let report = Extractor::default()
            .extract(&[broken.clone(), good], &out, |p| seen.push(p.fraction()))
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, broken);
        assert_eq!(report.failures[0].reasons.len(), 3);
        assert_eq!(report.extracted.len(), 1);
        assert_eq!(seen, vec![0.5, 1.0]);
        assert!(out.join("g.txt").exists());
    }

    #[test]
    fn test_invalid_destination() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("a.zip");
        write_zip(&archive, &[("a.txt", "hello")]);

        let result =
            Extractor::default().extract(&[archive], &temp_dir.path().join("missing"), |_| {});
        assert!(matches!(result, Err(ExtractError::InvalidDirectory { .. })));
    }

    #[test]
    fn test_no_supported_archives() {
        let temp_dir = TempDir::new().unwrap();
        let text = temp_dir.path().join("notes.txt");
        fs::write(&text, "x").unwrap();

        let result = Extractor::default().extract(&[text], temp_dir.path(), |_| {});
        assert!(matches!(
            result,
            Err(ExtractError::NoSupportedArchives { skipped }) if skipped.len() == 1
        ));
    }

    #[test]
    fn test_unsupported_inputs_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("a.zip");
        write_zip(&archive, &[("a.txt", "hello")]);
        let text = temp_dir.path().join("notes.txt");
        fs::write(&text, "x").unwrap();
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let report = Extractor::default()
            .extract(&[text.clone(), archive], &out, |_| {})
            .unwrap();
        assert_eq!(report.skipped, vec![text]);
        assert_eq!(report.extracted.len(), 1);
    }
}
