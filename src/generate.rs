use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{IconSet, IconStyle, LabelFont, Target};

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory the fixed relative target paths are resolved against.
    pub root: PathBuf,
    pub sets: Vec<IconSet>,
    pub style: IconStyle,
    /// Create missing parent directories instead of failing.
    pub create_dirs: bool,
    /// Only list what would be written.
    pub dry_run: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            sets: IconSet::ALL.to_vec(),
            style: IconStyle::default(),
            create_dirs: false,
            dry_run: false,
        }
    }
}

/// Files produced (or planned, for a dry run) by one [`generate`] call.
#[derive(Debug, Default)]
pub struct Report {
    pub written: Vec<(IconSet, PathBuf)>,
}

impl Report {
    pub fn paths_for(&self, set: IconSet) -> impl Iterator<Item = &Path> {
        self.written
            .iter()
            .filter(move |(s, _)| *s == set)
            .map(|(_, p)| p.as_path())
    }
}

fn write_asset(path: &Path, bytes: &[u8], create_dirs: bool) -> Result<()> {
    if create_dirs {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write icon: {}", path.display()))
}

fn generate_target(
    opts: &GenerateOptions,
    target: &Target,
    font: &LabelFont,
    report: &mut Report,
    on_written: &mut dyn FnMut(IconSet, &Path),
) -> Result<()> {
    let out_path = opts.root.join(&target.path);

    if !opts.dry_run {
        let bytes = target.render(&opts.style, font).with_context(|| {
            format!("Failed to render {}px icon for {}", target.size, out_path.display())
        })?;
        write_asset(&out_path, &bytes, opts.create_dirs)?;
        debug!("{}: wrote {} ({} bytes)", target.set, out_path.display(), bytes.len());
    }

    on_written(target.set, &out_path);
    report.written.push((target.set, out_path));
    Ok(())
}

/// Render every target of the selected sets and write it under `opts.root`.
///
/// Stops at the first failure; files already written stay on disk.
pub fn generate(opts: &GenerateOptions) -> Result<Report> {
    generate_with(opts, |_, _| {})
}

/// Like [`generate`], calling `on_written` right after each file lands (or,
/// for a dry run, as each path is planned). Files reported before an error
/// are the ones left on disk.
pub fn generate_with<F>(opts: &GenerateOptions, mut on_written: F) -> Result<Report>
where
    F: FnMut(IconSet, &Path),
{
    let needs_font = !opts.dry_run && opts.sets.iter().any(|s| s.needs_font());
    let font = if needs_font {
        LabelFont::resolve(&opts.style.font_candidates)
    } else {
        LabelFont::none()
    };

    let mut report = Report::default();
    for &set in &opts.sets {
        let targets = set.targets();
        for target in &targets {
            generate_target(opts, target, &font, &mut report, &mut on_written)?;
        }
        info!("{set}: {} icons done", targets.len());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let opts = GenerateOptions {
            root: dir.path().to_path_buf(),
            dry_run: true,
            ..Default::default()
        };

        let report = generate(&opts).unwrap();
        assert_eq!(report.written.len(), 8 + 5 + 10 + 10);
        assert!(report.written.iter().all(|(_, p)| !p.exists()));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let opts = GenerateOptions {
            root: dir.path().to_path_buf(),
            sets: vec![IconSet::Android],
            ..Default::default()
        };

        let err = generate(&opts).unwrap_err();
        assert!(format!("{err:#}").contains("ic_launcher.xml"));
    }

    #[test]
    fn paths_for_filters_by_set() {
        let dir = tempfile::tempdir().unwrap();
        let opts = GenerateOptions {
            root: dir.path().to_path_buf(),
            sets: vec![IconSet::Desktop, IconSet::Android],
            dry_run: true,
            ..Default::default()
        };

        let report = generate(&opts).unwrap();
        assert_eq!(report.paths_for(IconSet::Desktop).count(), 8);
        assert_eq!(report.paths_for(IconSet::Android).count(), 5);
        assert_eq!(report.paths_for(IconSet::MacosPng).count(), 0);
    }

    #[test]
    fn files_written_before_a_failure_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("assets/icons")).unwrap();
        let opts = GenerateOptions {
            root: dir.path().to_path_buf(),
            sets: vec![IconSet::Desktop, IconSet::Android],
            ..Default::default()
        };

        let mut seen = Vec::new();
        let err = generate_with(&opts, |set, path| seen.push((set, path.to_path_buf())));

        assert!(err.is_err());
        assert_eq!(seen.len(), 8);
        assert!(seen.iter().all(|(set, p)| *set == IconSet::Desktop && p.is_file()));
    }
}
