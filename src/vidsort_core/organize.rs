use crate::vidsort_core::error::{ItemFailures, Result, VidsortError};
use crate::vidsort_core::group::group_entries;
use crate::vidsort_core::parser::title_case;
use crate::vidsort_core::plan::{OpKind, Plan, PlanOptions, numbered_variant, plan};
use crate::vidsort_core::undo::{ExecutedMove, UndoRecord, UndoStore};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

/// Cooperative cancellation flag, checked between individual file operations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Orchestrator lifecycle. Undo is available from any state while a record
/// exists on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Scanned,
    Done,
    Failed,
}

/// Result of a Scan batch: the plan plus classification tallies. Produced
/// without touching the filesystem; repeatable.
#[derive(Debug)]
pub struct ScanReport {
    pub plan: Plan,
    pub movies: usize,
    pub series: usize,
    pub unrecognized: Vec<PathBuf>,
}

impl std::fmt::Display for ScanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} moves planned ({} movies, {} series, {} unrecognized, {} already organized)",
            self.plan.move_count(),
            self.movies,
            self.series,
            self.unrecognized.len(),
            self.plan.already_organized.len()
        )
    }
}

/// Result of an Organize batch.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    pub moved: Vec<ExecutedMove>,
    pub failures: ItemFailures,
    pub cancelled: bool,
}

impl std::fmt::Display for OrganizeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} moved, {} errors", self.moved.len(), self.failures.len())?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

/// Result of an Undo batch.
#[derive(Debug, Default)]
pub struct UndoReport {
    pub restored: Vec<ExecutedMove>,
    pub failures: ItemFailures,
    pub cancelled: bool,
}

impl std::fmt::Display for UndoReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} restored, {} errors", self.restored.len(), self.failures.len())?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

/// Composes parser, grouping, and planner into the two-phase
/// scan-then-organize pipeline, and owns the undo record between batches.
pub struct Organizer {
    source_root: PathBuf,
    options: PlanOptions,
    recursive: bool,
    state: BatchState,
    last_scan: Option<ScanReport>,
    undo_store: UndoStore,
}

impl Organizer {
    pub fn new(source_root: &Path, options: PlanOptions, recursive: bool) -> Result<Self> {
        if !source_root.exists() {
            return Err(VidsortError::PathNotFound(source_root.to_path_buf()));
        }
        if !source_root.is_dir() {
            return Err(VidsortError::NotADirectory(source_root.to_path_buf()));
        }

        Ok(Organizer {
            source_root: source_root.to_path_buf(),
            options,
            recursive,
            state: BatchState::Idle,
            last_scan: None,
            undo_store: UndoStore::new(source_root),
        })
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn undo_store(&self) -> &UndoStore {
        &self.undo_store
    }

    /// Scan phase: classify, group, and plan without touching the filesystem.
    pub fn scan(&mut self) -> Result<&ScanReport> {
        let entries = self.list_entries()?;
        log::info!(
            "Scanning {} ({} entries)",
            self.source_root.display(),
            entries.len()
        );

        let grouped = group_entries(&entries);
        let movies = grouped.groups.iter().filter(|g| !g.primary.is_series).count();
        let series = grouped.groups.len() - movies;

        let plan = plan(&self.source_root, &grouped.groups, &self.options);
        let report = ScanReport {
            plan,
            movies,
            series,
            unrecognized: grouped.residual,
        };

        log::info!("Scan complete: {report}");
        self.state = BatchState::Scanned;
        Ok(self.last_scan.insert(report))
    }

    /// Organize phase: execute the most recent scan's plan in order. A failed
    /// item is recorded and the batch continues; the undo record only ever
    /// contains completed moves.
    pub fn organize(&mut self, cancel: &CancelToken) -> Result<OrganizeReport> {
        let scan = self.last_scan.as_ref().ok_or(VidsortError::NotScanned)?;

        let mut report = OrganizeReport::default();
        let mut record = UndoRecord::new();

        for op in &scan.plan.operations {
            if cancel.is_cancelled() {
                log::warn!("Organize cancelled after {} moves", record.len());
                report.cancelled = true;
                break;
            }

            match op.kind {
                OpKind::CreateDir => {
                    if let Err(e) = fs::create_dir_all(&op.destination) {
                        log::warn!("Failed to create {}: {}", op.destination.display(), e);
                        report
                            .failures
                            .add(op.source.clone(), op.destination.clone(), e.into());
                    }
                }
                OpKind::Move => {
                    // A destination that appeared on disk since planning gets
                    // the same numeric suffix treatment as in-batch collisions.
                    let dest = unique_on_disk(&op.destination);
                    match move_file(&op.source, &dest) {
                        Ok(()) => {
                            log::info!("Moved {} -> {}", op.source.display(), dest.display());
                            record.push(op.source.clone(), dest.clone());
                            report.moved.push(ExecutedMove {
                                source: op.source.clone(),
                                destination: dest,
                            });
                        }
                        Err(e) => {
                            log::warn!("Failed to move {}: {}", op.source.display(), e);
                            report.failures.add(op.source.clone(), dest, e);
                        }
                    }
                }
            }
        }

        if !record.is_empty() {
            self.undo_store.save(&record)?;
        }

        self.state = if report.moved.is_empty() && !report.failures.is_empty() {
            BatchState::Failed
        } else {
            BatchState::Done
        };
        Ok(report)
    }

    /// Undo phase: replay the active record in strict reverse order. Missing
    /// or externally-modified destinations are reported per item while the
    /// remaining entries are still attempted; the record is cleared only when
    /// the pass is complete.
    pub fn undo(&mut self, cancel: &CancelToken) -> Result<UndoReport> {
        let record = self
            .undo_store
            .load()?
            .ok_or_else(|| VidsortError::NoUndoRecord(self.undo_store.path().to_path_buf()))?;

        let mut report = UndoReport::default();
        let mut remaining = record.clone();

        for entry in record.moves.iter().rev() {
            if cancel.is_cancelled() {
                log::warn!("Undo cancelled with {} entries remaining", remaining.len());
                report.cancelled = true;
                self.undo_store.save(&remaining)?;
                return Ok(report);
            }

            // LIFO: the entry being attempted is always the record's tail.
            remaining.moves.pop();

            if !entry.destination.exists() {
                report.failures.add(
                    entry.destination.clone(),
                    entry.source.clone(),
                    VidsortError::PathNotFound(entry.destination.clone()),
                );
                continue;
            }

            if let Some(parent) = entry.source.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    report
                        .failures
                        .add(entry.destination.clone(), entry.source.clone(), e.into());
                    continue;
                }
            }

            let target = unique_on_disk(&entry.source);
            match move_file(&entry.destination, &target) {
                Ok(()) => {
                    log::info!(
                        "Restored {} -> {}",
                        entry.destination.display(),
                        target.display()
                    );
                    report.restored.push(ExecutedMove {
                        source: entry.destination.clone(),
                        destination: target,
                    });
                }
                Err(e) => {
                    report
                        .failures
                        .add(entry.destination.clone(), entry.source.clone(), e);
                }
            }
        }

        self.prune_empty_dirs(&record);
        self.undo_store.clear()?;
        self.state = BatchState::Idle;
        Ok(report)
    }

    /// Remove now-empty directories the batch created, deepest first, up to
    /// but not including the source root. Best-effort.
    fn prune_empty_dirs(&self, record: &UndoRecord) {
        let mut dirs: BTreeSet<PathBuf> = BTreeSet::new();
        for entry in &record.moves {
            let mut dir = entry.destination.parent();
            while let Some(d) = dir {
                if d == self.source_root || !d.starts_with(&self.source_root) {
                    break;
                }
                dirs.insert(d.to_path_buf());
                dir = d.parent();
            }
        }

        let mut ordered: Vec<PathBuf> = dirs.into_iter().collect();
        ordered.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
        for dir in ordered {
            if fs::remove_dir(&dir).is_ok() {
                log::debug!("Removed empty directory {}", dir.display());
            }
        }
    }

    fn list_entries(&self) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();

        if self.recursive {
            for entry in WalkDir::new(&self.source_root).min_depth(1) {
                let entry = entry?;
                if entry.file_type().is_file() {
                    entries.push(entry.into_path());
                }
            }
        } else {
            for entry in fs::read_dir(&self.source_root)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    entries.push(entry.path());
                }
            }
        }

        // The undo log is bookkeeping, not input.
        entries.retain(|p| {
            p.file_name().and_then(|n| n.to_str()) != Some(crate::vidsort_core::undo::UNDO_FILE_NAME)
        });
        entries.sort();
        Ok(entries)
    }
}

/// Rename a single directory in place to its title-cased name. Returns the
/// new path, or `None` when the name is already title-cased.
pub fn title_case_folder(dir: &Path) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Err(VidsortError::NotADirectory(dir.to_path_buf()));
    }
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| VidsortError::PathNotFound(dir.to_path_buf()))?;

    let new_name = title_case(name);
    if new_name == name || new_name.is_empty() {
        return Ok(None);
    }

    let target = match dir.parent() {
        Some(parent) => parent.join(&new_name),
        None => PathBuf::from(&new_name),
    };

    // Case-insensitive filesystems rename in place fine; a genuinely
    // different existing target is a conflict.
    if target.exists() && name.to_lowercase() != new_name.to_lowercase() {
        return Err(VidsortError::Conflict(target));
    }

    fs::rename(dir, &target)?;
    log::info!("Renamed {} -> {}", dir.display(), target.display());
    Ok(Some(target))
}

/// Apply the title-case rename to every immediate subdirectory of `dir`.
pub fn title_case_children(dir: &Path) -> Result<(Vec<(PathBuf, PathBuf)>, ItemFailures)> {
    if !dir.is_dir() {
        return Err(VidsortError::NotADirectory(dir.to_path_buf()));
    }

    let mut children: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    children.sort();

    let mut renamed = Vec::new();
    let mut failures = ItemFailures::new();
    for child in children {
        match title_case_folder(&child) {
            Ok(Some(new_path)) => renamed.push((child, new_path)),
            Ok(None) => {}
            Err(e) => failures.add(child.clone(), child, e),
        }
    }

    Ok((renamed, failures))
}

/// First free variant of `path` on disk: the path itself, else numbered.
fn unique_on_disk(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let mut counter = 2;
    loop {
        let candidate = numbered_variant(path, counter);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Rename, falling back to copy-and-delete for cross-device moves.
fn move_file(source: &Path, destination: &Path) -> Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if fs::copy(source, destination).is_ok() && fs::remove_file(source).is_ok() {
                Ok(())
            } else {
                Err(rename_err.into())
            }
        }
    }
}
