use crate::vidsort_core::group::FileGroup;
use crate::vidsort_core::parser::{MediaItem, normalize_stem};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// User-selected options for one batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Move grouped subtitles and archives along with their primary.
    pub move_sidecars: bool,
    /// Put series episodes under a `Season NN` subfolder.
    pub season_folders: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    CreateDir,
    Move,
}

/// One planned filesystem operation. Consumed read-only by the preview and
/// the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOperation {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: OpKind,
}

/// The full plan for one batch: directory creations first, then moves, plus
/// the files already at their destination (reported, never executed).
#[derive(Debug, Default)]
pub struct Plan {
    pub operations: Vec<PlannedOperation>,
    pub already_organized: Vec<PathBuf>,
}

impl Plan {
    pub fn move_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| op.kind == OpKind::Move)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Map each file group to destination operations under `root`.
///
/// Destinations never collide within the batch: a taken path gets a numeric
/// ` (2)`, ` (3)`… suffix before the extension, assigned in group-discovery
/// order, so planning the same snapshot twice yields identical paths.
pub fn plan(root: &Path, groups: &[FileGroup], options: &PlanOptions) -> Plan {
    let mut plan = Plan::default();
    let mut taken: HashSet<PathBuf> = HashSet::new();
    let mut dirs: Vec<PathBuf> = Vec::new();
    let mut moves: Vec<PlannedOperation> = Vec::new();

    for group in groups {
        let dest_dir = destination_dir(root, &group.primary, options);
        let base = base_name(&group.primary);

        let primary_dest = claim(
            dest_dir.join(format!("{}.{}", base, group.primary.extension)),
            &mut taken,
        );

        // The (possibly disambiguated) primary base carries over to the
        // sidecars so a group stays together under one name.
        let group_base = primary_dest
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&base)
            .to_string();

        let mut group_moves: Vec<PlannedOperation> = Vec::new();

        if group.primary.source_path == primary_dest {
            plan.already_organized.push(group.primary.source_path.clone());
        } else {
            group_moves.push(PlannedOperation {
                source: group.primary.source_path.clone(),
                destination: primary_dest,
                kind: OpKind::Move,
            });
        }

        if options.move_sidecars {
            let primary_stem = group
                .primary
                .source_path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(normalize_stem)
                .unwrap_or_default();

            for sidecar in &group.associates {
                let ext = sidecar
                    .source_path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or_default();
                let sidecar_stem = sidecar
                    .source_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(normalize_stem)
                    .unwrap_or_default();

                let name = match &sidecar.language_tag {
                    Some(tag) => format!("{group_base}.{tag}.{ext}"),
                    None if sidecar_stem == primary_stem => format!("{group_base}.{ext}"),
                    // Loose prefix match keeps its own name inside the folder.
                    None => sidecar
                        .source_path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or_default()
                        .to_string(),
                };

                let dest = claim(dest_dir.join(name), &mut taken);
                if sidecar.source_path == dest {
                    plan.already_organized.push(sidecar.source_path.clone());
                } else {
                    group_moves.push(PlannedOperation {
                        source: sidecar.source_path.clone(),
                        destination: dest,
                        kind: OpKind::Move,
                    });
                }
            }
        }

        if !group_moves.is_empty() && !dirs.contains(&dest_dir) {
            dirs.push(dest_dir.clone());
        }
        moves.extend(group_moves);
    }

    plan.operations = dirs
        .into_iter()
        .map(|d| PlannedOperation {
            source: d.clone(),
            destination: d,
            kind: OpKind::CreateDir,
        })
        .chain(moves)
        .collect();

    plan
}

/// Destination folder for one item: `Movies/{Title} ({year})` or
/// `Series/{Title}[/Season NN]`.
fn destination_dir(root: &Path, item: &MediaItem, options: &PlanOptions) -> PathBuf {
    if item.is_series {
        let mut dir = root.join("Series").join(&item.clean_title);
        if options.season_folders {
            dir = dir.join(format!("Season {:02}", item.season.unwrap_or(0)));
        }
        dir
    } else {
        match item.year {
            Some(year) => root
                .join("Movies")
                .join(format!("{} ({})", item.clean_title, year)),
            None => root.join("Movies").join(&item.clean_title),
        }
    }
}

/// Renamed base (no extension) for a primary file.
fn base_name(item: &MediaItem) -> String {
    if item.is_series {
        format!(
            "{} - S{:02}E{:02}",
            item.clean_title,
            item.season.unwrap_or(0),
            item.episode.unwrap_or(0)
        )
    } else {
        match item.year {
            Some(year) => format!("{} ({})", item.clean_title, year),
            None => item.clean_title.clone(),
        }
    }
}

/// Reserve a destination path, appending ` (2)`, ` (3)`… before the extension
/// until it is free within this batch.
fn claim(candidate: PathBuf, taken: &mut HashSet<PathBuf>) -> PathBuf {
    let mut dest = candidate.clone();
    let mut counter = 2;
    while taken.contains(&dest) {
        dest = numbered_variant(&candidate, counter);
        counter += 1;
    }
    taken.insert(dest.clone());
    dest
}

/// "dir/name.ext" -> "dir/name (n).ext"; extensionless paths get the suffix
/// appended directly.
pub fn numbered_variant(path: &Path, n: u32) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem} ({n}).{ext}"),
        None => format!("{stem} ({n})"),
    };
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
