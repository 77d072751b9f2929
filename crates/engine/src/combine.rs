//! Level-based framework matrix merging
//!
//! A device at level N must satisfy the requirements of every framework
//! matrix fragment at level N or below. `combine` folds those fragments into
//! one matrix so a single check covers all of them:
//!
//! - fragments above the device level are excluded entirely
//! - fragments with an unspecified level always apply
//! - requirements sharing (package, major, interface, instance) across
//!   fragments merge into one entry whose range covers both, optional only if
//!   every contributor is; a key repeated within one fragment stays a
//!   separate requirement
//! - kernel requirements with the same `min_lts` merge their configs
//!
//! A served minor that only one level's range covers still satisfies the
//! merged entry, so a device at the newest minor passes a strict-ceiling
//! check that the oldest level alone would fail.

use rustc_hash::FxHashMap;
use tracing::info;
use vintf_core::{KernelRequirement, Level, Result, SchemaType, VintfError};

use crate::matrix::{Matrix, MatrixInstance};

/// An object tagged with where it came from (usually a file path)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Named<T> {
    /// Source name
    pub name: String,
    /// The object
    pub object: T,
}

impl<T> Named<T> {
    /// Tag `object` with `name`
    pub fn new(name: impl Into<String>, object: T) -> Self {
        Named {
            name: name.into(),
            object,
        }
    }
}

type OwnedKey = (String, u32, String, String);

/// Merge key plus how many earlier entries of the same fragment share it
type SlotKey = (OwnedKey, usize);

fn owned_key(mi: &MatrixInstance) -> OwnedKey {
    let (package, major, interface, instance) = mi.key();
    (
        package.to_string(),
        major,
        interface.to_string(),
        instance.to_string(),
    )
}

/// Merge the framework matrix fragments that apply to `device_level`
///
/// Fragments are visited in ascending level order (stable for equal levels),
/// so the merged requirements keep the order in which they first appear.
///
/// # Errors
///
/// - `MalformedInput` if `device_level` is unspecified or a fragment is a
///   device matrix
/// - `Conflict` if two kernel requirements with the same `min_lts` demand
///   different values for one config
pub fn combine(device_level: Level, fragments: &[Named<Matrix>]) -> Result<Matrix> {
    if !device_level.is_specified() {
        return Err(VintfError::malformed(
            "cannot combine framework matrices for an unspecified device level",
        ));
    }
    if let Some(bad) = fragments
        .iter()
        .find(|f| f.object.schema_type() != SchemaType::Framework)
    {
        return Err(VintfError::malformed(format!(
            "{} is not a framework compatibility matrix",
            bad.name
        )));
    }

    let mut selected: Vec<&Named<Matrix>> = fragments
        .iter()
        .filter(|f| {
            let level = f.object.level();
            !level.is_specified() || level <= device_level
        })
        .collect();
    // UNSPECIFIED sorts last
    selected.sort_by_key(|f| f.object.level());

    let mut instances: Vec<MatrixInstance> = Vec::new();
    let mut positions: FxHashMap<SlotKey, usize> = FxHashMap::default();
    let mut kernels: Vec<KernelRequirement> = Vec::new();

    for fragment in &selected {
        // Repeated keys within one fragment stay separate requirements; the
        // n-th occurrence only merges with n-th occurrences of other fragments.
        let mut seen: FxHashMap<OwnedKey, usize> = FxHashMap::default();
        for mi in fragment.object.instances() {
            let key = owned_key(mi);
            let occurrence = seen.entry(key.clone()).or_insert(0);
            let key = (key, *occurrence);
            *occurrence += 1;
            match positions.get(&key) {
                Some(&pos) => instances[pos].widen(mi),
                None => {
                    positions.insert(key, instances.len());
                    instances.push(mi.clone());
                }
            }
        }
        for kernel in fragment.object.kernels() {
            merge_kernel(&mut kernels, kernel).map_err(|e| e.with_context(&fragment.name))?;
        }
    }

    let names: Vec<&str> = selected.iter().map(|f| f.name.as_str()).collect();
    info!(
        target: "vintf::combine",
        device_level = %device_level,
        fragments = ?names,
        requirements = instances.len(),
        "Combined framework compatibility matrix"
    );

    Ok(Matrix::from_parts(
        SchemaType::Framework,
        device_level,
        instances,
        kernels,
    ))
}

fn merge_kernel(kernels: &mut Vec<KernelRequirement>, incoming: &KernelRequirement) -> Result<()> {
    let Some(existing) = kernels.iter_mut().find(|k| k.min_lts == incoming.min_lts) else {
        kernels.push(incoming.clone());
        return Ok(());
    };
    for config in &incoming.configs {
        match existing.configs.iter().find(|c| c.key() == config.key()) {
            Some(current) if current.value() != config.value() => {
                return Err(VintfError::conflict(format!(
                    "kernel {} requires {}={} and {}={}",
                    incoming.min_lts,
                    config.key(),
                    current.value(),
                    config.key(),
                    config.value()
                )));
            }
            Some(_) => {}
            None => existing.configs.push(config.clone()),
        }
    }
    Ok(())
}

/// Determine the device's FCM level
///
/// In order of preference: the level the device manifest declares, the level
/// implied by `first_api_level`, then the lowest level among `fragments`.
///
/// # Errors
///
/// Returns `NotFound` if none of these yields a level.
pub fn infer_device_level(
    manifest_level: Level,
    first_api_level: Option<u32>,
    fragments: &[Named<Matrix>],
) -> Result<Level> {
    if manifest_level.is_specified() {
        return Ok(manifest_level);
    }
    if let Some(level) = first_api_level
        .map(Level::from_api_level)
        .and_then(Level::specified)
    {
        return Ok(level);
    }
    fragments
        .iter()
        .filter_map(|f| f.object.level().specified())
        .min()
        .ok_or_else(|| VintfError::not_found("device FCM level"))
}
