//! Cross-project lockfile reconciliation
//!
//! Every lockfile that locks a package key is brought in line with the most
//! recently modified entry for that key found anywhere in the set. Running
//! the reconciliation twice in a row changes nothing the second time.

use crate::lockfile::{LockedPackage, Lockfile};
use crate::manifest::PackageRef;
use std::collections::BTreeMap;

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Number of lockfiles examined
    pub scanned: usize,
    /// Indices (into the input slice) of lockfiles that changed
    pub changed: Vec<usize>,
    /// Number of entries rewritten across all lockfiles
    pub entries_updated: usize,
}

/// Pick the newest entry per package key
///
/// Ties keep the entry seen first, so the earliest project in discovery order
/// wins when two lockfiles carry the same timestamp.
pub fn newest_entries(
    lockfiles: &[Lockfile],
    packages: &[String],
) -> BTreeMap<String, LockedPackage> {
    let wanted: Vec<String> = packages
        .iter()
        .map(|p| PackageRef::parse(p).name)
        .collect();

    let mut newest: BTreeMap<String, LockedPackage> = BTreeMap::new();
    for lockfile in lockfiles {
        for (key, entry) in lockfile.packages() {
            if !wanted.is_empty() && !wanted.contains(&PackageRef::parse(key).name) {
                continue;
            }
            match newest.get(key) {
                Some(existing) if existing.last_modified >= entry.last_modified => {}
                _ => {
                    newest.insert(key.clone(), entry.clone());
                }
            }
        }
    }
    newest
}

/// Rewrite lockfiles in place so they agree on the newest entries
pub fn reconcile(lockfiles: &mut [Lockfile], packages: &[String]) -> SyncReport {
    let newest = newest_entries(lockfiles, packages);
    let mut report = SyncReport {
        scanned: lockfiles.len(),
        ..Default::default()
    };

    for (index, lockfile) in lockfiles.iter_mut().enumerate() {
        let keys: Vec<String> = lockfile
            .packages()
            .keys()
            .filter(|k| newest.contains_key(*k))
            .cloned()
            .collect();

        let mut changed = false;
        for key in keys {
            if lockfile.upsert(&key, newest[&key].clone()) {
                log::debug!("Synced {key} in {}", lockfile.path().display());
                report.entries_updated += 1;
                changed = true;
            }
        }
        if changed {
            report.changed.push(index);
        }
    }

    report
}
