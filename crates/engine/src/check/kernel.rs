//! Kernel pass
//!
//! Runs independently of the HAL pass; its issues are appended after the HAL
//! diagnostics.
//!
//! A requirement applies when its `min_lts` is on the running branch
//! (`version.major_rev`) and `min_lts.minor_rev <= running.minor_rev`.

use vintf_core::{KernelInfo, KernelRequirement};

use super::diagnostic::KernelIssue;

pub(crate) fn check_kernel(kernel: &KernelInfo, requirements: &[KernelRequirement]) -> Vec<KernelIssue> {
    let running = kernel.version;
    let branch: Vec<&KernelRequirement> = requirements
        .iter()
        .filter(|req| req.min_lts.same_branch(&running))
        .collect();

    if branch.is_empty() {
        return vec![KernelIssue::UnsupportedVersion {
            running,
            supported: requirements.iter().map(|req| req.min_lts).collect(),
        }];
    }

    let applicable: Vec<&KernelRequirement> = branch
        .iter()
        .copied()
        .filter(|req| req.min_lts.minor_rev <= running.minor_rev)
        .collect();

    if applicable.is_empty() {
        let min_lts = branch
            .iter()
            .map(|req| req.min_lts)
            .min()
            .unwrap_or(running);
        return vec![KernelIssue::VersionTooOld { running, min_lts }];
    }

    let mut issues = Vec::new();
    for req in applicable {
        for config in &req.configs {
            let actual = kernel.config(config.key());
            if !config.satisfied_by(actual) {
                let issue = KernelIssue::ConfigMismatch {
                    min_lts: req.min_lts,
                    key: config.key().to_string(),
                    expected: config.value().to_string(),
                    actual: actual.map(str::to_string),
                };
                if !issues.contains(&issue) {
                    issues.push(issue);
                }
            }
        }
    }
    issues
}
