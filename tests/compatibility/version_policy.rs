//! Upper minor bound: forward-compatible vs strict ceiling
//!
//! The same manifest/matrix pair is checked under both policies; only a
//! minor above the range maximum tells them apart.

use crate::common::*;

fn pair() -> (Manifest, Matrix) {
    (
        device_manifest(&["android.hardware.foo@1.5::IFoo/default"]),
        framework_matrix(&[("android.hardware.foo@1.0-2::IFoo/default", false)]),
    )
}

#[test]
fn forward_compatible_accepts_higher_minor() {
    let (manifest, matrix) = pair();
    let options = CheckOptions::with_policy(VersionPolicy::ForwardCompatible);
    assert!(check_compatibility(&manifest, &matrix, &options).is_compatible());
}

#[test]
fn strict_ceiling_rejects_higher_minor() {
    let (manifest, matrix) = pair();
    let options = CheckOptions::with_policy(VersionPolicy::StrictCeiling);
    let verdict = check_compatibility(&manifest, &matrix, &options);
    assert_eq!(
        missing(&verdict),
        vec!["android.hardware.foo@1.0-1.2::IFoo/default"]
    );
}

#[test]
fn default_policy_is_forward_compatible() {
    assert_eq!(
        CheckOptions::default().version_policy,
        VersionPolicy::ForwardCompatible
    );
    assert_eq!(VersionPolicy::default(), VersionPolicy::ForwardCompatible);
}

#[test]
fn both_policies_reject_lower_minor() {
    let manifest = device_manifest(&["android.hardware.foo@1.0::IFoo/default"]);
    let matrix = framework_matrix(&[("android.hardware.foo@1.1-2::IFoo/default", false)]);
    for policy in [VersionPolicy::ForwardCompatible, VersionPolicy::StrictCeiling] {
        let verdict = check_compatibility(&manifest, &matrix, &CheckOptions::with_policy(policy));
        assert!(!verdict.is_compatible(), "{:?}", policy);
    }
}

#[test]
fn both_policies_accept_range_bounds() {
    let matrix = framework_matrix(&[("android.hardware.foo@1.1-2::IFoo/default", false)]);
    for minor in [1, 2] {
        let fq = format!("android.hardware.foo@1.{}::IFoo/default", minor);
        let manifest = device_manifest(&[fq.as_str()]);
        for policy in [VersionPolicy::ForwardCompatible, VersionPolicy::StrictCeiling] {
            let options = CheckOptions::with_policy(policy);
            assert!(
                check_compatibility(&manifest, &matrix, &options).is_compatible(),
                "1.{} under {:?}",
                minor,
                policy
            );
        }
    }
}

#[test]
fn policy_from_config() {
    let config: VintfConfig = toml::from_str("version_policy = \"strict-ceiling\"").unwrap();
    let options = config.check_options().unwrap();
    let (manifest, matrix) = pair();
    assert!(!check_compatibility(&manifest, &matrix, &options).is_compatible());
}

#[test]
fn policy_serde_names() {
    assert_eq!(
        serde_json::to_string(&VersionPolicy::StrictCeiling).unwrap(),
        "\"strict-ceiling\""
    );
    let policy: VersionPolicy = serde_json::from_str("\"forward-compatible\"").unwrap();
    assert_eq!(policy, VersionPolicy::ForwardCompatible);
}
