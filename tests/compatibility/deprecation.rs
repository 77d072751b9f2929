//! Deprecated HAL detection across framework matrix levels

use crate::common::*;
use vintf::{check_deprecation, DeprecatedInstance, DeprecationReason};

fn levels() -> Vec<Named<Matrix>> {
    vec![
        fragment(
            Level::O,
            &[
                ("android.hardware.foo@1.0::IFoo/default", false),
                ("android.hardware.old@1.0::IOld/default", false),
            ],
        ),
        fragment(
            Level::P,
            &[("android.hardware.foo@1.1::IFoo/default", false)],
        ),
    ]
}

fn device_at_p(instances: &[&str]) -> Manifest {
    manifest_of(SchemaType::Device, Level::P, instances)
}

#[test]
fn up_to_date_device_has_nothing_deprecated() {
    let manifest = device_at_p(&["android.hardware.foo@1.1::IFoo/default"]);
    let report = check_deprecation(&levels(), manifest.level(), &manifest).unwrap();
    assert!(!report.has_deprecated());
}

#[test]
fn dropped_hal_and_stale_minor_both_reported() {
    let manifest = device_at_p(&[
        "android.hardware.foo@1.0::IFoo/default",
        "android.hardware.old@1.0::IOld/default",
    ]);
    let report = check_deprecation(&levels(), manifest.level(), &manifest).unwrap();
    assert_eq!(
        report.deprecated,
        vec![
            DeprecatedInstance {
                served: FqInstance::parse("android.hardware.foo@1.0::IFoo/default").unwrap(),
                reason: DeprecationReason::RequiresAtLeast(Version::new(1, 1)),
            },
            DeprecatedInstance {
                served: FqInstance::parse("android.hardware.old@1.0::IOld/default").unwrap(),
                reason: DeprecationReason::NotInTargetMatrix {
                    target_level: Level::P
                },
            },
        ]
    );
}

#[test]
fn device_at_lowest_level_checks_nothing() {
    let manifest = manifest_of(
        SchemaType::Device,
        Level::O,
        &["android.hardware.old@1.0::IOld/default"],
    );
    let report = check_deprecation(&levels(), Level::O, &manifest).unwrap();
    assert!(!report.has_deprecated());
}

#[test]
fn missing_target_level_is_not_found() {
    let manifest = manifest_of(SchemaType::Device, Level::Q, &[]);
    let err = check_deprecation(&levels(), Level::Q, &manifest).unwrap_err();
    assert!(err.is_not_found());
}
