//! Level-based framework matrix merging

use crate::common::*;
use vintf::{combine, infer_device_level};

#[test]
fn levels_above_device_are_excluded() {
    let fragments = [
        fragment(Level::O, &[("android.hardware.a@1.0::IA/default", false)]),
        fragment(Level::P, &[("android.hardware.b@1.0::IB/default", false)]),
        fragment(Level::Q, &[("android.hardware.c@1.0::IC/default", false)]),
    ];
    let merged = combine(Level::P, &fragments).unwrap();
    let packages: Vec<_> = merged.packages().into_iter().collect();
    assert_eq!(packages, vec!["android.hardware.a", "android.hardware.b"]);

    // A device at P does not need the Q-only HAL.
    let manifest = device_manifest(&[
        "android.hardware.a@1.0::IA/default",
        "android.hardware.b@1.0::IB/default",
    ]);
    assert!(check_compatibility(&manifest, &merged, &CheckOptions::default()).is_compatible());
}

#[test]
fn repeated_requirement_in_one_level_is_not_weakened() {
    let level = fragment(
        Level::P,
        &[
            ("android.hardware.a@1.0::IA/default", false),
            ("android.hardware.a@1.5::IA/default", false),
        ],
    );
    let manifest = device_manifest(&["android.hardware.a@1.1::IA/default"]);
    let options = CheckOptions::default();
    let alone = check_compatibility(&manifest, &level.object, &options);
    assert_eq!(missing(&alone), vec!["android.hardware.a@1.5::IA/default"]);

    let merged = combine(Level::P, &[level.clone(), level]).unwrap();
    assert_eq!(merged.len(), 2);
    let verdict = check_compatibility(&manifest, &merged, &options);
    assert_eq!(missing(&verdict), vec!["android.hardware.a@1.5::IA/default"]);
}

#[test]
fn merged_matrix_takes_device_level() {
    let fragments = [fragment(Level::O, &[]), fragment(Level::P, &[])];
    let merged = combine(Level::Q, &fragments).unwrap();
    assert_eq!(merged.level(), Level::Q);
    assert_eq!(merged.schema_type(), SchemaType::Framework);
}

#[test]
fn optional_in_one_level_required_in_another() {
    let fragments = [
        fragment(Level::O, &[("android.hardware.a@1.0::IA/default", false)]),
        fragment(Level::P, &[("android.hardware.a@1.0-3::IA/default", true)]),
    ];
    let merged = combine(Level::P, &fragments).unwrap();
    assert_eq!(merged.len(), 1);
    let entry = &merged.instances()[0];
    assert!(!entry.is_optional());
    assert_eq!(entry.range(), VersionRange::new(1, 0, 3).unwrap());

    let verdict = check_compatibility(&device_manifest(&[]), &merged, &CheckOptions::default());
    assert_eq!(verdict.of_kind(DiagnosticKind::MissingRequirement).count(), 1);
}

#[test]
fn newest_minors_satisfy_merged_and_each_level() {
    let fragments = [
        fragment(
            Level::O,
            &[
                ("android.hardware.a@1.0::IA/default", false),
                ("android.hardware.b@2.0::IB/default", false),
            ],
        ),
        fragment(
            Level::P,
            &[
                ("android.hardware.a@1.2::IA/default", false),
                ("android.hardware.b@2.1-4::IB/default", true),
            ],
        ),
    ];
    let merged = combine(Level::P, &fragments).unwrap();
    let manifest = device_manifest(&[
        "android.hardware.a@1.2::IA/default",
        "android.hardware.b@2.0::IB/default",
    ]);
    let options = CheckOptions::default();
    assert!(check_compatibility(&manifest, &merged, &options).is_compatible());
    for f in &fragments {
        assert!(
            check_compatibility(&manifest, &f.object, &options).is_compatible(),
            "{}",
            f.name
        );
    }
}

#[test]
fn device_level_inference_order() {
    let fragments = [fragment(Level::P, &[]), fragment(Level::Q, &[])];
    assert_eq!(
        infer_device_level(Level::R, Some(27), &fragments).unwrap(),
        Level::R
    );
    assert_eq!(
        infer_device_level(Level::UNSPECIFIED, Some(27), &fragments).unwrap(),
        Level::O_MR1
    );
    assert_eq!(
        infer_device_level(Level::UNSPECIFIED, Some(20), &fragments).unwrap(),
        Level::LEGACY
    );
    assert_eq!(
        infer_device_level(Level::UNSPECIFIED, None, &fragments).unwrap(),
        Level::P
    );
}

#[test]
fn matrix_enumeration_is_lazy_and_short_circuits() {
    let matrix = framework_matrix(&[
        ("android.hardware.a@1.0-100::IA/default", false),
        ("android.hardware.b@1.0::IB/default", false),
    ]);
    let first_three: Vec<FqInstance> = matrix
        .expanded_instances()
        .map(|(_, fq)| fq)
        .take(3)
        .collect();
    assert_eq!(first_three[2].to_string(), "android.hardware.a@1.2::IA/default");

    let mut visited = 0;
    let completed = matrix.for_each_instance(|_, _| {
        visited += 1;
        visited < 5
    });
    assert!(!completed);
    assert_eq!(visited, 5);
}
