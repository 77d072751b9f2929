//! Kernel requirement pass

use crate::common::*;
use vintf::{KernelConfig, KernelInfo, KernelIssue, KernelRequirement, KernelVersion};

fn kernel_matrix(requirements: Vec<KernelRequirement>, hals: &[(&str, bool)]) -> Matrix {
    let mut builder = MatrixBuilder::new(SchemaType::Framework).kernels(requirements);
    for (pattern, optional) in hals {
        builder = builder.hal(pattern, *optional).unwrap();
    }
    builder.build().unwrap()
}

fn requirement(min_lts: &str, configs: &[(&str, &str)]) -> KernelRequirement {
    KernelRequirement::new(
        min_lts.parse().unwrap(),
        configs
            .iter()
            .map(|(k, v)| KernelConfig::new(*k, *v).unwrap())
            .collect(),
    )
}

fn device_with_kernel(kernel: KernelInfo, hals: &[&str]) -> Manifest {
    let mut builder = ManifestBuilder::new(SchemaType::Device).kernel(kernel);
    for fq in hals {
        builder = builder.hal(fq, Transport::Hwbinder).unwrap();
    }
    builder.build().unwrap()
}

fn kernel_issues(verdict: &Verdict) -> Vec<KernelIssue> {
    verdict
        .diagnostics()
        .iter()
        .filter_map(|d| match d {
            Diagnostic::KernelRequirementUnmet(issue) => Some(issue.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn matching_configs_pass() {
    let matrix = kernel_matrix(
        vec![requirement("4.9.0", &[("CONFIG_64BIT", "y"), ("CONFIG_DEBUG", "n")])],
        &[],
    );
    let kernel = KernelInfo::new(KernelVersion::new(4, 9, 84))
        .with_config("CONFIG_64BIT", "y")
        .unwrap();
    let manifest = device_with_kernel(kernel, &[]);
    assert!(check_compatibility(&manifest, &matrix, &CheckOptions::default()).is_compatible());
}

#[test]
fn kernel_and_hal_failures_reported_together() {
    let matrix = kernel_matrix(
        vec![requirement("4.9.0", &[("CONFIG_64BIT", "y")])],
        &[("android.hardware.foo@1.0::IFoo/default", false)],
    );
    let kernel = KernelInfo::new(KernelVersion::new(4, 9, 84))
        .with_config("CONFIG_64BIT", "m")
        .unwrap();
    let manifest = device_with_kernel(kernel, &[]);

    let verdict = check_compatibility(&manifest, &matrix, &CheckOptions::default());
    let kinds: Vec<_> = verdict.diagnostics().iter().map(Diagnostic::kind).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::MissingRequirement,
            DiagnosticKind::KernelRequirementUnmet
        ]
    );
    assert_eq!(
        kernel_issues(&verdict),
        vec![KernelIssue::ConfigMismatch {
            min_lts: KernelVersion::new(4, 9, 0),
            key: "CONFIG_64BIT".to_string(),
            expected: "y".to_string(),
            actual: Some("m".to_string()),
        }]
    );
}

#[test]
fn unsupported_branch() {
    let matrix = kernel_matrix(
        vec![requirement("4.4.0", &[]), requirement("4.9.0", &[])],
        &[],
    );
    let manifest = device_with_kernel(KernelInfo::new(KernelVersion::new(4, 14, 0)), &[]);
    let verdict = check_compatibility(&manifest, &matrix, &CheckOptions::default());
    assert!(matches!(
        kernel_issues(&verdict).as_slice(),
        [KernelIssue::UnsupportedVersion { .. }]
    ));
}

#[test]
fn lts_too_old() {
    let matrix = kernel_matrix(vec![requirement("4.9.65", &[])], &[]);
    let manifest = device_with_kernel(KernelInfo::new(KernelVersion::new(4, 9, 10)), &[]);
    let verdict = check_compatibility(&manifest, &matrix, &CheckOptions::default());
    assert_eq!(
        kernel_issues(&verdict),
        vec![KernelIssue::VersionTooOld {
            running: KernelVersion::new(4, 9, 10),
            min_lts: KernelVersion::new(4, 9, 65),
        }]
    );
}

#[test]
fn kernel_pass_skipped_when_disabled_or_undeclared() {
    let matrix = kernel_matrix(vec![requirement("4.9.0", &[("CONFIG_X", "y")])], &[]);

    let manifest = device_with_kernel(KernelInfo::new(KernelVersion::new(3, 18, 0)), &[]);
    let options = CheckOptions::default().without_kernel();
    assert!(check_compatibility(&manifest, &matrix, &options).is_compatible());

    let no_kernel = device_manifest(&[]);
    assert!(check_compatibility(&no_kernel, &matrix, &CheckOptions::default()).is_compatible());
}

#[test]
fn framework_kernel_requirements_round_trip_through_json() {
    let matrix = kernel_matrix(
        vec![requirement("4.14.0", &[("CONFIG_ANDROID", "y")])],
        &[],
    );
    let text = JsonConverter::new().serialize_matrix(&matrix).unwrap();
    assert!(text.contains("\"min_lts\":\"4.14.0\""));
    assert_eq!(JsonConverter::new().parse_matrix(&text).unwrap(), matrix);
}
