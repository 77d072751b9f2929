//! Framework matrix levels, combination and legacy fallbacks

use crate::common::*;
use vintf::paths;

fn level_path(level: u32) -> String {
    format!("{}compatibility_matrix.{}.xml", paths::SYSTEM_VINTF_DIR, level)
}

fn system_image() -> DeviceImage {
    DeviceImage::new()
        .matrix(
            &level_path(1),
            &matrix_of(SchemaType::Framework, Level::O, &[("a.o@1.0::IA/default", false)]),
        )
        .matrix(
            &level_path(3),
            &matrix_of(SchemaType::Framework, Level::P, &[("b.p@1.0::IB/default", false)]),
        )
        .matrix(
            &level_path(4),
            &matrix_of(SchemaType::Framework, Level::Q, &[("c.q@1.0::IC/default", false)]),
        )
        .manifest(
            paths::SYSTEM_MANIFEST,
            &manifest_of(SchemaType::Framework, Level::UNSPECIFIED, &[]),
        )
        .raw(&format!("{}notes.txt", paths::SYSTEM_VINTF_DIR), "not a document")
}

#[test]
fn levels_skip_manifest_and_unparseable_files() {
    init_tracing();
    let image = system_image();
    let levels = image.vintf().framework_matrix_levels().unwrap();
    let found: Vec<_> = levels.iter().map(|f| (f.name.as_str(), f.object.level())).collect();
    assert_eq!(
        found,
        vec![
            (level_path(1).as_str(), Level::O),
            (level_path(3).as_str(), Level::P),
            (level_path(4).as_str(), Level::Q),
        ]
    );
}

#[test]
fn product_matrix_joins_levels() {
    let image = system_image().matrix(
        paths::PRODUCT_MATRIX,
        &framework_matrix(&[("p.product@1.0::IP/default", false)]),
    );
    let levels = image.vintf().framework_matrix_levels().unwrap();
    assert_eq!(levels.len(), 4);
    assert_eq!(levels[3].name, paths::PRODUCT_MATRIX);
}

#[test]
fn product_matrix_alone_when_system_dir_has_only_subdirectories() {
    let image = DeviceImage::new()
        .manifest(
            &format!("{}manifest/fragment.xml", paths::SYSTEM_VINTF_DIR),
            &manifest_of(SchemaType::Framework, Level::UNSPECIFIED, &[]),
        )
        .matrix(
            paths::PRODUCT_MATRIX,
            &framework_matrix(&[("p.product@1.0::IP/default", false)]),
        );
    let levels = image.vintf().framework_matrix_levels().unwrap();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].name, paths::PRODUCT_MATRIX);
}

#[test]
fn combined_at_manifest_level() {
    let image = system_image().manifest(
        paths::VENDOR_MANIFEST,
        &manifest_of(SchemaType::Device, Level::P, &[]),
    );
    let matrix = image.vintf().framework_matrix().unwrap();
    assert_eq!(matrix.level(), Level::P);
    let packages: Vec<_> = matrix.packages().into_iter().collect();
    assert_eq!(packages, vec!["a.o", "b.p"]);
}

#[test]
fn combined_at_level_from_first_api_level() {
    // Device manifest without a level; shipping API 28 means FCM level P.
    let image = system_image().manifest(paths::VENDOR_MANIFEST, &device_manifest(&[]));
    let config = VintfConfig {
        first_api_level: Some(28),
        ..VintfConfig::default()
    };
    let matrix = image.vintf_with(config).framework_matrix().unwrap();
    assert_eq!(matrix.level(), Level::P);
}

#[test]
fn combined_at_lowest_level_without_device_manifest() {
    let matrix = system_image().vintf().framework_matrix().unwrap();
    assert_eq!(matrix.level(), Level::O);
    let packages: Vec<_> = matrix.packages().into_iter().collect();
    assert_eq!(packages, vec!["a.o"]);
}

#[test]
fn legacy_framework_matrix_fallback() {
    let image = DeviceImage::new().matrix(
        paths::SYSTEM_LEGACY_MATRIX,
        &framework_matrix(&[("legacy@1.0::IL/default", false)]),
    );
    let matrix = image.vintf().framework_matrix().unwrap();
    assert_eq!(matrix.len(), 1);
}

#[test]
fn device_matrix_and_legacy_fallback() {
    let device = matrix_of(SchemaType::Device, Level::UNSPECIFIED, &[("v.sys@1.0::IV/default", false)]);
    let image = DeviceImage::new().matrix(paths::VENDOR_MATRIX, &device);
    assert_eq!(*image.vintf().device_matrix().unwrap(), device);

    let image = DeviceImage::new().matrix(paths::VENDOR_LEGACY_MATRIX, &device);
    assert_eq!(*image.vintf().device_matrix().unwrap(), device);

    assert!(DeviceImage::new()
        .vintf()
        .device_matrix()
        .unwrap_err()
        .is_not_found());
}
