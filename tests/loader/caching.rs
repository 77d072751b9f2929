//! Shared objects and cache invalidation

use std::sync::Arc;

use crate::common::*;
use vintf::paths;

#[test]
fn documents_are_fetched_once() {
    let image = DeviceImage::new().manifest(
        paths::VENDOR_MANIFEST,
        &device_manifest(&["a.vendor@1.0::IA/default"]),
    );
    let vintf = image.vintf();
    let first = vintf.device_manifest().unwrap();

    // Changing the image does not affect the cached copy.
    image.fs.insert(
        paths::VENDOR_MANIFEST,
        JsonConverter::new()
            .serialize_manifest(&device_manifest(&["b.vendor@1.0::IB/default"]))
            .unwrap(),
    );
    let second = vintf.device_manifest().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    vintf.clear_cache();
    let third = vintf.device_manifest().unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(third.packages().into_iter().collect::<Vec<_>>(), vec!["b.vendor"]);
}

#[test]
fn failed_fetch_is_retried() {
    let image = DeviceImage::new();
    let vintf = image.vintf();
    assert!(vintf.device_matrix().unwrap_err().is_not_found());

    image.fs.insert(
        paths::VENDOR_MATRIX,
        JsonConverter::new()
            .serialize_matrix(&matrix_of(SchemaType::Device, Level::UNSPECIFIED, &[]))
            .unwrap(),
    );
    assert!(vintf.device_matrix().unwrap().is_empty());
}

#[test]
fn shared_across_threads() {
    let image = DeviceImage::new().manifest(
        paths::VENDOR_MANIFEST,
        &device_manifest(&["a.vendor@1.0::IA/default"]),
    );
    let vintf = Arc::new(image.vintf());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let vintf = Arc::clone(&vintf);
            std::thread::spawn(move || vintf.device_manifest().unwrap())
        })
        .collect();
    let manifests: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for m in &manifests[1..] {
        assert!(Arc::ptr_eq(&manifests[0], m));
    }
}

#[test]
fn combined_matrix_is_cached_until_cleared() {
    let image = DeviceImage::new()
        .manifest(
            paths::VENDOR_MANIFEST,
            &manifest_of(SchemaType::Device, Level::O, &[]),
        )
        .matrix(
            "/system/etc/vintf/compatibility_matrix.1.xml",
            &matrix_of(SchemaType::Framework, Level::O, &[("a.o@1.0::IA/default", false)]),
        )
        .matrix(
            "/system/etc/vintf/compatibility_matrix.3.xml",
            &matrix_of(SchemaType::Framework, Level::P, &[("b.p@1.0::IB/default", false)]),
        );
    let vintf = image.vintf();
    assert_eq!(vintf.framework_matrix().unwrap().level(), Level::O);

    // Upgrading the device level only shows after the cache is cleared.
    image.fs.insert(
        paths::VENDOR_MANIFEST,
        JsonConverter::new()
            .serialize_manifest(&manifest_of(SchemaType::Device, Level::P, &[]))
            .unwrap(),
    );
    assert_eq!(vintf.framework_matrix().unwrap().level(), Level::O);
    vintf.clear_cache();
    let matrix = vintf.framework_matrix().unwrap();
    assert_eq!(matrix.level(), Level::P);
    assert_eq!(matrix.len(), 2);
}
