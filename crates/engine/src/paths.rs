//! Well-known locations of VINTF documents on a device image
//!
//! Directory constants end with `/` so file names can be appended directly.

/// System partition VINTF directory; also holds the framework matrix levels
pub const SYSTEM_VINTF_DIR: &str = "/system/etc/vintf/";
/// Vendor partition VINTF directory
pub const VENDOR_VINTF_DIR: &str = "/vendor/etc/vintf/";
/// ODM partition VINTF directory
pub const ODM_VINTF_DIR: &str = "/odm/etc/vintf/";
/// Product partition VINTF directory
pub const PRODUCT_VINTF_DIR: &str = "/product/etc/vintf/";

/// Vendor (device) manifest
pub const VENDOR_MANIFEST: &str = "/vendor/etc/vintf/manifest.xml";
/// System (framework) manifest
pub const SYSTEM_MANIFEST: &str = "/system/etc/vintf/manifest.xml";
/// Device compatibility matrix
pub const VENDOR_MATRIX: &str = "/vendor/etc/vintf/compatibility_matrix.xml";
/// ODM manifest
pub const ODM_MANIFEST: &str = "/odm/etc/vintf/manifest.xml";
/// Product framework matrix fragment
pub const PRODUCT_MATRIX: &str = "/product/etc/vintf/compatibility_matrix.xml";
/// Product manifest
pub const PRODUCT_MANIFEST: &str = "/product/etc/vintf/manifest.xml";

/// Vendor manifest fragments
pub const VENDOR_MANIFEST_FRAGMENT_DIR: &str = "/vendor/etc/vintf/manifest/";
/// System manifest fragments
pub const SYSTEM_MANIFEST_FRAGMENT_DIR: &str = "/system/etc/vintf/manifest/";
/// ODM manifest fragments
pub const ODM_MANIFEST_FRAGMENT_DIR: &str = "/odm/etc/vintf/manifest/";
/// Product manifest fragments
pub const PRODUCT_MANIFEST_FRAGMENT_DIR: &str = "/product/etc/vintf/manifest/";

/// Pre-`etc/vintf` vendor manifest
pub const VENDOR_LEGACY_MANIFEST: &str = "/vendor/manifest.xml";
/// Pre-`etc/vintf` device matrix
pub const VENDOR_LEGACY_MATRIX: &str = "/vendor/compatibility_matrix.xml";
/// Pre-`etc/vintf` system manifest
pub const SYSTEM_LEGACY_MANIFEST: &str = "/system/manifest.xml";
/// Pre-`etc/vintf` framework matrix
pub const SYSTEM_LEGACY_MATRIX: &str = "/system/compatibility_matrix.xml";
/// Pre-`etc/vintf` ODM directory
pub const ODM_LEGACY_VINTF_DIR: &str = "/odm/etc/";
/// Pre-`etc/vintf` ODM manifest
pub const ODM_LEGACY_MANIFEST: &str = "/odm/etc/manifest.xml";

/// SKU-specific manifest inside an ODM directory, e.g. `/odm/etc/vintf/manifest_sku1.xml`
pub fn odm_sku_manifest(dir: &str, sku: &str) -> String {
    format!("{}manifest_{}.xml", dir, sku)
}

/// ODM manifest candidates, highest priority first
pub fn odm_manifest_candidates(sku: Option<&str>) -> Vec<String> {
    let sku = sku.filter(|s| !s.is_empty());
    let mut candidates = Vec::with_capacity(4);
    if let Some(sku) = sku {
        candidates.push(odm_sku_manifest(ODM_VINTF_DIR, sku));
    }
    candidates.push(ODM_MANIFEST.to_string());
    if let Some(sku) = sku {
        candidates.push(odm_sku_manifest(ODM_LEGACY_VINTF_DIR, sku));
    }
    candidates.push(ODM_LEGACY_MANIFEST.to_string());
    candidates
}
