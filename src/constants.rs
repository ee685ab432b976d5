//! Global constants used throughout the pfs-finder codebase.
//!
//! Directory templates, file-name templates and regular expressions for every product
//! kind live here. They are configuration data: the filter and discovery layers never
//! hard-code a product's layout. Templates reference filter names as `{name}`
//! placeholders; regexes carry one named capture group per filter.

/// Environment variable holding the default data root.
pub const DATADIR_ENV: &str = "GAPIPE_DATADIR";

/// Environment variable holding the default rerun root (absolute, or relative to the
/// data root).
pub const RERUNDIR_ENV: &str = "GAPIPE_RERUNDIR";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "PFSFIND_CONFIG";

/// Directory names that sit directly below the data root, tried in order.
pub const DEFAULT_DATA_ANCHORS: &[&str] = &["rerun", "pfsConfig", "pfsDesign"];

/// Directory names that sit directly below a rerun root, tried in order.
pub const DEFAULT_RERUN_ANCHORS: &[&str] =
    &["pfsArm", "pfsMerged", "pfsSingle", "pfsObject", "pfsGAObject"];

/// ISO calendar date format used in directory names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Glob fragment for an ISO calendar date.
pub const DATE_GLOB: &str = "????-??-??";

// pfsDesign

pub const PFSDESIGN_DIR_GLOB: &str = "pfsDesign";
pub const PFSDESIGN_DIR_FORMAT: &str = "pfsDesign";
pub const PFSDESIGN_FILENAME_GLOB: &str = "pfsDesign-0x{pfsDesignId}.fits";
pub const PFSDESIGN_FILENAME_FORMAT: &str = "pfsDesign-0x{pfsDesignId}.fits";
pub const PFSDESIGN_FILENAME_REGEX: &str = r"pfsDesign-0x(?P<pfsDesignId>[0-9a-f]{16})\.fits$";

// pfsConfig

pub const PFSCONFIG_DIR_GLOB: &str = "pfsConfig/{date}";
pub const PFSCONFIG_DIR_FORMAT: &str = "pfsConfig/{date}";
pub const PFSCONFIG_FILENAME_GLOB: &str = "pfsConfig-0x{pfsDesignId}-{visit}.fits";
pub const PFSCONFIG_FILENAME_FORMAT: &str = "pfsConfig-0x{pfsDesignId}-{visit}.fits";
pub const PFSCONFIG_FILENAME_REGEX: &str =
    r"pfsConfig-0x(?P<pfsDesignId>[0-9a-f]{16})-(?P<visit>[0-9]{6})\.fits$";
pub const PFSCONFIG_PATH_REGEX: &str = r"(?P<date>[0-9]{4}-[0-9]{2}-[0-9]{2})[/\\]pfsConfig-0x(?P<pfsDesignId>[0-9a-f]{16})-(?P<visit>[0-9]{6})\.fits$";

// pfsSingle

pub const PFSSINGLE_DIR_GLOB: &str = "pfsSingle/{catId}/{tract}/{patch}";
pub const PFSSINGLE_DIR_FORMAT: &str = "pfsSingle/{catId}/{tract}/{patch}";
pub const PFSSINGLE_FILENAME_GLOB: &str = "pfsSingle-{catId}-{tract}-{patch}-{objId}-{visit}.fits";
pub const PFSSINGLE_FILENAME_FORMAT: &str =
    "pfsSingle-{catId}-{tract}-{patch}-{objId}-{visit}.fits";
pub const PFSSINGLE_FILENAME_REGEX: &str = r"pfsSingle-(?P<catId>[0-9]{5})-(?P<tract>[0-9]{5})-(?P<patch>[^/\\]+)-(?P<objId>[0-9a-f]{16})-(?P<visit>[0-9]{6})\.fits$";
