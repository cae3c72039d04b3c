use std::fmt::{self, Display};

use serde::Serialize;

/// Build metadata stamped in by the binary's build script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub build_profile: String,
    pub build_features: String,
    pub build_timestamp: String,
    pub rust_version: String,
}

impl Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version: {}\nprofile: {}\nfeatures: {}\nbuilt: {}\nrustc: {}",
            self.version,
            self.build_profile,
            self.build_features,
            self.build_timestamp,
            self.rust_version
        )
    }
}

/// Collect [`BuildInfo`] from the calling crate's compile-time environment.
///  Values the build script did not set read as `unknown`.
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::version::BuildInfo {
            version: option_env!("REPO_VERSION")
                .unwrap_or(env!("CARGO_PKG_VERSION"))
                .to_string(),
            build_profile: option_env!("BUILD_PROFILE")
                .unwrap_or("unknown")
                .to_string(),
            build_features: option_env!("BUILD_FEATURES")
                .unwrap_or("unknown")
                .to_string(),
            build_timestamp: option_env!("BUILD_TIMESTAMP")
                .unwrap_or("unknown")
                .to_string(),
            rust_version: option_env!("RUST_VERSION")
                .unwrap_or("unknown")
                .to_string(),
        }
    };
}

/// Build info for this library itself
pub fn build_info() -> BuildInfo {
    crate::build_info!()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_build_info_falls_back_to_package_version() {
        let info = build_info();
        assert!(!info.version.is_empty());
        assert!(info.to_string().starts_with("version: "));
    }
}
