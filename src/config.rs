//! Configuration for entropy source selection.
//!
//! Defines which devices are probed, where an EGD daemon may be found and
//! which backend family the selector uses.

use std::env;
use std::path::PathBuf;

/// Non-blocking kernel random device, probed first.
pub const DEV_URANDOM: &str = "/dev/urandom";

/// Blocking kernel random device, probed when the first one is unavailable.
pub const DEV_RANDOM: &str = "/dev/random";

/// Environment variable naming the EGD socket path.
pub const EGD_SOCKET_VAR: &str = "MONO_EGD_SOCKET";

/// Which family of backends the selector initializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Kernel random devices, falling back to an EGD daemon.
    Device,
    /// The platform cryptographic service.
    PlatformService,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(windows) {
            Backend::PlatformService
        } else {
            Backend::Device
        }
    }
}

/// Main configuration structure for entropy acquisition.
///
/// Populated by the host (or left at `Default`) and handed to
/// [`crate::entropy::selector::SourceSelector`].
#[derive(Debug, Clone)]
pub struct EntropyConfig {
    /// Backend family.
    pub backend: Backend,

    /// Random devices, in preference order.
    pub device_paths: Vec<PathBuf>,

    /// Environment variable consulted for the EGD socket path.
    pub egd_socket_var: String,

    /// Explicit EGD socket path. Takes precedence over the environment.
    pub egd_socket: Option<PathBuf>,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            device_paths: vec![PathBuf::from(DEV_URANDOM), PathBuf::from(DEV_RANDOM)],
            egd_socket_var: String::from(EGD_SOCKET_VAR),
            egd_socket: None,
        }
    }
}

impl EntropyConfig {
    /// Resolves the EGD socket path: explicit setting first, then the environment.
    ///
    /// An empty variable counts as unset.
    pub fn egd_socket_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.egd_socket {
            return Some(path.clone());
        }
        env::var_os(&self.egd_socket_var)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_device_order() {
        let config = EntropyConfig::default();
        assert_eq!(
            config.device_paths,
            vec![PathBuf::from("/dev/urandom"), PathBuf::from("/dev/random")]
        );
        assert_eq!(config.egd_socket_var, "MONO_EGD_SOCKET");
    }

    #[test]
    fn test_explicit_socket_wins() {
        let config = EntropyConfig {
            egd_socket: Some(PathBuf::from("/run/egd-pool")),
            egd_socket_var: String::from("SYSENTROPY_TEST_UNSET_VAR_0"),
            ..EntropyConfig::default()
        };
        assert_eq!(config.egd_socket_path(), Some(PathBuf::from("/run/egd-pool")));
    }

    #[test]
    fn test_socket_from_environment() {
        let var = "SYSENTROPY_TEST_CONFIG_VAR";
        env::set_var(var, "/tmp/egd.sock");
        let config = EntropyConfig {
            egd_socket_var: String::from(var),
            ..EntropyConfig::default()
        };
        assert_eq!(config.egd_socket_path(), Some(PathBuf::from("/tmp/egd.sock")));

        env::set_var(var, "");
        assert_eq!(config.egd_socket_path(), None);
        env::remove_var(var);
        assert_eq!(config.egd_socket_path(), None);
    }
}
