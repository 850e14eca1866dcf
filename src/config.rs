use std::sync::OnceLock;

use thiserror::Error;

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Process-wide tunables for the stack-protection machinery.
///
/// The configuration is read-only after first use: either install one
/// explicitly with [`Config::install`] before any call to
/// [`protect`](crate::protect) or any [`Recursive`](crate::Recursive)
/// access, or let the defaults take effect on first use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Minimum free stack, in bytes, below which [`protect`](crate::protect)
    /// switches to a fresh segment.
    ///
    /// The default (64 KiB) is far below what any thread starts with, so
    /// ordinary shallow code never triggers a switch. It must stay large
    /// enough to hold every frame pushed between two nested `protect`
    /// calls, which is why the default errs high rather than low.
    pub red_zone_bytes: usize,
    /// Usable size, in bytes, of each allocated stack segment.
    ///
    /// The default (2 MiB) fits thousands of typical frames per segment. A
    /// chain of deep recursion costs one segment per `segment_bytes` worth
    /// of frames; tune this if that memory overhead matters.
    pub segment_bytes: usize,
    /// Whether [`Recursive`](crate::Recursive) accessors verify that a
    /// protected region is active.
    ///
    /// Defaults to on in debug builds and off in optimized builds, so
    /// production code pays nothing for the safety net. The flag is
    /// resolved at runtime, so either mode can be installed in any build
    /// for testing.
    pub strict_checks: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            red_zone_bytes: 64 * 1024,
            segment_bytes: 2 * 1024 * 1024,
            strict_checks: cfg!(debug_assertions),
        }
    }
}

impl Config {
    /// Install this configuration for the whole process.
    ///
    /// The first install wins; every later attempt (including the implicit
    /// default installed by a `protect` call that ran before this) fails
    /// with [`InstallError`].
    pub fn install(self) -> Result<(), InstallError> {
        let mut installed = false;
        CONFIG.get_or_init(|| {
            installed = true;
            self
        });
        if installed {
            Ok(())
        } else {
            Err(InstallError(()))
        }
    }

    /// The active configuration, installing the defaults if none was set.
    pub fn current() -> Config {
        *CONFIG.get_or_init(Config::default)
    }
}

/// Returned by [`Config::install`] when a configuration was already
/// installed, explicitly or by first use of the defaults.
#[derive(Error, Debug)]
#[error("a configuration was already installed for this process")]
pub struct InstallError(());
