//! OS package dependency installation for the Chromium runtime.
//!
//! The package manager is asked in simulation mode what it would install
//! for the `chromium-browser` meta-package; the proposed list is extracted
//! from the dry-run report, patched with packages some distributions
//! erroneously drop from the simulation, sorted for reviewable output, and
//! then installed for real. A failed installation is an environment fault
//! requiring operator intervention: it is fatal and never retried.

mod installer;
mod package_set;

pub use installer::{DepsError, DepsInstaller, DEFAULT_META_PACKAGE, KNOWN_DEPENDENCIES};
pub use package_set::{parse_simulation_report, PackageSet};
