//! Package set extraction from apt dry-run reports.

/// An ordered collection of distinct package names.
///
/// Insertion is set-union: a name already present is skipped. The final
/// list is sorted lexicographically before use so the installation command
/// line is deterministic and reviewable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageSet {
    packages: Vec<String>,
}

impl PackageSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of packages in the set.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Whether a package name is already present.
    pub fn contains(&self, name: &str) -> bool {
        self.packages.iter().any(|p| p == name)
    }

    /// Insert a package name unless it is already present.
    ///
    /// Returns `true` if the name was added.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.packages.push(name);
        true
    }

    /// Merge an allow-list of names, skipping any already present.
    pub fn merge<'a, I>(&mut self, names: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in names {
            self.insert(name);
        }
    }

    /// Consume the set, yielding the names in lexicographic order.
    pub fn into_sorted(mut self) -> Vec<String> {
        self.packages.sort();
        self.packages
    }
}

/// Extract candidate package names from an apt dry-run report.
///
/// Only lines beginning with the `Inst` marker are candidates; the second
/// whitespace-delimited token is the package name. Candidates containing
/// the meta-package's own name are discarded: the meta-package is the
/// query target, not a dependency of itself.
pub fn parse_simulation_report(report: &str, meta_package: &str) -> PackageSet {
    let mut set = PackageSet::new();
    for line in report.lines() {
        if !line.starts_with("Inst") {
            continue;
        }
        let Some(name) = line.split_whitespace().nth(1) else {
            continue;
        };
        if name.contains(meta_package) {
            continue;
        }
        set.insert(name);
    }
    set
}
