//! Sandbox Guard
//!
//! Keeps `checkoutLocation` and `workspaceLocation` inside the sandbox root.
//! Later stages run filesystem operations on these locations assuming they
//! never leave the root, so every non-default config passes through here.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use ws_protocol::{WorkspaceConfig, SANDBOX_ROOT};

/// The config field a location came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationField {
    CheckoutLocation,
    WorkspaceLocation,
}

impl fmt::Display for LocationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckoutLocation => write!(f, "checkoutLocation"),
            Self::WorkspaceLocation => write!(f, "workspaceLocation"),
        }
    }
}

/// A configured location escapes the sandbox root
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must not leave the {root} folder (resolves to {normalized}). Check your .gitpod.yml file.")]
pub struct SandboxViolation {
    pub field: LocationField,
    pub root: String,
    /// The location after joining onto the root and normalizing
    pub normalized: String,
}

/// Path containment check against the sandbox root
#[derive(Debug, Clone)]
pub struct SandboxGuard {
    root: PathBuf,
}

impl Default for SandboxGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxGuard {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from(SANDBOX_ROOT),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `relative` onto the root and resolve `.` and `..` lexically.
    ///
    /// A `..` that would climb above `/` is kept, so it shows up in the result.
    pub fn normalize(&self, relative: &str) -> PathBuf {
        let joined = self.root.join(relative);
        let mut normalized = PathBuf::new();
        for component in joined.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    let at_top = matches!(
                        normalized.components().next_back(),
                        None | Some(Component::RootDir) | Some(Component::Prefix(_)) | Some(Component::ParentDir)
                    );
                    if at_top {
                        normalized.push(Component::ParentDir);
                    } else {
                        normalized.pop();
                    }
                }
                other => normalized.push(other),
            }
        }
        normalized
    }

    /// Verify that `relative` stays under the root once joined and normalized
    pub fn check_containment(&self, field: LocationField, relative: &str) -> Result<PathBuf, SandboxViolation> {
        let normalized = self.normalize(relative);

        if has_parent_segment(Path::new(relative)) || has_parent_segment(&normalized) || !self.starts_at_root(&normalized) {
            return Err(SandboxViolation {
                field,
                root: self.root.display().to_string(),
                normalized: normalized.display().to_string(),
            });
        }

        Ok(normalized)
    }

    /// Check both configurable locations of `config`
    pub fn check_config(&self, config: &WorkspaceConfig, user_id: &str) -> Result<(), SandboxViolation> {
        let locations = [
            (LocationField::CheckoutLocation, config.checkout_location.as_deref()),
            (LocationField::WorkspaceLocation, config.workspace_location.as_deref()),
        ];

        for (field, location) in locations {
            let Some(location) = location.filter(|l| !l.is_empty()) else {
                continue;
            };
            if let Err(violation) = self.check_containment(field, location) {
                tracing::error!(
                    user_id,
                    %field,
                    normalized = %violation.normalized,
                    "invalid location, would end up outside the sandbox root"
                );
                return Err(violation);
            }
        }

        Ok(())
    }

    /// Compare the leading segments of `path` with the root's segments
    fn starts_at_root(&self, path: &Path) -> bool {
        let mut segments = path.components();
        self.root.components().all(|expected| segments.next() == Some(expected))
    }
}

/// True if any segment is `..`, including `..` hidden behind a backslash separator
fn has_parent_segment(path: &Path) -> bool {
    path.components().any(|component| match component {
        Component::ParentDir => true,
        Component::Normal(segment) => segment
            .to_string_lossy()
            .split('\\')
            .any(|part| part == ".."),
        _ => false,
    })
}
