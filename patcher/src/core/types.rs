//! Shared types passed between the patch engine and the report.
//!
//! Everything here is transient: produced once per run and never persisted.

/// How the tool was invoked. Resolved once in `main` and passed down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// Running as a package manager `postinstall` hook.
    PostInstall,
    /// Manual run with an explicit override.
    Forced,
    /// Manual run without override; nothing is patched.
    Manual,
}

impl InvocationMode {
    /// Resolve from the lifecycle event name and the `--force` flag.
    pub fn resolve(lifecycle_event: Option<&str>, force: bool) -> Self {
        if lifecycle_event == Some("postinstall") {
            Self::PostInstall
        } else if force {
            Self::Forced
        } else {
            Self::Manual
        }
    }

    pub fn should_patch(self) -> bool {
        !matches!(self, Self::Manual)
    }
}

/// Successful outcome of one file patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Content was transformed and written back.
    Applied {
        applied: Vec<String>,
        skipped: Vec<String>,
    },
    /// Sentinel or rule products already present; nothing written.
    AlreadyPatched,
    /// No optional rule matched; nothing written.
    Unchanged { skipped: Vec<String> },
}

/// Per-target record consumed by the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchResult {
    pub target: String,
    pub applied: bool,
    pub already_patched: bool,
    /// Rule ids that matched during this attempt.
    pub rules_applied: Vec<String>,
    /// Optional rule ids whose marker was absent ("not added").
    pub rules_skipped: Vec<String>,
    pub reason: Option<String>,
}

impl PatchResult {
    pub fn from_outcome(target: &str, outcome: &PatchOutcome) -> Self {
        match outcome {
            PatchOutcome::Applied { applied, skipped } => Self {
                target: target.to_string(),
                applied: true,
                already_patched: false,
                rules_applied: applied.clone(),
                rules_skipped: skipped.clone(),
                reason: None,
            },
            PatchOutcome::AlreadyPatched => Self {
                target: target.to_string(),
                applied: false,
                already_patched: true,
                rules_applied: Vec::new(),
                rules_skipped: Vec::new(),
                reason: None,
            },
            PatchOutcome::Unchanged { skipped } => Self {
                target: target.to_string(),
                applied: false,
                already_patched: false,
                rules_applied: Vec::new(),
                rules_skipped: skipped.clone(),
                reason: Some("no markers matched".to_string()),
            },
        }
    }

    pub fn failed(target: &str, reason: impl Into<String>) -> Self {
        Self {
            target: target.to_string(),
            applied: false,
            already_patched: false,
            rules_applied: Vec::new(),
            rules_skipped: Vec::new(),
            reason: Some(reason.into()),
        }
    }

    /// Applied now or already present from an earlier run.
    pub fn is_success(&self) -> bool {
        self.applied || self.already_patched
    }
}
