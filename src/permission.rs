//! Storage read access for the music root, and the flow that asks for it.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

pub const RATIONALE_TITLE: &str = "Requesting Permission";
pub const RATIONALE_MESSAGE: &str = "Allow us to fetch & show songs on your device";
pub const ALLOW_LABEL: &str = "Allow";
pub const DENY_LABEL: &str = "Don't Allow";
pub const DENIED_TOAST: &str = "You denied to fetch songs";

pub trait StorageAccess {
    fn is_granted(&self) -> bool;

    /// Ask again. Returns whether access is now granted.
    fn request(&mut self) -> bool;

    /// Whether the user should see why access is needed before another ask.
    fn should_show_rationale(&self) -> bool;
}

/// Access means the root directory can be listed.
#[derive(Debug, Clone)]
pub struct FsAccess {
    root: PathBuf,
}

impl FsAccess {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl StorageAccess for FsAccess {
    fn is_granted(&self) -> bool {
        fs::read_dir(&self.root).is_ok()
    }

    fn request(&mut self) -> bool {
        self.is_granted()
    }

    fn should_show_rationale(&self) -> bool {
        self.root.exists() && !self.is_granted()
    }
}

/// Where the permission flow ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Granted,
    /// Show the rationale dialog and wait for an answer.
    Rationale,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Allow,
    DontAllow,
}

/// Startup check: granted, or re-check, or fall back to the rationale.
pub fn check(access: &mut dyn StorageAccess) -> Gate {
    if access.is_granted() {
        return Gate::Granted;
    }
    if access.request() {
        info!("storage access granted on request");
        return Gate::Granted;
    }
    if access.should_show_rationale() {
        Gate::Rationale
    } else {
        warn!("storage access denied");
        Gate::Denied
    }
}

/// Resolve the rationale dialog. Allow asks exactly once more.
pub fn answer(access: &mut dyn StorageAccess, answer: Answer) -> Gate {
    match answer {
        Answer::Allow if access.request() => Gate::Granted,
        _ => {
            warn!(?answer, "storage access denied after rationale");
            Gate::Denied
        }
    }
}
