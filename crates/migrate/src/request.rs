//! Run requests - the parsed intent for a single orchestration pass.
//!
//! A request is built once by the host (typically from CLI flags) and stays
//! immutable for the duration of the run. Validation happens inside
//! [`crate::MigrationRunner::run`] before any hook executes.

use crate::error::RequestError;
use crate::unit::{Direction, Scope};

/// Which deployment scopes a run covers.
///
/// The two CLI flags are exclusivity switches: `--pre` drops the post scope
/// and `--post` drops the pre scope, so supplying both drops everything.
/// That state is representable on purpose: [`RunRequest::validate`] rejects
/// it with a dedicated error rather than silently running nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeFilter {
    pre: bool,
    post: bool,
}

impl ScopeFilter {
    pub fn both() -> Self {
        Self {
            pre: true,
            post: true,
        }
    }

    pub fn pre_only() -> Self {
        Self {
            pre: true,
            post: false,
        }
    }

    pub fn post_only() -> Self {
        Self {
            pre: false,
            post: true,
        }
    }

    /// Build the filter from the mutually-exclusive CLI flag pair.
    pub fn from_flags(pre_only: bool, post_only: bool) -> Self {
        Self {
            pre: !post_only,
            post: !pre_only,
        }
    }

    pub fn includes(&self, scope: Scope) -> bool {
        match scope {
            Scope::Pre => self.pre,
            Scope::Post => self.post,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.pre && !self.post
    }
}

impl Default for ScopeFilter {
    fn default() -> Self {
        Self::both()
    }
}

/// Immutable parameters for one orchestration pass.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub direction: Direction,
    pub scopes: ScopeFilter,
    /// Restrict the pass to the unit with this ordering number.
    pub target: Option<i64>,
    /// Re-run hooks even when the store already reports them applied (or
    /// unapplied, for down). Requires a target.
    pub force: bool,
}

impl RunRequest {
    /// An `up` pass over both scopes, all pending units.
    pub fn up() -> Self {
        Self {
            direction: Direction::Up,
            scopes: ScopeFilter::both(),
            target: None,
            force: false,
        }
    }

    /// A `down` pass for one unit. Down has no safe default breadth, so a
    /// target is part of the constructor.
    pub fn down(target: i64) -> Self {
        Self {
            direction: Direction::Down,
            scopes: ScopeFilter::both(),
            target: Some(target),
            force: false,
        }
    }

    pub fn with_scopes(mut self, scopes: ScopeFilter) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_target(mut self, target: i64) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Check the request for contradictions. Runs before any hook executes.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.scopes.is_empty() {
            return Err(RequestError::NoScopeSelected);
        }
        if self.force && self.target.is_none() {
            return Err(RequestError::ForceWithoutTarget);
        }
        if self.direction == Direction::Down && self.target.is_none() {
            return Err(RequestError::DownWithoutTarget);
        }
        Ok(())
    }
}
