//! Migration units - a single ordered step and its lifecycle hooks.
//!
//! A unit carries up to five hooks: `up`/`down` run in the pre-deploy scope,
//! `post_up`/`post_down` in the post-deploy scope, and `verify` is an
//! on-demand consistency check. Hooks are opaque to the engine: each one
//! either succeeds or fails, and true idempotence of the underlying change
//! is the hook author's responsibility.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Future returned by a migration hook.
pub type HookFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A boxed hook body. Receives a clone of the active store handle.
pub type Hook<S> = Box<dyn Fn(S) -> HookFuture + Send + Sync>;

/// Deployment phase a migration step belongs to.
///
/// `Pre` runs before code deploy (typically schema-only changes), `Post`
/// after (typically data backfills). Each unit tracks applied state
/// independently per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Pre,
    Post,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Pre => "pre",
            Scope::Post => "post",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a run: apply forward or reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one of the five hooks, for logging and failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Up,
    Down,
    PostUp,
    PostDown,
    Verify,
}

impl HookKind {
    /// Scope the hook records versions under. `Verify` records nothing.
    pub fn scope(self) -> Option<Scope> {
        match self {
            HookKind::Up | HookKind::Down => Some(Scope::Pre),
            HookKind::PostUp | HookKind::PostDown => Some(Scope::Post),
            HookKind::Verify => None,
        }
    }

    /// Direction of the version transition the hook drives.
    pub fn direction(self) -> Option<Direction> {
        match self {
            HookKind::Up | HookKind::PostUp => Some(Direction::Up),
            HookKind::Down | HookKind::PostDown => Some(Direction::Down),
            HookKind::Verify => None,
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookKind::Up => "pre-up",
            HookKind::Down => "pre-down",
            HookKind::PostUp => "post-up",
            HookKind::PostDown => "post-down",
            HookKind::Verify => "verify",
        };
        f.write_str(name)
    }
}

/// One versioned, ordered change with forward and reverse hooks.
///
/// Units are generic over the store handle `S` their hooks receive, so hook
/// bodies work against the concrete backend without downcasting.
pub struct MigrationUnit<S> {
    number: i64,
    label: String,
    up: Option<Hook<S>>,
    down: Option<Hook<S>>,
    post_up: Option<Hook<S>>,
    post_down: Option<Hook<S>>,
    verify: Option<Hook<S>>,
}

impl<S> MigrationUnit<S> {
    /// Create a unit with the given ordering number and no hooks.
    pub fn new(number: i64) -> Self {
        Self {
            number,
            label: format_label(number),
            up: None,
            down: None,
            post_up: None,
            post_down: None,
            verify: None,
        }
    }

    /// Globally unique ordering number. Drives the total order.
    pub fn number(&self) -> i64 {
        self.number
    }

    /// Human-readable rendering of the ordering number, used in logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Attach the pre-scope forward hook.
    pub fn up<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.up = Some(box_hook(hook));
        self
    }

    /// Attach the pre-scope reverse hook.
    pub fn down<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.down = Some(box_hook(hook));
        self
    }

    /// Attach the post-scope forward hook.
    pub fn post_up<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.post_up = Some(box_hook(hook));
        self
    }

    /// Attach the post-scope reverse hook.
    pub fn post_down<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.post_down = Some(box_hook(hook));
        self
    }

    /// Attach the verify hook, run on demand by
    /// [`crate::MigrationRunner::verify`].
    pub fn verify<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.verify = Some(box_hook(hook));
        self
    }

    pub(crate) fn hook(&self, kind: HookKind) -> Option<&Hook<S>> {
        match kind {
            HookKind::Up => self.up.as_ref(),
            HookKind::Down => self.down.as_ref(),
            HookKind::PostUp => self.post_up.as_ref(),
            HookKind::PostDown => self.post_down.as_ref(),
            HookKind::Verify => self.verify.as_ref(),
        }
    }
}

impl<S> fmt::Debug for MigrationUnit<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationUnit")
            .field("number", &self.number)
            .field("label", &self.label)
            .field("up", &self.up.is_some())
            .field("down", &self.down.is_some())
            .field("post_up", &self.post_up.is_some())
            .field("post_down", &self.post_down.is_some())
            .field("verify", &self.verify.is_some())
            .finish()
    }
}

fn box_hook<S, F, Fut>(hook: F) -> Hook<S>
where
    F: Fn(S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Box::new(move |store| Box::pin(hook(store)))
}

/// Build an ordering number from a timestamp: year, month, day and the
/// second offset within the day, concatenated as `YYYYMMDDSSSSS`.
///
/// Numbers produced within the same UTC second collide; creation tooling is
/// expected to be invoked interactively, not in a tight loop.
pub fn ordering_number(at: DateTime<Utc>) -> i64 {
    let seconds = i64::from(at.num_seconds_from_midnight());
    i64::from(at.year()) * 1_000_000_000
        + i64::from(at.month()) * 10_000_000
        + i64::from(at.day()) * 100_000
        + seconds
}

/// Render an ordering number as `YYYY_MM_DD_SSSSS`.
///
/// Numbers that don't carry the canonical 13 digits (hand-assigned fixtures,
/// for example) render as their raw digits.
fn format_label(number: i64) -> String {
    let digits = number.to_string();
    if digits.len() == 13 {
        format!(
            "{}_{}_{}_{}",
            &digits[0..4],
            &digits[4..6],
            &digits[6..8],
            &digits[8..13]
        )
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ordering_number_concatenates_date_and_second_offset() {
        // 01:02:03 is 3723 seconds into the day.
        let at = Utc.with_ymd_and_hms(2026, 8, 7, 1, 2, 3).unwrap();
        assert_eq!(ordering_number(at), 2026_08_07_03723);
    }

    #[test]
    fn ordering_numbers_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2026, 8, 7, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 8, 8, 0, 0, 0).unwrap();
        assert!(ordering_number(earlier) < ordering_number(later));
    }

    #[test]
    fn canonical_numbers_get_date_style_labels() {
        let unit = MigrationUnit::<()>::new(2026_08_07_03723);
        assert_eq!(unit.label(), "2026_08_07_03723");
    }

    #[test]
    fn short_numbers_keep_raw_labels() {
        let unit = MigrationUnit::<()>::new(100);
        assert_eq!(unit.label(), "100");
    }

    #[test]
    fn hooks_are_optional() {
        let unit = MigrationUnit::<()>::new(100).up(|_| async move { Ok(()) });
        assert!(unit.hook(HookKind::Up).is_some());
        assert!(unit.hook(HookKind::Down).is_none());
        assert!(unit.hook(HookKind::Verify).is_none());
    }

    #[test]
    fn hook_kinds_map_to_scope_and_direction() {
        assert_eq!(HookKind::Up.scope(), Some(Scope::Pre));
        assert_eq!(HookKind::PostDown.scope(), Some(Scope::Post));
        assert_eq!(HookKind::PostUp.direction(), Some(Direction::Up));
        assert_eq!(HookKind::Down.direction(), Some(Direction::Down));
        assert_eq!(HookKind::Verify.scope(), None);
        assert_eq!(HookKind::Verify.direction(), None);
        assert_eq!(HookKind::PostDown.to_string(), "post-down");
    }
}
