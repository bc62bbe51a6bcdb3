/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// Reports a broken call-order contract (begin/end/present, resize mid-capture).
///
/// Panics in debug builds. Release builds log and let the caller skip the
/// offending operation.
#[track_caller]
pub(crate) fn ordering_violation(what: &str) {
    debug_assert!(false, "render pipeline ordering violation: {what}");
    log::warn!("render pipeline ordering violation: {what}; skipping");
}
