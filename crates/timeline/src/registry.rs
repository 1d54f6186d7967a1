use std::collections::HashMap;
use std::sync::OnceLock;

use crate::easing::CSS_EASE_OUT;
use crate::{Easing, TimelineError};

static REGISTRY: OnceLock<HashMap<&'static str, Easing>> = OnceLock::new();

/// Installs the built-in easing curves into the process-wide registry.
///
/// Safe to call from anywhere and any number of times; only the first call
/// populates the table. Returns `true` for that first call.
pub fn register_once() -> bool {
    let mut installed = false;
    REGISTRY.get_or_init(|| {
        installed = true;
        let table = builtin_curves();
        tracing::debug!(curves = table.len(), "registered easing curves");
        table
    });
    installed
}

pub fn is_registered() -> bool {
    REGISTRY.get().is_some()
}

/// Resolves a curve by its registered name (`linear`, `power2.out`, `ease-out`, ...).
///
/// Names are matched case-insensitively.
pub fn lookup(name: &str) -> Result<Easing, TimelineError> {
    let table = REGISTRY.get().ok_or(TimelineError::Unregistered)?;
    let normalized = name.trim().to_ascii_lowercase();
    table
        .get(normalized.as_str())
        .copied()
        .ok_or_else(|| TimelineError::UnknownEasing(name.to_string()))
}

/// Registered curve names, sorted.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY
        .get()
        .map(|table| table.keys().copied().collect())
        .unwrap_or_default();
    names.sort_unstable();
    names
}

fn builtin_curves() -> HashMap<&'static str, Easing> {
    HashMap::from([
        ("linear", Easing::Linear),
        ("none", Easing::Linear),
        ("smoothstep", Easing::Smoothstep),
        ("power1.inout", Easing::EaseInOut),
        ("power1.in", Easing::PowerIn(1)),
        ("power1.out", Easing::PowerOut(1)),
        ("power2.in", Easing::PowerIn(2)),
        ("power2.out", Easing::PowerOut(2)),
        ("power3.in", Easing::PowerIn(3)),
        ("power3.out", Easing::PowerOut(3)),
        ("ease-out", CSS_EASE_OUT),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent() {
        register_once();
        assert!(!register_once());
        assert!(is_registered());
    }

    #[test]
    fn resolves_names_case_insensitively() {
        register_once();
        assert_eq!(lookup("power2.out").unwrap(), Easing::PowerOut(2));
        assert_eq!(lookup(" Power2.OUT ").unwrap(), Easing::PowerOut(2));
        assert_eq!(lookup("ease-out").unwrap(), CSS_EASE_OUT);
    }

    #[test]
    fn rejects_unknown_names() {
        register_once();
        let err = lookup("elastic.out").unwrap_err();
        assert!(matches!(err, TimelineError::UnknownEasing(name) if name == "elastic.out"));
        assert!(names().contains(&"linear"));
    }
}
