// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-widget listener sets.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;

use crate::observability::messages::channel::ListenerFailed;
use crate::observability::messages::StructuredLog;

/// Callback invoked with each payload delivered for a widget.
pub type WidgetListener = Arc<dyn Fn(&Value) -> anyhow::Result<()> + Send + Sync>;

/// Handle returned by registration, used to remove that one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Widget id to ordered listener list.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    widgets: HashMap<String, Vec<(ListenerId, WidgetListener)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener for `widget_id`. Listeners run in registration order.
    pub fn add(&mut self, widget_id: &str, listener: WidgetListener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.widgets
            .entry(widget_id.to_string())
            .or_default()
            .push((id, listener));
        id
    }

    /// Remove one listener. Returns `false` when it was not registered.
    pub fn remove(&mut self, widget_id: &str, id: ListenerId) -> bool {
        let Some(listeners) = self.widgets.get_mut(widget_id) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.widgets.remove(widget_id);
        }
        removed
    }

    pub fn listener_count(&self, widget_id: &str) -> usize {
        self.widgets.get(widget_id).map_or(0, Vec::len)
    }

    /// Listeners for `widget_id`, in order, detached from the registry so they
    /// can run without holding its lock.
    pub fn snapshot(&self, widget_id: &str) -> Vec<(ListenerId, WidgetListener)> {
        self.widgets.get(widget_id).cloned().unwrap_or_default()
    }
}

/// Invoke every listener with `payload`.
///
/// A listener that returns an error or panics is logged and skipped; the rest
/// still run. Returns how many listeners completed successfully.
pub fn dispatch(
    widget_id: &str,
    listeners: &[(ListenerId, WidgetListener)],
    payload: &Value,
) -> usize {
    let mut succeeded = 0;
    for (id, listener) in listeners {
        let reason = match catch_unwind(AssertUnwindSafe(|| listener(payload))) {
            Ok(Ok(())) => {
                succeeded += 1;
                continue;
            }
            Ok(Err(e)) => format!("{:#}", e),
            Err(panic) => format!("listener panicked: {}", panic_message(panic.as_ref())),
        };
        ListenerFailed {
            widget_id,
            listener_id: id.value(),
            reason: &reason,
        }
        .log();
    }
    succeeded
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> WidgetListener {
        let log = log.clone();
        Arc::new(move |payload: &Value| -> anyhow::Result<()> {
            log.lock().unwrap().push(format!("{}:{}", tag, payload));
            Ok(())
        })
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.add("w1", recorder(&log, "first"));
        registry.add("w1", recorder(&log, "second"));
        registry.add("w2", recorder(&log, "other"));

        let ran = dispatch("w1", &registry.snapshot("w1"), &json!(5));

        assert_eq!(ran, 2);
        assert_eq!(*log.lock().unwrap(), vec!["first:5", "second:5"]);
    }

    #[test]
    fn test_failing_listener_does_not_block_later_ones() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.add("w1", Arc::new(|_: &Value| -> anyhow::Result<()> {
            anyhow::bail!("chart not ready")
        }));
        registry.add("w1", recorder(&log, "second"));

        let ran = dispatch("w1", &registry.snapshot("w1"), &json!({"v": 1}));

        assert_eq!(ran, 1);
        assert_eq!(*log.lock().unwrap(), vec![r#"second:{"v":1}"#]);
    }

    #[test]
    fn test_panicking_listener_is_contained() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.add("w1", Arc::new(|_: &Value| -> anyhow::Result<()> {
            panic!("widget unmounted")
        }));
        registry.add("w1", recorder(&log, "second"));

        let ran = dispatch("w1", &registry.snapshot("w1"), &json!(1));

        assert_eq!(ran, 1);
        assert_eq!(*log.lock().unwrap(), vec!["second:1"]);
    }

    #[test]
    fn test_remove_only_drops_that_listener() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        let first = registry.add("w1", recorder(&log, "first"));
        registry.add("w1", recorder(&log, "second"));

        assert!(registry.remove("w1", first));
        assert!(!registry.remove("w1", first));
        assert!(!registry.remove("w9", first));
        assert_eq!(registry.listener_count("w1"), 1);

        dispatch("w1", &registry.snapshot("w1"), &json!(0));
        assert_eq!(*log.lock().unwrap(), vec!["second:0"]);
    }

    #[test]
    fn test_unknown_widget_has_no_listeners() {
        let registry = ListenerRegistry::new();
        assert!(registry.snapshot("nope").is_empty());
        assert_eq!(dispatch("nope", &[], &json!(null)), 0);
    }
}
