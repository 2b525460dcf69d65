//! Inbound method dispatch.
//!
//! One handler per method (the latest registration wins) plus an optional
//! catch-all observer. For each inbound request the specific handler runs
//! first, then the observer. A panicking callback is logged and skipped;
//! it never unwinds into the driver.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use a2ui_core::{InboundKind, RequestEnvelope};
use serde_json::Value;
use tracing::{debug, warn};

/// Handler for one method. Receives the params (null when absent).
pub type Handler = Box<dyn Fn(&Value) + Send + 'static>;
/// Catch-all observer. Receives every inbound request.
pub type Observer = Box<dyn Fn(&RequestEnvelope) + Send + 'static>;

/// Method → handler table.
#[derive(Default)]
pub struct DispatchTable {
    handlers: HashMap<String, Handler>,
    observer: Option<Observer>,
}

impl DispatchTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `method`. Returns `true` if it replaced one.
    pub fn on(&mut self, method: impl Into<String>, handler: Handler) -> bool {
        self.handlers.insert(method.into(), handler).is_some()
    }

    /// Register a handler for a known inbound kind.
    pub fn on_kind(&mut self, kind: &InboundKind, handler: Handler) -> bool {
        self.on(kind.method(), handler)
    }

    /// Set the catch-all observer, replacing any previous one.
    pub fn on_message(&mut self, observer: Observer) {
        self.observer = Some(observer);
    }

    /// Whether a specific handler exists for `method`.
    pub fn has_handler(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Deliver `request`. Returns how many callbacks ran (0, 1 or 2).
    pub fn dispatch(&self, request: &RequestEnvelope) -> usize {
        let mut ran = 0;
        if let Some(handler) = self.handlers.get(&request.method) {
            let params = request.params_or_null();
            guarded(&request.method, "handler", || handler(params));
            ran += 1;
        }
        if let Some(observer) = &self.observer {
            guarded(&request.method, "observer", || observer(request));
            ran += 1;
        }
        if ran == 0 {
            debug!(method = %request.method, "no handler for inbound method");
        }
        ran
    }
}

fn guarded(method: &str, role: &'static str, callback: impl FnOnce()) {
    if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(callback)) {
        warn!(method, role, panic = %panic_message(&*panic), "inbound callback panicked");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic")
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut methods: Vec<_> = self.handlers.keys().collect();
        methods.sort();
        f.debug_struct("DispatchTable")
            .field("methods", &methods)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Handler) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let log = Arc::clone(&log);
            move |tag: &str| -> Handler {
                let log = Arc::clone(&log);
                let tag = tag.to_string();
                Box::new(move |params: &Value| {
                    log.lock().unwrap().push(format!("{tag}:{params}"));
                })
            }
        };
        (log, make)
    }

    fn push(method: &str, params: Option<Value>) -> RequestEnvelope {
        RequestEnvelope::new(method, params, None)
    }

    #[test]
    fn specific_handler_then_observer() {
        let (log, make) = recorder();
        let mut table = DispatchTable::new();
        let _ = table.on("a2ui.render", make("render"));
        let observed = Arc::clone(&log);
        table.on_message(Box::new(move |req: &RequestEnvelope| {
            observed.lock().unwrap().push(format!("all:{}", req.method));
        }));

        assert_eq!(table.dispatch(&push("a2ui.render", Some(json!({"x": 1})))), 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec![r#"render:{"x":1}"#.to_string(), "all:a2ui.render".to_string()]
        );
    }

    #[test]
    fn last_registration_wins() {
        let (log, make) = recorder();
        let mut table = DispatchTable::new();
        assert!(!table.on("a2ui.notify", make("first")));
        assert!(table.on("a2ui.notify", make("second")));
        let _ = table.dispatch(&push("a2ui.notify", None));
        assert_eq!(*log.lock().unwrap(), vec!["second:null".to_string()]);
    }

    #[test]
    fn unknown_method_reaches_only_observer() {
        let (log, make) = recorder();
        let mut table = DispatchTable::new();
        let _ = table.on("a2ui.render", make("render"));
        assert_eq!(table.dispatch(&push("x.custom", None)), 0);

        let observed = Arc::clone(&log);
        table.on_message(Box::new(move |req: &RequestEnvelope| {
            observed.lock().unwrap().push(req.method.clone());
        }));
        assert_eq!(table.dispatch(&push("x.custom", None)), 1);
        assert_eq!(*log.lock().unwrap(), vec!["x.custom".to_string()]);
    }

    #[test]
    fn kind_registration_uses_wire_method() {
        let (_log, make) = recorder();
        let mut table = DispatchTable::new();
        let _ = table.on_kind(&InboundKind::ConfirmRequest, make("confirm"));
        assert!(table.has_handler("a2ui.requestConfirm"));
    }

    #[test]
    fn panicking_handler_does_not_stop_observer() {
        let (log, _make) = recorder();
        let mut table = DispatchTable::new();
        let _ = table.on(
            "a2ui.render",
            Box::new(|params: &Value| {
                let _ = params["x"].as_str().unwrap();
            }),
        );
        let observed = Arc::clone(&log);
        table.on_message(Box::new(move |req: &RequestEnvelope| {
            observed.lock().unwrap().push(req.method.clone());
        }));

        assert_eq!(table.dispatch(&push("a2ui.render", Some(json!({"x": 1})))), 2);
        assert_eq!(*log.lock().unwrap(), vec!["a2ui.render".to_string()]);
    }

    #[test]
    fn panicking_observer_is_contained() {
        let mut table = DispatchTable::new();
        table.on_message(Box::new(|_: &RequestEnvelope| panic!("observer bug")));
        assert_eq!(table.dispatch(&push("x.custom", None)), 1);
        assert_eq!(table.dispatch(&push("x.custom", None)), 1);
    }
}
