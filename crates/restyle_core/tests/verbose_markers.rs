//! Integration tests for the per-file markers of verbose mode.

use std::fs;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use restyle_core::{Engine, FnPlugin};
use restyle_tree::{NodeKind, Syntax};
use serde_json::json;
use tempfile::TempDir;
use tracing_subscriber::prelude::*;

struct MessageLog(Arc<Mutex<Vec<String>>>);

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for MessageLog {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if *event.metadata().level() != tracing::Level::INFO {
            return;
        }
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().push(visitor.0);
    }
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            use std::fmt::Write;
            let _ = write!(self.0, "{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.0.push_str(value);
        }
    }
}

fn semicolons() -> FnPlugin {
    FnPlugin::new("semicolons", [Syntax::Css]).with_process(|tree, _| {
        tree.root_mut().walk_mut(&mut |node| {
            if node.kind == NodeKind::Word && node.text() == Some("red") {
                node.set_text("red;");
            }
        });
        Ok(())
    })
}

fn process_with_log(verbose: bool) -> (TempDir, Vec<String>) {
    let temp_dir = TempDir::new().unwrap();
    let changed = temp_dir.path().join("a.css");
    let same = temp_dir.path().join("b.css");
    fs::write(&changed, "a { color: red }").unwrap();
    fs::write(&same, "b { color: blue }").unwrap();

    let mut engine = Engine::new();
    engine.use_plugin(semicolons()).unwrap();
    engine.configure_value(json!({ "verbose": verbose })).unwrap();

    let messages = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(MessageLog(Arc::clone(&messages)));
    tracing::subscriber::with_default(subscriber, || {
        engine.process_file(&changed).unwrap();
        engine.process_file(&same).unwrap();
    });

    let messages = messages.lock().unwrap().clone();
    (temp_dir, messages)
}

#[test]
fn test_verbose_markers_reach_subscriber() {
    let (temp_dir, messages) = process_with_log(true);
    let root = temp_dir.path();

    assert_eq!(
        messages,
        vec![
            format!("✓ {}", root.join("a.css").display()),
            format!("  {}", root.join("b.css").display()),
        ]
    );
}

#[test]
fn test_quiet_mode_emits_no_markers() {
    let (_temp_dir, messages) = process_with_log(false);
    assert!(messages.is_empty());
}
