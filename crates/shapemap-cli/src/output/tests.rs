// Tests for strategy tree rendering and the output writer

use super::*;
use serde_json::json;
use shapemap_core::{FunctionRegistry, Mapper};
use std::sync::{Arc, Mutex};

/// Writer that keeps everything written to it
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone()));
    (writer, buffer)
}

fn compiled() -> Arc<CompiledMapping> {
    let mut mapper = Mapper::builder()
        .function_resolver(FunctionRegistry::with_builtins())
        .build();
    mapper
        .compile(
            &json!({
                "name": { "source": "name" },
                "idx": { "source": "index", "function": "increment" },
                "values": { "$nested": [
                    { "$constant": { "category": "original" }, "value": { "source": "value" } },
                    { "value": { "function": "concat" } }
                ] }
            }),
            &json!({ "properties": {
                "name": { "type": "string" },
                "index": { "type": "number" },
                "value": { "type": "number" }
            } }),
            &json!({ "properties": {
                "name": { "type": "string" },
                "idx": { "type": "number" },
                "values": { "type": "array", "items": { "properties": {
                    "category": { "type": "string" },
                    "value": { "type": "string" }
                } } }
            } }),
        )
        .unwrap();
    mapper.mapping().unwrap()
}

#[test]
fn test_strategy_tree_view() {
    let tree = strategy_tree(&compiled());
    assert_eq!(tree.len(), 3);
    assert_eq!(tree[0].strategy, StrategyKind::Copy);
    assert_eq!(tree[0].source.as_deref(), Some("name"));
    assert_eq!(tree[1].strategy, StrategyKind::FunctionVal);
    assert_eq!(tree[1].transform.as_deref(), Some("increment"));

    let values = &tree[2];
    assert_eq!(values.strategy, StrategyKind::NestedArray);
    assert_eq!(values.levels.len(), 2);
    assert_eq!(values.constants[0], vec!["category".to_string()]);
    assert_eq!(values.levels[1][0].strategy, StrategyKind::FunctionFull);
}

#[test]
fn test_strategy_tree_human() {
    let (mut out, buffer) = writer(OutputFormat::Human, false);
    out.strategy_tree(&compiled()).unwrap();

    let expected = "\
name [copy] <- name
idx [functionVal] <- index via increment
values [nestedArray]
  [0] constants: category
    value [copy] <- value
  [1]
    value [functionFull] via concat
";
    assert_eq!(buffer.contents(), expected);
}

#[test]
fn test_strategy_tree_json() {
    let (mut out, buffer) = writer(OutputFormat::Json, false);
    out.strategy_tree(&compiled()).unwrap();

    let value: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
    assert_eq!(value[0], json!({ "target": "name", "strategy": "copy", "source": "name" }));
    assert_eq!(value[2]["strategy"], json!("nestedArray"));
    assert_eq!(value[2]["levels"][1][0]["transform"], json!("concat"));
}

#[test]
fn test_data_formats() {
    let record = json!({ "name": "Foo", "idx": 1 });

    let (mut out, buffer) = writer(OutputFormat::Json, false);
    out.data(&record).unwrap();
    assert_eq!(buffer.contents(), "{\"name\":\"Foo\",\"idx\":1}\n");

    let (mut out, buffer) = writer(OutputFormat::Yaml, false);
    out.data(&record).unwrap();
    assert_eq!(buffer.contents(), "name: Foo\nidx: 1\n");
}

#[test]
fn test_messages_only_in_human_mode() {
    let (mut out, buffer) = writer(OutputFormat::Json, false);
    out.info("compiling").unwrap();
    out.success("done").unwrap();
    out.section("Records").unwrap();
    assert_eq!(buffer.contents(), "");

    let (mut out, buffer) = writer(OutputFormat::Human, true);
    out.info("compiling").unwrap();
    assert_eq!(buffer.contents(), "");

    let (mut out, buffer) = writer(OutputFormat::Human, false);
    out.info("compiling").unwrap();
    out.section("Records").unwrap();
    assert_eq!(buffer.contents(), "INFO: compiling\n\n=== Records ===\n");
}
