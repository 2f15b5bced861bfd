//! In-memory mock store for tests
//!
//! Models the remote store as a single JSON tree addressed by slash paths,
//! so hierarchical reads behave like the real deployment (a GET on
//! `users/a/rides` sees children written at `users/a/rides/0/...`).
//! Supports scripted write failures for retry-path tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use contracts::{CoreError, RemoteStore};
use serde_json::{Map, Value};

/// Scriptable in-memory remote store
#[derive(Debug, Default)]
pub struct MockStore {
    state: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    root: Value,
    puts: Vec<(String, Value)>,
    patches: Vec<(String, Value)>,
    put_faults: VecDeque<String>,
    patch_faults: VecDeque<String>,
    get_faults: u32,
}

impl MockStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document at a path
    pub fn seed(&self, path: &str, value: Value) {
        let mut state = self.state.lock().unwrap();
        write_at(&mut state.root, path, value);
    }

    /// Fail the next `count` PUT calls whose path contains `needle`
    pub fn fail_puts_matching(&self, needle: &str, count: u32) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..count {
            state.put_faults.push_back(needle.to_string());
        }
    }

    /// Fail the next `count` PATCH calls whose path contains `needle`
    pub fn fail_patches_matching(&self, needle: &str, count: u32) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..count {
            state.patch_faults.push_back(needle.to_string());
        }
    }

    /// Fail the next `count` GET calls
    pub fn fail_next_gets(&self, count: u32) {
        self.state.lock().unwrap().get_faults += count;
    }

    /// All PUT calls in order (path, value)
    pub fn puts(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().puts.clone()
    }

    /// All PATCH calls in order (path, value)
    pub fn patches(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().patches.clone()
    }

    /// PUT calls recorded for an exact path
    pub fn puts_at(&self, path: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .puts
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Current document at a path
    pub fn document(&self, path: &str) -> Option<Value> {
        read_at(&self.state.lock().unwrap().root, path)
    }
}

impl RemoteStore for MockStore {
    async fn get_json(&self, path: &str) -> Result<Option<Value>, CoreError> {
        let mut state = self.state.lock().unwrap();
        if state.get_faults > 0 {
            state.get_faults -= 1;
            return Err(CoreError::transient("get", "injected fault"));
        }
        Ok(read_at(&state.root, path))
    }

    async fn patch_json(&self, path: &str, value: &Value) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(idx) = state
            .patch_faults
            .iter()
            .position(|n| path.contains(n.as_str()))
        {
            state.patch_faults.remove(idx);
            return Err(CoreError::transient("patch", "injected fault"));
        }
        state.patches.push((path.to_string(), value.clone()));
        merge_at(&mut state.root, path, value);
        Ok(())
    }

    async fn put_json(&self, path: &str, value: &Value) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(idx) = state.put_faults.iter().position(|n| path.contains(n.as_str())) {
            state.put_faults.remove(idx);
            return Err(CoreError::transient("put", "injected fault"));
        }
        state.puts.push((path.to_string(), value.clone()));
        write_at(&mut state.root, path, value.clone());
        Ok(())
    }
}

fn read_at(root: &Value, path: &str) -> Option<Value> {
    let mut node = root;
    for segment in path.split('/') {
        node = node.as_object()?.get(segment)?;
    }
    if node.is_null() {
        None
    } else {
        Some(node.clone())
    }
}

fn write_at(root: &mut Value, path: &str, value: Value) {
    let node = descend(root, path);
    *node = value;
}

fn merge_at(root: &mut Value, path: &str, fields: &Value) {
    let node = descend(root, path);
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let (Some(target), Some(source)) = (node.as_object_mut(), fields.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn descend<'a>(root: &'a mut Value, path: &str) -> &'a mut Value {
    let mut node = root;
    for segment in path.split('/') {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = node
            .as_object_mut()
            .expect("just coerced to object")
            .entry(segment.to_string())
            .or_insert(Value::Null);
    }
    node
}
