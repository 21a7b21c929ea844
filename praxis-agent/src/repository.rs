//! Windowed in-memory process storage.

use crate::process::AgentProcess;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

pub trait ProcessRepository: Send + Sync {
    fn save(&self, process: Arc<AgentProcess>);
    fn find_by_id(&self, id: &str) -> Option<Arc<AgentProcess>>;
    fn list(&self) -> Vec<Arc<AgentProcess>>;
    fn delete(&self, id: &str) -> Option<Arc<AgentProcess>>;
}

struct RepoInner {
    order: VecDeque<String>,
    map: HashMap<String, Arc<AgentProcess>>,
}

/// FIFO-windowed repository. Eviction only ever removes processes in a
/// terminal status; live processes are skipped, so the window can
/// temporarily overflow when everything old is still running.
pub struct InMemoryProcessRepository {
    window_size: usize,
    inner: Mutex<RepoInner>,
}

impl InMemoryProcessRepository {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            inner: Mutex::new(RepoInner {
                order: VecDeque::new(),
                map: HashMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn enforce_window(inner: &mut RepoInner, window_size: usize) {
        while inner.map.len() > window_size {
            let evictable = inner
                .order
                .iter()
                .position(|id| {
                    inner
                        .map
                        .get(id)
                        .map(|p| p.status().is_terminal())
                        .unwrap_or(true)
                });
            match evictable {
                Some(index) => {
                    if let Some(id) = inner.order.remove(index) {
                        inner.map.remove(&id);
                        tracing::debug!(process = %id, "evicted from repository window");
                    }
                }
                // Everything in the window is still live; let it overflow.
                None => break,
            }
        }
    }
}

impl Default for InMemoryProcessRepository {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl ProcessRepository for InMemoryProcessRepository {
    fn save(&self, process: Arc<AgentProcess>) {
        let mut inner = self.inner.lock();
        let id = process.id().to_string();
        if inner.map.insert(id.clone(), process).is_none() {
            inner.order.push_back(id);
        }
        Self::enforce_window(&mut inner, self.window_size);
    }

    fn find_by_id(&self, id: &str) -> Option<Arc<AgentProcess>> {
        self.inner.lock().map.get(id).cloned()
    }

    fn list(&self) -> Vec<Arc<AgentProcess>> {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter_map(|id| inner.map.get(id).cloned())
            .collect()
    }

    fn delete(&self, id: &str) -> Option<Arc<AgentProcess>> {
        let mut inner = self.inner.lock();
        let removed = inner.map.remove(id);
        if removed.is_some() {
            inner.order.retain(|existing| existing != id);
        }
        removed
    }
}
