//! The profiler state machine.
//!
//! A [`Profiler`] owns an active-frame stack and a [`CallTree`]. `push` is
//! the only transition that grows the stack, `pop` the only one that shrinks
//! it, and `clear` returns to the initial state (depth 0, bare root).
//!
//! The stack is not protected against imbalance: a `push` that is never
//! popped silently shifts every later `pop` onto the wrong frame. Popping
//! at depth 0 is rejected with [`ProfilerError::PopAtRoot`].

use super::clock::{Clock, MonotonicClock};
use super::dump::render;
use super::tree::{CallTree, NodeId};
use crate::utils::config::DEFAULT_ROOT_LABEL;
use crate::utils::error::ProfilerError;
use log::{debug, trace, warn};
use std::ops::{Deref, DerefMut};

/// Profiler construction options
#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    /// Label of the call-tree root
    pub root_label: String,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            root_label: DEFAULT_ROOT_LABEL.to_string(),
        }
    }
}

impl ProfilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveFrame {
    node: NodeId,
    started_at: u64,
}

/// Hierarchical timing profiler for a single thread of control
#[derive(Debug)]
pub struct Profiler<C: Clock = MonotonicClock> {
    tree: CallTree,
    stack: Vec<ActiveFrame>,
    clock: C,
}

impl Profiler<MonotonicClock> {
    pub fn new(root_label: impl Into<String>) -> Self {
        Self::with_clock(root_label, MonotonicClock::new())
    }

    pub fn from_config(config: &ProfilerConfig) -> Self {
        Self::new(config.root_label.clone())
    }
}

impl Default for Profiler<MonotonicClock> {
    fn default() -> Self {
        Self::from_config(&ProfilerConfig::default())
    }
}

impl<C: Clock> Profiler<C> {
    pub fn with_clock(root_label: impl Into<String>, clock: C) -> Self {
        Self {
            tree: CallTree::new(root_label),
            stack: Vec::new(),
            clock,
        }
    }

    /// Open a frame for `label` under the current top of the stack
    pub fn push(&mut self, label: &str) {
        let parent = self.top();
        let node = self.tree.get_or_create_child(parent, label);
        trace!("push '{}' at depth {}", label, self.stack.len() + 1);
        self.stack.push(ActiveFrame {
            node,
            started_at: self.clock.now_ns(),
        });
    }

    /// Close the top frame and record its elapsed time.
    ///
    /// Returns the recorded sample in nanoseconds.
    ///
    /// # Errors
    /// * `ProfilerError::PopAtRoot` - no frame is active
    pub fn pop(&mut self) -> Result<u64, ProfilerError> {
        let Some(frame) = self.stack.pop() else {
            warn!("Rejected pop at the root of '{}'", self.tree.root_label());
            return Err(ProfilerError::PopAtRoot {
                root: self.tree.root_label().to_string(),
            });
        };
        let elapsed = self.clock.now_ns().saturating_sub(frame.started_at);
        self.tree.record(frame.node, elapsed);
        trace!("pop at depth {}: {} ns", self.stack.len() + 1, elapsed);
        Ok(elapsed)
    }

    /// Run `body` between a `push(label)` and a `pop()`.
    ///
    /// A panic inside `body` skips the pop and leaves the frame open, same
    /// as an unmatched manual `push`. Use [`Profiler::enter`] when the frame
    /// must close on unwind too.
    pub fn profile<R>(
        &mut self,
        label: &str,
        body: impl FnOnce(&mut Self) -> R,
    ) -> Result<R, ProfilerError> {
        self.push(label);
        let result = body(self);
        self.pop()?;
        Ok(result)
    }

    /// Push `label` and return a guard that pops when dropped, including
    /// while unwinding. The guard derefs to the profiler for nested probes.
    pub fn enter(&mut self, label: &str) -> FrameGuard<'_, C> {
        self.push(label);
        let depth = self.stack.len();
        FrameGuard {
            profiler: self,
            depth,
        }
    }

    /// Discard all active frames and every recorded sample
    pub fn clear(&mut self) {
        debug!(
            "Clearing profiler '{}' ({} active frame(s), {} node(s))",
            self.tree.root_label(),
            self.stack.len(),
            self.tree.node_count()
        );
        self.stack.clear();
        self.tree.reset();
    }

    /// Indented text report of the call tree
    pub fn dump(&self) -> String {
        render(&self.tree)
    }

    /// Number of open frames; 0 means only the root is active
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn tree(&self) -> &CallTree {
        &self.tree
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Labels of the open frames, outermost first
    pub fn active_path(&self) -> Vec<&str> {
        self.stack
            .iter()
            .filter_map(|frame| self.tree.get(frame.node))
            .map(|node| node.label())
            .collect()
    }

    fn top(&self) -> NodeId {
        self.stack
            .last()
            .map(|frame| frame.node)
            .unwrap_or_else(|| self.tree.root())
    }
}

/// Open frame that is popped when the guard goes out of scope
pub struct FrameGuard<'a, C: Clock> {
    profiler: &'a mut Profiler<C>,
    depth: usize,
}

impl<C: Clock> Deref for FrameGuard<'_, C> {
    type Target = Profiler<C>;

    fn deref(&self) -> &Self::Target {
        self.profiler
    }
}

impl<C: Clock> DerefMut for FrameGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.profiler
    }
}

impl<C: Clock> Drop for FrameGuard<'_, C> {
    fn drop(&mut self) {
        if self.profiler.depth() != self.depth {
            warn!(
                "Frame guard closing at depth {} but was opened at depth {}",
                self.profiler.depth(),
                self.depth
            );
        }
        if let Err(e) = self.profiler.pop() {
            warn!("Frame guard could not close its frame: {}", e);
        }
    }
}
