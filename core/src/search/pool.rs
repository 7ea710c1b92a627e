//! Search process pool
//!
//! Owns the invocations of the current round. Each invocation is a tokio task
//! racing the search future against a kill switch; whichever wins produces the
//! single [`Completion`] for that invocation. Losing the race drops the search
//! future, which terminates the child process.

use super::{glob_pattern, Completion, InvocationId, InvocationOutcome, RoundId, SearchTool};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// A running (or finished) invocation
#[derive(Debug)]
pub struct InvocationHandle {
    id: InvocationId,
    kill_switch: Option<oneshot::Sender<()>>,
}

impl InvocationHandle {
    /// Stop the invocation. Safe to call any number of times, and on
    /// invocations that already exited.
    pub fn kill(&mut self) {
        if let Some(kill_switch) = self.kill_switch.take() {
            // The task may be gone already; nothing to report then
            let _ = kill_switch.send(());
        }
    }
}

impl Drop for InvocationHandle {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Pool of invocations belonging to the active round
pub struct SearchProcessPool {
    tool: Arc<dyn SearchTool>,
    completions: mpsc::UnboundedSender<Completion>,
    running: Vec<InvocationHandle>,
    next_invocation: u64,
}

impl SearchProcessPool {
    /// Create a pool that reports completions on `completions`
    pub fn new(tool: Arc<dyn SearchTool>, completions: mpsc::UnboundedSender<Completion>) -> Self {
        Self {
            tool,
            completions,
            running: Vec::new(),
            next_invocation: 0,
        }
    }

    /// Start one invocation per root for `query`, all tagged with `round`
    ///
    /// Returns the ids of the new invocations in root order.
    pub fn launch(&mut self, round: RoundId, query: &str, roots: &[PathBuf]) -> Vec<InvocationId> {
        let pattern = glob_pattern(query);
        let mut launched = Vec::with_capacity(roots.len());

        for (root_index, root) in roots.iter().enumerate() {
            let id = InvocationId(self.next_invocation);
            self.next_invocation += 1;

            let (kill_switch, killed) = oneshot::channel::<()>();
            let tool = self.tool.clone();
            let completions = self.completions.clone();
            let task_root = root.clone();
            let task_pattern = pattern.clone();

            tokio::spawn(async move {
                // Kill is checked first: an invocation killed before its first
                // poll never starts the search
                let outcome = tokio::select! {
                    biased;
                    // Fires on an explicit kill and when the handle is dropped
                    _ = killed => InvocationOutcome::Killed,
                    outcome = tool.search(&task_root, &task_pattern) => outcome,
                };
                debug!(
                    "{} invocation {:?} in {} finished",
                    round,
                    id,
                    task_root.display()
                );
                // The receiver is gone once the session closed
                let _ = completions.send(Completion {
                    round,
                    invocation: id,
                    root_index,
                    root: task_root,
                    outcome,
                });
            });

            debug!(
                "{} launched {} {} in {}",
                round,
                self.tool.name(),
                pattern,
                root.display()
            );
            self.running.push(InvocationHandle {
                id,
                kill_switch: Some(kill_switch),
            });
            launched.push(id);
        }

        launched
    }

    /// Kill every invocation still owned by the pool and forget them
    pub fn kill_all(&mut self) {
        if self.running.is_empty() {
            return;
        }
        debug!("Killing {} search invocation(s)", self.running.len());
        for mut handle in self.running.drain(..) {
            handle.kill();
        }
    }

    /// Release the handle of an invocation whose completion was received
    pub fn reap(&mut self, invocation: InvocationId) -> Option<InvocationHandle> {
        let index = self
            .running
            .iter()
            .position(|handle| handle.id == invocation)?;
        Some(self.running.remove(index))
    }

    /// Number of handles still owned
    pub fn running(&self) -> usize {
        self.running.len()
    }
}

impl Drop for SearchProcessPool {
    fn drop(&mut self) {
        self.kill_all();
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{Script, ScriptedTool};
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn roots(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Completion>) -> Completion {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("completion timed out")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_launch_one_invocation_per_root() {
        let tool = ScriptedTool::new();
        tool.listing("/a", "x", "x.rs\n");
        tool.listing("/b", "x", "src/x.go\n");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut pool = SearchProcessPool::new(tool.clone(), tx);

        let ids = pool.launch(RoundId(3), "x", &roots(&["/a", "/b"]));
        assert_eq!(ids.len(), 2);
        assert_eq!(pool.running(), 2);

        let mut seen = Vec::new();
        for _ in 0..2 {
            let completion = next(&mut rx).await;
            assert_eq!(completion.round, RoundId(3));
            assert!(pool.reap(completion.invocation).is_some());
            seen.push((completion.root_index, completion.root));
        }
        seen.sort();
        assert_eq!(seen, vec![(0, PathBuf::from("/a")), (1, PathBuf::from("/b"))]);
        assert_eq!(pool.running(), 0);

        let mut calls = tool.calls();
        calls.sort();
        assert_eq!(calls[0], (PathBuf::from("/a"), "*x*".to_string()));
    }

    #[tokio::test]
    async fn test_kill_all_stops_hung_invocations() {
        let tool = ScriptedTool::new();
        tool.script("/a", "slow", Script::Hang);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut pool = SearchProcessPool::new(tool.clone(), tx);

        pool.launch(RoundId(1), "slow", &roots(&["/a"]));
        tokio::task::yield_now().await;
        pool.kill_all();
        assert_eq!(pool.running(), 0);

        let completion = next(&mut rx).await;
        assert_eq!(completion.outcome, InvocationOutcome::Killed);
        assert_eq!(tool.killed(), 1);
    }

    #[tokio::test]
    async fn test_kill_before_start_never_searches() {
        let tool = ScriptedTool::new();
        tool.script("/a", "early", Script::Hang);
        tool.script("/b", "early", Script::Hang);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut pool = SearchProcessPool::new(tool.clone(), tx);

        // No yield between launch and kill: the tasks have not been polled
        pool.launch(RoundId(1), "early", &roots(&["/a", "/b"]));
        pool.kill_all();

        for _ in 0..2 {
            assert_eq!(next(&mut rx).await.outcome, InvocationOutcome::Killed);
        }
        assert!(tool.calls().is_empty());
        assert_eq!(tool.killed(), 0);
    }

    #[tokio::test]
    async fn test_kill_is_idempotent_after_exit() {
        let tool = ScriptedTool::new();
        tool.listing("/a", "done", "done.txt\n");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut pool = SearchProcessPool::new(tool.clone(), tx);

        let ids = pool.launch(RoundId(1), "done", &roots(&["/a"]));
        let completion = next(&mut rx).await;
        assert!(matches!(completion.outcome, InvocationOutcome::Listed { .. }));

        let mut handle = pool.reap(ids[0]).unwrap();
        handle.kill();
        handle.kill();
        pool.kill_all();
        pool.kill_all();

        // Nothing further is delivered for an exited invocation
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(tool.killed(), 0);
    }

    #[tokio::test]
    async fn test_dropping_pool_kills_invocations() {
        let tool = ScriptedTool::new();
        tool.script("/a", "q", Script::Hang);
        tool.script("/b", "q", Script::Hang);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut pool = SearchProcessPool::new(tool.clone(), tx);

        pool.launch(RoundId(1), "q", &roots(&["/a", "/b"]));
        assert_eq!(pool.running(), 2);
        tokio::task::yield_now().await;
        drop(pool);

        for _ in 0..2 {
            assert_eq!(next(&mut rx).await.outcome, InvocationOutcome::Killed);
        }
        assert_eq!(tool.killed(), 2);
    }
}
