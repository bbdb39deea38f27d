//! Applying batches to a data tree.
//!
//! Operations run in a fixed order: deletes, then replaces, then updates.
//! Nothing is rolled back: in fail-fast mode the operations before the
//! failing one stay applied, in best-effort mode every successful one does.

use crate::error::{BatchError, BatchResult, OpKind};
use crate::options::{ApplyOptions, FailureMode};
use crate::request::{Notification, SetRequest, Update};
use serde::Serialize;
use tracing::{debug, warn};
use ytree_core::Path;
use ytree_engine::{Engine, EngineError, EngineResult, Payload};
use ytree_tree::DataTree;

/// Counts of successfully applied operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub deletes: usize,
    pub replaces: usize,
    pub updates: usize,
}

impl ApplyReport {
    /// Total successful operations.
    pub fn total(&self) -> usize {
        self.deletes + self.replaces + self.updates
    }

    fn count(&mut self, op: OpKind) {
        match op {
            OpKind::Delete => self.deletes += 1,
            OpKind::Replace => self.replaces += 1,
            OpKind::Update => self.updates += 1,
        }
    }
}

/// Applies batches through one engine.
pub struct Applier<'e> {
    engine: &'e Engine,
    opts: ApplyOptions,
}

impl<'e> Applier<'e> {
    pub fn new(engine: &'e Engine, opts: ApplyOptions) -> Self {
        Self { engine, opts }
    }

    pub fn options(&self) -> &ApplyOptions {
        &self.opts
    }

    // ========== Set Requests ==========

    /// Apply one set request.
    pub fn apply(&self, tree: &mut DataTree, req: &SetRequest) -> BatchResult<ApplyReport> {
        debug!(
            prefix = %req.prefix,
            deletes = req.deletes.len(),
            replaces = req.replaces.len(),
            updates = req.updates.len(),
            "applying set request"
        );
        let mut run = Run::new(self.engine, &self.opts);
        run.deletes(tree, &req.prefix, &req.deletes)?;
        for Update { path, value } in &req.replaces {
            let result = join(&req.prefix, path).and_then(|full| {
                run.delete(tree, &full)?;
                run.set(tree, &full, value)
            });
            run.record(OpKind::Replace, &req.prefix, path, result)?;
        }
        run.updates(tree, &req.prefix, &req.updates)?;
        self.finish(tree, run)
    }

    // ========== Notifications ==========

    /// Apply one notification.
    pub fn apply_notification(
        &self,
        tree: &mut DataTree,
        notification: &Notification,
    ) -> BatchResult<ApplyReport> {
        let mut run = Run::new(self.engine, &self.opts);
        self.notification(&mut run, tree, notification)?;
        self.finish(tree, run)
    }

    /// Apply notifications in order, validating once at the end.
    pub fn apply_notifications(
        &self,
        tree: &mut DataTree,
        notifications: &[Notification],
    ) -> BatchResult<ApplyReport> {
        let mut run = Run::new(self.engine, &self.opts);
        for notification in notifications {
            self.notification(&mut run, tree, notification)?;
        }
        self.finish(tree, run)
    }

    fn notification(
        &self,
        run: &mut Run<'_>,
        tree: &mut DataTree,
        n: &Notification,
    ) -> BatchResult<()> {
        debug!(
            prefix = %n.prefix,
            atomic = n.atomic,
            deletes = n.deletes.len(),
            updates = n.updates.len(),
            "applying notification"
        );
        if n.atomic {
            // An empty prefix clears the whole tree.
            let result = run.delete(tree, &n.prefix);
            run.record(OpKind::Delete, &Path::root(), &n.prefix, result)?;
        }
        run.deletes(tree, &n.prefix, &n.deletes)?;
        run.updates(tree, &n.prefix, &n.updates)
    }

    fn finish(&self, tree: &DataTree, mut run: Run<'_>) -> BatchResult<ApplyReport> {
        if self.opts.validate_after {
            let schema = self.engine.schema();
            let violations = self
                .engine
                .validator()
                .validate_tree(schema, schema.root(), tree.root());
            if !violations.is_empty() {
                warn!(count = violations.len(), "tree validation failed after batch");
                run.failures.push(BatchError::Validation(violations));
            }
        }
        match self.opts.failure_mode {
            FailureMode::BestEffort if !run.failures.is_empty() => {
                Err(BatchError::Multiple(run.failures))
            }
            _ => match run.failures.pop() {
                Some(err) => Err(err),
                None => {
                    debug!(applied = run.report.total(), "batch applied");
                    Ok(run.report)
                }
            },
        }
    }
}

/// State of one batch in progress.
struct Run<'a> {
    engine: &'a Engine,
    opts: &'a ApplyOptions,
    report: ApplyReport,
    failures: Vec<BatchError>,
}

impl<'a> Run<'a> {
    fn new(engine: &'a Engine, opts: &'a ApplyOptions) -> Self {
        Self {
            engine,
            opts,
            report: ApplyReport::default(),
            failures: Vec::new(),
        }
    }

    fn delete(&self, tree: &mut DataTree, path: &Path) -> EngineResult<()> {
        self.engine.delete(tree, path, &self.opts.resolve).map(drop)
    }

    fn set(&self, tree: &mut DataTree, path: &Path, value: &Payload) -> EngineResult<()> {
        self.engine.set(tree, path, value, &self.opts.resolve).map(drop)
    }

    fn deletes(&mut self, tree: &mut DataTree, prefix: &Path, paths: &[Path]) -> BatchResult<()> {
        for path in paths {
            let result = join(prefix, path).and_then(|full| self.delete(tree, &full));
            self.record(OpKind::Delete, prefix, path, result)?;
        }
        Ok(())
    }

    fn updates(&mut self, tree: &mut DataTree, prefix: &Path, updates: &[Update]) -> BatchResult<()> {
        for Update { path, value } in updates {
            let result = join(prefix, path).and_then(|full| self.set(tree, &full, value));
            self.record(OpKind::Update, prefix, path, result)?;
        }
        Ok(())
    }

    /// Count a success, or fail or collect the error per the failure mode.
    fn record(
        &mut self,
        op: OpKind,
        prefix: &Path,
        path: &Path,
        result: EngineResult<()>,
    ) -> BatchResult<()> {
        let source = match result {
            Ok(()) => {
                self.report.count(op);
                return Ok(());
            }
            Err(e) => e,
        };
        let at = Path::join(prefix, path).map_or_else(|_| path.to_string(), |p| p.to_string());
        let err = BatchError::operation(op, at, source);
        match self.opts.failure_mode {
            FailureMode::FailFast => Err(err),
            FailureMode::BestEffort => {
                warn!(%op, error = %err, "batch operation failed, continuing");
                self.failures.push(err);
                Ok(())
            }
        }
    }
}

fn join(prefix: &Path, path: &Path) -> EngineResult<Path> {
    Path::join(prefix, path).map_err(EngineError::from)
}
