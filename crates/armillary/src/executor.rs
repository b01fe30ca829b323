//! Linear undo/redo history around [`Command`] execution.
//!
//! The executor owns two stacks and a single in-flight *live* command slot.
//! Regular edits go through [`CommandExecutor::execute`]: apply, push onto
//! the undo stack, clear the redo stack. Continuous gestures (drag, resize)
//! go through the live slot instead: every frame mutates the model
//! immediately for responsiveness, but only [`CommandExecutor::commit_live`]
//! pushes a history entry, so a hundred drag frames undo as one step.
//!
//! History depth is bounded; the oldest entry is dropped when the bound is
//! exceeded.

use log::info;

use armillary_core::geometry::Rect;

use crate::{command::Command, config::HistoryConfig, error::ArmillaryError, project::Project};

/// Executes commands and tracks linear undo/redo history.
#[derive(Debug)]
pub struct CommandExecutor {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    live: Option<Command>,
    limit: usize,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(HistoryConfig::default().limit())
    }
}

impl CommandExecutor {
    /// Create an executor with the given maximum undo depth.
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            live: None,
            limit,
        }
    }

    /// Apply a command and record it in history.
    ///
    /// A pending live command is committed first, keeping history linear.
    /// The redo stack is cleared: edits fork the timeline, they do not merge
    /// with it.
    ///
    /// # Errors
    ///
    /// Propagates the command's apply error; nothing is pushed in that case.
    pub fn execute(
        &mut self,
        project: &mut Project,
        mut command: Command,
    ) -> Result<(), ArmillaryError> {
        self.commit_live();
        command.apply(project)?;
        info!(command = command.label(); "Executed command");
        self.push_entry(command);
        Ok(())
    }

    /// Undo the most recent history entry.
    ///
    /// A pending live command is committed first and therefore becomes the
    /// entry being undone. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, project: &mut Project) -> bool {
        self.commit_live();
        let Some(command) = self.undo_stack.pop() else {
            return false;
        };
        command.undo(project);
        info!(command = command.label(); "Undid command");
        self.redo_stack.push(command);
        true
    }

    /// Re-apply the most recently undone entry.
    ///
    /// Returns `Ok(false)` when there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Propagates the command's apply error; the entry stays on the redo
    /// stack so the caller may retry after repairing the model.
    pub fn redo(&mut self, project: &mut Project) -> Result<bool, ArmillaryError> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        match command.apply(project) {
            Ok(()) => {
                info!(command = command.label(); "Redid command");
                self.undo_stack.push(command);
                Ok(true)
            }
            Err(err) => {
                self.redo_stack.push(command);
                Err(err)
            }
        }
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.live.is_some()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drop all history and any pending live command.
    ///
    /// Used when the project underneath is replaced wholesale, after a load
    /// for instance; stale commands must not outlive the model they captured
    /// state from.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.live = None;
    }

    // =========================================================================
    // Live command handling
    // =========================================================================

    /// Apply a command and hold it as the in-flight gesture.
    ///
    /// Any previously pending live command is committed first. The command
    /// enters history only on [`CommandExecutor::commit_live`].
    ///
    /// # Errors
    ///
    /// Propagates the command's apply error; the live slot stays empty.
    pub fn begin_live(
        &mut self,
        project: &mut Project,
        mut command: Command,
    ) -> Result<(), ArmillaryError> {
        self.commit_live();
        command.apply(project)?;
        self.live = Some(command);
        Ok(())
    }

    /// Retarget the pending live command and re-apply it.
    ///
    /// Returns `Ok(false)` when no live command is pending.
    ///
    /// # Errors
    ///
    /// Propagates the command's apply error.
    pub fn update_live(
        &mut self,
        project: &mut Project,
        rect: Rect,
    ) -> Result<bool, ArmillaryError> {
        let Some(live) = self.live.as_mut() else {
            return Ok(false);
        };
        live.set_target_rect(rect);
        live.apply(project)?;
        Ok(true)
    }

    /// Push the pending live command into history as one entry.
    ///
    /// The model already reflects the command's final state; committing only
    /// records it. Returns `false` when no live command was pending.
    pub fn commit_live(&mut self) -> bool {
        let Some(command) = self.live.take() else {
            return false;
        };
        info!(command = command.label(); "Committed live command");
        self.push_entry(command);
        true
    }

    /// Revert and drop the pending live command without touching history.
    ///
    /// Returns `false` when no live command was pending.
    pub fn cancel_live(&mut self, project: &mut Project) -> bool {
        let Some(command) = self.live.take() else {
            return false;
        };
        command.undo(project);
        info!(command = command.label(); "Cancelled live command");
        true
    }

    /// Borrow the pending live command, if any.
    pub fn live_command(&self) -> Option<&Command> {
        self.live.as_ref()
    }

    fn push_entry(&mut self, command: Command) {
        self.undo_stack.push(command);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use armillary_core::{geometry::Rect, identifier::Id, meta::ClassMeta};

    use super::*;

    fn project_with_placed_class() -> (Project, Id, Id) {
        let mut project = Project::new();
        let diagram = project.create_diagram("D1");
        let class = project.registry_mut().allocate_class_id();
        project
            .registry_mut()
            .create_class(ClassMeta::new(class, "Order"))
            .expect("create class");
        let mut add =
            Command::add_existing(&mut project, diagram, class, Rect::new(0.0, 0.0, 80.0, 40.0))
                .expect("construct add");
        add.apply(&mut project).expect("apply add");
        (project, diagram, add.node())
    }

    fn node_rect(project: &Project, diagram: Id, node: Id) -> Rect {
        project
            .diagram(diagram)
            .expect("diagram present")
            .node(node)
            .expect("node present")
            .rect()
    }

    fn move_command(project: &Project, diagram: Id, node: Id, x: f32, y: f32) -> Command {
        Command::change_node_geometry(project, diagram, node, Rect::new(x, y, 80.0, 40.0))
            .expect("construct move")
    }

    #[test]
    fn test_execute_undo_redo_round_trip() {
        let (mut project, diagram, node) = project_with_placed_class();
        let mut executor = CommandExecutor::new(100);

        let command = move_command(&project, diagram, node, 50.0, 60.0);
        executor.execute(&mut project, command).expect("execute");
        assert_eq!(node_rect(&project, diagram, node), Rect::new(50.0, 60.0, 80.0, 40.0));
        assert!(executor.can_undo());
        assert!(!executor.can_redo());

        assert!(executor.undo(&mut project));
        assert_eq!(node_rect(&project, diagram, node), Rect::new(0.0, 0.0, 80.0, 40.0));
        assert!(!executor.can_undo());
        assert!(executor.can_redo());

        assert!(executor.redo(&mut project).expect("redo"));
        assert_eq!(node_rect(&project, diagram, node), Rect::new(50.0, 60.0, 80.0, 40.0));

        assert!(executor.undo(&mut project));
        // An exhausted stack reports false and leaves the model alone.
        assert!(!executor.undo(&mut project));
        assert_eq!(node_rect(&project, diagram, node), Rect::new(0.0, 0.0, 80.0, 40.0));
    }

    #[test]
    fn test_execute_clears_redo() {
        let (mut project, diagram, node) = project_with_placed_class();
        let mut executor = CommandExecutor::new(100);

        let first = move_command(&project, diagram, node, 10.0, 0.0);
        executor.execute(&mut project, first).expect("execute");
        assert!(executor.undo(&mut project));
        assert!(executor.can_redo());

        let second = move_command(&project, diagram, node, 0.0, 20.0);
        executor.execute(&mut project, second).expect("execute");
        assert!(!executor.can_redo());
        assert!(!executor.redo(&mut project).expect("redo empty"));
    }

    #[test]
    fn test_history_limit_drops_oldest() {
        let (mut project, diagram, node) = project_with_placed_class();
        let mut executor = CommandExecutor::new(3);

        for i in 1..=5 {
            let command = move_command(&project, diagram, node, i as f32 * 10.0, 0.0);
            executor.execute(&mut project, command).expect("execute");
        }
        assert_eq!(node_rect(&project, diagram, node), Rect::new(50.0, 0.0, 80.0, 40.0));

        let mut undone = 0;
        while executor.undo(&mut project) {
            undone += 1;
        }
        assert_eq!(undone, 3);
        // The two oldest moves fell out of history, so the trail ends at the
        // second move's result rather than the starting point.
        assert_eq!(node_rect(&project, diagram, node), Rect::new(20.0, 0.0, 80.0, 40.0));
    }

    #[test]
    fn test_live_gesture_collapses_to_one_entry() {
        let (mut project, diagram, node) = project_with_placed_class();
        let mut executor = CommandExecutor::new(100);

        let first_frame = move_command(&project, diagram, node, 5.0, 5.0);
        executor
            .begin_live(&mut project, first_frame)
            .expect("begin live");
        for i in 1..=20 {
            let updated = executor
                .update_live(&mut project, Rect::new(5.0 + i as f32, 5.0, 80.0, 40.0))
                .expect("update live");
            assert!(updated);
        }
        assert_eq!(node_rect(&project, diagram, node), Rect::new(25.0, 5.0, 80.0, 40.0));

        assert!(executor.commit_live());
        assert!(!executor.commit_live());

        // Exactly one entry: a single undo restores the pre-gesture state.
        assert!(executor.undo(&mut project));
        assert_eq!(node_rect(&project, diagram, node), Rect::new(0.0, 0.0, 80.0, 40.0));
        assert!(!executor.can_undo());
    }

    #[test]
    fn test_cancel_live_restores_without_history() {
        let (mut project, diagram, node) = project_with_placed_class();
        let mut executor = CommandExecutor::new(100);

        let first_frame = move_command(&project, diagram, node, 30.0, 30.0);
        executor
            .begin_live(&mut project, first_frame)
            .expect("begin live");
        executor
            .update_live(&mut project, Rect::new(90.0, 90.0, 80.0, 40.0))
            .expect("update live");

        assert!(executor.cancel_live(&mut project));
        assert_eq!(node_rect(&project, diagram, node), Rect::new(0.0, 0.0, 80.0, 40.0));
        assert!(!executor.can_undo());
        assert!(!executor.cancel_live(&mut project));
    }

    #[test]
    fn test_execute_commits_pending_live_first() {
        let (mut project, diagram, node) = project_with_placed_class();
        let other = project.registry_mut().allocate_class_id();
        project
            .registry_mut()
            .create_class(ClassMeta::new(other, "LineItem"))
            .expect("create class");
        let mut executor = CommandExecutor::new(100);

        let drag = move_command(&project, diagram, node, 70.0, 0.0);
        executor.begin_live(&mut project, drag).expect("begin live");

        let add =
            Command::add_existing(&mut project, diagram, other, Rect::new(200.0, 0.0, 80.0, 40.0))
                .expect("construct add");
        executor.execute(&mut project, add).expect("execute");
        assert!(executor.live_command().is_none());

        // Undo order: first the add, then the committed drag.
        assert!(executor.undo(&mut project));
        assert!(project
            .diagram(diagram)
            .expect("diagram present")
            .placement_of_class(other)
            .is_none());
        assert_eq!(node_rect(&project, diagram, node), Rect::new(70.0, 0.0, 80.0, 40.0));

        assert!(executor.undo(&mut project));
        assert_eq!(node_rect(&project, diagram, node), Rect::new(0.0, 0.0, 80.0, 40.0));
    }

    #[test]
    fn test_undo_commits_pending_live() {
        let (mut project, diagram, node) = project_with_placed_class();
        let mut executor = CommandExecutor::new(100);

        let drag = move_command(&project, diagram, node, 40.0, 40.0);
        executor.begin_live(&mut project, drag).expect("begin live");
        assert!(executor.can_undo());

        assert!(executor.undo(&mut project));
        assert_eq!(node_rect(&project, diagram, node), Rect::new(0.0, 0.0, 80.0, 40.0));
        assert!(executor.live_command().is_none());
    }

    #[test]
    fn test_redo_failure_keeps_entry() {
        let (mut project, diagram, node) = project_with_placed_class();
        let mut executor = CommandExecutor::new(100);

        let command = move_command(&project, diagram, node, 15.0, 0.0);
        executor.execute(&mut project, command).expect("execute");
        assert!(executor.undo(&mut project));

        // The diagram disappears through a direct operation; redo now has
        // nothing to apply to.
        project.delete_diagram(diagram);
        let err = executor.redo(&mut project).expect_err("redo fails");
        assert!(matches!(err, ArmillaryError::MissingEntity { .. }));
        assert!(executor.can_redo());
    }

    #[test]
    fn test_clear_drops_everything() {
        let (mut project, diagram, node) = project_with_placed_class();
        let mut executor = CommandExecutor::new(100);

        let command = move_command(&project, diagram, node, 15.0, 0.0);
        executor.execute(&mut project, command).expect("execute");
        let drag = move_command(&project, diagram, node, 25.0, 0.0);
        executor.begin_live(&mut project, drag).expect("begin live");

        executor.clear();
        assert!(!executor.can_undo());
        assert!(!executor.can_redo());
        assert!(executor.live_command().is_none());
    }
}
