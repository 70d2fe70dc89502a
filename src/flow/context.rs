//! Enclosing jump targets of a program point.
//!
//! Frames are pushed on entry to a body, loop, switch, labeled statement or
//! `try` and popped on exit. A jump walks the stack from the innermost
//! frame; a `try` with a `finally` block holds the jump as a
//! [`PendingExit`] until the `finally` block has been analysed.

use super::info::{FlowInfo, VarSet, VarId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Break,
    Continue,
    Return,
}

/// A jump held back by a `finally` block.
#[derive(Debug, Clone)]
pub struct PendingExit {
    pub jump_kind: JumpKind,
    pub target_label: Option<String>,
    pub info: FlowInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// Method, constructor, initializer or lambda body.
    Body,
    Loop { labels: Vec<String> },
    Switch,
    Labeled { label: String },
    Try { has_finally: bool },
    /// Barrier of a silent loop pre-pass; jumps leaving the loop stop here.
    Speculative,
}

#[derive(Debug)]
pub struct Frame {
    pub kind: FrameKind,
    pub breaks: Option<FlowInfo>,
    pub continues: Option<FlowInfo>,
    pub returns: Option<FlowInfo>,
    /// Variables assigned anywhere inside a `try` block.
    pub assigned_inside: VarSet,
    pub pending: Vec<PendingExit>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            breaks: None,
            continues: None,
            returns: None,
            assigned_inside: VarSet::default(),
            pending: Vec::new(),
        }
    }

    fn accepts(&self, kind: JumpKind, label: Option<&str>) -> bool {
        match (&self.kind, kind, label) {
            (FrameKind::Body, JumpKind::Return, _) => true,
            (FrameKind::Loop { .. }, JumpKind::Break | JumpKind::Continue, None) => true,
            (FrameKind::Switch, JumpKind::Break, None) => true,
            (FrameKind::Loop { labels }, JumpKind::Break | JumpKind::Continue, Some(label)) => {
                labels.iter().any(|l| l == label)
            }
            (FrameKind::Labeled { label: own }, JumpKind::Break, Some(label)) => own == label,
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct FlowContext {
    frames: Vec<Frame>,
}

impl FlowContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: FrameKind) {
        self.frames.push(Frame::new(kind));
    }

    /// Pops the innermost frame.
    pub fn pop(&mut self) -> Frame {
        self.frames.pop().unwrap_or_else(|| Frame::new(FrameKind::Body))
    }

    /// Record an assignment in every enclosing `try` of the current body.
    pub fn note_assignment(&mut self, var: VarId) {
        for frame in self.frames.iter_mut().rev() {
            match frame.kind {
                FrameKind::Body => break,
                FrameKind::Try { .. } => frame.assigned_inside.insert(var),
                _ => {}
            }
        }
    }

    /// Route a jump leaving with `info` to its target frame.
    pub fn jump(&mut self, kind: JumpKind, label: Option<&str>, info: &FlowInfo) {
        if info.is_unreachable() {
            return;
        }
        for frame in self.frames.iter_mut().rev() {
            if frame.accepts(kind, label) {
                let slot = match kind {
                    JumpKind::Break => &mut frame.breaks,
                    JumpKind::Continue => &mut frame.continues,
                    JumpKind::Return => &mut frame.returns,
                };
                FlowInfo::join_into(slot, info);
                return;
            }
            match frame.kind {
                FrameKind::Try { has_finally: true } => {
                    frame.pending.push(PendingExit {
                        jump_kind: kind,
                        target_label: label.map(str::to_string),
                        info: info.clone(),
                    });
                    return;
                }
                FrameKind::Body => {
                    log::trace!("{:?} {:?} has no target", kind, label);
                    return;
                }
                FrameKind::Speculative => return,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_break_skips_inner_loop() {
        let mut context = FlowContext::new();
        context.push(FrameKind::Body);
        context.push(FrameKind::Labeled { label: "outer".into() });
        context.push(FrameKind::Loop { labels: vec![] });
        context.jump(JumpKind::Break, Some("outer"), &FlowInfo::reachable());
        let inner = context.pop();
        let labeled = context.pop();
        assert!(inner.breaks.is_none());
        assert!(labeled.breaks.is_some());
    }

    #[test]
    fn finally_holds_jumps() {
        let mut context = FlowContext::new();
        context.push(FrameKind::Body);
        context.push(FrameKind::Try { has_finally: true });
        context.note_assignment(4);
        context.jump(JumpKind::Return, None, &FlowInfo::reachable());
        let try_frame = context.pop();
        assert_eq!(try_frame.pending.len(), 1);
        assert!(try_frame.assigned_inside.contains(4));
        assert!(context.pop().returns.is_none());
    }

    #[test]
    fn speculative_pass_keeps_outer_frames_clean() {
        let mut context = FlowContext::new();
        context.push(FrameKind::Body);
        context.push(FrameKind::Speculative);
        context.push(FrameKind::Loop { labels: vec![] });
        context.jump(JumpKind::Continue, None, &FlowInfo::reachable());
        context.jump(JumpKind::Return, None, &FlowInfo::reachable());
        assert!(context.pop().continues.is_some());
        context.pop();
        assert!(context.pop().returns.is_none());
    }

    #[test]
    fn unreachable_jumps_are_dropped() {
        let mut context = FlowContext::new();
        context.push(FrameKind::Body);
        context.jump(JumpKind::Return, None, &FlowInfo::unreachable());
        assert!(context.pop().returns.is_none());
    }
}
