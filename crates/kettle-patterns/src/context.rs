// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Binding-context stack.
//!
//! One frame is pushed per construct that can introduce pattern bindings.
//! A frame owns a storage variable for every binding it introduces that no
//! enclosing frame already provides. Frames live in an arena and refer to
//! their parent by index; `push` hands out a guard that pops the frame when
//! dropped, so the stack is restored on every exit path.

use std::ops::{Deref, DerefMut};

use kettle_ast::stmt::{Stmt, StmtKind};
use kettle_ast::symbol::{BindingId, SymbolTable, VarId};

/// Index of a frame in the stack arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u32);

/// The construct a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Base of the stack; no construct.
    Root,
    /// Binary expression (`&&`, `||`, and every other operator).
    Binary,
    /// Conditional expression.
    Conditional,
    /// `if`, `while`, `do` or `for` statement.
    Statement,
    /// Braced block.
    Block,
}

impl FrameKind {
    /// Whether this frame takes over the declaration of a binding offered by
    /// a directly nested statement frame.
    pub fn accepts_hoist(self, preserved: bool) -> bool {
        match self {
            FrameKind::Block => preserved,
            FrameKind::Root | FrameKind::Binary | FrameKind::Conditional | FrameKind::Statement => false,
        }
    }

    /// Whether this frame wraps its own construct with declarations.
    /// Blocks instead splice declarations into their statement list.
    pub fn decorates(self) -> bool {
        match self {
            FrameKind::Binary | FrameKind::Conditional | FrameKind::Statement => true,
            FrameKind::Root | FrameKind::Block => false,
        }
    }
}

/// A binding and the variable that stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub binding: BindingId,
    pub var: VarId,
}

/// Outcome of offering a declaration to the parent frame.
#[derive(Debug, PartialEq)]
pub enum Hoist {
    Accepted,
    /// The parent declined; the caller must emit the declaration itself.
    Rejected(Stmt),
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    parent: Option<FrameId>,
    slots: Vec<Slot>,
    /// Declarations accepted from children, not yet emitted.
    hoisted: Vec<Stmt>,
}

/// Stack of binding frames for one top-level declaration.
#[derive(Debug)]
pub struct BindingStack {
    frames: Vec<Frame>,
    current: FrameId,
}

impl BindingStack {
    /// A stack holding only the root frame.
    pub fn new() -> Self {
        let root = Frame {
            kind: FrameKind::Root,
            parent: None,
            slots: Vec::new(),
            hoisted: Vec::new(),
        };
        Self {
            frames: vec![root],
            current: FrameId(0),
        }
    }

    pub fn current(&self) -> FrameId {
        self.current
    }

    pub fn kind(&self) -> FrameKind {
        self.frame(self.current).kind
    }

    /// Number of frames between the current frame and the root, inclusive.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut id = Some(self.current);
        while let Some(frame) = id {
            depth += 1;
            id = self.frame(frame).parent;
        }
        depth
    }

    fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id.0 as usize]
    }

    fn frame_mut(&mut self, id: FrameId) -> &mut Frame {
        &mut self.frames[id.0 as usize]
    }

    /// Storage for `binding`, searching from the current frame to the root.
    /// Aliases of `binding` match too.
    pub fn resolve(&self, symbols: &SymbolTable, binding: BindingId) -> Option<VarId> {
        let mut id = Some(self.current);
        while let Some(frame_id) = id {
            let frame = self.frame(frame_id);
            if let Some(slot) = frame
                .slots
                .iter()
                .find(|slot| symbols.is_alias_for(slot.binding, binding))
            {
                return Some(slot.var);
            }
            id = frame.parent;
        }
        None
    }

    /// Enter a construct introducing `bindings`.
    ///
    /// A fresh storage variable is allocated for each binding that is not
    /// already resolvable and not an alias of one allocated here. Bindings
    /// missing from the symbol table are skipped; references to them fail
    /// later with `UnresolvedBinding`.
    pub fn push(&mut self, kind: FrameKind, bindings: &[BindingId], symbols: &mut SymbolTable) -> FrameGuard<'_> {
        let mut slots: Vec<Slot> = Vec::new();
        for &binding in bindings {
            if self.resolve(symbols, binding).is_some()
                || slots.iter().any(|s| symbols.is_alias_for(s.binding, binding))
            {
                continue;
            }
            let Some(sym) = symbols.binding(binding) else {
                log::warn!("binding {:?} is not in the symbol table", binding);
                continue;
            };
            let (name, ty, owner) = (sym.name.clone(), sym.ty.clone(), sym.owner.clone());
            let var = symbols.new_var(name, ty, owner);
            slots.push(Slot { binding, var });
        }

        let id = FrameId(self.frames.len() as u32);
        log::trace!("push {:?} frame {:?} owning {} slot(s)", kind, id, slots.len());
        self.frames.push(Frame {
            kind,
            parent: Some(self.current),
            slots,
            hoisted: Vec::new(),
        });
        self.current = id;
        FrameGuard { stack: self, frame: id }
    }

    fn pop(&mut self, id: FrameId) {
        debug_assert_eq!(self.current, id, "binding frames popped out of order");
        debug_assert_eq!(self.frames.len(), id.0 as usize + 1);
        if let Some(frame) = self.frames.pop() {
            log::trace!("pop {:?} frame {:?}", frame.kind, id);
            if let Some(parent) = frame.parent {
                self.current = parent;
            }
        }
    }

    /// Slots owned by the current frame, in allocation order.
    pub fn slots(&self) -> &[Slot] {
        &self.frame(self.current).slots
    }

    /// Offer the declaration of `binding` to the parent of the current frame.
    pub fn try_hoist(&mut self, symbols: &SymbolTable, binding: BindingId, decl: Stmt) -> Hoist {
        let Some(parent) = self.frame(self.current).parent else {
            return Hoist::Rejected(decl);
        };
        let preserved = symbols.binding(binding).is_some_and(|b| b.preserved);
        if !self.frame(parent).kind.accepts_hoist(preserved) {
            return Hoist::Rejected(decl);
        }
        let Some(var) = declared_var(&decl) else {
            return Hoist::Rejected(decl);
        };
        log::trace!("frame {:?} takes declaration of {:?}", parent, binding);
        let frame = self.frame_mut(parent);
        frame.slots.push(Slot { binding, var });
        frame.hoisted.push(decl);
        Hoist::Accepted
    }

    /// Drain the declarations the current frame has accepted so far.
    pub fn take_hoisted(&mut self) -> Vec<Stmt> {
        let current = self.current;
        std::mem::take(&mut self.frame_mut(current).hoisted)
    }
}

impl Default for BindingStack {
    fn default() -> Self {
        Self::new()
    }
}

fn declared_var(stmt: &Stmt) -> Option<VarId> {
    match &stmt.kind {
        StmtKind::Local { var, .. } => Some(*var),
        _ => None,
    }
}

/// A pushed frame; popping happens on drop.
///
/// Dereferences to the stack so nested constructs can push beneath it.
pub struct FrameGuard<'s> {
    stack: &'s mut BindingStack,
    frame: FrameId,
}

impl FrameGuard<'_> {
    pub fn id(&self) -> FrameId {
        self.frame
    }
}

impl Deref for FrameGuard<'_> {
    type Target = BindingStack;

    fn deref(&self) -> &BindingStack {
        self.stack
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut BindingStack {
        self.stack
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.stack.pop(self.frame);
    }
}
