// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Environment for variable and binding values.

use std::collections::HashMap;

use kettle_ast::symbol::{BindingId, Sym, SymbolTable};

use crate::value::Value;

#[derive(Debug)]
struct Slot {
    value: Value,
    /// Write order, to pick the latest of several unified bindings.
    seq: u64,
}

/// Values of one method activation, keyed by symbol.
#[derive(Debug, Default)]
struct Frame {
    slots: HashMap<Sym, Slot>,
}

/// The environment holding one frame per active call.
#[derive(Debug, Default)]
pub struct Environment {
    frames: Vec<Frame>,
    seq: u64,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
            seq: 0,
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Define or overwrite a symbol in the current frame.
    pub fn set(&mut self, sym: Sym, value: Value) {
        self.seq += 1;
        let seq = self.seq;
        if let Some(frame) = self.frames.last_mut() {
            frame.slots.insert(sym, Slot { value, seq });
        }
    }

    pub fn get(&self, sym: Sym) -> Option<&Value> {
        self.frames.last()?.slots.get(&sym).map(|s| &s.value)
    }

    /// Value of a pattern binding in an unlowered tree.
    ///
    /// A unified binding is never bound itself; its value is whichever of
    /// the occurrences it stands for matched most recently.
    pub fn get_binding(&self, symbols: &SymbolTable, binding: BindingId) -> Option<&Value> {
        let frame = self.frames.last()?;
        if let Some(slot) = frame.slots.get(&Sym::Binding(binding)) {
            return Some(&slot.value);
        }
        symbols
            .leaves(binding)
            .into_iter()
            .filter_map(|leaf| frame.slots.get(&Sym::Binding(leaf)))
            .max_by_key(|slot| slot.seq)
            .map(|slot| &slot.value)
    }
}
