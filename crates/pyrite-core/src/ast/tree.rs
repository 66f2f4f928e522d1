//! The node arena
//!
//! Nodes live in a `Tree` and refer to each other by `NodeId`. A parent owns
//! its children through its slots; the child's `parent` link is a plain
//! handle back. The tree only changes shape through `new_node`,
//! `replace_with`, `replace_root`, `detach` and `finalize`, which keep both
//! directions consistent.

use super::kind::{Arity, Capabilities, NodeKind, SlotSpec};
use super::node::{Node, NodeId, Payload, SlotValue};
use super::variable::{Variable, VariableId, VariableKind};
use crate::error::{CoreError, Result};
use crate::source::SourceRef;
use crate::types::{Constant, ExceptionKind, PythonVersion};
use log::trace;
use std::collections::HashSet;

/// Arena holding every node and variable of one compilation unit tree
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Option<Node>>,
    variables: Vec<Variable>,
    root: Option<NodeId>,
}

fn arity_text(arity: Arity) -> &'static str {
    match arity {
        Arity::Required => "a node",
        Arity::Optional => "a node or nothing",
        Arity::Sequence => "a sequence",
    }
}

fn check_slots(kind: NodeKind, specs: &[SlotSpec], slots: &[SlotValue]) -> Result<()> {
    if specs.len() != slots.len() {
        return Err(CoreError::SlotCount {
            kind,
            expected: specs.len(),
            actual: slots.len(),
        });
    }

    for (spec, value) in specs.iter().zip(slots) {
        let fits = matches!(
            (spec.arity, value),
            (Arity::Required, SlotValue::One(Some(_)))
                | (Arity::Optional, SlotValue::One(_))
                | (Arity::Sequence, SlotValue::Many(_))
        );
        if !fits {
            return Err(CoreError::SchemaMismatch {
                kind,
                slot: spec.name,
                expected: arity_text(spec.arity),
                actual: value.describe(),
            });
        }
    }
    Ok(())
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a node owning `slots`. Every child must be live and detached.
    pub fn new_node(
        &mut self,
        kind: NodeKind,
        source_ref: SourceRef,
        payload: Payload,
        slots: Vec<SlotValue>,
    ) -> Result<NodeId> {
        check_slots(kind, kind.slots(), &slots)?;

        if !payload.fits(kind) {
            return Err(CoreError::InvalidPayload {
                kind,
                message: format!("expected {} payload", Payload::expected_tag(kind)),
            });
        }
        if let Payload::Variable(variable) = payload {
            self.variable(variable)?;
        }

        let mut children = Vec::new();
        for child in slots.iter().flat_map(|slot| slot.ids().iter().copied()) {
            self.ensure_detached(child)?;
            if children.contains(&child) {
                return Err(CoreError::AlreadyAttached { node: child });
            }
            children.push(child);
        }

        let id = NodeId(self.nodes.len() as u32);
        for child in children {
            self.node_mut(child)?.parent = Some(id);
        }
        self.nodes.push(Some(Node {
            kind,
            parent: None,
            slots,
            source_ref,
            payload,
            capability_override: None,
        }));
        Ok(id)
    }

    /// Install `id` as root, returning the previous root if any.
    pub fn set_root(&mut self, id: NodeId) -> Result<Option<NodeId>> {
        self.ensure_detached(id)?;
        Ok(self.root.replace(id))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(CoreError::StaleNode { node: id })
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(CoreError::StaleNode { node: id })
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Has a parent or is the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.root == Some(id) || self.get(id).and_then(Node::parent).is_some()
    }

    /// Connected to the root through parent links
    pub fn is_reachable(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            match self.get(current) {
                Some(node) => match node.parent {
                    Some(parent) => current = parent,
                    None => return self.root == Some(current),
                },
                None => return false,
            }
        }
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind> {
        Ok(self.node(id)?.kind)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn source_ref(&self, id: NodeId) -> Result<&SourceRef> {
        Ok(&self.node(id)?.source_ref)
    }

    pub fn payload(&self, id: NodeId) -> Result<&Payload> {
        Ok(&self.node(id)?.payload)
    }

    /// All children in slot order
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.node(id)?.children().collect())
    }

    /// Content of a single-node slot
    pub fn child(&self, id: NodeId, slot: &str) -> Result<Option<NodeId>> {
        let node = self.node(id)?;
        let index = Self::slot_position(node.kind, slot)?;
        match &node.slots[index] {
            SlotValue::One(child) => Ok(*child),
            SlotValue::Many(_) => Err(CoreError::SchemaMismatch {
                kind: node.kind,
                slot: node.kind.slots()[index].name,
                expected: "a node or nothing",
                actual: "a sequence",
            }),
        }
    }

    /// Content of any slot as a list
    pub fn children_in(&self, id: NodeId, slot: &str) -> Result<&[NodeId]> {
        let node = self.node(id)?;
        let index = Self::slot_position(node.kind, slot)?;
        Ok(node.slots[index].ids())
    }

    fn slot_position(kind: NodeKind, slot: &str) -> Result<usize> {
        kind.slot_index(slot).ok_or_else(|| CoreError::UnknownSlot {
            kind,
            slot: slot.to_string(),
        })
    }

    /// Constant value of a `ConstantRef`
    pub fn constant(&self, id: NodeId) -> Option<&Constant> {
        match self.get(id).map(Node::payload) {
            Some(Payload::Constant(value)) => Some(value),
            _ => None,
        }
    }

    /// Variable referenced or assigned by the node
    pub fn variable_of(&self, id: NodeId) -> Option<VariableId> {
        match self.get(id).map(Node::payload) {
            Some(Payload::Variable(variable)) => Some(*variable),
            _ => None,
        }
    }

    /// Pre-order walk below and including `start`, children in slot order
    pub fn walk(&self, start: NodeId) -> Result<Vec<NodeId>> {
        let mut order = Vec::new();
        let mut pending = vec![start];
        while let Some(current) = pending.pop() {
            let node = self.node(current)?;
            order.push(current);
            let children: Vec<NodeId> = node.children().collect();
            pending.extend(children.into_iter().rev());
        }
        Ok(order)
    }

    /// Number of live nodes, attached or not
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_some()).count()
    }

    // ------------------------------------------------------------------
    // Replacement protocol
    // ------------------------------------------------------------------

    fn ensure_detached(&self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if node.parent.is_some() || self.root == Some(id) {
            return Err(CoreError::AlreadyAttached { node: id });
        }
        Ok(())
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = self.get(of).and_then(Node::parent);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.get(id).and_then(Node::parent);
        }
        false
    }

    /// Put `new` into the parent slot holding `old`; `old` ends up detached.
    ///
    /// The root has no slot to replace in and must go through
    /// [`Tree::replace_root`].
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let parent = self
            .node(old)?
            .parent
            .ok_or(CoreError::DetachedReplacement { node: old })?;
        self.ensure_detached(new)?;
        if self.is_ancestor(new, old) {
            return Err(CoreError::AlreadyAttached { node: new });
        }

        let mut found = false;
        for slot in self.node_mut(parent)?.slots.iter_mut() {
            match slot {
                SlotValue::One(child) if *child == Some(old) => {
                    *child = Some(new);
                    found = true;
                }
                SlotValue::Many(children) => {
                    if let Some(position) = children.iter().position(|child| *child == old) {
                        children[position] = new;
                        found = true;
                    }
                }
                _ => {}
            }
            if found {
                break;
            }
        }
        if !found {
            return Err(CoreError::CorruptedParent { parent, child: old });
        }

        self.node_mut(new)?.parent = Some(parent);
        self.node_mut(old)?.parent = None;

        trace!(
            "replaced {} {:?} with {} {:?} under {}",
            old,
            self.kind(old)?,
            new,
            self.kind(new)?,
            parent
        );
        Ok(())
    }

    /// Swap the root, returning the detached previous one.
    pub fn replace_root(&mut self, new: NodeId) -> Result<NodeId> {
        let old = self.root.ok_or(CoreError::MissingRoot)?;
        self.ensure_detached(new)?;
        self.root = Some(new);
        trace!("replaced root {} with {}", old, new);
        Ok(old)
    }

    /// Remove `id` from its parent's slot. A no-op for detached nodes.
    pub fn detach(&mut self, id: NodeId) -> Result<NodeId> {
        let Some(parent) = self.node(id)?.parent else {
            if self.root == Some(id) {
                self.root = None;
            }
            return Ok(id);
        };

        let mut found = false;
        for slot in self.node_mut(parent)?.slots.iter_mut() {
            match slot {
                SlotValue::One(child) if *child == Some(id) => {
                    *child = None;
                    found = true;
                }
                SlotValue::Many(children) => {
                    let before = children.len();
                    children.retain(|child| *child != id);
                    found = children.len() != before;
                }
                _ => {}
            }
            if found {
                break;
            }
        }
        if !found {
            return Err(CoreError::CorruptedParent { parent, child: id });
        }

        self.node_mut(id)?.parent = None;
        Ok(id)
    }

    /// Put a detached node into an empty single-node slot, or append it to a
    /// sequence slot.
    pub fn attach(&mut self, parent: NodeId, slot: &str, child: NodeId) -> Result<()> {
        self.ensure_detached(child)?;
        if child == parent || self.is_ancestor(child, parent) {
            return Err(CoreError::AlreadyAttached { node: child });
        }

        let kind = self.kind(parent)?;
        let index = Self::slot_position(kind, slot)?;
        match &mut self.node_mut(parent)?.slots[index] {
            SlotValue::One(Some(existing)) => {
                return Err(CoreError::AlreadyAttached { node: *existing });
            }
            SlotValue::One(empty) => *empty = Some(child),
            SlotValue::Many(children) => children.push(child),
        }
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Attach the statements of a scope created by [`Tree::make_scope`]
    pub fn set_body(&mut self, scope: NodeId, body: NodeId) -> Result<()> {
        self.attach(scope, "body", body)
    }

    /// Detach and return the content of a single-node slot
    pub fn detach_slot(&mut self, id: NodeId, slot: &str) -> Result<Option<NodeId>> {
        let child = self.child(id, slot)?;
        if let Some(child) = child {
            self.detach(child)?;
        }
        Ok(child)
    }

    /// Tear down a detached node and its whole subtree. Its handles become
    /// stale.
    pub fn finalize(&mut self, id: NodeId) -> Result<()> {
        if self.is_attached(id) {
            return Err(CoreError::StillAttached { node: id });
        }
        self.node(id)?;

        let mut count = 0;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(current.index()).and_then(Option::take) {
                pending.extend(node.children());
                count += 1;
            }
        }
        trace!("finalized {} ({} nodes)", id, count);
        Ok(())
    }

    /// Check parent links, schema and single ownership of everything
    /// reachable from the root.
    pub fn validate(&self) -> Result<()> {
        let root = self.root.ok_or(CoreError::MissingRoot)?;
        if let Some(parent) = self.node(root)?.parent {
            return Err(CoreError::CorruptedParent {
                parent,
                child: root,
            });
        }

        let mut seen = HashSet::new();
        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                return Err(CoreError::MultipleParents { node: current });
            }
            let node = self.node(current)?;
            check_slots(node.kind, node.kind.slots(), &node.slots)?;
            for child in node.children() {
                if self.node(child)?.parent != Some(current) {
                    return Err(CoreError::CorruptedParent {
                        parent: current,
                        child,
                    });
                }
                pending.push(child);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Capabilities
    // ------------------------------------------------------------------

    pub fn capabilities(&self, id: NodeId) -> Result<Capabilities> {
        Ok(self.node(id)?.capabilities())
    }

    /// Narrow (or widen) what this one node is known to do
    pub fn set_capability_override(&mut self, id: NodeId, capabilities: Capabilities) -> Result<()> {
        self.node_mut(id)?.capability_override = Some(capabilities);
        Ok(())
    }

    /// Whether evaluating the node or any operand may have side effects.
    /// Function bodies are not evaluated where they are defined.
    pub fn may_have_side_effects(&self, id: NodeId) -> Result<bool> {
        self.any_in_expression(id, &|node| node.capabilities().contains(Capabilities::SIDE_EFFECTS))
    }

    /// Whether evaluating the node or any operand may raise at all
    pub fn may_raise(&self, id: NodeId) -> Result<bool> {
        self.any_in_expression(id, &|node| node.capabilities().contains(Capabilities::MAY_RAISE))
    }

    /// Whether evaluating the node may raise something `except kind:` catches
    pub fn may_raise_exception(
        &self,
        id: NodeId,
        kind: ExceptionKind,
        version: PythonVersion,
    ) -> Result<bool> {
        self.any_in_expression(id, &|node| match &node.payload {
            Payload::Raise(raised) => raised.kind.is_subclass_of(kind, version),
            _ => node.capabilities().contains(Capabilities::MAY_RAISE),
        })
    }

    pub fn always_raises(&self, id: NodeId) -> Result<bool> {
        Ok(self.capabilities(id)?.contains(Capabilities::ALWAYS_RAISES))
    }

    fn any_in_expression(&self, id: NodeId, test: &dyn Fn(&Node) -> bool) -> Result<bool> {
        let node = self.node(id)?;
        if test(node) {
            return Ok(true);
        }
        if node.kind == NodeKind::FunctionBody || node.kind == NodeKind::Module {
            return Ok(false);
        }
        for child in node.children() {
            if self.any_in_expression(child, test)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ------------------------------------------------------------------
    // Scopes and variables
    // ------------------------------------------------------------------

    /// Closest enclosing scope node, excluding `id` itself
    pub fn provider_of(&self, id: NodeId) -> Result<Option<NodeId>> {
        let mut current = self.node(id)?.parent;
        while let Some(candidate) = current {
            let node = self.node(candidate)?;
            if node.kind.is_scope() {
                return Ok(Some(candidate));
            }
            current = node.parent;
        }
        Ok(None)
    }

    pub fn declare_variable(
        &mut self,
        owner: NodeId,
        name: impl Into<String>,
        kind: VariableKind,
    ) -> Result<VariableId> {
        self.node(owner)?;
        let id = VariableId(self.variables.len() as u32);
        self.variables.push(Variable {
            name: name.into(),
            owner,
            kind,
            read_only: false,
            usage_count: 0,
        });
        Ok(id)
    }

    pub fn variable(&self, id: VariableId) -> Result<&Variable> {
        self.variables
            .get(id.index())
            .ok_or(CoreError::UnknownVariable { variable: id })
    }

    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(index, variable)| (VariableId(index as u32), variable))
    }

    pub fn find_variable(&self, owner: NodeId, name: &str) -> Option<VariableId> {
        self.variables()
            .find(|(_, variable)| variable.owner == owner && variable.name == name)
            .map(|(id, _)| id)
    }

    pub fn set_read_only(&mut self, id: VariableId, read_only: bool) -> Result<()> {
        let variable = self
            .variables
            .get_mut(id.index())
            .ok_or(CoreError::UnknownVariable { variable: id })?;
        variable.read_only = read_only;
        Ok(())
    }

    /// Recount the references to a variable that are still reachable.
    pub fn reconsider_variable(&mut self, id: VariableId) -> Result<usize> {
        self.variable(id)?;
        let count = match self.root {
            Some(root) => self
                .walk(root)?
                .into_iter()
                .filter(|node| {
                    self.get(*node).is_some_and(|node| {
                        node.kind == NodeKind::VariableRef && node.payload == Payload::Variable(id)
                    })
                })
                .count(),
            None => 0,
        };

        if let Some(variable) = self.variables.get_mut(id.index()) {
            if variable.usage_count != count {
                trace!(
                    "variable '{}' usage changed {} -> {}",
                    variable.name,
                    variable.usage_count,
                    count
                );
            }
            variable.usage_count = count;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sref() -> SourceRef {
        SourceRef::new("test.py", 1, 0)
    }

    fn constant(tree: &mut Tree, value: i64) -> NodeId {
        tree.new_node(
            NodeKind::ConstantRef,
            sref(),
            Payload::Constant(Constant::Int(value)),
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_new_node_checks_schema() {
        let mut tree = Tree::new();
        let result = tree.new_node(NodeKind::BuiltinLen, sref(), Payload::None, vec![SlotValue::One(None)]);
        assert!(matches!(result, Err(CoreError::SchemaMismatch { slot: "value", .. })));

        let result = tree.new_node(NodeKind::BuiltinLen, sref(), Payload::None, vec![]);
        assert!(matches!(result, Err(CoreError::SlotCount { expected: 1, actual: 0, .. })));
    }

    #[test]
    fn test_new_node_checks_payload() {
        let mut tree = Tree::new();
        let result = tree.new_node(NodeKind::ConstantRef, sref(), Payload::None, vec![]);
        assert!(matches!(result, Err(CoreError::InvalidPayload { .. })));
    }

    #[test]
    fn test_child_cannot_have_two_parents() {
        let mut tree = Tree::new();
        let value = constant(&mut tree, 1);
        tree.new_node(NodeKind::BuiltinLen, sref(), Payload::None, vec![value.into()])
            .unwrap();

        let again = tree.new_node(NodeKind::BuiltinLen, sref(), Payload::None, vec![value.into()]);
        assert_eq!(again, Err(CoreError::AlreadyAttached { node: value }));
    }

    #[test]
    fn test_detach_sequence_entry() {
        let mut tree = Tree::new();
        let a = constant(&mut tree, 1);
        let b = constant(&mut tree, 2);
        let call_target = constant(&mut tree, 0);
        let call = tree
            .new_node(
                NodeKind::FunctionCall,
                sref(),
                Payload::None,
                vec![
                    SlotValue::One(Some(call_target)),
                    SlotValue::Many(vec![a, b]),
                    SlotValue::Many(vec![]),
                    SlotValue::One(None),
                    SlotValue::One(None),
                ],
            )
            .unwrap();

        tree.detach(a).unwrap();
        assert_eq!(tree.children_in(call, "positional_args").unwrap(), &[b]);
        assert_eq!(tree.parent(a).unwrap(), None);
    }

    #[test]
    fn test_may_raise_exception_respects_hierarchy() {
        let mut tree = Tree::new();
        let raise = tree
            .new_node(
                NodeKind::RaiseException,
                sref(),
                Payload::Raise(crate::ast::RaisedException::new(ExceptionKind::KeyError, "k")),
                vec![],
            )
            .unwrap();

        let py3 = PythonVersion::Python3;
        assert!(tree.may_raise_exception(raise, ExceptionKind::LookupError, py3).unwrap());
        assert!(!tree.may_raise_exception(raise, ExceptionKind::TypeError, py3).unwrap());
        assert!(tree
            .may_raise_exception(raise, ExceptionKind::StandardError, PythonVersion::Python2)
            .unwrap());

        let value = constant(&mut tree, 3);
        assert!(!tree.may_raise(value).unwrap());
        assert!(!tree.may_have_side_effects(value).unwrap());
    }

    #[test]
    fn test_capability_override_is_per_instance() {
        let mut tree = Tree::new();
        let first = constant(&mut tree, 1);
        let second = constant(&mut tree, 2);
        let a = tree.new_node(NodeKind::BuiltinLen, sref(), Payload::None, vec![first.into()]).unwrap();
        let b = tree.new_node(NodeKind::BuiltinLen, sref(), Payload::None, vec![second.into()]).unwrap();

        tree.set_capability_override(a, Capabilities::EXPRESSION | Capabilities::BUILTIN)
            .unwrap();

        assert!(!tree.may_raise(a).unwrap());
        assert!(tree.may_raise(b).unwrap());
    }
}
