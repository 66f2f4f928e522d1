//! Shorthand constructors for common node shapes

use super::kind::NodeKind;
use super::node::{NodeId, Payload, RaisedException, SlotValue};
use super::tree::Tree;
use super::variable::VariableId;
use crate::error::Result;
use crate::source::SourceRef;
use crate::types::{Constant, ExceptionKind};

impl Tree {
    pub fn make_constant(&mut self, value: Constant, source_ref: SourceRef) -> Result<NodeId> {
        self.new_node(NodeKind::ConstantRef, source_ref, Payload::Constant(value), vec![])
    }

    pub fn make_variable_ref(&mut self, variable: VariableId, source_ref: SourceRef) -> Result<NodeId> {
        self.new_node(NodeKind::VariableRef, source_ref, Payload::Variable(variable), vec![])
    }

    pub fn make_builtin_ref(&mut self, name: &str, source_ref: SourceRef) -> Result<NodeId> {
        self.new_node(NodeKind::BuiltinRef, source_ref, Payload::Name(name.to_string()), vec![])
    }

    pub fn make_exception_ref(&mut self, kind: ExceptionKind, source_ref: SourceRef) -> Result<NodeId> {
        self.new_node(NodeKind::BuiltinExceptionRef, source_ref, Payload::Exception(kind), vec![])
    }

    pub fn make_raise(&mut self, raised: RaisedException, source_ref: SourceRef) -> Result<NodeId> {
        self.new_node(NodeKind::RaiseException, source_ref, Payload::Raise(raised), vec![])
    }

    pub fn make_side_effects(
        &mut self,
        side_effects: Vec<NodeId>,
        expression: NodeId,
        source_ref: SourceRef,
    ) -> Result<NodeId> {
        self.new_node(
            NodeKind::SideEffects,
            source_ref,
            Payload::None,
            vec![SlotValue::Many(side_effects), expression.into()],
        )
    }

    /// A builtin operation node without payload
    pub fn make_builtin(
        &mut self,
        kind: NodeKind,
        slots: Vec<SlotValue>,
        source_ref: SourceRef,
    ) -> Result<NodeId> {
        self.new_node(kind, source_ref, Payload::None, slots)
    }

    /// Plain call `called(*args, **pairs)` without star arguments
    pub fn make_call(
        &mut self,
        called: NodeId,
        args: Vec<NodeId>,
        pairs: Vec<NodeId>,
        source_ref: SourceRef,
    ) -> Result<NodeId> {
        self.new_node(
            NodeKind::FunctionCall,
            source_ref,
            Payload::None,
            vec![
                called.into(),
                SlotValue::Many(args),
                SlotValue::Many(pairs),
                SlotValue::One(None),
                SlotValue::One(None),
            ],
        )
    }

    /// Keyword argument or dict entry; `key` is usually a string constant
    pub fn make_key_value(&mut self, key: NodeId, value: NodeId, source_ref: SourceRef) -> Result<NodeId> {
        self.new_node(
            NodeKind::KeyValuePair,
            source_ref,
            Payload::None,
            vec![key.into(), value.into()],
        )
    }

    pub fn make_attribute_lookup(
        &mut self,
        expression: NodeId,
        attribute: &str,
        source_ref: SourceRef,
    ) -> Result<NodeId> {
        self.new_node(
            NodeKind::AttributeLookup,
            source_ref,
            Payload::Name(attribute.to_string()),
            vec![expression.into()],
        )
    }

    pub fn make_statements(&mut self, statements: Vec<NodeId>, source_ref: SourceRef) -> Result<NodeId> {
        self.new_node(
            NodeKind::StatementsSequence,
            source_ref,
            Payload::None,
            vec![SlotValue::Many(statements)],
        )
    }

    pub fn make_expression_statement(&mut self, expression: NodeId, source_ref: SourceRef) -> Result<NodeId> {
        self.new_node(
            NodeKind::StatementExpressionOnly,
            source_ref,
            Payload::None,
            vec![expression.into()],
        )
    }

    pub fn make_assignment(
        &mut self,
        variable: VariableId,
        source: NodeId,
        source_ref: SourceRef,
    ) -> Result<NodeId> {
        self.new_node(
            NodeKind::StatementAssignmentVariable,
            source_ref,
            Payload::Variable(variable),
            vec![source.into()],
        )
    }

    pub fn make_release(&mut self, variable: VariableId, source_ref: SourceRef) -> Result<NodeId> {
        self.new_node(
            NodeKind::StatementReleaseVariable,
            source_ref,
            Payload::Variable(variable),
            vec![],
        )
    }

    /// Module, function or class body; the body is attached later with
    /// [`Tree::set_body`] once the scope's variables exist.
    pub fn make_scope(&mut self, kind: NodeKind, name: &str, source_ref: SourceRef) -> Result<NodeId> {
        self.new_node(
            kind,
            source_ref,
            Payload::Scope {
                name: name.to_string(),
            },
            vec![SlotValue::One(None)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_call_fills_empty_slots() {
        let mut tree = Tree::new();
        let sref = SourceRef::new("m.py", 1, 0);
        let called = tree.make_builtin_ref("len", sref.clone()).unwrap();
        let arg = tree.make_constant(Constant::str("abc"), sref.clone()).unwrap();
        let call = tree.make_call(called, vec![arg], vec![], sref).unwrap();

        assert_eq!(tree.child(call, "called").unwrap(), Some(called));
        assert_eq!(tree.children_in(call, "positional_args").unwrap(), &[arg]);
        assert!(tree.children_in(call, "pairs").unwrap().is_empty());
        assert_eq!(tree.child(call, "list_star_arg").unwrap(), None);
    }
}
