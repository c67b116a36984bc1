//! Type alias symbol table for utility-type inlining

use rustc_hash::FxHashMap;

use crate::ast::{FlowType, ObjectType, Program, Statement};

/// One collected alias definition
pub struct AliasEntry<'p> {
    pub ty: &'p FlowType,
    pub opaque: bool,
}

/// Maps top-level alias names to their defining type expressions
///
/// Built in a single forward pass; a later declaration with the same name
/// overwrites an earlier one, matching shadowing by declaration order.
/// Nested scopes (declare module bodies, function bodies) are not collected,
/// so references into them stay unresolved and inlining falls back to the
/// named form.
pub struct AliasTable<'p> {
    map: FxHashMap<&'p str, AliasEntry<'p>>,
}

impl<'p> AliasTable<'p> {
    pub fn build(program: &'p Program) -> Self {
        let mut map = FxHashMap::default();
        for statement in &program.body {
            Self::collect(&mut map, statement);
        }
        AliasTable { map }
    }

    fn collect(map: &mut FxHashMap<&'p str, AliasEntry<'p>>, statement: &'p Statement) {
        match statement {
            Statement::TypeAlias(alias) => {
                map.insert(
                    alias.id.name.as_str(),
                    AliasEntry {
                        ty: &alias.right,
                        opaque: false,
                    },
                );
            }
            Statement::OpaqueTypeAlias(alias) => {
                if let Some(right) = &alias.right {
                    map.insert(
                        alias.id.name.as_str(),
                        AliasEntry {
                            ty: right,
                            opaque: true,
                        },
                    );
                }
            }
            Statement::Export(export) => {
                if let Some(declaration) = &export.declaration {
                    Self::collect(map, declaration);
                }
            }
            _ => {}
        }
    }

    pub fn get(&self, name: &str) -> Option<&AliasEntry<'p>> {
        self.map.get(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Resolve a type to an object-type definition, following alias
    /// references through the table
    ///
    /// The visited set bounds resolution on alias cycles: a name seen twice
    /// aborts with None and the caller falls back to the non-inlined path.
    pub fn resolve_object(&self, ty: &'p FlowType) -> Option<&'p ObjectType> {
        let mut visited: Vec<&str> = Vec::new();
        self.resolve_object_inner(ty, &mut visited)
    }

    fn resolve_object_inner(
        &self,
        ty: &'p FlowType,
        visited: &mut Vec<&'p str>,
    ) -> Option<&'p ObjectType> {
        match ty {
            FlowType::Object(object) => Some(object),
            FlowType::Paren(paren) => self.resolve_object_inner(&paren.inner, visited),
            FlowType::Reference(reference) if reference.type_args.is_none() => {
                let name = reference.name.single()?;
                if visited.contains(&name) {
                    return None;
                }
                visited.push(name);
                let entry = self.map.get(name)?;
                self.resolve_object_inner(entry.ty, visited)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse(source: &str) -> Program {
        Parser::new(source).parse_program().unwrap()
    }

    #[test]
    fn test_last_declaration_wins() {
        let program = parse("type T = string;\ntype T = number;");
        let table = AliasTable::build(&program);
        let entry = table.get("T").unwrap();
        assert!(matches!(entry.ty, FlowType::Number(_)));
    }

    #[test]
    fn test_collects_exported_aliases() {
        let program = parse("export type Props = { a: number };");
        let table = AliasTable::build(&program);
        assert!(table.get("Props").is_some());
    }

    #[test]
    fn test_resolves_through_chains() {
        let program = parse("type A = { x: string };\ntype B = A;\ntype C = B;");
        let table = AliasTable::build(&program);
        let entry = table.get("C").unwrap();
        assert!(table.resolve_object(entry.ty).is_some());
    }

    #[test]
    fn test_cycle_resolution_aborts() {
        let program = parse("type A = B;\ntype B = A;");
        let table = AliasTable::build(&program);
        let entry = table.get("A").unwrap();
        assert!(table.resolve_object(entry.ty).is_none());
    }
}
