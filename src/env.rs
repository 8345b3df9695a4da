//! The symbol table of a loaded package.
//!
//! This struct basically acts as a faux-database for the analysis, divided
//! into an `objects` table and a few indices over it: the package scope
//! (name to object), the definition index (identifier occurrence to object)
//! and the per-file import scopes.

use std::collections::HashMap;

use crate::{
    constant::ConstValue,
    span::{Position, Span},
    symbol::Symbol,
    ty::Ty,
};

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct FileId(usize);

impl FileId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct ObjectId(usize);

/// Identifies the defining occurrence of an identifier: the file it is in
/// and the byte offset at which it starts.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct DefId {
    pub file: FileId,
    pub start: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub file: FileId,
    pub span: Span,
    pub position: Position,
}

impl Location {
    pub fn def_id(&self) -> DefId {
        DefId {
            file: self.file,
            start: self.span.start,
        }
    }
}

/// The semantic object an identifier resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// A constant with its (possibly untyped) type and compile-time value.
    Const { ty: Ty, value: ConstValue },
    /// A declared type; `ty` is the right-hand side of the declaration.
    TypeName { ty: Ty, is_alias: bool },
    Var,
    Func,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: Symbol,
    pub kind: ObjectKind,
    pub location: Location,
}

/// An entry in the import scope of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: Box<str>,
    pub location: Location,
}

#[derive(Debug, Default)]
pub struct Env {
    objects: Vec<Object>,
    defs: HashMap<DefId, ObjectId>,
    scope: HashMap<Symbol, ObjectId>,
    imports: HashMap<FileId, HashMap<Symbol, Import>>,
}

impl Env {
    pub fn object(&self, id: ObjectId) -> &Object {
        self.objects
            .get(id.0)
            .expect("Object IDs are valid by construction")
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> + use<'_> {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, object)| (ObjectId(index), object))
    }

    /// Returns the object defined by the identifier occurrence `def`.
    pub fn def(&self, def: DefId) -> Option<&Object> {
        self.defs.get(&def).map(|&id| self.object(id))
    }

    /// Looks `name` up in the package scope.
    pub fn lookup(&self, name: Symbol) -> Option<(ObjectId, &Object)> {
        self.scope.get(&name).map(|&id| (id, self.object(id)))
    }

    pub fn import(&self, file: FileId, name: Symbol) -> Option<&Import> {
        self.imports.get(&file)?.get(&name)
    }

    /// Resolves `ty` to its underlying type by following local type
    /// declarations. A chain ending in an imported type yields that
    /// [`Ty::Foreign`], since its underlying type is not known. Returns
    /// `None` if the chain reaches an undeclared name or a cycle.
    pub fn underlying(&self, ty: Ty) -> Option<Ty> {
        let mut current = ty;

        for _ in 0..=self.objects.len() {
            let Ty::Named(name) = current else {
                return Some(current);
            };

            match self.lookup(name)?.1.kind {
                ObjectKind::TypeName { ty, .. } => current = ty,
                _ => return None,
            }
        }

        None
    }

    /// Follows alias declarations until `ty` is no longer an alias.
    pub fn dealias(&self, ty: Ty) -> Ty {
        let mut current = ty;

        for _ in 0..=self.objects.len() {
            let Ty::Named(name) = current else {
                break;
            };

            match self.lookup(name).map(|(_, object)| &object.kind) {
                Some(&ObjectKind::TypeName { ty, is_alias: true }) => current = ty,
                _ => break,
            }
        }

        current
    }

    pub(crate) fn insert(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.defs.insert(object.location.def_id(), id);
        self.objects.push(object);
        id
    }

    /// Binds `id` in the package scope, returning the previous binding of
    /// the same name if there was one.
    pub(crate) fn bind(&mut self, name: Symbol, id: ObjectId) -> Option<ObjectId> {
        match self.scope.get(&name) {
            Some(&previous) => Some(previous),
            None => {
                self.scope.insert(name, id);
                None
            }
        }
    }

    /// Records an import, returning the earlier import of the same name in
    /// the same file if there was one.
    pub(crate) fn add_import(
        &mut self,
        file: FileId,
        name: Symbol,
        import: Import,
    ) -> Option<&Import> {
        let scope = self.imports.entry(file).or_default();
        match scope.contains_key(&name) {
            true => scope.get(&name),
            false => {
                scope.insert(name, import);
                None
            }
        }
    }

    pub(crate) fn set_kind(&mut self, id: ObjectId, kind: ObjectKind) {
        if let Some(object) = self.objects.get_mut(id.0) {
            object.kind = kind;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{symbol::StringInterner, ty::BasicKind};

    fn location(start: u32) -> Location {
        Location {
            file: FileId::new(0),
            span: Span {
                start,
                end: start + 1,
            },
            position: Position { line: 1, column: 1 },
        }
    }

    #[test]
    fn underlying_follows_local_declarations() {
        let mut interner = StringInterner::new();
        let (a, b, c) = (
            interner.intern("A"),
            interner.intern("B"),
            interner.intern("C"),
        );
        let mut env = Env::default();

        for (offset, name, ty) in [
            (0, a, Ty::Named(b)),
            (10, b, Ty::Basic(BasicKind::Uint8)),
            (20, c, Ty::Named(c)),
        ] {
            let id = env.insert(Object {
                name,
                kind: ObjectKind::TypeName {
                    ty,
                    is_alias: false,
                },
                location: location(offset),
            });
            assert_eq!(env.bind(name, id), None);
        }

        assert_eq!(
            env.underlying(Ty::Named(a)),
            Some(Ty::Basic(BasicKind::Uint8))
        );
        assert_eq!(env.underlying(Ty::Named(c)), None);
        assert!(env.def(location(10).def_id()).is_some());
    }

    #[test]
    fn rebinding_reports_the_first_object() {
        let mut interner = StringInterner::new();
        let name = interner.intern("X");
        let mut env = Env::default();

        let first = env.insert(Object {
            name,
            kind: ObjectKind::Var,
            location: location(0),
        });
        let second = env.insert(Object {
            name,
            kind: ObjectKind::Func,
            location: location(5),
        });

        assert_eq!(env.bind(name, first), None);
        assert_eq!(env.bind(name, second), Some(first));
        assert_eq!(env.lookup(name).map(|(id, _)| id), Some(first));
    }
}
