//! Type-checking of the top-level declarations in a package.
//!
//! The checker walks every file of a package three times. The first pass
//! collects each top-level declaration into the package scope (and each
//! import into its file's import scope), the second resolves the right-hand
//! side of every type declaration, and the third evaluates every constant in
//! dependency order.
//!
//! Imported packages are never loaded. A value qualified by an import name
//! has an unknown value and an unknown type, and a type qualified by an
//! import name is a [`Ty::Foreign`] whose underlying type is unknown.

use std::collections::HashMap;

use log::{debug, trace};
use petgraph::{algo::toposort, graph::DiGraph};
use thiserror::Error;
use tree_sitter::Node;

use crate::{
    constant::{BinaryOp, ConstKind, ConstOpError, ConstValue, UnaryOp},
    cst::{Cst, descendants_of_kind, field_children, named_children},
    env::{Env, FileId, Import, Location, Object, ObjectId, ObjectKind},
    literal::{
        LiteralError, parse_float_literal, parse_imaginary_literal,
        parse_int_literal, parse_raw_string_literal, parse_rune_literal,
        parse_string_literal,
    },
    span::Position,
    symbol::StringInterner,
    ty::{BasicKind, Ty},
};

/// The import name under which a dot-import is recorded.
const DOT_IMPORT: &str = ".";

const BLANK: &str = "_";

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{file}:{position}: {kind}")]
pub struct CheckError {
    pub file: Box<str>,
    pub position: Position,
    pub kind: CheckErrorKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckErrorKind {
    #[error("{0} redeclared in this block")]
    Redeclared(Box<str>),
    #[error("undefined: {0}")]
    Undefined(Box<str>),
    #[error("{0} is not a type")]
    NotAType(Box<str>),
    #[error("{0} (type) is not an expression")]
    NotAnExpression(Box<str>),
    #[error("{0} is not constant")]
    NotConstant(Box<str>),
    #[error("cannot use _ as value")]
    Blank,
    #[error("missing init expr for const declaration")]
    MissingInit,
    #[error("extra init expr")]
    ExtraInit,
    #[error("wrong number of arguments in {0}")]
    ArgumentCount(Box<str>),
    #[error("invalid argument {value} ({ty}) for built-in {builtin}")]
    InvalidArgument {
        value: Box<str>,
        ty: Box<str>,
        builtin: &'static str,
    },
    #[error("invalid constant type {0}")]
    InvalidConstType(Box<str>),
    #[error("invalid recursive type {0}")]
    InvalidRecursiveType(Box<str>),
    #[error("cannot use {value} (constant of type {from}) as {to} value")]
    CannotUse {
        value: Box<str>,
        from: Box<str>,
        to: Box<str>,
    },
    #[error("cannot use {value} as {ty} value (overflows)")]
    Overflows { value: Box<str>, ty: Box<str> },
    #[error("{value} (untyped constant) truncated to {ty}")]
    Truncated { value: Box<str>, ty: Box<str> },
    #[error("cannot convert {value} to type {ty}")]
    CannotConvert { value: Box<str>, ty: Box<str> },
    #[error("invalid operation: mismatched types {lhs} and {rhs}")]
    MismatchedTypes { lhs: Box<str>, rhs: Box<str> },
    #[error("initialization cycle involving {0}")]
    InitializationCycle(Box<str>),
    #[error("{0}")]
    Operation(#[from] ConstOpError),
    #[error("{0}")]
    Literal(#[from] LiteralError),
}

/// Checks the top-level declarations of `files`, which must all belong to
/// the same package, and returns the resulting symbol table. Every error
/// found is returned, not just the first.
pub fn check(
    files: &[Cst],
    interner: &mut StringInterner,
) -> Result<Env, Vec<CheckError>> {
    let mut checker = Checker {
        files,
        interner,
        env: Env::default(),
        types: HashMap::new(),
        errors: Vec::new(),
    };

    let (types, consts) = checker.collect();
    debug!(
        "collected {} type and {} constant declarations from {} files",
        types.len(),
        consts.len(),
        files.len()
    );

    checker.resolve_type_declarations(types);
    checker.evaluate_constants(consts);

    match checker.errors.is_empty() {
        true => Ok(checker.env),
        false => Err(checker.errors),
    }
}

/// The result of evaluating a constant expression.
#[derive(Debug, Clone, PartialEq)]
struct Operand {
    ty: Ty,
    value: ConstValue,
}

impl Operand {
    fn untyped(kind: BasicKind, value: ConstValue) -> Self {
        Self {
            ty: Ty::Basic(kind),
            value,
        }
    }

    fn unknown() -> Self {
        Self {
            ty: Ty::Unknown,
            value: ConstValue::Unknown,
        }
    }
}

struct PendingType<'t> {
    object: ObjectId,
    file: FileId,
    ty: Node<'t>,
    is_alias: bool,
}

struct PendingConst<'t> {
    object: ObjectId,
    file: FileId,
    name: Node<'t>,
    /// The declared type, possibly repeated from an earlier spec.
    ty: Option<Node<'t>>,
    /// The initializer, possibly repeated from an earlier spec.
    value: Option<Node<'t>>,
    iota: i128,
}

struct Checker<'t, 'i> {
    files: &'t [Cst],
    interner: &'i mut StringInterner,
    env: Env,
    /// Resolved type expressions, keyed by file and node ID.
    types: HashMap<(FileId, usize), Option<Ty>>,
    errors: Vec<CheckError>,
}

impl<'t> Checker<'t, '_> {
    fn text(&self, file: FileId, node: Node<'t>) -> &'t str {
        let files: &'t [Cst] = self.files;
        files[file.index()].text(node)
    }

    fn location(&self, file: FileId, node: Node<'t>) -> Location {
        Location {
            file,
            span: node.byte_range().into(),
            position: node.start_position().into(),
        }
    }

    fn located(
        &self,
        file: FileId,
        node: Node<'t>,
        kind: CheckErrorKind,
    ) -> CheckError {
        self.located_at(self.location(file, node), kind)
    }

    fn located_at(&self, location: Location, kind: CheckErrorKind) -> CheckError {
        CheckError {
            file: self.files[location.file.index()]
                .file()
                .name()
                .to_string()
                .into(),
            position: location.position,
            kind,
        }
    }

    fn literal<T>(
        &self,
        file: FileId,
        node: Node<'t>,
        result: Result<T, LiteralError>,
    ) -> Result<T, CheckError> {
        result.map_err(|error| self.located(file, node, error.into()))
    }

    fn push(&mut self, error: CheckError) {
        // repeated specs can report the same error more than once
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    fn error(&mut self, file: FileId, node: Node<'t>, kind: CheckErrorKind) {
        let error = self.located(file, node, kind);
        self.push(error);
    }

    fn describe(&self, ty: Ty) -> Box<str> {
        let resolve = |symbol| self.interner.resolve(symbol).unwrap_or("?");

        match ty {
            Ty::Basic(kind) => kind.name().into(),
            Ty::Named(name) => resolve(name).into(),
            Ty::Foreign { package, name } => {
                format!("{}.{}", resolve(package), resolve(name)).into()
            }
            Ty::Struct => "struct type".into(),
            Ty::Interface => "interface type".into(),
            Ty::Pointer => "pointer type".into(),
            Ty::Composite => "composite type".into(),
            Ty::Generic => "generic type".into(),
            Ty::Unknown => "unknown type".into(),
        }
    }

    fn has_dot_import(&self, file: FileId) -> bool {
        self.interner
            .get(DOT_IMPORT)
            .and_then(|symbol| self.env.import(file, symbol))
            .is_some()
    }

    fn is_import(&self, file: FileId, name: &str) -> bool {
        self.interner
            .get(name)
            .and_then(|symbol| self.env.import(file, symbol))
            .is_some()
    }

    fn lookup_kind(&self, name: &str) -> Option<ObjectKind> {
        let symbol = self.interner.get(name)?;
        self.env.lookup(symbol).map(|(_, object)| object.kind.clone())
    }

    // COLLECTION

    fn collect(&mut self) -> (Vec<PendingType<'t>>, Vec<PendingConst<'t>>) {
        let files: &'t [Cst] = self.files;
        let mut types = Vec::new();
        let mut consts = Vec::new();

        for (index, cst) in files.iter().enumerate() {
            let file = FileId::new(index);

            for decl in cst.top_level() {
                match decl.kind() {
                    "import_declaration" => self.collect_imports(file, decl),
                    "const_declaration" => {
                        self.collect_consts(file, decl, &mut consts)
                    }
                    "var_declaration" => {
                        for spec in descendants_of_kind(decl, &["var_spec"]) {
                            for name in field_children(spec, "name") {
                                self.declare(file, name, ObjectKind::Var);
                            }
                        }
                    }
                    "type_declaration" => {
                        self.collect_types(file, decl, &mut types)
                    }
                    "function_declaration" => {
                        if let Some(name) = decl.child_by_field_name("name") {
                            // any number of `init` functions may be declared
                            match self.text(file, name) {
                                "init" => {
                                    let object = Object {
                                        name: self.interner.intern("init"),
                                        kind: ObjectKind::Func,
                                        location: self.location(file, name),
                                    };
                                    self.env.insert(object);
                                }
                                _ => {
                                    self.declare(file, name, ObjectKind::Func);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        (types, consts)
    }

    /// Adds an object for the identifier `name` and binds it in the package
    /// scope, unless it is the blank identifier.
    fn declare(
        &mut self,
        file: FileId,
        name: Node<'t>,
        kind: ObjectKind,
    ) -> ObjectId {
        let text = self.text(file, name);
        let symbol = self.interner.intern(text);
        let location = self.location(file, name);
        let id = self.env.insert(Object {
            name: symbol,
            kind,
            location,
        });

        if text != BLANK && self.env.bind(symbol, id).is_some() {
            self.error(file, name, CheckErrorKind::Redeclared(text.into()));
        }

        id
    }

    fn collect_imports(&mut self, file: FileId, decl: Node<'t>) {
        for spec in descendants_of_kind(decl, &["import_spec"]) {
            let Some(path_node) = spec.child_by_field_name("path") else {
                continue;
            };

            let path_text = self.text(file, path_node);
            let path = match path_node.kind() {
                "raw_string_literal" => parse_raw_string_literal(path_text),
                _ => parse_string_literal(path_text),
            };

            let path = match path {
                Ok(path) => path,
                Err(error) => {
                    self.error(file, path_node, error.into());
                    continue;
                }
            };

            let name = match spec.child_by_field_name("name") {
                Some(node) if node.kind() == "package_identifier" => {
                    self.text(file, node)
                }
                Some(node) if node.kind() == "dot" => DOT_IMPORT,
                Some(_) => continue,
                None => default_import_name(&path),
            };

            let symbol = self.interner.intern(name);
            let import = Import {
                path: path.as_str().into(),
                location: self.location(file, spec),
            };

            trace!("import {name:?} -> {path:?}");
            if self.env.add_import(file, symbol, import).is_some() {
                self.error(file, spec, CheckErrorKind::Redeclared(name.into()));
            }
        }
    }

    fn collect_consts(
        &mut self,
        file: FileId,
        decl: Node<'t>,
        pending: &mut Vec<PendingConst<'t>>,
    ) {
        let mut previous: Option<(Option<Node<'t>>, Vec<Node<'t>>)> = None;
        let specs = named_children(decl)
            .into_iter()
            .filter(|node| node.kind() == "const_spec");

        for (iota, spec) in specs.enumerate() {
            let ty = spec.child_by_field_name("type");
            let values = spec
                .child_by_field_name("value")
                .map(named_children)
                .unwrap_or_default();

            // a spec without values repeats the type and values of the
            // previous spec in the same block
            let (ty, values) = if !values.is_empty() {
                previous = Some((ty, values.clone()));
                (ty, values)
            } else if let (None, Some((ty, values))) = (ty, &previous) {
                (*ty, values.clone())
            } else {
                self.error(file, spec, CheckErrorKind::MissingInit);
                (ty, Vec::new())
            };

            let names = field_children(spec, "name");
            if let Some(&extra) = values.get(names.len()) {
                self.error(file, extra, CheckErrorKind::ExtraInit);
            }

            for (index, name) in names.into_iter().enumerate() {
                let value = values.get(index).copied();
                if value.is_none() && !values.is_empty() {
                    self.error(file, name, CheckErrorKind::MissingInit);
                }

                let object = self.declare(file, name, ObjectKind::Const {
                    ty: Ty::Unknown,
                    value: ConstValue::Unknown,
                });

                pending.push(PendingConst {
                    object,
                    file,
                    name,
                    ty,
                    value,
                    iota: iota as i128,
                });
            }
        }
    }

    fn collect_types(
        &mut self,
        file: FileId,
        decl: Node<'t>,
        pending: &mut Vec<PendingType<'t>>,
    ) {
        for spec in descendants_of_kind(decl, &["type_spec", "type_alias"]) {
            let (Some(name), Some(ty)) = (
                spec.child_by_field_name("name"),
                spec.child_by_field_name("type"),
            ) else {
                continue;
            };

            let is_alias = spec.kind() == "type_alias";
            let object = self.declare(file, name, ObjectKind::TypeName {
                ty: Ty::Unknown,
                is_alias,
            });

            pending.push(PendingType {
                object,
                file,
                ty,
                is_alias,
            });
        }
    }

    // TYPES

    fn resolve_type_declarations(&mut self, pending: Vec<PendingType<'t>>) {
        for PendingType {
            object,
            file,
            ty,
            is_alias,
        } in pending
        {
            if let Some(ty) = self.resolve_type(file, ty) {
                self.env.set_kind(object, ObjectKind::TypeName { ty, is_alias });
            }
        }

        let recursive = self
            .env
            .objects()
            .filter(|(_, object)| {
                matches!(object.kind, ObjectKind::TypeName { .. })
                    && self.interner.resolve(object.name) != Some(BLANK)
                    && self.env.underlying(Ty::Named(object.name)).is_none()
            })
            .map(|(_, object)| object.clone())
            .collect::<Vec<_>>();

        for object in recursive {
            let name = self.interner.resolve(object.name).unwrap_or_default();
            let error = self.located_at(
                object.location,
                CheckErrorKind::InvalidRecursiveType(name.into()),
            );
            self.push(error);
        }
    }

    /// Resolves a type expression. Errors are reported once per node, and
    /// yield `None`.
    fn resolve_type(&mut self, file: FileId, node: Node<'t>) -> Option<Ty> {
        if let Some(&ty) = self.types.get(&(file, node.id())) {
            return ty;
        }

        let ty = match node.kind() {
            "type_identifier" => self.resolve_type_name(file, node),
            "qualified_type" => self.resolve_qualified_type(file, node),
            "parenthesized_type" => named_children(node)
                .first()
                .and_then(|&inner| self.resolve_type(file, inner)),
            "struct_type" => Some(Ty::Struct),
            "interface_type" => Some(Ty::Interface),
            "pointer_type" => Some(Ty::Pointer),
            "generic_type" => Some(Ty::Generic),
            _ => Some(Ty::Composite),
        };

        self.types.insert((file, node.id()), ty);
        ty
    }

    fn resolve_type_name(&mut self, file: FileId, node: Node<'t>) -> Option<Ty> {
        let text = self.text(file, node);

        // local declarations shadow the predeclared types
        match self.lookup_kind(text) {
            Some(ObjectKind::TypeName { .. }) => {
                Some(Ty::Named(self.interner.intern(text)))
            }
            Some(_) => {
                self.error(file, node, CheckErrorKind::NotAType(text.into()));
                None
            }
            None => match BasicKind::from_name(text) {
                Some(kind) => Some(Ty::Basic(kind)),
                None if matches!(text, "any" | "error" | "comparable") => {
                    Some(Ty::Interface)
                }
                None if self.has_dot_import(file) => Some(Ty::Unknown),
                None => {
                    self.error(file, node, CheckErrorKind::Undefined(text.into()));
                    None
                }
            },
        }
    }

    fn resolve_qualified_type(
        &mut self,
        file: FileId,
        node: Node<'t>,
    ) -> Option<Ty> {
        let package = node.child_by_field_name("package")?;
        let name = node.child_by_field_name("name")?;
        let package_text = self.text(file, package);

        match self.is_import(file, package_text) {
            true => Some(Ty::Foreign {
                package: self.interner.intern(package_text),
                name: self.interner.intern(self.text(file, name)),
            }),
            false => {
                self.error(
                    file,
                    package,
                    CheckErrorKind::Undefined(package_text.into()),
                );
                None
            }
        }
    }

    // CONSTANTS

    fn evaluate_constants(&mut self, pending: Vec<PendingConst<'t>>) {
        let mut graph = DiGraph::<usize, ()>::new();
        let nodes = (0..pending.len())
            .map(|index| graph.add_node(index))
            .collect::<Vec<_>>();
        let by_object = pending
            .iter()
            .zip(&nodes)
            .map(|(constant, &node)| (constant.object, node))
            .collect::<HashMap<_, _>>();

        // edges point from a constant to the constants that depend on it
        for (constant, &node) in pending.iter().zip(&nodes) {
            let references = constant
                .value
                .into_iter()
                .flat_map(|value| descendants_of_kind(value, &["identifier"]));

            for reference in references {
                let dependency = self
                    .interner
                    .get(self.text(constant.file, reference))
                    .and_then(|symbol| self.env.lookup(symbol))
                    .and_then(|(id, _)| by_object.get(&id));

                if let Some(&dependency) = dependency {
                    graph.update_edge(dependency, node, ());
                }
            }
        }

        let order = match toposort(&graph, None) {
            Ok(order) => order,
            Err(cycle) => {
                let constant = &pending[graph[cycle.node_id()]];
                let name = self.text(constant.file, constant.name);
                self.error(
                    constant.file,
                    constant.name,
                    CheckErrorKind::InitializationCycle(name.into()),
                );
                return;
            }
        };

        for node in order {
            self.evaluate_constant(&pending[graph[node]]);
        }
    }

    fn evaluate_constant(&mut self, constant: &PendingConst<'t>) {
        let file = constant.file;
        let operand = match constant.value {
            Some(value) => self.eval(file, value, constant.iota),
            // already reported as a missing initializer
            None => Ok(Operand::unknown()),
        };

        let operand = operand.and_then(|operand| {
            let Some(ty) = constant.ty else {
                return Ok(operand);
            };

            match self.resolve_type(file, ty) {
                Some(target) => {
                    let at = constant.value.unwrap_or(constant.name);
                    self.convert(file, at, operand, target, false)
                }
                None => Ok(Operand::unknown()),
            }
        });

        let operand = operand.unwrap_or_else(|error| {
            self.push(error);
            Operand::unknown()
        });

        trace!(
            "const {} {} = {}",
            self.text(file, constant.name),
            self.describe(operand.ty),
            operand.value
        );

        self.env.set_kind(constant.object, ObjectKind::Const {
            ty: operand.ty,
            value: operand.value,
        });
    }

    fn eval(
        &mut self,
        file: FileId,
        node: Node<'t>,
        iota: i128,
    ) -> Result<Operand, CheckError> {
        let text = self.text(file, node);

        match node.kind() {
            "parenthesized_expression" => match named_children(node).first() {
                Some(&inner) => self.eval(file, inner, iota),
                None => Err(self.located(
                    file,
                    node,
                    CheckErrorKind::NotConstant(text.into()),
                )),
            },
            "int_literal" => {
                let literal = self.literal(file, node, parse_int_literal(text))?;
                let value = i128::try_from(literal.value)
                    .map_or(ConstValue::Unknown, ConstValue::Int);
                Ok(Operand::untyped(BasicKind::UntypedInt, value))
            }
            "float_literal" => {
                let value = self.literal(file, node, parse_float_literal(text))?;
                Ok(Operand::untyped(
                    BasicKind::UntypedFloat,
                    ConstValue::float(value),
                ))
            }
            "imaginary_literal" => {
                let value =
                    self.literal(file, node, parse_imaginary_literal(text))?;
                Ok(Operand::untyped(
                    BasicKind::UntypedComplex,
                    ConstValue::Complex(0.0, value),
                ))
            }
            "rune_literal" => {
                let value = self.literal(file, node, parse_rune_literal(text))?;
                Ok(Operand::untyped(
                    BasicKind::UntypedRune,
                    ConstValue::Int(value.into()),
                ))
            }
            "interpreted_string_literal" | "raw_string_literal" => {
                let value = match node.kind() {
                    "raw_string_literal" => parse_raw_string_literal(text),
                    _ => parse_string_literal(text),
                };
                Ok(Operand::untyped(
                    BasicKind::UntypedString,
                    ConstValue::String(self.literal(file, node, value)?.into()),
                ))
            }
            "true" | "false" => Ok(Operand::untyped(
                BasicKind::UntypedBool,
                ConstValue::Bool(node.kind() == "true"),
            )),
            "iota" => Ok(Operand::untyped(
                BasicKind::UntypedInt,
                ConstValue::Int(iota),
            )),
            "identifier" => self.eval_identifier(file, node),
            "selector_expression" => self.eval_selector(file, node),
            "unary_expression" => self.eval_unary(file, node, iota),
            "binary_expression" => self.eval_binary(file, node, iota),
            "call_expression" => self.eval_call(file, node, iota),
            "type_conversion_expression" => {
                let (Some(ty), Some(operand)) = (
                    node.child_by_field_name("type"),
                    node.child_by_field_name("operand"),
                ) else {
                    return Err(self.located(
                        file,
                        node,
                        CheckErrorKind::NotConstant(text.into()),
                    ));
                };

                let operand = self.eval(file, operand, iota)?;
                match self.resolve_type(file, ty) {
                    Some(target) => self.convert(file, node, operand, target, true),
                    None => Ok(Operand::unknown()),
                }
            }
            _ => Err(self.located(
                file,
                node,
                CheckErrorKind::NotConstant(text.into()),
            )),
        }
    }

    fn eval_identifier(
        &mut self,
        file: FileId,
        node: Node<'t>,
    ) -> Result<Operand, CheckError> {
        let text = self.text(file, node);
        let kind = match text {
            BLANK => CheckErrorKind::Blank,
            _ => match self.lookup_kind(text) {
                Some(ObjectKind::Const { ty, value }) => {
                    return Ok(Operand { ty, value });
                }
                Some(ObjectKind::TypeName { .. }) => {
                    CheckErrorKind::NotAnExpression(text.into())
                }
                Some(_) => CheckErrorKind::NotConstant(text.into()),
                None if self.has_dot_import(file) => {
                    return Ok(Operand::unknown());
                }
                None => CheckErrorKind::Undefined(text.into()),
            },
        };

        Err(self.located(file, node, kind))
    }

    fn eval_selector(
        &mut self,
        file: FileId,
        node: Node<'t>,
    ) -> Result<Operand, CheckError> {
        let text = self.text(file, node);

        if let Some(operand) = node.child_by_field_name("operand") {
            let qualifier = self.text(file, operand);

            if operand.kind() == "identifier" && self.is_import(file, qualifier) {
                trace!("{text} is imported, its value is unknown");
                return Ok(Operand::unknown());
            }

            if operand.kind() == "identifier"
                && self.lookup_kind(qualifier).is_none()
            {
                return Err(self.located(
                    file,
                    operand,
                    CheckErrorKind::Undefined(qualifier.into()),
                ));
            }
        }

        Err(self.located(file, node, CheckErrorKind::NotConstant(text.into())))
    }

    fn eval_unary(
        &mut self,
        file: FileId,
        node: Node<'t>,
        iota: i128,
    ) -> Result<Operand, CheckError> {
        let text = self.text(file, node);
        let op = node
            .child_by_field_name("operator")
            .and_then(|operator| UnaryOp::from_token(self.text(file, operator)));

        let (Some(op), Some(operand)) = (op, node.child_by_field_name("operand"))
        else {
            return Err(self.located(
                file,
                node,
                CheckErrorKind::NotConstant(text.into()),
            ));
        };

        let operand = self.eval(file, operand, iota)?;
        let mut value = operand
            .value
            .unary(op)
            .map_err(|error| self.located(file, node, error.into()))?;

        // the complement of an unsigned value flips only the bits of its type
        let mask = match (op, self.env.underlying(operand.ty)) {
            (UnaryOp::Complement, Some(Ty::Basic(kind))) => kind
                .integer_bounds()
                .filter(|&(min, _)| min == 0)
                .map(|(_, max)| max),
            _ => None,
        };

        if let (Some(mask), ConstValue::Int(bits)) = (mask, &mut value) {
            *bits &= mask;
        }

        self.typed_result(file, node, operand.ty, value)
    }

    fn eval_binary(
        &mut self,
        file: FileId,
        node: Node<'t>,
        iota: i128,
    ) -> Result<Operand, CheckError> {
        let text = self.text(file, node);
        let op = node
            .child_by_field_name("operator")
            .and_then(|operator| BinaryOp::from_token(self.text(file, operator)));

        let (Some(op), Some(left), Some(right)) = (
            op,
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return Err(self.located(
                file,
                node,
                CheckErrorKind::NotConstant(text.into()),
            ));
        };

        let lhs = self.eval(file, left, iota)?;
        let rhs = self.eval(file, right, iota)?;
        let operation =
            |error: ConstOpError| self.located(file, node, error.into());

        if op.is_shift() {
            let value = lhs.value.binary(op, &rhs.value).map_err(operation)?;

            // an untyped left operand of a shift becomes an integer
            let ty = match lhs.ty {
                Ty::Basic(kind) if kind.is_untyped() && !kind.is_integer() => {
                    Ty::Basic(BasicKind::UntypedInt)
                }
                ty => ty,
            };

            return self.typed_result(file, node, ty, value);
        }

        let ty = self.unify(file, node, lhs.ty, rhs.ty)?;
        let (lhs, rhs) = (
            self.coerce(file, left, lhs, ty)?,
            self.coerce(file, right, rhs, ty)?,
        );
        let value = lhs.binary(op, &rhs).map_err(operation)?;

        match op.is_comparison() {
            true => Ok(Operand::untyped(BasicKind::UntypedBool, value)),
            false => self.typed_result(file, node, ty, value),
        }
    }

    fn eval_call(
        &mut self,
        file: FileId,
        node: Node<'t>,
        iota: i128,
    ) -> Result<Operand, CheckError> {
        let text = self.text(file, node);
        let not_constant =
            |this: &Self| this.located(file, node, CheckErrorKind::NotConstant(text.into()));

        let (Some(function), Some(arguments)) = (
            node.child_by_field_name("function"),
            node.child_by_field_name("arguments"),
        ) else {
            return Err(not_constant(self));
        };

        let arguments = named_children(arguments);

        match function.kind() {
            "identifier" => {
                let name = self.text(file, function);
                let target = match self.lookup_kind(name) {
                    Some(ObjectKind::TypeName { .. }) => {
                        Ty::Named(self.interner.intern(name))
                    }
                    Some(_) => return Err(not_constant(self)),
                    None => match (BasicKind::from_name(name), name) {
                        (Some(kind), _) => Ty::Basic(kind),
                        (None, "len") => {
                            return self.eval_len(file, node, &arguments, iota);
                        }
                        (None, "min") => {
                            return self.eval_extremum(file, node, BinaryOp::Lt, &arguments, iota);
                        }
                        (None, "max") => {
                            return self.eval_extremum(file, node, BinaryOp::Gt, &arguments, iota);
                        }
                        (None, "complex") => {
                            return self.eval_complex(file, node, &arguments, iota);
                        }
                        (None, "real") => {
                            return self.eval_part(file, node, "real", &arguments, iota);
                        }
                        (None, "imag") => {
                            return self.eval_part(file, node, "imag", &arguments, iota);
                        }
                        (None, _) if self.has_dot_import(file) => {
                            return Ok(Operand::unknown());
                        }
                        (None, _) => return Err(not_constant(self)),
                    },
                };

                let [argument] = arguments.as_slice() else {
                    return Err(self.located(
                        file,
                        node,
                        CheckErrorKind::ArgumentCount(
                            format!("conversion to {name}").into(),
                        ),
                    ));
                };

                let operand = self.eval(file, *argument, iota)?;
                self.convert(file, node, operand, target, true)
            }
            "selector_expression" => {
                let qualifier = function
                    .child_by_field_name("operand")
                    .filter(|operand| operand.kind() == "identifier")
                    .map(|operand| self.text(file, operand));

                match qualifier {
                    Some(qualifier) if self.is_import(file, qualifier) => {
                        trace!("{text} is imported, its value is unknown");
                        Ok(Operand::unknown())
                    }
                    _ => Err(not_constant(self)),
                }
            }
            _ => Err(not_constant(self)),
        }
    }

    fn eval_len(
        &mut self,
        file: FileId,
        node: Node<'t>,
        arguments: &[Node<'t>],
        iota: i128,
    ) -> Result<Operand, CheckError> {
        let [argument] = arguments else {
            return Err(self.located(
                file,
                node,
                CheckErrorKind::ArgumentCount("call of len".into()),
            ));
        };

        let operand = self.eval(file, *argument, iota)?;
        let value = match operand.value {
            ConstValue::String(value) => ConstValue::Int(value.len() as i128),
            ConstValue::Unknown => ConstValue::Unknown,
            _ => {
                let text = self.text(file, node);
                return Err(self.located(
                    file,
                    node,
                    CheckErrorKind::NotConstant(text.into()),
                ));
            }
        };

        Ok(Operand {
            ty: Ty::Basic(BasicKind::Int),
            value,
        })
    }

    /// `min` (`op` is `<`) or `max` (`op` is `>`) of at least one ordered
    /// constant.
    fn eval_extremum(
        &mut self,
        file: FileId,
        node: Node<'t>,
        op: BinaryOp,
        arguments: &[Node<'t>],
        iota: i128,
    ) -> Result<Operand, CheckError> {
        let Some((&first, rest)) = arguments.split_first() else {
            let builtin = match op {
                BinaryOp::Lt => "call of min",
                _ => "call of max",
            };
            return Err(self.located(
                file,
                node,
                CheckErrorKind::ArgumentCount(builtin.into()),
            ));
        };

        let mut best = self.eval(file, first, iota)?;

        for &argument in rest {
            let next = self.eval(file, argument, iota)?;
            let ty = self.unify(file, node, best.ty, next.ty)?;
            let (current, candidate) = (
                self.coerce(file, node, best, ty)?,
                self.coerce(file, argument, next, ty)?,
            );

            let wins = candidate
                .binary(op, &current)
                .map_err(|error| self.located(file, argument, error.into()))?;

            let value = match wins {
                ConstValue::Bool(true) => candidate,
                ConstValue::Bool(false) => current,
                _ => ConstValue::Unknown,
            };

            best = Operand { ty, value };
        }

        Ok(best)
    }

    /// `complex(re, im)`, whose parts are both untyped numbers or share a
    /// float type.
    fn eval_complex(
        &mut self,
        file: FileId,
        node: Node<'t>,
        arguments: &[Node<'t>],
        iota: i128,
    ) -> Result<Operand, CheckError> {
        let &[re_node, im_node] = arguments else {
            return Err(self.located(
                file,
                node,
                CheckErrorKind::ArgumentCount("call of complex".into()),
            ));
        };

        let re = self.eval(file, re_node, iota)?;
        let im = self.eval(file, im_node, iota)?;
        let ty = self.unify(file, node, re.ty, im.ty)?;

        let kind = match self.env.underlying(ty) {
            Some(Ty::Basic(BasicKind::Float32)) => BasicKind::Complex64,
            Some(Ty::Basic(BasicKind::Float64)) => BasicKind::Complex128,
            Some(Ty::Basic(kind)) if untyped_rank(kind) > 0 => {
                BasicKind::UntypedComplex
            }
            Some(Ty::Foreign { .. } | Ty::Unknown) | None => {
                return Ok(Operand::unknown());
            }
            Some(_) => {
                return Err(self.located(
                    file,
                    node,
                    CheckErrorKind::InvalidArgument {
                        value: self.text(file, re_node).into(),
                        ty: self.describe(ty),
                        builtin: "complex",
                    },
                ));
            }
        };

        let (re, im) = (
            self.coerce(file, re_node, re, ty)?,
            self.coerce(file, im_node, im, ty)?,
        );

        let part = |this: &Self, argument: Node<'t>, value: &ConstValue| match value {
            ConstValue::Unknown => Ok(None),
            value => value.to_float().map(Some).ok_or_else(|| {
                this.located(
                    file,
                    argument,
                    CheckErrorKind::Truncated {
                        value: value.to_string().into(),
                        ty: "float".into(),
                    },
                )
            }),
        };

        let value = match (part(self, re_node, &re)?, part(self, im_node, &im)?) {
            (Some(re), Some(im)) => ConstValue::Complex(re, im),
            _ => ConstValue::Unknown,
        };

        Ok(Operand {
            ty: Ty::Basic(kind),
            value,
        })
    }

    /// `real(c)` or `imag(c)` of a complex or untyped numeric constant.
    fn eval_part(
        &mut self,
        file: FileId,
        node: Node<'t>,
        builtin: &'static str,
        arguments: &[Node<'t>],
        iota: i128,
    ) -> Result<Operand, CheckError> {
        let &[argument] = arguments else {
            return Err(self.located(
                file,
                node,
                CheckErrorKind::ArgumentCount(format!("call of {builtin}").into()),
            ));
        };

        let operand = self.eval(file, argument, iota)?;

        let kind = match self.env.underlying(operand.ty) {
            Some(Ty::Basic(BasicKind::Complex64)) => BasicKind::Float32,
            Some(Ty::Basic(BasicKind::Complex128)) => BasicKind::Float64,
            Some(Ty::Basic(kind)) if untyped_rank(kind) > 0 => {
                BasicKind::UntypedFloat
            }
            Some(Ty::Foreign { .. } | Ty::Unknown) | None => {
                return Ok(Operand::unknown());
            }
            Some(_) => {
                return Err(self.located(
                    file,
                    node,
                    CheckErrorKind::InvalidArgument {
                        value: self.text(file, argument).into(),
                        ty: self.describe(operand.ty),
                        builtin,
                    },
                ));
            }
        };

        let value = match (operand.value.to_complex(), builtin) {
            (Some((re, _)), "real") => ConstValue::float(re),
            (Some((_, im)), _) => ConstValue::float(im),
            (None, _) => ConstValue::Unknown,
        };

        Ok(Operand {
            ty: Ty::Basic(kind),
            value,
        })
    }

    /// Returns the type of a binary operation on operands of types `lhs` and
    /// `rhs`.
    fn unify(
        &self,
        file: FileId,
        node: Node<'t>,
        lhs: Ty,
        rhs: Ty,
    ) -> Result<Ty, CheckError> {
        match (untyped_kind(lhs), untyped_kind(rhs)) {
            _ if lhs == Ty::Unknown || rhs == Ty::Unknown => Ok(Ty::Unknown),
            (Some(lhs), Some(rhs)) => Ok(Ty::Basic(
                match untyped_rank(rhs) > untyped_rank(lhs) {
                    true => rhs,
                    false => lhs,
                },
            )),
            (Some(_), None) => Ok(rhs),
            (None, Some(_)) => Ok(lhs),
            (None, None) if self.env.dealias(lhs) == self.env.dealias(rhs) => {
                Ok(lhs)
            }
            (None, None) => Err(self.located(
                file,
                node,
                CheckErrorKind::MismatchedTypes {
                    lhs: self.describe(lhs),
                    rhs: self.describe(rhs),
                },
            )),
        }
    }

    /// Converts an untyped operand to the typed type `ty`, leaving typed
    /// operands untouched.
    fn coerce(
        &self,
        file: FileId,
        node: Node<'t>,
        operand: Operand,
        ty: Ty,
    ) -> Result<ConstValue, CheckError> {
        if untyped_kind(operand.ty).is_none() || untyped_kind(ty).is_some() {
            return Ok(operand.value);
        }

        match self.env.underlying(ty) {
            Some(Ty::Basic(kind)) => self
                .represent(operand.value, kind, ty)
                .map_err(|kind| self.located(file, node, kind)),
            _ => Ok(operand.value),
        }
    }

    /// Checks that a value of type `ty` is representable by `ty`.
    fn typed_result(
        &self,
        file: FileId,
        node: Node<'t>,
        ty: Ty,
        value: ConstValue,
    ) -> Result<Operand, CheckError> {
        let value = match self.env.underlying(ty) {
            Some(Ty::Basic(kind)) if !kind.is_untyped() => self
                .represent(value, kind, ty)
                .map_err(|kind| self.located(file, node, kind))?,
            _ => value,
        };

        Ok(Operand { ty, value })
    }

    /// Converts `operand` to the type `target`. An `explicit` conversion
    /// `T(x)` may change the type of a typed operand, and may convert an
    /// integer to a string.
    fn convert(
        &self,
        file: FileId,
        node: Node<'t>,
        operand: Operand,
        target: Ty,
        explicit: bool,
    ) -> Result<Operand, CheckError> {
        let typed = untyped_kind(operand.ty).is_none() && operand.ty != Ty::Unknown;
        if !explicit
            && typed
            && self.env.dealias(operand.ty) != self.env.dealias(target)
        {
            return Err(self.located(
                file,
                node,
                CheckErrorKind::CannotUse {
                    value: operand.value.to_string().into(),
                    from: self.describe(operand.ty),
                    to: self.describe(target),
                },
            ));
        }

        let value = match self.env.underlying(target) {
            Some(Ty::Basic(kind)) => match (operand.value, kind.is_string()) {
                (ConstValue::Int(code), true) if explicit => {
                    let character = u32::try_from(code)
                        .ok()
                        .and_then(char::from_u32)
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    ConstValue::String(character.to_string().into())
                }
                (value, _) => self
                    .represent(value, kind, target)
                    .map_err(|kind| self.located(file, node, kind))?,
            },
            Some(Ty::Foreign { .. } | Ty::Unknown) | None => operand.value,
            Some(_) => {
                let kind = match explicit {
                    true => CheckErrorKind::NotConstant(self.text(file, node).into()),
                    false => CheckErrorKind::InvalidConstType(self.describe(target)),
                };
                return Err(self.located(file, node, kind));
            }
        };

        Ok(Operand { ty: target, value })
    }

    /// Converts `value` to the representation of the basic type `kind`,
    /// checking that it fits. `ty` is only used in error messages.
    fn represent(
        &self,
        value: ConstValue,
        kind: BasicKind,
        ty: Ty,
    ) -> Result<ConstValue, CheckErrorKind> {
        let describe = |value: &ConstValue| -> (Box<str>, Box<str>) {
            (value.to_string().into(), self.describe(ty))
        };

        let numeric = value.kind() >= ConstKind::Int;

        match value {
            ConstValue::Unknown => Ok(ConstValue::Unknown),
            value if kind.is_integer() => match value.to_int() {
                Some(int) => match kind.integer_bounds() {
                    Some((min, max)) if int < min || int > max => {
                        let (value, ty) = describe(&value);
                        Err(CheckErrorKind::Overflows { value, ty })
                    }
                    _ => Ok(ConstValue::Int(int)),
                },
                None if numeric => {
                    let (value, ty) = describe(&value);
                    Err(CheckErrorKind::Truncated { value, ty })
                }
                None => {
                    let (value, ty) = describe(&value);
                    Err(CheckErrorKind::CannotConvert { value, ty })
                }
            },
            value if kind.is_float() => match value.to_float() {
                Some(float) if kind == BasicKind::Float32 => {
                    let rounded = float as f32;
                    match rounded.is_finite() || !float.is_finite() {
                        true => Ok(ConstValue::Float(rounded.into())),
                        false => {
                            let (value, ty) = describe(&value);
                            Err(CheckErrorKind::Overflows { value, ty })
                        }
                    }
                }
                Some(float) => Ok(ConstValue::Float(float)),
                None if numeric => {
                    let (value, ty) = describe(&value);
                    Err(CheckErrorKind::Truncated { value, ty })
                }
                None => {
                    let (value, ty) = describe(&value);
                    Err(CheckErrorKind::CannotConvert { value, ty })
                }
            },
            value if kind.is_complex() => match value.to_complex() {
                Some((re, im)) => Ok(ConstValue::Complex(re, im)),
                None => {
                    let (value, ty) = describe(&value);
                    Err(CheckErrorKind::CannotConvert { value, ty })
                }
            },
            ConstValue::String(value) if kind.is_string() => {
                Ok(ConstValue::String(value))
            }
            ConstValue::Bool(value) if kind.is_bool() => Ok(ConstValue::Bool(value)),
            value => {
                let (value, ty) = describe(&value);
                Err(CheckErrorKind::CannotConvert { value, ty })
            }
        }
    }
}

fn untyped_kind(ty: Ty) -> Option<BasicKind> {
    match ty {
        Ty::Basic(kind) if kind.is_untyped() => Some(kind),
        _ => None,
    }
}

/// Orders the numeric untyped kinds; the larger kind wins in a binary
/// operation on two untyped operands.
fn untyped_rank(kind: BasicKind) -> u8 {
    match kind {
        BasicKind::UntypedInt => 1,
        BasicKind::UntypedRune => 2,
        BasicKind::UntypedFloat => 3,
        BasicKind::UntypedComplex => 4,
        _ => 0,
    }
}

/// Guesses the package name of an import path from its last element,
/// skipping a trailing major version (`/v2`) and stripping a `.vN` suffix
/// and a `go-` prefix.
fn default_import_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_major_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].bytes().all(|byte| byte.is_ascii_digit());

    let last = match is_major_version {
        true => segments.next().unwrap_or(last),
        false => last,
    };

    let last = last.split('.').next().unwrap_or(last);
    last.strip_prefix("go-").unwrap_or(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cst::create_go_parser, fake_file};

    fn check_source(source: &str) -> (Result<Env, Vec<CheckError>>, StringInterner) {
        let mut parser = create_go_parser().unwrap();
        let files = vec![Cst::parse(&mut parser, fake_file!(source)).unwrap()];
        let mut interner = StringInterner::new();
        let result = check(&files, &mut interner);
        (result, interner)
    }

    fn constant(env: &Env, interner: &StringInterner, name: &str) -> (Ty, ConstValue) {
        let symbol = interner.get(name).unwrap();
        match &env.lookup(symbol).unwrap().1.kind {
            ObjectKind::Const { ty, value } => (*ty, value.clone()),
            other => panic!("{name} is not a constant: {other:?}"),
        }
    }

    fn errors(source: &str) -> Vec<CheckErrorKind> {
        let (result, _) = check_source(source);
        result
            .unwrap_err()
            .into_iter()
            .map(|error| error.kind)
            .collect()
    }

    #[test]
    fn iota_counts_specs_and_repeats_types() {
        let (env, interner) = check_source(
            "package p\n\ntype T int\n\nconst (\n\tA T = iota\n\tB\n\t_\n\tD\n)\n",
        );
        let env = env.unwrap();
        let t = Ty::Named(interner.get("T").unwrap());

        assert_eq!(constant(&env, &interner, "A"), (t, ConstValue::Int(0)));
        assert_eq!(constant(&env, &interner, "B"), (t, ConstValue::Int(1)));
        assert_eq!(constant(&env, &interner, "D"), (t, ConstValue::Int(3)));
    }

    #[test]
    fn expressions_are_evaluated() {
        let (env, interner) = check_source(
            r#"package p

const (
	Flags = 1<<3 | 1
	Half  = 7 / 2.0
	Quot  = 7 / 2
	Name  = "ab" + `c`
	Size  = len(Name)
	Next  = 'a' + 1
	Big   = Size > 2 && true
)
"#,
        );
        let env = env.unwrap();
        let untyped = |kind| Ty::Basic(kind);

        assert_eq!(
            constant(&env, &interner, "Flags"),
            (untyped(BasicKind::UntypedInt), ConstValue::Int(9))
        );
        assert_eq!(constant(&env, &interner, "Half").1, ConstValue::Float(3.5));
        assert_eq!(constant(&env, &interner, "Quot").1, ConstValue::Int(3));
        assert_eq!(
            constant(&env, &interner, "Name").1,
            ConstValue::String("abc".into())
        );
        assert_eq!(
            constant(&env, &interner, "Size"),
            (Ty::Basic(BasicKind::Int), ConstValue::Int(3))
        );
        assert_eq!(
            constant(&env, &interner, "Next"),
            (untyped(BasicKind::UntypedRune), ConstValue::Int(98))
        );
        assert_eq!(constant(&env, &interner, "Big").1, ConstValue::Bool(true));
    }

    #[test]
    fn constants_are_evaluated_in_dependency_order() {
        let (env, interner) =
            check_source("package p\n\nconst A = B * 2\n\nconst B = C + 1\n\nconst C = 20\n");
        let env = env.unwrap();

        assert_eq!(constant(&env, &interner, "A").1, ConstValue::Int(42));
    }

    #[test]
    fn typed_conversions() {
        let (env, interner) = check_source(
            "package p\n\ntype Level uint8\n\nconst (\n\tMax = ^Level(0)\n\tF float64 = 3\n\tG = F / 2\n\tH int = 5.0 / 2.5\n)\n",
        );
        let env = env.unwrap();

        assert_eq!(constant(&env, &interner, "Max").1, ConstValue::Int(255));
        assert_eq!(constant(&env, &interner, "G").1, ConstValue::Float(1.5));
        assert_eq!(constant(&env, &interner, "H").1, ConstValue::Int(2));
    }

    #[test]
    fn representability_is_checked() {
        let found = errors("package p\n\nconst A uint8 = 256\n\nconst B int = 1.5\n");

        assert!(found.iter().any(|kind| matches!(kind, CheckErrorKind::Overflows { .. })));
        assert!(found.iter().any(|kind| matches!(kind, CheckErrorKind::Truncated { .. })));
    }

    #[test]
    fn imported_values_are_unknown() {
        let (env, interner) = check_source(
            "package p\n\nimport \"time\"\n\ntype Timeout time.Duration\n\nconst (\n\tShort Timeout = Timeout(time.Second)\n\tLong  = time.Minute * 2\n)\n",
        );
        let env = env.unwrap();
        let timeout = Ty::Named(interner.get("Timeout").unwrap());

        assert_eq!(
            constant(&env, &interner, "Short"),
            (timeout, ConstValue::Unknown)
        );
        assert_eq!(constant(&env, &interner, "Long").1, ConstValue::Unknown);
        assert!(matches!(env.underlying(timeout), Some(Ty::Foreign { .. })));
    }

    #[test]
    fn declaration_errors_are_collected() {
        let found = errors(
            "package p\n\nconst A = B\n\nconst B = A\n\nvar X = 1\n\nfunc X() {}\n",
        );

        assert!(found.contains(&CheckErrorKind::Redeclared("X".into())));
        assert!(
            found
                .iter()
                .any(|kind| matches!(kind, CheckErrorKind::InitializationCycle(_)))
        );
    }

    #[test]
    fn undefined_names_are_reported() {
        let found = errors("package p\n\nconst A Missing = 1\n\nconst B = nope.Value\n");

        assert!(found.contains(&CheckErrorKind::Undefined("Missing".into())));
        assert!(found.contains(&CheckErrorKind::Undefined("nope".into())));
    }

    #[test]
    fn mismatched_types_are_rejected() {
        let found = errors(
            "package p\n\ntype A int\ntype B int\n\nconst X = A(1) + B(2)\n",
        );

        assert_eq!(found, [CheckErrorKind::MismatchedTypes {
            lhs: "A".into(),
            rhs: "B".into(),
        }]);
    }

    #[test]
    fn initializer_counts_are_checked() {
        let found = errors("package p\n\nconst A, B = 1\n\nconst C = 1, 2\n");
        assert_eq!(found, [CheckErrorKind::MissingInit, CheckErrorKind::ExtraInit]);
    }

    #[test]
    fn ordering_builtins_are_evaluated() {
        let (env, interner) = check_source(
            r#"package p

type Level int

const (
	Low  = min(3, 1, 2)
	High = max(1, 2.5)
	Top  Level = max(Level(4), 9)
	Word = min("b", "a")
)
"#,
        );
        let env = env.unwrap();
        let level = Ty::Named(interner.get("Level").unwrap());

        assert_eq!(constant(&env, &interner, "Low").1, ConstValue::Int(1));
        assert_eq!(
            constant(&env, &interner, "High"),
            (Ty::Basic(BasicKind::UntypedFloat), ConstValue::Float(2.5))
        );
        assert_eq!(constant(&env, &interner, "Top"), (level, ConstValue::Int(9)));
        assert_eq!(
            constant(&env, &interner, "Word").1,
            ConstValue::String("a".into())
        );
    }

    #[test]
    fn complex_builtins_are_evaluated() {
        let (env, interner) = check_source(
            r#"package p

const (
	C  = complex(1, 2)
	Re = real(C)
	Im = imag(C)
	F  = real(complex(float32(1), 0))
)
"#,
        );
        let env = env.unwrap();

        assert_eq!(
            constant(&env, &interner, "C"),
            (Ty::Basic(BasicKind::UntypedComplex), ConstValue::Complex(1.0, 2.0))
        );
        assert_eq!(constant(&env, &interner, "Re").1, ConstValue::Float(1.0));
        assert_eq!(
            constant(&env, &interner, "Im"),
            (Ty::Basic(BasicKind::UntypedFloat), ConstValue::Float(2.0))
        );
        assert_eq!(constant(&env, &interner, "F").0, Ty::Basic(BasicKind::Float32));
    }

    #[test]
    fn builtin_misuse_is_reported() {
        let found = errors("package p\n\nconst A = min()\n\nconst B = real(\"x\")\n");
        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|kind| matches!(kind, CheckErrorKind::ArgumentCount(_))));
        assert!(found.iter().any(|kind| matches!(
            kind,
            CheckErrorKind::InvalidArgument { builtin: "real", .. }
        )));
    }

    #[test]
    fn builtins_can_be_shadowed() {
        let (env, interner) =
            check_source("package p\n\ntype real float64\n\nconst A = real(2)\n");
        let real = Ty::Named(interner.get("real").unwrap());
        assert_eq!(
            constant(&env.unwrap(), &interner, "A"),
            (real, ConstValue::Float(2.0))
        );
    }

    #[test]
    fn out_of_range_intermediates_are_unknown() {
        let (env, interner) = check_source(
            r#"package p

type E int

const (
	Huge   = 1 << 130
	Digits = 200_000_000_000_000_000_000_000_000_000_000_000_000
	Shrunk = Huge >> 129
	A E    = 0.1 * 3 * 10
)
"#,
        );
        let env = env.unwrap();
        let e = Ty::Named(interner.get("E").unwrap());

        assert_eq!(constant(&env, &interner, "Huge").1, ConstValue::Unknown);
        assert_eq!(constant(&env, &interner, "Digits").1, ConstValue::Unknown);
        assert_eq!(constant(&env, &interner, "Shrunk").1, ConstValue::Unknown);
        assert_eq!(constant(&env, &interner, "A"), (e, ConstValue::Int(3)));
    }

    #[test]
    fn import_names_are_guessed_from_paths() {
        assert_eq!(default_import_name("fmt"), "fmt");
        assert_eq!(default_import_name("database/sql/driver"), "driver");
        assert_eq!(default_import_name("github.com/x/y/v2"), "y");
        assert_eq!(default_import_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(default_import_name("github.com/x/go-cmp"), "cmp");
    }
}
