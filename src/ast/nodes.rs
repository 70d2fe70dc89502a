use crate::consts::PRIMITIVE_TYPES;
use crate::parser::span::{HasSpan, Span};

/// One parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub package_decl: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub module_decl: Option<ModuleDecl>,
    pub type_decls: Vec<TypeDecl>,
    pub span: Span,
}

impl CompilationUnit {
    pub fn package_name(&self) -> &str {
        self.package_decl.as_ref().map(|p| p.name.as_str()).unwrap_or("")
    }
}

/// A dotted name together with where it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import p.X;`
    Single,
    /// `import p.*;`
    OnDemand,
    /// `import static p.X.m;`
    StaticSingle,
    /// `import static p.X.*;`
    StaticOnDemand,
    /// `import module m;`
    Module,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub kind: ImportKind,
    /// Imported name without the trailing `.*`.
    pub name: String,
    pub name_span: Span,
    pub span: Span,
}

impl ImportDecl {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// `p` for `p.X`.
    pub fn qualifier(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    pub annotations: Vec<Annotation>,
    pub is_open: bool,
    pub name: String,
    pub name_span: Span,
    pub directives: Vec<ModuleDirective>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleDirective {
    Requires {
        module: QualifiedName,
        transitive: bool,
        is_static: bool,
        span: Span,
    },
    Exports {
        package: QualifiedName,
        targets: Vec<QualifiedName>,
        span: Span,
    },
    Opens {
        package: QualifiedName,
        targets: Vec<QualifiedName>,
        span: Span,
    },
    Uses {
        service: QualifiedName,
        span: Span,
    },
    Provides {
        service: QualifiedName,
        implementations: Vec<QualifiedName>,
        span: Span,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub name: String,
    pub name_span: Span,
    pub type_params: Vec<TypeParam>,
    /// Superclass for classes, superinterfaces for interfaces.
    pub extends: Vec<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub enum_constants: Vec<EnumConstant>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

impl TypeDecl {
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Field(field) => Some(field),
            _ => None,
        })
    }

    pub fn member_types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Type(ty) => Some(ty),
            _ => None,
        })
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods().filter(|m| m.is_constructor())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub bounds: Vec<TypeRef>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    Default,
}

/// Keyword modifiers plus the declaration annotations written among them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Modifiers {
    pub flags: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
}

impl Modifiers {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.flags.contains(&modifier)
    }

    pub fn is_final(&self) -> bool {
        self.has(Modifier::Final)
    }

    pub fn is_static(&self) -> bool {
        self.has(Modifier::Static)
    }

    pub fn is_abstract(&self) -> bool {
        self.has(Modifier::Abstract)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    /// Raw text between the parentheses, if any.
    pub arguments: Option<String>,
    pub span: Span,
}

impl Annotation {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Wildcard {
    Unbounded,
    Extends(Box<TypeRef>),
    Super(Box<TypeRef>),
}

/// A written type: `java.util.List<@Nullable String>[]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    /// Name as written, `?` for wildcards.
    pub name: String,
    pub type_args: Vec<TypeRef>,
    pub dims: usize,
    /// Type-use annotations written directly before the type.
    pub annotations: Vec<Annotation>,
    pub wildcard: Option<Wildcard>,
    /// Covers the name, type arguments and dimensions, not leading annotations.
    pub span: Span,
}

impl TypeRef {
    pub fn simple(name: &str, span: Span) -> Self {
        Self {
            name: name.to_string(),
            type_args: Vec::new(),
            dims: 0,
            annotations: Vec::new(),
            wildcard: None,
            span,
        }
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_primitive(&self) -> bool {
        self.dims == 0 && PRIMITIVE_TYPES.contains(self.name.as_str())
    }

    pub fn is_void(&self) -> bool {
        self.dims == 0 && self.name == "void"
    }

    pub fn is_var(&self) -> bool {
        self.dims == 0 && self.name == "var" && self.type_args.is_empty()
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard.is_some()
    }

    /// Display form used in messages: simple names, type arguments without annotations.
    pub fn display(&self) -> String {
        let mut out = match &self.wildcard {
            Some(Wildcard::Unbounded) => "?".to_string(),
            Some(Wildcard::Extends(bound)) => format!("? extends {}", bound.display()),
            Some(Wildcard::Super(bound)) => format!("? super {}", bound.display()),
            None => self.simple_name().to_string(),
        };
        if !self.type_args.is_empty() {
            let args: Vec<String> = self.type_args.iter().map(|a| a.display()).collect();
            out.push('<');
            out.push_str(&args.join(","));
            out.push('>');
        }
        for _ in 0..self.dims {
            out.push_str("[]");
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Field(FieldDecl),
    Method(MethodDecl),
    Initializer(InitializerBlock),
    Type(TypeDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub type_ref: TypeRef,
    pub declarators: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    pub name: String,
    pub name_span: Span,
    pub extra_dims: usize,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParam>,
    /// `None` for constructors.
    pub return_type: Option<TypeRef>,
    pub name: String,
    pub name_span: Span,
    /// From the name through the closing parenthesis of the parameter list.
    pub signature_span: Span,
    pub parameters: Vec<Parameter>,
    pub throws: Vec<TypeRef>,
    pub body: Option<Block>,
    pub span: Span,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    /// `this(...)` as the first statement of a constructor body.
    pub fn delegates_to_this(&self) -> bool {
        self.body
            .as_ref()
            .and_then(|b| b.statements.first())
            .map(|s| matches!(s, Stmt::ExplicitCtorCall(call) if !call.is_super))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub modifiers: Modifiers,
    pub type_ref: TypeRef,
    pub name: String,
    pub name_span: Span,
    pub varargs: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitializerBlock {
    pub is_static: bool,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstant {
    pub name: String,
    pub name_span: Span,
    pub arguments: Vec<Expr>,
    pub body: Option<Vec<ClassMember>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(Block),
    VarDecl(VarDeclStmt),
    LocalType(TypeDecl),
    Expr(ExprStmt),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    For(ForStmt),
    ForEach(ForEachStmt),
    Switch(SwitchStmt),
    Return(ReturnStmt),
    Break(JumpStmt),
    Continue(JumpStmt),
    Throw(ThrowStmt),
    Try(TryStmt),
    Labeled(LabeledStmt),
    Synchronized(SynchronizedStmt),
    Assert(AssertStmt),
    ExplicitCtorCall(ExplicitCtorInvocation),
    Empty(Span),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt {
    pub modifiers: Modifiers,
    pub type_ref: TypeRef,
    pub declarators: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    pub body: Box<Stmt>,
    pub condition: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Vec<Stmt>,
    pub condition: Option<Expr>,
    pub update: Vec<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStmt {
    pub variable: Parameter,
    pub iterable: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub selector: Expr,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Empty for `default:`.
    pub labels: Vec<Expr>,
    pub is_default: bool,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// `break` or `continue`.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpStmt {
    pub label: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub resources: Vec<TryResource>,
    pub try_block: Block,
    pub catch_clauses: Vec<CatchClause>,
    pub finally_block: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TryResource {
    Declaration(VarDeclStmt),
    Expression(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub parameter: Parameter,
    /// Alternatives of a multi-catch, the first one is `parameter.type_ref`.
    pub alternatives: Vec<TypeRef>,
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStmt {
    pub label: String,
    pub statement: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynchronizedStmt {
    pub lock: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertStmt {
    pub condition: Expr,
    pub message: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitCtorInvocation {
    pub is_super: bool,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Identifier(IdentifierExpr),
    FieldAccess(FieldAccessExpr),
    MethodCall(MethodCallExpr),
    New(NewExpr),
    NewArray(NewArrayExpr),
    ArrayInit(ArrayInitExpr),
    ArrayAccess(ArrayAccessExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Assignment(AssignmentExpr),
    Conditional(ConditionalExpr),
    Cast(CastExpr),
    InstanceOf(InstanceOfExpr),
    This(ThisExpr),
    Super(Span),
    Lambda(LambdaExpr),
    MethodRef(MethodRefExpr),
    Parens(ParensExpr),
    ClassLiteral(ClassLiteralExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(String),
    Float(String),
    Char(String),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierExpr {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccessExpr {
    pub target: Box<Expr>,
    pub name: String,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCallExpr {
    pub target: Option<Box<Expr>>,
    pub name: String,
    pub name_span: Span,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub type_ref: TypeRef,
    pub arguments: Vec<Expr>,
    /// Anonymous class body.
    pub body: Option<Vec<ClassMember>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewArrayExpr {
    pub type_ref: TypeRef,
    pub dimensions: Vec<Expr>,
    pub initializer: Option<ArrayInitExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayInitExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccessExpr {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn is_increment(&self) -> bool {
        matches!(self, UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    UShr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    UShrAssign,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpr {
    pub op: AssignmentOp,
    pub target: Box<Expr>,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpr {
    pub condition: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub target_type: TypeRef,
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceOfExpr {
    pub expr: Box<Expr>,
    pub target_type: TypeRef,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThisExpr {
    /// `Outer.this`
    pub qualifier: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaParam {
    pub modifiers: Modifiers,
    /// Absent for implicitly typed parameters.
    pub type_ref: Option<TypeRef>,
    pub name: String,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub params: Vec<LambdaParam>,
    pub body: LambdaBody,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodRefExpr {
    pub target: Box<Expr>,
    /// Method name, `new` for constructor references.
    pub name: String,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParensExpr {
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassLiteralExpr {
    pub type_ref: TypeRef,
    pub span: Span,
}

impl Expr {
    /// Strips any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Parens(inner) = expr {
            expr = &inner.expr;
        }
        expr
    }

    /// Dotted text of a name chain such as `java.util.List`.
    pub fn as_qualified_name(&self) -> Option<String> {
        match self {
            Expr::Identifier(id) => Some(id.name.clone()),
            Expr::FieldAccess(access) => access
                .target
                .as_qualified_name()
                .map(|q| format!("{}.{}", q, access.name)),
            _ => None,
        }
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self.unparenthesized(), Expr::Literal(LiteralExpr { value: Literal::Null, .. }))
    }
}

impl HasSpan for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Identifier(e) => e.span,
            Expr::FieldAccess(e) => e.span,
            Expr::MethodCall(e) => e.span,
            Expr::New(e) => e.span,
            Expr::NewArray(e) => e.span,
            Expr::ArrayInit(e) => e.span,
            Expr::ArrayAccess(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Assignment(e) => e.span,
            Expr::Conditional(e) => e.span,
            Expr::Cast(e) => e.span,
            Expr::InstanceOf(e) => e.span,
            Expr::This(e) => e.span,
            Expr::Super(span) => *span,
            Expr::Lambda(e) => e.span,
            Expr::MethodRef(e) => e.span,
            Expr::Parens(e) => e.span,
            Expr::ClassLiteral(e) => e.span,
        }
    }
}

impl HasSpan for Stmt {
    fn span(&self) -> Span {
        match self {
            Stmt::Block(s) => s.span,
            Stmt::VarDecl(s) => s.span,
            Stmt::LocalType(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::ForEach(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Break(s) | Stmt::Continue(s) => s.span,
            Stmt::Throw(s) => s.span,
            Stmt::Try(s) => s.span,
            Stmt::Labeled(s) => s.span,
            Stmt::Synchronized(s) => s.span,
            Stmt::Assert(s) => s.span,
            Stmt::ExplicitCtorCall(s) => s.span,
            Stmt::Empty(span) => *span,
        }
    }
}

impl HasSpan for TypeRef {
    fn span(&self) -> Span {
        self.span
    }
}
