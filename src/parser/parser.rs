//! Recursive-descent parser producing [`CompilationUnit`]s.
//!
//! Covers the Java subset the analyses need, module declarations and
//! `import module` included. Generic type arguments are kept on type
//! references but never interpreted.

use super::error::ParseError;
use super::lexer::{Lexer, LexicalToken, Token};
use super::span::{Location, Span};
use crate::ast::*;
use crate::consts::PARSER_MAX_GAS;

type PResult<T> = std::result::Result<T, ParseError>;

pub struct Parser {
    tokens: Vec<LexicalToken>,
    current: usize,
    gas: usize,
    eof: Location,
}

impl Parser {
    pub fn new(source: &str) -> PResult<Self> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            tokens,
            current: 0,
            gas: PARSER_MAX_GAS,
            eof: Location::start().after(source),
        })
    }

    pub fn parse(mut self) -> PResult<CompilationUnit> {
        let start = self.start();

        let saved = self.current;
        let leading = self.parse_annotations()?;
        let package_decl = if self.check(&Token::Package) {
            Some(self.parse_package_decl(leading)?)
        } else {
            self.current = saved;
            None
        };

        let mut imports = Vec::new();
        while self.check(&Token::Import) {
            imports.push(self.parse_import_decl()?);
        }

        let mut module_decl = None;
        let saved = self.current;
        let annotations = self.parse_annotations()?;
        if self.check_word("module") || (self.check_word("open") && self.nth_is_word(1, "module")) {
            module_decl = Some(self.parse_module_decl(annotations)?);
        } else {
            self.current = saved;
        }

        let mut type_decls = Vec::new();
        while !self.is_at_end() {
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            let decl_start = self.start();
            let modifiers = self.parse_modifiers(false)?;
            type_decls.push(self.parse_type_decl(decl_start, modifiers)?);
        }

        Ok(CompilationUnit {
            package_decl,
            imports,
            module_decl,
            type_decls,
            span: Span::new(start, self.eof),
        })
    }

    // Token helpers

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn peek(&self) -> Option<&LexicalToken> {
        self.tokens.get(self.current)
    }

    fn peek_token(&self) -> Option<Token> {
        self.peek().map(|t| t.token)
    }

    fn nth_token(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.current + n).map(|t| t.token)
    }

    fn check(&self, token_type: &Token) -> bool {
        self.peek().map(|t| t.token == *token_type).unwrap_or(false)
    }

    fn check_word(&self, word: &str) -> bool {
        self.nth_is_word(0, word)
    }

    fn nth_is_word(&self, n: usize, word: &str) -> bool {
        self.tokens
            .get(self.current + n)
            .map(|t| t.token == Token::Identifier && t.lexeme == word)
            .unwrap_or(false)
    }

    fn advance(&mut self) -> PResult<LexicalToken> {
        if self.gas == 0 {
            return Err(ParseError::invalid_syntax("parser step limit exceeded", self.start()));
        }
        self.gas -= 1;
        match self.tokens.get(self.current) {
            Some(token) => {
                self.current += 1;
                Ok(token.clone())
            }
            None => Err(ParseError::unexpected_end_of_input("more input", self.eof)),
        }
    }

    fn match_token(&mut self, token_type: &Token) -> bool {
        if self.check(token_type) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn consume(&mut self, token_type: &Token, expected: &str) -> PResult<LexicalToken> {
        if self.check(token_type) {
            self.advance()
        } else {
            Err(self.error_here(expected))
        }
    }

    fn consume_word(&mut self, word: &str) -> PResult<LexicalToken> {
        if self.check_word(word) {
            self.advance()
        } else {
            Err(self.error_here(&format!("'{}'", word)))
        }
    }

    fn error_here(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::unexpected_token(expected, &token.lexeme, token.location),
            None => ParseError::unexpected_end_of_input(expected, self.eof),
        }
    }

    /// Location of the next token.
    fn start(&self) -> Location {
        self.peek().map(|t| t.location).unwrap_or(self.eof)
    }

    /// End of the last consumed token.
    fn prev_end(&self) -> Location {
        if self.current == 0 {
            return Location::start();
        }
        self.tokens
            .get(self.current - 1)
            .map(|t| t.end_location())
            .unwrap_or(self.eof)
    }

    fn span_from(&self, start: Location) -> Span {
        Span::new(start, self.prev_end())
    }

    /// Consumes a `>` that may be the first half of `>>` or `>>>`.
    fn consume_closing_angle(&mut self) -> PResult<()> {
        let rest = match self.peek_token() {
            Some(Token::Gt) => {
                self.current += 1;
                return Ok(());
            }
            Some(Token::RShift) => Token::Gt,
            Some(Token::URShift) => Token::RShift,
            Some(Token::Ge) => Token::Assign,
            Some(Token::RShiftAssign) => Token::Ge,
            _ => return Err(self.error_here("'>'")),
        };
        let Some(token) = self.tokens.get_mut(self.current) else {
            return Err(ParseError::unexpected_end_of_input("'>'", self.eof));
        };
        // split the compound token, keeping the remainder in place
        token.token = rest;
        token.lexeme = token.lexeme[1..].to_string();
        token.location = Location::new(
            token.location.line,
            token.location.column + 1,
            token.location.offset + 1,
        );
        Ok(())
    }

    fn parse_identifier(&mut self) -> PResult<(String, Span)> {
        let token = self.consume(&Token::Identifier, "identifier")?;
        Ok((token.lexeme.clone(), token.span()))
    }

    fn parse_qualified_name(&mut self) -> PResult<QualifiedName> {
        let (mut name, span) = self.parse_identifier()?;
        let start = span.start;
        while self.check(&Token::Dot) && self.nth_token(1) == Some(Token::Identifier) {
            self.advance()?;
            let (part, _) = self.parse_identifier()?;
            name.push('.');
            name.push_str(&part);
        }
        Ok(QualifiedName { name, span: self.span_from(start) })
    }

    // Declarations

    fn parse_package_decl(&mut self, annotations: Vec<Annotation>) -> PResult<PackageDecl> {
        let start = annotations.first().map(|a| a.span.start).unwrap_or_else(|| self.start());
        self.consume(&Token::Package, "'package'")?;
        let name = self.parse_qualified_name()?;
        self.consume(&Token::Semicolon, "';' after package declaration")?;
        Ok(PackageDecl {
            annotations,
            name: name.name,
            name_span: name.span,
            span: self.span_from(start),
        })
    }

    fn parse_import_decl(&mut self) -> PResult<ImportDecl> {
        let start = self.start();
        self.consume(&Token::Import, "'import'")?;

        if self.check_word("module") && self.nth_token(1) == Some(Token::Identifier) {
            self.advance()?;
            let name = self.parse_qualified_name()?;
            self.consume(&Token::Semicolon, "';' after import")?;
            return Ok(ImportDecl {
                kind: ImportKind::Module,
                name: name.name,
                name_span: name.span,
                span: self.span_from(start),
            });
        }

        let is_static = self.match_token(&Token::Static);
        let name = self.parse_qualified_name()?;
        let on_demand = if self.check(&Token::Dot) && self.nth_token(1) == Some(Token::Star) {
            self.advance()?;
            self.advance()?;
            true
        } else {
            false
        };
        self.consume(&Token::Semicolon, "';' after import")?;

        let kind = match (is_static, on_demand) {
            (false, false) => ImportKind::Single,
            (false, true) => ImportKind::OnDemand,
            (true, false) => ImportKind::StaticSingle,
            (true, true) => ImportKind::StaticOnDemand,
        };
        Ok(ImportDecl {
            kind,
            name: name.name,
            name_span: name.span,
            span: self.span_from(start),
        })
    }

    fn parse_module_decl(&mut self, annotations: Vec<Annotation>) -> PResult<ModuleDecl> {
        let start = annotations.first().map(|a| a.span.start).unwrap_or_else(|| self.start());
        let is_open = if self.check_word("open") {
            self.advance()?;
            true
        } else {
            false
        };
        self.consume_word("module")?;
        let name = self.parse_qualified_name()?;
        self.consume(&Token::LBrace, "'{' to open module body")?;

        let mut directives = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            directives.push(self.parse_module_directive()?);
        }
        self.consume(&Token::RBrace, "'}' to close module body")?;

        Ok(ModuleDecl {
            annotations,
            is_open,
            name: name.name,
            name_span: name.span,
            directives,
            span: self.span_from(start),
        })
    }

    fn parse_module_directive(&mut self) -> PResult<ModuleDirective> {
        let start = self.start();
        let keyword = self.consume(&Token::Identifier, "module directive")?;
        let directive = match keyword.lexeme.as_str() {
            "requires" => {
                let mut transitive = false;
                let mut is_static = false;
                loop {
                    let next_ends_name = matches!(self.nth_token(1), Some(Token::Semicolon) | Some(Token::Dot));
                    if self.check_word("transitive") && !next_ends_name {
                        self.advance()?;
                        transitive = true;
                    } else if self.check(&Token::Static) {
                        self.advance()?;
                        is_static = true;
                    } else {
                        break;
                    }
                }
                let module = self.parse_qualified_name()?;
                self.consume(&Token::Semicolon, "';' after requires")?;
                ModuleDirective::Requires {
                    module,
                    transitive,
                    is_static,
                    span: self.span_from(start),
                }
            }
            "exports" | "opens" => {
                let package = self.parse_qualified_name()?;
                let mut targets = Vec::new();
                if self.check_word("to") {
                    self.advance()?;
                    targets.push(self.parse_qualified_name()?);
                    while self.match_token(&Token::Comma) {
                        targets.push(self.parse_qualified_name()?);
                    }
                }
                self.consume(&Token::Semicolon, "';' after exports")?;
                let span = self.span_from(start);
                if keyword.lexeme == "exports" {
                    ModuleDirective::Exports { package, targets, span }
                } else {
                    ModuleDirective::Opens { package, targets, span }
                }
            }
            "uses" => {
                let service = self.parse_qualified_name()?;
                self.consume(&Token::Semicolon, "';' after uses")?;
                ModuleDirective::Uses { service, span: self.span_from(start) }
            }
            "provides" => {
                let service = self.parse_qualified_name()?;
                self.consume_word("with")?;
                let mut implementations = vec![self.parse_qualified_name()?];
                while self.match_token(&Token::Comma) {
                    implementations.push(self.parse_qualified_name()?);
                }
                self.consume(&Token::Semicolon, "';' after provides")?;
                ModuleDirective::Provides {
                    service,
                    implementations,
                    span: self.span_from(start),
                }
            }
            other => {
                return Err(ParseError::unexpected_token(
                    "requires, exports, opens, uses or provides",
                    other,
                    keyword.location,
                ))
            }
        };
        Ok(directive)
    }

    fn parse_annotations(&mut self) -> PResult<Vec<Annotation>> {
        let mut annotations = Vec::new();
        while self.check(&Token::At) && self.nth_token(1) != Some(Token::Interface) {
            annotations.push(self.parse_annotation()?);
        }
        Ok(annotations)
    }

    fn parse_annotation(&mut self) -> PResult<Annotation> {
        let start = self.start();
        self.consume(&Token::At, "'@'")?;
        let name = self.parse_qualified_name()?;
        let mut arguments = None;
        if self.check(&Token::LParen) {
            self.advance()?;
            let mut depth = 1usize;
            let mut parts = Vec::new();
            while depth > 0 {
                let token = self.advance()?;
                match token.token {
                    Token::LParen => depth += 1,
                    Token::RParen => depth -= 1,
                    _ => {}
                }
                if depth > 0 {
                    parts.push(token.lexeme);
                }
            }
            arguments = Some(parts.join(" "));
        }
        Ok(Annotation {
            name: name.name,
            arguments,
            span: self.span_from(start),
        })
    }

    /// Keyword modifiers and annotations in any order. `default` counts as a
    /// modifier only inside interface bodies.
    fn parse_modifiers(&mut self, allow_default: bool) -> PResult<Modifiers> {
        let mut modifiers = Modifiers::default();
        loop {
            let Some(token) = self.peek_token() else { break };
            let flag = match token {
                Token::Public => Modifier::Public,
                Token::Protected => Modifier::Protected,
                Token::Private => Modifier::Private,
                Token::Static => Modifier::Static,
                Token::Final => Modifier::Final,
                Token::Abstract => Modifier::Abstract,
                Token::Native => Modifier::Native,
                Token::Synchronized if self.nth_token(1) != Some(Token::LParen) => Modifier::Synchronized,
                Token::Transient => Modifier::Transient,
                Token::Volatile => Modifier::Volatile,
                Token::Strictfp => Modifier::Strictfp,
                Token::Default if allow_default && self.nth_token(1) != Some(Token::Colon) => Modifier::Default,
                Token::At if self.nth_token(1) != Some(Token::Interface) => {
                    let annotation = self.parse_annotation()?;
                    modifiers.annotations.push(annotation);
                    continue;
                }
                _ => break,
            };
            self.advance()?;
            modifiers.flags.push(flag);
        }
        Ok(modifiers)
    }

    fn parse_type_decl(&mut self, start: Location, modifiers: Modifiers) -> PResult<TypeDecl> {

        let kind = match self.peek_token() {
            Some(Token::Class) => TypeKind::Class,
            Some(Token::Interface) => TypeKind::Interface,
            Some(Token::Enum) => TypeKind::Enum,
            Some(Token::At) if self.nth_token(1) == Some(Token::Interface) => {
                self.advance()?;
                TypeKind::Annotation
            }
            _ => return Err(self.error_here("class, interface or enum declaration")),
        };
        self.advance()?;

        let (name, name_span) = self.parse_identifier()?;
        let type_params = if self.check(&Token::Lt) {
            self.parse_type_parameters()?
        } else {
            Vec::new()
        };

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        if self.match_token(&Token::Extends) {
            extends = self.parse_type_list()?;
        }
        if self.match_token(&Token::Implements) {
            implements = self.parse_type_list()?;
        }
        // sealed hierarchies: `permits A, B` carries nothing we check
        if self.check_word("permits") {
            self.advance()?;
            self.parse_type_list()?;
        }

        self.consume(&Token::LBrace, "'{' to open type body")?;
        let enum_constants = if kind == TypeKind::Enum {
            self.parse_enum_constants()?
        } else {
            Vec::new()
        };
        let members = self.parse_class_members(&name, kind != TypeKind::Class && kind != TypeKind::Enum)?;
        self.consume(&Token::RBrace, "'}' to close type body")?;

        Ok(TypeDecl {
            kind,
            modifiers,
            name,
            name_span,
            type_params,
            extends,
            implements,
            enum_constants,
            members,
            span: self.span_from(start),
        })
    }

    fn parse_enum_constants(&mut self) -> PResult<Vec<EnumConstant>> {
        let mut constants = Vec::new();
        loop {
            if self.check(&Token::Semicolon) {
                self.advance()?;
                break;
            }
            if self.check(&Token::RBrace) {
                break;
            }
            let start = self.start();
            self.parse_annotations()?;
            let (name, name_span) = self.parse_identifier()?;
            let arguments = if self.check(&Token::LParen) {
                self.parse_arguments()?
            } else {
                Vec::new()
            };
            let body = if self.check(&Token::LBrace) {
                self.advance()?;
                let members = self.parse_class_members("", false)?;
                self.consume(&Token::RBrace, "'}' after enum constant body")?;
                Some(members)
            } else {
                None
            };
            constants.push(EnumConstant {
                name,
                name_span,
                arguments,
                body,
                span: self.span_from(start),
            });
            if !self.match_token(&Token::Comma) {
                self.match_token(&Token::Semicolon);
                break;
            }
        }
        Ok(constants)
    }

    fn parse_class_members(&mut self, class_name: &str, interface_body: bool) -> PResult<Vec<ClassMember>> {
        let mut members = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            members.push(self.parse_class_member(class_name, interface_body)?);
        }
        Ok(members)
    }

    fn parse_class_member(&mut self, class_name: &str, interface_body: bool) -> PResult<ClassMember> {
        let start = self.start();

        if self.check(&Token::LBrace) {
            let body = self.parse_block()?;
            return Ok(ClassMember::Initializer(InitializerBlock {
                is_static: false,
                span: body.span,
                body,
            }));
        }
        if self.check(&Token::Static) && self.nth_token(1) == Some(Token::LBrace) {
            self.advance()?;
            let body = self.parse_block()?;
            return Ok(ClassMember::Initializer(InitializerBlock {
                is_static: true,
                body,
                span: self.span_from(start),
            }));
        }

        let modifiers = self.parse_modifiers(interface_body)?;

        if matches!(self.peek_token(), Some(Token::Class) | Some(Token::Interface) | Some(Token::Enum))
            || (self.check(&Token::At) && self.nth_token(1) == Some(Token::Interface))
        {
            return Ok(ClassMember::Type(self.parse_type_decl(start, modifiers)?));
        }

        let type_params = if self.check(&Token::Lt) {
            self.parse_type_parameters()?
        } else {
            Vec::new()
        };

        // constructor: `Name(`
        if self.check(&Token::Identifier)
            && self.nth_token(1) == Some(Token::LParen)
            && (class_name.is_empty() || self.peek().map(|t| t.lexeme == class_name).unwrap_or(false))
        {
            let (name, name_span) = self.parse_identifier()?;
            return Ok(ClassMember::Method(self.parse_method_rest(
                start, modifiers, type_params, None, name, name_span,
            )?));
        }

        let type_ref = self.parse_type()?;
        let (name, name_span) = self.parse_identifier()?;
        if self.check(&Token::LParen) {
            return Ok(ClassMember::Method(self.parse_method_rest(
                start,
                modifiers,
                type_params,
                Some(type_ref),
                name,
                name_span,
            )?));
        }

        let declarators = self.parse_declarators_after_name(name, name_span)?;
        self.consume(&Token::Semicolon, "';' after field declaration")?;
        Ok(ClassMember::Field(FieldDecl {
            modifiers,
            type_ref,
            declarators,
            span: self.span_from(start),
        }))
    }

    fn parse_method_rest(
        &mut self,
        start: Location,
        modifiers: Modifiers,
        type_params: Vec<TypeParam>,
        return_type: Option<TypeRef>,
        name: String,
        name_span: Span,
    ) -> PResult<MethodDecl> {
        let parameters = self.parse_parameter_list()?;
        let signature_span = Span::new(name_span.start, self.prev_end());
        while self.check(&Token::LBracket) && self.nth_token(1) == Some(Token::RBracket) {
            self.advance()?;
            self.advance()?;
        }
        let throws = if self.match_token(&Token::Throws) {
            self.parse_type_list()?
        } else {
            Vec::new()
        };
        let body = if self.check(&Token::LBrace) {
            Some(self.parse_block()?)
        } else {
            // annotation element default value
            if self.match_token(&Token::Default) {
                self.parse_element_value()?;
            }
            self.consume(&Token::Semicolon, "';' or method body")?;
            None
        };
        Ok(MethodDecl {
            modifiers,
            type_params,
            return_type,
            name,
            name_span,
            signature_span,
            parameters,
            throws,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_element_value(&mut self) -> PResult<()> {
        if self.check(&Token::LBrace) {
            self.parse_array_initializer()?;
        } else if self.check(&Token::At) {
            self.parse_annotation()?;
        } else {
            self.parse_conditional()?;
        }
        Ok(())
    }

    fn parse_parameter_list(&mut self) -> PResult<Vec<Parameter>> {
        self.consume(&Token::LParen, "'(' to open parameter list")?;
        let mut parameters = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                let start = self.start();
                let modifiers = self.parse_modifiers(false)?;
                let type_ref = self.parse_type()?;
                let varargs = self.match_token(&Token::Ellipsis);
                // receiver parameter `X this`
                if self.check(&Token::This) {
                    self.advance()?;
                } else {
                    let (name, name_span) = self.parse_identifier()?;
                    let mut type_ref = type_ref;
                    while self.check(&Token::LBracket) && self.nth_token(1) == Some(Token::RBracket) {
                        self.advance()?;
                        self.advance()?;
                        type_ref.dims += 1;
                    }
                    parameters.push(Parameter {
                        modifiers,
                        type_ref,
                        name,
                        name_span,
                        varargs,
                        span: self.span_from(start),
                    });
                }
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::RParen, "')' to close parameter list")?;
        Ok(parameters)
    }

    fn parse_type_parameters(&mut self) -> PResult<Vec<TypeParam>> {
        self.consume(&Token::Lt, "'<'")?;
        let mut params = Vec::new();
        loop {
            let start = self.start();
            let annotations = self.parse_annotations()?;
            let (name, _) = self.parse_identifier()?;
            let mut bounds = Vec::new();
            if self.match_token(&Token::Extends) {
                bounds.push(self.parse_type()?);
                while self.match_token(&Token::Amp) {
                    bounds.push(self.parse_type()?);
                }
            }
            params.push(TypeParam { annotations, name, bounds, span: self.span_from(start) });
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.consume_closing_angle()?;
        Ok(params)
    }

    fn parse_type_list(&mut self) -> PResult<Vec<TypeRef>> {
        let mut types = vec![self.parse_type()?];
        while self.match_token(&Token::Comma) {
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    /// A type with optional leading type-use annotations, type arguments and dimensions.
    fn parse_type(&mut self) -> PResult<TypeRef> {
        let annotations = self.parse_annotations()?;
        let start = self.start();

        if self.check(&Token::Question) {
            self.advance()?;
            let wildcard = if self.match_token(&Token::Extends) {
                Wildcard::Extends(Box::new(self.parse_type()?))
            } else if self.match_token(&Token::Super) {
                Wildcard::Super(Box::new(self.parse_type()?))
            } else {
                Wildcard::Unbounded
            };
            let mut type_ref = TypeRef::simple("?", self.span_from(start));
            type_ref.annotations = annotations;
            type_ref.wildcard = Some(wildcard);
            return Ok(type_ref);
        }

        let mut name;
        let mut type_args = Vec::new();
        match self.peek_token() {
            Some(token) if token.is_primitive_type() => {
                name = self.advance()?.lexeme;
            }
            Some(Token::Identifier) => {
                name = self.parse_identifier()?.0;
                loop {
                    if self.check(&Token::Lt) {
                        type_args = self.parse_type_arguments()?;
                    }
                    if self.check(&Token::Dot) && matches!(self.nth_token(1), Some(Token::Identifier) | Some(Token::At)) {
                        self.advance()?;
                        self.parse_annotations()?;
                        let (part, _) = self.parse_identifier()?;
                        name.push('.');
                        name.push_str(&part);
                        continue;
                    }
                    break;
                }
            }
            _ => return Err(self.error_here("type")),
        }

        let mut dims = 0;
        loop {
            let saved = self.current;
            self.parse_annotations()?;
            if self.check(&Token::LBracket) && self.nth_token(1) == Some(Token::RBracket) {
                self.advance()?;
                self.advance()?;
                dims += 1;
            } else {
                self.current = saved;
                break;
            }
        }

        Ok(TypeRef {
            name,
            type_args,
            dims,
            annotations,
            wildcard: None,
            span: self.span_from(start),
        })
    }

    fn parse_type_arguments(&mut self) -> PResult<Vec<TypeRef>> {
        self.consume(&Token::Lt, "'<'")?;
        let mut args = Vec::new();
        // diamond
        if self.check(&Token::Gt) {
            self.advance()?;
            return Ok(args);
        }
        loop {
            args.push(self.parse_type()?);
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.consume_closing_angle()?;
        Ok(args)
    }

    /// Declarators of a field or local after the first name was consumed.
    fn parse_declarators_after_name(&mut self, name: String, name_span: Span) -> PResult<Vec<VariableDeclarator>> {
        let mut declarators = vec![self.parse_declarator_rest(name, name_span)?];
        while self.match_token(&Token::Comma) {
            let (name, name_span) = self.parse_identifier()?;
            declarators.push(self.parse_declarator_rest(name, name_span)?);
        }
        Ok(declarators)
    }

    fn parse_declarator_rest(&mut self, name: String, name_span: Span) -> PResult<VariableDeclarator> {
        let mut extra_dims = 0;
        while self.check(&Token::LBracket) && self.nth_token(1) == Some(Token::RBracket) {
            self.advance()?;
            self.advance()?;
            extra_dims += 1;
        }
        let initializer = if self.match_token(&Token::Assign) {
            if self.check(&Token::LBrace) {
                Some(Expr::ArrayInit(self.parse_array_initializer()?))
            } else {
                Some(self.parse_expression()?)
            }
        } else {
            None
        };
        Ok(VariableDeclarator {
            name,
            name_span,
            extra_dims,
            initializer,
            span: self.span_from(name_span.start),
        })
    }

    // Statements

    fn parse_block(&mut self) -> PResult<Block> {
        let start = self.start();
        self.consume(&Token::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        self.consume(&Token::RBrace, "'}'")?;
        Ok(Block { statements, span: self.span_from(start) })
    }

    fn parse_statement(&mut self) -> PResult<Stmt> {
        let start = self.start();
        let Some(token) = self.peek_token() else {
            return Err(self.error_here("statement"));
        };

        match token {
            Token::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            Token::Semicolon => {
                self.advance()?;
                Ok(Stmt::Empty(self.span_from(start)))
            }
            Token::If => self.parse_if_stmt(),
            Token::While => self.parse_while_stmt(),
            Token::Do => self.parse_do_while_stmt(),
            Token::For => self.parse_for_stmt(),
            Token::Switch => self.parse_switch_stmt(),
            Token::Try => self.parse_try_stmt(),
            Token::Return => {
                self.advance()?;
                let value = if self.check(&Token::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume(&Token::Semicolon, "';' after return")?;
                Ok(Stmt::Return(ReturnStmt { value, span: self.span_from(start) }))
            }
            Token::Break | Token::Continue => {
                self.advance()?;
                let label = if self.check(&Token::Identifier) {
                    Some(self.parse_identifier()?.0)
                } else {
                    None
                };
                self.consume(&Token::Semicolon, "';'")?;
                let jump = JumpStmt { label, span: self.span_from(start) };
                Ok(if token == Token::Break { Stmt::Break(jump) } else { Stmt::Continue(jump) })
            }
            Token::Throw => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.consume(&Token::Semicolon, "';' after throw")?;
                Ok(Stmt::Throw(ThrowStmt { expr, span: self.span_from(start) }))
            }
            Token::Synchronized if self.nth_token(1) == Some(Token::LParen) => {
                self.advance()?;
                self.consume(&Token::LParen, "'('")?;
                let lock = self.parse_expression()?;
                self.consume(&Token::RParen, "')'")?;
                let body = self.parse_block()?;
                Ok(Stmt::Synchronized(SynchronizedStmt { lock, body, span: self.span_from(start) }))
            }
            Token::Assert => {
                self.advance()?;
                let condition = self.parse_expression()?;
                let message = if self.match_token(&Token::Colon) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                self.consume(&Token::Semicolon, "';' after assert")?;
                Ok(Stmt::Assert(AssertStmt { condition, message, span: self.span_from(start) }))
            }
            Token::This | Token::Super if self.nth_token(1) == Some(Token::LParen) => {
                let is_super = token == Token::Super;
                self.advance()?;
                let arguments = self.parse_arguments()?;
                self.consume(&Token::Semicolon, "';' after constructor call")?;
                Ok(Stmt::ExplicitCtorCall(ExplicitCtorInvocation {
                    is_super,
                    arguments,
                    span: self.span_from(start),
                }))
            }
            Token::Identifier if self.nth_token(1) == Some(Token::Colon) => {
                let (label, _) = self.parse_identifier()?;
                self.advance()?;
                let statement = Box::new(self.parse_statement()?);
                Ok(Stmt::Labeled(LabeledStmt { label, statement, span: self.span_from(start) }))
            }
            Token::Class | Token::Interface | Token::Enum => {
                Ok(Stmt::LocalType(self.parse_type_decl(start, Modifiers::default())?))
            }
            Token::Final | Token::Abstract | Token::Static | Token::At => {
                let modifiers = self.parse_modifiers(false)?;
                if matches!(self.peek_token(), Some(Token::Class) | Some(Token::Interface) | Some(Token::Enum)) {
                    return Ok(Stmt::LocalType(self.parse_type_decl(start, modifiers)?));
                }
                let decl = self.parse_local_var_decl(start, modifiers)?;
                self.consume(&Token::Semicolon, "';' after local variable declaration")?;
                Ok(Stmt::VarDecl(VarDeclStmt { span: self.span_from(start), ..decl }))
            }
            _ => {
                if self.is_local_var_decl_start() {
                    let decl = self.parse_local_var_decl(start, Modifiers::default())?;
                    self.consume(&Token::Semicolon, "';' after local variable declaration")?;
                    return Ok(Stmt::VarDecl(VarDeclStmt { span: self.span_from(start), ..decl }));
                }
                let expr = self.parse_expression()?;
                self.consume(&Token::Semicolon, "';' after expression")?;
                let span = expr.span();
                Ok(Stmt::Expr(ExprStmt { expr, span }))
            }
        }
    }

    /// `Type name` ahead, decided by a speculative type parse.
    fn is_local_var_decl_start(&mut self) -> bool {
        match self.peek_token() {
            Some(token) if token.is_primitive_type() => return true,
            Some(Token::Identifier) => {}
            _ => return false,
        }
        let saved = self.current;
        let gas = self.gas;
        let result = self.parse_type().is_ok() && self.check(&Token::Identifier);
        self.current = saved;
        self.gas = gas;
        result
    }

    fn parse_local_var_decl(&mut self, start: Location, modifiers: Modifiers) -> PResult<VarDeclStmt> {
        let type_ref = self.parse_type()?;
        let (name, name_span) = self.parse_identifier()?;
        let declarators = self.parse_declarators_after_name(name, name_span)?;
        Ok(VarDeclStmt {
            modifiers,
            type_ref,
            declarators,
            span: self.span_from(start),
        })
    }

    fn parse_if_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start();
        self.consume(&Token::If, "'if'")?;
        self.consume(&Token::LParen, "'(' after if")?;
        let condition = self.parse_expression()?;
        self.consume(&Token::RParen, "')' after condition")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.match_token(&Token::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            span: self.span_from(start),
        }))
    }

    fn parse_while_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start();
        self.consume(&Token::While, "'while'")?;
        self.consume(&Token::LParen, "'(' after while")?;
        let condition = self.parse_expression()?;
        self.consume(&Token::RParen, "')' after condition")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While(WhileStmt { condition, body, span: self.span_from(start) }))
    }

    fn parse_do_while_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start();
        self.consume(&Token::Do, "'do'")?;
        let body = Box::new(self.parse_statement()?);
        self.consume(&Token::While, "'while' after do body")?;
        self.consume(&Token::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.consume(&Token::RParen, "')'")?;
        self.consume(&Token::Semicolon, "';' after do-while")?;
        Ok(Stmt::DoWhile(DoWhileStmt { body, condition, span: self.span_from(start) }))
    }

    fn parse_for_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start();
        self.consume(&Token::For, "'for'")?;
        self.consume(&Token::LParen, "'(' after for")?;

        if let Some(variable) = self.try_parse_foreach_variable()? {
            let iterable = self.parse_expression()?;
            self.consume(&Token::RParen, "')' after for-each")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(Stmt::ForEach(ForEachStmt {
                variable,
                iterable,
                body,
                span: self.span_from(start),
            }));
        }

        let mut init = Vec::new();
        if !self.check(&Token::Semicolon) {
            let init_start = self.start();
            let has_modifiers = matches!(self.peek_token(), Some(Token::Final) | Some(Token::At));
            if has_modifiers || self.is_local_var_decl_start() {
                let modifiers = self.parse_modifiers(false)?;
                let decl = self.parse_local_var_decl(init_start, modifiers)?;
                init.push(Stmt::VarDecl(decl));
            } else {
                loop {
                    let expr = self.parse_expression()?;
                    let span = expr.span();
                    init.push(Stmt::Expr(ExprStmt { expr, span }));
                    if !self.match_token(&Token::Comma) {
                        break;
                    }
                }
            }
        }
        self.consume(&Token::Semicolon, "';' in for")?;
        let condition = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(&Token::Semicolon, "';' in for")?;
        let mut update = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                update.push(self.parse_expression()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::RParen, "')' after for")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For(ForStmt {
            init,
            condition,
            update,
            body,
            span: self.span_from(start),
        }))
    }

    fn try_parse_foreach_variable(&mut self) -> PResult<Option<Parameter>> {
        let saved = self.current;
        let gas = self.gas;
        let start = self.start();
        let attempt = (|| -> PResult<Option<Parameter>> {
            let modifiers = self.parse_modifiers(false)?;
            let type_ref = self.parse_type()?;
            let (name, name_span) = self.parse_identifier()?;
            if !self.check(&Token::Colon) {
                return Ok(None);
            }
            let span = self.span_from(start);
            self.advance()?;
            Ok(Some(Parameter {
                modifiers,
                type_ref,
                name,
                name_span,
                varargs: false,
                span,
            }))
        })();
        match attempt {
            Ok(Some(param)) => Ok(Some(param)),
            _ => {
                self.current = saved;
                self.gas = gas;
                Ok(None)
            }
        }
    }

    fn parse_switch_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start();
        self.consume(&Token::Switch, "'switch'")?;
        self.consume(&Token::LParen, "'(' after switch")?;
        let selector = self.parse_expression()?;
        self.consume(&Token::RParen, "')' after selector")?;
        self.consume(&Token::LBrace, "'{' to open switch body")?;

        let mut cases = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            let case_start = self.start();
            let mut labels = Vec::new();
            let is_default = if self.match_token(&Token::Default) {
                true
            } else {
                self.consume(&Token::Case, "'case' or 'default'")?;
                loop {
                    labels.push(self.parse_conditional()?);
                    if !self.match_token(&Token::Comma) {
                        break;
                    }
                }
                false
            };
            self.consume(&Token::Colon, "':' after case label")?;
            let mut statements = Vec::new();
            while !matches!(self.peek_token(), Some(Token::Case) | Some(Token::Default) | Some(Token::RBrace) | None) {
                statements.push(self.parse_statement()?);
            }
            cases.push(SwitchCase {
                labels,
                is_default,
                statements,
                span: self.span_from(case_start),
            });
        }
        self.consume(&Token::RBrace, "'}' to close switch body")?;
        Ok(Stmt::Switch(SwitchStmt { selector, cases, span: self.span_from(start) }))
    }

    fn parse_try_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start();
        self.consume(&Token::Try, "'try'")?;

        let mut resources = Vec::new();
        if self.match_token(&Token::LParen) {
            while !self.check(&Token::RParen) {
                let res_start = self.start();
                let has_modifiers = matches!(self.peek_token(), Some(Token::Final) | Some(Token::At));
                if has_modifiers || self.is_local_var_decl_start() {
                    let modifiers = self.parse_modifiers(false)?;
                    let decl = self.parse_local_var_decl(res_start, modifiers)?;
                    resources.push(TryResource::Declaration(decl));
                } else {
                    resources.push(TryResource::Expression(self.parse_expression()?));
                }
                if !self.match_token(&Token::Semicolon) {
                    break;
                }
            }
            self.consume(&Token::RParen, "')' after resources")?;
        }

        let try_block = self.parse_block()?;
        let mut catch_clauses = Vec::new();
        while self.check(&Token::Catch) {
            let catch_start = self.start();
            self.advance()?;
            self.consume(&Token::LParen, "'(' after catch")?;
            let param_start = self.start();
            let modifiers = self.parse_modifiers(false)?;
            let first = self.parse_type()?;
            let mut alternatives = vec![first.clone()];
            while self.match_token(&Token::Pipe) {
                alternatives.push(self.parse_type()?);
            }
            let (name, name_span) = self.parse_identifier()?;
            let parameter = Parameter {
                modifiers,
                type_ref: first,
                name,
                name_span,
                varargs: false,
                span: self.span_from(param_start),
            };
            self.consume(&Token::RParen, "')' after catch parameter")?;
            let block = self.parse_block()?;
            catch_clauses.push(CatchClause {
                parameter,
                alternatives,
                block,
                span: self.span_from(catch_start),
            });
        }
        let finally_block = if self.match_token(&Token::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };
        if catch_clauses.is_empty() && finally_block.is_none() && resources.is_empty() {
            return Err(self.error_here("'catch' or 'finally'"));
        }
        Ok(Stmt::Try(TryStmt {
            resources,
            try_block,
            catch_clauses,
            finally_block,
            span: self.span_from(start),
        }))
    }

    // Expressions

    pub fn parse_expression(&mut self) -> PResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> PResult<Expr> {
        if self.is_lambda_ahead() {
            return self.parse_lambda();
        }
        let target = self.parse_conditional()?;
        let op = match self.peek_token() {
            Some(Token::Assign) => AssignmentOp::Assign,
            Some(Token::AddAssign) => AssignmentOp::AddAssign,
            Some(Token::SubAssign) => AssignmentOp::SubAssign,
            Some(Token::MulAssign) => AssignmentOp::MulAssign,
            Some(Token::DivAssign) => AssignmentOp::DivAssign,
            Some(Token::ModAssign) => AssignmentOp::ModAssign,
            Some(Token::AndAssign) => AssignmentOp::AndAssign,
            Some(Token::OrAssign) => AssignmentOp::OrAssign,
            Some(Token::XorAssign) => AssignmentOp::XorAssign,
            Some(Token::LShiftAssign) => AssignmentOp::ShlAssign,
            Some(Token::RShiftAssign) => AssignmentOp::ShrAssign,
            Some(Token::URShiftAssign) => AssignmentOp::UShrAssign,
            _ => return Ok(target),
        };
        self.advance()?;
        let value = if self.check(&Token::LBrace) {
            Expr::ArrayInit(self.parse_array_initializer()?)
        } else {
            self.parse_assignment()?
        };
        let span = target.span().merge(value.span());
        Ok(Expr::Assignment(AssignmentExpr {
            op,
            target: Box::new(target),
            value: Box::new(value),
            span,
        }))
    }

    fn parse_conditional(&mut self) -> PResult<Expr> {
        let condition = self.parse_binary(1)?;
        if !self.check(&Token::Question) {
            return Ok(condition);
        }
        self.advance()?;
        let then_expr = self.parse_assignment()?;
        self.consume(&Token::Colon, "':' in conditional expression")?;
        let else_expr = if self.is_lambda_ahead() {
            self.parse_lambda()?
        } else {
            self.parse_conditional()?
        };
        let span = condition.span().merge(else_expr.span());
        Ok(Expr::Conditional(ConditionalExpr {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
            span,
        }))
    }

    fn binary_operator(&self) -> Option<(BinaryOp, u8)> {
        let op = match self.peek_token()? {
            Token::PipePipe => (BinaryOp::Or, 1),
            Token::AndAnd => (BinaryOp::And, 2),
            Token::Pipe => (BinaryOp::BitOr, 3),
            Token::Caret => (BinaryOp::BitXor, 4),
            Token::Amp => (BinaryOp::BitAnd, 5),
            Token::Eq => (BinaryOp::Eq, 6),
            Token::Ne => (BinaryOp::Ne, 6),
            Token::Lt => (BinaryOp::Lt, 7),
            Token::Le => (BinaryOp::Le, 7),
            Token::Gt => (BinaryOp::Gt, 7),
            Token::Ge => (BinaryOp::Ge, 7),
            Token::LShift => (BinaryOp::Shl, 8),
            Token::RShift => (BinaryOp::Shr, 8),
            Token::URShift => (BinaryOp::UShr, 8),
            Token::Plus => (BinaryOp::Add, 9),
            Token::Minus => (BinaryOp::Sub, 9),
            Token::Star => (BinaryOp::Mul, 10),
            Token::Slash => (BinaryOp::Div, 10),
            Token::Percent => (BinaryOp::Mod, 10),
            _ => return None,
        };
        Some(op)
    }

    /// Precedence climbing over the binary operators; `instanceof` sits at the relational level.
    fn parse_binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            if self.check(&Token::InstanceOf) && min_prec <= 7 {
                self.advance()?;
                let final_pattern = self.match_token(&Token::Final);
                let target_type = self.parse_type()?;
                // pattern binding variables are not tracked
                if self.check(&Token::Identifier) || final_pattern {
                    self.parse_identifier()?;
                }
                let span = left.span().merge(target_type.span);
                left = Expr::InstanceOf(InstanceOfExpr {
                    expr: Box::new(left),
                    target_type,
                    span,
                });
                continue;
            }
            let Some((op, prec)) = self.binary_operator() else { break };
            if prec < min_prec {
                break;
            }
            self.advance()?;
            let right = self.parse_binary(prec + 1)?;
            let span = left.span().merge(right.span());
            left = Expr::Binary(BinaryExpr {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            });
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let start = self.start();
        let op = match self.peek_token() {
            Some(Token::Plus) => Some(UnaryOp::Plus),
            Some(Token::Minus) => Some(UnaryOp::Minus),
            Some(Token::Bang) => Some(UnaryOp::Not),
            Some(Token::Tilde) => Some(UnaryOp::BitNot),
            Some(Token::Inc) => Some(UnaryOp::PreInc),
            Some(Token::Dec) => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.advance()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
                span: self.span_from(start),
            }));
        }
        if self.check(&Token::LParen) {
            if let Some(target_type) = self.try_parse_cast_type()? {
                let expr = if self.is_lambda_ahead() {
                    self.parse_lambda()?
                } else {
                    self.parse_unary()?
                };
                return Ok(Expr::Cast(CastExpr {
                    target_type,
                    expr: Box::new(expr),
                    span: self.span_from(start),
                }));
            }
        }
        self.parse_postfix()
    }

    /// `(Type)` followed by something a cast can apply to.
    fn try_parse_cast_type(&mut self) -> PResult<Option<TypeRef>> {
        let saved = self.current;
        let gas = self.gas;
        self.advance()?;
        let primitive = self.peek_token().map(|t| t.is_primitive_type()).unwrap_or(false);
        let parsed = self.parse_type();
        let is_cast = match &parsed {
            Ok(_) if self.check(&Token::RParen) => {
                let next = self.nth_token(1);
                if primitive {
                    true
                } else {
                    matches!(
                        next,
                        Some(Token::Identifier)
                            | Some(Token::LParen)
                            | Some(Token::Bang)
                            | Some(Token::Tilde)
                            | Some(Token::This)
                            | Some(Token::Super)
                            | Some(Token::New)
                    ) || next.map(|t| t.is_literal()).unwrap_or(false)
                }
            }
            _ => false,
        };
        if !is_cast {
            self.current = saved;
            self.gas = gas;
            return Ok(None);
        }
        let type_ref = parsed?;
        self.consume(&Token::RParen, "')' after cast type")?;
        Ok(Some(type_ref))
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let start = self.start();
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_token() {
                Some(Token::Dot) => {
                    self.advance()?;
                    if self.check(&Token::Lt) {
                        self.parse_type_arguments()?;
                    }
                    match self.peek_token() {
                        Some(Token::Class) => {
                            self.advance()?;
                            let name = expr.as_qualified_name().unwrap_or_default();
                            let type_ref = TypeRef::simple(&name, expr.span());
                            expr = Expr::ClassLiteral(ClassLiteralExpr { type_ref, span: self.span_from(start) });
                        }
                        Some(Token::This) => {
                            self.advance()?;
                            expr = Expr::This(ThisExpr {
                                qualifier: expr.as_qualified_name(),
                                span: self.span_from(start),
                            });
                        }
                        Some(Token::New) => {
                            // qualified inner class creation, the outer instance is evaluated first
                            let inner = self.parse_new_expression()?;
                            expr = match inner {
                                Expr::New(mut new_expr) => {
                                    new_expr.arguments.insert(0, expr);
                                    new_expr.span = self.span_from(start);
                                    Expr::New(new_expr)
                                }
                                other => other,
                            };
                        }
                        _ => {
                            let (name, name_span) = self.parse_identifier()?;
                            if self.check(&Token::LParen) {
                                let arguments = self.parse_arguments()?;
                                expr = Expr::MethodCall(MethodCallExpr {
                                    target: Some(Box::new(expr)),
                                    name,
                                    name_span,
                                    arguments,
                                    span: self.span_from(start),
                                });
                            } else {
                                expr = Expr::FieldAccess(FieldAccessExpr {
                                    target: Box::new(expr),
                                    name,
                                    name_span,
                                    span: self.span_from(start),
                                });
                            }
                        }
                    }
                }
                Some(Token::LBracket) => {
                    self.advance()?;
                    let index = self.parse_expression()?;
                    self.consume(&Token::RBracket, "']'")?;
                    expr = Expr::ArrayAccess(ArrayAccessExpr {
                        array: Box::new(expr),
                        index: Box::new(index),
                        span: self.span_from(start),
                    });
                }
                Some(Token::Inc) | Some(Token::Dec) => {
                    let op = if self.check(&Token::Inc) { UnaryOp::PostInc } else { UnaryOp::PostDec };
                    self.advance()?;
                    expr = Expr::Unary(UnaryExpr {
                        op,
                        operand: Box::new(expr),
                        span: self.span_from(start),
                    });
                }
                Some(Token::DoubleColon) => {
                    self.advance()?;
                    if self.check(&Token::Lt) {
                        self.parse_type_arguments()?;
                    }
                    let (name, name_span) = if self.check(&Token::New) {
                        let token = self.advance()?;
                        ("new".to_string(), token.span())
                    } else {
                        self.parse_identifier()?
                    };
                    expr = Expr::MethodRef(MethodRefExpr {
                        target: Box::new(expr),
                        name,
                        name_span,
                        span: self.span_from(start),
                    });
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let start = self.start();
        let Some(token) = self.peek().cloned() else {
            return Err(self.error_here("expression"));
        };

        let literal = match token.token {
            Token::IntegerLiteral | Token::HexInteger | Token::BinaryInteger => Some(Literal::Integer(token.lexeme.clone())),
            Token::FloatLiteral | Token::ScientificFloat | Token::TypedFloat => Some(Literal::Float(token.lexeme.clone())),
            Token::CharLiteral => Some(Literal::Char(token.lexeme.clone())),
            Token::StringLiteral => Some(Literal::String(token.lexeme.clone())),
            Token::True => Some(Literal::Boolean(true)),
            Token::False => Some(Literal::Boolean(false)),
            Token::Null => Some(Literal::Null),
            _ => None,
        };
        if let Some(value) = literal {
            self.advance()?;
            return Ok(Expr::Literal(LiteralExpr { value, span: token.span() }));
        }

        match token.token {
            Token::This => {
                self.advance()?;
                Ok(Expr::This(ThisExpr { qualifier: None, span: token.span() }))
            }
            Token::Super => {
                self.advance()?;
                Ok(Expr::Super(token.span()))
            }
            Token::New => self.parse_new_expression(),
            Token::LParen => {
                self.advance()?;
                let inner = self.parse_expression()?;
                self.consume(&Token::RParen, "')'")?;
                Ok(Expr::Parens(ParensExpr {
                    expr: Box::new(inner),
                    span: self.span_from(start),
                }))
            }
            Token::LBrace => Ok(Expr::ArrayInit(self.parse_array_initializer()?)),
            t if t.is_primitive_type() => {
                // int.class, int[].class, int[]::new
                let type_ref = self.parse_type()?;
                if self.check(&Token::DoubleColon) {
                    let name = type_ref.display();
                    return Ok(Expr::Identifier(IdentifierExpr { name, span: type_ref.span }));
                }
                self.consume(&Token::Dot, "'.class'")?;
                self.consume(&Token::Class, "'class'")?;
                Ok(Expr::ClassLiteral(ClassLiteralExpr { type_ref, span: self.span_from(start) }))
            }
            Token::Identifier => {
                // array type literal or constructor reference: `String[].class`, `String[]::new`
                if self.nth_token(1) == Some(Token::LBracket) && self.nth_token(2) == Some(Token::RBracket) {
                    let type_ref = self.parse_type()?;
                    if self.check(&Token::DoubleColon) {
                        let name = type_ref.display();
                        return Ok(Expr::Identifier(IdentifierExpr { name, span: type_ref.span }));
                    }
                    self.consume(&Token::Dot, "'.class'")?;
                    self.consume(&Token::Class, "'class'")?;
                    return Ok(Expr::ClassLiteral(ClassLiteralExpr { type_ref, span: self.span_from(start) }));
                }
                let (name, name_span) = self.parse_identifier()?;
                if self.check(&Token::LParen) {
                    let arguments = self.parse_arguments()?;
                    return Ok(Expr::MethodCall(MethodCallExpr {
                        target: None,
                        name,
                        name_span,
                        arguments,
                        span: self.span_from(start),
                    }));
                }
                Ok(Expr::Identifier(IdentifierExpr { name, span: name_span }))
            }
            _ => Err(self.error_here("expression")),
        }
    }

    fn parse_new_expression(&mut self) -> PResult<Expr> {
        let start = self.start();
        self.consume(&Token::New, "'new'")?;
        if self.check(&Token::Lt) {
            self.parse_type_arguments()?;
        }
        let annotations = self.parse_annotations()?;
        let type_start = self.start();
        let mut name;
        let mut type_args = Vec::new();
        if self.peek_token().map(|t| t.is_primitive_type()).unwrap_or(false) {
            name = self.advance()?.lexeme;
        } else {
            name = self.parse_identifier()?.0;
            loop {
                if self.check(&Token::Lt) {
                    type_args = self.parse_type_arguments()?;
                }
                if self.check(&Token::Dot) && self.nth_token(1) == Some(Token::Identifier) {
                    self.advance()?;
                    let (part, _) = self.parse_identifier()?;
                    name.push('.');
                    name.push_str(&part);
                    continue;
                }
                break;
            }
        }
        let mut type_ref = TypeRef {
            name,
            type_args,
            dims: 0,
            annotations,
            wildcard: None,
            span: self.span_from(type_start),
        };

        if self.check(&Token::LBracket) {
            let mut dimensions = Vec::new();
            while self.check(&Token::LBracket) {
                self.advance()?;
                if self.check(&Token::RBracket) {
                    self.advance()?;
                } else {
                    dimensions.push(self.parse_expression()?);
                    self.consume(&Token::RBracket, "']'")?;
                }
                type_ref.dims += 1;
            }
            type_ref.span = self.span_from(type_start);
            let initializer = if self.check(&Token::LBrace) {
                Some(self.parse_array_initializer()?)
            } else {
                None
            };
            return Ok(Expr::NewArray(NewArrayExpr {
                type_ref,
                dimensions,
                initializer,
                span: self.span_from(start),
            }));
        }

        let arguments = self.parse_arguments()?;
        let body = if self.check(&Token::LBrace) {
            self.advance()?;
            let members = self.parse_class_members("", false)?;
            self.consume(&Token::RBrace, "'}' after anonymous class body")?;
            Some(members)
        } else {
            None
        };
        Ok(Expr::New(NewExpr {
            type_ref,
            arguments,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_array_initializer(&mut self) -> PResult<ArrayInitExpr> {
        let start = self.start();
        self.consume(&Token::LBrace, "'{'")?;
        let mut elements = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.check(&Token::LBrace) {
                elements.push(Expr::ArrayInit(self.parse_array_initializer()?));
            } else {
                elements.push(self.parse_expression()?);
            }
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.consume(&Token::RBrace, "'}'")?;
        Ok(ArrayInitExpr { elements, span: self.span_from(start) })
    }

    fn parse_arguments(&mut self) -> PResult<Vec<Expr>> {
        self.consume(&Token::LParen, "'('")?;
        let mut arguments = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                arguments.push(self.parse_expression()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::RParen, "')' after arguments")?;
        Ok(arguments)
    }

    /// `x ->` or a parenthesised list whose closing paren is followed by `->`.
    fn is_lambda_ahead(&self) -> bool {
        match self.peek_token() {
            Some(Token::Identifier) => self.nth_token(1) == Some(Token::Arrow),
            Some(Token::LParen) => {
                let mut depth = 0usize;
                let mut idx = self.current;
                while let Some(token) = self.tokens.get(idx) {
                    match token.token {
                        Token::LParen => depth += 1,
                        Token::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                return self.tokens.get(idx + 1).map(|t| t.token) == Some(Token::Arrow);
                            }
                        }
                        Token::Semicolon | Token::LBrace | Token::RBrace => return false,
                        _ => {}
                    }
                    idx += 1;
                }
                false
            }
            _ => false,
        }
    }

    fn parse_lambda(&mut self) -> PResult<Expr> {
        let start = self.start();
        let mut params = Vec::new();
        if self.check(&Token::Identifier) {
            let (name, name_span) = self.parse_identifier()?;
            params.push(LambdaParam {
                modifiers: Modifiers::default(),
                type_ref: None,
                name,
                name_span,
                span: name_span,
            });
        } else {
            self.consume(&Token::LParen, "'('")?;
            if !self.check(&Token::RParen) {
                loop {
                    let param_start = self.start();
                    let implicit = self.check(&Token::Identifier)
                        && matches!(self.nth_token(1), Some(Token::Comma) | Some(Token::RParen));
                    if implicit {
                        let (name, name_span) = self.parse_identifier()?;
                        params.push(LambdaParam {
                            modifiers: Modifiers::default(),
                            type_ref: None,
                            name,
                            name_span,
                            span: name_span,
                        });
                    } else {
                        let modifiers = self.parse_modifiers(false)?;
                        let type_ref = self.parse_type()?;
                        self.match_token(&Token::Ellipsis);
                        let (name, name_span) = self.parse_identifier()?;
                        let type_ref = if type_ref.is_var() { None } else { Some(type_ref) };
                        params.push(LambdaParam {
                            modifiers,
                            type_ref,
                            name,
                            name_span,
                            span: self.span_from(param_start),
                        });
                    }
                    if !self.match_token(&Token::Comma) {
                        break;
                    }
                }
            }
            self.consume(&Token::RParen, "')' after lambda parameters")?;
        }
        self.consume(&Token::Arrow, "'->'")?;
        let body = if self.check(&Token::LBrace) {
            LambdaBody::Block(self.parse_block()?)
        } else {
            LambdaBody::Expr(Box::new(self.parse_expression()?))
        };
        Ok(Expr::Lambda(LambdaExpr { params, body, span: self.span_from(start) }))
    }
}

pub fn parse(source: &str) -> PResult<CompilationUnit> {
    Parser::new(source)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_method_body(unit: &CompilationUnit) -> &Block {
        unit.type_decls[0]
            .methods()
            .next()
            .and_then(|m| m.body.as_ref())
            .expect("method body")
    }

    #[test]
    fn parses_module_declaration_with_qualified_exports() {
        let unit = parse(
            "open module mod.one { requires transitive mod.two; requires static java.sql; \
             exports p.a; exports p.b to mod.x, mod.y; uses p.S; provides p.S with p.Impl; }",
        )
        .expect("parse");
        let module = unit.module_decl.expect("module");
        assert!(module.is_open);
        assert_eq!(module.name, "mod.one");
        assert_eq!(module.directives.len(), 6);
        match &module.directives[0] {
            ModuleDirective::Requires { module, transitive, .. } => {
                assert_eq!(module.name, "mod.two");
                assert!(*transitive);
            }
            other => panic!("unexpected {:?}", other),
        }
        match &module.directives[3] {
            ModuleDirective::Exports { package, targets, .. } => {
                assert_eq!(package.name, "p.b");
                assert_eq!(targets.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_module_import_and_on_demand_import() {
        let unit = parse("import module mod.a; import java.util.*; import static java.lang.Math.max; class X {}")
            .expect("parse");
        assert_eq!(unit.imports[0].kind, ImportKind::Module);
        assert_eq!(unit.imports[0].name, "mod.a");
        assert_eq!(unit.imports[1].kind, ImportKind::OnDemand);
        assert_eq!(unit.imports[1].name, "java.util");
        assert_eq!(unit.imports[2].kind, ImportKind::StaticSingle);
    }

    #[test]
    fn nested_generics_split_shift_tokens() {
        let unit = parse("class X { java.util.Map<String, java.util.List<String>> m; }").expect("parse");
        let field = unit.type_decls[0].fields().next().expect("field");
        assert_eq!(field.type_ref.type_args.len(), 2);
        assert_eq!(field.type_ref.type_args[1].type_args.len(), 1);
    }

    #[test]
    fn conditional_and_short_circuit_structure() {
        let unit = parse("class X { boolean f(boolean b, boolean v) { return b ? false : (true && (v = true)); } }")
            .expect("parse");
        let body = first_method_body(&unit);
        match &body.statements[0] {
            Stmt::Return(ReturnStmt { value: Some(Expr::Conditional(c)), .. }) => {
                assert!(matches!(c.else_expr.unparenthesized(), Expr::Binary(b) if b.op == BinaryOp::And));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn lambdas_casts_and_method_refs() {
        let unit = parse(
            "class X { void m() { I i = (@NonNull Object o) -> o.toString(); Runnable r = () -> {}; \
             Object o = (Object) null; F f = X::foo; int n = (n) + 1; } }",
        )
        .expect("parse");
        let body = first_method_body(&unit);
        assert_eq!(body.statements.len(), 5);
        let init = |i: usize| match &body.statements[i] {
            Stmt::VarDecl(decl) => decl.declarators[0].initializer.clone().expect("init"),
            other => panic!("unexpected {:?}", other),
        };
        match init(0) {
            Expr::Lambda(lambda) => {
                let ty = lambda.params[0].type_ref.as_ref().expect("typed");
                assert_eq!(ty.name, "Object");
                assert_eq!(lambda.params[0].modifiers.annotations[0].name, "NonNull");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(init(2), Expr::Cast(_)));
        assert!(matches!(init(3), Expr::MethodRef(_)));
        assert!(matches!(init(4), Expr::Binary(_)));
    }

    #[test]
    fn statement_spans_follow_statement_kind() {
        let source = "class X { void m(Object p) { p.toString(); return; } }";
        let unit = parse(source).expect("parse");
        let body = first_method_body(&unit);
        assert_eq!(body.statements[0].span().source_text(source), "p.toString()");
        assert_eq!(body.statements[1].span().source_text(source), "return;");
    }

    #[test]
    fn package_annotations_and_initializers() {
        let unit = parse("@NonNullByDefault package p; class X { final int x; { x = 1; } static { } X() { this(1); } X(int a) { x = a; } }")
            .expect("parse");
        let package = unit.package_decl.expect("package");
        assert_eq!(package.annotations[0].name, "NonNullByDefault");
        let ty = &unit.type_decls[0];
        assert_eq!(ty.constructors().count(), 2);
        assert!(ty.constructors().next().map(|c| c.delegates_to_this()).unwrap_or(false));
    }

    #[test]
    fn missing_semicolon_is_reported() {
        let err = parse("class X { int x }").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }
}
