//! Declaration parsing: functions, classes, interfaces, traits, enums,
//! namespaces, imports, constants, parameters, and the type grammar.

use crate::options::PhpVersion;
use crate::parser::{token_is_wordlike, Parser};
use php_ast::{EnumBackingType, Modifier, Node, NodeKind, UseKind};
use php_error::ParseResult;
use php_position_tracking::SourceLocation;
use php_token::{TokenKind, TokenPayload};

fn modifier_for(kind: TokenKind) -> Option<Modifier> {
    Some(match kind {
        TokenKind::Public => Modifier::Public,
        TokenKind::Protected => Modifier::Protected,
        TokenKind::Private => Modifier::Private,
        TokenKind::Static => Modifier::Static,
        TokenKind::Abstract => Modifier::Abstract,
        TokenKind::Final => Modifier::Final,
        TokenKind::Readonly => Modifier::Readonly,
        TokenKind::Var => Modifier::Var,
        _ => return None,
    })
}

impl Parser {
    /// Top-level dispatch: declarations first, everything else falls through
    /// to the statement parser. Attributes before declarations are consumed
    /// and dropped (the AST does not model them).
    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Node> {
        while self.check(TokenKind::Attribute) {
            self.advance();
        }
        match self.peek_kind() {
            TokenKind::Function if self.function_declaration_ahead() => {
                self.parse_function_declaration()
            }
            TokenKind::Abstract | TokenKind::Final => self.parse_class_with_modifiers(),
            TokenKind::Readonly
                if matches!(
                    self.peek_ahead(1).kind,
                    TokenKind::Class | TokenKind::Abstract | TokenKind::Final
                ) =>
            {
                self.parse_class_with_modifiers()
            }
            TokenKind::Class => {
                let start = self.peek().location.clone();
                self.parse_class_declaration(Vec::new(), start)
            }
            TokenKind::Interface => self.parse_interface(),
            TokenKind::Trait => self.parse_trait(),
            TokenKind::Enum if self.peek_ahead(1).kind == TokenKind::Identifier => {
                self.parse_enum()
            }
            TokenKind::Namespace => self.parse_namespace(),
            TokenKind::Use => self.parse_use(),
            TokenKind::Const => self.parse_const(),
            _ => self.parse_statement(),
        }
    }

    fn function_declaration_ahead(&self) -> bool {
        match self.peek_ahead(1).kind {
            TokenKind::Identifier => true,
            TokenKind::Ampersand => self.peek_ahead(2).kind == TokenKind::Identifier,
            _ => false,
        }
    }

    /// `function [&]name(params)[: type] { body }`
    fn parse_function_declaration(&mut self) -> ParseResult<Node> {
        let function_token = self.advance();
        let by_ref = self.eat(TokenKind::Ampersand);
        let (name, _) = self.parse_identifier()?;
        let parameters = self.parse_parameter_list()?;
        let return_type =
            if self.eat(TokenKind::Colon) { Some(Box::new(self.parse_type()?)) } else { None };
        let body = self.parse_block()?;
        let location = SourceLocation::merge(&function_token.location, &body.location);
        Ok(Node::new(
            NodeKind::FunctionDeclaration {
                name,
                parameters,
                return_type,
                by_ref,
                body: Box::new(body),
            },
            location,
        ))
    }

    /// `abstract`/`final`/`readonly` prefix before `class`.
    fn parse_class_with_modifiers(&mut self) -> ParseResult<Node> {
        let start = self.peek().location.clone();
        let mut modifiers = Vec::new();
        loop {
            match modifier_for(self.peek_kind()) {
                Some(modifier)
                    if matches!(
                        modifier,
                        Modifier::Abstract | Modifier::Final | Modifier::Readonly
                    ) =>
                {
                    self.advance();
                    modifiers.push(modifier);
                }
                _ => break,
            }
        }
        self.parse_class_declaration(modifiers, start)
    }

    fn parse_class_declaration(
        &mut self,
        modifiers: Vec<Modifier>,
        start: SourceLocation,
    ) -> ParseResult<Node> {
        self.consume(TokenKind::Class, "'class'")?;
        let (name, _) = self.parse_identifier()?;
        let super_class = if self.eat(TokenKind::Extends) {
            Some(Box::new(self.parse_name_expression()?))
        } else {
            None
        };
        let mut interfaces = Vec::new();
        if self.eat(TokenKind::Implements) {
            loop {
                interfaces.push(self.parse_name_expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let (body, end) = self.parse_class_body(false)?;
        Ok(Node::new(
            NodeKind::ClassDeclaration { name, modifiers, super_class, interfaces, body },
            SourceLocation::merge(&start, &end),
        ))
    }

    fn parse_interface(&mut self) -> ParseResult<Node> {
        let interface_token = self.advance();
        let (name, _) = self.parse_identifier()?;
        let mut extends = Vec::new();
        if self.eat(TokenKind::Extends) {
            loop {
                extends.push(self.parse_name_expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let (body, end) = self.parse_class_body(true)?;
        Ok(Node::new(
            NodeKind::InterfaceDeclaration { name, extends, body },
            SourceLocation::merge(&interface_token.location, &end),
        ))
    }

    fn parse_trait(&mut self) -> ParseResult<Node> {
        let trait_token = self.advance();
        let (name, _) = self.parse_identifier()?;
        let (body, end) = self.parse_class_body(false)?;
        Ok(Node::new(
            NodeKind::TraitDeclaration { name, body },
            SourceLocation::merge(&trait_token.location, &end),
        ))
    }

    /// `enum Name [: int|string] [implements ...] { cases and members }`
    fn parse_enum(&mut self) -> ParseResult<Node> {
        let enum_token = self.advance();
        let (name, _) = self.parse_identifier()?;
        let backing_type = if self.eat(TokenKind::Colon) {
            let (type_name, location) = self.parse_identifier()?;
            match type_name.to_ascii_lowercase().as_str() {
                "int" => Some(EnumBackingType::Int),
                "string" => Some(EnumBackingType::String),
                _ => {
                    return Err(
                        self.syntax_error("enum backing type must be int or string", &location)
                    );
                }
            }
        } else {
            None
        };
        let mut interfaces = Vec::new();
        if self.eat(TokenKind::Implements) {
            loop {
                interfaces.push(self.parse_name_expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let (body, end) = self.parse_class_body(false)?;
        Ok(Node::new(
            NodeKind::EnumDeclaration { name, backing_type, interfaces, body },
            SourceLocation::merge(&enum_token.location, &end),
        ))
    }

    /// `namespace [Name\Parts] ;` or `namespace [Name\Parts] { ... }`.
    ///
    /// The `;` form owns all following statements until end of input or the
    /// next `namespace` keyword.
    fn parse_namespace(&mut self) -> ParseResult<Node> {
        let namespace_token = self.advance();
        let mut parts = Vec::new();
        if self.check(TokenKind::Identifier) {
            let (first, _) = self.parse_identifier()?;
            parts.push(first);
            while self.eat(TokenKind::Backslash) {
                let (part, _) = self.parse_identifier()?;
                parts.push(part);
            }
        }
        let mut statements = Vec::new();
        let end;
        if self.eat(TokenKind::LeftBrace) {
            while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
                if self.weave_tags(&mut statements) {
                    continue;
                }
                statements.push(self.parse_declaration()?);
            }
            end = self.consume(TokenKind::RightBrace, "'}'")?.location;
        } else {
            self.consume_statement_end()?;
            while !self.is_at_end() && !self.check(TokenKind::Namespace) {
                if self.weave_tags(&mut statements) {
                    continue;
                }
                statements.push(self.parse_declaration()?);
            }
            end = statements
                .last()
                .map(|s| s.location.clone())
                .unwrap_or_else(|| namespace_token.location.clone());
        }
        Ok(Node::new(
            NodeKind::NamespaceDeclaration { parts, statements },
            SourceLocation::merge(&namespace_token.location, &end),
        ))
    }

    /// `use [function|const] A\B [as C], ... ;`
    fn parse_use(&mut self) -> ParseResult<Node> {
        let use_token = self.advance();
        let kind = if self.eat(TokenKind::Function) {
            UseKind::Function
        } else if self.eat(TokenKind::Const) {
            UseKind::Const
        } else {
            UseKind::Normal
        };
        let mut items = Vec::new();
        loop {
            let start = self.peek().location.clone();
            self.eat(TokenKind::Backslash);
            let mut parts = Vec::new();
            let (first, mut end) = self.parse_identifier()?;
            parts.push(first);
            while self.eat(TokenKind::Backslash) {
                let (part, location) = self.parse_identifier()?;
                parts.push(part);
                end = location;
            }
            let alias = if self.eat(TokenKind::As) {
                let (alias, location) = self.parse_identifier()?;
                end = location;
                Some(alias)
            } else {
                None
            };
            items.push(Node::new(
                NodeKind::UseItem { parts, alias },
                SourceLocation::merge(&start, &end),
            ));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = items[items.len() - 1].location.clone();
        self.consume_statement_end()?;
        Ok(Node::new(
            NodeKind::UseStatement { kind, items },
            SourceLocation::merge(&use_token.location, &end),
        ))
    }

    /// Top-level `const A = 1, B = 2;`
    fn parse_const(&mut self) -> ParseResult<Node> {
        let const_token = self.advance();
        let entries = self.parse_constant_entries()?;
        let end = entries[entries.len() - 1].location.clone();
        self.consume_statement_end()?;
        Ok(Node::new(
            NodeKind::ConstDeclaration { entries },
            SourceLocation::merge(&const_token.location, &end),
        ))
    }

    fn parse_constant_entries(&mut self) -> ParseResult<Vec<Node>> {
        let mut entries = Vec::new();
        loop {
            let (name, name_location) = self.parse_member_name()?;
            self.consume(TokenKind::Assign, "'='")?;
            let value = self.parse_expression()?;
            let location = SourceLocation::merge(&name_location, &value.location);
            entries.push(Node::new(
                NodeKind::ConstantEntry { name, value: Box::new(value) },
                location,
            ));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(entries)
    }

    // ——— Class-like bodies ———

    /// Parse `{ members }`; `interface_context` permits bodiless methods
    /// without `abstract`. Returns the members and the closing brace span.
    pub(crate) fn parse_class_body(
        &mut self,
        interface_context: bool,
    ) -> ParseResult<(Vec<Node>, SourceLocation)> {
        self.consume(TokenKind::LeftBrace, "'{'")?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            members.append(&mut self.parse_class_member(interface_context)?);
        }
        let close = self.consume(TokenKind::RightBrace, "'}'")?;
        Ok((members, close.location))
    }

    /// One member; property declarations with several declarators expand to
    /// several nodes sharing modifiers and type.
    fn parse_class_member(&mut self, interface_context: bool) -> ParseResult<Vec<Node>> {
        while self.check(TokenKind::Attribute) {
            self.advance();
        }
        match self.peek_kind() {
            TokenKind::Use => return Ok(vec![self.parse_trait_use()?]),
            TokenKind::Case => return Ok(vec![self.parse_enum_case()?]),
            TokenKind::Semicolon => {
                // stray member separator
                self.advance();
                return Ok(Vec::new());
            }
            _ => {}
        }

        let start = self.peek().location.clone();
        let mut modifiers = Vec::new();
        while let Some(modifier) = modifier_for(self.peek_kind()) {
            // `static` also opens closures, but those are expressions and
            // cannot appear directly in a class body
            self.advance();
            modifiers.push(modifier);
        }

        match self.peek_kind() {
            TokenKind::Const => {
                self.advance();
                let entries = self.parse_constant_entries()?;
                let end = entries[entries.len() - 1].location.clone();
                self.consume_statement_end()?;
                Ok(vec![Node::new(
                    NodeKind::ClassConstantDeclaration { modifiers, entries },
                    SourceLocation::merge(&start, &end),
                )])
            }
            TokenKind::Function => {
                Ok(vec![self.parse_method(modifiers, start, interface_context)?])
            }
            TokenKind::Variable => self.parse_properties(modifiers, None, start),
            _ => {
                let prop_type = self.parse_type()?;
                self.parse_properties(modifiers, Some(prop_type), start)
            }
        }
    }

    fn parse_method(
        &mut self,
        modifiers: Vec<Modifier>,
        start: SourceLocation,
        interface_context: bool,
    ) -> ParseResult<Node> {
        self.advance(); // function
        let by_ref = self.eat(TokenKind::Ampersand);
        let (name, name_location) = self.parse_member_name()?;
        let parameters = self.parse_parameter_list()?;
        let return_type =
            if self.eat(TokenKind::Colon) { Some(Box::new(self.parse_type()?)) } else { None };

        let is_abstract = modifiers.contains(&Modifier::Abstract);
        let (body, end) = if self.check(TokenKind::LeftBrace) {
            if is_abstract {
                return Err(
                    self.syntax_error("abstract method cannot have a body", &name_location)
                );
            }
            let block = self.parse_block()?;
            let location = block.location.clone();
            (Some(Box::new(block)), location)
        } else {
            if !is_abstract && !interface_context {
                return Err(self.syntax_error("method requires a body", &name_location));
            }
            self.consume_statement_end()?;
            (None, self.previous().location.clone())
        };

        Ok(Node::new(
            NodeKind::MethodDeclaration { name, modifiers, parameters, return_type, by_ref, body },
            SourceLocation::merge(&start, &end),
        ))
    }

    fn parse_properties(
        &mut self,
        modifiers: Vec<Modifier>,
        prop_type: Option<Node>,
        start: SourceLocation,
    ) -> ParseResult<Vec<Node>> {
        let mut nodes = Vec::new();
        loop {
            let token = self.consume(TokenKind::Variable, "property name")?;
            let name = match &token.payload {
                TokenPayload::Name { name } => name.to_string(),
                _ => token.text.trim_start_matches('$').to_string(),
            };
            let initializer = if self.eat(TokenKind::Assign) {
                Some(Box::new(self.parse_expression()?))
            } else {
                None
            };
            let end = initializer
                .as_ref()
                .map(|i| i.location.clone())
                .unwrap_or_else(|| token.location.clone());
            nodes.push(Node::new(
                NodeKind::PropertyDeclaration {
                    modifiers: modifiers.clone(),
                    prop_type: prop_type.clone().map(Box::new),
                    name,
                    initializer,
                },
                SourceLocation::merge(&start, &end),
            ));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.consume_statement_end()?;
        Ok(nodes)
    }

    /// `use A, B { A::m as x; A::m insteadof B; }`
    fn parse_trait_use(&mut self) -> ParseResult<Node> {
        let use_token = self.advance();
        let mut names = vec![self.parse_name_expression()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.parse_name_expression()?);
        }
        let mut adaptations = Vec::new();
        let end;
        if self.eat(TokenKind::LeftBrace) {
            while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
                adaptations.push(self.parse_trait_adaptation()?);
            }
            end = self.consume(TokenKind::RightBrace, "'}'")?.location;
        } else {
            self.consume_statement_end()?;
            end = names[names.len() - 1].location.clone();
        }
        Ok(Node::new(
            NodeKind::TraitUse { names, adaptations },
            SourceLocation::merge(&use_token.location, &end),
        ))
    }

    fn parse_trait_adaptation(&mut self) -> ParseResult<Node> {
        let start = self.peek().location.clone();
        let first = self.parse_name_expression()?;
        let (trait_name, method) = if self.eat(TokenKind::DoubleColon) {
            let (method, _) = self.parse_member_name()?;
            (Some(Box::new(first)), method)
        } else {
            let method = match &first.kind {
                NodeKind::NameExpression { parts, .. } => parts.join("\\"),
                _ => return Err(self.error("method name")),
            };
            (None, method)
        };

        if self.eat(TokenKind::InsteadOf) {
            let Some(trait_name) = trait_name else {
                return Err(self.syntax_error("insteadof requires a qualified Trait::method", &start));
            };
            let mut insteadof = vec![self.parse_name_expression()?];
            while self.eat(TokenKind::Comma) {
                insteadof.push(self.parse_name_expression()?);
            }
            let end = insteadof[insteadof.len() - 1].location.clone();
            self.consume_statement_end()?;
            return Ok(Node::new(
                NodeKind::TraitPrecedence { trait_name, method, insteadof },
                SourceLocation::merge(&start, &end),
            ));
        }

        self.consume(TokenKind::As, "'as' or 'insteadof'")?;
        let visibility = self
            .eat_any(&[TokenKind::Public, TokenKind::Protected, TokenKind::Private])
            .and_then(|t| modifier_for(t.kind));
        let alias = if self.check(TokenKind::Identifier) || token_is_wordlike(self.peek()) {
            let (alias, _) = self.parse_member_name()?;
            Some(alias)
        } else {
            None
        };
        if visibility.is_none() && alias.is_none() {
            return Err(self.error("visibility or alias after 'as'"));
        }
        let end = self.previous().location.clone();
        self.consume_statement_end()?;
        Ok(Node::new(
            NodeKind::TraitAlias { trait_name, method, visibility, alias },
            SourceLocation::merge(&start, &end),
        ))
    }

    fn parse_enum_case(&mut self) -> ParseResult<Node> {
        let case_token = self.advance();
        let (name, name_location) = self.parse_member_name()?;
        let value = if self.eat(TokenKind::Assign) {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        let end = value
            .as_ref()
            .map(|v| v.location.clone())
            .unwrap_or(name_location);
        self.consume_statement_end()?;
        Ok(Node::new(
            NodeKind::EnumCase { name, value },
            SourceLocation::merge(&case_token.location, &end),
        ))
    }

    // ——— Parameters ———

    /// `(params)` with optional promotion modifiers, types, by-ref,
    /// variadics, and defaults.
    pub(crate) fn parse_parameter_list(&mut self) -> ParseResult<Vec<Node>> {
        self.consume(TokenKind::LeftParen, "'('")?;
        let mut parameters = Vec::new();
        while !self.check(TokenKind::RightParen) && !self.is_at_end() {
            parameters.push(self.parse_parameter()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightParen, "')'")?;
        Ok(parameters)
    }

    fn parse_parameter(&mut self) -> ParseResult<Node> {
        while self.check(TokenKind::Attribute) {
            self.advance();
        }
        let start = self.peek().location.clone();
        let mut promoted = Vec::new();
        while let Some(token) = self.eat_any(&[
            TokenKind::Public,
            TokenKind::Protected,
            TokenKind::Private,
            TokenKind::Readonly,
        ]) {
            self.require_version(
                PhpVersion::PHP_8_0,
                "constructor property promotion",
                &token.location,
            )?;
            if let Some(modifier) = modifier_for(token.kind) {
                promoted.push(modifier);
            }
        }
        let param_type = if matches!(
            self.peek_kind(),
            TokenKind::Variable | TokenKind::Ampersand | TokenKind::Ellipsis
        ) {
            None
        } else {
            Some(Box::new(self.parse_type()?))
        };
        let by_ref = self.eat(TokenKind::Ampersand);
        let variadic = self.eat(TokenKind::Ellipsis);
        let token = self.consume(TokenKind::Variable, "parameter name")?;
        let name = match &token.payload {
            TokenPayload::Name { name } => name.to_string(),
            _ => token.text.trim_start_matches('$').to_string(),
        };
        let default = if self.eat(TokenKind::Assign) {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        let end = default
            .as_ref()
            .map(|d| d.location.clone())
            .unwrap_or_else(|| token.location.clone());
        Ok(Node::new(
            NodeKind::Parameter { name, param_type, by_ref, variadic, default, promoted },
            SourceLocation::merge(&start, &end),
        ))
    }

    // ——— Types ———

    /// Type grammar: `?T` wraps the whole type; unions and intersections are
    /// flat single-level lists.
    pub(crate) fn parse_type(&mut self) -> ParseResult<Node> {
        let start = self.peek().location.clone();
        if self.eat(TokenKind::Question) {
            let inner = self.parse_type_list()?;
            let location = SourceLocation::merge(&start, &inner.location);
            return Ok(Node::new(NodeKind::NullableType { inner: Box::new(inner) }, location));
        }
        self.parse_type_list()
    }

    fn parse_type_list(&mut self) -> ParseResult<Node> {
        let first = self.parse_type_atom()?;
        if self.check(TokenKind::Pipe) {
            let mut members = vec![first];
            while self.eat(TokenKind::Pipe) {
                members.push(self.parse_type_atom()?);
            }
            let location = SourceLocation::merge(
                &members[0].location,
                &members[members.len() - 1].location,
            );
            return Ok(Node::new(NodeKind::UnionType { members }, location));
        }
        if self.check(TokenKind::Ampersand) && self.type_atom_ahead(1) {
            let mut members = vec![first];
            while self.check(TokenKind::Ampersand) && self.type_atom_ahead(1) {
                self.advance();
                members.push(self.parse_type_atom()?);
            }
            let location = SourceLocation::merge(
                &members[0].location,
                &members[members.len() - 1].location,
            );
            return Ok(Node::new(NodeKind::IntersectionType { members }, location));
        }
        Ok(first)
    }

    fn type_atom_ahead(&self, k: usize) -> bool {
        matches!(
            self.peek_ahead(k).kind,
            TokenKind::Identifier
                | TokenKind::Backslash
                | TokenKind::Array
                | TokenKind::Callable
                | TokenKind::Static
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
        )
    }

    fn parse_type_atom(&mut self) -> ParseResult<Node> {
        match self.peek_kind() {
            TokenKind::Array => {
                let token = self.advance();
                Ok(Node::new(NodeKind::ArrayType, token.location))
            }
            TokenKind::Callable => {
                let token = self.advance();
                Ok(Node::new(NodeKind::CallableType, token.location))
            }
            TokenKind::Static | TokenKind::Null | TokenKind::True | TokenKind::False => {
                let token = self.advance();
                Ok(Node::new(
                    NodeKind::SimpleType { name: token.text.to_ascii_lowercase() },
                    token.location,
                ))
            }
            TokenKind::Identifier | TokenKind::Backslash => {
                let name = self.parse_name_expression()?;
                let NodeKind::NameExpression { parts, qualification } = &name.kind else {
                    return Err(self.error("type name"));
                };
                let mut spelled = String::new();
                if matches!(qualification, php_ast::NameQualification::Fully) {
                    spelled.push('\\');
                }
                spelled.push_str(&parts.join("\\"));
                Ok(Node::new(NodeKind::SimpleType { name: spelled }, name.location))
            }
            _ => Err(self.error("type")),
        }
    }
}
