//! Expression parsing: the precedence ladder, postfix chains, and primaries.
//!
//! The ladder runs lowest-binding first: assignment, ternary, coalesce,
//! logical, bitwise, equality, comparison, spaceship, shift, additive,
//! multiplicative, exponentiation, unary (including casts), postfix chains,
//! primary. `**`, assignment, ternary, and `??` associate rightward; the
//! other binary levels leftward.

use crate::options::PhpVersion;
use crate::parser::Parser;
use php_ast::{CastKind, IncludeKind, NameQualification, Node, NodeKind, VariableName};
use php_error::ParseResult;
use php_position_tracking::SourceLocation;
use php_token::{Quote, TokenKind, TokenPayload};

fn binary(op: &str, left: Node, right: Node) -> Node {
    let location = SourceLocation::merge(&left.location, &right.location);
    Node::new(
        NodeKind::BinaryExpression {
            operator: op.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        },
        location,
    )
}

fn logical(op: &str, left: Node, right: Node) -> Node {
    let location = SourceLocation::merge(&left.location, &right.location);
    Node::new(
        NodeKind::LogicalExpression {
            operator: op.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        },
        location,
    )
}

impl Parser {
    /// Entry point for any expression.
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node> {
        self.check_recursion()?;
        let result = self.parse_assignment();
        self.exit_recursion();
        result
    }

    /// Assignment level (right-associative).
    fn parse_assignment(&mut self) -> ParseResult<Node> {
        let left = self.parse_ternary()?;

        let kind = self.peek_kind();
        if !kind.is_assignment_op() {
            return Ok(left);
        }
        if kind == TokenKind::CoalesceAssign {
            self.require_version(PhpVersion::PHP_7_4, "'??='", &self.peek().location.clone())?;
        }
        let op_token = self.advance();
        let left = self.to_assignment_target(left)?;
        let right = self.parse_assignment()?;
        let location = SourceLocation::merge(&left.location, &right.location);
        Ok(Node::new(
            NodeKind::AssignmentExpression {
                operator: op_token.text.to_string(),
                left: Box::new(left),
                right: Box::new(right),
            },
            location,
        ))
    }

    /// Rewrite an array literal on the left of `=` into a destructuring
    /// pattern; keys are not allowed in patterns.
    fn to_assignment_target(&self, node: Node) -> ParseResult<Node> {
        match node.kind {
            NodeKind::ArrayExpression { elements } => {
                for element in &elements {
                    if let NodeKind::ArrayElement { key: Some(key), .. } = &element.kind {
                        return Err(
                            self.syntax_error("key not allowed in destructuring pattern", &key.location)
                        );
                    }
                }
                Ok(Node::new(NodeKind::ArrayPattern { elements }, node.location))
            }
            _ => Ok(node),
        }
    }

    /// Ternary level (right-associative), including short `?:`.
    fn parse_ternary(&mut self) -> ParseResult<Node> {
        let test = self.parse_coalesce()?;
        if !self.eat(TokenKind::Question) {
            return Ok(test);
        }
        let consequent = if self.eat(TokenKind::Colon) {
            None
        } else {
            let value = self.parse_ternary()?;
            self.consume(TokenKind::Colon, "':'")?;
            Some(Box::new(value))
        };
        let alternate = self.parse_ternary()?;
        let location = SourceLocation::merge(&test.location, &alternate.location);
        Ok(Node::new(
            NodeKind::ConditionalExpression {
                test: Box::new(test),
                consequent,
                alternate: Box::new(alternate),
            },
            location,
        ))
    }

    /// `??` level, right-associative via recursion.
    fn parse_coalesce(&mut self) -> ParseResult<Node> {
        let left = self.parse_logical_or()?;
        if !self.eat(TokenKind::Coalesce) {
            return Ok(left);
        }
        let right = self.parse_coalesce()?;
        Ok(binary("??", left, right))
    }

    fn parse_logical_or(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_logical_and()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::BooleanOr => "||",
                TokenKind::Or => "or",
                _ => break,
            };
            self.advance();
            let right = self.parse_logical_and()?;
            expr = logical(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_logical_and(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_bitwise_or()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::BooleanAnd => "&&",
                TokenKind::And => "and",
                _ => break,
            };
            self.advance();
            let right = self.parse_bitwise_or()?;
            expr = logical(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_bitwise_or(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_bitwise_xor()?;
        while self.eat(TokenKind::Pipe) {
            let right = self.parse_bitwise_xor()?;
            expr = binary("|", expr, right);
        }
        Ok(expr)
    }

    /// `^` (binary) and the word operator `xor` (logical) share this level.
    fn parse_bitwise_xor(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_bitwise_and()?;
        loop {
            if self.eat(TokenKind::Caret) {
                let right = self.parse_bitwise_and()?;
                expr = binary("^", expr, right);
            } else if self.eat(TokenKind::Xor) {
                let right = self.parse_bitwise_and()?;
                expr = logical("xor", expr, right);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_bitwise_and(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_equality()?;
        while self.check(TokenKind::Ampersand)
            && self.peek_ahead(1).kind != TokenKind::Ampersand
        {
            self.advance();
            let right = self.parse_equality()?;
            expr = binary("&", expr, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Equal => "==",
                TokenKind::NotEqual => "!=",
                TokenKind::Identical => "===",
                TokenKind::NotIdentical => "!==",
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_spaceship()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Less => "<",
                TokenKind::Greater => ">",
                TokenKind::LessEqual => "<=",
                TokenKind::GreaterEqual => ">=",
                TokenKind::InstanceOf => "instanceof",
                _ => break,
            };
            self.advance();
            let right = self.parse_spaceship()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_spaceship(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_shift()?;
        while self.eat(TokenKind::Spaceship) {
            let right = self.parse_shift()?;
            let location = SourceLocation::merge(&expr.location, &right.location);
            expr = Node::new(
                NodeKind::SpaceshipExpression { left: Box::new(expr), right: Box::new(right) },
                location,
            );
        }
        Ok(expr)
    }

    fn parse_shift(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::ShiftLeft => "<<",
                TokenKind::ShiftRight => ">>",
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => "+",
                TokenKind::Minus => "-",
                TokenKind::Dot => ".",
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_exponent()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => "*",
                TokenKind::Slash => "/",
                TokenKind::Percent => "%",
                _ => break,
            };
            self.advance();
            let right = self.parse_exponent()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    /// `**` (right-associative).
    fn parse_exponent(&mut self) -> ParseResult<Node> {
        let left = self.parse_unary()?;
        if !self.eat(TokenKind::Power) {
            return Ok(left);
        }
        let right = self.parse_exponent()?;
        Ok(binary("**", left, right))
    }

    fn parse_unary(&mut self) -> ParseResult<Node> {
        self.check_recursion()?;
        let result = self.parse_unary_inner();
        self.exit_recursion();
        result
    }

    fn parse_unary_inner(&mut self) -> ParseResult<Node> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Bang | TokenKind::Plus | TokenKind::Minus | TokenKind::Tilde => {
                self.advance();
                let operand = self.parse_unary()?;
                let location = SourceLocation::merge(&token.location, &operand.location);
                Ok(Node::new(
                    NodeKind::UnaryExpression {
                        operator: token.text.to_string(),
                        operand: Box::new(operand),
                    },
                    location,
                ))
            }
            TokenKind::At => {
                self.advance();
                let expression = self.parse_unary()?;
                let location = SourceLocation::merge(&token.location, &expression.location);
                Ok(Node::new(
                    NodeKind::ErrorControlExpression { expression: Box::new(expression) },
                    location,
                ))
            }
            TokenKind::Increment | TokenKind::Decrement => {
                self.advance();
                let argument = self.parse_unary()?;
                let location = SourceLocation::merge(&token.location, &argument.location);
                Ok(Node::new(
                    NodeKind::UpdateExpression {
                        operator: token.text.to_string(),
                        prefix: true,
                        argument: Box::new(argument),
                    },
                    location,
                ))
            }
            TokenKind::LeftParen => match self.try_parse_cast()? {
                Some(cast) => Ok(cast),
                None => self.parse_postfix(),
            },
            _ => self.parse_postfix(),
        }
    }

    /// Speculative cast detection: `( castname )` directly followed by a
    /// unary expression. On mismatch the cursor is restored and the paren
    /// parses as grouping.
    fn try_parse_cast(&mut self) -> ParseResult<Option<Node>> {
        let saved = self.save();
        let open = self.advance(); // (
        let cast_kind = match self.peek_kind() {
            TokenKind::Identifier => {
                self.peek().name().and_then(|n| CastKind::from_name(&n.to_ascii_lowercase()))
            }
            TokenKind::Array => Some(CastKind::Array),
            TokenKind::Callable => Some(CastKind::Callable),
            _ => None,
        };
        let Some(cast_type) = cast_kind else {
            self.restore(saved);
            return Ok(None);
        };
        self.advance(); // cast name
        if !self.eat(TokenKind::RightParen) {
            self.restore(saved);
            return Ok(None);
        }
        let operand = self.parse_unary()?;
        let location = SourceLocation::merge(&open.location, &operand.location);
        Ok(Some(Node::new(
            NodeKind::CastExpression { cast_type, operand: Box::new(operand) },
            location,
        )))
    }

    /// Postfix chains: `++`/`--`, subscripts, member access, static access,
    /// calls. Left-associative by iteration.
    fn parse_postfix(&mut self) -> ParseResult<Node> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::Increment | TokenKind::Decrement => {
                    let op = self.advance();
                    let location = SourceLocation::merge(&expr.location, &op.location);
                    expr = Node::new(
                        NodeKind::UpdateExpression {
                            operator: op.text.to_string(),
                            prefix: false,
                            argument: Box::new(expr),
                        },
                        location,
                    );
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let property = if self.check(TokenKind::RightBracket) {
                        // push syntax `$a[] = ...`
                        Node::new(NodeKind::NullLiteral, self.peek().location.clone())
                    } else {
                        self.parse_expression()?
                    };
                    let close = self.consume(TokenKind::RightBracket, "']'")?;
                    let location = SourceLocation::merge(&expr.location, &close.location);
                    expr = Node::new(
                        NodeKind::MemberExpression {
                            object: Box::new(expr),
                            property: Box::new(property),
                            computed: true,
                            nullsafe: false,
                        },
                        location,
                    );
                }
                TokenKind::Arrow | TokenKind::NullsafeArrow => {
                    let op = self.advance();
                    let nullsafe = op.kind == TokenKind::NullsafeArrow;
                    if nullsafe {
                        self.require_version(PhpVersion::PHP_8_0, "'?->'", &op.location)?;
                    }
                    let (property, computed) = self.parse_member_selector()?;
                    let location = SourceLocation::merge(&expr.location, &property.location);
                    expr = Node::new(
                        NodeKind::MemberExpression {
                            object: Box::new(expr),
                            property: Box::new(property),
                            computed,
                            nullsafe,
                        },
                        location,
                    );
                }
                TokenKind::DoubleColon => {
                    self.advance();
                    let (member, computed) = self.parse_static_selector()?;
                    let location = SourceLocation::merge(&expr.location, &member.location);
                    expr = Node::new(
                        NodeKind::StaticMemberExpression {
                            class: Box::new(expr),
                            member: Box::new(member),
                            computed,
                        },
                        location,
                    );
                }
                TokenKind::LeftParen => {
                    let arguments = self.parse_arguments()?;
                    let close = self.previous().location.clone();
                    let location = SourceLocation::merge(&expr.location, &close);
                    expr = Node::new(
                        NodeKind::CallExpression { callee: Box::new(expr), arguments },
                        location,
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Selector after `->`/`?->`: a member name, a variable, or `{expr}`.
    fn parse_member_selector(&mut self) -> ParseResult<(Node, bool)> {
        if self.check(TokenKind::Variable) {
            return Ok((self.parse_variable()?, false));
        }
        if self.eat(TokenKind::LeftBrace) {
            let expr = self.parse_expression()?;
            self.consume(TokenKind::RightBrace, "'}'")?;
            return Ok((expr, true));
        }
        let (name, location) = self.parse_member_name()?;
        Ok((
            Node::new(
                NodeKind::NameExpression {
                    parts: vec![name],
                    qualification: NameQualification::Unqualified,
                },
                location,
            ),
            false,
        ))
    }

    /// Selector after `::`: `$var`, a member name (including `class`), or
    /// `{expr}`.
    fn parse_static_selector(&mut self) -> ParseResult<(Node, bool)> {
        if self.check(TokenKind::Variable) {
            return Ok((self.parse_variable()?, false));
        }
        if self.eat(TokenKind::LeftBrace) {
            let expr = self.parse_expression()?;
            self.consume(TokenKind::RightBrace, "'}'")?;
            return Ok((expr, true));
        }
        let (name, location) = self.parse_member_name()?;
        Ok((
            Node::new(
                NodeKind::NameExpression {
                    parts: vec![name],
                    qualification: NameQualification::Unqualified,
                },
                location,
            ),
            false,
        ))
    }

    /// Argument list including named arguments (speculative) and spreads.
    pub(crate) fn parse_arguments(&mut self) -> ParseResult<Vec<Node>> {
        self.consume(TokenKind::LeftParen, "'('")?;
        let mut arguments = Vec::new();
        while !self.check(TokenKind::RightParen) && !self.is_at_end() {
            arguments.push(self.parse_argument()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightParen, "')'")?;
        Ok(arguments)
    }

    fn parse_argument(&mut self) -> ParseResult<Node> {
        let start = self.peek().location.clone();
        if self.eat(TokenKind::Ellipsis) {
            let value = self.parse_expression()?;
            let location = SourceLocation::merge(&start, &value.location);
            return Ok(Node::new(
                NodeKind::Argument { name: None, value: Box::new(value), spread: true },
                location,
            ));
        }
        // Named argument: identifier ':' — probe and restore on mismatch
        if self.check(TokenKind::Identifier) {
            let saved = self.save();
            let token = self.advance();
            if self.check(TokenKind::Colon) {
                self.require_version(PhpVersion::PHP_8_0, "named arguments", &token.location)?;
                self.advance(); // :
                let name = token.name().unwrap_or(token.text.as_ref()).to_string();
                let value = self.parse_expression()?;
                let location = SourceLocation::merge(&token.location, &value.location);
                return Ok(Node::new(
                    NodeKind::Argument { name: Some(name), value: Box::new(value), spread: false },
                    location,
                ));
            }
            self.restore(saved);
        }
        let value = self.parse_expression()?;
        let location = value.location.clone();
        Ok(Node::new(
            NodeKind::Argument { name: None, value: Box::new(value), spread: false },
            location,
        ))
    }

    // ——— Primary expressions ———

    fn parse_primary(&mut self) -> ParseResult<Node> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                let is_float = matches!(token.payload, TokenPayload::Number { is_float: true });
                Ok(Node::new(
                    NodeKind::NumberLiteral { raw: token.text.to_string(), is_float },
                    token.location,
                ))
            }
            TokenKind::String => {
                self.advance();
                let (value, quote) = match &token.payload {
                    TokenPayload::Str { value, quote } => (value.to_string(), *quote),
                    _ => (token.text.to_string(), Quote::Double),
                };
                Ok(Node::new(
                    NodeKind::StringLiteral { value, raw: token.text.to_string(), quote },
                    token.location,
                ))
            }
            TokenKind::StringStart => self.parse_template_string(),
            TokenKind::StartHeredoc => self.parse_heredoc_literal(),
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(Node::new(
                    NodeKind::BooleanLiteral { value: token.kind == TokenKind::True },
                    token.location,
                ))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Node::new(NodeKind::NullLiteral, token.location))
            }
            TokenKind::Variable => self.parse_variable(),
            TokenKind::Dollar => self.parse_variable_variable(),
            TokenKind::LeftBracket => self.parse_array_literal(TokenKind::RightBracket),
            TokenKind::Array => {
                if self.peek_ahead(1).kind == TokenKind::LeftParen {
                    self.advance(); // array
                    let mut node = self.parse_array_literal(TokenKind::RightParen)?;
                    node.location = SourceLocation::merge(&token.location, &node.location);
                    Ok(node)
                } else {
                    self.advance();
                    Ok(Node::new(
                        NodeKind::NameExpression {
                            parts: vec!["array".to_string()],
                            qualification: NameQualification::Unqualified,
                        },
                        token.location,
                    ))
                }
            }
            TokenKind::List => self.parse_list_expression(),
            TokenKind::Function => self.parse_closure(false, token.location),
            TokenKind::Fn => self.parse_arrow_function(false, token.location),
            TokenKind::Static => {
                match self.peek_ahead(1).kind {
                    TokenKind::Function => {
                        self.advance(); // static
                        self.parse_closure(true, token.location)
                    }
                    TokenKind::Fn => {
                        self.advance();
                        self.parse_arrow_function(true, token.location)
                    }
                    _ => self.parse_name_expression(),
                }
            }
            TokenKind::New => self.parse_new(),
            TokenKind::Clone => {
                self.advance();
                let argument = self.parse_unary()?;
                let location = SourceLocation::merge(&token.location, &argument.location);
                Ok(Node::new(
                    NodeKind::CloneExpression { argument: Box::new(argument) },
                    location,
                ))
            }
            TokenKind::Yield => self.parse_yield(),
            TokenKind::Match => self.parse_match(),
            TokenKind::Isset => {
                self.advance();
                let arguments = self.parse_paren_expression_list()?;
                let end = self.previous().location.clone();
                Ok(Node::new(
                    NodeKind::IssetExpression { arguments },
                    SourceLocation::merge(&token.location, &end),
                ))
            }
            TokenKind::Empty => {
                self.advance();
                self.consume(TokenKind::LeftParen, "'('")?;
                let argument = self.parse_expression()?;
                let close = self.consume(TokenKind::RightParen, "')'")?;
                Ok(Node::new(
                    NodeKind::EmptyExpression { argument: Box::new(argument) },
                    SourceLocation::merge(&token.location, &close.location),
                ))
            }
            TokenKind::Eval => {
                self.advance();
                self.consume(TokenKind::LeftParen, "'('")?;
                let argument = self.parse_expression()?;
                let close = self.consume(TokenKind::RightParen, "')'")?;
                Ok(Node::new(
                    NodeKind::EvalExpression { argument: Box::new(argument) },
                    SourceLocation::merge(&token.location, &close.location),
                ))
            }
            TokenKind::Exit => {
                self.advance();
                let mut end = token.location.clone();
                let argument = if self.eat(TokenKind::LeftParen) {
                    let arg = if self.check(TokenKind::RightParen) {
                        None
                    } else {
                        Some(Box::new(self.parse_expression()?))
                    };
                    end = self.consume(TokenKind::RightParen, "')'")?.location;
                    arg
                } else {
                    None
                };
                Ok(Node::new(
                    NodeKind::ExitExpression { argument },
                    SourceLocation::merge(&token.location, &end),
                ))
            }
            TokenKind::Print => {
                self.advance();
                if self.check(TokenKind::LeftParen) {
                    // `print(...)` parses as a call on the name `print`
                    let callee = Node::new(
                        NodeKind::NameExpression {
                            parts: vec!["print".to_string()],
                            qualification: NameQualification::Unqualified,
                        },
                        token.location.clone(),
                    );
                    let arguments = self.parse_arguments()?;
                    let end = self.previous().location.clone();
                    return Ok(Node::new(
                        NodeKind::CallExpression { callee: Box::new(callee), arguments },
                        SourceLocation::merge(&token.location, &end),
                    ));
                }
                let argument = self.parse_expression()?;
                let location = SourceLocation::merge(&token.location, &argument.location);
                Ok(Node::new(NodeKind::PrintExpression { argument: Box::new(argument) }, location))
            }
            TokenKind::Include
            | TokenKind::IncludeOnce
            | TokenKind::Require
            | TokenKind::RequireOnce => {
                self.advance();
                let kind = match token.kind {
                    TokenKind::Include => IncludeKind::Include,
                    TokenKind::IncludeOnce => IncludeKind::IncludeOnce,
                    TokenKind::Require => IncludeKind::Require,
                    _ => IncludeKind::RequireOnce,
                };
                let argument = self.parse_expression()?;
                let location = SourceLocation::merge(&token.location, &argument.location);
                Ok(Node::new(
                    NodeKind::IncludeExpression { kind, argument: Box::new(argument) },
                    location,
                ))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(TokenKind::RightParen, "')'")?;
                Ok(expr)
            }
            TokenKind::Identifier | TokenKind::Backslash => self.parse_name_expression(),
            TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Trait
            | TokenKind::Abstract
            | TokenKind::Final => self.parse_name_expression(),
            kind if kind.is_magic_constant() => self.parse_name_expression(),
            _ => Err(self.error("expression")),
        }
    }

    /// `$` before `{expr}`, `$var`, or another `$`: variable-variables.
    fn parse_variable_variable(&mut self) -> ParseResult<Node> {
        let dollar = self.consume(TokenKind::Dollar, "'$'")?;
        let inner = if self.eat(TokenKind::LeftBrace) {
            let expr = self.parse_expression()?;
            self.consume(TokenKind::RightBrace, "'}'")?;
            expr
        } else if self.check(TokenKind::Variable) {
            self.parse_variable()?
        } else if self.check(TokenKind::Dollar) {
            self.parse_variable_variable()?
        } else {
            return Err(self.error("variable name after '$'"));
        };
        let location = SourceLocation::merge(&dollar.location, &inner.location);
        Ok(Node::new(
            NodeKind::VariableExpression { name: VariableName::Expr(Box::new(inner)) },
            location,
        ))
    }

    /// `[...]` or the inner of `array(...)`; elements may be keyed, spread,
    /// or by-reference.
    fn parse_array_literal(&mut self, closing: TokenKind) -> ParseResult<Node> {
        let open = self.advance(); // [ or (
        let mut elements = Vec::new();
        while !self.check(closing) && !self.is_at_end() {
            elements.push(self.parse_array_element()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.consume(closing, "closing array delimiter")?;
        Ok(Node::new(
            NodeKind::ArrayExpression { elements },
            SourceLocation::merge(&open.location, &close.location),
        ))
    }

    fn parse_array_element(&mut self) -> ParseResult<Node> {
        let start = self.peek().location.clone();
        if self.eat(TokenKind::Ellipsis) {
            let value = self.parse_expression()?;
            let location = SourceLocation::merge(&start, &value.location);
            return Ok(Node::new(
                NodeKind::ArrayElement {
                    key: None,
                    value: Box::new(value),
                    spread: true,
                    by_ref: false,
                },
                location,
            ));
        }
        let mut by_ref = self.eat(TokenKind::Ampersand);
        let first = self.parse_expression()?;
        let (key, value, end_by_ref) = if self.eat(TokenKind::DoubleArrow) {
            let value_by_ref = self.eat(TokenKind::Ampersand);
            let value = self.parse_expression()?;
            (Some(Box::new(first)), value, value_by_ref)
        } else {
            (None, first, by_ref)
        };
        if key.is_some() {
            by_ref = end_by_ref;
        }
        let location = SourceLocation::merge(&start, &value.location);
        Ok(Node::new(
            NodeKind::ArrayElement { key, value: Box::new(value), spread: false, by_ref },
            location,
        ))
    }

    fn parse_list_expression(&mut self) -> ParseResult<Node> {
        let start = self.advance(); // list
        self.consume(TokenKind::LeftParen, "'('")?;
        let mut elements = Vec::new();
        while !self.check(TokenKind::RightParen) && !self.is_at_end() {
            elements.push(self.parse_array_element()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.consume(TokenKind::RightParen, "')'")?;
        Ok(Node::new(
            NodeKind::ListExpression { elements },
            SourceLocation::merge(&start.location, &close.location),
        ))
    }

    fn parse_paren_expression_list(&mut self) -> ParseResult<Vec<Node>> {
        self.consume(TokenKind::LeftParen, "'('")?;
        let mut expressions = Vec::new();
        while !self.check(TokenKind::RightParen) && !self.is_at_end() {
            expressions.push(self.parse_expression()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightParen, "')'")?;
        Ok(expressions)
    }

    /// `function [&] (params) [use (...)] [: type] { body }`
    fn parse_closure(&mut self, is_static: bool, start: SourceLocation) -> ParseResult<Node> {
        self.advance(); // function
        let by_ref = self.eat(TokenKind::Ampersand);
        let parameters = self.parse_parameter_list()?;
        let mut uses = Vec::new();
        if self.eat(TokenKind::Use) {
            self.consume(TokenKind::LeftParen, "'('")?;
            while !self.check(TokenKind::RightParen) && !self.is_at_end() {
                let use_start = self.peek().location.clone();
                let by_reference = self.eat(TokenKind::Ampersand);
                let variable = self.parse_variable()?;
                let location = SourceLocation::merge(&use_start, &variable.location);
                uses.push(Node::new(
                    NodeKind::ClosureUse { variable: Box::new(variable), by_reference },
                    location,
                ));
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::RightParen, "')'")?;
        }
        let return_type =
            if self.eat(TokenKind::Colon) { Some(Box::new(self.parse_type()?)) } else { None };
        let body = self.parse_block()?;
        let location = SourceLocation::merge(&start, &body.location);
        Ok(Node::new(
            NodeKind::FunctionExpression {
                parameters,
                uses,
                return_type,
                by_ref,
                is_static,
                body: Box::new(body),
            },
            location,
        ))
    }

    /// `fn [&] (params) [: type] => expr`
    fn parse_arrow_function(&mut self, is_static: bool, start: SourceLocation) -> ParseResult<Node> {
        let fn_token = self.advance(); // fn
        self.require_version(PhpVersion::PHP_7_4, "arrow functions", &fn_token.location)?;
        let by_ref = self.eat(TokenKind::Ampersand);
        let parameters = self.parse_parameter_list()?;
        let return_type =
            if self.eat(TokenKind::Colon) { Some(Box::new(self.parse_type()?)) } else { None };
        self.consume(TokenKind::DoubleArrow, "'=>'")?;
        let body = self.parse_expression()?;
        let location = SourceLocation::merge(&start, &body.location);
        Ok(Node::new(
            NodeKind::ArrowFunctionExpression {
                parameters,
                return_type,
                by_ref,
                is_static,
                body: Box::new(body),
            },
            location,
        ))
    }

    /// `new Class(args)`, `new $var`, `new class { ... }`.
    fn parse_new(&mut self) -> ParseResult<Node> {
        let new_token = self.advance(); // new
        if self.check(TokenKind::Class) {
            let anon = self.parse_anonymous_class(&new_token.location)?;
            let location = anon.location.clone();
            return Ok(Node::new(
                NodeKind::NewExpression { callee: Box::new(anon), arguments: Vec::new() },
                location,
            ));
        }
        let callee = match self.peek_kind() {
            TokenKind::Variable => self.parse_variable()?,
            TokenKind::Dollar => self.parse_variable_variable()?,
            _ => self.parse_name_expression()?,
        };
        // allow `new A\B::class`-free postfix like static access on the name
        let arguments = if self.check(TokenKind::LeftParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        let end = self.previous().location.clone();
        Ok(Node::new(
            NodeKind::NewExpression { callee: Box::new(callee), arguments },
            SourceLocation::merge(&new_token.location, &end),
        ))
    }

    /// `class [(args)] [extends B] [implements I, ...] { members }` after
    /// `new`.
    fn parse_anonymous_class(&mut self, start: &SourceLocation) -> ParseResult<Node> {
        self.advance(); // class
        let arguments = if self.check(TokenKind::LeftParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
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
            NodeKind::AnonymousClass { arguments, super_class, interfaces, body },
            SourceLocation::merge(start, &end),
        ))
    }

    /// `yield`, `yield expr`, `yield key => value`, `yield from expr`.
    fn parse_yield(&mut self) -> ParseResult<Node> {
        let yield_token = self.advance();
        // `yield from` is spelled with a contextual identifier
        if self.check(TokenKind::Identifier)
            && self.peek().text.eq_ignore_ascii_case("from")
        {
            self.advance();
            let argument = self.parse_expression()?;
            let location = SourceLocation::merge(&yield_token.location, &argument.location);
            return Ok(Node::new(
                NodeKind::YieldExpression {
                    key: None,
                    argument: Some(Box::new(argument)),
                    delegate: true,
                },
                location,
            ));
        }
        if self.yield_has_no_operand() {
            return Ok(Node::new(
                NodeKind::YieldExpression { key: None, argument: None, delegate: false },
                yield_token.location,
            ));
        }
        let first = self.parse_expression()?;
        if self.eat(TokenKind::DoubleArrow) {
            let value = self.parse_expression()?;
            let location = SourceLocation::merge(&yield_token.location, &value.location);
            return Ok(Node::new(
                NodeKind::YieldExpression {
                    key: Some(Box::new(first)),
                    argument: Some(Box::new(value)),
                    delegate: false,
                },
                location,
            ));
        }
        let location = SourceLocation::merge(&yield_token.location, &first.location);
        Ok(Node::new(
            NodeKind::YieldExpression {
                key: None,
                argument: Some(Box::new(first)),
                delegate: false,
            },
            location,
        ))
    }

    fn yield_has_no_operand(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Semicolon
                | TokenKind::RightParen
                | TokenKind::RightBracket
                | TokenKind::RightBrace
                | TokenKind::Comma
                | TokenKind::CloseTag
                | TokenKind::Eof
        )
    }

    /// `match (expr) { conds => expr, default => expr }`
    fn parse_match(&mut self) -> ParseResult<Node> {
        let match_token = self.advance();
        self.require_version(PhpVersion::PHP_8_0, "match expressions", &match_token.location)?;
        self.consume(TokenKind::LeftParen, "'('")?;
        let discriminant = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "')'")?;
        self.consume(TokenKind::LeftBrace, "'{'")?;
        let mut arms = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            arms.push(self.parse_match_arm()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.consume(TokenKind::RightBrace, "'}'")?;
        Ok(Node::new(
            NodeKind::MatchExpression { discriminant: Box::new(discriminant), arms },
            SourceLocation::merge(&match_token.location, &close.location),
        ))
    }

    fn parse_match_arm(&mut self) -> ParseResult<Node> {
        let start = self.peek().location.clone();
        let conditions = if self.eat(TokenKind::Default) {
            None
        } else {
            let mut conditions = vec![self.parse_expression()?];
            while self.eat(TokenKind::Comma) {
                if self.check(TokenKind::DoubleArrow) {
                    break;
                }
                conditions.push(self.parse_expression()?);
            }
            Some(conditions)
        };
        self.consume(TokenKind::DoubleArrow, "'=>'")?;
        let body = self.parse_expression()?;
        let location = SourceLocation::merge(&start, &body.location);
        Ok(Node::new(NodeKind::MatchArm { conditions, body: Box::new(body) }, location))
    }

    /// Pre-split interpolated string from token-level callers:
    /// `StringStart (StringMiddle | Variable | Dollar{...})* StringEnd`.
    fn parse_template_string(&mut self) -> ParseResult<Node> {
        let open = self.advance(); // StringStart
        let mut parts = Vec::new();
        if let TokenPayload::Str { value, .. } = &open.payload {
            if !value.is_empty() {
                parts.push(Node::new(
                    NodeKind::TemplateElement { value: value.to_string() },
                    open.location.clone(),
                ));
            }
        }
        loop {
            match self.peek_kind() {
                TokenKind::StringMiddle | TokenKind::EncapsedAndWhitespace => {
                    let token = self.advance();
                    let value = match &token.payload {
                        TokenPayload::Str { value, .. } => value.to_string(),
                        _ => token.text.to_string(),
                    };
                    parts.push(Node::new(NodeKind::TemplateElement { value }, token.location));
                }
                TokenKind::Variable => parts.push(self.parse_variable()?),
                TokenKind::Dollar => parts.push(self.parse_variable_variable()?),
                TokenKind::StringEnd => break,
                _ => return Err(self.error("string part")),
            }
        }
        let close = self.advance(); // StringEnd
        if let TokenPayload::Str { value, .. } = &close.payload {
            if !value.is_empty() {
                parts.push(Node::new(
                    NodeKind::TemplateElement { value: value.to_string() },
                    close.location.clone(),
                ));
            }
        }
        Ok(Node::new(
            NodeKind::TemplateString { parts },
            SourceLocation::merge(&open.location, &close.location),
        ))
    }

    /// `<<<LABEL ... LABEL` parsed from its token triplet into an opaque
    /// string literal (heredoc bodies are not interpolated at this layer).
    fn parse_heredoc_literal(&mut self) -> ParseResult<Node> {
        let open = self.advance(); // StartHeredoc
        let mut value = String::new();
        let mut quote = if open.text.contains('\'') { Quote::Single } else { Quote::Double };
        let mut raw = open.text.to_string();
        while self.check(TokenKind::EncapsedAndWhitespace) {
            let body = self.advance();
            raw.push_str(&body.text);
            match &body.payload {
                TokenPayload::Str { value: v, quote: q } => {
                    value.push_str(v);
                    quote = *q;
                }
                _ => value.push_str(&body.text),
            }
        }
        let close = self.consume(TokenKind::EndHeredoc, "heredoc terminator")?;
        raw.push_str(&close.text);
        Ok(Node::new(
            NodeKind::StringLiteral { value, raw, quote },
            SourceLocation::merge(&open.location, &close.location),
        ))
    }
}
