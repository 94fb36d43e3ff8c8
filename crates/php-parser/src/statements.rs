//! Statement parsing: control structures, try/catch, declare, labels.

use crate::parser::{inline_html_node, Parser};
use php_ast::{Node, NodeKind};
use php_error::ParseResult;
use php_position_tracking::SourceLocation;
use php_token::TokenKind;

impl Parser {
    /// Parse one statement, dispatching on the leading token.
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Node> {
        self.check_recursion()?;
        let result = self.parse_statement_inner();
        self.exit_recursion();
        result
    }

    fn parse_statement_inner(&mut self) -> ParseResult<Node> {
        match self.peek_kind() {
            TokenKind::LeftBrace => self.parse_block(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Foreach => self.parse_foreach(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Break => self.parse_break_continue(true),
            TokenKind::Continue => self.parse_break_continue(false),
            TokenKind::Return => self.parse_return(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Echo => self.parse_echo(),
            TokenKind::Global => self.parse_global(),
            TokenKind::Static if self.peek_ahead(1).kind == TokenKind::Variable => {
                self.parse_static_statement()
            }
            TokenKind::Unset => self.parse_unset(),
            TokenKind::Goto => self.parse_goto(),
            TokenKind::Declare => self.parse_declare(),
            TokenKind::InlineHtml => {
                let token = self.advance();
                Ok(inline_html_node(&token))
            }
            TokenKind::Semicolon => {
                let token = self.advance();
                Ok(Node::new(NodeKind::BlockStatement { statements: Vec::new() }, token.location))
            }
            TokenKind::Identifier if self.peek_ahead(1).kind == TokenKind::Colon => {
                self.parse_labeled()
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// `{ statements }`
    pub(crate) fn parse_block(&mut self) -> ParseResult<Node> {
        let open = self.consume(TokenKind::LeftBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if self.weave_tags(&mut statements) {
                continue;
            }
            statements.push(self.parse_declaration()?);
        }
        let close = self.consume(TokenKind::RightBrace, "'}'")?;
        Ok(Node::new(
            NodeKind::BlockStatement { statements },
            SourceLocation::merge(&open.location, &close.location),
        ))
    }

    /// `if (cond) stmt [elseif (cond) stmt]* [else stmt]`
    fn parse_if(&mut self) -> ParseResult<Node> {
        let if_token = self.advance();
        self.consume(TokenKind::LeftParen, "'('")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "')'")?;
        let consequent = self.parse_statement()?;
        let mut end = consequent.location.clone();

        let mut elseifs = Vec::new();
        while self.check(TokenKind::ElseIf) {
            let clause_start = self.advance().location;
            self.consume(TokenKind::LeftParen, "'('")?;
            let clause_condition = self.parse_expression()?;
            self.consume(TokenKind::RightParen, "')'")?;
            let clause_body = self.parse_statement()?;
            end = clause_body.location.clone();
            let location = SourceLocation::merge(&clause_start, &clause_body.location);
            elseifs.push(Node::new(
                NodeKind::ElseIfClause {
                    condition: Box::new(clause_condition),
                    consequent: Box::new(clause_body),
                },
                location,
            ));
        }

        let alternate = if self.eat(TokenKind::Else) {
            let body = self.parse_statement()?;
            end = body.location.clone();
            Some(Box::new(body))
        } else {
            None
        };

        Ok(Node::new(
            NodeKind::IfStatement {
                condition: Box::new(condition),
                consequent: Box::new(consequent),
                elseifs,
                alternate,
            },
            SourceLocation::merge(&if_token.location, &end),
        ))
    }

    fn parse_while(&mut self) -> ParseResult<Node> {
        let while_token = self.advance();
        self.consume(TokenKind::LeftParen, "'('")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "')'")?;
        let body = self.parse_statement()?;
        let location = SourceLocation::merge(&while_token.location, &body.location);
        Ok(Node::new(
            NodeKind::WhileStatement { condition: Box::new(condition), body: Box::new(body) },
            location,
        ))
    }

    fn parse_do_while(&mut self) -> ParseResult<Node> {
        let do_token = self.advance();
        let body = self.parse_statement()?;
        self.consume(TokenKind::While, "'while'")?;
        self.consume(TokenKind::LeftParen, "'('")?;
        let condition = self.parse_expression()?;
        let close = self.consume(TokenKind::RightParen, "')'")?;
        self.consume_statement_end()?;
        Ok(Node::new(
            NodeKind::DoWhileStatement { body: Box::new(body), condition: Box::new(condition) },
            SourceLocation::merge(&do_token.location, &close.location),
        ))
    }

    /// `for (init; test; update) stmt` — multi-expression sections collapse
    /// into a sequence expression.
    fn parse_for(&mut self) -> ParseResult<Node> {
        let for_token = self.advance();
        self.consume(TokenKind::LeftParen, "'('")?;
        let init = self.parse_for_section(TokenKind::Semicolon)?;
        self.consume(TokenKind::Semicolon, "';'")?;
        let test = self.parse_for_section(TokenKind::Semicolon)?;
        self.consume(TokenKind::Semicolon, "';'")?;
        let update = self.parse_for_section(TokenKind::RightParen)?;
        self.consume(TokenKind::RightParen, "')'")?;
        let body = self.parse_statement()?;
        let location = SourceLocation::merge(&for_token.location, &body.location);
        Ok(Node::new(
            NodeKind::ForStatement {
                init: init.map(Box::new),
                test: test.map(Box::new),
                update: update.map(Box::new),
                body: Box::new(body),
            },
            location,
        ))
    }

    fn parse_for_section(&mut self, terminator: TokenKind) -> ParseResult<Option<Node>> {
        if self.check(terminator) {
            return Ok(None);
        }
        let mut expressions = vec![self.parse_expression()?];
        while self.eat(TokenKind::Comma) {
            expressions.push(self.parse_expression()?);
        }
        if expressions.len() == 1 {
            return Ok(expressions.pop());
        }
        let location = SourceLocation::merge(
            &expressions[0].location,
            &expressions[expressions.len() - 1].location,
        );
        Ok(Some(Node::new(NodeKind::SequenceExpression { expressions }, location)))
    }

    /// `foreach (subject as [$k =>] [&]$v) stmt`
    fn parse_foreach(&mut self) -> ParseResult<Node> {
        let foreach_token = self.advance();
        self.consume(TokenKind::LeftParen, "'('")?;
        let subject = self.parse_expression()?;
        self.consume(TokenKind::As, "'as'")?;

        let first_by_ref = self.eat(TokenKind::Ampersand);
        if !self.foreach_target_ahead() {
            return Err(self.error("variable in foreach"));
        }
        let first = self.parse_expression()?;

        let (key, by_ref, value) = if self.eat(TokenKind::DoubleArrow) {
            let value_by_ref = self.eat(TokenKind::Ampersand);
            if !self.foreach_target_ahead() {
                return Err(self.error("variable in foreach"));
            }
            let value = self.parse_expression()?;
            (Some(Box::new(first)), value_by_ref, value)
        } else {
            (None, first_by_ref, first)
        };

        self.consume(TokenKind::RightParen, "')'")?;
        let body = self.parse_statement()?;
        let location = SourceLocation::merge(&foreach_token.location, &body.location);
        Ok(Node::new(
            NodeKind::ForeachStatement {
                subject: Box::new(subject),
                key,
                by_ref,
                value: Box::new(value),
                body: Box::new(body),
            },
            location,
        ))
    }

    fn foreach_target_ahead(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Variable | TokenKind::Dollar | TokenKind::List | TokenKind::LeftBracket
        )
    }

    /// `switch (expr) { case ...: ... default: ... }`
    fn parse_switch(&mut self) -> ParseResult<Node> {
        let switch_token = self.advance();
        self.consume(TokenKind::LeftParen, "'('")?;
        let discriminant = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "')'")?;
        self.consume(TokenKind::LeftBrace, "'{'")?;

        let mut cases = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            cases.push(self.parse_switch_case()?);
        }
        let close = self.consume(TokenKind::RightBrace, "'}'")?;
        Ok(Node::new(
            NodeKind::SwitchStatement { discriminant: Box::new(discriminant), cases },
            SourceLocation::merge(&switch_token.location, &close.location),
        ))
    }

    fn parse_switch_case(&mut self) -> ParseResult<Node> {
        let start = self.peek().location.clone();
        let test = if self.eat(TokenKind::Default) {
            None
        } else {
            self.consume(TokenKind::Case, "'case' or 'default'")?;
            Some(Box::new(self.parse_expression()?))
        };
        if !self.eat(TokenKind::Colon) {
            self.consume(TokenKind::Semicolon, "':'")?;
        }
        let mut consequent = Vec::new();
        while !matches!(
            self.peek_kind(),
            TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof
        ) {
            consequent.push(self.parse_statement()?);
        }
        let end = consequent.last().map(|s| s.location.clone()).unwrap_or_else(|| start.clone());
        Ok(Node::new(
            NodeKind::SwitchCase { test, consequent },
            SourceLocation::merge(&start, &end),
        ))
    }

    fn parse_break_continue(&mut self, is_break: bool) -> ParseResult<Node> {
        let keyword = self.advance();
        let label = if self.check(TokenKind::Number) {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        let end = label
            .as_ref()
            .map(|l| l.location.clone())
            .unwrap_or_else(|| keyword.location.clone());
        self.consume_statement_end()?;
        let location = SourceLocation::merge(&keyword.location, &end);
        Ok(if is_break {
            Node::new(NodeKind::BreakStatement { label }, location)
        } else {
            Node::new(NodeKind::ContinueStatement { label }, location)
        })
    }

    fn parse_return(&mut self) -> ParseResult<Node> {
        let return_token = self.advance();
        let argument = if matches!(
            self.peek_kind(),
            TokenKind::Semicolon | TokenKind::CloseTag | TokenKind::Eof
        ) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        let end = argument
            .as_ref()
            .map(|a| a.location.clone())
            .unwrap_or_else(|| return_token.location.clone());
        self.consume_statement_end()?;
        Ok(Node::new(
            NodeKind::ReturnStatement { argument },
            SourceLocation::merge(&return_token.location, &end),
        ))
    }

    fn parse_throw(&mut self) -> ParseResult<Node> {
        let throw_token = self.advance();
        let argument = self.parse_expression()?;
        let location = SourceLocation::merge(&throw_token.location, &argument.location);
        self.consume_statement_end()?;
        Ok(Node::new(NodeKind::ThrowStatement { argument: Box::new(argument) }, location))
    }

    /// `try { } catch (A | B [$e]) { } ... [finally { }]` — at least one
    /// catch or a finally is required.
    fn parse_try(&mut self) -> ParseResult<Node> {
        let try_token = self.advance();
        let block = self.parse_block()?;
        let mut end = block.location.clone();

        let mut handlers = Vec::new();
        while self.check(TokenKind::Catch) {
            let catch_start = self.advance().location;
            self.consume(TokenKind::LeftParen, "'('")?;
            let mut types = vec![self.parse_name_expression()?];
            while self.eat(TokenKind::Pipe) {
                types.push(self.parse_name_expression()?);
            }
            let param = if self.check(TokenKind::Variable) {
                Some(Box::new(self.parse_variable()?))
            } else {
                None
            };
            self.consume(TokenKind::RightParen, "')'")?;
            let body = self.parse_block()?;
            end = body.location.clone();
            let location = SourceLocation::merge(&catch_start, &body.location);
            handlers.push(Node::new(
                NodeKind::CatchClause { types, param, body: Box::new(body) },
                location,
            ));
        }

        let finalizer = if self.eat(TokenKind::Finally) {
            let body = self.parse_block()?;
            end = body.location.clone();
            Some(Box::new(body))
        } else {
            None
        };

        if handlers.is_empty() && finalizer.is_none() {
            return Err(
                self.syntax_error("try requires at least one catch or a finally", &try_token.location)
            );
        }

        Ok(Node::new(
            NodeKind::TryStatement { block: Box::new(block), handlers, finalizer },
            SourceLocation::merge(&try_token.location, &end),
        ))
    }

    fn parse_echo(&mut self) -> ParseResult<Node> {
        let echo_token = self.advance();
        let mut expressions = vec![self.parse_expression()?];
        while self.eat(TokenKind::Comma) {
            expressions.push(self.parse_expression()?);
        }
        let end = expressions[expressions.len() - 1].location.clone();
        self.consume_statement_end()?;
        Ok(Node::new(
            NodeKind::EchoStatement { expressions },
            SourceLocation::merge(&echo_token.location, &end),
        ))
    }

    fn parse_global(&mut self) -> ParseResult<Node> {
        let global_token = self.advance();
        let mut variables = vec![self.parse_variable()?];
        while self.eat(TokenKind::Comma) {
            variables.push(self.parse_variable()?);
        }
        let end = variables[variables.len() - 1].location.clone();
        self.consume_statement_end()?;
        Ok(Node::new(
            NodeKind::GlobalStatement { variables },
            SourceLocation::merge(&global_token.location, &end),
        ))
    }

    /// Function-local `static $a = 1, $b;`
    fn parse_static_statement(&mut self) -> ParseResult<Node> {
        let static_token = self.advance();
        let mut declarations = Vec::new();
        loop {
            let variable = self.parse_variable()?;
            let initializer = if self.eat(TokenKind::Assign) {
                Some(Box::new(self.parse_expression()?))
            } else {
                None
            };
            let end = initializer
                .as_ref()
                .map(|i| i.location.clone())
                .unwrap_or_else(|| variable.location.clone());
            let location = SourceLocation::merge(&variable.location, &end);
            declarations.push(Node::new(
                NodeKind::StaticVariable { variable: Box::new(variable), initializer },
                location,
            ));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = declarations[declarations.len() - 1].location.clone();
        self.consume_statement_end()?;
        Ok(Node::new(
            NodeKind::StaticStatement { declarations },
            SourceLocation::merge(&static_token.location, &end),
        ))
    }

    fn parse_unset(&mut self) -> ParseResult<Node> {
        let unset_token = self.advance();
        self.consume(TokenKind::LeftParen, "'('")?;
        let mut arguments = Vec::new();
        while !self.check(TokenKind::RightParen) && !self.is_at_end() {
            arguments.push(self.parse_expression()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.consume(TokenKind::RightParen, "')'")?;
        self.consume_statement_end()?;
        Ok(Node::new(
            NodeKind::UnsetStatement { arguments },
            SourceLocation::merge(&unset_token.location, &close.location),
        ))
    }

    fn parse_goto(&mut self) -> ParseResult<Node> {
        let goto_token = self.advance();
        let (label, label_location) = self.parse_identifier()?;
        self.consume_statement_end()?;
        Ok(Node::new(
            NodeKind::GotoStatement { label },
            SourceLocation::merge(&goto_token.location, &label_location),
        ))
    }

    fn parse_labeled(&mut self) -> ParseResult<Node> {
        let (label, label_location) = self.parse_identifier()?;
        self.consume(TokenKind::Colon, "':'")?;
        let body = self.parse_statement()?;
        let location = SourceLocation::merge(&label_location, &body.location);
        Ok(Node::new(NodeKind::LabeledStatement { label, body: Box::new(body) }, location))
    }

    /// `declare(name = value, ...)` followed by a block or `;`.
    fn parse_declare(&mut self) -> ParseResult<Node> {
        let declare_token = self.advance();
        self.consume(TokenKind::LeftParen, "'('")?;
        let mut directives = Vec::new();
        loop {
            let (name, name_location) = self.parse_identifier()?;
            self.consume(TokenKind::Assign, "'='")?;
            let value = self.parse_expression()?;
            let location = SourceLocation::merge(&name_location, &value.location);
            directives.push(Node::new(
                NodeKind::DeclareDirective { name, value: Box::new(value) },
                location,
            ));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.consume(TokenKind::RightParen, "')'")?;
        let (body, end) = if self.check(TokenKind::LeftBrace) {
            let block = self.parse_block()?;
            let loc = block.location.clone();
            (Some(Box::new(block)), loc)
        } else {
            self.consume_statement_end()?;
            (None, close.location)
        };
        Ok(Node::new(
            NodeKind::DeclareStatement { directives, body },
            SourceLocation::merge(&declare_token.location, &end),
        ))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Node> {
        let expression = self.parse_expression()?;
        let location = expression.location.clone();
        self.consume_statement_end()?;
        Ok(Node::new(
            NodeKind::ExpressionStatement { expression: Box::new(expression) },
            location,
        ))
    }
}
