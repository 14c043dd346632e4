use super::ast::{Expression, Family, ProgressiveKind};
use super::error::{Span, UpiError, UpiErrorKind};
use super::lexer::{Lexer, SpannedToken, Token};
use crate::types::pattern::{clamp_steps, decode, morse, preset, PatternError, MAX_STEPS};
use crate::types::{CombineOp, Pattern, Radix};

/// Parsed notation plus the errors of any scene segments that were degraded
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub expression: Expression,
    pub warnings: Vec<UpiError>,
}

/// Parse full notation text, including `|` scene lists.
///
/// Each scene segment is parsed on its own. A failing segment is replaced by
/// a one-step rest and reported in `warnings`; the parse only fails when every
/// segment fails. Spans always point into the full text.
pub fn parse(input: &str) -> Result<Parsed, UpiError> {
    let segments = split_scenes(input);
    if segments.len() == 1 {
        return Ok(Parsed {
            expression: parse_expression(input)?,
            warnings: Vec::new(),
        });
    }

    let mut scenes = Vec::with_capacity(segments.len());
    let mut warnings = Vec::new();
    let mut first_error = None;
    for (index, (offset, text)) in segments.into_iter().enumerate() {
        match Parser::at(text, offset).and_then(|mut parser| parser.parse()) {
            Ok(expression) => scenes.push(expression),
            Err(err) => {
                tracing::warn!(scene = index, error = %err, "degrading scene to a rest");
                let warning = UpiError::new(
                    err.kind,
                    format!("scene {}: {}", index + 1, err.message),
                    err.span,
                );
                first_error.get_or_insert(warning.clone());
                warnings.push(warning);
                scenes.push(Expression::Literal(Pattern::rests(1)));
            }
        }
    }

    if warnings.len() == scenes.len() {
        return Err(first_error.unwrap_or_else(|| {
            UpiError::new(UpiErrorKind::EmptyLiteral, "no scenes", Span::default())
        }));
    }
    Ok(Parsed {
        expression: Expression::SceneList(scenes),
        warnings,
    })
}

/// Parse a single expression (no `|`)
pub fn parse_expression(input: &str) -> Result<Expression, UpiError> {
    Parser::new(input)?.parse()
}

/// Split on `|`, keeping each segment's character offset
fn split_scenes(input: &str) -> Vec<(usize, &str)> {
    let mut segments = Vec::new();
    let mut start_byte = 0;
    let mut start_char = 0;
    for (char_index, (byte_index, ch)) in input.char_indices().enumerate() {
        if ch == '|' {
            segments.push((start_char, &input[start_byte..byte_index]));
            start_byte = byte_index + 1;
            start_char = char_index + 1;
        }
    }
    segments.push((start_char, &input[start_byte..]));
    segments
}

/// Recursive descent parser for one scene segment.
///
/// ```text
/// segment  = accent? body EOF
/// accent   = '{' term '}'
/// body     = chain postfix*
/// chain    = combo combo*                      (whitespace stringing)
/// combo    = term (('+' | '-') term)*
/// postfix  = ';' '-'? int | letter? '>' int | '*' int
///          | ('+' | '%') '-'? int | '@' '-'? int
/// term     = ('~' | 'inv' | 'comp' | 'rev') term | primary
/// primary  = digits (':' int)? | codec (':' int)? | 'M:' morse
///          | '[' ints ']' (':' int)? | letter '(' args ')' | preset
/// ```
///
/// Digits made only of `0` and `1` are a binary literal; any other digit
/// makes the whole run a decimal codec.
pub struct Parser {
    tokens: Vec<SpannedToken>,
    position: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, UpiError> {
        Parser::at(input, 0)
    }

    /// Parser for a segment that starts `offset` characters into the full text
    pub fn at(input: &str, offset: usize) -> Result<Self, UpiError> {
        let tokens = Lexer::new(input)
            .tokenize()
            .map_err(|err| err.shifted(offset))?
            .into_iter()
            .map(|st| SpannedToken {
                span: st.span.shifted(offset),
                token: st.token,
            })
            .collect();
        Ok(Parser {
            tokens,
            position: 0,
        })
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map(|st| st.span)
            .unwrap_or_default()
    }

    /// Span of the last consumed token
    fn previous_span(&self) -> Span {
        self.position
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map(|st| st.span)
            .unwrap_or_default()
    }

    /// From `start` through the last consumed token
    fn span_from(&self, start: Span) -> Span {
        start.to(self.previous_span())
    }

    fn peek(&self, ahead: usize) -> &Token {
        self.tokens
            .get(self.position + ahead)
            .map(|st| &st.token)
            .unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Consume `expected` if it is the current token
    fn eat(&mut self, expected: &Token) -> bool {
        if self.current() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> UpiError {
        UpiError::new(
            UpiErrorKind::UnexpectedToken,
            format!("expected {}, found '{}'", expected, self.current()),
            self.current_span(),
        )
    }

    pub fn parse(&mut self) -> Result<Expression, UpiError> {
        if matches!(self.current(), Token::Eof) {
            return Err(UpiError::new(
                UpiErrorKind::EmptyLiteral,
                "empty pattern",
                self.current_span(),
            ));
        }

        let accent = if matches!(self.current(), Token::LeftBrace) {
            Some(self.parse_accent()?)
        } else {
            None
        };
        let body = self.parse_body()?;

        if !matches!(self.current(), Token::Eof) {
            return Err(self.unexpected("end of pattern"));
        }

        Ok(match accent {
            Some(accent) => Expression::accented(accent, body),
            None => body,
        })
    }

    fn parse_accent(&mut self) -> Result<Expression, UpiError> {
        let open = self.current_span();
        self.advance();
        if matches!(self.current(), Token::RightBrace) {
            return Err(UpiError::new(
                UpiErrorKind::EmptyLiteral,
                "empty accent pattern '{}'",
                open.to(self.current_span()),
            ));
        }
        if matches!(self.current(), Token::Eof) {
            return Err(unterminated_brace(open));
        }
        let accent = self.parse_term()?;
        match self.current() {
            Token::RightBrace => {
                self.advance();
                Ok(accent)
            }
            Token::Eof => Err(unterminated_brace(open)),
            _ => Err(self.unexpected("'}'")),
        }
    }

    fn parse_body(&mut self) -> Result<Expression, UpiError> {
        let start = self.current_span();
        let mut expr = self.parse_chain()?;
        let mut progressive: Option<Span> = None;

        loop {
            let span = self.current_span();
            let kind = match self.current().clone() {
                Token::Semicolon => {
                    self.advance();
                    let clockwise = !self.eat(&Token::Minus);
                    let (steps, steps_span) = self.parse_count()?;
                    if steps == 0 || steps > MAX_STEPS {
                        return Err(UpiError::new(
                            UpiErrorKind::OutOfRange,
                            format!("quantize target {} is outside 1..={}", steps, MAX_STEPS),
                            steps_span,
                        ));
                    }
                    expr = Expression::quantized(expr, steps, clockwise, self.span_from(start));
                    continue;
                }
                Token::At => {
                    self.advance();
                    let (offset, _) = self.parse_integer()?;
                    expr = Expression::rotate(expr, offset);
                    continue;
                }
                Token::Greater => {
                    self.advance();
                    let (target, _) = self.parse_count()?;
                    ProgressiveKind::Transform {
                        target,
                        family: None,
                    }
                }
                Token::Ident(name) if matches!(self.peek(1), Token::Greater) => {
                    let family = transformer(&name, span)?;
                    self.advance();
                    self.advance();
                    let (target, _) = self.parse_count()?;
                    ProgressiveKind::Transform {
                        target,
                        family: Some(family),
                    }
                }
                Token::Star => {
                    self.advance();
                    let (block, _) = self.parse_count()?;
                    ProgressiveKind::Lengthen(block)
                }
                Token::Plus | Token::Percent => {
                    self.advance();
                    let (step, _) = self.parse_integer()?;
                    ProgressiveKind::Offset(step)
                }
                _ => break,
            };

            if let Some(first) = progressive {
                return Err(UpiError::new(
                    UpiErrorKind::MultipleProgressive,
                    format!("only one progressive suffix is allowed (first at {})", first),
                    span,
                ));
            }
            progressive = Some(span);
            expr = Expression::progressive(kind, expr);
        }

        Ok(expr)
    }

    /// Patterns side by side are strung together
    fn parse_chain(&mut self) -> Result<Expression, UpiError> {
        let start = self.current_span();
        let first = self.parse_combo()?;
        if !self.starts_term(0) {
            return Ok(first);
        }

        let mut parts = vec![first];
        while self.starts_term(0) {
            parts.push(self.parse_combo()?);
        }
        Ok(Expression::Concat {
            parts,
            span: self.span_from(start),
        })
    }

    fn parse_combo(&mut self) -> Result<Expression, UpiError> {
        let start = self.current_span();
        let mut left = self.parse_term()?;

        loop {
            let op = match self.current() {
                Token::Plus if !self.is_offset_suffix() => CombineOp::Add,
                Token::Minus => CombineOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expression::combination(op, left, right, self.span_from(start));
        }

        Ok(left)
    }

    /// `+` followed by a bare (optionally negative) integer that ends the body
    /// is a progressive offset, not a combination with a literal
    fn is_offset_suffix(&self) -> bool {
        let mut ahead = 1;
        if matches!(self.peek(ahead), Token::Minus) {
            ahead += 1;
        }
        if !matches!(self.peek(ahead), Token::Digits(_)) {
            return false;
        }
        match self.peek(ahead + 1) {
            Token::Eof
            | Token::Semicolon
            | Token::Greater
            | Token::Star
            | Token::At
            | Token::Percent
            | Token::RightBrace => true,
            Token::Ident(_) => matches!(self.peek(ahead + 2), Token::Greater),
            _ => false,
        }
    }

    /// Whether the token `ahead` can open a term. A letter directly before
    /// `>` is a transformer, not a pattern.
    fn starts_term(&self, ahead: usize) -> bool {
        match self.peek(ahead) {
            Token::Digits(_)
            | Token::Codec(..)
            | Token::Morse(_)
            | Token::LeftBracket
            | Token::Tilde => true,
            Token::Ident(_) => !matches!(self.peek(ahead + 1), Token::Greater),
            _ => false,
        }
    }

    fn parse_term(&mut self) -> Result<Expression, UpiError> {
        if self.eat(&Token::Tilde) {
            return Ok(Expression::invert(self.parse_term()?));
        }
        let prefix = match self.current() {
            Token::Ident(name) => word_prefix(name),
            _ => None,
        };
        if let Some(apply) = prefix {
            if self.starts_term(1) {
                self.advance();
                return Ok(apply(self.parse_term()?));
            }
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, UpiError> {
        let span = self.current_span();
        match self.current().clone() {
            Token::Digits(digits) => {
                self.advance();
                if digits.chars().all(|c| c == '0' || c == '1') {
                    let pattern = digits.parse::<Pattern>().map_err(|err| pattern_error(err, span))?;
                    return Ok(Expression::Literal(self.apply_length(pattern)?));
                }
                let steps = self.parse_length()?;
                let pattern =
                    decode(Radix::Decimal, &digits, steps).map_err(|err| pattern_error(err, span))?;
                Ok(Expression::Literal(pattern))
            }
            Token::Codec(radix, digits) => {
                self.advance();
                let steps = self.parse_length()?;
                let pattern = decode(radix, &digits, steps).map_err(|err| pattern_error(err, span))?;
                Ok(Expression::Literal(pattern))
            }
            Token::Morse(text) => {
                self.advance();
                morse(&text)
                    .map(Expression::Literal)
                    .map_err(|err| pattern_error(err, span))
            }
            Token::LeftBracket => self.parse_array(),
            Token::Ident(name) => {
                self.advance();
                if matches!(self.current(), Token::LeftParen) {
                    let family = Family::from_letter(&name).ok_or_else(|| {
                        UpiError::new(
                            UpiErrorKind::UnknownGenerator,
                            format!("unknown generator '{}'", name),
                            span,
                        )
                    })?;
                    return self.parse_generator(family, span);
                }
                preset(&name).map(Expression::Literal).ok_or_else(|| {
                    UpiError::new(
                        UpiErrorKind::UnknownGenerator,
                        format!("unknown pattern '{}'", name),
                        span,
                    )
                })
            }
            Token::Eof => Err(UpiError::new(
                UpiErrorKind::EmptyLiteral,
                "missing pattern",
                span,
            )),
            _ => Err(self.unexpected("a pattern")),
        }
    }

    fn parse_generator(&mut self, family: Family, name_span: Span) -> Result<Expression, UpiError> {
        let open = self.current_span();
        self.advance();

        let bell = family == Family::Random
            && matches!(self.current(), Token::Ident(marker) if marker.eq_ignore_ascii_case("r"));
        if bell {
            self.advance();
            if !matches!(self.current(), Token::RightParen) && !self.eat(&Token::Comma) {
                return Err(self.unexpected("','"));
            }
        }

        let (params, spans) = self.parse_args(open)?;
        let call_span = self.span_from(name_span);
        if bell {
            return bell_random(&params, &spans, call_span);
        }

        let (min, max) = family.arity();
        if params.len() < min || params.len() > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{} to {}", min, max)
            };
            return Err(UpiError::new(
                UpiErrorKind::Arity,
                format!(
                    "{}() takes {} arguments, got {}",
                    family.letter(),
                    expected,
                    params.len()
                ),
                call_span,
            ));
        }

        validate_params(family, &params, &spans, call_span)?;
        Ok(Expression::generator(family, params, call_span))
    }

    /// Comma-separated integers up to and including the closing `)`
    fn parse_args(&mut self, open: Span) -> Result<(Vec<i64>, Vec<Span>), UpiError> {
        let mut params = Vec::new();
        let mut spans = Vec::new();
        if !matches!(self.current(), Token::RightParen) {
            loop {
                if matches!(self.current(), Token::Eof) {
                    return Err(unterminated_paren(open));
                }
                let (value, span) = self.parse_integer()?;
                params.push(value);
                spans.push(span);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        match self.current() {
            Token::RightParen => self.advance(),
            Token::Eof => return Err(unterminated_paren(open)),
            _ => return Err(self.unexpected("',' or ')'")),
        }
        Ok((params, spans))
    }
    fn parse_array(&mut self) -> Result<Expression, UpiError> {
        let open = self.current_span();
        self.advance();

        let mut positions = Vec::new();
        while !matches!(self.current(), Token::RightBracket) {
            if matches!(self.current(), Token::Eof) {
                return Err(UpiError::new(
                    UpiErrorKind::Unterminated,
                    "unterminated '['",
                    open,
                ));
            }
            positions.push(self.parse_count()?);
            if !self.eat(&Token::Comma) && !matches!(self.current(), Token::RightBracket) {
                return Err(self.unexpected("',' or ']'"));
            }
        }
        self.advance();

        let default_len = positions.iter().map(|&(p, _)| p + 1).max().unwrap_or(0).max(8);
        let len = clamp_steps(self.parse_length()?.unwrap_or(default_len));
        if let Some(&(position, span)) = positions.iter().find(|&&(p, _)| p >= len) {
            return Err(UpiError::new(
                UpiErrorKind::OutOfRange,
                format!("onset {} is outside {} steps", position, len),
                span,
            ));
        }
        let positions: Vec<usize> = positions.into_iter().map(|(p, _)| p).collect();
        Ok(Expression::Literal(Pattern::from_positions(&positions, len)))
    }

    /// Optional `:steps` suffix on a literal
    fn parse_length(&mut self) -> Result<Option<usize>, UpiError> {
        if self.eat(&Token::Colon) {
            Ok(Some(self.parse_count()?.0))
        } else {
            Ok(None)
        }
    }

    fn apply_length(&mut self, pattern: Pattern) -> Result<Pattern, UpiError> {
        Ok(match self.parse_length()? {
            Some(len) => pattern.resize(len),
            None => pattern,
        })
    }

    /// Optionally signed integer
    fn parse_integer(&mut self) -> Result<(i64, Span), UpiError> {
        let start = self.current_span();
        let negative = self.eat(&Token::Minus);
        match self.current().clone() {
            Token::Digits(digits) => {
                let span = start.to(self.current_span());
                self.advance();
                let value: i64 = digits.parse().map_err(|_| {
                    UpiError::new(
                        UpiErrorKind::OutOfRange,
                        format!("integer {} is too large", digits),
                        span,
                    )
                })?;
                Ok((if negative { -value } else { value }, span))
            }
            _ => Err(self.unexpected("an integer")),
        }
    }

    /// Non-negative integer
    fn parse_count(&mut self) -> Result<(usize, Span), UpiError> {
        let (value, span) = self.parse_integer()?;
        let count = usize::try_from(value).map_err(|_| negative_count(value, span))?;
        Ok((count, span))
    }
}

fn pattern_error(err: PatternError, span: Span) -> UpiError {
    let kind = match err {
        PatternError::InvalidDigit(_) => UpiErrorKind::InvalidDigit,
        PatternError::NoDigits => UpiErrorKind::EmptyLiteral,
        PatternError::Length(_) | PatternError::Overflow(_) => UpiErrorKind::OutOfRange,
        PatternError::CombinedTooLong(_) => UpiErrorKind::CombinedTooLong,
    };
    UpiError::new(kind, err.to_string(), span)
}

fn validate_params(
    family: Family,
    params: &[i64],
    spans: &[Span],
    call_span: Span,
) -> Result<(), UpiError> {
    // every argument except the polygon offset is a count
    for (index, (&value, &span)) in params.iter().zip(spans).enumerate() {
        let signed = matches!(
            (family, index),
            (Family::Polygon, 1) | (Family::Euclidean, 2)
        );
        if !signed && value < 0 {
            return Err(negative_count(value, span));
        }
    }

    let (onsets, steps) = match family {
        Family::Polygon => (params[0], params.get(2).copied()),
        _ => (params[0], Some(params[1])),
    };
    if let Some(steps) = steps {
        if onsets > steps {
            return Err(UpiError::new(
                UpiErrorKind::OnsetsExceedSteps,
                format!(
                    "{}() asks for {} onsets in {} steps",
                    family.letter(),
                    onsets,
                    steps
                ),
                call_span,
            ));
        }
    }
    Ok(())
}

/// `R(r,steps)` / `R(r,steps,seed)`; `params` excludes the `r`
fn bell_random(params: &[i64], spans: &[Span], call_span: Span) -> Result<Expression, UpiError> {
    if params.is_empty() || params.len() > 2 {
        return Err(UpiError::new(
            UpiErrorKind::Arity,
            format!(
                "R(r,...) takes a step count and an optional seed, got {} arguments",
                params.len()
            ),
            call_span,
        ));
    }
    for (&value, &span) in params.iter().zip(spans) {
        if value < 0 {
            return Err(negative_count(value, span));
        }
    }
    Ok(Expression::BellRandom {
        steps: params[0] as usize,
        seed: params.get(1).map(|&seed| seed as u64),
        span: call_span,
    })
}

/// `rev`, `inv` and `comp` prefixes
fn word_prefix(name: &str) -> Option<fn(Expression) -> Expression> {
    if name.eq_ignore_ascii_case("rev") {
        Some(Expression::reverse)
    } else if name.eq_ignore_ascii_case("inv") || name.eq_ignore_ascii_case("comp") {
        Some(Expression::invert)
    } else {
        None
    }
}

fn transformer(name: &str, span: Span) -> Result<Family, UpiError> {
    match Family::from_letter(name) {
        Some(family @ (Family::Euclidean | Family::Barlow | Family::Wolrab | Family::Dilcue)) => {
            Ok(family)
        }
        _ => Err(UpiError::new(
            UpiErrorKind::UnknownGenerator,
            format!("unknown transformer '{}' (expected E, B, W or D)", name),
            span,
        )),
    }
}

fn negative_count(value: i64, span: Span) -> UpiError {
    UpiError::new(
        UpiErrorKind::OutOfRange,
        format!("{} must not be negative", value),
        span,
    )
}

fn unterminated_brace(open: Span) -> UpiError {
    UpiError::new(UpiErrorKind::Unterminated, "unterminated '{'", open)
}

fn unterminated_paren(open: Span) -> UpiError {
    UpiError::new(UpiErrorKind::Unterminated, "unterminated '('", open)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(input: &str) -> Expression {
        parse_expression(input).unwrap()
    }

    fn error(input: &str) -> UpiError {
        parse(input).unwrap_err()
    }

    #[test]
    fn test_generator() {
        assert_eq!(
            expr("E(3,8)"),
            Expression::generator(Family::Euclidean, vec![3, 8], Span::new(0, 6))
        );
        assert_eq!(
            expr("p(5, 2, 12)"),
            Expression::generator(Family::Polygon, vec![5, 2, 12], Span::new(0, 11))
        );
    }

    #[test]
    fn test_euclidean_rotation_argument() {
        assert_eq!(
            expr("E(3,8,-2)"),
            Expression::generator(Family::Euclidean, vec![3, 8, -2], Span::new(0, 9))
        );
        assert_eq!(error("B(3,8,1)").kind, UpiErrorKind::Arity);
    }

    #[test]
    fn test_bell_random() {
        assert_eq!(
            expr("R(r,8)"),
            Expression::BellRandom {
                steps: 8,
                seed: None,
                span: Span::new(0, 6)
            }
        );
        assert!(matches!(
            expr("r(R, 16, 3)"),
            Expression::BellRandom { steps: 16, seed: Some(3), .. }
        ));
        assert_eq!(error("R(r)").kind, UpiErrorKind::Arity);
        assert_eq!(error("R(r,-4)").kind, UpiErrorKind::OutOfRange);
    }

    #[test]
    fn test_literals() {
        assert_eq!(expr("1001"), Expression::Literal("1001".parse().unwrap()));
        assert_eq!(expr("1:4"), Expression::Literal("1000".parse().unwrap()));
        assert_eq!(
            expr("0x94:8"),
            Expression::Literal("10010010".parse().unwrap())
        );
        assert_eq!(
            expr("[0,3,6]"),
            Expression::Literal("10010010".parse().unwrap())
        );
        assert_eq!(
            expr("tresillo"),
            Expression::Literal("10010010".parse().unwrap())
        );
    }

    #[test]
    fn test_decimal_without_prefix() {
        // 7 and 3 are not binary digits, so `73` is read like `d73`
        assert_eq!(expr("73"), expr("d73"));
        assert_eq!(expr("73"), Expression::Literal("10010010".parse().unwrap()));
        assert_eq!(expr("5:4"), expr("d5:4"));
        // only 0 and 1 stays binary
        assert_eq!(expr("10"), Expression::Literal("10".parse().unwrap()));
    }

    #[test]
    fn test_bare_octal_prefix() {
        assert_eq!(expr("o44"), expr("0o44"));
    }

    #[test]
    fn test_morse() {
        assert_eq!(
            expr("M:SOS"),
            Expression::Literal("111101010111".parse().unwrap())
        );
        assert_eq!(error("M:123").kind, UpiErrorKind::EmptyLiteral);
    }

    #[test]
    fn test_word_prefixes() {
        assert_eq!(
            expr("rev 1011"),
            Expression::reverse(Expression::Literal("1011".parse().unwrap()))
        );
        assert_eq!(expr("comp 1010"), expr("~1010"));
        assert_eq!(expr("INV 1010"), expr("~1010"));
        // a lone prefix word is looked up as a pattern name
        assert_eq!(error("rev").kind, UpiErrorKind::UnknownGenerator);
    }

    #[test]
    fn test_stringing() {
        match expr("1010 E(3,8) M:E") {
            Expression::Concat { parts, span } => {
                assert_eq!(parts.len(), 3);
                assert_eq!(span, Span::new(0, 15));
            }
            other => panic!("Expected Concat, got {:?}", other),
        }
        // suffixes apply to the whole string
        match expr("1010 0110+1") {
            Expression::Progressive { kind, body } => {
                assert_eq!(kind, ProgressiveKind::Offset(1));
                assert!(matches!(*body, Expression::Concat { .. }));
            }
            other => panic!("Expected Progressive, got {:?}", other),
        }
        // a letter right before `>` is still a transformer
        assert!(matches!(
            expr("1000 0000 B>4"),
            Expression::Progressive {
                kind: ProgressiveKind::Transform {
                    family: Some(Family::Barlow),
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn test_postfix_order() {
        let parsed = expr("E(3,8);12@1");
        match parsed {
            Expression::Rotate { body, offset } => {
                assert_eq!(offset, 1);
                assert!(matches!(*body, Expression::Quantized { steps: 12, clockwise: true, .. }));
            }
            other => panic!("Expected Rotate, got {:?}", other),
        }
        assert!(matches!(
            expr("E(3,8);-5"),
            Expression::Quantized { clockwise: false, steps: 5, .. }
        ));
    }

    #[test]
    fn test_progressive_suffixes() {
        assert!(matches!(
            expr("E(1,8)>8"),
            Expression::Progressive {
                kind: ProgressiveKind::Transform { target: 8, family: None },
                ..
            }
        ));
        assert!(matches!(
            expr("E(1,8)B>5"),
            Expression::Progressive {
                kind: ProgressiveKind::Transform {
                    target: 5,
                    family: Some(Family::Barlow)
                },
                ..
            }
        ));
        assert!(matches!(
            expr("E(3,8)*4"),
            Expression::Progressive { kind: ProgressiveKind::Lengthen(4), .. }
        ));
        assert!(matches!(
            expr("E(3,8)+-2"),
            Expression::Progressive { kind: ProgressiveKind::Offset(-2), .. }
        ));
        assert_eq!(expr("E(3,8)%2"), expr("E(3,8)+2"));
        assert_eq!(expr("E(3,8)%-1"), expr("E(3,8)+-1"));
    }

    #[test]
    fn test_offset_versus_combination() {
        assert!(matches!(
            expr("E(3,8)+1"),
            Expression::Progressive { kind: ProgressiveKind::Offset(1), .. }
        ));
        assert!(matches!(
            expr("E(3,8)+E(2,5)"),
            Expression::Combination { op: CombineOp::Add, .. }
        ));
        assert!(matches!(
            expr("E(3,8)-1010"),
            Expression::Combination { op: CombineOp::Subtract, .. }
        ));
        // a trailing integer after a combination is still an offset
        match expr("E(3,8)+E(2,5)+2") {
            Expression::Progressive { kind, body } => {
                assert_eq!(kind, ProgressiveKind::Offset(2));
                assert!(matches!(*body, Expression::Combination { .. }));
            }
            other => panic!("Expected Progressive, got {:?}", other),
        }
    }

    #[test]
    fn test_accent_and_invert() {
        assert!(matches!(expr("{100}E(3,8)"), Expression::Accented { .. }));
        assert!(matches!(expr("~E(3,8)"), Expression::Invert(_)));
    }

    #[test]
    fn test_scene_list() {
        let parsed = parse("E(3,8)|B(5,13)").unwrap();
        match parsed.expression {
            Expression::SceneList(scenes) => assert_eq!(scenes.len(), 2),
            other => panic!("Expected SceneList, got {:?}", other),
        }
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_scene_segment_degrades() {
        let parsed = parse("E(3,8)|Q(1,2)").unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].kind, UpiErrorKind::UnknownGenerator);
        // span points into the full text
        assert_eq!(parsed.warnings[0].span, Span::new(7, 1));
        match parsed.expression {
            Expression::SceneList(scenes) => {
                assert_eq!(scenes[1], Expression::Literal(Pattern::rests(1)));
            }
            other => panic!("Expected SceneList, got {:?}", other),
        }
    }

    #[test]
    fn test_all_scenes_failing_is_an_error() {
        assert_eq!(error("Q(1,2)|X").kind, UpiErrorKind::UnknownGenerator);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(error("Q(3,8)").kind, UpiErrorKind::UnknownGenerator);
        assert_eq!(error("E(9,8)").kind, UpiErrorKind::OnsetsExceedSteps);
        assert_eq!(error("E(-1,8)").kind, UpiErrorKind::OutOfRange);
        assert_eq!(
            error("E(3,99999999999999999999)").kind,
            UpiErrorKind::OutOfRange
        );
        assert_eq!(error("").kind, UpiErrorKind::EmptyLiteral);
        assert_eq!(error("{100").kind, UpiErrorKind::Unterminated);
        assert_eq!(error("{100}").kind, UpiErrorKind::EmptyLiteral);
        assert_eq!(error("E(3,8").kind, UpiErrorKind::Unterminated);
        assert_eq!(error("E(3)").kind, UpiErrorKind::Arity);
        assert_eq!(error("0o19").kind, UpiErrorKind::InvalidDigit);
        assert_eq!(error("E(3,8);0").kind, UpiErrorKind::OutOfRange);
        assert_eq!(error("E(3,8);200").kind, UpiErrorKind::OutOfRange);
        assert_eq!(error("E(1,8)>4*2").kind, UpiErrorKind::MultipleProgressive);
        assert_eq!(error("E(1,8)X>4").kind, UpiErrorKind::UnknownGenerator);
        assert_eq!(error("E(3,8))").kind, UpiErrorKind::UnexpectedToken);
    }

    #[test]
    fn test_operator_spans() {
        match expr("E(3,7)+E(2,127)") {
            Expression::Combination { span, .. } => assert_eq!(span, Span::new(0, 15)),
            other => panic!("Expected Combination, got {:?}", other),
        }
        match expr("1010;8") {
            Expression::Quantized { span, .. } => assert_eq!(span, Span::new(0, 6)),
            other => panic!("Expected Quantized, got {:?}", other),
        }
        // spans of later scenes count from the start of the full text
        let parsed = parse("1|E(3,8)+E(2,5)").unwrap();
        match parsed.expression {
            Expression::SceneList(scenes) => match &scenes[1] {
                Expression::Combination { span, .. } => assert_eq!(*span, Span::new(2, 13)),
                other => panic!("Expected Combination, got {:?}", other),
            },
            other => panic!("Expected SceneList, got {:?}", other),
        }
    }

    #[test]
    fn test_error_message_names_substring() {
        let err = error("E(3,8)+Q(1,2)");
        assert!(err.message.contains("'Q'"));
        assert_eq!(err.span, Span::new(7, 1));
        assert_eq!(err.to_string(), "Error at 7..8: unknown generator 'Q'");
    }
}
