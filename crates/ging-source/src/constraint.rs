//! Go build constraints (`//go:build` and legacy `// +build`).

/// A parsed constraint expression over build tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn eval(&self, ok: &impl Fn(&str) -> bool) -> bool {
        match self {
            Self::Tag(tag) => ok(tag),
            Self::Not(e) => !e.eval(ok),
            Self::And(a, b) => a.eval(ok) && b.eval(ok),
            Self::Or(a, b) => a.eval(ok) || b.eval(ok),
        }
    }

    fn and(a: Expr, b: Expr) -> Expr {
        Self::And(Box::new(a), Box::new(b))
    }

    fn or(a: Expr, b: Expr) -> Expr {
        Self::Or(Box::new(a), Box::new(b))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Not,
    And,
    Or,
    Tag(String),
}

fn lex(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '!' => tokens.push(Token::Not),
            '&' | '|' => {
                if chars.next_if(|&(_, n)| n == c).is_none() {
                    return Err(format!("unexpected {c:?} at offset {i}"));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            c if is_tag_char(c) => {
                let mut tag = String::from(c);
                while let Some((_, n)) = chars.next_if(|&(_, n)| is_tag_char(n)) {
                    tag.push(n);
                }
                tokens.push(Token::Tag(tag));
            }
            other => return Err(format!("invalid character {other:?} at offset {i}")),
        }
    }
    Ok(tokens)
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn or(&mut self) -> Result<Expr, String> {
        let mut left = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.bump();
            left = Expr::or(left, self.and()?);
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, String> {
        let mut left = self.not()?;
        while self.peek() == Some(&Token::And) {
            self.bump();
            left = Expr::and(left, self.not()?);
        }
        Ok(left)
    }

    fn not(&mut self) -> Result<Expr, String> {
        if self.peek() == Some(&Token::Not) {
            self.bump();
            return Ok(Expr::Not(Box::new(self.not()?)));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Expr, String> {
        match self.bump() {
            Some(Token::Tag(tag)) => Ok(Expr::Tag(tag)),
            Some(Token::LParen) => {
                let inner = self.or()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("missing )".to_string()),
                }
            }
            Some(other) => Err(format!("unexpected {other:?}")),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

/// Parses the text following `//go:build`.
pub fn parse_go_build(expr: &str) -> Result<Expr, String> {
    let mut parser = Parser { tokens: lex(expr)?, pos: 0 };
    let parsed = parser.or()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!("unexpected trailing input in {expr:?}"));
    }
    Ok(parsed)
}

/// Parses the text following `// +build`: spaces OR, commas AND.
pub fn parse_plus_build(line: &str) -> Result<Expr, String> {
    let mut clauses = line.split_whitespace().map(|clause| -> Result<Expr, String> {
        let mut terms = clause.split(',').map(|term| match term.strip_prefix('!') {
            Some(rest) if !rest.is_empty() && rest.chars().all(is_tag_char) => Ok(Expr::Not(Box::new(Expr::Tag(rest.to_string())))),
            None if !term.is_empty() && term.chars().all(is_tag_char) => Ok(Expr::Tag(term.to_string())),
            _ => Err(format!("invalid +build term {term:?}")),
        });
        let first = terms.next().ok_or_else(|| "empty +build clause".to_string())??;
        terms.try_fold(first, |acc, t| -> Result<Expr, String> { Ok(Expr::and(acc, t?)) })
    });
    let first = clauses.next().ok_or_else(|| "empty +build line".to_string())??;
    clauses.try_fold(first, |acc, c| -> Result<Expr, String> { Ok(Expr::or(acc, c?)) })
}

/// Reads the constraint of a Go file from the comments above its package
/// clause. `//go:build` wins over `// +build`; several `+build` lines are
/// AND-ed. `None` means the file is unconstrained.
///
/// The header runs until the first text outside a comment. A `//go:build`
/// line counts anywhere in it. A `+build` line only counts when a blank line
/// follows it before any `/* */` comment or code, so one inside the package
/// doc comment is ignored.
pub fn header_constraint(src: &str) -> Result<Option<Expr>, String> {
    let mut go_build = None;
    let mut plus_lines = Vec::new();
    let mut blank_before = 0;
    let mut only_line_comments = true;
    let mut in_block = false;
    'lines: for (n, line) in src.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            if only_line_comments {
                blank_before = n;
            }
            continue;
        }
        if !line.starts_with("//") {
            only_line_comments = false;
        }
        if !in_block {
            if let Some(rest) = line.strip_prefix("//go:build") {
                if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                    if go_build.is_some() {
                        return Err("multiple //go:build lines".to_string());
                    }
                    go_build = Some(parse_go_build(rest)?);
                }
            } else if let Some(rest) = line.strip_prefix("//").map(str::trim_start).and_then(|c| c.strip_prefix("+build")) {
                if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                    plus_lines.push((n, rest));
                }
            }
        }
        let mut rest = line;
        while !rest.is_empty() {
            if in_block {
                match rest.find("*/") {
                    Some(i) => {
                        in_block = false;
                        rest = rest[i + 2..].trim_start();
                    }
                    None => continue 'lines,
                }
            } else if rest.starts_with("//") {
                continue 'lines;
            } else if let Some(after) = rest.strip_prefix("/*") {
                in_block = true;
                rest = after.trim_start();
            } else {
                break 'lines;
            }
        }
    }

    let mut plus_build: Option<Expr> = None;
    for (_, rest) in plus_lines.into_iter().filter(|(n, _)| *n < blank_before) {
        let expr = parse_plus_build(rest)?;
        plus_build = Some(match plus_build {
            Some(prev) => Expr::and(prev, expr),
            None => expr,
        });
    }
    Ok(go_build.or(plus_build))
}
