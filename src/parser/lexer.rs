use logos::Logos;

use super::error::ParseError;
use super::span::{Location, Span};

/// Java tokens. Contextual words (`module`, `requires`, `exports`, ...) lex as identifiers.
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Token {
    // Keywords
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("static")]
    Static,
    #[token("public")]
    Public,
    #[token("protected")]
    Protected,
    #[token("private")]
    Private,
    #[token("abstract")]
    Abstract,
    #[token("final")]
    Final,
    #[token("native")]
    Native,
    #[token("synchronized")]
    Synchronized,
    #[token("transient")]
    Transient,
    #[token("volatile")]
    Volatile,
    #[token("strictfp")]
    Strictfp,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("instanceof")]
    InstanceOf,
    #[token("void")]
    Void,
    #[token("boolean")]
    Boolean,
    #[token("byte")]
    Byte,
    #[token("short")]
    Short,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("char")]
    Char,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("assert")]
    Assert,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("throw")]
    Throw,
    #[token("throws")]
    Throws,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // Operators
    #[token("=")]
    Assign,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    ModAssign,
    #[token("&=")]
    AndAssign,
    #[token("|=")]
    OrAssign,
    #[token("^=")]
    XorAssign,
    #[token("<<=")]
    LShiftAssign,
    #[token(">>=")]
    RShiftAssign,
    #[token(">>>=")]
    URShiftAssign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<<")]
    LShift,
    #[token(">>")]
    RShift,
    #[token(">>>")]
    URShift,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    PipePipe,
    #[token("==")]
    Eq,
    #[token("!=")]
    Ne,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("::")]
    DoubleColon,
    #[token("->")]
    Arrow,

    // Separators
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("@")]
    At,
    #[token("...")]
    Ellipsis,

    // Literals
    #[regex(r#""([^"\\\n]|\\u[0-9a-fA-F]{4}|\\.)*""#)]
    StringLiteral,
    #[regex(r"'([^'\\\n]|\\u[0-9a-fA-F]{4}|\\.)'")]
    CharLiteral,
    #[regex(r"0[xX][0-9a-fA-F_]+[lL]?")]
    HexInteger,
    #[regex(r"0[bB][01_]+[lL]?")]
    BinaryInteger,
    #[regex(r"[0-9][0-9_]*[lL]?")]
    IntegerLiteral,
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?[fFdD]?")]
    FloatLiteral,
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+[fFdD]?")]
    ScientificFloat,
    #[regex(r"[0-9][0-9_]*[fFdD]")]
    TypedFloat,

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Identifier,

    // Trivia, dropped by `tokenize`
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/", priority = 2)]
    BlockComment,
    #[regex(r"[ \t\n\r\x0C]+", priority = 2)]
    Whitespace,
    #[token("\u{FEFF}")]
    Bom,
}

impl Token {
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Whitespace | Token::Bom | Token::LineComment | Token::BlockComment)
    }

    /// Primitive type keywords, `void` included.
    pub fn is_primitive_type(&self) -> bool {
        matches!(
            self,
            Token::Boolean
                | Token::Byte
                | Token::Short
                | Token::Int
                | Token::Long
                | Token::Char
                | Token::Float
                | Token::Double
                | Token::Void
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::StringLiteral
                | Token::CharLiteral
                | Token::HexInteger
                | Token::BinaryInteger
                | Token::IntegerLiteral
                | Token::FloatLiteral
                | Token::ScientificFloat
                | Token::TypedFloat
                | Token::True
                | Token::False
                | Token::Null
        )
    }
}

/// Token with its text and position.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalToken {
    pub token: Token,
    pub lexeme: String,
    pub location: Location,
}

impl LexicalToken {
    pub fn new(token: Token, lexeme: String, location: Location) -> Self {
        Self { token, lexeme, location }
    }

    pub fn token_type(&self) -> &Token {
        &self.token
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn end_location(&self) -> Location {
        self.location.after(&self.lexeme)
    }

    pub fn span(&self) -> Span {
        Span::new(self.location, self.end_location())
    }

    pub fn is(&self, token_type: &Token) -> bool {
        self.token == *token_type
    }
}

pub struct Lexer<'a> {
    lexer: logos::Lexer<'a, Token>,
    position: Location,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Token::lexer(source),
            position: Location::start(),
        }
    }

    pub fn next_token(&mut self) -> Option<Result<LexicalToken, ParseError>> {
        let token = self.lexer.next()?;
        let lexeme = self.lexer.slice().to_string();
        let location = self.position;
        self.position = location.after(&lexeme);
        match token {
            Ok(token) => Some(Ok(LexicalToken::new(token, lexeme, location))),
            Err(()) => Some(Err(ParseError::LexicalError { text: lexeme, location })),
        }
    }

    /// All significant tokens; trivia is dropped.
    pub fn tokenize(mut self) -> Result<Vec<LexicalToken>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(result) = self.next_token() {
            let token = result?;
            if !token.token.is_trivia() {
                tokens.push(token);
            }
        }
        Ok(tokens)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<LexicalToken, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .tokenize()
            .expect("tokenize")
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn contextual_module_words_are_identifiers() {
        assert_eq!(
            kinds("module m { requires transitive n; }"),
            vec![
                Token::Identifier,
                Token::Identifier,
                Token::LBrace,
                Token::Identifier,
                Token::Identifier,
                Token::Identifier,
                Token::Semicolon,
                Token::RBrace
            ]
        );
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(kinds("// c\n/* block */ x /** doc */"), vec![Token::Identifier]);
    }

    #[test]
    fn method_reference_and_lambda_tokens() {
        assert_eq!(
            kinds("X::foo (a) -> a"),
            vec![
                Token::Identifier,
                Token::DoubleColon,
                Token::Identifier,
                Token::LParen,
                Token::Identifier,
                Token::RParen,
                Token::Arrow,
                Token::Identifier
            ]
        );
    }

    #[test]
    fn token_locations_follow_lines() {
        let tokens = Lexer::new("a\n  b").tokenize().expect("tokenize");
        assert_eq!(tokens[1].location, Location::new(2, 3, 4));
        assert_eq!(tokens[1].end_location().offset, 5);
    }

    #[test]
    fn unknown_character_is_a_lexical_error() {
        let err = Lexer::new("a # b").tokenize().unwrap_err();
        assert!(matches!(err, ParseError::LexicalError { .. }));
    }
}
