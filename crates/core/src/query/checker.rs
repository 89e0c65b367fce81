//! Lightweight built-in checker for the 1C query language.
//!
//! It does not build a full syntax tree. Parsing covers string literals,
//! comments, bracket balance and the leading keyword; semantic checks cover
//! metadata table references, parameter names and duplicate aliases.

use super::{Diagnostic, QueryLanguage, QueryResource, Severity};
use crate::error::{CoreError, CoreResult};
use crate::workspace::Project;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct BuiltinQueryLanguage;

impl QueryLanguage for BuiltinQueryLanguage {
    fn create_resource(
        &self,
        _project: &Project,
        uri: &str,
        dcs_mode: bool,
    ) -> CoreResult<Box<dyn QueryResource>> {
        Ok(Box::new(BuiltinResource {
            uri: uri.to_string(),
            dcs_mode,
            parsed: None,
        }))
    }
}

struct BuiltinResource {
    uri: String,
    dcs_mode: bool,
    parsed: Option<Parsed>,
}

struct Parsed {
    tokens: Vec<Token>,
    syntax: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Word(String),
    Punct(char),
    Str,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    pos: Position,
}

#[derive(Debug, Clone, Copy)]
struct Position {
    line: i64,
    column: i64,
    offset: i64,
}

impl Position {
    fn diagnostic(self, severity: Severity, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(severity, message).at(self.line, self.column, self.offset)
    }
}

impl QueryResource for BuiltinResource {
    fn load(&mut self, text: &str) -> CoreResult<()> {
        self.parsed = Some(parse(text, self.dcs_mode));
        Ok(())
    }

    fn syntax_diagnostics(&self) -> Vec<Diagnostic> {
        self.parsed
            .as_ref()
            .map(|p| p.syntax.clone())
            .unwrap_or_default()
    }

    fn validate(&self, project: &Project) -> CoreResult<Vec<Diagnostic>> {
        let parsed = self
            .parsed
            .as_ref()
            .ok_or_else(|| CoreError::ResourceNotLoaded(self.uri.clone()))?;
        Ok(check(&parsed.tokens, project))
    }

    fn unload(&mut self) {
        self.parsed = None;
    }
}

fn parse(text: &str, dcs_mode: bool) -> Parsed {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut syntax = Vec::new();
    let mut open: Vec<(char, Position)> = Vec::new();

    let (mut i, mut line, mut column) = (0usize, 1i64, 1i64);
    let advance = |c: char, line: &mut i64, column: &mut i64| {
        if c == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
    };

    while i < chars.len() {
        let c = chars[i];
        let pos = Position {
            line,
            column,
            offset: i as i64,
        };

        if c.is_whitespace() {
            advance(c, &mut line, &mut column);
            i += 1;
            continue;
        }

        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                advance(chars[i], &mut line, &mut column);
                i += 1;
            }
            continue;
        }

        if c == '"' {
            advance(c, &mut line, &mut column);
            i += 1;
            let mut closed = false;
            while i < chars.len() {
                let ch = chars[i];
                advance(ch, &mut line, &mut column);
                i += 1;
                if ch == '"' {
                    // A doubled quote is an escaped quote.
                    if chars.get(i) == Some(&'"') {
                        advance('"', &mut line, &mut column);
                        i += 1;
                        continue;
                    }
                    closed = true;
                    break;
                }
            }
            if !closed {
                syntax.push(pos.diagnostic(Severity::Error, "Unterminated string literal"));
            }
            tokens.push(Token {
                kind: TokenKind::Str,
                pos,
            });
            continue;
        }

        if is_word_char(c) {
            let start = i;
            while i < chars.len() && is_word_char(chars[i]) {
                advance(chars[i], &mut line, &mut column);
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Word(chars[start..i].iter().collect()),
                pos,
            });
            continue;
        }

        match c {
            '(' | '{' => {
                if c == '{' && !dcs_mode {
                    syntax.push(pos.diagnostic(
                        Severity::Error,
                        "Data composition expressions in {} are allowed only in DCS mode",
                    ));
                }
                open.push((c, pos));
            }
            ')' | '}' => {
                let expected = if c == ')' { '(' } else { '{' };
                match open.last() {
                    Some((o, _)) if *o == expected => {
                        open.pop();
                    }
                    _ => syntax.push(pos.diagnostic(Severity::Error, format!("Unexpected '{c}'"))),
                }
            }
            _ => {}
        }
        tokens.push(Token {
            kind: TokenKind::Punct(c),
            pos,
        });
        advance(c, &mut line, &mut column);
        i += 1;
    }

    for (c, pos) in open {
        syntax.push(pos.diagnostic(Severity::Error, format!("Unclosed '{c}'")));
    }

    match tokens.first() {
        None => syntax.push(Diagnostic::new(Severity::Error, "Query text is empty")),
        Some(Token {
            kind: TokenKind::Word(word),
            ..
        }) if is_keyword(word, &["SELECT", "ВЫБРАТЬ"]) => {}
        Some(token) => syntax.push(
            token
                .pos
                .diagnostic(Severity::Error, "Query must start with SELECT (ВЫБРАТЬ)"),
        ),
    }

    Parsed { tokens, syntax }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn is_keyword(word: &str, keywords: &[&str]) -> bool {
    let upper = word.to_uppercase();
    keywords.iter().any(|k| *k == upper)
}

/// Table type prefixes, English and Russian, mapped to metadata type names.
const TABLE_TYPES: &[(&str, &str)] = &[
    ("catalog", "Catalog"),
    ("справочник", "Catalog"),
    ("document", "Document"),
    ("документ", "Document"),
    ("documentjournal", "DocumentJournal"),
    ("журналдокументов", "DocumentJournal"),
    ("enum", "Enum"),
    ("перечисление", "Enum"),
    ("constant", "Constant"),
    ("константа", "Constant"),
    ("informationregister", "InformationRegister"),
    ("регистрсведений", "InformationRegister"),
    ("accumulationregister", "AccumulationRegister"),
    ("регистрнакопления", "AccumulationRegister"),
    ("accountingregister", "AccountingRegister"),
    ("регистрбухгалтерии", "AccountingRegister"),
    ("calculationregister", "CalculationRegister"),
    ("регистррасчета", "CalculationRegister"),
    ("chartofaccounts", "ChartOfAccounts"),
    ("плансчетов", "ChartOfAccounts"),
    ("chartofcharacteristictypes", "ChartOfCharacteristicTypes"),
    ("планвидовхарактеристик", "ChartOfCharacteristicTypes"),
    ("chartofcalculationtypes", "ChartOfCalculationTypes"),
    ("планвидоврасчета", "ChartOfCalculationTypes"),
    ("exchangeplan", "ExchangePlan"),
    ("планобмена", "ExchangePlan"),
    ("businessprocess", "BusinessProcess"),
    ("бизнеспроцесс", "BusinessProcess"),
    ("task", "Task"),
    ("задача", "Task"),
];

fn table_type(prefix: &str) -> Option<&'static str> {
    let lower = prefix.to_lowercase();
    TABLE_TYPES
        .iter()
        .find(|(word, _)| *word == lower)
        .map(|(_, type_name)| *type_name)
}

/// Lowercased names introduced by AS (КАК) anywhere in the query.
fn declared_aliases(tokens: &[Token]) -> HashSet<String> {
    tokens
        .windows(2)
        .filter_map(|pair| match (&pair[0].kind, &pair[1].kind) {
            (TokenKind::Word(keyword), TokenKind::Word(alias))
                if is_keyword(keyword, &["AS", "КАК"]) =>
            {
                Some(alias.to_lowercase())
            }
            _ => None,
        })
        .collect()
}

fn check(tokens: &[Token], project: &Project) -> Vec<Diagnostic> {
    let mut issues = Vec::new();
    let mut aliases = HashSet::new();
    let declared = declared_aliases(tokens);

    for (idx, token) in tokens.iter().enumerate() {
        let next = tokens.get(idx + 1);
        match &token.kind {
            TokenKind::Word(word) => {
                // A source after FROM or JOIN always names a table, elsewhere
                // a declared alias shadows the type prefix.
                let source = idx > 0
                    && matches!(
                        &tokens[idx - 1].kind,
                        TokenKind::Word(w) if is_keyword(w, &["FROM", "ИЗ", "JOIN", "СОЕДИНЕНИЕ"])
                    );
                let mut parts = word.split('.');
                if let (Some(prefix), Some(name)) = (parts.next(), parts.next()) {
                    let shadowed = !source && declared.contains(&prefix.to_lowercase());
                    if let Some(type_name) = table_type(prefix).filter(|_| !shadowed) {
                        if !name.is_empty() && project.find_object(type_name, name).is_none() {
                            issues.push(token.pos.diagnostic(
                                Severity::Error,
                                format!("Object not found: {type_name}.{name}"),
                            ));
                        }
                    }
                }

                if is_keyword(word, &["AS", "КАК"]) {
                    if let Some(Token {
                        kind: TokenKind::Word(alias),
                        pos,
                    }) = next
                    {
                        if !aliases.insert(alias.to_lowercase()) {
                            issues.push(
                                pos.diagnostic(Severity::Warning, format!("Duplicate alias: {alias}")),
                            );
                        }
                    }
                }
            }
            TokenKind::Punct('&') => {
                let named = matches!(
                    next,
                    Some(Token { kind: TokenKind::Word(w), pos })
                        if pos.offset == token.pos.offset + 1
                            && w.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
                );
                if !named {
                    issues.push(
                        token
                            .pos
                            .diagnostic(Severity::Error, "Parameter name expected after '&'"),
                    );
                }
            }
            _ => {}
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MdObject;
    use crate::query::validate_query;
    use crate::workspace::ProjectKind;

    fn project() -> Project {
        Project::new(
            "Demo",
            ProjectKind::Configuration,
            MdObject::new("Configuration", "Demo")
                .with_child("catalogs", MdObject::new("Catalog", "Products"))
                .with_child("documents", MdObject::new("Document", "Sale")),
        )
    }

    fn run(text: &str, dcs_mode: bool) -> Vec<Diagnostic> {
        validate_query(&BuiltinQueryLanguage, &project(), text, dcs_mode)
            .unwrap()
            .issues
    }

    fn messages(issues: &[Diagnostic]) -> Vec<&str> {
        issues.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn test_simple_select_is_clean() {
        assert!(run("SELECT 1 AS X", false).is_empty());
        assert!(run("ВЫБРАТЬ\n  Товары.Ссылка КАК Ссылка\nИЗ\n  Справочник.Products КАК Товары", false).is_empty());
    }

    #[test]
    fn test_must_start_with_select() {
        let issues = run("FROM Catalog.Products", false);
        assert_eq!(messages(&issues), ["Query must start with SELECT (ВЫБРАТЬ)"]);
        assert_eq!(issues[0].line, Some(1));
        assert_eq!(issues[0].column, Some(1));
        assert_eq!(issues[0].offset, Some(0));
    }

    #[test]
    fn test_unterminated_string() {
        let issues = run("SELECT \"abc", false);
        assert_eq!(messages(&issues), ["Unterminated string literal"]);
        assert_eq!(issues[0].column, Some(8));

        assert!(run("SELECT \"a \"\"quoted\"\" word\" AS X", false).is_empty());
    }

    #[test]
    fn test_bracket_balance() {
        let issues = run("SELECT (1 + 2 AS X", false);
        assert_eq!(messages(&issues), ["Unclosed '('"]);

        let issues = run("SELECT 1) AS X", false);
        assert_eq!(messages(&issues), ["Unexpected ')'"]);
    }

    #[test]
    fn test_braces_need_dcs_mode() {
        let text = "SELECT Products.Ref AS Ref FROM Catalog.Products AS Products {WHERE Products.Ref}";
        let issues = run(text, false);
        assert_eq!(
            messages(&issues),
            ["Data composition expressions in {} are allowed only in DCS mode"]
        );
        assert!(run(text, true).is_empty());
    }

    #[test]
    fn test_unknown_table_is_reported() {
        let issues = run(
            "SELECT 1 AS X FROM Catalog.Missing AS M\nJOIN Document.Sale AS S ON TRUE",
            false,
        );
        assert_eq!(messages(&issues), ["Object not found: Catalog.Missing"]);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].column, Some(20));
    }

    #[test]
    fn test_parameters_and_aliases() {
        assert!(run("SELECT 1 AS X WHERE &Period > 0", false).is_empty());

        let issues = run("SELECT 1 AS X WHERE & > 0", false);
        assert_eq!(messages(&issues), ["Parameter name expected after '&'"]);

        let issues = run("SELECT 1 AS X, 2 AS x", false);
        assert_eq!(messages(&issues), ["Duplicate alias: x"]);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_alias_named_like_a_table_type() {
        assert!(run("SELECT Task.Ref AS Ref FROM Catalog.Products AS Task", false).is_empty());
        assert!(run("ВЫБРАТЬ Задача.Ссылка КАК Ссылка ИЗ Документ.Sale КАК Задача", false).is_empty());

        let issues = run("SELECT Task.Ref AS Ref FROM Task.Missing AS Task", false);
        assert_eq!(messages(&issues), ["Object not found: Task.Missing"]);

        let issues = run("SELECT Task.Ref AS Ref FROM Task.Missing AS T", false);
        assert_eq!(
            messages(&issues),
            ["Object not found: Task.Ref", "Object not found: Task.Missing"]
        );
    }

    #[test]
    fn test_comments_are_ignored() {
        assert!(run("SELECT 1 AS X // FROM Catalog.Missing (", false).is_empty());
    }

    #[test]
    fn test_validate_before_load() {
        let project = project();
        let resource = BuiltinQueryLanguage
            .create_resource(&project, "/Demo/q.qldcs", false)
            .unwrap();
        assert!(matches!(
            resource.validate(&project),
            Err(CoreError::ResourceNotLoaded(_))
        ));
    }
}
