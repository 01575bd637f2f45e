use crate::errors::{ErrorKind, ParseError, ParseResult};
use crate::selector::{
    AttributeCondition, AttributeMatcher, CaseSensitivity, Condition, NamespaceSpec, Selector,
    SelectorList,
};
use crate::tokenizer::{Token, TokenType};
use crate::Css3;
use indexmap::IndexSet;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
    Column,
}

impl Combinator {
    fn combine(self, left: Selector, right: Selector) -> Selector {
        let (left, right) = (Box::new(left), Box::new(right));
        match self {
            Combinator::Descendant => Selector::Descendant {
                ancestor: left,
                simple: right,
            },
            Combinator::Child => Selector::Child {
                ancestor: left,
                simple: right,
            },
            Combinator::NextSibling => Selector::DirectAdjacent {
                first: left,
                sibling: right,
            },
            Combinator::SubsequentSibling => Selector::SubsequentSibling {
                first: left,
                sibling: right,
            },
            Combinator::Column => Selector::Column {
                ancestor: left,
                simple: right,
            },
        }
    }
}

impl Css3<'_> {
    /// Parses a standalone selector list; the whole input must be consumed
    pub(crate) fn parse_selectors_internal(&mut self) -> ParseResult<SelectorList> {
        log::trace!("parse_selectors_internal");

        let list = self.parse_selector_list(false)?;

        let t = self.tokenizer.lookahead_sc(0);
        if !t.is_eof() {
            return Err(self.unexpected(&t, "',' or end of selector"));
        }

        Ok(list)
    }

    /// Parses comma separated complex selectors up to `{`, `)` or the end of the input, which
    /// is not consumed. Duplicates are dropped with a warning.
    pub(crate) fn parse_selector_list(&mut self, relative: bool) -> ParseResult<SelectorList> {
        log::trace!("parse_selector_list");

        let mut selectors: IndexSet<Selector> = IndexSet::new();

        loop {
            self.consume_whitespace_comments();
            let start = self.tokenizer.lookahead(0);

            let selector = self.parse_complex_selector(relative)?;
            if !selectors.insert(selector) {
                self.report_warning(
                    ErrorKind::Duplicate,
                    "Duplicate selector dropped",
                    start.location,
                );
            }

            self.consume_whitespace_comments();
            let t = self.tokenizer.lookahead(0);
            if !t.is_comma() {
                break;
            }
            self.tokenizer.consume();
        }

        Ok(SelectorList::new(selectors.into_iter().collect()))
    }

    /// Compound selectors joined by combinators, folded to the left. In a relative selector a
    /// missing left operand is the scope.
    fn parse_complex_selector(&mut self, relative: bool) -> ParseResult<Selector> {
        log::trace!("parse_complex_selector");

        let mut result = if relative { Some(Selector::Scope) } else { None };
        let mut combinator: Option<Combinator> = None;

        loop {
            let had_space = self.consume_whitespace_comments();
            let t = self.tokenizer.lookahead(0);

            if let Some(found) = self.peek_combinator() {
                if result.is_none() || combinator.is_some() {
                    return Err(ParseError::syntax(
                        format!("Unexpected combinator '{t}'"),
                        t.location,
                    ));
                }

                if found == Combinator::Column {
                    self.tokenizer.consume();
                }
                self.tokenizer.consume();
                combinator = Some(found);
                continue;
            }

            if matches!(
                t.token_type,
                TokenType::Comma | TokenType::LCurly | TokenType::RParen | TokenType::Eof
            ) {
                if combinator.is_some() {
                    return Err(self.unexpected(&t, "selector after combinator"));
                }
                break;
            }

            let left = result.take();
            if let Some(left) = &left {
                let scope_only = matches!(left, Selector::Scope);
                if combinator.is_none() && !had_space && !scope_only {
                    return Err(self.unexpected(&t, "combinator"));
                }
            }

            let compound = self.parse_compound_selector()?;
            let used = combinator.take().unwrap_or(Combinator::Descendant);

            result = Some(match left {
                None => compound,
                Some(left) => used.combine(left, compound),
            });
        }

        match result {
            None | Some(Selector::Scope) => {
                let t = self.tokenizer.lookahead(0);
                Err(self.unexpected(&t, "selector"))
            }
            Some(selector) => Ok(selector),
        }
    }

    fn peek_combinator(&mut self) -> Option<Combinator> {
        let t = self.tokenizer.lookahead(0);
        match t.token_type {
            TokenType::Delim('>') => Some(Combinator::Child),
            TokenType::Delim('+') => Some(Combinator::NextSibling),
            TokenType::Delim('~') => Some(Combinator::SubsequentSibling),
            TokenType::Delim('|') => {
                let next = self.tokenizer.lookahead(1);
                (next.is_delim('|') && t.touches(&next)).then_some(Combinator::Column)
            }
            _ => None,
        }
    }

    /// A type or universal selector followed by any number of conditions, without whitespace
    fn parse_compound_selector(&mut self) -> ParseResult<Selector> {
        log::trace!("parse_compound_selector");

        let start = self.tokenizer.lookahead(0);
        let simple = self.parse_type_selector()?;

        let mut condition: Option<Condition> = None;
        loop {
            let t = self.tokenizer.lookahead(0);
            let next = match &t.token_type {
                TokenType::IDHash(name) => {
                    self.tokenizer.consume();
                    Condition::Id(name.clone())
                }
                TokenType::Hash(name) => {
                    return Err(ParseError::syntax(
                        format!("Invalid id selector '#{name}'"),
                        t.location,
                    ));
                }
                TokenType::Delim('.') => {
                    self.tokenizer.consume();
                    let name_token = self.tokenizer.consume();
                    match name_token.token_type {
                        TokenType::Ident(name) if t.touches(&name_token) => Condition::Class(name),
                        _ => return Err(self.unexpected(&name_token, "class name")),
                    }
                }
                TokenType::LBracket => {
                    self.tokenizer.consume();
                    self.parse_attribute_selector(&t)?
                }
                TokenType::Colon => {
                    self.tokenizer.consume();
                    self.parse_pseudo(&t)?
                }
                TokenType::Ident(_) | TokenType::Delim('*') => {
                    return Err(ParseError::syntax(
                        "A type selector must come first in a compound selector",
                        t.location,
                    ));
                }
                _ => break,
            };

            condition = Some(match condition {
                None => next,
                Some(previous) => Condition::And(Box::new(previous), Box::new(next)),
            });
        }

        match (simple, condition) {
            (Some(simple), None) => Ok(simple),
            (simple, Some(condition)) => Ok(Selector::Conditional {
                simple: Box::new(simple.unwrap_or_else(|| Selector::Universal {
                    namespace: self.default_namespace(),
                })),
                condition,
            }),
            (None, None) => Err(self.unexpected(&start, "selector")),
        }
    }

    /// `*`, `name`, `ns|name`, `*|name`, `|name` and friends. Returns `None` when the compound
    /// starts with a condition.
    fn parse_type_selector(&mut self) -> ParseResult<Option<Selector>> {
        let t = self.tokenizer.lookahead(0);

        let namespace = match self.parse_namespace_prefix()? {
            Some(namespace) => namespace,
            None => {
                return Ok(match t.token_type {
                    TokenType::Ident(name) => {
                        self.tokenizer.consume();
                        Some(Selector::Element {
                            local_name: name,
                            namespace: self.default_namespace(),
                        })
                    }
                    TokenType::Delim('*') => {
                        self.tokenizer.consume();
                        Some(Selector::Universal {
                            namespace: self.default_namespace(),
                        })
                    }
                    _ => None,
                });
            }
        };

        let name = self.tokenizer.consume();
        match name.token_type {
            TokenType::Ident(local_name) => Ok(Some(Selector::Element {
                local_name,
                namespace,
            })),
            TokenType::Delim('*') => Ok(Some(Selector::Universal { namespace })),
            _ => Err(self.unexpected(&name, "element name or '*'")),
        }
    }

    /// Consumes `prefix|`, `*|` or `|` when the next tokens form one
    fn parse_namespace_prefix(&mut self) -> ParseResult<Option<NamespaceSpec>> {
        let t0 = self.tokenizer.lookahead(0);
        let t1 = self.tokenizer.lookahead(1);
        let t2 = self.tokenizer.lookahead(2);

        let is_bar = |t: &Token, prev: &Token| t.is_delim('|') && prev.touches(t);
        let names_something = |t: &Token, prev: &Token| {
            prev.touches(t) && (t.is_ident() || t.is_delim('*'))
        };

        let namespace = match &t0.token_type {
            TokenType::Delim('|') if names_something(&t1, &t0) => {
                self.tokenizer.consume();
                return Ok(Some(NamespaceSpec::None));
            }
            TokenType::Delim('*') if is_bar(&t1, &t0) && names_something(&t2, &t1) => {
                NamespaceSpec::Any
            }
            TokenType::Ident(prefix) if is_bar(&t1, &t0) && names_something(&t2, &t1) => {
                self.resolve_prefix(prefix, &t0)?
            }
            _ => return Ok(None),
        };

        self.tokenizer.consume();
        self.tokenizer.consume();
        Ok(Some(namespace))
    }

    fn resolve_prefix(&self, prefix: &str, t: &Token) -> ParseResult<NamespaceSpec> {
        match self.namespaces.get(prefix) {
            Some(uri) if !prefix.is_empty() => Ok(NamespaceSpec::Prefixed {
                prefix: prefix.to_string(),
                uri: uri.clone(),
            }),
            _ => Err(ParseError::new(
                ErrorKind::Namespace,
                format!("Unknown namespace prefix '{prefix}'"),
                t.location,
            )),
        }
    }

    fn default_namespace(&self) -> NamespaceSpec {
        match self.namespaces.get("") {
            Some(uri) => NamespaceSpec::Default(uri.clone()),
            None => NamespaceSpec::Unspecified,
        }
    }

    /// `[` has been consumed
    fn parse_attribute_selector(&mut self, open: &Token) -> ParseResult<Condition> {
        log::trace!("parse_attribute_selector");

        self.consume_whitespace_comments();

        // attributes never take the default namespace
        let namespace = self.parse_namespace_prefix()?.unwrap_or(NamespaceSpec::Unspecified);
        let name = self.consume_any_ident()?;

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        let matcher = match t.token_type {
            TokenType::RBracket => {
                return Ok(Condition::Attribute(AttributeCondition {
                    name,
                    namespace,
                    matcher: AttributeMatcher::Exists,
                    value: None,
                    case: CaseSensitivity::Default,
                }));
            }
            TokenType::Delim('=') => AttributeMatcher::Equals,
            TokenType::Delim(c @ ('~' | '|' | '^' | '$' | '*')) => {
                let eq = self.tokenizer.consume();
                if !eq.is_delim('=') || !t.touches(&eq) {
                    return Err(self.unexpected(&eq, "'='"));
                }
                match c {
                    '~' => AttributeMatcher::OneOf,
                    '|' => AttributeMatcher::BeginsHyphen,
                    '^' => AttributeMatcher::Begins,
                    '$' => AttributeMatcher::Ends,
                    _ => AttributeMatcher::Substring,
                }
            }
            TokenType::Eof => return Err(ParseError::syntax("Unclosed '['", open.location)),
            _ => return Err(self.unexpected(&t, "attribute matcher or ']'")),
        };

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        let value = match t.token_type {
            TokenType::Ident(value) | TokenType::QuotedString(value) => value,
            _ => return Err(self.unexpected(&t, "identifier or string")),
        };

        self.consume_whitespace_comments();
        let mut case = CaseSensitivity::Default;
        let t = self.tokenizer.lookahead(0);
        if let TokenType::Ident(flag) = &t.token_type {
            case = match flag.to_ascii_lowercase().as_str() {
                "i" => CaseSensitivity::Insensitive,
                "s" => CaseSensitivity::Sensitive,
                _ => return Err(self.unexpected(&t, "attribute flag 'i' or 's'")),
            };
            self.tokenizer.consume();
            self.consume_whitespace_comments();
        }

        let t = self.tokenizer.consume();
        match t.token_type {
            TokenType::RBracket => {}
            TokenType::Eof => return Err(ParseError::syntax("Unclosed '['", open.location)),
            _ => return Err(self.unexpected(&t, "']'")),
        }

        Ok(Condition::Attribute(AttributeCondition {
            name,
            namespace,
            matcher,
            value: Some(value),
            case,
        }))
    }
}

#[cfg(test)]
mod test {
    use crate::selector::{Condition, NamespaceSpec, Selector};
    use crate::{CollectErrors, CssParser, ErrorKind};
    use cascara_shared::byte_stream::{ByteStream, Stream};
    use test_case::test_case;

    fn parse(input: &str) -> String {
        CssParser::new().parse_selectors_str(input).unwrap().to_string()
    }

    #[test]
    fn combinator_nesting() {
        let list = CssParser::new()
            .parse_selectors_str(".ancestor .parent>.child ~ .childsibling:foo")
            .unwrap();
        assert_eq!(list.len(), 1);

        let Some(Selector::SubsequentSibling { first, sibling }) = list.get(0) else {
            panic!("expected a subsequent sibling selector");
        };
        assert_eq!(sibling.to_string(), ".childsibling:foo");

        let Selector::Child { ancestor, simple } = first.as_ref() else {
            panic!("expected a child selector");
        };
        assert_eq!(simple.to_string(), ".child");

        let Selector::Descendant { ancestor, simple } = ancestor.as_ref() else {
            panic!("expected a descendant selector");
        };
        assert_eq!(ancestor.to_string(), ".ancestor");
        assert_eq!(simple.to_string(), ".parent");
    }

    #[test]
    fn compound_folding() {
        let list = CssParser::new().parse_selectors_str("p.a.b#id:hover").unwrap();
        let Some(Selector::Conditional { simple, condition }) = list.get(0) else {
            panic!("expected a conditional selector");
        };
        assert_eq!(simple.to_string(), "p");

        let Condition::And(left, right) = condition else {
            panic!("expected an and condition");
        };
        assert!(matches!(right.as_ref(), Condition::PseudoClass { name, .. } if name == "hover"));
        assert_eq!(left.to_string(), ".a.b#id");
        assert_eq!(condition.flatten().len(), 4);
    }

    #[test_case("a  >  b", "a>b")]
    #[test_case("a /* c */ b", "a b")]
    #[test_case("a + b ~ c", "a+b~c")]
    #[test_case("col.selected || td", "col.selected||td")]
    #[test_case("*", "*")]
    #[test_case("*.x", ".x")]
    #[test_case("[ title ]", "[title]")]
    #[test_case("a[href $= '.pdf' i]", "a[href$=\".pdf\" i]")]
    #[test_case("[lang|=en]", "[lang|=\"en\"]")]
    #[test_case("[*|att]", "[*|att]")]
    #[test_case("[|att=x s]", "[|att=\"x\" s]")]
    #[test_case(".\\31 23", ".\\31 23")]
    #[test_case("a, b ,c", "a,b,c")]
    fn serialized(input: &str, expected: &str) {
        assert_eq!(parse(input), expected);
    }

    #[test_case("> a" ; "leading combinator")]
    #[test_case("a > > b" ; "double combinator")]
    #[test_case("a >> b" ; "double child")]
    #[test_case("a ~~ b" ; "double sibling")]
    #[test_case("a >" ; "trailing combinator")]
    #[test_case(", a" ; "empty before comma")]
    #[test_case("a," ; "empty after comma")]
    #[test_case("a,,b" ; "empty between commas")]
    #[test_case("#1a" ; "digit id")]
    #[test_case(". a" ; "bare dot")]
    #[test_case("a." ; "trailing dot")]
    #[test_case("[a" ; "unclosed attribute")]
    #[test_case("[a=]" ; "missing value")]
    #[test_case("[a=1]" ; "number value")]
    #[test_case("[a~b]" ; "bad matcher")]
    #[test_case("[a=b x]" ; "bad flag")]
    #[test_case("ns|a" ; "unknown prefix")]
    #[test_case("a*" ; "type after condition")]
    #[test_case("" ; "empty")]
    #[test_case("a {" ; "trailing brace")]
    fn rejected(input: &str) {
        assert!(CssParser::new().parse_selectors_str(input).is_err(), "{input}");
    }

    #[test]
    fn duplicates_are_dropped() {
        let mut stream = ByteStream::new(None);
        stream.read_from_str("p, .a, p, .a , .b");
        stream.close();

        let mut errors = CollectErrors::new();
        let list = CssParser::new().parse_selectors(&mut stream, &mut errors).unwrap();

        assert_eq!(list.to_string(), "p,.a,.b");
        assert_eq!(errors.warnings.len(), 2);
        assert!(errors.warnings.iter().all(|w| w.kind == ErrorKind::Duplicate));
        assert!(errors.errors.is_empty());
    }

    #[test]
    fn error_location() {
        let err = CssParser::new().parse_selectors_str("a, b >").unwrap_err();
        let err = err.as_parse_error().unwrap();
        assert_eq!((err.line, err.column), (1, 7));
    }

    #[test]
    fn namespaces() {
        let mut namespaces = crate::Namespaces::new();
        namespaces.insert("svg".into(), "http://www.w3.org/2000/svg".into());

        let parser = CssParser::new();
        let condition = parser
            .parse_supports_condition("selector(svg|rect)", Some(&namespaces))
            .unwrap();
        assert_eq!(condition.to_string(), "selector(svg|rect)");

        let list = parser.parse_selectors_str("*|p, |p").unwrap();
        assert!(matches!(
            list.get(0),
            Some(Selector::Element {
                namespace: NamespaceSpec::Any,
                ..
            })
        ));
        assert!(matches!(
            list.get(1),
            Some(Selector::Element {
                namespace: NamespaceSpec::None,
                ..
            })
        ));
    }
}
