use cascara_css::selector::Selector;
use cascara_css::{
    CollectErrors, CssEvent, CssParser, ErrorKind, EventRecorder, Flags, LexicalType,
};
use simple_logger::SimpleLogger;
use test_case::test_case;

fn parse_sheet(parser: &CssParser, css: &str) -> (EventRecorder, CollectErrors) {
    // only the first test to get here installs the logger
    let _ = SimpleLogger::new().with_level(log::LevelFilter::Warn).env().init();

    let mut events = EventRecorder::new();
    let mut errors = CollectErrors::new();
    parser
        .parse_style_sheet_str(css, &mut events, &mut errors)
        .unwrap();
    (events, errors)
}

fn parse_declarations(css: &str) -> (EventRecorder, CollectErrors) {
    let mut events = EventRecorder::new();
    let mut errors = CollectErrors::new();
    CssParser::new()
        .parse_style_declaration_str(css, &mut events, &mut errors)
        .unwrap();
    (events, errors)
}

#[test]
fn color_components_are_not_clamped() {
    let (events, errors) = parse_sheet(&CssParser::new(), "p { color: rgb(300,400,500) }");

    assert!(errors.errors.is_empty());
    assert!(!errors.warnings.is_empty());

    let properties = events.properties();
    assert_eq!(properties.len(), 1);

    let (name, value, important) = properties[0];
    assert_eq!(name, "color");
    assert!(!important);

    let head = value.head();
    assert_eq!(head.lexical_type(), LexicalType::RgbColor);
    let components: Vec<i32> = head
        .iter_parameters()
        .filter(|u| u.lexical_type() == LexicalType::Integer)
        .map(|u| u.integer_value())
        .collect();
    assert_eq!(components, vec![300, 400, 500]);
}

#[test_case("--Box-shadow-inset:" ; "at end of input")]
#[test_case("--My-property:;" ; "before semicolon")]
fn empty_custom_property(css: &str) {
    let (events, errors) = parse_declarations(css);
    assert!(errors.errors.is_empty());

    let properties = events.properties();
    assert_eq!(properties.len(), 1);

    let (name, value, _) = properties[0];
    assert!(name.starts_with("--"));
    assert_eq!(value.head().lexical_type(), LexicalType::Empty);
    assert_eq!(value.head().string_value(), Some(""));
    assert!(value.head().next().is_none());
    assert_eq!(value.to_string(), "");
}

#[test]
fn unicode_range_bounds() {
    let (events, errors) = parse_sheet(
        &CssParser::new(),
        "@font-face { font-family: x; unicode-range: U+0025-00FF }",
    );
    assert!(errors.errors.is_empty());

    let properties = events.properties();
    let (_, value, _) = properties
        .iter()
        .find(|p| p.0 == "unicode-range")
        .copied()
        .unwrap();

    let head = value.head();
    assert_eq!(head.lexical_type(), LexicalType::UnicodeRange);
    let bounds: Vec<i32> = head.sub_values().unwrap().iter().map(|u| u.integer_value()).collect();
    assert_eq!(bounds, vec![37, 255]);
    assert_eq!(value.to_string(), "U+25-ff");
}

#[test]
fn combinators_nest_to_the_left() {
    let list = CssParser::new()
        .parse_selectors_str(".ancestor .parent>.child ~ .childsibling:foo")
        .unwrap();
    assert_eq!(list.len(), 1);

    let Some(Selector::SubsequentSibling { first, .. }) = list.get(0) else {
        panic!("expected a subsequent sibling selector");
    };
    let Selector::Child { ancestor, .. } = first.as_ref() else {
        panic!("expected a child selector");
    };
    let Selector::Descendant { ancestor, .. } = ancestor.as_ref() else {
        panic!("expected a descendant selector");
    };
    assert_eq!(ancestor.to_string(), ".ancestor");
}

#[test_case("n - 1 2")]
#[test_case("n - b1")]
#[test_case("n-+1")]
#[test_case("n+-1")]
#[test_case("n +-1")]
#[test_case("n +- 1")]
#[test_case("n -+ 1")]
#[test_case("n + - 1")]
#[test_case("n - + 1")]
#[test_case("n -1n")]
#[test_case("n - +b1")]
#[test_case("n -b1")]
#[test_case("n b1")]
#[test_case("n 1")]
#[test_case("- - 1")]
fn an_plus_b_rejected(argument: &str) {
    let selector = format!("li:nth-child({argument})");
    assert!(CssParser::new().parse_selectors_str(&selector).is_err(), "{selector}");
}

#[test]
fn malformed_rule_is_skipped() {
    let (events, errors) = parse_sheet(
        &CssParser::new(),
        "input:not(){}body:not(.foo)[id*=substring] .header {margin-left:0;margin-right:auto;}",
    );

    let selectors = events.selectors();
    assert_eq!(selectors.len(), 1);
    assert_eq!(
        selectors[0].to_string(),
        "body:not(.foo)[id*=\"substring\"] .header"
    );

    let names: Vec<&str> = events.properties().iter().map(|p| p.0).collect();
    assert_eq!(names, vec!["margin-left", "margin-right"]);

    assert_eq!(errors.errors.len(), 1);
    assert_eq!(errors.errors[0].line, 1);
    assert_eq!(errors.errors[0].column, 11);
}

#[test]
fn backslash_nine_hack_is_gated() {
    let css = "p { width: 600px\\9 }";

    let (events, errors) = parse_sheet(&CssParser::new(), css);
    assert!(events.properties().is_empty());
    assert_eq!(errors.errors.len(), 1);
    assert_eq!(errors.errors[0].kind, ErrorKind::Compat);

    let mut parser = CssParser::new();
    parser.set_flag(Flags::IEVALUES);
    let (events, errors) = parse_sheet(&parser, css);
    assert!(errors.errors.is_empty());
    assert_eq!(errors.warnings.len(), 1);

    let properties = events.properties();
    assert_eq!(properties.len(), 1);
    let (name, value, _) = properties[0];
    assert_eq!(name, "width");
    assert_eq!(value.head().lexical_type(), LexicalType::CompatIdent);
    assert_eq!(value.head().string_value(), Some("600px\\9"));
}

#[test]
fn supports_operators_need_grouping() {
    let parser = CssParser::new();
    assert!(parser
        .parse_supports_condition(
            "(transition-property: color) and (animation-name: foo) or (transform: rotate(10deg))",
            None,
        )
        .is_err());
    assert!(parser
        .parse_supports_condition(
            "((transition-property: color) and (animation-name: foo)) or (transform: rotate(10deg))",
            None,
        )
        .is_ok());

    let (events, errors) = parse_sheet(
        &parser,
        "@supports (a: b) and (c: d) or (e: f) { p { x: y } } q { z: w }",
    );
    let names: Vec<&str> = events.properties().iter().map(|p| p.0).collect();
    assert_eq!(names, vec!["z"]);
    assert_eq!(errors.errors.len(), 1);
}

#[test]
fn charset_must_come_first() {
    let parser = CssParser::new();

    let (events, errors) = parse_sheet(&parser, "/* header */\n@charset \"utf-8\";\np { a: b }");
    assert!(errors.errors.is_empty());
    assert_eq!(events.properties().len(), 1);

    let (events, errors) = parse_sheet(&parser, "p { a: b }\n@charset \"utf-8\";\nq { c: d }");
    assert_eq!(errors.errors.len(), 1);
    assert_eq!(errors.errors[0].line, 2);
    let names: Vec<&str> = events.properties().iter().map(|p| p.0).collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[test]
fn every_event_is_balanced() {
    let (events, _) = parse_sheet(
        &CssParser::new(),
        "@namespace svg url(http://www.w3.org/2000/svg);\n\
         @media print { @supports (display: grid) { p { a: b } } }\n\
         @page :first { margin: 1in; @top-left { content: 'x' } }\n\
         @keyframes spin { from { a: b } 50%, to { c: d } }\n\
         @font-feature-values Font One { @styleset { nice-style: 12; } }\n\
         @counter-style thumbs { system: cyclic; symbols: x }\n\
         @property --x { syntax: '<length>'; inherits: false; initial-value: 0px }\n\
         @viewport { width: device-width }\n\
         svg|rect { fill: red",
    );

    let mut depth = 0i32;
    for event in events.events() {
        if event.closes() {
            depth -= 1;
        }
        assert!(depth >= 0, "{event:?}");
        if event.opens() {
            depth += 1;
        }
    }
    assert_eq!(depth, 0);
    assert!(matches!(events.events().last(), Some(CssEvent::EndOfStream)));
}

#[test_case(".a.b#id:hover > p ~ *")]
#[test_case("svg|*, *|a[href^='http' i]")]
#[test_case("li:nth-child(-2n+3 of .x):not(:first-child)")]
#[test_case("a::before, p:has(> img, + p)")]
#[test_case(".\\31 0")]
#[test_case("a-->b")]
fn selectors_round_trip(input: &str) {
    let parser = CssParser::new();
    let mut errors = CollectErrors::new();
    let mut namespaces = cascara_css::Namespaces::new();
    namespaces.insert("svg".into(), "http://www.w3.org/2000/svg".into());

    let first = parse_selectors_with(&parser, input, &namespaces, &mut errors);
    let serialized = first.to_string();
    let second = parse_selectors_with(&parser, &serialized, &namespaces, &mut errors);

    assert_eq!(first, second);
    assert_eq!(second.to_string(), serialized);
    assert!(errors.errors.is_empty());
}

fn parse_selectors_with(
    parser: &CssParser,
    input: &str,
    namespaces: &cascara_css::Namespaces,
    errors: &mut CollectErrors,
) -> cascara_css::SelectorList {
    let mut events = EventRecorder::new();
    let prefixes: String = namespaces
        .iter()
        .map(|(prefix, uri)| format!("@namespace {prefix} url({uri});"))
        .collect();
    parser
        .parse_style_sheet_str(&format!("{prefixes}{input} {{}}"), &mut events, errors)
        .unwrap();
    events.selectors()[0].clone()
}

#[test_case("calc(100% - 2*3px)")]
#[test_case("rgb(10 20 30 / 50%), #ABCDEF")]
#[test_case("var(--x, 1px 2px)")]
#[test_case("'a\\\"b' url(x.png) U+4??")]
#[test_case("cubic-bezier(0.1, 0.7, 1.0, 0.1) steps(4, end)")]
fn values_round_trip(input: &str) {
    let parser = CssParser::new();

    let first = parser.parse_property_value(input).unwrap();
    let serialized = first.to_string();
    let second = parser.parse_property_value(&serialized).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.to_string(), serialized);
}
