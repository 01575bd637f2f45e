use crate::errors::{ParseError, ParseResult};
use crate::parser::declaration::NestedAtRules;
use crate::parser::stylesheet::SheetState;
use crate::tokenizer::{Token, TokenType};
use crate::Css3;

const FEATURE_MAPS: [&str; 7] = [
    "swash",
    "annotation",
    "ornaments",
    "stylistic",
    "styleset",
    "character-variant",
    "historical-forms",
];

impl Css3<'_> {
    /// `@font-feature-values family, ... { feature maps }`
    pub(crate) fn parse_font_feature_values_rule(&mut self) -> ParseResult<()> {
        log::trace!("parse_font_feature_values_rule");

        let family_names = self.parse_family_names()?;

        let open = self.open_block()?;
        self.sheet_state = SheetState::Body;

        self.handler.start_font_features(&family_names);
        self.parse_declaration_list(NestedAtRules::FeatureMaps, false);
        self.close_block(&open);
        self.handler.end_font_features(&family_names);

        Ok(())
    }

    /// Family names are strings or runs of identifiers, separated by commas
    fn parse_family_names(&mut self) -> ParseResult<Vec<String>> {
        let mut names = Vec::new();

        loop {
            self.consume_whitespace_comments();
            let t = self.tokenizer.consume();
            let name = match t.token_type {
                TokenType::QuotedString(name) => name,
                TokenType::Ident(first) => {
                    let mut words = vec![first];
                    while self.tokenizer.lookahead_sc(0).is_ident() {
                        self.consume_whitespace_comments();
                        words.push(self.consume_any_ident()?);
                    }
                    words.join(" ")
                }
                _ => return Err(self.unexpected(&t, "font family name")),
            };
            names.push(name);

            if !self.tokenizer.lookahead_sc(0).is_comma() {
                return Ok(names);
            }
            self.consume_whitespace_comments();
            self.tokenizer.consume();
        }
    }

    /// A feature map block such as `@swash { fancy: 1 }`
    pub(crate) fn parse_feature_map(&mut self, name: &str, at_keyword: &Token) -> ParseResult<()> {
        log::trace!("parse_feature_map");

        if !FEATURE_MAPS.contains(&name) {
            return Err(ParseError::syntax(
                format!("Unknown feature map '{at_keyword}'"),
                at_keyword.location,
            ));
        }

        let open = self.open_block()?;

        self.handler.start_feature_map(name);
        self.parse_declaration_list(NestedAtRules::None, false);
        self.close_block(&open);
        self.handler.end_feature_map(name);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{CollectErrors, CssParser, EventRecorder};

    #[test]
    fn feature_maps() {
        let mut events = EventRecorder::new();
        let mut errors = CollectErrors::new();
        CssParser::new()
            .parse_style_sheet_str(
                "@font-feature-values Font One, \"Other Font\" { font-display: swap; \
                 @styleset { nice-style: 12; } @swash { fancy: 1 } @bogus { x: 1 } }",
                &mut events,
                &mut errors,
            )
            .unwrap();

        assert_eq!(errors.errors.len(), 1);
        assert_eq!(
            events.walk_to_string(),
            "[ParseStart]\n\
             [StartFontFeatures] Font One, Other Font\n  \
               [Property] font-display: swap\n  \
               [StartFeatureMap] styleset\n    \
                 [Property] nice-style: 12\n  \
               [EndFeatureMap] styleset\n  \
               [StartFeatureMap] swash\n    \
                 [Property] fancy: 1\n  \
               [EndFeatureMap] swash\n\
             [EndFontFeatures] Font One, Other Font\n\
             [EndOfStream]\n"
        );
    }
}
