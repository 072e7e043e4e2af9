//! Style instruction parsing
//!
//! A user message is matched against a fixed phrase table. Each option group is an
//! ordered rule list and the first phrase in declared order that appears in the
//! lower-cased message wins. Unmatched options keep their defaults; parsing never fails.

use geomap_core::models::{
    ClassificationScheme, ColorScheme, LegendLocation, LegendSize, NorthArrowPosition, StyleConfig,
};

const LEGEND_LOCATION_RULES: &[(&str, LegendLocation)] = &[
    ("legend to right", LegendLocation::UpperRight),
    ("legend to left", LegendLocation::UpperLeft),
    ("legend to bottom left", LegendLocation::LowerLeft),
    ("legend to bottom right", LegendLocation::LowerRight),
];

const LEGEND_SIZE_RULES: &[(&str, LegendSize)] =
    &[("legend size small", LegendSize::Small), ("legend size large", LegendSize::Large)];

const NORTH_ARROW_RULES: &[(&str, NorthArrowPosition)] = &[
    ("north arrow to top left", NorthArrowPosition::TopLeft),
    ("north arrow to top right", NorthArrowPosition::TopRight),
    ("north arrow to bottom right", NorthArrowPosition::BottomRight),
    ("north arrow to bottom left", NorthArrowPosition::BottomLeft),
    ("north arrow to bottom", NorthArrowPosition::BottomRight),
];

const COLOR_SCHEME_RULES: &[(&str, ColorScheme)] = &[
    ("color scheme blues", ColorScheme::Blues),
    ("color scheme reds", ColorScheme::Reds),
    ("color scheme greens", ColorScheme::Greens),
    ("color scheme purples", ColorScheme::Purples),
    ("color scheme ylgn", ColorScheme::YlGn),
];

const CLASSIFICATION_RULES: &[(&str, ClassificationScheme)] = &[
    ("equal interval", ClassificationScheme::EqualInterval),
    ("quantile", ClassificationScheme::Quantiles),
    ("natural breaks", ClassificationScheme::NaturalBreaks),
];

/// Accepted range for "<n> classes"
const MIN_CLASSES: usize = 2;
const MAX_CLASSES: usize = 10;

fn first_match<T: Copy>(message: &str, rules: &[(&str, T)]) -> Option<T> {
    rules.iter().find(|(phrase, _)| message.contains(phrase)).map(|(_, value)| *value)
}

/// Derive a complete style configuration from a user message
pub fn parse_style_instructions(message: &str) -> StyleConfig {
    let lower = message.to_lowercase();
    let mut style = StyleConfig::default();

    if let Some(loc) = first_match(&lower, LEGEND_LOCATION_RULES) {
        style.legend_loc = loc;
    }
    if let Some(size) = first_match(&lower, LEGEND_SIZE_RULES) {
        style.legend_size = size;
    }
    if let Some(pos) = first_match(&lower, NORTH_ARROW_RULES) {
        style.north_arrow_position = pos;
    }
    if let Some(scheme) = first_match(&lower, COLOR_SCHEME_RULES) {
        style.color_scheme = scheme;
    }
    if let Some(scheme) = first_match(&lower, CLASSIFICATION_RULES) {
        style.classification_scheme = scheme;
    }
    if let Some(k) = class_count(&lower) {
        style.k_classes = k;
    }
    if lower.contains("show grid") {
        style.grid = true;
    }
    if lower.contains("hide scale bar") {
        style.scale_bar = false;
    }

    style.title = extract_title(message);
    style.legend_title = extract_legend_title(message);
    style
}

/// "<n> classes" with n in the accepted range
fn class_count(lower: &str) -> Option<usize> {
    let words: Vec<&str> = lower.split_whitespace().collect();
    words.windows(2).find_map(|pair| {
        let unit = pair[1].trim_end_matches(|c: char| !c.is_alphanumeric());
        if unit != "classes" {
            return None;
        }
        pair[0].parse::<usize>().ok().filter(|k| (MIN_CLASSES..=MAX_CLASSES).contains(k))
    })
}

/// Text following `offset` up to the next period, trimmed
fn text_until_period(message: &str, offset: usize) -> Option<String> {
    let rest = &message[offset..];
    let text = rest.split('.').next().unwrap_or("").trim().trim_start_matches(':').trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Map title: the text after the first "title" that is not part of "legend title"
pub fn extract_title(message: &str) -> Option<String> {
    let lower = message.to_ascii_lowercase();
    let start = lower
        .match_indices("title")
        .map(|(idx, _)| idx)
        .find(|idx| !lower[..*idx].trim_end().ends_with("legend"))?;
    text_until_period(message, start + "title".len())
}

/// Legend title: the text after "legend title"
pub fn extract_legend_title(message: &str) -> Option<String> {
    let lower = message.to_ascii_lowercase();
    let start = lower.find("legend title")?;
    text_until_period(message, start + "legend title".len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_phrases_gives_defaults() {
        assert_eq!(parse_style_instructions("show me a map of income"), StyleConfig::default());
        assert_eq!(parse_style_instructions(""), StyleConfig::default());
    }

    #[test]
    fn test_legend_right_and_grid() {
        let style = parse_style_instructions("legend to right, show grid");
        assert_eq!(style.legend_loc, LegendLocation::UpperRight);
        assert!(style.grid);

        let expected = StyleConfig { legend_loc: LegendLocation::UpperRight, grid: true, ..Default::default() };
        assert_eq!(style, expected);
    }

    #[test]
    fn test_case_insensitive() {
        let style = parse_style_instructions("Map it with COLOR SCHEME Reds and Hide Scale Bar");
        assert_eq!(style.color_scheme, ColorScheme::Reds);
        assert!(!style.scale_bar);
    }

    #[test]
    fn test_first_declared_rule_wins() {
        let style = parse_style_instructions("legend to left and legend to right");
        assert_eq!(style.legend_loc, LegendLocation::UpperRight);

        let style = parse_style_instructions("color scheme purples then color scheme blues");
        assert_eq!(style.color_scheme, ColorScheme::Blues);
    }

    #[test]
    fn test_north_arrow_positions() {
        let cases = [
            ("north arrow to top left", NorthArrowPosition::TopLeft),
            ("north arrow to bottom left", NorthArrowPosition::BottomLeft),
            ("north arrow to bottom right", NorthArrowPosition::BottomRight),
            ("north arrow to bottom", NorthArrowPosition::BottomRight),
        ];
        for (message, expected) in cases {
            assert_eq!(parse_style_instructions(message).north_arrow_position, expected, "{}", message);
        }
    }

    #[test]
    fn test_legend_size() {
        assert_eq!(parse_style_instructions("legend size large").legend_size, LegendSize::Large);
        assert_eq!(parse_style_instructions("legend size small").legend_size, LegendSize::Small);
    }

    #[test]
    fn test_classification_and_class_count() {
        let style = parse_style_instructions("use quantiles with 7 classes");
        assert_eq!(style.classification_scheme, ClassificationScheme::Quantiles);
        assert_eq!(style.k_classes, 7);

        assert_eq!(parse_style_instructions("40 classes").k_classes, 5);
        assert_eq!(parse_style_instructions("equal interval").classification_scheme, ClassificationScheme::EqualInterval);
    }

    #[test]
    fn test_title_extraction() {
        assert_eq!(extract_title("Map income with title Household Income. Thanks"), Some("Household Income".to_string()));
        assert_eq!(extract_title("map of income"), None);
        assert_eq!(extract_title("add a title."), None);
        assert_eq!(extract_title("Title: Rivers of Java"), Some("Rivers of Java".to_string()));
    }

    #[test]
    fn test_legend_title_is_not_the_map_title() {
        let message = "map income with legend title USD. title Income by State.";
        assert_eq!(extract_legend_title(message), Some("USD".to_string()));
        assert_eq!(extract_title(message), Some("Income by State".to_string()));

        assert_eq!(extract_title("legend title USD only"), None);

        let style = parse_style_instructions(message);
        assert_eq!(style.legend_title.as_deref(), Some("USD"));
        assert_eq!(style.title.as_deref(), Some("Income by State"));
    }

    proptest! {
        #[test]
        fn legend_to_right_always_wins(prefix in "[a-z ,]{0,40}", suffix in "[a-z ,]{0,40}") {
            let message = format!("{}legend to right{}", prefix, suffix);
            prop_assert_eq!(parse_style_instructions(&message).legend_loc, LegendLocation::UpperRight);
        }

        #[test]
        fn digits_alone_keep_defaults(message in "[0-9 ]{0,40}") {
            prop_assert_eq!(parse_style_instructions(&message), StyleConfig::default());
        }
    }
}
