use std::collections::BTreeMap;

use text_remove_gap::{
    GapConfig, GapError, SpaceValues, TextRemoveGap, remove_text_gap, remove_text_gap_no_sourcemap,
};

const ARIAL_2: &str = "p {font: 16px/2 \"Arial\", sans-serif;";

fn run(input: &str, config: &GapConfig) -> String {
    remove_text_gap_no_sourcemap(input, config).unwrap()
}

fn check(input: &str, expected: &str) {
    assert_eq!(run(input, &GapConfig::default()), expected, "input: {input}");
}

/// `p::before`/`p::after` rules as the transform prints them.
fn pseudo(selector: &str, before: Option<&str>, after: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(b) = before {
        out.push_str(&format!(
            "\n{selector}::before {{display: table;content: \"\";margin-bottom: {b};}}"
        ));
    }
    if let Some(a) = after {
        out.push_str(&format!(
            "\n{selector}::after {{display: table;content: \"\";margin-top: {a};}}"
        ));
    }
    out
}

#[test]
fn rules_without_directive_are_untouched() {
    check(
        "p {font: 16px/2 \"Arial\", sans-serif;}",
        "p {font: 16px/2 \"Arial\", sans-serif;}",
    );
}

#[test]
fn inside_placements() {
    let kept = format!("{ARIAL_2}}}");
    check(
        &format!("{ARIAL_2} text-remove-gap: both;}}"),
        &(kept.clone() + &pseudo("p", Some("-0.63em"), Some("-0.67em"))),
    );
    check(
        &format!("{ARIAL_2} text-remove-gap: before;}}"),
        &(kept.clone() + &pseudo("p", Some("-0.63em"), None)),
    );
    check(
        &format!("{ARIAL_2} text-remove-gap: after;}}"),
        &(kept + &pseudo("p", None, Some("-0.67em"))),
    );
}

#[test]
fn outside_placements() {
    check(
        &format!("{ARIAL_2} text-remove-gap: outside both;}}"),
        &format!("{ARIAL_2} margin-top: -0.63em; margin-bottom: -0.67em;}}"),
    );
    check(
        &format!("{ARIAL_2} text-remove-gap: outside before;}}"),
        &format!("{ARIAL_2} margin-top: -0.63em;}}"),
    );
    check(
        &format!("{ARIAL_2} text-remove-gap: outside after;}}"),
        &format!("{ARIAL_2} margin-bottom: -0.67em;}}"),
    );
}

#[test]
fn directive_overrides_family_and_line_height() {
    check(
        &format!("{ARIAL_2} text-remove-gap: both \"Times New Roman\";}}"),
        &(format!("{ARIAL_2}}}") + &pseudo("p", Some("-0.67em"), Some("-0.66em"))),
    );
    check(
        &format!("{ARIAL_2} text-remove-gap: both 1.5;}}"),
        &(format!("{ARIAL_2}}}") + &pseudo("p", Some("-0.38em"), Some("-0.42em"))),
    );
    check(
        &format!("{ARIAL_2} text-remove-gap: outside both 1.5 \"Times New Roman\", serif;}}"),
        &format!("{ARIAL_2} margin-top: -0.42em; margin-bottom: -0.41em;}}"),
    );
}

#[test]
fn explicit_zero_line_height_falls_back_to_the_rule() {
    check(
        &format!("{ARIAL_2} text-remove-gap: outside both 0;}}"),
        &format!("{ARIAL_2} margin-top: -0.63em; margin-bottom: -0.67em;}}"),
    );
}

#[test]
fn line_height_units() {
    check(
        &format!("{ARIAL_2} text-remove-gap: both 150%;}}"),
        &(format!("{ARIAL_2}}}") + &pseudo("p", Some("-0.38em"), Some("-0.42em"))),
    );
    check(
        &format!("{ARIAL_2} text-remove-gap: both 1.5em;}}"),
        &(format!("{ARIAL_2}}}") + &pseudo("p", Some("-0.38em"), Some("-0.42em"))),
    );
}

#[test]
fn longhand_font_properties() {
    check(
        "p {font-family: \"Arial\", sans-serif; line-height: 2; text-remove-gap: both;}",
        &("p {font-family: \"Arial\", sans-serif; line-height: 2;}".to_string()
            + &pseudo("p", Some("-0.63em"), Some("-0.67em"))),
    );
}

#[test]
fn line_height_in_pixels_uses_calc() {
    check(
        "p {font-family: \"Arial\", sans-serif; line-height: 24px; text-remove-gap: both;}",
        &("p {font-family: \"Arial\", sans-serif; line-height: 24px;}".to_string()
            + &pseudo(
                "p",
                Some("calc(-0.13em - (24px - 1em) / 2)"),
                Some("calc(-0.17em - (24px - 1em) / 2)"),
            )),
    );
}

#[test]
fn pixel_line_height_without_known_family() {
    check(
        "p {line-height: 24px; text-remove-gap: both;}",
        &("p {line-height: 24px;}".to_string()
            + &pseudo(
                "p",
                Some("calc(0em - (24px - 1em) / 2)"),
                Some("calc(0em - (24px - 1em) / 2)"),
            )),
    );
}

#[test]
fn line_height_only() {
    check(
        "p {line-height: 2; text-remove-gap: both;}",
        &("p {line-height: 2;}".to_string() + &pseudo("p", Some("-0.5em"), Some("-0.5em"))),
    );
}

#[test]
fn nothing_to_correct_removes_the_directive() {
    check("p {text-remove-gap: both;}", "p {}");
    check(
        "p {font-family: \"_Some Unknown Font_\"; text-remove-gap: both;}",
        "p {font-family: \"_Some Unknown Font_\";}",
    );
    check(
        "p {color: red; text-remove-gap: outside both;}",
        "p {color: red;}",
    );
}

#[test]
fn unknown_font_with_line_height() {
    check(
        "p {font: 16px/2 \"_Some Unknown Font_\"; text-remove-gap: both;}",
        &("p {font: 16px/2 \"_Some Unknown Font_\";}".to_string()
            + &pseudo("p", Some("-0.5em"), Some("-0.5em"))),
    );
}

#[test]
fn default_font_family_option() {
    let config = GapConfig {
        default_font_family: "Arial".to_string(),
        ..GapConfig::default()
    };
    assert_eq!(
        run("p {line-height: 2; text-remove-gap: both;}", &config),
        "p {line-height: 2;}".to_string() + &pseudo("p", Some("-0.63em"), Some("-0.67em"))
    );
}

#[test]
fn default_line_height_option() {
    let config = GapConfig::default().with_default_line_height(2.0);
    assert_eq!(
        run(
            "p {font-family: \"Arial\", sans-serif; text-remove-gap: both;}",
            &config
        ),
        "p {font-family: \"Arial\", sans-serif;}".to_string()
            + &pseudo("p", Some("-0.63em"), Some("-0.67em"))
    );
}

#[test]
fn custom_fonts_option() {
    let mut fonts = BTreeMap::new();
    fonts.insert(
        "_Some Very Custom Font_".to_string(),
        SpaceValues::new(0.1, 0.2),
    );
    let config = GapConfig {
        fonts,
        ..GapConfig::default()
    };
    assert_eq!(
        run(
            "p {font-family: \"_Some Very Custom Font_\", sans-serif; text-remove-gap: both;}",
            &config
        ),
        "p {font-family: \"_Some Very Custom Font_\", sans-serif;}".to_string()
            + &pseudo("p", Some("-0.1em"), Some("-0.2em"))
    );
}

#[test]
fn selector_lists() {
    check(
        "ul > li, ol > li {font: 16px/2 \"Arial\", sans-serif; text-remove-gap: both;}",
        &("ul > li, ol > li {font: 16px/2 \"Arial\", sans-serif;}".to_string()
            + "\nul > li::before, ol > li::before {display: table;content: \"\";margin-bottom: -0.63em;}"
            + "\nul > li::after, ol > li::after {display: table;content: \"\";margin-top: -0.67em;}"),
    );
    check(
        "ul > li, ol > li {font: 16px/2 \"Arial\", sans-serif; text-remove-gap: outside both;}",
        "ul > li, ol > li {font: 16px/2 \"Arial\", sans-serif; margin-top: -0.63em; margin-bottom: -0.67em;}",
    );
}

#[test]
fn generated_rules_are_not_revisited() {
    // Only the original rule carries the directive; the generated pseudo rules must not be
    // processed again even though they follow it in the output.
    let css = "p {font-family: Arial; text-remove-gap: both;}\na {color: red;}";
    let out = run(css, &GapConfig::default());
    assert_eq!(
        out,
        "p {font-family: Arial;}".to_string()
            + &pseudo("p", Some("-0.13em"), Some("-0.17em"))
            + "\na {color: red;}"
    );
    assert_eq!(run(&out, &GapConfig::default()), out);
}

#[test]
fn offsets_are_a_pure_function_of_inputs() {
    let css = format!("{ARIAL_2} text-remove-gap: both;}}");
    let gap = TextRemoveGap::new(&GapConfig::default()).unwrap();
    assert_eq!(
        gap.transform_no_sourcemap(&css).unwrap(),
        gap.transform_no_sourcemap(&css).unwrap()
    );
}

#[test]
fn comments_in_values_are_ignored() {
    check(
        "p {font: 16px/2 Arial; text-remove-gap: outside both /* c */;}",
        "p {font: 16px/2 Arial; margin-top: -0.63em; margin-bottom: -0.67em;}",
    );
    check(
        "p {font: 16px/2 Arial; text-remove-gap: /* keep */ outside before;}",
        "p {font: 16px/2 Arial; margin-top: -0.63em;}",
    );
    check(
        "p {font-family: /* brand */ Arial; line-height: 2 /* loose */; text-remove-gap: outside after;}",
        "p {font-family: /* brand */ Arial; line-height: 2 /* loose */; margin-bottom: -0.67em;}",
    );
}

#[test]
fn crlf_input_keeps_crlf_line_breaks() {
    check(
        "p {\r\n  font-family: Arial;\r\n  text-remove-gap: after;\r\n}\r\n",
        "p {\r\n  font-family: Arial;\r\n}\r\np::after {display: table;content: \"\";margin-top: -0.17em;}\r\n",
    );
}

#[test]
fn family_text_spanning_lines_is_malformed() {
    let err = remove_text_gap_no_sourcemap(
        "p {\n  text-remove-gap: both Arial,\n    serif;\n}",
        &GapConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, GapError::MalformedDirective { .. }));
}

#[test]
fn later_directives_come_first_after_the_rule() {
    check(
        "p {font-family: Arial; text-remove-gap: after; text-remove-gap: before;}",
        &("p {font-family: Arial;}".to_string()
            + &pseudo("p", Some("-0.13em"), None)
            + &pseudo("p", None, Some("-0.17em"))),
    );
}

#[test]
fn malformed_directive_reports_position() {
    let err = remove_text_gap_no_sourcemap(
        "a {}\np {\n  text-remove-gap: middle;\n}",
        &GapConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, GapError::MalformedDirective { .. }));
    assert_eq!(
        err.to_string(),
        "3:3: incorrect `text-remove-gap` value: \"middle\""
    );
}

#[test]
fn keywords_are_case_sensitive() {
    let err =
        remove_text_gap_no_sourcemap("p {text-remove-gap: BOTH;}", &GapConfig::default())
            .unwrap_err();
    assert!(matches!(err, GapError::MalformedDirective { .. }));
}

#[test]
fn sourcemap_names_the_input() {
    let css = format!("{ARIAL_2} text-remove-gap: both;}}");
    let out = remove_text_gap(&css, "style.css", &GapConfig::default()).unwrap();
    assert_eq!(out.code, run(&css, &GapConfig::default()));

    let map = sourcemap::SourceMap::from_slice(out.sourcemap.as_bytes()).unwrap();
    assert_eq!(map.get_source(0), Some("style.css"));
}
