//! Placeholder substitution for object keys

use super::context::KeyTemplateContext;

/// Template used when none (or a blank one) is configured
pub const DEFAULT_TEMPLATE: &str = "i/{{year}}/{{month}}/{{day}}/{{ulid-dayslice}}.{{ext}}";

/// Every placeholder name a template may use
pub const PLACEHOLDERS: &[&str] = &[
    "year",
    "month",
    "day",
    "timestamp",
    "filename",
    "ext",
    "ulid",
    "ulid-dayslice",
    "random",
];

fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

/// The template to use, replacing a blank one with [`DEFAULT_TEMPLATE`]
#[must_use]
pub fn effective_template(template: &str) -> &str {
    if template.trim().is_empty() {
        DEFAULT_TEMPLATE
    } else {
        template
    }
}

/// Render `template` with the values bound in `context`
///
/// Placeholders are `{{name}}`. Unknown names are kept as written.
///
/// # Examples
///
/// ```
/// use bucketview::keys::{KeyTemplateContext, UlidGenerator, render};
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2024, 7, 4, 12, 0, 0).unwrap();
/// let ctx = KeyTemplateContext::bind("cat.jpeg", now, &mut UlidGenerator::seeded(1));
/// assert_eq!(render("{{year}}/{{filename}}.{{ext}}", &ctx), "2024/cat.jpeg");
/// assert_eq!(render("{{nope}}/{{month}}", &ctx), "{{nope}}/07");
/// ```
#[must_use]
pub fn render(template: &str, context: &KeyTemplateContext) -> String {
    let template = effective_template(template);
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];

        let name_len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
        let name = &after[..name_len];

        match (name.is_empty(), after[name_len..].starts_with("}}")) {
            (false, true) => {
                match context.token(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                }
                rest = &after[name_len + 2..];
            }
            _ => {
                // Not a placeholder; keep one brace and rescan from the next
                out.push('{');
                rest = &rest[open + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::UlidGenerator;
    use crate::testing::at;
    use regex::Regex;

    fn context() -> KeyTemplateContext {
        let mut ids = UlidGenerator::seeded(5);
        KeyTemplateContext::bind("IMG_0042.JPG", at("2023-12-31T23:59:58.250Z"), &mut ids)
    }

    #[test]
    fn test_default_template_shape() {
        let key = render(DEFAULT_TEMPLATE, &context());
        let shape = Regex::new(r"^i/\d{4}/\d{2}/\d{2}/[0-9a-z]+-[0-9a-z]+\.\w+$").unwrap();
        assert!(shape.is_match(&key), "{key}");
        assert!(key.starts_with("i/2023/12/31/"));
        assert!(key.ends_with(".JPG"));
    }

    #[test]
    fn test_blank_template_uses_default() {
        let ctx = context();
        assert_eq!(render("", &ctx), render(DEFAULT_TEMPLATE, &ctx));
        assert_eq!(render("  \t", &ctx), render(DEFAULT_TEMPLATE, &ctx));
    }

    #[test]
    fn test_unknown_placeholders_are_verbatim() {
        let ctx = context();
        assert_eq!(render("{{album}}/{{filename}}", &ctx), "{{album}}/IMG_0042");
        assert_eq!(render("{{Year}}", &ctx), "{{Year}}");
    }

    #[test]
    fn test_malformed_braces_are_kept() {
        let ctx = context();
        assert_eq!(render("{{year", &ctx), "{{year");
        assert_eq!(render("{{}}-{{day}}", &ctx), "{{}}-31");
        assert_eq!(render("{{{year}}}", &ctx), "{2023}");
        assert_eq!(render("{{ year }}", &ctx), "{{ year }}");
    }

    #[test]
    fn test_render_is_stable_for_bound_context() {
        let ctx = context();
        let template = "{{ulid}}/{{random}}/{{timestamp}}";
        assert_eq!(render(template, &ctx), render(template, &ctx));
    }

    #[test]
    fn test_every_placeholder_is_known() {
        let ctx = context();
        for name in PLACEHOLDERS {
            let rendered = render(&format!("{{{{{name}}}}}"), &ctx);
            assert!(!rendered.contains("{{"), "{name} rendered as {rendered}");
        }
    }

    #[test]
    fn test_conversion_changes_extension_only() {
        let mut ctx = context();
        let before = render(DEFAULT_TEMPLATE, &ctx);
        ctx.set_target_extension(Some("webp"));
        let after = render(DEFAULT_TEMPLATE, &ctx);
        assert_eq!(before.trim_end_matches("JPG"), after.trim_end_matches("webp"));
    }
}
