//! Message template rendering
//!
//! Campaign templates personalize messages through the literal token
//! `{{customerName}}`. The token is matched case-insensitively and replaced
//! globally; this is a wire contract with the template-authoring UI and must
//! not change.

/// Personalization token recognized in campaign message templates
pub const CUSTOMER_NAME_PLACEHOLDER: &str = "{{customerName}}";

/// Default message rendered when a campaign carries no template
pub fn default_message(customer_name: &str) -> String {
    format!("Hi {customer_name}, here's 10% off on your next order.")
}

/// Whether the template contains the personalization token in any casing
pub fn contains_placeholder(template: &str) -> bool {
    find_placeholder(template).is_some()
}

/// Render a template for one recipient.
///
/// Every case-insensitive occurrence of [`CUSTOMER_NAME_PLACEHOLDER`] is
/// replaced with `customer_name`. An empty or whitespace-only template
/// renders [`default_message`] instead. A non-empty template without the
/// token is returned verbatim (unpersonalized but valid).
pub fn render(template: &str, customer_name: &str) -> String {
    if template.trim().is_empty() {
        return default_message(customer_name);
    }

    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = find_placeholder(rest) {
        rendered.push_str(&rest[..pos]);
        rendered.push_str(customer_name);
        rest = &rest[pos + CUSTOMER_NAME_PLACEHOLDER.len()..];
    }
    rendered.push_str(rest);
    rendered
}

/// Byte offset of the first case-insensitive occurrence of the token.
///
/// The token is pure ASCII, so lowercasing the haystack preserves byte
/// offsets even when the surrounding text is not ASCII.
fn find_placeholder(haystack: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&CUSTOMER_NAME_PLACEHOLDER.to_ascii_lowercase())
}
