pub(crate) const CURRENT_PLACEHOLDER: &str = "$CURRENT";
pub(crate) const TOTAL_PLACEHOLDER: &str = "$TOTAL";

/// Substitutes `$CURRENT` and `$TOTAL`. Nothing else in the template is
/// interpreted.
#[must_use]
pub fn render_payload(template: &str, seq: u64, total: u64) -> String {
    if !template.contains('$') {
        return template.to_owned();
    }
    template
        .replace(CURRENT_PLACEHOLDER, &seq.to_string())
        .replace(TOTAL_PLACEHOLDER, &total.to_string())
}
