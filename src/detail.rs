use alco_types::Detail;

pub static MISSING: &str = "-";

/// Value of the first attribute whose legend starts with one of
/// `candidates` (case-insensitive), or `default` when none does. Attributes
/// are scanned in record order; an empty value counts as missing.
pub fn extract_detail_or<'a>(
    details: &'a [Detail],
    candidates: &[&str],
    default: &'a str,
) -> &'a str {
    let candidates = candidates
        .iter()
        .map(|c| c.to_lowercase())
        .collect::<Vec<_>>();
    details
        .iter()
        .find(|d| {
            let legend = d.legend.trim().to_lowercase();
            candidates.iter().any(|c| legend.starts_with(c.as_str()))
        })
        .map(|d| d.value.as_str())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

pub fn extract_detail<'a>(details: &'a [Detail], candidates: &[&str]) -> &'a str {
    extract_detail_or(details, candidates, MISSING)
}
