/// Ceiling for rows returned by a single request.
pub const MAX_ROW_LIMIT: u32 = 5000;

pub fn sanitise_limit(raw: Option<&str>) -> u32 {
    sanitise_limit_with(raw, MAX_ROW_LIMIT)
}

/// Accept a plain non-negative integer no larger than `ceiling`; anything else
/// (missing, signed, fractional, oversized, non-numeric) yields `ceiling`.
pub fn sanitise_limit_with(raw: Option<&str>, ceiling: u32) -> u32 {
    let Some(raw) = raw.map(str::trim) else {
        return ceiling;
    };
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return ceiling;
    }

    match raw.parse::<u32>() {
        Ok(limit) if limit <= ceiling => limit,
        _ => ceiling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_ceiling() {
        assert_eq!(sanitise_limit(Some("7000")), 5000);
        assert_eq!(sanitise_limit(Some("50")), 50);
        assert_eq!(sanitise_limit(Some("5000")), 5000);
        assert_eq!(sanitise_limit(Some("0")), 0);
        assert_eq!(sanitise_limit(Some("abc")), 5000);
        assert_eq!(sanitise_limit(None), 5000);
    }

    #[test]
    fn rejects_signed_fractional_and_huge_values() {
        assert_eq!(sanitise_limit(Some("-1")), 5000);
        assert_eq!(sanitise_limit(Some("+10")), 5000);
        assert_eq!(sanitise_limit(Some("10.5")), 5000);
        assert_eq!(sanitise_limit(Some("99999999999999999999")), 5000);
        assert_eq!(sanitise_limit(Some("")), 5000);
    }

    #[test]
    fn custom_ceiling() {
        assert_eq!(sanitise_limit_with(Some("200"), 100), 100);
        assert_eq!(sanitise_limit_with(Some("20"), 100), 20);
    }
}
