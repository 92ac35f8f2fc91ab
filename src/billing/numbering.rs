use std::cmp::Ordering;

/// Splits an invoice number into its prefix and trailing digit run.
///
/// The digit run is kept as text so that runs of any length compare and
/// increment without overflow.
fn split_trailing_number(invoice_no: &str) -> (&str, Option<&str>) {
    let prefix = invoice_no.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &invoice_no[prefix.len()..];

    (prefix, (!digits.is_empty()).then_some(digits))
}

fn trailing_number(invoice_no: &str) -> Option<&str> {
    split_trailing_number(invoice_no).1
}

/// Numeric order of two ASCII digit runs.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');

    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Adds one to an ASCII digit run, dropping leading zeros: `"0199"` -> `"200"`.
fn increment_digits(digits: &str) -> String {
    let mut bytes = digits.trim_start_matches('0').as_bytes().to_vec();

    for byte in bytes.iter_mut().rev() {
        if *byte == b'9' {
            *byte = b'0';
        } else {
            *byte += 1;
            return String::from_utf8_lossy(&bytes).into_owned();
        }
    }

    format!("1{}", String::from_utf8_lossy(&bytes))
}

/// The previous invoice number with the largest trailing number.
///
/// Numbers without trailing digits never win a comparison. When none of the
/// candidates has trailing digits there is no usable previous number and
/// `None` is returned. On a tie the later candidate wins.
pub fn highest_invoice_no<S: AsRef<str>>(invoice_numbers: &[S]) -> Option<&str> {
    let mut numbers = invoice_numbers.iter().map(|number| number.as_ref());
    let first = numbers.next()?;

    let highest = numbers.fold(first, |highest, current| {
        match (trailing_number(highest), trailing_number(current)) {
            (_, None) => highest,
            (Some(h), Some(c)) if compare_digits(h, c) == Ordering::Greater => highest,
            _ => current,
        }
    });

    trailing_number(highest).map(|_| highest)
}

/// Suggests the next invoice number for a client.
///
/// The prefix is `prefix` when given, otherwise whatever precedes the digits
/// of the highest previous number. A blank `prefix` counts as no prefix, so
/// `(["JS-3"], Some(""))` continues as `JS-4` rather than `-4`. Trailing
/// hyphens are dropped from the prefix before `-<n>` is appended, where `<n>`
/// has no leading zeros (`A-0099` -> `A-100`). Returns an empty string when
/// there is nothing to go on.
pub fn next_invoice_no<S: AsRef<str>>(previous: &[S], prefix: Option<&str>) -> String {
    let prefix = prefix.filter(|p| !p.trim().is_empty());
    if previous.is_empty() && prefix.is_none() {
        return String::new();
    }

    let latest = highest_invoice_no(previous).map(split_trailing_number);
    let prefix = prefix
        .or_else(|| latest.map(|(derived, _)| derived))
        .unwrap_or_default();
    let next = latest
        .and_then(|(_, digits)| digits)
        .map_or_else(|| "1".to_string(), increment_digits);

    format!("{}-{}", prefix.trim_end_matches('-'), next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continues_from_highest_previous_number() {
        assert_eq!(next_invoice_no(&["JS-3", "JS-7", "JS-2"], None), "JS-8");
    }

    #[test]
    fn starts_at_one_with_only_a_prefix() {
        let none: [&str; 0] = [];
        assert_eq!(next_invoice_no(&none, Some("AB")), "AB-1");
        assert_eq!(next_invoice_no(&none, Some("AB--")), "AB-1");
    }

    #[test]
    fn nothing_to_go_on_yields_empty() {
        let none: [&str; 0] = [];
        assert_eq!(next_invoice_no(&none, None), "");
        assert_eq!(next_invoice_no(&none, Some("  ")), "");
    }

    #[test]
    fn explicit_prefix_overrides_derived_one() {
        assert_eq!(next_invoice_no(&["OLD-41"], Some("NEW")), "NEW-42");
    }

    #[test]
    fn prefix_without_hyphen_gets_one() {
        assert_eq!(next_invoice_no(&["INV9", "INV10"], None), "INV-11");
    }

    #[test]
    fn compares_numerically_not_lexically() {
        assert_eq!(highest_invoice_no(&["A-9", "A-10", "A-2"]), Some("A-10"));
    }

    #[test]
    fn ignores_numbers_without_trailing_digits() {
        assert_eq!(highest_invoice_no(&["draft", "JS-4", "JS-x"]), Some("JS-4"));
        assert_eq!(next_invoice_no(&["draft", "JS-4"], None), "JS-5");
    }

    #[test]
    fn no_usable_previous_number() {
        assert_eq!(highest_invoice_no(&["draft", "copy"]), None);
        assert_eq!(next_invoice_no(&["draft"], Some("JS")), "JS-1");
        assert_eq!(next_invoice_no(&["draft"], None), "-1");
    }

    #[test]
    fn blank_prefix_falls_back_to_derived_prefix() {
        assert_eq!(next_invoice_no(&["JS-3"], Some("")), "JS-4");
    }

    #[test]
    fn increments_past_the_largest_machine_integer() {
        assert_eq!(
            next_invoice_no(&["X-18446744073709551615"], None),
            "X-18446744073709551616"
        );
        assert_eq!(next_invoice_no(&["X-999"], None), "X-1000");
    }

    #[test]
    fn very_long_numbers_still_compare_highest() {
        assert_eq!(
            next_invoice_no(&["INV-5", "INV-99999999999999999999"], None),
            "INV-100000000000000000000"
        );
        assert_eq!(
            highest_invoice_no(&["INV-123456789012345678901", "INV-7"]),
            Some("INV-123456789012345678901")
        );
    }

    #[test]
    fn leading_zeros_compare_numerically_and_are_dropped() {
        assert_eq!(highest_invoice_no(&["A-0099", "A-98"]), Some("A-0099"));
        assert_eq!(next_invoice_no(&["A-0099"], None), "A-100");
        assert_eq!(next_invoice_no(&["A-000"], None), "A-1");
    }

    #[test]
    fn tie_goes_to_later_number() {
        assert_eq!(highest_invoice_no(&["A-3", "B-3"]), Some("B-3"));
    }
}
