// C-style `%.<p>g` formatting for vector dumps.

/// Format `x` the way C's `%.<precision>g` does: shortest of fixed and scientific
/// notation, trailing zeros removed, at least two exponent digits.
pub fn format_g(x: f64, precision: usize) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    let p = precision.max(1);
    if x == 0.0 {
        return if x.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    // Exponent after rounding to `p` significant digits.
    let sci = format!("{:.*e}", p - 1, x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if exp < -4 || exp >= p as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (p as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, x)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::format_g;

    #[test]
    fn fixed_range() {
        assert_eq!(format_g(2.0, 16), "2");
        assert_eq!(format_g(-302.0, 16), "-302");
        assert_eq!(format_g(0.1, 16), "0.1");
        assert_eq!(format_g(1.0e-4, 6), "0.0001");
        assert_eq!(format_g(123456.0, 6), "123456");
    }

    #[test]
    fn scientific_range() {
        assert_eq!(format_g(1.0e-5, 6), "1e-05");
        assert_eq!(format_g(-2.5e-17, 16), "-2.5e-17");
        assert_eq!(format_g(1234567.0, 6), "1.23457e+06");
        assert_eq!(format_g(1.0e100, 16), "1e+100");
    }

    #[test]
    fn specials() {
        assert_eq!(format_g(0.0, 16), "0");
        assert_eq!(format_g(-0.0, 16), "-0");
        assert_eq!(format_g(f64::INFINITY, 16), "inf");
        assert_eq!(format_g(f64::NAN, 16), "nan");
    }
}
