/// Spectre scale-factor notation: `1e-9` is `1n`, `2e-12` is `2p`,
/// `1.8` stays `1.8`. Up to six significant digits, trailing zeros dropped.
pub fn eng_format(value: f64) -> String {
    let map: [(i32, &str); 10] = [
        (-18, "a"),
        (-15, "f"),
        (-12, "p"),
        (-9, "n"),
        (-6, "u"),
        (-3, "m"),
        (0, ""),
        (3, "k"),
        (6, "M"),
        (9, "G"),
    ];

    if value == 0.0 || !value.is_finite() {
        return if value.is_finite() {
            "0".to_string()
        } else {
            format!("{value}")
        };
    }

    // nudge so that exact decades like 1e-9 do not land one bucket low
    let log = value.abs().log10() + 1e-9;

    let option = map
        .into_iter()
        .rev()
        .find(|(exp, _)| (*exp as f64) <= log)
        .unwrap_or(map[0]);
    let mant = value / 10.0_f64.powi(option.0);
    let log_int = log.floor() as i32;
    let prec = (5 + option.0 - log_int).max(0) as usize;

    let mut digits = format!("{mant:.prec$}");
    if digits.contains('.') {
        digits = digits.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{digits}{}", option.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eng_format() {
        assert_eq!(&eng_format(0.0), "0");
        assert_eq!(&eng_format(1.0), "1");
        assert_eq!(&eng_format(1.8), "1.8");
        assert_eq!(&eng_format(-1.8), "-1.8");
        assert_eq!(&eng_format(27.0), "27");
        assert_eq!(&eng_format(1e-9), "1n");
        assert_eq!(&eng_format(12e-9), "12n");
        assert_eq!(&eng_format(1.2e-9), "1.2n");
        assert_eq!(&eng_format(2.0 * 1e-12), "2p");
        assert_eq!(&eng_format(0.5 * 1e-12), "500f");
        assert_eq!(&eng_format(1e-3), "1m");
        assert_eq!(&eng_format(888.06e-15), "888.06f");
        assert_eq!(&eng_format(0.2388e9), "238.8M");
        assert_eq!(&eng_format(1e-21), "0.001a");
    }
}
