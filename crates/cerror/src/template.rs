//! Printf-style placeholder substitution for catalog templates.
//!
//! Supported: `%%`, flags `- + # 0 space`, width, `.precision`, and any
//! ASCII letter as verb. Every verb consumes one argument through its
//! `Display` impl; `%q` renders the quoted, escaped form. `%x %X %o %b`
//! render integers in base 16/8/2, and `%x %X` hex-encode anything else.
//!
//! Precision goes to the argument's own formatter: floats round, strings
//! truncate, integers ignore it.
//!
//! Arity mismatches do not fail. A verb with nothing left to consume
//! renders `%!s(MISSING)`, leftover arguments append
//! `%!(EXTRA a, b)`, a trailing lone `%` renders `%!(NOVERB)`.

use std::fmt::{self, Display, Write};

use thiserror::Error;

/// Argument list accepted by `specify` / `renew`.
pub type Args<'a> = &'a [&'a dyn Display];

/// Result of a permissive substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Placeholders in the template.
    pub expected: usize,
    /// Arguments supplied.
    pub given: usize,
}

impl Rendered {
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.expected == self.given
    }
}

/// Raised by the strict substitution path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template expects {expected} argument(s), got {given}")]
    Missing { expected: usize, given: usize },

    #[error("template expects {expected} argument(s), got {given} (extra arguments)")]
    Extra { expected: usize, given: usize },
}

impl TemplateError {
    pub(crate) fn check(rendered: &Rendered) -> Result<(), TemplateError> {
        let (expected, given) = (rendered.expected, rendered.given);
        if given < expected {
            Err(TemplateError::Missing { expected, given })
        } else if given > expected {
            Err(TemplateError::Extra { expected, given })
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct Spec {
    left: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// Substitute `args` into `template`, degrading on mismatch.
pub fn render(template: &str, args: Args<'_>) -> Rendered {
    let mut out = String::with_capacity(template.len() + 16 * args.len());
    let mut next = 0usize;
    let mut expected = 0usize;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut spec = Spec::default();

        // flags
        while let Some(&f) = chars.peek() {
            match f {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                '+' | '#' | ' ' => {}
                _ => break,
            }
            chars.next();
        }

        spec.width = take_number(&mut chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(take_number(&mut chars).unwrap_or(0));
        }

        let verb = match chars.next() {
            Some('%') => {
                out.push('%');
                continue;
            }
            Some(v) => v,
            None => {
                out.push_str("%!(NOVERB)");
                break;
            }
        };

        expected += 1;
        match args.get(next) {
            Some(arg) => {
                next += 1;
                let raw = format_arg(verb, *arg, spec.precision);
                pad(&mut out, &raw, &spec);
            }
            None => {
                let _ = write!(out, "%!{}(MISSING)", verb);
            }
        }
    }

    if next < args.len() {
        out.push_str("%!(EXTRA ");
        for (i, arg) in args[next..].iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}", arg);
        }
        out.push(')');
    }

    Rendered {
        text: out,
        expected,
        given: args.len(),
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut n: Option<usize> = None;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        n = Some(n.unwrap_or(0).saturating_mul(10).saturating_add(d as usize));
        chars.next();
    }
    n
}

fn format_arg(verb: char, arg: &dyn Display, precision: Option<usize>) -> String {
    let text = match precision {
        Some(p) => format!("{:.*}", p, arg),
        None => arg.to_string(),
    };
    match verb {
        'q' => format!("{:?}", text),
        'x' | 'X' | 'o' | 'b' => radix(verb, &text),
        _ => text,
    }
}

fn radix(verb: char, text: &str) -> String {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    if let Ok(n) = digits.parse::<u128>() {
        return match verb {
            'x' => format!("{}{:x}", sign, n),
            'X' => format!("{}{:X}", sign, n),
            'o' => format!("{}{:o}", sign, n),
            _ => format!("{}{:b}", sign, n),
        };
    }
    match verb {
        'x' => text.bytes().map(|b| format!("{:02x}", b)).collect(),
        'X' => text.bytes().map(|b| format!("{:02X}", b)).collect(),
        _ => text.to_string(),
    }
}

fn pad(out: &mut String, text: &str, spec: &Spec) {
    let len = text.chars().count();
    let fill = spec.width.map_or(0, |w| w.saturating_sub(len));

    if spec.left {
        out.push_str(text);
        out.extend(std::iter::repeat(' ').take(fill));
    } else if spec.zero {
        // keep a leading sign in front of the zeros
        let (sign, digits) = match text.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", text),
        };
        out.push_str(sign);
        out.extend(std::iter::repeat('0').take(fill));
        out.push_str(digits);
    } else {
        out.extend(std::iter::repeat(' ').take(fill));
        out.push_str(text);
    }
}

/// Adapter so a pre-rendered argument list can be shown in log fields.
pub(crate) struct DisplayArgs<'a>(pub Args<'a>);

impl fmt::Debug for DisplayArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|a| a.to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_substitution() {
        let r = render("failed to connect to %s: %s", &[&"db1", &"timeout"]);
        assert_eq!(r.text, "failed to connect to db1: timeout");
        assert!(r.is_exact());
    }

    #[test]
    fn mixed_verbs() {
        let r = render("port %d on %v", &[&5432, &"host"]);
        assert_eq!(r.text, "port 5432 on host");
    }

    #[test]
    fn literal_percent() {
        let r = render("cpu at %d%%", &[&95]);
        assert_eq!(r.text, "cpu at 95%");
        assert_eq!(r.expected, 1);
    }

    #[test]
    fn quoted_verb() {
        let r = render("bad name %q", &[&"a\"b"]);
        assert_eq!(r.text, r#"bad name "a\"b""#);
    }

    #[test]
    fn width_and_precision() {
        assert_eq!(render("[%5s]", &[&"ab"]).text, "[   ab]");
        assert_eq!(render("[%-5s]", &[&"ab"]).text, "[ab   ]");
        assert_eq!(render("[%05d]", &[&-42]).text, "[-0042]");
        assert_eq!(render("[%.2s]", &[&"abcdef"]).text, "[ab]");
    }

    #[test]
    fn float_precision_rounds() {
        assert_eq!(render("took %.2fs", &[&3.14159_f64]).text, "took 3.14s");
        assert_eq!(render("%.1f", &[&2.96_f64]).text, "3.0");
        assert_eq!(render("[%8.3f]", &[&-1.5_f64]).text, "[  -1.500]");
        assert_eq!(render("[%08.2f]", &[&-1.5_f64]).text, "[-0001.50]");
        assert_eq!(render("%.3d", &[&42]).text, "42");
    }

    #[test]
    fn radix_verbs() {
        assert_eq!(render("flags=%x", &[&255u32]).text, "flags=ff");
        assert_eq!(render("flags=%X", &[&255u32]).text, "flags=FF");
        assert_eq!(render("mode=%o", &[&8]).text, "mode=10");
        assert_eq!(render("mask=%b", &[&5u8]).text, "mask=101");
        assert_eq!(render("%x", &[&-255i64]).text, "-ff");
        assert_eq!(render("[%04x]", &[&10]).text, "[000a]");
    }

    #[test]
    fn hex_of_text_encodes_bytes() {
        assert_eq!(render("%x", &[&"Hi"]).text, "4869");
        assert_eq!(render("%X", &[&"z"]).text, "7A");
        assert_eq!(render("%b", &[&"abc"]).text, "abc");
    }

    #[test]
    fn quoted_with_precision() {
        assert_eq!(render("%.3q", &[&"abcdef"]).text, "\"abc\"");
    }

    #[test]
    fn missing_argument_degrades() {
        let r = render("x=%s y=%d", &[&"1"]);
        assert_eq!(r.text, "x=1 y=%!d(MISSING)");
        assert_eq!(r.expected, 2);
        assert_eq!(r.given, 1);
        assert_eq!(
            TemplateError::check(&r),
            Err(TemplateError::Missing { expected: 2, given: 1 })
        );
    }

    #[test]
    fn extra_arguments_degrade() {
        let r = render("x=%s", &[&"1", &2, &"three"]);
        assert_eq!(r.text, "x=1%!(EXTRA 2, three)");
        assert!(matches!(TemplateError::check(&r), Err(TemplateError::Extra { .. })));
    }

    #[test]
    fn trailing_percent() {
        assert_eq!(render("100%", &[]).text, "100%!(NOVERB)");
    }

    #[test]
    fn no_placeholders_no_args() {
        let r = render("plain message", &[]);
        assert_eq!(r.text, "plain message");
        assert!(r.is_exact());
    }
}
