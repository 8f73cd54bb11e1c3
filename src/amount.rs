//! Chinese financial numerals for contract amounts.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const DIGITS: [char; 10] = ['零', '壹', '贰', '叁', '肆', '伍', '陆', '柒', '捌', '玖'];
const UNITS: [&str; 4] = ["", "拾", "佰", "仟"];
const SECTIONS: [&str; 4] = ["", "万", "亿", "兆"];

/// Largest integer part expressible with the four section units.
const MAX_YUAN: u64 = 9_999_999_999_999_999;

/// Render an amount string in Chinese financial numerals.
///
/// Thousands separators (`,` `，`) and the `元` / `整` markers are ignored, and a
/// trailing `万` or `亿` scales the number. The amount is rounded to the fen.
/// Returns `None` when the input is not a non-negative amount.
///
/// ```
/// use contract_fill::amount_in_words;
///
/// assert_eq!(amount_in_words("500000").as_deref(), Some("伍拾万元整"));
/// assert_eq!(amount_in_words("12.5万").as_deref(), Some("壹拾贰万伍仟元整"));
/// assert_eq!(amount_in_words("abc"), None);
/// ```
pub fn amount_in_words(input: &str) -> Option<String> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '，' | '元' | '整'))
        .collect();
    let cleaned = cleaned.trim();

    let (number, multiplier) = if let Some(rest) = cleaned.strip_suffix('万') {
        (rest, Decimal::from(10_000u32))
    } else if let Some(rest) = cleaned.strip_suffix('亿') {
        (rest, Decimal::from(100_000_000u32))
    } else {
        (cleaned, Decimal::ONE)
    };

    let amount = Decimal::from_str(number.trim())
        .ok()?
        .checked_mul(multiplier)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return None;
    }

    let cents = amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()?;
    let yuan = cents / 100;
    if yuan > MAX_YUAN {
        return None;
    }
    let jiao = ((cents % 100) / 10) as usize;
    let fen = (cents % 10) as usize;

    let mut out = integer_in_words(yuan);
    out.push('元');
    match (jiao, fen) {
        (0, 0) => out.push('整'),
        (0, f) => {
            out.push('零');
            out.push(DIGITS[f]);
            out.push('分');
        }
        (j, 0) => {
            out.push(DIGITS[j]);
            out.push('角');
        }
        (j, f) => {
            out.push(DIGITS[j]);
            out.push('角');
            out.push(DIGITS[f]);
            out.push('分');
        }
    }
    Some(out)
}

fn integer_in_words(n: u64) -> String {
    if n == 0 {
        return DIGITS[0].to_string();
    }

    let digits: Vec<usize> = n
        .to_string()
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect();
    let len = digits.len();
    let section_is_zero = |section: usize| (n / 10u64.pow(4 * section as u32)) % 10_000 == 0;

    let mut out = String::new();
    let mut pending_zero = false;
    for (i, &d) in digits.iter().enumerate() {
        let pos = len - 1 - i;
        let section = pos / 4;
        let within = pos % 4;

        if d == 0 {
            pending_zero = true;
        } else {
            if pending_zero {
                out.push(DIGITS[0]);
                pending_zero = false;
            }
            out.push(DIGITS[d]);
            out.push_str(UNITS[within]);
        }

        if within == 0 && section > 0 && !section_is_zero(section) {
            out.push_str(SECTIONS[section]);
            pending_zero = false;
        }
    }
    out
}
