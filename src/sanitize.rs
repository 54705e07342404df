/// Payment network markers appended to merchant names, which the card
/// statements often glue onto the preceding text.
const PAYMENT_NETWORK_TOKENS: [&str; 1] = ["/iD"];

const FULLWIDTH_OFFSET: u32 = 0xFEE0;

/// Maps full-width ASCII letters and digits onto their half-width forms.
/// Everything else, including full-width punctuation and kana, is kept.
fn to_half_width(c: char) -> char {
    match c {
        '０'..='９' | 'Ａ'..='Ｚ' | 'ａ'..='ｚ' => {
            char::from_u32(c as u32 - FULLWIDTH_OFFSET).unwrap_or(c)
        }
        '\u{3000}' => ' ',
        _ => c,
    }
}

/// Normalizes merchant text before it is used as a payee.
pub fn sanitize(text: &str) -> String {
    let mut converted: String = text.chars().map(to_half_width).collect();

    for token in PAYMENT_NETWORK_TOKENS {
        converted = converted.replace(token, &format!(" {}", token));
    }

    converted.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_cases() {
        let tests = vec![
            ("full width alphabet", "ＭｙＴｅｓｔＭｅｔｈｏｄ", "MyTestMethod"),
            ("full width digits", "セブン－イレブン１２３", "セブン－イレブン123"),
            ("trailing spaces", "Test          Transaction         ", "Test Transaction"),
            ("collapsed spaces", "a   b", "a b"),
            ("glued payment token", "ABC/iD", "ABC /iD"),
            (
                "japanese with payment token",
                "ビ－・エフ・シ－ イベント/iD",
                "ビ－・エフ・シ－ イベント /iD",
            ),
            ("token already separated", "ABC /iD", "ABC /iD"),
            ("ideographic space", "東京\u{3000}\u{3000}駅", "東京 駅"),
        ];

        for (name, input, want) in tests {
            assert_eq!(sanitize(input), want, "{}", name);
        }
    }

    #[test]
    fn sanitize_is_stable() {
        for input in ["ＭｙＴｅｓｔ", "ABC/iD", "  a  b  "] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once);
        }
    }
}
