//! Brand label extraction from the free-text listing type.

use std::sync::LazyLock;

use regex::Regex;

/// Leading run of CJK ideographs, else a leading run of word characters.
///
/// Alternation is leftmost-first, so the CJK branch wins whenever the text
/// starts with an ideograph.
static BRAND_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\x{4e00}-\x{9fff}]+|\w+)").expect("brand regex is valid"));

/// Extract the brand token from a listing type such as `大众朗逸 2019款`.
///
/// Returns an empty string when the text starts with neither an ideograph nor
/// a word character.
pub fn extract_brand(text: &str) -> String {
    BRAND_PREFIX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_cjk(c: char) -> bool {
        ('\u{4e00}'..='\u{9fff}').contains(&c)
    }

    #[test]
    fn takes_leading_cjk_run() {
        assert_eq!(extract_brand("大众朗逸 2019款 1.5L"), "大众朗逸");
        assert_eq!(extract_brand("宝马X5 2020款"), "宝马");
    }

    #[test]
    fn falls_back_to_word_run() {
        assert_eq!(extract_brand("BMW 3系"), "BMW");
        assert_eq!(extract_brand("Model_3 长续航"), "Model_3");
        assert_eq!(extract_brand("2019款 奥迪"), "2019款");
    }

    #[test]
    fn word_run_may_continue_into_ideographs() {
        // `\w` is Unicode-aware, so once the word branch is taken it keeps
        // consuming ideographs too.
        assert_eq!(extract_brand("MG名爵6 2018款"), "MG名爵6");
    }

    #[test]
    fn word_run_stops_at_superscripts() {
        // `\w` covers decimal digits only, not other numeric forms like `²`.
        assert_eq!(extract_brand("X² 2019"), "X");
    }

    #[test]
    fn no_match_degrades_to_empty() {
        assert_eq!(extract_brand(""), "");
        assert_eq!(extract_brand(" 大众"), "");
        assert_eq!(extract_brand("【急售】本田"), "");
        assert_eq!(extract_brand("-"), "");
    }

    #[test]
    fn result_is_a_homogeneous_prefix() {
        let samples = ["大众朗逸 2019款", "Audi A4L", "丰田_卡罗拉", "x", "(二手)", "日产轩逸·经典", "1.5T"];
        for s in samples {
            let brand = extract_brand(s);
            assert!(s.starts_with(&brand), "{brand:?} is not a prefix of {s:?}");
            if brand.is_empty() {
                continue;
            }
            let all_cjk = brand.chars().all(is_cjk);
            let all_word = brand.chars().all(|c| c.is_alphanumeric() || c == '_');
            assert!(all_cjk || all_word, "{brand:?} mixes character classes");
        }
    }

    #[test]
    fn is_deterministic() {
        let s = "大众朗逸 2019款";
        assert_eq!(extract_brand(s), extract_brand(s));
    }
}
