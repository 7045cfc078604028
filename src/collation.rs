//! Collation Module
//!
//! スペイン語ロケールの一次強度（base sensitivity）照合。
//!
//! - 大文字と小文字を区別しない
//! - アクセント記号を無視する（á = a, ü = u, ç = c）
//! - `ñ`は独立した文字として`n`の直後に並ぶ
//! - 合字は展開する（ß → ss, æ → ae, œ → oe）
//! - 文字クラスの順序: 空白 < 句読点 < 記号 < 数字 < 文字

use std::cmp::Ordering;

const TIER_SPACE: u32 = 1 << 24;
const TIER_PUNCT: u32 = 2 << 24;
const TIER_SYMBOL: u32 = 3 << 24;
const TIER_DIGIT: u32 = 4 << 24;
const TIER_LETTER: u32 = 5 << 24;

/// ラテン文字以外の文字（キリル文字など）のオフセット
const OTHER_LETTER_OFFSET: u32 = 1 << 16;

/// 句読点の並び順（ICUルート照合の順序に準拠）
const PUNCT_ORDER: &str = "_-‐–—,;:!¡?¿.…'‘’\"“”«»()[]{}§¶@*/\\&#%‰†‡•`´^¨~";

/// 結合用チルダ（n + U+0303 は ñ として扱う）
const COMBINING_TILDE: char = '\u{0303}';

/// 照合キーを生成する
///
/// キー同士を辞書順に比較した結果が照合順序になります。
///
/// ```rust
/// use listas_pdf::collation::collation_key;
///
/// assert_eq!(collation_key("Ácido"), collation_key("acido"));
/// assert!(collation_key("nube") < collation_key("ñu"));
/// assert!(collation_key("ñu") < collation_key("oso"));
/// ```
pub fn collation_key(text: &str) -> Vec<u32> {
    let mut key = Vec::with_capacity(text.len());

    for c in text.chars().flat_map(char::to_lowercase) {
        if c == COMBINING_TILDE {
            if let Some(last) = key.last_mut() {
                if *last == letter_weight('n') {
                    *last = letter_weight('n') + 1;
                }
            }
            continue;
        }

        if is_ignorable(c) {
            continue;
        }

        if c == 'ñ' {
            key.push(letter_weight('n') + 1);
            continue;
        }

        match fold_latin(c) {
            Some(base) => key.extend(base.chars().map(letter_weight)),
            None => key.push(char_weight(c)),
        }
    }

    key
}

/// 2つの文字列を照合順序で比較する
pub fn compare(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}

/// 一次強度で無視される文字（制御文字、結合文字、ゼロ幅文字）
fn is_ignorable(c: char) -> bool {
    (c.is_control() && !c.is_whitespace())
        || ('\u{0300}'..='\u{036f}').contains(&c)
        || matches!(c, '\u{00ad}' | '\u{200b}'..='\u{200d}' | '\u{2060}' | '\u{feff}')
}

/// ASCII小文字の重み（`ñ`のために間隔を空ける）
fn letter_weight(c: char) -> u32 {
    TIER_LETTER + (c as u32 - 'a' as u32) * 2
}

fn char_weight(c: char) -> u32 {
    if c.is_ascii_lowercase() {
        return letter_weight(c);
    }
    if c.is_ascii_digit() {
        return TIER_DIGIT + (c as u32 - '0' as u32);
    }
    if c.is_whitespace() {
        return TIER_SPACE + if c == ' ' || c == '\u{a0}' { 0 } else { 1 };
    }
    if let Some(index) = PUNCT_ORDER.chars().position(|p| p == c) {
        return TIER_PUNCT + index as u32;
    }
    if c.is_alphabetic() {
        return TIER_LETTER + OTHER_LETTER_OFFSET + c as u32;
    }
    if c.is_numeric() {
        return TIER_DIGIT + 10 + c as u32;
    }
    TIER_SYMBOL + c as u32
}

/// アクセント付きラテン文字を基底文字に畳み込む（小文字のみ）
pub(crate) fn fold_latin(c: char) -> Option<&'static str> {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'ª' => "a",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' | 'º' => "o",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ţ' | 'ť' | 'ŧ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        _ => return None,
    };
    Some(base)
}
