//! Static kana tables
//!
//! The game core treats the dictionary as an opaque, read-only data source:
//! everything it needs goes through the [`Dictionary`] trait. [`KanaDictionary`]
//! is the built-in implementation.

use serde::Serialize;

/// A symbol and its romaji reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CharacterEntry {
    pub symbol: &'static str,
    pub reading: &'static str,
}

impl CharacterEntry {
    pub const fn new(symbol: &'static str, reading: &'static str) -> Self {
        Self { symbol, reading }
    }
}

/// Script variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Script {
    #[default]
    Katakana,
    Hiragana,
}

impl Script {
    pub fn as_str(&self) -> &'static str {
        match self {
            Script::Katakana => "katakana",
            Script::Hiragana => "hiragana",
        }
    }
}

/// Symbol subsets, in the fixed order pools are concatenated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    /// Plain syllables (seion)
    Base,
    /// Dakuten / handakuten
    Voiced,
    /// Combination syllables (yoon)
    Combo,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Base, Category::Voiced, Category::Combo];
}

/// Read-only source of kana tables
pub trait Dictionary {
    fn entries(&self, script: Script, category: Category) -> &[CharacterEntry];
}

/// Built-in katakana/hiragana tables
#[derive(Debug, Clone, Copy, Default)]
pub struct KanaDictionary;

impl Dictionary for KanaDictionary {
    fn entries(&self, script: Script, category: Category) -> &[CharacterEntry] {
        match (script, category) {
            (Script::Katakana, Category::Base) => KATAKANA_BASE,
            (Script::Katakana, Category::Voiced) => KATAKANA_VOICED,
            (Script::Katakana, Category::Combo) => KATAKANA_COMBO,
            (Script::Hiragana, Category::Base) => HIRAGANA_BASE,
            (Script::Hiragana, Category::Voiced) => HIRAGANA_VOICED,
            (Script::Hiragana, Category::Combo) => HIRAGANA_COMBO,
        }
    }
}

const fn e(symbol: &'static str, reading: &'static str) -> CharacterEntry {
    CharacterEntry::new(symbol, reading)
}

pub const KATAKANA_BASE: &[CharacterEntry] = &[
    e("ア", "a"), e("イ", "i"), e("ウ", "u"), e("エ", "e"), e("オ", "o"),
    e("カ", "ka"), e("キ", "ki"), e("ク", "ku"), e("ケ", "ke"), e("コ", "ko"),
    e("サ", "sa"), e("シ", "shi"), e("ス", "su"), e("セ", "se"), e("ソ", "so"),
    e("タ", "ta"), e("チ", "chi"), e("ツ", "tsu"), e("テ", "te"), e("ト", "to"),
    e("ナ", "na"), e("ニ", "ni"), e("ヌ", "nu"), e("ネ", "ne"), e("ノ", "no"),
    e("ハ", "ha"), e("ヒ", "hi"), e("フ", "fu"), e("ヘ", "he"), e("ホ", "ho"),
    e("マ", "ma"), e("ミ", "mi"), e("ム", "mu"), e("メ", "me"), e("モ", "mo"),
    e("ヤ", "ya"), e("ユ", "yu"), e("ヨ", "yo"),
    e("ラ", "ra"), e("リ", "ri"), e("ル", "ru"), e("レ", "re"), e("ロ", "ro"),
    e("ワ", "wa"), e("ヲ", "wo"), e("ン", "n"),
];

pub const KATAKANA_VOICED: &[CharacterEntry] = &[
    e("ガ", "ga"), e("ギ", "gi"), e("グ", "gu"), e("ゲ", "ge"), e("ゴ", "go"),
    e("ザ", "za"), e("ジ", "ji"), e("ズ", "zu"), e("ゼ", "ze"), e("ゾ", "zo"),
    e("ダ", "da"), e("ヂ", "ji"), e("ヅ", "zu"), e("デ", "de"), e("ド", "do"),
    e("バ", "ba"), e("ビ", "bi"), e("ブ", "bu"), e("ベ", "be"), e("ボ", "bo"),
    e("パ", "pa"), e("ピ", "pi"), e("プ", "pu"), e("ペ", "pe"), e("ポ", "po"),
];

pub const KATAKANA_COMBO: &[CharacterEntry] = &[
    e("キャ", "kya"), e("キュ", "kyu"), e("キョ", "kyo"),
    e("シャ", "sha"), e("シュ", "shu"), e("ショ", "sho"),
    e("チャ", "cha"), e("チュ", "chu"), e("チョ", "cho"),
    e("ニャ", "nya"), e("ニュ", "nyu"), e("ニョ", "nyo"),
    e("ヒャ", "hya"), e("ヒュ", "hyu"), e("ヒョ", "hyo"),
    e("ミャ", "mya"), e("ミュ", "myu"), e("ミョ", "myo"),
    e("リャ", "rya"), e("リュ", "ryu"), e("リョ", "ryo"),
    e("ギャ", "gya"), e("ギュ", "gyu"), e("ギョ", "gyo"),
    e("ジャ", "ja"), e("ジュ", "ju"), e("ジョ", "jo"),
    e("ビャ", "bya"), e("ビュ", "byu"), e("ビョ", "byo"),
    e("ピャ", "pya"), e("ピュ", "pyu"), e("ピョ", "pyo"),
];

pub const HIRAGANA_BASE: &[CharacterEntry] = &[
    e("あ", "a"), e("い", "i"), e("う", "u"), e("え", "e"), e("お", "o"),
    e("か", "ka"), e("き", "ki"), e("く", "ku"), e("け", "ke"), e("こ", "ko"),
    e("さ", "sa"), e("し", "shi"), e("す", "su"), e("せ", "se"), e("そ", "so"),
    e("た", "ta"), e("ち", "chi"), e("つ", "tsu"), e("て", "te"), e("と", "to"),
    e("な", "na"), e("に", "ni"), e("ぬ", "nu"), e("ね", "ne"), e("の", "no"),
    e("は", "ha"), e("ひ", "hi"), e("ふ", "fu"), e("へ", "he"), e("ほ", "ho"),
    e("ま", "ma"), e("み", "mi"), e("む", "mu"), e("め", "me"), e("も", "mo"),
    e("や", "ya"), e("ゆ", "yu"), e("よ", "yo"),
    e("ら", "ra"), e("り", "ri"), e("る", "ru"), e("れ", "re"), e("ろ", "ro"),
    e("わ", "wa"), e("を", "wo"), e("ん", "n"),
];

pub const HIRAGANA_VOICED: &[CharacterEntry] = &[
    e("が", "ga"), e("ぎ", "gi"), e("ぐ", "gu"), e("げ", "ge"), e("ご", "go"),
    e("ざ", "za"), e("じ", "ji"), e("ず", "zu"), e("ぜ", "ze"), e("ぞ", "zo"),
    e("だ", "da"), e("ぢ", "ji"), e("づ", "zu"), e("で", "de"), e("ど", "do"),
    e("ば", "ba"), e("び", "bi"), e("ぶ", "bu"), e("べ", "be"), e("ぼ", "bo"),
    e("ぱ", "pa"), e("ぴ", "pi"), e("ぷ", "pu"), e("ぺ", "pe"), e("ぽ", "po"),
];

pub const HIRAGANA_COMBO: &[CharacterEntry] = &[
    e("きゃ", "kya"), e("きゅ", "kyu"), e("きょ", "kyo"),
    e("しゃ", "sha"), e("しゅ", "shu"), e("しょ", "sho"),
    e("ちゃ", "cha"), e("ちゅ", "chu"), e("ちょ", "cho"),
    e("にゃ", "nya"), e("にゅ", "nyu"), e("にょ", "nyo"),
    e("ひゃ", "hya"), e("ひゅ", "hyu"), e("ひょ", "hyo"),
    e("みゃ", "mya"), e("みゅ", "myu"), e("みょ", "myo"),
    e("りゃ", "rya"), e("りゅ", "ryu"), e("りょ", "ryo"),
    e("ぎゃ", "gya"), e("ぎゅ", "gyu"), e("ぎょ", "gyo"),
    e("じゃ", "ja"), e("じゅ", "ju"), e("じょ", "jo"),
    e("びゃ", "bya"), e("びゅ", "byu"), e("びょ", "byo"),
    e("ぴゃ", "pya"), e("ぴゅ", "pyu"), e("ぴょ", "pyo"),
];
