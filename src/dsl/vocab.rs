//! The fixed pictogram vocabulary and the symbol classifier.
//!
//! This table is the one versioned piece of configuration the tokenizer
//! depends on. Entries are matched against a whole whitespace-delimited run;
//! U+FE0F is ignored on both sides so text- and emoji-presentation spellings
//! of the same pictogram are interchangeable.

use super::ast::Operator;
use super::lexer::Token;

const VS16: char = '\u{FE0F}';

#[derive(Debug)]
pub struct VocabEntry {
    pub symbol: &'static str,
    pub name: &'static str,
    pub token: Token,
}

const fn entry(symbol: &'static str, name: &'static str, token: Token) -> VocabEntry {
    VocabEntry { symbol, name, token }
}

pub static VOCABULARY: &[VocabEntry] = &[
    // Numerals
    entry("0️⃣", "zero", Token::Digit(0)),
    entry("1️⃣", "one", Token::Digit(1)),
    entry("2️⃣", "two", Token::Digit(2)),
    entry("3️⃣", "three", Token::Digit(3)),
    entry("4️⃣", "four", Token::Digit(4)),
    entry("5️⃣", "five", Token::Digit(5)),
    entry("6️⃣", "six", Token::Digit(6)),
    entry("7️⃣", "seven", Token::Digit(7)),
    entry("8️⃣", "eight", Token::Digit(8)),
    entry("9️⃣", "nine", Token::Digit(9)),
    // Literals & delimiters
    entry("📋", "quote", Token::Quote),
    entry("✅", "true", Token::True),
    entry("❌", "false", Token::False),
    entry("📦", "array-start", Token::ArrayStart),
    entry("🎁", "array-end", Token::ArrayEnd),
    entry("🌚", "comma", Token::Comma),
    // Math
    entry("➕", "add", Token::Operator(Operator::Add)),
    entry("➖", "subtract", Token::Operator(Operator::Sub)),
    entry("✖️", "multiply", Token::Operator(Operator::Mul)),
    entry("➗", "divide", Token::Operator(Operator::Div)),
    // Relational
    entry("🎯", "equal", Token::Operator(Operator::Equal)),
    entry("📈", "greater-or-equal", Token::Operator(Operator::GreaterOrEqual)),
    entry("📉", "less-or-equal", Token::Operator(Operator::LessOrEqual)),
    entry("⬆️", "greater", Token::Operator(Operator::Greater)),
    entry("⬇️", "less", Token::Operator(Operator::Less)),
    entry("🚫", "not", Token::Operator(Operator::Not)),
    entry("🤝", "and", Token::Operator(Operator::And)),
    entry("🙌", "or", Token::Operator(Operator::Or)),
    // Control flow
    entry("🤔", "if", Token::If),
    entry("👉", "then", Token::Then),
    entry("💭", "else", Token::Else),
    entry("⏹️", "stop", Token::Stop),
    entry("🔄", "loop", Token::Loop),
    entry("🚧", "barrier", Token::Barrier),
    // Declarations & calls
    entry("📝", "declare", Token::VarDeclare),
    entry("📥", "assign", Token::Assign),
    entry("📎", "define", Token::FunctionDef),
    entry("🫑", "call-start", Token::CallStart),
    entry("🍴", "call-end", Token::CallEnd),
    entry("🔎", "index", Token::Index),
    // IO
    entry("📢", "print", Token::Print),
];

fn same_pictogram(a: &str, b: &str) -> bool {
    a == b
        || a.chars()
            .filter(|c| *c != VS16)
            .eq(b.chars().filter(|c| *c != VS16))
}

/// Find the vocabulary entry for a whole run, if any.
pub fn lookup(unit: &str) -> Option<&'static VocabEntry> {
    VOCABULARY.iter().find(|e| same_pictogram(e.symbol, unit))
}

/// Find the entry that produces `token`, for diagnostics.
pub fn entry_for(token: &Token) -> Option<&'static VocabEntry> {
    VOCABULARY.iter().find(|e| &e.token == token)
}

/// Does this non-vocabulary run qualify as an identifier fragment?
///
/// Every code point must be pictographic or an emoji component; at least one
/// must be pictographic unless the run is a keycap sequence.
pub fn is_symbol(unit: &str) -> bool {
    let keycap = unit.contains('\u{20E3}');
    let mut pictographic = false;
    for ch in unit.chars() {
        if is_pictographic(ch) {
            pictographic = true;
        } else if is_emoji_component(ch) || (keycap && matches!(ch, '0'..='9' | '#' | '*')) {
            continue;
        } else {
            return false;
        }
    }
    pictographic || keycap
}

fn is_emoji_component(ch: char) -> bool {
    matches!(
        ch,
        '\u{200D}'
            | '\u{FE0E}'
            | '\u{FE0F}'
            | '\u{20E3}'
            | '\u{1F3FB}'..='\u{1F3FF}'
            | '\u{E0020}'..='\u{E007F}'
    )
}

/// Approximation of the Unicode Extended_Pictographic property.
fn is_pictographic(ch: char) -> bool {
    matches!(
        ch,
        '\u{00A9}'
            | '\u{00AE}'
            | '\u{203C}'
            | '\u{2049}'
            | '\u{2122}'
            | '\u{2139}'
            | '\u{2194}'..='\u{2199}'
            | '\u{21A9}'..='\u{21AA}'
            | '\u{231A}'..='\u{231B}'
            | '\u{2328}'
            | '\u{23CF}'
            | '\u{23E9}'..='\u{23F3}'
            | '\u{23F8}'..='\u{23FA}'
            | '\u{24C2}'
            | '\u{25AA}'..='\u{25AB}'
            | '\u{25B6}'
            | '\u{25C0}'
            | '\u{25FB}'..='\u{25FE}'
            | '\u{2600}'..='\u{27BF}'
            | '\u{2934}'..='\u{2935}'
            | '\u{2B05}'..='\u{2B07}'
            | '\u{2B1B}'..='\u{2B1C}'
            | '\u{2B50}'
            | '\u{2B55}'
            | '\u{3030}'
            | '\u{303D}'
            | '\u{3297}'
            | '\u{3299}'
            | '\u{1F000}'..='\u{1FAFF}'
            | '\u{1FC00}'..='\u{1FFFD}'
    )
}
