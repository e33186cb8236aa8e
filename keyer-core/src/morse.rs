//! Morse lookup table and letter decoder

/// Symbol sequence to character, letters and digits only
pub const MORSE_TABLE: &[(&str, char)] = &[
    (".-", 'A'),
    ("-...", 'B'),
    ("-.-.", 'C'),
    ("-..", 'D'),
    (".", 'E'),
    ("..-.", 'F'),
    ("--.", 'G'),
    ("....", 'H'),
    ("..", 'I'),
    (".---", 'J'),
    ("-.-", 'K'),
    (".-..", 'L'),
    ("--", 'M'),
    ("-.", 'N'),
    ("---", 'O'),
    (".--.", 'P'),
    ("--.-", 'Q'),
    (".-.", 'R'),
    ("...", 'S'),
    ("-", 'T'),
    ("..-", 'U'),
    ("...-", 'V'),
    (".--", 'W'),
    ("-..-", 'X'),
    ("-.--", 'Y'),
    ("--..", 'Z'),
    (".----", '1'),
    ("..---", '2'),
    ("...--", '3'),
    ("....-", '4'),
    (".....", '5'),
    ("-....", '6'),
    ("--...", '7'),
    ("---..", '8'),
    ("----.", '9'),
    ("-----", '0'),
];

/// Decode a complete symbol sequence. Only exact matches decode.
pub fn decode(symbols: &str) -> Option<char> {
    MORSE_TABLE
        .iter()
        .find(|(pattern, _)| *pattern == symbols)
        .map(|(_, ch)| *ch)
}

/// Reverse lookup, case-insensitive
pub fn encode(ch: char) -> Option<&'static str> {
    let ch = ch.to_ascii_uppercase();
    MORSE_TABLE
        .iter()
        .find(|(_, c)| *c == ch)
        .map(|(pattern, _)| *pattern)
}
