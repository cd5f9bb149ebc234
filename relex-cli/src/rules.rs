//! Built-in C-like rule set, transcribed from the reference lexer's own
//! `buildCppLexer` demo (comments, keywords, literals, names, delimiters).

/// `(token_id, name, regex)` triples, in priority order.
pub const BUILT_IN: &[(i32, &str, &[u8])] = &[
    (1, "COMMENT", br"/\*(\*[^/]|[^*])*\*/"),
    (2, "KEYWORD", b"for|while|if|switch"),
    (3, "PREPROCESSOR", b"#define"),
    (4, "NATIVE_BOOL_TYPE", b"bool"),
    (5, "NATIVE_CHAR_TYPE", b"char|wchar_t|char16_t|char32_t"),
    (6, "NATIVE_INTEGER_TYPE", b"short|int|long|unsigned int|unsigned long"),
    (7, "NATIVE_FLOAT_TYPE", b"float|double"),
    (8, "FLOAT_LITERAL", br"[0-9]*\.[0-9]+[FfLl]?"),
    (9, "INTEGER_LITERAL", b"[0-9]+[Uu]?[Ll]{,2}"),
    (10, "NAME", b"[a-zA-Z_]+"),
    (11, "DELIMITER", br"\{|\}|\(|\)|,|;|:{1,2}|\[|\]|<|>|\."),
];
