//! FTS3 tokenizers resolved through the registry, as a `tokenize=` clause would.

#![cfg(feature = "fts3")]

use rustql_ext::fts3::{create_tokenizer, parse_tokenize_arg, register_tokenizer, Fts3Tokenizer};
use rustql_ext::fts3::{Fts3Cursor, Fts3Token, SimpleTokenizer};

fn tokens_for(clause: &str, text: &str) -> Vec<Fts3Token> {
    let (name, args) = parse_tokenize_arg(clause).unwrap();
    // like xCreate, the factory sees only the arguments after the name
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();
    let tokenizer = create_tokenizer(&name, &argv).unwrap();
    tokenizer.tokenize(text).unwrap()
}

fn texts(tokens: &[Fts3Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[test]
fn spanish_document() {
    let text = "La Señora Núñez pagó 1.250,50 pesos por el expediente 234/987 en Córdoba.";
    let tokens = tokens_for("tokenize=sublatin", text);
    assert_eq!(
        texts(&tokens),
        vec!["senora", "nunez", "pago", "1.250,50", "pesos", "expediente", "234/987", "cordoba"]
    );
    for (i, token) in tokens.iter().enumerate() {
        assert_eq!(token.position, i as i32);
    }
    // offsets point into the original bytes
    let nunez = &tokens[1];
    assert_eq!(&text[nunez.start..nunez.end], "Núñez");
    let last = tokens.last().unwrap();
    assert_eq!(&text[last.start..last.end], "Córdoba");
}

#[test]
fn custom_delimiters_from_clause() {
    let tokens = tokens_for("tokenize=sublatin x ';'", "Calle Mayor;Número 5;Madrid");
    assert_eq!(texts(&tokens), vec!["calle mayor", "numero 5", "madrid"]);
}

#[test]
fn cursor_is_incremental() {
    let tokenizer = create_tokenizer("sublatin", &[]).unwrap();
    let mut cursor = tokenizer.open("uno de dos");
    assert_eq!(cursor.next_token().unwrap().unwrap().text, "uno");
    assert_eq!(cursor.next_token().unwrap().unwrap().text, "dos");
    assert!(cursor.next_token().unwrap().is_none());
    assert!(cursor.next_token().unwrap().is_none());
}

#[test]
fn simple_keeps_stop_words() {
    let tokens = tokens_for("tokenize=simple", "El Perro y el GATO");
    assert_eq!(texts(&tokens), vec!["el", "perro", "y", "el", "gato"]);
}

#[test]
fn registered_tokenizer_is_found() {
    register_tokenizer("Spaces", |_args| {
        Ok(Box::new(SimpleTokenizer::new(&["spaces", " "])?) as Box<dyn Fts3Tokenizer>)
    })
    .unwrap();
    let tokens = tokens_for("tokenize=spaces", "a-b c");
    assert_eq!(texts(&tokens), vec!["a-b", "c"]);
}
