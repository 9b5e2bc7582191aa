//! Comma-separated field codec.
//!
//! Fields are joined with `,`. A field containing `"`, `,`, `\n` or `\r` is
//! wrapped in double quotes, and every `"` inside it is doubled. There is no
//! other escape mechanism.
//!
//! [`merge_fields`] and [`split_fields`] are inverses for every record except
//! the single empty field `[""]`, which encodes to the empty line and
//! therefore decodes to no fields at all.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

const SEPARATOR: char = ',';
const QUOTE: char = '"';

/// Returns `true` if `field` must be quoted to survive a round trip.
///
/// # Examples
///
/// ```
/// use stashdb_common::csv::needs_quoting;
///
/// assert!(needs_quoting("a,b"));
/// assert!(needs_quoting("say \"hi\""));
/// assert!(!needs_quoting("plain text"));
/// ```
pub fn needs_quoting(field: &str) -> bool {
    field.contains([QUOTE, SEPARATOR, '\n', '\r'])
}

/// Quotes a single field if it needs it, doubling embedded quotes.
///
/// Fields that need no quoting are borrowed unchanged.
pub fn quote_field(field: &str) -> Cow<'_, str> {
    if !needs_quoting(field) {
        return Cow::Borrowed(field);
    }

    let mut quoted = String::with_capacity(field.len() + 2);
    quoted.push(QUOTE);
    for c in field.chars() {
        if c == QUOTE {
            quoted.push(QUOTE);
        }
        quoted.push(c);
    }
    quoted.push(QUOTE);
    Cow::Owned(quoted)
}

/// Encodes an ordered sequence of fields into one comma-separated line.
///
/// No trailing separator and no line terminator are written. An empty
/// sequence encodes to the empty string, and so does a sequence holding a
/// single empty field.
///
/// # Examples
///
/// ```
/// use stashdb_common::csv::merge_fields;
///
/// assert_eq!(merge_fields(["1", "2", "3"]), "1,2,3");
/// assert_eq!(
///     merge_fields(["\n", "123\"123", ",,,"]),
///     "\"\n\",\"123\"\"123\",\",,,\""
/// );
/// assert_eq!(merge_fields(Vec::<String>::new()), "");
/// ```
pub fn merge_fields<I>(fields: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut line = String::new();
    for (index, field) in fields.into_iter().enumerate() {
        if index > 0 {
            line.push(SEPARATOR);
        }
        line.push_str(&quote_field(field.as_ref()));
    }
    line
}

/// Encodes arbitrary items by converting each one to a field first.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use stashdb_common::csv::merge_fields_with;
///
/// let ids: BTreeSet<i32> = [3, 7, 4, 5, 2, 6, 1, 7].into_iter().collect();
/// assert_eq!(merge_fields_with(&ids, |id| id.to_string()), "1,2,3,4,5,6,7");
/// ```
pub fn merge_fields_with<I, F>(items: I, to_field: F) -> String
where
    I: IntoIterator,
    F: FnMut(I::Item) -> String,
{
    merge_fields(items.into_iter().map(to_field))
}

/// Joins two already-encoded fragments with a single comma.
///
/// This is a shortcut over [`merge_fields`], not a general merge: both sides
/// must already be valid encoded lines (plain numbers, or output of
/// [`merge_fields`]). Nothing is quoted. An empty side is dropped so no
/// stray separator is produced.
///
/// # Examples
///
/// ```
/// use stashdb_common::csv::merge_pair;
///
/// assert_eq!(merge_pair("1,2", "3"), "1,2,3");
/// assert_eq!(merge_pair("", "3"), "3");
/// assert_eq!(merge_pair("1,2", ""), "1,2");
/// ```
pub fn merge_pair(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{a}{SEPARATOR}{b}"),
    }
}

/// How a field scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldEnd {
    Separator,
    LineBreak,
    EndOfInput,
}

/// Decodes one comma-separated line into its fields.
///
/// Decoding never fails:
/// - an unterminated quoted field runs to the end of the input;
/// - characters after a closing quote are kept verbatim up to the next
///   separator;
/// - a raw `\n` or `\r` outside quotes ends the record and the rest of the
///   input is ignored.
///
/// The empty line decodes to no fields.
///
/// # Examples
///
/// ```
/// use stashdb_common::csv::split_fields;
///
/// assert_eq!(split_fields("1,\"2\"\"\",2a"), vec!["1", "2\"", "2a"]);
/// assert_eq!(split_fields("1,\"2\n\",\"2a,\""), vec!["1", "2\n", "2a,"]);
/// assert!(split_fields("").is_empty());
/// ```
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    if line.is_empty() {
        return fields;
    }

    let mut chars = line.chars().peekable();
    loop {
        let (field, end) = scan_field(&mut chars);
        fields.push(field);
        match end {
            FieldEnd::Separator => continue,
            FieldEnd::LineBreak => {
                let rest: String = chars.collect();
                if !rest.trim_start_matches(['\n', '\r']).is_empty() {
                    tracing::trace!(
                        "Line break outside quotes ended the record, ignoring {} trailing bytes",
                        rest.len()
                    );
                }
                break;
            }
            FieldEnd::EndOfInput => break,
        }
    }
    fields
}

fn scan_field(chars: &mut Peekable<Chars<'_>>) -> (String, FieldEnd) {
    let mut field = String::new();
    let mut in_quotes = chars.next_if_eq(&QUOTE).is_some();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c != QUOTE {
                field.push(c);
            } else if chars.next_if_eq(&QUOTE).is_some() {
                field.push(QUOTE);
            } else {
                in_quotes = false;
            }
            continue;
        }

        match c {
            SEPARATOR => return (field, FieldEnd::Separator),
            '\n' | '\r' => return (field, FieldEnd::LineBreak),
            _ => field.push(c),
        }
    }

    if in_quotes {
        tracing::trace!("Unterminated quoted field, taking it up to end of input");
    }
    (field, FieldEnd::EndOfInput)
}
