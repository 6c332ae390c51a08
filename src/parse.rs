//! User input parsing: book identifiers and claim ID lists.

use crate::error::{BotError, Result};

/// Maximum number of books accepted by a single /claimmultiple invocation.
pub const MAX_BATCH_CLAIMS: usize = 5;

/// Canonical fiction URL prefix used when the user gives a bare numeric ID.
pub const FICTION_URL_BASE: &str = "https://www.royalroad.com/fiction";

/// A parsed reference to a tracked book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRef {
    pub id: u64,
    pub url: String,
}

/// Parse a book identifier the way users actually type them: either a bare
/// numeric ID (`12345`) or any URL containing `/fiction/<id>`.
///
/// Bare IDs get a canonically-formed URL; URLs are normalized to the same
/// canonical form so the backend always sees one shape.
pub fn parse_book_identifier(input: &str) -> Result<BookRef> {
    let trimmed = input.trim();

    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        let id: u64 = trimmed.parse().map_err(|_| BotError::InvalidBook {
            input: trimmed.to_string(),
        })?;
        return Ok(BookRef {
            id,
            url: format!("{}/{}", FICTION_URL_BASE, id),
        });
    }

    if let Some(pos) = trimmed.find("/fiction/") {
        let rest = &trimmed[pos + "/fiction/".len()..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            if let Ok(id) = digits.parse::<u64>() {
                return Ok(BookRef {
                    id,
                    url: format!("{}/{}", FICTION_URL_BASE, id),
                });
            }
        }
    }

    Err(BotError::InvalidBook {
        input: trimmed.to_string(),
    })
}

/// Parse a comma- and/or whitespace-separated list of numeric IDs.
///
/// Any non-numeric token is rejected outright; duplicates are dropped while
/// preserving first-seen order.
pub fn parse_id_list(input: &str) -> Result<Vec<u64>> {
    let mut ids = Vec::new();

    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let id: u64 = token.parse().map_err(|_| BotError::InvalidId {
            token: token.to_string(),
        })?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    if ids.is_empty() {
        return Err(BotError::EmptyIdList {
            input: input.to_string(),
        });
    }

    Ok(ids)
}

/// Split a batch of book identifiers and parse each one.
///
/// Enforces [`MAX_BATCH_CLAIMS`] before anything else so an oversized batch
/// is rejected without a single network call being made.
pub fn parse_book_batch(input: &str) -> Result<Vec<BookRef>> {
    let tokens: Vec<&str> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err(BotError::EmptyIdList {
            input: input.to_string(),
        });
    }
    if tokens.len() > MAX_BATCH_CLAIMS {
        return Err(BotError::BatchTooLarge {
            given: tokens.len(),
            limit: MAX_BATCH_CLAIMS,
        });
    }

    let mut books = Vec::with_capacity(tokens.len());
    for token in tokens {
        let book = parse_book_identifier(token)?;
        if !books.contains(&book) {
            books.push(book);
        }
    }
    Ok(books)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_numeric_id() {
        let book = parse_book_identifier("12345").unwrap();
        assert_eq!(book.id, 12345);
        assert_eq!(book.url, "https://www.royalroad.com/fiction/12345");
    }

    #[test]
    fn test_parse_fiction_url() {
        let book =
            parse_book_identifier("https://www.royalroad.com/fiction/12345/some-slug").unwrap();
        assert_eq!(book.id, 12345);
        assert_eq!(book.url, "https://www.royalroad.com/fiction/12345");
    }

    #[test]
    fn test_bare_id_and_url_agree() {
        let from_id = parse_book_identifier("12345").unwrap();
        let from_url = parse_book_identifier("https://www.royalroad.com/fiction/12345").unwrap();
        assert_eq!(from_id, from_url);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_book_identifier("not-a-book").is_err());
        assert!(parse_book_identifier("").is_err());
        assert!(parse_book_identifier("https://example.com/book/12").is_err());
    }

    #[test]
    fn test_id_list_mixed_separators() {
        let ids = parse_id_list("123, 456 789").unwrap();
        assert_eq!(ids, vec![123, 456, 789]);
    }

    #[test]
    fn test_id_list_dedup_preserves_order() {
        let ids = parse_id_list("5, 3, 5, 1").unwrap();
        assert_eq!(ids, vec![5, 3, 1]);
    }

    #[test]
    fn test_id_list_rejects_garbage_token() {
        let err = parse_id_list("123, abc").unwrap_err();
        assert!(matches!(err, BotError::InvalidId { .. }));
    }

    #[test]
    fn test_id_list_empty_input() {
        assert!(matches!(
            parse_id_list("  ,  ").unwrap_err(),
            BotError::EmptyIdList { .. }
        ));
    }

    #[test]
    fn test_batch_boundary_is_five() {
        let five = parse_book_batch("1 2 3 4 5").unwrap();
        assert_eq!(five.len(), 5);

        let err = parse_book_batch("1 2 3 4 5 6").unwrap_err();
        assert!(matches!(
            err,
            BotError::BatchTooLarge { given: 6, limit: 5 }
        ));
    }

    #[test]
    fn test_batch_accepts_urls_and_ids() {
        let books = parse_book_batch("12, https://www.royalroad.com/fiction/34/slug").unwrap();
        assert_eq!(books[0].id, 12);
        assert_eq!(books[1].id, 34);
    }
}
