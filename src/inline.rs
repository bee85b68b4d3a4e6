use crate::block::Span;

/// Bold delimiter families. Both behave identically and do not nest.
const BOLD_DELIMITERS: [&str; 2] = ["**", "__"];

/// Split a run of text into plain and bold spans.
///
/// An opening delimiter without a matching closer is kept as literal text,
/// and empty bold spans are dropped. Adjacent plain text ends up in a single
/// span.
pub fn resolve(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some((start, delimiter)) = find_opening(rest) {
        let after = &rest[start + delimiter.len()..];
        match after.find(delimiter) {
            Some(end) => {
                plain.push_str(&rest[..start]);
                let inner = &after[..end];
                if !inner.is_empty() {
                    flush_plain(&mut plain, &mut spans);
                    spans.push(Span::bold(inner));
                }
                rest = &after[end + delimiter.len()..];
            }
            None => {
                plain.push_str(&rest[..start + delimiter.len()]);
                rest = after;
            }
        }
    }

    plain.push_str(rest);
    flush_plain(&mut plain, &mut spans);
    spans
}

/// Earliest opening delimiter in `text`, with its byte offset.
fn find_opening(text: &str) -> Option<(usize, &'static str)> {
    BOLD_DELIMITERS
        .iter()
        .filter_map(|delimiter| text.find(delimiter).map(|pos| (pos, *delimiter)))
        .min_by_key(|(pos, _)| *pos)
}

fn flush_plain(plain: &mut String, spans: &mut Vec<Span>) {
    if !plain.is_empty() {
        spans.push(Span::plain(std::mem::take(plain)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::visible_text;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn plain_text() {
        assert_eq!(resolve("hello world"), vec![Span::plain("hello world")]);
    }

    #[test]
    fn empty_text() {
        assert!(resolve("").is_empty());
    }

    #[rstest]
    #[case("**x**")]
    #[case("__x__")]
    fn bold_only(#[case] input: &str) {
        assert_eq!(resolve(input), vec![Span::bold("x")]);
    }

    #[test]
    fn bold_in_the_middle() {
        assert_eq!(
            resolve("a **b** c"),
            vec![Span::plain("a "), Span::bold("b"), Span::plain(" c")]
        );
    }

    #[test]
    fn both_families_in_one_line() {
        assert_eq!(
            resolve("**一**与__二__"),
            vec![Span::bold("一"), Span::plain("与"), Span::bold("二")]
        );
    }

    #[rstest]
    #[case("**x", "**x")]
    #[case("a __b", "a __b")]
    #[case("**a__", "**a__")]
    fn unmatched_delimiter_is_literal(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(resolve(input), vec![Span::plain(expected)]);
    }

    #[test]
    fn unmatched_opener_does_not_hide_later_pair() {
        assert_eq!(
            resolve("__a **b**"),
            vec![Span::plain("__a "), Span::bold("b")]
        );
    }

    #[test]
    fn empty_bold_is_dropped() {
        assert_eq!(resolve("a****b"), vec![Span::plain("ab")]);
    }

    #[test]
    fn nearest_closer_wins() {
        assert_eq!(
            resolve("**a** and **b**"),
            vec![Span::bold("a"), Span::plain(" and "), Span::bold("b")]
        );
    }

    #[test]
    fn triple_asterisks_keep_inner_star() {
        assert_eq!(resolve("***x***"), vec![Span::bold("*x"), Span::plain("*")]);
    }

    #[rstest]
    #[case("plain")]
    #[case("a **b** c")]
    #[case("**x")]
    #[case("前**粗体**后__又一__尾")]
    fn visible_text_drops_only_markers(#[case] input: &str) {
        let expected = input
            .replacen("**粗体**", "粗体", 1)
            .replacen("__又一__", "又一", 1)
            .replacen("**b**", "b", 1);
        assert_eq!(visible_text(&resolve(input)), expected);
    }
}
