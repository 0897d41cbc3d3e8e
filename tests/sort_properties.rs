// tests/sort_properties.rs
//
// Ordering properties of the result sorter:
// - ascending and descending are reverses of each other, missing values stay last
// - viewing is idempotent and never reorders the stored set

use proptest::prelude::*;

use bank_sentiment_client::model::Article;
use bank_sentiment_client::sorter::{view, SortKey, SortState};

/// Distinct, present values per key so that ties cannot blur the reverse property.
fn article_strategy() -> impl Strategy<Value = Vec<Article>> {
    prop::collection::vec(
        (
            prop::option::weighted(0.8, "[a-zA-Z]{1,8}"),
            prop::option::weighted(0.8, prop::sample::select(vec!["positive", "negative", "neutral"])),
            prop::option::weighted(0.8, -1000i32..1000),
        ),
        0..24,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (title, sentiment, score))| Article {
                title: title.map(|t| format!("{t}{i:03}")),
                url: Some(format!("https://news/{i}")),
                sentiment: sentiment.map(|s| format!("{s}-{i:03}")),
                score: score.map(|s| f64::from(s) + i as f64 / 1000.0),
            })
            .collect()
    })
}

fn key_strategy() -> impl Strategy<Value = SortKey> {
    prop::sample::select(SortKey::ALL.to_vec())
}

fn is_missing(a: &Article, key: SortKey) -> bool {
    match key {
        SortKey::Title => a.title.is_none(),
        SortKey::Sentiment => a.sentiment.is_none(),
        SortKey::Score => a.score.is_none(),
    }
}

proptest! {
    #[test]
    fn descending_reverses_ascending_except_missing(rows in article_strategy(), key in key_strategy()) {
        let asc = view(&rows, &SortState::by(key, true));
        let desc = view(&rows, &SortState::by(key, false));

        let present_asc: Vec<&Article> = asc.iter().copied().filter(|a| !is_missing(a, key)).collect();
        let mut present_desc: Vec<&Article> = desc.iter().copied().filter(|a| !is_missing(a, key)).collect();
        present_desc.reverse();
        prop_assert_eq!(present_asc, present_desc);

        // missing values form the tail in both directions, in server order
        for ordered in [&asc, &desc] {
            let first_missing = ordered.iter().position(|a| is_missing(a, key)).unwrap_or(ordered.len());
            prop_assert!(ordered[first_missing..].iter().all(|a| is_missing(a, key)));
            let tail: Vec<&Article> = ordered[first_missing..].to_vec();
            let expected: Vec<&Article> = rows.iter().filter(|a| is_missing(a, key)).collect();
            prop_assert_eq!(tail, expected);
        }
    }

    #[test]
    fn view_is_idempotent_and_non_mutating(rows in article_strategy(), key in key_strategy(), ascending in any::<bool>()) {
        let before = rows.clone();
        let state = SortState::by(key, ascending);
        let first: Vec<Article> = view(&rows, &state).into_iter().cloned().collect();
        let second: Vec<Article> = view(&rows, &state).into_iter().cloned().collect();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&rows, &before);
        prop_assert_eq!(first.len(), rows.len());
    }

    #[test]
    fn unsorted_view_is_server_order(rows in article_strategy()) {
        let out = view(&rows, &SortState::default());
        let expected: Vec<&Article> = rows.iter().collect();
        prop_assert_eq!(out, expected);
    }
}

#[test]
fn score_ascending_example_from_wire_strings() {
    let rows: Vec<Article> = serde_json::from_value::<Vec<bank_sentiment_client::model::WireArticle>>(
        serde_json::json!([
            { "title": "B", "score": "0.2" },
            { "title": "A", "score": "0.9" },
            { "title": "C", "score": null }
        ]),
    )
    .unwrap()
    .into_iter()
    .map(Article::from)
    .collect();

    let out: Vec<&str> = view(&rows, &SortState::by(SortKey::Score, true))
        .into_iter()
        .filter_map(|a| a.title.as_deref())
        .collect();
    assert_eq!(out, vec!["B", "A", "C"]);
}
