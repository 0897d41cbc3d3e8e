// src/sorter.rs
//! Client-side ordering of a result set.
//!
//! `view` never touches the stored articles: it orders borrowed references, so the
//! same `ResultSet` can be viewed under any number of keys.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::model::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Title,
    Sentiment,
    Score,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Title, SortKey::Sentiment, SortKey::Score];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Sentiment => "sentiment",
            SortKey::Score => "score",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "sentiment" => Ok(SortKey::Sentiment),
            "score" => Ok(SortKey::Score),
            other => Err(format!(
                "unknown sort key '{other}' (expected title, sentiment or score)"
            )),
        }
    }
}

/// Active column and direction. Starts unsorted/ascending; only `toggle` changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub active: Option<SortKey>,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            active: None,
            ascending: true,
        }
    }
}

impl SortState {
    pub fn by(key: SortKey, ascending: bool) -> Self {
        Self {
            active: Some(key),
            ascending,
        }
    }

    /// Same key flips direction; a different key becomes active, ascending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.active == Some(key) {
            self.ascending = !self.ascending;
        } else {
            self.active = Some(key);
            self.ascending = true;
        }
    }

    /// Header arrow for `key`: "↑"/"↓" when it is the active column, "" otherwise.
    pub fn indicator(&self, key: SortKey) -> &'static str {
        match (self.active == Some(key), self.ascending) {
            (true, true) => "↑",
            (true, false) => "↓",
            (false, _) => "",
        }
    }
}

/// Owns the sort state for one table.
#[derive(Debug, Clone, Default)]
pub struct ResultSorter {
    state: SortState,
}

impl ResultSorter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(&mut self, key: SortKey) {
        self.state.toggle(key);
        tracing::debug!(
            target: "analysis",
            key = %key,
            ascending = self.state.ascending,
            "sort key selected"
        );
    }

    pub fn state(&self) -> SortState {
        self.state
    }

    pub fn view<'a>(&self, articles: &'a [Article]) -> Vec<&'a Article> {
        view(articles, &self.state)
    }
}

/// Field value as the comparator sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
}

fn sort_value(article: &Article, key: SortKey) -> Option<SortValue<'_>> {
    match key {
        SortKey::Title => article.title.as_deref().map(SortValue::Text),
        SortKey::Sentiment => article.sentiment.as_deref().map(SortValue::Text),
        SortKey::Score => article.score.map(SortValue::Number),
    }
}

/// Ordered copy of `articles` under `state`. Stable; missing values always last.
pub fn view<'a>(articles: &'a [Article], state: &SortState) -> Vec<&'a Article> {
    let mut out: Vec<&Article> = articles.iter().collect();
    let Some(key) = state.active else {
        return out;
    };
    out.sort_by(|a, b| compare(sort_value(a, key), sort_value(b, key), state.ascending));
    out
}

fn compare(a: Option<SortValue<'_>>, b: Option<SortValue<'_>>, ascending: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = compare_values(x, y);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
    }
}

fn compare_values(a: SortValue<'_>, b: SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(&y),
        (SortValue::Text(x), SortValue::Text(y)) => locale_compare(x, y),
        (SortValue::Number(x), SortValue::Text(y)) => locale_compare(&x.to_string(), y),
        (SortValue::Text(x), SortValue::Number(y)) => locale_compare(x, &y.to_string()),
    }
}

/// Collation close to the default root locale:
/// base letters first (accents and case ignored), then accents, then case with
/// lower before upper.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| {
            a.nfd()
                .flat_map(char::to_lowercase)
                .cmp(b.nfd().flat_map(char::to_lowercase))
        })
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
}

/// Lowercased text with combining marks stripped after canonical decomposition.
fn base_letters(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
    {
        // Letters with a stroke or ligature have no decomposition.
        match c {
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'ł' => out.push('l'),
            'ø' => out.push('o'),
            'đ' | 'ð' => out.push('d'),
            'ı' => out.push('i'),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(title: Option<&str>, sentiment: Option<&str>, score: Option<f64>) -> Article {
        Article {
            title: title.map(str::to_string),
            url: None,
            sentiment: sentiment.map(str::to_string),
            score,
        }
    }

    fn titles(v: &[&Article]) -> Vec<String> {
        v.iter()
            .map(|a| a.title.clone().unwrap_or_else(|| "-".into()))
            .collect()
    }

    #[test]
    fn toggle_flips_same_key_and_resets_on_new_key() {
        let mut s = SortState::default();
        assert_eq!(s.active, None);
        assert!(s.ascending);

        s.toggle(SortKey::Score);
        assert_eq!(s, SortState::by(SortKey::Score, true));
        s.toggle(SortKey::Score);
        assert_eq!(s, SortState::by(SortKey::Score, false));
        s.toggle(SortKey::Title);
        assert_eq!(s, SortState::by(SortKey::Title, true));
    }

    #[test]
    fn no_active_key_keeps_server_order() {
        let rows = vec![
            art(Some("B"), None, Some(0.2)),
            art(Some("A"), None, Some(0.9)),
        ];
        let out = view(&rows, &SortState::default());
        assert_eq!(titles(&out), vec!["B", "A"]);
    }

    #[test]
    fn score_sorts_numerically_with_nulls_last() {
        let rows = vec![
            art(Some("B"), None, Some(0.2)),
            art(Some("A"), None, Some(0.9)),
            art(Some("C"), None, None),
            art(Some("D"), None, Some(10.0)),
        ];
        let asc = view(&rows, &SortState::by(SortKey::Score, true));
        assert_eq!(titles(&asc), vec!["B", "A", "D", "C"]);

        let desc = view(&rows, &SortState::by(SortKey::Score, false));
        assert_eq!(titles(&desc), vec!["D", "A", "B", "C"]);
    }

    #[test]
    fn missing_text_sorts_last_in_both_directions() {
        let rows = vec![
            art(None, Some("neutral"), None),
            art(Some("beta"), Some("positive"), None),
            art(Some("Alpha"), None, None),
        ];
        let asc = view(&rows, &SortState::by(SortKey::Title, true));
        assert_eq!(titles(&asc), vec!["Alpha", "beta", "-"]);
        let desc = view(&rows, &SortState::by(SortKey::Title, false));
        assert_eq!(titles(&desc), vec!["beta", "Alpha", "-"]);

        let by_sent = view(&rows, &SortState::by(SortKey::Sentiment, false));
        assert_eq!(titles(&by_sent), vec!["beta", "-", "Alpha"]);
    }

    #[test]
    fn locale_compare_ignores_case_and_accents_at_first_level() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("Banco", "banco"), Ordering::Greater);
        assert_eq!(locale_compare("banco", "Banco"), Ordering::Less);
        assert_eq!(locale_compare("Itaú", "Itau"), Ordering::Greater);
        assert_eq!(locale_compare("Itaú", "Itav"), Ordering::Less);
        assert_eq!(locale_compare("ação", "acao"), Ordering::Greater);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);
    }

    #[test]
    fn accented_latin_names_sort_with_their_base_letter() {
        let rows: Vec<Article> = [
            "Zurich Bank",
            "Česká spořitelna",
            "Deutsche Bank",
            "Łódź Bank",
            "Ōita Bank",
            "Mbank",
        ]
        .into_iter()
        .map(|t| art(Some(t), None, None))
        .collect();

        let mut sorter = ResultSorter::new();
        sorter.sort_by(SortKey::Title);
        assert_eq!(
            titles(&sorter.view(&rows)),
            vec![
                "Česká spořitelna",
                "Deutsche Bank",
                "Łódź Bank",
                "Mbank",
                "Ōita Bank",
                "Zurich Bank"
            ]
        );
    }

    #[test]
    fn locale_compare_folds_letters_outside_western_europe() {
        assert_eq!(locale_compare("Žilina", "Zagreb"), Ordering::Greater);
        assert_eq!(locale_compare("Řím", "Sberbank"), Ordering::Less);
        assert_eq!(locale_compare("Şekerbank", "Tbank"), Ordering::Less);
        assert_eq!(locale_compare("Ābele", "Banka"), Ordering::Less);
        assert_eq!(locale_compare("Straße", "Strasz"), Ordering::Less);
        assert_eq!(locale_compare("Straße", "Strasse"), Ordering::Greater);
        assert_eq!(locale_compare("Ørsted", "Pbank"), Ordering::Less);
    }

    #[test]
    fn view_leaves_input_untouched() {
        let rows = vec![
            art(Some("b"), None, Some(1.0)),
            art(Some("a"), None, Some(2.0)),
        ];
        let before = rows.clone();
        let _ = view(&rows, &SortState::by(SortKey::Title, true));
        let _ = view(&rows, &SortState::by(SortKey::Score, false));
        assert_eq!(rows, before);
    }

    #[test]
    fn indicator_marks_only_active_column() {
        let mut sorter = ResultSorter::new();
        sorter.sort_by(SortKey::Sentiment);
        let st = sorter.state();
        assert_eq!(st.indicator(SortKey::Sentiment), "↑");
        assert_eq!(st.indicator(SortKey::Title), "");
        sorter.sort_by(SortKey::Sentiment);
        assert_eq!(sorter.state().indicator(SortKey::Sentiment), "↓");
    }
}
