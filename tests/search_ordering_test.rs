use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use searchx::analysis::TextNormalizer;
use searchx::index::{ConcurrentInvertedIndex, InvertedIndex, SearchIndex, SearchResult};
use searchx::query::{QueryResultBuilder, SingleQueryResultBuilder};
use searchx::work_queue::WorkQueue;

fn terms(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn summary(results: &[SearchResult]) -> Vec<(String, usize)> {
    results
        .iter()
        .map(|r| (r.location().to_string(), r.matches()))
        .collect()
}

fn cat_index() -> InvertedIndex {
    let mut index = InvertedIndex::new();
    index.add("cat", "docA", 1);
    index.add("cat", "docA", 3);
    index.add("category", "docA", 2);
    index.add("category", "docB", 1);
    index
}

#[test]
fn test_partial_and_exact_search_over_both_index_types() {
    let plain = cat_index();
    let shared = ConcurrentInvertedIndex::from(cat_index());
    let indexes: [&dyn SearchIndex; 2] = [&plain, &shared];

    for index in indexes {
        let partial = index.search(&terms(&["cat"]), false);
        assert_eq!(
            summary(&partial),
            vec![("docA".to_string(), 3), ("docB".to_string(), 1)]
        );
        assert!(partial[0].score() >= partial[1].score());

        let exact = index.search(&terms(&["cat"]), true);
        assert_eq!(summary(&exact), vec![("docA".to_string(), 2)]);
    }
}

#[test]
fn test_results_are_sorted_by_total_order() {
    let mut rng = rand::rng();
    let mut index = InvertedIndex::new();

    for doc in 0..40 {
        let location = if doc % 2 == 0 { format!("Doc{doc}") } else { format!("doc{doc}") };
        let length = rng.random_range(1..30);
        for position in 1..=length {
            let term = ["apple", "apricot", "banana", "apex"][rng.random_range(0..4)];
            index.add(term, &location, position);
        }
    }

    let results = index.partial_search(&terms(&["ap"]));
    for pair in results.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a <= b);
        assert!(a.score() >= b.score());
        if a.score() == b.score() {
            assert!(a.matches() >= b.matches());
            if a.matches() == b.matches() {
                assert!(a.location().to_lowercase() <= b.location().to_lowercase());
            }
        }
    }
}

#[test]
fn test_overlapping_prefixes_count_each_query_term() {
    let mut index = InvertedIndex::new();
    index.add_stems(["apple", "apple", "pear"], "fruit");

    // "ap" and "app" both reach "apple"
    let results = index.partial_search(&terms(&["ap", "app"]));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].matches(), 4);

    let results = index.exact_search(&terms(&["apple", "pear", "plum"]));
    assert_eq!(results[0].matches(), 3);
    assert_eq!(results[0].score(), 1.0);
}

#[test]
fn test_merge_order_does_not_change_search() {
    let mut rng = rand::rng();
    let normalizer = TextNormalizer::new();
    let pages: Vec<(String, String)> = (0..30)
        .map(|i| {
            let words = ["river", "rivers", "stream", "streaming", "lake", "ocean", "sea"];
            let text: Vec<&str> = (0..rng.random_range(3..25))
                .map(|_| words[rng.random_range(0..words.len())])
                .collect();
            (format!("page{i}"), text.join(" "))
        })
        .collect();

    let mut sequential = InvertedIndex::new();
    for (location, text) in &pages {
        sequential.add_stems(normalizer.list_stems(text), location);
    }

    let mut shuffled = pages.clone();
    shuffled.shuffle(&mut rng);

    let queue = WorkQueue::new(4).unwrap();
    let shared = Arc::new(ConcurrentInvertedIndex::new());
    for (location, text) in shuffled {
        let shared = Arc::clone(&shared);
        let normalizer = normalizer.clone();
        queue
            .execute_fn(format!("merge {location}"), move || {
                let mut local = InvertedIndex::new();
                local.add_stems(normalizer.list_stems(&text), &location);
                shared.add_all(local);
                Ok(())
            })
            .unwrap();
    }
    queue.join().unwrap();

    let mut expected = SingleQueryResultBuilder::new(&sequential);
    let mut actual = SingleQueryResultBuilder::new(shared.as_ref());
    for line in ["river", "stream sea", "lake ocean river", "s"] {
        expected.parse_line(line, false).unwrap();
        actual.parse_line(line, false).unwrap();
    }

    for (query, hits) in expected.results() {
        assert_eq!(summary(&actual.results()[&query]), summary(&hits), "{query}");
    }
}
