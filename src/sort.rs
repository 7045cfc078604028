//! Sort Module
//!
//! 正規化済みの行を分類（C/P）、次に説明の順で安定ソートする。

use std::cmp::Ordering;

use crate::collation::{self, collation_key};
use crate::types::NormalizedRow;

/// 行を決定的な順序に並べ替える
///
/// 第1キーは`classification`、第2キーは`description`で、どちらも
/// スペイン語の一次強度照合で比較します。両キーが同値の行は元の相対順序を保ちます。
pub fn sort_rows(rows: &mut [NormalizedRow]) {
    rows.sort_by_cached_key(|row| {
        (
            collation_key(&row.classification),
            collation_key(&row.description),
        )
    });
}

/// 2行の順序を比較する
pub fn compare_rows(a: &NormalizedRow, b: &NormalizedRow) -> Ordering {
    collation::compare(&a.classification, &b.classification)
        .then_with(|| collation::compare(&a.description, &b.description))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(description: &str, barcode: &str, classification: &str) -> NormalizedRow {
        NormalizedRow::new(description, barcode, classification)
    }

    #[test]
    fn test_sort_by_classification_then_description() {
        let mut rows = vec![
            row("AGUA", "111", "b"),
            row("PAN", "222", "a"),
            row("ARROZ", "333", "b"),
            row("LECHE", "444", "A"),
        ];
        sort_rows(&mut rows);

        let order: Vec<&str> = rows.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(order, vec!["LECHE", "PAN", "AGUA", "ARROZ"]);
    }

    #[test]
    fn test_empty_classification_sorts_first() {
        let mut rows = vec![row("B", "", "x"), row("A", "", "")];
        sort_rows(&mut rows);
        assert_eq!(rows[0].description, "A");
    }

    #[test]
    fn test_stable_for_exact_ties() {
        let mut rows = vec![
            row("JABÓN", "1", "a"),
            row("JABON", "2", "A"),
            row("JABÓN", "3", "a"),
        ];
        sort_rows(&mut rows);
        let barcodes: Vec<&str> = rows.iter().map(|r| r.barcode.as_str()).collect();
        assert_eq!(barcodes, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_enye_ordering_in_descriptions() {
        let mut rows = vec![row("ÑOQUI", "", "a"), row("OREGANO", "", "a"), row("NUEZ", "", "a")];
        sort_rows(&mut rows);
        let order: Vec<&str> = rows.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(order, vec!["NUEZ", "ÑOQUI", "OREGANO"]);
    }

    #[test]
    fn test_compare_rows_agrees_with_sort() {
        let mut rows = vec![row("B", "", "2"), row("A", "", "10"), row("C", "", "2")];
        sort_rows(&mut rows);
        for pair in rows.windows(2) {
            assert_ne!(compare_rows(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    // プロパティベーステスト
    #[allow(unused_doc_comments)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_row() -> impl Strategy<Value = NormalizedRow> {
            (
                "[a-cA-CñÑáé ]{0,4}",
                "[0-9]{0,3}",
                "[abAB]{0,1}",
            )
                .prop_map(|(d, b, c)| NormalizedRow::new(d, b, c))
        }

        #[allow(unused_doc_comments)]
        /// ソート済みの列を再ソートしても変化しない
        proptest! {
            #[test]
            fn test_sort_is_idempotent(rows in proptest::collection::vec(arb_row(), 0..40)) {
                let mut once = rows.clone();
                sort_rows(&mut once);
                let mut twice = once.clone();
                sort_rows(&mut twice);
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn test_sort_is_ordered_and_stable(rows in proptest::collection::vec(arb_row(), 0..40)) {
                // バーコードに元の位置を埋め込んで安定性を確認する
                let mut indexed: Vec<NormalizedRow> = rows
                    .into_iter()
                    .enumerate()
                    .map(|(i, r)| NormalizedRow::new(r.description, i.to_string(), r.classification))
                    .collect();
                sort_rows(&mut indexed);

                for pair in indexed.windows(2) {
                    let ordering = compare_rows(&pair[0], &pair[1]);
                    prop_assert_ne!(ordering, Ordering::Greater);
                    if ordering == Ordering::Equal {
                        let a: usize = pair[0].barcode.parse().unwrap();
                        let b: usize = pair[1].barcode.parse().unwrap();
                        prop_assert!(a < b);
                    }
                }
            }
        }
    }
}
