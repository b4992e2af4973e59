//! Billing Filter Module
//!
//! 請求用ビュー（Faturamento）の抽出。

use crate::api::BillingKeywords;
use crate::types::RecordSet;

/// 品目名がキーワードに一致するレコードだけを残す
///
/// 元の順序を保持します。一致するレコードがなければ空の`RecordSet`を返します。
///
/// ```rust
/// use sibsclean::{filter_billing, BillingKeywords, Record, RecordSet};
///
/// let records: RecordSet = vec![
///     Record::new(2.0, "Soda 2L", 3.5, 7.0),
///     Record::new(1.0, "Parafuso", 0.5, 0.5),
/// ]
/// .into();
///
/// let billing = filter_billing(&records, &BillingKeywords::default());
/// assert_eq!(billing.len(), 1);
/// assert_eq!(billing.as_slice()[0].item, "Soda 2L");
/// ```
pub fn filter_billing(records: &RecordSet, keywords: &BillingKeywords) -> RecordSet {
    records
        .iter()
        .filter(|record| keywords.matches(&record.item))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    fn records(items: &[&str]) -> RecordSet {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| Record::new(i as f64, *item, 1.0, i as f64))
            .collect()
    }

    #[test]
    fn test_filter_keeps_matching_in_order() {
        let all = records(&["Milho", "Parafuso", "SODA LIMAO", "Arroz", "leite mil"]);
        let billing = filter_billing(&all, &BillingKeywords::default());

        let items: Vec<&str> = billing.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(items, vec!["Milho", "SODA LIMAO", "leite mil"]);
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        let all = records(&["Parafuso", "Arroz"]);
        assert!(filter_billing(&all, &BillingKeywords::default()).is_empty());
    }

    #[test]
    fn test_filter_empty_input() {
        assert!(filter_billing(&RecordSet::new(), &BillingKeywords::default()).is_empty());
    }

    #[test]
    fn test_filter_custom_keywords() {
        let all = records(&["Agua", "Soda"]);
        let billing = filter_billing(&all, &BillingKeywords::new(["AGUA"]));
        assert_eq!(billing.len(), 1);
        assert_eq!(billing.as_slice()[0].item, "Agua");
    }

    #[allow(unused_doc_comments)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// filter(filter(rs)) == filter(rs)
            #[test]
            fn test_filter_idempotent(items in prop::collection::vec("[a-zA-Z ]{0,12}", 0..30)) {
                let item_refs: Vec<&str> = items.iter().map(String::as_str).collect();
                let all = records(&item_refs);
                let keywords = BillingKeywords::default();

                let once = filter_billing(&all, &keywords);
                let twice = filter_billing(&once, &keywords);
                prop_assert_eq!(&once, &twice);
                prop_assert!(once.len() <= all.len());
            }
        }
    }
}
