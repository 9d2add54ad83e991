// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Palantir Project
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::error::DataResult;
use crate::results::QueryResults;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Cardinality between the distinct values of two columns, observed over
/// the current row set only. Never a schema-level claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// Value of one column mapped to the set of values it co-occurs with in
/// the other column.
pub type LinkMap = HashMap<String, HashSet<String>>;

/// Both directions of co-occurrence between a column pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnLinks {
    pub outgoing: LinkMap,
    pub incoming: LinkMap,
}

/// Single pass over the rows, collecting co-occurrence in both directions.
/// Comparison is exact string equality: no trimming, no URI or numeric
/// normalisation.
pub fn column_links(
    results: &QueryResults,
    col_a: &str,
    col_b: &str,
) -> DataResult<ColumnLinks> {
    let index_a = results.column_index(col_a)?;
    let index_b = results.column_index(col_b)?;

    let mut links = ColumnLinks::default();
    for row in &results.data {
        let source = &row[index_a];
        let target = &row[index_b];
        links
            .outgoing
            .entry(source.clone())
            .or_default()
            .insert(target.clone());
        links
            .incoming
            .entry(target.clone())
            .or_default()
            .insert(source.clone());
    }
    Ok(links)
}

/// Resolves the link maps to a single relation by hypothesis elimination:
/// a source with more than one target falsifies one-to-one and many-to-one,
/// a target with more than one source falsifies one-to-one and one-to-many.
/// Zero rows leave every hypothesis standing, so the result is vacuously
/// one-to-one.
pub fn classify_relationship(links: &ColumnLinks) -> RelationType {
    let fans_out = links.outgoing.values().any(|targets| targets.len() > 1);
    let fans_in = links.incoming.values().any(|sources| sources.len() > 1);

    match (fans_out, fans_in) {
        (false, false) => RelationType::OneToOne,
        (true, false) => RelationType::OneToMany,
        (false, true) => RelationType::ManyToOne,
        (true, true) => RelationType::ManyToMany,
    }
}

/// Pairwise relations over a column chain, upper-triangular in the chain's
/// own order, together with the raw link maps for drill-down consumers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationAnalysis {
    pub relations: HashMap<String, HashMap<String, RelationType>>,
    pub outgoing: HashMap<String, HashMap<String, LinkMap>>,
    pub incoming: HashMap<String, HashMap<String, LinkMap>>,
}

impl RelationAnalysis {
    /// Lookup in construction order: `a` must precede `b` in the chain the
    /// analysis was built from.
    pub fn relation(&self, a: &str, b: &str) -> Option<RelationType> {
        self.relations.get(a).and_then(|inner| inner.get(b)).copied()
    }
}

/// Computes the relation for every ordered pair (i < j) of the given chain.
pub fn analyse_relations(
    results: &QueryResults,
    columns: &[String],
) -> DataResult<RelationAnalysis> {
    let mut analysis = RelationAnalysis::default();

    for (col_a, col_b) in columns.iter().tuple_combinations() {
        let links = column_links(results, col_a, col_b)?;
        let relation = classify_relationship(&links);
        debug!(%col_a, %col_b, ?relation, "classified column pair");

        analysis
            .relations
            .entry(col_a.clone())
            .or_default()
            .insert(col_b.clone(), relation);
        analysis
            .outgoing
            .entry(col_a.clone())
            .or_default()
            .insert(col_b.clone(), links.outgoing);
        analysis
            .incoming
            .entry(col_b.clone())
            .or_default()
            .insert(col_a.clone(), links.incoming);
    }

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use proptest::prelude::*;

    fn results(header: &[&str], rows: &[&[&str]]) -> QueryResults {
        QueryResults::new(
            header.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn relation_of(rows: &[&[&str]]) -> RelationType {
        let r = results(&["a", "b"], rows);
        classify_relationship(&column_links(&r, "a", "b").unwrap())
    }

    #[test]
    fn classifies_one_to_one() {
        assert_eq!(
            relation_of(&[&["x", "1"], &["y", "2"], &["x", "1"]]),
            RelationType::OneToOne
        );
    }

    #[test]
    fn classifies_one_to_many() {
        assert_eq!(
            relation_of(&[&["x", "1"], &["x", "2"], &["y", "3"]]),
            RelationType::OneToMany
        );
    }

    #[test]
    fn classifies_many_to_one() {
        assert_eq!(
            relation_of(&[&["x", "1"], &["y", "1"]]),
            RelationType::ManyToOne
        );
    }

    #[test]
    fn classifies_many_to_many() {
        assert_eq!(
            relation_of(&[&["x", "1"], &["x", "2"], &["y", "1"]]),
            RelationType::ManyToMany
        );
    }

    #[test]
    fn zero_rows_resolve_to_one_to_one() {
        assert_eq!(relation_of(&[]), RelationType::OneToOne);
    }

    #[test]
    fn comparison_is_exact() {
        // Differing only in case or whitespace counts as distinct values.
        assert_eq!(
            relation_of(&[&["x", "Oslo"], &["x", "oslo"]]),
            RelationType::OneToMany
        );
    }

    #[test]
    fn unknown_column_is_an_error() {
        let r = results(&["a", "b"], &[]);
        assert!(matches!(
            column_links(&r, "a", "missing"),
            Err(DataError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn analysis_is_upper_triangular() {
        let r = results(
            &["continent", "country", "city"],
            &[
                &["Europe", "Norway", "Oslo"],
                &["Europe", "Norway", "Bergen"],
                &["Europe", "France", "Paris"],
            ],
        );
        let chain = vec![
            "continent".to_string(),
            "country".to_string(),
            "city".to_string(),
        ];
        let analysis = analyse_relations(&r, &chain).unwrap();

        assert_eq!(
            analysis.relation("continent", "country"),
            Some(RelationType::OneToMany)
        );
        assert_eq!(
            analysis.relation("country", "city"),
            Some(RelationType::OneToMany)
        );
        assert_eq!(
            analysis.relation("continent", "city"),
            Some(RelationType::OneToMany)
        );
        // Reverse order was never built.
        assert_eq!(analysis.relation("country", "continent"), None);
    }

    #[test]
    fn link_maps_are_exposed_per_pair() {
        let r = results(
            &["country", "city"],
            &[&["Norway", "Oslo"], &["Norway", "Bergen"]],
        );
        let chain = vec!["country".to_string(), "city".to_string()];
        let analysis = analyse_relations(&r, &chain).unwrap();

        let outgoing = &analysis.outgoing["country"]["city"];
        assert_eq!(outgoing["Norway"].len(), 2);
        let incoming = &analysis.incoming["city"]["country"];
        assert!(incoming["Oslo"].contains("Norway"));
    }

    proptest! {
        // Classification depends on the value sets, not on row order.
        #[test]
        fn classification_is_row_order_independent(
            rows in proptest::collection::vec((0u8..5, 0u8..5), 0..30)
        ) {
            let as_results = |rows: &[(u8, u8)]| {
                QueryResults::new(
                    vec!["a".into(), "b".into()],
                    rows.iter()
                        .map(|(a, b)| vec![a.to_string(), b.to_string()])
                        .collect(),
                )
                .unwrap()
            };
            let classify = |r: &QueryResults| {
                classify_relationship(&column_links(r, "a", "b").unwrap())
            };

            let forward = classify(&as_results(&rows));
            let mut reversed = rows.clone();
            reversed.reverse();
            let mut sorted = rows.clone();
            sorted.sort_unstable();

            prop_assert_eq!(forward, classify(&as_results(&reversed)));
            prop_assert_eq!(forward, classify(&as_results(&sorted)));
        }
    }
}
