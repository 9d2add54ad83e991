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

use crate::error::{DataError, DataResult};
use crate::relations::{RelationAnalysis, RelationType};
use crate::results::QueryResults;
use std::collections::HashSet;
use tracing::debug;

/// Relations between consecutive pairs of the chain, looked up in the same
/// order the analysis was built in. The relation map is upper-triangular
/// over that order, so a pair the map does not hold means the caller walked
/// a chain the analysis never covered.
pub fn adjacent_relations(
    analysis: &RelationAnalysis,
    columns: &[String],
) -> DataResult<Vec<RelationType>> {
    columns
        .windows(2)
        .map(|pair| {
            analysis
                .relation(&pair[0], &pair[1])
                .ok_or_else(|| DataError::MissingRelation {
                    a: pair[0].clone(),
                    b: pair[1].clone(),
                })
        })
        .collect()
}

/// A chain is hierarchical when every parent determines its children and no
/// child is shared between parents: every adjacent relation is one-to-one
/// or one-to-many. The empty relation list passes trivially.
pub fn relations_are_hierarchical(relations: &[RelationType]) -> bool {
    relations
        .iter()
        .all(|r| matches!(r, RelationType::OneToOne | RelationType::OneToMany))
}

/// Hierarchy test over a full column chain. Chains of length 0 or 1 pass.
pub fn columns_are_hierarchical(
    analysis: &RelationAnalysis,
    columns: &[String],
) -> DataResult<bool> {
    let relations = adjacent_relations(analysis, columns)?;
    Ok(relations_are_hierarchical(&relations))
}

/// True when no two rows share the same value tuple over the given columns.
/// Bails out on the first duplicate found.
pub fn is_composite_key(columns: &[&str], results: &QueryResults) -> DataResult<bool> {
    let indices = columns
        .iter()
        .map(|column| results.column_index(column))
        .collect::<DataResult<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for row in &results.data {
        let tuple: Vec<&str> = indices.iter().map(|&i| row[i].as_str()).collect();
        if !seen.insert(tuple.clone()) {
            debug!(?columns, ?tuple, "duplicate composite tuple");
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::analyse_relations;

    fn results(header: &[&str], rows: &[&[&str]]) -> QueryResults {
        QueryResults::new(
            header.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn chain(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_to_many_chain_is_hierarchical() {
        assert!(relations_are_hierarchical(&[
            RelationType::OneToMany,
            RelationType::OneToOne,
            RelationType::OneToMany,
        ]));
    }

    #[test]
    fn one_bad_link_breaks_the_chain() {
        for bad in [RelationType::ManyToOne, RelationType::ManyToMany] {
            assert!(!relations_are_hierarchical(&[
                RelationType::OneToMany,
                bad,
                RelationType::OneToMany,
            ]));
        }
    }

    #[test]
    fn empty_chain_passes_trivially() {
        assert!(relations_are_hierarchical(&[]));
    }

    #[test]
    fn short_chains_pass() {
        let r = results(&["a"], &[]);
        let analysis = analyse_relations(&r, &chain(&["a"])).unwrap();
        assert!(columns_are_hierarchical(&analysis, &chain(&["a"])).unwrap());
        assert!(columns_are_hierarchical(&analysis, &[]).unwrap());
    }

    #[test]
    fn geographic_containment_is_hierarchical() {
        let r = results(
            &["continent", "country", "city"],
            &[
                &["Europe", "Norway", "Oslo"],
                &["Europe", "Norway", "Bergen"],
                &["Europe", "France", "Paris"],
                &["Asia", "Japan", "Tokyo"],
            ],
        );
        let key = chain(&["continent", "country", "city"]);
        let analysis = analyse_relations(&r, &key).unwrap();
        assert!(columns_are_hierarchical(&analysis, &key).unwrap());
    }

    #[test]
    fn shared_children_break_the_hierarchy() {
        // Border rows: both endpoints relate many-to-many.
        let r = results(
            &["country1", "country2"],
            &[
                &["Norway", "Sweden"],
                &["Norway", "Finland"],
                &["Finland", "Sweden"],
            ],
        );
        let key = chain(&["country1", "country2"]);
        let analysis = analyse_relations(&r, &key).unwrap();
        assert!(!columns_are_hierarchical(&analysis, &key).unwrap());
    }

    #[test]
    fn missing_pair_is_an_error() {
        let analysis = RelationAnalysis::default();
        assert!(matches!(
            columns_are_hierarchical(&analysis, &chain(&["a", "b"])),
            Err(DataError::MissingRelation { .. })
        ));
    }

    #[test]
    fn composite_key_detects_duplicates() {
        let r = results(
            &["country", "year", "value"],
            &[
                &["Norway", "2020", "1"],
                &["Norway", "2021", "2"],
                &["Norway", "2020", "3"],
            ],
        );
        assert!(!is_composite_key(&["country", "year"], &r).unwrap());
        assert!(is_composite_key(&["country", "value"], &r).unwrap());
    }

    #[test]
    fn composite_key_over_empty_data_is_true() {
        let r = results(&["a", "b"], &[]);
        assert!(is_composite_key(&["a", "b"], &r).unwrap());
    }

    #[test]
    fn composite_key_tuples_do_not_collide_on_separators() {
        // "a,b" + "c" must stay distinct from "a" + "b,c".
        let r = results(&["x", "y"], &[&["a,b", "c"], &["a", "b,c"]]);
        assert!(is_composite_key(&["x", "y"], &r).unwrap());
    }

    #[test]
    fn composite_key_unknown_column_is_an_error() {
        let r = results(&["a"], &[]);
        assert!(matches!(
            is_composite_key(&["a", "missing"], &r),
            Err(DataError::ColumnNotFound { .. })
        ));
    }
}
