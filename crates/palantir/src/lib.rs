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

pub mod error;
pub mod hierarchy;
pub mod recommender;
pub mod relations;
pub mod results;

pub use error::{AdvisorError, DataError, DataResult, Result};
pub use hierarchy::{
    adjacent_relations, columns_are_hierarchical, is_composite_key, relations_are_hierarchical,
};
pub use recommender::{
    recommend_charts, ChartType, GeographicClassifier, NoopClassifier, Recommendation,
};
pub use relations::{
    analyse_relations, classify_relationship, column_links, ColumnLinks, LinkMap,
    RelationAnalysis, RelationType,
};
pub use results::{QueryResults, VariableCategories};

use serde::{Deserialize, Serialize};

/// Full analysis of one query result: pairwise key relations with their
/// link maps (kept for drill-down), the hierarchy verdict over the key
/// chain, and the chart recommendation. Recomputed from scratch per query;
/// nothing carries identity across executions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub relations: RelationAnalysis,
    pub hierarchical: bool,
    pub recommendation: Recommendation,
}

/// Entry point bundling the pipeline: validate, infer relations over the
/// key chain, classify the hierarchy, recommend charts.
pub struct ChartAdvisor {
    classifier: Box<dyn GeographicClassifier>,
}

impl ChartAdvisor {
    pub fn new() -> Self {
        Self {
            classifier: Box::new(NoopClassifier),
        }
    }

    pub fn with_classifier(classifier: Box<dyn GeographicClassifier>) -> Self {
        Self { classifier }
    }

    pub async fn analyse(
        &self,
        results: &QueryResults,
        categories: &VariableCategories,
    ) -> Result<QueryAnalysis> {
        results.validate()?;
        categories.validate(results)?;

        let relations = analyse_relations(results, &categories.key)?;
        let hierarchical = categories.key.len() >= 2
            && columns_are_hierarchical(&relations, &categories.key)?;
        let recommendation =
            recommend_charts(categories, &relations, results, self.classifier.as_ref()).await?;

        Ok(QueryAnalysis {
            relations,
            hierarchical,
            recommendation,
        })
    }
}

impl Default for ChartAdvisor {
    fn default() -> Self {
        Self::new()
    }
}
