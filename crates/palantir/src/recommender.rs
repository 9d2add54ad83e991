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
use crate::hierarchy::{columns_are_hierarchical, is_composite_key};
use crate::relations::RelationAnalysis;
use crate::results::{QueryResults, VariableCategories};
use async_trait::async_trait;
use futures::future;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Visualisation kinds the workbench can render. Serialised under the
/// user-facing tab labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartType {
    Bar,
    Pie,
    Line,
    Area,
    Scatter,
    Bubble,
    #[serde(rename = "Chord Diagram")]
    ChordDiagram,
    Sankey,
    #[serde(rename = "Heat Map")]
    HeatMap,
    #[serde(rename = "Tree Map")]
    TreeMap,
    Sunburst,
    #[serde(rename = "Circle Packing")]
    CirclePacking,
    #[serde(rename = "Stacked Bar")]
    StackedBar,
    #[serde(rename = "Grouped Bar")]
    GroupedBar,
    Spider,
    Network,
    #[serde(rename = "Hierarchy Tree")]
    HierarchyTree,
    Calendar,
    #[serde(rename = "Word Cloud")]
    WordCloud,
    #[serde(rename = "Choropleth Map")]
    ChoroplethMap,
    Graph,
}

impl ChartType {
    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Bar => "Bar",
            ChartType::Pie => "Pie",
            ChartType::Line => "Line",
            ChartType::Area => "Area",
            ChartType::Scatter => "Scatter",
            ChartType::Bubble => "Bubble",
            ChartType::ChordDiagram => "Chord Diagram",
            ChartType::Sankey => "Sankey",
            ChartType::HeatMap => "Heat Map",
            ChartType::TreeMap => "Tree Map",
            ChartType::Sunburst => "Sunburst",
            ChartType::CirclePacking => "Circle Packing",
            ChartType::StackedBar => "Stacked Bar",
            ChartType::GroupedBar => "Grouped Bar",
            ChartType::Spider => "Spider",
            ChartType::Network => "Network",
            ChartType::HierarchyTree => "Hierarchy Tree",
            ChartType::Calendar => "Calendar",
            ChartType::WordCloud => "Word Cloud",
            ChartType::ChoroplethMap => "Choropleth Map",
            ChartType::Graph => "Graph",
        }
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Decides whether a single string value names a geographic entity. One
/// representative value per candidate column is submitted, so backends can
/// afford a real lookup per call.
#[async_trait]
pub trait GeographicClassifier: Send + Sync {
    async fn is_geographic(&self, value: &str) -> anyhow::Result<bool>;
}

/// Default classifier: never recognises anything, keeping the engine usable
/// without a geographic backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClassifier;

#[async_trait]
impl GeographicClassifier for NoopClassifier {
    async fn is_geographic(&self, _value: &str) -> anyhow::Result<bool> {
        Ok(false)
    }
}

/// Recommender output: the applicable chart kinds (unordered) and the
/// geographical column list the rules ran with. The input categories are
/// never mutated; callers wanting the auto-detected geography read it here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub charts: HashSet<ChartType>,
    pub geographical: Vec<String>,
}

impl Recommendation {
    pub fn contains(&self, chart: ChartType) -> bool {
        self.charts.contains(&chart)
    }
}

/// Lexical columns whose first cell value the classifier recognises as
/// geographic. Lookups run concurrently and settle together; a failed
/// lookup demotes that column to non-geographic rather than aborting.
async fn detect_geographic(
    results: &QueryResults,
    categories: &VariableCategories,
    classifier: &dyn GeographicClassifier,
) -> DataResult<Vec<String>> {
    if results.is_empty() {
        return Ok(Vec::new());
    }

    let lookups = categories.lexical.iter().map(|column| async move {
        let value = match results.first_non_empty_value(column) {
            Ok(Some(value)) => value,
            Ok(None) => return Ok((column, false)),
            Err(e) => return Err(e),
        };
        match classifier.is_geographic(value).await {
            Ok(positive) => Ok((column, positive)),
            Err(e) => {
                warn!(%column, error = %e, "geographic lookup failed, treating column as non-geographic");
                Ok((column, false))
            }
        }
    });

    let settled = future::join_all(lookups).await;
    let mut geographic = Vec::new();
    for outcome in settled {
        let (column, positive) = outcome?;
        if positive {
            geographic.push(column.clone());
        }
    }
    Ok(geographic)
}

/// Rule-based chart recommendation over role counts, pairwise relations and
/// the hierarchy shape of the key chain. All rules are additive except the
/// final two branches, which are mutually exclusive. An empty set is a
/// valid outcome, not an error.
pub async fn recommend_charts(
    categories: &VariableCategories,
    analysis: &RelationAnalysis,
    results: &QueryResults,
    classifier: &dyn GeographicClassifier,
) -> DataResult<Recommendation> {
    categories.validate(results)?;

    let geographical = if categories.geographical.is_empty() {
        detect_geographic(results, categories, classifier).await?
    } else {
        categories.geographical.clone()
    };

    let key = &categories.key;
    let numeric = &categories.numeric;
    let mut charts = HashSet::new();

    if categories.date.len() == 1 && !numeric.is_empty() {
        charts.insert(ChartType::Calendar);
    }

    if numeric.len() >= 2 {
        charts.insert(ChartType::Scatter);
        if numeric.len() >= 3 {
            charts.insert(ChartType::Bubble);
        }
    }

    if key.len() == 1 && !numeric.is_empty() {
        charts.insert(ChartType::Bar);
        charts.insert(ChartType::Pie);
    }

    if !geographical.is_empty() && !numeric.is_empty() {
        charts.insert(ChartType::ChoroplethMap);
    }

    if (key.len() == 1 || categories.lexical.len() == 1) && numeric.len() == 1 {
        charts.insert(ChartType::WordCloud);
    }

    if key.len() >= 2 {
        let hierarchical = columns_are_hierarchical(analysis, key)?;
        if hierarchical {
            charts.insert(ChartType::HierarchyTree);
        } else {
            charts.insert(ChartType::Network);
        }
        if !categories.scalar.is_empty() {
            if hierarchical {
                charts.insert(ChartType::TreeMap);
                charts.insert(ChartType::Sunburst);
                charts.insert(ChartType::CirclePacking);
            } else {
                charts.insert(ChartType::HeatMap);
                charts.insert(ChartType::ChordDiagram);
                charts.insert(ChartType::Sankey);
            }
        }
    }

    if key.len() == 2 && results.width() >= 3 {
        charts.insert(ChartType::StackedBar);
        charts.insert(ChartType::GroupedBar);
        charts.insert(ChartType::Spider);
        if categories.is_numeric(&key[1]) {
            charts.insert(ChartType::Line);
        }
    } else if key.len() == 1 && results.width() >= 3 {
        let key_index = results.column_index(&key[0])?;
        // A key in the last header position has no follower to pair with.
        if let Some(second) = results.header.get(key_index + 1) {
            if is_composite_key(&[&key[0], second], results)? {
                if categories.is_lexical(second) {
                    charts.insert(ChartType::StackedBar);
                    charts.insert(ChartType::GroupedBar);
                    charts.insert(ChartType::Spider);
                }
                if categories.is_temporal(second) {
                    charts.insert(ChartType::StackedBar);
                    charts.insert(ChartType::GroupedBar);
                    charts.insert(ChartType::Spider);
                    charts.insert(ChartType::Line);
                }
                if categories.is_numeric(second) {
                    charts.insert(ChartType::Line);
                }
            }
        }
    }

    debug!(count = charts.len(), "recommendation complete");
    Ok(Recommendation {
        charts,
        geographical,
    })
}
