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

use anyhow::Result;
use async_trait::async_trait;
use palantir::{
    ChartAdvisor, GeographicClassifier, QueryAnalysis, QueryResults, VariableCategories,
};
use std::collections::HashSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Stand-in for a real gazetteer backend: a fixed set of place names.
struct GazetteerClassifier {
    places: HashSet<&'static str>,
}

impl GazetteerClassifier {
    fn mondial() -> Self {
        Self {
            places: HashSet::from([
                "Norway", "Sweden", "Finland", "France", "Japan", "Oslo", "Bergen", "Paris",
                "Tokyo", "Stockholm",
            ]),
        }
    }
}

#[async_trait]
impl GeographicClassifier for GazetteerClassifier {
    async fn is_geographic(&self, value: &str) -> Result<bool> {
        Ok(self.places.contains(value))
    }
}

fn border_fixture() -> Result<(QueryResults, VariableCategories)> {
    let results = QueryResults::new(
        vec!["country1".into(), "country2".into(), "length".into()],
        vec![
            vec!["Norway".into(), "Sweden".into(), "1630".into()],
            vec!["Norway".into(), "Finland".into(), "736".into()],
            vec!["Finland".into(), "Sweden".into(), "614".into()],
            vec!["France".into(), "Spain".into(), "623".into()],
        ],
    )?;
    let categories = VariableCategories {
        key: vec!["country1".into(), "country2".into()],
        scalar: vec!["length".into()],
        numeric: vec!["length".into()],
        lexical: vec!["country1".into(), "country2".into()],
        ..Default::default()
    };
    Ok((results, categories))
}

fn city_fixture() -> Result<(QueryResults, VariableCategories)> {
    let results = QueryResults::new(
        vec!["country".into(), "city".into(), "population".into()],
        vec![
            vec!["Norway".into(), "Oslo".into(), "709037".into()],
            vec!["Norway".into(), "Bergen".into(), "285911".into()],
            vec!["Sweden".into(), "Stockholm".into(), "975551".into()],
            vec!["France".into(), "Paris".into(), "2102650".into()],
        ],
    )?;
    let categories = VariableCategories {
        key: vec!["country".into(), "city".into()],
        scalar: vec!["population".into()],
        numeric: vec!["population".into()],
        lexical: vec!["country".into(), "city".into()],
        ..Default::default()
    };
    Ok((results, categories))
}

fn report(name: &str, analysis: &QueryAnalysis) -> Result<()> {
    info!(query = name, hierarchical = analysis.hierarchical, "analysis done");
    println!("== {name} ==");
    for (col_a, inner) in &analysis.relations.relations {
        for (col_b, relation) in inner {
            println!("  {col_a} -> {col_b}: {relation:?}");
        }
    }
    let mut charts: Vec<_> = analysis
        .recommendation
        .charts
        .iter()
        .map(|c| c.label())
        .collect();
    charts.sort_unstable();
    println!("  geographic columns: {:?}", analysis.recommendation.geographical);
    println!("  recommended charts: {}", charts.join(", "));
    println!("  as json: {}", serde_json::to_string(&analysis.recommendation)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let advisor = ChartAdvisor::with_classifier(Box::new(GazetteerClassifier::mondial()));

    let (results, categories) = border_fixture()?;
    let analysis = advisor.analyse(&results, &categories).await?;
    report("country borders", &analysis)?;

    let (results, categories) = city_fixture()?;
    let analysis = advisor.analyse(&results, &categories).await?;
    report("cities by country", &analysis)?;

    Ok(())
}
