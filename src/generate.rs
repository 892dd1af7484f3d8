use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::info;
use rand::{seq::index, Rng};
use serde::{Deserialize, Serialize};

const MIN_PRICE: u32 = 100;
const MAX_PRICE: u32 = 2000;
/// Cities sampled beyond the square root of the query count.
const SPARE_CITIES: usize = 10;

#[derive(Debug, Deserialize)]
pub struct City {
  pub name: String,
  pub country: String,
}

#[derive(Serialize)]
struct Flight<'a> {
  origin: &'a str,
  destination: &'a str,
  price: u32,
}

#[derive(Serialize)]
struct Query<'a> {
  id: usize,
  origin: &'a str,
  destination: &'a str,
}

/// Contents of the generated map and query files, one JSON object per line.
pub struct Inputs {
  pub maps: Vec<String>,
  pub queries: Vec<String>,
}

/// Number of cities whose ordered pairs can hold `queries` distinct queries.
pub fn cities_needed(queries: usize) -> usize {
  (queries as f64).sqrt().ceil() as usize + SPARE_CITIES
}

/// Samples cities, then emits a flight for every ordered pair of distinct
/// cities and a query for each of the first `queries` ordered pairs.
pub fn generate_inputs<R: Rng + ?Sized>(rng: &mut R, cities: &[City], queries: usize) -> Result<Inputs> {
  let needed = cities_needed(queries);
  if cities.len() < needed {
    anyhow::bail!(
      "{queries} queries need {needed} cities, but the city list only has {}",
      cities.len()
    );
  }

  let names: Vec<String> = index::sample(rng, cities.len(), needed)
    .into_iter()
    .map(|i| format!("{}, {}", cities[i].name, cities[i].country))
    .collect();

  let mut maps = Vec::with_capacity(needed * (needed - 1));
  for origin in &names {
    for destination in names.iter().filter(|destination| *destination != origin) {
      let flight = Flight {
        origin,
        destination,
        price: rng.random_range(MIN_PRICE..=MAX_PRICE),
      };
      maps.push(serde_json::to_string(&flight).context("serialize flight")?);
    }
  }

  let queries = names
    .iter()
    .flat_map(|origin| names.iter().map(move |destination| (origin, destination)))
    .take(queries)
    .enumerate()
    .map(|(i, (origin, destination))| {
      let query = Query {
        id: i + 1,
        origin,
        destination,
      };
      serde_json::to_string(&query).context("serialize query")
    })
    .collect::<Result<_>>()?;

  Ok(Inputs { maps, queries })
}

/// Reads the city list at `cities`, writes the map and query files.
pub fn generate<P: AsRef<Path>>(cities: P, maps: P, queries: P, count: usize) -> Result<()> {
  let (cities, maps, queries) = (cities.as_ref(), maps.as_ref(), queries.as_ref());

  let text = fs::read_to_string(cities).with_context(|| format!("read {cities:?}"))?;
  let list: Vec<City> = serde_json::from_str(&text).with_context(|| format!("parse {cities:?}"))?;

  let inputs = generate_inputs(&mut rand::rng(), &list, count)?;
  info!(
    "sampled {} of {} cities: {} flights, {} queries",
    cities_needed(count),
    list.len(),
    inputs.maps.len(),
    inputs.queries.len()
  );

  fs::write(maps, inputs.maps.join("\n")).with_context(|| format!("write {maps:?}"))?;
  fs::write(queries, inputs.queries.join("\n")).with_context(|| format!("write {queries:?}"))?;

  Ok(())
}
