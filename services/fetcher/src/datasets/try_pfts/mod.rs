//! Plant functional types for TRY species from their recorded growth forms.
//!
//! Each growth-form record is mapped to Tree, Shrub or Grass, then every
//! species gets the type most of its records agree on.

mod terms;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use tracing::{debug, info};

use crate::context::Context;

/// Plant functional type. Variants are in alphabetical order so that ties
/// resolve to the alphabetically first type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pft {
    Grass,
    Shrub,
    Tree,
}

impl Pft {
    /// Tree > Shrub > Grass.
    pub const PRIORITY: [Pft; 3] = [Pft::Tree, Pft::Shrub, Pft::Grass];

    pub fn as_str(self) -> &'static str {
        match self {
            Pft::Grass => "Grass",
            Pft::Shrub => "Shrub",
            Pft::Tree => "Tree",
        }
    }
}

impl fmt::Display for Pft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Classifier {
    terms: [(Pft, HashSet<&'static str>); 3],
    skip: HashSet<&'static str>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        let set = |terms: &[&'static str]| terms.iter().copied().collect::<HashSet<_>>();
        Self {
            terms: [
                (Pft::Tree, set(terms::TREE)),
                (Pft::Shrub, set(terms::SHRUB)),
                (Pft::Grass, set(terms::GRASS)),
            ],
            skip: set(terms::NOT_GROWTH_FORMS),
        }
    }

    fn lookup(&self, term: &str) -> Option<Pft> {
        self.terms
            .iter()
            .find(|(_, terms)| terms.contains(term))
            .map(|(pft, _)| *pft)
    }

    /// Classify one growth-form value.
    ///
    /// Tries the whole value first, then its tokens (split on `_ / | ,` and
    /// whitespace) keeping the highest-priority hit, then terms longer than
    /// two characters contained in the value.
    pub fn classify(&self, growth_form: &str) -> Option<Pft> {
        let value = growth_form.trim().to_lowercase();
        if value.is_empty() || self.skip.contains(value.as_str()) || value.parse::<f64>().is_ok() {
            return None;
        }

        if let Some(pft) = self.lookup(&value) {
            return Some(pft);
        }

        let found: HashSet<Pft> = value
            .trim_matches('"')
            .trim()
            .split(|c: char| matches!(c, '_' | '/' | '|' | ',') || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .filter_map(|token| self.lookup(token))
            .collect();
        if let Some(pft) = Pft::PRIORITY.into_iter().find(|pft| found.contains(pft)) {
            return Some(pft);
        }

        Pft::PRIORITY.into_iter().find(|pft| {
            self.terms
                .iter()
                .filter(|(p, _)| p == pft)
                .flat_map(|(_, terms)| terms.iter())
                .any(|term| term.len() > 2 && value.contains(term))
        })
    }
}

/// The most frequent type per species, ties going to the alphabetically
/// first type. Species come back sorted.
pub fn majority_pfts(assignments: impl IntoIterator<Item = (String, Pft)>) -> BTreeMap<String, Pft> {
    let mut counts: BTreeMap<String, HashMap<Pft, usize>> = BTreeMap::new();
    for (species, pft) in assignments {
        *counts.entry(species).or_default().entry(pft).or_default() += 1;
    }

    counts
        .into_iter()
        .filter_map(|(species, by_pft)| {
            by_pft
                .into_iter()
                .max_by(|(a, na), (b, nb)| na.cmp(nb).then(b.cmp(a)))
                .map(|(pft, _)| (species, pft))
        })
        .collect()
}

/// Read `(species, growth form)` pairs from a tab-separated TRY export.
///
/// TRY exports are Latin-1; every byte maps to the code point of the same
/// value. Species names are lowercased.
pub fn read_records<R: Read>(
    reader: R,
    species_column: &str,
    value_column: &str,
) -> Result<Vec<(String, String)>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.byte_headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| latin1(h).trim() == name)
            .with_context(|| format!("Column {} not found in TRY export", name))
    };
    let species_idx = column(species_column)?;
    let value_idx = column(value_column)?;

    let mut records = Vec::new();
    for row in reader.byte_records() {
        let row = row?;
        let (Some(species), Some(value)) = (row.get(species_idx), row.get(value_idx)) else {
            continue;
        };
        let species = latin1(species).trim().to_lowercase();
        if species.is_empty() {
            continue;
        }
        records.push((species, latin1(value)));
    }
    Ok(records)
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Open the TRY export: a plain file, or a member of a zip archive. Without
/// an explicit member the archive must hold exactly one `.txt` file.
fn load_input(input: &Path, member: Option<&str>) -> Result<Vec<u8>> {
    let is_zip = input
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("zip"));
    if !is_zip {
        return std::fs::read(input).with_context(|| format!("Cannot read {}", input.display()));
    }

    let member = match member {
        Some(member) => member.to_string(),
        None => {
            let texts: Vec<String> = storage::entry_names(input)?
                .into_iter()
                .filter(|name| name.ends_with(".txt"))
                .collect();
            match texts.as_slice() {
                [only] => only.clone(),
                [] => bail!("No .txt member in {}", input.display()),
                _ => bail!(
                    "{} holds several .txt members ({}); set try_pfts.member",
                    input.display(),
                    texts.join(", ")
                ),
            }
        }
    };
    debug!(archive = %input.display(), member = %member, "Reading archive member");
    Ok(storage::read_entry(input, &member)?)
}

/// Write `AccSpeciesName,pft` rows.
pub fn write_pfts(path: &Path, pfts: &BTreeMap<String, Pft>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["AccSpeciesName", "pft"])?;
    for (species, pft) in pfts {
        writer.write_record([species.as_str(), pft.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Classify every record of `input` and write the species table to `output`.
/// Returns the number of species written.
pub fn create_pfts(
    input: &Path,
    member: Option<&str>,
    species_column: &str,
    value_column: &str,
    output: &Path,
) -> Result<usize> {
    info!(input = %input.display(), "Reading data...");
    let data = load_input(input, member)?;
    let records = read_records(data.as_slice(), species_column, value_column)?;

    info!(records = records.len(), "Assigning PFTs...");
    let classifier = Classifier::new();
    let assigned = records
        .into_iter()
        .filter_map(|(species, value)| classifier.classify(&value).map(|pft| (species, pft)));
    let pfts = majority_pfts(assigned);

    write_pfts(output, &pfts)?;
    info!(species = pfts.len(), output = %output.display(), "Saved species with PFT assignments");
    Ok(pfts.len())
}

pub async fn run(ctx: &Context, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let cfg = ctx.params().try_pfts.as_ref();

    let input = input
        .or_else(|| cfg.map(|c| c.input.clone()))
        .context("No TRY export given; pass --input or set try_pfts.input")?;
    let output = output
        .or_else(|| cfg.map(|c| c.output.clone()))
        .context("No output given; pass --output or set try_pfts.output")?;
    let member = cfg.and_then(|c| c.member.clone());
    let species_column = cfg.map_or("AccSpeciesName", |c| c.species_column.as_str());
    let value_column = cfg.map_or("OrigValueStr", |c| c.value_column.as_str());

    create_pfts(
        &ctx.resolve(input),
        member.as_deref(),
        species_column,
        value_column,
        &ctx.resolve(output),
    )?;
    Ok(())
}
