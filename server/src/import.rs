//! Loading reference data (ingredients and tags) from CSV or JSON files.
//!
//! CSV files have no header row: `name,measurement_unit` for ingredients and
//! `name,slug` for tags. JSON files hold an array of objects with the same
//! field names as the tables.

use std::io::Read;
use std::path::Path;

use diesel::prelude::*;
use thiserror::Error;

use crate::models::{NewIngredient, NewTag};
use crate::schema::{ingredients, tags};
use crate::validation::{
    validate_slug, validate_text, ValidationError, INGREDIENT_NAME_MAX_LENGTH,
    MEASUREMENT_UNIT_MAX_LENGTH, TAG_NAME_MAX_LENGTH,
};

const INSERT_CHUNK_SIZE: usize = 1000;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Row {row}: {source}")]
    Invalid {
        row: usize,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    /// `.json` files are JSON; anything else is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Csv,
        }
    }
}

fn read_pairs<R: Read>(reader: R) -> Result<Vec<(String, String)>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<(String, String)>()
        .map(|row| row.map_err(ImportError::from))
        .collect()
}

fn check_rows<T>(
    rows: Vec<T>,
    check: impl Fn(&T) -> Result<(), ValidationError>,
) -> Result<Vec<T>, ImportError> {
    for (index, row) in rows.iter().enumerate() {
        check(row).map_err(|source| ImportError::Invalid {
            row: index + 1,
            source,
        })?;
    }
    Ok(rows)
}

pub fn parse_ingredients<R: Read>(
    reader: R,
    format: Format,
) -> Result<Vec<NewIngredient>, ImportError> {
    let rows = match format {
        Format::Json => serde_json::from_reader(reader)?,
        Format::Csv => read_pairs(reader)?
            .into_iter()
            .map(|(name, measurement_unit)| NewIngredient {
                name,
                measurement_unit,
            })
            .collect(),
    };

    check_rows(rows, |row: &NewIngredient| {
        validate_text("name", &row.name, INGREDIENT_NAME_MAX_LENGTH)?;
        validate_text(
            "measurement_unit",
            &row.measurement_unit,
            MEASUREMENT_UNIT_MAX_LENGTH,
        )
    })
}

pub fn parse_tags<R: Read>(reader: R, format: Format) -> Result<Vec<NewTag>, ImportError> {
    let rows = match format {
        Format::Json => serde_json::from_reader(reader)?,
        Format::Csv => read_pairs(reader)?
            .into_iter()
            .map(|(name, slug)| NewTag { name, slug })
            .collect(),
    };

    check_rows(rows, |row: &NewTag| {
        validate_text("name", &row.name, TAG_NAME_MAX_LENGTH)?;
        validate_slug(&row.slug)
    })
}

/// Insert rows, skipping any that collide with an existing
/// `(name, measurement_unit)`. Returns the number inserted.
pub fn insert_ingredients(conn: &mut PgConnection, rows: &[NewIngredient]) -> QueryResult<usize> {
    conn.transaction(|conn| {
        let mut inserted = 0;
        for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
            inserted += diesel::insert_into(ingredients::table)
                .values(chunk)
                .on_conflict_do_nothing()
                .execute(conn)?;
        }
        Ok(inserted)
    })
}

/// Insert rows, skipping slugs that already exist. Returns the number inserted.
pub fn insert_tags(conn: &mut PgConnection, rows: &[NewTag]) -> QueryResult<usize> {
    conn.transaction(|conn| {
        let mut inserted = 0;
        for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
            inserted += diesel::insert_into(tags::table)
                .values(chunk)
                .on_conflict_do_nothing()
                .execute(conn)?;
        }
        Ok(inserted)
    })
}
